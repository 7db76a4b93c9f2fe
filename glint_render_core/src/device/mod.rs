/// Device module - the graphics driver protocol and its in-repo implementation

// Module declarations
pub mod device;
pub mod trace_device;

// Re-export everything from device.rs
pub use device::*;

// Re-export the trace device
pub use trace_device::{DrawCommand, TraceDevice};
