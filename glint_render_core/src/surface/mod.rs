/// Surface module - windowing consumed through a narrow interface
///
/// The application owns exactly one surface between init and teardown and
/// never interacts with the windowing backend directly.

// Module declarations
pub mod headless;
pub mod surface;
pub mod winit_surface;

// Re-exports
pub use headless::{HeadlessProvider, HeadlessSurface};
pub use surface::{Surface, SurfaceConfig, SurfaceProvider, SwapInterval};
pub use winit_surface::{WinitProvider, WinitSurface};
