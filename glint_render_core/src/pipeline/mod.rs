/// Pipeline module - the composed drawable unit

// Module declarations
pub mod render_pipeline;

// Re-exports
pub use render_pipeline::{PipelineState, RenderPipeline, RenderPipelineDesc};
