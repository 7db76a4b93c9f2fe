/// Resource module - device resource wrappers
///
/// Each wrapper owns the device objects it creates and releases them
/// explicitly, in the reverse of acquisition order. Release is idempotent;
/// drop is a best-effort safety net, not the primary path.

// Module declarations
pub mod decoder;
pub mod geometry;
pub mod shader;
pub mod texture;

// Re-exports
pub use decoder::{DecodedImage, ImageDecoder, PngFileDecoder};
pub use geometry::{GeometryBuffer, GeometryDesc, IndexStreamDesc, StreamDesc};
pub use shader::{ShaderPipeline, ShaderPipelineDesc, StageDesc};
pub use texture::{Texture, TextureDesc};
