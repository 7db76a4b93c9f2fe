/// GraphicsDevice trait - the graphics driver protocol
///
/// The driver itself (buffer objects, shader objects, texture objects) is an
/// external collaborator; this trait specifies the protocol of how those
/// objects are allocated, populated, bound, and released, not the underlying
/// API calls. Backend implementations map the protocol onto a real driver;
/// the in-repo [`TraceDevice`](super::TraceDevice) records and validates it.
///
/// Binding state (the currently active buffer / program / texture unit) is a
/// single process-wide slot per handle kind, so bind/unbind pairs must never
/// interleave across components. Per-slot attribute layouts registered with
/// [`GraphicsDevice::set_attribute_pointer`] are retained by the device
/// (vertex-array-object semantics): enabling a slot later does not require
/// re-binding the buffer that sourced it.

use bitflags::bitflags;
use slotmap::new_key_type;

use crate::error::Result;

new_key_type! {
    /// Opaque handle to a device-memory buffer (vertex or index data)
    pub struct BufferHandle;

    /// Opaque handle to one compiled shader stage
    pub struct StageHandle;

    /// Opaque handle to a linked shader program
    pub struct ProgramHandle;

    /// Opaque handle to a device texture object
    pub struct TextureHandle;
}

// ============================================================================
// Common types
// ============================================================================

/// What a device buffer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex attribute data, read through attribute slots
    Vertex,
    /// Index data; does not participate in attribute binding
    Index,
}

/// Scalar type of one vertex attribute component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Float,
    Byte,
    Int,
}

/// Layout of one vertex attribute stream at a fixed slot.
///
/// Slot convention (mirrored by shader attribute bindings):
/// slot 0 = position, slot 1 = color, slot 2 = texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// Attribute slot index (unique per geometry)
    pub slot: u32,
    /// Components per vertex (1-4)
    pub component_count: u32,
    /// Scalar type of each component
    pub element_type: AttributeType,
    /// Byte distance between consecutive vertices (0 = tightly packed)
    pub stride: u32,
    /// Byte offset of the first element in the buffer
    pub offset: u32,
}

/// Element width of an index stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexElementType {
    /// 1-byte indices: at most 256 distinct vertices addressable
    U8,
    /// 2-byte indices: up to 65536 distinct vertices
    U16,
    /// 4-byte indices
    U32,
}

impl IndexElementType {
    /// Size of one index element in bytes
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexElementType::U8 => 1,
            IndexElementType::U16 => 2,
            IndexElementType::U32 => 4,
        }
    }

    /// Largest index value this element width can represent
    pub fn max_value(&self) -> u32 {
        match self {
            IndexElementType::U8 => u8::MAX as u32,
            IndexElementType::U16 => u16::MAX as u32,
            IndexElementType::U32 => u32::MAX,
        }
    }
}

/// Shader stage kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Vertex,
    Fragment,
}

/// Pixel format for texture storage and upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

/// Texture coordinate wrap mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// Minification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinFilter {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

/// Magnification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagFilter {
    Nearest,
    Linear,
}

/// Sampling parameters applied to the currently bound texture.
///
/// Defaults: repeat wrap, nearest
/// magnification, linear-mipmap-linear minification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingDesc {
    pub wrap: WrapMode,
    pub min_filter: MinFilter,
    pub mag_filter: MagFilter,
}

impl Default for SamplingDesc {
    fn default() -> Self {
        Self {
            wrap: WrapMode::Repeat,
            min_filter: MinFilter::LinearMipmapLinear,
            mag_filter: MagFilter::Nearest,
        }
    }
}

bitflags! {
    /// Frame-buffer aspects cleared at the start of each loop iteration
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearMask: u32 {
        const COLOR = 0b01;
        const DEPTH = 0b10;
    }
}

// ============================================================================
// Descriptors and outcomes
// ============================================================================

/// Descriptor for creating a device buffer.
///
/// Data is uploaded once at creation as immutable/static content.
#[derive(Debug, Clone)]
pub struct BufferDesc {
    pub usage: BufferUsage,
    pub data: Vec<u8>,
}

/// Descriptor for uploading pixel data to the currently bound texture
#[derive(Debug, Clone)]
pub struct TextureUploadDesc {
    pub width: u32,
    pub height: u32,
    /// Device-side storage format (RGB by convention here)
    pub internal_format: PixelFormat,
    /// Format of the supplied pixel bytes (RGBA from the decoder)
    pub source_format: PixelFormat,
    pub pixels: Vec<u8>,
}

/// Result of compiling one shader stage.
///
/// The stage object exists even when compilation failed (`success == false`);
/// the caller must check the flag and delete the stage instead of using it.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    pub handle: StageHandle,
    pub success: bool,
    pub log: String,
}

/// Result of linking a shader program
#[derive(Debug, Clone)]
pub struct LinkOutcome {
    pub success: bool,
    pub log: String,
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// The graphics driver protocol.
///
/// All calls occur on the one thread that owns the active rendering context;
/// the trait is `Send + Sync` only so the device can be shared behind
/// `Arc<Mutex<dyn GraphicsDevice>>` the way resources hold it.
pub trait GraphicsDevice: Send + Sync {
    // ===== FRAME STATE =====

    /// Set the color used by [`clear`](Self::clear)
    fn set_clear_color(&mut self, rgba: [f32; 4]);

    /// Clear the named frame-buffer aspects
    fn clear(&mut self, mask: ClearMask);

    // ===== BUFFERS =====

    /// Allocate a device buffer and upload its content once
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<BufferHandle>;

    /// Release a device buffer
    fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    /// Make a vertex buffer the current attribute-pointer target
    fn bind_vertex_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    /// Clear the current vertex buffer binding
    fn unbind_vertex_buffer(&mut self);

    /// Register the attribute layout of the currently bound vertex buffer
    /// at its slot. The registration persists after the buffer is unbound.
    fn set_attribute_pointer(&mut self, desc: AttributeDescriptor) -> Result<()>;

    /// Activate a registered attribute slot for drawing
    fn enable_attribute(&mut self, slot: u32) -> Result<()>;

    /// Deactivate an attribute slot
    fn disable_attribute(&mut self, slot: u32) -> Result<()>;

    /// Make an index buffer the current indexed-draw source
    fn bind_index_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    /// Clear the current index buffer binding
    fn unbind_index_buffer(&mut self);

    // ===== SHADERS =====

    /// Create and compile one shader stage from source text.
    ///
    /// Returns `Err` only when the driver cannot allocate the stage object;
    /// a failed compilation is reported through the outcome's `success`
    /// flag and `log`, with the stage object still allocated.
    fn compile_stage(&mut self, kind: StageKind, source: &str) -> Result<CompileOutcome>;

    /// Release a shader stage. Stages attached to a program must be
    /// detached first.
    fn delete_stage(&mut self, handle: StageHandle) -> Result<()>;

    /// Allocate an empty shader program
    fn create_program(&mut self) -> Result<ProgramHandle>;

    /// Attach a compiled stage to a program
    fn attach_stage(&mut self, program: ProgramHandle, stage: StageHandle) -> Result<()>;

    /// Detach a stage from a program
    fn detach_stage(&mut self, program: ProgramHandle, stage: StageHandle) -> Result<()>;

    /// Map an attribute slot to a named shader input. Must be called
    /// before [`link_program`](Self::link_program); post-link bindings are
    /// immutable.
    fn bind_attribute_name(&mut self, program: ProgramHandle, slot: u32, name: &str) -> Result<()>;

    /// Link and validate the program's attached stages
    fn link_program(&mut self, program: ProgramHandle) -> Result<LinkOutcome>;

    /// Make a linked program the active draw shader
    fn use_program(&mut self, program: ProgramHandle) -> Result<()>;

    /// Deactivate the current draw shader
    fn clear_program(&mut self);

    /// Release a shader program
    fn delete_program(&mut self, handle: ProgramHandle) -> Result<()>;

    // ===== TEXTURES =====

    /// Allocate a device texture object
    fn create_texture(&mut self) -> Result<TextureHandle>;

    /// Select the active texture unit for subsequent bind/upload calls
    fn set_active_texture_unit(&mut self, unit: u32);

    /// Bind a texture to the active unit
    fn bind_texture(&mut self, handle: TextureHandle) -> Result<()>;

    /// Unbind the texture bound to the active unit
    fn unbind_texture(&mut self);

    /// Upload pixel data to the texture bound to the active unit
    fn upload_texture(&mut self, desc: TextureUploadDesc) -> Result<()>;

    /// Generate the mipmap chain for the texture bound to the active unit
    fn generate_mipmaps(&mut self) -> Result<()>;

    /// Set wrap and filter parameters on the texture bound to the active unit
    fn set_sampling(&mut self, desc: SamplingDesc) -> Result<()>;

    /// Release a device texture
    fn delete_texture(&mut self, handle: TextureHandle) -> Result<()>;

    // ===== DRAWS =====

    /// Issue a non-indexed draw of `vertex_count` vertices from the enabled
    /// attribute slots
    fn draw_arrays(&mut self, vertex_count: u32) -> Result<()>;

    /// Issue an indexed draw of `index_count` elements from the bound index
    /// buffer
    fn draw_indexed(&mut self, index_count: u32, element_type: IndexElementType) -> Result<()>;
}
