/// Trace device - a state-tracking GraphicsDevice (no GPU required)
///
/// Implements the full driver protocol in memory: resource tables, binding
/// state, and an ordered call log. Protocol misuse (registering an attribute
/// pointer with no bound vertex buffer, issuing an indexed draw with no
/// bound index stream, using an unlinked program, operating on an unknown
/// handle) is reported as an error instead of silently ignored.
///
/// Unlike a test-only mock, the trace device is part of the library: with
/// the real driver out of scope it doubles as the headless backend for
/// demo runs.
///
/// Compilation is modeled on the source text: an empty source or one
/// containing a `#error` token fails with a log. Linking fails unless at
/// least one vertex and one fragment stage are attached.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::device::{
    AttributeDescriptor, BufferDesc, BufferHandle, BufferUsage, ClearMask, CompileOutcome,
    GraphicsDevice, IndexElementType, LinkOutcome, PixelFormat, ProgramHandle, SamplingDesc,
    StageHandle, StageKind, TextureHandle, TextureUploadDesc,
};
use crate::error::{Error, Result};

// ============================================================================
// Records
// ============================================================================

#[derive(Debug)]
struct BufferRecord {
    usage: BufferUsage,
    size: usize,
}

#[derive(Debug)]
struct StageRecord {
    kind: StageKind,
    compiled: bool,
    attached: bool,
}

#[derive(Debug, Default)]
struct ProgramRecord {
    attached: Vec<StageHandle>,
    bindings: FxHashMap<u32, String>,
    linked: bool,
}

#[derive(Debug, Default)]
struct TextureRecord {
    size: Option<(u32, u32)>,
    internal_format: Option<PixelFormat>,
    sampling: Option<SamplingDesc>,
    mipmapped: bool,
}

/// One recorded draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    /// True for indexed draws
    pub indexed: bool,
    /// Elements issued: index count (indexed) or vertex count (non-indexed)
    pub count: u32,
    /// Index element width (indexed draws only)
    pub element_type: Option<IndexElementType>,
}

// ============================================================================
// Trace device
// ============================================================================

/// State-tracking GraphicsDevice implementation
pub struct TraceDevice {
    buffers: SlotMap<BufferHandle, BufferRecord>,
    stages: SlotMap<StageHandle, StageRecord>,
    programs: SlotMap<ProgramHandle, ProgramRecord>,
    textures: SlotMap<TextureHandle, TextureRecord>,

    // Binding state - one process-wide slot per handle kind
    bound_vertex_buffer: Option<BufferHandle>,
    bound_index_buffer: Option<BufferHandle>,
    attribute_pointers: FxHashMap<u32, AttributeDescriptor>,
    enabled_attributes: Vec<u32>,
    active_program: Option<ProgramHandle>,
    active_unit: u32,
    unit_bindings: FxHashMap<u32, TextureHandle>,
    clear_color: [f32; 4],

    // Trace records
    calls: Vec<String>,
    draws: Vec<DrawCommand>,
    clear_count: u32,
}

impl TraceDevice {
    /// Create an empty trace device
    pub fn new() -> Self {
        Self {
            buffers: SlotMap::with_key(),
            stages: SlotMap::with_key(),
            programs: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            bound_vertex_buffer: None,
            bound_index_buffer: None,
            attribute_pointers: FxHashMap::default(),
            enabled_attributes: Vec::new(),
            active_program: None,
            active_unit: 0,
            unit_bindings: FxHashMap::default(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            calls: Vec::new(),
            draws: Vec::new(),
            clear_count: 0,
        }
    }

    fn record(&mut self, call: impl Into<String>) {
        self.calls.push(call.into());
    }

    // ===== INSPECTION =====

    /// True when no buffer, attribute, program, or texture binding is live
    /// and the active texture unit is back at 0
    pub fn is_unbound(&self) -> bool {
        self.bound_vertex_buffer.is_none()
            && self.bound_index_buffer.is_none()
            && self.enabled_attributes.is_empty()
            && self.active_program.is_none()
            && self.unit_bindings.is_empty()
            && self.active_unit == 0
    }

    /// Number of live (not yet deleted) buffers
    pub fn alive_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Number of live shader stages
    pub fn alive_stages(&self) -> usize {
        self.stages.len()
    }

    /// Number of live shader programs
    pub fn alive_programs(&self) -> usize {
        self.programs.len()
    }

    /// Number of live textures
    pub fn alive_textures(&self) -> usize {
        self.textures.len()
    }

    /// All draw calls issued so far, in order
    pub fn draw_commands(&self) -> &[DrawCommand] {
        &self.draws
    }

    /// Ordered log of every protocol call
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Number of clear calls issued so far
    pub fn clear_count(&self) -> u32 {
        self.clear_count
    }

    /// The currently configured clear color
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Currently enabled attribute slots, in enable order
    pub fn enabled_attributes(&self) -> &[u32] {
        &self.enabled_attributes
    }

    /// The vertex buffer currently bound, if any
    pub fn bound_vertex_buffer(&self) -> Option<BufferHandle> {
        self.bound_vertex_buffer
    }

    /// The index buffer currently bound, if any
    pub fn bound_index_buffer(&self) -> Option<BufferHandle> {
        self.bound_index_buffer
    }

    /// The program currently in use, if any
    pub fn active_program(&self) -> Option<ProgramHandle> {
        self.active_program
    }

    /// The texture bound to a unit, if any
    pub fn bound_texture(&self, unit: u32) -> Option<TextureHandle> {
        self.unit_bindings.get(&unit).copied()
    }

    /// Uploaded size of a texture, if it exists and was uploaded
    pub fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(handle).and_then(|t| t.size)
    }

    /// Sampling parameters set on a texture, if any
    pub fn texture_sampling(&self, handle: TextureHandle) -> Option<SamplingDesc> {
        self.textures.get(handle).and_then(|t| t.sampling)
    }

    /// Whether a texture had its mipmap chain generated
    pub fn texture_mipmapped(&self, handle: TextureHandle) -> Option<bool> {
        self.textures.get(handle).map(|t| t.mipmapped)
    }

    /// Whether a program linked successfully
    pub fn program_linked(&self, handle: ProgramHandle) -> Option<bool> {
        self.programs.get(handle).map(|p| p.linked)
    }

    /// The attribute name bound at a program slot, if any
    pub fn attribute_binding(&self, program: ProgramHandle, slot: u32) -> Option<&str> {
        self.programs
            .get(program)?
            .bindings
            .get(&slot)
            .map(|n| n.as_str())
    }
}

impl Default for TraceDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for TraceDevice {
    // ===== FRAME STATE =====

    fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.clear_color = rgba;
        self.record(format!("set_clear_color({:?})", rgba));
    }

    fn clear(&mut self, mask: ClearMask) {
        self.clear_count += 1;
        self.record(format!("clear({:?})", mask));
    }

    // ===== BUFFERS =====

    fn create_buffer(&mut self, desc: BufferDesc) -> Result<BufferHandle> {
        if desc.data.is_empty() {
            return Err(Error::Allocation("buffer data is empty".to_string()));
        }
        let size = desc.data.len();
        let usage = desc.usage;
        let handle = self.buffers.insert(BufferRecord { usage, size });
        self.record(format!("create_buffer({:?}, {})", usage, size));
        Ok(handle)
    }

    fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        if self.buffers.remove(handle).is_none() {
            return Err(Error::InvalidResource(
                "delete_buffer: unknown buffer handle".to_string(),
            ));
        }
        // Driver semantics: deleting a bound buffer unbinds it
        if self.bound_vertex_buffer == Some(handle) {
            self.bound_vertex_buffer = None;
        }
        if self.bound_index_buffer == Some(handle) {
            self.bound_index_buffer = None;
        }
        self.record("delete_buffer");
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        let record = self.buffers.get(handle).ok_or_else(|| {
            Error::InvalidResource("bind_vertex_buffer: unknown buffer handle".to_string())
        })?;
        if record.usage != BufferUsage::Vertex {
            return Err(Error::InvalidResource(
                "bind_vertex_buffer: buffer was created for index use".to_string(),
            ));
        }
        self.bound_vertex_buffer = Some(handle);
        self.record("bind_vertex_buffer");
        Ok(())
    }

    fn unbind_vertex_buffer(&mut self) {
        self.bound_vertex_buffer = None;
        self.record("unbind_vertex_buffer");
    }

    fn set_attribute_pointer(&mut self, desc: AttributeDescriptor) -> Result<()> {
        if self.bound_vertex_buffer.is_none() {
            return Err(Error::InvalidResource(
                "set_attribute_pointer: no vertex buffer bound".to_string(),
            ));
        }
        self.attribute_pointers.insert(desc.slot, desc);
        self.record(format!("set_attribute_pointer({})", desc.slot));
        Ok(())
    }

    fn enable_attribute(&mut self, slot: u32) -> Result<()> {
        if !self.attribute_pointers.contains_key(&slot) {
            return Err(Error::InvalidResource(format!(
                "enable_attribute: no attribute pointer registered at slot {}",
                slot
            )));
        }
        if !self.enabled_attributes.contains(&slot) {
            self.enabled_attributes.push(slot);
        }
        self.record(format!("enable_attribute({})", slot));
        Ok(())
    }

    fn disable_attribute(&mut self, slot: u32) -> Result<()> {
        self.enabled_attributes.retain(|&s| s != slot);
        self.record(format!("disable_attribute({})", slot));
        Ok(())
    }

    fn bind_index_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        let record = self.buffers.get(handle).ok_or_else(|| {
            Error::InvalidResource("bind_index_buffer: unknown buffer handle".to_string())
        })?;
        if record.usage != BufferUsage::Index {
            return Err(Error::InvalidResource(
                "bind_index_buffer: buffer was created for vertex use".to_string(),
            ));
        }
        self.bound_index_buffer = Some(handle);
        self.record("bind_index_buffer");
        Ok(())
    }

    fn unbind_index_buffer(&mut self) {
        self.bound_index_buffer = None;
        self.record("unbind_index_buffer");
    }

    // ===== SHADERS =====

    fn compile_stage(&mut self, kind: StageKind, source: &str) -> Result<CompileOutcome> {
        // Compilation model: empty source or a `#error` token fails
        let (success, log) = if source.trim().is_empty() {
            (false, "error: empty shader source".to_string())
        } else if source.contains("#error") {
            (false, "error: #error directive in shader source".to_string())
        } else {
            (true, String::new())
        };
        let handle = self.stages.insert(StageRecord {
            kind,
            compiled: success,
            attached: false,
        });
        self.record(format!("compile_stage({:?}, ok={})", kind, success));
        Ok(CompileOutcome {
            handle,
            success,
            log,
        })
    }

    fn delete_stage(&mut self, handle: StageHandle) -> Result<()> {
        match self.stages.get(handle) {
            None => {
                return Err(Error::InvalidResource(
                    "delete_stage: unknown stage handle".to_string(),
                ))
            }
            Some(record) if record.attached => {
                return Err(Error::InvalidResource(
                    "delete_stage: stage is still attached to a program".to_string(),
                ))
            }
            Some(_) => {}
        }
        self.stages.remove(handle);
        self.record("delete_stage");
        Ok(())
    }

    fn create_program(&mut self) -> Result<ProgramHandle> {
        let handle = self.programs.insert(ProgramRecord::default());
        self.record("create_program");
        Ok(handle)
    }

    fn attach_stage(&mut self, program: ProgramHandle, stage: StageHandle) -> Result<()> {
        if !self.programs.contains_key(program) {
            return Err(Error::InvalidResource(
                "attach_stage: unknown program handle".to_string(),
            ));
        }
        let record = self.stages.get_mut(stage).ok_or_else(|| {
            Error::InvalidResource("attach_stage: unknown stage handle".to_string())
        })?;
        record.attached = true;
        self.programs[program].attached.push(stage);
        self.record("attach_stage");
        Ok(())
    }

    fn detach_stage(&mut self, program: ProgramHandle, stage: StageHandle) -> Result<()> {
        let record = self.programs.get_mut(program).ok_or_else(|| {
            Error::InvalidResource("detach_stage: unknown program handle".to_string())
        })?;
        let before = record.attached.len();
        record.attached.retain(|&s| s != stage);
        if record.attached.len() == before {
            return Err(Error::InvalidResource(
                "detach_stage: stage is not attached to this program".to_string(),
            ));
        }
        if let Some(stage_record) = self.stages.get_mut(stage) {
            stage_record.attached = false;
        }
        self.record("detach_stage");
        Ok(())
    }

    fn bind_attribute_name(&mut self, program: ProgramHandle, slot: u32, name: &str) -> Result<()> {
        let record = self.programs.get_mut(program).ok_or_else(|| {
            Error::InvalidResource("bind_attribute_name: unknown program handle".to_string())
        })?;
        if record.linked {
            return Err(Error::InvalidResource(
                "bind_attribute_name: program is already linked".to_string(),
            ));
        }
        record.bindings.insert(slot, name.to_string());
        self.record(format!("bind_attribute_name({}, {})", slot, name));
        Ok(())
    }

    fn link_program(&mut self, program: ProgramHandle) -> Result<LinkOutcome> {
        let attached: Vec<StageKind> = {
            let record = self.programs.get(program).ok_or_else(|| {
                Error::InvalidResource("link_program: unknown program handle".to_string())
            })?;
            record
                .attached
                .iter()
                .filter_map(|&s| self.stages.get(s).map(|r| r.kind))
                .collect()
        };
        let has_vertex = attached.contains(&StageKind::Vertex);
        let has_fragment = attached.contains(&StageKind::Fragment);
        let uncompiled = {
            let record = &self.programs[program];
            record
                .attached
                .iter()
                .any(|&s| self.stages.get(s).map(|r| !r.compiled).unwrap_or(true))
        };
        let (success, log) = if !has_vertex || !has_fragment {
            (
                false,
                "error: program requires one vertex and one fragment stage".to_string(),
            )
        } else if uncompiled {
            (false, "error: attached stage did not compile".to_string())
        } else {
            (true, String::new())
        };
        self.programs[program].linked = success;
        self.record(format!("link_program(ok={})", success));
        Ok(LinkOutcome { success, log })
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<()> {
        let record = self.programs.get(program).ok_or_else(|| {
            Error::InvalidResource("use_program: unknown program handle".to_string())
        })?;
        if !record.linked {
            return Err(Error::InvalidResource(
                "use_program: program is not linked".to_string(),
            ));
        }
        self.active_program = Some(program);
        self.record("use_program");
        Ok(())
    }

    fn clear_program(&mut self) {
        self.active_program = None;
        self.record("clear_program");
    }

    fn delete_program(&mut self, handle: ProgramHandle) -> Result<()> {
        if self.programs.remove(handle).is_none() {
            return Err(Error::InvalidResource(
                "delete_program: unknown program handle".to_string(),
            ));
        }
        if self.active_program == Some(handle) {
            self.active_program = None;
        }
        self.record("delete_program");
        Ok(())
    }

    // ===== TEXTURES =====

    fn create_texture(&mut self) -> Result<TextureHandle> {
        let handle = self.textures.insert(TextureRecord::default());
        self.record("create_texture");
        Ok(handle)
    }

    fn set_active_texture_unit(&mut self, unit: u32) {
        self.active_unit = unit;
        self.record(format!("set_active_texture_unit({})", unit));
    }

    fn bind_texture(&mut self, handle: TextureHandle) -> Result<()> {
        if !self.textures.contains_key(handle) {
            return Err(Error::InvalidResource(
                "bind_texture: unknown texture handle".to_string(),
            ));
        }
        self.unit_bindings.insert(self.active_unit, handle);
        self.record(format!("bind_texture(unit={})", self.active_unit));
        Ok(())
    }

    fn unbind_texture(&mut self) {
        self.unit_bindings.remove(&self.active_unit);
        self.record(format!("unbind_texture(unit={})", self.active_unit));
    }

    fn upload_texture(&mut self, desc: TextureUploadDesc) -> Result<()> {
        let handle = self.unit_bindings.get(&self.active_unit).copied().ok_or_else(|| {
            Error::InvalidResource(
                "upload_texture: no texture bound to the active unit".to_string(),
            )
        })?;
        let bytes_per_pixel = match desc.source_format {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        };
        let expected = desc.width as usize * desc.height as usize * bytes_per_pixel;
        if desc.pixels.len() != expected {
            return Err(Error::InvalidResource(format!(
                "upload_texture: {} pixel bytes supplied, {} expected",
                desc.pixels.len(),
                expected
            )));
        }
        let record = &mut self.textures[handle];
        record.size = Some((desc.width, desc.height));
        record.internal_format = Some(desc.internal_format);
        self.record(format!("upload_texture({}x{})", desc.width, desc.height));
        Ok(())
    }

    fn generate_mipmaps(&mut self) -> Result<()> {
        let handle = self.unit_bindings.get(&self.active_unit).copied().ok_or_else(|| {
            Error::InvalidResource(
                "generate_mipmaps: no texture bound to the active unit".to_string(),
            )
        })?;
        self.textures[handle].mipmapped = true;
        self.record("generate_mipmaps");
        Ok(())
    }

    fn set_sampling(&mut self, desc: SamplingDesc) -> Result<()> {
        let handle = self.unit_bindings.get(&self.active_unit).copied().ok_or_else(|| {
            Error::InvalidResource(
                "set_sampling: no texture bound to the active unit".to_string(),
            )
        })?;
        self.textures[handle].sampling = Some(desc);
        self.record("set_sampling");
        Ok(())
    }

    fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        if self.textures.remove(handle).is_none() {
            return Err(Error::InvalidResource(
                "delete_texture: unknown texture handle".to_string(),
            ));
        }
        self.unit_bindings.retain(|_, &mut bound| bound != handle);
        self.record("delete_texture");
        Ok(())
    }

    // ===== DRAWS =====

    fn draw_arrays(&mut self, vertex_count: u32) -> Result<()> {
        self.draws.push(DrawCommand {
            indexed: false,
            count: vertex_count,
            element_type: None,
        });
        self.record(format!("draw_arrays({})", vertex_count));
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, element_type: IndexElementType) -> Result<()> {
        if self.bound_index_buffer.is_none() {
            return Err(Error::InvalidResource(
                "draw_indexed: no index buffer bound".to_string(),
            ));
        }
        self.draws.push(DrawCommand {
            indexed: true,
            count: index_count,
            element_type: Some(element_type),
        });
        self.record(format!("draw_indexed({})", index_count));
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "trace_device_tests.rs"]
mod tests;
