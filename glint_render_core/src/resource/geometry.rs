//! Geometry buffers.
//!
//! A `GeometryBuffer` owns one device buffer per vertex attribute stream
//! plus an optional index stream. Streams live at unique attribute slots;
//! layouts are registered at creation and persist on the device, so binding
//! for a draw only enables slots and binds the index stream.
//!
//! Index values are validated against the element width at creation (a
//! 1-byte stream cannot hold the value 256) but NOT against the vertex
//! count: an index referring past the last vertex is a caller bug the
//! device may answer with garbage or worse. Callers own that invariant.

use std::sync::{Arc, Mutex};

use crate::device::{
    AttributeDescriptor, AttributeType, BufferDesc, BufferHandle, BufferUsage, GraphicsDevice,
    IndexElementType,
};
use crate::error::Result;
use crate::{render_bail, render_debug, render_trace, render_warn};

const SOURCE: &str = "glint::GeometryBuffer";

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// One vertex attribute stream: its slot, layout, and raw content
#[derive(Debug, Clone)]
pub struct StreamDesc {
    /// Attribute slot (unique within the geometry)
    pub slot: u32,
    /// Components per vertex (1-4)
    pub component_count: u32,
    /// Scalar type of each component
    pub element_type: AttributeType,
    /// Raw stream content, tightly packed
    pub data: Vec<u8>,
}

impl StreamDesc {
    /// Build a tightly packed float stream from scalar values
    pub fn from_f32(slot: u32, component_count: u32, values: &[f32]) -> Self {
        Self {
            slot,
            component_count,
            element_type: AttributeType::Float,
            data: bytemuck::cast_slice(values).to_vec(),
        }
    }
}

/// Index stream content, given as logical values and a storage width
#[derive(Debug, Clone)]
pub struct IndexStreamDesc {
    /// Storage width of one index element
    pub element_type: IndexElementType,
    /// Logical index values, validated against the width at creation
    pub values: Vec<u32>,
}

/// Descriptor for creating a [`GeometryBuffer`]
pub struct GeometryDesc {
    pub device: Arc<Mutex<dyn GraphicsDevice>>,
    /// Attribute streams; at least one, all with unique slots
    pub streams: Vec<StreamDesc>,
    /// Vertices in every stream
    pub vertex_count: u32,
    /// Optional index stream enabling indexed draws
    pub indices: Option<IndexStreamDesc>,
}

// ============================================================================
// GEOMETRY BUFFER
// ============================================================================

struct StreamRecord {
    slot: u32,
    buffer: BufferHandle,
}

struct IndexRecord {
    buffer: BufferHandle,
    element_type: IndexElementType,
    count: u32,
}

/// Multi-stream vertex data plus an optional index stream, owned on-device
pub struct GeometryBuffer {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    streams: Vec<StreamRecord>,
    index_stream: Option<IndexRecord>,
    vertex_count: u32,
    bound: bool,
    released: bool,
}

impl GeometryBuffer {
    /// Create the geometry: allocate one device buffer per stream, register
    /// attribute layouts, and upload the optional index stream.
    pub fn from_desc(desc: GeometryDesc) -> Result<Self> {
        if desc.vertex_count == 0 {
            render_bail!(SOURCE, "geometry needs at least one vertex");
        }
        if desc.streams.is_empty() {
            render_bail!(SOURCE, "geometry needs at least one attribute stream");
        }

        // Unique slots
        for (i, stream) in desc.streams.iter().enumerate() {
            if desc.streams[..i].iter().any(|s| s.slot == stream.slot) {
                render_bail!(SOURCE, "attribute slot {} used by two streams", stream.slot);
            }
        }

        // Per-stream layout validation against the vertex count
        for stream in &desc.streams {
            if !(1..=4).contains(&stream.component_count) {
                render_bail!(
                    SOURCE,
                    "stream at slot {} has {} components per vertex",
                    stream.slot,
                    stream.component_count
                );
            }
            let scalar_size = match stream.element_type {
                AttributeType::Float | AttributeType::Int => 4,
                AttributeType::Byte => 1,
            };
            let expected = desc.vertex_count as usize
                * stream.component_count as usize
                * scalar_size;
            if stream.data.len() != expected {
                render_bail!(
                    SOURCE,
                    "stream at slot {} holds {} bytes, {} expected for {} vertices",
                    stream.slot,
                    stream.data.len(),
                    expected,
                    desc.vertex_count
                );
            }
        }

        let mut geometry = Self {
            device: desc.device,
            streams: Vec::with_capacity(desc.streams.len()),
            index_stream: None,
            vertex_count: desc.vertex_count,
            bound: false,
            released: false,
        };

        // Allocate and register streams; on failure release what exists
        let outcome = geometry.upload(&desc.streams, desc.indices.as_ref());
        if let Err(err) = outcome {
            let _ = geometry.release();
            return Err(err);
        }

        render_debug!(
            SOURCE,
            "created: {} streams, {} vertices, indexed: {}",
            geometry.streams.len(),
            geometry.vertex_count,
            geometry.index_stream.is_some()
        );
        Ok(geometry)
    }

    fn upload(
        &mut self,
        streams: &[StreamDesc],
        indices: Option<&IndexStreamDesc>,
    ) -> Result<()> {
        let device = self.device.clone();
        let mut device = device.lock().unwrap();

        for stream in streams {
            let buffer = device.create_buffer(BufferDesc {
                usage: BufferUsage::Vertex,
                data: stream.data.clone(),
            })?;
            self.streams.push(StreamRecord {
                slot: stream.slot,
                buffer,
            });

            // Register the layout while the buffer is bound; the device
            // retains it per slot after unbinding
            device.bind_vertex_buffer(buffer)?;
            device.set_attribute_pointer(AttributeDescriptor {
                slot: stream.slot,
                component_count: stream.component_count,
                element_type: stream.element_type,
                stride: 0,
                offset: 0,
            })?;
            device.unbind_vertex_buffer();
        }

        if let Some(indices) = indices {
            if indices.values.is_empty() {
                render_bail!(SOURCE, "index stream holds no values");
            }
            let max = indices.element_type.max_value();
            if let Some(&value) = indices.values.iter().find(|&&v| v > max) {
                render_bail!(
                    SOURCE,
                    "index value {} exceeds the {}-byte element range",
                    value,
                    indices.element_type.size_bytes()
                );
            }
            let data = pack_indices(&indices.values, indices.element_type);
            let buffer = device.create_buffer(BufferDesc {
                usage: BufferUsage::Index,
                data,
            })?;
            self.index_stream = Some(IndexRecord {
                buffer,
                element_type: indices.element_type,
                count: indices.values.len() as u32,
            });
        }

        Ok(())
    }

    /// Enable every attribute slot and bind the index stream.
    ///
    /// Binds must not nest; a second `bind` without an `unbind` in between
    /// is an error.
    pub fn bind(&mut self) -> Result<()> {
        if self.released {
            render_bail!(SOURCE, "bind on released geometry");
        }
        if self.bound {
            render_bail!(SOURCE, "bind while already bound");
        }

        let device = self.device.clone();
        let mut device = device.lock().unwrap();
        for stream in &self.streams {
            device.enable_attribute(stream.slot)?;
        }
        if let Some(indices) = &self.index_stream {
            device.bind_index_buffer(indices.buffer)?;
        }
        self.bound = true;
        render_trace!(SOURCE, "bound {} attribute slots", self.streams.len());
        Ok(())
    }

    /// Undo [`bind`](Self::bind) in exact reverse order
    pub fn unbind(&mut self) -> Result<()> {
        if !self.bound {
            render_bail!(SOURCE, "unbind without a matching bind");
        }

        let device = self.device.clone();
        let mut device = device.lock().unwrap();
        if self.index_stream.is_some() {
            device.unbind_index_buffer();
        }
        for stream in self.streams.iter().rev() {
            device.disable_attribute(stream.slot)?;
        }
        self.bound = false;
        Ok(())
    }

    /// Delete every owned device buffer. Safe to call more than once.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        if self.bound {
            render_warn!(SOURCE, "released while still bound; unbinding first");
            self.unbind()?;
        }

        let device = self.device.clone();
        let mut device = device.lock().unwrap();
        if let Some(indices) = self.index_stream.take() {
            device.delete_buffer(indices.buffer)?;
        }
        for stream in self.streams.drain(..).rev() {
            device.delete_buffer(stream.buffer)?;
        }
        self.released = true;
        render_debug!(SOURCE, "released");
        Ok(())
    }

    // ===== ACCESSORS =====

    /// Vertices in every stream
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// True when an index stream exists
    pub fn indexed(&self) -> bool {
        self.index_stream.is_some()
    }

    /// Elements in the index stream, if one exists
    pub fn index_count(&self) -> Option<u32> {
        self.index_stream.as_ref().map(|i| i.count)
    }

    /// Element width of the index stream, if one exists
    pub fn index_element_type(&self) -> Option<IndexElementType> {
        self.index_stream.as_ref().map(|i| i.element_type)
    }

    /// Attribute slots in registration order
    pub fn slots(&self) -> Vec<u32> {
        self.streams.iter().map(|s| s.slot).collect()
    }

    /// True between a successful bind and the matching unbind
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// True once released
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for GeometryBuffer {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.release();
        }
    }
}

/// Pack logical index values into their storage width, little-endian
fn pack_indices(values: &[u32], element_type: IndexElementType) -> Vec<u8> {
    match element_type {
        IndexElementType::U8 => values.iter().map(|&v| v as u8).collect(),
        IndexElementType::U16 => values
            .iter()
            .flat_map(|&v| (v as u16).to_le_bytes())
            .collect(),
        IndexElementType::U32 => values.iter().flat_map(|&v| v.to_le_bytes()).collect(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
