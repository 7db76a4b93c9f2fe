//! Render pipelines.
//!
//! A `RenderPipeline` composes one geometry, zero-or-one shader pipeline,
//! and zero-or-more textures on distinct units into one drawable unit.
//! Capability differences between programs (colored? textured? shaded at
//! all?) are presence or absence of the optional parts, never separate
//! pipeline types.
//!
//! Every `draw()` runs the strict cycle bind geometry, textures, shader;
//! issue the draw call; unbind everything in exact reverse order. Binding
//! state on the device is a single process-wide slot per handle kind, so
//! leaking it across draw calls corrupts clearing and later programs even
//! with a single pipeline in play.

use std::sync::{Arc, Mutex};

use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::resource::{GeometryBuffer, ShaderPipeline, Texture};
use crate::{render_bail, render_debug, render_trace};

const SOURCE: &str = "glint::RenderPipeline";

/// Lifecycle of a render pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Composed and ready to draw
    Configured,
    /// Components bound for the current draw (transient within `draw`)
    Bound,
    /// Draw call issued (transient within `draw`)
    Drawing,
    /// Last draw fully unbound; ready for the next one
    Unbound,
    /// Components released; the pipeline is spent
    Released,
}

/// Descriptor for composing a [`RenderPipeline`]
pub struct RenderPipelineDesc {
    pub device: Arc<Mutex<dyn GraphicsDevice>>,
    /// The one geometry this pipeline draws
    pub geometry: GeometryBuffer,
    /// Optional shader program activated around the draw
    pub shader: Option<ShaderPipeline>,
    /// Optional textures, each on a distinct unit
    pub textures: Vec<Texture>,
}

/// One drawable unit and its bind/draw/unbind cycle
pub struct RenderPipeline {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    geometry: GeometryBuffer,
    shader: Option<ShaderPipeline>,
    textures: Vec<Texture>,
    state: PipelineState,
}

impl RenderPipeline {
    /// Compose a pipeline from its parts.
    ///
    /// The pipeline takes ownership of every part and releases them at
    /// [`release`](Self::release).
    pub fn from_desc(desc: RenderPipelineDesc) -> Result<Self> {
        for (i, texture) in desc.textures.iter().enumerate() {
            if desc.textures[..i].iter().any(|t| t.unit() == texture.unit()) {
                render_bail!(SOURCE, "texture unit {} used twice", texture.unit());
            }
        }
        if desc.geometry.is_released() {
            render_bail!(SOURCE, "composed with released geometry");
        }

        render_debug!(
            SOURCE,
            "configured: indexed={}, shader={}, textures={}",
            desc.geometry.indexed(),
            desc.shader.is_some(),
            desc.textures.len()
        );
        Ok(Self {
            device: desc.device,
            geometry: desc.geometry,
            shader: desc.shader,
            textures: desc.textures,
            state: PipelineState::Configured,
        })
    }

    /// Run one full draw cycle.
    ///
    /// Indexed when the geometry carries an index stream (element count
    /// from the stream), non-indexed with the vertex count otherwise. The
    /// two modes are never mixed for one geometry.
    pub fn draw(&mut self) -> Result<()> {
        match self.state {
            PipelineState::Configured | PipelineState::Unbound => {}
            state => render_bail!(SOURCE, "draw in state {:?}", state),
        }

        self.bind()?;
        self.state = PipelineState::Drawing;
        let issue = self.issue_draw();
        // Unbind runs even when the draw call failed
        let unbind = self.unbind();
        issue?;
        unbind?;
        self.state = PipelineState::Unbound;
        Ok(())
    }

    fn bind(&mut self) -> Result<()> {
        self.geometry.bind()?;
        for texture in &mut self.textures {
            texture.bind()?;
        }
        if let Some(shader) = &mut self.shader {
            shader.activate()?;
        }
        self.state = PipelineState::Bound;
        render_trace!(SOURCE, "bound");
        Ok(())
    }

    fn issue_draw(&mut self) -> Result<()> {
        let mut device = self.device.lock().unwrap();
        match (self.geometry.index_count(), self.geometry.index_element_type()) {
            (Some(count), Some(element_type)) => device.draw_indexed(count, element_type),
            _ => device.draw_arrays(self.geometry.vertex_count()),
        }
    }

    fn unbind(&mut self) -> Result<()> {
        if let Some(shader) = &mut self.shader {
            shader.deactivate()?;
        }
        for texture in self.textures.iter_mut().rev() {
            texture.unbind()?;
        }
        self.geometry.unbind()?;
        Ok(())
    }

    /// Release every composed part in reverse-acquisition order: textures,
    /// shader, geometry. Safe to call more than once.
    pub fn release(&mut self) -> Result<()> {
        if self.state == PipelineState::Released {
            return Ok(());
        }
        for texture in self.textures.iter_mut().rev() {
            texture.release()?;
        }
        if let Some(shader) = &mut self.shader {
            shader.release()?;
        }
        self.geometry.release()?;
        self.state = PipelineState::Released;
        render_debug!(SOURCE, "released");
        Ok(())
    }

    // ===== ACCESSORS =====

    /// Current lifecycle state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// True when draws are indexed
    pub fn indexed(&self) -> bool {
        self.geometry.indexed()
    }

    /// Composed texture count
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// True when a shader pipeline is composed in
    pub fn shaded(&self) -> bool {
        self.shader.is_some()
    }
}

impl Drop for RenderPipeline {
    fn drop(&mut self) {
        if self.state != PipelineState::Released {
            let _ = self.release();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "render_pipeline_tests.rs"]
mod tests;
