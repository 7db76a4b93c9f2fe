//! Shader pipelines.
//!
//! A `ShaderPipeline` compiles its stages, binds attribute names to slots,
//! and links them into one program, all at creation. A compile or link
//! failure is fatal: the error carries the driver's log and every device
//! object created so far is released before returning. A constructed
//! pipeline therefore always holds a linked program.
//!
//! Attribute bindings are fixed before the link and immutable afterwards;
//! the slot numbers must match the geometry streams drawn with this
//! pipeline.

use std::sync::{Arc, Mutex};

use crate::device::{GraphicsDevice, ProgramHandle, StageHandle, StageKind};
use crate::error::{Error, Result};
use crate::{render_bail, render_debug, render_error, render_warn};

const SOURCE: &str = "glint::ShaderPipeline";

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// One shader stage: its kind and GLSL source text
#[derive(Debug, Clone)]
pub struct StageDesc {
    pub kind: StageKind,
    pub source: String,
}

/// Descriptor for creating a [`ShaderPipeline`]
pub struct ShaderPipelineDesc {
    pub device: Arc<Mutex<dyn GraphicsDevice>>,
    /// Stages to compile and attach; one vertex and one fragment stage
    /// are required for the link to succeed
    pub stages: Vec<StageDesc>,
    /// Pre-link attribute bindings: (slot, shader input name)
    pub attribute_bindings: Vec<(u32, String)>,
}

// ============================================================================
// SHADER PIPELINE
// ============================================================================

/// Compiled shader stages linked into one device program
pub struct ShaderPipeline {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    program: ProgramHandle,
    stages: Vec<StageHandle>,
    active: bool,
    released: bool,
}

impl ShaderPipeline {
    /// Compile every stage, bind attribute names, and link.
    ///
    /// Returns [`Error::Compile`] or [`Error::Link`] with the driver log on
    /// failure, after releasing every object created so far.
    pub fn from_desc(desc: ShaderPipelineDesc) -> Result<Self> {
        if desc.stages.is_empty() {
            render_bail!(SOURCE, "pipeline needs at least one stage");
        }

        let device_slot = desc.device.clone();
        let mut device = desc.device.lock().unwrap();

        // Compile all stages; abandon everything on the first failure
        let mut stages: Vec<StageHandle> = Vec::with_capacity(desc.stages.len());
        for stage in &desc.stages {
            let outcome = device.compile_stage(stage.kind, &stage.source)?;
            if !outcome.success {
                render_error!(
                    SOURCE,
                    "{:?} stage failed to compile: {}",
                    stage.kind,
                    outcome.log
                );
                let _ = device.delete_stage(outcome.handle);
                for handle in stages.drain(..).rev() {
                    let _ = device.delete_stage(handle);
                }
                return Err(Error::Compile { log: outcome.log });
            }
            stages.push(outcome.handle);
        }

        let program = device.create_program()?;
        for &stage in &stages {
            device.attach_stage(program, stage)?;
        }
        for (slot, name) in &desc.attribute_bindings {
            device.bind_attribute_name(program, *slot, name)?;
        }

        let outcome = device.link_program(program)?;
        if !outcome.success {
            render_error!(SOURCE, "program failed to link: {}", outcome.log);
            for &stage in stages.iter().rev() {
                let _ = device.detach_stage(program, stage);
                let _ = device.delete_stage(stage);
            }
            let _ = device.delete_program(program);
            return Err(Error::Link { log: outcome.log });
        }

        drop(device);
        render_debug!(SOURCE, "linked program with {} stages", stages.len());
        Ok(Self {
            device: device_slot,
            program,
            stages,
            active: false,
            released: false,
        })
    }

    /// Make this pipeline's program the active draw shader
    pub fn activate(&mut self) -> Result<()> {
        if self.released {
            render_bail!(SOURCE, "activate on released pipeline");
        }
        if self.active {
            render_bail!(SOURCE, "activate while already active");
        }
        self.device.lock().unwrap().use_program(self.program)?;
        self.active = true;
        Ok(())
    }

    /// Deactivate the program
    pub fn deactivate(&mut self) -> Result<()> {
        if !self.active {
            render_bail!(SOURCE, "deactivate without a matching activate");
        }
        self.device.lock().unwrap().clear_program();
        self.active = false;
        Ok(())
    }

    /// Release in reverse-acquisition order: detach stages, delete stages,
    /// delete the program. Safe to call more than once.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        if self.active {
            render_warn!(SOURCE, "released while active; deactivating first");
            self.deactivate()?;
        }

        let device = self.device.clone();
        let mut device = device.lock().unwrap();
        for &stage in self.stages.iter().rev() {
            device.detach_stage(self.program, stage)?;
        }
        for stage in self.stages.drain(..).rev() {
            device.delete_stage(stage)?;
        }
        device.delete_program(self.program)?;
        self.released = true;
        render_debug!(SOURCE, "released");
        Ok(())
    }

    // ===== ACCESSORS =====

    /// Number of stages attached to the program
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// True between activate and deactivate
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True once released
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for ShaderPipeline {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.release();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
