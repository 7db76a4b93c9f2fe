/// Headless surface - a windowless presentation target
///
/// Counts presented frames instead of displaying them and reports
/// `should_close` once a configured frame budget is spent. Drives the full
/// application lifecycle in tests and terminal-only demo runs.

use crate::error::{Error, Result};
use crate::render_debug;
use crate::surface::{Surface, SurfaceConfig, SurfaceProvider};

/// Surface that closes itself after a fixed number of presented frames
pub struct HeadlessSurface {
    size: (u32, u32),
    /// Frames left before the surface reports closed; `None` = unlimited
    frames_remaining: Option<u64>,
    frames_presented: u64,
    polls: u64,
    close_requested: bool,
}

impl HeadlessSurface {
    /// Create a headless surface that never closes on its own
    pub fn new(config: &SurfaceConfig) -> Result<Self> {
        Self::with_frame_budget(config, None)
    }

    /// Create a headless surface closing after `budget` presented frames
    pub fn with_frame_budget(config: &SurfaceConfig, budget: Option<u64>) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(Error::Init(format!(
                "surface size {}x{} is degenerate",
                config.width, config.height
            )));
        }
        render_debug!(
            "glint::HeadlessSurface",
            "created {}x{} (budget: {:?})",
            config.width,
            config.height,
            budget
        );
        Ok(Self {
            size: (config.width, config.height),
            frames_remaining: budget,
            frames_presented: 0,
            polls: 0,
            close_requested: false,
        })
    }

    /// Total frames presented so far
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Total poll_events calls so far
    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl Surface for HeadlessSurface {
    fn should_close(&self) -> bool {
        self.close_requested || self.frames_remaining == Some(0)
    }

    fn swap_buffers(&mut self) {
        self.frames_presented += 1;
        if let Some(remaining) = self.frames_remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }

    fn poll_events(&mut self) {
        self.polls += 1;
    }

    fn request_close(&mut self) {
        self.close_requested = true;
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }
}

/// Provider producing headless surfaces with a shared frame budget
pub struct HeadlessProvider {
    budget: Option<u64>,
}

impl HeadlessProvider {
    /// Surfaces from this provider never close on their own
    pub fn new() -> Self {
        Self { budget: None }
    }

    /// Surfaces from this provider close after `frames` presented frames
    pub fn with_frame_budget(frames: u64) -> Self {
        Self {
            budget: Some(frames),
        }
    }
}

impl Default for HeadlessProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceProvider for HeadlessProvider {
    fn create_surface(&mut self, config: &SurfaceConfig) -> Result<Box<dyn Surface>> {
        Ok(Box::new(HeadlessSurface::with_frame_budget(
            config,
            self.budget,
        )?))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "headless_tests.rs"]
mod tests;
