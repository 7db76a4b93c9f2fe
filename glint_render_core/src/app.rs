//! Application lifecycle.
//!
//! An `Application` owns the surface, the render pipeline, and the frame
//! clock, and drives the init, loop, teardown lifecycle. The pipeline is
//! composed by a caller-provided build closure, so programs differ only in
//! what they compose, never in how the loop runs.
//!
//! Init failures are fatal for the session: the application cleans up
//! whatever was already created and lands in `Terminated`. The loop always
//! tears down on exit, normal or not.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clock::FrameClock;
use crate::device::{ClearMask, GraphicsDevice};
use crate::error::Result;
use crate::pipeline::RenderPipeline;
use crate::surface::{Surface, SurfaceConfig, SurfaceProvider};
use crate::{render_bail, render_error, render_info};

const SOURCE: &str = "glint::Application";

/// Which rate sample the loop reports once per clock window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateMonitor {
    /// Frames completed per window
    FramesPerSecond,
    /// Average milliseconds spent per frame
    MillisPerFrame,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub surface: SurfaceConfig,
    /// Clear color set once at init
    pub clear_color: [f32; 4],
    /// Frame-buffer aspects cleared each iteration
    pub clear_mask: ClearMask,
    pub monitor: RateMonitor,
    /// Clock sampling window
    pub sample_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            clear_color: [0.4, 0.6, 0.9, 0.0],
            clear_mask: ClearMask::COLOR | ClearMask::DEPTH,
            monitor: RateMonitor::FramesPerSecond,
            sample_interval: Duration::from_secs(1),
        }
    }
}

/// Application lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Uninitialized,
    Initialized,
    Running,
    Terminated,
}

/// Owns one surface, one pipeline, one clock; runs the session
pub struct Application {
    config: AppConfig,
    device: Arc<Mutex<dyn GraphicsDevice>>,
    provider: Box<dyn SurfaceProvider>,
    surface: Option<Box<dyn Surface>>,
    pipeline: Option<RenderPipeline>,
    clock: FrameClock,
    state: AppState,
}

impl Application {
    /// Build an application in the `Uninitialized` state
    pub fn new(
        config: AppConfig,
        device: Arc<Mutex<dyn GraphicsDevice>>,
        provider: Box<dyn SurfaceProvider>,
    ) -> Self {
        let clock = FrameClock::with_interval(config.sample_interval);
        Self {
            config,
            device,
            provider,
            surface: None,
            pipeline: None,
            clock,
            state: AppState::Uninitialized,
        }
    }

    /// Create the surface and compose the pipeline.
    ///
    /// `build` receives the shared device and returns the composed
    /// pipeline; what it composes is the program's entire identity. Any
    /// failure here is fatal: already-created resources are cleaned up and
    /// the application lands in `Terminated`.
    pub fn init<F>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce(Arc<Mutex<dyn GraphicsDevice>>) -> Result<RenderPipeline>,
    {
        if self.state != AppState::Uninitialized {
            render_bail!(SOURCE, "init in state {:?}", self.state);
        }

        let surface = match self.provider.create_surface(&self.config.surface) {
            Ok(surface) => surface,
            Err(err) => {
                render_error!(SOURCE, "surface creation failed: {}", err);
                self.state = AppState::Terminated;
                return Err(err);
            }
        };
        self.surface = Some(surface);

        self.device
            .lock()
            .unwrap()
            .set_clear_color(self.config.clear_color);

        match build(self.device.clone()) {
            Ok(pipeline) => self.pipeline = Some(pipeline),
            Err(err) => {
                render_error!(SOURCE, "pipeline composition failed: {}", err);
                self.surface = None;
                self.state = AppState::Terminated;
                return Err(err);
            }
        }

        self.state = AppState::Initialized;
        render_info!(SOURCE, "initialized");
        Ok(())
    }

    /// Run the loop until the surface asks to close, then tear down.
    ///
    /// Teardown runs even when an iteration fails; the first error wins.
    pub fn run(&mut self) -> Result<()> {
        if self.state != AppState::Initialized {
            render_bail!(SOURCE, "run in state {:?}", self.state);
        }
        self.state = AppState::Running;

        let outcome = self.run_loop();
        let teardown = self.teardown();
        outcome?;
        teardown
    }

    /// One clear, draw, swap, poll, tick iteration per pass
    fn run_loop(&mut self) -> Result<()> {
        while let Some(surface) = self.surface.as_mut() {
            if surface.should_close() {
                return Ok(());
            }

            self.device.lock().unwrap().clear(self.config.clear_mask);

            if let Some(pipeline) = self.pipeline.as_mut() {
                pipeline.draw()?;
            }

            if let Some(surface) = self.surface.as_mut() {
                surface.swap_buffers();
                surface.poll_events();
            }

            match self.config.monitor {
                RateMonitor::FramesPerSecond => {
                    if let Some(frames) = self.clock.tick() {
                        render_info!(SOURCE, "{} fps", frames);
                    }
                }
                RateMonitor::MillisPerFrame => {
                    if let Some(ms) = self.clock.tick_processing_time() {
                        render_info!(SOURCE, "{:.3} ms per frame", ms);
                    }
                }
            }
        }
        render_bail!(SOURCE, "loop without a surface")
    }

    /// Release the pipeline, then drop the surface. The surface goes away
    /// even when a release fails.
    fn teardown(&mut self) -> Result<()> {
        let released = match self.pipeline.take() {
            Some(mut pipeline) => pipeline.release(),
            None => Ok(()),
        };
        self.surface = None;
        self.state = AppState::Terminated;
        render_info!(SOURCE, "terminated");
        released
    }

    // ===== ACCESSORS =====

    /// Current lifecycle state
    pub fn state(&self) -> AppState {
        self.state
    }

    /// The shared graphics device
    pub fn device(&self) -> &Arc<Mutex<dyn GraphicsDevice>> {
        &self.device
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
