/*!
# Glint Render Core

A small GPU-resource lifecycle core: surface creation, geometry upload,
shader compilation and linking, texture upload, and a deterministic
per-frame render/timing loop, composed into one configurable pipeline.

The graphics driver itself is out of scope and consumed through the
[`device::GraphicsDevice`] trait; a state-tracking [`device::TraceDevice`]
ships with the crate for tests and headless runs. Windowing is likewise
consumed through the [`surface::Surface`] trait, with a headless and a
winit-backed implementation provided.

## Architecture

- **GraphicsDevice**: allocation/bind/release protocol for GPU objects
- **GeometryBuffer**: vertex attribute streams + optional index stream
- **ShaderPipeline**: compiled stages linked into one program
- **Texture**: one decoded image with sampling parameters
- **RenderPipeline**: the composed drawable unit and its bind/draw/unbind cycle
- **Application**: init → loop → teardown lifecycle
*/

// Internal modules
mod error;
mod app;
pub mod log;
pub mod clock;
pub mod device;
pub mod surface;
pub mod resource;
pub mod pipeline;

// Main glint namespace module
pub mod glint {
    // Error types
    pub use crate::error::{Error, Result};

    // Application lifecycle
    pub use crate::app::{AppConfig, AppState, Application, RateMonitor};

    // Frame timing
    pub use crate::clock::FrameClock;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
        // Note: render_* macros are NOT re-exported here - they live at the crate root
    }

    // Device protocol sub-module
    pub mod device {
        pub use crate::device::*;
    }

    // Surface sub-module
    pub mod surface {
        pub use crate::surface::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Pipeline sub-module
    pub mod pipeline {
        pub use crate::pipeline::*;
    }
}
