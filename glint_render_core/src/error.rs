//! Error types for the glint render core
//!
//! This module defines the error taxonomy used throughout the core:
//! surface/context initialization, shader compile/link, device allocation,
//! image or shader file IO, and descriptor/state validation. No error in
//! this core is retried; init-phase failures are fatal for the session.

use std::fmt;

/// Result type for render core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Render core errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Surface/context creation failure (always fatal, before the loop starts)
    Init(String),

    /// Shader stage failed to compile; carries the driver's compile log
    Compile { log: String },

    /// Shader program failed to link; carries the driver's link log
    Link { log: String },

    /// Device buffer/texture/program creation failure
    Allocation(String),

    /// Image or shader file unreadable
    Io(String),

    /// Invalid resource descriptor or lifecycle state
    InvalidResource(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Init(msg) => write!(f, "Initialization failed: {}", msg),
            Error::Compile { log } => write!(f, "Shader compilation failed: {}", log),
            Error::Link { log } => write!(f, "Program link failed: {}", log),
            Error::Allocation(msg) => write!(f, "Device allocation failed: {}", msg),
            Error::Io(msg) => write!(f, "IO error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an `Error::InvalidResource`, logging it through the render logger
///
/// # Example
///
/// ```ignore
/// let err = render_err!("glint::GeometryBuffer", "slot {} already registered", 2);
/// ```
#[macro_export]
macro_rules! render_err {
    ($source:expr, $($arg:tt)*) => {{
        $crate::render_error!($source, $($arg)*);
        $crate::glint::Error::InvalidResource(format!($($arg)*))
    }};
}

/// Return early with an `Error::InvalidResource`, logging it first
///
/// # Example
///
/// ```ignore
/// render_bail!("glint::GeometryBuffer", "slot {} already registered", 2);
/// ```
#[macro_export]
macro_rules! render_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::render_err!($source, $($arg)*))
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
