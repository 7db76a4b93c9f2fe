//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone,
//! std::error::Error), plus the render_err!/render_bail! macros.

use crate::error::{Error, Result};
use crate::{render_bail, render_err};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_init_error_display() {
    let err = Error::Init("surface creation failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Initialization failed"));
    assert!(display.contains("surface creation failed"));
}

#[test]
fn test_compile_error_display() {
    let err = Error::Compile {
        log: "0:12: syntax error".to_string(),
    };
    let display = format!("{}", err);
    assert!(display.contains("Shader compilation failed"));
    assert!(display.contains("0:12: syntax error"));
}

#[test]
fn test_link_error_display() {
    let err = Error::Link {
        log: "missing fragment stage".to_string(),
    };
    let display = format!("{}", err);
    assert!(display.contains("Program link failed"));
    assert!(display.contains("missing fragment stage"));
}

#[test]
fn test_allocation_error_display() {
    let err = Error::Allocation("buffer object creation failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Device allocation failed"));
}

#[test]
fn test_io_error_display() {
    let err = Error::Io("image.png: no such file".to_string());
    let display = format!("{}", err);
    assert!(display.contains("IO error"));
    assert!(display.contains("image.png"));
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("stream slot 2 already registered".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("slot 2"));
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::Init("test".to_string());
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    let err = Error::Compile {
        log: "test".to_string(),
    };
    let debug = format!("{:?}", err);
    assert!(debug.contains("Compile"));
}

#[test]
fn test_error_clone() {
    let err1 = Error::Link {
        log: "link log".to_string(),
    };
    let err2 = err1.clone();
    assert_eq!(format!("{}", err1), format!("{}", err2));
}

// ============================================================================
// RESULT TYPE TESTS
// ============================================================================

#[test]
fn test_result_ok() {
    let result: Result<u32> = Ok(7);
    assert_eq!(result.unwrap(), 7);
}

#[test]
fn test_result_err_propagates() {
    fn inner() -> Result<()> {
        Err(Error::Io("unreadable".to_string()))
    }
    fn outer() -> Result<()> {
        inner()?;
        Ok(())
    }
    assert!(matches!(outer(), Err(Error::Io(_))));
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
fn test_render_err_builds_invalid_resource() {
    let err = render_err!("glint::Test", "slot {} already registered", 2);
    match err {
        Error::InvalidResource(msg) => assert_eq!(msg, "slot 2 already registered"),
        other => panic!("unexpected variant: {:?}", other),
    }
}

#[test]
fn test_render_bail_returns_early() {
    fn fails() -> Result<u32> {
        render_bail!("glint::Test", "always bails");
    }
    assert!(matches!(fails(), Err(Error::InvalidResource(_))));
}
