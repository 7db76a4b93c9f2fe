//! Unit tests for shader.rs

use std::sync::{Arc, Mutex};

use crate::device::{GraphicsDevice, StageKind, TraceDevice};
use crate::error::Error;
use crate::resource::{ShaderPipeline, ShaderPipelineDesc, StageDesc};

fn trace_device() -> (Arc<Mutex<TraceDevice>>, Arc<Mutex<dyn GraphicsDevice>>) {
    let device = Arc::new(Mutex::new(TraceDevice::new()));
    let dyn_device: Arc<Mutex<dyn GraphicsDevice>> = device.clone();
    (device, dyn_device)
}

const VERTEX_SRC: &str = "#version 150\nin vec4 in_Position;\nvoid main() { gl_Position = in_Position; }";
const FRAGMENT_SRC: &str = "#version 150\nout vec4 out_Color;\nvoid main() { out_Color = vec4(1.0); }";

fn quad_pipeline_desc(device: Arc<Mutex<dyn GraphicsDevice>>) -> ShaderPipelineDesc {
    ShaderPipelineDesc {
        device,
        stages: vec![
            StageDesc {
                kind: StageKind::Vertex,
                source: VERTEX_SRC.to_string(),
            },
            StageDesc {
                kind: StageKind::Fragment,
                source: FRAGMENT_SRC.to_string(),
            },
        ],
        attribute_bindings: vec![
            (0, "in_Position".to_string()),
            (1, "in_Color".to_string()),
            (2, "in_TextureCoord".to_string()),
        ],
    }
}

// ============================================================================
// CREATION TESTS
// ============================================================================

#[test]
fn test_creation_compiles_and_links() {
    let (trace, device) = trace_device();
    let pipeline = ShaderPipeline::from_desc(quad_pipeline_desc(device)).unwrap();

    assert_eq!(pipeline.stage_count(), 2);
    let trace = trace.lock().unwrap();
    assert_eq!(trace.alive_stages(), 2);
    assert_eq!(trace.alive_programs(), 1);
}

#[test]
fn test_attribute_bindings_applied_before_link() {
    let (trace, device) = trace_device();
    let _pipeline = ShaderPipeline::from_desc(quad_pipeline_desc(device)).unwrap();

    let trace = trace.lock().unwrap();
    let calls = trace.calls();
    let bind_pos = calls
        .iter()
        .position(|c| c.starts_with("bind_attribute_name(0"))
        .unwrap();
    let link_pos = calls
        .iter()
        .position(|c| c.starts_with("link_program"))
        .unwrap();
    assert!(bind_pos < link_pos);
}

#[test]
fn test_compile_failure_is_fatal_and_leaks_nothing() {
    let (trace, device) = trace_device();
    let result = ShaderPipeline::from_desc(ShaderPipelineDesc {
        device,
        stages: vec![
            StageDesc {
                kind: StageKind::Vertex,
                source: "#version 150\n#error broken".to_string(),
            },
            StageDesc {
                kind: StageKind::Fragment,
                source: FRAGMENT_SRC.to_string(),
            },
        ],
        attribute_bindings: vec![],
    });

    match result {
        Err(Error::Compile { log }) => assert!(!log.is_empty()),
        other => panic!("expected compile error, got {:?}", other.map(|_| ())),
    }
    let trace = trace.lock().unwrap();
    assert_eq!(trace.alive_stages(), 0);
    assert_eq!(trace.alive_programs(), 0);
}

#[test]
fn test_link_failure_is_fatal_and_leaks_nothing() {
    let (trace, device) = trace_device();
    // No fragment stage: the link must fail
    let result = ShaderPipeline::from_desc(ShaderPipelineDesc {
        device,
        stages: vec![StageDesc {
            kind: StageKind::Vertex,
            source: VERTEX_SRC.to_string(),
        }],
        attribute_bindings: vec![],
    });

    match result {
        Err(Error::Link { log }) => assert!(!log.is_empty()),
        other => panic!("expected link error, got {:?}", other.map(|_| ())),
    }
    let trace = trace.lock().unwrap();
    assert_eq!(trace.alive_stages(), 0);
    assert_eq!(trace.alive_programs(), 0);
}

#[test]
fn test_empty_stage_list_rejected() {
    let (_trace, device) = trace_device();
    let result = ShaderPipeline::from_desc(ShaderPipelineDesc {
        device,
        stages: vec![],
        attribute_bindings: vec![],
    });
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

// ============================================================================
// ACTIVATE / DEACTIVATE TESTS
// ============================================================================

#[test]
fn test_activate_uses_program() {
    let (trace, device) = trace_device();
    let mut pipeline = ShaderPipeline::from_desc(quad_pipeline_desc(device)).unwrap();

    pipeline.activate().unwrap();
    assert!(pipeline.is_active());
    assert!(trace.lock().unwrap().active_program().is_some());

    pipeline.deactivate().unwrap();
    assert!(!pipeline.is_active());
    assert!(trace.lock().unwrap().active_program().is_none());
}

#[test]
fn test_double_activate_rejected() {
    let (_trace, device) = trace_device();
    let mut pipeline = ShaderPipeline::from_desc(quad_pipeline_desc(device)).unwrap();

    pipeline.activate().unwrap();
    assert!(pipeline.activate().is_err());
}

#[test]
fn test_deactivate_without_activate_rejected() {
    let (_trace, device) = trace_device();
    let mut pipeline = ShaderPipeline::from_desc(quad_pipeline_desc(device)).unwrap();
    assert!(pipeline.deactivate().is_err());
}

#[test]
fn test_activate_after_release_rejected() {
    let (_trace, device) = trace_device();
    let mut pipeline = ShaderPipeline::from_desc(quad_pipeline_desc(device)).unwrap();

    pipeline.release().unwrap();
    assert!(pipeline.activate().is_err());
}

// ============================================================================
// RELEASE TESTS
// ============================================================================

#[test]
fn test_release_order_detach_then_delete() {
    let (trace, device) = trace_device();
    let mut pipeline = ShaderPipeline::from_desc(quad_pipeline_desc(device)).unwrap();

    pipeline.release().unwrap();

    let trace = trace.lock().unwrap();
    assert_eq!(trace.alive_stages(), 0);
    assert_eq!(trace.alive_programs(), 0);

    // Stages detach before any deletion; the program goes last
    let calls = trace.calls();
    let last_detach = calls.iter().rposition(|c| c == "detach_stage").unwrap();
    let first_stage_delete = calls.iter().position(|c| c == "delete_stage").unwrap();
    let program_delete = calls.iter().position(|c| c == "delete_program").unwrap();
    assert!(last_detach < first_stage_delete);
    assert!(first_stage_delete < program_delete);
}

#[test]
fn test_release_is_idempotent() {
    let (trace, device) = trace_device();
    let mut pipeline = ShaderPipeline::from_desc(quad_pipeline_desc(device)).unwrap();

    pipeline.release().unwrap();
    pipeline.release().unwrap();
    assert_eq!(trace.lock().unwrap().alive_programs(), 0);
}

#[test]
fn test_release_while_active_deactivates_first() {
    let (trace, device) = trace_device();
    let mut pipeline = ShaderPipeline::from_desc(quad_pipeline_desc(device)).unwrap();

    pipeline.activate().unwrap();
    pipeline.release().unwrap();
    assert!(trace.lock().unwrap().active_program().is_none());
}

#[test]
fn test_drop_releases_program() {
    let (trace, device) = trace_device();
    {
        let _pipeline = ShaderPipeline::from_desc(quad_pipeline_desc(device)).unwrap();
    }
    let trace = trace.lock().unwrap();
    assert_eq!(trace.alive_stages(), 0);
    assert_eq!(trace.alive_programs(), 0);
}
