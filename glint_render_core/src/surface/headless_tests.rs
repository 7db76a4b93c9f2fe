//! Unit tests for headless.rs

use crate::error::Error;
use crate::surface::{HeadlessProvider, HeadlessSurface, Surface, SurfaceConfig, SurfaceProvider};

#[test]
fn test_default_config_dimensions() {
    let config = SurfaceConfig::default();
    assert_eq!(config.width, 300);
    assert_eq!(config.height, 300);
    assert!(!config.resizable);
    assert!(config.centered);

    let surface = HeadlessSurface::new(&config).unwrap();
    assert_eq!(surface.size(), (300, 300));
}

#[test]
fn test_degenerate_size_rejected() {
    let config = SurfaceConfig {
        width: 0,
        ..SurfaceConfig::default()
    };
    assert!(matches!(
        HeadlessSurface::new(&config),
        Err(Error::Init(_))
    ));
}

#[test]
fn test_unbudgeted_surface_never_closes() {
    let config = SurfaceConfig::default();
    let mut surface = HeadlessSurface::new(&config).unwrap();

    for _ in 0..100 {
        assert!(!surface.should_close());
        surface.swap_buffers();
        surface.poll_events();
    }
    assert_eq!(surface.frames_presented(), 100);
    assert_eq!(surface.polls(), 100);
}

#[test]
fn test_frame_budget_closes_surface() {
    let config = SurfaceConfig::default();
    let mut surface = HeadlessSurface::with_frame_budget(&config, Some(3)).unwrap();

    for _ in 0..3 {
        assert!(!surface.should_close());
        surface.swap_buffers();
    }
    assert!(surface.should_close());
    assert_eq!(surface.frames_presented(), 3);
}

#[test]
fn test_request_close_takes_effect() {
    let config = SurfaceConfig::default();
    let mut surface = HeadlessSurface::new(&config).unwrap();

    assert!(!surface.should_close());
    surface.request_close();
    assert!(surface.should_close());
}

#[test]
fn test_provider_applies_budget() {
    let mut provider = HeadlessProvider::with_frame_budget(1);
    let mut surface = provider.create_surface(&SurfaceConfig::default()).unwrap();

    assert!(!surface.should_close());
    surface.swap_buffers();
    assert!(surface.should_close());
}
