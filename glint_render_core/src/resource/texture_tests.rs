//! Unit tests for texture.rs
//!
//! Uses in-memory images; file decoding is covered by the decoder itself.

use std::sync::{Arc, Mutex};

use crate::device::{GraphicsDevice, MagFilter, MinFilter, SamplingDesc, TraceDevice, WrapMode};
use crate::error::Error;
use crate::resource::{DecodedImage, Texture, TextureDesc};

fn trace_device() -> (Arc<Mutex<TraceDevice>>, Arc<Mutex<dyn GraphicsDevice>>) {
    let device = Arc::new(Mutex::new(TraceDevice::new()));
    let dyn_device: Arc<Mutex<dyn GraphicsDevice>> = device.clone();
    (device, dyn_device)
}

/// 4x4 checkerboard, RGBA8
fn checkerboard() -> DecodedImage {
    let mut pixels = Vec::with_capacity(4 * 4 * 4);
    for y in 0..4u32 {
        for x in 0..4u32 {
            let on = (x + y) % 2 == 0;
            let value = if on { 255 } else { 0 };
            pixels.extend_from_slice(&[value, value, value, 255]);
        }
    }
    DecodedImage::new(4, 4, pixels).unwrap()
}

fn texture_desc(device: Arc<Mutex<dyn GraphicsDevice>>, unit: u32) -> TextureDesc {
    TextureDesc {
        device,
        image: checkerboard(),
        unit,
        sampling: SamplingDesc::default(),
        generate_mipmaps: true,
    }
}

// ============================================================================
// CREATION TESTS
// ============================================================================

#[test]
fn test_creation_uploads_and_configures() {
    let (trace, device) = trace_device();
    let texture = Texture::from_desc(texture_desc(device, 0)).unwrap();

    assert_eq!(texture.width(), 4);
    assert_eq!(texture.height(), 4);
    assert_eq!(texture.unit(), 0);

    let trace = trace.lock().unwrap();
    assert_eq!(trace.alive_textures(), 1);
    assert!(trace.is_unbound());
}

#[test]
fn test_creation_applies_default_sampling() {
    let (trace, device) = trace_device();
    let _texture = Texture::from_desc(texture_desc(device, 0)).unwrap();

    let trace = trace.lock().unwrap();
    let calls = trace.calls();
    let upload = calls
        .iter()
        .position(|c| c.starts_with("upload_texture"))
        .unwrap();
    let mipmaps = calls.iter().position(|c| c == "generate_mipmaps").unwrap();
    let sampling = calls.iter().position(|c| c == "set_sampling").unwrap();
    assert!(upload < mipmaps);
    assert!(mipmaps < sampling);
}

#[test]
fn test_creation_without_mipmaps() {
    let (trace, device) = trace_device();
    let desc = TextureDesc {
        sampling: SamplingDesc {
            wrap: WrapMode::ClampToEdge,
            min_filter: MinFilter::Linear,
            mag_filter: MagFilter::Linear,
        },
        generate_mipmaps: false,
        ..texture_desc(device, 0)
    };
    let texture = Texture::from_desc(desc).unwrap();

    assert_eq!(texture.sampling().wrap, WrapMode::ClampToEdge);
    let trace = trace.lock().unwrap();
    assert!(!trace.calls().iter().any(|c| c == "generate_mipmaps"));
}

#[test]
fn test_inconsistent_image_rejected() {
    let (trace, device) = trace_device();
    let result = Texture::from_desc(TextureDesc {
        device,
        image: DecodedImage {
            width: 4,
            height: 4,
            pixels: vec![0u8; 7],
        },
        unit: 0,
        sampling: SamplingDesc::default(),
        generate_mipmaps: true,
    });

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert_eq!(trace.lock().unwrap().alive_textures(), 0);
}

#[test]
fn test_decoded_image_validation() {
    assert!(DecodedImage::new(2, 2, vec![0u8; 16]).is_ok());
    assert!(DecodedImage::new(2, 2, vec![0u8; 12]).is_err());
    assert!(DecodedImage::new(0, 2, vec![]).is_err());
}

// ============================================================================
// BIND / UNBIND TESTS
// ============================================================================

#[test]
fn test_bind_targets_own_unit() {
    let (trace, device) = trace_device();
    let mut texture = Texture::from_desc(texture_desc(device, 1)).unwrap();

    texture.bind().unwrap();
    assert!(texture.is_bound());
    assert!(trace.lock().unwrap().bound_texture(1).is_some());

    texture.unbind().unwrap();
    assert!(trace.lock().unwrap().is_unbound());
}

#[test]
fn test_two_textures_on_distinct_units() {
    let (trace, device) = trace_device();
    let mut first = Texture::from_desc(texture_desc(device.clone(), 0)).unwrap();
    let mut second = Texture::from_desc(texture_desc(device, 1)).unwrap();

    first.bind().unwrap();
    second.bind().unwrap();
    {
        let trace = trace.lock().unwrap();
        assert!(trace.bound_texture(0).is_some());
        assert!(trace.bound_texture(1).is_some());
        assert_ne!(trace.bound_texture(0), trace.bound_texture(1));
    }

    second.unbind().unwrap();
    first.unbind().unwrap();
    assert!(trace.lock().unwrap().is_unbound());
}

#[test]
fn test_nested_bind_rejected() {
    let (_trace, device) = trace_device();
    let mut texture = Texture::from_desc(texture_desc(device, 0)).unwrap();

    texture.bind().unwrap();
    assert!(texture.bind().is_err());
}

#[test]
fn test_unbind_without_bind_rejected() {
    let (_trace, device) = trace_device();
    let mut texture = Texture::from_desc(texture_desc(device, 0)).unwrap();
    assert!(texture.unbind().is_err());
}

// ============================================================================
// RELEASE TESTS
// ============================================================================

#[test]
fn test_release_deletes_texture() {
    let (trace, device) = trace_device();
    let mut texture = Texture::from_desc(texture_desc(device, 0)).unwrap();

    texture.release().unwrap();
    assert!(texture.is_released());
    assert_eq!(trace.lock().unwrap().alive_textures(), 0);
}

#[test]
fn test_release_is_idempotent() {
    let (trace, device) = trace_device();
    let mut texture = Texture::from_desc(texture_desc(device, 0)).unwrap();

    texture.release().unwrap();
    texture.release().unwrap();
    assert_eq!(trace.lock().unwrap().alive_textures(), 0);
}

#[test]
fn test_release_while_bound_unbinds_first() {
    let (trace, device) = trace_device();
    let mut texture = Texture::from_desc(texture_desc(device, 1)).unwrap();

    texture.bind().unwrap();
    texture.release().unwrap();

    let trace = trace.lock().unwrap();
    assert!(trace.is_unbound());
    assert_eq!(trace.alive_textures(), 0);
}

#[test]
fn test_bind_after_release_rejected() {
    let (_trace, device) = trace_device();
    let mut texture = Texture::from_desc(texture_desc(device, 0)).unwrap();

    texture.release().unwrap();
    assert!(texture.bind().is_err());
}

#[test]
fn test_drop_releases_texture() {
    let (trace, device) = trace_device();
    {
        let _texture = Texture::from_desc(texture_desc(device, 0)).unwrap();
    }
    assert_eq!(trace.lock().unwrap().alive_textures(), 0);
}
