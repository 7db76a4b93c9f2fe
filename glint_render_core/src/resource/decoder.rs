//! Image decoding behind a narrow interface.
//!
//! Decoding is an external concern: the texture wrapper consumes a
//! [`DecodedImage`] and never touches the filesystem itself. Tests build
//! images in memory; the demo and real callers go through
//! [`PngFileDecoder`].

use std::path::Path;

use crate::error::{Error, Result};
use crate::render_debug;

/// One decoded image, always RGBA8 with tightly packed rows
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, row-major
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Build an image, validating the pixel byte count against the size
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(Error::InvalidResource(format!(
                "image {}x{} with {} pixel bytes is inconsistent",
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

/// Decodes an image file into RGBA8
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage>;
}

/// PNG decoder backed by the `image` crate.
///
/// Any source color type is converted to RGBA8 during decode.
pub struct PngFileDecoder;

impl ImageDecoder for PngFileDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        let image = image::open(path)
            .map_err(|err| Error::Io(format!("{}: {}", path.display(), err)))?;
        let rgba = image.to_rgba8();
        render_debug!(
            "glint::PngFileDecoder",
            "decoded {} ({}x{})",
            path.display(),
            rgba.width(),
            rgba.height()
        );
        Ok(DecodedImage {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }
}
