//! Textures.
//!
//! A `Texture` owns one device texture object populated from a decoded
//! image: create, activate the target unit, upload (RGB device storage
//! from RGBA source bytes), generate the mipmap chain, set sampling
//! parameters, unbind. Binding is scoped to the unit chosen at creation,
//! so several textures coexist on distinct units.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::device::{
    GraphicsDevice, PixelFormat, SamplingDesc, TextureHandle, TextureUploadDesc,
};
use crate::error::Result;
use crate::resource::decoder::{DecodedImage, ImageDecoder};
use crate::{render_bail, render_debug, render_warn};

const SOURCE: &str = "glint::Texture";

/// Descriptor for creating a [`Texture`]
pub struct TextureDesc {
    pub device: Arc<Mutex<dyn GraphicsDevice>>,
    /// Decoded RGBA8 source image
    pub image: DecodedImage,
    /// Texture unit this texture binds to
    pub unit: u32,
    /// Wrap and filter parameters
    pub sampling: SamplingDesc,
    /// Generate the mipmap chain after upload (required by mipmapped
    /// minification filters)
    pub generate_mipmaps: bool,
}

/// One uploaded device texture with its sampling parameters
pub struct Texture {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    handle: TextureHandle,
    width: u32,
    height: u32,
    unit: u32,
    sampling: SamplingDesc,
    bound: bool,
    released: bool,
}

impl Texture {
    /// Create and populate a device texture from a decoded image
    pub fn from_desc(desc: TextureDesc) -> Result<Self> {
        let expected = desc.image.width as usize * desc.image.height as usize * 4;
        if desc.image.width == 0 || desc.image.height == 0 || desc.image.pixels.len() != expected
        {
            render_bail!(
                SOURCE,
                "image {}x{} with {} pixel bytes is inconsistent",
                desc.image.width,
                desc.image.height,
                desc.image.pixels.len()
            );
        }

        let device_slot = desc.device.clone();
        let mut device = desc.device.lock().unwrap();

        let handle = device.create_texture()?;
        device.set_active_texture_unit(desc.unit);
        let populate: Result<()> = (|| {
            device.bind_texture(handle)?;
            device.upload_texture(TextureUploadDesc {
                width: desc.image.width,
                height: desc.image.height,
                internal_format: PixelFormat::Rgb,
                source_format: PixelFormat::Rgba,
                pixels: desc.image.pixels.clone(),
            })?;
            if desc.generate_mipmaps {
                device.generate_mipmaps()?;
            }
            device.set_sampling(desc.sampling)?;
            device.unbind_texture();
            Ok(())
        })();
        if desc.unit != 0 {
            device.set_active_texture_unit(0);
        }
        if let Err(err) = populate {
            let _ = device.delete_texture(handle);
            return Err(err);
        }
        drop(device);

        render_debug!(
            SOURCE,
            "created {}x{} on unit {}",
            desc.image.width,
            desc.image.height,
            desc.unit
        );
        Ok(Self {
            device: device_slot,
            handle,
            width: desc.image.width,
            height: desc.image.height,
            unit: desc.unit,
            sampling: desc.sampling,
            bound: false,
            released: false,
        })
    }

    /// Decode an image file and create the texture from it
    pub fn from_file(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        decoder: &dyn ImageDecoder,
        path: &Path,
        unit: u32,
        sampling: SamplingDesc,
    ) -> Result<Self> {
        let image = decoder.decode(path)?;
        Self::from_desc(TextureDesc {
            device,
            image,
            unit,
            sampling,
            generate_mipmaps: true,
        })
    }

    /// Bind this texture to its unit
    pub fn bind(&mut self) -> Result<()> {
        if self.released {
            render_bail!(SOURCE, "bind on released texture");
        }
        if self.bound {
            render_bail!(SOURCE, "bind while already bound");
        }
        let device = self.device.clone();
        let mut device = device.lock().unwrap();
        device.set_active_texture_unit(self.unit);
        device.bind_texture(self.handle)?;
        self.bound = true;
        Ok(())
    }

    /// Unbind this texture from its unit
    pub fn unbind(&mut self) -> Result<()> {
        if !self.bound {
            render_bail!(SOURCE, "unbind without a matching bind");
        }
        let device = self.device.clone();
        let mut device = device.lock().unwrap();
        device.set_active_texture_unit(self.unit);
        device.unbind_texture();
        if self.unit != 0 {
            device.set_active_texture_unit(0);
        }
        self.bound = false;
        Ok(())
    }

    /// Delete the device texture. Safe to call more than once.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        if self.bound {
            render_warn!(SOURCE, "released while still bound; unbinding first");
            self.unbind()?;
        }
        self.device.lock().unwrap().delete_texture(self.handle)?;
        self.released = true;
        render_debug!(SOURCE, "released");
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The texture unit this texture binds to
    pub fn unit(&self) -> u32 {
        self.unit
    }

    /// The sampling parameters set at creation
    pub fn sampling(&self) -> SamplingDesc {
        self.sampling
    }

    /// True between bind and unbind
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// True once released
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Drop for Texture {
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
#[path = "texture_tests.rs"]
mod tests;
