/// Surface trait and configuration
///
/// A surface is the presentation target plus its event source. The core
/// drives it with exactly three calls per frame (`swap_buffers`,
/// `poll_events`, `should_close`) and releases it by drop, after all device
/// resources are gone.

use crate::error::Result;

/// Presentation timing for [`Surface::swap_buffers`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapInterval {
    /// Present as fast as possible
    Immediate,
    /// Synchronize presentation to the display refresh
    Vsync,
}

/// Descriptor for creating a surface.
///
/// Defaults: a 300x300 fixed-size window,
/// vsync on, centered on the primary monitor.
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    /// Drawable width in pixels (must be non-zero)
    pub width: u32,
    /// Drawable height in pixels (must be non-zero)
    pub height: u32,
    /// Window title
    pub title: String,
    /// Whether the user may resize the window
    pub resizable: bool,
    /// Presentation timing
    pub swap_interval: SwapInterval,
    /// Center the window on the primary monitor after creation
    pub centered: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            title: "glint".to_string(),
            resizable: false,
            swap_interval: SwapInterval::Vsync,
            centered: true,
        }
    }
}

/// One presentation target and its event source
pub trait Surface {
    /// True once the surface has been asked to close (close button,
    /// frame budget exhausted, or [`request_close`](Self::request_close))
    fn should_close(&self) -> bool;

    /// Present the current frame
    fn swap_buffers(&mut self);

    /// Process pending surface events without blocking
    fn poll_events(&mut self);

    /// Ask the surface to close; takes effect at the next
    /// [`should_close`](Self::should_close) check
    fn request_close(&mut self);

    /// Current drawable size in pixels
    fn size(&self) -> (u32, u32);
}

/// Factory for surfaces; lets the application stay backend-agnostic
pub trait SurfaceProvider {
    /// Create a surface for the given configuration.
    ///
    /// Fails with [`Error::Init`](crate::glint::Error::Init) when the
    /// configuration is invalid or the backend cannot create the window.
    fn create_surface(&mut self, config: &SurfaceConfig) -> Result<Box<dyn Surface>>;
}
