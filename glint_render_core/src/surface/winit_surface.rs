/// Winit-backed surface
///
/// Wraps a real window behind the [`Surface`] trait using winit's
/// pump-events mode, so the application loop keeps control and polls the
/// event queue once per frame instead of handing the thread to the event
/// loop.
///
/// The graphics context itself is out of scope here; `swap_buffers` maps to
/// a redraw request and the configured swap interval is recorded for the
/// backend that owns the context.

use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::EventLoopExtPumpEvents;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::error::{Error, Result};
use crate::render_info;
use crate::surface::{Surface, SurfaceConfig, SurfaceProvider, SwapInterval};

/// ApplicationHandler state driven by each pump
struct WindowDriver {
    /// Taken by `resumed` when the window is created
    attributes: Option<WindowAttributes>,
    window: Option<Window>,
    centered: bool,
    close_requested: bool,
    init_error: Option<String>,
}

impl WindowDriver {
    fn center_on_primary(&self, window: &Window, event_loop: &ActiveEventLoop) {
        let Some(monitor) = event_loop.primary_monitor() else {
            return;
        };
        let monitor_pos = monitor.position();
        let monitor_size = monitor.size();
        let window_size = window.outer_size();
        let x = monitor_pos.x + (monitor_size.width.saturating_sub(window_size.width) / 2) as i32;
        let y = monitor_pos.y + (monitor_size.height.saturating_sub(window_size.height) / 2) as i32;
        window.set_outer_position(PhysicalPosition::new(x, y));
    }
}

impl ApplicationHandler for WindowDriver {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(attributes) = self.attributes.take() else {
            return;
        };
        match event_loop.create_window(attributes) {
            Ok(window) => {
                if self.centered {
                    self.center_on_primary(&window, event_loop);
                }
                self.window = Some(window);
            }
            Err(err) => {
                self.init_error = Some(err.to_string());
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            self.close_requested = true;
        }
    }
}

/// Real window surface, polled once per frame
pub struct WinitSurface {
    event_loop: EventLoop<()>,
    driver: WindowDriver,
    size: (u32, u32),
    swap_interval: SwapInterval,
}

impl WinitSurface {
    /// Create the window and pump the event loop until it exists
    pub fn new(config: &SurfaceConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(Error::Init(format!(
                "surface size {}x{} is degenerate",
                config.width, config.height
            )));
        }

        let mut event_loop = EventLoop::new()
            .map_err(|err| Error::Init(format!("event loop creation failed: {}", err)))?;

        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64))
            .with_resizable(config.resizable);

        let mut driver = WindowDriver {
            attributes: Some(attributes),
            window: None,
            centered: config.centered,
            close_requested: false,
            init_error: None,
        };

        // First pump delivers `resumed`, which creates the window
        event_loop.pump_app_events(Some(Duration::ZERO), &mut driver);

        if let Some(err) = driver.init_error.take() {
            return Err(Error::Init(format!("window creation failed: {}", err)));
        }
        if driver.window.is_none() {
            return Err(Error::Init(
                "window creation did not complete".to_string(),
            ));
        }

        render_info!(
            "glint::WinitSurface",
            "window created: {}x{} \"{}\"",
            config.width,
            config.height,
            config.title
        );

        Ok(Self {
            event_loop,
            driver,
            size: (config.width, config.height),
            swap_interval: config.swap_interval,
        })
    }

    /// The presentation timing requested at creation
    pub fn swap_interval(&self) -> SwapInterval {
        self.swap_interval
    }
}

impl Surface for WinitSurface {
    fn should_close(&self) -> bool {
        self.driver.close_requested
    }

    fn swap_buffers(&mut self) {
        if let Some(window) = &self.driver.window {
            window.request_redraw();
        }
    }

    fn poll_events(&mut self) {
        self.event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.driver);
    }

    fn request_close(&mut self) {
        self.driver.close_requested = true;
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }
}

/// Provider producing winit-backed surfaces
pub struct WinitProvider;

impl SurfaceProvider for WinitProvider {
    fn create_surface(&mut self, config: &SurfaceConfig) -> Result<Box<dyn Surface>> {
        Ok(Box::new(WinitSurface::new(config)?))
    }
}
