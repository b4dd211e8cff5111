use crate::app::app::App;
use solarvis_rs::error::VizError;
use std::path::PathBuf;
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

pub struct AppHandler {
    pub app: Option<App>,
    pub catalog_path: Option<PathBuf>,
    startup_error: Option<VizError>,
}

impl AppHandler {
    pub fn new(catalog_path: Option<PathBuf>) -> Self {
        Self {
            app: None,
            catalog_path,
            startup_error: None,
        }
    }

    /// The error that stopped the window from coming up, if any.
    pub fn take_error(&mut self) -> Option<VizError> {
        self.startup_error.take()
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<App, VizError> {
        let window_attrs = Window::default_attributes()
            .with_title("SolarVis-RS")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 800.0));
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        pollster::block_on(App::new(window, self.catalog_path.as_deref()))
    }
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(app) => self.app = Some(app),
            Err(e) => {
                log::error!("Failed to start: {}", e);
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(app) = &mut self.app {
            let response = app.handle_event(&event);
            if response.repaint {
                app.window.request_redraw();
            }
            if response.exit {
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(app) = &mut self.app {
            match app.render() {
                Ok(()) => {}
                // Surface went stale (resize, display change); the next frame reconfigures.
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = app.window.inner_size();
                    app.resize(size);
                }
                Err(e) => log::error!("Render error: {:?}", e),
            }
            app.window.request_redraw();
        }
    }
}
