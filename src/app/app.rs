use crate::app::keymap::{map_button, map_key};
use crate::renderer::Renderer;
use crate::renderer::scene_lines::build_scene_lines;
use crate::ui::{Ui, UiResponse};
use egui_wgpu::ScreenDescriptor;
use egui_winit::State;
use nalgebra_glm as glm;
use solarvis_rs::body::{BodyHandle, BodyKind};
use solarvis_rs::camera::CameraController;
use solarvis_rs::catalog::BodyCatalog;
use solarvis_rs::ephemeris::{CircularEphemeris, Ephemeris, julian_date_now};
use solarvis_rs::error::VizError;
use solarvis_rs::input::InputEvent;
use solarvis_rs::settings::Settings;
use solarvis_rs::world::World;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::window::Window;

/// Trackpad pixels per wheel line.
const PIXELS_PER_LINE: f32 = 20.0;
/// Longest step the simulation takes in one frame, in seconds.
const MAX_FRAME_DT: f32 = 0.25;

pub struct EventResponse {
    pub repaint: bool,
    pub exit: bool,
}

pub struct App {
    pub window: Arc<Window>,
    renderer: Renderer,
    egui_state: State,
    egui_wants_pointer: bool,
    ui: Ui,
    world: World,
    ephemeris: CircularEphemeris,
    camera: CameraController,
    settings: Settings,
    last_frame: Instant,
    pending_catalog_path: Option<PathBuf>,
}

impl App {
    pub async fn new(window: Arc<Window>, catalog_path: Option<&Path>) -> Result<Self, VizError> {
        let renderer = Renderer::new(window.clone()).await?;

        let egui_ctx = renderer.egui_context();
        let egui_state = State::new(
            egui_ctx,
            egui::viewport::ViewportId::ROOT,
            &*window,
            None,
            None,
            None,
        );

        let settings = Settings::load();

        let catalog = match catalog_path {
            Some(path) => BodyCatalog::load(path)?,
            None => BodyCatalog::builtin()?,
        };
        let mut world = World::new(julian_date_now());
        let mut ephemeris = CircularEphemeris::new(catalog);
        ephemeris.populate(&mut world);

        let size = window.inner_size();
        let mut camera = CameraController::new(settings.camera.clone(), size.width, size.height);
        frame_home(&mut camera, &world);

        Ok(Self {
            window,
            renderer,
            egui_state,
            egui_wants_pointer: false,
            ui: Ui::new(&settings),
            world,
            ephemeris,
            camera,
            settings,
            last_frame: Instant::now(),
            pending_catalog_path: None,
        })
    }

    fn dispatch(&mut self, event: InputEvent) {
        self.camera.handle_event(&event, &self.world);
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> EventResponse {
        // Let egui handle the event first
        let egui_response = self.egui_state.on_window_event(&self.window, event);
        let handled = EventResponse {
            repaint: egui_response.repaint,
            exit: false,
        };

        match event {
            WindowEvent::CloseRequested => {
                self.save_settings();
                return EventResponse {
                    repaint: false,
                    exit: true,
                };
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
                self.dispatch(InputEvent::Resized {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                // Releases always go through so held keys cannot stick.
                if (egui_response.consumed && pressed) || event.repeat {
                    return handled;
                }
                if let Some(key) = map_key(event.physical_key) {
                    self.dispatch(InputEvent::Key { key, pressed });
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.egui_wants_pointer {
                    return handled;
                }
                self.dispatch(InputEvent::PointerMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                if self.egui_wants_pointer && pressed {
                    return handled;
                }
                if let Some(button) = map_button(*button) {
                    self.dispatch(InputEvent::PointerButton {
                        button,
                        pressed,
                        at: Instant::now(),
                    });
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if self.egui_wants_pointer {
                    return handled;
                }
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.dispatch(InputEvent::Scroll { delta });
            }
            WindowEvent::DroppedFile(path) => {
                self.pending_catalog_path = Some(path.clone());
            }
            _ => {}
        }

        handled
    }

    /// Swaps in a catalog from disk. Every handle issued so far goes stale.
    pub fn reload_catalog(&mut self, path: &Path) {
        match BodyCatalog::load(path) {
            Ok(catalog) => {
                self.ephemeris = CircularEphemeris::new(catalog);
                self.ephemeris.populate(&mut self.world);
                self.camera.validate_references(&self.world);
                frame_home(&mut self.camera, &self.world);
            }
            Err(e) => log::error!("Keeping current catalog: {}", e),
        }
    }

    /// Reconfigures the surface, e.g. after it was lost.
    pub fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.renderer.resize(size);
    }

    fn save_settings(&mut self) {
        self.settings.camera = self.camera.settings().clone();
        self.settings.save();
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = now
            .duration_since(self.last_frame)
            .as_secs_f32()
            .min(MAX_FRAME_DT);
        self.last_frame = now;

        if let Some(path) = self.pending_catalog_path.take() {
            self.reload_catalog(&path);
        }

        if !self.settings.display.paused {
            self.world.julian_date += dt as f64 * self.settings.display.time_scale;
        }
        self.ephemeris.advance(&mut self.world);

        self.camera.validate_references(&self.world);
        self.camera
            .update_raycast(&self.world, self.egui_wants_pointer);
        self.camera.process_keyboard(dt, &self.world);
        self.camera.update_follow_target(&self.world);
        self.camera.clamp_to_surface(&self.world);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let egui_ctx = self.renderer.egui_context();

        let mut response = UiResponse::default();
        let full_output = egui_ctx.run(raw_input, |ctx| {
            response = self
                .ui
                .show(ctx, &mut self.settings, &mut self.camera, &self.world);
        });

        // The UI has now hit-tested this frame's click.
        let ui_consumed_click = egui_ctx.wants_pointer_input() || egui_ctx.is_pointer_over_area();
        self.camera.process_pending_deselect(ui_consumed_click);

        // Update egui pointer state for next frame
        self.egui_wants_pointer = egui_ctx.wants_pointer_input();
        self.camera.set_input_blocked(egui_ctx.is_using_pointer());

        if response.jump_to_now {
            self.world.julian_date = julian_date_now();
            self.ephemeris.advance(&mut self.world);
        }

        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let size = self.window.inner_size();
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        let orbits = self.ephemeris.orbit_circles(&self.world);
        let lines = build_scene_lines(&self.world, &self.camera, &orbits, &self.settings.display);
        self.renderer.upload_lines(&lines);
        self.renderer
            .set_clear_color(self.settings.display.background_color);

        let view = self.camera.view_matrix();
        let projection = self.camera.projection_matrix(&self.world);
        self.renderer.render(
            &view,
            &projection,
            paint_jobs,
            full_output.textures_delta,
            screen_descriptor,
        )
    }
}

/// Earth if the catalog has one, else the first planet, else the first body.
pub fn home_body(world: &World) -> Option<BodyHandle> {
    world
        .bodies
        .find_by_name("Earth")
        .or_else(|| {
            world
                .bodies
                .iter()
                .find(|(_, b)| b.kind == BodyKind::Planet)
                .map(|(h, _)| h)
        })
        .or_else(|| world.bodies.iter().next().map(|(h, _)| h))
}

/// Position of the first star, or the origin.
pub fn light_position(world: &World) -> glm::Vec3 {
    world
        .bodies
        .iter()
        .find(|(_, b)| b.kind == BodyKind::Star)
        .map(|(_, b)| b.position)
        .unwrap_or_else(glm::Vec3::zeros)
}

fn frame_home(camera: &mut CameraController, world: &World) {
    match home_body(world) {
        Some(home) => camera.initialize_for_earth(world, home, light_position(world)),
        None => log::warn!("Catalog has no bodies to frame"),
    }
}
