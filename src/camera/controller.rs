use std::time::Instant;

use nalgebra_glm as glm;

use super::follow::{Focus, FollowMode};
use super::math;
use super::picking::ContextMenu;
use super::surface::SurfaceView;
use super::CameraState;
use crate::body::BodyHandle;
use crate::input::{CursorKind, InputEvent, Key, KeyState, PointerButton};
use crate::settings::CameraSettings;
use crate::world::World;

/// Where [`CameraController::reset`] takes the camera back to.
#[derive(Debug, Clone, Copy)]
struct Home {
    body: Option<BodyHandle>,
    offset: glm::Vec3,
}

/// Owns the camera and everything the pointer and keyboard do to it.
///
/// Constructed once at startup and handed by reference to input dispatch,
/// the renderer and the UI. Bodies are never owned here; handles are
/// re-validated against the [`World`] every frame.
pub struct CameraController {
    pub(super) state: CameraState,
    pub(super) settings: CameraSettings,

    pub(super) hovered: Option<BodyHandle>,
    pub(super) hovered_city: Option<String>,
    pub(super) selected: Option<BodyHandle>,
    pub(super) context_menu: Option<ContextMenu>,
    pub(super) pending_deselect: bool,
    pub(super) cursor_kind: CursorKind,

    pub(super) focus: Focus,
    pub(super) follow_mode: FollowMode,
    pub(super) focus_offset: glm::Vec3,
    pub(super) last_julian_date: Option<f64>,
    pub(super) surface: SurfaceView,

    pub(super) left_pressed: bool,
    pub(super) right_pressed: bool,
    pub(super) middle_pressed: bool,
    pub(super) cursor: (f32, f32),
    pub(super) press_origin: Option<(f32, f32)>,
    pub(super) dragging: bool,
    /// Time and hovered target of the last single left click.
    pub(super) last_click: Option<(Instant, Option<BodyHandle>)>,
    pub(super) input_blocked: bool,
    pub(super) keys: KeyState,
    pub(super) screen: (f32, f32),
    home: Home,
}

impl CameraController {
    pub fn new(settings: CameraSettings, width: u32, height: u32) -> Self {
        let state = CameraState::new(
            glm::vec3(0.0, 0.0, 10.0),
            0.0,
            0.0,
            settings.fov_degrees,
        );
        let surface = SurfaceView::new(settings.surface_altitude);
        Self {
            state,
            settings,
            hovered: None,
            hovered_city: None,
            selected: None,
            context_menu: None,
            pending_deselect: false,
            cursor_kind: CursorKind::Default,
            focus: Focus::None,
            follow_mode: FollowMode::Fixed,
            focus_offset: glm::vec3(0.0, 0.0, 0.0),
            last_julian_date: None,
            surface,
            left_pressed: false,
            right_pressed: false,
            middle_pressed: false,
            cursor: (width as f32 * 0.5, height as f32 * 0.5),
            press_origin: None,
            dragging: false,
            last_click: None,
            input_blocked: false,
            keys: KeyState::default(),
            screen: (width as f32, height as f32),
            home: Home {
                body: None,
                offset: glm::vec3(0.0, 0.0, 10.0),
            },
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut CameraSettings {
        &mut self.settings
    }

    pub fn position(&self) -> glm::Vec3 {
        self.state.position
    }

    pub fn view_matrix(&self) -> glm::Mat4 {
        self.state.view_matrix()
    }

    pub fn fov(&self) -> f32 {
        self.state.fov
    }

    pub fn far_plane(&self) -> f32 {
        self.settings.far_plane
    }

    pub fn aspect(&self) -> f32 {
        if self.screen.1 > 0.0 {
            self.screen.0 / self.screen.1
        } else {
            1.0
        }
    }

    pub fn screen_size(&self) -> (f32, f32) {
        self.screen
    }

    pub fn cursor_position(&self) -> (f32, f32) {
        self.cursor
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.screen = (width as f32, height as f32);
    }

    /// Set by the UI while one of its widgets owns the mouse.
    pub fn set_input_blocked(&mut self, blocked: bool) {
        if blocked && !self.input_blocked {
            self.keys = KeyState::default();
            self.dragging = false;
            self.press_origin = None;
        }
        self.input_blocked = blocked;
    }

    pub fn is_input_blocked(&self) -> bool {
        self.input_blocked
    }

    /// Dispatches one input event. Call in arrival order, before the frame update.
    pub fn handle_event(&mut self, event: &InputEvent, world: &World) {
        if let InputEvent::Resized { width, height } = *event {
            self.resize(width, height);
            return;
        }
        if self.input_blocked {
            self.track_while_blocked(event);
            return;
        }
        match *event {
            InputEvent::PointerMoved { x, y } => self.handle_pointer_move(x, y, world),
            InputEvent::PointerButton {
                button,
                pressed,
                at,
            } => self.handle_mouse_button(button, pressed, at, world),
            InputEvent::Scroll { delta } => self.handle_scroll(delta, world),
            InputEvent::Key { key, pressed } => self.handle_key(key, pressed, world),
            InputEvent::Resized { .. } => {}
        }
    }

    /// Keeps button/key state honest without moving the camera.
    fn track_while_blocked(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMoved { x, y } => self.cursor = (x, y),
            InputEvent::PointerButton {
                button,
                pressed: false,
                ..
            } => {
                match button {
                    PointerButton::Left => self.left_pressed = false,
                    PointerButton::Right => self.right_pressed = false,
                    PointerButton::Middle => self.middle_pressed = false,
                }
                self.press_origin = None;
                self.dragging = false;
            }
            InputEvent::Key {
                key,
                pressed: false,
            } => {
                self.keys.set(key, false);
            }
            _ => {}
        }
    }

    fn handle_pointer_move(&mut self, x: f32, y: f32, world: &World) {
        let (last_x, last_y) = self.cursor;
        self.cursor = (x, y);
        let delta_x = x - last_x;
        let delta_y = y - last_y;

        if !(self.left_pressed || self.middle_pressed || self.right_pressed) {
            return;
        }
        if !self.dragging {
            let Some((ox, oy)) = self.press_origin else {
                return;
            };
            let travelled = ((x - ox).powi(2) + (y - oy).powi(2)).sqrt();
            if travelled <= self.settings.drag_threshold_px {
                return;
            }
            self.dragging = true;
        }

        if self.left_pressed {
            match (&self.focus, self.follow_mode) {
                (Focus::Body(_), FollowMode::Surface) => self.look_on_surface(delta_x, delta_y),
                (Focus::None, _) => self.free_look(delta_x, delta_y),
                _ => self.orbit_focus(delta_x, delta_y, world),
            }
        } else if self.middle_pressed {
            self.pan(delta_x, delta_y, world);
        }
    }

    fn free_look(&mut self, delta_x: f32, delta_y: f32) {
        self.state.yaw += delta_x * self.settings.rotate_speed;
        self.state.pitch -= delta_y * self.settings.rotate_speed;
        self.state.clamp_pitch();
        self.state.wrap_yaw();
    }

    fn pan(&mut self, delta_x: f32, delta_y: f32, world: &World) {
        if self.follow_mode == FollowMode::Surface {
            return;
        }
        let (multiplier, _) = self.get_proximity_speed_multiplier(world);
        let speed = self.settings.pan_speed * multiplier;
        let basis = self.state.basis();
        let delta = basis.right * (-delta_x * speed) + basis.up * (delta_y * speed);
        self.translate(delta);
    }

    fn handle_scroll(&mut self, delta: f32, world: &World) {
        match (&self.focus, self.follow_mode) {
            (Focus::Body(_), FollowMode::Surface) => {
                let fov = self.state.fov - delta * self.settings.scroll_speed * 2.0;
                self.state.fov = fov.clamp(
                    self.settings.fov_min_degrees,
                    self.settings.fov_max_degrees,
                );
            }
            (Focus::None, _) => {
                let (multiplier, _) = self.get_proximity_speed_multiplier(world);
                let step = delta * self.settings.scroll_speed * self.settings.move_speed * 0.1;
                let front = self.state.front();
                self.state.position += front * (step * multiplier);
            }
            _ => self.zoom_focus(delta, world),
        }
    }

    fn handle_key(&mut self, key: Key, pressed: bool, world: &World) {
        if self.keys.set(key, pressed) || !pressed {
            return;
        }
        match key {
            Key::FocusSelected => {
                if let Some(selected) = self.selected {
                    self.focus_on_body(world, selected);
                }
            }
            Key::ToggleFollowMode => {
                self.toggle_follow_mode();
            }
            Key::ToggleSurfaceView => {
                if self.follow_mode == FollowMode::Surface {
                    self.exit_surface_view(world);
                } else if let Some(target) = self.focused_body().or(self.selected) {
                    self.enter_surface_view(world, target, None);
                }
            }
            Key::Reset => self.reset(world),
            Key::Escape => {
                if self.context_menu.is_some() {
                    self.close_context_menu();
                } else if self.is_focused() {
                    self.clear_focus();
                }
            }
            _ => {}
        }
    }

    /// Integrates held movement keys over `dt` seconds.
    pub fn process_keyboard(&mut self, dt: f32, world: &World) {
        if self.input_blocked || !(dt > 0.0) || !self.keys.any_movement() {
            return;
        }
        let (strafe, lift, forward) = self.keys.axes();
        if self.follow_mode == FollowMode::Surface {
            self.move_on_surface(forward, strafe, dt, world);
            return;
        }

        let roll = self.keys.roll_axis();
        if roll != 0.0 {
            let rolled = self.state.roll + roll * self.settings.roll_speed * dt;
            self.state.roll = math::normalize_longitude(rolled.to_radians()).to_degrees();
        }

        let basis = self.state.basis();
        let direction = basis.front * forward + basis.right * strafe + basis.up * lift;
        if glm::length(&direction) < f32::EPSILON {
            return;
        }
        let (multiplier, _) = self.get_proximity_speed_multiplier(world);
        let boost = if self.keys.boost {
            self.settings.boost_multiplier
        } else {
            1.0
        };
        let speed = self.settings.move_speed * multiplier * boost * dt;
        self.translate(glm::normalize(&direction) * speed);
    }

    /// Moves the camera, carrying the follow offset along when focused.
    pub(super) fn translate(&mut self, delta: glm::Vec3) {
        self.state.position += delta;
        if self.is_focused() && self.follow_mode != FollowMode::Surface {
            self.focus_offset += delta;
        }
    }

    /// Frames `earth` with the light source just off-centre and focuses it.
    pub fn initialize_for_earth(&mut self, world: &World, earth: BodyHandle, light: glm::Vec3) {
        let Some(body) = world.body(earth) else {
            log::warn!("initialize_for_earth: focus body is not in the world");
            return;
        };
        let to_light = light - body.position;
        let to_light = if glm::length(&to_light) > f32::EPSILON {
            glm::normalize(&to_light)
        } else {
            glm::vec3(0.0, 0.0, -1.0)
        };
        let mut side = glm::cross(&to_light, &math::world_up());
        if glm::length(&side) < 1.0e-6 {
            side = glm::vec3(1.0, 0.0, 0.0);
        }
        let side = glm::normalize(&side);
        let lift = glm::cross(&side, &to_light);

        // Behind the planet as seen from the light, slightly off-axis so the
        // light stays inside the frame.
        let offset = (to_light * -4.0 + side * 1.0 + lift * 0.4) * body.display_radius;
        let position = body.position + offset;

        self.clear_focus();
        self.state.position = position;
        self.state.roll = 0.0;
        self.state.fov = self.settings.fov_degrees;
        self.state.look_at(&body.position);
        self.state.capture_default();
        self.home = Home {
            body: Some(earth),
            offset,
        };
        self.focus_on_body(world, earth);
        log::info!("Camera framed on {}", body.name);
    }

    /// Back to the pose captured by [`CameraController::initialize_for_earth`].
    pub fn reset(&mut self, world: &World) {
        self.clear_focus();
        self.close_context_menu();
        self.dragging = false;
        self.press_origin = None;
        self.state.reset();
        self.state.fov = self.settings.fov_degrees;
        if let Some(home) = self.home.body {
            if let Some(body) = world.body(home) {
                self.state.position = body.position + self.home.offset;
                self.focus_on_body(world, home);
            }
        }
    }
}
