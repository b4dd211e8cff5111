use std::time::{Duration, Instant};

use nalgebra_glm as glm;

use super::follow::{Focus, FollowMode};
use super::math;
use super::CameraController;
use crate::body::{Body, BodyHandle};
use crate::input::{CursorKind, PointerButton};
use crate::world::World;

/// Near plane of the projection used only for building pick rays.
const PICK_NEAR: f32 = 0.01;
/// Angular radius around a city that still counts as hovering it.
const CITY_PICK_RADIUS: f32 = 3.0 * std::f32::consts::PI / 180.0;

/// Right-click menu anchored at a screen position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenu {
    pub target: Option<BodyHandle>,
    pub x: f32,
    pub y: f32,
}

impl CameraController {
    pub fn hovered(&self) -> Option<BodyHandle> {
        self.hovered
    }

    pub fn hovered_city(&self) -> Option<&str> {
        self.hovered_city.as_deref()
    }

    pub fn selected(&self) -> Option<BodyHandle> {
        self.selected
    }

    pub fn select_body(&mut self, handle: Option<BodyHandle>) {
        self.selected = handle;
        self.pending_deselect = false;
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    pub fn cursor_kind(&self) -> CursorKind {
        self.cursor_kind
    }

    pub fn has_pending_deselect(&self) -> bool {
        self.pending_deselect
    }

    /// Re-picks the body under the cursor.
    ///
    /// Pass `skip_if_mouse_over_ui` while the UI owns the pointer: hover is
    /// dropped and the cursor reverts to the default glyph.
    pub fn update_raycast(&mut self, world: &World, skip_if_mouse_over_ui: bool) {
        if skip_if_mouse_over_ui {
            self.clear_hover();
            return;
        }

        let view = self.state.view_matrix();
        let projection =
            self.state
                .projection_matrix(self.aspect(), PICK_NEAR, self.settings.max_ray_distance);
        let Some(direction) = math::screen_ray_direction(self.cursor, self.screen, &view, &projection)
        else {
            self.clear_hover();
            return;
        };
        let origin = self.state.position;

        let mut nearest: Option<(BodyHandle, f32)> = None;
        for (handle, body) in world.bodies.iter() {
            if !body.pickable {
                continue;
            }
            let Some(t) =
                math::ray_sphere_intersection(&origin, &direction, &body.position, body.display_radius)
            else {
                continue;
            };
            if t <= self.settings.max_ray_distance && nearest.is_none_or(|(_, best)| t < best) {
                nearest = Some((handle, t));
            }
        }

        self.hovered = nearest.map(|(handle, _)| handle);
        self.hovered_city = nearest.and_then(|(handle, t)| {
            let body = world.body(handle)?;
            city_at(body, &(origin + direction * t)).map(str::to_owned)
        });
        self.cursor_kind = if self.hovered.is_some() {
            CursorKind::Pointer
        } else {
            CursorKind::Default
        };
    }

    fn clear_hover(&mut self) {
        self.hovered = None;
        self.hovered_city = None;
        self.cursor_kind = CursorKind::Default;
    }

    pub(super) fn handle_mouse_button(
        &mut self,
        button: PointerButton,
        pressed: bool,
        at: Instant,
        world: &World,
    ) {
        if pressed {
            match button {
                PointerButton::Left => self.left_pressed = true,
                PointerButton::Right => self.right_pressed = true,
                PointerButton::Middle => self.middle_pressed = true,
            }
            self.press_origin = Some(self.cursor);
            self.dragging = false;
            return;
        }

        let was_drag = self.dragging;
        let was_pressed = match button {
            PointerButton::Left => std::mem::take(&mut self.left_pressed),
            PointerButton::Right => std::mem::take(&mut self.right_pressed),
            PointerButton::Middle => std::mem::take(&mut self.middle_pressed),
        };
        if !(self.left_pressed || self.right_pressed || self.middle_pressed) {
            self.dragging = false;
            self.press_origin = None;
        }
        // A release whose press went to the UI is not a click.
        if was_drag || !was_pressed {
            return;
        }
        match button {
            PointerButton::Left => self.handle_left_click(at, world),
            PointerButton::Right => self.open_context_menu(),
            PointerButton::Middle => {}
        }
    }

    fn handle_left_click(&mut self, at: Instant, world: &World) {
        self.context_menu = None;

        let window = Duration::from_millis(self.settings.double_click_ms);
        let is_double = self.hovered.is_some()
            && self.last_click.is_some_and(|(previous, target)| {
                target == self.hovered && at.saturating_duration_since(previous) <= window
            });
        if is_double {
            self.last_click = None;
            self.handle_double_click(world);
            return;
        }
        self.last_click = Some((at, self.hovered));

        match self.hovered {
            Some(handle) => {
                self.selected = Some(handle);
                self.pending_deselect = false;
            }
            None => self.arm_pending_deselect(),
        }
    }

    fn handle_double_click(&mut self, world: &World) {
        let Some(handle) = self.hovered else {
            return;
        };
        let focused_here = self.focused_body() == Some(handle);
        if focused_here && self.follow_mode == FollowMode::Surface {
            return;
        }
        if focused_here && self.settings.double_click_enters_surface {
            self.enter_surface_view(world, handle, None);
        } else {
            self.focus_on_body(world, handle);
        }
    }

    fn open_context_menu(&mut self) {
        self.context_menu = Some(ContextMenu {
            target: self.hovered,
            x: self.cursor.0,
            y: self.cursor.1,
        });
        log::debug!("Context menu at {:?}", self.cursor);
    }

    /// Marks an empty-space click; committed or cancelled once the UI has run.
    pub fn arm_pending_deselect(&mut self) {
        self.pending_deselect = true;
    }

    /// Commits an armed deselect unless the UI consumed the click this frame.
    pub fn resolve_pending_deselect(&mut self, ui_consumed_click: bool) {
        if !std::mem::take(&mut self.pending_deselect) {
            return;
        }
        if ui_consumed_click {
            log::debug!("Deselect cancelled by UI");
            return;
        }
        if let Some(selected) = self.selected.take() {
            if self.focus == Focus::Body(selected) {
                self.clear_focus();
            }
        }
    }

    /// Per-frame entry point, run after the UI pass.
    pub fn process_pending_deselect(&mut self, ui_consumed_click: bool) {
        self.resolve_pending_deselect(ui_consumed_click);
    }

    /// Drops hover, selection, menu and focus references the world no longer has.
    pub fn validate_references(&mut self, world: &World) {
        if self.hovered.is_some_and(|h| !world.bodies.contains(h)) {
            self.clear_hover();
        }
        if let Some(selected) = self.selected {
            if !world.bodies.contains(selected) {
                log::warn!("Selected body is gone; clearing selection");
                self.selected = None;
            }
        }
        if let Some(ContextMenu {
            target: Some(target),
            ..
        }) = self.context_menu
        {
            if !world.bodies.contains(target) {
                self.context_menu = None;
            }
        }
        let stale_focus = match &self.focus {
            Focus::None => false,
            Focus::Body(handle) => !world.bodies.contains(*handle),
            Focus::LagrangePoint(target) => world.lagrange_point(&target.name).is_none(),
        };
        if stale_focus {
            log::warn!("Focus target is gone; clearing focus");
            self.clear_focus();
        }
    }
}

/// Name of the city within [`CITY_PICK_RADIUS`] of a surface point.
fn city_at<'a>(body: &'a Body, point: &glm::Vec3) -> Option<&'a str> {
    if body.cities.is_empty() {
        return None;
    }
    let frame = body.frame();
    let outward = glm::normalize(&(point - body.position));
    body.cities
        .iter()
        .map(|city| {
            let direction = frame.direction(city.latitude, city.longitude);
            let angle = glm::dot(&outward, &direction).clamp(-1.0, 1.0).acos();
            (city, angle)
        })
        .filter(|(_, angle)| *angle <= CITY_PICK_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(city, _)| city.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::City;
    use crate::input::InputEvent;
    use crate::settings::CameraSettings;

    fn setup() -> (World, BodyHandle, CameraController) {
        let mut world = World::new(2_451_545.0);
        let handle = world
            .bodies
            .insert(Body::new("earth", glm::vec3(0.0, 0.0, 0.0), 2.0));
        let camera = CameraController::new(CameraSettings::default(), 800, 600);
        (world, handle, camera)
    }

    fn click(camera: &mut CameraController, world: &World, button: PointerButton, at: Instant) {
        for pressed in [true, false] {
            camera.handle_event(
                &InputEvent::PointerButton {
                    button,
                    pressed,
                    at,
                },
                world,
            );
        }
    }

    #[test]
    fn centre_ray_picks_the_body_ahead() {
        let (world, earth, mut camera) = setup();
        camera.update_raycast(&world, false);
        assert_eq!(camera.hovered(), Some(earth));
        assert_eq!(camera.cursor_kind(), CursorKind::Pointer);
    }

    #[test]
    fn hover_is_dropped_over_ui() {
        let (world, _, mut camera) = setup();
        camera.update_raycast(&world, false);
        camera.update_raycast(&world, true);
        assert_eq!(camera.hovered(), None);
        assert_eq!(camera.cursor_kind(), CursorKind::Default);
    }

    #[test]
    fn nearest_of_overlapping_bodies_wins() {
        let (mut world, _, mut camera) = setup();
        let near = world
            .bodies
            .insert(Body::new("moon", glm::vec3(0.0, 0.0, 5.0), 0.5));
        camera.update_raycast(&world, false);
        assert_eq!(camera.hovered(), Some(near));
    }

    #[test]
    fn unpickable_bodies_are_skipped() {
        let (mut world, earth, mut camera) = setup();
        world.bodies.get_mut(earth).unwrap().pickable = false;
        camera.update_raycast(&world, false);
        assert_eq!(camera.hovered(), None);
    }

    #[test]
    fn city_under_cursor_is_reported() {
        let (mut world, earth, mut camera) = setup();
        // On an unspun +Y-axis body, +Z is longitude -90°.
        world.bodies.get_mut(earth).unwrap().cities.push(City {
            name: "Front".into(),
            latitude: 0.0,
            longitude: -std::f32::consts::FRAC_PI_2,
        });
        camera.update_raycast(&world, false);
        assert_eq!(camera.hovered_city(), Some("Front"));
    }

    #[test]
    fn double_click_within_window_focuses() {
        let (world, earth, mut camera) = setup();
        camera.update_raycast(&world, false);
        let t0 = Instant::now();
        click(&mut camera, &world, PointerButton::Left, t0);
        assert_eq!(camera.selected(), Some(earth));
        assert!(!camera.is_focused());

        click(&mut camera, &world, PointerButton::Left, t0 + Duration::from_millis(140));
        assert_eq!(camera.focused_body(), Some(earth));
    }

    #[test]
    fn slow_second_click_is_a_single_click() {
        let (world, earth, mut camera) = setup();
        camera.update_raycast(&world, false);
        let t0 = Instant::now();
        click(&mut camera, &world, PointerButton::Left, t0);
        click(&mut camera, &world, PointerButton::Left, t0 + Duration::from_millis(250));
        assert_eq!(camera.selected(), Some(earth));
        assert!(!camera.is_focused());
    }

    #[test]
    fn third_quick_click_does_not_double_fire() {
        let (world, earth, mut camera) = setup();
        camera.update_raycast(&world, false);
        let t0 = Instant::now();
        click(&mut camera, &world, PointerButton::Left, t0);
        click(&mut camera, &world, PointerButton::Left, t0 + Duration::from_millis(100));
        camera.clear_focus();
        click(&mut camera, &world, PointerButton::Left, t0 + Duration::from_millis(180));
        assert!(!camera.is_focused());
        assert_eq!(camera.selected(), Some(earth));
    }

    #[test]
    fn quick_clicks_on_two_bodies_only_select() {
        let (mut world, earth, mut camera) = setup();
        let mars = world
            .bodies
            .insert(Body::new("mars", glm::vec3(30.0, 0.0, 0.0), 2.0));
        camera.update_raycast(&world, false);
        let t0 = Instant::now();
        click(&mut camera, &world, PointerButton::Left, t0);
        assert_eq!(camera.selected(), Some(earth));

        camera.state.look_at(&glm::vec3(30.0, 0.0, 0.0));
        camera.update_raycast(&world, false);
        assert_eq!(camera.hovered(), Some(mars));
        click(&mut camera, &world, PointerButton::Left, t0 + Duration::from_millis(120));
        assert_eq!(camera.selected(), Some(mars));
        assert!(!camera.is_focused());
    }

    #[test]
    fn quick_click_on_empty_space_arms_deselect() {
        let (world, earth, mut camera) = setup();
        camera.update_raycast(&world, false);
        let t0 = Instant::now();
        click(&mut camera, &world, PointerButton::Left, t0);
        assert_eq!(camera.selected(), Some(earth));

        camera.handle_event(&InputEvent::PointerMoved { x: 5.0, y: 5.0 }, &world);
        camera.update_raycast(&world, false);
        assert_eq!(camera.hovered(), None);
        click(&mut camera, &world, PointerButton::Left, t0 + Duration::from_millis(120));
        assert!(camera.has_pending_deselect());
        camera.process_pending_deselect(false);
        assert_eq!(camera.selected(), None);
    }

    #[test]
    fn release_without_press_is_not_a_click() {
        let (world, _, mut camera) = setup();
        camera.update_raycast(&world, false);
        let t0 = Instant::now();
        let release = |camera: &mut CameraController, at: Instant| {
            camera.handle_event(
                &InputEvent::PointerButton {
                    button: PointerButton::Left,
                    pressed: false,
                    at,
                },
                &world,
            );
        };
        release(&mut camera, t0);
        assert_eq!(camera.selected(), None);

        // The orphan release must not pair with a real click.
        click(&mut camera, &world, PointerButton::Left, t0 + Duration::from_millis(100));
        assert!(!camera.is_focused());
        release(&mut camera, t0 + Duration::from_millis(150));
        assert!(!camera.is_focused());
    }

    #[test]
    fn double_click_can_enter_surface_view() {
        let (world, earth, mut camera) = setup();
        camera.settings_mut().double_click_enters_surface = true;
        camera.update_raycast(&world, false);
        camera.focus_on_body(&world, earth);
        let t0 = Instant::now();
        click(&mut camera, &world, PointerButton::Left, t0);
        click(&mut camera, &world, PointerButton::Left, t0 + Duration::from_millis(50));
        assert_eq!(camera.follow_mode(), FollowMode::Surface);
    }

    #[test]
    fn empty_click_deselects_only_when_ui_ignores_it() {
        let (world, earth, mut camera) = setup();
        camera.focus_on_body(&world, earth);
        camera.handle_event(&InputEvent::PointerMoved { x: 5.0, y: 5.0 }, &world);
        camera.update_raycast(&world, false);
        assert_eq!(camera.hovered(), None);

        click(&mut camera, &world, PointerButton::Left, Instant::now());
        assert!(camera.has_pending_deselect());
        camera.resolve_pending_deselect(true);
        assert_eq!(camera.selected(), Some(earth));
        assert_eq!(camera.focused_body(), Some(earth));

        click(
            &mut camera,
            &world,
            PointerButton::Left,
            Instant::now() + Duration::from_secs(1),
        );
        camera.resolve_pending_deselect(false);
        assert_eq!(camera.selected(), None);
        assert!(!camera.is_focused());
        assert!(!camera.has_pending_deselect());
    }

    #[test]
    fn right_click_opens_menu_and_left_click_closes_it() {
        let (world, earth, mut camera) = setup();
        camera.update_raycast(&world, false);
        click(&mut camera, &world, PointerButton::Right, Instant::now());
        let menu = camera.context_menu().copied().unwrap();
        assert_eq!(menu.target, Some(earth));
        assert_eq!((menu.x, menu.y), (400.0, 300.0));

        click(&mut camera, &world, PointerButton::Left, Instant::now());
        assert!(camera.context_menu().is_none());
    }

    #[test]
    fn drag_release_is_not_a_click() {
        let (world, _, mut camera) = setup();
        let at = Instant::now();
        camera.handle_event(
            &InputEvent::PointerButton {
                button: PointerButton::Right,
                pressed: true,
                at,
            },
            &world,
        );
        camera.handle_event(&InputEvent::PointerMoved { x: 500.0, y: 300.0 }, &world);
        camera.handle_event(
            &InputEvent::PointerButton {
                button: PointerButton::Right,
                pressed: false,
                at,
            },
            &world,
        );
        assert!(camera.context_menu().is_none());
    }

    #[test]
    fn stale_references_are_cleared() {
        let (mut world, earth, mut camera) = setup();
        camera.update_raycast(&world, false);
        camera.focus_on_body(&world, earth);
        click(&mut camera, &world, PointerButton::Right, Instant::now());

        world.bodies.remove(earth);
        camera.validate_references(&world);
        assert_eq!(camera.hovered(), None);
        assert_eq!(camera.selected(), None);
        assert!(camera.context_menu().is_none());
        assert!(!camera.is_focused());
    }
}
