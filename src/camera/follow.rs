use nalgebra_glm as glm;
use std::f64::consts::TAU;

use super::math;
use super::CameraController;
use crate::body::BodyHandle;
use crate::world::World;

const SECONDS_PER_DAY: f64 = 86_400.0;
/// Elevation limit when orbiting a focus target, degrees.
const ORBIT_ELEVATION_LIMIT: f32 = 89.0;

/// A Lagrange point the camera is following, looked up by name each frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LagrangeTarget {
    pub name: String,
    pub position: glm::Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    Body(BodyHandle),
    LagrangePoint(LagrangeTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowMode {
    /// Constant world-space offset from the target.
    #[default]
    Fixed,
    /// Offset co-rotates with the target's spin.
    Geostationary,
    /// Standing on the target; see `surface.rs`.
    Surface,
}

impl CameraController {
    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    pub fn follow_mode(&self) -> FollowMode {
        self.follow_mode
    }

    pub fn is_focused(&self) -> bool {
        !matches!(self.focus, Focus::None)
    }

    pub fn focused_body(&self) -> Option<BodyHandle> {
        match self.focus {
            Focus::Body(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn focus_offset(&self) -> glm::Vec3 {
        self.focus_offset
    }

    /// Starts following `handle` at the current offset. Also selects it.
    pub fn focus_on_body(&mut self, world: &World, handle: BodyHandle) -> bool {
        let Some(body) = world.body(handle) else {
            log::warn!("focus_on_body: stale body handle {:?}", handle);
            return false;
        };
        if self.follow_mode == FollowMode::Surface {
            self.leave_surface_orientation();
        }
        self.focus = Focus::Body(handle);
        self.follow_mode = FollowMode::Fixed;
        self.focus_offset = self.state.position - body.position;
        self.selected = Some(handle);
        self.last_julian_date = Some(world.julian_date);
        log::info!("Focused on {}", body.name);
        true
    }

    pub fn focus_on_lagrange_point(
        &mut self,
        world: &World,
        name: &str,
        position: glm::Vec3,
        radius: f32,
    ) {
        if self.follow_mode == FollowMode::Surface {
            self.leave_surface_orientation();
        }
        self.focus = Focus::LagrangePoint(LagrangeTarget {
            name: name.to_owned(),
            position,
            radius,
        });
        self.follow_mode = FollowMode::Fixed;
        self.focus_offset = self.state.position - position;
        self.last_julian_date = Some(world.julian_date);
        log::info!("Focused on Lagrange point {}", name);
    }

    pub fn clear_focus(&mut self) {
        if self.follow_mode == FollowMode::Surface {
            self.leave_surface_orientation();
        }
        if self.is_focused() {
            log::debug!("Focus cleared");
        }
        self.focus = Focus::None;
        self.follow_mode = FollowMode::Fixed;
        self.last_julian_date = None;
    }

    /// Flips a body focus between fixed and geostationary follow.
    pub fn toggle_follow_mode(&mut self) -> FollowMode {
        if let Focus::Body(_) = self.focus {
            self.follow_mode = match self.follow_mode {
                FollowMode::Fixed => FollowMode::Geostationary,
                FollowMode::Geostationary => FollowMode::Fixed,
                FollowMode::Surface => FollowMode::Surface,
            };
            log::info!("Follow mode: {:?}", self.follow_mode);
        }
        self.follow_mode
    }

    /// World position of the current focus target, if it still exists.
    pub fn focus_target_position(&self, world: &World) -> Option<glm::Vec3> {
        match &self.focus {
            Focus::None => None,
            Focus::Body(handle) => world.body(*handle).map(|b| b.position),
            Focus::LagrangePoint(target) => world
                .lagrange_point(&target.name)
                .map(|p| p.position)
                .or(Some(target.position)),
        }
    }

    fn focus_min_distance(&self, world: &World) -> f32 {
        match &self.focus {
            Focus::None => 0.0,
            Focus::Body(handle) => world
                .body(*handle)
                .map_or(0.0, |b| b.display_radius * (1.0 + self.settings.clamp_margin)),
            Focus::LagrangePoint(target) => target.radius * 2.0,
        }
    }

    /// Moves the camera with its target for this frame.
    pub fn update_follow_target(&mut self, world: &World) {
        let julian_date = world.julian_date;
        let elapsed_days = self.last_julian_date.map_or(0.0, |last| julian_date - last);
        self.last_julian_date = Some(julian_date);

        match self.focus.clone() {
            Focus::None => {}
            Focus::Body(handle) => {
                let Some(body) = world.body(handle) else {
                    log::warn!("Focus body disappeared; clearing focus");
                    self.clear_focus();
                    return;
                };
                match self.follow_mode {
                    FollowMode::Fixed => {
                        self.state.position = body.position + self.focus_offset;
                    }
                    FollowMode::Geostationary => {
                        let spin = (body.rotation_rate as f64 * elapsed_days * SECONDS_PER_DAY)
                            .rem_euclid(TAU) as f32;
                        if spin != 0.0 {
                            let axis = glm::normalize(&body.rotation_axis);
                            self.focus_offset = glm::rotate_vec3(&self.focus_offset, spin, &axis);
                            let front = glm::rotate_vec3(&self.state.front(), spin, &axis);
                            self.state.look_along(&front);
                            self.state.clamp_pitch();
                        }
                        self.state.position = body.position + self.focus_offset;
                    }
                    FollowMode::Surface => self.update_surface(body),
                }
            }
            Focus::LagrangePoint(target) => match world.lagrange_point(&target.name) {
                Some(point) => {
                    if let Focus::LagrangePoint(current) = &mut self.focus {
                        current.position = point.position;
                    }
                    self.state.position = point.position + self.focus_offset;
                }
                None => {
                    log::warn!("Lagrange point {} disappeared; clearing focus", target.name);
                    self.clear_focus();
                }
            },
        }
    }

    /// Left drag while focused: swing around the target, keeping distance.
    pub(super) fn orbit_focus(&mut self, delta_x: f32, delta_y: f32, world: &World) {
        let Some(target) = self.focus_target_position(world) else {
            return;
        };
        let distance = glm::length(&self.focus_offset);
        if distance < f32::EPSILON {
            return;
        }
        let direction = self.focus_offset / distance;
        let elevation = direction.y.clamp(-1.0, 1.0).asin().to_degrees();
        let elevation = (elevation + delta_y * self.settings.orbit_speed)
            .clamp(-ORBIT_ELEVATION_LIMIT, ORBIT_ELEVATION_LIMIT)
            .to_radians();

        let mut horizontal = glm::vec3(direction.x, 0.0, direction.z);
        if glm::length(&horizontal) < 1.0e-6 {
            let front = self.state.front();
            horizontal = glm::vec3(-front.x, 0.0, -front.z);
        }
        if glm::length(&horizontal) < 1.0e-6 {
            horizontal = glm::vec3(0.0, 0.0, 1.0);
        }
        let heading = (-delta_x * self.settings.orbit_speed).to_radians();
        let horizontal = glm::rotate_vec3(&glm::normalize(&horizontal), heading, &math::world_up());

        let (sin_el, cos_el) = elevation.sin_cos();
        self.focus_offset = (horizontal * cos_el + math::world_up() * sin_el) * distance;
        self.state.position = target + self.focus_offset;
        self.state.look_at(&target);
    }

    /// Scroll while focused: scale the offset, never inside the target.
    pub(super) fn zoom_focus(&mut self, delta: f32, world: &World) {
        let Some(target) = self.focus_target_position(world) else {
            return;
        };
        let distance = glm::length(&self.focus_offset);
        if distance < f32::EPSILON {
            return;
        }
        let factor = (1.0 - delta * self.settings.scroll_speed * 0.1).clamp(0.5, 2.0);
        let min_distance = self.focus_min_distance(world);
        let new_distance = (distance * factor).max(min_distance);
        self.focus_offset *= new_distance / distance;
        self.state.position = target + self.focus_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::settings::CameraSettings;
    use crate::world::LagrangePoint;

    fn approx_vec(a: &glm::Vec3, b: &glm::Vec3, eps: f32) -> bool {
        glm::distance(a, b) < eps
    }

    fn setup() -> (World, BodyHandle, CameraController) {
        let mut world = World::new(2_451_545.0);
        let handle = world
            .bodies
            .insert(Body::new("earth", glm::vec3(10.0, 0.0, 0.0), 1.0));
        let mut camera = CameraController::new(CameraSettings::default(), 800, 600);
        camera.state.position = glm::vec3(10.0, 0.0, 5.0);
        camera.state.look_at(&glm::vec3(10.0, 0.0, 0.0));
        (world, handle, camera)
    }

    #[test]
    fn focus_preserves_offset() {
        let (world, earth, mut camera) = setup();
        assert!(camera.focus_on_body(&world, earth));
        assert_eq!(camera.focus_offset(), glm::vec3(0.0, 0.0, 5.0));
        assert_eq!(camera.follow_mode(), FollowMode::Fixed);
        assert_eq!(camera.selected(), Some(earth));
    }

    #[test]
    fn fixed_follow_is_a_rigid_translation() {
        let (mut world, earth, mut camera) = setup();
        camera.focus_on_body(&world, earth);
        let front = camera.state().front();

        world.bodies.get_mut(earth).unwrap().position = glm::vec3(13.0, -2.0, 1.0);
        world.julian_date += 1.0;
        camera.update_follow_target(&world);

        assert!(approx_vec(&camera.position(), &glm::vec3(13.0, -2.0, 6.0), 1.0e-5));
        assert!(approx_vec(&camera.state().front(), &front, 1.0e-5));
    }

    #[test]
    fn geostationary_follow_co_rotates() {
        let (mut world, earth, mut camera) = setup();
        {
            let body = world.bodies.get_mut(earth).unwrap();
            body.rotation_rate = (std::f64::consts::FRAC_PI_2 / SECONDS_PER_DAY) as f32;
        }
        camera.focus_on_body(&world, earth);
        camera.toggle_follow_mode();
        assert_eq!(camera.follow_mode(), FollowMode::Geostationary);

        world.julian_date += 1.0;
        camera.update_follow_target(&world);

        // A quarter turn about +Y carries +Z onto +X.
        assert!(approx_vec(&camera.focus_offset(), &glm::vec3(5.0, 0.0, 0.0), 1.0e-3));
        let to_body = glm::normalize(&(glm::vec3(10.0, 0.0, 0.0) - camera.position()));
        assert!(glm::dot(&to_body, &camera.state().front()) > 0.9999);
    }

    #[test]
    fn toggle_without_body_focus_is_fixed() {
        let (_, _, mut camera) = setup();
        assert_eq!(camera.toggle_follow_mode(), FollowMode::Fixed);
    }

    #[test]
    fn stale_focus_is_cleared_on_update() {
        let (mut world, earth, mut camera) = setup();
        camera.focus_on_body(&world, earth);
        world.bodies.remove(earth);
        let before = camera.position();
        camera.update_follow_target(&world);
        assert_eq!(*camera.focus(), Focus::None);
        assert_eq!(camera.position(), before);
    }

    #[test]
    fn lagrange_focus_tracks_by_name() {
        let (mut world, _, mut camera) = setup();
        world.lagrange_points.push(LagrangePoint {
            name: "L2".into(),
            position: glm::vec3(20.0, 0.0, 0.0),
            radius: 0.1,
        });
        camera.focus_on_lagrange_point(&world, "L2", glm::vec3(20.0, 0.0, 0.0), 0.1);
        let offset = camera.focus_offset();

        world.lagrange_points[0].position = glm::vec3(21.0, 1.0, 0.0);
        camera.update_follow_target(&world);
        assert!(approx_vec(&camera.position(), &(glm::vec3(21.0, 1.0, 0.0) + offset), 1.0e-5));

        world.lagrange_points.clear();
        camera.update_follow_target(&world);
        assert!(!camera.is_focused());
    }

    #[test]
    fn orbit_keeps_distance_and_aims_at_target() {
        let (world, earth, mut camera) = setup();
        camera.focus_on_body(&world, earth);
        camera.orbit_focus(120.0, 40.0, &world);

        let centre = glm::vec3(10.0, 0.0, 0.0);
        assert!((glm::distance(&camera.position(), &centre) - 5.0).abs() < 1.0e-4);
        let to_body = glm::normalize(&(centre - camera.position()));
        assert!(glm::dot(&to_body, &camera.state().front()) > 0.9999);
    }

    #[test]
    fn zoom_stops_at_the_surface() {
        let (world, earth, mut camera) = setup();
        camera.focus_on_body(&world, earth);
        for _ in 0..100 {
            camera.zoom_focus(5.0, &world);
        }
        let distance = glm::length(&camera.focus_offset());
        assert!(distance >= 1.0);
        assert!(distance < 1.01);
    }
}
