use nalgebra_glm as glm;
use std::f32::consts::FRAC_PI_2;

use super::follow::{Focus, FollowMode};
use super::math::{self, TangentFrame};
use super::CameraController;
use crate::body::{Body, BodyHandle};
use crate::world::World;

/// Floor for cos(latitude) when turning an east step into longitude.
const COS_LATITUDE_FLOOR: f32 = 1.0e-3;
const SURFACE_PITCH_MAX: f32 = 89.0;
const SURFACE_PITCH_START: f32 = 5.0;

/// Ground position and local heading while standing on a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceView {
    /// Body-fixed radians.
    pub latitude: f32,
    pub longitude: f32,
    /// Height above ground as a fraction of the display radius.
    pub altitude: f32,
    /// Degrees clockwise from local north.
    pub local_yaw: f32,
    /// Degrees above the horizon.
    pub local_pitch: f32,
    pub frame: TangentFrame,
}

impl SurfaceView {
    pub fn new(altitude: f32) -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            altitude,
            local_yaw: 0.0,
            local_pitch: SURFACE_PITCH_START,
            frame: TangentFrame {
                normal: math::world_up(),
                north: glm::vec3(0.0, 0.0, -1.0),
                east: glm::vec3(1.0, 0.0, 0.0),
            },
        }
    }
}

impl CameraController {
    pub fn surface_view(&self) -> Option<&SurfaceView> {
        (self.follow_mode == FollowMode::Surface).then_some(&self.surface)
    }

    /// Puts the camera on `handle`'s surface.
    ///
    /// With `coordinates` of `None` the spot is taken from where the camera is
    /// looking, or from the point under the camera when the view misses.
    pub fn enter_surface_view(
        &mut self,
        world: &World,
        handle: BodyHandle,
        coordinates: Option<(f32, f32)>,
    ) -> bool {
        let Some(body) = world.body(handle) else {
            log::warn!("enter_surface_view: stale body handle {:?}", handle);
            return false;
        };
        let frame = body.frame();
        let front = self.state.front();

        let (latitude, longitude, local_yaw) = match coordinates {
            Some((lat, lon)) => (lat, lon, 0.0),
            None => {
                let ground = math::ray_sphere_intersection(
                    &self.state.position,
                    &front,
                    &body.position,
                    body.display_radius,
                )
                .map(|t| self.state.position + front * t)
                .unwrap_or(self.state.position);
                let outward = ground - body.position;
                let (lat, lon) = if glm::length(&outward) > f32::EPSILON {
                    frame.lat_lon(&outward)
                } else {
                    (0.0, 0.0)
                };
                let tangent = frame.tangent_frame(lat, lon);
                let north = glm::dot(&front, &tangent.north);
                let east = glm::dot(&front, &tangent.east);
                let heading = if north.abs() + east.abs() > 1.0e-6 {
                    east.atan2(north).to_degrees()
                } else {
                    0.0
                };
                (lat, lon, heading)
            }
        };

        self.focus = Focus::Body(handle);
        self.follow_mode = FollowMode::Surface;
        self.selected = Some(handle);
        self.last_julian_date = Some(world.julian_date);
        self.surface.latitude = latitude.clamp(-FRAC_PI_2, FRAC_PI_2);
        self.surface.longitude = math::normalize_longitude(longitude);
        self.surface.altitude = self.settings.surface_altitude;
        self.surface.local_yaw = local_yaw;
        self.surface.local_pitch = SURFACE_PITCH_START;
        self.update_surface(body);

        log::info!(
            "Surface view on {} at lat {:.2}°, lon {:.2}°",
            body.name,
            self.surface.latitude.to_degrees(),
            self.surface.longitude.to_degrees()
        );
        true
    }

    /// Back to fixed follow at the current position.
    pub fn exit_surface_view(&mut self, world: &World) -> bool {
        if self.follow_mode != FollowMode::Surface {
            return false;
        }
        self.leave_surface_orientation();
        self.follow_mode = FollowMode::Fixed;
        match self.focused_body().and_then(|h| world.body(h)) {
            Some(body) => {
                self.focus_offset = self.state.position - body.position;
                log::info!("Left surface view on {}", body.name);
            }
            None => self.clear_focus(),
        }
        true
    }

    /// Swaps the surface normal for world up, keeping the look direction.
    pub(super) fn leave_surface_orientation(&mut self) {
        let front = self.state.front();
        self.state.reference_up = math::world_up();
        self.state.roll = 0.0;
        self.state.look_along(&front);
        self.state.clamp_pitch();
        self.state.fov = self.settings.fov_degrees;
    }

    /// Re-derives position and orientation from the surface coordinates.
    pub(super) fn update_surface(&mut self, body: &Body) {
        let tangent = body
            .frame()
            .tangent_frame(self.surface.latitude, self.surface.longitude);
        self.surface.frame = tangent;
        let height = body.display_radius * (1.0 + self.surface.altitude);
        self.state.position = body.position + tangent.normal * height;
        self.clamp_surface_orientation();
        self.apply_surface_orientation();
    }

    fn clamp_surface_orientation(&mut self) {
        self.surface.local_pitch = self.surface.local_pitch.clamp(0.0, SURFACE_PITCH_MAX);
        self.surface.local_yaw =
            math::normalize_longitude(self.surface.local_yaw.to_radians()).to_degrees();
    }

    fn apply_surface_orientation(&mut self) {
        let t = self.surface.frame;
        let (sin_yaw, cos_yaw) = self.surface.local_yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.surface.local_pitch.to_radians().sin_cos();
        let direction = (t.north * cos_yaw + t.east * sin_yaw) * cos_pitch + t.normal * sin_pitch;
        self.state.reference_up = t.normal;
        self.state.roll = 0.0;
        self.state.look_along(&direction);
    }

    pub(super) fn look_on_surface(&mut self, delta_x: f32, delta_y: f32) {
        self.surface.local_yaw += delta_x * self.settings.rotate_speed;
        self.surface.local_pitch -= delta_y * self.settings.rotate_speed;
        self.clamp_surface_orientation();
        self.apply_surface_orientation();
    }

    /// Walks along the current heading. `forward`/`strafe` are -1..1.
    pub(super) fn move_on_surface(&mut self, forward: f32, strafe: f32, dt: f32, world: &World) {
        if forward == 0.0 && strafe == 0.0 {
            return;
        }
        let Some(handle) = self.focused_body() else {
            return;
        };
        let Some(body) = world.body(handle) else {
            return;
        };

        let boost = if self.keys.boost {
            self.settings.boost_multiplier
        } else {
            1.0
        };
        let step = self.settings.surface_move_speed * boost * dt;
        let (sin_h, cos_h) = self.surface.local_yaw.to_radians().sin_cos();
        let mut north = forward * cos_h - strafe * sin_h;
        let mut east = forward * sin_h + strafe * cos_h;
        let length = (north * north + east * east).sqrt();
        if length > 1.0 {
            north /= length;
            east /= length;
        }

        let cos_lat = self.surface.latitude.cos().max(COS_LATITUDE_FLOOR);
        self.surface.latitude = (self.surface.latitude + north * step).clamp(-FRAC_PI_2, FRAC_PI_2);
        self.surface.longitude = math::normalize_longitude(self.surface.longitude + east * step / cos_lat);
        self.update_surface(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputEvent, Key};
    use crate::settings::CameraSettings;

    fn setup() -> (World, BodyHandle, CameraController) {
        let mut world = World::new(2_451_545.0);
        let mut body = Body::new("earth", glm::vec3(0.0, 0.0, 0.0), 2.0);
        body.rotation_axis = glm::normalize(&glm::vec3(0.1, 1.0, 0.0));
        body.rotation_angle = 0.4;
        let handle = world.bodies.insert(body);
        let camera = CameraController::new(CameraSettings::default(), 800, 600);
        (world, handle, camera)
    }

    fn assert_on_surface(camera: &CameraController, world: &World, handle: BodyHandle) {
        let body = world.body(handle).unwrap();
        let expected = body.display_radius * (1.0 + camera.settings().surface_altitude);
        let distance = glm::distance(&camera.position(), &body.position);
        assert!((distance - expected).abs() < 1.0e-4, "{distance} vs {expected}");
        assert!(camera.position().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn entering_at_coordinates_places_camera_above_them() {
        let (world, earth, mut camera) = setup();
        assert!(camera.enter_surface_view(&world, earth, Some((0.3, 1.2))));
        assert_eq!(camera.follow_mode(), FollowMode::Surface);
        assert_on_surface(&camera, &world, earth);

        let body = world.body(earth).unwrap();
        let (lat, lon) = body.frame().lat_lon(&(camera.position() - body.position));
        assert!((lat - 0.3).abs() < 1.0e-4);
        assert!((lon - 1.2).abs() < 1.0e-4);
    }

    #[test]
    fn entering_from_view_uses_the_look_point() {
        let (world, earth, mut camera) = setup();
        // Default camera sits on +Z looking at the origin.
        camera.enter_surface_view(&world, earth, None);
        assert_on_surface(&camera, &world, earth);
        let up = glm::normalize(&camera.position());
        assert!(glm::dot(&up, &glm::vec3(0.0, 0.0, 1.0)) > 0.999);
    }

    #[test]
    fn view_stays_above_the_horizon() {
        let (world, earth, mut camera) = setup();
        camera.enter_surface_view(&world, earth, Some((0.0, 0.0)));
        camera.look_on_surface(0.0, 10_000.0);
        assert_eq!(camera.surface_view().unwrap().local_pitch, 0.0);
        camera.look_on_surface(0.0, -10_000.0);
        assert_eq!(camera.surface_view().unwrap().local_pitch, SURFACE_PITCH_MAX);

        let normal = camera.surface_view().unwrap().frame.normal;
        assert!(glm::dot(&camera.state().front(), &normal) > 0.99);
    }

    #[test]
    fn walking_near_the_pole_stays_finite() {
        let (world, earth, mut camera) = setup();
        let lat = 89.999f32.to_radians();
        camera.enter_surface_view(&world, earth, Some((lat, 0.0)));
        camera.handle_event(
            &InputEvent::Key {
                key: Key::Right,
                pressed: true,
            },
            &world,
        );
        let before = camera.position();
        for _ in 0..60 {
            camera.process_keyboard(1.0 / 60.0, &world);
        }
        let view = camera.surface_view().unwrap();
        assert!(view.latitude.is_finite() && view.longitude.is_finite());
        assert!(view.longitude >= -std::f32::consts::PI && view.longitude < std::f32::consts::PI);
        assert_on_surface(&camera, &world, earth);
        assert!(glm::distance(&camera.position(), &before) < 0.1);
    }

    #[test]
    fn walking_north_over_the_pole_clamps() {
        let (world, earth, mut camera) = setup();
        camera.enter_surface_view(&world, earth, Some((1.5, 0.3)));
        for _ in 0..200 {
            camera.move_on_surface(1.0, 0.0, 0.1, &world);
        }
        let view = camera.surface_view().unwrap();
        assert!((view.latitude - FRAC_PI_2).abs() < 1.0e-6);
        assert_on_surface(&camera, &world, earth);
    }

    #[test]
    fn exit_restores_world_up_and_fixed_follow() {
        let (world, earth, mut camera) = setup();
        camera.enter_surface_view(&world, earth, Some((0.5, -0.5)));
        let position = camera.position();
        assert!(camera.exit_surface_view(&world));

        assert_eq!(camera.follow_mode(), FollowMode::Fixed);
        assert_eq!(camera.focused_body(), Some(earth));
        assert_eq!(camera.state().reference_up, math::world_up());
        assert_eq!(camera.position(), position);
        assert!(!camera.exit_surface_view(&world));
    }

    #[test]
    fn surface_follows_body_spin() {
        let (mut world, earth, mut camera) = setup();
        camera.enter_surface_view(&world, earth, Some((0.2, 0.0)));
        let before = camera.position();
        world.bodies.get_mut(earth).unwrap().rotation_angle += 1.0;
        camera.update_follow_target(&world);
        assert!(glm::distance(&camera.position(), &before) > 0.5);
        assert_on_surface(&camera, &world, earth);
    }
}
