use nalgebra_glm as glm;

use super::math::{self, OrientationBasis};

/// Pitch limit outside of surface view, degrees.
pub const PITCH_LIMIT: f32 = 89.0;

/// Camera position and orientation with the pose it resets to.
#[derive(Debug, Clone)]
pub struct CameraState {
    pub position: glm::Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    /// Vertical field of view, degrees.
    pub fov: f32,
    /// World up in free flight, the surface normal on the ground.
    pub reference_up: glm::Vec3,
    pub default_position: glm::Vec3,
    pub default_yaw: f32,
    pub default_pitch: f32,
    pub default_roll: f32,
}

impl CameraState {
    pub fn new(position: glm::Vec3, yaw: f32, pitch: f32, fov: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
            roll: 0.0,
            fov,
            reference_up: math::world_up(),
            default_position: position,
            default_yaw: yaw,
            default_pitch: pitch,
            default_roll: 0.0,
        }
    }

    /// Makes the current pose the one [`CameraState::reset`] returns to.
    pub fn capture_default(&mut self) {
        self.default_position = self.position;
        self.default_yaw = self.yaw;
        self.default_pitch = self.pitch;
        self.default_roll = self.roll;
    }

    pub fn reset(&mut self) {
        self.position = self.default_position;
        self.yaw = self.default_yaw;
        self.pitch = self.default_pitch;
        self.roll = self.default_roll;
        self.reference_up = math::world_up();
    }

    pub fn basis(&self) -> OrientationBasis {
        math::orientation_basis(self.yaw, self.pitch, self.roll, &self.reference_up)
    }

    pub fn front(&self) -> glm::Vec3 {
        self.basis().front
    }

    pub fn right(&self) -> glm::Vec3 {
        self.basis().right
    }

    pub fn up(&self) -> glm::Vec3 {
        self.basis().up
    }

    pub fn view_matrix(&self) -> glm::Mat4 {
        let basis = self.basis();
        glm::look_at(&self.position, &(self.position + basis.front), &basis.up)
    }

    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> glm::Mat4 {
        glm::perspective(aspect, self.fov.to_radians(), near, far)
    }

    /// Points the camera along `direction`, keeping roll.
    pub fn look_along(&mut self, direction: &glm::Vec3) {
        if glm::length(direction) < f32::EPSILON {
            return;
        }
        let (yaw, pitch) = math::angles_from_direction(direction);
        self.yaw = yaw;
        self.pitch = pitch;
    }

    pub fn look_at(&mut self, target: &glm::Vec3) {
        self.look_along(&(target - self.position));
    }

    pub fn clamp_pitch(&mut self) {
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Keeps yaw in [-180, 180) so it does not grow without bound.
    pub fn wrap_yaw(&mut self) {
        self.yaw = math::normalize_longitude(self.yaw.to_radians()).to_degrees();
    }

    pub fn get_orientation(&self) -> (f32, f32, f32) {
        (self.yaw, self.pitch, self.roll)
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(glm::vec3(0.0, 0.0, 10.0), 0.0, 0.0, 45.0)
    }
}
