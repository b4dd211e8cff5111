use nalgebra_glm as glm;

use super::follow::FollowMode;
use super::CameraController;
use crate::body::{Body, BodyHandle};
use crate::world::World;

const CLAMP_PASSES: usize = 4;

/// How close the camera is to the body that constrains it most.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    /// 1.0 far from everything, down to the configured floor at the clamp shell.
    pub multiplier: f32,
    pub nearest: Option<BodyHandle>,
    /// Distance from the nearest body's centre the camera may not go below.
    pub min_distance: f32,
    pub surface_distance: f32,
}

impl CameraController {
    fn min_allowed_distance(&self, body: &Body) -> f32 {
        body.display_radius * (1.0 + self.settings.clamp_margin)
    }

    /// Speed damping for a single body, on a log scale of the surface gap.
    fn body_multiplier(&self, body: &Body, surface_gap: f32) -> f32 {
        let min_gap = body.display_radius * self.settings.clamp_margin;
        let far_gap = body.display_radius * self.settings.proximity_far_radii;
        if surface_gap >= far_gap {
            return 1.0;
        }
        let floor = self.settings.proximity_floor;
        if surface_gap <= min_gap || min_gap <= 0.0 {
            return floor;
        }
        let x = ((surface_gap / min_gap).ln() / (far_gap / min_gap).ln()).clamp(0.0, 1.0);
        floor + (1.0 - floor) * x
    }

    pub fn proximity(&self, world: &World) -> Proximity {
        let mut result = Proximity {
            multiplier: 1.0,
            nearest: None,
            min_distance: 0.0,
            surface_distance: f32::INFINITY,
        };
        for (handle, body) in world.bodies.iter() {
            let gap = body.surface_distance(&self.state.position);
            let multiplier = self.body_multiplier(body, gap);
            if result.nearest.is_none() || multiplier < result.multiplier {
                result = Proximity {
                    multiplier,
                    nearest: Some(handle),
                    min_distance: self.min_allowed_distance(body),
                    surface_distance: gap,
                };
            }
        }
        result
    }

    /// `(multiplier, min_distance)` for the most constraining body.
    pub fn get_proximity_speed_multiplier(&self, world: &World) -> (f32, f32) {
        let p = self.proximity(world);
        (p.multiplier, p.min_distance)
    }

    /// Pushes the camera back outside every body. Returns whether it moved.
    pub fn clamp_to_surface(&mut self, world: &World) -> bool {
        let mut clamped = false;
        for _ in 0..CLAMP_PASSES {
            let mut moved = false;
            for (_, body) in world.bodies.iter() {
                let min_distance = self.min_allowed_distance(body);
                let outward = self.state.position - body.position;
                let distance = glm::length(&outward);
                if distance >= min_distance * (1.0 - 1.0e-6) {
                    continue;
                }
                let direction = if distance > 1.0e-6 {
                    outward / distance
                } else {
                    -self.state.front()
                };
                self.state.position = body.position + direction * min_distance;
                moved = true;
            }
            if !moved {
                break;
            }
            clamped = true;
        }

        if clamped {
            log::debug!("Camera clamped outside a body");
            if self.follow_mode != FollowMode::Surface {
                if let Some(target) = self.focus_target_position(world) {
                    self.focus_offset = self.state.position - target;
                }
            }
        }
        clamped
    }

    /// Near plane scaled to the closest surface so nearby geometry is not clipped.
    pub fn dynamic_near_plane(&self, world: &World) -> f32 {
        let gap = world
            .bodies
            .iter()
            .map(|(_, body)| body.surface_distance(&self.state.position).max(0.0))
            .min_by(f32::total_cmp);
        match gap {
            Some(gap) => (gap * self.settings.near_fraction)
                .clamp(self.settings.near_min, self.settings.near_max),
            None => self.settings.near_max,
        }
    }

    pub fn projection_matrix(&self, world: &World) -> glm::Mat4 {
        self.state.projection_matrix(
            self.aspect(),
            self.dynamic_near_plane(world),
            self.settings.far_plane,
        )
    }
}
