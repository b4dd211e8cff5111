use nalgebra_glm as glm;

use crate::body::{Body, BodyArena, BodyHandle};

/// A Lagrange point of a primary/secondary pair, refreshed by the ephemeris.
#[derive(Debug, Clone, PartialEq)]
pub struct LagrangePoint {
    pub name: String,
    pub position: glm::Vec3,
    /// Marker radius used for picking and focus distance.
    pub radius: f32,
}

/// Everything the camera reads about the scene for one frame.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub bodies: BodyArena,
    pub lagrange_points: Vec<LagrangePoint>,
    pub julian_date: f64,
}

impl World {
    pub fn new(julian_date: f64) -> Self {
        Self {
            julian_date,
            ..Self::default()
        }
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    pub fn lagrange_point(&self, name: &str) -> Option<&LagrangePoint> {
        self.lagrange_points.iter().find(|p| p.name == name)
    }
}
