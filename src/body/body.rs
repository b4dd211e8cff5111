use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

use crate::camera::math::BodyFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
}

/// Named surface location; latitude/longitude are body-fixed radians.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub name: String,
    pub latitude: f32,
    pub longitude: f32,
}

/// A body as seen by the camera for one frame.
#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    pub kind: BodyKind,
    pub position: glm::Vec3,
    pub display_radius: f32,
    /// Unit spin axis in world space.
    pub rotation_axis: glm::Vec3,
    /// Spin rate in radians per second.
    pub rotation_rate: f32,
    /// Current spin angle of the prime meridian, radians.
    pub rotation_angle: f32,
    pub color: [f32; 3],
    pub pickable: bool,
    pub cities: Vec<City>,
}

impl Body {
    pub fn new(name: impl Into<String>, position: glm::Vec3, display_radius: f32) -> Self {
        Self {
            name: name.into(),
            kind: BodyKind::Planet,
            position,
            display_radius,
            rotation_axis: glm::vec3(0.0, 1.0, 0.0),
            rotation_rate: 0.0,
            rotation_angle: 0.0,
            color: [0.8, 0.8, 0.8],
            pickable: true,
            cities: Vec::new(),
        }
    }

    /// Body-fixed frame at the current spin angle.
    pub fn frame(&self) -> BodyFrame {
        BodyFrame::new(&self.rotation_axis, self.rotation_angle)
    }

    pub fn surface_distance(&self, point: &glm::Vec3) -> f32 {
        glm::distance(point, &self.position) - self.display_radius
    }
}
