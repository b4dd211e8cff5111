use crate::renderer::line_vertex::LineVertex;
use nalgebra_glm as glm;
use solarvis_rs::body::Body;
use solarvis_rs::camera::{CameraController, Focus};
use solarvis_rs::ephemeris::OrbitCircle;
use solarvis_rs::settings::DisplaySettings;
use solarvis_rs::world::World;
use std::f32::consts::{PI, TAU};

const GLOBE_SEGMENTS: usize = 48;
const ORBIT_SEGMENTS: usize = 256;
const GREAT_CIRCLES: usize = 4;
const PARALLELS_DEG: [f32; 5] = [-60.0, -30.0, 0.0, 30.0, 60.0];

const HOVER_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
const SELECTION_COLOR: [f32; 3] = [1.0, 0.85, 0.1];
const LAGRANGE_COLOR: [f32; 3] = [0.4, 1.0, 0.6];
const CITY_COLOR: [f32; 3] = [1.0, 0.3, 0.3];

/// Appends a closed circle as a line list.
pub fn push_circle(
    out: &mut Vec<LineVertex>,
    center: &glm::Vec3,
    u: &glm::Vec3,
    v: &glm::Vec3,
    radius: f32,
    color: [f32; 3],
    segments: usize,
) {
    let point = |i: usize| {
        let (s, c) = (TAU * i as f32 / segments as f32).sin_cos();
        center + (u * c + v * s) * radius
    };
    for i in 0..segments {
        out.push(LineVertex::new(&point(i), color));
        out.push(LineVertex::new(&point(i + 1), color));
    }
}

fn dim(color: [f32; 3], factor: f32) -> [f32; 3] {
    color.map(|c| c * factor)
}

/// Meridians and parallels in the body's spinning frame, plus city ticks.
pub fn push_globe(out: &mut Vec<LineVertex>, body: &Body, color: [f32; 3]) {
    let frame = body.frame();
    let r = body.display_radius;

    for k in 0..GREAT_CIRCLES {
        let longitude = PI * k as f32 / GREAT_CIRCLES as f32;
        let meridian = frame.direction(0.0, longitude);
        push_circle(out, &body.position, &meridian, &frame.axis, r, color, GLOBE_SEGMENTS);
    }
    for latitude in PARALLELS_DEG.map(f32::to_radians) {
        let center = body.position + frame.axis * (r * latitude.sin());
        let line_color = if latitude == 0.0 { color } else { dim(color, 0.6) };
        push_circle(
            out,
            &center,
            &frame.meridian,
            &frame.east,
            r * latitude.cos(),
            line_color,
            GLOBE_SEGMENTS,
        );
    }
    // Spin axis stub through both poles.
    out.push(LineVertex::new(&(body.position + frame.axis * (r * 1.3)), dim(color, 0.8)));
    out.push(LineVertex::new(&(body.position - frame.axis * (r * 1.3)), dim(color, 0.8)));

    for city in &body.cities {
        let normal = frame.direction(city.latitude, city.longitude);
        out.push(LineVertex::new(&(body.position + normal * r), CITY_COLOR));
        out.push(LineVertex::new(&(body.position + normal * (r * 1.05)), CITY_COLOR));
    }
}

fn push_marker(out: &mut Vec<LineVertex>, position: &glm::Vec3, size: f32, color: [f32; 3]) {
    for axis in [glm::Vec3::x(), glm::Vec3::y(), glm::Vec3::z()] {
        out.push(LineVertex::new(&(position - axis * size), color));
        out.push(LineVertex::new(&(position + axis * size), color));
    }
}

/// Everything the line pipeline draws for one frame.
pub fn build_scene_lines(
    world: &World,
    camera: &CameraController,
    orbits: &[OrbitCircle],
    display: &DisplaySettings,
) -> Vec<LineVertex> {
    let mut out = Vec::new();

    if display.show_orbits {
        for orbit in orbits {
            push_circle(
                &mut out,
                &orbit.center,
                &glm::Vec3::x(),
                &-glm::Vec3::z(),
                orbit.radius,
                dim(orbit.color, 0.35),
                ORBIT_SEGMENTS,
            );
        }
    }

    for (handle, body) in world.bodies.iter() {
        let color = if camera.hovered() == Some(handle) {
            HOVER_COLOR
        } else {
            body.color
        };
        push_globe(&mut out, body, color);
    }

    if display.show_lagrange_points {
        let focused = match camera.focus() {
            Focus::LagrangePoint(target) => Some(target.name.as_str()),
            _ => None,
        };
        for point in &world.lagrange_points {
            let color = if focused == Some(point.name.as_str()) {
                SELECTION_COLOR
            } else {
                LAGRANGE_COLOR
            };
            push_marker(&mut out, &point.position, point.radius, color);
        }
    }

    // Ring facing the camera around the selection.
    if let Some(body) = camera.selected().and_then(|h| world.body(h)) {
        let basis = camera.state().basis();
        push_circle(
            &mut out,
            &body.position,
            &basis.right,
            &basis.up,
            body.display_radius * 1.25,
            SELECTION_COLOR,
            GLOBE_SEGMENTS,
        );
    }

    out
}

/// Screen position of a world point, or `None` when behind the camera.
pub fn project_to_screen(
    point: &glm::Vec3,
    view_proj: &glm::Mat4,
    screen: (f32, f32),
) -> Option<(f32, f32)> {
    let clip = view_proj * glm::vec4(point.x, point.y, point.z, 1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    Some(((ndc_x + 1.0) * 0.5 * screen.0, (1.0 - ndc_y) * 0.5 * screen.1))
}
