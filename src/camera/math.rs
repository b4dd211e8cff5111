//! Vector and ray helpers shared by the camera model.
//!
//! Angles passed in as yaw/pitch/roll are degrees; latitude/longitude are
//! radians. World up is +Y and `yaw = pitch = 0` looks down -Z.

use nalgebra_glm as glm;
use std::f32::consts::{PI, TAU};

pub fn world_up() -> glm::Vec3 {
    glm::vec3(0.0, 1.0, 0.0)
}

/// Distance along a unit `direction` to the first intersection with the sphere.
///
/// Returns `None` when the ray misses, when the sphere lies behind the origin,
/// or when the origin is inside the sphere.
pub fn ray_sphere_intersection(
    origin: &glm::Vec3,
    direction: &glm::Vec3,
    center: &glm::Vec3,
    radius: f32,
) -> Option<f32> {
    let oc = origin - center;
    let b = glm::dot(&oc, direction);
    let c = glm::dot(&oc, &oc) - radius * radius;
    if c < 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if !(discriminant >= 0.0) {
        return None;
    }
    let t = -b - discriminant.sqrt();
    if t.is_finite() && t >= 0.0 { Some(t) } else { None }
}

/// Unit look direction for yaw (about world up) and pitch (towards world up).
pub fn front_from_angles(yaw_deg: f32, pitch_deg: f32) -> glm::Vec3 {
    let (sy, cy) = yaw_deg.to_radians().sin_cos();
    let (sp, cp) = pitch_deg.to_radians().sin_cos();
    glm::vec3(sy * cp, sp, -cy * cp)
}

/// Inverse of [`front_from_angles`]: (yaw, pitch) in degrees.
pub fn angles_from_direction(direction: &glm::Vec3) -> (f32, f32) {
    let d = glm::normalize(direction);
    let pitch = d.y.clamp(-1.0, 1.0).asin();
    let yaw = d.x.atan2(-d.z);
    (yaw.to_degrees(), pitch.to_degrees())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationBasis {
    pub front: glm::Vec3,
    pub right: glm::Vec3,
    pub up: glm::Vec3,
}

/// Orthonormal front/right/up for the given Euler angles.
///
/// `reference_up` is world up in free flight and the surface normal on the
/// ground. Roll turns right/up about front.
pub fn orientation_basis(
    yaw_deg: f32,
    pitch_deg: f32,
    roll_deg: f32,
    reference_up: &glm::Vec3,
) -> OrientationBasis {
    let front = front_from_angles(yaw_deg, pitch_deg);
    let mut right = glm::cross(&front, reference_up);
    if glm::length(&right) < 1.0e-6 {
        // Looking straight along the reference; fall back to the yaw heading.
        let (sy, cy) = yaw_deg.to_radians().sin_cos();
        right = glm::vec3(cy, 0.0, sy);
    }
    let right = glm::normalize(&right);
    let up = glm::cross(&right, &front);

    let (sr, cr) = roll_deg.to_radians().sin_cos();
    let rolled_right = glm::normalize(&(right * cr + up * sr));
    let rolled_up = glm::normalize(&glm::cross(&rolled_right, &front));
    OrientationBasis {
        front,
        right: rolled_right,
        up: rolled_up,
    }
}

/// Wraps a longitude into [-PI, PI).
pub fn normalize_longitude(longitude: f32) -> f32 {
    (longitude + PI).rem_euclid(TAU) - PI
}

/// Local ground frame at a surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFrame {
    pub normal: glm::Vec3,
    pub north: glm::Vec3,
    pub east: glm::Vec3,
}

/// Body-fixed axes: spin axis, prime meridian and the 90° east meridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame {
    pub axis: glm::Vec3,
    pub meridian: glm::Vec3,
    pub east: glm::Vec3,
}

impl BodyFrame {
    pub fn new(axis: &glm::Vec3, rotation_angle: f32) -> Self {
        let axis = if glm::length(axis) > 1.0e-6 {
            glm::normalize(axis)
        } else {
            world_up()
        };
        let reference = if axis.x.abs() < 0.9 {
            glm::vec3(1.0, 0.0, 0.0)
        } else {
            glm::vec3(0.0, 0.0, 1.0)
        };
        let zero_meridian = glm::normalize(&(reference - axis * glm::dot(&reference, &axis)));
        let meridian = glm::rotate_vec3(&zero_meridian, rotation_angle, &axis);
        let east = glm::cross(&axis, &meridian);
        Self {
            axis,
            meridian,
            east,
        }
    }

    /// Unit world direction from the body centre to (latitude, longitude).
    pub fn direction(&self, latitude: f32, longitude: f32) -> glm::Vec3 {
        let (slat, clat) = latitude.sin_cos();
        let (slon, clon) = longitude.sin_cos();
        (self.meridian * clon + self.east * slon) * clat + self.axis * slat
    }

    /// (latitude, longitude) of a world direction from the body centre.
    pub fn lat_lon(&self, direction: &glm::Vec3) -> (f32, f32) {
        let d = glm::normalize(direction);
        let latitude = glm::dot(&d, &self.axis).clamp(-1.0, 1.0).asin();
        let longitude = glm::dot(&d, &self.east).atan2(glm::dot(&d, &self.meridian));
        (latitude, longitude)
    }

    /// Ground frame at (latitude, longitude); well defined at the poles.
    pub fn tangent_frame(&self, latitude: f32, longitude: f32) -> TangentFrame {
        let normal = self.direction(latitude, longitude);
        let (slon, clon) = longitude.sin_cos();
        let east = glm::normalize(&(self.east * clon - self.meridian * slon));
        let north = glm::normalize(&glm::cross(&normal, &east));
        TangentFrame {
            normal,
            north,
            east,
        }
    }
}

/// World-space direction of the pick ray through pixel (x, y).
pub fn screen_ray_direction(
    cursor: (f32, f32),
    screen: (f32, f32),
    view: &glm::Mat4,
    projection: &glm::Mat4,
) -> Option<glm::Vec3> {
    let (width, height) = screen;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    let ndc_x = 2.0 * cursor.0 / width - 1.0;
    let ndc_y = 1.0 - 2.0 * cursor.1 / height;
    let inverse = glm::inverse(&(projection * view));

    let near = inverse * glm::vec4(ndc_x, ndc_y, -1.0, 1.0);
    let far = inverse * glm::vec4(ndc_x, ndc_y, 1.0, 1.0);
    if near.w.abs() < f32::EPSILON || far.w.abs() < f32::EPSILON {
        return None;
    }
    let direction = far.xyz() / far.w - near.xyz() / near.w;
    let length = glm::length(&direction);
    if !(length > f32::EPSILON) {
        return None;
    }
    Some(direction / length)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1.0e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    fn approx_vec(a: &glm::Vec3, b: &glm::Vec3) -> bool {
        glm::distance(a, b) < EPS
    }

    #[test]
    fn ray_hits_near_side_of_sphere() {
        let origin = glm::vec3(0.0, 0.0, 10.0);
        let direction = glm::vec3(0.0, 0.0, -1.0);
        let hit = ray_sphere_intersection(&origin, &direction, &glm::vec3(0.0, 0.0, 0.0), 2.0);
        assert_eq!(hit, Some(8.0));
    }

    #[test]
    fn ray_misses_sphere_behind_or_beside() {
        let origin = glm::vec3(0.0, 0.0, 10.0);
        let center = glm::vec3(0.0, 0.0, 0.0);
        let away = glm::vec3(0.0, 0.0, 1.0);
        let beside = glm::vec3(1.0, 0.0, 0.0);
        assert_eq!(ray_sphere_intersection(&origin, &away, &center, 2.0), None);
        assert_eq!(ray_sphere_intersection(&origin, &beside, &center, 2.0), None);
    }

    #[test]
    fn ray_from_inside_is_no_hit() {
        let origin = glm::vec3(0.5, 0.0, 0.0);
        let direction = glm::vec3(1.0, 0.0, 0.0);
        let hit = ray_sphere_intersection(&origin, &direction, &glm::vec3(0.0, 0.0, 0.0), 3.0);
        assert_eq!(hit, None);
    }

    #[test]
    fn grazing_ray_is_finite() {
        let origin = glm::vec3(2.0, 0.0, 10.0);
        let direction = glm::vec3(0.0, 0.0, -1.0);
        let hit = ray_sphere_intersection(&origin, &direction, &glm::vec3(0.0, 0.0, 0.0), 2.0);
        assert!(hit.map_or(true, f32::is_finite));
    }

    #[test]
    fn zero_angles_look_down_negative_z() {
        let basis = orientation_basis(0.0, 0.0, 0.0, &world_up());
        assert!(approx_vec(&basis.front, &glm::vec3(0.0, 0.0, -1.0)));
        assert!(approx_vec(&basis.right, &glm::vec3(1.0, 0.0, 0.0)));
        assert!(approx_vec(&basis.up, &glm::vec3(0.0, 1.0, 0.0)));
    }

    #[test]
    fn basis_is_orthonormal_for_any_angles() {
        for &yaw in &[-170.0, -45.0, 0.0, 33.0, 180.0] {
            for &pitch in &[-90.0, -60.0, 0.0, 45.0, 89.0, 90.0] {
                for &roll in &[-120.0, 0.0, 15.0] {
                    let b = orientation_basis(yaw, pitch, roll, &world_up());
                    for v in [&b.front, &b.right, &b.up] {
                        assert!(approx_eq(glm::length(v), 1.0), "{yaw} {pitch} {roll}");
                    }
                    assert!(glm::dot(&b.front, &b.right).abs() < EPS);
                    assert!(glm::dot(&b.front, &b.up).abs() < EPS);
                    assert!(glm::dot(&b.right, &b.up).abs() < EPS);
                }
            }
        }
    }

    #[test]
    fn angles_round_trip_through_direction() {
        let front = front_from_angles(-72.0, 31.0);
        let (yaw, pitch) = angles_from_direction(&front);
        assert!(approx_eq(yaw, -72.0));
        assert!(approx_eq(pitch, 31.0));
    }

    #[test]
    fn longitude_wraps_past_pi() {
        let wrapped = normalize_longitude(PI + 0.01);
        assert!(wrapped > -PI && wrapped <= -PI + 0.01 + 1.0e-5, "{wrapped}");
        assert!(approx_eq(normalize_longitude(-PI - 0.5), PI - 0.5));
        assert!(approx_eq(normalize_longitude(0.25), 0.25));
    }

    #[test]
    fn body_frame_round_trips_lat_lon() {
        let axis = glm::normalize(&glm::vec3(0.2, 1.0, -0.1));
        let frame = BodyFrame::new(&axis, 1.3);
        let direction = frame.direction(0.4, -2.1);
        let (lat, lon) = frame.lat_lon(&direction);
        assert!(approx_eq(lat, 0.4));
        assert!(approx_eq(lon, -2.1));
    }

    #[test]
    fn tangent_frame_north_points_along_axis_at_equator() {
        let frame = BodyFrame::new(&world_up(), 0.0);
        let t = frame.tangent_frame(0.0, 0.0);
        assert!(approx_vec(&t.north, &frame.axis));
        assert!(approx_vec(&t.normal, &frame.meridian));
    }

    #[test]
    fn tangent_frame_is_orthonormal_at_the_pole() {
        let frame = BodyFrame::new(&world_up(), 0.7);
        let t = frame.tangent_frame(std::f32::consts::FRAC_PI_2, 1.0);
        assert!(approx_eq(glm::length(&t.east), 1.0));
        assert!(approx_eq(glm::length(&t.north), 1.0));
        assert!(glm::dot(&t.normal, &t.east).abs() < EPS);
        assert!(glm::dot(&t.normal, &t.north).abs() < EPS);
    }

    #[test]
    fn centre_pixel_ray_follows_front() {
        let eye = glm::vec3(0.0, 0.0, 10.0);
        let view = glm::look_at(&eye, &glm::vec3(0.0, 0.0, 0.0), &world_up());
        let projection = glm::perspective(800.0 / 600.0, 45f32.to_radians(), 0.1, 1000.0);
        let direction =
            screen_ray_direction((400.0, 300.0), (800.0, 600.0), &view, &projection).unwrap();
        assert!(approx_vec(&direction, &glm::vec3(0.0, 0.0, -1.0)));
    }

    #[test]
    fn empty_screen_has_no_ray() {
        let m = glm::Mat4::identity();
        assert_eq!(screen_ray_direction((0.0, 0.0), (0.0, 600.0), &m, &m), None);
    }
}
