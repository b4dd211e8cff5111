//! Demo body positions: circular coplanar orbits about each parent.

use std::f64::consts::TAU;
use std::time::{SystemTime, UNIX_EPOCH};

use nalgebra_glm as glm;

use crate::body::{Body, BodyHandle, City};
use crate::camera::math;
use crate::catalog::BodyCatalog;
use crate::world::{LagrangePoint, World};

pub const J2000: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Anything that can move the bodies of a world to its current Julian date.
pub trait Ephemeris {
    fn advance(&mut self, world: &mut World);
}

/// Julian date of the system clock; J2000 if the clock is before 1970.
pub fn julian_date_now() -> f64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => UNIX_EPOCH_JD + elapsed.as_secs_f64() / SECONDS_PER_DAY,
        Err(_) => J2000,
    }
}

/// An orbit path to draw: a circle in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCircle {
    pub center: glm::Vec3,
    pub radius: f32,
    pub color: [f32; 3],
}

pub struct CircularEphemeris {
    catalog: BodyCatalog,
    parents: Vec<Option<usize>>,
    handles: Vec<BodyHandle>,
}

impl CircularEphemeris {
    /// Expects a validated catalog: parents are listed before their children.
    pub fn new(catalog: BodyCatalog) -> Self {
        let parents = catalog
            .bodies
            .iter()
            .map(|spec| {
                spec.parent
                    .as_ref()
                    .and_then(|p| catalog.bodies.iter().position(|b| &b.name == p))
            })
            .collect();
        Self {
            catalog,
            parents,
            handles: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &BodyCatalog {
        &self.catalog
    }

    /// Replaces the world's bodies with the catalog's. Old handles go stale.
    pub fn populate(&mut self, world: &mut World) {
        world.bodies.clear();
        world.lagrange_points.clear();
        self.handles = self
            .catalog
            .bodies
            .iter()
            .map(|spec| {
                let mut body = Body::new(spec.name.clone(), glm::vec3(0.0, 0.0, 0.0), spec.display_radius);
                body.kind = spec.kind;
                body.color = spec.color;
                body.pickable = spec.pickable;
                body.rotation_axis = glm::rotate_vec3(
                    &math::world_up(),
                    spec.axial_tilt_deg.to_radians(),
                    &glm::vec3(1.0, 0.0, 0.0),
                );
                body.rotation_rate = if spec.rotation_period_hours != 0.0 {
                    (TAU / (spec.rotation_period_hours * 3600.0)) as f32
                } else {
                    0.0
                };
                body.cities = spec
                    .cities
                    .iter()
                    .map(|c| City {
                        name: c.name.clone(),
                        latitude: c.latitude_deg.to_radians(),
                        longitude: c.longitude_deg.to_radians(),
                    })
                    .collect();
                world.bodies.insert(body)
            })
            .collect();
        self.advance(world);
        log::info!("World populated with {} bodies", self.handles.len());
    }

    pub fn handle(&self, name: &str) -> Option<BodyHandle> {
        let index = self.catalog.bodies.iter().position(|b| b.name == name)?;
        self.handles.get(index).copied()
    }

    /// Positions in catalog order at `julian_date`.
    fn positions(&self, julian_date: f64) -> Vec<glm::Vec3> {
        let days = julian_date - J2000;
        let mut positions: Vec<glm::Vec3> = Vec::with_capacity(self.catalog.bodies.len());
        for (spec, parent) in self.catalog.bodies.iter().zip(&self.parents) {
            let centre = parent
                .and_then(|p| positions.get(p).copied())
                .unwrap_or_else(|| glm::vec3(0.0, 0.0, 0.0));
            let position = if spec.orbit_period_days != 0.0 && spec.orbit_radius > 0.0 {
                let angle = (spec.orbit_phase_deg as f64).to_radians()
                    + TAU * (days / spec.orbit_period_days).rem_euclid(1.0);
                let (s, c) = (angle as f32).sin_cos();
                centre + glm::vec3(c, 0.0, -s) * spec.orbit_radius
            } else {
                centre + glm::vec3(spec.orbit_radius, 0.0, 0.0)
            };
            positions.push(position);
        }
        positions
    }

    pub fn orbit_circles(&self, world: &World) -> Vec<OrbitCircle> {
        self.catalog
            .bodies
            .iter()
            .zip(&self.parents)
            .filter(|(spec, _)| spec.orbit_radius > 0.0)
            .filter_map(|(spec, parent)| {
                let parent = self.handles.get((*parent)?)?;
                let center = world.body(*parent)?.position;
                Some(OrbitCircle {
                    center,
                    radius: spec.orbit_radius,
                    color: spec.color,
                })
            })
            .collect()
    }
}

impl Ephemeris for CircularEphemeris {
    fn advance(&mut self, world: &mut World) {
        let julian_date = world.julian_date;
        let seconds = (julian_date - J2000) * SECONDS_PER_DAY;
        let positions = self.positions(julian_date);

        for (handle, position) in self.handles.iter().zip(&positions) {
            let Some(body) = world.bodies.get_mut(*handle) else {
                continue;
            };
            body.position = *position;
            body.rotation_angle = (body.rotation_rate as f64 * seconds).rem_euclid(TAU) as f32;
        }

        world.lagrange_points.clear();
        for pair in &self.catalog.lagrange_pairs {
            let index = |name: &str| self.catalog.bodies.iter().position(|b| b.name == name);
            let (Some(p), Some(s)) = (index(&pair.primary), index(&pair.secondary)) else {
                continue;
            };
            let prefix = format!("{}-{}", pair.primary, pair.secondary);
            for (suffix, position) in
                lagrange_points(&positions[p], &positions[s], pair.mass_ratio)
            {
                world.lagrange_points.push(LagrangePoint {
                    name: format!("{prefix} {suffix}"),
                    position,
                    radius: pair.marker_radius,
                });
            }
        }
    }
}

/// L1..L5 of a pair in a circular orbit about the +Y axis.
pub fn lagrange_points(
    primary: &glm::Vec3,
    secondary: &glm::Vec3,
    mass_ratio: f32,
) -> [(&'static str, glm::Vec3); 5] {
    let separation = secondary - primary;
    let r = glm::length(&separation);
    let u = if r > f32::EPSILON {
        separation / r
    } else {
        glm::vec3(1.0, 0.0, 0.0)
    };
    let hill = r * (mass_ratio / 3.0).cbrt();
    let l3 = r * (1.0 + 5.0 * mass_ratio / 12.0);
    let lead = glm::rotate_vec3(&separation, 60f32.to_radians(), &math::world_up());
    let trail = glm::rotate_vec3(&separation, -60f32.to_radians(), &math::world_up());
    [
        ("L1", secondary - u * hill),
        ("L2", secondary + u * hill),
        ("L3", primary - u * l3),
        ("L4", primary + lead),
        ("L5", primary + trail),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    fn world_at(julian_date: f64) -> (World, CircularEphemeris) {
        let mut world = World::new(julian_date);
        let mut ephemeris = CircularEphemeris::new(BodyCatalog::builtin().unwrap());
        ephemeris.populate(&mut world);
        (world, ephemeris)
    }

    #[test]
    fn orbit_radius_is_kept() {
        let (world, ephemeris) = world_at(J2000 + 123.4);
        let sun = world.body(ephemeris.handle("Sun").unwrap()).unwrap().position;
        let earth = world.body(ephemeris.handle("Earth").unwrap()).unwrap().position;
        let moon = world.body(ephemeris.handle("Moon").unwrap()).unwrap().position;
        assert!(approx_eq(glm::distance(&sun, &earth), 45.0, 1.0e-3));
        assert!(approx_eq(glm::distance(&earth, &moon), 4.0, 1.0e-3));
        assert_eq!(earth.y, 0.0);
    }

    #[test]
    fn position_repeats_after_a_period() {
        let (mut world, mut ephemeris) = world_at(J2000);
        let earth = ephemeris.handle("Earth").unwrap();
        let start = world.body(earth).unwrap().position;
        world.julian_date += 365.256;
        ephemeris.advance(&mut world);
        let after = world.body(earth).unwrap().position;
        assert!(glm::distance(&start, &after) < 1.0e-2);
    }

    #[test]
    fn spin_is_zero_at_epoch_and_tilted() {
        let (world, ephemeris) = world_at(J2000);
        let earth = world.body(ephemeris.handle("Earth").unwrap()).unwrap();
        assert_eq!(earth.rotation_angle, 0.0);
        let tilt = glm::dot(&earth.rotation_axis, &math::world_up()).acos().to_degrees();
        assert!(approx_eq(tilt, 23.44, 1.0e-3));
        assert!(earth.rotation_rate > 7.0e-5 && earth.rotation_rate < 7.5e-5);
    }

    #[test]
    fn lagrange_geometry() {
        let primary = glm::vec3(0.0, 0.0, 0.0);
        let secondary = glm::vec3(10.0, 0.0, 0.0);
        let points = lagrange_points(&primary, &secondary, 0.03);
        let hill = 10.0 * 0.01f32.cbrt();
        assert!(approx_eq(points[0].1.x, 10.0 - hill, 1.0e-4));
        assert!(approx_eq(points[1].1.x, 10.0 + hill, 1.0e-4));
        assert!(approx_eq(points[2].1.x, -10.0 * (1.0 + 5.0 * 0.03 / 12.0), 1.0e-4));
        for (_, l) in &points[3..] {
            assert!(approx_eq(glm::distance(l, &primary), 10.0, 1.0e-4));
            assert!(approx_eq(glm::distance(l, &secondary), 10.0, 1.0e-4));
        }
    }

    #[test]
    fn lagrange_points_are_published_by_name() {
        let (world, _) = world_at(J2000);
        assert_eq!(world.lagrange_points.len(), 10);
        assert!(world.lagrange_point("Sun-Earth L2").is_some());
        assert!(world.lagrange_point("Earth-Moon L4").is_some());
    }

    #[test]
    fn repopulating_invalidates_old_handles() {
        let (mut world, mut ephemeris) = world_at(J2000);
        let old = ephemeris.handle("Mars").unwrap();
        ephemeris.populate(&mut world);
        assert!(!world.bodies.contains(old));
        assert!(world.bodies.contains(ephemeris.handle("Mars").unwrap()));
    }

    #[test]
    fn orbit_circles_follow_parents() {
        let (world, ephemeris) = world_at(J2000);
        let circles = ephemeris.orbit_circles(&world);
        assert_eq!(circles.len(), 9);
        let earth = world.body(ephemeris.handle("Earth").unwrap()).unwrap().position;
        assert!(circles.iter().any(|c| c.center == earth && c.radius == 4.0));
    }

    #[test]
    fn clock_is_after_j2000() {
        assert!(julian_date_now() > J2000);
    }
}
