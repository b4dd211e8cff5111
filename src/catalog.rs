use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::body::BodyKind;
use crate::error::{CatalogError, VizError};

/// Catalog compiled into the binary, used when no path is given.
pub const BUILTIN_CATALOG: &str = include_str!("../assets/solar_system.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySpec {
    pub name: String,
    pub latitude_deg: f32,
    pub longitude_deg: f32,
}

fn default_color() -> [f32; 3] {
    [0.8, 0.8, 0.8]
}

fn default_true() -> bool {
    true
}

/// One body as described on disk. Distances are scene units, angles degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub name: String,
    pub kind: BodyKind,
    /// Must name a body listed earlier in the catalog.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub orbit_radius: f32,
    #[serde(default)]
    pub orbit_period_days: f64,
    #[serde(default)]
    pub orbit_phase_deg: f32,
    pub display_radius: f32,
    /// Sidereal day; zero or absent means the body does not spin.
    #[serde(default)]
    pub rotation_period_hours: f64,
    #[serde(default)]
    pub axial_tilt_deg: f32,
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    #[serde(default = "default_true")]
    pub pickable: bool,
    #[serde(default)]
    pub cities: Vec<CitySpec>,
}

/// Primary/secondary pair whose L1..L5 points are published to the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagrangePairSpec {
    pub primary: String,
    pub secondary: String,
    /// secondary / (primary + secondary)
    pub mass_ratio: f32,
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f32,
}

fn default_marker_radius() -> f32 {
    0.2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyCatalog {
    pub bodies: Vec<BodySpec>,
    #[serde(default)]
    pub lagrange_pairs: Vec<LagrangePairSpec>,
}

impl BodyCatalog {
    pub fn from_json(text: &str) -> Result<Self, VizError> {
        let catalog: BodyCatalog = serde_json::from_str(text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, VizError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            VizError::new("catalog-read")
                .with_arg("path", path.display())
                .push_std(e)
        })?;
        let catalog = Self::from_json(&text).map_err(|e| {
            VizError::new("catalog-load")
                .with_arg("path", path.display())
                .push_viz(e)
        })?;
        log::info!(
            "Loaded catalog {} ({} bodies, {} Lagrange pairs)",
            path.display(),
            catalog.bodies.len(),
            catalog.lagrange_pairs.len()
        );
        Ok(catalog)
    }

    pub fn builtin() -> Result<Self, VizError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.bodies.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for body in &self.bodies {
            if !(body.display_radius > 0.0) {
                return Err(CatalogError::NonPositiveRadius {
                    body: body.name.clone(),
                    radius: body.display_radius,
                });
            }
            if let Some(parent) = &body.parent {
                if !seen.contains(parent.as_str()) {
                    return Err(CatalogError::UnknownParent {
                        body: body.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
            if !seen.insert(body.name.as_str()) {
                return Err(CatalogError::DuplicateName(body.name.clone()));
            }
        }
        for pair in &self.lagrange_pairs {
            if !seen.contains(pair.primary.as_str()) || !seen.contains(pair.secondary.as_str()) {
                return Err(CatalogError::UnknownLagrangePair {
                    primary: pair.primary.clone(),
                    secondary: pair.secondary.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(name: &str, parent: Option<&str>) -> BodySpec {
        BodySpec {
            name: name.into(),
            kind: BodyKind::Planet,
            parent: parent.map(str::to_owned),
            orbit_radius: 10.0,
            orbit_period_days: 365.0,
            orbit_phase_deg: 0.0,
            display_radius: 1.0,
            rotation_period_hours: 24.0,
            axial_tilt_deg: 0.0,
            color: default_color(),
            pickable: true,
            cities: Vec::new(),
        }
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = BodyCatalog::builtin().unwrap();
        assert!(catalog.bodies.iter().any(|b| b.name == "Earth"));
        assert!(!catalog.lagrange_pairs.is_empty());
    }

    #[test]
    fn parent_must_come_first() {
        let catalog = BodyCatalog {
            bodies: vec![body("Moon", Some("Earth")), body("Earth", None)],
            lagrange_pairs: Vec::new(),
        };
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::UnknownParent {
                body: "Moon".into(),
                parent: "Earth".into()
            })
        );
    }

    #[test]
    fn duplicates_and_empty_are_rejected() {
        let empty = BodyCatalog {
            bodies: Vec::new(),
            lagrange_pairs: Vec::new(),
        };
        assert_eq!(empty.validate(), Err(CatalogError::Empty));

        let twice = BodyCatalog {
            bodies: vec![body("Earth", None), body("Earth", None)],
            lagrange_pairs: Vec::new(),
        };
        assert_eq!(twice.validate(), Err(CatalogError::DuplicateName("Earth".into())));
    }

    #[test]
    fn unknown_lagrange_body_is_rejected() {
        let catalog = BodyCatalog {
            bodies: vec![body("Sun", None)],
            lagrange_pairs: vec![LagrangePairSpec {
                primary: "Sun".into(),
                secondary: "Earth".into(),
                mass_ratio: 0.001,
                marker_radius: 0.2,
            }],
        };
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::UnknownLagrangePair { .. })
        ));
    }

    #[test]
    fn json_defaults_fill_optional_fields() {
        let catalog = BodyCatalog::from_json(
            r#"{ "bodies": [ { "name": "Sun", "kind": "star", "display_radius": 5.0 } ] }"#,
        )
        .unwrap();
        let sun = &catalog.bodies[0];
        assert_eq!(sun.parent, None);
        assert!(sun.pickable);
        assert_eq!(sun.rotation_period_hours, 0.0);
    }

    #[test]
    fn malformed_json_reports_line() {
        let err = BodyCatalog::from_json("{\n  \"bodies\": [,]\n}").unwrap_err();
        assert_eq!(err.key, "catalog-json");
        assert_eq!(err.args.get("line").map(String::as_str), Some("2"));
    }
}
