use crate::error::SettingsError;

use serde::{Deserialize, Serialize};

pub const CONFY_APP_NAME: &str = "solarvis-rs";

/// Tuning for the camera controller. Angles are degrees, distances world units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub move_speed: f32,
    pub boost_multiplier: f32,
    /// Degrees per pixel of drag.
    pub rotate_speed: f32,
    /// Degrees per second while Q/E is held.
    pub roll_speed: f32,
    /// World units per pixel of middle drag, before proximity damping.
    pub pan_speed: f32,
    pub scroll_speed: f32,
    /// Degrees per pixel when orbiting a focus target.
    pub orbit_speed: f32,
    /// Radians of arc per second when walking on a surface.
    pub surface_move_speed: f32,
    pub fov_degrees: f32,
    pub fov_min_degrees: f32,
    pub fov_max_degrees: f32,
    pub max_ray_distance: f32,
    pub double_click_ms: u64,
    pub drag_threshold_px: f32,
    pub near_min: f32,
    pub near_max: f32,
    pub near_fraction: f32,
    pub far_plane: f32,
    /// Height above the ground in surface view, as a fraction of the display radius.
    pub surface_altitude: f32,
    /// Clearance kept outside every body, as a fraction of the display radius.
    pub clamp_margin: f32,
    /// Surface distance, in radii, beyond which movement is undamped.
    pub proximity_far_radii: f32,
    pub proximity_floor: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub double_click_enters_surface: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            move_speed: 20.0,
            boost_multiplier: 5.0,
            rotate_speed: 0.15,
            roll_speed: 45.0,
            pan_speed: 0.05,
            scroll_speed: 1.0,
            orbit_speed: 0.25,
            surface_move_speed: 0.05,
            fov_degrees: 45.0,
            fov_min_degrees: 5.0,
            fov_max_degrees: 90.0,
            max_ray_distance: 10_000.0,
            double_click_ms: 200,
            drag_threshold_px: 4.0,
            near_min: 1.0e-4,
            near_max: 0.1,
            near_fraction: 0.25,
            far_plane: 20_000.0,
            surface_altitude: 0.01,
            clamp_margin: 0.002,
            proximity_far_radii: 100.0,
            proximity_floor: 0.01,
            speed_min: 0.01,
            speed_max: 2_000.0,
            double_click_enters_surface: false,
        }
    }
}

impl CameraSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("move_speed", self.move_speed),
            ("boost_multiplier", self.boost_multiplier),
            ("rotate_speed", self.rotate_speed),
            ("roll_speed", self.roll_speed),
            ("pan_speed", self.pan_speed),
            ("scroll_speed", self.scroll_speed),
            ("orbit_speed", self.orbit_speed),
            ("surface_move_speed", self.surface_move_speed),
            ("max_ray_distance", self.max_ray_distance),
            ("near_fraction", self.near_fraction),
            ("far_plane", self.far_plane),
            ("surface_altitude", self.surface_altitude),
            ("clamp_margin", self.clamp_margin),
            ("proximity_floor", self.proximity_floor),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(SettingsError::NonPositive { name, value });
            }
        }

        let ranges = [
            ("near", self.near_min, self.near_max),
            ("speed", self.speed_min, self.speed_max),
            ("fov", self.fov_min_degrees, self.fov_max_degrees),
        ];
        for (name, min, max) in ranges {
            if !(max > min && min > 0.0) {
                return Err(SettingsError::InvalidRange { name, min, max });
            }
        }

        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(SettingsError::FovOutOfRange(self.fov_degrees));
        }
        // Surface view must sit outside the clamp shell or the two fight every frame.
        if self.surface_altitude <= self.clamp_margin {
            return Err(SettingsError::InvalidRange {
                name: "surface_altitude",
                min: self.clamp_margin,
                max: self.surface_altitude,
            });
        }
        if !(self.proximity_far_radii > 1.0) {
            return Err(SettingsError::NonPositive {
                name: "proximity_far_radii",
                value: self.proximity_far_radii - 1.0,
            });
        }
        if self.proximity_floor >= 1.0 {
            return Err(SettingsError::InvalidRange {
                name: "proximity_floor",
                min: self.proximity_floor,
                max: 1.0,
            });
        }
        Ok(())
    }

    pub fn load() -> Self {
        let loaded: Self = match confy::load(CONFY_APP_NAME, "camera") {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load camera settings, using defaults: {}", e);
                return Self::default();
            }
        };
        match loaded.validate() {
            Ok(()) => loaded,
            Err(e) => {
                log::warn!("Invalid camera settings ({}), using defaults", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(CONFY_APP_NAME, "camera", self) {
            log::warn!("Failed to store camera settings: {}", e);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub show_orbits: bool,
    pub show_lagrange_points: bool,
    pub show_labels: bool,
    pub background_color: [f32; 3],
    /// Simulated days per real second.
    pub time_scale: f64,
    pub paused: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_orbits: true,
            show_lagrange_points: true,
            show_labels: true,
            background_color: [0.0, 0.0, 0.02],
            time_scale: 1.0,
            paused: false,
        }
    }
}

impl DisplaySettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "display").unwrap_or_default()
    }

    pub fn save(&self) {
        let _ = confy::store(CONFY_APP_NAME, "display", self);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    pub show_bodies: bool,
    pub show_camera: bool,
    pub show_time: bool,
}

impl UiSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "ui").unwrap_or_default()
    }

    pub fn save(&self) {
        let _ = confy::store(CONFY_APP_NAME, "ui", self);
    }
}

// Aggregate struct for convenience
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub camera: CameraSettings,
    pub display: DisplaySettings,
    pub ui: UiSettings,
}

impl Settings {
    pub fn load() -> Self {
        Self {
            camera: CameraSettings::load(),
            display: DisplaySettings::load(),
            ui: UiSettings::load(),
        }
    }

    pub fn save(&self) {
        self.camera.save();
        self.display.save();
        self.ui.save();
    }
}
