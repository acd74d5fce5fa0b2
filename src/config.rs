//! Simulation and game configuration.
//!
//! Three layers, from fixed to user-adjustable:
//! - [`WorldConfig`]: the visible universe and its start/target bands.
//! - [`SimulationConfig`]: integrator thresholds derived from the world size.
//! - [`GameSettings`]: knobs a player may turn (planet size, counts, ...).

use bevy::prelude::Resource;

use crate::geometry::Rect;
use crate::physics::BodyCategory;
use crate::types::{EARTH_ANGULAR_SPEED, EARTH_DENSITY, EARTH_RADIUS, G, exp_scale};

/// Base of the exponential scale used by every scaled setting.
pub const SCALE_BASE: f64 = 1.3;

/// Slack added to the checkpoint capacity for rounding.
const CAPACITY_SLACK: f64 = 1.05;

/// Errors in configuration values.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("setting {name} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("degenerate world rectangle ({width} x {height})")]
    DegenerateWorld { width: f64, height: f64 },

    #[error("start/target bands ({bands}) leave no room in a world {width} wide")]
    BandsTooWide { bands: f64, width: f64 },
}

// =============================================================================
// World
// =============================================================================

/// Geometry of the visible universe.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    /// The visible universe. Leaving it means the ship is lost.
    pub rect: Rect,
    /// Width of the band at the left edge holding the start body.
    pub start_area_width: f64,
    /// Width of the band at the right edge holding the target body.
    pub target_area_width: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, 4e8, 2.8e8),
            start_area_width: 2e7,
            target_area_width: 2e7,
        }
    }
}

impl WorldConfig {
    /// Check that the world has an area and that the bands fit into it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.rect.width(), self.rect.height());
        if !(width > 0.0 && height > 0.0) {
            return Err(ConfigError::DegenerateWorld { width, height });
        }
        let bands = self.start_area_width + self.target_area_width;
        if bands >= width {
            return Err(ConfigError::BandsTooWide { bands, width });
        }
        Ok(())
    }

    /// Integrator thresholds matching this world.
    pub fn simulation(&self) -> SimulationConfig {
        SimulationConfig::for_world(&self.rect)
    }

    /// The region between the start and target bands.
    pub fn planet_rect(&self) -> Rect {
        let r = self.rect;
        Rect::new(
            r.min.x + self.start_area_width,
            r.min.y,
            r.max.x - self.target_area_width,
            r.max.y,
        )
    }
}

// =============================================================================
// Integrator thresholds
// =============================================================================

/// Thresholds for trajectory integration.
///
/// All values are lengths derived from the world width so they scale with
/// the world. `max_error` is compared against the parallelogram area of the
/// velocity and gravity deltas of a sub-step.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Trajectories stop once their path is longer than this.
    pub max_trajectory_length: f64,
    /// Largest accepted error estimate per sub-step.
    pub max_error: f64,
    /// A checkpoint is stored once sub-steps add up to this length.
    pub min_stored_segment_length: f64,
    /// Hard cap on the length between two checkpoints.
    pub max_stored_segment_length: f64,
    /// Sub-steps shorter than this are accepted regardless of error.
    pub min_calc_segment_length: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        WorldConfig::default().simulation()
    }
}

impl SimulationConfig {
    /// Derive all thresholds from the width of the world rectangle.
    pub fn for_world(rect: &Rect) -> Self {
        let w = rect.width();
        let min_stored = w / 500.0;
        Self {
            max_trajectory_length: w * 10.0,
            max_error: w / 400.0,
            min_stored_segment_length: min_stored,
            max_stored_segment_length: w / 20.0,
            min_calc_segment_length: min_stored / 10.0,
        }
    }

    /// Number of checkpoints a trajectory preallocates.
    ///
    /// Every checkpoint but the last covers at least
    /// `min_stored_segment_length`, so this bounds a trajectory that runs
    /// into the length limit.
    pub fn checkpoint_capacity(&self) -> usize {
        (self.max_trajectory_length / self.min_stored_segment_length * CAPACITY_SLACK) as usize
    }
}

// =============================================================================
// Player settings
// =============================================================================

/// Radius, density and count for one body category, resolved from settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyTemplate {
    pub category: BodyCategory,
    pub radius: f64,
    pub density: f64,
    pub count: usize,
}

/// User adjustable settings.
///
/// Fields prefixed with `s_` are exponents on [`SCALE_BASE`] applied to a
/// reference value; `0` keeps the reference. The other fields are absolute.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct GameSettings {
    pub s_planet_size: f64,
    pub s_planet_density: f64,
    pub s_planet_rotation: f64,
    pub s_gravity_constant: f64,
    pub s_animation_speed: f64,
    pub s_black_density: f64,

    /// Minimum center distance as a multiple of the sum of two radii.
    pub planet_spread: f64,
    pub n_small_planets: usize,
    pub n_normal_planets: usize,
    pub n_large_planets: usize,
    pub n_black_planets: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            s_planet_size: 0.0,
            s_planet_density: 0.0,
            s_planet_rotation: 0.0,
            s_gravity_constant: 0.0,
            s_animation_speed: 0.0,
            s_black_density: 0.0,
            planet_spread: 2.0,
            n_small_planets: 5,
            n_normal_planets: 3,
            n_large_planets: 2,
            n_black_planets: 0,
        }
    }
}

/// Simulation seconds per real second at `s_animation_speed = 0`.
pub const TIME_FACTOR: f64 = 500.0;

/// Thrust exponents are limited to `[-THRUST_SCALE, THRUST_SCALE]`.
pub const THRUST_SCALE: f64 = 2.5;

/// Density multiplier of black bodies relative to normal ones.
const BLACK_DENSITY_FACTOR: f64 = 500.0;

impl GameSettings {
    /// Check every setting against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, f64, f64, f64); 11] = [
            ("s_planet_size", self.s_planet_size, -5.0, 5.0),
            ("s_planet_density", self.s_planet_density, -5.0, 5.0),
            ("s_planet_rotation", self.s_planet_rotation, -10.0, 10.0),
            ("s_gravity_constant", self.s_gravity_constant, -5.0, 5.0),
            ("s_animation_speed", self.s_animation_speed, -3.0, 3.0),
            ("s_black_density", self.s_black_density, -5.0, 5.0),
            ("planet_spread", self.planet_spread, 1.0, 4.0),
            ("n_small_planets", self.n_small_planets as f64, 0.0, 10.0),
            ("n_normal_planets", self.n_normal_planets as f64, 0.0, 8.0),
            ("n_large_planets", self.n_large_planets as f64, 0.0, 6.0),
            ("n_black_planets", self.n_black_planets as f64, 0.0, 3.0),
        ];

        for (name, value, min, max) in checks {
            if !(min..=max).contains(&value) {
                return Err(ConfigError::OutOfRange { name, value, min, max });
            }
        }
        Ok(())
    }

    /// Radius of a normal planet.
    pub fn planet_size(&self) -> f64 {
        exp_scale(EARTH_RADIUS, self.s_planet_size, SCALE_BASE)
    }

    /// Density of a normal planet.
    pub fn planet_density(&self) -> f64 {
        exp_scale(EARTH_DENSITY, self.s_planet_density, SCALE_BASE)
    }

    /// Base angular speed of planets before randomisation.
    pub fn planet_rotation(&self) -> f64 {
        exp_scale(EARTH_ANGULAR_SPEED, self.s_planet_rotation, SCALE_BASE)
    }

    pub fn gravity_constant(&self) -> f64 {
        exp_scale(G, self.s_gravity_constant, SCALE_BASE)
    }

    /// Simulation seconds per real second.
    pub fn animation_speed(&self) -> f64 {
        exp_scale(TIME_FACTOR, self.s_animation_speed, SCALE_BASE)
    }

    pub fn radius_of(&self, category: BodyCategory) -> f64 {
        self.planet_size() * category.radius_factor()
    }

    pub fn density_of(&self, category: BodyCategory) -> f64 {
        match category {
            BodyCategory::Black => exp_scale(
                self.planet_density() * BLACK_DENSITY_FACTOR,
                self.s_black_density,
                SCALE_BASE,
            ),
            _ => self.planet_density(),
        }
    }

    pub fn count_of(&self, category: BodyCategory) -> usize {
        match category {
            BodyCategory::Normal => self.n_normal_planets,
            BodyCategory::Small => self.n_small_planets,
            BodyCategory::Large => self.n_large_planets,
            BodyCategory::Black => self.n_black_planets,
        }
    }

    /// Everything the generator needs to know about one category.
    pub fn template(&self, category: BodyCategory) -> BodyTemplate {
        BodyTemplate {
            category,
            radius: self.radius_of(category),
            density: self.density_of(category),
            count: self.count_of(category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_simulation_config_scales_with_world() {
        let cfg = SimulationConfig::default();
        assert_relative_eq!(cfg.max_trajectory_length, 4e9);
        assert_relative_eq!(cfg.max_error, 1e6);
        assert_relative_eq!(cfg.min_stored_segment_length, 8e5);
        assert_relative_eq!(cfg.max_stored_segment_length, 2e7);
        assert_relative_eq!(cfg.min_calc_segment_length, 8e4);
        assert_eq!(cfg.checkpoint_capacity(), 5250);

        let double = SimulationConfig::for_world(&Rect::new(0.0, 0.0, 8e8, 1.0));
        assert_relative_eq!(double.max_error, 2.0 * cfg.max_error);
        assert_eq!(double.checkpoint_capacity(), cfg.checkpoint_capacity());
    }

    #[test]
    fn test_world_validation() {
        assert!(WorldConfig::default().validate().is_ok());

        let flat = WorldConfig {
            rect: Rect::new(0.0, 0.0, 10.0, 0.0),
            ..WorldConfig::default()
        };
        assert!(matches!(flat.validate(), Err(ConfigError::DegenerateWorld { .. })));

        let crowded = WorldConfig {
            start_area_width: 2.5e8,
            target_area_width: 2.5e8,
            ..WorldConfig::default()
        };
        assert!(matches!(crowded.validate(), Err(ConfigError::BandsTooWide { .. })));
    }

    #[test]
    fn test_planet_rect_excludes_bands() {
        let world = WorldConfig::default();
        let pr = world.planet_rect();
        assert_relative_eq!(pr.min.x, 2e7);
        assert_relative_eq!(pr.max.x, 3.8e8);
        assert_relative_eq!(pr.height(), world.rect.height());
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = GameSettings::default();
        assert!(settings.validate().is_ok());
        assert_relative_eq!(settings.planet_size(), EARTH_RADIUS);
        assert_relative_eq!(settings.gravity_constant(), G);
        assert_relative_eq!(settings.animation_speed(), TIME_FACTOR);
    }

    #[test]
    fn test_settings_out_of_range() {
        let settings = GameSettings {
            planet_spread: 0.5,
            ..GameSettings::default()
        };
        match settings.validate() {
            Err(ConfigError::OutOfRange { name, .. }) => assert_eq!(name, "planet_spread"),
            other => panic!("expected out of range error, got {other:?}"),
        }

        let settings = GameSettings {
            n_black_planets: 4,
            ..GameSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_category_templates() {
        let settings = GameSettings::default();

        let large = settings.template(BodyCategory::Large);
        assert_relative_eq!(large.radius, EARTH_RADIUS * 1.5);
        assert_eq!(large.count, 2);

        let small = settings.template(BodyCategory::Small);
        assert_relative_eq!(small.radius, EARTH_RADIUS * 0.66);

        let black = settings.template(BodyCategory::Black);
        assert_relative_eq!(black.radius, EARTH_RADIUS * 0.5);
        assert_relative_eq!(black.density, EARTH_DENSITY * 500.0);
    }
}
