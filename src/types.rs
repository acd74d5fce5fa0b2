//! Core physics constants, formulas and the simulation clock.
//!
//! Units: meters, seconds, kilograms, radians. Speed is always a scalar,
//! velocity always a vector.

use std::f64::consts::PI;

use bevy::prelude::*;

/// Physical constants (SI units)

/// Gravitational constant (m³·kg⁻¹·s⁻²)
pub const G: f64 = 6.674e-11;

/// Radius of the reference planet (Earth), meters.
pub const EARTH_RADIUS: f64 = 6.371e6;

/// Density of the reference planet (Earth), kg/m³.
pub const EARTH_DENSITY: f64 = 5510.0;

/// Angular speed of the reference planet (Earth), rad/s.
pub const EARTH_ANGULAR_SPEED: f64 = 7.292_115e-5;

/// Mass of a homogeneous sphere.
pub fn sphere_mass(radius: f64, density: f64) -> f64 {
    density * PI * radius.powi(3) * 4.0 / 3.0
}

/// Speed needed to stay on a circular orbit of the given radius.
pub fn orbital_speed(mass: f64, radius: f64, g: f64) -> f64 {
    (g * mass / radius).sqrt()
}

/// Minimal speed needed to escape the gravity of `mass` from `distance`.
///
/// Independent of the launch direction: kinetic plus potential energy
/// is zero at `v = sqrt(2GM/r)`.
pub fn escape_speed(mass: f64, distance: f64, g: f64) -> f64 {
    (2.0 * g * mass / distance).sqrt()
}

/// Exponential scaling used by all adjustable settings.
///
/// Returns `value · base^scale`: unchanged for `scale = 0`, always positive
/// for a positive `value`.
pub fn exp_scale(value: f64, scale: f64, base: f64) -> f64 {
    value * base.powf(scale)
}

/// Game clock resource.
///
/// Game time is measured in simulation seconds; `scale` is the number of
/// simulation seconds that pass per real second.
#[derive(Resource, Clone, Debug)]
pub struct SimulationTime {
    /// Current game time in seconds
    pub current: f64,
    /// Simulation seconds per real second
    pub scale: f64,
    /// Whether the clock is stopped
    pub paused: bool,
    /// Initial time for reset functionality
    pub initial: f64,
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self {
            current: 0.0,
            scale: 500.0,
            paused: false,
            initial: 0.0,
        }
    }
}

impl SimulationTime {
    /// Clock starting at `seconds` with the given scale.
    pub fn starting_at(seconds: f64, scale: f64) -> Self {
        Self {
            current: seconds,
            scale,
            paused: false,
            initial: seconds,
        }
    }

    /// Reset to initial time
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.paused = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_earth_mass() {
        let m = sphere_mass(EARTH_RADIUS, EARTH_DENSITY);
        // Close to the real Earth mass
        assert_relative_eq!(m, 5.97e24, max_relative = 0.01);
    }

    #[test]
    fn test_escape_is_sqrt2_orbital() {
        let m = sphere_mass(EARTH_RADIUS, EARTH_DENSITY);
        let v_orb = orbital_speed(m, EARTH_RADIUS, G);
        let v_esc = escape_speed(m, EARTH_RADIUS, G);
        assert_relative_eq!(v_esc / v_orb, 2f64.sqrt(), epsilon = 1e-12);
        // ~11.2 km/s for Earth
        assert_relative_eq!(v_esc, 11_180.0, max_relative = 0.01);
    }

    #[test]
    fn test_exp_scale() {
        assert_eq!(exp_scale(7.0, 0.0, 1.3), 7.0);
        assert_relative_eq!(exp_scale(1.0, 2.0, 1.3), 1.69, epsilon = 1e-12);
        assert_relative_eq!(exp_scale(2.0, -1.0, 2.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_simulation_time_reset() {
        let mut t = SimulationTime::starting_at(10.0, 2.0);
        t.current = 99.0;
        t.reset();
        assert_eq!(t.current, 10.0);
        assert!(t.paused);
    }
}
