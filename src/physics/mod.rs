//! Physical model of the sandbox.
//!
//! The universe is a set of stationary, spinning bodies. Together they form
//! a vector field: every point in space has an associated acceleration, the
//! combined gravity of all bodies at that point.

mod gravity;
mod integrator;

#[cfg(test)]
mod proptest_physics;

use bevy::math::DVec2;

use crate::geometry::{Circle, Point, Rect};
use crate::orbit::SurfaceOrbit;
use crate::types::{escape_speed, orbital_speed, sphere_mass};

pub use gravity::{GravityField, GravityGrid, MIN_DISTANCE_SQ};
pub use integrator::{FlightState, SegmentReport, compute_segment};

/// Size/density class of a body. Has no influence on the physics beyond the
/// radius and density it implies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyCategory {
    Normal,
    Small,
    Large,
    Black,
}

impl BodyCategory {
    /// Placement order for the generator: larger bodies pack better first.
    pub const PLACEMENT_ORDER: [BodyCategory; 4] = [
        BodyCategory::Large,
        BodyCategory::Normal,
        BodyCategory::Small,
        BodyCategory::Black,
    ];

    /// Radius relative to a normal planet.
    pub fn radius_factor(self) -> f64 {
        match self {
            BodyCategory::Normal => 1.0,
            BodyCategory::Small => 0.66,
            BodyCategory::Large => 1.5,
            BodyCategory::Black => 0.5,
        }
    }
}

/// A spherical, stationary body.
///
/// The pole of a body is the surface point that lies on the +y axis at
/// `t = 0`. It turns with `rotation` (rad/s, positive = clockwise), which is
/// a pure function of time; the body itself never moves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    category: BodyCategory,
    circle: Circle,
    density: f64,
    rotation: f64,
    mass: f64,
}

impl Body {
    /// Create a body. The mass follows from radius and density.
    pub fn new(
        category: BodyCategory,
        position: Point,
        radius: f64,
        rotation: f64,
        density: f64,
    ) -> Self {
        Self {
            category,
            circle: Circle::new(position, radius),
            density,
            rotation,
            mass: sphere_mass(radius, density),
        }
    }

    pub fn category(&self) -> BodyCategory {
        self.category
    }

    pub fn circle(&self) -> &Circle {
        &self.circle
    }

    pub fn center(&self) -> Point {
        self.circle.center
    }

    pub fn radius(&self) -> f64 {
        self.circle.radius
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Angle of the center-pole line relative to the y-axis at time `t`.
    #[inline]
    pub fn angle_at(&self, t: f64) -> f64 {
        self.rotation * t
    }

    /// Surface point of the pole at time `t`.
    pub fn pole_point_at(&self, t: f64) -> Point {
        self.circle.point_at_angle(self.angle_at(t))
    }

    /// Angle between the pole line and the center-`p` line at time `t`.
    pub fn pole_angle_to(&self, p: Point, t: f64) -> f64 {
        self.circle.polar_angle_to(p) - self.angle_at(t)
    }

    /// Escape speed at `distance` from the center (the surface if `None`).
    pub fn escape_speed(&self, gravity: f64, distance: Option<f64>) -> f64 {
        escape_speed(self.mass, distance.unwrap_or(self.radius()), gravity)
    }

    /// Circular orbit speed at `distance` from the center (the surface if `None`).
    pub fn orbital_speed(&self, gravity: f64, distance: Option<f64>) -> f64 {
        orbital_speed(self.mass, distance.unwrap_or(self.radius()), gravity)
    }
}

/// The game universe.
///
/// Bodies are fixed for the lifetime of the universe: index 0 is the start
/// body, index 1 the target. Leaving `rect` means leaving the universe.
/// A universe is immutable and can be shared between threads.
#[derive(Clone, Debug)]
pub struct Universe {
    bodies: Vec<Body>,
    rect: Rect,
    gravity: f64,
    field: GravityField,
}

impl Universe {
    pub fn new(bodies: Vec<Body>, rect: Rect, gravity: f64) -> Self {
        let field = GravityField::new(&bodies, gravity);
        Self {
            bodies,
            rect,
            gravity,
            field,
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn start_body(&self) -> Option<&Body> {
        self.bodies.first()
    }

    pub fn target_body(&self) -> Option<&Body> {
        self.bodies.get(1)
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    /// Gravitational constant of this universe.
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    pub fn field(&self) -> &GravityField {
        &self.field
    }

    /// Combined gravitational acceleration at `pos`.
    #[inline]
    pub fn gravity_at(&self, pos: Point) -> DVec2 {
        self.field.acceleration_at(pos)
    }

    /// Index of the first body strictly containing `pos`.
    pub fn containing_body(&self, pos: Point) -> Option<usize> {
        self.bodies.iter().position(|b| b.circle.contains_strict(pos))
    }

    /// Gravitational potential per unit mass at `pos`.
    pub fn potential_at(&self, pos: Point) -> f64 {
        self.bodies
            .iter()
            .map(|b| -self.gravity * b.mass / b.center().distance(pos))
            .sum()
    }

    /// Kinetic plus potential energy per unit mass.
    pub fn specific_energy(&self, pos: Point, vel: DVec2) -> f64 {
        0.5 * vel.length_squared() + self.potential_at(pos)
    }

    /// A resting orbit on body `index`, at Y-angle `y_angle` at time `t`.
    pub fn orbit_on(&self, index: usize, t: f64, y_angle: f64) -> Option<SurfaceOrbit> {
        self.body(index)
            .map(|body| SurfaceOrbit::on_body(index, *body, t, y_angle))
    }

    /// Sample the gravity field on a `rows` x `cols` grid of cell centres.
    pub fn gravity_grid(&self, rows: usize, cols: usize) -> GravityGrid {
        GravityGrid::sample(self, rows, cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use crate::types::{EARTH_DENSITY, EARTH_RADIUS, G};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_body_mass_from_density() {
        let body = Body::new(BodyCategory::Normal, DVec2::ZERO, 2.0, 0.0, 3.0);
        assert_relative_eq!(body.mass(), 3.0 * 4.0 / 3.0 * PI * 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pole_turns_clockwise() {
        let body = Body::new(BodyCategory::Normal, DVec2::new(1.0, 1.0), 1.0, PI / 2.0, 1.0);

        let pole0 = body.pole_point_at(0.0);
        assert_relative_eq!(pole0.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(pole0.y, 2.0, epsilon = 1e-12);

        // After one second a quarter turn clockwise puts the pole on the right
        let pole1 = body.pole_point_at(1.0);
        assert_relative_eq!(pole1.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(pole1.y, 1.0, epsilon = 1e-12);

        assert_relative_eq!(body.pole_angle_to(pole1, 1.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_containing_body_is_strict() {
        let universe = fixtures::two_body_universe();
        let b0 = universe.bodies()[0];

        assert_eq!(universe.containing_body(b0.center()), Some(0));
        let on_surface = b0.circle().point_at_angle(0.3);
        let outside = b0.center() + (on_surface - b0.center()) * 1.001;
        assert_eq!(universe.containing_body(outside), None);
        let b1 = universe.bodies()[1];
        assert_eq!(universe.containing_body(b1.center() + DVec2::X), Some(1));
    }

    #[test]
    fn test_gravity_points_toward_single_body() {
        let universe = fixtures::earth_universe();
        let earth = universe.bodies()[0];

        let pos = earth.center() + DVec2::new(0.0, 2.0 * EARTH_RADIUS);
        let g = universe.gravity_at(pos);

        let expected = G * earth.mass() / (4.0 * EARTH_RADIUS * EARTH_RADIUS);
        assert_relative_eq!(g.length(), expected, max_relative = 1e-12);
        assert!(g.y < 0.0, "gravity should pull toward the body");
        assert_relative_eq!(g.x, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_specific_energy_at_escape_speed_is_zero() {
        let universe = fixtures::earth_universe();
        let earth = universe.bodies()[0];
        let pos = earth.center() + DVec2::new(EARTH_RADIUS, 0.0);
        let v = earth.escape_speed(universe.gravity(), None);

        let e = universe.specific_energy(pos, DVec2::new(v, 0.0));
        assert_relative_eq!(e, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_start_and_target_bodies() {
        let universe = fixtures::two_body_universe();
        assert_eq!(universe.start_body(), Some(&universe.bodies()[0]));
        assert_eq!(universe.target_body(), Some(&universe.bodies()[1]));

        let lonely = fixtures::earth_universe();
        assert!(lonely.start_body().is_some());
        assert!(lonely.target_body().is_none());
    }

    #[test]
    fn test_orbit_on_unknown_body() {
        let universe = fixtures::earth_universe();
        assert!(universe.orbit_on(0, 0.0, 0.0).is_some());
        assert!(universe.orbit_on(5, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_earth_escape_speed() {
        let earth = Body::new(BodyCategory::Normal, DVec2::ZERO, EARTH_RADIUS, 0.0, EARTH_DENSITY);
        assert_relative_eq!(earth.escape_speed(G, None), 11_180.0, max_relative = 0.01);
        assert_relative_eq!(
            earth.escape_speed(G, Some(4.0 * EARTH_RADIUS)),
            earth.escape_speed(G, None) / 2.0,
            max_relative = 1e-12
        );
    }
}
