//! Property-based tests for the gravity model using proptest.
//!
//! These tests check field invariants across a wide range of body layouts
//! and query points.

use bevy::math::DVec2;
use proptest::prelude::*;

use super::{Body, BodyCategory, GravityField, Universe};
use crate::geometry::Rect;
use crate::test_utils::fixtures;
use crate::types::G;

fn body_strategy() -> impl Strategy<Value = Body> {
    (0.0f64..4e8, 0.0f64..2.8e8, 1e6f64..1e7, 1000.0f64..10_000.0).prop_map(
        |(x, y, radius, density)| {
            Body::new(BodyCategory::Normal, DVec2::new(x, y), radius, 0.0, density)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The field is the sum of its bodies: splitting the body list and
    /// adding both halves gives the same acceleration.
    #[test]
    fn prop_field_is_superposition(
        bodies in prop::collection::vec(body_strategy(), 1..10),
        qx in -1e8f64..5e8,
        qy in -1e8f64..4e8,
        split in 0usize..10,
    ) {
        let pos = DVec2::new(qx, qy);
        let split = split.min(bodies.len());
        let (a, b) = bodies.split_at(split);

        let whole = GravityField::new(&bodies, G).acceleration_at(pos);
        let parts = GravityField::new(a, G).acceleration_at(pos)
            + GravityField::new(b, G).acceleration_at(pos);

        let scale = whole.length().max(parts.length()).max(1e-30);
        prop_assert!(
            (whole - parts).length() / scale < 1e-9,
            "superposition violated: {whole:?} vs {parts:?}"
        );
    }

    /// Outside a single body, gravity points at its center with magnitude GM/r².
    #[test]
    fn prop_single_body_inverse_square(
        angle in 0.0f64..std::f64::consts::TAU,
        distance_radii in 1.0f64..50.0,
    ) {
        let universe = fixtures::earth_universe();
        let earth = universe.bodies()[0];
        let r = distance_radii * earth.radius();
        let pos = earth.circle().point_at_angle(angle);
        let pos = earth.center() + (pos - earth.center()) * distance_radii;

        let g = universe.gravity_at(pos);
        let expected = G * earth.mass() / (r * r);

        prop_assert!(((g.length() - expected) / expected).abs() < 1e-9);
        let toward = (earth.center() - pos).normalize();
        prop_assert!(g.normalize().dot(toward) > 1.0 - 1e-9);
    }

    /// Gravity is finite everywhere, body centers included.
    #[test]
    fn prop_gravity_always_finite(
        bodies in prop::collection::vec(body_strategy(), 1..6),
        pick in 0usize..6,
    ) {
        let pos = bodies[pick % bodies.len()].center();
        let universe = Universe::new(bodies, Rect::new(0.0, 0.0, 4e8, 2.8e8), G);
        prop_assert!(universe.gravity_at(pos).is_finite());
        prop_assert!(universe.containing_body(pos).is_some());
    }

    /// A body's pole point always lies on its surface.
    #[test]
    fn prop_pole_on_surface(
        body in body_strategy(),
        rotation in -1e-3f64..1e-3,
        t in 0.0f64..1e7,
    ) {
        let body = Body::new(body.category(), body.center(), body.radius(), rotation, body.density());
        let pole = body.pole_point_at(t);
        prop_assert!((pole.distance(body.center()) - body.radius()).abs() < 1e-6 * body.radius());

        let rel = body.pole_angle_to(pole, t).rem_euclid(std::f64::consts::TAU);
        prop_assert!(rel < 1e-6 || std::f64::consts::TAU - rel < 1e-6);
    }
}

#[cfg(test)]
mod deterministic_tests {
    use super::*;

    #[test]
    fn test_two_equal_bodies_cancel_at_midpoint() {
        let universe = fixtures::two_body_universe();
        let mid = (universe.bodies()[0].center() + universe.bodies()[1].center()) * 0.5;
        let g = universe.gravity_at(mid);
        assert!(g.length() < 1e-15, "forces should cancel, got {g:?}");
    }
}
