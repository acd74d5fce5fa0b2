//! Test utilities for trajectory simulation tests.
//!
//! Provides fixtures for small universes and assertions for the invariants
//! every computed trajectory must satisfy.

use bevy::math::DVec2;

use crate::physics::{Body, BodyCategory, Universe};
use crate::types::{EARTH_DENSITY, EARTH_RADIUS, G};

/// Fixtures for creating test universes.
pub mod fixtures {
    use super::*;
    use crate::config::WorldConfig;

    /// An Earth-like, non-rotating body at `pos`.
    pub fn earth_body(pos: DVec2) -> Body {
        Body::new(BodyCategory::Normal, pos, EARTH_RADIUS, 0.0, EARTH_DENSITY)
    }

    /// The default world with a single Earth-like body at its center.
    pub fn earth_universe() -> Universe {
        let rect = WorldConfig::default().rect;
        Universe::new(vec![earth_body(rect.center())], rect, G)
    }

    /// The default world with a single Earth-like body at its center,
    /// turning clockwise at `rotation` rad/s.
    pub fn rotating_earth_universe(rotation: f64) -> Universe {
        let rect = WorldConfig::default().rect;
        let earth = Body::new(
            BodyCategory::Normal,
            rect.center(),
            EARTH_RADIUS,
            rotation,
            EARTH_DENSITY,
        );
        Universe::new(vec![earth], rect, G)
    }

    /// The default world with a start body on the left and a target body
    /// on the right, both Earth-like.
    pub fn two_body_universe() -> Universe {
        let rect = WorldConfig::default().rect;
        let y = rect.center().y;
        let start = earth_body(DVec2::new(rect.min.x + 1e7, y));
        let target = earth_body(DVec2::new(rect.max.x - 1e7, y));
        Universe::new(vec![start, target], rect, G)
    }
}

/// Assertions for verifying trajectory invariants.
pub mod assertions {
    use crate::trajectory::Checkpoint;

    /// Assert checkpoint times are strictly increasing.
    ///
    /// # Panics
    /// Panics on the first pair that is out of order.
    pub fn assert_times_increasing(checkpoints: &[Checkpoint]) {
        for (i, pair) in checkpoints.windows(2).enumerate() {
            assert!(
                pair[1].time > pair[0].time,
                "checkpoint {} at t={} does not follow t={}",
                i + 1,
                pair[1].time,
                pair[0].time
            );
        }
    }

    /// Assert cumulative lengths never decrease and cover at least the chord
    /// between consecutive checkpoints.
    ///
    /// # Panics
    /// Panics on the first pair violating either property.
    pub fn assert_lengths_consistent(checkpoints: &[Checkpoint]) {
        for (i, pair) in checkpoints.windows(2).enumerate() {
            let step = pair[1].length - pair[0].length;
            let chord = pair[0].pos.distance(pair[1].pos);
            assert!(step >= 0.0, "length decreases after checkpoint {i}");
            assert!(
                step >= chord * (1.0 - 1e-9),
                "segment {i} length {step:.6e} shorter than its chord {chord:.6e}"
            );
        }
    }
}
