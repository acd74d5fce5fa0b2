//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bevy::math::DVec2;
use gravity_sandbox::config::{SimulationConfig, WorldConfig};
use gravity_sandbox::outcome::TrajectoryOutcome;
use gravity_sandbox::physics::{Body, BodyCategory, Universe};
use gravity_sandbox::trajectory::{Checkpoint, Trajectory};
use gravity_sandbox::types::{EARTH_DENSITY, EARTH_RADIUS, G};

/// Far enough in the future for every test flight to end.
pub const FOREVER: f64 = 1e12;

/// An Earth-like, non-rotating body.
pub fn earth_at(pos: DVec2) -> Body {
    Body::new(BodyCategory::Normal, pos, EARTH_RADIUS, 0.0, EARTH_DENSITY)
}

/// The default world with one Earth-like body at its center.
pub fn earth_universe() -> Arc<Universe> {
    let rect = WorldConfig::default().rect;
    Arc::new(Universe::new(vec![earth_at(rect.center())], rect, G))
}

/// Start a trajectory on the surface of body 0, at `angle` (clockwise from
/// up), with a radial and a tangential (clockwise) speed.
pub fn launch_from_surface(
    universe: &Arc<Universe>,
    angle: f64,
    radial: f64,
    tangential: f64,
) -> Trajectory {
    let body = universe.bodies()[0];
    let pos = body.circle().point_at_angle(angle);
    let out = (pos - body.center()).normalize();
    let clockwise = DVec2::new(out.y, -out.x);
    Trajectory::launch(
        0.0,
        pos,
        out * radial + clockwise * tangential,
        universe.clone(),
        SimulationConfig::default(),
    )
}

/// Compute until the flight ends.
pub fn run_to_end(trajectory: &mut Trajectory) -> TrajectoryOutcome {
    trajectory.update(FOREVER, &mut ())
}

/// Distances of all checkpoints from `center`, in units of `radius`.
pub fn relative_distances(checkpoints: &[Checkpoint], center: DVec2, radius: f64) -> Vec<f64> {
    checkpoints
        .iter()
        .map(|c| c.pos.distance(center) / radius)
        .collect()
}

/// Assert checkpoint times strictly increase.
pub fn assert_times_increasing(checkpoints: &[Checkpoint]) {
    for pair in checkpoints.windows(2) {
        assert!(
            pair[1].time > pair[0].time,
            "time {} does not follow {}",
            pair[1].time,
            pair[0].time
        );
    }
}

/// Assert cumulative lengths never decrease and cover each chord.
pub fn assert_lengths_consistent(checkpoints: &[Checkpoint]) {
    for pair in checkpoints.windows(2) {
        let step = pair[1].length - pair[0].length;
        let chord = pair[0].pos.distance(pair[1].pos);
        assert!(step >= chord * (1.0 - 1e-9), "step {step} shorter than chord {chord}");
    }
}
