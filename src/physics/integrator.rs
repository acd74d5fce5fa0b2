//! Adaptive predictor-corrector sub-stepper.
//!
//! One call to [`compute_segment`] advances a flight state by the distance
//! between two stored checkpoints, taking as many sub-steps as needed.
//!
//! Each sub-step guesses a time delta, predicts where the ship would be
//! after it, and averages the gravity at the current and predicted
//! positions. The area of the parallelogram spanned by the velocity delta
//! and the straight-line displacement serves as the error estimate: it is
//! zero when gravity is parallel to the motion and grows as the path bends.

use bevy::math::DVec2;

use super::Universe;
use crate::config::SimulationConfig;
use crate::geometry::{Point, cross};

/// Factor applied to the time delta after a rejected sub-step.
pub const SHRINK_FACTOR: f64 = 0.66;

/// Factor applied to the time delta after a sub-step accepted on the first try.
pub const GROWTH_FACTOR: f64 = 1.5;

/// Kinematic state of a ship in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightState {
    /// Seconds
    pub time: f64,
    /// Meters
    pub pos: Point,
    /// m/s
    pub vel: DVec2,
    /// Path length flown so far (meters)
    pub length: f64,
}

/// Bookkeeping of one computed segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SegmentReport {
    /// Error estimate of the last accepted sub-step.
    pub error: f64,
    /// Sum of the error estimates of all accepted sub-steps.
    pub total_error: f64,
    /// Sub-step trials, rejected ones included.
    pub trials: usize,
    /// Length added by this segment.
    pub length: f64,
}

/// Advance `state` by one stored segment.
///
/// Sub-steps are accumulated until the covered length reaches
/// `min_stored_segment_length`, or exceeds `max_stored_segment_length`.
/// A sub-step is accepted once its error drops below `max_error`, or once it
/// is shorter than `min_calc_segment_length` so progress never stalls.
///
/// Returns `None` and leaves `state` untouched when the ship neither moves
/// nor feels any gravity: no time delta would move it.
pub fn compute_segment(
    state: &mut FlightState,
    universe: &Universe,
    config: &SimulationConfig,
) -> Option<SegmentReport> {
    let mut dt = initial_dt(state, universe, config)?;
    let mut report = SegmentReport::default();
    let mut seg_len = 0.0;

    while seg_len < config.min_stored_segment_length {
        let g0 = universe.gravity_at(state.pos);
        let mut ndt = dt;

        let (dv, dp, err) = loop {
            report.trials += 1;

            let predicted = state.pos + (g0 + state.vel) * ndt;
            let g1 = universe.gravity_at(predicted);

            let dv = (g0 + g1) * (0.5 * ndt);
            let drift = state.vel * ndt;
            let dp = dv + drift;
            let err = cross(dv, drift).abs();

            // NaN errors fall through to the length test
            if !(err >= config.max_error) || dp.length() < config.min_calc_segment_length {
                break (dv, dp, err);
            }
            ndt *= SHRINK_FACTOR;
        };

        state.vel += dv;
        state.pos += dp;
        state.time += ndt;
        seg_len += dp.length();
        report.error = err;
        report.total_error += err;

        if seg_len > config.max_stored_segment_length {
            break;
        }
        if ndt == dt {
            dt *= GROWTH_FACTOR;
        } else {
            dt = ndt;
        }
    }

    state.length += seg_len;
    report.length = seg_len;
    Some(report)
}

/// First guess for the sub-step time delta.
///
/// Aims at a displacement of `min_calc_segment_length`. A ship at rest uses
/// the time gravity alone needs to move it that far.
fn initial_dt(state: &FlightState, universe: &Universe, config: &SimulationConfig) -> Option<f64> {
    let speed = state.vel.length();
    if speed > 0.0 {
        return Some(config.min_calc_segment_length / speed);
    }

    let g = universe.gravity_at(state.pos).length();
    (g > 0.0).then(|| (config.min_calc_segment_length / g).sqrt())
}
