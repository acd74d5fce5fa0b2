//! Trajectory outcomes and flight notifications.
//!
//! A trajectory either keeps running or ends in one of several terminal
//! conditions. Every terminal condition is a regular value, not an error:
//! - Landed: the ship hit a body
//! - ExitedBounds: the ship left the universe
//! - BufferExhausted / LengthLimitExceeded: the computation stopped

use bevy::math::DVec2;

use crate::geometry::Point;

/// State of a trajectory after an update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TrajectoryOutcome {
    /// Nothing computed yet.
    #[default]
    Running,

    /// Computed up to (or past) the requested time. Updating with a later
    /// time continues the computation.
    ContinuedToTarget,

    /// Ship hit a body.
    Landed {
        /// Time of impact (seconds).
        time: f64,
        /// Index of the body in the universe.
        body: usize,
        /// Impact point angle relative to the body's pole at `time`.
        polar_angle: f64,
        /// Impact point on the body surface.
        position: Point,
    },

    /// Ship left the universe. Time and position are those of the last
    /// checkpoint inside.
    ExitedBounds { time: f64, position: Point },

    /// Checkpoint storage is full.
    BufferExhausted,

    /// The path grew longer than the configured maximum.
    LengthLimitExceeded,
}

impl TrajectoryOutcome {
    /// Returns true once no further computation will happen.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running | Self::ContinuedToTarget)
    }

    pub fn is_landed(&self) -> bool {
        matches!(self, Self::Landed { .. })
    }

    pub fn is_lost(&self) -> bool {
        matches!(self, Self::ExitedBounds { .. })
    }
}

/// Receives the terminal events of a flight, synchronously and at most once
/// per event.
pub trait FlightObserver {
    /// The ship hit `body` at `time`, at `polar_angle` from its pole.
    fn on_hit(&mut self, _time: f64, _body: usize, _polar_angle: f64) {}

    /// The ship left the universe after its last checkpoint at `time`.
    fn on_out_of_bounds(&mut self, _time: f64, _position: DVec2) {}
}

/// Ignore all events.
impl FlightObserver for () {}

/// A terminal event reported to a [`FlightObserver`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlightEvent {
    Hit {
        time: f64,
        body: usize,
        polar_angle: f64,
    },
    OutOfBounds {
        time: f64,
        position: DVec2,
    },
}

/// Record every event.
impl FlightObserver for Vec<FlightEvent> {
    fn on_hit(&mut self, time: f64, body: usize, polar_angle: f64) {
        self.push(FlightEvent::Hit {
            time,
            body,
            polar_angle,
        });
    }

    fn on_out_of_bounds(&mut self, time: f64, position: DVec2) {
        self.push(FlightEvent::OutOfBounds { time, position });
    }
}

/// Keep the latest event.
impl FlightObserver for Option<FlightEvent> {
    fn on_hit(&mut self, time: f64, body: usize, polar_angle: f64) {
        *self = Some(FlightEvent::Hit {
            time,
            body,
            polar_angle,
        });
    }

    fn on_out_of_bounds(&mut self, time: f64, position: DVec2) {
        *self = Some(FlightEvent::OutOfBounds { time, position });
    }
}
