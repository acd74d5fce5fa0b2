//! Stored flight paths.
//!
//! A [`Trajectory`] is computed incrementally: each [`Trajectory::update`]
//! resumes from the last stored checkpoint and integrates until the requested
//! time or until the flight ends. Between checkpoints the path is
//! approximated by straight lines.

use std::sync::Arc;

use bevy::log::{debug, warn};
use bevy::math::DVec2;

use crate::config::SimulationConfig;
use crate::geometry::Point;
use crate::outcome::{FlightObserver, TrajectoryOutcome};
use crate::physics::{FlightState, Universe, compute_segment};

/// One stored sample of a flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    pub time: f64,
    pub pos: Point,
    pub vel: DVec2,
    /// Path length from launch to here.
    pub length: f64,
}

impl From<Checkpoint> for FlightState {
    fn from(c: Checkpoint) -> Self {
        FlightState {
            time: c.time,
            pos: c.pos,
            vel: c.vel,
            length: c.length,
        }
    }
}

impl From<FlightState> for Checkpoint {
    fn from(s: FlightState) -> Self {
        Checkpoint {
            time: s.time,
            pos: s.pos,
            vel: s.vel,
            length: s.length,
        }
    }
}

/// Path of a ship flying freely through a universe.
///
/// Checkpoint times are strictly increasing. The checkpoint list never
/// grows beyond its capacity and never shrinks.
#[derive(Clone, Debug)]
pub struct Trajectory {
    universe: Arc<Universe>,
    config: SimulationConfig,
    /// Checkpoint times, kept apart for binary search.
    times: Vec<f64>,
    checkpoints: Vec<Checkpoint>,
    capacity: usize,
    outcome: TrajectoryOutcome,
    substeps: usize,
    cumulative_error: f64,
}

impl Trajectory {
    /// Start a trajectory at `pos` with velocity `vel` at `time`.
    ///
    /// Nothing is computed until the first [`update`](Self::update).
    pub fn launch(
        time: f64,
        pos: Point,
        vel: DVec2,
        universe: Arc<Universe>,
        config: SimulationConfig,
    ) -> Self {
        let capacity = config.checkpoint_capacity();
        Self::launch_with_capacity(time, pos, vel, universe, config, capacity)
    }

    /// Like [`launch`](Self::launch), with an explicit checkpoint capacity.
    pub fn launch_with_capacity(
        time: f64,
        pos: Point,
        vel: DVec2,
        universe: Arc<Universe>,
        config: SimulationConfig,
        capacity: usize,
    ) -> Self {
        let capacity = capacity.max(1);
        let mut times = Vec::with_capacity(capacity);
        let mut checkpoints = Vec::with_capacity(capacity);
        times.push(time);
        checkpoints.push(Checkpoint {
            time,
            pos,
            vel,
            length: 0.0,
        });

        Self {
            universe,
            config,
            times,
            checkpoints,
            capacity,
            outcome: TrajectoryOutcome::Running,
            substeps: 0,
            cumulative_error: 0.0,
        }
    }

    /// Compute the trajectory up to `target` (seconds).
    ///
    /// Returns [`TrajectoryOutcome::ContinuedToTarget`] once the last
    /// checkpoint is at or past `target`; any other value is terminal and
    /// returned again on every later call without further work. The
    /// observer hears about a landing or an exit exactly once.
    pub fn update<O>(&mut self, target: f64, observer: &mut O) -> TrajectoryOutcome
    where
        O: FlightObserver + ?Sized,
    {
        if self.outcome.is_terminal() {
            return self.outcome;
        }

        let mut state = FlightState::from(self.last());
        while state.time < target {
            if self.checkpoints.len() >= self.capacity {
                warn!(
                    "Trajectory ran out of checkpoint space ({} stored) at t={:.0}",
                    self.capacity, state.time
                );
                return self.finish(TrajectoryOutcome::BufferExhausted);
            }

            let previous = state;
            let Some(report) = compute_segment(&mut state, &self.universe, &self.config) else {
                // At rest in empty space: nothing changes but time
                if target.is_finite() {
                    self.push(Checkpoint {
                        time: target,
                        ..Checkpoint::from(previous)
                    });
                }
                break;
            };
            self.substeps += report.trials;

            if !self.universe.rect().contains(state.pos) {
                observer.on_out_of_bounds(previous.time, previous.pos);
                return self.finish(TrajectoryOutcome::ExitedBounds {
                    time: previous.time,
                    position: previous.pos,
                });
            }

            if state.length > self.config.max_trajectory_length {
                debug!(
                    "Trajectory longer than {:.3e} m, stopping",
                    self.config.max_trajectory_length
                );
                self.cumulative_error += report.total_error;
                return self.finish(TrajectoryOutcome::LengthLimitExceeded);
            }

            if let Some(body) = self.universe.containing_body(state.pos) {
                let (landing, polar_angle, d) = self.land(body, &previous, &state);
                self.cumulative_error += report.total_error * d;
                observer.on_hit(landing.time, body, polar_angle);
                return self.finish(TrajectoryOutcome::Landed {
                    time: landing.time,
                    body,
                    polar_angle,
                    position: landing.pos,
                });
            }

            self.cumulative_error += report.total_error;
            self.push(state.into());
        }

        self.outcome = TrajectoryOutcome::ContinuedToTarget;
        self.outcome
    }

    /// Store the landing checkpoint for a segment ending inside `body`.
    ///
    /// The landing point is where the segment from `previous` to `inside`
    /// crosses the body surface; time and length are interpolated by the
    /// fraction of the segment flown. Returns the landing checkpoint, its
    /// angle from the body's pole and that fraction.
    fn land(
        &mut self,
        body: usize,
        previous: &FlightState,
        inside: &FlightState,
    ) -> (Checkpoint, f64, f64) {
        let planet = self.universe.bodies()[body];

        let m = planet.circle().intersect_from(inside.pos, previous.pos);
        let span = previous.pos.distance(inside.pos);
        let d = if span > 0.0 {
            (previous.pos.distance(m) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let landing = Checkpoint {
            time: previous.time + (inside.time - previous.time) * d,
            pos: m,
            vel: DVec2::ZERO,
            length: previous.length + (inside.length - previous.length) * d,
        };

        // Keep times strictly increasing
        if landing.time > previous.time {
            self.push(landing);
        } else if let (Some(t), Some(c)) = (self.times.last_mut(), self.checkpoints.last_mut()) {
            *t = landing.time;
            *c = landing;
        }

        (landing, planet.pole_angle_to(m, landing.time), d)
    }

    fn push(&mut self, checkpoint: Checkpoint) {
        self.times.push(checkpoint.time);
        self.checkpoints.push(checkpoint);
    }

    fn finish(&mut self, outcome: TrajectoryOutcome) -> TrajectoryOutcome {
        self.outcome = outcome;
        self.log_summary();
        outcome
    }

    fn last(&self) -> Checkpoint {
        // Never empty: the launch checkpoint is stored on construction
        self.checkpoints[self.checkpoints.len() - 1]
    }

    /// Interpolated position at `t`.
    ///
    /// `None` before launch, after the last checkpoint, or while fewer than
    /// two checkpoints exist. Checkpoint times return the stored position
    /// exactly.
    pub fn position_at(&self, t: f64) -> Option<Point> {
        let n = self.times.len();
        if n < 2 || t < self.times[0] || t > self.times[n - 1] {
            return None;
        }

        // Most queries hit the latest segment
        if t >= self.times[n - 2] {
            return Some(self.segment_point(n - 2, t));
        }

        let i = self.times.partition_point(|&x| x <= t) - 1;
        Some(self.segment_point(i, t))
    }

    /// Position at `t` on the segment starting at checkpoint `index`.
    fn segment_point(&self, index: usize, t: f64) -> Point {
        let (t0, t1) = (self.times[index], self.times[index + 1]);
        let d = (t - t0) / (t1 - t0);
        let (p0, p1) = (self.checkpoints[index].pos, self.checkpoints[index + 1].pos);
        p0 * (1.0 - d) + p1 * d
    }

    pub fn start_time(&self) -> f64 {
        self.times[0]
    }

    /// Time of the last checkpoint.
    pub fn end_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    pub fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    /// Path length up to the last checkpoint.
    pub fn length(&self) -> f64 {
        self.last().length
    }

    pub fn start(&self) -> &Checkpoint {
        &self.checkpoints[0]
    }

    pub fn last_checkpoint(&self) -> &Checkpoint {
        &self.checkpoints[self.checkpoints.len() - 1]
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn outcome(&self) -> TrajectoryOutcome {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    pub fn universe(&self) -> &Arc<Universe> {
        &self.universe
    }

    /// Sub-step trials so far, rejected ones included.
    pub fn substeps(&self) -> usize {
        self.substeps
    }

    pub fn cumulative_error(&self) -> f64 {
        self.cumulative_error
    }

    /// Mean error estimate per sub-step trial.
    pub fn average_error(&self) -> f64 {
        if self.substeps == 0 {
            0.0
        } else {
            self.cumulative_error / self.substeps as f64
        }
    }

    /// Log the computation statistics.
    pub fn log_summary(&self) {
        debug!(
            "Trajectory {:.0}..{:.0} s: {:?}, {} sub-steps, {} checkpoints, average error {:.3e}",
            self.start_time(),
            self.end_time(),
            self.outcome,
            self.substeps,
            self.checkpoints.len(),
            self.average_error()
        );
    }
}
