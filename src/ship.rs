//! The player's ship and its travel history.
//!
//! A ship alternates between resting on a body ([`SurfaceOrbit`]) and
//! flying ([`Trajectory`]). Its history is the ordered list of those path
//! segments; the last one is where the ship is now.

use std::sync::Arc;

use bevy::log::{debug, info};

use crate::config::SimulationConfig;
use crate::geometry::Point;
use crate::orbit::SurfaceOrbit;
use crate::outcome::TrajectoryOutcome;
use crate::physics::Universe;
use crate::trajectory::Trajectory;

/// Errors from ship commands.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ShipError {
    #[error("no body with index {0} in the universe")]
    UnknownBody(usize),

    #[error("cannot launch: ship is not resting on a body")]
    NotInOrbit,

    #[error("invalid thrust {0}")]
    InvalidThrust(f64),

    #[error("cannot launch at t={time}: ship landed at t={landed}")]
    LaunchBeforeLanding { time: f64, landed: f64 },
}

/// One piece of a ship's history.
#[derive(Clone, Debug)]
pub enum PathSegment {
    Orbit(SurfaceOrbit),
    Flight(Trajectory),
}

impl PathSegment {
    pub fn start_time(&self) -> f64 {
        match self {
            PathSegment::Orbit(o) => o.start_time(),
            PathSegment::Flight(f) => f.start_time(),
        }
    }

    pub fn end_time(&self) -> f64 {
        match self {
            PathSegment::Orbit(o) => o.end_time(),
            PathSegment::Flight(f) => f.end_time(),
        }
    }

    /// Position at `t`, if `t` lies within this segment.
    pub fn position_at(&self, t: f64) -> Option<Point> {
        match self {
            PathSegment::Orbit(o) => {
                (o.start_time() <= t && t <= o.end_time()).then(|| o.position_at(t))
            }
            PathSegment::Flight(f) => f.position_at(t),
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            PathSegment::Orbit(o) => o.length(),
            PathSegment::Flight(f) => f.length(),
        }
    }

    pub fn as_orbit(&self) -> Option<&SurfaceOrbit> {
        match self {
            PathSegment::Orbit(o) => Some(o),
            PathSegment::Flight(_) => None,
        }
    }

    pub fn as_flight(&self) -> Option<&Trajectory> {
        match self {
            PathSegment::Flight(f) => Some(f),
            PathSegment::Orbit(_) => None,
        }
    }
}

/// The player's ship.
#[derive(Clone, Debug)]
pub struct Ship {
    universe: Arc<Universe>,
    config: SimulationConfig,
    /// Never empty; alternates between orbits and flights.
    paths: Vec<PathSegment>,
    used_fuel: f64,
    launches: u32,
    lost: u32,
    flight_length: f64,
}

impl Ship {
    /// A ship resting on body `body` at Y-angle `y_angle` at time `t`.
    pub fn new(
        universe: Arc<Universe>,
        config: SimulationConfig,
        body: usize,
        t: f64,
        y_angle: f64,
    ) -> Result<Self, ShipError> {
        let orbit = universe
            .orbit_on(body, t, y_angle)
            .ok_or(ShipError::UnknownBody(body))?;

        Ok(Self {
            universe,
            config,
            paths: vec![PathSegment::Orbit(orbit)],
            used_fuel: 0.0,
            launches: 0,
            lost: 0,
            flight_length: 0.0,
        })
    }

    /// The orbit the ship currently rests on.
    pub fn orbit(&self) -> Option<&SurfaceOrbit> {
        self.paths.last().and_then(PathSegment::as_orbit)
    }

    /// The flight the ship is currently on.
    pub fn flight(&self) -> Option<&Trajectory> {
        self.paths.last().and_then(PathSegment::as_flight)
    }

    pub fn paths(&self) -> &[PathSegment] {
        &self.paths
    }

    pub fn universe(&self) -> &Arc<Universe> {
        &self.universe
    }

    /// Sum of all launch thrusts.
    pub fn used_fuel(&self) -> f64 {
        self.used_fuel
    }

    pub fn launches(&self) -> u32 {
        self.launches
    }

    /// Flights that left the universe.
    pub fn lost(&self) -> u32 {
        self.lost
    }

    /// Total length of all kept flights.
    pub fn flight_length(&self) -> f64 {
        self.flight_length
    }

    /// Leave the current orbit at `t`, pushed away from the body with speed
    /// `thrust` on top of the surface velocity.
    pub fn launch(&mut self, thrust: f64, t: f64) -> Result<(), ShipError> {
        if !(thrust.is_finite() && thrust >= 0.0) {
            return Err(ShipError::InvalidThrust(thrust));
        }
        let Some(PathSegment::Orbit(orbit)) = self.paths.last_mut() else {
            return Err(ShipError::NotInOrbit);
        };
        if t < orbit.start_time() {
            return Err(ShipError::LaunchBeforeLanding {
                time: t,
                landed: orbit.start_time(),
            });
        }

        orbit.close(t);
        let body = orbit.body_index();
        let (pos, vel) = orbit.launch_velocity(t, thrust);

        let trajectory = Trajectory::launch(t, pos, vel, self.universe.clone(), self.config);
        self.paths.push(PathSegment::Flight(trajectory));
        self.launches += 1;
        self.used_fuel += thrust;

        info!(
            "Ship launched from body {} at t={:.0} with thrust {:.1} m/s (speed {:.1} m/s)",
            body,
            t,
            thrust,
            vel.length()
        );
        Ok(())
    }

    /// Advance the current flight to `t`.
    ///
    /// Returns the flight outcome, or `None` while resting on a body. A
    /// landing moves the ship onto the hit body; leaving the universe drops
    /// the flight and puts the ship back where it launched.
    pub fn update(&mut self, t: f64) -> Option<TrajectoryOutcome> {
        let Some(PathSegment::Flight(trajectory)) = self.paths.last_mut() else {
            return None;
        };
        if trajectory.is_terminal() {
            return Some(trajectory.outcome());
        }

        let outcome = trajectory.update(t, &mut ());
        match outcome {
            TrajectoryOutcome::Landed {
                time,
                body,
                polar_angle,
                ..
            } => self.land(time, body, polar_angle),
            TrajectoryOutcome::ExitedBounds { time, .. } => self.lose(time),
            TrajectoryOutcome::LengthLimitExceeded => {
                debug!("Ship drifting after t={t:.0}: maximum length reached");
            }
            TrajectoryOutcome::BufferExhausted
            | TrajectoryOutcome::Running
            | TrajectoryOutcome::ContinuedToTarget => {}
        }
        Some(outcome)
    }

    fn land(&mut self, time: f64, body: usize, polar_angle: f64) {
        self.update_flight_length();
        if let Some(planet) = self.universe.body(body) {
            self.paths
                .push(PathSegment::Orbit(SurfaceOrbit::new(body, *planet, time, polar_angle)));
            info!("Ship landed on body {body} at t={time:.0}");
        }
    }

    fn lose(&mut self, time: f64) {
        self.paths.pop();
        if let Some(PathSegment::Orbit(orbit)) = self.paths.last_mut() {
            orbit.reopen();
        }
        self.lost += 1;
        self.update_flight_length();
        info!("Ship left the universe at t={time:.0}");
    }

    fn update_flight_length(&mut self) {
        self.flight_length = self
            .paths
            .iter()
            .filter_map(PathSegment::as_flight)
            .map(Trajectory::length)
            .sum();
    }

    /// Position at `t`, searching the whole history.
    pub fn position_at(&self, t: f64) -> Option<Point> {
        let last = self.paths.last()?;
        if let Some(pos) = last.position_at(t) {
            return Some(pos);
        }
        self.paths
            .iter()
            .rev()
            .skip(1)
            .find_map(|path| path.position_at(t))
    }

    /// Returns true if the ship rests on body `index`.
    pub fn is_on(&self, index: usize) -> bool {
        self.orbit().is_some_and(|o| o.body_index() == index)
    }
}
