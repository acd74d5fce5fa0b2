//! Ships resting on a body surface.

use bevy::math::DVec2;

use crate::geometry::{Point, scaled_to};
use crate::physics::Body;

/// Path of a ship standing on the surface of a rotating body.
///
/// The ship turns with the body: its Y-angle is the body's pole angle plus a
/// fixed `phase`. Position and velocity are pure functions of time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceOrbit {
    body_index: usize,
    body: Body,
    start_time: f64,
    end_time: f64,
    phase: f64,
}

impl SurfaceOrbit {
    /// Orbit entered at `start_time`, `phase` radians from the body's pole.
    pub fn new(body_index: usize, body: Body, start_time: f64, phase: f64) -> Self {
        Self {
            body_index,
            body,
            start_time,
            end_time: f64::INFINITY,
            phase,
        }
    }

    /// Orbit that is at Y-angle `y_angle` at time `t`.
    pub fn on_body(body_index: usize, body: Body, t: f64, y_angle: f64) -> Self {
        Self::new(body_index, body, t, y_angle - body.angle_at(t))
    }

    pub fn body_index(&self) -> usize {
        self.body_index
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Infinite while the ship rests here.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.end_time.is_infinite()
    }

    /// The ship leaves the orbit at `t`.
    pub fn close(&mut self, t: f64) {
        self.end_time = t;
    }

    /// Undo [`close`](Self::close): the ship rests here again.
    pub fn reopen(&mut self) {
        self.end_time = f64::INFINITY;
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Surface arc travelled while on the orbit.
    pub fn length(&self) -> f64 {
        self.body.rotation().abs() * self.body.radius() * self.duration()
    }

    pub fn y_angle_at(&self, t: f64) -> f64 {
        self.body.angle_at(t) + self.phase
    }

    pub fn position_at(&self, t: f64) -> Point {
        self.body.circle().point_at_angle(self.y_angle_at(t))
    }

    /// Position and surface velocity at `t`.
    ///
    /// The velocity is tangential: the radius vector turned a quarter
    /// clockwise and scaled to `rotation · radius`. A counterclockwise
    /// rotation flips it.
    pub fn pos_velocity(&self, t: f64) -> (Point, DVec2) {
        let pos = self.position_at(t);
        let r = pos - self.body.center();
        let tangent = DVec2::new(r.y, -r.x);
        (pos, scaled_to(tangent, self.body.rotation() * self.body.radius()))
    }

    /// Position and velocity of a ship launched at `t` with radial speed
    /// `thrust`.
    pub fn launch_velocity(&self, t: f64, thrust: f64) -> (Point, DVec2) {
        let (pos, surface) = self.pos_velocity(t);
        let radial = scaled_to(pos - self.body.center(), thrust);
        (pos, radial + surface)
    }
}
