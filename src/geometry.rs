//! 2D geometry primitives for the sandbox.
//!
//! Points and vectors are both `DVec2`; the aliases only document intent.
//! Angles on circles are measured clockwise from the +y axis ("Y-angles"),
//! not counterclockwise from +x as in the mathematical convention.

use std::f64::consts::FRAC_PI_2;

use bevy::math::DVec2;

/// A position in the universe (meters).
pub type Point = DVec2;

/// A displacement, velocity or acceleration.
pub type Vector = DVec2;

/// Convert a mathematical angle to a Y-angle.
///
/// Mathematical: starts at (1, 0), increases counterclockwise.
/// Y-angle: starts at (0, 1), increases clockwise.
#[inline]
pub fn angle_m2y(a: f64) -> f64 {
    FRAC_PI_2 - a
}

/// Convert a Y-angle to a mathematical angle.
///
/// The mapping is its own inverse.
#[inline]
pub fn angle_y2m(a: f64) -> f64 {
    FRAC_PI_2 - a
}

/// 2D cross product (z-component), the signed area of the parallelogram
/// spanned by `a` and `b`.
#[inline]
pub fn cross(a: Vector, b: Vector) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Return `v` scaled to length `len`.
///
/// A negative length flips the direction. A zero vector stays zero.
#[inline]
pub fn scaled_to(v: Vector, len: f64) -> Vector {
    let l = v.length();
    if l == 0.0 { DVec2::ZERO } else { v * (len / l) }
}

/// Angle between two vectors, in `[0, π]`.
pub fn angle_between(a: Vector, b: Vector) -> f64 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    /// Create a rectangle from two diagonally opposite corners in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min: DVec2::new(x1.min(x2), y1.min(y2)),
            max: DVec2::new(x1.max(x2), y1.max(y2)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Height to width ratio.
    pub fn hw_ratio(&self) -> f64 {
        self.height() / self.width()
    }

    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.min.x <= p.x && p.x <= self.max.x && self.min.y <= p.y && p.y <= self.max.y
    }

    /// Shrink the rectangle by `d` on every side.
    ///
    /// Returns `None` when nothing would be left.
    pub fn inset(&self, d: f64) -> Option<Rect> {
        let min = self.min + DVec2::splat(d);
        let max = self.max - DVec2::splat(d);
        (min.x <= max.x && min.y <= max.y).then_some(Rect { min, max })
    }
}

/// A circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Boundary-inclusive containment.
    pub fn contains(&self, p: Point) -> bool {
        self.center.distance(p) <= self.radius
    }

    /// Strict containment, the test used for hits.
    #[inline]
    pub fn contains_strict(&self, p: Point) -> bool {
        self.center.distance_squared(p) < self.radius * self.radius
    }

    /// Point on the circle at Y-angle `a` (clockwise from +y).
    pub fn point_at_angle(&self, a: f64) -> Point {
        let m = angle_y2m(a);
        self.center + DVec2::new(m.cos(), m.sin()) * self.radius
    }

    /// Y-angle of the line from the center to `p`.
    ///
    /// `c.polar_angle_to(c.point_at_angle(a)) == a` modulo 2π.
    pub fn polar_angle_to(&self, p: Point) -> f64 {
        let d = p - self.center;
        angle_m2y(d.y.atan2(d.x))
    }

    /// Point where the segment from `inside` to `outside` crosses the circle.
    ///
    /// Solves `|I + t·v|² = r²` for the non-negative root, with `I` relative to
    /// the center and `v = outside - inside`. `inside` must lie within the
    /// circle and `outside` beyond it, which keeps `t` in `[0, 1]`.
    pub fn intersect_from(&self, inside: Point, outside: Point) -> Point {
        let i = inside - self.center;
        let v = outside - inside;

        let a = v.length_squared();
        if a == 0.0 {
            return inside;
        }
        let b = 2.0 * i.dot(v);
        let c = i.length_squared() - self.radius * self.radius;

        let disc = (b * b - 4.0 * a * c).max(0.0);
        let t = ((-b + disc.sqrt()) / (2.0 * a)).clamp(0.0, 1.0);
        inside + v * t
    }
}
