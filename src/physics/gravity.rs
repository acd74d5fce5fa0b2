//! Gravity field of a universe.
//!
//! Bodies never move, so their positions and `G·m` products are packed once
//! into `f64x4` lanes and every query sums four bodies per iteration.

use std::fmt;

use bevy::math::DVec2;
use wide::f64x4;

use super::{Body, Universe};
use crate::geometry::Point;

/// Squared distances below this (m²) are clamped before dividing.
///
/// Keeps queries at a body center finite: the offset to that body is zero
/// there, so its contribution is zero rather than NaN.
pub const MIN_DISTANCE_SQ: f64 = 1.0;

/// Four bodies in structure-of-arrays layout.
#[derive(Clone, Copy)]
struct Lanes {
    x: f64x4,
    y: f64x4,
    gm: f64x4,
}

/// Precomputed gravity sources of a fixed set of bodies.
///
/// Padding lanes carry `gm = 0` and contribute nothing.
#[derive(Clone)]
pub struct GravityField {
    lanes: Vec<Lanes>,
    len: usize,
}

impl fmt::Debug for GravityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GravityField")
            .field("bodies", &self.len)
            .field("lanes", &self.lanes.len())
            .finish()
    }
}

impl GravityField {
    pub fn new(bodies: &[Body], gravity: f64) -> Self {
        let lanes = bodies
            .chunks(4)
            .map(|chunk| {
                let mut x = [0.0; 4];
                let mut y = [0.0; 4];
                let mut gm = [0.0; 4];
                for (i, body) in chunk.iter().enumerate() {
                    let c = body.center();
                    x[i] = c.x;
                    y[i] = c.y;
                    gm[i] = gravity * body.mass();
                }
                Lanes {
                    x: f64x4::new(x),
                    y: f64x4::new(y),
                    gm: f64x4::new(gm),
                }
            })
            .collect();

        Self {
            lanes,
            len: bodies.len(),
        }
    }

    /// Number of bodies in the field.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Combined acceleration at `pos` (m/s²).
    ///
    /// Each body contributes `d · G·m / |d|³` with `d = center - pos`.
    /// `|d|²` is clamped to [`MIN_DISTANCE_SQ`].
    #[inline]
    pub fn acceleration_at(&self, pos: Point) -> DVec2 {
        let px = f64x4::splat(pos.x);
        let py = f64x4::splat(pos.y);
        let floor = f64x4::splat(MIN_DISTANCE_SQ);

        let mut ax = f64x4::ZERO;
        let mut ay = f64x4::ZERO;
        for lane in &self.lanes {
            let dx = lane.x - px;
            let dy = lane.y - py;
            let r2 = (dx * dx + dy * dy).max(floor);
            let k = lane.gm / (r2 * r2.sqrt());
            ax += dx * k;
            ay += dy * k;
        }

        let ax = ax.to_array();
        let ay = ay.to_array();
        DVec2::new(ax.iter().sum(), ay.iter().sum())
    }
}

/// Gravity sampled at the cell centres of a regular grid over the universe.
///
/// Row 0 is the bottom row. Read-only over the universe, so it can be built
/// on any thread holding a shared universe.
#[derive(Clone, Debug)]
pub struct GravityGrid {
    rows: usize,
    cols: usize,
    cell: DVec2,
    origin: Point,
    vectors: Vec<DVec2>,
    magnitudes: Vec<f64>,
}

impl GravityGrid {
    pub fn sample(universe: &Universe, rows: usize, cols: usize) -> Self {
        let rect = universe.rect();
        let cell = if rows == 0 || cols == 0 {
            DVec2::ZERO
        } else {
            DVec2::new(rect.width() / cols as f64, rect.height() / rows as f64)
        };

        let mut grid = Self {
            rows,
            cols,
            cell,
            origin: rect.min,
            vectors: Vec::with_capacity(rows * cols),
            magnitudes: Vec::with_capacity(rows * cols),
        };

        for row in 0..rows {
            for col in 0..cols {
                let g = universe.gravity_at(grid.cell_center(row, col));
                grid.vectors.push(g);
                grid.magnitudes.push(g.length());
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Center of cell (`row`, `col`).
    pub fn cell_center(&self, row: usize, col: usize) -> Point {
        self.origin + DVec2::new(col as f64 + 0.5, row as f64 + 0.5) * self.cell
    }

    pub fn vector(&self, row: usize, col: usize) -> Option<DVec2> {
        self.index(row, col).map(|i| self.vectors[i])
    }

    pub fn magnitude(&self, row: usize, col: usize) -> Option<f64> {
        self.index(row, col).map(|i| self.magnitudes[i])
    }

    /// All magnitudes, row-major.
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    /// All vectors, row-major.
    pub fn vectors(&self) -> &[DVec2] {
        &self.vectors
    }

    /// Largest magnitude in the grid, zero for an empty grid.
    pub fn max_magnitude(&self) -> f64 {
        self.magnitudes.iter().copied().fold(0.0, f64::max)
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }
}
