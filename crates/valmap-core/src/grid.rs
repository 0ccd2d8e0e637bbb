//! Spatial sampling grid.
//!
//! A [`SpatialGrid`] is the Cartesian product of two coordinate axes.  Cell
//! `(i, j)` samples the point `(xs[i], ys[j])`.  Axes are usually
//! `linspace(-max_dist, max_dist, discrete_space_size)`, but any finite
//! coordinates are accepted: value computation does not depend on ordering.

use serde::{Deserialize, Serialize};
use valmap_types::{Point2, ValueMapError};

/// `n` evenly spaced values from `start` to `stop` inclusive.
///
/// The last element is exactly `stop`.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + i as f64 * step })
                .collect()
        }
    }
}

/// Parameters of a square grid symmetric about the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    /// Samples per axis.
    #[serde(default = "default_discrete_space_size")]
    pub discrete_space_size: usize,
    /// Half-width of the sampled square.
    #[serde(default = "default_max_dist")]
    pub max_dist: f64,
}

fn default_discrete_space_size() -> usize {
    30
}
fn default_max_dist() -> f64 {
    10.0
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            discrete_space_size: default_discrete_space_size(),
            max_dist: default_max_dist(),
        }
    }
}

/// Axis-aligned 2-D sampling grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialGrid {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl SpatialGrid {
    /// Build a grid from explicit axis coordinates.  Both axes must be
    /// non-empty.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, ValueMapError> {
        if xs.is_empty() || ys.is_empty() {
            return Err(ValueMapError::InvalidParameters(
                "grid axes must be non-empty".to_string(),
            ));
        }
        Ok(Self { xs, ys })
    }

    /// Square grid over `[-max_dist, max_dist]²` with
    /// `discrete_space_size` samples per axis.
    pub fn symmetric(params: &GridParams) -> Result<Self, ValueMapError> {
        if params.discrete_space_size < 2 {
            return Err(ValueMapError::InvalidParameters(format!(
                "discrete_space_size must be >= 2, got {}",
                params.discrete_space_size
            )));
        }
        if !params.max_dist.is_finite() || params.max_dist <= 0.0 {
            return Err(ValueMapError::InvalidParameters(format!(
                "max_dist must be finite and > 0, got {}",
                params.max_dist
            )));
        }
        let axis = linspace(-params.max_dist, params.max_dist, params.discrete_space_size);
        Self::new(axis.clone(), axis)
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// `(len(xs), len(ys))`.
    pub fn shape(&self) -> (usize, usize) {
        (self.xs.len(), self.ys.len())
    }

    /// The sample point of cell `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics when `i` or `j` is out of range.
    pub fn sample(&self, i: usize, j: usize) -> Point2 {
        Point2::new(self.xs[i], self.ys[j])
    }

    /// Iterate `(i, j, point)` over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Point2)> + '_ {
        self.xs.iter().enumerate().flat_map(move |(i, &x)| {
            self.ys
                .iter()
                .enumerate()
                .map(move |(j, &y)| (i, j, Point2::new(x, y)))
        })
    }
}
