//! Distance-Table Provider.
//!
//! A [`DistanceTable`] maps a continuous radial distance to a precomputed
//! scalar value.  The distance axis `[0, radius_threshold]` is sampled at
//! `discrete_size` evenly spaced boundaries and each boundary carries one
//! value.  In the reference setup the values are a truncated normal density
//! ([`TruncatedNormal`]), but any density function or externally supplied
//! sample list can be used.
//!
//! # Bucket search
//!
//! [`DistanceTable::bucket_for`] resolves a distance `d` to an index:
//!
//! | Distance | Bucket |
//! |---|---|
//! | `d < b[0]` | `0` (clamp low) |
//! | `d > b[last]` | `last` (clamp high) |
//! | `b[i] < d < b[i+1]` | `i` |
//! | `d == b[i]` | `i` |
//!
//! An exact boundary hit resolves to the lower index of the boundary pair
//! `(b[i], b[i+1])` it opens, so `bucket_for(b[0]) == 0` and
//! `bucket_for(b[last]) == last`.
//!
//! # Example
//!
//! ```rust
//! use valmap_core::table::{DistanceTable, TableParams};
//!
//! let table = DistanceTable::truncated_normal(&TableParams::default()).unwrap();
//! assert_eq!(table.len(), 100);
//!
//! // Distance 0 sits exactly on the first boundary.
//! assert_eq!(table.bucket_for(0.0), 0);
//! assert_eq!(table.value_at(0.0), table.values()[0]);
//!
//! // Beyond the radius threshold the last sample is used.
//! assert_eq!(table.bucket_for(50.0), table.len() - 1);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use valmap_types::ValueMapError;

use crate::grid::linspace;

// ────────────────────────────────────────────────────────────────────────────
// Parameters
// ────────────────────────────────────────────────────────────────────────────

/// Parameters of a truncated-normal distance table.
///
/// `lower_bound` / `upper_bound` are truncation limits in distance units; they
/// default to `0` and `radius_threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableParams {
    /// Largest tabulated distance.
    #[serde(default = "default_radius_threshold")]
    pub radius_threshold: f64,
    /// Number of boundary samples on `[0, radius_threshold]`.
    #[serde(default = "default_discrete_size")]
    pub discrete_size: usize,
    #[serde(default = "default_mean")]
    pub mean: f64,
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

fn default_radius_threshold() -> f64 {
    7.0
}
fn default_discrete_size() -> usize {
    100
}
fn default_mean() -> f64 {
    2.0
}
fn default_sigma() -> f64 {
    2.0
}

impl Default for TableParams {
    fn default() -> Self {
        Self {
            radius_threshold: default_radius_threshold(),
            discrete_size: default_discrete_size(),
            mean: default_mean(),
            sigma: default_sigma(),
            lower_bound: None,
            upper_bound: None,
        }
    }
}

impl TableParams {
    /// Truncation limits in distance units, with defaults applied.
    pub fn bounds(&self) -> (f64, f64) {
        (
            self.lower_bound.unwrap_or(0.0),
            self.upper_bound.unwrap_or(self.radius_threshold),
        )
    }
}

/// Check the distance domain shared by every table flavour.
pub(crate) fn validate_domain(
    radius_threshold: f64,
    discrete_size: usize,
) -> Result<(), ValueMapError> {
    if discrete_size < 2 {
        return Err(ValueMapError::InvalidParameters(format!(
            "discrete_size must be >= 2, got {discrete_size}"
        )));
    }
    if !radius_threshold.is_finite() || radius_threshold <= 0.0 {
        return Err(ValueMapError::InvalidParameters(format!(
            "radius_threshold must be finite and > 0, got {radius_threshold}"
        )));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// TruncatedNormal
// ────────────────────────────────────────────────────────────────────────────

/// Normal density with mean `mean` and standard deviation `sigma`,
/// truncated to `[lower, upper]` and renormalised to unit mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncatedNormal {
    mean: f64,
    sigma: f64,
    lower: f64,
    upper: f64,
    /// Probability mass of the untruncated normal inside `[lower, upper]`.
    mass: f64,
}

impl TruncatedNormal {
    /// Build the distribution.  `lower` and `upper` are in distance units.
    pub fn new(mean: f64, sigma: f64, lower: f64, upper: f64) -> Result<Self, ValueMapError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(ValueMapError::InvalidParameters(format!(
                "sigma must be finite and > 0, got {sigma}"
            )));
        }
        if !mean.is_finite() || lower.is_nan() || upper.is_nan() {
            return Err(ValueMapError::InvalidParameters(
                "mean and truncation bounds must be numbers".to_string(),
            ));
        }
        if lower >= upper {
            return Err(ValueMapError::InvalidParameters(format!(
                "lower_bound ({lower}) must be below upper_bound ({upper})"
            )));
        }

        let a = (lower - mean) / sigma;
        let b = (upper - mean) / sigma;
        let mass = standard_normal_cdf(b) - standard_normal_cdf(a);
        if mass <= 0.0 || !mass.is_finite() {
            return Err(ValueMapError::InvalidParameters(format!(
                "truncation window [{lower}, {upper}] holds no probability mass"
            )));
        }

        Ok(Self {
            mean,
            sigma,
            lower,
            upper,
            mass,
        })
    }

    /// Truncation bounds in standardised units `(bound - mean) / sigma`.
    pub fn standardized_bounds(&self) -> (f64, f64) {
        (
            (self.lower - self.mean) / self.sigma,
            (self.upper - self.mean) / self.sigma,
        )
    }

    /// Density at `x`; zero outside the truncation window.
    pub fn pdf(&self, x: f64) -> f64 {
        if x < self.lower || x > self.upper {
            return 0.0;
        }
        let z = (x - self.mean) / self.sigma;
        standard_normal_pdf(z) / (self.sigma * self.mass)
    }
}

fn standard_normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Abramowitz & Stegun 7.1.26 (|error| < 1.5e-7).
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

// ────────────────────────────────────────────────────────────────────────────
// DistanceTable
// ────────────────────────────────────────────────────────────────────────────

/// Immutable `(boundary, value)` lookup table over radial distance.
///
/// Invariants: at least one sample; boundaries finite and strictly
/// increasing.  Deserialization goes through the same checks as
/// [`from_samples`][Self::from_samples].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDistanceTable")]
pub struct DistanceTable {
    boundaries: Vec<f64>,
    values: Vec<f64>,
}

/// Wire form of [`DistanceTable`], validated on conversion.
#[derive(Deserialize)]
struct RawDistanceTable {
    boundaries: Vec<f64>,
    values: Vec<f64>,
}

impl TryFrom<RawDistanceTable> for DistanceTable {
    type Error = ValueMapError;

    fn try_from(raw: RawDistanceTable) -> Result<Self, Self::Error> {
        if raw.values.len() != raw.boundaries.len() {
            return Err(ValueMapError::TableShape {
                expected: raw.boundaries.len(),
                actual: raw.values.len(),
            });
        }
        Self::from_samples(raw.boundaries.into_iter().zip(raw.values))
    }
}

impl DistanceTable {
    /// Build a table from externally supplied `(boundary, value)` samples.
    pub fn from_samples(
        samples: impl IntoIterator<Item = (f64, f64)>,
    ) -> Result<Self, ValueMapError> {
        let (boundaries, values): (Vec<f64>, Vec<f64>) = samples.into_iter().unzip();
        if boundaries.is_empty() {
            return Err(ValueMapError::InvalidParameters(
                "distance table needs at least one sample".to_string(),
            ));
        }
        if let Some(index) = boundaries.iter().position(|b| !b.is_finite()) {
            return Err(ValueMapError::InvalidParameters(format!(
                "boundary {index} is not finite"
            )));
        }
        if let Some(pair) = boundaries.windows(2).position(|w| w[0] >= w[1]) {
            return Err(ValueMapError::UnsortedBoundaries { index: pair + 1 });
        }
        Ok(Self { boundaries, values })
    }

    /// Sample `density` at `discrete_size` evenly spaced distances on
    /// `[0, radius_threshold]`.
    pub fn from_density(
        radius_threshold: f64,
        discrete_size: usize,
        density: impl Fn(f64) -> f64,
    ) -> Result<Self, ValueMapError> {
        validate_domain(radius_threshold, discrete_size)?;
        let boundaries = linspace(0.0, radius_threshold, discrete_size);
        let values = boundaries.iter().map(|&d| density(d)).collect();
        Ok(Self::from_parts(boundaries, values))
    }

    /// The reference table: a truncated normal density over
    /// `[0, radius_threshold]`.
    pub fn truncated_normal(params: &TableParams) -> Result<Self, ValueMapError> {
        validate_domain(params.radius_threshold, params.discrete_size)?;
        let (lower, upper) = params.bounds();
        let dist = TruncatedNormal::new(params.mean, params.sigma, lower, upper)?;
        debug!(
            radius_threshold = params.radius_threshold,
            discrete_size = params.discrete_size,
            mean = params.mean,
            sigma = params.sigma,
            standardized_bounds = ?dist.standardized_bounds(),
            "building truncated-normal distance table"
        );
        Self::from_density(params.radius_threshold, params.discrete_size, |d| {
            dist.pdf(d)
        })
    }

    /// Caller guarantees the invariants (validated boundaries, equal lengths).
    pub(crate) fn from_parts(boundaries: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(boundaries.len(), values.len());
        Self { boundaries, values }
    }

    /// Index of the bucket covering `distance`.
    ///
    /// NaN resolves to bucket 0; use [`value_at`][Self::value_at] to get a
    /// NaN-propagating lookup.
    pub fn bucket_for(&self, distance: f64) -> usize {
        bucket_index(&self.boundaries, distance)
    }

    /// Table value for `distance`.  NaN distances yield NaN.
    pub fn value_at(&self, distance: f64) -> f64 {
        if distance.is_nan() {
            return f64::NAN;
        }
        self.values[self.bucket_for(distance)]
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// Always `false`; a table holds at least one sample.
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Iterate `(boundary, value)` pairs in boundary order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.boundaries.iter().copied().zip(self.values.iter().copied())
    }
}

/// Bucket search shared by [`DistanceTable`] and the pairwise tables.
///
/// `boundaries` must be non-empty and strictly increasing.  The bucket is the
/// last boundary `<= distance`, clamped to `[0, len - 1]`.
pub(crate) fn bucket_index(boundaries: &[f64], distance: f64) -> usize {
    boundaries
        .partition_point(|&b| b <= distance)
        .saturating_sub(1)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
