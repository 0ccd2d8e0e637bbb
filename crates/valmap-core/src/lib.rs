//! `valmap-core` – spatial value-field engine.
//!
//! Estimates how "valuable" each location of a 2-D grid is relative to a set
//! of known objects.  Every object contributes a value looked up by its
//! radial distance from the grid point; contributions are summed into a
//! [`ValueField`][field::ValueField] that an external renderer can plot.
//!
//! # Modules
//!
//! - [`table`] – [`DistanceTable`][table::DistanceTable]: the
//!   Distance-Table Provider.  Maps a continuous distance to a precomputed
//!   value via clamped bucket search; built from a
//!   [`TruncatedNormal`][table::TruncatedNormal] density or from external
//!   samples.
//! - [`pairwise`] – [`PairwiseTable`][pairwise::PairwiseTable]: one value
//!   curve per pair of object labels, loaded from flat dense data.
//! - [`source`] – [`ValueSource`][source::ValueSource]: the seam through which
//!   the evaluator asks a table for an object's contribution.
//! - [`grid`] – [`SpatialGrid`][grid::SpatialGrid]: the sampled axes.
//! - [`field`] – [`ValueField`][field::ValueField]: the dense output array.
//! - [`evaluator`] – [`GridEvaluator`][evaluator::GridEvaluator]: accumulates
//!   per-object contributions over the grid, sequentially or on the rayon
//!   pool.

pub mod evaluator;
pub mod field;
pub mod grid;
pub mod pairwise;
pub mod source;
pub mod table;

pub use evaluator::GridEvaluator;
pub use field::ValueField;
pub use grid::{GridParams, SpatialGrid};
pub use pairwise::{PairwiseTable, SubjectView};
pub use source::ValueSource;
pub use table::{DistanceTable, TableParams, TruncatedNormal};
