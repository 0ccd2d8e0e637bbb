//! Pairwise distance tables.
//!
//! A [`PairwiseTable`] holds one value curve per ordered pair of object
//! labels: `values[i][j][k]` is the value of a sample `b[k]` away from an
//! object labelled `j`, from the point of view of subject label `i`.  The data
//! arrives as a flat dense array of `number_objects² × discrete_size` floats
//! (see [`parse_dense`]) and is reshaped here.
//!
//! Three ways to use it:
//!
//! - [`PairwiseTable::pair`] – one `(i, j)` curve as a [`DistanceTable`].
//! - [`PairwiseTable::collapsed`] – every pair summed per bucket, giving a
//!   single shared table.
//! - [`PairwiseTable::for_subject`] – a [`ValueSource`] that picks the curve
//!   from each object's label.
//!
//! # Example
//!
//! ```rust
//! use valmap_core::pairwise::{parse_dense, PairwiseTable};
//! use valmap_core::source::ValueSource;
//! use valmap_types::ReferenceObject;
//!
//! // 2 objects × 2 objects × 3 buckets.
//! let flat = parse_dense("1 2 3\n4 5 6\n7 8 9\n10 11 12\n").unwrap();
//! let table = PairwiseTable::from_flat(flat, 2, 2.0, 3).unwrap();
//!
//! let view = table.for_subject(0).unwrap();
//! let partner = ReferenceObject::labelled(1, 0.0, 0.0);
//! assert_eq!(view.value_for(&partner, 1.0), 5.0);
//! ```

use valmap_types::{ReferenceObject, ValueMapError};

use crate::grid::linspace;
use crate::source::ValueSource;
use crate::table::{DistanceTable, bucket_index, validate_domain};

// ────────────────────────────────────────────────────────────────────────────
// Dense text parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parse whitespace- or comma-separated floats.
///
/// Blank lines and anything after `#` on a line are ignored, so the output of
/// numpy's `savetxt` can be read directly.
pub fn parse_dense(text: &str) -> Result<Vec<f64>, ValueMapError> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(|line| line.split(|c: char| c.is_whitespace() || c == ','))
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(index, token)| {
            token.parse::<f64>().map_err(|_| ValueMapError::Parse {
                index,
                token: token.to_string(),
            })
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// PairwiseTable
// ────────────────────────────────────────────────────────────────────────────

/// `(number_objects, number_objects, discrete_size)` value tensor over a
/// shared distance axis `linspace(0, radius_threshold, discrete_size)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseTable {
    number_objects: usize,
    boundaries: Vec<f64>,
    values: Vec<f64>,
}

impl PairwiseTable {
    /// Reshape a flat array into a pairwise table.
    ///
    /// Fails with [`ValueMapError::TableShape`] when `values.len()` is not
    /// `number_objects² × discrete_size`.
    pub fn from_flat(
        values: Vec<f64>,
        number_objects: usize,
        radius_threshold: f64,
        discrete_size: usize,
    ) -> Result<Self, ValueMapError> {
        validate_domain(radius_threshold, discrete_size)?;
        if number_objects == 0 {
            return Err(ValueMapError::InvalidParameters(
                "number_objects must be >= 1".to_string(),
            ));
        }
        let expected = number_objects
            .checked_mul(number_objects)
            .and_then(|pairs| pairs.checked_mul(discrete_size))
            .ok_or_else(|| {
                ValueMapError::InvalidParameters(format!(
                    "{number_objects} objects × {discrete_size} buckets overflows the table size"
                ))
            })?;
        if values.len() != expected {
            return Err(ValueMapError::TableShape {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            number_objects,
            boundaries: linspace(0.0, radius_threshold, discrete_size),
            values,
        })
    }

    pub fn number_objects(&self) -> usize {
        self.number_objects
    }

    pub fn discrete_size(&self) -> usize {
        self.boundaries.len()
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Bucket rule identical to [`DistanceTable::bucket_for`].
    pub fn bucket_for(&self, distance: f64) -> usize {
        bucket_index(&self.boundaries, distance)
    }

    /// The value curve of subject `i` towards partner `j`.
    pub fn pair(&self, i: usize, j: usize) -> Result<DistanceTable, ValueMapError> {
        self.check_label(i)?;
        self.check_label(j)?;
        Ok(DistanceTable::from_parts(
            self.boundaries.clone(),
            self.curve(i, j).to_vec(),
        ))
    }

    /// A single table whose bucket `k` is the sum of `values[i][j][k]` over
    /// every `(i, j)`.
    pub fn collapsed(&self) -> DistanceTable {
        let size = self.discrete_size();
        let mut summed = vec![0.0; size];
        for curve in self.values.chunks(size) {
            for (acc, v) in summed.iter_mut().zip(curve) {
                *acc += v;
            }
        }
        DistanceTable::from_parts(self.boundaries.clone(), summed)
    }

    /// A [`ValueSource`] that scores objects from the point of view of
    /// `subject`.
    pub fn for_subject(&self, subject: usize) -> Result<SubjectView<'_>, ValueMapError> {
        self.check_label(subject)?;
        Ok(SubjectView {
            table: self,
            subject,
        })
    }

    fn check_label(&self, label: usize) -> Result<(), ValueMapError> {
        if label >= self.number_objects {
            return Err(ValueMapError::LabelOutOfRange {
                label,
                number_objects: self.number_objects,
            });
        }
        Ok(())
    }

    fn curve(&self, i: usize, j: usize) -> &[f64] {
        let size = self.discrete_size();
        let start = (i * self.number_objects + j) * size;
        &self.values[start..start + size]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SubjectView
// ────────────────────────────────────────────────────────────────────────────

/// A pairwise table seen from one subject label.
///
/// Labelled objects contribute `values[subject][label][bucket]`.  Objects
/// without a label, or with a label beyond the table, contribute `0.0`.
#[derive(Debug, Clone, Copy)]
pub struct SubjectView<'a> {
    table: &'a PairwiseTable,
    subject: usize,
}

impl SubjectView<'_> {
    pub fn subject(&self) -> usize {
        self.subject
    }
}

impl ValueSource for SubjectView<'_> {
    fn value_for(&self, object: &ReferenceObject, distance: f64) -> f64 {
        match object.label {
            Some(label) if label < self.table.number_objects => {
                if distance.is_nan() {
                    return f64::NAN;
                }
                self.table.curve(self.subject, label)[self.table.bucket_for(distance)]
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2 × 2 pairs × 3 buckets on `[0, 2]`, values 1..=12.
    fn small_table() -> PairwiseTable {
        let flat: Vec<f64> = (1..=12).map(f64::from).collect();
        PairwiseTable::from_flat(flat, 2, 2.0, 3).unwrap()
    }

    // ── parse_dense ─────────────────────────────────────────────────────────

    #[test]
    fn parse_dense_reads_savetxt_output() {
        let text = "# header\n1.0e+00 2.5\n\n-3 4.25e-1 # trailing\n";
        assert_eq!(parse_dense(text).unwrap(), vec![1.0, 2.5, -3.0, 0.425]);
    }

    #[test]
    fn parse_dense_accepts_commas() {
        assert_eq!(parse_dense("1,2, 3\n4").unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn parse_dense_reports_bad_token() {
        let err = parse_dense("1 2\nthree 4").unwrap_err();
        assert_eq!(
            err,
            ValueMapError::Parse {
                index: 2,
                token: "three".to_string()
            }
        );
    }

    // ── PairwiseTable ───────────────────────────────────────────────────────

    #[test]
    fn from_flat_checks_element_count() {
        let err = PairwiseTable::from_flat(vec![0.0; 11], 2, 2.0, 3).unwrap_err();
        assert_eq!(
            err,
            ValueMapError::TableShape {
                expected: 12,
                actual: 11
            }
        );
    }

    #[test]
    fn from_flat_rejects_overflowing_object_count() {
        let err = PairwiseTable::from_flat(Vec::new(), 1 << 32, 7.0, 100).unwrap_err();
        assert!(matches!(err, ValueMapError::InvalidParameters(_)), "{err}");
    }

    #[test]
    fn from_flat_validates_domain() {
        assert!(PairwiseTable::from_flat(vec![0.0; 4], 2, 2.0, 1).is_err());
        assert!(PairwiseTable::from_flat(vec![0.0; 12], 2, 0.0, 3).is_err());
        assert!(PairwiseTable::from_flat(Vec::new(), 0, 2.0, 3).is_err());
    }

    #[test]
    fn pair_extracts_curve() {
        let table = small_table();
        let t01 = table.pair(0, 1).unwrap();
        assert_eq!(t01.values(), &[4.0, 5.0, 6.0]);
        assert_eq!(t01.boundaries(), &[0.0, 1.0, 2.0]);
        let t10 = table.pair(1, 0).unwrap();
        assert_eq!(t10.values(), &[7.0, 8.0, 9.0]);
    }

    #[test]
    fn pair_rejects_unknown_label() {
        let err = small_table().pair(0, 2).unwrap_err();
        assert_eq!(
            err,
            ValueMapError::LabelOutOfRange {
                label: 2,
                number_objects: 2
            }
        );
    }

    #[test]
    fn collapsed_sums_every_pair() {
        let collapsed = small_table().collapsed();
        // bucket 0: 1 + 4 + 7 + 10
        assert_eq!(collapsed.values(), &[22.0, 26.0, 30.0]);
    }

    #[test]
    fn pairwise_bucket_rule_matches_distance_table() {
        let table = small_table();
        let single = table.collapsed();
        for d in [-1.0, 0.0, 0.3, 1.0, 1.7, 2.0, 9.0] {
            assert_eq!(table.bucket_for(d), single.bucket_for(d), "d = {d}");
        }
    }

    // ── SubjectView ─────────────────────────────────────────────────────────

    #[test]
    fn subject_view_uses_object_label() {
        let table = small_table();
        let view = table.for_subject(1).unwrap();
        assert_eq!(view.subject(), 1);
        let partner = ReferenceObject::labelled(1, 0.0, 0.0);
        assert_eq!(view.value_for(&partner, 0.0), 10.0);
        assert_eq!(view.value_for(&partner, 5.0), 12.0);
    }

    #[test]
    fn subject_view_ignores_unlabelled_and_unknown_objects() {
        let table = small_table();
        let view = table.for_subject(0).unwrap();
        assert_eq!(view.value_for(&ReferenceObject::new(0.0, 0.0), 1.0), 0.0);
        assert_eq!(
            view.value_for(&ReferenceObject::labelled(9, 0.0, 0.0), 1.0),
            0.0
        );
    }

    #[test]
    fn subject_view_propagates_nan() {
        let table = small_table();
        let view = table.for_subject(0).unwrap();
        let partner = ReferenceObject::labelled(0, 0.0, 0.0);
        assert!(view.value_for(&partner, f64::NAN).is_nan());
    }

    #[test]
    fn for_subject_rejects_unknown_label() {
        assert!(small_table().for_subject(2).is_err());
    }
}
