//! [`ValueSource`] – the pluggable per-object lookup used by the evaluator.
//!
//! A single shared [`DistanceTable`] ignores which object it is asked about.
//! Pairwise tables ([`SubjectView`][crate::pairwise::SubjectView]) use the
//! object's label to choose the row of values.

use valmap_types::ReferenceObject;

use crate::table::DistanceTable;

/// Maps `(object, distance)` to that object's contribution at a sample
/// point.
///
/// Implement this trait to plug a new table provider into
/// [`GridEvaluator`][crate::evaluator::GridEvaluator].
pub trait ValueSource {
    /// Contribution of `object` at a sample `distance` away from it.
    fn value_for(&self, object: &ReferenceObject, distance: f64) -> f64;
}

impl ValueSource for DistanceTable {
    fn value_for(&self, _object: &ReferenceObject, distance: f64) -> f64 {
        self.value_at(distance)
    }
}

impl<S: ValueSource + ?Sized> ValueSource for &S {
    fn value_for(&self, object: &ReferenceObject, distance: f64) -> f64 {
        (**self).value_for(object, distance)
    }
}

impl<S: ValueSource + ?Sized> ValueSource for Box<S> {
    fn value_for(&self, object: &ReferenceObject, distance: f64) -> f64 {
        (**self).value_for(object, distance)
    }
}
