use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A sample location in the plane (grid cell centre or query point).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// True when both coordinates are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A known object in the plane that contributes a distance-based value to
/// every grid cell.
///
/// `label` is the detector / marker id of the object.  It is only consulted
/// by pairwise value sources; a single shared distance table ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceObject {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<usize>,
}

impl ReferenceObject {
    /// An unlabelled object at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, label: None }
    }

    /// An object at `(x, y)` tagged with a detector label.
    pub fn labelled(label: usize, x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            label: Some(label),
        }
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Workspace error type spanning configuration, table-shape and parsing
/// failures.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueMapError {
    #[error("Invalid Parameters: {0}")]
    InvalidParameters(String),

    #[error("Table Shape Mismatch: expected {expected} values, got {actual}")]
    TableShape { expected: usize, actual: usize },

    #[error("Table boundaries must be strictly increasing (violated at sample {index})")]
    UnsortedBoundaries { index: usize },

    #[error("Field Shape Mismatch: expected {expected:?}, got {actual:?}")]
    FieldShape {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Parse Error: token {index} ({token:?}) is not a number")]
    Parse { index: usize, token: String },

    #[error("Object label {label} out of range for a table of {number_objects} objects")]
    LabelOutOfRange { label: usize, number_objects: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance_is_euclidean() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-12);
        assert!((b.distance_to(a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn point_is_finite_rejects_nan_and_inf() {
        assert!(Point2::new(1.0, -2.0).is_finite());
        assert!(!Point2::new(f64::NAN, 0.0).is_finite());
        assert!(!Point2::new(0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn reference_object_without_label_omits_field() {
        let obj = ReferenceObject::new(-3.0, -4.0);
        let json = serde_json::to_string(&obj).unwrap();
        assert!(!json.contains("label"));

        let back: ReferenceObject = serde_json::from_str(r#"{"x": 2.0, "y": 1.0}"#).unwrap();
        assert_eq!(back, ReferenceObject::new(2.0, 1.0));
    }

    #[test]
    fn reference_object_label_roundtrip() {
        let obj = ReferenceObject::labelled(7, 1.5, -0.5);
        let json = serde_json::to_string(&obj).unwrap();
        let back: ReferenceObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back.label, Some(7));
        assert_eq!(back.position(), Point2::new(1.5, -0.5));
    }

    #[test]
    fn value_map_error_display() {
        let err = ValueMapError::InvalidParameters("sigma must be > 0".to_string());
        assert!(err.to_string().contains("Invalid Parameters"));

        let err2 = ValueMapError::TableShape {
            expected: 400,
            actual: 399,
        };
        assert!(err2.to_string().contains("400"));
        assert!(err2.to_string().contains("399"));
    }
}
