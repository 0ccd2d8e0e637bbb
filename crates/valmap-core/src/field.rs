//! Value field – the evaluator's output.
//!
//! A [`ValueField`] is a dense `nx × ny` array of `f64` stored row-major:
//! cell `(i, j)` lives at `data[i * ny + j]` and holds the value at grid
//! point `(xs[i], ys[j])`.

use std::ops::Index;

use serde::{Deserialize, Serialize};
use valmap_types::ValueMapError;

/// Dense 2-D array of accumulated values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawValueField")]
pub struct ValueField {
    nx: usize,
    ny: usize,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct RawValueField {
    nx: usize,
    ny: usize,
    data: Vec<f64>,
}

impl TryFrom<RawValueField> for ValueField {
    type Error = ValueMapError;

    fn try_from(raw: RawValueField) -> Result<Self, Self::Error> {
        let cells = raw.nx.checked_mul(raw.ny).ok_or_else(|| {
            ValueMapError::InvalidParameters(format!(
                "field shape {} x {} overflows",
                raw.nx, raw.ny
            ))
        })?;
        if raw.data.len() != cells {
            return Err(ValueMapError::InvalidParameters(format!(
                "field shape {} x {} needs {cells} cells, got {}",
                raw.nx,
                raw.ny,
                raw.data.len()
            )));
        }
        Ok(Self {
            nx: raw.nx,
            ny: raw.ny,
            data: raw.data,
        })
    }
}

impl ValueField {
    /// An all-zero field of shape `(nx, ny)`.
    pub fn zeros(nx: usize, ny: usize) -> Self {
        Self {
            nx,
            ny,
            data: vec![0.0; nx * ny],
        }
    }

    /// A field whose cell `(i, j)` is `f(i, j)`, filled in row-major order.
    pub fn from_fn(nx: usize, ny: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                data.push(f(i, j));
            }
        }
        Self { nx, ny, data }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.nx && j < self.ny {
            Some(self.data[i * self.ny + j])
        } else {
            None
        }
    }

    /// Row-major cell values.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Element-wise `self += other`.
    pub fn accumulate(&mut self, other: &ValueField) -> Result<(), ValueMapError> {
        if self.shape() != other.shape() {
            return Err(ValueMapError::FieldShape {
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        self.add_same_shape(other);
        Ok(())
    }

    pub(crate) fn add_same_shape(&mut self, other: &ValueField) {
        debug_assert_eq!(self.shape(), other.shape());
        for (acc, v) in self.data.iter_mut().zip(&other.data) {
            *acc += v;
        }
    }

    /// `(i, j, value)` of the largest cell, ignoring NaN.  Ties resolve to the
    /// first cell in row-major order.  `None` when no cell is comparable.
    pub fn argmax(&self) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (k, &v) in self.data.iter().enumerate() {
            if v.is_nan() {
                continue;
            }
            match best {
                Some((_, b)) if v <= b => {}
                _ => best = Some((k, v)),
            }
        }
        best.map(|(k, v)| (k / self.ny, k % self.ny, v))
    }

    /// Largest non-NaN value.
    pub fn max_value(&self) -> Option<f64> {
        self.argmax().map(|(_, _, v)| v)
    }

    /// Iterate over rows (`ny` values each).
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.ny.max(1))
    }

    /// Nested-vector copy, `result[i][j]`, for renderers that take 2-D arrays.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }
}

impl Index<(usize, usize)> for ValueField {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(i < self.nx && j < self.ny, "cell ({i}, {j}) out of range");
        &self.data[i * self.ny + j]
    }
}
