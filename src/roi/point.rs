//! Point types in (row, col) order.

use serde::{Deserialize, Serialize};

/// A 2D point stored as `(row, col)`, i.e. `(y, x)`.
///
/// The row-first order is part of the file format's contract and is kept
/// everywhere in this crate, including serialized output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point<T> {
    pub row: T,
    pub col: T,
}

impl<T> Point<T> {
    /// Creates a new point from a row (y) and column (x).
    #[inline]
    pub fn new(row: T, col: T) -> Self {
        Self { row, col }
    }
}

impl<T: Copy + Into<f64>> Point<T> {
    /// Widens both coordinates to `f64`.
    #[inline]
    pub fn to_f64(&self) -> Point<f64> {
        Point::new(self.row.into(), self.col.into())
    }
}

/// The decoded coordinates of one record.
///
/// A record stores either 16-bit integers or 32-bit floats, never a mix.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "points", rename_all = "snake_case")]
pub enum PointSequence {
    Integer(Vec<Point<i16>>),
    SubPixel(Vec<Point<f32>>),
}

impl PointSequence {
    pub fn len(&self) -> usize {
        match self {
            PointSequence::Integer(points) => points.len(),
            PointSequence::SubPixel(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_sub_pixel(&self) -> bool {
        matches!(self, PointSequence::SubPixel(_))
    }

    /// Returns the integer points, or `None` for a sub-pixel sequence.
    pub fn as_integer(&self) -> Option<&[Point<i16>]> {
        match self {
            PointSequence::Integer(points) => Some(points),
            PointSequence::SubPixel(_) => None,
        }
    }

    /// Returns the float points, or `None` for an integer sequence.
    pub fn as_sub_pixel(&self) -> Option<&[Point<f32>]> {
        match self {
            PointSequence::Integer(_) => None,
            PointSequence::SubPixel(points) => Some(points),
        }
    }

    /// Widens every point to `f64`, whatever the stored precision.
    pub fn to_f64(&self) -> Vec<Point<f64>> {
        match self {
            PointSequence::Integer(points) => points.iter().map(Point::to_f64).collect(),
            PointSequence::SubPixel(points) => points.iter().map(Point::to_f64).collect(),
        }
    }
}
