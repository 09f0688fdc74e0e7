//! Integer bounding box as stored in the primary header.

use serde::{Deserialize, Serialize};

use super::point::Point;

/// The `top, left, bottom, right` box from bytes 8..16 of a record.
///
/// Like the header it mirrors, this does not enforce `top <= bottom` or
/// `left <= right`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
}

impl BoundingBox {
    #[inline]
    pub fn new(top: i16, left: i16, bottom: i16, right: i16) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Smallest box containing every point, or `None` when there are no points.
    ///
    /// `top`/`left` are the minimum row/col and `bottom`/`right` the maximum,
    /// so the box is inclusive of its far edge.
    pub fn from_points(points: &[Point<i16>]) -> Option<Self> {
        let first = points.first()?;
        let init = Self::new(first.row, first.col, first.row, first.col);
        Some(points[1..].iter().fold(init, |bbox, p| Self {
            top: bbox.top.min(p.row),
            left: bbox.left.min(p.col),
            bottom: bbox.bottom.max(p.row),
            right: bbox.right.max(p.col),
        }))
    }

    /// Returns `right - left`, widened so that extreme boxes cannot overflow.
    #[inline]
    pub fn width(&self) -> i32 {
        i32::from(self.right) - i32::from(self.left)
    }

    /// Returns `bottom - top`, widened so that extreme boxes cannot overflow.
    #[inline]
    pub fn height(&self) -> i32 {
        i32::from(self.bottom) - i32::from(self.top)
    }

    /// The four integer corners: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Point<i16>; 4] {
        [
            Point::new(self.top, self.left),
            Point::new(self.top, self.right),
            Point::new(self.bottom, self.right),
            Point::new(self.bottom, self.left),
        ]
    }
}
