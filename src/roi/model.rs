//! The decoded ROI record.

use serde::Serialize;

use super::bbox::BoundingBox;
use super::kind::ShapeKind;
use super::point::PointSequence;

/// One decoded region of interest.
///
/// Each record owns its point buffer; nothing is shared between records.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoiRecord {
    pub kind: ShapeKind,
    pub bbox: BoundingBox,
    pub version: u16,
    pub sub_pixel: bool,
    pub points: PointSequence,
    /// Read from header2 for coordinate-based kinds; `None` for rects and
    /// ovals, whose decoding stops after the primary header.
    pub name: Option<String>,
}

impl RoiRecord {
    /// The record's name, or `""` when none was stored.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}
