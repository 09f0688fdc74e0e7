//! Shape kinds and the closed sets each operation accepts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RoiError;

/// The shape discriminator stored in byte 6 of every record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Polygon,
    Rect,
    Oval,
    Line,
    Freeline,
    Polyline,
    NoRoi,
    Freehand,
    Traced,
    Angle,
    Point,
}

impl ShapeKind {
    /// Every kind, in wire-code order.
    pub const ALL: [ShapeKind; 11] = [
        ShapeKind::Polygon,
        ShapeKind::Rect,
        ShapeKind::Oval,
        ShapeKind::Line,
        ShapeKind::Freeline,
        ShapeKind::Polyline,
        ShapeKind::NoRoi,
        ShapeKind::Freehand,
        ShapeKind::Traced,
        ShapeKind::Angle,
        ShapeKind::Point,
    ];

    /// Returns the kind for a wire code, or `None` for codes past `Point`.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Returns the wire code.
    pub fn code(self) -> u8 {
        match self {
            ShapeKind::Polygon => 0,
            ShapeKind::Rect => 1,
            ShapeKind::Oval => 2,
            ShapeKind::Line => 3,
            ShapeKind::Freeline => 4,
            ShapeKind::Polyline => 5,
            ShapeKind::NoRoi => 6,
            ShapeKind::Freehand => 7,
            ShapeKind::Traced => 8,
            ShapeKind::Angle => 9,
            ShapeKind::Point => 10,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Polygon => "polygon",
            ShapeKind::Rect => "rect",
            ShapeKind::Oval => "oval",
            ShapeKind::Line => "line",
            ShapeKind::Freeline => "freeline",
            ShapeKind::Polyline => "polyline",
            ShapeKind::NoRoi => "noroi",
            ShapeKind::Freehand => "freehand",
            ShapeKind::Traced => "traced",
            ShapeKind::Angle => "angle",
            ShapeKind::Point => "point",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Human-readable name for a raw wire code, including unknown ones.
pub fn shape_label(code: u8) -> &'static str {
    ShapeKind::from_code(code).map_or("unknown", ShapeKind::label)
}

/// How the decoder interprets the payload of a readable kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReadLayout {
    /// Bounding box only, rasterized into the pixels inside the ellipse.
    Oval,
    /// Bounding box (or sub-pixel float box) expanded to four corners.
    Rect,
    /// Explicit x block then y block of `n_coordinates` values.
    Coordinates,
}

impl ReadLayout {
    /// Maps a kind onto its read layout, rejecting kinds the decoder does not understand.
    pub(crate) fn for_kind(kind: ShapeKind) -> Result<Self, RoiError> {
        match kind {
            ShapeKind::Oval => Ok(ReadLayout::Oval),
            ShapeKind::Rect => Ok(ReadLayout::Rect),
            ShapeKind::Polygon | ShapeKind::Freehand | ShapeKind::Traced | ShapeKind::Point => {
                Ok(ReadLayout::Coordinates)
            }
            ShapeKind::Line
            | ShapeKind::Freeline
            | ShapeKind::Polyline
            | ShapeKind::NoRoi
            | ShapeKind::Angle => Err(RoiError::UnsupportedShape {
                code: kind.code(),
                operation: "read",
            }),
        }
    }
}

/// The kinds the encoder can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteKind {
    /// Vertices are written as offsets from the bounding box.
    Polygon,
    /// Only the bounding box of the points is written.
    Oval,
}

impl From<WriteKind> for ShapeKind {
    fn from(kind: WriteKind) -> Self {
        match kind {
            WriteKind::Polygon => ShapeKind::Polygon,
            WriteKind::Oval => ShapeKind::Oval,
        }
    }
}

impl TryFrom<ShapeKind> for WriteKind {
    type Error = RoiError;

    fn try_from(kind: ShapeKind) -> Result<Self, Self::Error> {
        match kind {
            ShapeKind::Polygon => Ok(WriteKind::Polygon),
            ShapeKind::Oval => Ok(WriteKind::Oval),
            ShapeKind::Rect
            | ShapeKind::Line
            | ShapeKind::Freeline
            | ShapeKind::Polyline
            | ShapeKind::NoRoi
            | ShapeKind::Freehand
            | ShapeKind::Traced
            | ShapeKind::Angle
            | ShapeKind::Point => Err(RoiError::UnsupportedShape {
                code: kind.code(),
                operation: "write",
            }),
        }
    }
}
