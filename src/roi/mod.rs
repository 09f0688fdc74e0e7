//! ImageJ binary ROI records.
//!
//! A record is a 64-byte big-endian primary header, an optional coordinate
//! payload and a secondary "header2" block that holds the ROI name. This
//! module reads records into a [`RoiRecord`] and writes point lists back out
//! in the same layout.
//!
//! Points are always `(row, col)`, i.e. `(y, x)`. Integer coordinates are
//! stored on disk as offsets from the bounding box and translated to absolute
//! positions on read; sub-pixel (float) coordinates are absolute already.
//!
//! # Supported kinds
//!
//! | Kind | Read | Write |
//! |---|---|---|
//! | polygon, freehand, traced, point | yes | polygon only |
//! | rect | yes | no |
//! | oval | integer only | yes |
//! | line, freeline, polyline, noroi, angle | no | no |
//!
//! Composite shapes, non-zero subtypes and ROI properties are rejected.
//!
//! # Example
//!
//! ```
//! use ijroi::roi::{decode_slice, encode_polygon, Point, PointSequence};
//!
//! let points = vec![Point::new(10i16, 20i16), Point::new(12, 30), Point::new(15, 25)];
//! let bytes = encode_polygon(&points, "cell-1")?;
//!
//! let record = decode_slice(&bytes)?;
//! assert_eq!(record.points, PointSequence::Integer(points));
//! assert_eq!(record.name.as_deref(), Some("cell-1"));
//! # Ok::<(), ijroi::RoiError>(())
//! ```

pub mod archive;
mod bbox;
pub mod decode;
pub mod encode;
pub mod header;
pub mod kind;
mod model;
pub mod oval;
mod point;

// Re-export core types for convenient access
pub use archive::{
    read_roi_zip, read_roi_zip_from, write_oval_roi_zip, write_polygon_roi_zip, write_roi_zip,
    write_roi_zip_to,
};
pub use bbox::BoundingBox;
pub use decode::{decode_slice, read_roi, RoiDecoder};
pub use encode::{encode, encode_polygon, write_polygon_roi, write_roi, RoiEncoder};
pub use header::{Header, RoiOptions};
pub use kind::{ShapeKind, WriteKind};
pub use model::RoiRecord;
pub use oval::oval_points_center_diam;
pub use point::{Point, PointSequence};
