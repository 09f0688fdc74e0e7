//! Binary ROI record writer.
//!
//! Writes mirror the decoder field-for-field. Integer fields follow the
//! format's convention that 2-byte numbers are signed shorts: a width-2
//! field is written signed unless overridden, every other width unsigned.

use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};

use super::bbox::BoundingBox;
use super::header::{
    Header, RoiOptions, COUNTERS_OFFSET, HEADER_SIZE, MAGIC, NAME_LENGTH, NAME_OFFSET,
    WRITE_VERSION,
};
use super::kind::{ShapeKind, WriteKind};
use super::point::Point;
use crate::error::RoiError;

/// Writer for a single binary ROI record.
///
/// Tracks the number of bytes written itself rather than asking the
/// underlying writer for its position.
pub struct RoiEncoder<W: Write> {
    writer: W,
    offset: u64,
}

impl<W: Write> RoiEncoder<W> {
    /// Create a new encoder; the record starts at the writer's current position.
    pub fn new(writer: W) -> Self {
        Self { writer, offset: 0 }
    }

    /// Bytes written for the current record, magic included.
    pub fn bytes_written(&self) -> u64 {
        self.offset
    }

    /// Write one record.
    ///
    /// For polygons the vertices are stored as offsets from the bounding box;
    /// for ovals only the bounding box is stored. Every argument is checked
    /// before the first byte is written.
    pub fn write_roi(
        &mut self,
        points: &[Point<i16>],
        name: &str,
        kind: WriteKind,
    ) -> Result<(), RoiError> {
        if name.is_empty() {
            return Err(RoiError::MissingName);
        }
        let bbox = BoundingBox::from_points(points).ok_or(RoiError::EmptyPoints)?;

        let coordinates: &[Point<i16>] = match kind {
            WriteKind::Polygon => points,
            WriteKind::Oval => &[],
        };
        let n_coordinates = check_range("n_coordinates", coordinates.len() as i64, 2, true)?;
        if !coordinates.is_empty() {
            check_range("x", bbox.width().into(), 2, true)?;
            check_range("y", bbox.height().into(), 2, true)?;
        }
        let name_units: Vec<u16> = name.encode_utf16().collect();
        check_range("name_length", name_units.len() as i64, 4, false)?;

        // Primary header, then 4 bytes per vertex (x block and y block).
        let header2_offset = HEADER_SIZE as i64 + 4 * n_coordinates;
        let header = Header {
            version: WRITE_VERSION,
            kind_code: ShapeKind::from(kind).code(),
            top: bbox.top,
            left: bbox.left,
            bottom: bbox.bottom,
            right: bbox.right,
            n_coordinates: n_coordinates as u16,
            options: RoiOptions::empty(),
            position: 1,
            header2_offset: header2_offset as u32,
            ..Header::default()
        };

        tracing::debug!(
            "writing {} ROI '{}' with {} coordinate(s), header2 at {}",
            ShapeKind::from(kind),
            name,
            n_coordinates,
            header2_offset
        );

        self.offset = 0;
        self.put_header(&header)?;
        debug_assert_eq!(self.offset, header2_offset as u64 - 4 * n_coordinates as u64);

        for p in coordinates {
            self.put("x", i64::from(p.col) - i64::from(bbox.left), 2)?;
        }
        for p in coordinates {
            self.put("y", i64::from(p.row) - i64::from(bbox.top), 2)?;
        }

        self.put_header2(header2_offset, &name_units)
    }

    fn put_header(&mut self, h: &Header) -> Result<(), RoiError> {
        self.put_bytes(MAGIC)?;
        self.put("version", h.version.into(), 2)?;
        self.put("type", h.kind_code.into(), 1)?;
        self.put("unused", 0, 1)?;
        self.put("top", h.top.into(), 2)?;
        self.put("left", h.left.into(), 2)?;
        self.put("bottom", h.bottom.into(), 2)?;
        self.put("right", h.right.into(), 2)?;
        self.put("n_coordinates", h.n_coordinates.into(), 2)?;
        self.put("x1", h.x1.to_bits().into(), 4)?;
        self.put("y1", h.y1.to_bits().into(), 4)?;
        self.put("x2", h.x2.to_bits().into(), 4)?;
        self.put("y2", h.y2.to_bits().into(), 4)?;
        self.put("stroke_width", h.stroke_width.into(), 2)?;
        self.put("shape_roi_size", h.shape_roi_size.into(), 4)?;
        self.put("stroke_color", h.stroke_color.into(), 4)?;
        self.put("fill_color", h.fill_color.into(), 4)?;
        self.put("subtype", h.subtype.into(), 2)?;
        self.put("options", h.options.bits().into(), 2)?;
        self.put("arrow_style", h.arrow_style.into(), 1)?;
        self.put("arrow_head_size", h.arrow_head_size.into(), 1)?;
        self.put("rect_arc_size", h.rect_arc_size.into(), 2)?;
        self.put("position", h.position.into(), 4)?;
        self.put("header2_offset", h.header2_offset.into(), 4)
    }

    /// Writes header2 with only the name fields filled in, then the name.
    fn put_header2(&mut self, header2_offset: i64, name_units: &[u16]) -> Result<(), RoiError> {
        let name_offset = header2_offset + i64::from(COUNTERS_OFFSET) + 4;

        self.put_zeros(NAME_OFFSET as usize)?;
        self.put("name_offset", name_offset, 4)?;
        self.put("name_length", name_units.len() as i64, 4)?;

        let written = i64::from(NAME_LENGTH) + 4;
        self.put_zeros((name_offset - header2_offset - written) as usize)?;

        for &unit in name_units {
            self.put_int("name", unit.into(), 2, false)?;
        }
        Ok(())
    }

    /// Writes an integer with the default signedness for its width.
    fn put(&mut self, field: &'static str, value: i64, width: usize) -> Result<(), RoiError> {
        self.put_int(field, value, width, width == 2)
    }

    fn put_int(
        &mut self,
        field: &'static str,
        value: i64,
        width: usize,
        signed: bool,
    ) -> Result<(), RoiError> {
        let value = check_range(field, value, width, signed)?;
        if signed {
            self.writer.write_int::<BigEndian>(value, width)?;
        } else {
            // In range, so the value is non-negative.
            self.writer.write_uint::<BigEndian>(value as u64, width)?;
        }
        self.offset += width as u64;
        Ok(())
    }

    fn put_zeros(&mut self, count: usize) -> Result<(), RoiError> {
        self.put_bytes(&vec![0u8; count])
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), RoiError> {
        self.writer.write_all(bytes)?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    /// Consume the encoder and return the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Checks that `value` fits a big-endian integer of `width` bytes.
fn check_range(
    field: &'static str,
    value: i64,
    width: usize,
    signed: bool,
) -> Result<i64, RoiError> {
    let bits = 8 * width as u32;
    let (min, max) = if signed {
        (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
    } else {
        (0, (1i64 << bits) - 1)
    };
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(RoiError::ValueOutOfRange {
            field,
            value,
            width,
            signed,
        })
    }
}

/// Encodes one record into a new buffer.
///
/// `kind` must be [`ShapeKind::Polygon`] or [`ShapeKind::Oval`], and a
/// non-empty `name` is required.
pub fn encode(
    points: &[Point<i16>],
    name: Option<&str>,
    kind: ShapeKind,
) -> Result<Vec<u8>, RoiError> {
    let kind = WriteKind::try_from(kind)?;
    let name = name.ok_or(RoiError::MissingName)?;

    let mut encoder = RoiEncoder::new(Vec::new());
    encoder.write_roi(points, name, kind)?;
    Ok(encoder.into_inner())
}

/// Encodes a polygon record into a new buffer.
pub fn encode_polygon(points: &[Point<i16>], name: &str) -> Result<Vec<u8>, RoiError> {
    encode(points, Some(name), ShapeKind::Polygon)
}

/// Writes one record to a `.roi` file.
///
/// The record is fully encoded before the file is created, so an encoding
/// error never leaves a partial file behind.
pub fn write_roi(
    path: &Path,
    points: &[Point<i16>],
    name: Option<&str>,
    kind: ShapeKind,
) -> Result<(), RoiError> {
    let bytes = encode(points, name, kind)?;
    fs::write(path, bytes).map_err(RoiError::Io)
}

/// Writes one polygon record to a `.roi` file.
pub fn write_polygon_roi(path: &Path, points: &[Point<i16>], name: &str) -> Result<(), RoiError> {
    write_roi(path, points, Some(name), ShapeKind::Polygon)
}
