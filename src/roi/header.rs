//! Primary header layout, option bits and header2 field offsets.
//!
//! Every multi-byte value in a record is big-endian. The primary header is a
//! fixed 64 bytes:
//!
//! | Offset | Field | Width |
//! |---|---|---|
//! | 0 | magic `Iout` | 4 |
//! | 4 | version | 2 |
//! | 6 | shape kind (+1 unused byte) | 2 |
//! | 8 | top, left, bottom, right | 2 each |
//! | 16 | n_coordinates | 2 |
//! | 18 | x1, y1, x2, y2 (f32) | 4 each |
//! | 34 | stroke_width | 2 |
//! | 36 | shape_roi_size | 4 |
//! | 40 | stroke_color | 4 |
//! | 44 | fill_color | 4 |
//! | 48 | subtype | 2 |
//! | 50 | options | 2 |
//! | 52 | arrow_style, arrow_head_size | 1 each |
//! | 54 | rect_arc_size | 2 |
//! | 56 | position | 4 |
//! | 60 | header2_offset | 4 |
//!
//! The header2 block lives at `header2_offset` and is addressed by the
//! `*_OFFSET`-style constants below, relative to its start.

use std::io::{self, Read};

use bitflags::bitflags;
use byteorder::{BigEndian, ReadBytesExt};
use serde::Serialize;

use super::bbox::BoundingBox;
use crate::error::RoiError;

pub const MAGIC: &[u8; 4] = b"Iout";

/// Size of the fixed primary header, magic included.
pub const HEADER_SIZE: u64 = 64;

/// First version whose sub-pixel option bit is honoured.
pub const SUB_PIXEL_MIN_VERSION: u16 = 222;

/// Version stamped on every record this crate writes.
pub const WRITE_VERSION: u16 = 217;

// header2 offsets
pub const C_POSITION: u32 = 4;
pub const Z_POSITION: u32 = 8;
pub const T_POSITION: u32 = 12;
pub const NAME_OFFSET: u32 = 16;
pub const NAME_LENGTH: u32 = 20;
pub const OVERLAY_LABEL_COLOR: u32 = 24;
pub const OVERLAY_FONT_SIZE: u32 = 28;
pub const AVAILABLE_BYTE1: u32 = 30;
pub const IMAGE_OPACITY: u32 = 31;
pub const IMAGE_SIZE: u32 = 32;
pub const FLOAT_STROKE_WIDTH: u32 = 36;
pub const ROI_PROPS_OFFSET: u32 = 40;
pub const ROI_PROPS_LENGTH: u32 = 44;
pub const COUNTERS_OFFSET: u32 = 48;

bitflags! {
    /// The `options` field at offset 50.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RoiOptions: u16 {
        const SPLINE_FIT = 1;
        const DOUBLE_HEADED = 2;
        const OUTLINE = 4;
        const OVERLAY_LABELS = 8;
        const OVERLAY_NAMES = 16;
        const OVERLAY_BACKGROUNDS = 32;
        const OVERLAY_BOLD = 64;
        const SUB_PIXEL_RESOLUTION = 128;
        const DRAW_OFFSET = 256;
    }
}

impl Serialize for RoiOptions {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.bits())
    }
}

/// Every field of the 64-byte primary header, in file order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Header {
    pub version: u16,
    /// Raw shape code; it may name a kind this crate cannot decode.
    pub kind_code: u8,
    pub top: i16,
    pub left: i16,
    pub bottom: i16,
    pub right: i16,
    pub n_coordinates: u16,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub stroke_width: u16,
    pub shape_roi_size: u32,
    pub stroke_color: u32,
    pub fill_color: u32,
    pub subtype: u16,
    pub options: RoiOptions,
    pub arrow_style: u8,
    pub arrow_head_size: u8,
    pub rect_arc_size: u16,
    pub position: u32,
    pub header2_offset: u32,
}

impl Header {
    /// Reads the magic and the primary header.
    ///
    /// The magic is checked before any other field is read.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, RoiError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(read_error)?;
        if &magic != MAGIC {
            return Err(RoiError::format(format!(
                "magic number not found (expected {:?}, got {:?})",
                MAGIC, magic
            )));
        }

        Self::read_fields(reader).map_err(read_error)
    }

    fn read_fields<R: Read>(r: &mut R) -> io::Result<Self> {
        let version = r.read_u16::<BigEndian>()?;
        // The kind occupies two bytes but only the first is used.
        let kind_code = r.read_u8()?;
        let _ = r.read_u8()?;

        Ok(Self {
            version,
            kind_code,
            top: r.read_i16::<BigEndian>()?,
            left: r.read_i16::<BigEndian>()?,
            bottom: r.read_i16::<BigEndian>()?,
            right: r.read_i16::<BigEndian>()?,
            n_coordinates: r.read_u16::<BigEndian>()?,
            x1: read_float(r)?,
            y1: read_float(r)?,
            x2: read_float(r)?,
            y2: read_float(r)?,
            stroke_width: r.read_u16::<BigEndian>()?,
            shape_roi_size: r.read_u32::<BigEndian>()?,
            stroke_color: r.read_u32::<BigEndian>()?,
            fill_color: r.read_u32::<BigEndian>()?,
            subtype: r.read_u16::<BigEndian>()?,
            options: RoiOptions::from_bits_retain(r.read_u16::<BigEndian>()?),
            arrow_style: r.read_u8()?,
            arrow_head_size: r.read_u8()?,
            rect_arc_size: r.read_u16::<BigEndian>()?,
            position: r.read_u32::<BigEndian>()?,
            header2_offset: r.read_u32::<BigEndian>()?,
        })
    }

    /// True when coordinates are stored as absolute floats.
    ///
    /// Files older than version 222 ignore the option bit.
    pub fn sub_pixel(&self) -> bool {
        self.options.contains(RoiOptions::SUB_PIXEL_RESOLUTION)
            && self.version >= SUB_PIXEL_MIN_VERSION
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.top, self.left, self.bottom, self.right)
    }
}

/// Reads a 32-bit pattern and reinterprets its bits as an IEEE-754 float.
pub(crate) fn read_float<R: Read>(r: &mut R) -> io::Result<f32> {
    r.read_u32::<BigEndian>().map(f32::from_bits)
}

/// Maps read failures onto the error taxonomy: running out of bytes is a
/// malformed record, anything else is a genuine I/O failure.
pub(crate) fn read_error(err: io::Error) -> RoiError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        RoiError::format("unexpected end of record")
    } else {
        RoiError::Io(err)
    }
}
