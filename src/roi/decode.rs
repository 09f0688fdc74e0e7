//! Binary ROI record reader.
//!
//! The format is not a forward-only stream: the name lives behind offsets
//! stored in header2, so the input must support absolute seeks.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};

use super::header::{read_error, read_float, Header, NAME_LENGTH, NAME_OFFSET};
use super::kind::{ReadLayout, ShapeKind};
use super::model::RoiRecord;
use super::oval;
use super::point::{Point, PointSequence};
use crate::error::RoiError;

/// Reader for a single binary ROI record.
pub struct RoiDecoder<R: Read + Seek> {
    reader: R,
    max_oval_pixels: u64,
}

impl<R: Read + Seek> RoiDecoder<R> {
    /// Create a new decoder positioned at the start of a record.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            max_oval_pixels: oval::MAX_RASTER_PIXELS,
        }
    }

    /// Limit the bounding-box area an oval may cover before it is rasterized.
    ///
    /// Defaults to [`oval::MAX_RASTER_PIXELS`].
    pub fn with_max_oval_pixels(mut self, limit: u64) -> Self {
        self.max_oval_pixels = limit;
        self
    }

    /// Decode one record.
    ///
    /// Rects and ovals are fully described by the primary header, so for those
    /// kinds exactly 64 bytes are consumed and no name is read.
    pub fn decode(&mut self) -> Result<RoiRecord, RoiError> {
        let header = Header::read(&mut self.reader)?;
        let sub_pixel = header.sub_pixel();

        let kind = ShapeKind::from_code(header.kind_code).ok_or(RoiError::UnsupportedShape {
            code: header.kind_code,
            operation: "read",
        })?;
        let layout = ReadLayout::for_kind(kind)?;
        if header.subtype != 0 {
            return Err(RoiError::UnsupportedSubtype(header.subtype));
        }

        tracing::debug!(
            "ROI header: kind={} version={} sub_pixel={} n_coordinates={} header2_offset={}",
            kind,
            header.version,
            sub_pixel,
            header.n_coordinates,
            header.header2_offset
        );

        let bbox = header.bbox();
        let record = |points: PointSequence, name: Option<String>| RoiRecord {
            kind,
            bbox,
            version: header.version,
            sub_pixel,
            points,
            name,
        };

        match layout {
            ReadLayout::Oval => {
                if sub_pixel {
                    return Err(RoiError::UnsupportedFeature(
                        "sub-pixel resolution is not supported for oval ROIs".into(),
                    ));
                }
                let size = oval::raster_size(&bbox);
                if size > self.max_oval_pixels {
                    return Err(RoiError::UnsupportedFeature(format!(
                        "oval bounding box of {} pixels exceeds the raster limit of {}",
                        size, self.max_oval_pixels
                    )));
                }
                Ok(record(PointSequence::Integer(oval::rasterize(&bbox)), None))
            }
            ReadLayout::Rect => {
                let points = if sub_pixel {
                    let (x1, y1, x2, y2) = (header.x1, header.y1, header.x2, header.y2);
                    PointSequence::SubPixel(vec![
                        Point::new(y1, x1),
                        Point::new(y1, x1 + x2),
                        Point::new(y1 + y2, x1 + x2),
                        Point::new(y1 + y2, x1),
                    ])
                } else {
                    PointSequence::Integer(bbox.corners().to_vec())
                };
                Ok(record(points, None))
            }
            ReadLayout::Coordinates => {
                let points = self.read_coordinates(&header)?;
                let name = self.read_name(header.header2_offset)?;
                Ok(record(points, Some(name)))
            }
        }
    }

    /// Reads the x block then the y block that follow the primary header.
    fn read_coordinates(&mut self, header: &Header) -> Result<PointSequence, RoiError> {
        let n = usize::from(header.n_coordinates);

        if header.sub_pixel() {
            // A legacy integer copy of the coordinates precedes the floats.
            self.reader
                .seek(SeekFrom::Current(4 * n as i64))
                .map_err(read_error)?;
            let cols = read_values(&mut self.reader, n, read_float)?;
            let rows = read_values(&mut self.reader, n, read_float)?;
            let points = rows
                .into_iter()
                .zip(cols)
                .map(|(row, col)| Point::new(row, col))
                .collect();
            return Ok(PointSequence::SubPixel(points));
        }

        let cols = read_values(&mut self.reader, n, |r| r.read_i16::<BigEndian>())?;
        let rows = read_values(&mut self.reader, n, |r| r.read_i16::<BigEndian>())?;
        // Integer coordinates are stored relative to the bounding box.
        let points = rows
            .into_iter()
            .zip(cols)
            .map(|(row, col)| {
                Point::new(row.wrapping_add(header.top), col.wrapping_add(header.left))
            })
            .collect();
        Ok(PointSequence::Integer(points))
    }

    /// Reads the name referenced from header2.
    fn read_name(&mut self, header2_offset: u32) -> Result<String, RoiError> {
        let base = u64::from(header2_offset);
        let name_offset = self.read_u32_at(base + u64::from(NAME_OFFSET))?;
        let name_length = self.read_u32_at(base + u64::from(NAME_LENGTH))?;

        self.reader
            .seek(SeekFrom::Start(u64::from(name_offset)))
            .map_err(read_error)?;
        let units = read_values(&mut self.reader, name_length as usize, |r| {
            r.read_u16::<BigEndian>()
        })?;

        Ok(char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect())
    }

    fn read_u32_at(&mut self, offset: u64) -> Result<u32, RoiError> {
        self.reader
            .seek(SeekFrom::Start(offset))
            .map_err(read_error)?;
        self.reader.read_u32::<BigEndian>().map_err(read_error)
    }

    /// Consume the decoder and return the inner reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Reads `count` values, without trusting `count` for the allocation size.
fn read_values<R, T, F>(reader: &mut R, count: usize, mut read_one: F) -> Result<Vec<T>, RoiError>
where
    R: Read,
    F: FnMut(&mut R) -> std::io::Result<T>,
{
    let mut values = Vec::with_capacity(count.min(1 << 16));
    for _ in 0..count {
        values.push(read_one(reader).map_err(read_error)?);
    }
    Ok(values)
}

/// Decodes a record held in memory.
pub fn decode_slice(bytes: &[u8]) -> Result<RoiRecord, RoiError> {
    RoiDecoder::new(Cursor::new(bytes)).decode()
}

/// Reads a record from a `.roi` file.
pub fn read_roi(path: &Path) -> Result<RoiRecord, RoiError> {
    let file = File::open(path).map_err(RoiError::Io)?;
    RoiDecoder::new(BufReader::new(file)).decode()
}
