//! Zip archives holding one encoded record per entry.
//!
//! This is the layout ImageJ's ROI manager uses for "Save As": every entry is
//! a complete `.roi` record and the entry name ends in `.roi`.

use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::decode::decode_slice;
use super::encode::RoiEncoder;
use super::kind::{ShapeKind, WriteKind};
use super::model::RoiRecord;
use super::point::Point;
use crate::error::RoiError;

pub const ROI_EXTENSION: &str = ".roi";

/// Stands in for a path in errors from archives that are not files.
const STREAM_LABEL: &str = "<stream>";

/// Reads every record in an archive, in archive listing order.
///
/// Directory entries are skipped. The first entry that fails to decode aborts
/// the read; the error names that entry.
pub fn read_roi_zip(path: &Path) -> Result<Vec<(String, RoiRecord)>, RoiError> {
    let file = File::open(path).map_err(RoiError::Io)?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|e| zip_error(path, e))?;
    read_entries(&mut archive, path)
}

/// Reads every record from an archive held by any seekable reader.
pub fn read_roi_zip_from<R: Read + Seek>(reader: R) -> Result<Vec<(String, RoiRecord)>, RoiError> {
    let label = Path::new(STREAM_LABEL);
    let mut archive = ZipArchive::new(reader).map_err(|e| zip_error(label, e))?;
    read_entries(&mut archive, label)
}

/// Fuzz-only entrypoint reading an archive held in memory.
#[cfg(feature = "fuzzing")]
pub fn fuzz_read_roi_zip(bytes: &[u8]) -> Result<(), RoiError> {
    let _ = read_roi_zip_from(std::io::Cursor::new(bytes))?;
    Ok(())
}

fn read_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
) -> Result<Vec<(String, RoiRecord)>, RoiError> {
    let mut records = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| zip_error(path, e))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();

        let mut bytes = Vec::with_capacity(entry.size().min(1 << 20) as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| RoiError::Io(e).in_entry(name.as_str()))?;
        let record = decode_slice(&bytes).map_err(|e| e.in_entry(name.as_str()))?;

        tracing::debug!(
            "read archive entry '{}': {} with {} point(s)",
            name,
            record.kind,
            record.points.len()
        );
        records.push((name, record));
    }

    Ok(records)
}

/// Writes named point sets to a new archive at `path`, one record each.
///
/// Each entry is named after its ROI, with `.roi` appended when missing.
/// Every record is encoded in memory before it is added, and the archive is
/// built in a temporary file next to `path` that only replaces `path` once
/// all entries succeeded. On error nothing is left at `path`.
pub fn write_roi_zip<I, N, P>(path: &Path, entries: I, kind: ShapeKind) -> Result<(), RoiError>
where
    I: IntoIterator<Item = (N, P)>,
    N: AsRef<str>,
    P: AsRef<[Point<i16>]>,
{
    let kind = WriteKind::try_from(kind)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir).map_err(RoiError::Io)?;
    let temp = write_entries(temp, entries, kind, path)?;
    temp.persist(path).map_err(|e| RoiError::Io(e.error))?;
    Ok(())
}

/// Writes named point sets as an archive into `writer` and returns it.
///
/// Unlike [`write_roi_zip`] this cannot roll back: on error the writer may
/// hold a partial archive, but never a partial entry.
pub fn write_roi_zip_to<W, I, N, P>(writer: W, entries: I, kind: ShapeKind) -> Result<W, RoiError>
where
    W: Write + Seek,
    I: IntoIterator<Item = (N, P)>,
    N: AsRef<str>,
    P: AsRef<[Point<i16>]>,
{
    let kind = WriteKind::try_from(kind)?;
    write_entries(writer, entries, kind, Path::new(STREAM_LABEL))
}

fn write_entries<W, I, N, P>(
    writer: W,
    entries: I,
    kind: WriteKind,
    label: &Path,
) -> Result<W, RoiError>
where
    W: Write + Seek,
    I: IntoIterator<Item = (N, P)>,
    N: AsRef<str>,
    P: AsRef<[Point<i16>]>,
{
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0usize;
    for (name, points) in entries {
        let name = name.as_ref();
        let mut encoder = RoiEncoder::new(Vec::new());
        encoder
            .write_roi(points.as_ref(), name, kind)
            .map_err(|e| e.in_entry(name))?;
        let bytes = encoder.into_inner();

        let entry_name = entry_file_name(name);
        zip.start_file(entry_name.as_str(), options)
            .map_err(|e| zip_error(label, e))?;
        zip.write_all(&bytes)
            .map_err(|e| RoiError::Io(e).in_entry(entry_name))?;
        count += 1;
    }

    let writer = zip.finish().map_err(|e| zip_error(label, e))?;
    tracing::debug!("wrote {} ROI(s) to {}", count, label.display());
    Ok(writer)
}

/// Writes polygon ROIs to a new archive.
pub fn write_polygon_roi_zip<I, N, P>(path: &Path, entries: I) -> Result<(), RoiError>
where
    I: IntoIterator<Item = (N, P)>,
    N: AsRef<str>,
    P: AsRef<[Point<i16>]>,
{
    write_roi_zip(path, entries, ShapeKind::Polygon)
}

/// Writes oval ROIs to a new archive; each oval is the bounding box of its points.
pub fn write_oval_roi_zip<I, N, P>(path: &Path, entries: I) -> Result<(), RoiError>
where
    I: IntoIterator<Item = (N, P)>,
    N: AsRef<str>,
    P: AsRef<[Point<i16>]>,
{
    write_roi_zip(path, entries, ShapeKind::Oval)
}

/// Entry name for a ROI; ImageJ only imports entries ending in `.roi`.
pub fn entry_file_name(name: &str) -> String {
    if name.ends_with(ROI_EXTENSION) {
        name.to_string()
    } else {
        format!("{name}{ROI_EXTENSION}")
    }
}

fn zip_error(path: &Path, source: zip::result::ZipError) -> RoiError {
    RoiError::Zip {
        path: PathBuf::from(path),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::point::PointSequence;

    #[test]
    fn test_entry_file_name() {
        assert_eq!(entry_file_name("cell"), "cell.roi");
        assert_eq!(entry_file_name("cell.roi"), "cell.roi");
    }

    #[test]
    fn test_polygon_archive_roundtrip() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("rois.zip");
        let entries = vec![
            ("a", vec![Point::new(1i16, 2i16), Point::new(5, 9), Point::new(3, 7)]),
            ("b.roi", vec![Point::new(40, 40), Point::new(41, 45)]),
        ];

        write_polygon_roi_zip(&path, entries.clone()).expect("write archive");
        let records = read_roi_zip(&path).expect("read archive");

        assert_eq!(records.len(), 2);
        for ((entry, record), (name, points)) in records.iter().zip(&entries) {
            assert_eq!(entry, &entry_file_name(name));
            assert_eq!(record.name.as_deref(), Some(*name));
            assert_eq!(record.points, PointSequence::Integer(points.clone()));
        }
    }

    #[test]
    fn test_in_memory_archive_roundtrip() {
        let entries = vec![("oval", vec![Point::new(0i16, 0i16), Point::new(16, 16)])];
        let cursor = write_roi_zip_to(std::io::Cursor::new(Vec::new()), entries, ShapeKind::Oval)
            .expect("write archive");

        let records = read_roi_zip_from(std::io::Cursor::new(cursor.into_inner()))
            .expect("read archive");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, "oval.roi");
        assert_eq!(records[0].1.kind, ShapeKind::Oval);
    }

    #[test]
    fn test_garbage_stream_is_zip_error() {
        let err = read_roi_zip_from(std::io::Cursor::new(b"Iout".to_vec())).unwrap_err();
        assert!(matches!(err, RoiError::Zip { .. }));
    }

    #[test]
    fn test_failed_entry_leaves_no_archive() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("broken.zip");
        let entries: Vec<(&str, Vec<Point<i16>>)> =
            vec![("ok", vec![Point::new(1, 1)]), ("", vec![Point::new(2, 2)])];

        let err = write_polygon_roi_zip(&path, entries).unwrap_err();
        match err {
            RoiError::ArchiveEntry { entry, source } => {
                assert_eq!(entry, "");
                assert!(matches!(*source, RoiError::MissingName));
            }
            other => panic!("expected entry error, got {other:?}"),
        }
        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unsupported_kind_creates_nothing() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("rects.zip");
        let err = write_roi_zip(&path, vec![("r", vec![Point::new(0i16, 0i16)])], ShapeKind::Rect)
            .unwrap_err();
        assert!(matches!(err, RoiError::UnsupportedShape { code: 1, .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_bad_entry_is_named_on_read() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("mixed.zip");
        {
            let file = File::create(&path).unwrap();
            let mut zip = ZipWriter::new(file);
            zip.start_file("junk.roi", SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"not an roi").unwrap();
            zip.finish().unwrap();
        }

        let err = read_roi_zip(&path).unwrap_err();
        match err {
            RoiError::ArchiveEntry { entry, source } => {
                assert_eq!(entry, "junk.roi");
                assert!(matches!(*source, RoiError::Format { .. }));
            }
            other => panic!("expected entry error, got {other:?}"),
        }
    }
}
