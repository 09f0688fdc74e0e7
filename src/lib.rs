//! ijroi: read and write ImageJ binary ROI files.
//!
//! ImageJ stores regions of interest (polygons, rectangles, ovals, points and
//! freehand outlines) in a compact big-endian binary record, and bundles many
//! of them into a zip archive. This crate decodes those records into point
//! lists and encodes point lists back into records ImageJ can import.
//!
//! # Modules
//!
//! - [`roi`]: Record decoder, encoder, zip archive helpers and the point types
//! - [`error`]: Error types for ROI operations

pub mod error;
pub mod roi;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

pub use error::RoiError;

use roi::{Point, PointSequence, RoiRecord, ShapeKind};

/// The ijroi CLI application.
#[derive(Parser)]
#[command(name = "ijroi")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log more detail to stderr (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log filter directive, e.g. 'ijroi=debug'. Overrides --verbose.
    #[arg(long, env = "IJROI_LOG", global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Decode a .roi file, a .zip of ROIs, or a directory of .roi files.
    Read(ReadArgs),
    /// Encode named point sets from JSON into a .roi file or a .zip archive.
    Write(WriteArgs),
}

/// Arguments for the read subcommand.
#[derive(clap::Args)]
struct ReadArgs {
    /// Input .roi file, .zip archive, or directory.
    input: PathBuf,

    /// Output format ('text', 'json', or 'csv').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the write subcommand.
#[derive(clap::Args)]
struct WriteArgs {
    /// JSON file holding `[{"name": ..., "points": [[row, col], ...]}, ...]`.
    input: PathBuf,

    /// Output path. A '.zip' path gets an archive, anything else a single record.
    #[arg(short, long)]
    out: PathBuf,

    /// Shape to write ('polygon' or 'oval').
    #[arg(long, default_value = "polygon")]
    kind: String,
}

/// One named point set in the `write` input file.
#[derive(Debug, Deserialize)]
struct PointSetInput {
    name: String,
    points: Vec<Point<i16>>,
}

/// Run the ijroi CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), RoiError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_filter.as_deref());

    match cli.command {
        Some(Commands::Read(args)) => run_read(args),
        Some(Commands::Write(args)) => run_write(args),
        None => {
            println!("ijroi {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Read and write ImageJ ROI files.");
            println!();
            println!("Run 'ijroi --help' for usage information.");
            Ok(())
        }
    }
}

/// Installs a stderr subscriber; an explicit filter wins over `-v`.
fn init_tracing(verbose: u8, filter: Option<&str>) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = filter
        .and_then(|directive| tracing_subscriber::EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new(default_level));

    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Execute the read subcommand.
fn run_read(args: ReadArgs) -> Result<(), RoiError> {
    let entries = read_input(&args.input)?;
    tracing::info!("read {} ROI(s) from {}", entries.len(), args.input.display());

    match args.output.as_str() {
        "text" => {
            for (entry, record) in &entries {
                print!("{}", describe_record(entry, record));
            }
            Ok(())
        }
        "json" => {
            let reports: Vec<EntryReport<'_>> = entries
                .iter()
                .map(|(entry, record)| EntryReport { entry, record })
                .collect();
            let json = serde_json::to_string_pretty(&reports).map_err(RoiError::ReportJsonWrite)?;
            println!("{json}");
            Ok(())
        }
        "csv" => write_points_csv(&entries, io::stdout().lock()),
        other => Err(RoiError::UnsupportedFormat(format!(
            "'{}' (supported: text, json, csv)",
            other
        ))),
    }
}

/// Loads records from a single file, an archive, or a directory tree.
fn read_input(input: &Path) -> Result<Vec<(String, RoiRecord)>, RoiError> {
    if input.is_dir() {
        return read_roi_dir(input);
    }

    let is_zip = input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if is_zip {
        return roi::read_roi_zip(input);
    }

    let entry = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    Ok(vec![(entry, roi::read_roi(input)?)])
}

/// Reads every `.roi` file below `dir`, ordered by relative path.
fn read_roi_dir(dir: &Path) -> Result<Vec<(String, RoiRecord)>, RoiError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|source| RoiError::RoiDirInvalid {
            path: dir.to_path_buf(),
            message: format!("failed while traversing directory: {source}"),
        })?;
        let path = entry.path();
        let is_roi = entry.file_type().is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("roi"));
        if is_roi {
            let rel = path.strip_prefix(dir).unwrap_or(path);
            files.push((rel.to_string_lossy().replace('\\', "/"), path.to_path_buf()));
        }
    }
    files.sort();

    files
        .into_iter()
        .map(|(rel, path)| {
            let record = roi::read_roi(&path).map_err(|e| e.in_entry(rel.as_str()))?;
            Ok((rel, record))
        })
        .collect()
}

#[derive(Serialize)]
struct EntryReport<'a> {
    entry: &'a str,
    #[serde(flatten)]
    record: &'a RoiRecord,
}

/// Renders one record for the text output.
fn describe_record(entry: &str, record: &RoiRecord) -> String {
    use std::fmt::Write as _;

    let bbox = record.bbox;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} '{}' v{} bbox=(top {}, left {}, bottom {}, right {}) {} {} point(s)",
        entry,
        record.kind,
        record.name_or_empty(),
        record.version,
        bbox.top,
        bbox.left,
        bbox.bottom,
        bbox.right,
        if record.sub_pixel { "sub-pixel" } else { "integer" },
        record.points.len()
    );

    if record.kind == ShapeKind::Oval {
        if let Some((center, diameter)) = record
            .points
            .as_integer()
            .and_then(roi::oval_points_center_diam)
        {
            let _ = writeln!(
                out,
                "  center=(row {}, col {}) diameter={}",
                center.row, center.col, diameter
            );
        }
    }

    match &record.points {
        PointSequence::Integer(points) => {
            for p in points {
                let _ = writeln!(out, "  {} {}", p.row, p.col);
            }
        }
        PointSequence::SubPixel(points) => {
            for p in points {
                let _ = writeln!(out, "  {} {}", p.row, p.col);
            }
        }
    }
    out
}

#[derive(Serialize)]
struct PointRow<'a> {
    entry: &'a str,
    name: &'a str,
    kind: ShapeKind,
    index: usize,
    row: f64,
    col: f64,
}

/// Writes one CSV row per point.
fn write_points_csv<W: io::Write>(
    entries: &[(String, RoiRecord)],
    writer: W,
) -> Result<(), RoiError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for (entry, record) in entries {
        for (index, point) in record.points.to_f64().into_iter().enumerate() {
            csv_writer.serialize(PointRow {
                entry,
                name: record.name_or_empty(),
                kind: record.kind,
                index,
                row: point.row,
                col: point.col,
            })?;
        }
    }
    csv_writer.flush().map_err(RoiError::Io)
}

/// Execute the write subcommand.
fn run_write(args: WriteArgs) -> Result<(), RoiError> {
    let kind = match args.kind.as_str() {
        "polygon" => ShapeKind::Polygon,
        "oval" => ShapeKind::Oval,
        other => {
            return Err(RoiError::UnsupportedFormat(format!(
                "shape '{}' (supported: polygon, oval)",
                other
            )));
        }
    };

    let file = File::open(&args.input).map_err(RoiError::Io)?;
    let sets: Vec<PointSetInput> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            RoiError::PointsJsonParse {
                path: args.input.clone(),
                source,
            }
        })?;

    let is_zip = args
        .out
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if is_zip {
        roi::write_roi_zip(
            &args.out,
            sets.iter().map(|set| (&set.name, &set.points)),
            kind,
        )?;
    } else {
        let [set] = sets.as_slice() else {
            return Err(RoiError::UnsupportedFormat(format!(
                "{} point sets cannot be written to a single .roi file (use a .zip output)",
                sets.len()
            )));
        };
        roi::write_roi(&args.out, &set.points, Some(set.name.as_str()), kind)?;
    }

    println!("Wrote {} ROI(s) to {}", sets.len(), args.out.display());
    Ok(())
}
