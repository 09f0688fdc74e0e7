//! Fuzz target for reading ROI zip archives.
//!
//! Covers both the zip container parsing and the per-entry record decoding.
//!
//! Run with:
//!   cargo +nightly fuzz run roi_zip_read

#![no_main]

use libfuzzer_sys::fuzz_target;
use ijroi::roi::archive::fuzz_read_roi_zip;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4 * 1024 * 1024 {
        return;
    }

    let _ = fuzz_read_roi_zip(data);
});
