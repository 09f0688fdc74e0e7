//! Fuzz target for ROI record decoding.
//!
//! Feeds arbitrary bytes to the record decoder, checking for panics,
//! runaway allocations, or hangs on malformed headers and offsets.
//!
//! Run with:
//!   cargo +nightly fuzz run roi_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use ijroi::roi::decode_slice;

fuzz_target!(|data: &[u8]| {
    // A record never needs more than a few megabytes.
    if data.len() > 4 * 1024 * 1024 {
        return;
    }

    // Errors are expected; only panics and crashes matter.
    let _ = decode_slice(data);
});
