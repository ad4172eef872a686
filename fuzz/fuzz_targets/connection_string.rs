//! Fuzz target for connection string parsing.
//!
//! Feeds arbitrary strings to `parse` and `parse_duration`.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_connection_string
//! ```

#![no_main]

use aerospike_url::{parse, parse_duration};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Neither parser may panic, only return errors
        let _ = parse(input);
        let _ = parse_duration(input);
    }
});
