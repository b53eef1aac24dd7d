#![no_main]

use libfuzzer_sys::fuzz_target;
use traceadjust::calendar::TimeZoneMode;
use traceadjust::{adjust_stream, AdjustConfig};

fuzz_target!(|data: &[u8]| {
    let config = AdjustConfig {
        time_zone: TimeZoneMode::Utc,
        require_header: false,
        ..AdjustConfig::default()
    };
    // Malformed anchors and counters are errors, never panics
    let mut out = Vec::new();
    let _ = adjust_stream(data, &mut out, &config);
});
