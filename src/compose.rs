//! Counter token detection and output line composition
//!
//! A counter line is rewritten in place. Only the digits after the first
//! `tim=` change; every byte before and after them is copied through:
//!
//! ```text
//! PARSING IN CURSOR #1 len=31 dep=0 uid=0 oct=3 lid=0 tim=123460000 hv=1
//! PARSING IN CURSOR #1 len=31 dep=0 uid=0 oct=3 lid=0 tim=123.460000,delta=3211,dslt=770211,local='2017 Mar 13 09:23:21.770211' hv=1
//! ```

use regex::bytes::Regex;
use std::ops::Range;
use std::sync::OnceLock;

use crate::accumulator::CounterReading;
use crate::calendar::{to_display_string, year_first, TimeZoneMode};
use crate::error::AdjustError;

/// Display field used for counters seen before any anchor line
pub const NO_BASE_TIMESTAMP: &str = "no base timestamp";

const MICROS_PER_SECOND: u64 = 1_000_000;

/// A rewritten counter field, as found right after `tim=`
const ADJUSTED_PATTERN: &str = r"^[0-9]+\.[0-9]{6},delta=-?[0-9]+,dslt=-?[0-9]+,local='";

fn counter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"tim=([0-9]*)").expect("counter pattern is valid"))
}

fn adjusted_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ADJUSTED_PATTERN).expect("adjusted pattern is valid"))
}

/// A counter value and where its digits sit in the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterOccurrence {
    pub value: u64,
    /// Byte range of the digits (excluding `tim=`)
    pub digits: Range<usize>,
}

/// Outcome of scanning a line for a counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterScan {
    /// No `tim=` in the line
    Absent,
    /// The first `tim=` already carries a rewritten field
    AlreadyAdjusted,
    Found(CounterOccurrence),
}

/// Locate and parse the first `tim=` value in a line
pub fn find_counter(line: &[u8]) -> Result<CounterScan, AdjustError> {
    let Some(caps) = counter_regex().captures(line) else {
        return Ok(CounterScan::Absent);
    };
    let Some(digits) = caps.get(1) else {
        return Ok(CounterScan::Absent);
    };

    if adjusted_regex().is_match(&line[digits.start()..]) {
        return Ok(CounterScan::AlreadyAdjusted);
    }

    let value = std::str::from_utf8(digits.as_bytes())
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| AdjustError::MalformedCounter {
            line: 0,
            text: String::from_utf8_lossy(line).into_owned(),
        })?;

    Ok(CounterScan::Found(CounterOccurrence {
        value,
        digits: digits.range(),
    }))
}

/// Format a counter as seconds, treating the low six digits as microseconds
pub fn counter_as_seconds(counter: u64) -> String {
    format!(
        "{}.{:06}",
        counter / MICROS_PER_SECOND,
        counter % MICROS_PER_SECOND
    )
}

/// Wall-clock stamp for a reading, e.g. `2017 Mar 13 09:23:21.767000`
pub fn local_stamp(reading: &CounterReading, zone: TimeZoneMode) -> String {
    match reading.wall_clock {
        Some(wall_clock) => format!(
            "{}.{:06}",
            year_first(&to_display_string(zone, &wall_clock)),
            reading.fraction_micros
        ),
        None => NO_BASE_TIMESTAMP.to_string(),
    }
}

/// Build the output line for a counter occurrence
pub fn compose_line(
    line: &[u8],
    occurrence: &CounterOccurrence,
    reading: &CounterReading,
    zone: TimeZoneMode,
) -> Vec<u8> {
    let field = format!(
        "{},delta={},dslt={},local='{}'",
        counter_as_seconds(reading.counter),
        reading.delta_micros,
        reading.running_offset_micros,
        local_stamp(reading, zone)
    );

    let mut out = Vec::with_capacity(line.len() + field.len());
    out.extend_from_slice(&line[..occurrence.digits.start]);
    out.extend_from_slice(field.as_bytes());
    out.extend_from_slice(&line[occurrence.digits.end..]);
    out
}
