//! Anchor line recognition
//!
//! Oracle writes a wall-clock marker into trace files whenever it feels like
//! re-synchronizing the reader:
//!
//! ```text
//! *** 2017-03-13 09:23:21.767
//! 0.........1.........2......
//! 012345678901234567890123456
//! ```
//!
//! The separators sit at fixed character offsets (`-` at 8 and 11, space at
//! 14, `:` at 17 and 20, `.` at 23). Any characters may fill the field slots
//! as far as the shape is concerned; a slot that is not a number makes the
//! line a malformed anchor rather than a plain line.

use regex::bytes::Regex;
use std::sync::OnceLock;

use crate::calendar::CalendarFields;
use crate::error::AdjustError;

/// Fixed-offset anchor shape. Field slots are captured by position.
const ANCHOR_PATTERN: &str =
    r"^\*\*\* (.{4})-(.{2})-(.{2}) (.{2}):(.{2}):(.{2})\.([0-9]+)";

/// Digits kept when rounding the fraction (one beyond microseconds)
const FRACTION_DIGITS: usize = 7;

fn anchor_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ANCHOR_PATTERN).expect("anchor pattern is valid"))
}

/// Fields extracted from one anchor line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorRecord {
    pub fields: CalendarFields,
    /// Sub-second fraction rounded half-up to microseconds (0..=1_000_000)
    pub fraction_micros: i64,
}

/// Check a line against the anchor shape and extract its fields
///
/// Returns `Ok(None)` when the line is not anchor-shaped. Returns
/// `MalformedTimestamp` (with line 0; the caller fills it in) when the shape
/// matches but a field slot is not an integer.
pub fn parse_anchor(line: &[u8]) -> Result<Option<AnchorRecord>, AdjustError> {
    let Some(caps) = anchor_regex().captures(line) else {
        return Ok(None);
    };

    let malformed = || AdjustError::MalformedTimestamp {
        line: 0,
        text: String::from_utf8_lossy(line).into_owned(),
    };

    let field = |index: usize| -> Result<u32, AdjustError> {
        let slot = caps.get(index).map(|m| m.as_bytes()).unwrap_or_default();
        std::str::from_utf8(slot)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(malformed)
    };

    let year = i32::try_from(field(1)?).map_err(|_| malformed())?;
    let fields = CalendarFields {
        year,
        month: field(2)?,
        day: field(3)?,
        hour: field(4)?,
        minute: field(5)?,
        second: field(6)?,
    };

    let fraction = caps.get(7).map(|m| m.as_bytes()).unwrap_or_default();

    Ok(Some(AnchorRecord {
        fields,
        fraction_micros: fraction_to_micros(fraction),
    }))
}

/// Round a run of decimal fraction digits to whole microseconds
///
/// Exact decimal arithmetic: `767` is 767000, `0000005` rounds up to 1,
/// `9999999` rounds up to a full second.
fn fraction_to_micros(digits: &[u8]) -> i64 {
    let mut scaled: i64 = 0;
    for position in 0..FRACTION_DIGITS {
        let digit = digits
            .get(position)
            .filter(|d| d.is_ascii_digit())
            .map_or(0, |d| i64::from(d - b'0'));
        scaled = scaled * 10 + digit;
    }
    (scaled + 5) / 10
}
