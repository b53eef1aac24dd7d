//! Running clock state for one pass over a trace file
//!
//! `tim=` values are microsecond counters with an arbitrary epoch. The only
//! way to turn them into wall-clock time is to measure how far the counter
//! has moved since the most recent anchor line and add that to the anchor's
//! timestamp.
//!
//! ```text
//! *** 2017-03-13 09:23:21.767          base = 09:23:21, offset = 767000
//! ... tim=123456789                    delta = 0,       offset = 767000
//! ... tim=123460000                    delta = 3211,    offset = 770211
//! ```
//!
//! Deltas are signed. The counter is not monotonic across instance restarts
//! or clock adjustments, and a negative delta is reported as-is.

use chrono::Duration;

use crate::calendar::AbsoluteTime;
use crate::error::AdjustError;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Clock tracking state, owned by a single pass
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Timestamp of the most recent anchor line
    base: Option<AbsoluteTime>,
    /// Last counter seen since the most recent anchor
    previous_counter: Option<u64>,
    /// Microseconds elapsed since `base`, including the anchor's fraction
    running_offset_micros: i64,
}

/// Result of feeding one counter occurrence through the state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterReading {
    /// Raw counter value
    pub counter: u64,
    /// Microseconds since the previous counter (0 for the first after an anchor)
    pub delta_micros: i64,
    /// Microseconds since the anchor's whole second
    pub running_offset_micros: i64,
    /// Wall-clock time truncated to the second, if an anchor has been seen
    pub wall_clock: Option<AbsoluteTime>,
    /// Sub-second part of the wall-clock time (0..1_000_000)
    pub fraction_micros: i64,
}

impl RunState {
    /// Fresh state awaiting its first anchor
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp set by the most recent anchor, if any
    pub fn base(&self) -> Option<&AbsoluteTime> {
        self.base.as_ref()
    }

    /// True once an anchor line has established a base timestamp
    pub fn is_tracking(&self) -> bool {
        self.base.is_some()
    }

    /// Start a new measurement window at an anchor line
    pub fn apply_anchor(&mut self, base: AbsoluteTime, fraction_micros: i64) {
        self.base = Some(base);
        self.previous_counter = None;
        self.running_offset_micros = fraction_micros;
    }

    /// Account for one counter occurrence
    ///
    /// Fails with `TimestampOutOfRange` (line 0; the caller fills it in) only
    /// when the accumulated offset pushes the wall-clock time outside the
    /// calendar's representable range.
    pub fn record_counter(&mut self, counter: u64) -> Result<CounterReading, AdjustError> {
        let delta_micros = match self.previous_counter {
            Some(previous) => counter.wrapping_sub(previous) as i64,
            None => 0,
        };
        self.previous_counter = Some(counter);
        self.running_offset_micros = self.running_offset_micros.saturating_add(delta_micros);

        let whole_seconds = self.running_offset_micros.div_euclid(MICROS_PER_SECOND);
        let fraction_micros = self.running_offset_micros.rem_euclid(MICROS_PER_SECOND);

        let wall_clock = match self.base {
            Some(base) => Some(
                base.checked_add_signed(Duration::seconds(whole_seconds))
                    .ok_or(AdjustError::TimestampOutOfRange {
                        line: 0,
                        offset_micros: self.running_offset_micros,
                    })?,
            ),
            None => None,
        };

        Ok(CounterReading {
            counter,
            delta_micros,
            running_offset_micros: self.running_offset_micros,
            wall_clock,
            fraction_micros,
        })
    }
}
