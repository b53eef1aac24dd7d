//! Streaming trace adjustment
//!
//! Drives the anchor parser, clock state and line composer over a trace file
//! one line at a time. Lines are handled as bytes so SQL text in odd
//! character sets passes through untouched.
//!
//! # Example
//!
//! ```
//! use traceadjust::adjuster::adjust_str;
//! use traceadjust::calendar::TimeZoneMode;
//! use traceadjust::config::AdjustConfig;
//!
//! let config = AdjustConfig {
//!     time_zone: TimeZoneMode::Utc,
//!     ..AdjustConfig::default()
//! };
//! let input = "Trace file /u01/orcl_ora_1234.trc\n\
//!              *** 2017-03-13 09:23:21.767\n\
//!              PARSING IN CURSOR tim=123456789\n";
//! let output = adjust_str(input, &config).unwrap();
//! assert!(output.contains("tim=123.456789,delta=0,dslt=767000"));
//! ```

use serde::Serialize;
use std::io::{BufRead, Write};

use crate::accumulator::RunState;
use crate::anchor::parse_anchor;
use crate::calendar::{to_absolute_time, to_display_string, AbsoluteTime, TimeZoneMode};
use crate::compose::{compose_line, find_counter, CounterScan};
use crate::config::AdjustConfig;
use crate::error::AdjustError;

/// Required start of the first line of an Oracle trace file
pub const HEADER_PREFIX: &[u8] = b"Trace file";

/// What to emit for one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Emit the line unchanged
    Unchanged,
    /// Emit the line unchanged; its counter was rewritten by an earlier run
    AlreadyAdjusted,
    /// Emit the anchor line unchanged, followed by the announcement if any
    Anchor { announcement: Option<String> },
    /// Emit this instead of the input line
    Rewritten(Vec<u8>),
}

/// Line counts for one pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub lines: u64,
    pub anchors: u64,
    pub counters_rewritten: u64,
    pub already_adjusted: u64,
    pub unchanged: u64,
}

/// Informational line written after each anchor
pub fn base_announcement(zone: TimeZoneMode, base: &AbsoluteTime) -> String {
    format!(
        "*** {} v{}: Base Timestamp Adjusted to '{}'",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        to_display_string(zone, base)
    )
}

/// Line-at-a-time trace adjuster
///
/// Owns the clock state for a single pass. Feed it lines in file order.
#[derive(Debug)]
pub struct Adjuster {
    config: AdjustConfig,
    state: RunState,
    line_number: u64,
    summary: RunSummary,
}

impl Adjuster {
    pub fn new(config: AdjustConfig) -> Self {
        Self {
            config,
            state: RunState::new(),
            line_number: 0,
            summary: RunSummary::default(),
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Count a line that is emitted without passing through the engine
    pub fn skip_line(&mut self) {
        self.line_number += 1;
        self.summary.lines += 1;
        self.summary.unchanged += 1;
    }

    /// Classify one line (without its newline) and update the clock state
    ///
    /// Errors carry the 1-based line number within the stream.
    pub fn adjust_line(&mut self, line: &[u8]) -> Result<LineOutcome, AdjustError> {
        self.line_number += 1;
        self.summary.lines += 1;
        let line_number = self.line_number;

        let outcome = self.classify(line).map_err(|e| e.at_line(line_number))?;

        match &outcome {
            LineOutcome::Unchanged => self.summary.unchanged += 1,
            LineOutcome::AlreadyAdjusted => self.summary.already_adjusted += 1,
            LineOutcome::Anchor { .. } => self.summary.anchors += 1,
            LineOutcome::Rewritten(_) => self.summary.counters_rewritten += 1,
        }
        Ok(outcome)
    }

    fn classify(&mut self, line: &[u8]) -> Result<LineOutcome, AdjustError> {
        let zone = self.config.time_zone;

        if let Some(anchor) = parse_anchor(line)? {
            let base = to_absolute_time(zone, &anchor.fields)?;
            self.state.apply_anchor(base, anchor.fraction_micros);
            tracing::debug!(
                line = self.line_number,
                base = %base,
                fraction_micros = anchor.fraction_micros,
                "new base timestamp"
            );

            let announcement = self
                .config
                .announce_base
                .then(|| base_announcement(zone, &base));
            return Ok(LineOutcome::Anchor { announcement });
        }

        match find_counter(line)? {
            CounterScan::Absent => Ok(LineOutcome::Unchanged),
            CounterScan::AlreadyAdjusted => Ok(LineOutcome::AlreadyAdjusted),
            CounterScan::Found(occurrence) => {
                let reading = self.state.record_counter(occurrence.value)?;
                tracing::trace!(
                    line = self.line_number,
                    tim = reading.counter,
                    delta = reading.delta_micros,
                    dslt = reading.running_offset_micros,
                    "counter adjusted"
                );
                Ok(LineOutcome::Rewritten(compose_line(
                    line,
                    &occurrence,
                    &reading,
                    zone,
                )))
            }
        }
    }

    /// Adjust one line and write the result, newline-terminated
    pub fn write_line<W: Write>(&mut self, line: &[u8], out: &mut W) -> Result<(), AdjustError> {
        match self.adjust_line(line)? {
            LineOutcome::Unchanged | LineOutcome::AlreadyAdjusted => {
                out.write_all(line)?;
                out.write_all(b"\n")?;
            }
            LineOutcome::Anchor { announcement } => {
                out.write_all(line)?;
                out.write_all(b"\n")?;
                if let Some(announcement) = announcement {
                    out.write_all(announcement.as_bytes())?;
                    out.write_all(b"\n")?;
                }
            }
            LineOutcome::Rewritten(rewritten) => {
                out.write_all(&rewritten)?;
                out.write_all(b"\n")?;
            }
        }
        Ok(())
    }
}

/// Read one line into `buf`, without its `\n`. Returns false at end of input.
fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<bool, AdjustError> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    Ok(true)
}

/// Adjust a whole trace stream
///
/// When the config requires it, the first line must start with `Trace file`;
/// it is then copied through without inspection. Output written before a
/// fatal error is flushed, not retracted.
pub fn adjust_stream<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    config: &AdjustConfig,
) -> Result<RunSummary, AdjustError> {
    let mut adjuster = Adjuster::new(config.clone());
    let result = run(&mut adjuster, &mut reader, &mut writer, config);
    // A failed flush must not mask the error that stopped the run
    let flushed = writer.flush();
    result?;
    flushed?;

    let summary = adjuster.summary().clone();
    tracing::info!(
        lines = summary.lines,
        anchors = summary.anchors,
        counters = summary.counters_rewritten,
        already_adjusted = summary.already_adjusted,
        "trace adjusted"
    );
    Ok(summary)
}

fn run<R: BufRead, W: Write>(
    adjuster: &mut Adjuster,
    reader: &mut R,
    writer: &mut W,
    config: &AdjustConfig,
) -> Result<(), AdjustError> {
    let mut buf = Vec::new();

    if config.require_header {
        if !read_line(reader, &mut buf)? || !buf.starts_with(HEADER_PREFIX) {
            return Err(AdjustError::NotATraceFile);
        }
        writer.write_all(&buf)?;
        writer.write_all(b"\n")?;
        adjuster.skip_line();
    }

    while read_line(reader, &mut buf)? {
        adjuster.write_line(&buf, writer)?;
    }
    Ok(())
}

/// Adjust an in-memory trace, returning the output as text
pub fn adjust_str(input: &str, config: &AdjustConfig) -> Result<String, AdjustError> {
    let mut out = Vec::with_capacity(input.len() * 2);
    adjust_stream(input.as_bytes(), &mut out, config)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
