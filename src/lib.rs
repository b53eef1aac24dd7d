//! traceadjust - Oracle trace file timestamp reconstruction
//!
//! Oracle trace files stamp events with `tim=` values: microsecond counters
//! from an arbitrary epoch. This library rewrites each counter with its
//! value in seconds, the delta from the previous counter, the running offset
//! since the last `*** yyyy-mm-dd hh:mm:ss.fff` anchor line, and the
//! reconstructed wall-clock time.

pub mod accumulator;
pub mod adjuster;
pub mod anchor;
pub mod calendar;
pub mod cli;
pub mod compose;
pub mod config;
pub mod error;

pub use adjuster::{adjust_str, adjust_stream, Adjuster, LineOutcome, RunSummary};
pub use config::AdjustConfig;
pub use error::AdjustError;
