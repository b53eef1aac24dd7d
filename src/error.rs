//! Error types for trace adjustment
//!
//! Every variant is fatal to the pass that raised it. Each maps to a distinct
//! process exit status so calling scripts can tell a bad counter from a bad
//! anchor line or an unreadable file.

use thiserror::Error;

/// Process exit statuses used by the `traceadjust` binary
pub mod exit_code {
    /// No trace file argument supplied
    pub const NO_ARGS: u8 = 1;
    /// Trace file could not be opened
    pub const NO_FILE: u8 = 2;
    /// First line is not an Oracle trace file header
    pub const BAD_FILE: u8 = 3;
    /// A `tim=` value could not be extracted
    pub const BAD_TIM: u8 = 4;
    /// An anchor timestamp line could not be converted
    pub const BAD_TIMESTAMP: u8 = 5;
    /// Reading or writing the stream failed part way through
    pub const IO: u8 = 6;
    /// Configuration file missing or invalid
    pub const CONFIG: u8 = 7;
}

/// Errors raised while adjusting a trace stream
#[derive(Error, Debug)]
pub enum AdjustError {
    #[error("Cannot extract new base timestamp from text '{text}' at line {line}")]
    MalformedTimestamp { line: u64, text: String },

    #[error("No valid system time for {fields} at line {line}")]
    InvalidCalendarDate { line: u64, fields: String },

    #[error("Failed to extract time value from [{text}] at line {line}")]
    MalformedCounter { line: u64, text: String },

    #[error("Adjusted time out of range ({offset_micros}us past base) at line {line}")]
    TimestampOutOfRange { line: u64, offset_micros: i64 },

    #[error("This is not an Oracle trace file. 'Trace file' missing from line 1.")]
    NotATraceFile,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdjustError {
    /// Exit status the binary reports for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            AdjustError::MalformedTimestamp { .. } | AdjustError::InvalidCalendarDate { .. } => {
                exit_code::BAD_TIMESTAMP
            }
            AdjustError::MalformedCounter { .. } | AdjustError::TimestampOutOfRange { .. } => {
                exit_code::BAD_TIM
            }
            AdjustError::NotATraceFile => exit_code::BAD_FILE,
            AdjustError::Io(_) => exit_code::IO,
        }
    }

    /// Attach a line number to an error raised by a line-level helper
    pub(crate) fn at_line(self, line: u64) -> Self {
        match self {
            AdjustError::MalformedTimestamp { text, .. } => {
                AdjustError::MalformedTimestamp { line, text }
            }
            AdjustError::InvalidCalendarDate { fields, .. } => {
                AdjustError::InvalidCalendarDate { line, fields }
            }
            AdjustError::MalformedCounter { text, .. } => AdjustError::MalformedCounter { line, text },
            AdjustError::TimestampOutOfRange { offset_micros, .. } => {
                AdjustError::TimestampOutOfRange {
                    line,
                    offset_micros,
                }
            }
            other => other,
        }
    }
}
