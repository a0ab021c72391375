//! Netlist parse error types.

use std::io;

/// Errors raised while reading or parsing a netlist file.
///
/// Parsing is deliberately permissive: a line with an unrecognized type
/// token is skipped with a [`ParseWarning`](crate::ParseWarning) instead of
/// failing the parse. Only structurally unusable records — missing fields
/// or unparseable numerics — are hard errors.
#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    /// The netlist file could not be read.
    #[error("failed to read netlist: {0}")]
    Io(#[from] io::Error),

    /// A record was missing required fields.
    #[error("netlist line {line}: incomplete record (expected {expected})")]
    IncompleteRecord {
        /// 1-based line number of the offending record.
        line: usize,
        /// Human description of the expected shape.
        expected: &'static str,
    },

    /// A delay field did not parse as a non-negative integer.
    #[error("netlist line {line}: invalid delay value '{value}'")]
    InvalidDelay {
        /// 1-based line number of the offending record.
        line: usize,
        /// The rejected field text.
        value: String,
    },

    /// A setup or hold field did not parse as a non-negative number.
    #[error("netlist line {line}: invalid setup/hold value '{value}'")]
    InvalidTiming {
        /// 1-based line number of the offending record.
        line: usize,
        /// The rejected field text.
        value: String,
    },
}
