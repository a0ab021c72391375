//! Fault generation error types.

use std::io;

use digisim_netlist::NetlistError;
use digisim_sim::SimError;

/// Errors raised while building a fault generator or producing vectors.
#[derive(Debug, thiserror::Error)]
pub enum FaultGenError {
    /// Writing the fault vector output failed.
    #[error("failed to write fault vectors: {0}")]
    Io(#[from] io::Error),

    /// The netlist could not be parsed.
    #[error(transparent)]
    Netlist(#[from] NetlistError),

    /// A functional simulation of a trial pattern failed.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// The requested coverage was outside the 0–100 range.
    #[error("requested coverage {requested}% is outside 0-100")]
    InvalidCoverage {
        /// The rejected coverage percentage.
        requested: f64,
    },

    /// Random trials stopped finding new faults before the requested
    /// coverage was reached.
    #[error(
        "coverage unreachable: reached {achieved_pct:.1}% of requested {requested_pct:.1}% \
         after {rounds} rounds without a detection"
    )]
    CoverageUnreachable {
        /// Coverage actually reached, in percent.
        achieved_pct: f64,
        /// Coverage that was requested, in percent.
        requested_pct: f64,
        /// Number of consecutive fruitless trial rounds.
        rounds: u32,
    },
}
