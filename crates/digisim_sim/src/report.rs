//! Simulation run results and timing-violation records.

use std::fmt;

use digisim_common::SimTime;
use serde::{Deserialize, Serialize};

/// Which flip-flop timing window was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// D changed too close before a rising clock edge.
    Setup,
    /// D changed too close after a rising clock edge.
    Hold,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Setup => write!(f, "setup"),
            ViolationKind::Hold => write!(f, "hold"),
        }
    }
}

/// A setup or hold violation detected during a timing simulation.
///
/// Violations are diagnostics, not failures: the flip-flop still latches
/// and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingViolation {
    /// Which window was violated.
    pub kind: ViolationKind,
    /// When the violation was detected.
    pub time: SimTime,
    /// Name of the affected flip-flop's Q output node.
    pub node: String,
}

impl fmt::Display for TimingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ERROR: {} time violation at time {} on Q output node {}",
            self.kind, self.time.ns, self.node
        )
    }
}

/// The result of a completed simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    /// Timestamp of the last dispatched event.
    pub final_time: SimTime,
    /// Total number of events dispatched.
    pub events_dispatched: u64,
    /// Setup/hold violations, in detection order. Always empty in
    /// functional mode.
    pub violations: Vec<TimingViolation>,
}
