//! Nanosecond-resolution simulation timestamps.
//!
//! Gate delays in DigiSim netlists are integers and the VCD timescale is
//! fixed at 1 ns, so a timestamp is a plain nanosecond count. Stimulus
//! files may carry fractional times; those are truncated on ingestion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A point in simulation time with nanosecond resolution.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize,
)]
pub struct SimTime {
    /// Simulation time in nanoseconds.
    pub ns: u64,
}

impl SimTime {
    /// The time origin.
    pub const ZERO: SimTime = SimTime { ns: 0 };

    /// Creates a timestamp from a nanosecond count.
    pub fn from_ns(ns: u64) -> Self {
        Self { ns }
    }

    /// Nanoseconds elapsed since `earlier`, as a float for setup/hold
    /// comparisons against fractional constraints.
    ///
    /// # Panics
    ///
    /// Debug-panics if `earlier` is in the future.
    pub fn since(self, earlier: SimTime) -> f64 {
        debug_assert!(earlier.ns <= self.ns, "time ran backwards");
        (self.ns - earlier.ns) as f64
    }
}

impl Add<u64> for SimTime {
    type Output = SimTime;

    fn add(self, delay_ns: u64) -> SimTime {
        SimTime {
            ns: self.ns + delay_ns,
        }
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ns", self.ns)
    }
}
