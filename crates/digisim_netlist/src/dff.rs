//! Positive-edge-triggered D flip-flops.
//!
//! A flip-flop latches D into Q (and ¬D into Qn) on a rising clock edge
//! and adds no propagation delay of its own. It also keeps the timestamps
//! needed for setup/hold checking: the last D change and the last rising
//! clock edge. Whether a detected violation is actually reported is the
//! simulation kernel's decision (timing mode only).

use digisim_common::{define_id, Arena, Logic, SimTime};
use serde::{Deserialize, Serialize};

use crate::node::{Node, NodeId};

define_id!(
    /// Opaque ID of a [`FlipFlop`] within its owning circuit.
    DffId
);

/// The outcome of a rising clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockEdge {
    /// The value latched into Q (the D input at the edge).
    pub q: Logic,
    /// The complement latched into Qn.
    pub qn: Logic,
    /// `true` when D changed less than the setup time before this edge.
    pub setup_violation: bool,
}

/// A D flip-flop with setup/hold bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipFlop {
    /// Data input node.
    pub d: NodeId,
    /// Clock input node.
    pub clk: NodeId,
    /// Latched output node.
    pub q: NodeId,
    /// Complement output node.
    pub qn: NodeId,
    /// Minimum D stability interval before a rising edge, in nanoseconds.
    pub setup_ns: f64,
    /// Minimum D stability interval after a rising edge, in nanoseconds.
    pub hold_ns: f64,
    last_clk: Logic,
    last_d_change: Option<SimTime>,
    last_rising_edge: Option<SimTime>,
}

impl FlipFlop {
    /// Creates a flip-flop that has never seen a clock edge or a D change.
    pub fn new(d: NodeId, clk: NodeId, q: NodeId, qn: NodeId, setup_ns: f64, hold_ns: f64) -> Self {
        Self {
            d,
            clk,
            q,
            qn,
            setup_ns,
            hold_ns,
            last_clk: Logic::Zero,
            last_d_change: None,
            last_rising_edge: None,
        }
    }

    /// Processes a clock-node change at time `t`.
    ///
    /// Returns `Some` only on a rising edge (stored clock level 0, current
    /// level 1), carrying the latched Q/Qn pair and the setup-check result;
    /// the edge timestamp is recorded for later hold checks. The stored
    /// clock level is updated unconditionally.
    pub fn on_clock_event(&mut self, t: SimTime, nodes: &Arena<NodeId, Node>) -> Option<ClockEdge> {
        let clk_now = nodes[self.clk].read();
        let rising = self.last_clk == Logic::Zero && clk_now == Logic::One;
        self.last_clk = clk_now;
        if !rising {
            return None;
        }

        let setup_violation = match self.last_d_change {
            Some(d_change) => t.since(d_change) < self.setup_ns,
            None => false,
        };
        self.last_rising_edge = Some(t);

        let d = nodes[self.d].read();
        Some(ClockEdge {
            q: d,
            qn: !d,
            setup_violation,
        })
    }

    /// Processes a data-node change at time `t`.
    ///
    /// Records the change timestamp and returns `true` when it lands less
    /// than the hold time after the last rising clock edge.
    pub fn on_data_event(&mut self, t: SimTime) -> bool {
        self.last_d_change = Some(t);
        match self.last_rising_edge {
            Some(edge) => t.since(edge) < self.hold_ns,
            None => false,
        }
    }
}
