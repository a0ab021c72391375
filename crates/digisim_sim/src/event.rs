//! Simulation events.

use digisim_common::Logic;
use digisim_netlist::{GateId, NodeId};
use serde::{Deserialize, Serialize};

/// A schedulable unit of simulation work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Commit `value` to `node` and propagate the change.
    NodeUpdate {
        /// The target node.
        node: NodeId,
        /// The value to commit.
        value: Logic,
    },
    /// Re-evaluate a combinational gate and schedule its propagation.
    GateEvaluate {
        /// The target gate.
        gate: GateId,
    },
}
