//! Circuit nodes: named 1-bit signals with an optional stuck-at lock.

use digisim_common::{define_id, Logic};
use serde::{Deserialize, Serialize};

define_id!(
    /// Opaque ID of a [`Node`] within its owning circuit.
    NodeId
);

/// A named 1-bit signal.
///
/// A node starts at logic `0`. While the stuck-at lock is engaged, writes
/// are silently discarded and the node keeps the value chosen when the
/// lock was applied — this is how single stuck-at faults are injected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    name: String,
    value: Logic,
    stuck: bool,
}

impl Node {
    /// Creates a node at logic `0` with the lock disengaged.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Logic::Zero,
            stuck: false,
        }
    }

    /// The node's netlist name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the current value.
    pub fn read(&self) -> Logic {
        self.value
    }

    /// Writes a new value. A no-op (not an error) while the node is stuck.
    pub fn write(&mut self, value: Logic) {
        if !self.stuck {
            self.value = value;
        }
    }

    /// Forces the node to `value` and engages the stuck-at lock.
    pub fn lock(&mut self, value: Logic) {
        self.value = value;
        self.stuck = true;
    }

    /// Disengages the stuck-at lock; the value is left as-is.
    pub fn unlock(&mut self) {
        self.stuck = false;
    }

    /// Whether the stuck-at lock is engaged.
    pub fn is_locked(&self) -> bool {
        self.stuck
    }
}
