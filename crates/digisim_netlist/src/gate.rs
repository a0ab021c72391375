//! Combinational gates as a single tagged variant.
//!
//! Every supported gate is a fold over its present inputs followed by an
//! optional complement, so one [`Gate`] struct plus a [`GateKind`] tag
//! covers the whole family. Evaluation follows a speculative-commit
//! protocol: [`Gate::evaluate`] commits the *future* output and keeps the
//! still-observable value in a previous slot, which [`Gate::revert`]
//! restores when the scheduler cancels the pending propagation.

use digisim_common::{define_id, Arena, Logic};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::node::{Node, NodeId};

define_id!(
    /// Opaque ID of a [`Gate`] within its owning circuit.
    GateId
);

/// Maximum number of inputs a single gate record may list.
pub const MAX_GATE_INPUTS: usize = 8;

/// The supported combinational gate functions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum GateKind {
    /// Conjunction of all present inputs.
    And,
    /// Disjunction of all present inputs.
    Or,
    /// Parity of all present inputs.
    Xor,
    /// Complemented conjunction.
    Nand,
    /// Complemented disjunction.
    Nor,
    /// Complemented parity.
    Xnor,
}

impl GateKind {
    /// Resolves a netlist type token (without the leading `.`) to a kind.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "AND" => Some(GateKind::And),
            "OR" => Some(GateKind::Or),
            "XOR" => Some(GateKind::Xor),
            "NAND" => Some(GateKind::Nand),
            "NOR" => Some(GateKind::Nor),
            "XNOR" => Some(GateKind::Xnor),
            _ => None,
        }
    }

    /// Identity element of the fold; also the output for zero present inputs
    /// before the complement is applied.
    fn identity(self) -> bool {
        matches!(self, GateKind::And | GateKind::Nand)
    }

    /// Folds one input bit into the accumulator.
    fn fold(self, acc: bool, bit: bool) -> bool {
        match self {
            GateKind::And | GateKind::Nand => acc & bit,
            GateKind::Or | GateKind::Nor => acc | bit,
            GateKind::Xor | GateKind::Xnor => acc ^ bit,
        }
    }

    /// Whether the folded result is complemented.
    fn inverting(self) -> bool {
        matches!(self, GateKind::Nand | GateKind::Nor | GateKind::Xnor)
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Xor => "XOR",
            GateKind::Nand => "NAND",
            GateKind::Nor => "NOR",
            GateKind::Xnor => "XNOR",
        };
        write!(f, "{name}")
    }
}

/// A combinational gate instance.
///
/// Holds up to [`MAX_GATE_INPUTS`] input node IDs, one output node ID, the
/// rise/fall delays, and the committed/previous output pair used by the
/// speculative-commit protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The boolean function this gate computes.
    pub kind: GateKind,
    /// Input node references, in netlist order. Unused slots are absent.
    pub inputs: Vec<NodeId>,
    /// The driven output node.
    pub output: NodeId,
    /// Propagation delay of a 0→1 output transition, in nanoseconds.
    pub rise_ns: u64,
    /// Propagation delay of a 1→0 output transition, in nanoseconds.
    pub fall_ns: u64,
    committed: bool,
    previous: bool,
}

impl Gate {
    /// Creates a gate with both output slots at logic `0`.
    pub fn new(
        kind: GateKind,
        output: NodeId,
        rise_ns: u64,
        fall_ns: u64,
        inputs: Vec<NodeId>,
    ) -> Self {
        debug_assert!(inputs.len() <= MAX_GATE_INPUTS);
        Self {
            kind,
            inputs,
            output,
            rise_ns,
            fall_ns,
            committed: false,
            previous: false,
        }
    }

    /// Applies the gate function to the current input node values.
    fn compute(&self, nodes: &Arena<NodeId, Node>) -> bool {
        let mut acc = self.kind.identity();
        for &input in &self.inputs {
            acc = self.kind.fold(acc, nodes[input].read().is_one());
        }
        if self.kind.inverting() {
            !acc
        } else {
            acc
        }
    }

    /// Recomputes the output, commits it, and returns `(new_value, delay)`.
    ///
    /// The prior committed output moves into the previous slot. The delay is
    /// the rise delay on a 0→1 transition, the fall delay on 1→0, and zero
    /// when the output is unchanged. Until the returned delay elapses the
    /// committed value is the *future* output; the previous slot holds the
    /// value still observable on the output node.
    pub fn evaluate(&mut self, nodes: &Arena<NodeId, Node>) -> (Logic, u64) {
        let next = self.compute(nodes);
        let delay = match (self.committed, next) {
            (false, true) => self.rise_ns,
            (true, false) => self.fall_ns,
            _ => 0,
        };
        self.previous = self.committed;
        self.committed = next;
        (Logic::from_bool(next), delay)
    }

    /// Speculatively recomputes without committing; `true` iff the output
    /// would differ from the committed value.
    pub fn would_change(&self, nodes: &Arena<NodeId, Node>) -> bool {
        self.compute(nodes) != self.committed
    }

    /// Restores the committed output from the previous slot.
    ///
    /// Only meaningful directly after an [`evaluate`](Self::evaluate) whose
    /// scheduled propagation was cancelled before it fired.
    pub fn revert(&mut self) {
        self.committed = self.previous;
    }

    /// The committed output as a logic level.
    pub fn output_value(&self) -> Logic {
        Logic::from_bool(self.committed)
    }
}
