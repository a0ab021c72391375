//! Circuit construction from netlist text, plus connectivity queries.
//!
//! Netlist records are whitespace-separated, one component per line:
//!
//! ```text
//! <out> .<GATE>  <rise> <fall>   <in1> [<in2> ... <in8>]
//! <q>   .DFF     <setup> <hold>  <d> <clk> <q> <qn>
//! ```
//!
//! Lines starting with `#` are comments. A node is created the first time
//! its name is referenced and reused afterwards. After the whole file is
//! read, nodes are classified once: a node is a circuit *input* iff it
//! never appears on the driven side of any component, and a circuit
//! *output* iff it never feeds any component.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use digisim_common::{Arena, Logic, SimTime};
use serde::{Deserialize, Serialize};

use crate::dff::{ClockEdge, DffId, FlipFlop};
use crate::error::NetlistError;
use crate::gate::{Gate, GateId, GateKind, MAX_GATE_INPUTS};
use crate::node::{Node, NodeId};

/// A non-fatal oddity found while parsing a netlist.
///
/// Unknown component types are skipped rather than rejected, so a netlist
/// written for a richer tool still loads; the warning keeps the skip from
/// being silent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based line number the warning refers to.
    pub line: usize,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "netlist line {}: {}", self.line, self.message)
    }
}

/// A parsed gate-level circuit.
///
/// Owns the node arena, the gate and flip-flop lists, and the input/output
/// classification. All cross-references are arena IDs, so `Clone` yields a
/// fully independent circuit with identical IDs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    nodes: Arena<NodeId, Node>,
    gates: Arena<GateId, Gate>,
    dffs: Arena<DffId, FlipFlop>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    by_name: HashMap<String, NodeId>,
}

impl Circuit {
    /// Parses a netlist from text.
    ///
    /// Returns the circuit together with any non-fatal parse warnings.
    pub fn parse_str(text: &str) -> Result<(Self, Vec<ParseWarning>), NetlistError> {
        let mut circuit = Circuit {
            nodes: Arena::new(),
            gates: Arena::new(),
            dffs: Arena::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            by_name: HashMap::new(),
        };
        let mut warnings = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            circuit.parse_record(line, line_no, &mut warnings)?;
        }

        circuit.classify_io();
        Ok((circuit, warnings))
    }

    /// Reads and parses a netlist file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<(Self, Vec<ParseWarning>), NetlistError> {
        let text = fs::read_to_string(path)?;
        Self::parse_str(&text)
    }

    /// Parses one non-comment record.
    fn parse_record(
        &mut self,
        line: &str,
        line_no: usize,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<(), NetlistError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 2 {
            return Err(NetlistError::IncompleteRecord {
                line: line_no,
                expected: "<out> .<TYPE> ...",
            });
        }

        let Some(type_token) = tokens[1].strip_prefix('.') else {
            warnings.push(ParseWarning {
                line: line_no,
                message: format!("type field '{}' does not start with '.'; line skipped", tokens[1]),
            });
            return Ok(());
        };

        if type_token == "DFF" {
            self.parse_dff(&tokens, line_no)
        } else if let Some(kind) = GateKind::from_token(type_token) {
            self.parse_gate(kind, &tokens, line_no, warnings)
        } else {
            warnings.push(ParseWarning {
                line: line_no,
                message: format!("unknown component type '.{type_token}'; line skipped"),
            });
            Ok(())
        }
    }

    /// Parses `<out> .<GATE> <rise> <fall> <in1> [... <in8>]`.
    fn parse_gate(
        &mut self,
        kind: GateKind,
        tokens: &[&str],
        line_no: usize,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<(), NetlistError> {
        if tokens.len() < 4 {
            return Err(NetlistError::IncompleteRecord {
                line: line_no,
                expected: "<out> .<GATE> <rise> <fall> <in1> ...",
            });
        }

        let rise_ns = parse_delay(tokens[2], line_no)?;
        let fall_ns = parse_delay(tokens[3], line_no)?;

        let output = self.intern_node(tokens[0]);

        let mut input_tokens = &tokens[4..];
        if input_tokens.len() > MAX_GATE_INPUTS {
            warnings.push(ParseWarning {
                line: line_no,
                message: format!(
                    "gate lists {} inputs; only the first {MAX_GATE_INPUTS} are used",
                    input_tokens.len()
                ),
            });
            input_tokens = &input_tokens[..MAX_GATE_INPUTS];
        }
        let inputs: Vec<NodeId> = input_tokens.iter().map(|n| self.intern_node(n)).collect();

        self.gates
            .alloc(Gate::new(kind, output, rise_ns, fall_ns, inputs));
        Ok(())
    }

    /// Parses `<q> .DFF <setup> <hold> <d> <clk> <q> <qn>`.
    fn parse_dff(&mut self, tokens: &[&str], line_no: usize) -> Result<(), NetlistError> {
        if tokens.len() < 8 {
            return Err(NetlistError::IncompleteRecord {
                line: line_no,
                expected: "<q> .DFF <setup> <hold> <d> <clk> <q> <qn>",
            });
        }

        let setup_ns = parse_timing(tokens[2], line_no)?;
        let hold_ns = parse_timing(tokens[3], line_no)?;

        // The leading field repeats the Q name; intern it regardless so an
        // inconsistent record still creates every referenced node.
        self.intern_node(tokens[0]);
        let d = self.intern_node(tokens[4]);
        let clk = self.intern_node(tokens[5]);
        let q = self.intern_node(tokens[6]);
        let qn = self.intern_node(tokens[7]);

        self.dffs
            .alloc(FlipFlop::new(d, clk, q, qn, setup_ns, hold_ns));
        Ok(())
    }

    /// Returns the ID for `name`, creating the node on first reference.
    fn intern_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.nodes.alloc(Node::new(name));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Classifies every node as circuit input, circuit output, both, or
    /// neither. Runs exactly once, after parsing completes.
    fn classify_io(&mut self) {
        let n = self.nodes.len();
        let mut drives_something = vec![false; n];
        let mut driven_by_something = vec![false; n];

        for gate in self.gates.values() {
            driven_by_something[gate.output.as_index()] = true;
            for &input in &gate.inputs {
                drives_something[input.as_index()] = true;
            }
        }
        for ff in self.dffs.values() {
            driven_by_something[ff.q.as_index()] = true;
            driven_by_something[ff.qn.as_index()] = true;
            drives_something[ff.d.as_index()] = true;
            drives_something[ff.clk.as_index()] = true;
        }

        self.inputs = self
            .nodes
            .ids()
            .filter(|id| !driven_by_something[id.as_index()])
            .collect();
        self.outputs = self
            .nodes
            .ids()
            .filter(|id| !drives_something[id.as_index()])
            .collect();
        self.inputs
            .sort_by(|a, b| self.nodes[*a].name().cmp(self.nodes[*b].name()));
        self.outputs
            .sort_by(|a, b| self.nodes[*a].name().cmp(self.nodes[*b].name()));
    }

    // ---- node access ----

    /// Looks up a node by netlist name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Borrows a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Writes a node value, honoring the stuck-at lock.
    pub fn write_node(&mut self, id: NodeId, value: Logic) {
        self.nodes[id].write(value);
    }

    /// The node arena, for gate evaluation and bulk inspection.
    pub fn nodes(&self) -> &Arena<NodeId, Node> {
        &self.nodes
    }

    /// Number of nodes in the circuit.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All node names, in first-reference order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.values().map(Node::name)
    }

    /// Locks the named node at `value` (stuck-at injection).
    ///
    /// Returns `false` when no node has that name.
    pub fn lock_node(&mut self, name: &str, value: Logic) -> bool {
        match self.node_id(name) {
            Some(id) => {
                self.nodes[id].lock(value);
                true
            }
            None => false,
        }
    }

    /// Clears the stuck-at lock on the named node, if it exists.
    pub fn unlock_node(&mut self, name: &str) -> bool {
        match self.node_id(name) {
            Some(id) => {
                self.nodes[id].unlock();
                true
            }
            None => false,
        }
    }

    // ---- component access ----

    /// Borrows a gate.
    pub fn gate(&self, id: GateId) -> &Gate {
        &self.gates[id]
    }

    /// Iterates `(GateId, &Gate)` pairs.
    pub fn gates(&self) -> impl Iterator<Item = (GateId, &Gate)> {
        self.gates.iter()
    }

    /// Gate IDs in netlist order.
    pub fn gate_ids(&self) -> impl Iterator<Item = GateId> + '_ {
        self.gates.ids()
    }

    /// Number of combinational gates.
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Borrows a flip-flop.
    pub fn dff(&self, id: DffId) -> &FlipFlop {
        &self.dffs[id]
    }

    /// Iterates `(DffId, &FlipFlop)` pairs.
    pub fn dffs(&self) -> impl Iterator<Item = (DffId, &FlipFlop)> {
        self.dffs.iter()
    }

    /// Number of flip-flops.
    pub fn dff_count(&self) -> usize {
        self.dffs.len()
    }

    // ---- component operations (split-borrow wrappers) ----

    /// Evaluates a gate against the current node values and commits the
    /// result; returns `(new_value, delay)`.
    pub fn evaluate_gate(&mut self, id: GateId) -> (Logic, u64) {
        self.gates[id].evaluate(&self.nodes)
    }

    /// Whether re-evaluating the gate now would change its committed output.
    pub fn gate_would_change(&self, id: GateId) -> bool {
        self.gates[id].would_change(&self.nodes)
    }

    /// Rolls a gate's committed output back to its previous value.
    pub fn revert_gate(&mut self, id: GateId) {
        self.gates[id].revert();
    }

    /// Feeds a clock-node change to a flip-flop; `Some` on a rising edge.
    pub fn clock_dff(&mut self, id: DffId, t: SimTime) -> Option<ClockEdge> {
        self.dffs[id].on_clock_event(t, &self.nodes)
    }

    /// Feeds a data-node change to a flip-flop; `true` on a hold violation.
    pub fn data_dff(&mut self, id: DffId, t: SimTime) -> bool {
        self.dffs[id].on_data_event(t)
    }

    // ---- I/O classification ----

    /// Circuit input nodes, sorted by name.
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Circuit output nodes, sorted by name.
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Input node names, sorted.
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|&id| self.nodes[id].name()).collect()
    }

    /// Output node name → current value, for order-independent comparison
    /// of terminal simulation results.
    pub fn output_values(&self) -> BTreeMap<String, Logic> {
        self.outputs
            .iter()
            .map(|&id| (self.nodes[id].name().to_string(), self.nodes[id].read()))
            .collect()
    }

    /// Builds the fanout map: node → gates reading it as an input.
    ///
    /// A gate listing the same node on several input slots appears once.
    pub fn fanout_map(&self) -> HashMap<NodeId, Vec<GateId>> {
        let mut map: HashMap<NodeId, Vec<GateId>> = HashMap::new();
        for (gate_id, gate) in self.gates.iter() {
            for &input in &gate.inputs {
                let readers = map.entry(input).or_default();
                if readers.last() != Some(&gate_id) {
                    readers.push(gate_id);
                }
            }
        }
        map
    }
}

/// Small extension used by classification to index flat vectors by ID.
trait AsIndex {
    fn as_index(&self) -> usize;
}

impl<T: digisim_common::ArenaId> AsIndex for T {
    fn as_index(&self) -> usize {
        self.as_raw() as usize
    }
}

fn parse_delay(field: &str, line_no: usize) -> Result<u64, NetlistError> {
    field.parse::<u64>().map_err(|_| NetlistError::InvalidDelay {
        line: line_no,
        value: field.to_string(),
    })
}

fn parse_timing(field: &str, line_no: usize) -> Result<f64, NetlistError> {
    match field.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.is_finite() => Ok(v),
        _ => Err(NetlistError::InvalidTiming {
            line: line_no,
            value: field.to_string(),
        }),
    }
}
