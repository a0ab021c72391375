//! Netlist data model for the DigiSim logic simulator.
//!
//! A [`Circuit`] is parsed from a plaintext netlist: one gate or flip-flop
//! per line, nodes created lazily on first reference. Entities live in
//! dense arenas and reference each other through `u32` ID newtypes, so a
//! circuit is a plain value — cheap to clone, which the fault generator
//! relies on to mass-produce stuck-at variants.
//!
//! # Modules
//!
//! - `node` — named 1-bit signals with a stuck-at lock
//! - `gate` — the combinational gate variant (AND/OR/XOR/NAND/NOR/XNOR)
//! - `dff` — D flip-flops with setup/hold bookkeeping
//! - `circuit` — netlist parsing, I/O classification, connectivity maps
//! - `error` — parse failure taxonomy

#![warn(missing_docs)]

pub mod circuit;
pub mod dff;
pub mod error;
pub mod gate;
pub mod node;

pub use circuit::{Circuit, ParseWarning};
pub use dff::{ClockEdge, DffId, FlipFlop};
pub use error::NetlistError;
pub use gate::{Gate, GateId, GateKind, MAX_GATE_INPUTS};
pub use node::{Node, NodeId};
