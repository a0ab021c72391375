//! Stuck-at fault vector generation for the DigiSim logic simulator.
//!
//! A [`FaultGenerator`] owns one good circuit plus an independent faulty
//! copy for every (node, stuck level) pair, scores random input patterns
//! by how many faulty copies they expose, and greedily accepts the best
//! pattern per round until a requested coverage target is met. Accepted
//! vectors are written in the `FaultVectors.txt` text format.

#![warn(missing_docs)]

pub mod error;
pub mod generator;

pub use error::FaultGenError;
pub use generator::{
    FaultGenerator, FaultReport, SelectedVector, StuckFault, DEFAULT_MAX_DRY_ROUNDS,
};
