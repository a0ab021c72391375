//! Shared foundation types for the DigiSim logic simulator.
//!
//! This crate holds the types every other DigiSim crate builds on:
//!
//! - [`Logic`] — the scalar logic level carried by circuit nodes
//! - [`Arena`] / [`ArenaId`] — dense, ID-indexed storage for netlist entities
//! - [`SimTime`] — nanosecond-resolution simulation timestamps

#![warn(missing_docs)]

pub mod arena;
pub mod logic;
pub mod time;

pub use arena::{Arena, ArenaId};
pub use logic::Logic;
pub use time::SimTime;
