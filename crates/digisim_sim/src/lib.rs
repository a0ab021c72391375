//! Event-driven simulation engine for the DigiSim logic simulator.
//!
//! Consumes a parsed [`Circuit`](digisim_netlist::Circuit) and a stimulus
//! record list, and drives a discrete-event loop in one of two modes:
//! *timing* (per-gate rise/fall delays, inertial-delay glitch
//! cancellation, setup/hold checking) or *functional* (zero-delay
//! idealization). Committed value changes stream to a VCD waveform.
//!
//! # Usage
//!
//! ```ignore
//! use digisim_sim::{simulate, SimMode};
//!
//! let report = simulate(&mut circuit, SimMode::Timing, &stimulus, Some(path))?;
//! for violation in &report.violations {
//!     eprintln!("{violation}");
//! }
//! ```
//!
//! # Modules
//!
//! - `event` — the schedulable event variants
//! - `queue` — time-ordered queue with FIFO tie-break and targeted purge
//! - `stimulus` — stimulus file parsing
//! - `kernel` — the simulation loop
//! - `vcd` — waveform recording
//! - `report` — run results and timing violations
//! - `error` — failure taxonomy

#![warn(missing_docs)]

pub mod error;
pub mod event;
pub mod kernel;
pub mod queue;
pub mod report;
pub mod stimulus;
pub mod vcd;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use digisim_netlist::Circuit;

pub use error::SimError;
pub use event::Event;
pub use kernel::{SimKernel, SimMode, DEFAULT_EVENT_LIMIT};
pub use queue::EventQueue;
pub use report::{SimReport, TimingViolation, ViolationKind};
pub use stimulus::{parse_stimulus_path, parse_stimulus_str, Stimulus, StimulusWarning};
pub use vcd::{VcdRecorder, WaveformRecorder};

/// High-level entry point: runs one simulation over `circuit`.
///
/// When `waveform_path` is given, committed value changes are streamed to
/// that file as VCD text; otherwise the run leaves no waveform. The
/// circuit is left in its post-simulation state so terminal node values
/// can be inspected.
pub fn simulate(
    circuit: &mut Circuit,
    mode: SimMode,
    stimulus: &[Stimulus],
    waveform_path: Option<&Path>,
) -> Result<SimReport, SimError> {
    let kernel = SimKernel::new(circuit, mode);
    match waveform_path {
        Some(path) => {
            let file = File::create(path)?;
            let mut recorder = VcdRecorder::new(BufWriter::new(file));
            kernel.run_recorded(stimulus, &mut recorder)
        }
        None => kernel.run(stimulus),
    }
}
