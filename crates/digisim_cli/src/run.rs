//! The three operations the CLI can perform.
//!
//! Each operation parses the netlist fresh, runs the requested engine, and
//! writes its output file into the working directory: timing and
//! functional simulations produce VCD waveforms, fault generation produces
//! the plaintext vector list. Parse warnings and timing violations go to
//! stderr; status lines are suppressed by `--quiet`.

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use digisim_fault::FaultGenerator;
use digisim_netlist::Circuit;
use digisim_sim::{parse_stimulus_path, simulate, SimMode};

/// Waveform file written by a timing simulation.
pub const TIMING_WAVEFORM_FILE: &str = "TimingSimOutput.vcd";
/// Waveform file written by a functional simulation.
pub const FUNCTIONAL_WAVEFORM_FILE: &str = "FunctionalSimOutput.vcd";
/// Vector list written by fault generation.
pub const FAULT_VECTOR_FILE: &str = "FaultVectors.txt";

/// Runs a timing simulation, writing [`TIMING_WAVEFORM_FILE`].
pub fn run_timing(netlist: &Path, stimulus: &Path, quiet: bool) -> Result<i32, Box<dyn Error>> {
    waveform_sim(
        netlist,
        stimulus,
        SimMode::Timing,
        Path::new(TIMING_WAVEFORM_FILE),
        quiet,
    )
}

/// Runs a functional simulation, writing [`FUNCTIONAL_WAVEFORM_FILE`].
pub fn run_functional(netlist: &Path, stimulus: &Path, quiet: bool) -> Result<i32, Box<dyn Error>> {
    waveform_sim(
        netlist,
        stimulus,
        SimMode::Functional,
        Path::new(FUNCTIONAL_WAVEFORM_FILE),
        quiet,
    )
}

/// Runs fault vector generation, writing [`FAULT_VECTOR_FILE`].
pub fn run_faults(
    netlist: &Path,
    coverage_pct: f64,
    seed: Option<u64>,
    quiet: bool,
) -> Result<i32, Box<dyn Error>> {
    faults_to(
        netlist,
        coverage_pct,
        seed,
        Path::new(FAULT_VECTOR_FILE),
        quiet,
    )
}

pub(crate) fn waveform_sim(
    netlist: &Path,
    stimulus: &Path,
    mode: SimMode,
    out_path: &Path,
    quiet: bool,
) -> Result<i32, Box<dyn Error>> {
    let label = match mode {
        SimMode::Timing => "Timing",
        SimMode::Functional => "Functional",
    };
    if !quiet {
        eprintln!("Starting {label} Simulation");
    }

    let (mut circuit, warnings) = Circuit::from_path(netlist)?;
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }

    let (records, stim_warnings) = parse_stimulus_path(stimulus)?;
    for warning in &stim_warnings {
        eprintln!("warning: {warning}");
    }

    let report = simulate(&mut circuit, mode, &records, Some(out_path))?;

    for violation in &report.violations {
        eprintln!("{violation}");
    }

    if !quiet {
        if mode == SimMode::Timing {
            println!("Final Node Values:");
            for (_, node) in circuit.nodes().iter() {
                println!("{} {}", node.name(), node.read());
            }
        }
        eprintln!(
            "Simulation finished at {} ({} events); waveform written to {}",
            report.final_time,
            report.events_dispatched,
            out_path.display()
        );
    }

    Ok(0)
}

pub(crate) fn faults_to(
    netlist: &Path,
    coverage_pct: f64,
    seed: Option<u64>,
    out_path: &Path,
    quiet: bool,
) -> Result<i32, Box<dyn Error>> {
    let mut generator = FaultGenerator::from_path(netlist)?;
    if let Some(seed) = seed {
        generator = generator.with_seed(seed);
    }

    let file = File::create(out_path)?;
    let mut writer = BufWriter::new(file);
    let report = generator.generate(coverage_pct, &mut writer)?;
    writer.flush()?;

    if !quiet {
        for vector in &report.vectors {
            println!("Total Coverage: {}%", vector.coverage_after * 100.0);
        }
        eprintln!(
            "{} vector(s) covering {}/{} faults written to {}",
            report.vectors.len(),
            report.total_faults - generator.remaining_faults(),
            report.total_faults,
            out_path.display()
        );
    }

    Ok(0)
}
