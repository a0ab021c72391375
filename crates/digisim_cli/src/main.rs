//! DigiSim — command-line gate-level logic simulator.
//!
//! Runs one of three operations on a plaintext netlist: a timing
//! simulation (`TimingSimOutput.vcd`), a functional simulation
//! (`FunctionalSimOutput.vcd`), or stuck-at fault vector generation
//! (`FaultVectors.txt`). Every parameter can be given as a flag; anything
//! missing is asked for interactively, walking the classic prompt chain:
//! timing first, then functional, then fault generation.

#![warn(missing_docs)]

mod prompt;
mod run;

use std::error::Error;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;

use clap::Parser;

/// DigiSim — gate-level timing/functional simulation and fault vector
/// generation.
#[derive(Parser, Debug)]
#[command(name = "digisim", version, about = "DigiSim Digital Logic Simulator")]
pub struct Cli {
    /// Netlist file path. Prompted for when omitted.
    pub netlist: Option<PathBuf>,

    /// Run a timing simulation without prompting.
    #[arg(long, conflicts_with_all = ["functional", "faults"])]
    pub timing: bool,

    /// Run a functional simulation without prompting.
    #[arg(long, conflicts_with = "faults")]
    pub functional: bool,

    /// Run fault vector generation without prompting.
    #[arg(long)]
    pub faults: bool,

    /// Stimulus file for a timing or functional simulation.
    #[arg(long)]
    pub stimulus: Option<PathBuf>,

    /// Required fault coverage percentage (0-100) for fault generation.
    #[arg(long)]
    pub coverage: Option<f64>,

    /// PRNG seed for reproducible fault vector generation.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Suppress status output.
    #[arg(short, long)]
    pub quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let stdin = io::stdin();
    match dispatch(&cli, &mut stdin.lock()) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Resolves missing parameters via prompts and runs the selected
/// operation. Returns the process exit code.
fn dispatch(cli: &Cli, input: &mut impl BufRead) -> Result<i32, Box<dyn Error>> {
    let netlist = match &cli.netlist {
        Some(path) => path.clone(),
        None => PathBuf::from(prompt::prompt_line(input, "Enter netlist file: ")?),
    };

    if cli.timing {
        let stimulus = stimulus_path(cli, input)?;
        return run::run_timing(&netlist, &stimulus, cli.quiet);
    }
    if cli.functional {
        let stimulus = stimulus_path(cli, input)?;
        return run::run_functional(&netlist, &stimulus, cli.quiet);
    }
    if cli.faults {
        let coverage = coverage_pct(cli, input)?;
        return run::run_faults(&netlist, coverage, cli.seed, cli.quiet);
    }

    // Interactive chain: each stage is only offered after the previous one
    // is declined.
    if prompt::prompt_yes_no(input, "Run Timing Simulation? [y/n]: ")? {
        let stimulus = stimulus_path(cli, input)?;
        return run::run_timing(&netlist, &stimulus, cli.quiet);
    }
    println!("Skipping Timing Simulation");

    if prompt::prompt_yes_no(input, "Run Functional Simulation? [y/n]: ")? {
        let stimulus = stimulus_path(cli, input)?;
        return run::run_functional(&netlist, &stimulus, cli.quiet);
    }
    println!("Skipping Functional Simulation");

    if prompt::prompt_yes_no(input, "Run Fault Vector Generation? [y/n]: ")? {
        let coverage = coverage_pct(cli, input)?;
        return run::run_faults(&netlist, coverage, cli.seed, cli.quiet);
    }
    println!("Skipping Fault Vector Generation");

    Ok(0)
}

fn stimulus_path(cli: &Cli, input: &mut impl BufRead) -> Result<PathBuf, Box<dyn Error>> {
    match &cli.stimulus {
        Some(path) => Ok(path.clone()),
        None => Ok(PathBuf::from(prompt::prompt_line(
            input,
            "Enter input file: ",
        )?)),
    }
}

fn coverage_pct(cli: &Cli, input: &mut impl BufRead) -> Result<f64, Box<dyn Error>> {
    match cli.coverage {
        Some(value) => Ok(value),
        None => Ok(prompt::prompt_coverage(input)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn parse_bare_invocation() {
        let cli = Cli::parse_from(["digisim"]);
        assert!(cli.netlist.is_none());
        assert!(!cli.timing);
        assert!(!cli.functional);
        assert!(!cli.faults);
        assert!(cli.stimulus.is_none());
        assert!(cli.coverage.is_none());
        assert!(cli.seed.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn parse_timing_flags() {
        let cli = Cli::parse_from([
            "digisim",
            "netlist.txt",
            "--timing",
            "--stimulus",
            "stim.txt",
        ]);
        assert_eq!(cli.netlist.as_deref(), Some(std::path::Path::new("netlist.txt")));
        assert!(cli.timing);
        assert_eq!(cli.stimulus.as_deref(), Some(std::path::Path::new("stim.txt")));
    }

    #[test]
    fn parse_fault_flags() {
        let cli = Cli::parse_from([
            "digisim",
            "netlist.txt",
            "--faults",
            "--coverage",
            "95",
            "--seed",
            "7",
        ]);
        assert!(cli.faults);
        assert_eq!(cli.coverage, Some(95.0));
        assert_eq!(cli.seed, Some(7));
    }

    #[test]
    fn timing_conflicts_with_functional() {
        let result = Cli::try_parse_from(["digisim", "n.txt", "--timing", "--functional"]);
        assert!(result.is_err());
    }

    #[test]
    fn functional_conflicts_with_faults() {
        let result = Cli::try_parse_from(["digisim", "n.txt", "--functional", "--faults"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_quiet_short_flag() {
        let cli = Cli::parse_from(["digisim", "-q", "n.txt"]);
        assert!(cli.quiet);
    }

    #[test]
    fn declining_everything_exits_cleanly() {
        let dir = TempDir::new().unwrap();
        let netlist = dir.path().join("netlist.txt");
        fs::write(&netlist, "Y .AND 1 1 A B\n").unwrap();

        let cli = Cli::parse_from(["digisim", netlist.to_str().unwrap()]);
        let mut answers = Cursor::new("n\nn\nn\n");
        let code = dispatch(&cli, &mut answers).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn netlist_prompted_when_omitted() {
        let dir = TempDir::new().unwrap();
        let netlist = dir.path().join("netlist.txt");
        fs::write(&netlist, "Y .AND 1 1 A B\n").unwrap();

        let cli = Cli::parse_from(["digisim"]);
        let script = format!("{}\nn\nn\nn\n", netlist.display());
        let mut answers = Cursor::new(script);
        assert_eq!(dispatch(&cli, &mut answers).unwrap(), 0);
    }

    #[test]
    fn garbled_yes_no_answers_are_reasked() {
        let dir = TempDir::new().unwrap();
        let netlist = dir.path().join("netlist.txt");
        fs::write(&netlist, "Y .AND 1 1 A B\n").unwrap();

        let cli = Cli::parse_from(["digisim", netlist.to_str().unwrap()]);
        let mut answers = Cursor::new("what\nn\nn\nn\n");
        assert_eq!(dispatch(&cli, &mut answers).unwrap(), 0);
    }

    #[test]
    fn closed_stdin_is_an_error() {
        let cli = Cli::parse_from(["digisim"]);
        let mut answers = Cursor::new("");
        assert!(dispatch(&cli, &mut answers).is_err());
    }
}
