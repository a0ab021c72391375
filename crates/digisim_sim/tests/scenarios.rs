//! End-to-end simulation scenarios over small hand-checked circuits.

use digisim_common::Logic;
use digisim_netlist::Circuit;
use digisim_sim::{
    parse_stimulus_str, SimKernel, SimMode, VcdRecorder, ViolationKind,
};

fn circuit(netlist: &str) -> Circuit {
    let (circuit, warnings) = Circuit::parse_str(netlist).unwrap();
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    circuit
}

fn run_vcd(netlist: &str, stimulus: &str, mode: SimMode) -> (Circuit, String) {
    let mut c = circuit(netlist);
    let (records, warnings) = parse_stimulus_str(stimulus);
    assert!(warnings.is_empty());
    let mut rec = VcdRecorder::new(Vec::new());
    SimKernel::new(&mut c, mode)
        .run_recorded(&records, &mut rec)
        .unwrap();
    let text = String::from_utf8(rec.into_inner()).unwrap();
    (c, text)
}

/// Everything from `$dumpvars` on: the header carries a wall-clock stamp.
fn body(vcd: &str) -> &str {
    let start = vcd.find("$dumpvars").expect("VCD has a dumpvars block");
    &vcd[start..]
}

fn value(circuit: &Circuit, name: &str) -> Logic {
    circuit.node(circuit.node_id(name).unwrap()).read()
}

#[test]
fn inertial_glitch_is_suppressed_on_and_gate() {
    // The 5→6 pulse on B is shorter than Y's 3 ns rise delay.
    let (c, vcd) = run_vcd(
        "Y .AND 3 3 A B\n",
        "0 A 1\n0 B 0\n5 B 1\n6 B 0\n",
        SimMode::Timing,
    );
    assert_eq!(value(&c, "Y"), Logic::Zero);

    // Y is registered first (s1): the waveform must contain no Y records
    // past the initial dump.
    assert!(vcd.contains("$var wire 1 s1 Y $end"));
    assert!(!body(&vcd).contains("1s1"));
    assert!(body(&vcd).starts_with("$dumpvars\n0s1\n"));
}

#[test]
fn nand_initial_state_rises_after_rise_delay() {
    let (c, vcd) = run_vcd("Y .NAND 2 2 A B\n", "", SimMode::Timing);
    assert_eq!(value(&c, "Y"), Logic::One);
    assert_eq!(value(&c, "A"), Logic::Zero);
    assert_eq!(value(&c, "B"), Logic::Zero);

    // Dump shows the pre-settlement zeros, then Y (s1) rises at #2.
    assert_eq!(
        body(&vcd),
        "$dumpvars\n0s1\n0s2\n0s3\n$end\n#2\n1s1\n"
    );
}

#[test]
fn dff_captures_data_on_rising_edge() {
    let (c, _) = run_vcd(
        "Q .DFF 1 1 D CLK Q Qn\n",
        "0 D 1\n5 CLK 1\n10 CLK 0\n",
        SimMode::Timing,
    );
    assert_eq!(value(&c, "Q"), Logic::One);
    assert_eq!(value(&c, "Qn"), Logic::Zero);
}

#[test]
fn dff_capture_reports_no_violation_when_windows_are_met() {
    let mut c = circuit("Q .DFF 1 1 D CLK Q Qn\n");
    let (records, _) = parse_stimulus_str("0 D 1\n5 CLK 1\n10 CLK 0\n");
    let report = SimKernel::new(&mut c, SimMode::Timing)
        .run(&records)
        .unwrap();
    assert!(report.violations.is_empty());
}

#[test]
fn hold_violation_in_timing_mode_only() {
    let stimulus = "5 CLK 1\n5 D 1\n";

    let mut timing = circuit("Q .DFF 1 1 D CLK Q Qn\n");
    let (records, _) = parse_stimulus_str(stimulus);
    let report = SimKernel::new(&mut timing, SimMode::Timing)
        .run(&records)
        .unwrap();
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].kind, ViolationKind::Hold);
    assert_eq!(report.violations[0].time.ns, 5);
    assert_eq!(report.violations[0].node, "Q");
    assert_eq!(
        report.violations[0].to_string(),
        "ERROR: hold time violation at time 5 on Q output node Q"
    );

    let mut functional = circuit("Q .DFF 1 1 D CLK Q Qn\n");
    let report = SimKernel::new(&mut functional, SimMode::Functional)
        .run(&records)
        .unwrap();
    assert!(report.violations.is_empty());
}

#[test]
fn three_gate_cascade_timing() {
    let (c, vcd) = run_vcd(
        "X .AND 2 2 A B\nY .OR 3 3 X C\n",
        "0 A 1\n0 B 1\n0 C 0\n",
        SimMode::Timing,
    );
    assert_eq!(value(&c, "X"), Logic::One);
    assert_eq!(value(&c, "Y"), Logic::One);

    // Node registration order: X, A, B, Y, C → X is s1, Y is s4.
    assert!(vcd.contains("$var wire 1 s1 X $end"));
    assert!(vcd.contains("$var wire 1 s4 Y $end"));
    let b = body(&vcd);
    let x_at_2 = b.find("#2\n1s1").expect("X rises at t=2");
    let y_at_5 = b.find("#5\n1s4").expect("Y rises at t=5");
    assert!(x_at_2 < y_at_5);
}

#[test]
fn functional_run_is_deterministic() {
    let netlist = "X .NAND 2 2 A B\nY .OR 1 1 X C\n";
    let stimulus = "0 A 1\n3 B 1\n7 C 1\n9 A 0\n";
    let (_, first) = run_vcd(netlist, stimulus, SimMode::Functional);
    let (_, second) = run_vcd(netlist, stimulus, SimMode::Functional);
    assert_eq!(body(&first), body(&second));
}

#[test]
fn unstuck_run_matches_never_stuck_baseline() {
    let netlist = "Y .NAND 2 2 A B\n";
    let stimulus = "4 A 1\n6 B 1\n";
    let (records, _) = parse_stimulus_str(stimulus);

    let run = |c: &mut Circuit| {
        let mut rec = VcdRecorder::new(Vec::new());
        SimKernel::new(c, SimMode::Functional)
            .run_recorded(&records, &mut rec)
            .unwrap();
        String::from_utf8(rec.into_inner()).unwrap()
    };

    let mut baseline = circuit(netlist);
    let baseline_vcd = run(&mut baseline);

    let mut stuck = circuit(netlist);
    stuck.lock_node("Y", Logic::Zero);
    let stuck_vcd = run(&mut stuck);

    let mut round_trip = circuit(netlist);
    round_trip.lock_node("Y", Logic::Zero);
    round_trip.unlock_node("Y");
    let round_trip_vcd = run(&mut round_trip);

    assert_ne!(body(&baseline_vcd), body(&stuck_vcd));
    assert_eq!(body(&baseline_vcd), body(&round_trip_vcd));
}

#[test]
fn xnor_seeds_initial_rise_like_nand() {
    let (c, vcd) = run_vcd("Y .XNOR 4 4 A B\n", "", SimMode::Timing);
    assert_eq!(value(&c, "Y"), Logic::One);
    assert!(body(&vcd).contains("#4\n1s1"));
}

#[test]
fn cancelled_propagation_leaves_gate_consistent() {
    // B pulses high for 1 ns against a 3 ns rise delay; afterwards a long
    // assertion of B must still propagate normally.
    let netlist = "Y .AND 3 3 A B\n";
    let stimulus = "0 A 1\n5 B 1\n6 B 0\n20 B 1\n";
    let (c, vcd) = run_vcd(netlist, stimulus, SimMode::Timing);
    assert_eq!(value(&c, "Y"), Logic::One);
    assert!(body(&vcd).contains("#23\n1s1"), "Y rises at 20+3: {vcd}");
}
