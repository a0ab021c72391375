//! The discrete-event simulation kernel.
//!
//! [`SimKernel`] drives one simulation run over a borrowed [`Circuit`] in
//! one of two modes:
//!
//! - **Timing** — gate propagations land `delay` nanoseconds after the
//!   evaluation that produced them, with inertial-delay cancellation:
//!   an input change that takes back an in-flight output transition purges
//!   the pending update and reverts the gate's speculative commit, so
//!   pulses shorter than the gate delay never reach the output.
//! - **Functional** — the same machinery with every propagation scheduled
//!   at the current timestamp, and the circuit settled to its quiescent
//!   initial state before stimulus is applied.
//!
//! The kernel builds its fanout tables once at construction, then drains
//! the event queue: node updates commit values, feed combinational fanout
//! through the `would_change`/`purge`/`revert` protocol, and drive
//! flip-flop clock/data bookkeeping; gate evaluations schedule the
//! resulting output transitions.

use std::collections::HashMap;

use digisim_common::{Logic, SimTime};
use digisim_netlist::{Circuit, DffId, GateId, NodeId};

use crate::error::SimError;
use crate::event::Event;
use crate::queue::EventQueue;
use crate::report::{SimReport, TimingViolation, ViolationKind};
use crate::stimulus::Stimulus;
use crate::vcd::WaveformRecorder;

/// Default bound on dispatched events per run.
pub const DEFAULT_EVENT_LIMIT: u64 = 10_000_000;

/// Which delay model a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimMode {
    /// Per-gate rise/fall delays with inertial cancellation; setup/hold
    /// violations are reported.
    Timing,
    /// Zero-delay idealization; setup/hold checking is suppressed.
    Functional,
}

/// One simulation run over a borrowed circuit.
pub struct SimKernel<'a> {
    circuit: &'a mut Circuit,
    mode: SimMode,
    queue: EventQueue,
    now: SimTime,
    fanout: HashMap<NodeId, Vec<GateId>>,
    clk_watch: HashMap<NodeId, Vec<DffId>>,
    d_watch: HashMap<NodeId, Vec<DffId>>,
    violations: Vec<TimingViolation>,
    events_dispatched: u64,
    event_limit: u64,
}

impl<'a> SimKernel<'a> {
    /// Prepares a kernel over `circuit`, building the fanout tables.
    pub fn new(circuit: &'a mut Circuit, mode: SimMode) -> Self {
        let fanout = circuit.fanout_map();
        let mut clk_watch: HashMap<NodeId, Vec<DffId>> = HashMap::new();
        let mut d_watch: HashMap<NodeId, Vec<DffId>> = HashMap::new();
        for (id, ff) in circuit.dffs() {
            clk_watch.entry(ff.clk).or_default().push(id);
            d_watch.entry(ff.d).or_default().push(id);
        }

        Self {
            circuit,
            mode,
            queue: EventQueue::new(),
            now: SimTime::ZERO,
            fanout,
            clk_watch,
            d_watch,
            violations: Vec::new(),
            events_dispatched: 0,
            event_limit: DEFAULT_EVENT_LIMIT,
        }
    }

    /// Overrides the per-run event bound.
    pub fn set_event_limit(&mut self, limit: u64) {
        self.event_limit = limit;
    }

    /// Runs to completion without recording a waveform.
    pub fn run(self, stimulus: &[Stimulus]) -> Result<SimReport, SimError> {
        self.execute(stimulus, None)
    }

    /// Runs to completion, recording every committed value change.
    pub fn run_recorded(
        self,
        stimulus: &[Stimulus],
        recorder: &mut dyn WaveformRecorder,
    ) -> Result<SimReport, SimError> {
        self.execute(stimulus, Some(recorder))
    }

    fn execute(
        mut self,
        stimulus: &[Stimulus],
        mut recorder: Option<&mut dyn WaveformRecorder>,
    ) -> Result<SimReport, SimError> {
        self.seed_initial_transitions();

        match self.mode {
            SimMode::Timing => {
                if let Some(rec) = recorder.as_deref_mut() {
                    self.begin_waveform(rec)?;
                }
                self.ingest(stimulus);
                self.drain(&mut recorder)?;
            }
            SimMode::Functional => {
                // Settle the initial state silently; the waveform opens on
                // the quiescent values, not the all-zero pre-settlement ones.
                self.drain(&mut None)?;
                if let Some(rec) = recorder.as_deref_mut() {
                    self.begin_waveform(rec)?;
                }
                self.ingest(stimulus);
                self.drain(&mut recorder)?;
            }
        }

        if let Some(rec) = recorder {
            rec.finalize()?;
        }

        Ok(SimReport {
            final_time: self.now,
            events_dispatched: self.events_dispatched,
            violations: self.violations,
        })
    }

    /// Evaluates every gate once and queues the transitions forced by the
    /// all-zero initial state (NAND/NOR/XNOR outputs rising).
    fn seed_initial_transitions(&mut self) {
        let gate_ids: Vec<GateId> = self.circuit.gate_ids().collect();
        for gate in gate_ids {
            let (value, delay) = self.circuit.evaluate_gate(gate);
            if delay != 0 {
                let node = self.circuit.gate(gate).output;
                let time = match self.mode {
                    SimMode::Timing => SimTime::from_ns(delay),
                    SimMode::Functional => SimTime::ZERO,
                };
                self.queue.push(time, Event::NodeUpdate { node, value });
            }
        }
    }

    /// Queues the stimulus records.
    ///
    /// Records carrying a reserved (non-driven) level never schedule, and
    /// names that match no circuit node are skipped.
    fn ingest(&mut self, stimulus: &[Stimulus]) {
        for record in stimulus {
            if !record.value.is_driven() {
                continue;
            }
            let Some(node) = self.circuit.node_id(&record.node) else {
                continue;
            };
            self.queue.push(
                record.time,
                Event::NodeUpdate {
                    node,
                    value: record.value,
                },
            );
        }
    }

    /// Writes the waveform header and the initial-value dump from the
    /// circuit's current node values.
    fn begin_waveform(&mut self, recorder: &mut dyn WaveformRecorder) -> Result<(), SimError> {
        let signals: Vec<(NodeId, &str)> = self
            .circuit
            .nodes()
            .iter()
            .map(|(id, node)| (id, node.name()))
            .collect();
        recorder.begin(&signals)?;

        let values: Vec<(NodeId, Logic)> = self
            .circuit
            .nodes()
            .iter()
            .map(|(id, node)| (id, node.read()))
            .collect();
        recorder.dump_initial(&values)?;
        Ok(())
    }

    /// Drains the queue, dispatching events in (time, insertion) order.
    fn drain(
        &mut self,
        recorder: &mut Option<&mut dyn WaveformRecorder>,
    ) -> Result<(), SimError> {
        while let Some((time, event)) = self.queue.pop() {
            self.now = time;
            self.events_dispatched += 1;
            if self.events_dispatched > self.event_limit {
                return Err(SimError::EventLimit {
                    ns: time.ns,
                    limit: self.event_limit,
                });
            }

            match event {
                Event::NodeUpdate { node, value } => {
                    self.apply_node_update(node, value, recorder)?;
                }
                Event::GateEvaluate { gate } => self.evaluate_and_schedule(gate),
            }
        }
        Ok(())
    }

    /// Commits a node value and propagates the change to everything that
    /// reads the node.
    fn apply_node_update(
        &mut self,
        node: NodeId,
        value: Logic,
        recorder: &mut Option<&mut dyn WaveformRecorder>,
    ) -> Result<(), SimError> {
        let before = self.circuit.node(node).read();
        self.circuit.write_node(node, value);
        let after = self.circuit.node(node).read();
        if after != before {
            if let Some(rec) = recorder.as_deref_mut() {
                rec.record_change(self.now, node, after)?;
            }
        }

        // Combinational fanout: a reader whose output would now differ has
        // its pending propagation cancelled (reverting the speculative
        // commit, once per removed update) and is re-evaluated at the
        // current time. A reader whose pending output still stands keeps
        // its original schedule.
        let readers: Vec<GateId> = self.fanout.get(&node).cloned().unwrap_or_default();
        for gate in readers {
            if self.circuit.gate_would_change(gate) {
                let output = self.circuit.gate(gate).output;
                let removed = self.queue.purge_node_updates(output);
                for _ in 0..removed {
                    self.circuit.revert_gate(gate);
                }
                self.queue.push(self.now, Event::GateEvaluate { gate });
            }
        }

        // Clock edges are examined as soon as the clock node commits, so a
        // D change landing at the same instant checks its hold window
        // against this edge. Q/Qn carry no propagation delay.
        let clocked: Vec<DffId> = self.clk_watch.get(&node).cloned().unwrap_or_default();
        for dff in clocked {
            if let Some(edge) = self.circuit.clock_dff(dff, self.now) {
                if edge.setup_violation && self.mode == SimMode::Timing {
                    let node = self.q_name(dff);
                    self.violations.push(TimingViolation {
                        kind: ViolationKind::Setup,
                        time: self.now,
                        node,
                    });
                }
                let (q, qn) = {
                    let ff = self.circuit.dff(dff);
                    (ff.q, ff.qn)
                };
                self.queue.push(
                    self.now,
                    Event::NodeUpdate {
                        node: q,
                        value: edge.q,
                    },
                );
                self.queue.push(
                    self.now,
                    Event::NodeUpdate {
                        node: qn,
                        value: edge.qn,
                    },
                );
            }
        }

        let data_changed: Vec<DffId> = self.d_watch.get(&node).cloned().unwrap_or_default();
        for dff in data_changed {
            let hold_violated = self.circuit.data_dff(dff, self.now);
            if hold_violated && self.mode == SimMode::Timing {
                let node = self.q_name(dff);
                self.violations.push(TimingViolation {
                    kind: ViolationKind::Hold,
                    time: self.now,
                    node,
                });
            }
        }

        Ok(())
    }

    /// Evaluates a gate and schedules the resulting output transition.
    fn evaluate_and_schedule(&mut self, gate: GateId) {
        let (value, delay) = self.circuit.evaluate_gate(gate);
        if delay != 0 {
            let node = self.circuit.gate(gate).output;
            let time = match self.mode {
                SimMode::Timing => self.now + delay,
                SimMode::Functional => self.now,
            };
            self.queue.push(time, Event::NodeUpdate { node, value });
        }
    }

    fn q_name(&self, dff: DffId) -> String {
        self.circuit.node(self.circuit.dff(dff).q).name().to_string()
    }
}
