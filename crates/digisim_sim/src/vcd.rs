//! Waveform recording in Value Change Dump format.
//!
//! [`WaveformRecorder`] abstracts waveform output so the kernel can run
//! with or without one (the fault generator simulates thousands of runs
//! and records none of them). [`VcdRecorder`] is the concrete IEEE 1364
//! text implementation consumed by GTKWave and friends: signal identifier
//! codes are `s1`, `s2`, … in registration order, and the timescale is
//! fixed at 1 ns to match the simulator's time grid.

use std::collections::HashMap;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use digisim_common::{ArenaId, Logic, SimTime};
use digisim_netlist::NodeId;

use crate::error::SimError;

/// Sink for simulation waveform data.
pub trait WaveformRecorder {
    /// Writes the header and declares every recorded signal, in order.
    fn begin(&mut self, signals: &[(NodeId, &str)]) -> Result<(), SimError>;

    /// Writes the initial-value dump. Called once, after `begin`.
    fn dump_initial(&mut self, values: &[(NodeId, Logic)]) -> Result<(), SimError>;

    /// Records a value change at the given time.
    fn record_change(&mut self, time: SimTime, node: NodeId, value: Logic)
        -> Result<(), SimError>;

    /// Flushes buffered output.
    fn finalize(&mut self) -> Result<(), SimError>;
}

/// VCD text-format recorder.
pub struct VcdRecorder<W: Write> {
    writer: W,
    codes: HashMap<NodeId, String>,
    current_time: Option<u64>,
}

impl<W: Write> VcdRecorder<W> {
    /// Creates a recorder writing VCD text to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            codes: HashMap::new(),
            current_time: None,
        }
    }

    /// Consumes the recorder, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn code_for(codes: &HashMap<NodeId, String>, node: NodeId) -> Result<&str, SimError> {
    codes
        .get(&node)
        .map(String::as_str)
        .ok_or(SimError::UnregisteredNode {
            node_index: node.as_raw(),
        })
}

impl<W: Write> WaveformRecorder for VcdRecorder<W> {
    fn begin(&mut self, signals: &[(NodeId, &str)]) -> Result<(), SimError> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        writeln!(self.writer, "$date")?;
        writeln!(self.writer, "  {stamp}")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$version")?;
        writeln!(self.writer, "  DigiSim Digital Logic Simulator")?;
        writeln!(self.writer, "$end")?;
        writeln!(self.writer, "$timescale 1ns $end")?;
        writeln!(self.writer, "$scope module circuit $end")?;
        for (index, (node, name)) in signals.iter().enumerate() {
            let code = format!("s{}", index + 1);
            writeln!(self.writer, "$var wire 1 {code} {name} $end")?;
            self.codes.insert(*node, code);
        }
        writeln!(self.writer, "$upscope $end")?;
        writeln!(self.writer, "$enddefinitions $end")?;
        Ok(())
    }

    fn dump_initial(&mut self, values: &[(NodeId, Logic)]) -> Result<(), SimError> {
        writeln!(self.writer, "$dumpvars")?;
        for &(node, value) in values {
            let code = code_for(&self.codes, node)?;
            writeln!(self.writer, "{value}{code}")?;
        }
        writeln!(self.writer, "$end")?;
        Ok(())
    }

    fn record_change(
        &mut self,
        time: SimTime,
        node: NodeId,
        value: Logic,
    ) -> Result<(), SimError> {
        let code = code_for(&self.codes, node)?;
        if self.current_time != Some(time.ns) {
            writeln!(self.writer, "#{}", time.ns)?;
            self.current_time = Some(time.ns);
        }
        writeln!(self.writer, "{value}{code}")?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), SimError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(i: u32) -> NodeId {
        NodeId::from_raw(i)
    }

    fn output_of(rec: VcdRecorder<Vec<u8>>) -> String {
        String::from_utf8(rec.into_inner()).unwrap()
    }

    #[test]
    fn header_sections() {
        let mut rec = VcdRecorder::new(Vec::new());
        rec.begin(&[(node(0), "clk")]).unwrap();
        let out = output_of(rec);
        assert!(out.contains("$date"));
        assert!(out.contains("DigiSim Digital Logic Simulator"));
        assert!(out.contains("$timescale 1ns $end"));
        assert!(out.contains("$scope module circuit $end"));
        assert!(out.contains("$upscope $end"));
        assert!(out.contains("$enddefinitions $end"));
    }

    #[test]
    fn signal_codes_are_sequential() {
        let mut rec = VcdRecorder::new(Vec::new());
        rec.begin(&[(node(0), "A"), (node(1), "B"), (node(2), "Y")])
            .unwrap();
        let out = output_of(rec);
        assert!(out.contains("$var wire 1 s1 A $end"));
        assert!(out.contains("$var wire 1 s2 B $end"));
        assert!(out.contains("$var wire 1 s3 Y $end"));
    }

    #[test]
    fn dumpvars_block() {
        let mut rec = VcdRecorder::new(Vec::new());
        rec.begin(&[(node(0), "A"), (node(1), "B")]).unwrap();
        rec.dump_initial(&[(node(0), Logic::Zero), (node(1), Logic::One)])
            .unwrap();
        let out = output_of(rec);
        assert!(out.contains("$dumpvars\n0s1\n1s2\n$end\n"));
    }

    #[test]
    fn change_records_share_timestamp_lines() {
        let mut rec = VcdRecorder::new(Vec::new());
        rec.begin(&[(node(0), "A"), (node(1), "B")]).unwrap();
        rec.dump_initial(&[]).unwrap();
        rec.record_change(SimTime::from_ns(2), node(0), Logic::One)
            .unwrap();
        rec.record_change(SimTime::from_ns(2), node(1), Logic::One)
            .unwrap();
        rec.record_change(SimTime::from_ns(5), node(0), Logic::Zero)
            .unwrap();
        rec.finalize().unwrap();
        let out = output_of(rec);
        assert!(out.contains("#2\n1s1\n1s2\n#5\n0s1\n"));
        assert_eq!(out.matches("#2").count(), 1);
    }

    #[test]
    fn change_for_unknown_node_errors() {
        let mut rec = VcdRecorder::new(Vec::new());
        rec.begin(&[(node(0), "A")]).unwrap();
        let err = rec
            .record_change(SimTime::ZERO, node(9), Logic::One)
            .unwrap_err();
        assert!(matches!(err, SimError::UnregisteredNode { node_index: 9 }));
    }

    #[test]
    fn zero_time_change_emits_hash_zero() {
        let mut rec = VcdRecorder::new(Vec::new());
        rec.begin(&[(node(0), "A")]).unwrap();
        rec.dump_initial(&[(node(0), Logic::Zero)]).unwrap();
        rec.record_change(SimTime::ZERO, node(0), Logic::One)
            .unwrap();
        let out = output_of(rec);
        assert!(out.contains("#0\n1s1\n"));
    }
}
