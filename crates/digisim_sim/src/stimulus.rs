//! Stimulus file parsing.
//!
//! One record per line: `<time> <node_name> <value>`. `time` is a
//! non-negative real number of nanoseconds (fractions are truncated, since
//! the simulator runs on a 1 ns grid) and `value` is `0` or `1`. Records
//! need not be time-sorted; the event queue orders them.
//!
//! Parsing is best-effort: malformed lines and non-binary value tokens are
//! reported as warnings and skipped rather than failing the whole file. A
//! value token other than `0`/`1` decodes to the reserved high-impedance
//! level, which the kernel refuses to schedule — it never reaches a node.

use std::fmt;
use std::fs;
use std::path::Path;

use digisim_common::{Logic, SimTime};
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// One parsed stimulus record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stimulus {
    /// When the value is applied.
    pub time: SimTime,
    /// Name of the target node.
    pub node: String,
    /// The value to apply. Only driven levels are ever scheduled.
    pub value: Logic,
}

/// A non-fatal oddity found while parsing stimulus text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StimulusWarning {
    /// 1-based line number the warning refers to.
    pub line: usize,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for StimulusWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stimulus line {}: {}", self.line, self.message)
    }
}

/// Parses stimulus text into records plus warnings.
pub fn parse_stimulus_str(text: &str) -> (Vec<Stimulus>, Vec<StimulusWarning>) {
    let mut records = Vec::new();
    let mut warnings = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(time_tok), Some(name), Some(value_tok)) =
            (fields.next(), fields.next(), fields.next())
        else {
            warnings.push(StimulusWarning {
                line: line_no,
                message: "expected '<time> <node> <value>'; line skipped".into(),
            });
            continue;
        };

        let time = match time_tok.parse::<f64>() {
            Ok(t) if t >= 0.0 && t.is_finite() => SimTime::from_ns(t as u64),
            _ => {
                warnings.push(StimulusWarning {
                    line: line_no,
                    message: format!("invalid time '{time_tok}'; line skipped"),
                });
                continue;
            }
        };

        let value = match value_tok {
            "0" => Logic::Zero,
            "1" => Logic::One,
            other => {
                warnings.push(StimulusWarning {
                    line: line_no,
                    message: format!(
                        "value '{other}' is not 0 or 1; treated as high-impedance and ignored"
                    ),
                });
                Logic::Z
            }
        };

        records.push(Stimulus {
            time,
            node: name.to_string(),
            value,
        });
    }

    (records, warnings)
}

/// Reads and parses a stimulus file.
pub fn parse_stimulus_path(
    path: impl AsRef<Path>,
) -> Result<(Vec<Stimulus>, Vec<StimulusWarning>), SimError> {
    let text = fs::read_to_string(path)?;
    Ok(parse_stimulus_str(&text))
}
