//! Simulation error types.

use std::io;

/// Errors that can occur while running a simulation or writing its output.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An I/O error while reading stimulus or writing waveform data.
    #[error("simulation I/O error: {0}")]
    Io(#[from] io::Error),

    /// A value change was recorded for a node the waveform writer was
    /// never told about.
    #[error("waveform change for unregistered node #{node_index}")]
    UnregisteredNode {
        /// Raw arena index of the offending node.
        node_index: u32,
    },

    /// Too many events dispatched in a single run, indicating
    /// combinational feedback.
    #[error("event limit exceeded at {ns} ns ({limit} events): possible combinational loop")]
    EventLimit {
        /// Simulation time when the limit was hit, in nanoseconds.
        ns: u64,
        /// The configured event limit.
        limit: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_display() {
        let e = SimError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(e.to_string().contains("simulation I/O error"));
    }

    #[test]
    fn unregistered_node_display() {
        let e = SimError::UnregisteredNode { node_index: 5 };
        assert_eq!(e.to_string(), "waveform change for unregistered node #5");
    }

    #[test]
    fn event_limit_display() {
        let e = SimError::EventLimit {
            ns: 40,
            limit: 1000,
        };
        assert_eq!(
            e.to_string(),
            "event limit exceeded at 40 ns (1000 events): possible combinational loop"
        );
    }
}
