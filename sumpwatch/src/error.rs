//! Crate-level error type.

use std::fmt;

use crate::hw_trait::HwError;
use crate::sink::SinkError;
use crate::types::PumpState;

/// A sink that failed during fan-out, and why.
#[derive(Debug)]
pub struct SinkFailure {
    pub sink: String,
    pub error: SinkError,
}

impl fmt::Display for SinkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sink, self.error)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Hardware error: {0}")]
    Hardware(#[from] HwError),

    /// One or more sinks failed while reporting `state`. The state change
    /// itself was committed and the remaining sinks still ran.
    #[error("{} sink(s) failed to record {state}: {}", .failures.len(), join(.failures))]
    Sink {
        state: PumpState,
        failures: Vec<SinkFailure>,
    },
}

fn join(failures: &[SinkFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;
