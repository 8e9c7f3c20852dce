//! Hardware abstraction for the monitored signal line.
//!
//! Everything above this module talks to a [`SignalSource`]; the concrete
//! backends live in [`crate::gpio`].

pub mod signal;

pub use signal::{NullSource, SignalSource};

/// Errors raised by signal sources.
#[derive(Debug, thiserror::Error)]
pub enum HwError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Signal source already released")]
    Released,

    #[error("Signal source setup did not finish: {0}")]
    Setup(#[from] tokio::task::JoinError),
}

impl HwError {
    pub(crate) fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        HwError::Io {
            path: path.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, HwError>;
