//! Destinations for pump state changes.
//!
//! A [`Sink`] receives an ordered batch of states each time the monitor
//! sees a genuine transition. Sinks run one after another in registration
//! order, so a local sink (the console) registered first shows a change
//! even when a network sink behind it is failing.

mod console;
mod healthchecks;
mod thingspeak;

use std::time::Duration;

use async_trait::async_trait;

pub use console::ConsoleSink;
pub use healthchecks::HealthchecksSink;
pub use thingspeak::ThingSpeakSink;

use crate::config::SinkConfig;
use crate::types::PumpState;

/// Request timeout for the HTTP sinks.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors raised while delivering to a sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} rejected the update: {reason}")]
    Rejected {
        service: &'static str,
        reason: String,
    },
}

/// A consumer of pump state changes.
#[async_trait]
pub trait Sink: Send {
    /// Name used in log output and failure reports.
    fn name(&self) -> &str;

    /// Record `values`, oldest first.
    ///
    /// Errors are reported back to the monitor but never retried.
    async fn log(&mut self, values: &[PumpState]) -> Result<(), SinkError>;
}

pub(crate) fn http_client() -> Result<reqwest::Client, SinkError> {
    Ok(reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?)
}

/// Build the configured sinks in notification order.
///
/// The console always comes first. Unconfigured remote sinks come back as
/// `None`; the monitor drops those at registration.
pub fn build(config: &SinkConfig) -> Result<Vec<Option<Box<dyn Sink>>>, SinkError> {
    let console: Box<dyn Sink> = Box::new(ConsoleSink::stdout());

    let thingspeak = match &config.thingspeak_api_key {
        Some(key) => Some(Box::new(ThingSpeakSink::new(key.clone())?) as Box<dyn Sink>),
        None => None,
    };

    let healthchecks = match &config.healthchecks_url {
        Some(url) => Some(Box::new(HealthchecksSink::new(url.clone())?) as Box<dyn Sink>),
        None => None,
    };

    Ok(vec![Some(console), thingspeak, healthchecks])
}
