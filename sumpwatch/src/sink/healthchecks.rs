//! Healthchecks.io style liveness pings.
//!
//! The check is pinged each time the pump turns on. Configure the check's
//! period to the longest dry spell you expect; a silent check then means
//! the pump (or this monitor) stopped working.

use async_trait::async_trait;
use reqwest::Url;

use super::{Sink, SinkError, http_client};
use crate::tracing::prelude::*;
use crate::types::PumpState;

pub struct HealthchecksSink {
    client: reqwest::Client,
    url: Url,
}

impl HealthchecksSink {
    pub fn new(url: Url) -> Result<Self, SinkError> {
        Ok(Self {
            client: http_client()?,
            url,
        })
    }
}

#[async_trait]
impl Sink for HealthchecksSink {
    fn name(&self) -> &str {
        "healthchecks"
    }

    async fn log(&mut self, values: &[PumpState]) -> Result<(), SinkError> {
        if !values.contains(&PumpState::On) {
            trace!("No activation in batch, not pinging");
            return Ok(());
        }

        // Ping URLs embed the check's secret id.
        self.client
            .get(self.url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.without_url())?;

        debug!("Healthchecks pinged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::get;

    use super::*;
    use crate::sink::test_support::serve;

    async fn fake_check(status: StatusCode) -> (Url, Arc<AtomicUsize>) {
        let pings = Arc::new(AtomicUsize::new(0));
        let router = axum::Router::new()
            .route(
                "/ping/abc-123",
                get(move |State(pings): State<Arc<AtomicUsize>>| async move {
                    pings.fetch_add(1, Ordering::SeqCst);
                    status
                }),
            )
            .with_state(pings.clone());
        let base = serve(router).await;
        (format!("{base}/ping/abc-123").parse().unwrap(), pings)
    }

    #[tokio::test]
    async fn pings_when_pump_turns_on() {
        let (url, pings) = fake_check(StatusCode::OK).await;
        let mut sink = HealthchecksSink::new(url).unwrap();

        sink.log(&[PumpState::On]).await.unwrap();

        assert_eq!(pings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ignores_pump_turning_off() {
        let (url, pings) = fake_check(StatusCode::OK).await;
        let mut sink = HealthchecksSink::new(url).unwrap();

        sink.log(&[PumpState::Off]).await.unwrap();

        assert_eq!(pings.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reports_server_errors() {
        let (url, pings) = fake_check(StatusCode::SERVICE_UNAVAILABLE).await;
        let mut sink = HealthchecksSink::new(url).unwrap();

        let err = sink.log(&[PumpState::On]).await.unwrap_err();

        assert!(matches!(err, SinkError::Http(_)));
        assert!(!err.to_string().contains("abc-123"));
        assert_eq!(pings.load(Ordering::SeqCst), 1);
    }
}
