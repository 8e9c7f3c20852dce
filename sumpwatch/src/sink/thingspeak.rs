//! ThingSpeak channel updates.
//!
//! Each batch becomes one `GET /update` with the channel's write key and
//! one field per value (`field1`, `field2`, ...), encoded as 1 for ON and
//! 0 for OFF. ThingSpeak answers with the new entry id, or `0` when it
//! refused the update (usually the free-tier rate limit).

use async_trait::async_trait;

use super::{Sink, SinkError, http_client};
use crate::tracing::prelude::*;
use crate::types::PumpState;

pub const DEFAULT_BASE_URL: &str = "https://api.thingspeak.com";

/// A channel accepts at most this many fields per update.
const MAX_FIELDS: usize = 8;

pub struct ThingSpeakSink {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ThingSpeakSink {
    pub fn new(api_key: String) -> Result<Self, SinkError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Result<Self, SinkError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn query(&self, values: &[PumpState]) -> Vec<(String, String)> {
        let mut query = vec![("api_key".to_string(), self.api_key.clone())];
        query.extend(
            values
                .iter()
                .take(MAX_FIELDS)
                .enumerate()
                .map(|(i, state)| (format!("field{}", i + 1), state.raw().to_string())),
        );
        query
    }
}

#[async_trait]
impl Sink for ThingSpeakSink {
    fn name(&self) -> &str {
        "thingspeak"
    }

    async fn log(&mut self, values: &[PumpState]) -> Result<(), SinkError> {
        if values.is_empty() {
            return Ok(());
        }
        if values.len() > MAX_FIELDS {
            warn!(
                count = values.len(),
                "ThingSpeak accepts {MAX_FIELDS} fields per update, dropping the rest"
            );
        }

        // The write key travels in the query string; keep it out of errors.
        let response = self
            .client
            .get(format!("{}/update", self.base_url))
            .query(&self.query(values))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.without_url())?;

        let body = response.text().await.map_err(|e| e.without_url())?;
        let entry = body.trim();
        if entry == "0" {
            return Err(SinkError::Rejected {
                service: "ThingSpeak",
                reason: "update not accepted (rate limited?)".into(),
            });
        }

        debug!(entry, "ThingSpeak update accepted");
        Ok(())
    }
}
