//! HTTP transport for [`PlayService`].

use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::wire::{self, SequenceQuery};
use super::PlayService;
use crate::config::ServiceConfig;
use crate::error::{CourtError, MatchError, SequenceError};
use crate::models::{Entity, EntityId, FrameSequence, MatchDescriptor};

/// Why an exchange produced no response.
#[derive(Debug)]
enum Transport {
    Timeout,
    Failed(String),
}

/// JSON-over-HTTP client for the match service.
#[derive(Debug, Clone)]
pub struct HttpPlayService {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpPlayService {
    pub fn new(config: &ServiceConfig) -> Result<Self, CourtError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CourtError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends `request` and reads the whole body, bounded by the request timeout.
    async fn exchange(&self, request: reqwest::RequestBuilder) -> Result<(u16, Vec<u8>), Transport> {
        let round_trip = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body.to_vec()))
        };

        match tokio::time::timeout(self.timeout, round_trip).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) if e.is_timeout() => Err(Transport::Timeout),
            Ok(Err(e)) => Err(Transport::Failed(e.to_string())),
            Err(_) => Err(Transport::Timeout),
        }
    }
}

impl PlayService for HttpPlayService {
    async fn request_match(&self, roster: &[Entity]) -> Result<MatchDescriptor, MatchError> {
        let started = Instant::now();
        let body = wire::encode_roster(roster);
        let request = self.client.post(self.url("match")).json(&body);

        let result = match self.exchange(request).await {
            Ok((status, bytes)) => {
                debug!(status, bytes = bytes.len(), "match response");
                wire::decode_match_reply(status, &bytes)
            }
            Err(Transport::Timeout) => Err(MatchError::Timeout),
            Err(Transport::Failed(msg)) => Err(MatchError::NetworkFailure(msg)),
        };

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            players = roster.len(),
            ok = result.is_ok(),
            "match request finished"
        );
        result
    }

    async fn fetch_sequence(
        &self,
        match_id: &str,
        event_id: &str,
        roster: &[EntityId],
    ) -> Result<FrameSequence, SequenceError> {
        let started = Instant::now();
        let request =
            self.client.post(self.url("sequence")).json(&SequenceQuery { match_id, event_id });

        let result = match self.exchange(request).await {
            Ok((status, bytes)) => {
                debug!(status, bytes = bytes.len(), "sequence response");
                wire::decode_sequence_reply(status, &bytes, roster)
            }
            Err(Transport::Timeout) => Err(SequenceError::Timeout),
            Err(Transport::Failed(msg)) => Err(SequenceError::NetworkFailure(msg)),
        };

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            match_id,
            event_id,
            frames = result.as_ref().map(FrameSequence::len).unwrap_or(0),
            "sequence request finished"
        );
        result
    }

    async fn health(&self) -> Result<(), MatchError> {
        match self.exchange(self.client.get(self.url("health"))).await {
            Ok((status, _)) if (200..300).contains(&status) => Ok(()),
            Ok((status, _)) => Err(MatchError::RemoteRejected(format!("HTTP {status}"))),
            Err(Transport::Timeout) => Err(MatchError::Timeout),
            Err(Transport::Failed(msg)) => Err(MatchError::NetworkFailure(msg)),
        }
    }
}
