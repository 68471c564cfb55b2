//! Remote match service client.
//!
//! [`PlayService`] is the seam the session talks through; [`HttpPlayService`]
//! is the real JSON-over-HTTP implementation and [`wire`] holds the request
//! and response shapes.

pub mod http;
pub mod wire;

use std::future::Future;

use crate::error::{MatchError, SequenceError};
use crate::models::{Entity, EntityId, FrameSequence, MatchDescriptor};

pub use http::HttpPlayService;

/// Play matching and movement data source.
///
/// One request per call, no retries. Implementations never touch the entity
/// store; results flow back through the playback controller.
pub trait PlayService: Send + Sync + 'static {
    /// Finds the recorded play closest to `roster`'s arrangement.
    fn request_match(
        &self,
        roster: &[Entity],
    ) -> impl Future<Output = Result<MatchDescriptor, MatchError>> + Send;

    /// Loads the frames of a play, validated against `roster`.
    fn fetch_sequence(
        &self,
        match_id: &str,
        event_id: &str,
        roster: &[EntityId],
    ) -> impl Future<Output = Result<FrameSequence, SequenceError>> + Send;

    /// Service liveness.
    fn health(&self) -> impl Future<Output = Result<(), MatchError>> + Send;
}
