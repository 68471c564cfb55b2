//! JSON shapes exchanged with the match service.
//!
//! Requests are camelCase. Responses are camelCase too, but the snake_case
//! names of the older analytics service (`best_play`, `game_id`,
//! `shot_quality`, `players`, `ball`, `z`) are accepted as aliases.

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, SequenceError};
use crate::models::{BallPosition, Entity, EntityId, Frame, FrameSequence, MatchDescriptor, Position};

// ========================
// Requests
// ========================

/// One element of the `/match` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPlacement {
    pub entity_id: u32,
    pub group_index: u8,
    pub x: f32,
    pub y: f32,
}

/// `/match` body: placements in roster order.
pub fn encode_roster(entities: &[Entity]) -> Vec<EntityPlacement> {
    entities
        .iter()
        .map(|e| EntityPlacement {
            entity_id: e.id.0,
            group_index: e.group.index(),
            x: e.position.x,
            y: e.position.y,
        })
        .collect()
}

/// `/sequence` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceQuery<'a> {
    pub match_id: &'a str,
    pub event_id: &'a str,
}

// ========================
// Responses
// ========================

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: String,
}

/// A body carrying `error` is a refusal, whatever else it holds.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MatchReply {
    Rejected(ErrorReply),
    Found(FoundReply),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoundReply {
    #[serde(alias = "best_play")]
    best_match: BestMatch,
    /// The older service reports the count beside the match, not inside it
    #[serde(default, alias = "similar_plays_count")]
    similar_count: Option<u32>,
}

/// Ids arrive as strings or bare numbers depending on the service version.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(u64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BestMatch {
    #[serde(alias = "game_id", alias = "match_id")]
    match_id: WireId,
    #[serde(alias = "event_id")]
    event_id: WireId,
    #[serde(alias = "similarity_score")]
    similarity_score: f32,
    #[serde(alias = "shot_quality", alias = "quality_score")]
    quality_score: f32,
    #[serde(default, alias = "similar_count")]
    similar_count: Option<u32>,
}

impl BestMatch {
    fn into_descriptor(self) -> MatchDescriptor {
        MatchDescriptor {
            match_id: self.match_id.into_string(),
            event_id: self.event_id.into_string(),
            similarity_score: self.similarity_score,
            quality_score: self.quality_score,
            similar_count: self.similar_count,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SequenceReply {
    Missing(ErrorReply),
    Frames(FramesReply),
}

#[derive(Debug, Deserialize)]
struct FramesReply {
    frames: Vec<WireFrame>,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireFrame {
    #[serde(alias = "players")]
    entities: Vec<WireEntity>,
    #[serde(alias = "ball")]
    object: WireObject,
}

#[derive(Debug, Deserialize)]
struct WireEntity {
    id: u32,
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
struct WireObject {
    x: f32,
    y: f32,
    #[serde(alias = "z")]
    height: f32,
}

impl WireFrame {
    fn into_frame(self) -> Frame {
        let object = BallPosition::new(self.object.x, self.object.y, self.object.height);
        self.entities
            .into_iter()
            .fold(Frame::new(object), |frame, e| frame.with_entity(EntityId(e.id), Position::new(e.x, e.y)))
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn status_reason(status: u16, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorReply>(body) {
        Ok(reply) => format!("HTTP {status}: {}", reply.error),
        Err(_) => format!("HTTP {status}"),
    }
}

/// Decodes a `/match` response.
pub fn decode_match_reply(status: u16, body: &[u8]) -> Result<MatchDescriptor, MatchError> {
    if !is_success(status) {
        return Err(MatchError::RemoteRejected(status_reason(status, body)));
    }

    let reply: MatchReply = serde_json::from_slice(body)
        .map_err(|e| MatchError::RemoteRejected(format!("malformed response: {e}")))?;

    match reply {
        MatchReply::Rejected(r) => Err(MatchError::RemoteRejected(r.error)),
        MatchReply::Found(found) => {
            let mut descriptor = found.best_match.into_descriptor();
            descriptor.similar_count = descriptor.similar_count.or(found.similar_count);
            if !descriptor.scores_in_range() {
                return Err(MatchError::RemoteRejected(format!(
                    "scores out of range: similarity {}, quality {}",
                    descriptor.similarity_score, descriptor.quality_score
                )));
            }
            Ok(descriptor)
        }
    }
}

/// Decodes a `/sequence` response and validates it against `roster`.
pub fn decode_sequence_reply(
    status: u16,
    body: &[u8],
    roster: &[EntityId],
) -> Result<FrameSequence, SequenceError> {
    if status == 404 {
        return Err(SequenceError::NotFound(status_reason(status, body)));
    }
    if !is_success(status) {
        return Err(SequenceError::NetworkFailure(status_reason(status, body)));
    }

    let reply: SequenceReply = serde_json::from_slice(body)
        .map_err(|e| SequenceError::NetworkFailure(format!("malformed response: {e}")))?;

    match reply {
        SequenceReply::Missing(r) => Err(SequenceError::NotFound(r.error)),
        SequenceReply::Frames(reply) => {
            let frames = reply.frames.into_iter().map(WireFrame::into_frame).collect();
            FrameSequence::for_roster(frames, reply.note, roster)
        }
    }
}
