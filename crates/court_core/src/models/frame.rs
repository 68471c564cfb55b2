//! Frames and frame sequences of a recorded play.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::entity::{BallPosition, EntityId, Position};
use crate::error::SequenceError;

/// One time step: every player position plus the ball.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub entities: BTreeMap<EntityId, Position>,
    pub object: BallPosition,
}

impl Frame {
    pub fn new(object: BallPosition) -> Self {
        Self { entities: BTreeMap::new(), object }
    }

    pub fn with_entity(mut self, id: EntityId, position: Position) -> Self {
        self.entities.insert(id, position);
        self
    }

    pub fn position_of(&self, id: EntityId) -> Option<Position> {
        self.entities.get(&id).copied()
    }

    /// First roster id this frame does not name.
    pub fn first_missing(&self, roster: &[EntityId]) -> Option<EntityId> {
        roster.iter().copied().find(|id| !self.entities.contains_key(id))
    }

    fn retain_roster(&mut self, roster: &[EntityId]) -> usize {
        let before = self.entities.len();
        self.entities.retain(|id, _| roster.contains(id));
        before - self.entities.len()
    }
}

/// Non-empty, roster-complete list of frames. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    note: Option<String>,
}

impl FrameSequence {
    /// Builds a sequence for `roster`.
    ///
    /// Ids the roster does not know are dropped from each frame. A frame that
    /// lacks any roster id rejects the whole sequence.
    pub fn for_roster(
        mut frames: Vec<Frame>,
        note: Option<String>,
        roster: &[EntityId],
    ) -> Result<Self, SequenceError> {
        if frames.is_empty() {
            return Err(SequenceError::EmptySequence);
        }

        let mut dropped = 0;
        for (frame_index, frame) in frames.iter_mut().enumerate() {
            dropped += frame.retain_roster(roster);
            if let Some(entity_id) = frame.first_missing(roster) {
                return Err(SequenceError::IncompleteFrame { frame_index, entity_id });
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "dropped unknown entity positions from sequence");
        }

        Ok(Self { frames, note })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn first(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<EntityId> {
        raw.iter().map(|&i| EntityId(i)).collect()
    }

    fn frame(raw: &[u32]) -> Frame {
        raw.iter().fold(Frame::new(BallPosition::new(1.0, 2.0, 3.0)), |f, &i| {
            f.with_entity(EntityId(i), Position::new(i as f32, i as f32))
        })
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let err = FrameSequence::for_roster(vec![], None, &ids(&[1])).unwrap_err();
        assert_eq!(err, SequenceError::EmptySequence);
    }

    #[test]
    fn test_unknown_ids_dropped() {
        let seq = FrameSequence::for_roster(vec![frame(&[1, 2, 42])], None, &ids(&[1, 2])).unwrap();
        let first = seq.first();
        assert_eq!(first.entities.len(), 2);
        assert!(first.position_of(EntityId(42)).is_none());
    }

    #[test]
    fn test_missing_id_rejects_sequence() {
        let frames = vec![frame(&[1, 2]), frame(&[1, 2]), frame(&[1])];
        let err = FrameSequence::for_roster(frames, None, &ids(&[1, 2])).unwrap_err();
        assert_eq!(err, SequenceError::IncompleteFrame { frame_index: 2, entity_id: EntityId(2) });
    }

    #[test]
    fn test_note_kept() {
        let seq =
            FrameSequence::for_roster(vec![frame(&[1])], Some("TOR vs CHA".into()), &ids(&[1]))
                .unwrap();
        assert_eq!(seq.note(), Some("TOR vs CHA"));
        assert_eq!(seq.len(), 1);
        assert!(!seq.is_empty());
    }
}
