//! Entity Store
//!
//! Current player and ball positions. Drag input writes through
//! [`EntityStore::set_position`] and is refused while the store is locked;
//! playback writes whole frames through [`EntityStore::apply_frame`].

use crate::error::SequenceError;
use crate::models::{BallPosition, Entity, EntityId, Frame, Position, Roster};

#[derive(Debug, Clone)]
pub struct EntityStore {
    entities: Vec<Entity>,
    ball: BallPosition,
    locked: bool,
}

impl EntityStore {
    pub fn new(roster: Roster) -> Self {
        let ball = roster.ball_start();
        Self { entities: roster.entities, ball, locked: false }
    }

    /// Players in roster order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn ball(&self) -> BallPosition {
        self.ball
    }

    pub fn roster_ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id).collect()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn lock(&mut self) {
        self.locked = true;
    }

    pub(crate) fn unlock(&mut self) {
        self.locked = false;
    }

    /// Drags one player. Returns `false` without touching anything when the
    /// id is unknown or the store is locked.
    pub fn set_position(&mut self, id: EntityId, x: f32, y: f32) -> bool {
        if self.locked {
            tracing::debug!(%id, "drag ignored while playback is active");
            return false;
        }

        match self.entities.iter_mut().find(|e| e.id == id) {
            Some(entity) => {
                entity.position = Position::new(x, y);
                true
            }
            None => {
                tracing::debug!(%id, "position write for unknown entity ignored");
                false
            }
        }
    }

    /// Overwrites every player and the ball from `frame`, or nothing at all.
    pub fn apply_frame(&mut self, frame: &Frame) -> Result<(), SequenceError> {
        // Validate first so a bad frame never half-applies.
        let mut next = Vec::with_capacity(self.entities.len());
        for entity in &self.entities {
            match frame.position_of(entity.id) {
                Some(position) => next.push(position),
                None => {
                    return Err(SequenceError::IncompleteFrame {
                        frame_index: 0,
                        entity_id: entity.id,
                    })
                }
            }
        }

        for (entity, position) in self.entities.iter_mut().zip(next) {
            entity.position = position;
        }
        self.ball = frame.object;
        Ok(())
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new(Roster::default_court())
    }
}
