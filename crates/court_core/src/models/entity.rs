//! Court participants and the ball.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Players per group on a full court.
pub const GROUP_SIZE: usize = 5;

/// Ball height used before any frame has been applied.
pub const DEFAULT_BALL_HEIGHT: f32 = 10.0;

/// Stable player identity for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team side. `A` is the offense (red), `B` the defense (blue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    A,
    B,
}

impl Group {
    /// Group index used by the match service's positional schema.
    pub fn index(self) -> u8 {
        match self {
            Group::A => 0,
            Group::B => 1,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Group::A),
            1 => Some(Group::B),
            _ => None,
        }
    }
}

/// Court coordinates in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Ball position; `height` is above the floor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BallPosition {
    pub x: f32,
    pub y: f32,
    pub height: f32,
}

impl BallPosition {
    pub const fn new(x: f32, y: f32, height: f32) -> Self {
        Self { x, y, height }
    }

    /// Ball held at floor-relative `height` above a player.
    pub fn at(position: Position, height: f32) -> Self {
        Self { x: position.x, y: position.y, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub group: Group,
    pub position: Position,
}

impl Entity {
    pub fn new(id: u32, group: Group, x: f32, y: f32) -> Self {
        Self { id: EntityId(id), group, position: Position::new(x, y) }
    }
}

/// Session lineup plus the player the ball starts with.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    pub entities: Vec<Entity>,
    pub ball_carrier: EntityId,
}

impl Roster {
    /// Half-court set: offense (ids 1-5) attacking the right basket, defense
    /// (ids 6-10) between them and the rim. The point guard has the ball.
    pub fn default_court() -> Self {
        let entities = vec![
            // Offense
            Entity::new(1, Group::A, 200.0, 300.0), // point guard
            Entity::new(2, Group::A, 180.0, 200.0),
            Entity::new(3, Group::A, 180.0, 400.0),
            Entity::new(4, Group::A, 120.0, 250.0),
            Entity::new(5, Group::A, 120.0, 350.0),
            // Defense
            Entity::new(6, Group::B, 240.0, 300.0), // on ball
            Entity::new(7, Group::B, 220.0, 220.0),
            Entity::new(8, Group::B, 220.0, 380.0),
            Entity::new(9, Group::B, 160.0, 270.0),
            Entity::new(10, Group::B, 160.0, 330.0),
        ];
        Self { entities, ball_carrier: EntityId(1) }
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id).collect()
    }

    /// Count of players per group `(A, B)`.
    pub fn group_counts(&self) -> (usize, usize) {
        self.entities.iter().fold((0, 0), |(a, b), e| match e.group {
            Group::A => (a + 1, b),
            Group::B => (a, b + 1),
        })
    }

    /// Starting ball position: over the designated carrier, or the court
    /// origin if the carrier is not on the roster.
    pub fn ball_start(&self) -> BallPosition {
        self.entities
            .iter()
            .find(|e| e.id == self.ball_carrier)
            .map(|e| BallPosition::at(e.position, DEFAULT_BALL_HEIGHT))
            .unwrap_or_default()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::default_court()
    }
}
