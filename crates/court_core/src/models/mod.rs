pub mod descriptor;
pub mod entity;
pub mod frame;

pub use descriptor::MatchDescriptor;
pub use entity::{BallPosition, Entity, EntityId, Group, Position, Roster, DEFAULT_BALL_HEIGHT, GROUP_SIZE};
pub use frame::{Frame, FrameSequence};
