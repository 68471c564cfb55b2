//! # court_core - Play Matching and Synchronized Playback
//!
//! Client side of the court dashboard: players are arranged on a court, the
//! arrangement is sent to a remote match service, and the movement data of
//! the closest recorded play is replayed onto the court frame by frame.
//!
//! ## Features
//! - Sans-IO playback state machine with an injectable timer scheduler
//! - Stale response protection across stop and restart
//! - JSON-over-HTTP match service client with request timeouts
//! - Single task session driver publishing a status snapshot per step

// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod playback;
pub mod session;
pub mod status;
pub mod store;

// Service client
pub use api::{HttpPlayService, PlayService};

pub use config::{ClientConfig, PlaybackConfig, ServiceConfig};
pub use error::{CourtError, MatchError, Result, SequenceError};

// Data model
pub use models::{
    BallPosition, Entity, EntityId, Frame, FrameSequence, Group, MatchDescriptor, Position, Roster,
};

// Playback
pub use playback::{FailureReason, PlaybackController, PlaybackState, StateKind};
pub use session::{Command, Session, SessionHandle};
pub use status::StatusView;
pub use store::EntityStore;
