use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MatchError, SequenceError};

/// Why a search cycle ended in `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    Match(MatchError),
    Sequence(SequenceError),
}

impl FailureReason {
    /// Network trouble that a later search may not hit again.
    pub fn is_transient(&self) -> bool {
        match self {
            FailureReason::Match(e) => e.is_transient(),
            FailureReason::Sequence(e) => e.is_transient(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FailureReason::Match(e) => write!(f, "{e}"),
            FailureReason::Sequence(e) => write!(f, "{e}"),
        }
    }
}

/// Playback controller state. Exactly one per session.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    /// Match request in flight
    Searching,
    /// Descriptor received, frames not loaded yet
    AwaitingSequence,
    /// `frame_index` is the frame currently shown
    Playing { frame_index: usize },
    Complete,
    Failed(FailureReason),
    Cancelled,
}

/// Payload-free view of [`PlaybackState`] used by the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKind {
    Idle,
    Searching,
    AwaitingSequence,
    Playing,
    Complete,
    Failed,
    Cancelled,
}

impl PlaybackState {
    pub fn kind(&self) -> StateKind {
        match self {
            PlaybackState::Idle => StateKind::Idle,
            PlaybackState::Searching => StateKind::Searching,
            PlaybackState::AwaitingSequence => StateKind::AwaitingSequence,
            PlaybackState::Playing { .. } => StateKind::Playing,
            PlaybackState::Complete => StateKind::Complete,
            PlaybackState::Failed(_) => StateKind::Failed,
            PlaybackState::Cancelled => StateKind::Cancelled,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PlaybackState::Idle)
    }

    /// A search or playback cycle is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PlaybackState::Searching | PlaybackState::AwaitingSequence | PlaybackState::Playing { .. }
        )
    }

    /// End states that return to `Idle` on their own or on dismiss.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlaybackState::Complete | PlaybackState::Failed(_) | PlaybackState::Cancelled)
    }

    pub fn frame_index(&self) -> Option<usize> {
        match self {
            PlaybackState::Playing { frame_index } => Some(*frame_index),
            _ => None,
        }
    }
}
