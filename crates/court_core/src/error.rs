use thiserror::Error;

use crate::models::EntityId;
use crate::playback::StateKind;

/// Failure of a `POST /match` call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("rejected by match service: {0}")]
    RemoteRejected(String),

    #[error("match request timed out")]
    Timeout,
}

/// Failure of a `POST /sequence` call or of validating its frames.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    #[error("sequence not found: {0}")]
    NotFound(String),

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("sequence has no frames")]
    EmptySequence,

    #[error("frame {frame_index} is missing entity {entity_id}")]
    IncompleteFrame { frame_index: usize, entity_id: EntityId },

    #[error("sequence request timed out")]
    Timeout,
}

impl MatchError {
    pub fn is_transient(&self) -> bool {
        match self {
            MatchError::NetworkFailure(_) => true,
            MatchError::Timeout => true,
            MatchError::RemoteRejected(_) => false,
        }
    }
}

impl SequenceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SequenceError::NetworkFailure(_) | SequenceError::Timeout)
    }
}

#[derive(Error, Debug)]
pub enum CourtError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error("invalid playback transition: {from:?} -> {to:?}")]
    InvalidTransition { from: StateKind, to: StateKind },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("session is no longer running")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, CourtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_human_readable() {
        let err = SequenceError::IncompleteFrame { frame_index: 3, entity_id: EntityId(7) };
        assert_eq!(err.to_string(), "frame 3 is missing entity 7");

        let err = MatchError::RemoteRejected("no match found".to_string());
        assert_eq!(err.to_string(), "rejected by match service: no match found");
    }

    #[test]
    fn test_transient_classification() {
        assert!(MatchError::Timeout.is_transient());
        assert!(MatchError::NetworkFailure("refused".into()).is_transient());
        assert!(!MatchError::RemoteRejected("bad roster".into()).is_transient());
        assert!(!SequenceError::EmptySequence.is_transient());
        assert!(SequenceError::Timeout.is_transient());
    }

    #[test]
    fn test_court_error_wraps_sources() {
        let err: CourtError = MatchError::Timeout.into();
        assert!(matches!(err, CourtError::Match(MatchError::Timeout)));
        assert_eq!(err.to_string(), "match request timed out");
    }
}
