// ============================================================================
// Playback FSM transition table
// ============================================================================
//
// ```
// Idle → Searching → AwaitingSequence → Playing ⟲ → Complete → Idle
//            ↓              ↓              ↓  ↘
//         Failed         Failed        Failed  Cancelled → Idle
//            ↓              ↓              ↓
//          Idle           Idle           Idle
//
// Playing → Failed when a frame could not be applied.
// Searching / AwaitingSequence → Cancelled (user stop while a request is out)
// ```
//
// Anything else (e.g. Idle → Playing, Complete → Searching) means the
// controller skipped a step and is rejected.

use super::state::StateKind;
use crate::error::CourtError;

pub fn validate_transition(from: StateKind, to: StateKind) -> Result<(), CourtError> {
    use StateKind::*;

    // Playing → Playing is a frame tick
    if from == to {
        return Ok(());
    }

    let valid = match (from, to) {
        (Idle, Searching) => true,

        (Searching, AwaitingSequence) => true,
        (Searching, Failed) => true,
        (Searching, Cancelled) => true,

        (AwaitingSequence, Playing) => true,
        (AwaitingSequence, Failed) => true,
        (AwaitingSequence, Cancelled) => true,

        (Playing, Complete) => true,
        (Playing, Failed) => true,
        (Playing, Cancelled) => true,

        (Complete, Idle) => true,
        (Failed, Idle) => true,
        (Cancelled, Idle) => true,

        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(CourtError::InvalidTransition { from, to })
    }
}

/// States from which `dismiss` may return to `Idle`.
pub fn is_dismissable(state: StateKind) -> bool {
    matches!(state, StateKind::Complete | StateKind::Failed | StateKind::Cancelled)
}

/// States a user stop applies to.
pub fn is_stoppable(state: StateKind) -> bool {
    matches!(state, StateKind::Searching | StateKind::AwaitingSequence | StateKind::Playing)
}
