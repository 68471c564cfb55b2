//! Playback controller: search cycle state machine and frame clock.

pub mod controller;
pub mod scheduler;
pub mod state;
pub mod transitions;

pub use controller::{
    Effect, FetchRequest, LastResult, PlaybackController, SearchRequest, Ticket, TransitionRecord,
};
pub use scheduler::{Scheduler, Timer, TimerHandle, TimerQueue};
pub use state::{FailureReason, PlaybackState, StateKind};
pub use transitions::validate_transition;
