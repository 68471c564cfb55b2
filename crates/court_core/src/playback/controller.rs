//! Playback Controller
//!
//! Owns the entity store and drives one search cycle at a time:
//! match request → sequence fetch → frame clock → complete/cancel → idle.
//!
//! The controller performs no I/O. Network work is handed out as
//! [`SearchRequest`]/[`FetchRequest`] values and comes back through
//! [`PlaybackController::on_match_result`] and
//! [`PlaybackController::on_sequence_result`]; timers go through the injected
//! [`Scheduler`] and fire from [`PlaybackController::advance`]. Every call takes
//! `now` on the session timeline.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::scheduler::{Scheduler, Timer, TimerHandle, TimerQueue};
use super::state::{FailureReason, PlaybackState, StateKind};
use super::transitions::{is_dismissable, is_stoppable, validate_transition};
use crate::config::PlaybackConfig;
use crate::error::{MatchError, SequenceError};
use crate::models::{Entity, EntityId, FrameSequence, MatchDescriptor};
use crate::store::EntityStore;

/// Transitions kept for inspection (oldest dropped first).
pub const TRANSITION_LOG_CAPACITY: usize = 64;

/// Identifies one search cycle. Responses carrying an older ticket are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticket(u64);

impl Ticket {
    fn next(self) -> Self {
        Ticket(self.0 + 1)
    }
}

/// Roster snapshot to send to the match service.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub ticket: Ticket,
    pub request_id: Uuid,
    pub roster: Vec<Entity>,
}

/// Sequence to load for the current descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub request_id: Uuid,
    pub match_id: String,
    pub event_id: String,
    pub roster: Vec<EntityId>,
}

/// Network work the driver must perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RequestMatch(SearchRequest),
    FetchSequence(FetchRequest),
}

/// Most recent successful match, kept across dismiss.
#[derive(Debug, Clone, PartialEq)]
pub struct LastResult {
    pub descriptor: MatchDescriptor,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRecord {
    pub at: Duration,
    pub from: StateKind,
    pub to: StateKind,
}

pub struct PlaybackController<S: Scheduler = TimerQueue> {
    store: EntityStore,
    scheduler: S,
    timing: PlaybackConfig,
    state: PlaybackState,
    ticket: Ticket,
    request_id: Option<Uuid>,
    descriptor: Option<MatchDescriptor>,
    sequence: Option<FrameSequence>,
    frame_timer: Option<TimerHandle>,
    /// Deadline the armed frame tick was scheduled for
    frame_due: Duration,
    /// Fetch pause or auto reset, never both.
    pending_timer: Option<TimerHandle>,
    message: Option<String>,
    result_visible: bool,
    last_result: Option<LastResult>,
    transitions: VecDeque<TransitionRecord>,
}

impl PlaybackController<TimerQueue> {
    pub fn new(store: EntityStore, timing: PlaybackConfig) -> Self {
        Self::with_scheduler(store, timing, TimerQueue::new())
    }
}

impl<S: Scheduler> PlaybackController<S> {
    pub fn with_scheduler(store: EntityStore, timing: PlaybackConfig, scheduler: S) -> Self {
        Self {
            store,
            scheduler,
            timing,
            state: PlaybackState::Idle,
            ticket: Ticket::default(),
            request_id: None,
            descriptor: None,
            sequence: None,
            frame_timer: None,
            frame_due: Duration::ZERO,
            pending_timer: None,
            message: None,
            result_visible: false,
            last_result: None,
            transitions: VecDeque::with_capacity(TRANSITION_LOG_CAPACITY),
        }
    }

    // ========================
    // Accessors
    // ========================

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn descriptor(&self) -> Option<&MatchDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn sequence(&self) -> Option<&FrameSequence> {
        self.sequence.as_ref()
    }

    /// Transient status text, cleared on return to idle.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn result_visible(&self) -> bool {
        self.result_visible
    }

    pub fn last_result(&self) -> Option<&LastResult> {
        self.last_result.as_ref()
    }

    pub fn transitions(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.transitions.iter()
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn timing(&self) -> &PlaybackConfig {
        &self.timing
    }

    /// Earliest armed timer; the driver should call [`Self::advance`] then.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// `(frames shown, total frames)` while playing.
    pub fn progress(&self) -> Option<(usize, usize)> {
        let index = self.state.frame_index()?;
        let total = self.sequence.as_ref()?.len();
        Some((index + 1, total))
    }

    // ========================
    // User commands
    // ========================

    /// Drag a player. Only honoured while idle.
    pub fn drag(&mut self, id: EntityId, x: f32, y: f32) -> bool {
        if !self.state.is_idle() {
            debug!(%id, state = ?self.state.kind(), "drag rejected outside idle");
            return false;
        }
        self.store.set_position(id, x, y)
    }

    /// Begins a search cycle. `None` when a cycle is already running or its
    /// terminal status is still on screen.
    pub fn start_search(&mut self, now: Duration) -> Option<SearchRequest> {
        if !self.state.is_idle() {
            debug!(state = ?self.state.kind(), "find best play ignored: cycle in progress");
            return None;
        }

        self.ticket = self.ticket.next();
        let request_id = Uuid::new_v4();
        self.request_id = Some(request_id);
        self.descriptor = None;
        self.sequence = None;
        self.result_visible = false;

        if !self.transition(PlaybackState::Searching, now) {
            return None;
        }
        self.message = Some("Finding best play...".to_string());
        info!(%request_id, players = self.store.entities().len(), "searching for best matching play");

        Some(SearchRequest {
            ticket: self.ticket,
            request_id,
            roster: self.store.entities().to_vec(),
        })
    }

    /// Stops an in-flight cycle. Playback keeps the last applied frame on
    /// screen; pending responses become stale.
    pub fn user_stop(&mut self, now: Duration) -> bool {
        if !is_stoppable(self.state.kind()) {
            debug!(state = ?self.state.kind(), "stop ignored");
            return false;
        }

        let stopped_at = self.state.frame_index();
        self.cancel_timers();
        self.ticket = self.ticket.next();
        self.sequence = None;
        self.transition(PlaybackState::Cancelled, now);
        info!(frame = ?stopped_at, "playback stopped by user");

        self.reset_to_idle(now);
        true
    }

    /// Leaves a terminal state early and forgets the current result.
    pub fn dismiss(&mut self, now: Duration) -> bool {
        if !is_dismissable(self.state.kind()) {
            debug!(state = ?self.state.kind(), "dismiss ignored");
            return false;
        }
        self.descriptor = None;
        self.result_visible = false;
        self.reset_to_idle(now);
        true
    }

    /// Hides the result panel; the descriptor is kept.
    pub fn hide_result(&mut self) {
        self.result_visible = false;
    }

    // ========================
    // Results and timers
    // ========================

    /// Feeds back the outcome of a [`SearchRequest`]. Returns the fetch to
    /// issue right away when no fetch pause is configured.
    pub fn on_match_result(
        &mut self,
        ticket: Ticket,
        result: Result<MatchDescriptor, MatchError>,
        now: Duration,
    ) -> Option<FetchRequest> {
        if !self.accepts(ticket, StateKind::Searching) {
            return None;
        }

        let descriptor = match result {
            Ok(descriptor) => descriptor,
            Err(e) => {
                self.fail(FailureReason::Match(e), now);
                return None;
            }
        };

        info!(
            match_id = %descriptor.match_id,
            event_id = %descriptor.event_id,
            similarity = descriptor.similarity_score,
            quality = descriptor.quality_score,
            "best play found"
        );
        self.message =
            Some(format!("Found: Game {}, Event {}", descriptor.match_id, descriptor.event_id));
        self.last_result =
            Some(LastResult { descriptor: descriptor.clone(), received_at: Utc::now() });
        self.descriptor = Some(descriptor);
        self.result_visible = true;
        self.transition(PlaybackState::AwaitingSequence, now);

        if self.timing.fetch_delay.is_zero() {
            self.fetch_request()
        } else {
            self.pending_timer =
                Some(self.scheduler.schedule(now, self.timing.fetch_delay, Timer::FetchSequence));
            None
        }
    }

    /// Feeds back the outcome of a [`FetchRequest`]. On success frame 0 is
    /// applied immediately and the frame clock starts.
    pub fn on_sequence_result(
        &mut self,
        ticket: Ticket,
        result: Result<FrameSequence, SequenceError>,
        now: Duration,
    ) {
        if !self.accepts(ticket, StateKind::AwaitingSequence) {
            return;
        }

        let sequence = match result {
            Ok(sequence) => sequence,
            Err(e) => {
                self.fail(FailureReason::Sequence(e), now);
                return;
            }
        };

        if let Err(e) = self.store.apply_frame(sequence.first()) {
            self.fail(FailureReason::Sequence(e), now);
            return;
        }

        let frames = sequence.len();
        self.message = Some(format!(
            "Playing: {} frames from {}",
            frames,
            sequence.note().unwrap_or("recorded game")
        ));
        self.sequence = Some(sequence);
        self.transition(PlaybackState::Playing { frame_index: 0 }, now);
        info!(frames, "playback started");

        self.arm_frame_clock(now);
    }

    /// Fires every timer due at `now`, in deadline order.
    pub fn advance(&mut self, now: Duration) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some((handle, timer)) = self.scheduler.pop_due(now) {
            if let Some(effect) = self.on_timer(handle, timer, now) {
                effects.push(effect);
            }
        }
        effects
    }

    fn on_timer(&mut self, handle: TimerHandle, timer: Timer, now: Duration) -> Option<Effect> {
        match timer {
            Timer::FrameTick => {
                if self.frame_timer == Some(handle) {
                    self.frame_timer = None;
                    self.tick(now);
                }
                None
            }
            Timer::FetchSequence => {
                if self.pending_timer != Some(handle) {
                    return None;
                }
                self.pending_timer = None;
                if self.state.kind() == StateKind::AwaitingSequence {
                    self.fetch_request().map(Effect::FetchSequence)
                } else {
                    None
                }
            }
            Timer::ResetToIdle => {
                if self.pending_timer == Some(handle) {
                    self.pending_timer = None;
                    if self.state.is_terminal() {
                        self.reset_to_idle(now);
                    }
                }
                None
            }
        }
    }

    /// One frame clock step. An on-time tick keeps the cadence of the previous
    /// deadline; after a stall of a whole interval or more the clock restarts
    /// from `now`, so later frames are pushed back instead of skipped.
    fn tick(&mut self, now: Duration) {
        let Some(frame_index) = self.state.frame_index() else {
            return;
        };
        let Some(total) = self.sequence.as_ref().map(FrameSequence::len) else {
            return;
        };

        let next = frame_index + 1;
        if next >= total {
            self.transition(PlaybackState::Complete, now);
            self.message = Some("Animation complete!".to_string());
            info!(frames = total, "playback complete");
            self.pending_timer =
                Some(self.scheduler.schedule(now, self.timing.complete_display, Timer::ResetToIdle));
            return;
        }

        let applied = match self.sequence.as_ref().and_then(|s| s.get(next)) {
            Some(frame) => self.store.apply_frame(frame),
            None => return,
        };

        match applied {
            Ok(()) => {
                self.transition(PlaybackState::Playing { frame_index: next }, now);
                let base = if now >= self.frame_due + self.timing.frame_interval {
                    debug!(late_ms = (now - self.frame_due).as_millis() as u64, "frame clock stalled");
                    now
                } else {
                    self.frame_due
                };
                self.arm_frame_clock(base);
            }
            Err(SequenceError::IncompleteFrame { entity_id, .. }) => {
                let e = SequenceError::IncompleteFrame { frame_index: next, entity_id };
                self.fail(FailureReason::Sequence(e), now);
            }
            Err(e) => self.fail(FailureReason::Sequence(e), now),
        }
    }

    // ========================
    // Internals
    // ========================

    fn arm_frame_clock(&mut self, base: Duration) {
        self.frame_due = base + self.timing.frame_interval;
        self.frame_timer =
            Some(self.scheduler.schedule(base, self.timing.frame_interval, Timer::FrameTick));
    }

    fn accepts(&self, ticket: Ticket, expected: StateKind) -> bool {
        if ticket != self.ticket || self.state.kind() != expected {
            debug!(
                ?ticket,
                current = ?self.ticket,
                state = ?self.state.kind(),
                "discarding stale response"
            );
            return false;
        }
        true
    }

    fn fetch_request(&mut self) -> Option<FetchRequest> {
        let (match_id, event_id) = self
            .descriptor
            .as_ref()
            .map(|d| (d.match_id.clone(), d.event_id.clone()))?;

        self.message = Some(format!("Loading movement data: Game {match_id}, Event {event_id}..."));
        Some(FetchRequest {
            ticket: self.ticket,
            request_id: self.request_id.unwrap_or_else(Uuid::nil),
            match_id,
            event_id,
            roster: self.store.roster_ids(),
        })
    }

    fn fail(&mut self, reason: FailureReason, now: Duration) {
        let (delay, message) = match &reason {
            FailureReason::Match(e) => (self.timing.search_failure_display, format!("Error: {e}")),
            FailureReason::Sequence(e) => {
                (self.timing.failure_display, format!("Movement data not available: {e}"))
            }
        };
        warn!(%reason, transient = reason.is_transient(), "search cycle failed");

        self.cancel_timers();
        self.sequence = None;
        if self.transition(PlaybackState::Failed(reason), now) {
            self.message = Some(message);
            self.pending_timer = Some(self.scheduler.schedule(now, delay, Timer::ResetToIdle));
        }
    }

    fn reset_to_idle(&mut self, now: Duration) {
        self.cancel_timers();
        self.sequence = None;
        self.message = None;
        self.transition(PlaybackState::Idle, now);
    }

    fn cancel_timers(&mut self) {
        if let Some(handle) = self.frame_timer.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(handle) = self.pending_timer.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn transition(&mut self, to: PlaybackState, now: Duration) -> bool {
        let from = self.state.kind();
        let to_kind = to.kind();
        if let Err(e) = validate_transition(from, to_kind) {
            error!("{e}");
            return false;
        }

        if from != to_kind {
            debug!(?from, to = ?to_kind, at_ms = now.as_millis() as u64, "playback transition");
            if self.transitions.len() == TRANSITION_LOG_CAPACITY {
                self.transitions.pop_front();
            }
            self.transitions.push_back(TransitionRecord { at: now, from, to: to_kind });
        }

        if to_kind == StateKind::Idle {
            self.store.unlock();
        } else {
            self.store.lock();
        }
        self.state = to;
        true
    }
}
