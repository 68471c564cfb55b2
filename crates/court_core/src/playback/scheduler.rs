//! Timer scheduling for the playback controller.
//!
//! Time is a `Duration` offset on the session timeline, so the same queue
//! runs under a real clock (the session driver) or a hand-stepped one (tests).

use std::collections::BTreeMap;
use std::time::Duration;

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Advance playback by one frame
    FrameTick,
    /// Result display pause is over, fetch the frames
    FetchSequence,
    /// Terminal status has been shown long enough
    ResetToIdle,
}

/// Cancellation handle returned by [`Scheduler::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

pub trait Scheduler {
    /// Arms `timer` to fire at `now + delay`.
    fn schedule(&mut self, now: Duration, delay: Duration, timer: Timer) -> TimerHandle;

    /// Disarms a timer. Returns `false` if it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Earliest armed deadline.
    fn next_deadline(&self) -> Option<Duration>;

    /// Removes and returns the earliest timer due at `now`, if any.
    fn pop_due(&mut self, now: Duration) -> Option<(TimerHandle, Timer)>;
}

/// Ordered timer queue. Timers with the same deadline fire in scheduling order.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    entries: BTreeMap<(Duration, TimerHandle), Timer>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, now: Duration, delay: Duration, timer: Timer) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.insert((now.saturating_add(delay), handle), timer);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let key = self.entries.keys().find(|(_, h)| *h == handle).copied();
        match key {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    fn pop_due(&mut self, now: Duration) -> Option<(TimerHandle, Timer)> {
        let (&(deadline, handle), _) = self.entries.iter().next()?;
        if deadline > now {
            return None;
        }
        self.entries.remove(&(deadline, handle)).map(|timer| (handle, timer))
    }
}
