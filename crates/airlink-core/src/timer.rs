//! Owned deadline timers.
//!
//! A [`Timer`] is a plain optional deadline stored inside the state it
//! drives. Nothing outside that state holds a reference to it: the host finds
//! due timers by walking the states it owns during `poll`. Dropping the state
//! drops its timer, so a timer can never fire against state that is gone.

use std::time::{Duration, Instant};

/// A one-shot, cancellable deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    /// Creates an unarmed timer.
    pub fn new() -> Self {
        Self { deadline: None }
    }

    /// Creates a timer armed to fire at `deadline`.
    pub fn armed(deadline: Instant) -> Self {
        Self { deadline: Some(deadline) }
    }

    /// Arms (or re-arms) the timer to fire at `deadline`.
    pub fn schedule(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    /// Arms (or re-arms) the timer to fire `delay` after `now`.
    pub fn schedule_in(&mut self, now: Instant, delay: Duration) {
        self.schedule(now + delay);
    }

    /// Disarms the timer. A cancelled timer never fires.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns whether the timer is armed.
    pub fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns the armed deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns whether the timer is armed and its deadline has passed.
    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Disarms the timer and returns true if it was due at `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}
