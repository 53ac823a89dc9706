//! Coalescing event queue between the ingestion path and the dispatch loop.
//!
//! # Why not a plain channel?
//!
//! A browser can emit pointer motion at display refresh rate or faster, while
//! each injected event may cost the host a noticeable amount of time.  Queueing
//! every motion sample makes the pointer lag further and further behind the
//! user.  Only the *latest* pointer position matters, so motion is kept in a
//! single pending slot that each new sample overwrites.
//!
//! Everything else (button and key transitions) must arrive exactly once and in
//! order, so those go to a FIFO backlog.  When a non-motion event arrives while
//! a motion sample is pending, the sample is flushed to the backlog first so
//! that, for example, a click lands where the pointer was last reported.
//!
//! ```text
//! submit(move A)   pending=[A]  backlog=[]
//! submit(move B)   pending=[B]  backlog=[]            (A discarded)
//! submit(key x)    pending=[]   backlog=[B, x]        (B flushed first)
//! submit(move C)   pending=[C]  backlog=[B, x]
//! try_take() -> C  (pending slot is checked before the backlog)
//! ```
//!
//! The last line is deliberate: a fresh motion sample is delivered ahead of
//! older backlog entries, trading strict global FIFO for pointer latency.
//!
//! # Locking
//!
//! All state sits behind one `std::sync::Mutex`.  Every public method takes the
//! lock once, applies its whole update, and releases it before returning, so
//! no caller can observe a half-flushed state.  The lock is never held across
//! an `.await` or an actuator call.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use relay_core::Event;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct QueueState {
    /// At most one `pointer_move`, the most recent not yet delivered.
    pending_motion: Option<Event>,
    /// Non-motion events in arrival order, plus motion samples flushed ahead
    /// of them.
    backlog: VecDeque<Event>,
}

/// Multi-producer, single-consumer event buffer with motion coalescing.
#[derive(Debug, Default)]
pub struct EventQueue {
    state: Mutex<QueueState>,
    /// Wakes a consumer parked in [`EventQueue::take_with_timeout`].
    submitted: Notify,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `event` to the queue.  Never fails and never blocks beyond the
    /// state lock.
    ///
    /// - `pointer_move` replaces whatever motion sample is pending.
    /// - Any other kind flushes the pending motion sample (if any) to the
    ///   backlog, then appends itself.
    pub fn submit(&self, event: Event) {
        {
            let mut state = self.lock();
            if event.is_motion() {
                state.pending_motion = Some(event);
            } else {
                if let Some(motion) = state.pending_motion.take() {
                    state.backlog.push_back(motion);
                }
                state.backlog.push_back(event);
            }
        }
        self.submitted.notify_one();
    }

    /// Removes and returns the next event without waiting.
    ///
    /// The pending motion slot is checked before the backlog.
    pub fn try_take(&self) -> Option<Event> {
        let mut state = self.lock();
        if let Some(motion) = state.pending_motion.take() {
            return Some(motion);
        }
        state.backlog.pop_front()
    }

    /// Returns the next event, waiting at most `wait` if the queue is empty.
    ///
    /// This is a single-shot bounded wait: if nothing is available it parks
    /// until a submit arrives or `wait` elapses, then tries exactly once more
    /// and returns the result, which may still be `None`.  Callers that drain
    /// continuously loop on this call.
    pub async fn take_with_timeout(&self, wait: Duration) -> Option<Event> {
        if let Some(event) = self.try_take() {
            return Some(event);
        }
        // Elapsed and woken both fall through to the second attempt.
        let _ = tokio::time::timeout(wait, self.submitted.notified()).await;
        self.try_take()
    }

    /// Number of undelivered events: backlog length plus one for an occupied
    /// motion slot.
    pub fn backlog_size(&self) -> usize {
        let state = self.lock();
        state.backlog.len() + usize::from(state.pending_motion.is_some())
    }

    /// `true` if any event is waiting.
    pub fn has_pending(&self) -> bool {
        let state = self.lock();
        state.pending_motion.is_some() || !state.backlog.is_empty()
    }

    // Every critical section leaves the state consistent, so a panic in
    // another holder does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
