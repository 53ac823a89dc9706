//! Synthesized key repeat for held keys.
//!
//! Browsers do send their own auto-repeat `key_down` events, but over a network
//! link those arrive late and in bursts.  Instead the relay starts a timer per
//! held key when it sees the first `key_down` and stops it on `key_up`.
//!
//! # Timer shape
//!
//! ```text
//! key_down ──── initial_delay ────▶ press ── rate ──▶ press ── rate ──▶ press …
//!                                                                      ▲
//!                                                     key_up: stop_repeat
//! ```
//!
//! Each timer is a tokio task.  Repeat presses go straight to the actuator and
//! bypass the event queue, so a long backlog never delays a held key.
//!
//! # Cancellation
//!
//! Stopping a timer sets its `cancelled` flag and aborts the task.  The task
//! checks the flag immediately before every press, so once `stop_repeat`
//! returns at most one press that had already passed the check can still land.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::application::actuator::Actuator;
use crate::domain::RepeatTiming;

/// `tokio::time::interval` panics on a zero period.
const MIN_REPEAT_RATE: Duration = Duration::from_millis(1);

struct RepeatTimer {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl RepeatTimer {
    fn cancel(self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }
}

/// Tracks at most one active repeat timer per logical key.
pub struct KeyRepeatManager {
    actuator: Arc<dyn Actuator>,
    timing: RepeatTiming,
    timers: Mutex<HashMap<String, RepeatTimer>>,
}

impl KeyRepeatManager {
    pub fn new(actuator: Arc<dyn Actuator>, timing: RepeatTiming) -> Self {
        let timing = RepeatTiming {
            rate: timing.rate.max(MIN_REPEAT_RATE),
            ..timing
        };
        Self {
            actuator,
            timing,
            timers: Mutex::new(HashMap::new()),
        }
    }

    pub fn timing(&self) -> RepeatTiming {
        self.timing
    }

    /// Starts repeating `key`.  Does nothing if `key` already has a live timer,
    /// so browser auto-repeat `key_down`s never stack timers.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime, since the timer is spawned
    /// as a task.
    pub fn start_repeat(&self, key: &str, code: &str) {
        let mut timers = self.lock();
        if let Some(existing) = timers.get(key) {
            if !existing.task.is_finished() {
                return;
            }
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(repeat_key(
            Arc::clone(&self.actuator),
            key.to_string(),
            code.to_string(),
            self.timing,
            Arc::clone(&cancelled),
        ));
        timers.insert(key.to_string(), RepeatTimer { cancelled, task });
        debug!(key, code, "key repeat armed");
    }

    /// Stops repeating `key`.  Does nothing if `key` is not repeating.
    pub fn stop_repeat(&self, key: &str) {
        let removed = self.lock().remove(key);
        if let Some(timer) = removed {
            timer.cancel();
            debug!(key, "key repeat stopped");
        }
    }

    /// Stops every active timer.  Used at shutdown.
    pub fn stop_all(&self) {
        let timers: Vec<RepeatTimer> = self.lock().drain().map(|(_, t)| t).collect();
        if !timers.is_empty() {
            debug!(count = timers.len(), "stopping all key repeats");
        }
        for timer in timers {
            timer.cancel();
        }
    }

    pub fn is_repeating(&self, key: &str) -> bool {
        self.lock()
            .get(key)
            .is_some_and(|timer| !timer.task.is_finished())
    }

    /// Number of keys with a registered timer.
    pub fn active_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RepeatTimer>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for KeyRepeatManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// Body of one repeat timer task.  Runs until cancelled.
async fn repeat_key(
    actuator: Arc<dyn Actuator>,
    key: String,
    code: String,
    timing: RepeatTiming,
    cancelled: Arc<AtomicBool>,
) {
    tokio::time::sleep(timing.initial_delay).await;

    let mut ticker = tokio::time::interval(timing.rate);
    // A slow actuator call pushes the schedule back instead of bursting.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if cancelled.load(Ordering::SeqCst) {
            break;
        }
        if let Err(e) = actuator.key_down(&key, &code) {
            warn!(key = %key, "repeat press failed: {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
