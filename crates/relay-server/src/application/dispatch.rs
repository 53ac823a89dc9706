//! The dispatch loop: single consumer of the event queue.
//!
//! ```text
//! EventQueue ──take_with_timeout──▶ DispatchLoop ──▶ Actuator
//!                                       │
//!                                       └── errors: log, count, carry on
//! ```
//!
//! The loop runs as one tokio task.  It drains the queue until the shared
//! `running` flag is cleared; the flag is re-checked at least once per
//! `poll_interval`, which bounds shutdown latency.  A failed actuation is
//! logged and counted, and never ends the loop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use relay_core::{Event, Payload};
use tracing::{debug, error, info};

use crate::application::actuator::{ActuationError, Actuator};
use crate::application::event_queue::EventQueue;

/// Counters shared between the dispatch loop and whoever wants to report on it.
#[derive(Debug, Default)]
pub struct DispatchStats {
    dispatched: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

impl DispatchStats {
    /// Events that reached the actuator successfully.
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    /// Events whose actuator call returned an error.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Control events that reached the loop and were ignored.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

/// What happened to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Actuated,
    /// Control kinds are answered at ingestion and have no actuator mapping.
    Skipped,
}

/// Maps one event onto the matching actuator call.
///
/// # Errors
///
/// Propagates the actuator's error unchanged.
pub fn actuate(actuator: &dyn Actuator, event: &Event) -> Result<DispatchOutcome, ActuationError> {
    match event.payload() {
        Payload::PointerMove(m) => actuator.move_mouse(m.x, m.y)?,
        Payload::PointerDown(b) => actuator.mouse_down(b.button, b.x, b.y)?,
        Payload::PointerUp(b) => actuator.mouse_up(b.button, b.x, b.y)?,
        Payload::KeyDown(k) => actuator.key_down(&k.key, &k.code)?,
        Payload::KeyUp(k) => actuator.key_up(&k.key, &k.code)?,
        Payload::Echo(_) | Payload::Ping => return Ok(DispatchOutcome::Skipped),
    }
    Ok(DispatchOutcome::Actuated)
}

/// Drains an [`EventQueue`] into an [`Actuator`].
pub struct DispatchLoop {
    queue: Arc<EventQueue>,
    actuator: Arc<dyn Actuator>,
    poll_interval: Duration,
    stats: Arc<DispatchStats>,
}

impl DispatchLoop {
    pub fn new(
        queue: Arc<EventQueue>,
        actuator: Arc<dyn Actuator>,
        poll_interval: Duration,
        stats: Arc<DispatchStats>,
    ) -> Self {
        Self {
            queue,
            actuator,
            poll_interval,
            stats,
        }
    }

    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    /// Runs until `running` is cleared.  Events still queued at that point
    /// are left undelivered.
    pub async fn run(self, running: Arc<AtomicBool>) {
        info!(poll_interval = ?self.poll_interval, "dispatch loop started");

        while running.load(Ordering::SeqCst) {
            if let Some(event) = self.queue.take_with_timeout(self.poll_interval).await {
                self.dispatch_one(&event);
            }
        }

        info!(
            dispatched = self.stats.dispatched(),
            failed = self.stats.failed(),
            undelivered = self.queue.backlog_size(),
            "dispatch loop stopped"
        );
    }

    /// Actuates one event and records the outcome.  Never fails.
    pub fn dispatch_one(&self, event: &Event) {
        match actuate(self.actuator.as_ref(), event) {
            Ok(DispatchOutcome::Actuated) => {
                self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
            }
            Ok(DispatchOutcome::Skipped) => {
                debug!(kind = %event.kind(), "control event reached dispatch; ignored");
                self.stats.skipped.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                error!(kind = %event.kind(), "actuation failed: {e}");
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::actuator::MockActuator;
    use mockall::Sequence;
    use relay_core::MouseButton;

    fn dispatch_loop(actuator: MockActuator) -> (DispatchLoop, Arc<EventQueue>) {
        let queue = Arc::new(EventQueue::new());
        let looper = DispatchLoop::new(
            Arc::clone(&queue),
            Arc::new(actuator),
            Duration::from_millis(50),
            Arc::new(DispatchStats::default()),
        );
        (looper, queue)
    }

    #[test]
    fn test_each_kind_maps_to_its_actuator_call() {
        // Arrange
        let mut mock = MockActuator::new();
        let mut seq = Sequence::new();
        mock.expect_move_mouse()
            .withf(|x, y| *x == 0.25 && *y == 0.75)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_mouse_down()
            .withf(|b, _, _| *b == MouseButton::Right)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        mock.expect_mouse_up()
            .withf(|b, _, _| *b == MouseButton::Right)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        mock.expect_key_down()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_key_up()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let (looper, _) = dispatch_loop(mock);

        // Act
        for event in [
            Event::pointer_move(0.25, 0.75),
            Event::pointer_down(MouseButton::Right, 0.5, 0.5),
            Event::pointer_up(MouseButton::Right, 0.5, 0.5),
            Event::key_down("a", "KeyA"),
            Event::key_up("a", "KeyA"),
        ] {
            looper.dispatch_one(&event);
        }

        // Assert
        assert_eq!(looper.stats().dispatched(), 5);
        assert_eq!(looper.stats().failed(), 0);
    }

    #[test]
    fn test_control_events_never_reach_actuator() {
        // Arrange: a mock with no expectations panics on any call
        let (looper, _) = dispatch_loop(MockActuator::new());

        // Act
        looper.dispatch_one(&Event::ping());
        looper.dispatch_one(&Event::echo("hello"));

        // Assert
        assert_eq!(looper.stats().skipped(), 2);
        assert_eq!(looper.stats().dispatched(), 0);
    }

    #[test]
    fn test_actuator_error_is_counted_and_swallowed() {
        // Arrange
        let mut mock = MockActuator::new();
        mock.expect_key_down()
            .times(1)
            .returning(|_, _| Err(ActuationError::PermissionDenied));
        mock.expect_move_mouse().times(1).returning(|_, _| Ok(()));
        let (looper, _) = dispatch_loop(mock);

        // Act
        looper.dispatch_one(&Event::key_down("a", "KeyA"));
        looper.dispatch_one(&Event::pointer_move(0.1, 0.1));

        // Assert
        assert_eq!(looper.stats().failed(), 1);
        assert_eq!(looper.stats().dispatched(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_drains_queue_and_stops_on_flag() {
        // Arrange
        let mut mock = MockActuator::new();
        mock.expect_key_down().times(1).returning(|_, _| Ok(()));
        mock.expect_key_up().times(1).returning(|_, _| Ok(()));
        let (looper, queue) = dispatch_loop(mock);
        let stats = looper.stats();
        let running = Arc::new(AtomicBool::new(true));
        queue.submit(Event::key_down("a", "KeyA"));
        queue.submit(Event::key_up("a", "KeyA"));

        // Act
        let handle = tokio::spawn(looper.run(Arc::clone(&running)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        running.store(false, Ordering::SeqCst);
        tokio::time::timeout(Duration::from_millis(200), handle)
            .await
            .expect("loop exits within a couple of poll intervals")
            .unwrap();

        // Assert
        assert_eq!(stats.dispatched(), 2);
        assert!(!queue.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_survives_failures() {
        // Arrange
        let mut mock = MockActuator::new();
        mock.expect_move_mouse()
            .times(3)
            .returning(|_, _| Err(ActuationError::Platform("display gone".into())));
        let (looper, queue) = dispatch_loop(mock);
        let stats = looper.stats();
        let running = Arc::new(AtomicBool::new(true));
        let handle = tokio::spawn(looper.run(Arc::clone(&running)));

        // Act: three separate motion samples, each taken before the next arrives
        for i in 0..3 {
            queue.submit(Event::pointer_move(0.1 * f64::from(i), 0.5));
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        running.store(false, Ordering::SeqCst);
        handle.await.unwrap();

        // Assert
        assert_eq!(stats.failed(), 3);
    }
}
