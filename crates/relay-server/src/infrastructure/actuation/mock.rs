//! Recording actuator for tests.
//!
//! Every call is appended to one ordered log, so tests can assert on the
//! exact interleaving of pointer and key actions (for example, that a pending
//! move reached the actuator before the click that flushed it).
//!
//! # Usage in tests
//!
//! ```ignore
//! let actuator = Arc::new(RecordingActuator::new());
//! let service = Arc::new(RelayService::new(ServerConfig::default(), actuator.clone()));
//! // ... drive the service ...
//! assert_eq!(actuator.key_down_count("a"), 1);
//! ```
//!
//! # Failure injection
//!
//! [`RecordingActuator::set_should_fail`] makes every later call record itself
//! and then return [`ActuationError::Platform`], to exercise error paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use relay_core::MouseButton;

use crate::application::actuator::{ActuationError, Actuator};

/// One recorded actuator call.
#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    MoveMouse { x: f64, y: f64 },
    MouseDown { button: MouseButton, x: f64, y: f64 },
    MouseUp { button: MouseButton, x: f64, y: f64 },
    KeyDown { key: String, code: String },
    KeyUp { key: String, code: String },
}

/// Records all calls without touching the OS.
#[derive(Debug, Default)]
pub struct RecordingActuator {
    calls: Mutex<Vec<ActuatorCall>>,
    should_fail: AtomicBool,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of every call so far, in order.
    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.lock().clone()
    }

    /// Number of `key_down` calls for `key`, including repeats.
    pub fn key_down_count(&self, key: &str) -> usize {
        self.lock()
            .iter()
            .filter(|call| matches!(call, ActuatorCall::KeyDown { key: k, .. } if k == key))
            .count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn record(&self, call: ActuatorCall) -> Result<(), ActuationError> {
        self.lock().push(call);
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(ActuationError::Platform("mock failure".into()));
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ActuatorCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Actuator for RecordingActuator {
    fn move_mouse(&self, x: f64, y: f64) -> Result<(), ActuationError> {
        self.record(ActuatorCall::MoveMouse { x, y })
    }

    fn mouse_down(&self, button: MouseButton, x: f64, y: f64) -> Result<(), ActuationError> {
        self.record(ActuatorCall::MouseDown { button, x, y })
    }

    fn mouse_up(&self, button: MouseButton, x: f64, y: f64) -> Result<(), ActuationError> {
        self.record(ActuatorCall::MouseUp { button, x, y })
    }

    fn key_down(&self, key: &str, code: &str) -> Result<(), ActuationError> {
        self.record(ActuatorCall::KeyDown {
            key: key.to_string(),
            code: code.to_string(),
        })
    }

    fn key_up(&self, key: &str, code: &str) -> Result<(), ActuationError> {
        self.record(ActuatorCall::KeyUp {
            key: key.to_string(),
            code: code.to_string(),
        })
    }
}
