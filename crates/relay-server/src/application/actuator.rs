//! The actuator seam: where relayed input leaves this process.
//!
//! The dispatch loop and the key repeat timers both call an [`Actuator`]
//! trait object.  Concrete implementations live in the infrastructure layer
//! (`infrastructure::actuation`), so the application layer never touches an
//! OS input API directly and can be tested with a recording or mocked actuator.

use relay_core::MouseButton;
use thiserror::Error;

/// Error type for actuation calls.
#[derive(Debug, Error)]
pub enum ActuationError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("input injection not permitted by the host")]
    PermissionDenied,
}

/// Platform-agnostic input actuation.
///
/// Coordinates are normalized to `[0, 1]`; mapping them to pixels is the
/// implementation's job.  Calls may block on OS work, so callers must never
/// hold a lock across them.  An implementation that silently does nothing
/// (for example because the host denied the permission) is valid.
#[cfg_attr(test, mockall::automock)]
pub trait Actuator: Send + Sync {
    /// Moves the pointer to an absolute normalized position.
    fn move_mouse(&self, x: f64, y: f64) -> Result<(), ActuationError>;

    /// Presses `button` at the given normalized position.
    fn mouse_down(&self, button: MouseButton, x: f64, y: f64) -> Result<(), ActuationError>;

    /// Releases `button` at the given normalized position.
    fn mouse_up(&self, button: MouseButton, x: f64, y: f64) -> Result<(), ActuationError>;

    /// Presses the key with logical value `key`.  `code` is the physical key
    /// identifier and may be ignored.
    fn key_down(&self, key: &str, code: &str) -> Result<(), ActuationError>;

    /// Releases the key with logical value `key`.
    fn key_up(&self, key: &str, code: &str) -> Result<(), ActuationError>;
}
