//! Actuator implementations.
//!
//! - [`logging::LoggingActuator`] writes every call to the `tracing` log.  It
//!   is what the `relay-server` binary runs with, and is the place to start
//!   when wiring up a real OS injection back-end.
//! - [`mock::RecordingActuator`] records calls in memory for tests.

pub mod logging;
pub mod mock;

pub use logging::{LoggingActuator, ScreenGeometry};
pub use mock::{ActuatorCall, RecordingActuator};
