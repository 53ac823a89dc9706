//! An actuator that reports input instead of injecting it.
//!
//! Useful for dry runs, for checking what a browser actually sends, and on
//! hosts where injection is not permitted.  Coordinates are converted to
//! pixels against a fixed [`ScreenGeometry`] so the log reads the way a real
//! back-end would see it.

use relay_core::{LogicalKey, MouseButton};
use tracing::info;

use crate::application::actuator::{ActuationError, Actuator};

/// Size of the target display in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenGeometry {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl ScreenGeometry {
    /// Maps normalized `[0, 1]` coordinates to the nearest pixel, clamped to
    /// the last row and column.
    pub fn to_pixels(&self, x: f64, y: f64) -> (u32, u32) {
        (scale(x, self.width), scale(y, self.height))
    }
}

fn scale(unit: f64, extent: u32) -> u32 {
    let max = extent.saturating_sub(1);
    let scaled = (unit.clamp(0.0, 1.0) * f64::from(max)).round();
    // In range [0, max] after the clamp above.
    scaled as u32
}

/// Logs each call at `info` and always succeeds.
#[derive(Debug, Default)]
pub struct LoggingActuator {
    screen: ScreenGeometry,
}

impl LoggingActuator {
    pub fn new(screen: ScreenGeometry) -> Self {
        Self { screen }
    }
}

impl Actuator for LoggingActuator {
    fn move_mouse(&self, x: f64, y: f64) -> Result<(), ActuationError> {
        let (px, py) = self.screen.to_pixels(x, y);
        info!(target: "relay::actuate", px, py, "move");
        Ok(())
    }

    fn mouse_down(&self, button: MouseButton, x: f64, y: f64) -> Result<(), ActuationError> {
        let (px, py) = self.screen.to_pixels(x, y);
        info!(target: "relay::actuate", %button, px, py, "mouse down");
        Ok(())
    }

    fn mouse_up(&self, button: MouseButton, x: f64, y: f64) -> Result<(), ActuationError> {
        let (px, py) = self.screen.to_pixels(x, y);
        info!(target: "relay::actuate", %button, px, py, "mouse up");
        Ok(())
    }

    fn key_down(&self, key: &str, code: &str) -> Result<(), ActuationError> {
        let logical = LogicalKey::from_key_value(key);
        info!(target: "relay::actuate", key = %logical, code, "key down");
        Ok(())
    }

    fn key_up(&self, key: &str, code: &str) -> Result<(), ActuationError> {
        let logical = LogicalKey::from_key_value(key);
        info!(target: "relay::actuate", key = %logical, code, "key up");
        Ok(())
    }
}
