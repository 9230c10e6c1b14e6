//! Recognition thresholds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Every numeric threshold used by the classifier, arbiter and dispatcher.
///
/// Distances are in normalized image units (the frame is `[0,1]×[0,1]`),
/// frame counts are consecutive *evaluated* frames, and times are
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// A finger is extended when `|wrist→tip| > |wrist→mcp| · margin`.
    pub extension_margin:    f32,
    /// Exponential smoothing weight for the cursor (0 < α ≤ 1).
    pub smoothing:           f32,
    /// Raw positions kept for swipe detection.
    pub history_capacity:    usize,
    /// Samples required before a swipe is considered.
    pub swipe_min_samples:   usize,
    pub swipe_min_distance:  f32,
    /// Mean per-step speed (units/frame) along the swipe axis.
    pub swipe_min_velocity:  f32,
    /// Dominant axis must exceed the other by this factor.
    pub swipe_dominance:     f32,
    pub pinch_threshold:     f32,
    /// Thumb tip must sit this far above the wrist for thumbs-up.
    pub thumbs_up_margin:    f32,
    pub pointing_frames:     u32,
    pub open_palm_frames:    u32,
    pub cooldown_ms:         u64,
    /// Fist frames closer together than this belong to the same tap.
    pub tap_min_interval_ms: u64,
    /// A second tap must land within this window to make a double-tap.
    pub tap_window_ms:       u64,
    /// Delay before a lone tap is confirmed.
    pub tap_confirm_ms:      u64,
    /// Minimum quiet time since the last tap when confirming.
    pub tap_settle_ms:       u64,
    /// How long the last gesture stays visible as UI feedback.
    pub feedback_ms:         u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            extension_margin:    1.1,
            smoothing:           0.3,
            history_capacity:    15,
            swipe_min_samples:   10,
            swipe_min_distance:  0.12,
            swipe_min_velocity:  0.008,
            swipe_dominance:     1.5,
            pinch_threshold:     0.06,
            thumbs_up_margin:    0.1,
            pointing_frames:     4,
            open_palm_frames:    5,
            cooldown_ms:         600,
            tap_min_interval_ms: 100,
            tap_window_ms:       500,
            tap_confirm_ms:      500,
            tap_settle_ms:       450,
            feedback_ms:         600,
        }
    }
}

impl GestureConfig {
    /// Check that values are within usable ranges.
    /// Returns the first offending field as an [`Error::Config`].
    pub fn validate(&self) -> Result<()> {
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(Error::Config(format!(
                "smoothing must be in (0, 1], got {}", self.smoothing
            )));
        }
        if self.extension_margin < 1.0 {
            return Err(Error::Config(format!(
                "extension_margin must be >= 1.0, got {}", self.extension_margin
            )));
        }
        if self.swipe_min_samples < 2 {
            return Err(Error::Config(format!(
                "swipe_min_samples must be >= 2, got {}", self.swipe_min_samples
            )));
        }
        if self.history_capacity < self.swipe_min_samples {
            return Err(Error::Config(format!(
                "history_capacity ({}) must hold swipe_min_samples ({})",
                self.history_capacity, self.swipe_min_samples
            )));
        }
        if self.swipe_dominance < 1.0 {
            return Err(Error::Config(format!(
                "swipe_dominance must be >= 1.0, got {}", self.swipe_dominance
            )));
        }
        if self.pinch_threshold <= 0.0 || self.swipe_min_distance <= 0.0 {
            return Err(Error::Config("distance thresholds must be positive".to_string()));
        }
        if self.pointing_frames == 0 || self.open_palm_frames == 0 {
            return Err(Error::Config("hold frame counts must be > 0".to_string()));
        }
        if self.tap_min_interval_ms >= self.tap_window_ms {
            return Err(Error::Config(format!(
                "tap_min_interval_ms ({}) must be below tap_window_ms ({})",
                self.tap_min_interval_ms, self.tap_window_ms
            )));
        }
        if self.tap_settle_ms > self.tap_confirm_ms {
            return Err(Error::Config(format!(
                "tap_settle_ms ({}) must not exceed tap_confirm_ms ({})",
                self.tap_settle_ms, self.tap_confirm_ms
            )));
        }
        Ok(())
    }

    pub fn cooldown(&self)         -> Duration { Duration::from_millis(self.cooldown_ms) }
    pub fn tap_min_interval(&self) -> Duration { Duration::from_millis(self.tap_min_interval_ms) }
    pub fn tap_window(&self)       -> Duration { Duration::from_millis(self.tap_window_ms) }
    pub fn tap_confirm(&self)      -> Duration { Duration::from_millis(self.tap_confirm_ms) }
    pub fn tap_settle(&self)       -> Duration { Duration::from_millis(self.tap_settle_ms) }
    pub fn feedback(&self)         -> Duration { Duration::from_millis(self.feedback_ms) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GestureConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_smoothing() {
        let cfg = GestureConfig { smoothing: 0.0, ..GestureConfig::default() };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_history_smaller_than_swipe_window() {
        let cfg = GestureConfig { history_capacity: 8, ..GestureConfig::default() };
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("history_capacity"));
    }

    #[test]
    fn rejects_inverted_tap_window() {
        let cfg = GestureConfig { tap_min_interval_ms: 600, ..GestureConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: GestureConfig = toml::from_str("cooldown_ms = 500\npinch_threshold = 0.05\n").unwrap();
        assert_eq!(cfg.cooldown(), Duration::from_millis(500));
        assert_eq!(cfg.pinch_threshold, 0.05);
        assert_eq!(cfg.history_capacity, 15);
    }
}
