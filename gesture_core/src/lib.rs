//! # gesture_core
//!
//! Frame-driven hand-gesture recognition for playback control.
//!
//! Each frame delivers zero or one hand of 21 normalized landmarks.  The
//! pipeline derives finger states, smooths the index-fingertip position,
//! keeps a short motion history and evaluates a fixed priority of gesture
//! hypotheses.  A shared cooldown turns continuous gesture *presence* into
//! discrete gesture *events*.
//!
//! ## Pipeline
//!
//! ```text
//!  HandDetector ──▶ DetectionFeed ──▶ GestureClassifier ──▶ Dispatcher ──▶ GestureSink
//!  (external)      (drops frames)     fingers / smoother     (feedback)     (the player)
//!                                     zones / history
//!                                     cooldown / taps
//! ```
//!
//! ## Gesture priority
//!
//! | # | Gesture | Condition | Hold |
//! |---|---|---|---|
//! | 1 | `pinch` | thumb tip ↔ index tip < 0.06, middle + ring flexed | — |
//! | 2 | `thumbs-up` | only thumb extended, tip ≥ 0.1 above wrist | — |
//! | 3 | `pointing` | only index extended | 4 frames |
//! | 4 | `open-palm` | ≥ 4 fingers extended | 5 frames |
//! | 5 | `swipe-*` | ≥ 10 history samples, dominant axis, distance + speed | — |
//! | 6 | `tap` / `double-tap` | fist (≤ 1 extended, thumb flexed) | timing |
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use gesture_core::{GestureClassifier, GestureConfig, GestureKind, HandShape, SyntheticHand};
//!
//! let mut classifier = GestureClassifier::new(GestureConfig::default());
//! let hand = SyntheticHand::at(0.5, 0.6);
//! let t0 = Instant::now();
//!
//! let mut fired = None;
//! for i in 0..4 {
//!     let pose = hand.pose(HandShape::Pointing);
//!     let now = t0 + Duration::from_millis(33 * i);
//!     fired = classifier.process(Some(&pose), now).gesture;
//! }
//! assert_eq!(fired, Some(GestureKind::Pointing));
//! ```

pub mod error;
pub mod config;
pub mod landmarks;
pub mod fingers;
pub mod smoother;
pub mod zones;
pub mod history;
pub mod arbiter;
pub mod gesture;
pub mod classifier;
pub mod dispatch;
pub mod detector;
pub mod tracker;
pub mod synthetic;

pub use error::{Error, Result};
pub use config::GestureConfig;
pub use landmarks::{HandPose, Landmark, Point, FINGERTIPS, HAND_SKELETON, LANDMARK_COUNT};
pub use fingers::{Finger, FingerStates};
pub use smoother::PositionSmoother;
pub use zones::{Zone, zone_at};
pub use history::GestureHistory;
pub use arbiter::{Cooldown, TapTracker};
pub use gesture::GestureKind;
pub use classifier::{FrameOutcome, FrameReadout, GestureClassifier};
pub use dispatch::{Dispatcher, FeedbackIndicator, GestureSink};
pub use detector::{spawn_detection, Detection, DetectionFeed, FeedEvent, HandDetector, Interrupter};
pub use tracker::{GestureTracker, TrackingState};
pub use synthetic::{HandShape, SyntheticHand};
