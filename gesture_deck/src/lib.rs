//! # gesture_deck
//!
//! Hand-gesture media deck: a small MIDI playlist player driven by gestures
//! recognised by `gesture_core`, with a software-rendered camera view showing
//! the hand skeleton, the screen zones and gesture feedback.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Tap (fist, once) | Toggle play / pause |
//! | Double tap | Toggle like on the current track |
//! | Pointing (index only, held) | Play |
//! | Open palm (held) | Pause |
//! | Swipe left / right | Previous / next track (wraps) |
//! | Swipe up / down | Volume up / down |
//! | Pinch | Toggle mute |
//! | Thumbs up | Like the current track |
//!
//! "Previous" restarts the current track instead once it has played for
//! more than three seconds.
//!
//! ## Landmark sources
//!
//! * `sim` (default) — **Simulation mode**: the mouse moves a synthetic
//!   hand over the camera view and the keyboard picks its shape.
//! * `process` — an external program owns the camera and streams 21-point
//!   landmarks as JSON lines (see [`sources::ProcessDetector`]).
//! * `leap` — **Hardware mode**: a LeapMotion controller via LeapC
//!   (requires the `leap` feature).
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | Mouse over camera view | Move the index fingertip |
//! | `1`–`6` | Fist, pointing, open palm, thumbs up, pinch, peace |
//! | `Space` (hold) | Close the hand into a fist |
//! | `H` | Hide / show the hand |
//! | `T` | Stop / start tracking |
//! | `Q` / `Esc` | Quit |

pub mod error;
pub mod config;
pub mod cli;
pub mod player;
pub mod transport;
pub mod sources;
pub mod visualizer;
pub mod app;
