//! Tracking session lifecycle.
//!
//! [`GestureTracker`] ties a running detector to the classifier and the
//! dispatcher.  It is driven from one thread: call [`GestureTracker::pump`]
//! regularly (once per UI frame is plenty) and it drains the detector feed,
//! classifies each frame and confirms deferred taps.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::classifier::{FrameReadout, GestureClassifier};
use crate::config::GestureConfig;
use crate::detector::{spawn_detection, DetectionFeed, FeedEvent, HandDetector};
use crate::dispatch::{Dispatcher, GestureSink};
use crate::gesture::GestureKind;
use crate::landmarks::{HandPose, Point};
use crate::zones::Zone;
use crate::{Error, Result};

/// Where the session is in its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackingState {
    Stopped,
    /// Detector thread started, acquisition not yet confirmed.
    Loading,
    Tracking,
    /// Acquisition failed.  Holds the user-visible message.
    Failed(String),
}

pub struct GestureTracker<K: GestureSink> {
    classifier: GestureClassifier,
    dispatcher: Dispatcher<K>,
    feed:       Option<DetectionFeed>,
    state:      TrackingState,
    /// Landmarks of the most recent frame, for drawing.
    pose:       Option<HandPose>,
}

impl<K: GestureSink> GestureTracker<K> {
    pub fn new(cfg: GestureConfig, sink: K) -> Self {
        let feedback = cfg.feedback();
        GestureTracker {
            classifier: GestureClassifier::new(cfg),
            dispatcher: Dispatcher::new(sink, feedback),
            feed:       None,
            state:      TrackingState::Stopped,
            pose:       None,
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────────────────

    /// Begin a session with `detector`.  A no-op while already tracking or
    /// loading.  The acquisition result arrives through [`pump`](Self::pump)
    /// or [`await_ready`](Self::await_ready).
    pub fn start(&mut self, detector: Box<dyn HandDetector>) {
        if matches!(self.state, TrackingState::Tracking | TrackingState::Loading) {
            debug!("start ignored: session already running");
            return;
        }
        info!(detector = detector.name(), "starting gesture tracking");
        self.classifier.reset();
        self.dispatcher.clear_feedback();
        self.pose = None;
        self.feed  = Some(spawn_detection(detector));
        self.state = TrackingState::Loading;
    }

    /// Tear down the detector and reset all session state.  Never fails,
    /// including when nothing was started.
    pub fn stop(&mut self) {
        if let Some(mut feed) = self.feed.take() {
            feed.stop();
            info!(dropped = feed.dropped(), "gesture tracking stopped");
        }
        self.classifier.reset();
        self.dispatcher.clear_feedback();
        self.pose = None;
        if !matches!(self.state, TrackingState::Failed(_)) {
            self.state = TrackingState::Stopped;
        }
    }

    /// Block until acquisition succeeds or fails, or `timeout` passes.
    /// Returns `Ok(true)` once tracking.
    pub fn await_ready(&mut self, timeout: Duration) -> Result<bool> {
        if self.state != TrackingState::Loading {
            return Ok(self.state == TrackingState::Tracking);
        }
        let event = match &self.feed {
            Some(feed) => feed.next_event_timeout(timeout),
            None       => None,
        };
        match event {
            Some(FeedEvent::Ready) => {
                self.state = TrackingState::Tracking;
                Ok(true)
            }
            Some(FeedEvent::Failed(e)) => Err(self.fail(e)),
            Some(FeedEvent::Closed)    => Err(self.fail(closed())),
            Some(FeedEvent::Frame(_)) | None => Ok(false),
        }
    }

    /// Drain the detector feed and run the deferred tap confirmation.
    ///
    /// Returns `Err` exactly once when acquisition fails; the error is also
    /// kept as [`TrackingState::Failed`].
    pub fn pump(&mut self, now: Instant) -> Result<Option<GestureKind>> {
        let mut fired = None;
        loop {
            let event = match &self.feed {
                Some(feed) => feed.next_event(),
                None       => None,
            };
            match event {
                None => break,
                Some(FeedEvent::Ready) => {
                    info!("hand detector ready");
                    self.state = TrackingState::Tracking;
                }
                Some(FeedEvent::Frame(d)) => {
                    if let Some(g) = self.handle_frame(d.pose.as_ref(), d.captured_at) {
                        fired = Some(g);
                    }
                }
                Some(FeedEvent::Failed(e)) => return Err(self.fail(e)),
                Some(FeedEvent::Closed)    => return Err(self.fail(closed())),
            }
        }
        if let Some(g) = self.confirm_tap(now) {
            fired = Some(g);
        }
        Ok(fired)
    }

    fn fail(&mut self, e: Error) -> Error {
        warn!(error = %e, "gesture tracking failed");
        if let Some(mut feed) = self.feed.take() {
            feed.stop();
        }
        self.classifier.reset();
        self.dispatcher.clear_feedback();
        self.pose = None;
        self.state = TrackingState::Failed(e.to_string());
        e
    }

    // ── Frame injection ────────────────────────────────────────────────────

    /// Classify one frame and dispatch any gesture.  Ignored unless tracking.
    pub fn handle_frame(&mut self, pose: Option<&HandPose>, now: Instant) -> Option<GestureKind> {
        if self.state != TrackingState::Tracking {
            return None;
        }
        self.pose = pose.cloned();
        // A confirmed tap restarts the cooldown, so `process` below only
        // updates position, history and counters for this frame.
        let tap = self.confirm_tap(now);
        let outcome = self.classifier.process(pose, now);
        if let Some(g) = outcome.gesture {
            self.dispatcher.dispatch(g, now);
        }
        tap.or(outcome.gesture)
    }

    fn confirm_tap(&mut self, now: Instant) -> Option<GestureKind> {
        if self.state != TrackingState::Tracking {
            return None;
        }
        let g = self.classifier.poll(now)?;
        self.dispatcher.dispatch(g, now);
        Some(g)
    }

    // ── Read-only outputs ──────────────────────────────────────────────────

    pub fn state(&self)       -> &TrackingState { &self.state }
    pub fn is_tracking(&self) -> bool           { self.state == TrackingState::Tracking }
    pub fn is_loading(&self)  -> bool           { self.state == TrackingState::Loading }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            TrackingState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn readout(&self)       -> &FrameReadout { self.classifier.readout() }
    pub fn pose(&self)          -> Option<&HandPose> { self.pose.as_ref() }
    pub fn hand_position(&self) -> Option<Point> { self.classifier.readout().position }
    pub fn current_zone(&self)  -> Option<Zone>  { self.classifier.readout().zone }
    pub fn confidence(&self)    -> u8            { self.classifier.readout().confidence }

    /// Last gesture, while its feedback is still visible.
    pub fn feedback(&self, now: Instant) -> Option<GestureKind> { self.dispatcher.feedback(now) }

    pub fn dropped_frames(&self) -> u64 { self.feed.as_ref().map_or(0, |f| f.dropped()) }

    pub fn classifier(&self) -> &GestureClassifier { &self.classifier }
    pub fn sink(&self)         -> &K     { self.dispatcher.sink() }
    pub fn sink_mut(&mut self) -> &mut K { self.dispatcher.sink_mut() }
}

fn closed() -> Error { Error::Camera("detector stream ended".to_string()) }

impl<K: GestureSink> Drop for GestureTracker<K> {
    fn drop(&mut self) {
        if let Some(mut feed) = self.feed.take() {
            feed.stop();
        }
    }
}
