//! The per-frame gesture state machine.
//!
//! # Algorithm
//!
//! For every frame with a hand:
//!
//! 1. Smooth the index tip, map it to a zone, append the raw tip to history.
//! 2. Classify finger states and note whether a fist press is waiting to be
//!    registered (a held fist is one press).
//! 3. If the cooldown has elapsed, evaluate hypotheses in strict priority
//!    and stop at the first that fires:
//!    pinch → thumbs-up → pointing (held) → open palm (held) → swipe → tap.
//!
//! Any emitted gesture restarts the cooldown, clears the history so residual
//! motion cannot re-trigger a swipe, and cancels an undecided tap.  A single
//! tap is confirmed later by [`GestureClassifier::poll`].

use std::time::Instant;

use tracing::{debug, trace};

use crate::arbiter::{Cooldown, TapOutcome, TapTracker};
use crate::config::GestureConfig;
use crate::fingers::{Finger, FingerStates};
use crate::gesture::GestureKind;
use crate::history::GestureHistory;
use crate::landmarks::{HandPose, Point};
use crate::smoother::PositionSmoother;
use crate::zones::{zone_at, Zone};

// ════════════════════════════════════════════════════════════════════════════
// Readout — auxiliary values for the UI
// ════════════════════════════════════════════════════════════════════════════

/// What the UI may show about the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReadout {
    /// Smoothed index-tip position in raw camera space.
    pub position:   Option<Point>,
    pub zone:       Option<Zone>,
    /// Index-tip velocity for this frame (raw − previous smoothed).
    pub velocity:   Point,
    /// 0–100, derived from the extended-finger count; 0 without a hand.
    pub confidence: u8,
    pub fingers:    Option<FingerStates>,
}

/// Result of one [`GestureClassifier::process`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameOutcome {
    pub gesture: Option<GestureKind>,
    pub readout: FrameReadout,
}

// ════════════════════════════════════════════════════════════════════════════
// Hold counters
// ════════════════════════════════════════════════════════════════════════════

/// Consecutive-frame counters for the low-distinctiveness static poses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct HoldCounters {
    pointing:  u32,
    open_palm: u32,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

/// All cross-frame recognition state for one tracking session.
#[derive(Clone, Debug)]
pub struct GestureClassifier {
    cfg:      GestureConfig,
    smoother: PositionSmoother,
    history:  GestureHistory,
    counters: HoldCounters,
    taps:     TapTracker,
    cooldown: Cooldown,
    readout:  FrameReadout,
}

impl GestureClassifier {
    pub fn new(cfg: GestureConfig) -> Self {
        GestureClassifier {
            smoother: PositionSmoother::new(cfg.smoothing),
            history:  GestureHistory::new(cfg.history_capacity),
            counters: HoldCounters::default(),
            taps:     TapTracker::new(&cfg),
            cooldown: Cooldown::new(cfg.cooldown()),
            readout:  FrameReadout::default(),
            cfg,
        }
    }

    pub fn config(&self) -> &GestureConfig { &self.cfg }

    /// Process one frame.  `None` means the detector saw no hand.
    pub fn process(&mut self, pose: Option<&HandPose>, now: Instant) -> FrameOutcome {
        let pose = match pose {
            Some(p) => p,
            None => {
                // Display state only; history, counters and cooldown persist.
                self.readout = FrameReadout::default();
                return FrameOutcome { gesture: None, readout: self.readout };
            }
        };

        let raw      = pose.index_tip();
        let smoothed = self.smoother.update(raw);
        self.history.push(raw);

        let fingers = FingerStates::classify(pose, self.cfg.extension_margin);
        let press   = fingers.is_fist() && self.taps.observe_fist(now);

        self.readout = FrameReadout {
            position:   Some(smoothed),
            zone:       zone_at(smoothed),
            velocity:   self.smoother.velocity(),
            confidence: fingers.confidence(),
            fingers:    Some(fingers),
        };
        trace!(?fingers, x = smoothed.x, y = smoothed.y, "frame");

        let gesture = if self.cooldown.ready(now) {
            self.evaluate(pose, fingers, press, now)
        } else {
            None
        };

        if let Some(kind) = gesture {
            self.emit(kind, now);
        }
        FrameOutcome { gesture, readout: self.readout }
    }

    /// Confirm a lone tap whose window has closed.  Call regularly, with or
    /// without frames; the confirmation is independent of the cooldown.
    pub fn poll(&mut self, now: Instant) -> Option<GestureKind> {
        if self.taps.poll(now) {
            self.emit(GestureKind::Tap, now);
            Some(GestureKind::Tap)
        } else {
            None
        }
    }

    /// Strict-priority evaluation; the first matching hypothesis wins.
    fn evaluate(
        &mut self,
        pose:    &HandPose,
        fingers: FingerStates,
        press:   bool,
        now:     Instant,
    ) -> Option<GestureKind> {
        use Finger::*;

        // 1. Pinch
        if pose.pinch_distance() < self.cfg.pinch_threshold
            && !fingers.is_extended(Middle)
            && !fingers.is_extended(Ring)
        {
            return Some(GestureKind::Pinch);
        }

        // 2. Thumbs up (screen y grows downward)
        if fingers.only(Thumb) && pose.thumb_tip().y < pose.wrist().y - self.cfg.thumbs_up_margin {
            return Some(GestureKind::ThumbsUp);
        }

        // 3. Pointing, held
        if fingers.only(Index) {
            self.counters.pointing += 1;
            if self.counters.pointing >= self.cfg.pointing_frames {
                self.counters.pointing = 0;
                return Some(GestureKind::Pointing);
            }
        } else {
            self.counters.pointing = 0;
        }

        // 4. Open palm, held
        if fingers.extended_count() >= 4 {
            self.counters.open_palm += 1;
            if self.counters.open_palm >= self.cfg.open_palm_frames {
                self.counters.open_palm = 0;
                return Some(GestureKind::OpenPalm);
            }
        } else {
            self.counters.open_palm = 0;
        }

        // 5. Swipe
        if let Some(swipe) = self.detect_swipe() {
            return Some(swipe);
        }

        // 6. Fist → tap / double-tap
        if press {
            if let TapOutcome::DoubleTap = self.taps.register(now) {
                return Some(GestureKind::DoubleTap);
            }
        }

        None
    }

    fn detect_swipe(&self) -> Option<GestureKind> {
        if self.history.len() < self.cfg.swipe_min_samples {
            return None;
        }
        let d = self.history.displacement();
        let v = self.history.mean_step_speed();
        let (dx, dy) = (d.x.abs(), d.y.abs());

        if dx > self.cfg.swipe_min_distance
            && dx > dy * self.cfg.swipe_dominance
            && v.x > self.cfg.swipe_min_velocity
        {
            // Raw +x is the user's leftward motion on the mirrored display.
            return Some(if d.x > 0.0 { GestureKind::SwipeLeft } else { GestureKind::SwipeRight });
        }

        if dy > self.cfg.swipe_min_distance
            && dy > dx * self.cfg.swipe_dominance
            && v.y > self.cfg.swipe_min_velocity
        {
            return Some(if d.y > 0.0 { GestureKind::SwipeDown } else { GestureKind::SwipeUp });
        }

        None
    }

    fn emit(&mut self, kind: GestureKind, now: Instant) {
        debug!(gesture = %kind, "gesture fired");
        self.cooldown.fire(now);
        self.history.clear();
        if kind != GestureKind::Tap && kind != GestureKind::DoubleTap {
            self.taps.cancel_pending();
        }
    }

    /// Return every piece of session state to its initial value.
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.history.clear();
        self.counters = HoldCounters::default();
        self.taps.reset();
        self.cooldown.reset();
        self.readout = FrameReadout::default();
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn readout(&self)         -> &FrameReadout   { &self.readout }
    pub fn history(&self)         -> &GestureHistory { &self.history }
    pub fn smoothed(&self)        -> Option<Point>   { self.smoother.position() }
    pub fn pointing_streak(&self) -> u32             { self.counters.pointing }
    pub fn palm_streak(&self)     -> u32             { self.counters.open_palm }
    pub fn tap_pending(&self)     -> bool            { self.taps.has_pending() }
    pub fn cooling_down(&self, now: Instant) -> bool { !self.cooldown.ready(now) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::synthetic::{HandShape, SyntheticHand};

    const FRAME: u64 = 33;

    fn at(t0: Instant, ms: u64) -> Instant { t0 + Duration::from_millis(ms) }

    fn classifier() -> GestureClassifier { GestureClassifier::new(GestureConfig::default()) }

    /// Feed `frames` identical poses at 30 fps starting at `start_ms`;
    /// returns `(frame_index, gesture)` for every emission.
    fn hold(
        c: &mut GestureClassifier,
        t0: Instant,
        start_ms: u64,
        frames: usize,
        pose: &HandPose,
    ) -> Vec<(usize, GestureKind)> {
        let mut fired = Vec::new();
        for i in 0..frames {
            let now = at(t0, start_ms + i as u64 * FRAME);
            if let Some(g) = c.poll(now) { fired.push((i, g)); }
            if let Some(g) = c.process(Some(pose), now).gesture { fired.push((i, g)); }
        }
        fired
    }

    #[test]
    fn pinch_fires_on_first_frame() {
        let t0 = Instant::now();
        let mut c = classifier();
        let pose = SyntheticHand::at(0.5, 0.6).pose(HandShape::Pinch);
        assert_eq!(c.process(Some(&pose), t0).gesture, Some(GestureKind::Pinch));
        assert!(c.history().is_empty());
    }

    #[test]
    fn thumbs_up_requires_thumb_above_wrist() {
        let t0 = Instant::now();
        let mut c = classifier();
        let up = SyntheticHand::at(0.5, 0.6).pose(HandShape::ThumbsUp);
        assert_eq!(c.process(Some(&up), t0).gesture, Some(GestureKind::ThumbsUp));

        // Same finger pattern rotated upside down: thumb below the wrist.
        let mut c = classifier();
        let down = SyntheticHand::at(0.5, 0.4).rotated(std::f32::consts::PI).pose(HandShape::ThumbsUp);
        let fired = hold(&mut c, t0, 0, 10, &down);
        assert!(fired.iter().all(|(_, g)| *g != GestureKind::ThumbsUp));
    }

    #[test]
    fn pointing_needs_four_frames() {
        let t0 = Instant::now();
        let mut c = classifier();
        let pose = SyntheticHand::at(0.5, 0.6).pose(HandShape::Pointing);
        let fired = hold(&mut c, t0, 0, 5, &pose);
        assert_eq!(fired, vec![(3, GestureKind::Pointing)]);
    }

    #[test]
    fn pointing_streak_resets_on_break() {
        let t0 = Instant::now();
        let mut c = classifier();
        let hand = SyntheticHand::at(0.5, 0.6);
        let point = hand.pose(HandShape::Pointing);
        let peace = hand.pose(HandShape::Peace);

        hold(&mut c, t0, 0, 3, &point);
        assert_eq!(c.pointing_streak(), 3);
        c.process(Some(&peace), at(t0, 99));
        assert_eq!(c.pointing_streak(), 0);
        let fired = hold(&mut c, t0, 132, 3, &point);
        assert!(fired.is_empty());
    }

    #[test]
    fn open_palm_needs_five_frames_then_cools_down() {
        let t0 = Instant::now();
        let mut c = classifier();
        let pose = SyntheticHand::at(0.5, 0.6).pose(HandShape::OpenPalm);
        let fired = hold(&mut c, t0, 0, 4, &pose);
        assert!(fired.is_empty());
        assert_eq!(c.palm_streak(), 4);
        let fired = hold(&mut c, t0, 4 * FRAME, 8, &pose);
        assert_eq!(fired, vec![(0, GestureKind::OpenPalm)]);
        assert_eq!(c.palm_streak(), 0);
        assert!(c.cooling_down(at(t0, 11 * FRAME)));
    }

    #[test]
    fn held_pose_refires_only_after_cooldown() {
        let t0 = Instant::now();
        let mut c = classifier();
        let pose = SyntheticHand::at(0.5, 0.6).pose(HandShape::OpenPalm);
        // 2 s of an open palm
        let fired = hold(&mut c, t0, 0, 60, &pose);
        let frames: Vec<usize> = fired.iter().map(|(i, _)| *i).collect();
        assert!(frames.len() >= 2);
        for pair in frames.windows(2) {
            assert!((pair[1] - pair[0]) as u64 * FRAME >= 600);
        }
    }

    #[test]
    fn swipe_right_for_rightward_display_motion() {
        let t0 = Instant::now();
        let mut c = classifier();
        // Raw x decreasing = moving right on the mirrored display.
        let mut fired = Vec::new();
        for i in 0..10 {
            let pose = SyntheticHand::at(0.7 - 0.02 * i as f32, 0.6).pose(HandShape::Peace);
            if let Some(g) = c.process(Some(&pose), at(t0, i * FRAME)).gesture {
                fired.push(g);
            }
        }
        assert_eq!(fired, vec![GestureKind::SwipeRight]);
        assert!(c.history().is_empty());
    }

    #[test]
    fn swipe_left_for_raw_positive_x() {
        let t0 = Instant::now();
        let mut c = classifier();
        let mut fired = Vec::new();
        for i in 0..10 {
            let pose = SyntheticHand::at(0.3 + 0.02 * i as f32, 0.6).pose(HandShape::Peace);
            fired.extend(c.process(Some(&pose), at(t0, i * FRAME)).gesture);
        }
        assert_eq!(fired, vec![GestureKind::SwipeLeft]);
    }

    #[test]
    fn vertical_swipes_are_not_mirrored() {
        let t0 = Instant::now();
        let mut c = classifier();
        let mut fired = Vec::new();
        for i in 0..10 {
            let pose = SyntheticHand::at(0.5, 0.75 - 0.02 * i as f32).pose(HandShape::Peace);
            fired.extend(c.process(Some(&pose), at(t0, i * FRAME)).gesture);
        }
        assert_eq!(fired, vec![GestureKind::SwipeUp]);

        let mut c = classifier();
        let mut fired = Vec::new();
        for i in 0..10 {
            let pose = SyntheticHand::at(0.5, 0.45 + 0.02 * i as f32).pose(HandShape::Peace);
            fired.extend(c.process(Some(&pose), at(t0, i * FRAME)).gesture);
        }
        assert_eq!(fired, vec![GestureKind::SwipeDown]);
    }

    #[test]
    fn diagonal_motion_is_not_a_swipe() {
        let t0 = Instant::now();
        let mut c = classifier();
        let mut fired = Vec::new();
        for i in 0..12 {
            let d = 0.02 * i as f32;
            let pose = SyntheticHand::at(0.3 + d, 0.4 + d).pose(HandShape::Peace);
            fired.extend(c.process(Some(&pose), at(t0, i * FRAME)).gesture);
        }
        assert!(fired.is_empty());
    }

    #[test]
    fn slow_drift_is_not_a_swipe() {
        let t0 = Instant::now();
        let mut c = classifier();
        let mut fired = Vec::new();
        for i in 0..15 {
            let pose = SyntheticHand::at(0.5 + 0.005 * i as f32, 0.6).pose(HandShape::Peace);
            fired.extend(c.process(Some(&pose), at(t0, i * FRAME)).gesture);
        }
        assert!(fired.is_empty());
    }

    #[test]
    fn pinch_preempts_qualifying_swipe() {
        let t0 = Instant::now();
        let mut c = classifier();
        // Nine frames of fast motion, then a pinch while still moving.
        for i in 0..9 {
            let pose = SyntheticHand::at(0.7 - 0.02 * i as f32, 0.6).pose(HandShape::Peace);
            assert_eq!(c.process(Some(&pose), at(t0, i * FRAME)).gesture, None);
        }
        let pinch = SyntheticHand::at(0.7 - 0.02 * 9.0, 0.6).pose(HandShape::Pinch);
        assert_eq!(c.process(Some(&pinch), at(t0, 9 * FRAME)).gesture, Some(GestureKind::Pinch));
    }

    #[test]
    fn lone_fist_becomes_tap_after_window() {
        let t0 = Instant::now();
        let mut c = classifier();
        let fist = SyntheticHand::at(0.5, 0.6).pose(HandShape::Fist);
        assert_eq!(c.process(Some(&fist), t0).gesture, None);
        assert!(c.tap_pending());
        assert_eq!(c.poll(at(t0, 400)), None);
        assert_eq!(c.poll(at(t0, 500)), Some(GestureKind::Tap));
        assert_eq!(c.poll(at(t0, 900)), None);
    }

    #[test]
    fn held_fist_is_a_single_tap() {
        let t0 = Instant::now();
        let mut c = classifier();
        let fist = SyntheticHand::at(0.5, 0.6).pose(HandShape::Fist);
        let fired = hold(&mut c, t0, 0, 30, &fist);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1, GestureKind::Tap);
    }

    #[test]
    fn two_separate_fists_are_a_double_tap() {
        let t0 = Instant::now();
        let mut c = classifier();
        let hand = SyntheticHand::at(0.5, 0.6);
        let fist = hand.pose(HandShape::Fist);
        let open = hand.pose(HandShape::Peace);

        let mut fired = Vec::new();
        fired.extend(c.process(Some(&fist), t0).gesture);
        for ms in [66, 132, 198] {
            fired.extend(c.process(Some(&open), at(t0, ms)).gesture);
        }
        fired.extend(c.process(Some(&fist), at(t0, 264)).gesture);
        for ms in (300..1200).step_by(33) {
            fired.extend(c.poll(at(t0, ms)));
        }
        assert_eq!(fired, vec![GestureKind::DoubleTap]);
    }

    #[test]
    fn pointing_cancels_undecided_tap() {
        // Index-only is also a "fist" by finger count; once pointing fires,
        // the press its first frame started must not confirm as a tap.
        let t0 = Instant::now();
        let mut c = classifier();
        let pose = SyntheticHand::at(0.5, 0.6).pose(HandShape::Pointing);
        let mut fired = hold(&mut c, t0, 0, 4, &pose);
        for ms in (150..1500).step_by(33) {
            fired.extend(c.poll(at(t0, ms)).map(|g| (0, g)));
        }
        let kinds: Vec<GestureKind> = fired.into_iter().map(|(_, g)| g).collect();
        assert_eq!(kinds, vec![GestureKind::Pointing]);
    }

    #[test]
    fn no_hand_clears_readout_but_keeps_history() {
        let t0 = Instant::now();
        let mut c = classifier();
        let pose = SyntheticHand::at(0.5, 0.6).pose(HandShape::Peace);
        let out = c.process(Some(&pose), t0);
        assert!(out.readout.position.is_some());
        assert_eq!(out.readout.confidence, 60);

        let out = c.process(None, at(t0, 33));
        assert_eq!(out.readout, FrameReadout::default());
        assert_eq!(c.history().len(), 1);
        assert!(c.smoothed().is_some());
    }

    #[test]
    fn reset_restores_initial_state() {
        let t0 = Instant::now();
        let mut c = classifier();
        let hand = SyntheticHand::at(0.5, 0.6);
        hold(&mut c, t0, 0, 3, &hand.pose(HandShape::Pointing));
        c.process(Some(&hand.pose(HandShape::Pinch)), at(t0, 100));
        c.reset();
        assert!(c.history().is_empty());
        assert!(c.smoothed().is_none());
        assert_eq!(c.pointing_streak(), 0);
        assert!(!c.cooling_down(at(t0, 101)));
        assert!(!c.tap_pending());
    }

    #[test]
    fn readout_zone_follows_smoothed_cursor() {
        let t0 = Instant::now();
        let mut c = classifier();
        let hand = SyntheticHand::at(0.5, 0.55);
        let out = c.process(Some(&hand.pose(HandShape::Peace)), t0);
        let tip = hand.pose(HandShape::Peace).index_tip();
        assert_eq!(out.readout.position, Some(tip));
        assert_eq!(out.readout.zone, zone_at(tip));
    }
}
