//! Cooldown and tap-timing arbitration.
//!
//! [`Cooldown`] spaces out emitted gestures.  [`TapTracker`] decides between
//! a tap and a double-tap, which needs a deferred decision: a lone press is
//! indistinguishable from the first half of a double-tap until the window
//! closes.  The deferral is a stored deadline checked by [`TapTracker::poll`],
//! so dropping or resetting the tracker cancels it.

use std::time::{Duration, Instant};

use crate::config::GestureConfig;

// ════════════════════════════════════════════════════════════════════════════
// Cooldown
// ════════════════════════════════════════════════════════════════════════════

/// Single shared "last gesture fired" timestamp.
#[derive(Clone, Debug)]
pub struct Cooldown {
    period:     Duration,
    last_fired: Option<Instant>,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self { Cooldown { period, last_fired: None } }

    /// True once `period` has elapsed since the last gesture (or none fired yet).
    pub fn ready(&self, now: Instant) -> bool {
        match self.last_fired {
            None    => true,
            Some(t) => now.saturating_duration_since(t) >= self.period,
        }
    }

    pub fn fire(&mut self, now: Instant) { self.last_fired = Some(now); }

    pub fn last_fired(&self) -> Option<Instant> { self.last_fired }

    pub fn reset(&mut self) { self.last_fired = None; }
}

// ════════════════════════════════════════════════════════════════════════════
// TapTracker
// ════════════════════════════════════════════════════════════════════════════

/// Tap / double-tap timing state.
#[derive(Clone, Debug)]
pub struct TapTracker {
    min_interval: Duration,
    window:       Duration,
    confirm:      Duration,
    settle:       Duration,

    last_tap:  Option<Instant>,
    count:     u32,
    /// Last frame that showed a fist, evaluated or not.
    last_fist: Option<Instant>,
    /// A press has started but has not reached tap evaluation yet.
    armed:     bool,
    /// Deadline of the deferred single-tap confirmation.
    pending:   Option<Instant>,
}

/// Result of registering a press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// Too close to the previous press, or a second press not yet decisive.
    Ignored,
    /// First press; a single tap will be confirmed by `poll` unless a second arrives.
    Pending,
    /// Second press inside the window.
    DoubleTap,
}

impl TapTracker {
    pub fn new(cfg: &GestureConfig) -> Self {
        TapTracker {
            min_interval: cfg.tap_min_interval(),
            window:       cfg.tap_window(),
            confirm:      cfg.tap_confirm(),
            settle:       cfg.tap_settle(),
            last_tap:  None,
            count:     0,
            last_fist: None,
            armed:     false,
            pending:   None,
        }
    }

    /// Note a frame showing a fist and report whether a press is waiting to
    /// be registered.
    ///
    /// Consecutive fist frames closer than `min_interval` belong to the same
    /// press, so a held fist counts once.  The press stays armed until
    /// [`register`](Self::register) takes it, which lets a fist closed during
    /// the cooldown count on the first frame evaluated afterwards.
    pub fn observe_fist(&mut self, now: Instant) -> bool {
        let onset = match self.last_fist {
            None    => true,
            Some(t) => now.saturating_duration_since(t) >= self.min_interval,
        };
        self.last_fist = Some(now);
        if onset {
            self.armed = true;
        }
        self.armed
    }

    /// Register a press that reached the tap stage of classification.
    pub fn register(&mut self, now: Instant) -> TapOutcome {
        self.armed = false;
        let since = self.last_tap.map(|t| now.saturating_duration_since(t));
        match since {
            Some(s) if s > self.min_interval && s < self.window => {
                self.count += 1;
                if self.count >= 2 {
                    self.count   = 0;
                    self.pending = None;
                    TapOutcome::DoubleTap
                } else {
                    TapOutcome::Ignored
                }
            }
            Some(s) if s < self.window => TapOutcome::Ignored,
            _ => {
                self.count    = 1;
                self.last_tap = Some(now);
                self.pending  = Some(now + self.confirm);
                TapOutcome::Pending
            }
        }
    }

    /// Run the deferred confirmation.  Returns `true` exactly once per lone
    /// press, at or after its deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        let deadline = match self.pending {
            Some(d) => d,
            None    => return false,
        };
        if now < deadline {
            return false;
        }
        self.pending = None;
        let settled = self.last_tap
            .map(|t| now.saturating_duration_since(t) > self.settle)
            .unwrap_or(false);
        let confirmed = self.count == 1 && settled;
        self.count = 0;
        confirmed
    }

    pub fn has_pending(&self) -> bool { self.pending.is_some() }

    /// Drop an undecided press; another gesture has taken precedence.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
        self.count   = 0;
        self.armed   = false;
    }

    pub fn reset(&mut self) {
        self.last_tap  = None;
        self.count     = 0;
        self.last_fist = None;
        self.armed     = false;
        self.pending   = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    fn tracker() -> TapTracker { TapTracker::new(&GestureConfig::default()) }

    #[test]
    fn cooldown_gates_until_period_elapses() {
        let t0 = Instant::now();
        let mut c = Cooldown::new(ms(600));
        assert!(c.ready(t0));
        c.fire(t0);
        assert!(!c.ready(t0 + ms(599)));
        assert!(c.ready(t0 + ms(600)));
        c.reset();
        assert!(c.ready(t0 + ms(1)));
    }

    #[test]
    fn held_fist_is_one_press() {
        let t0 = Instant::now();
        let mut t = tracker();
        assert!(t.observe_fist(t0));
        t.register(t0);
        assert!(!t.observe_fist(t0 + ms(33)));
        assert!(!t.observe_fist(t0 + ms(66)));
        // released for a while, then closed again
        assert!(t.observe_fist(t0 + ms(300)));
    }

    #[test]
    fn unregistered_press_stays_armed() {
        let t0 = Instant::now();
        let mut t = tracker();
        assert!(t.observe_fist(t0));
        // still the same press, but nothing has registered it yet
        assert!(t.observe_fist(t0 + ms(33)));
        assert_eq!(t.register(t0 + ms(66)), TapOutcome::Pending);
        assert!(!t.observe_fist(t0 + ms(99)));

        // another gesture won: the press is dropped, not carried over
        t.cancel_pending();
        assert!(!t.observe_fist(t0 + ms(132)));
    }

    #[test]
    fn lone_press_confirms_after_window() {
        let t0 = Instant::now();
        let mut t = tracker();
        assert_eq!(t.register(t0), TapOutcome::Pending);
        assert!(!t.poll(t0 + ms(499)));
        assert!(t.poll(t0 + ms(500)));
        assert!(!t.poll(t0 + ms(900)));
    }

    #[test]
    fn second_press_in_window_is_double_tap() {
        let t0 = Instant::now();
        let mut t = tracker();
        assert_eq!(t.register(t0), TapOutcome::Pending);
        assert_eq!(t.register(t0 + ms(250)), TapOutcome::DoubleTap);
        assert!(!t.has_pending());
        assert!(!t.poll(t0 + ms(600)));
    }

    #[test]
    fn second_press_too_soon_is_ignored() {
        let t0 = Instant::now();
        let mut t = tracker();
        t.register(t0);
        assert_eq!(t.register(t0 + ms(80)), TapOutcome::Ignored);
        assert!(t.poll(t0 + ms(500)));
    }

    #[test]
    fn late_press_starts_fresh() {
        let t0 = Instant::now();
        let mut t = tracker();
        t.register(t0);
        assert!(t.poll(t0 + ms(500)));
        assert_eq!(t.register(t0 + ms(700)), TapOutcome::Pending);
    }

    #[test]
    fn cancel_and_reset_drop_pending_confirmation() {
        let t0 = Instant::now();
        let mut t = tracker();
        t.register(t0);
        t.cancel_pending();
        assert!(!t.poll(t0 + ms(600)));

        t.register(t0 + ms(1000));
        t.reset();
        assert!(!t.poll(t0 + ms(2000)));
        assert!(t.observe_fist(t0 + ms(2001)));
    }
}
