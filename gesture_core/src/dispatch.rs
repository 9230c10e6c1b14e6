//! Delivery of emitted gestures to the consumer.

use std::time::{Duration, Instant};

use crate::gesture::GestureKind;

/// Receiver of gesture events.  Called at most once per frame, on the thread
/// that drives the tracker.  `at` is the time of the frame (or poll) that
/// produced the gesture, on the same clock the classifier uses.
pub trait GestureSink {
    fn on_gesture(&mut self, kind: GestureKind, at: Instant);
}

impl<F: FnMut(GestureKind)> GestureSink for F {
    fn on_gesture(&mut self, kind: GestureKind, _at: Instant) { self(kind) }
}

// ════════════════════════════════════════════════════════════════════════════
// FeedbackIndicator
// ════════════════════════════════════════════════════════════════════════════

/// Keeps the last gesture visible for a fixed time after it fired.
#[derive(Clone, Debug)]
pub struct FeedbackIndicator {
    lifetime: Duration,
    last:     Option<(GestureKind, Instant)>,
}

impl FeedbackIndicator {
    pub fn new(lifetime: Duration) -> Self { FeedbackIndicator { lifetime, last: None } }

    pub fn show(&mut self, kind: GestureKind, now: Instant) { self.last = Some((kind, now)); }

    /// The gesture to display at `now`, if it has not expired.
    pub fn current(&self, now: Instant) -> Option<GestureKind> {
        self.last
            .filter(|&(_, at)| now.saturating_duration_since(at) < self.lifetime)
            .map(|(kind, _)| kind)
    }

    pub fn clear(&mut self) { self.last = None; }
}

// ════════════════════════════════════════════════════════════════════════════
// Dispatcher
// ════════════════════════════════════════════════════════════════════════════

/// Forwards gestures to a sink and updates the feedback indicator.
pub struct Dispatcher<K: GestureSink> {
    sink:     K,
    feedback: FeedbackIndicator,
    count:    u64,
}

impl<K: GestureSink> Dispatcher<K> {
    pub fn new(sink: K, feedback_lifetime: Duration) -> Self {
        Dispatcher { sink, feedback: FeedbackIndicator::new(feedback_lifetime), count: 0 }
    }

    pub fn dispatch(&mut self, kind: GestureKind, now: Instant) {
        self.feedback.show(kind, now);
        self.count += 1;
        self.sink.on_gesture(kind, now);
    }

    pub fn feedback(&self, now: Instant) -> Option<GestureKind> { self.feedback.current(now) }

    pub fn clear_feedback(&mut self) { self.feedback.clear(); }

    /// Gestures dispatched since construction.
    pub fn dispatched(&self) -> u64 { self.count }

    pub fn sink(&self)         -> &K     { &self.sink }
    pub fn sink_mut(&mut self) -> &mut K { &mut self.sink }
    pub fn into_sink(self)     -> K      { self.sink }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_expires_after_lifetime() {
        let t0 = Instant::now();
        let mut f = FeedbackIndicator::new(Duration::from_millis(600));
        assert_eq!(f.current(t0), None);
        f.show(GestureKind::Pinch, t0);
        assert_eq!(f.current(t0 + Duration::from_millis(599)), Some(GestureKind::Pinch));
        assert_eq!(f.current(t0 + Duration::from_millis(600)), None);
    }

    #[test]
    fn newer_gesture_replaces_feedback() {
        let t0 = Instant::now();
        let mut f = FeedbackIndicator::new(Duration::from_millis(600));
        f.show(GestureKind::Tap, t0);
        f.show(GestureKind::SwipeUp, t0 + Duration::from_millis(300));
        assert_eq!(f.current(t0 + Duration::from_millis(800)), Some(GestureKind::SwipeUp));
        f.clear();
        assert_eq!(f.current(t0 + Duration::from_millis(800)), None);
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut d = Dispatcher::new(|k| seen.push(k), Duration::from_millis(600));
            d.dispatch(GestureKind::Pointing, Instant::now());
            d.dispatch(GestureKind::OpenPalm, Instant::now());
            assert_eq!(d.dispatched(), 2);
        }
        assert_eq!(seen, vec![GestureKind::Pointing, GestureKind::OpenPalm]);
    }

    struct Stamped(Vec<(GestureKind, Instant)>);

    impl GestureSink for Stamped {
        fn on_gesture(&mut self, kind: GestureKind, at: Instant) { self.0.push((kind, at)); }
    }

    #[test]
    fn sink_sees_dispatch_time() {
        let t0 = Instant::now();
        let at = t0 + Duration::from_millis(250);
        let mut d = Dispatcher::new(Stamped(Vec::new()), Duration::from_millis(600));
        d.dispatch(GestureKind::Tap, at);
        assert_eq!(d.feedback(at), Some(GestureKind::Tap));
        assert_eq!(d.into_sink().0, vec![(GestureKind::Tap, at)]);
    }
}
