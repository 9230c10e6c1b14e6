//! Exponential smoothing of the tracked fingertip.

use crate::landmarks::Point;

/// Low-pass filter for the cursor position.
///
/// The first sample seeds the filter directly.  Velocity is measured
/// against the *previous* smoothed value so it reacts to sudden motion
/// instead of lagging with the filtered signal.
#[derive(Clone, Debug)]
pub struct PositionSmoother {
    alpha:    f32,
    smoothed: Option<Point>,
    velocity: Point,
}

impl PositionSmoother {
    pub fn new(alpha: f32) -> Self {
        PositionSmoother { alpha, smoothed: None, velocity: Point::default() }
    }

    /// Feed one raw sample and return the new smoothed position.
    pub fn update(&mut self, raw: Point) -> Point {
        let next = match self.smoothed {
            None => {
                self.velocity = Point::default();
                raw
            }
            Some(prev) => {
                self.velocity = raw - prev;
                prev + (raw - prev) * self.alpha
            }
        };
        self.smoothed = Some(next);
        next
    }

    pub fn position(&self) -> Option<Point> { self.smoothed }

    /// Velocity computed by the last [`update`](Self::update).
    pub fn velocity(&self) -> Point { self.velocity }

    pub fn reset(&mut self) {
        self.smoothed = None;
        self.velocity = Point::default();
    }
}
