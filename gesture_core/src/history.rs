//! Rolling window of recent raw fingertip positions.
//!
//! Insertion order matters: the oldest sample is the swipe's start point.

use std::collections::VecDeque;

use crate::landmarks::Point;

/// Fixed-capacity FIFO of raw positions used for swipe detection.
#[derive(Clone, Debug)]
pub struct GestureHistory {
    samples:  VecDeque<Point>,
    capacity: usize,
}

impl GestureHistory {
    pub fn new(capacity: usize) -> Self {
        GestureHistory {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity: capacity.max(1),
        }
    }

    /// Append a sample, evicting the oldest once full.
    pub fn push(&mut self, p: Point) {
        self.samples.push_back(p);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self)      -> usize { self.samples.len() }
    pub fn is_empty(&self) -> bool  { self.samples.is_empty() }
    pub fn capacity(&self) -> usize { self.capacity }

    pub fn clear(&mut self) { self.samples.clear(); }

    pub fn iter(&self) -> impl Iterator<Item = &Point> { self.samples.iter() }

    /// Total displacement, newest minus oldest.
    pub fn displacement(&self) -> Point {
        match (self.samples.front(), self.samples.back()) {
            (Some(first), Some(last)) => *last - *first,
            _ => Point::default(),
        }
    }

    /// Mean absolute per-step motion along each axis (units/frame).
    pub fn mean_step_speed(&self) -> Point {
        if self.samples.len() < 2 {
            return Point::default();
        }
        let (mut sx, mut sy) = (0.0f32, 0.0f32);
        for (a, b) in self.samples.iter().zip(self.samples.iter().skip(1)) {
            sx += (b.x - a.x).abs();
            sy += (b.y - a.y).abs();
        }
        let steps = (self.samples.len() - 1) as f32;
        Point::new(sx / steps, sy / steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_when_full() {
        let mut h = GestureHistory::new(3);
        assert_eq!(h.capacity(), 3);
        assert_eq!(GestureHistory::new(0).capacity(), 1);
        for i in 0..5 {
            h.push(Point::new(i as f32, 0.0));
        }
        assert_eq!(h.len(), 3);
        let xs: Vec<f32> = h.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn displacement_is_last_minus_first() {
        let mut h = GestureHistory::new(10);
        h.push(Point::new(0.2, 0.5));
        h.push(Point::new(0.9, 0.1)); // overshoot does not matter
        h.push(Point::new(0.4, 0.6));
        let d = h.displacement();
        assert!((d.x - 0.2).abs() < 1e-6);
        assert!((d.y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn mean_step_speed_counts_back_and_forth() {
        let mut h = GestureHistory::new(10);
        for x in [0.0, 0.1, 0.0, 0.1, 0.0] {
            h.push(Point::new(x, 0.0));
        }
        assert_eq!(h.displacement(), Point::default());
        assert!((h.mean_step_speed().x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn empty_history_is_still() {
        let h = GestureHistory::new(15);
        assert!(h.is_empty());
        assert_eq!(h.displacement(), Point::default());
        assert_eq!(h.mean_step_speed(), Point::default());
    }
}
