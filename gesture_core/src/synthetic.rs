//! Procedural hand poses.
//!
//! A stand-in for a camera-driven detector: produces anatomically plausible
//! 21-point hands in a handful of canonical shapes.  Used by the simulator
//! source and throughout the tests.
//!
//! Geometry is expressed as offsets from the wrist with `-y` pointing up,
//! then rotated about the wrist and translated into image space.

use crate::landmarks::*;

/// Canonical hand shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandShape {
    Fist,
    Pointing,
    OpenPalm,
    ThumbsUp,
    Pinch,
    /// Index and middle up.  Neutral for classification, handy for swipes.
    Peace,
}

impl HandShape {
    pub const ALL: [HandShape; 6] = [
        HandShape::Fist, HandShape::Pointing, HandShape::OpenPalm,
        HandShape::ThumbsUp, HandShape::Pinch, HandShape::Peace,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HandShape::Fist     => "FIST",
            HandShape::Pointing => "POINT",
            HandShape::OpenPalm => "PALM",
            HandShape::ThumbsUp => "THUMB",
            HandShape::Pinch    => "PINCH",
            HandShape::Peace    => "PEACE",
        }
    }
}

// ── Skeleton constants ───────────────────────────────────────────────────────

/// `(mcp index, direction, wrist→mcp length)` for the four long fingers.
const LONG_FINGERS: [(usize, (f32, f32), f32); 4] = [
    (INDEX_MCP,  (-0.25, -0.97), 0.100),
    (MIDDLE_MCP, ( 0.00, -1.00), 0.105),
    (RING_MCP,   ( 0.22, -0.97), 0.100),
    (PINKY_MCP,  ( 0.45, -0.89), 0.090),
];

/// PIP / DIP / TIP as multiples of the MCP length along the finger direction.
const EXTENDED: [f32; 3] = [1.30, 1.60, 1.90];
const FLEXED:   [f32; 3] = [1.10, 0.85, 0.60];
/// Index curled toward the thumb for a pinch.
const PINCH_INDEX: [f32; 3] = [1.25, 1.45, 1.40];

const THUMB_DIR:    (f32, f32) = (-0.80, -0.60);
const THUMB_UP_DIR: (f32, f32) = (-0.30, -0.95);
/// CMC / MCP / IP / TIP distances along the thumb direction.
const THUMB_CHAIN:  [f32; 4] = [0.04, 0.08, 0.11, 0.16];
/// Tucked thumb: IP and tip folded across the palm.
const THUMB_TUCKED: [(f32, f32); 2] = [(0.00, -0.07), (0.06, -0.035)];

fn unit((x, y): (f32, f32)) -> Point {
    let len = (x * x + y * y).sqrt();
    Point::new(x / len, y / len)
}

// ════════════════════════════════════════════════════════════════════════════
// SyntheticHand
// ════════════════════════════════════════════════════════════════════════════

/// A hand placed in image space, ready to be posed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyntheticHand {
    wrist: Point,
    angle: f32,
}

impl SyntheticHand {
    /// Upright hand with its wrist at `(x, y)`.
    pub fn at(x: f32, y: f32) -> Self { SyntheticHand { wrist: Point::new(x, y), angle: 0.0 } }

    /// Same hand rotated by `angle` radians about the wrist.
    pub fn rotated(self, angle: f32) -> Self { SyntheticHand { angle, ..self } }

    pub fn wrist(&self) -> Point { self.wrist }

    /// Lay out all 21 landmarks for `shape`.
    pub fn pose(&self, shape: HandShape) -> HandPose {
        let mut off = [Point::default(); LANDMARK_COUNT];

        // Thumb
        let thumb_extended = matches!(shape, HandShape::OpenPalm | HandShape::ThumbsUp | HandShape::Pinch);
        let dir = unit(if shape == HandShape::ThumbsUp { THUMB_UP_DIR } else { THUMB_DIR });
        off[THUMB_CMC] = dir * THUMB_CHAIN[0];
        off[THUMB_MCP] = dir * THUMB_CHAIN[1];
        if thumb_extended {
            off[THUMB_IP]  = dir * THUMB_CHAIN[2];
            off[THUMB_TIP] = dir * THUMB_CHAIN[3];
        } else {
            off[THUMB_IP]  = Point::new(THUMB_TUCKED[0].0, THUMB_TUCKED[0].1);
            off[THUMB_TIP] = Point::new(THUMB_TUCKED[1].0, THUMB_TUCKED[1].1);
        }

        // Long fingers
        for (i, &(mcp, d, len)) in LONG_FINGERS.iter().enumerate() {
            let dir = unit(d);
            let chain = match (shape, i) {
                (HandShape::OpenPalm, _)     => EXTENDED,
                (HandShape::Pointing, 0)     => EXTENDED,
                (HandShape::Peace,    0 | 1) => EXTENDED,
                (HandShape::Pinch,    0)     => PINCH_INDEX,
                _                            => FLEXED,
            };
            off[mcp] = dir * len;
            for (k, factor) in chain.iter().enumerate() {
                off[mcp + 1 + k] = dir * (len * factor);
            }
        }

        if shape == HandShape::Pinch {
            off[THUMB_TIP] = off[INDEX_TIP] + Point::new(-0.03, 0.01);
            off[THUMB_IP]  = (off[THUMB_MCP] + off[THUMB_TIP]) * 0.5;
        }

        let (sin, cos) = self.angle.sin_cos();
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        for (lm, o) in landmarks.iter_mut().zip(off.iter()) {
            let x = o.x * cos - o.y * sin;
            let y = o.x * sin + o.y * cos;
            *lm = Landmark::new(self.wrist.x + x, self.wrist.y + y, 0.0);
        }
        HandPose::new(landmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingers::{Finger, FingerStates};

    fn states(shape: HandShape) -> FingerStates {
        FingerStates::classify(&SyntheticHand::at(0.5, 0.6).pose(shape), 1.1)
    }

    #[test]
    fn shapes_have_expected_finger_patterns() {
        assert_eq!(states(HandShape::Fist).0,     [false, false, false, false, false]);
        assert_eq!(states(HandShape::Pointing).0, [false, true,  false, false, false]);
        assert_eq!(states(HandShape::OpenPalm).0, [true,  true,  true,  true,  true ]);
        assert_eq!(states(HandShape::ThumbsUp).0, [true,  false, false, false, false]);
        assert_eq!(states(HandShape::Peace).0,    [false, true,  true,  false, false]);
    }

    #[test]
    fn pinch_brings_tips_together() {
        let pose = SyntheticHand::at(0.5, 0.6).pose(HandShape::Pinch);
        assert!(pose.pinch_distance() < 0.06);
        let s = FingerStates::classify(&pose, 1.1);
        assert!(!s.is_extended(Finger::Middle));
        assert!(!s.is_extended(Finger::Ring));
    }

    #[test]
    fn fist_is_not_a_pinch() {
        let pose = SyntheticHand::at(0.5, 0.6).pose(HandShape::Fist);
        assert!(pose.pinch_distance() > 0.06);
    }

    #[test]
    fn thumbs_up_tip_is_well_above_wrist() {
        let pose = SyntheticHand::at(0.5, 0.6).pose(HandShape::ThumbsUp);
        assert!(pose.thumb_tip().y < pose.wrist().y - 0.1);
    }

    #[test]
    fn rotation_preserves_wrist_and_distances() {
        let upright = SyntheticHand::at(0.4, 0.5).pose(HandShape::OpenPalm);
        let turned  = SyntheticHand::at(0.4, 0.5).rotated(1.0).pose(HandShape::OpenPalm);
        assert_eq!(upright.wrist(), turned.wrist());
        let a = upright.index_tip().distance(upright.wrist());
        let b = turned.index_tip().distance(turned.wrist());
        assert!((a - b).abs() < 1e-5);
    }
}
