//! Finger-state classification.
//!
//! A finger counts as extended when its tip is farther from the wrist than
//! its base joint by a fixed margin.  The wrist-relative ratio tolerates
//! in-plane hand rotation.

use crate::landmarks::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [Finger::Thumb, Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// `(tip, base)` landmark indices.  The thumb's base reference is its
    /// MCP joint (index 2), not the CMC.
    pub fn joints(self) -> (usize, usize) {
        match self {
            Finger::Thumb  => (THUMB_TIP,  THUMB_MCP),
            Finger::Index  => (INDEX_TIP,  INDEX_MCP),
            Finger::Middle => (MIDDLE_TIP, MIDDLE_MCP),
            Finger::Ring   => (RING_TIP,   RING_MCP),
            Finger::Pinky  => (PINKY_TIP,  PINKY_MCP),
        }
    }

    fn slot(self) -> usize { self as usize }
}

/// Extended (`true`) / flexed (`false`) per finger, thumb first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerStates(pub [bool; 5]);

impl FingerStates {
    /// Classify every finger of `pose`.
    pub fn classify(pose: &HandPose, margin: f32) -> Self {
        let wrist = pose.wrist();
        let mut states = [false; 5];
        for finger in Finger::ALL {
            let (tip, base) = finger.joints();
            let tip_dist  = pose.point(tip).distance(wrist);
            let base_dist = pose.point(base).distance(wrist);
            states[finger.slot()] = tip_dist > base_dist * margin;
        }
        FingerStates(states)
    }

    pub fn is_extended(&self, finger: Finger) -> bool { self.0[finger.slot()] }

    pub fn extended_count(&self) -> usize { self.0.iter().filter(|e| **e).count() }

    /// True when `finger` is the only extended finger.
    pub fn only(&self, finger: Finger) -> bool {
        self.is_extended(finger) && self.extended_count() == 1
    }

    /// Closed fist: at most one finger up and the thumb tucked.
    pub fn is_fist(&self) -> bool {
        self.extended_count() <= 1 && !self.is_extended(Finger::Thumb)
    }

    /// 0–100 display score while a hand is visible.
    pub fn confidence(&self) -> u8 {
        (self.extended_count() as u32 * 20 + 20).min(100) as u8
    }
}
