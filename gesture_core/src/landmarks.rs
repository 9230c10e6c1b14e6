//! Hand landmarks in normalized image space.
//!
//! Coordinates are relative to the raw (un-mirrored) camera frame: `x` grows
//! to the right of the image, `y` grows downward, both in `[0,1]`.

use crate::{Error, Result};

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Bone connections for drawing the hand skeleton.
pub const HAND_SKELETON: [(usize, usize); 23] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (WRIST, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (WRIST, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (WRIST, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, RING_MCP), (RING_MCP, PINKY_MCP),
];

/// Fingertip indices, thumb first.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

// ════════════════════════════════════════════════════════════════════════════
// Point / Landmark
// ════════════════════════════════════════════════════════════════════════════

/// A 2D position in normalized image space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self { Point { x, y } }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Horizontal mirror, as shown on a selfie-style display.
    pub fn mirrored(self) -> Point { Point { x: 1.0 - self.x, y: self.y } }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point { Point { x: self.x - rhs.x, y: self.y - rhs.y } }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point { Point { x: self.x + rhs.x, y: self.y + rhs.y } }
}

impl std::ops::Mul<f32> for Point {
    type Output = Point;
    fn mul(self, k: f32) -> Point { Point { x: self.x * k, y: self.y * k } }
}

/// One detector keypoint.  `z` is relative depth and is carried but unused.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self { Landmark { x, y, z } }

    pub fn point(&self) -> Point { Point { x: self.x, y: self.y } }
}

// ════════════════════════════════════════════════════════════════════════════
// HandPose
// ════════════════════════════════════════════════════════════════════════════

/// All 21 landmarks of one detected hand for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct HandPose {
    pub landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandPose {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self { HandPose { landmarks } }

    /// Build a pose from a detector's variable-length output.
    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points.try_into()
            .map_err(|_| Error::LandmarkCount { expected: LANDMARK_COUNT, got: points.len() })?;
        Ok(HandPose { landmarks })
    }

    /// 2D position of landmark `idx`.
    pub fn point(&self, idx: usize) -> Point { self.landmarks[idx].point() }

    pub fn wrist(&self)     -> Point { self.point(WRIST) }
    pub fn thumb_tip(&self) -> Point { self.point(THUMB_TIP) }
    pub fn index_tip(&self) -> Point { self.point(INDEX_TIP) }

    /// Thumb-tip to index-tip distance.
    pub fn pinch_distance(&self) -> f32 { self.thumb_tip().distance(self.index_tip()) }
}
