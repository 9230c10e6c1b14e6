//! Named screen regions for UI highlighting.
//!
//! Zones carry no gesture semantics.  They are tested in table order on the
//! mirrored position, so overlapping regions resolve to the earlier entry.

use crate::landmarks::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Zone {
    Left,
    Right,
    Top,
    Bottom,
    Center,
}

/// `(zone, x, y, width, height)` in display (mirrored) space.
pub const ZONES: [(Zone, f32, f32, f32, f32); 5] = [
    (Zone::Left,   0.00, 0.20, 0.25, 0.60),
    (Zone::Right,  0.75, 0.20, 0.25, 0.60),
    (Zone::Top,    0.25, 0.00, 0.50, 0.25),
    (Zone::Bottom, 0.25, 0.75, 0.50, 0.25),
    (Zone::Center, 0.30, 0.30, 0.40, 0.40),
];

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Left   => "left",
            Zone::Right  => "right",
            Zone::Top    => "top",
            Zone::Bottom => "bottom",
            Zone::Center => "center",
        }
    }

    /// `(x, y, width, height)` of this zone in display space.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        ZONES.iter()
            .find(|(z, ..)| z == self)
            .map(|&(_, x, y, w, h)| (x, y, w, h))
            .unwrap_or((0.0, 0.0, 0.0, 0.0))
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Zone under a raw (camera-space) position.  The position is mirrored
/// before testing because the feed is displayed mirrored.
pub fn zone_at(raw: Point) -> Option<Zone> {
    let p = raw.mirrored();
    ZONES.iter()
        .find(|&&(_, x, y, w, h)| p.x >= x && p.x <= x + w && p.y >= y && p.y <= y + h)
        .map(|&(zone, ..)| zone)
}
