//! The closed set of emitted gestures.

/// A discrete gesture event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    Tap,
    DoubleTap,
    Pinch,
    OpenPalm,
    Pointing,
    ThumbsUp,
}

impl GestureKind {
    pub const ALL: [GestureKind; 10] = [
        GestureKind::SwipeLeft, GestureKind::SwipeRight,
        GestureKind::SwipeUp,   GestureKind::SwipeDown,
        GestureKind::Tap,       GestureKind::DoubleTap,
        GestureKind::Pinch,     GestureKind::OpenPalm,
        GestureKind::Pointing,  GestureKind::ThumbsUp,
    ];

    /// Wire name, e.g. `"swipe-left"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureKind::SwipeLeft  => "swipe-left",
            GestureKind::SwipeRight => "swipe-right",
            GestureKind::SwipeUp    => "swipe-up",
            GestureKind::SwipeDown  => "swipe-down",
            GestureKind::Tap        => "tap",
            GestureKind::DoubleTap  => "double-tap",
            GestureKind::Pinch      => "pinch",
            GestureKind::OpenPalm   => "open-palm",
            GestureKind::Pointing   => "pointing",
            GestureKind::ThumbsUp   => "thumbs-up",
        }
    }

    /// Short human label for feedback banners.
    pub fn label(&self) -> &'static str {
        match self {
            GestureKind::SwipeLeft  => "Previous Track",
            GestureKind::SwipeRight => "Next Track",
            GestureKind::SwipeUp    => "Volume Up",
            GestureKind::SwipeDown  => "Volume Down",
            GestureKind::Tap        => "Play/Pause",
            GestureKind::DoubleTap  => "Like",
            GestureKind::Pinch      => "Mute/Unmute",
            GestureKind::OpenPalm   => "Pause",
            GestureKind::Pointing   => "Play",
            GestureKind::ThumbsUp   => "Liked",
        }
    }

    pub fn is_swipe(&self) -> bool {
        matches!(
            self,
            GestureKind::SwipeLeft | GestureKind::SwipeRight | GestureKind::SwipeUp | GestureKind::SwipeDown
        )
    }
}

impl std::fmt::Display for GestureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
