//! Error taxonomy.
//!
//! Acquisition failures (camera, permission, model) are reported to whoever
//! starts tracking.  Per-frame detection failures exist only so detectors can
//! report them; the tracker logs and swallows them.

/// Result type alias for the gesture pipeline.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("camera unavailable: {0}")]
    Camera(String),

    #[error("camera permission denied: {0}")]
    Permission(String),

    #[error("hand model failed to load: {0}")]
    ModelLoad(String),

    #[error("detection failed: {0}")]
    Detection(String),

    #[error("expected {expected} landmarks, got {got}")]
    LandmarkCount { expected: usize, got: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for failures that prevent tracking from starting at all.
    pub fn is_acquisition(&self) -> bool {
        matches!(self, Error::Camera(_) | Error::Permission(_) | Error::ModelLoad(_))
    }
}
