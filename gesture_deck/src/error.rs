//! Deck-level errors.

pub type Result<T> = std::result::Result<T, DeckError>;

#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("window error: {0}")]
    Window(String),

    #[error(transparent)]
    Tracking(#[from] gesture_core::Error),
}
