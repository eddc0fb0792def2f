use crate::book::BookState;

/// Result alias that carries the custom [`CardError`] type.
pub type Result<T> = std::result::Result<T, CardError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The configuration file could not be parsed.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// The configuration parsed but carries values the presentation cannot use.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The audio backend refused to start playback (e.g. blocked autoplay).
    #[error("playback rejected: {0}")]
    Playback(String),
    #[error("no song at index {0}")]
    UnknownSong(usize),
    #[error("no page {0} in this book")]
    UnknownPage(usize),
    /// A navigation action was requested from a state that does not allow it.
    #[error("cannot {action} while the book is {from}")]
    InvalidTransition {
        from: BookState,
        action: &'static str,
    },
    /// Input arrived after the presentation was unloaded.
    #[error("presentation has been torn down")]
    TornDown,
}
