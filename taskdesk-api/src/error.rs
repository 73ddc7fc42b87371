#![doc = "Error types."]
use thiserror::Error;

/// Error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Rest(#[from] taskdesk_rest::Error),
    #[error("session store error: {0}")]
    SessionStore(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("session manager is gone")]
    SessionClosed,
    #[error("the session ended while the request was in flight")]
    SessionEnded,
}

impl Error {
    /// Per-field validation messages, when the backend rejected the input.
    pub fn validation_messages(&self) -> Vec<String> {
        match self {
            Self::Rest(e) => e.validation_messages(),
            _ => Vec::new(),
        }
    }
}

/// Type alias to use this crate's [`Error`] type in a [`Result`](core::result::Result).
pub type Result<T> = core::result::Result<T, Error>;
