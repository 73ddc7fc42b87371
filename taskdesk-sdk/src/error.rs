use thiserror::Error;

/// Error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] taskdesk_api::Error),
    #[error("rest error: {0}")]
    Rest(#[from] taskdesk_api::rest::Error),
    #[error("loading config error: {0}")]
    ConfigLoad(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("saving config error: {0}")]
    ConfigSave(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl Error {
    /// Per-field validation messages, when the backend rejected the input.
    pub fn validation_messages(&self) -> Vec<String> {
        match self {
            Self::Api(e) => e.validation_messages(),
            Self::Rest(e) => e.validation_messages(),
            _ => Vec::new(),
        }
    }
}

/// Type alias to use this crate's [`Error`](enum@crate::Error) type in a [`Result`](core::result::Result).
pub type Result<T> = core::result::Result<T, Error>;
