#![doc = "Error types."]
use http::StatusCode;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};

/// Error body returned by the backend.
///
/// Validation failures carry per-field messages in `errors`:
///
/// ```json
/// {"title": "One or more validation errors occurred.", "errors": {"Title": ["Title is required."]}}
/// ```
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorResponseBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponseBody {
    /// The human readable message, if the backend sent one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().or(self.title.as_deref())
    }
}

impl Display for ErrorResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{message}"),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestError {
    pub status: StatusCode,
    pub error: Option<ErrorResponseBody>,
}

impl Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        if let Some(message) = self.error.as_ref().and_then(ErrorResponseBody::message) {
            write!(f, " {message}")?;
        }
        Ok(())
    }
}

/// Coarse failure categories used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed caller input (400).
    Validation,
    /// Missing, invalid or expired credential (401).
    Unauthorized,
    /// The addressed resource does not exist (404).
    NotFound,
    /// Backend fault (5xx).
    Server,
    /// Any other status, or a failure before a response was received.
    Other,
}

impl From<StatusCode> for ErrorClass {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::Validation,
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::NOT_FOUND => Self::NotFound,
            s if s.is_server_error() => Self::Server,
            _ => Self::Other,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("rest response error: {0}")]
    RestResponse(RestError),
    #[error("http request error: {0}")]
    HttpRequest(#[from] http::Error),
    #[error("http client error: {0}")]
    HttpClient(Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("serde_json error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("serde_html_form error: {0}")]
    SerdeHtmlForm(#[from] serde_html_form::ser::Error),
    #[error("unexpected response type")]
    UnexpectedResponseType,
}

impl Error {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RestResponse(e) => Some(e.status),
            _ => None,
        }
    }
    pub fn class(&self) -> ErrorClass {
        self.status().map_or(ErrorClass::Other, ErrorClass::from)
    }
    /// The message from the error body, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::RestResponse(e) => e.error.as_ref().and_then(ErrorResponseBody::message),
            _ => None,
        }
    }
    /// Flattened per-field validation messages, in field order.
    pub fn validation_messages(&self) -> Vec<String> {
        match self {
            Self::RestResponse(RestError { error: Some(body), .. }) => body
                .errors
                .iter()
                .flat_map(BTreeMap::values)
                .flatten()
                .filter(|message| !message.is_empty())
                .cloned()
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Type alias to use this crate's [`Error`] type in a [`Result`](core::result::Result).
pub type Result<T> = core::result::Result<T, Error>;
