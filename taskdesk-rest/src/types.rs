use http::header::{HeaderName, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use serde::{de::DeserializeOwned, Serialize};

pub enum AuthorizationToken {
    Bearer(String),
}

impl TryFrom<AuthorizationToken> for HeaderValue {
    type Error = InvalidHeaderValue;

    fn try_from(token: AuthorizationToken) -> Result<Self, Self::Error> {
        HeaderValue::from_str(&match token {
            AuthorizationToken::Bearer(t) => format!("Bearer {t}"),
        })
    }
}

/// HTTP headers which can be used in REST requests.
pub enum Header {
    ContentType,
    Authorization,
}

impl From<Header> for HeaderName {
    fn from(value: Header) -> Self {
        match value {
            Header::ContentType => CONTENT_TYPE,
            Header::Authorization => AUTHORIZATION,
        }
    }
}

/// A request which can be executed with [`RestClient::send_rest()`](crate::RestClient::send_rest).
///
/// `path` is appended to the client's base URI as-is, so it must start with `/`.
pub struct RestRequest<P, I>
where
    I: Serialize,
{
    pub method: Method,
    pub path: String,
    pub parameters: Option<P>,
    pub input: Option<InputDataOrBytes<I>>,
    pub encoding: Option<String>,
}

impl<P, I> RestRequest<P, I>
where
    I: Serialize,
{
    /// A request without query parameters or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), parameters: None, input: None, encoding: None }
    }
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }
    /// A request carrying a JSON body.
    pub fn json(method: Method, path: impl Into<String>, input: I) -> Self {
        Self {
            method,
            path: path.into(),
            parameters: None,
            input: Some(InputDataOrBytes::Data(input)),
            encoding: Some(String::from("application/json")),
        }
    }
    pub fn with_parameters(mut self, parameters: P) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// A type which can be used as a parameter of [`RestRequest`].
///
/// JSON serializable data or raw bytes.
pub enum InputDataOrBytes<T>
where
    T: Serialize,
{
    Data(T),
    Bytes(Vec<u8>),
}

/// A type which can be used as a return value of [`RestClient::send_rest()`](crate::RestClient::send_rest).
///
/// JSON deserializable data or raw bytes.
pub enum OutputDataOrBytes<T>
where
    T: DeserializeOwned,
{
    Data(T),
    Bytes(Vec<u8>),
}
