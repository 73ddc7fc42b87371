use crate::error::{Error, ErrorResponseBody, RestError};
use crate::types::{AuthorizationToken, Header};
use crate::{InputDataOrBytes, OutputDataOrBytes, RestRequest};
use http::{Request, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;

/// An abstract HTTP client.
#[trait_variant::make(Send)]
pub trait HttpClient {
    /// Send an HTTP request and return the response.
    fn send_http(
        &self,
        request: Request<Vec<u8>>,
    ) -> impl Future<
        Output = core::result::Result<
            Response<Vec<u8>>,
            Box<dyn std::error::Error + Send + Sync + 'static>,
        >,
    >;
}

pub type RestResult<O> = core::result::Result<OutputDataOrBytes<O>, Error>;

/// An abstract REST client.
///
/// [`send_rest()`](RestClient::send_rest) method has a default implementation,
/// which wraps the [`HttpClient::send_http()`] method to handle input and output as JSON.
#[trait_variant::make(Send)]
pub trait RestClient: HttpClient {
    /// The base URI of the API, without a trailing slash.
    fn base_uri(&self) -> String;
    /// Get the authorization token to use `Authorization` header.
    fn authorization_token(&self) -> impl Future<Output = Option<AuthorizationToken>> {
        async { None }
    }
    /// Send a REST request and return the response.
    fn send_rest<P, I, O>(&self, request: &RestRequest<P, I>) -> impl Future<Output = RestResult<O>>
    where
        P: Serialize + Send + Sync,
        I: Serialize + Send + Sync,
        O: DeserializeOwned + Send + Sync,
        Self: Sync,
    {
        send_rest(self, request)
    }
}

#[inline(always)]
async fn send_rest<P, I, O, C: RestClient + ?Sized>(
    client: &C,
    request: &RestRequest<P, I>,
) -> RestResult<O>
where
    P: Serialize + Send + Sync,
    I: Serialize + Send + Sync,
    O: DeserializeOwned + Send + Sync,
{
    let mut uri = format!("{}{}", client.base_uri(), request.path);
    // Query parameters
    if let Some(p) = &request.parameters {
        let qs = serde_html_form::to_string(p)?;
        if !qs.is_empty() {
            uri += "?";
            uri += &qs;
        }
    };
    let mut builder = Request::builder().method(&request.method).uri(&uri);
    // Headers
    if let Some(encoding) = &request.encoding {
        builder = builder.header(Header::ContentType, encoding);
    }
    if let Some(token) = client.authorization_token().await {
        builder = builder.header(Header::Authorization, token);
    }
    // Body
    let body = if let Some(input) = &request.input {
        match input {
            InputDataOrBytes::Data(data) => serde_json::to_vec(&data)?,
            InputDataOrBytes::Bytes(bytes) => bytes.clone(),
        }
    } else {
        Vec::new()
    };
    // Send
    let (parts, body) =
        client.send_http(builder.body(body)?).await.map_err(Error::HttpClient)?.into_parts();
    if parts.status.is_success() {
        if !body.is_empty()
            && parts
                .headers
                .get(http::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|content_type| content_type.starts_with("application/json"))
        {
            Ok(OutputDataOrBytes::Data(serde_json::from_slice(&body)?))
        } else {
            Ok(OutputDataOrBytes::Bytes(body))
        }
    } else {
        Err(Error::RestResponse(RestError {
            status: parts.status,
            error: serde_json::from_slice::<ErrorResponseBody>(&body).ok(),
        }))
    }
}
