#![doc = include_str!("../README.md")]
pub mod error;
mod traits;
pub mod types;

pub use crate::error::{Error, ErrorClass, Result};
pub use crate::traits::{HttpClient, RestClient, RestResult};
pub use crate::types::{InputDataOrBytes, OutputDataOrBytes, RestRequest};
pub use http;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorResponseBody, RestError};
    use http::{Request, Response, StatusCode};
    use std::sync::{Arc, Mutex};

    struct DummyClient {
        status: StatusCode,
        json: bool,
        body: Vec<u8>,
        token: Option<String>,
        requests: Arc<Mutex<Vec<Request<Vec<u8>>>>>,
    }

    impl DummyClient {
        fn new(status: StatusCode, body: &str) -> Self {
            Self {
                status,
                json: true,
                body: body.as_bytes().to_vec(),
                token: None,
                requests: Arc::default(),
            }
        }
    }

    impl HttpClient for DummyClient {
        async fn send_http(
            &self,
            request: Request<Vec<u8>>,
        ) -> core::result::Result<Response<Vec<u8>>, Box<dyn std::error::Error + Send + Sync + 'static>>
        {
            self.requests.lock().expect("lock").push(request);
            let mut builder = Response::builder().status(self.status);
            if self.json {
                builder = builder.header(http::header::CONTENT_TYPE, "application/json");
            }
            Ok(builder.body(self.body.clone())?)
        }
    }

    impl RestClient for DummyClient {
        fn base_uri(&self) -> String {
            "https://example.com/api".into()
        }
        async fn authorization_token(&self) -> Option<types::AuthorizationToken> {
            self.token.clone().map(types::AuthorizationToken::Bearer)
        }
    }

    #[derive(serde::Serialize, Debug, Clone, Default)]
    #[serde(rename_all = "camelCase")]
    struct Parameters {
        #[serde(skip_serializing_if = "Option::is_none")]
        search_term: Option<String>,
        page_number: u32,
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
    #[serde(rename_all = "camelCase")]
    struct Output {
        return_value: i32,
    }

    async fn get_example<T>(client: &T, params: Parameters) -> Result<Output>
    where
        T: RestClient + Send + Sync,
    {
        let response = client
            .send_rest::<_, (), _>(&RestRequest::get("/example").with_parameters(params))
            .await?;
        match response {
            OutputDataOrBytes::Data(data) => Ok(data),
            _ => Err(Error::UnexpectedResponseType),
        }
    }

    #[tokio::test]
    async fn response_ok() {
        let client = DummyClient::new(StatusCode::OK, r#"{"returnValue":42}"#);
        let out = get_example(&client, Parameters::default()).await.expect("must be ok");
        assert_eq!(out.return_value, 42);
    }

    #[tokio::test]
    async fn request_uri_and_headers() {
        let mut client = DummyClient::new(StatusCode::OK, r#"{"returnValue":1}"#);
        client.token = Some(String::from("T"));
        let requests = client.requests.clone();
        get_example(
            &client,
            Parameters { search_term: Some(String::from("milk")), page_number: 2 },
        )
        .await
        .expect("must be ok");
        let requests = requests.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].uri().to_string(),
            "https://example.com/api/example?searchTerm=milk&pageNumber=2"
        );
        assert_eq!(
            requests[0].headers().get(http::header::AUTHORIZATION).map(|v| v.as_bytes()),
            Some("Bearer T".as_bytes())
        );
    }

    #[tokio::test]
    async fn procedure_with_empty_body() {
        let client = DummyClient::new(StatusCode::NO_CONTENT, "");
        let requests = client.requests.clone();
        let response = client
            .send_rest::<(), _, serde_json::Value>(&RestRequest::json(
                http::Method::POST,
                "/example",
                serde_json::json!({"value": 42}),
            ))
            .await
            .expect("must be ok");
        assert!(matches!(response, OutputDataOrBytes::Bytes(bytes) if bytes.is_empty()));
        let requests = requests.lock().expect("lock");
        assert_eq!(requests[0].body(), br#"{"value":42}"#);
        assert_eq!(
            requests[0].headers().get(http::header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some("application/json".as_bytes())
        );
    }

    #[tokio::test]
    async fn response_validation_error() {
        let client = DummyClient::new(
            StatusCode::BAD_REQUEST,
            r#"{"title":"One or more validation errors occurred.","errors":{"Email":["Email is required."],"Password":["Too short.",""]}}"#,
        );
        let error = get_example(&client, Parameters::default()).await.expect_err("must be error");
        assert_eq!(error.class(), ErrorClass::Validation);
        assert_eq!(error.message(), Some("One or more validation errors occurred."));
        assert_eq!(
            error.validation_messages(),
            vec![String::from("Email is required."), String::from("Too short.")]
        );
    }

    #[tokio::test]
    async fn response_undefined_error() {
        let client = DummyClient::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"message":"Something wrong"}"#,
        );
        let error = get_example(&client, Parameters::default()).await.expect_err("must be error");
        match &error {
            Error::RestResponse(err) => {
                assert_eq!(
                    err,
                    &RestError {
                        status: StatusCode::INTERNAL_SERVER_ERROR,
                        error: Some(ErrorResponseBody {
                            message: Some(String::from("Something wrong")),
                            ..Default::default()
                        }),
                    }
                );
            }
            _ => panic!("must be Error::RestResponse, got {error:?}"),
        }
        assert_eq!(error.class(), ErrorClass::Server);
        assert!(error.validation_messages().is_empty());
    }

    #[tokio::test]
    async fn response_unexpected() {
        let mut client = DummyClient::new(StatusCode::OK, r#"{"returnValue":42}"#);
        client.json = false;
        let error = get_example(&client, Parameters::default()).await.expect_err("must be error");
        assert!(matches!(error, Error::UnexpectedResponseType));
        assert_eq!(error.class(), ErrorClass::Other);
    }

    #[test]
    fn classify_status() {
        for (status, expected) in [
            (StatusCode::BAD_REQUEST, ErrorClass::Validation),
            (StatusCode::UNAUTHORIZED, ErrorClass::Unauthorized),
            (StatusCode::NOT_FOUND, ErrorClass::NotFound),
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorClass::Server),
            (StatusCode::BAD_GATEWAY, ErrorClass::Server),
            (StatusCode::FORBIDDEN, ErrorClass::Other),
        ] {
            assert_eq!(ErrorClass::from(status), expected, "{status}");
        }
    }
}
