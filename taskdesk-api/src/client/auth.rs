use super::into_data;
use crate::types::auth::{ApiResponse, AuthResponse, LoginRequest, RegisterRequest, User};
use http::Method;
use std::sync::Arc;
use taskdesk_rest::{OutputDataOrBytes, RestClient, RestRequest, Result};

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const LOGOUT: &str = "/auth/logout";
pub const REFRESH: &str = "/auth/refresh";
pub const ME: &str = "/auth/me";

pub struct Service<T> {
    pub(crate) rest: Arc<T>,
}

impl<T> Service<T>
where
    T: RestClient + Send + Sync,
{
    pub(crate) fn new(rest: Arc<T>) -> Self {
        Self { rest }
    }
    pub async fn login(&self, input: LoginRequest) -> Result<AuthResponse> {
        into_data(self.rest.send_rest::<(), _, _>(&RestRequest::json(Method::POST, LOGIN, input)).await?)
    }
    pub async fn register(&self, input: RegisterRequest) -> Result<AuthResponse> {
        into_data(
            self.rest.send_rest::<(), _, _>(&RestRequest::json(Method::POST, REGISTER, input)).await?,
        )
    }
    /// Ends the server-side session. An empty acknowledgement is accepted.
    pub async fn logout(&self) -> Result<ApiResponse> {
        let response = self
            .rest
            .send_rest::<(), _, _>(&RestRequest::json(Method::POST, LOGOUT, serde_json::json!({})))
            .await?;
        match response {
            OutputDataOrBytes::Data(data) => Ok(data),
            OutputDataOrBytes::Bytes(_) => Ok(ApiResponse::default()),
        }
    }
    /// Exchanges the refresh cookie for a new credential.
    pub async fn refresh(&self) -> Result<AuthResponse> {
        into_data(
            self.rest
                .send_rest::<(), _, _>(&RestRequest::json(
                    Method::POST,
                    REFRESH,
                    serde_json::json!({}),
                ))
                .await?,
        )
    }
    pub async fn me(&self) -> Result<User> {
        into_data(self.rest.send_rest::<(), (), _>(&RestRequest::get(ME)).await?)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::tests::service;
    use crate::types::auth::LoginRequest;
    use http::StatusCode;

    #[tokio::test]
    async fn login() {
        let (client, service) = service(
            StatusCode::OK,
            r#"{"name":"A","email":"a@b.com","token":"T","expiresIn":900}"#,
        );
        let output = service
            .auth
            .login(LoginRequest { email: "a@b.com".into(), password: "secret1".into() })
            .await
            .expect("login should succeed");
        assert_eq!(output.token, "T");
        assert_eq!(output.expires_in, 900);
        let (method, uri, body) = client.last();
        assert_eq!(method, "POST");
        assert_eq!(uri, "http://localhost:5000/api/auth/login");
        assert_eq!(body, br#"{"email":"a@b.com","password":"secret1"}"#);
    }

    #[tokio::test]
    async fn logout_with_empty_body() {
        let (client, service) = service(StatusCode::OK, "");
        let output = service.auth.logout().await.expect("logout should succeed");
        assert_eq!(output.success, None);
        assert_eq!(client.last().2, b"{}");
    }

    #[tokio::test]
    async fn me() {
        let (client, service) =
            service(StatusCode::OK, r#"{"id":"u1","name":"A","email":"a@b.com"}"#);
        let user = service.auth.me().await.expect("me should succeed");
        assert_eq!(user.name, "A");
        assert_eq!(client.last().0, "GET");
    }
}
