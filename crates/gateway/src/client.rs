//! HTTP user service client
//!
//! Talks to the user routes mounted at `{base_url}/api/user`. A 4xx reply
//! carrying `{success:false, message}` is a rejection and is returned as a
//! normal response; only transport failures, 5xx replies and unreadable
//! bodies become `ServiceError`.

use async_trait::async_trait;
use gymdesk_auth::{AuthService, LoginResponse, RegisterRequest, RegisterResponse, ServiceError};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{GatewayConfig, GatewayError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody<'a> {
    email_or_username: &'a str,
    password: &'a str,
}

/// User service client over HTTP.
pub struct HttpAuthService {
    http: reqwest::Client,
    user_url: String,
}

impl HttpAuthService {
    /// Create a new client from configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            user_url: format!("{}/api/user", config.base_url.trim_end_matches('/')),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.user_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::Response(format!("failed to read body: {}", e)))?;

        if status.is_server_error() {
            return Err(ServiceError::Response(format!(
                "user service returned {}: {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(status = %status, error = %e, "Unreadable user service reply");
            ServiceError::Response(format!("user service returned {} with unreadable body", status))
        })
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, ServiceError> {
        let request = self.http.post(self.endpoint("login")).json(&LoginBody {
            email_or_username: identifier,
            password,
        });
        self.send(request).await
    }

    async fn refresh(&self, token: &str) -> Result<LoginResponse, ServiceError> {
        let request = self.http.post(self.endpoint("refresh")).bearer_auth(token);
        self.send(request).await
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ServiceError> {
        let mut request = self.http.post(self.endpoint("logout"));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::Response(format!(
                "logout returned {}",
                response.status()
            )));
        }

        tracing::debug!("User service acknowledged logout");
        Ok(())
    }

    async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ServiceError> {
        let request = self.http.post(self.endpoint("register")).json(request);
        self.send(request).await
    }
}
