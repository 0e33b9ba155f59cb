use anyhow::Context;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::error::{ApiError, ApiErrorKind};
use super::types::{
    AdminUser, AdminUsersResponse, Analytics, AttemptInfo, AttemptRecord, AttemptsResponse,
    AuthResponse, CertificateInfo, GoogleLoginRequest, Language, LoginRequest, MeResponse,
    MessageResponse, PaymentMethod, QuestionsResponse, RecordPaymentRequest, SignupRequest,
    SubmitTestRequest, TestResult, User, UserUpdate,
};
use crate::config::Config;
use crate::flow::payment::CardDetails;

/// Standard User-Agent header for portal requests.
pub const USER_AGENT: &str = concat!("skillcert/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the certification portal API.
///
/// Holds the bearer token of the current session, if any. Every call is a
/// single request awaited to completion; there is no retry.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: reqwest::Client::new(),
        }
    }

    /// Builds a client from config (base URL resolution + timeout).
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let base_url = config.api_base_url()?;
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.api_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("build HTTP client")?;
        Ok(Self {
            base_url,
            token: None,
            http,
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, ApiError> {
        let rb = self.request(Method::POST, &["auth", "signup"])?.json(request);
        Self::json(rb).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let rb = self.request(Method::POST, &["auth", "login"])?.json(request);
        Self::json(rb).await
    }

    pub async fn google_login(
        &self,
        request: &GoogleLoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        let rb = self
            .request(Method::POST, &["auth", "google-login"])?
            .json(request);
        Self::json(rb).await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        let rb = self.request(Method::GET, &["auth", "me"])?;
        let response: MeResponse = Self::json(rb).await?;
        Ok(response.user)
    }

    // ------------------------------------------------------------------
    // Attempts and payments
    // ------------------------------------------------------------------

    pub async fn attempt_count(&self) -> Result<AttemptInfo, ApiError> {
        let rb = self.request(Method::GET, &["test", "attempt-count"])?;
        Self::json(rb).await
    }

    pub async fn attempts(&self) -> Result<Vec<AttemptRecord>, ApiError> {
        let rb = self.request(Method::GET, &["test", "attempts"])?;
        let response: AttemptsResponse = Self::json(rb).await?;
        Ok(response.attempts)
    }

    pub async fn reset_attempts(&self) -> Result<MessageResponse, ApiError> {
        let rb = self.request(Method::POST, &["test", "reset-attempts"])?;
        Self::json(rb).await
    }

    pub async fn record_payment(
        &self,
        request: RecordPaymentRequest,
    ) -> Result<MessageResponse, ApiError> {
        let rb = self
            .request(Method::POST, &["payment", "record"])?
            .json(&request);
        Self::json(rb).await
    }

    /// Relays a card submission for server-side verification.
    pub async fn authorize_payment(
        &self,
        method: PaymentMethod,
        card: &CardDetails,
    ) -> Result<(), ApiError> {
        let rb = self
            .request(Method::POST, &["payment", "authorize-card"])?
            .json(&serde_json::json!({ "method": method, "card": card }));
        Self::send(rb).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Test
    // ------------------------------------------------------------------

    pub async fn questions(
        &self,
        role: &str,
        language: Language,
    ) -> Result<QuestionsResponse, ApiError> {
        let rb = self
            .request(Method::GET, &["test", "questions", role])?
            .query(&[("lang", language.code())]);
        Self::json(rb).await
    }

    pub async fn submit_test(&self, request: &SubmitTestRequest) -> Result<TestResult, ApiError> {
        let rb = self
            .request(Method::POST, &["test", "submit-test"])?
            .json(request);
        Self::json(rb).await
    }

    // ------------------------------------------------------------------
    // Certificate
    // ------------------------------------------------------------------

    /// Fetches certificate data. A 404 means "not earned yet", not a failure.
    pub async fn certificate(&self, user_id: i64) -> Result<CertificateInfo, ApiError> {
        let id = user_id.to_string();
        let rb = self.request(Method::GET, &["certificate", &id])?;
        match Self::json::<CertificateInfo>(rb).await {
            Err(err) if err.status == Some(404) && err.kind == ApiErrorKind::Rejected => {
                Ok(CertificateInfo::unavailable(err.message))
            }
            other => other,
        }
    }

    pub async fn download_certificate(&self, user_id: i64) -> Result<Vec<u8>, ApiError> {
        let id = user_id.to_string();
        let rb = self.request(Method::GET, &["certificate", &id, "download"])?;
        let response = Self::send(rb).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        Ok(bytes.to_vec())
    }

    // ------------------------------------------------------------------
    // Admin
    // ------------------------------------------------------------------

    pub async fn admin_analytics(&self) -> Result<Analytics, ApiError> {
        let rb = self.request(Method::GET, &["admin", "analytics"])?;
        Self::json(rb).await
    }

    pub async fn admin_users(&self) -> Result<Vec<AdminUser>, ApiError> {
        let rb = self.request(Method::GET, &["admin", "users"])?;
        let response: AdminUsersResponse = Self::json(rb).await?;
        Ok(response.users)
    }

    pub async fn admin_update_user(
        &self,
        user_id: i64,
        update: &UserUpdate,
    ) -> Result<MessageResponse, ApiError> {
        let id = user_id.to_string();
        let rb = self
            .request(Method::PUT, &["admin", "users", &id])?
            .json(update);
        Self::json(rb).await
    }

    pub async fn admin_delete_user(&self, user_id: i64) -> Result<MessageResponse, ApiError> {
        let id = user_id.to_string();
        let rb = self.request(Method::DELETE, &["admin", "users", &id])?;
        Self::json(rb).await
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::parse(format!("Invalid API base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::parse(format!("API base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "api request");
        let mut rb = self.http.request(method, url);
        if let Some(token) = &self.token {
            rb = rb.bearer_auth(token);
        }
        Ok(rb)
    }

    async fn send(rb: RequestBuilder) -> Result<Response, ApiError> {
        let response = rb.send().await.map_err(|e| ApiError::from_reqwest(&e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::http_status(status.as_u16(), &body);
            tracing::debug!(status = status.as_u16(), kind = %err.kind, "api error response");
            return Err(err);
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(rb: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::send(rb).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::parse(format!("Unexpected response from portal: {e}")))
    }
}
