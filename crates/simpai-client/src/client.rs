use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::json;
use simpai_config::BackendConfig;
use simpai_core::{ArtifactKind, FileDescriptor};
use tokio_util::sync::CancellationToken;

use crate::backend::{Backend, TokenRequest};
use crate::endpoints;
use crate::error::ClientError;
use crate::http::{check_response, decode_json};
use crate::responses::{
    AnalyzeResponse, ChartsResponse, ChatResponse, CheckoutResponse, LoginResponse,
    MessageResponse, Price, Profile, RegisterResponse, SubscriptionStatus, UploadResponse,
};
use crate::stream::{StreamError, StreamOutcome, StreamStatus, read_token_stream};

/// HTTP client for the SimpAI backend.
///
/// No overall request timeout is set: analysis and summarisation can take
/// minutes. Only the TCP connect is time-limited.
#[derive(Debug, Clone)]
pub struct SimpaiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl SimpaiClient {
    /// Build an unauthenticated client from backend configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` for an unusable base URL, or
    /// `ClientError::Http` if the underlying `reqwest::Client` fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let base_url = config.normalized_base_url()?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Attach an auth token sent as `Authorization: Token <value>`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Attach the stored token, if any credential tier has one.
    #[must_use]
    pub fn with_stored_token(mut self) -> Self {
        self.token = simpai_auth::resolve_token();
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request with the auth header attached when a token is present.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.header(
                reqwest::header::AUTHORIZATION,
                simpai_auth::authorization_header(token),
            ),
            None => builder,
        }
    }

    /// Request that cannot be made without a token.
    fn authed(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ClientError> {
        if self.token.is_none() {
            return Err(simpai_auth::AuthError::NotAuthenticated.into());
        }
        Ok(self.request(method, path))
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let resp = builder.send().await?;
        check_response(resp).await
    }

    /// Read a body that must be a PDF document.
    async fn pdf_bytes(endpoint: &str, resp: reqwest::Response) -> Result<Bytes, ClientError> {
        let is_json = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));
        let body = resp.bytes().await?;
        if is_json {
            return Err(ClientError::malformed(
                endpoint,
                format!(
                    "expected a PDF document, got JSON: {}",
                    String::from_utf8_lossy(&body)
                ),
            ));
        }
        if body.is_empty() {
            return Err(ClientError::malformed(endpoint, "empty document"));
        }
        Ok(body)
    }

    // ── Accounts ──────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `ClientError::Api` when the backend rejects the registration.
    pub async fn register(
        &self,
        first_name: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<RegisterResponse, ClientError> {
        let mut body = json!({
            "email": email,
            "password": password,
            "password1": password,
            "password2": password,
        });
        if let Some(name) = first_name {
            body["first_name"] = json!(name);
        }
        let resp = self
            .send(self.request(Method::POST, endpoints::AUTH_REGISTER).json(&body))
            .await?;
        decode_json(endpoints::AUTH_REGISTER, resp).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` for bad credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = json!({ "email": email, "password": password });
        let resp = self
            .send(self.request(Method::POST, endpoints::AUTH_LOGIN).json(&body))
            .await?;
        decode_json(endpoints::AUTH_LOGIN, resp).await
    }

    /// Invalidate the token server-side.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Auth` when no token is attached.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.send(self.authed(Method::POST, endpoints::AUTH_LOGOUT)?)
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ClientError::Auth` when no token is attached.
    pub async fn profile(&self) -> Result<Profile, ClientError> {
        let resp = self
            .send(self.authed(Method::GET, endpoints::AUTH_PROFILE)?)
            .await?;
        decode_json(endpoints::AUTH_PROFILE, resp).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` if the email is unknown.
    pub async fn request_password_reset(&self, email: &str) -> Result<MessageResponse, ClientError> {
        let resp = self
            .send(
                self.request(Method::POST, endpoints::PASSWORD_RESET_REQUEST)
                    .json(&json!({ "email": email })),
            )
            .await?;
        decode_json(endpoints::PASSWORD_RESET_REQUEST, resp).await
    }

    /// Set a new password using the token from the reset email.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the two passwords differ (no
    /// request is made), or `ClientError::Api` for a used or expired token.
    pub async fn confirm_password_reset(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<MessageResponse, ClientError> {
        if new_password != confirm_password {
            return Err(ClientError::Validation("Passwords do not match.".into()));
        }
        if new_password.is_empty() {
            return Err(ClientError::Validation("Password must not be empty.".into()));
        }
        let path = endpoints::password_reset_confirm(token.trim());
        let resp = self
            .send(
                self.request(Method::POST, &path)
                    .json(&json!({ "new_password": new_password })),
            )
            .await?;
        decode_json(&path, resp).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` if the address is unknown or already verified.
    pub async fn resend_confirmation(&self, email: &str) -> Result<MessageResponse, ClientError> {
        let path = format!(
            "{}?email={}",
            endpoints::AUTH_RESEND_CONFIRMATION,
            urlencoding::encode(email.trim())
        );
        let resp = self.send(self.request(Method::GET, &path)).await?;
        decode_json(endpoints::AUTH_RESEND_CONFIRMATION, resp).await
    }

    // ── Billing ───────────────────────────────────────────────────

    /// # Errors
    ///
    /// Returns `ClientError::Auth` when no token is attached.
    pub async fn subscription_status(&self) -> Result<SubscriptionStatus, ClientError> {
        let resp = self
            .send(self.authed(Method::GET, endpoints::SUBSCRIPTION_STATUS)?)
            .await?;
        decode_json(endpoints::SUBSCRIPTION_STATUS, resp).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::MalformedResponse` if the list does not parse.
    pub async fn prices(&self, interval: &str) -> Result<Vec<Price>, ClientError> {
        let path = endpoints::pricing(interval);
        let resp = self.send(self.request(Method::GET, &path)).await?;
        decode_json(&path, resp).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Auth` when no token is attached.
    pub async fn checkout_url(&self) -> Result<CheckoutResponse, ClientError> {
        let resp = self
            .send(self.authed(Method::GET, endpoints::CHECKOUT_START)?)
            .await?;
        decode_json(endpoints::CHECKOUT_START, resp).await
    }

    /// Wake the backend. The body is ignored.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the backend is unreachable.
    pub async fn ping(&self) -> Result<(), ClientError> {
        self.send(self.request(Method::GET, endpoints::PING)).await?;
        Ok(())
    }
}

#[async_trait]
impl Backend for SimpaiClient {
    async fn upload(
        &self,
        kind: ArtifactKind,
        file: &FileDescriptor,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ClientError> {
        let endpoint = match kind {
            ArtifactKind::Spreadsheet => endpoints::SPREADSHEET_UPLOAD,
            ArtifactKind::Pdf => endpoints::PDF_UPLOAD,
        };
        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new().part("file", part);
        tracing::debug!(endpoint, file = %file.name, size = file.size, "uploading");
        let resp = self
            .send(self.request(Method::POST, endpoint).multipart(form))
            .await?;
        decode_json(endpoint, resp).await
    }

    async fn analyze(&self, file_id: &str) -> Result<AnalyzeResponse, ClientError> {
        let resp = self
            .send(
                self.request(Method::POST, endpoints::SPREADSHEET_ANALYZE)
                    .json(&json!({ "file_id": file_id })),
            )
            .await?;
        decode_json(endpoints::SPREADSHEET_ANALYZE, resp).await
    }

    async fn generate_charts(
        &self,
        file_id: &str,
        sample_size: u32,
    ) -> Result<ChartsResponse, ClientError> {
        let resp = self
            .send(
                self.request(Method::POST, endpoints::SPREADSHEET_CHARTS)
                    .json(&json!({ "file_id": file_id, "sample_size": sample_size })),
            )
            .await?;
        decode_json(endpoints::SPREADSHEET_CHARTS, resp).await
    }

    async fn summarize(&self, file_id: &str, prompt_key: &str) -> Result<Bytes, ClientError> {
        let resp = self
            .send(
                self.request(Method::POST, endpoints::PDF_SUMMARIZE)
                    .json(&json!({ "file_id": file_id, "prompt_key": prompt_key })),
            )
            .await?;
        Self::pdf_bytes(endpoints::PDF_SUMMARIZE, resp).await
    }

    async fn ask_custom(&self, file_id: &str, prompt: &str) -> Result<Bytes, ClientError> {
        let resp = self
            .send(
                self.request(Method::POST, endpoints::PDF_ASK)
                    .json(&json!({ "file_id": file_id, "custom_prompt": prompt })),
            )
            .await?;
        Self::pdf_bytes(endpoints::PDF_ASK, resp).await
    }

    async fn ask_once(&self, question: &str) -> Result<ChatResponse, ClientError> {
        let resp = self
            .send(
                self.request(Method::POST, endpoints::CHAT_ONCE)
                    .json(&json!({ "question": question })),
            )
            .await?;
        decode_json(endpoints::CHAT_ONCE, resp).await
    }

    async fn stream_tokens(
        &self,
        request: &TokenRequest,
        cancel: &CancellationToken,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<StreamOutcome, StreamError> {
        let builder = self
            .request(Method::POST, request.endpoint)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&request.body);

        let resp = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Ok(StreamOutcome { status: StreamStatus::Cancelled, tokens: 0 });
            }
            resp = self.send(builder) => resp?,
        };

        read_token_stream(resp.bytes_stream(), cancel, |token: &str| on_token(token)).await
    }
}
