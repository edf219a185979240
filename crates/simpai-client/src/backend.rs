//! The seam between session controllers and the network.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use simpai_core::{ArtifactKind, FileDescriptor};
use tokio_util::sync::CancellationToken;

use crate::endpoints;
use crate::error::ClientError;
use crate::responses::{AnalyzeResponse, ChartsResponse, ChatResponse, UploadResponse};
use crate::stream::{StreamError, StreamOutcome};

/// Body of a streamed question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub question: String,
}

/// A streamed question: which endpoint to hit and what to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub endpoint: &'static str,
    pub body: AskBody,
}

impl TokenRequest {
    /// Question about an uploaded spreadsheet (`csv/ask/`).
    #[must_use]
    pub fn spreadsheet(file_id: &str, question: &str) -> Self {
        Self {
            endpoint: endpoints::SPREADSHEET_ASK,
            body: AskBody {
                file_id: Some(file_id.to_string()),
                question: question.to_string(),
            },
        }
    }

    /// Chat turn (`gpt-chat/`), optionally grounded in an uploaded PDF.
    #[must_use]
    pub fn chat(file_id: Option<&str>, question: &str) -> Self {
        Self {
            endpoint: endpoints::CHAT_STREAM,
            body: AskBody {
                file_id: file_id.map(str::to_string),
                question: question.to_string(),
            },
        }
    }
}

/// Backend operations the session controllers depend on.
///
/// [`SimpaiClient`](crate::SimpaiClient) is the production implementation;
/// tests substitute fakes that count calls.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Upload an artifact's bytes; returns the backend file id.
    async fn upload(
        &self,
        kind: ArtifactKind,
        file: &FileDescriptor,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ClientError>;

    async fn analyze(&self, file_id: &str) -> Result<AnalyzeResponse, ClientError>;

    async fn generate_charts(
        &self,
        file_id: &str,
        sample_size: u32,
    ) -> Result<ChartsResponse, ClientError>;

    /// Summarize a PDF in one of the canned styles; returns PDF bytes.
    async fn summarize(&self, file_id: &str, prompt_key: &str) -> Result<Bytes, ClientError>;

    /// Run a free-form prompt against a PDF; returns PDF bytes.
    async fn ask_custom(&self, file_id: &str, prompt: &str) -> Result<Bytes, ClientError>;

    /// One-shot general question without streaming.
    async fn ask_once(&self, question: &str) -> Result<ChatResponse, ClientError>;

    /// Send a streamed question, handing each token to `on_token` in order.
    async fn stream_tokens(
        &self,
        request: &TokenRequest,
        cancel: &CancellationToken,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<StreamOutcome, StreamError>;
}
