//! Fake backend and helpers shared by the controller tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{StreamExt, stream};
use serde_json::{Value, json};
use simpai_client::responses::{AnalyzeResponse, ChartsResponse, ChatResponse, UploadResponse};
use simpai_client::{
    Backend, ClientError, StreamError, StreamOutcome, TokenRequest, read_token_stream,
};
use simpai_core::{ArtifactKind, FileDescriptor, StoreName};
use simpai_session::{Notice, Notifier, RecordingNotifier};
use simpai_store::{KvStore, StoreError};
use tokio_util::sync::CancellationToken;

/// Scripted backend that records every call it receives.
pub struct FakeBackend {
    pub calls: Mutex<HashMap<&'static str, usize>>,
    pub requests: Mutex<Vec<TokenRequest>>,
    pub file_id: String,
    pub charts: Value,
    pub stream_chunks: Vec<Vec<u8>>,
    pub document: Vec<u8>,
    pub fail: Mutex<Option<&'static str>>,
    pub hang: Option<&'static str>,
    /// Keep the token stream open after the last chunk.
    pub stall: bool,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            file_id: "abc".into(),
            charts: json!({"charts": {"revenue_chart": "iVBORw0KGgo"}}),
            stream_chunks: vec![
                b"data: {\"word\":\"The\"}\ndata: {\"wo".to_vec(),
                b"rd\":\"answer\"}\n".to_vec(),
            ],
            document: b"%PDF-1.4 summary".to_vec(),
            fail: Mutex::new(None),
            hang: None,
            stall: false,
        }
    }
}

impl FakeBackend {
    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn stream_requests(&self) -> Vec<TokenRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Make the next calls to `name` fail with a 500.
    pub fn fail_on(&self, name: &'static str) {
        *self.fail.lock().unwrap() = Some(name);
    }

    pub fn heal(&self) {
        *self.fail.lock().unwrap() = None;
    }

    async fn enter(&self, name: &'static str) -> Result<(), ClientError> {
        *self.calls.lock().unwrap().entry(name).or_default() += 1;
        if self.hang == Some(name) {
            std::future::pending::<()>().await;
        }
        if *self.fail.lock().unwrap() == Some(name) {
            return Err(ClientError::Api {
                status: 500,
                message: format!("{name} exploded"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn upload(
        &self,
        _kind: ArtifactKind,
        _file: &FileDescriptor,
        _bytes: Vec<u8>,
    ) -> Result<UploadResponse, ClientError> {
        self.enter("upload").await?;
        Ok(UploadResponse {
            file_id: self.file_id.clone(),
            preview: None,
        })
    }

    async fn analyze(&self, _file_id: &str) -> Result<AnalyzeResponse, ClientError> {
        self.enter("analyze").await?;
        Ok(AnalyzeResponse {
            chart_suggestion: "A bar chart of revenue by region".into(),
        })
    }

    async fn generate_charts(
        &self,
        _file_id: &str,
        _sample_size: u32,
    ) -> Result<ChartsResponse, ClientError> {
        self.enter("charts").await?;
        Ok(serde_json::from_value(self.charts.clone()).unwrap())
    }

    async fn summarize(&self, _file_id: &str, _prompt_key: &str) -> Result<Bytes, ClientError> {
        self.enter("summarize").await?;
        Ok(Bytes::from(self.document.clone()))
    }

    async fn ask_custom(&self, _file_id: &str, _prompt: &str) -> Result<Bytes, ClientError> {
        self.enter("ask_custom").await?;
        Ok(Bytes::from(self.document.clone()))
    }

    async fn ask_once(&self, question: &str) -> Result<ChatResponse, ClientError> {
        self.enter("ask_once").await?;
        Ok(ChatResponse {
            response: format!("You asked: {question}"),
        })
    }

    async fn stream_tokens(
        &self,
        request: &TokenRequest,
        cancel: &CancellationToken,
        on_token: &mut (dyn for<'t> FnMut(&'t str) + Send),
    ) -> Result<StreamOutcome, StreamError> {
        self.requests.lock().unwrap().push(request.clone());
        self.enter("stream").await?;
        let chunks: Vec<Result<Bytes, std::io::Error>> = self
            .stream_chunks
            .iter()
            .map(|c| Ok(Bytes::from(c.clone())))
            .collect();
        let body = stream::iter(chunks);
        if self.stall {
            read_token_stream(body.chain(stream::pending()), cancel, |t: &str| on_token(t)).await
        } else {
            read_token_stream(body, cancel, |t: &str| on_token(t)).await
        }
    }
}

/// Records notices and cancels the stream once `limit` tokens arrived.
pub struct CancelAfter {
    pub inner: RecordingNotifier,
    pub cancel: CancellationToken,
    limit: usize,
    seen: Mutex<usize>,
}

impl CancelAfter {
    pub fn new(limit: usize) -> Self {
        Self {
            inner: RecordingNotifier::new(),
            cancel: CancellationToken::new(),
            limit,
            seen: Mutex::new(0),
        }
    }
}

impl Notifier for CancelAfter {
    fn notify(&self, notice: Notice) {
        self.inner.notify(notice);
    }

    fn token(&self, token: &str) {
        self.inner.token(token);
        let mut seen = self.seen.lock().unwrap();
        *seen += 1;
        if *seen == self.limit {
            self.cancel.cancel();
        }
    }
}

/// Store whose every call fails, as when the database file is unreachable.
#[derive(Default)]
pub struct FailingStore;

impl FailingStore {
    fn unavailable() -> StoreError {
        StoreError::Open("database is locked".into())
    }
}

#[async_trait]
impl KvStore for FailingStore {
    async fn get(&self, _store: StoreName, _id: &str) -> Result<Option<Value>, StoreError> {
        Err(Self::unavailable())
    }

    async fn set(&self, _store: StoreName, _id: &str, _value: &Value) -> Result<(), StoreError> {
        Err(Self::unavailable())
    }

    async fn delete(&self, _store: StoreName, _id: &str) -> Result<(), StoreError> {
        Err(Self::unavailable())
    }
}

pub fn csv() -> FileDescriptor {
    FileDescriptor::new("sales.csv", "text/csv", 42)
}

pub fn pdf() -> FileDescriptor {
    FileDescriptor::new("report.pdf", "application/pdf", 2048)
}

pub fn words(n: usize) -> Vec<Vec<u8>> {
    (0..n)
        .map(|i| format!("data: {{\"word\": \"w{i}\"}}\n").into_bytes())
        .collect()
}
