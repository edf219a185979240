//! Spreadsheet session: upload, analysis, charts and streamed questions.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use simpai_client::{Backend, StreamOutcome, TokenRequest};
use simpai_core::{ActionKind, ActionTracker, ArtifactKind, FileDescriptor, SessionRecord};
use simpai_store::KvStore;
use tokio_util::sync::CancellationToken;

use crate::controller::{SessionCore, UploadMessages};
use crate::error::SessionError;
use crate::notify::Notifier;

/// Derived-artifact key holding the backend's chart suggestion.
pub const ANALYSIS_KEY: &str = "analysis";

/// Prefix that turns a base64 PNG into an embeddable image URI.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

const UPLOAD_MESSAGES: UploadMessages = UploadMessages {
    rejected: "Please upload a valid spreadsheet file",
    uploaded: "File uploaded successfully!",
    failed: "Failed to upload file. Please try again.",
};
const NO_FILE: &str = "Please upload a spreadsheet first";

/// Wrap a base64 PNG as a data URI unless it already is one.
#[must_use]
pub fn to_data_uri(payload: &str) -> String {
    if payload.starts_with(PNG_DATA_URI_PREFIX) {
        payload.to_string()
    } else {
        format!("{PNG_DATA_URI_PREFIX}{payload}")
    }
}

pub struct SpreadsheetSession<B, S, N> {
    core: SessionCore<B, S, N>,
}

impl<B, S, N> SpreadsheetSession<B, S, N>
where
    B: Backend,
    S: KvStore,
    N: Notifier,
{
    /// Resume the stored spreadsheet session, or start a fresh one.
    pub async fn open(backend: Arc<B>, store: Arc<S>, notifier: N) -> Self {
        Self {
            core: SessionCore::open(ArtifactKind::Spreadsheet, backend, store, notifier).await,
        }
    }

    #[must_use]
    pub const fn record(&self) -> &SessionRecord {
        &self.core.record
    }

    #[must_use]
    pub const fn actions(&self) -> &ActionTracker {
        &self.core.tracker
    }

    #[must_use]
    pub fn analysis(&self) -> Option<&str> {
        self.core.record.derived().get(ANALYSIS_KEY).map(String::as_str)
    }

    /// Chart name → data URI.
    #[must_use]
    pub fn charts(&self) -> BTreeMap<&str, &str> {
        self.core
            .record
            .derived()
            .iter()
            .filter(|(name, _)| name.as_str() != ANALYSIS_KEY)
            .map(|(name, uri)| (name.as_str(), uri.as_str()))
            .collect()
    }

    /// Upload a spreadsheet from disk (`.xlsx`, `.xls`, `.csv`).
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` for other file types (nothing is read or
    /// sent), or the upload failure.
    pub async fn upload_path(&mut self, path: &Path) -> Result<(), SessionError> {
        self.core.upload_path(path, &UPLOAD_MESSAGES).await
    }

    /// Upload in-memory bytes described by `file`.
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` if `file.mime_type` is not a spreadsheet
    /// type, or the upload failure.
    pub async fn upload(&mut self, file: FileDescriptor, bytes: Vec<u8>) -> Result<(), SessionError> {
        self.core.upload(file, bytes, &UPLOAD_MESSAGES).await
    }

    /// Ask the backend which chart suits the data; stored under
    /// [`ANALYSIS_KEY`].
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` without an uploaded file,
    /// `SessionError::ActionInFlight`, or the backend failure.
    pub async fn analyze(&mut self) -> Result<String, SessionError> {
        let file_id = self.core.require_file_id(NO_FILE)?;
        self.core.begin(ActionKind::Analyze).await?;

        match self.core.backend.analyze(&file_id).await {
            Ok(resp) => {
                self.core
                    .record
                    .insert_derived(ANALYSIS_KEY, resp.chart_suggestion.clone());
                self.core.finish(ActionKind::Analyze, true).await;
                self.core.notifier.success("Analysis complete!");
                Ok(resp.chart_suggestion)
            }
            Err(e) => {
                tracing::warn!(error = %e, "analysis failed");
                self.core.finish(ActionKind::Analyze, false).await;
                self.core.notifier.error("Failed to analyze data");
                Err(e.into())
            }
        }
    }

    /// Generate charts from a sample of `sample_size` rows. Previous charts
    /// are replaced; the analysis is kept. Returns the chart names.
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` without an uploaded file or with a zero
    /// sample size, `SessionError::ActionInFlight`, or the backend failure.
    pub async fn generate_charts(&mut self, sample_size: u32) -> Result<Vec<String>, SessionError> {
        let file_id = self.core.require_file_id(NO_FILE)?;
        if sample_size == 0 {
            return self.core.reject("Sample size must be at least 1");
        }
        self.core.begin(ActionKind::GenerateCharts).await?;

        match self.core.backend.generate_charts(&file_id, sample_size).await {
            Ok(resp) => {
                let charts: BTreeMap<String, String> = resp
                    .into_charts()
                    .into_iter()
                    .map(|(name, payload)| (name, to_data_uri(&payload)))
                    .collect();
                let names = charts.keys().cloned().collect();
                self.core.record.replace_derived(charts, &[ANALYSIS_KEY]);
                self.core.finish(ActionKind::GenerateCharts, true).await;
                self.core.notifier.success("Charts generated successfully!");
                Ok(names)
            }
            Err(e) => {
                tracing::warn!(error = %e, sample_size, "chart generation failed");
                self.core.finish(ActionKind::GenerateCharts, false).await;
                self.core.notifier.error("Failed to generate charts");
                Err(e.into())
            }
        }
    }

    /// Ask a question about the data; the answer streams into the transcript.
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` without an uploaded file or with an empty
    /// question, `SessionError::ActionInFlight`, or the stream failure.
    /// Cancellation is not an error.
    pub async fn ask(
        &mut self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, SessionError> {
        let file_id = self.core.require_file_id(NO_FILE)?;
        let question = self.core.require_text(question, "Please enter a question")?;
        let request = TokenRequest::spreadsheet(&file_id, &question);
        self.core.converse(ActionKind::Ask, &request, cancel).await
    }

    /// Abandon the in-flight state of `action` so it can be started again.
    pub async fn abandon(&mut self, action: ActionKind) {
        self.core.abandon(action).await;
    }

    /// Restore the transcript to its greeting, keeping the file.
    pub async fn reset_chat(&mut self) {
        self.core.reset_chat().await;
    }

    /// Forget the file and everything derived from it, and delete the stored
    /// record.
    pub async fn reset(&mut self) {
        self.core.clear().await;
        tracing::info!("spreadsheet session reset");
    }
}
