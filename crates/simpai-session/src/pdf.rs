//! PDF session: upload, generated summaries, and streamed chat about the
//! document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use simpai_client::{Backend, ClientError, StreamOutcome, TokenRequest};
use simpai_core::{ActionKind, ActionTracker, ArtifactKind, FileDescriptor, SessionRecord};
use simpai_store::KvStore;
use tokio_util::sync::CancellationToken;

use crate::controller::{SessionCore, UploadMessages};
use crate::documents::DocumentStore;
use crate::error::SessionError;
use crate::notify::Notifier;

/// Derived-artifact key holding the `file://` URL of the latest generated PDF.
pub const GENERATED_PDF_KEY: &str = "generated_pdf";

/// Summary styles offered to users. The backend falls back to its default
/// style for keys it does not know.
pub const SUMMARY_STYLES: [&str; 3] = ["summary", "beginners", "technical"];

const UPLOAD_MESSAGES: UploadMessages = UploadMessages {
    rejected: "Please upload a PDF file",
    uploaded: "PDF uploaded successfully!",
    failed: "Failed to upload PDF",
};
const NO_FILE: &str = "No PDF uploaded yet";
const NO_FILE_FOR_CHAT: &str = "Please upload a PDF first.";

pub struct PdfSession<B, S, N> {
    core: SessionCore<B, S, N>,
    documents: DocumentStore,
}

impl<B, S, N> PdfSession<B, S, N>
where
    B: Backend,
    S: KvStore,
    N: Notifier,
{
    /// Resume the stored PDF session, or start a fresh one. Generated
    /// documents are written under `documents`.
    pub async fn open(backend: Arc<B>, store: Arc<S>, notifier: N, documents: DocumentStore) -> Self {
        Self {
            core: SessionCore::open(ArtifactKind::Pdf, backend, store, notifier).await,
            documents,
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

    /// `file://` URL of the latest generated document.
    #[must_use]
    pub fn generated_document(&self) -> Option<&str> {
        self.core
            .record
            .derived()
            .get(GENERATED_PDF_KEY)
            .map(String::as_str)
    }

    /// Upload a PDF from disk. A previously generated document is released
    /// once the new upload succeeds.
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` for non-PDF files (nothing is read or
    /// sent), or the upload failure.
    pub async fn upload_path(&mut self, path: &Path) -> Result<(), SessionError> {
        let previous = self.generated_document().map(str::to_string);
        self.core.upload_path(path, &UPLOAD_MESSAGES).await?;
        self.release(previous).await;
        Ok(())
    }

    /// Upload in-memory bytes described by `file`.
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` if `file` is not a PDF, or the upload
    /// failure.
    pub async fn upload(&mut self, file: FileDescriptor, bytes: Vec<u8>) -> Result<(), SessionError> {
        let previous = self.generated_document().map(str::to_string);
        self.core.upload(file, bytes, &UPLOAD_MESSAGES).await?;
        self.release(previous).await;
        Ok(())
    }

    /// Generate a summary document in one of the [`SUMMARY_STYLES`].
    /// Returns the document's `file://` URL.
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` without an uploaded file or with an empty
    /// style, `SessionError::ActionInFlight`, or the backend failure.
    pub async fn summarize(&mut self, prompt_key: &str) -> Result<String, SessionError> {
        let file_id = self.core.require_file_id(NO_FILE)?;
        let prompt_key = self.core.require_text(prompt_key, "Please choose a summary style")?;
        self.core.begin(ActionKind::Summarize).await?;
        let result = self.core.backend.summarize(&file_id, &prompt_key).await;
        self.store_document(
            ActionKind::Summarize,
            result,
            "Generated PDF successfully!",
            "Failed to generate PDF",
        )
        .await
    }

    /// Run a free-form prompt against the PDF. Returns the generated
    /// document's `file://` URL.
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` without an uploaded file or with an empty
    /// prompt, `SessionError::ActionInFlight`, or the backend failure.
    pub async fn ask_custom(&mut self, prompt: &str) -> Result<String, SessionError> {
        let file_id = self.core.require_file_id(NO_FILE)?;
        let prompt = self.core.require_text(prompt, "Please enter a prompt")?;
        self.core.begin(ActionKind::AskCustom).await?;
        let result = self.core.backend.ask_custom(&file_id, &prompt).await;
        self.store_document(
            ActionKind::AskCustom,
            result,
            "Custom prompt processed successfully!",
            "Failed to process custom prompt",
        )
        .await
    }

    /// Chat about the PDF; the answer streams into the transcript.
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` without an uploaded file or with an empty
    /// question, `SessionError::ActionInFlight`, or the stream failure.
    /// Cancellation is not an error.
    pub async fn chat(
        &mut self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, SessionError> {
        let file_id = self.core.require_file_id(NO_FILE_FOR_CHAT)?;
        let question = self.core.require_text(question, "Please enter a question")?;
        let request = TokenRequest::chat(Some(&file_id), &question);
        self.core.converse(ActionKind::Chat, &request, cancel).await
    }

    /// Copy the generated document to `dest` (a file path or a directory).
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` when nothing has been generated yet, or the
    /// copy failure.
    pub async fn export_document(&self, dest: &Path) -> Result<PathBuf, SessionError> {
        let Some(url) = self.generated_document() else {
            return self.core.reject("No generated PDF available to download");
        };
        match self.documents.export(url, dest).await {
            Ok(target) => {
                self.core
                    .notifier
                    .success(&format!("Saved {}", target.display()));
                Ok(target)
            }
            Err(e) => {
                tracing::warn!(error = %e, dest = %dest.display(), "export failed");
                self.core.notifier.error("Failed to save the generated PDF");
                Err(e.into())
            }
        }
    }

    pub async fn abandon(&mut self, action: ActionKind) {
        self.core.abandon(action).await;
    }

    /// Restore the transcript to its greeting, keeping the file.
    pub async fn reset_chat(&mut self) {
        self.core.reset_chat().await;
    }

    /// Release the generated document, forget the file, and delete the stored
    /// record.
    pub async fn reset(&mut self) {
        let previous = self.generated_document().map(str::to_string);
        self.release(previous).await;
        self.core.clear().await;
        tracing::info!("pdf session reset");
    }

    async fn store_document(
        &mut self,
        action: ActionKind,
        result: Result<Bytes, ClientError>,
        done: &str,
        failed: &str,
    ) -> Result<String, SessionError> {
        let written = match result {
            Ok(bytes) => self.documents.write(&bytes).await.map_err(SessionError::from),
            Err(e) => Err(e.into()),
        };
        match written {
            Ok(url) => {
                let previous = self.core.record.remove_derived(GENERATED_PDF_KEY);
                self.release(previous).await;
                self.core.record.insert_derived(GENERATED_PDF_KEY, url.clone());
                self.core.finish(action, true).await;
                self.core.notifier.success(done);
                Ok(url)
            }
            Err(e) => {
                tracing::warn!(%action, error = %e, "document generation failed");
                self.core.finish(action, false).await;
                self.core.notifier.error(failed);
                Err(e)
            }
        }
    }

    async fn release(&self, url: Option<String>) {
        if let Some(url) = url {
            self.documents.release(&url).await;
        }
    }
}
