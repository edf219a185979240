//! Behaviour shared by the spreadsheet and PDF controllers: record restore
//! and persistence, the per-action state machine, uploads and streamed
//! replies.

use std::path::Path;
use std::sync::Arc;

use simpai_client::{Backend, StreamOutcome, TokenRequest};
use simpai_core::file_type::{ensure_allowed, infer_mime};
use simpai_core::{ActionKind, ActionTracker, ArtifactKind, FileDescriptor, SessionRecord};
use simpai_store::{KvStore, get_typed};
use tokio_util::sync::CancellationToken;

use crate::error::SessionError;
use crate::notify::Notifier;
use crate::reply::{Checkpoint, open_reply, stream_reply};

/// Shown when an action is started while the same action is running.
pub(crate) const BUSY: &str = "Please wait for the current action to finish";

/// Notification texts that differ per artifact.
pub(crate) struct UploadMessages {
    pub rejected: &'static str,
    pub uploaded: &'static str,
    pub failed: &'static str,
}

pub(crate) struct SessionCore<B, S, N> {
    pub kind: ArtifactKind,
    pub backend: Arc<B>,
    pub store: Arc<S>,
    pub notifier: N,
    pub record: SessionRecord,
    pub tracker: ActionTracker,
}

impl<B, S, N> SessionCore<B, S, N>
where
    B: Backend,
    S: KvStore,
    N: Notifier,
{
    pub async fn open(kind: ArtifactKind, backend: Arc<B>, store: Arc<S>, notifier: N) -> Self {
        let record = restore(store.as_ref(), kind).await;
        Self {
            kind,
            backend,
            store,
            notifier,
            record,
            tracker: ActionTracker::new(),
        }
    }

    fn checkpoint(&self) -> Checkpoint<'_> {
        Checkpoint {
            store: self.store.as_ref(),
            kind: self.kind,
        }
    }

    /// Write the record. Failures are logged and swallowed.
    pub async fn persist(&self) {
        self.checkpoint().save(&self.record).await;
    }

    /// Reject with a notification.
    pub fn reject<T>(&self, message: &str) -> Result<T, SessionError> {
        self.notifier.error(message);
        Err(SessionError::Validation(message.to_string()))
    }

    pub fn require_file_id(&self, missing: &str) -> Result<String, SessionError> {
        match self.record.file_id() {
            Some(id) => Ok(id.to_string()),
            None => self.reject(missing),
        }
    }

    pub fn require_text(&self, text: &str, empty: &str) -> Result<String, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return self.reject(empty);
        }
        Ok(text.to_string())
    }

    /// Enter `action`'s in-flight state.
    pub async fn begin(&mut self, action: ActionKind) -> Result<(), SessionError> {
        if self.tracker.is_in_flight(action) {
            tracing::debug!(%action, "rejecting re-entrant action");
            self.notifier.error(BUSY);
            return Err(SessionError::ActionInFlight { action });
        }
        self.tracker.begin(action)?;
        self.record
            .set_processing_status(Some(action.progress_label().to_string()));
        self.persist().await;
        Ok(())
    }

    pub async fn finish(&mut self, action: ActionKind, success: bool) {
        if let Err(e) = self.tracker.finish(action, success) {
            tracing::warn!(%action, error = %e, "action state out of sync");
        }
        self.record.set_processing_status(None);
        self.persist().await;
    }

    /// Read a file from disk and upload it. The type check runs before the
    /// file is read.
    pub async fn upload_path(&mut self, path: &Path, messages: &UploadMessages) -> Result<(), SessionError> {
        let Some(mime) = infer_mime(path).filter(|m| ensure_allowed(self.kind, m).is_ok()) else {
            tracing::debug!(path = %path.display(), kind = %self.kind, "upload rejected by type");
            return self.reject(messages.rejected);
        };
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read upload");
                self.notifier.error(messages.failed);
                return Err(e.into());
            }
        };
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let file = FileDescriptor::new(name, mime, bytes.len() as u64);
        self.upload(file, bytes, messages).await
    }

    pub async fn upload(
        &mut self,
        file: FileDescriptor,
        bytes: Vec<u8>,
        messages: &UploadMessages,
    ) -> Result<(), SessionError> {
        if ensure_allowed(self.kind, &file.mime_type).is_err() {
            return self.reject(messages.rejected);
        }
        self.begin(ActionKind::Upload).await?;

        match self.backend.upload(self.kind, &file, bytes).await {
            Ok(resp) => {
                tracing::info!(kind = %self.kind, file = %file.name, file_id = %resp.file_id, "file uploaded");
                self.record.attach_file(file, resp.file_id);
                self.finish(ActionKind::Upload, true).await;
                self.notifier.success(messages.uploaded);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(kind = %self.kind, error = %e, "upload failed");
                self.finish(ActionKind::Upload, false).await;
                self.notifier.error(messages.failed);
                Err(e.into())
            }
        }
    }

    /// Ask a streamed question, recording it and the reply in the transcript.
    pub async fn converse(
        &mut self,
        action: ActionKind,
        request: &TokenRequest,
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, SessionError> {
        self.begin(action).await?;
        let reply_id = open_reply(&mut self.record, &request.body.question);
        self.persist().await;

        let checkpoint = Checkpoint {
            store: self.store.as_ref(),
            kind: self.kind,
        };
        let result = stream_reply(
            self.backend.as_ref(),
            &self.notifier,
            &mut self.record,
            &reply_id,
            request,
            cancel,
            Some(checkpoint),
        )
        .await;

        match &result {
            Ok(outcome) if outcome.is_cancelled() => {
                if let Err(e) = self.tracker.cancel(action) {
                    tracing::warn!(%action, error = %e, "action state out of sync");
                }
                self.record.set_processing_status(None);
                self.persist().await;
            }
            Ok(_) => self.finish(action, true).await,
            Err(_) => self.finish(action, false).await,
        }
        result
    }

    /// Return an action stuck in flight (its future was dropped) to idle.
    pub async fn abandon(&mut self, action: ActionKind) {
        if self.tracker.is_in_flight(action) && self.tracker.cancel(action).is_ok() {
            tracing::debug!(%action, "in-flight action abandoned");
            self.record.set_processing_status(None);
            self.persist().await;
        }
    }

    /// Drop the file, derived artifacts and transcript, and delete the
    /// stored record.
    pub async fn clear(&mut self) {
        self.record = SessionRecord::with_greeting(self.kind);
        self.tracker.clear();
        let kind = self.kind;
        if let Err(e) = self.store.delete(kind.store(), kind.record_id()).await {
            tracing::warn!(store = %kind.store(), error = %e, "failed to delete session record");
        }
    }

    /// Restore the transcript to its greeting, keeping the file.
    pub async fn reset_chat(&mut self) {
        self.record.reset_transcript(self.kind);
        self.persist().await;
    }
}

/// Load the stored record for `kind`, falling back to a fresh one.
///
/// Messages left incomplete by an interrupted run are sealed and any stale
/// processing status is cleared.
async fn restore<S: KvStore + ?Sized>(store: &S, kind: ArtifactKind) -> SessionRecord {
    let mut record = match get_typed::<SessionRecord, _>(store, kind.store(), kind.record_id()).await {
        Ok(Some(record)) => record,
        Ok(None) => return SessionRecord::with_greeting(kind),
        Err(e) => {
            tracing::warn!(store = %kind.store(), error = %e, "discarding unreadable session record");
            return SessionRecord::with_greeting(kind);
        }
    };
    if let Err(e) = record.validate() {
        tracing::warn!(store = %kind.store(), error = %e, "discarding invalid session record");
        return SessionRecord::with_greeting(kind);
    }
    record.seal_incomplete_messages();
    record.set_processing_status(None);
    if record.transcript().is_empty() {
        record.reset_transcript(kind);
    }
    record
}
