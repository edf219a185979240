//! Streaming an assistant reply into a transcript.

use simpai_client::{Backend, StreamOutcome, TokenRequest};
use simpai_core::{ArtifactKind, ChatMessage, SessionRecord};
use simpai_store::{KvStore, set_typed};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::SessionError;
use crate::notify::Notifier;

/// Shown in place of an answer that never arrived.
pub const FALLBACK_REPLY: &str = "Failed to get a response.";

/// Append the user's question and an empty assistant placeholder. Returns the
/// placeholder id.
pub(crate) fn open_reply(record: &mut SessionRecord, question: &str) -> String {
    record.push_message(ChatMessage::user(question));
    record.push_message(ChatMessage::placeholder())
}

/// Where a session record is written while a reply streams in.
#[derive(Clone, Copy)]
pub(crate) struct Checkpoint<'a> {
    pub store: &'a dyn KvStore,
    pub kind: ArtifactKind,
}

impl Checkpoint<'_> {
    /// Write `record`. Failures are logged and swallowed.
    pub async fn save(self, record: &SessionRecord) {
        let kind = self.kind;
        if let Err(e) = set_typed(self.store, kind.store(), kind.record_id(), record).await {
            tracing::warn!(store = %kind.store(), error = %e, "failed to persist session record");
        }
    }
}

/// Stream tokens into the placeholder `reply_id`.
///
/// With a `checkpoint`, the record is saved each time the backend stops to
/// wait for more bytes, so a dropped stream keeps what was delivered.
///
/// - completed: the placeholder is completed with every token
/// - cancelled: delivered tokens stay; an empty placeholder is dropped
/// - failed: partial text stays, an empty placeholder gets [`FALLBACK_REPLY`]
pub(crate) async fn stream_reply<B, N>(
    backend: &B,
    notifier: &N,
    record: &mut SessionRecord,
    reply_id: &str,
    request: &TokenRequest,
    cancel: &CancellationToken,
    checkpoint: Option<Checkpoint<'_>>,
) -> Result<StreamOutcome, SessionError>
where
    B: Backend + ?Sized,
    N: Notifier + ?Sized,
{
    let (snapshots, mut latest) = watch::channel::<Option<SessionRecord>>(None);
    let result = {
        let mut on_token = |token: &str| {
            let Some(reply) = record.message_mut(reply_id) else {
                return;
            };
            match reply.append_token(token) {
                Ok(()) => notifier.token(token),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping token for a closed reply");
                    return;
                }
            }
            if checkpoint.is_some() {
                snapshots.send_replace(Some(record.clone()));
            }
        };
        let streaming = backend.stream_tokens(request, cancel, &mut on_token);
        match checkpoint {
            None => streaming.await,
            Some(checkpoint) => {
                tokio::pin!(streaming);
                loop {
                    tokio::select! {
                        result = &mut streaming => break result,
                        Ok(()) = latest.changed() => {
                            let snapshot = latest.borrow_and_update().clone();
                            if let Some(snapshot) = snapshot {
                                checkpoint.save(&snapshot).await;
                            }
                        }
                    }
                }
            }
        }
    };

    match result {
        Ok(outcome) if outcome.is_cancelled() && outcome.tokens == 0 => {
            record.remove_message(reply_id);
            tracing::debug!(endpoint = request.endpoint, "reply cancelled before any token");
            Ok(outcome)
        }
        Ok(outcome) => {
            if let Some(reply) = record.message_mut(reply_id)
                && let Err(e) = reply.complete()
            {
                tracing::warn!(error = %e, "reply already complete");
            }
            tracing::debug!(
                endpoint = request.endpoint,
                tokens = outcome.tokens,
                cancelled = outcome.is_cancelled(),
                "reply finished"
            );
            Ok(outcome)
        }
        Err(e) => {
            if let Some(reply) = record.message_mut(reply_id)
                && let Err(err) = reply.fail_with(FALLBACK_REPLY)
            {
                tracing::warn!(error = %err, "reply already complete");
            }
            tracing::warn!(endpoint = request.endpoint, error = %e, "streamed reply failed");
            notifier.error(FALLBACK_REPLY);
            Err(e.into())
        }
    }
}
