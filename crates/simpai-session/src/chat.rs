//! General chat, not tied to an uploaded file. The transcript lives only as
//! long as the session.

use std::sync::Arc;

use simpai_client::{Backend, StreamOutcome, TokenRequest};
use simpai_core::{ActionKind, ActionTracker, ChatMessage, SessionRecord};
use tokio_util::sync::CancellationToken;

use crate::controller::BUSY;
use crate::error::SessionError;
use crate::notify::Notifier;
use crate::reply::{FALLBACK_REPLY, open_reply, stream_reply};

pub const CHAT_GREETING: &str = "Hello! How can I assist you today?";

pub struct ChatSession<B, N> {
    backend: Arc<B>,
    notifier: N,
    record: SessionRecord,
    tracker: ActionTracker,
}

impl<B: Backend, N: Notifier> ChatSession<B, N> {
    #[must_use]
    pub fn new(backend: Arc<B>, notifier: N) -> Self {
        Self {
            backend,
            notifier,
            record: SessionRecord::opening_with(CHAT_GREETING),
            tracker: ActionTracker::new(),
        }
    }

    #[must_use]
    pub fn transcript(&self) -> &[ChatMessage] {
        self.record.transcript()
    }

    /// Ask a question; the answer streams into the transcript.
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` for an empty question,
    /// `SessionError::ActionInFlight`, or the stream failure. Cancellation is
    /// not an error.
    pub async fn ask(
        &mut self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<StreamOutcome, SessionError> {
        let question = self.validate(question)?;
        self.begin()?;
        let request = TokenRequest::chat(None, &question);
        let reply_id = open_reply(&mut self.record, &question);
        let result = stream_reply(
            self.backend.as_ref(),
            &self.notifier,
            &mut self.record,
            &reply_id,
            &request,
            cancel,
            None,
        )
        .await;
        let transition = match &result {
            Ok(outcome) if outcome.is_cancelled() => self.tracker.cancel(ActionKind::Chat),
            Ok(_) => self.tracker.finish(ActionKind::Chat, true),
            Err(_) => self.tracker.finish(ActionKind::Chat, false),
        };
        if let Err(e) = transition {
            tracing::warn!(error = %e, "chat state out of sync");
        }
        result
    }

    /// Ask a question and wait for the whole answer in one response.
    ///
    /// # Errors
    ///
    /// `SessionError::Validation` for an empty question,
    /// `SessionError::ActionInFlight`, or the backend failure. On failure the
    /// transcript still gains [`FALLBACK_REPLY`].
    pub async fn ask_once(&mut self, question: &str) -> Result<String, SessionError> {
        let question = self.validate(question)?;
        self.begin()?;
        self.record.push_message(ChatMessage::user(question.as_str()));

        match self.backend.ask_once(&question).await {
            Ok(resp) => {
                self.record.push_message(ChatMessage::ai(resp.response.as_str()));
                self.finish(true);
                Ok(resp.response)
            }
            Err(e) => {
                tracing::warn!(error = %e, "one-shot chat failed");
                self.record.push_message(ChatMessage::ai(FALLBACK_REPLY));
                self.finish(false);
                self.notifier.error(FALLBACK_REPLY);
                Err(e.into())
            }
        }
    }

    /// Start over from the greeting.
    pub fn reset(&mut self) {
        self.record = SessionRecord::opening_with(CHAT_GREETING);
        self.tracker.clear();
    }

    fn validate(&self, question: &str) -> Result<String, SessionError> {
        let question = question.trim();
        if question.is_empty() {
            let message = "Please enter a question";
            self.notifier.error(message);
            return Err(SessionError::Validation(message.into()));
        }
        Ok(question.to_string())
    }

    fn begin(&mut self) -> Result<(), SessionError> {
        if self.tracker.is_in_flight(ActionKind::Chat) {
            self.notifier.error(BUSY);
            return Err(SessionError::ActionInFlight {
                action: ActionKind::Chat,
            });
        }
        self.tracker.begin(ActionKind::Chat)?;
        Ok(())
    }

    fn finish(&mut self, success: bool) {
        if let Err(e) = self.tracker.finish(ActionKind::Chat, success) {
            tracing::warn!(error = %e, "chat state out of sync");
        }
    }
}
