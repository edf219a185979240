use serde::{Deserialize, Serialize};

use crate::enums::Sender;
use crate::errors::CoreError;

/// One message of a chat transcript.
///
/// Assistant replies start as an empty, incomplete placeholder, grow one
/// streamed token at a time, and are completed exactly once. A completed
/// message is never mutated again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub is_complete: bool,
}

impl ChatMessage {
    /// A complete message sent by the user.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            sender: Sender::User,
            is_complete: true,
        }
    }

    /// A complete assistant message.
    #[must_use]
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            sender: Sender::Ai,
            is_complete: true,
        }
    }

    /// An empty assistant message awaiting streamed tokens.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            id: new_id(),
            text: String::new(),
            sender: Sender::Ai,
            is_complete: false,
        }
    }

    /// Append one streamed token, separated from the previous one by a space.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MessageComplete` if the message is already complete.
    pub fn append_token(&mut self, token: &str) -> Result<(), CoreError> {
        self.ensure_open()?;
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(token);
        Ok(())
    }

    /// Mark the message complete.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MessageComplete` if it was already complete.
    pub fn complete(&mut self) -> Result<(), CoreError> {
        self.ensure_open()?;
        self.is_complete = true;
        Ok(())
    }

    /// Complete the message after a failure. An empty placeholder receives
    /// `fallback`; partial text is left as delivered.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MessageComplete` if it was already complete.
    pub fn fail_with(&mut self, fallback: &str) -> Result<(), CoreError> {
        self.ensure_open()?;
        if self.text.is_empty() {
            self.text = fallback.to_string();
        }
        self.is_complete = true;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), CoreError> {
        if self.is_complete {
            Err(CoreError::MessageComplete {
                id: self.id.clone(),
            })
        } else {
            Ok(())
        }
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
