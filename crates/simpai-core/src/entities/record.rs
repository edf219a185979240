use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::{ChatMessage, FileDescriptor};
use crate::enums::ArtifactKind;
use crate::errors::CoreError;

/// Resumable state of one artifact session.
///
/// `file` and `file_id` are only ever set or cleared together, so a record
/// never references a backend file it has no descriptor for (or vice versa).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    #[serde(default)]
    file: Option<FileDescriptor>,
    #[serde(default)]
    file_id: Option<String>,
    #[serde(default)]
    derived: BTreeMap<String, String>,
    #[serde(default)]
    transcript: Vec<ChatMessage>,
    #[serde(default)]
    processing_status: Option<String>,
}

impl SessionRecord {
    /// An empty record whose transcript opens with the artifact's greeting.
    #[must_use]
    pub fn with_greeting(kind: ArtifactKind) -> Self {
        Self::opening_with(kind.greeting())
    }

    /// An empty record whose transcript opens with `greeting`.
    #[must_use]
    pub fn opening_with(greeting: &str) -> Self {
        Self {
            transcript: vec![ChatMessage::ai(greeting)],
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn file(&self) -> Option<&FileDescriptor> {
        self.file.as_ref()
    }

    #[must_use]
    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    #[must_use]
    pub const fn derived(&self) -> &BTreeMap<String, String> {
        &self.derived
    }

    #[must_use]
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    #[must_use]
    pub fn processing_status(&self) -> Option<&str> {
        self.processing_status.as_deref()
    }

    /// Attach a newly uploaded file. Derived artifacts of the previous file
    /// are dropped.
    pub fn attach_file(&mut self, file: FileDescriptor, file_id: String) {
        self.file = Some(file);
        self.file_id = Some(file_id);
        self.derived.clear();
    }

    /// Detach the current file together with its derived artifacts.
    pub fn detach_file(&mut self) {
        self.file = None;
        self.file_id = None;
        self.derived.clear();
    }

    pub fn insert_derived(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.derived.insert(name.into(), value.into());
    }

    pub fn remove_derived(&mut self, name: &str) -> Option<String> {
        self.derived.remove(name)
    }

    /// Replace every derived artifact whose key is not in `keep`.
    pub fn replace_derived(&mut self, artifacts: BTreeMap<String, String>, keep: &[&str]) {
        self.derived.retain(|key, _| keep.contains(&key.as_str()));
        self.derived.extend(artifacts);
    }

    /// Append a message and return its id.
    pub fn push_message(&mut self, message: ChatMessage) -> String {
        let id = message.id.clone();
        self.transcript.push(message);
        id
    }

    #[must_use]
    pub fn message(&self, id: &str) -> Option<&ChatMessage> {
        self.transcript.iter().find(|m| m.id == id)
    }

    pub fn message_mut(&mut self, id: &str) -> Option<&mut ChatMessage> {
        self.transcript.iter_mut().find(|m| m.id == id)
    }

    /// Drop a message from the transcript.
    pub fn remove_message(&mut self, id: &str) -> Option<ChatMessage> {
        let index = self.transcript.iter().position(|m| m.id == id)?;
        Some(self.transcript.remove(index))
    }

    /// Replace the transcript with a single greeting.
    pub fn reset_transcript(&mut self, kind: ArtifactKind) {
        self.transcript = vec![ChatMessage::ai(kind.greeting())];
    }

    pub fn set_processing_status(&mut self, status: Option<String>) {
        self.processing_status = status;
    }

    /// Check the invariants of a record read back from storage.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRecord` if exactly one of `file` and
    /// `file_id` is present.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.file.is_some() != self.file_id.is_some() {
            return Err(CoreError::InvalidRecord(
                "file descriptor and file id must be set together".into(),
            ));
        }
        Ok(())
    }

    /// Close any message left incomplete by an interrupted run.
    pub fn seal_incomplete_messages(&mut self) {
        for message in self.transcript.iter_mut().filter(|m| !m.is_complete) {
            message.is_complete = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn csv() -> FileDescriptor {
        FileDescriptor::new("sales.csv", "text/csv", 10)
    }

    #[test]
    fn attach_sets_both_and_clears_derived() {
        let mut record = SessionRecord::default();
        record.insert_derived("old_chart", "data:image/png;base64,AA");
        record.attach_file(csv(), "abc".into());
        assert_eq!(record.file_id(), Some("abc"));
        assert_eq!(record.file().map(|f| f.name.as_str()), Some("sales.csv"));
        assert!(record.derived().is_empty());
        record.validate().unwrap();
    }

    #[test]
    fn detach_clears_both() {
        let mut record = SessionRecord::default();
        record.attach_file(csv(), "abc".into());
        record.detach_file();
        assert!(record.file().is_none());
        assert!(record.file_id().is_none());
        record.validate().unwrap();
    }

    #[test]
    fn validate_rejects_orphaned_file_id() {
        let json = serde_json::json!({ "file": null, "file_id": "abc" });
        let record: SessionRecord = serde_json::from_value(json).unwrap();
        assert!(matches!(record.validate(), Err(CoreError::InvalidRecord(_))));
    }

    #[test]
    fn replace_derived_keeps_listed_keys() {
        let mut record = SessionRecord::default();
        record.insert_derived("analysis", "bar chart");
        record.insert_derived("old_chart", "x");
        let mut charts = BTreeMap::new();
        charts.insert("revenue_chart".to_string(), "y".to_string());
        record.replace_derived(charts, &["analysis"]);
        assert_eq!(
            record.derived().keys().cloned().collect::<Vec<_>>(),
            vec!["analysis".to_string(), "revenue_chart".to_string()]
        );
    }

    #[test]
    fn greeting_is_single_complete_ai_message() {
        let record = SessionRecord::with_greeting(ArtifactKind::Pdf);
        assert_eq!(record.transcript().len(), 1);
        assert!(record.transcript()[0].is_complete);
        assert_eq!(
            record.transcript()[0].text,
            "Hello! Ask me anything about your PDF."
        );
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let record: SessionRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, SessionRecord::default());
    }

    #[test]
    fn seal_incomplete_messages_completes_placeholders() {
        let mut record = SessionRecord::default();
        let id = record.push_message(ChatMessage::placeholder());
        record.seal_incomplete_messages();
        assert!(record.message(&id).unwrap().is_complete);
    }

    #[test]
    fn remove_message_drops_only_that_message() {
        let mut record = SessionRecord::opening_with("Hi");
        let id = record.push_message(ChatMessage::placeholder());
        assert!(record.remove_message(&id).is_some());
        assert!(record.remove_message(&id).is_none());
        assert_eq!(record.transcript().len(), 1);
        assert_eq!(record.transcript()[0].text, "Hi");
    }
}
