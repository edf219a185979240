mod common;

use std::sync::Arc;

use common::{FakeBackend, pdf};
use pretty_assertions::assert_eq;
use simpai_core::{ArtifactKind, FileDescriptor};
use simpai_session::documents::path_from_url;
use simpai_session::{
    DocumentStore, GENERATED_PDF_KEY, PdfSession, RecordingNotifier, SessionError,
};
use simpai_store::{KvStore, MemoryStore};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

type Session = PdfSession<FakeBackend, MemoryStore, Arc<RecordingNotifier>>;

struct Harness {
    backend: Arc<FakeBackend>,
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self {
            backend: Arc::new(FakeBackend::default()),
            store: Arc::new(MemoryStore::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            dir: tempfile::tempdir().unwrap(),
        }
    }

    async fn open(&self) -> Session {
        PdfSession::open(
            Arc::clone(&self.backend),
            Arc::clone(&self.store),
            Arc::clone(&self.notifier),
            DocumentStore::new(self.dir.path().join("documents")),
        )
        .await
    }
}

#[tokio::test]
async fn greeting_mentions_pdf() {
    let h = Harness::new();
    let session = h.open().await;
    assert_eq!(
        session.record().transcript()[0].text,
        "Hello! Ask me anything about your PDF."
    );
}

#[tokio::test]
async fn spreadsheet_is_not_a_pdf() {
    let h = Harness::new();
    let mut session = h.open().await;
    let err = session
        .upload(FileDescriptor::new("sales.csv", "text/csv", 3), vec![1])
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Validation(_)));
    assert_eq!(h.backend.calls("upload"), 0);
    assert_eq!(h.notifier.errors(), vec!["Please upload a PDF file"]);
}

#[tokio::test]
async fn summarize_writes_document_and_records_url() {
    let h = Harness::new();
    let mut session = h.open().await;
    session.upload(pdf(), vec![1]).await.unwrap();

    let url = session.summarize("beginners").await.unwrap();

    assert!(url.starts_with("file://"));
    assert_eq!(session.generated_document(), Some(url.as_str()));
    let path = path_from_url(&url).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 summary");
    assert_eq!(
        h.notifier.successes(),
        vec!["PDF uploaded successfully!", "Generated PDF successfully!"]
    );
}

#[tokio::test]
async fn new_document_releases_previous_one() {
    let h = Harness::new();
    let mut session = h.open().await;
    session.upload(pdf(), vec![1]).await.unwrap();

    let first = session.summarize("summary").await.unwrap();
    let second = session.ask_custom("List the key risks").await.unwrap();

    assert!(!path_from_url(&first).unwrap().exists());
    assert!(path_from_url(&second).unwrap().exists());
    assert_eq!(session.generated_document(), Some(second.as_str()));
}

#[tokio::test]
async fn replacing_the_pdf_releases_generated_document() {
    let h = Harness::new();
    let mut session = h.open().await;
    session.upload(pdf(), vec![1]).await.unwrap();
    let url = session.summarize("technical").await.unwrap();

    session.upload(pdf(), vec![2]).await.unwrap();

    assert!(!path_from_url(&url).unwrap().exists());
    assert!(session.generated_document().is_none());
}

#[tokio::test]
async fn summarize_without_file_makes_no_call() {
    let h = Harness::new();
    let mut session = h.open().await;
    assert!(matches!(
        session.summarize("summary").await,
        Err(SessionError::Validation(_))
    ));
    assert!(matches!(
        session.ask_custom("anything").await,
        Err(SessionError::Validation(_))
    ));
    assert_eq!(h.backend.total_calls(), 0);
    assert_eq!(h.notifier.errors(), vec!["No PDF uploaded yet"; 2]);
}

#[tokio::test]
async fn chat_without_file_asks_for_upload() {
    let h = Harness::new();
    let mut session = h.open().await;
    let err = session
        .chat("What is the total?", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Validation(_)));
    assert_eq!(h.backend.total_calls(), 0);
    assert_eq!(h.notifier.errors(), vec!["Please upload a PDF first."]);
    assert_eq!(session.record().transcript().len(), 1);
}

#[tokio::test]
async fn chat_streams_into_transcript() {
    let h = Harness::new();
    let mut session = h.open().await;
    session.upload(pdf(), vec![1]).await.unwrap();

    session
        .chat("Summarize page 2", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(session.record().transcript().last().unwrap().text, "The answer");
    let requests = h.backend.stream_requests();
    assert_eq!(requests[0].endpoint, "gpt-chat/");
    assert_eq!(requests[0].body.file_id.as_deref(), Some("abc"));
}

#[tokio::test]
async fn failed_summary_keeps_previous_document() {
    let h = Harness::new();
    let mut session = h.open().await;
    session.upload(pdf(), vec![1]).await.unwrap();
    let url = session.summarize("summary").await.unwrap();

    h.backend.fail_on("summarize");
    assert!(session.summarize("technical").await.is_err());

    assert_eq!(session.generated_document(), Some(url.as_str()));
    assert!(path_from_url(&url).unwrap().exists());
    assert_eq!(h.notifier.errors(), vec!["Failed to generate PDF"]);
}

#[tokio::test]
async fn export_copies_generated_document() {
    let h = Harness::new();
    let mut session = h.open().await;
    session.upload(pdf(), vec![1]).await.unwrap();

    let out = tempfile::tempdir().unwrap();
    assert!(matches!(
        session.export_document(out.path()).await,
        Err(SessionError::Validation(_))
    ));

    session.summarize("summary").await.unwrap();
    let target = session.export_document(&out.path().join("mine.pdf")).await.unwrap();
    assert_eq!(std::fs::read(target).unwrap(), b"%PDF-1.4 summary");
}

#[tokio::test]
async fn reset_releases_document_and_deletes_record() {
    let h = Harness::new();
    let mut session = h.open().await;
    session.upload(pdf(), vec![1]).await.unwrap();
    let url = session.summarize("summary").await.unwrap();
    let kind = ArtifactKind::Pdf;
    assert!(h.store.get(kind.store(), kind.record_id()).await.unwrap().is_some());

    session.reset().await;

    assert!(!path_from_url(&url).unwrap().exists());
    assert!(session.record().file_id().is_none());
    assert!(session.record().file().is_none());
    assert!(h.store.get(kind.store(), kind.record_id()).await.unwrap().is_none());
    assert!(!session.record().derived().contains_key(GENERATED_PDF_KEY));
}
