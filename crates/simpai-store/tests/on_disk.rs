//! The on-disk store must survive a reopen, which is what makes sessions
//! resumable across CLI runs.

use pretty_assertions::assert_eq;
use simpai_core::{ArtifactKind, FileDescriptor, SessionRecord};
use simpai_store::{KvStore, LibsqlStore, get_typed, set_typed};

#[tokio::test]
async fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.db");

    let kind = ArtifactKind::Spreadsheet;
    let mut record = SessionRecord::with_greeting(kind);
    record.attach_file(
        FileDescriptor::new("sales.csv", "text/csv", 120),
        "f-123".to_string(),
    );
    record.insert_derived("analysis", "bar chart by region");

    {
        let store = LibsqlStore::new(&path);
        set_typed(&store, kind.store(), kind.record_id(), &record)
            .await
            .unwrap();
    }
    assert!(path.exists(), "database file should be created lazily");

    let store = LibsqlStore::new(&path);
    let loaded: SessionRecord = get_typed(&store, kind.store(), kind.record_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded, record);

    store.delete(kind.store(), kind.record_id()).await.unwrap();
    let reopened = LibsqlStore::new(&path);
    assert!(
        reopened
            .get(kind.store(), kind.record_id())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn construction_does_not_touch_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.db");
    let store = LibsqlStore::new(&path);
    assert_eq!(store.path(), path.as_path());
    assert!(!path.exists());
}
