//! Generated PDF documents on disk.
//!
//! Summaries come back from the backend as PDF bytes. They are written under
//! the documents directory and referenced from the session record by
//! `file://` URL. Releasing a document deletes its file.

use std::io;
use std::path::{Component, Path, PathBuf};

/// File name used when exporting into a directory.
pub const DEFAULT_EXPORT_NAME: &str = "generated-pdf.pdf";

const FILE_URL_SCHEME: &str = "file://";

#[derive(Debug, Clone)]
pub struct DocumentStore {
    dir: PathBuf,
}

impl DocumentStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a new document and return its `file://` URL.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory or file cannot be written.
    pub async fn write(&self, bytes: &[u8]) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self
            .dir
            .join(format!("generated-{}.pdf", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "generated document written");
        Ok(file_url(&path))
    }

    /// Delete a document previously returned by [`write`](Self::write).
    ///
    /// URLs outside the documents directory are never touched. Failures are
    /// logged, not returned.
    pub async fn release(&self, url: &str) {
        let Some(path) = self.owned_path(url) else {
            tracing::warn!(url, "refusing to release a document outside the documents directory");
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::debug!(path = %path.display(), "generated document released"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to release document"),
        }
    }

    /// Copy a document to `dest`. A directory destination receives
    /// [`DEFAULT_EXPORT_NAME`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the document is gone, or any copy error.
    pub async fn export(&self, url: &str, dest: &Path) -> io::Result<PathBuf> {
        let source = path_from_url(url).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("not a file URL: {url}"))
        })?;
        let target = if tokio::fs::metadata(dest).await.is_ok_and(|m| m.is_dir()) {
            dest.join(DEFAULT_EXPORT_NAME)
        } else {
            dest.to_path_buf()
        };
        tokio::fs::copy(&source, &target).await?;
        Ok(target)
    }

    fn owned_path(&self, url: &str) -> Option<PathBuf> {
        let path = path_from_url(url)?;
        let climbs = path.components().any(|c| c == Component::ParentDir);
        (!climbs && path.starts_with(&self.dir)).then_some(path)
    }
}

#[must_use]
pub fn file_url(path: &Path) -> String {
    format!("{FILE_URL_SCHEME}{}", path.display())
}

#[must_use]
pub fn path_from_url(url: &str) -> Option<PathBuf> {
    url.strip_prefix(FILE_URL_SCHEME).map(PathBuf::from)
}
