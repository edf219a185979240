//! Sender, artifact, and store enums.
//!
//! All enums use `snake_case` serialization and expose `as_str()` for the
//! string form used in storage keys and log fields.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Sender
// ---------------------------------------------------------------------------

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ArtifactKind
// ---------------------------------------------------------------------------

/// The kind of uploaded artifact a session works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Spreadsheet,
    Pdf,
}

impl ArtifactKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Pdf => "pdf",
        }
    }

    /// Store that holds the persisted session record for this artifact.
    #[must_use]
    pub const fn store(self) -> StoreName {
        match self {
            Self::Spreadsheet => StoreName::Spreadsheet,
            Self::Pdf => StoreName::Pdf,
        }
    }

    /// Fixed record id of the resumable session within its store.
    #[must_use]
    pub const fn record_id(self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet-state",
            Self::Pdf => "pdf-state",
        }
    }

    /// Human label used in notifications ("Please upload a spreadsheet first").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Pdf => "PDF",
        }
    }

    /// Opening assistant message for a fresh transcript.
    #[must_use]
    pub const fn greeting(self) -> &'static str {
        match self {
            Self::Spreadsheet => "Hello! Ask me anything about your spreadsheet.",
            Self::Pdf => "Hello! Ask me anything about your PDF.",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StoreName
// ---------------------------------------------------------------------------

/// Named stores of the persistent key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreName {
    Spreadsheet,
    Pdf,
    Profile,
    Meta,
}

impl StoreName {
    pub const ALL: [Self; 4] = [Self::Spreadsheet, Self::Pdf, Self::Profile, Self::Meta];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Pdf => "pdf",
            Self::Profile => "profile",
            Self::Meta => "meta",
        }
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
