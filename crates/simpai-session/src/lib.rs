//! # simpai-session
//!
//! Session controllers for the SimpAI client.
//!
//! Each controller owns a [`SessionRecord`](simpai_core::SessionRecord),
//! turns user actions into backend calls through
//! [`Backend`](simpai_client::Backend), streams answers into the transcript,
//! and mirrors the record into a [`KvStore`](simpai_store::KvStore) after
//! every change so the session resumes on the next run.
//!
//! - [`SpreadsheetSession`]: upload, analysis, charts, questions
//! - [`PdfSession`]: upload, generated summaries, chat about the document
//! - [`ChatSession`]: general chat without a file
//!
//! Account helpers ([`ProfileCache`], [`PingThrottle`]) share the same store.

mod chat;
mod controller;
pub mod documents;
mod error;
mod notify;
mod pdf;
pub mod profile;
mod reply;
mod spreadsheet;
mod warmup;

pub use chat::{CHAT_GREETING, ChatSession};
pub use documents::DocumentStore;
pub use error::SessionError;
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier};
pub use pdf::{GENERATED_PDF_KEY, PdfSession, SUMMARY_STYLES};
pub use profile::{ProfileCache, ProfileOrigin, ProfileSummary};
pub use reply::FALLBACK_REPLY;
pub use spreadsheet::{ANALYSIS_KEY, PNG_DATA_URI_PREFIX, SpreadsheetSession, to_data_uri};
pub use warmup::PingThrottle;
