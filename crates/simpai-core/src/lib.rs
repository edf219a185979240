//! # simpai-core
//!
//! Core types and error types for the SimpAI client.
//!
//! This crate provides the foundational types shared across all SimpAI crates:
//! - Session records and chat messages persisted between runs
//! - Artifact kinds and the upload whitelist for each of them
//! - The per-action state machine that guards against re-entrant calls
//! - Cross-cutting error types

pub mod action;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod file_type;

pub use action::{ActionKind, ActionState, ActionTracker};
pub use entities::{ChatMessage, FileDescriptor, SessionRecord};
pub use enums::{ArtifactKind, Sender, StoreName};
pub use errors::CoreError;
