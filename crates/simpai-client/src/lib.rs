//! # simpai-client
//!
//! HTTP client for the SimpAI backend.
//!
//! - [`SimpaiClient`]: typed calls for artifacts, accounts and billing
//! - [`Backend`]: the subset session controllers depend on
//! - [`stream`]: the incremental `data:` line reader behind streamed answers
//! - [`responses`]: response bodies, decoded strictly at the boundary

mod backend;
mod client;
pub mod endpoints;
mod error;
mod http;
pub mod responses;
pub mod stream;

pub use backend::{AskBody, Backend, TokenRequest};
pub use client::SimpaiClient;
pub use error::ClientError;
pub use stream::{StreamError, StreamOutcome, StreamStatus, read_token_stream};
