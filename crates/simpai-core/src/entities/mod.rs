//! Persisted entities: session records, chat messages, and file descriptors.

mod file;
mod message;
mod record;

pub use file::FileDescriptor;
pub use message::ChatMessage;
pub use record::SessionRecord;
