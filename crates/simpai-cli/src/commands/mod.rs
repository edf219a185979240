pub mod auth;
pub mod chat;
pub mod dispatch;
pub mod pdf;
pub mod ping;
pub mod sheet;
mod shared;
pub mod subscription;
