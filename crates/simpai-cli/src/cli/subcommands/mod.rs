pub mod auth;
pub mod pdf;
pub mod sheet;
pub mod subscription;

pub use auth::AuthCommands;
pub use pdf::PdfCommands;
pub use sheet::SheetCommands;
pub use subscription::SubscriptionCommands;
