//! Backend paths, relative to the configured base URL.

pub const SPREADSHEET_UPLOAD: &str = "csv/upload/";
pub const SPREADSHEET_ANALYZE: &str = "csv/analyze/";
pub const SPREADSHEET_CHARTS: &str = "csv/chart/";
pub const SPREADSHEET_ASK: &str = "csv/ask/";

pub const PDF_UPLOAD: &str = "summarisation/upload/";
pub const PDF_SUMMARIZE: &str = "summarisation/summarize/";
pub const PDF_ASK: &str = "summarisation/ask/";

pub const CHAT_STREAM: &str = "gpt-chat/";
pub const CHAT_ONCE: &str = "gpt/ask/";

pub const AUTH_REGISTER: &str = "api/auth/register/";
pub const AUTH_LOGIN: &str = "api/auth/login/";
pub const AUTH_LOGOUT: &str = "api/auth/logout/";
pub const AUTH_PROFILE: &str = "api/auth/profile/";
pub const AUTH_RESEND_CONFIRMATION: &str = "api/auth/resend-confirmation-email/";
pub const PASSWORD_RESET_REQUEST: &str = "api/password-reset/request/";
pub const PASSWORD_RESET_PREFIX: &str = "api/password-reset/reset/";

pub const SUBSCRIPTION_STATUS: &str = "api/check-subscription-status/";
pub const PRICING_PREFIX: &str = "api/pricing/";
pub const CHECKOUT_START: &str = "checkout/start/";

pub const PING: &str = "ping/";

/// `api/password-reset/reset/<token>/`
#[must_use]
pub fn password_reset_confirm(token: &str) -> String {
    format!("{PASSWORD_RESET_PREFIX}{}/", urlencoding::encode(token))
}

/// `api/pricing/<interval>/`
#[must_use]
pub fn pricing(interval: &str) -> String {
    format!("{PRICING_PREFIX}{}/", urlencoding::encode(interval))
}
