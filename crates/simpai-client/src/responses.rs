//! Typed response bodies.
//!
//! Every JSON response is decoded into one of these structs at the client
//! boundary. Required fields are non-optional, so a body missing one fails
//! with [`ClientError::MalformedResponse`](crate::ClientError::MalformedResponse).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Artifacts ─────────────────────────────────────────────────────

/// `csv/upload/` and `summarisation/upload/`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UploadResponse {
    pub file_id: String,
    /// First rows of a spreadsheet, when the backend sends them.
    #[serde(default)]
    pub preview: Option<Value>,
}

/// `csv/analyze/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnalyzeResponse {
    pub chart_suggestion: String,
}

/// `csv/chart/`. Accepts `{"charts": {..}}` or a bare `{name: base64}` map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChartsResponse {
    Wrapped { charts: BTreeMap<String, Value> },
    Bare(BTreeMap<String, Value>),
}

impl ChartsResponse {
    /// Chart name → base64 payload. Entries whose value is not a string are
    /// dropped.
    #[must_use]
    pub fn into_charts(self) -> BTreeMap<String, String> {
        let (Self::Wrapped { charts } | Self::Bare(charts)) = self;
        charts
            .into_iter()
            .filter_map(|(name, value)| match value {
                Value::String(b64) => Some((name, b64)),
                other => {
                    tracing::debug!(chart = %name, kind = %json_kind(&other), "skipping non-string chart");
                    None
                }
            })
            .collect()
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `gpt/ask/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

// ── Accounts ──────────────────────────────────────────────────────

/// `api/auth/login/` and `api/auth/register/`. The backend names the token
/// `key`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "key")]
    pub token: String,
}

/// `api/auth/register/`. Accounts needing email confirmation get no token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisterResponse {
    #[serde(default, alias = "key")]
    pub token: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// `api/auth/profile/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub current_period_end: Option<String>,
}

/// Bodies that only carry a status message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageResponse {
    #[serde(alias = "detail")]
    pub message: String,
}

// ── Billing ───────────────────────────────────────────────────────

/// `api/check-subscription-status/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubscriptionStatus {
    pub has_active_subscription: bool,
    #[serde(default)]
    pub subscription_data: Option<SubscriptionData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubscriptionData {
    #[serde(default, rename = "Plan_name", alias = "plan_name")]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub current_period_start: Option<String>,
    #[serde(default)]
    pub current_period_end: Option<String>,
}

/// One entry of `api/pricing/<interval>/`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Price {
    pub id: i64,
    pub name: String,
    pub price: Amount,
    pub interval: String,
}

/// A decimal amount; the backend sends either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n:.2}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// `checkout/start/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::wrapped(json!({"charts": {"revenue_chart": "AAA", "broken": 3}}))]
    #[case::bare(json!({"revenue_chart": "AAA", "broken": null}))]
    fn charts_accept_both_shapes(#[case] body: Value) {
        let parsed: ChartsResponse = serde_json::from_value(body).unwrap();
        let charts = parsed.into_charts();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts["revenue_chart"], "AAA");
    }

    #[test]
    fn login_accepts_key_or_token() {
        let a: LoginResponse = serde_json::from_value(json!({"key": "abc"})).unwrap();
        let b: LoginResponse = serde_json::from_value(json!({"token": "abc"})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn analyze_requires_chart_suggestion() {
        let err = serde_json::from_value::<AnalyzeResponse>(json!({"suggestion": "x"})).unwrap_err();
        assert!(err.to_string().contains("chart_suggestion"));
    }

    #[test]
    fn subscription_without_data() {
        let status: SubscriptionStatus = serde_json::from_value(json!({
            "has_active_subscription": false,
            "subscription_data": null
        }))
        .unwrap();
        assert!(!status.has_active_subscription);
        assert!(status.subscription_data.is_none());
    }

    #[test]
    fn subscription_data_uses_backend_casing() {
        let status: SubscriptionStatus = serde_json::from_value(json!({
            "has_active_subscription": true,
            "subscription_data": {
                "Plan_name": "Pro",
                "status": "active",
                "current_period_start": "2026-09-01T00:00:00Z",
                "current_period_end": "2026-10-01T00:00:00Z"
            }
        }))
        .unwrap();
        let data = status.subscription_data.unwrap();
        assert_eq!(data.plan_name.as_deref(), Some("Pro"));
        assert_eq!(data.current_period_end.as_deref(), Some("2026-10-01T00:00:00Z"));
    }

    #[rstest]
    #[case(json!("49.00"), "49.00")]
    #[case(json!(499), "499.00")]
    fn price_amount_displays(#[case] amount: Value, #[case] expected: &str) {
        let price: Price = serde_json::from_value(json!({
            "id": 1, "name": "Pro", "price": amount, "interval": "month"
        }))
        .unwrap();
        assert_eq!(price.price.to_string(), expected);
    }
}
