//! Throttled backend wake-up ping.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use simpai_core::StoreName;
use simpai_store::{KvStore, get_typed, set_typed};

const LAST_PING_ID: &str = "last-backend-ping";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct LastPing {
    at: DateTime<Utc>,
}

/// Remembers when the backend was last pinged so it is woken at most once per
/// interval.
pub struct PingThrottle<S> {
    store: Arc<S>,
    interval: Duration,
}

impl<S: KvStore> PingThrottle<S> {
    #[must_use]
    pub fn new(store: Arc<S>, interval_secs: u64) -> Self {
        Self {
            store,
            interval: Duration::seconds(i64::try_from(interval_secs).unwrap_or(i64::MAX)),
        }
    }

    pub async fn last_ping(&self) -> Option<DateTime<Utc>> {
        match get_typed::<LastPing, _>(self.store.as_ref(), StoreName::Meta, LAST_PING_ID).await {
            Ok(last) => last.map(|l| l.at),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable ping timestamp");
                None
            }
        }
    }

    /// Whether a ping should be sent at `now`.
    pub async fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.last_ping()
            .await
            .is_none_or(|last| now - last > self.interval)
    }

    /// Record a successful ping.
    pub async fn record(&self, now: DateTime<Utc>) {
        if let Err(e) = set_typed(self.store.as_ref(), StoreName::Meta, LAST_PING_ID, &LastPing { at: now }).await {
            tracing::warn!(error = %e, "failed to record ping time");
        }
    }
}
