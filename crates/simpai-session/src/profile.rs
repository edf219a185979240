//! Cached account profile.
//!
//! The profile is fetched on every request but only replaces the cached copy
//! when the cache is missing, older than the TTL, or the plan or its expiry
//! changed. When the fetch fails, the cached copy is used however old.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use simpai_client::ClientError;
use simpai_client::responses::Profile;
use simpai_core::StoreName;
use simpai_store::{KvStore, get_typed, set_typed};

const PROFILE_RECORD_ID: &str = "current";

/// Plan shown for accounts without a subscription.
pub const DEFAULT_PLAN: &str = "Trial";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub first_name: String,
    pub email: String,
    pub plan: String,
    pub expiry_date: Option<String>,
}

impl From<Profile> for ProfileSummary {
    fn from(profile: Profile) -> Self {
        Self {
            first_name: profile.first_name,
            email: profile.email,
            plan: profile
                .plan
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PLAN.to_string()),
            expiry_date: profile.current_period_end.filter(|d| !d.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedProfile {
    pub profile: ProfileSummary,
    pub last_updated: DateTime<Utc>,
}

/// Where a resolved profile came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOrigin {
    /// Just fetched and written to the cache.
    Fresh,
    /// Cache still valid and consistent with the fetch.
    Cached,
    /// The fetch failed; the cached copy was used.
    Fallback,
}

pub struct ProfileCache<S> {
    store: Arc<S>,
    ttl: Duration,
}

impl<S: KvStore> ProfileCache<S> {
    #[must_use]
    pub fn new(store: Arc<S>, ttl_days: u32) -> Self {
        Self {
            store,
            ttl: Duration::days(i64::from(ttl_days)),
        }
    }

    pub async fn cached(&self) -> Option<CachedProfile> {
        match get_typed(self.store.as_ref(), StoreName::Profile, PROFILE_RECORD_ID).await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable profile cache");
                None
            }
        }
    }

    #[must_use]
    pub fn is_fresh(&self, cached: &CachedProfile, now: DateTime<Utc>) -> bool {
        now - cached.last_updated <= self.ttl
    }

    /// Combine a fetch result with the cache.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when there is nothing cached to fall back on.
    pub async fn resolve(
        &self,
        fetched: Result<Profile, ClientError>,
        now: DateTime<Utc>,
    ) -> Result<(ProfileSummary, ProfileOrigin), ClientError> {
        let cached = self.cached().await;
        let fresh = match fetched {
            Ok(profile) => ProfileSummary::from(profile),
            Err(e) => {
                return match cached {
                    Some(c) => {
                        tracing::warn!(error = %e, "profile fetch failed, using cached copy");
                        Ok((c.profile, ProfileOrigin::Fallback))
                    }
                    None => Err(e),
                };
            }
        };

        match cached {
            Some(c)
                if self.is_fresh(&c, now)
                    && c.profile.plan == fresh.plan
                    && c.profile.expiry_date == fresh.expiry_date =>
            {
                Ok((c.profile, ProfileOrigin::Cached))
            }
            _ => {
                let entry = CachedProfile {
                    profile: fresh.clone(),
                    last_updated: now,
                };
                if let Err(e) = set_typed(self.store.as_ref(), StoreName::Profile, PROFILE_RECORD_ID, &entry).await {
                    tracing::warn!(error = %e, "failed to cache profile");
                }
                Ok((fresh, ProfileOrigin::Fresh))
            }
        }
    }

    /// Forget the cached profile, e.g. on logout or after a plan change.
    pub async fn clear(&self) {
        if let Err(e) = self.store.delete(StoreName::Profile, PROFILE_RECORD_ID).await {
            tracing::warn!(error = %e, "failed to clear profile cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simpai_store::MemoryStore;

    fn profile(plan: Option<&str>, end: Option<&str>) -> Profile {
        Profile {
            first_name: "Ada".into(),
            last_name: String::new(),
            email: "ada@example.com".into(),
            plan: plan.map(str::to_string),
            current_period_end: end.map(str::to_string),
        }
    }

    fn offline() -> ClientError {
        ClientError::Api {
            status: 503,
            message: "unavailable".into(),
        }
    }

    fn cache() -> ProfileCache<MemoryStore> {
        ProfileCache::new(Arc::new(MemoryStore::new()), 14)
    }

    #[tokio::test]
    async fn first_fetch_is_cached() {
        let cache = cache();
        let now = Utc::now();
        let (summary, origin) = cache.resolve(Ok(profile(None, None)), now).await.unwrap();
        assert_eq!(origin, ProfileOrigin::Fresh);
        assert_eq!(summary.plan, DEFAULT_PLAN);
        assert_eq!(cache.cached().await.unwrap().last_updated, now);
    }

    #[tokio::test]
    async fn valid_unchanged_cache_wins() {
        let cache = cache();
        let t0 = Utc::now();
        cache.resolve(Ok(profile(Some("Pro"), None)), t0).await.unwrap();

        let mut renamed = profile(Some("Pro"), None);
        renamed.first_name = "Augusta".into();
        let (summary, origin) = cache
            .resolve(Ok(renamed), t0 + Duration::days(3))
            .await
            .unwrap();
        assert_eq!(origin, ProfileOrigin::Cached);
        assert_eq!(summary.first_name, "Ada");
    }

    #[tokio::test]
    async fn plan_change_refreshes() {
        let cache = cache();
        let t0 = Utc::now();
        cache.resolve(Ok(profile(Some("Pro"), None)), t0).await.unwrap();
        let (summary, origin) = cache
            .resolve(Ok(profile(Some("Business"), Some("2026-12-01"))), t0 + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(origin, ProfileOrigin::Fresh);
        assert_eq!(summary.plan, "Business");
    }

    #[tokio::test]
    async fn expired_cache_refreshes() {
        let cache = cache();
        let t0 = Utc::now();
        cache.resolve(Ok(profile(None, None)), t0).await.unwrap();
        let later = t0 + Duration::days(15);
        let (_, origin) = cache.resolve(Ok(profile(None, None)), later).await.unwrap();
        assert_eq!(origin, ProfileOrigin::Fresh);
        assert_eq!(cache.cached().await.unwrap().last_updated, later);
    }

    #[tokio::test]
    async fn failed_fetch_falls_back_to_stale_cache() {
        let cache = cache();
        let t0 = Utc::now();
        cache.resolve(Ok(profile(Some("Pro"), None)), t0).await.unwrap();
        let (summary, origin) = cache
            .resolve(Err(offline()), t0 + Duration::days(90))
            .await
            .unwrap();
        assert_eq!(origin, ProfileOrigin::Fallback);
        assert_eq!(summary.plan, "Pro");
    }

    #[tokio::test]
    async fn failed_fetch_without_cache_errors() {
        let cache = cache();
        assert!(cache.resolve(Err(offline()), Utc::now()).await.is_err());
        cache.clear().await;
    }
}
