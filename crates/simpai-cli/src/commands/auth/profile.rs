use chrono::Utc;
use serde::Serialize;
use simpai_session::{ProfileCache, ProfileOrigin, ProfileSummary};

use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct ProfileResponse {
    #[serde(flatten)]
    profile: ProfileSummary,
    source: &'static str,
}

const fn source_label(origin: ProfileOrigin) -> &'static str {
    match origin {
        ProfileOrigin::Fresh => "fresh",
        ProfileOrigin::Cached => "cached",
        ProfileOrigin::Fallback => "fallback",
    }
}

/// Fetch the profile, falling back to the cached copy when the backend is
/// unreachable.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let cache = ProfileCache::new(ctx.store.clone(), ctx.config.general.profile_cache_days);
    let fetched = Progress::during("Loading profile", ctx.client.profile()).await;
    let (profile, origin) = cache.resolve(fetched, Utc::now()).await?;

    output(
        &ProfileResponse {
            profile,
            source: source_label(origin),
        },
        flags.format,
    )
}
