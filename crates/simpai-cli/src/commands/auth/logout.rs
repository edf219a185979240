use serde::Serialize;
use simpai_session::ProfileCache;

use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct AuthLogoutResponse {
    cleared: bool,
    server_logout: bool,
}

/// Invalidate the token, then clear the credentials and every stored session.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let server_logout = if ctx.client.has_token() {
        match ctx.client.logout().await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%error, "server-side logout failed; clearing local state anyway");
                false
            }
        }
    } else {
        false
    };

    simpai_auth::logout()?;
    ctx.spreadsheet().await.reset().await;
    ctx.pdf().await.reset().await;
    ProfileCache::new(ctx.store.clone(), ctx.config.general.profile_cache_days)
        .clear()
        .await;

    output(
        &AuthLogoutResponse {
            cleared: true,
            server_logout,
        },
        flags.format,
    )
}
