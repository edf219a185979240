use serde::Serialize;
use simpai_session::ProfileCache;

use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthLoginArgs;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct AuthLoginResponse {
    authenticated: bool,
    email: String,
    token_source: Option<String>,
}

pub async fn handle(
    args: &AuthLoginArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let resp = Progress::during("Logging in", ctx.client.login(&args.email, &args.password)).await?;
    simpai_auth::token_store::store(&resp.token)?;

    // A cached profile may belong to the previous account.
    ProfileCache::new(ctx.store.clone(), ctx.config.general.profile_cache_days)
        .clear()
        .await;

    output(
        &AuthLoginResponse {
            authenticated: true,
            email: args.email.clone(),
            token_source: simpai_auth::token_store::detect_token_source(),
        },
        flags.format,
    )
}
