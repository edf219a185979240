use serde::Serialize;

use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthRegisterArgs;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct AuthRegisterResponse {
    registered: bool,
    authenticated: bool,
    detail: Option<String>,
}

pub async fn handle(
    args: &AuthRegisterArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let resp = Progress::during(
        "Creating account",
        ctx.client
            .register(args.first_name.as_deref(), &args.email, &args.password),
    )
    .await?;

    // Accounts that need email verification come back without a token.
    let authenticated = match resp.token.as_deref() {
        Some(token) => {
            simpai_auth::token_store::store(token)?;
            true
        }
        None => false,
    };

    output(
        &AuthRegisterResponse {
            registered: true,
            authenticated,
            detail: resp.detail,
        },
        flags.format,
    )
}
