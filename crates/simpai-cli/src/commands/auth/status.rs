use serde::Serialize;

use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct AuthStatusResponse {
    authenticated: bool,
    token_source: Option<String>,
    backend: String,
}

pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(
        &AuthStatusResponse {
            authenticated: ctx.client.has_token(),
            token_source: simpai_auth::token_store::detect_token_source(),
            backend: ctx.client.base_url().to_string(),
        },
        flags.format,
    )
}
