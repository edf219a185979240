use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::{AuthConfirmResetArgs, AuthEmailArgs};
use crate::output::output;
use crate::progress::Progress;

pub async fn request(
    args: &AuthEmailArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let resp = Progress::during(
        "Requesting reset link",
        ctx.client.request_password_reset(&args.email),
    )
    .await?;
    output(&resp, flags.format)
}

pub async fn confirm(
    args: &AuthConfirmResetArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let resp = Progress::during(
        "Setting new password",
        ctx.client
            .confirm_password_reset(&args.token, &args.password, &args.confirm),
    )
    .await?;
    output(&resp, flags.format)
}

pub async fn resend(
    args: &AuthEmailArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let resp = Progress::during(
        "Resending confirmation",
        ctx.client.resend_confirmation(&args.email),
    )
    .await?;
    output(&resp, flags.format)
}
