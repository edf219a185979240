mod login;
mod logout;
mod password;
mod profile;
mod register;
mod status;

use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;

/// Handle `simpai auth <subcommand>`.
pub async fn handle(
    action: &AuthCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::Register(args) => register::handle(args, ctx, flags).await,
        AuthCommands::Login(args) => login::handle(args, ctx, flags).await,
        AuthCommands::Logout => logout::handle(ctx, flags).await,
        AuthCommands::Status => status::handle(ctx, flags),
        AuthCommands::Profile => profile::handle(ctx, flags).await,
        AuthCommands::ResetPassword(args) => password::request(args, ctx, flags).await,
        AuthCommands::ConfirmReset(args) => password::confirm(args, ctx, flags).await,
        AuthCommands::ResendConfirmation(args) => password::resend(args, ctx, flags).await,
    }
}
