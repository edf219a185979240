use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: &Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Auth { action } => commands::auth::handle(action, ctx, flags).await,
        Commands::Sheet { action } => commands::sheet::handle(action, ctx, flags).await,
        Commands::Pdf { action } => commands::pdf::handle(action, ctx, flags).await,
        Commands::Chat(args) => commands::chat::handle(args, ctx, flags).await,
        Commands::Subscription { action } => {
            commands::subscription::handle(action, ctx, flags).await
        }
        Commands::Ping(args) => commands::ping::handle(args, ctx, flags).await,
    }
}
