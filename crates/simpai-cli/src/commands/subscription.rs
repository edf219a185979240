use serde::Serialize;

use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::SubscriptionCommands;
use crate::cli::subcommands::subscription::PricesArgs;
use crate::commands::shared::output_text;
use crate::output::output;
use crate::progress::Progress;

/// Handle `simpai subscription <subcommand>`.
pub async fn handle(
    action: &SubscriptionCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        SubscriptionCommands::Status => status(ctx, flags).await,
        SubscriptionCommands::Prices(args) => prices(args, ctx, flags).await,
        SubscriptionCommands::Checkout => checkout(ctx, flags).await,
    }
}

#[derive(Serialize)]
struct StatusResponse {
    active: bool,
    plan: Option<String>,
    status: Option<String>,
    period_start: Option<String>,
    period_end: Option<String>,
}

async fn status(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let resp = Progress::during("Checking subscription", ctx.client.subscription_status()).await?;
    let data = resp.subscription_data.unwrap_or_default();
    output(
        &StatusResponse {
            active: resp.has_active_subscription,
            plan: data.plan_name,
            status: data.status,
            period_start: data.current_period_start,
            period_end: data.current_period_end,
        },
        flags.format,
    )
}

#[derive(Serialize)]
struct PriceRow {
    id: i64,
    name: String,
    price: String,
    interval: String,
}

async fn prices(args: &PricesArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let prices = Progress::during("Loading prices", ctx.client.prices(&args.interval)).await?;
    let rows = prices
        .into_iter()
        .map(|p| PriceRow {
            id: p.id,
            name: p.name,
            price: p.price.to_string(),
            interval: p.interval,
        })
        .collect::<Vec<_>>();
    output(&rows, flags.format)
}

async fn checkout(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let resp = Progress::during("Starting checkout", ctx.client.checkout_url()).await?;
    output_text("checkout_url", &resp.checkout_url, flags)
}
