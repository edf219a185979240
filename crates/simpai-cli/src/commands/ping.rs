use chrono::{DateTime, Utc};
use serde::Serialize;
use simpai_session::PingThrottle;

use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::PingArgs;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct PingResponse {
    pinged: bool,
    last_ping: Option<DateTime<Utc>>,
}

/// Wake the backend, at most once per `general.ping_interval_secs` unless
/// forced.
pub async fn handle(args: &PingArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let throttle = PingThrottle::new(ctx.store.clone(), ctx.config.general.ping_interval_secs);
    let now = Utc::now();

    if !args.force && !throttle.is_due(now).await {
        tracing::debug!("backend pinged recently, skipping");
        return output(
            &PingResponse {
                pinged: false,
                last_ping: throttle.last_ping().await,
            },
            flags.format,
        );
    }

    Progress::during("Waking backend", ctx.client.ping()).await?;
    throttle.record(now).await;
    output(
        &PingResponse {
            pinged: true,
            last_ping: Some(now),
        },
        flags.format,
    )
}
