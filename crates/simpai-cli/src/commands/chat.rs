use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::ChatArgs;
use crate::commands::shared::{cancel_on_ctrl_c, output_text, report_stream};
use crate::progress::Progress;

/// Handle `simpai chat`. General chat keeps no history between runs.
pub async fn handle(args: &ChatArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut session = simpai_session::ChatSession::new(ctx.client.clone(), ctx.notifier.clone());
    let question = args.question();

    if args.once {
        let answer = Progress::during("Thinking", session.ask_once(&question)).await?;
        return output_text("answer", &answer, flags);
    }

    let cancel = cancel_on_ctrl_c();
    let result = session.ask(&question, &cancel).await;
    ctx.notifier.end_stream();
    let outcome = result?;
    report_stream(&outcome, session.transcript(), flags)
}
