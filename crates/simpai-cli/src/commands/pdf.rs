use serde::Serialize;
use simpai_session::documents::path_from_url;

use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::PdfCommands;
use crate::cli::subcommands::pdf::{ExportArgs, SummarizeArgs};
use crate::cli::subcommands::sheet::{QuestionArgs, ResetArgs, UploadArgs};
use crate::commands::shared::{cancel_on_ctrl_c, report_stream, show_session};
use crate::output::output;
use crate::progress::Progress;

/// Handle `simpai pdf <subcommand>`.
pub async fn handle(
    action: &PdfCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        PdfCommands::Upload(args) => upload(args, ctx, flags).await,
        PdfCommands::Summarize(args) => summarize(args, ctx, flags).await,
        PdfCommands::Ask(args) => ask_custom(args, ctx, flags).await,
        PdfCommands::Chat(args) => chat(args, ctx, flags).await,
        PdfCommands::Show => show(ctx, flags).await,
        PdfCommands::Reset(args) => reset(args, ctx, flags).await,
        PdfCommands::Export(args) => export(args, ctx, flags).await,
    }
}

#[derive(Serialize)]
struct UploadResponse<'a> {
    file: Option<&'a str>,
    file_id: Option<&'a str>,
}

async fn upload(args: &UploadArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut session = ctx.pdf().await;
    Progress::during("Uploading", session.upload_path(&args.path)).await?;

    let record = session.record();
    output(
        &UploadResponse {
            file: record.file().map(|f| f.name.as_str()),
            file_id: record.file_id(),
        },
        flags.format,
    )
}

#[derive(Serialize)]
struct DocumentResponse {
    document: String,
}

fn document_response(url: &str) -> DocumentResponse {
    let document = path_from_url(url).map_or_else(|| url.to_string(), |p| p.display().to_string());
    DocumentResponse { document }
}

async fn summarize(
    args: &SummarizeArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut session = ctx.pdf().await;
    let url = Progress::during("Generating summary", session.summarize(&args.style)).await?;
    output(&document_response(&url), flags.format)
}

async fn ask_custom(
    args: &QuestionArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut session = ctx.pdf().await;
    let url = Progress::during("Processing prompt", session.ask_custom(&args.text())).await?;
    output(&document_response(&url), flags.format)
}

async fn chat(args: &QuestionArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut session = ctx.pdf().await;
    let cancel = cancel_on_ctrl_c();
    let result = session.chat(&args.text(), &cancel).await;
    ctx.notifier.end_stream();
    let outcome = result?;
    report_stream(&outcome, session.record().transcript(), flags)
}

#[derive(Serialize)]
struct PdfExtra {
    generated_document: Option<String>,
}

async fn show(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session = ctx.pdf().await;
    let extra = PdfExtra {
        generated_document: session
            .generated_document()
            .map(|url| document_response(url).document),
    };
    show_session(session.record(), extra, flags)
}

#[derive(Serialize)]
struct ResetResponse {
    reset: &'static str,
}

async fn reset(args: &ResetArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut session = ctx.pdf().await;
    let reset = if args.chat_only {
        session.reset_chat().await;
        "chat"
    } else {
        session.reset().await;
        "session"
    };
    output(&ResetResponse { reset }, flags.format)
}

#[derive(Serialize)]
struct ExportResponse {
    saved: String,
}

async fn export(args: &ExportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session = ctx.pdf().await;
    let target = session.export_document(&args.dest).await?;
    output(
        &ExportResponse {
            saved: target.display().to_string(),
        },
        flags.format,
    )
}
