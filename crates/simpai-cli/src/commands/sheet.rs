use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use simpai_session::PNG_DATA_URI_PREFIX;

use crate::bootstrap::AppContext;
use crate::cli::GlobalFlags;
use crate::cli::subcommands::SheetCommands;
use crate::cli::subcommands::sheet::{ChartsArgs, QuestionArgs, ResetArgs, UploadArgs};
use crate::commands::shared::{cancel_on_ctrl_c, output_text, report_stream, show_session};
use crate::output::output;
use crate::progress::Progress;

/// Handle `simpai sheet <subcommand>`.
pub async fn handle(
    action: &SheetCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        SheetCommands::Upload(args) => upload(args, ctx, flags).await,
        SheetCommands::Analyze => analyze(ctx, flags).await,
        SheetCommands::Charts(args) => charts(args, ctx, flags).await,
        SheetCommands::Ask(args) => ask(args, ctx, flags).await,
        SheetCommands::Show => show(ctx, flags).await,
        SheetCommands::Reset(args) => reset(args, ctx, flags).await,
    }
}

#[derive(Serialize)]
struct UploadResponse<'a> {
    file: Option<&'a str>,
    file_id: Option<&'a str>,
}

async fn upload(args: &UploadArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut session = ctx.spreadsheet().await;
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

async fn analyze(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut session = ctx.spreadsheet().await;
    let analysis = Progress::during("Analyzing", session.analyze()).await?;
    output_text("analysis", &analysis, flags)
}

#[derive(Serialize)]
struct ChartRow {
    name: String,
    bytes: usize,
    saved: Option<String>,
}

async fn charts(args: &ChartsArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let sample_size = args
        .sample_size
        .unwrap_or(ctx.config.general.default_sample_size);
    let mut session = ctx.spreadsheet().await;
    Progress::during("Generating charts", session.generate_charts(sample_size)).await?;

    let charts = session.charts();
    let mut rows = Vec::with_capacity(charts.len());
    for (name, uri) in &charts {
        let png = decode_chart(uri).with_context(|| format!("chart {name} is not valid base64"))?;
        let saved = match &args.out_dir {
            Some(dir) => Some(save_chart(dir, name, &png).await?),
            None => None,
        };
        rows.push(ChartRow {
            name: (*name).to_string(),
            bytes: png.len(),
            saved: saved.map(|p| p.display().to_string()),
        });
    }
    output(&rows, flags.format)
}

fn decode_chart(uri: &str) -> anyhow::Result<Vec<u8>> {
    let payload = uri.strip_prefix(PNG_DATA_URI_PREFIX).unwrap_or(uri);
    Ok(STANDARD.decode(payload.trim())?)
}

async fn save_chart(dir: &Path, name: &str, png: &[u8]) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(format!("{}.png", file_stem(name)));
    tokio::fs::write(&path, png)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Chart names come from the backend; keep them to one safe path component.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') { c } else { '_' })
        .collect();
    if stem.is_empty() { "chart".to_string() } else { stem }
}

async fn ask(args: &QuestionArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut session = ctx.spreadsheet().await;
    let cancel = cancel_on_ctrl_c();
    let result = session.ask(&args.text(), &cancel).await;
    ctx.notifier.end_stream();
    let outcome = result?;
    report_stream(&outcome, session.record().transcript(), flags)
}

#[derive(Serialize)]
struct SheetExtra<'a> {
    analysis: Option<&'a str>,
    charts: Vec<&'a str>,
}

async fn show(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session = ctx.spreadsheet().await;
    let charts: BTreeMap<&str, &str> = session.charts();
    let extra = SheetExtra {
        analysis: session.analysis(),
        charts: charts.keys().copied().collect(),
    };
    show_session(session.record(), extra, flags)
}

#[derive(Serialize)]
struct ResetResponse {
    reset: &'static str,
}

async fn reset(args: &ResetArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut session = ctx.spreadsheet().await;
    let reset = if args.chat_only {
        session.reset_chat().await;
        "chat"
    } else {
        session.reset().await;
        "session"
    };
    output(&ResetResponse { reset }, flags.format)
}
