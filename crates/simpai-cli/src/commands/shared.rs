use serde::Serialize;
use serde_json::{Map, Value};
use simpai_client::{StreamOutcome, StreamStatus};
use simpai_core::{ChatMessage, Sender, SessionRecord};
use tokio_util::sync::CancellationToken;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;

/// A token cancelled by the first Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("ctrl-c, cancelling stream");
            trigger.cancel();
        }
    });
    cancel
}

#[derive(Serialize)]
struct StreamReport<'a> {
    status: &'static str,
    tokens: usize,
    answer: Option<&'a str>,
}

/// Report a finished stream. The answer was already echoed token by token in
/// table format, so only a cancellation note follows it there.
pub fn report_stream(
    outcome: &StreamOutcome,
    transcript: &[ChatMessage],
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let status = match outcome.status {
        StreamStatus::Completed => "completed",
        StreamStatus::Cancelled => "cancelled",
    };

    if flags.format == OutputFormat::Table {
        if outcome.is_cancelled() && !flags.quiet {
            eprintln!("(cancelled after {} tokens)", outcome.tokens);
        }
        return Ok(());
    }

    let answer = if outcome.tokens == 0 {
        None
    } else {
        last_reply(transcript)
    };
    output(
        &StreamReport {
            status,
            tokens: outcome.tokens,
            answer,
        },
        flags.format,
    )
}

fn last_reply(transcript: &[ChatMessage]) -> Option<&str> {
    transcript
        .last()
        .filter(|m| m.sender == Sender::Ai)
        .map(|m| m.text.as_str())
}

/// Print free text as-is in table format, or wrapped as `{key: text}`.
pub fn output_text(key: &str, text: &str, flags: &GlobalFlags) -> anyhow::Result<()> {
    if flags.format == OutputFormat::Table {
        println!("{text}");
        return Ok(());
    }
    let mut wrapped = Map::new();
    wrapped.insert(key.to_string(), Value::from(text));
    output(&wrapped, flags.format)
}

#[derive(Serialize)]
struct SessionView<'a, T: Serialize> {
    file: Option<&'a str>,
    file_type: Option<&'a str>,
    file_size: Option<u64>,
    file_id: Option<&'a str>,
    processing: Option<&'a str>,
    #[serde(flatten)]
    extra: T,
    messages: usize,
}

#[derive(Serialize)]
struct SessionDump<'a, T: Serialize> {
    #[serde(flatten)]
    view: SessionView<'a, T>,
    transcript: &'a [ChatMessage],
}

/// Show a stored session: a summary table followed by the transcript, or the
/// whole record as JSON.
pub fn show_session<T: Serialize>(
    record: &SessionRecord,
    extra: T,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let view = SessionView {
        file: record.file().map(|f| f.name.as_str()),
        file_type: record.file().map(|f| f.mime_type.as_str()),
        file_size: record.file().map(|f| f.size),
        file_id: record.file_id(),
        processing: record.processing_status(),
        extra,
        messages: record.transcript().len(),
    };

    if flags.format != OutputFormat::Table {
        return output(
            &SessionDump {
                view,
                transcript: record.transcript(),
            },
            flags.format,
        );
    }

    output(&view, flags.format)?;
    println!();
    for line in transcript_lines(record.transcript()) {
        println!("{line}");
    }
    Ok(())
}

fn transcript_lines(transcript: &[ChatMessage]) -> Vec<String> {
    transcript
        .iter()
        .map(|m| {
            let speaker = match m.sender {
                Sender::User => "you",
                Sender::Ai => "ai",
            };
            let marker = if m.is_complete { "" } else { " …" };
            format!("{speaker:>3}: {}{marker}", m.text)
        })
        .collect()
}
