use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Spreadsheet session commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SheetCommands {
    /// Upload a CSV or Excel file, replacing the current one.
    Upload(UploadArgs),
    /// Run the analysis on the uploaded file.
    Analyze,
    /// Generate charts from a sample of rows.
    Charts(ChartsArgs),
    /// Ask a question about the uploaded data.
    Ask(QuestionArgs),
    /// Show the stored session.
    Show,
    /// Forget the file and transcript.
    Reset(ResetArgs),
}

#[derive(Clone, Debug, Args)]
pub struct UploadArgs {
    pub path: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct ChartsArgs {
    /// Rows sampled for chart generation (defaults to `general.default_sample_size`).
    #[arg(long)]
    pub sample_size: Option<u32>,
    /// Also write each chart to `<dir>/<name>.png`.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct QuestionArgs {
    #[arg(required = true, num_args = 1..)]
    pub words: Vec<String>,
}

impl QuestionArgs {
    #[must_use]
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

#[derive(Clone, Debug, Args)]
pub struct ResetArgs {
    /// Only clear the transcript; keep the file.
    #[arg(long)]
    pub chat_only: bool,
}
