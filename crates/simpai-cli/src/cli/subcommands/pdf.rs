use std::path::PathBuf;

use clap::{Args, Subcommand};
use simpai_session::SUMMARY_STYLES;

use super::sheet::{QuestionArgs, ResetArgs, UploadArgs};

/// PDF session commands.
#[derive(Clone, Debug, Subcommand)]
pub enum PdfCommands {
    /// Upload a PDF, replacing the current one.
    Upload(UploadArgs),
    /// Generate a summary PDF in one of the preset styles.
    Summarize(SummarizeArgs),
    /// Generate a PDF from a custom prompt.
    Ask(QuestionArgs),
    /// Chat about the uploaded PDF.
    Chat(QuestionArgs),
    /// Show the stored session.
    Show,
    /// Forget the file, generated document and transcript.
    Reset(ResetArgs),
    /// Save the generated PDF to a file or directory.
    Export(ExportArgs),
}

#[derive(Clone, Debug, Args)]
pub struct SummarizeArgs {
    #[arg(long, default_value = "summary", value_parser = clap::builder::PossibleValuesParser::new(SUMMARY_STYLES))]
    pub style: String,
}

#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    /// Destination file, or a directory to save `generated-pdf.pdf` into.
    #[arg(default_value = ".")]
    pub dest: PathBuf,
}
