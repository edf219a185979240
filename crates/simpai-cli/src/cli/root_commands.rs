use clap::{Args, Subcommand};

use crate::cli::subcommands::{AuthCommands, PdfCommands, SheetCommands, SubscriptionCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Accounts: register, log in, profile, password reset.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Spreadsheet analysis session.
    Sheet {
        #[command(subcommand)]
        action: SheetCommands,
    },
    /// PDF summary session.
    Pdf {
        #[command(subcommand)]
        action: PdfCommands,
    },
    /// General chat without a file.
    Chat(ChatArgs),
    /// Subscription status, prices and checkout.
    Subscription {
        #[command(subcommand)]
        action: SubscriptionCommands,
    },
    /// Wake the backend.
    Ping(PingArgs),
}

/// Arguments for `simpai chat`.
#[derive(Clone, Debug, Args)]
pub struct ChatArgs {
    /// Question to ask.
    #[arg(required = true, num_args = 1..)]
    pub words: Vec<String>,
    /// Wait for the whole answer instead of streaming it.
    #[arg(long)]
    pub once: bool,
}

impl ChatArgs {
    #[must_use]
    pub fn question(&self) -> String {
        self.words.join(" ")
    }
}

/// Arguments for `simpai ping`.
#[derive(Clone, Debug, Args)]
pub struct PingArgs {
    /// Ping even if the backend was pinged recently.
    #[arg(long)]
    pub force: bool,
}
