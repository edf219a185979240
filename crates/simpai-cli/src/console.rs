use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use simpai_session::{Notice, NoticeLevel, Notifier};

use crate::cli::{GlobalFlags, OutputFormat};

/// Prints notices to stderr and streamed tokens as they arrive.
///
/// Tokens go to stdout for the table format and to stderr otherwise, so
/// `--format json` keeps stdout machine-readable. Error notices are not
/// printed here; the failing command reports them through its error.
pub struct ConsoleNotifier {
    tokens_to_stdout: bool,
    notices: bool,
    mid_line: AtomicBool,
}

impl ConsoleNotifier {
    pub fn new(flags: &GlobalFlags) -> Self {
        Self {
            tokens_to_stdout: flags.format == OutputFormat::Table,
            notices: !flags.quiet,
            mid_line: AtomicBool::new(false),
        }
    }

    /// Terminate the streamed line, if one was started.
    pub fn end_stream(&self) {
        if self.mid_line.swap(false, Ordering::Relaxed) {
            self.write_token_text("\n");
        }
    }

    fn write_token_text(&self, text: &str) {
        let result = if self.tokens_to_stdout {
            let mut out = std::io::stdout().lock();
            out.write_all(text.as_bytes()).and_then(|()| out.flush())
        } else if self.notices {
            let mut err = std::io::stderr().lock();
            err.write_all(text.as_bytes()).and_then(|()| err.flush())
        } else {
            Ok(())
        };
        if let Err(error) = result {
            tracing::debug!(%error, "failed to echo token");
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        if !self.notices {
            return;
        }
        match notice.level {
            NoticeLevel::Info => eprintln!("{}", notice.message),
            NoticeLevel::Success => eprintln!("✓ {}", notice.message),
            NoticeLevel::Error => tracing::debug!(message = %notice.message, "error notice"),
        }
    }

    fn token(&self, token: &str) {
        let separator = if self.mid_line.swap(true, Ordering::Relaxed) {
            " "
        } else {
            ""
        };
        self.write_token_text(&format!("{separator}{token}"));
    }
}
