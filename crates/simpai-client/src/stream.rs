//! Incremental reader for `data:`-framed token streams.
//!
//! The backend answers questions as a chunked body of lines like
//! `data: {"word": "Revenue"}`. Chunk boundaries are arbitrary, so bytes are
//! buffered until a newline completes a line. Buffering bytes rather than
//! decoded text keeps multi-byte UTF-8 sequences intact across chunks.

use std::fmt::Display;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// How a token stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// The body ended normally.
    Completed,
    /// The caller cancelled; no callback fired after the cancellation.
    Cancelled,
}

/// Result of reading a stream to its end or to cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOutcome {
    pub status: StreamStatus,
    /// Number of tokens delivered to the callback.
    pub tokens: usize,
}

impl StreamOutcome {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.status, StreamStatus::Cancelled)
    }
}

/// Errors from a streaming request.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The request failed before any body byte arrived.
    #[error(transparent)]
    Request(#[from] ClientError),

    /// The body failed after `delivered` tokens were handed out.
    #[error("stream interrupted after {delivered} tokens: {reason}")]
    Interrupted { delivered: usize, reason: String },
}

impl StreamError {
    /// Tokens that reached the callback before the failure.
    #[must_use]
    pub const fn delivered(&self) -> usize {
        match self {
            Self::Request(_) => 0,
            Self::Interrupted { delivered, .. } => *delivered,
        }
    }
}

// ── Line framing ──────────────────────────────────────────────────

/// Accumulates raw bytes and yields complete `\n`-terminated lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Take the next complete line, without its terminator.
    pub fn next_line(&mut self) -> Option<String> {
        let end = self.buf.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buf.drain(..=end).collect();
        line.pop();
        Some(decode_line(&line))
    }

    /// Take whatever remains once the body has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        Some(decode_line(&rest))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

// ── Line parsing ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenPayload {
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    token: Option<String>,
}

/// What a single complete line contributes.
#[derive(Debug, PartialEq, Eq)]
pub enum ParsedLine {
    Token(String),
    /// Blank lines, comments, other SSE fields, `[DONE]`, payloads without a
    /// token field.
    Skip,
    /// A `data:` line whose payload is not valid JSON.
    Malformed(String),
}

#[must_use]
pub fn parse_line(line: &str) -> ParsedLine {
    let Some(payload) = line.strip_prefix("data:") else {
        return ParsedLine::Skip;
    };
    let payload = payload.strip_prefix(' ').unwrap_or(payload).trim_end();
    if payload.is_empty() || payload == "[DONE]" {
        return ParsedLine::Skip;
    }
    match serde_json::from_str::<TokenPayload>(payload) {
        Ok(TokenPayload { word: Some(t), .. } | TokenPayload { token: Some(t), .. }) => {
            ParsedLine::Token(t)
        }
        Ok(_) => ParsedLine::Skip,
        Err(e) => ParsedLine::Malformed(e.to_string()),
    }
}

// ── Reader ────────────────────────────────────────────────────────

/// Read a byte stream to the end, invoking `on_token` once per token in
/// arrival order.
///
/// Cancelling `cancel` stops the read promptly and yields
/// `Ok(StreamOutcome { status: Cancelled, .. })`; `on_token` is never called
/// after cancellation is observed, even for lines already buffered.
///
/// # Errors
///
/// Returns [`StreamError::Interrupted`] if the stream yields an error.
/// Tokens delivered before the failure are reported in `delivered`.
pub async fn read_token_stream<S, E, F>(
    stream: S,
    cancel: &CancellationToken,
    mut on_token: F,
) -> Result<StreamOutcome, StreamError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
    F: FnMut(&str),
{
    let mut stream = std::pin::pin!(stream);
    let mut lines = LineBuffer::new();
    let mut delivered = 0usize;

    let cancelled = |delivered| StreamOutcome {
        status: StreamStatus::Cancelled,
        tokens: delivered,
    };

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(cancelled(delivered)),
            next = stream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                lines.push(&chunk);
                while let Some(line) = lines.next_line() {
                    if cancel.is_cancelled() {
                        return Ok(cancelled(delivered));
                    }
                    if deliver(&line, &mut on_token) {
                        delivered += 1;
                    }
                }
            }
            Some(Err(e)) => {
                tracing::warn!(delivered, error = %e, "token stream interrupted");
                return Err(StreamError::Interrupted {
                    delivered,
                    reason: e.to_string(),
                });
            }
            None => break,
        }
    }

    if let Some(rest) = lines.finish() {
        if cancel.is_cancelled() {
            return Ok(cancelled(delivered));
        }
        if deliver(&rest, &mut on_token) {
            delivered += 1;
        }
    }

    tracing::debug!(tokens = delivered, "token stream completed");
    Ok(StreamOutcome {
        status: StreamStatus::Completed,
        tokens: delivered,
    })
}

fn deliver<F: FnMut(&str)>(line: &str, on_token: &mut F) -> bool {
    match parse_line(line) {
        ParsedLine::Token(token) => {
            on_token(&token);
            true
        }
        ParsedLine::Skip => false,
        ParsedLine::Malformed(reason) => {
            tracing::warn!(line, %reason, "skipping malformed stream line");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    type Chunk = Result<Bytes, std::io::Error>;

    fn chunks(parts: &[&[u8]]) -> impl Stream<Item = Chunk> {
        let owned: Vec<Chunk> = parts.iter().map(|p| Ok(Bytes::copy_from_slice(p))).collect();
        stream::iter(owned)
    }

    async fn collect(parts: &[&[u8]]) -> (Vec<String>, StreamOutcome) {
        let mut tokens = Vec::new();
        let outcome = read_token_stream(chunks(parts), &CancellationToken::new(), |t| {
            tokens.push(t.to_string());
        })
        .await
        .unwrap();
        (tokens, outcome)
    }

    #[rstest]
    #[case::plain(r#"data: {"word": "hi"}"#, ParsedLine::Token("hi".into()))]
    #[case::no_space(r#"data:{"word":"hi"}"#, ParsedLine::Token("hi".into()))]
    #[case::token_field(r#"data: {"token": "hi"}"#, ParsedLine::Token("hi".into()))]
    #[case::blank("", ParsedLine::Skip)]
    #[case::comment(": keep-alive", ParsedLine::Skip)]
    #[case::event_field("event: message", ParsedLine::Skip)]
    #[case::done("data: [DONE]", ParsedLine::Skip)]
    #[case::no_token_field(r#"data: {"status": "thinking"}"#, ParsedLine::Skip)]
    fn parse_line_cases(#[case] line: &str, #[case] expected: ParsedLine) {
        assert_eq!(parse_line(line), expected);
    }

    #[test]
    fn parse_line_malformed_json() {
        assert!(matches!(parse_line("data: {not json"), ParsedLine::Malformed(_)));
    }

    #[test]
    fn line_buffer_holds_partial_lines() {
        let mut buf = LineBuffer::new();
        buf.push(b"data: a");
        assert_eq!(buf.next_line(), None);
        buf.push(b"bc\r\ndata: d");
        assert_eq!(buf.next_line().as_deref(), Some("data: abc"));
        assert_eq!(buf.next_line(), None);
        assert_eq!(buf.finish().as_deref(), Some("data: d"));
        assert_eq!(buf.finish(), None);
    }

    #[tokio::test]
    async fn split_line_yields_two_tokens_in_order() {
        let (tokens, outcome) = collect(&[
            b"data: {\"word\":\"Hel",
            b"lo\"}\ndata: {\"word\":\"world\"}\n",
        ])
        .await;
        assert_eq!(tokens, vec!["Hello", "world"]);
        assert_eq!(outcome.status, StreamStatus::Completed);
        assert_eq!(outcome.tokens, 2);
    }

    #[tokio::test]
    async fn token_sequence_is_independent_of_chunking() {
        let body = "data: {\"word\": \"Total\"}\n\n: ping\ndata: {\"word\": \"sales\"}\r\n\
                    data: {\"word\": \"grew\"}\ndata: [DONE]\n";
        let bytes = body.as_bytes();
        let (whole, _) = collect(&[bytes]).await;
        assert_eq!(whole, vec!["Total", "sales", "grew"]);

        for size in [1, 2, 3, 7, 16] {
            let parts: Vec<&[u8]> = bytes.chunks(size).collect();
            let (split, _) = collect(&parts).await;
            assert_eq!(split, whole, "chunk size {size}");
        }
    }

    #[tokio::test]
    async fn multibyte_utf8_split_across_chunks() {
        let line = "data: {\"word\": \"café\"}\n".as_bytes();
        let cut = line.iter().position(|&b| b == 0xC3).unwrap() + 1;
        let (tokens, _) = collect(&[&line[..cut], &line[cut..]]).await;
        assert_eq!(tokens, vec!["café"]);
    }

    #[tokio::test]
    async fn trailing_line_without_newline_is_flushed() {
        let (tokens, _) = collect(&[b"data: {\"word\": \"a\"}\ndata: {\"word\": \"b\"}"]).await;
        assert_eq!(tokens, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn malformed_line_is_skipped() {
        let (tokens, outcome) = collect(&[
            b"data: {\"word\": \"a\"}\ndata: {oops\ndata: {\"word\": \"b\"}\n",
        ])
        .await;
        assert_eq!(tokens, vec!["a", "b"]);
        assert_eq!(outcome.tokens, 2);
    }

    #[tokio::test]
    async fn cancel_after_two_tokens_stops_delivery() {
        let cancel = CancellationToken::new();
        let mut tokens = Vec::new();
        let body = chunks(&[
            b"data: {\"word\": \"one\"}\ndata: {\"word\": \"two\"}\ndata: {\"word\": \"three\"}\n",
            b"data: {\"word\": \"four\"}\n",
        ]);
        let outcome = read_token_stream(body, &cancel, |t| {
            tokens.push(t.to_string());
            if tokens.len() == 2 {
                cancel.cancel();
            }
        })
        .await
        .unwrap();
        assert_eq!(tokens, vec!["one", "two"]);
        assert_eq!(
            outcome,
            StreamOutcome {
                status: StreamStatus::Cancelled,
                tokens: 2
            }
        );
    }

    #[tokio::test]
    async fn cancel_before_first_chunk() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut called = false;
        let outcome = read_token_stream(chunks(&[b"data: {\"word\": \"x\"}\n"]), &cancel, |_| {
            called = true;
        })
        .await
        .unwrap();
        assert!(outcome.is_cancelled());
        assert!(!called);
    }

    #[tokio::test]
    async fn cancel_while_waiting_on_a_pending_stream() {
        let cancel = CancellationToken::new();
        let first: Chunk = Ok(Bytes::from_static(b"data: {\"word\": \"x\"}\n"));
        let body = stream::iter(vec![first]).chain(stream::pending());
        let trigger = cancel.clone();
        let outcome = read_token_stream(body, &cancel, move |_| trigger.cancel())
            .await
            .unwrap();
        assert_eq!(outcome.tokens, 1);
        assert!(outcome.is_cancelled());
    }

    #[tokio::test]
    async fn mid_stream_error_reports_delivered() {
        let parts: Vec<Chunk> = vec![
            Ok(Bytes::from_static(b"data: {\"word\": \"a\"}\n")),
            Err(std::io::Error::other("connection reset")),
            Ok(Bytes::from_static(b"data: {\"word\": \"b\"}\n")),
        ];
        let mut tokens = Vec::new();
        let err = read_token_stream(stream::iter(parts), &CancellationToken::new(), |t| {
            tokens.push(t.to_string());
        })
        .await
        .unwrap_err();
        assert_eq!(tokens, vec!["a"]);
        assert_eq!(err.delivered(), 1);
        assert!(matches!(err, StreamError::Interrupted { .. }));
    }
}
