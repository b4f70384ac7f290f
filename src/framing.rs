//! Line framing for `data: <json>` event streams.
//!
//! The response body arrives as arbitrary byte chunks; a chunk may end
//! mid-line or even mid-UTF-8-sequence. [`LineBuffer`] accumulates chunks
//! and hands back only complete lines, keeping the unterminated tail for
//! the next push.
//!
//! Event stream format:
//! ```text
//! data: {"key": "value"}
//!
//! data: {"another": "event"}
//!
//! data: [DONE]
//! ```

use bytes::BytesMut;

/// Incremental splitter of a byte stream into newline-terminated lines.
///
/// # Example
/// ```
/// use answerstream::framing::LineBuffer;
///
/// let mut buf = LineBuffer::new();
/// assert_eq!(buf.push(b"hel"), Vec::<String>::new());
/// assert_eq!(buf.push(b"lo\nwor"), vec!["hello".to_string()]);
/// assert_eq!(buf.push(b"ld\n"), vec!["world".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: BytesMut,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completes, in order.
    ///
    /// A line is the text between two consecutive newlines; the terminating
    /// newline is not included and a trailing `\r` is stripped. Bytes after
    /// the last newline stay buffered, so a fragment split across chunks is
    /// never lost and never emitted early. Empty chunks are no-ops.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line = self.buf.split_to(pos + 1);
            lines.push(decode_line(&line[..pos]));
        }
        lines
    }

    /// Hand back the unterminated tail once the stream has ended.
    ///
    /// Returns `None` when the buffer holds nothing but an empty fragment.
    pub fn flush(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = self.buf.split();
        Some(decode_line(&rest)).filter(|line| !line.is_empty())
    }
}

// A complete line always contains whole characters (no UTF-8 sequence spans
// a newline), so lossy decoding here only ever touches genuinely bad bytes.
fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parse an event line to extract the data portion.
///
/// Event lines are in the format: `data: <content>`.
///
/// # Example
/// ```
/// use answerstream::framing::parse_data_line;
///
/// let line = "data: {\"key\": \"value\"}";
/// assert_eq!(parse_data_line(line), Some("{\"key\": \"value\"}"));
///
/// assert_eq!(parse_data_line("invalid"), None);
/// ```
pub fn parse_data_line(line: &str) -> Option<&str> {
    line.strip_prefix("data: ").map(str::trim)
}

/// Check if a data line indicates the stream is done.
///
/// OpenAI-compatible backends terminate the event stream with `[DONE]`.
///
/// # Example
/// ```
/// use answerstream::framing::is_done_marker;
///
/// assert!(is_done_marker("[DONE]"));
/// assert!(!is_done_marker("{\"data\": \"value\"}"));
/// ```
pub fn is_done_marker(data: &str) -> bool {
    data == "[DONE]"
}
