//! Per-question streaming session: the state machine that turns raw byte
//! chunks into rendered answer fragments.
//!
//! One [`AnswerSession`] exists per submitted question. It owns the line
//! buffer, the append-only output accumulator, and the loading indicator,
//! and it notifies the UI through the [`AnswerSink`] seam. Sessions share
//! nothing; concurrent questions each get their own.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::client::StreamError;
use crate::framing::{is_done_marker, parse_data_line, LineBuffer};
use crate::indicator::LoadingIndicator;
use crate::markdown;
use crate::model::delta_content;

/// The single user-visible failure text. Internal fault detail is logged,
/// never displayed.
pub const FAILURE_MESSAGE: &str = "Sorry, something went wrong, please try again later";

/// UI collaborator receiving rendered fragments and lifecycle notifications.
pub trait AnswerSink: Send {
    /// Called once per decoded content delta with the rendered fragment.
    fn append(&mut self, fragment: &str);

    /// Called once when the first token arrives and the loading placeholder
    /// should be cleared.
    fn first_token(&mut self) {}

    /// Called at most once per session, terminally, with [`FAILURE_MESSAGE`].
    fn error(&mut self, _message: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    AwaitingFirstToken,
    Streaming,
}

enum Progress {
    Continue,
    Done,
}

/// Streaming state for one question/answer exchange.
///
/// # Example
/// ```no_run
/// use answerstream::session::{AnswerSession, AnswerSink};
/// use answerstream::indicator::LoadingIndicator;
/// use std::time::Duration;
///
/// struct Stdout;
/// impl AnswerSink for Stdout {
///     fn append(&mut self, fragment: &str) {
///         print!("{fragment}");
///     }
/// }
///
/// let indicator = LoadingIndicator::spawn(Duration::from_millis(500), || eprint!("."));
/// let session = AnswerSession::new(Stdout).with_indicator(indicator);
/// ```
pub struct AnswerSession<S: AnswerSink> {
    sink: S,
    state: SessionState,
    lines: LineBuffer,
    output: String,
    indicator: Option<LoadingIndicator>,
    decode_fault_limit: Option<u32>,
    consecutive_faults: u32,
}

impl<S: AnswerSink> AnswerSession<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: SessionState::AwaitingFirstToken,
            lines: LineBuffer::new(),
            output: String::new(),
            indicator: None,
            decode_fault_limit: None,
            consecutive_faults: 0,
        }
    }

    /// Attach the loading indicator to stop on first token or failure.
    pub fn with_indicator(mut self, indicator: LoadingIndicator) -> Self {
        self.indicator = Some(indicator);
        self
    }

    /// Cap the number of consecutive malformed events tolerated before the
    /// session is failed. Without a cap, malformed events are skipped
    /// indefinitely.
    pub fn with_decode_fault_limit(mut self, limit: u32) -> Self {
        self.decode_fault_limit = Some(limit);
        self
    }

    /// The accumulated display text so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Consume the byte stream to completion and return the final answer.
    ///
    /// Fragments are appended strictly in arrival order of decoded events.
    /// On transport failure the sink receives [`FAILURE_MESSAGE`] and the
    /// underlying error is returned.
    pub async fn run<B>(mut self, mut chunks: B) -> Result<String, StreamError>
    where
        B: Stream<Item = Result<Bytes, StreamError>> + Unpin,
    {
        loop {
            match chunks.next().await {
                Some(Ok(chunk)) => match self.feed(&chunk) {
                    Ok(Progress::Continue) => {}
                    Ok(Progress::Done) => break,
                    Err(err) => {
                        self.terminate(&err);
                        return Err(err);
                    }
                },
                Some(Err(err)) => {
                    self.terminate(&err);
                    return Err(err);
                }
                None => {
                    // Stream ended without a [DONE] marker; the final
                    // unterminated line, if any, still counts.
                    if let Some(rest) = self.lines.flush() {
                        if let Err(err) = self.handle_line(&rest) {
                            self.terminate(&err);
                            return Err(err);
                        }
                    }
                    break;
                }
            }
        }
        Ok(self.finish())
    }

    /// Fail the session before any bytes arrived (request-phase faults).
    pub(crate) fn fail(mut self, err: StreamError) -> StreamError {
        self.terminate(&err);
        err
    }

    fn feed(&mut self, chunk: &[u8]) -> Result<Progress, StreamError> {
        for line in self.lines.push(chunk) {
            if let Progress::Done = self.handle_line(&line)? {
                return Ok(Progress::Done);
            }
        }
        Ok(Progress::Continue)
    }

    fn handle_line(&mut self, line: &str) -> Result<Progress, StreamError> {
        if line.trim().is_empty() {
            return Ok(Progress::Continue);
        }
        let Some(data) = parse_data_line(line) else {
            return Ok(Progress::Continue);
        };
        if is_done_marker(data) {
            return Ok(Progress::Done);
        }

        match delta_content(data) {
            Ok(Some(content)) => {
                self.consecutive_faults = 0;
                self.emit(&content);
            }
            Ok(None) => {
                self.consecutive_faults = 0;
            }
            Err(err) => {
                warn!(error = %err, line, "skipping malformed event");
                self.consecutive_faults += 1;
                if let Some(limit) = self.decode_fault_limit {
                    if self.consecutive_faults > limit {
                        return Err(StreamError::Backend(format!(
                            "more than {limit} consecutive malformed events"
                        )));
                    }
                }
            }
        }
        Ok(Progress::Continue)
    }

    fn emit(&mut self, content: &str) {
        if self.state == SessionState::AwaitingFirstToken {
            self.state = SessionState::Streaming;
            if let Some(indicator) = self.indicator.as_mut() {
                indicator.stop();
            }
            debug!("first token arrived");
            self.sink.first_token();
        }

        let fragment = markdown::render(content);
        self.output.push_str(&fragment);
        self.sink.append(&fragment);
    }

    fn finish(mut self) -> String {
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.stop();
        }
        debug!(chars = self.output.len(), "answer stream complete");
        self.output
    }

    fn terminate(&mut self, err: &StreamError) {
        warn!(error = %err, "answer stream failed");
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.stop();
        }
        self.sink.error(FAILURE_MESSAGE);
    }
}
