//! Chat client: request construction, transport, and error types.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::http::{add_extra_headers, build_http_client};
use crate::model::ChatRequest;
use crate::options::{ChatOptions, TransportOptions};
use crate::session::{AnswerSession, AnswerSink};

const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// Errors that can end a streaming session.
///
/// Malformed individual events are not represented here; they are absorbed
/// per-line inside the session and only logged.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Byte chunks of one response body.
pub type ByteStream = BoxStream<'static, Result<Bytes, StreamError>>;

/// Transport seam: opens a completion request and yields the response body
/// as a fallible byte stream.
///
/// Production uses [`HttpCompletions`]; tests inject in-memory streams.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn open(
        &self,
        request: &ChatRequest,
        options: &TransportOptions,
    ) -> Result<ByteStream, StreamError>;
}

/// HTTP transport POSTing to an OpenAI-compatible `/v1/chat/completions`.
#[derive(Debug, Clone, Default)]
pub struct HttpCompletions;

#[async_trait]
impl CompletionTransport for HttpCompletions {
    async fn open(
        &self,
        request: &ChatRequest,
        options: &TransportOptions,
    ) -> Result<ByteStream, StreamError> {
        if request.model.is_empty() {
            return Err(StreamError::Config("model must not be empty".to_string()));
        }

        let base = options
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let url = format!("{base}/v1/chat/completions");

        let http_client = build_http_client(options)?;

        let mut req = http_client
            .post(&url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(api_key) = &options.api_key {
            req = req.header(
                AUTHORIZATION,
                format!("Bearer {}", api_key.expose_secret()),
            );
        }
        req = add_extra_headers(req, options);

        let response = req.json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(handle_error_response(status, &body));
        }

        Ok(response.bytes_stream().map_err(StreamError::from).boxed())
    }
}

/// Map a non-success response to a terminal error, decoding the standard
/// `{"error": {...}}` body shape when present.
fn handle_error_response(status: reqwest::StatusCode, body: &str) -> StreamError {
    if let Ok(error_resp) = serde_json::from_str::<BackendErrorResponse>(body) {
        StreamError::Backend(format!(
            "backend error ({}): {}",
            error_resp.error.error_type, error_resp.error.message
        ))
    } else {
        StreamError::Backend(format!("HTTP {status}: {body}"))
    }
}

/// High-level client tying request construction, transport, and the
/// streaming session together.
///
/// # Example
/// ```no_run
/// use answerstream::client::ChatClient;
/// use answerstream::options::{ChatOptions, TransportOptions};
/// use answerstream::session::{AnswerSession, AnswerSink};
///
/// struct Stdout;
/// impl AnswerSink for Stdout {
///     fn append(&mut self, fragment: &str) {
///         print!("{fragment}");
///     }
/// }
///
/// # async fn demo() -> Result<(), answerstream::client::StreamError> {
/// let client = ChatClient::new(
///     ChatOptions::new("process-helper").with_instructions("You are a helpful assistant."),
///     TransportOptions::new().with_base_url("http://127.0.0.1:5000"),
/// );
///
/// let answer = client.ask("How do I file a request?", AnswerSession::new(Stdout)).await?;
/// println!("\nfull answer: {answer}");
/// # Ok(())
/// # }
/// ```
pub struct ChatClient<T = HttpCompletions> {
    chat_options: ChatOptions,
    transport_options: TransportOptions,
    transport: T,
}

impl ChatClient<HttpCompletions> {
    /// Create a client using the HTTP transport.
    pub fn new(chat_options: ChatOptions, transport_options: TransportOptions) -> Self {
        Self::with_transport(chat_options, transport_options, HttpCompletions)
    }
}

impl<T: CompletionTransport> ChatClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(
        chat_options: ChatOptions,
        transport_options: TransportOptions,
        transport: T,
    ) -> Self {
        Self {
            chat_options,
            transport_options,
            transport,
        }
    }

    pub fn chat_options(&self) -> &ChatOptions {
        &self.chat_options
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }

    /// Run one question/answer exchange through the given session.
    ///
    /// Opens the completion stream and drives the session to completion,
    /// returning the final accumulated answer. Request-phase faults reach
    /// the session's sink the same way mid-stream faults do.
    pub async fn ask<S: AnswerSink>(
        &self,
        question: &str,
        session: AnswerSession<S>,
    ) -> Result<String, StreamError> {
        let request = ChatRequest::new(&self.chat_options, question);
        let session = match self.chat_options.decode_fault_limit {
            Some(limit) => session.with_decode_fault_limit(limit),
            None => session,
        };

        debug!(model = %request.model, "opening completion stream");
        let stream = match self
            .transport
            .open(&request, &self.transport_options)
            .await
        {
            Ok(stream) => stream,
            Err(err) => return Err(session.fail(err)),
        };

        session.run(stream).await
    }
}

#[derive(Debug, Clone, Deserialize)]
struct BackendErrorResponse {
    error: BackendError,
}

#[derive(Debug, Clone, Deserialize)]
struct BackendError {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FAILURE_MESSAGE;
    use std::sync::{Arc, Mutex};

    #[test]
    fn error_response_with_standard_body() {
        let body = r#"{"error": {"type": "invalid_request_error", "message": "bad model"}}"#;
        let err = handle_error_response(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(matches!(
            err,
            StreamError::Backend(ref msg) if msg.contains("invalid_request_error") && msg.contains("bad model")
        ));
    }

    #[test]
    fn error_response_with_opaque_body() {
        let err = handle_error_response(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(
            err,
            StreamError::Backend(ref msg) if msg.contains("502") && msg.contains("upstream down")
        ));
    }

    // --- ask() over an injected transport ---

    struct FixtureTransport {
        body: Result<String, ()>,
    }

    #[async_trait]
    impl CompletionTransport for FixtureTransport {
        async fn open(
            &self,
            _request: &ChatRequest,
            _options: &TransportOptions,
        ) -> Result<ByteStream, StreamError> {
            match &self.body {
                Ok(body) => {
                    let chunks: Vec<Result<Bytes, StreamError>> = body
                        .as_bytes()
                        .chunks(16)
                        .map(|c| Ok(Bytes::copy_from_slice(c)))
                        .collect();
                    Ok(futures::stream::iter(chunks).boxed())
                }
                Err(()) => Err(StreamError::Backend("HTTP 500: down".to_string())),
            }
        }
    }

    #[derive(Clone, Default)]
    struct CollectingSink {
        errors: Arc<Mutex<Vec<String>>>,
        text: Arc<Mutex<String>>,
    }

    impl AnswerSink for CollectingSink {
        fn append(&mut self, fragment: &str) {
            self.text.lock().unwrap().push_str(fragment);
        }

        fn error(&mut self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    fn client(body: Result<String, ()>) -> ChatClient<FixtureTransport> {
        ChatClient::with_transport(
            ChatOptions::new("helper"),
            TransportOptions::new(),
            FixtureTransport { body },
        )
    }

    #[tokio::test]
    async fn ask_streams_an_answer() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"**ok**\"}}]}\n\ndata: [DONE]\n\n";
        let sink = CollectingSink::default();

        let answer = client(Ok(body.to_string()))
            .ask("question", AnswerSession::new(sink.clone()))
            .await
            .unwrap();

        assert_eq!(answer, "<strong>ok</strong>");
        assert_eq!(*sink.text.lock().unwrap(), "<strong>ok</strong>");
        assert!(sink.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn request_phase_fault_reaches_the_sink() {
        let sink = CollectingSink::default();

        let result = client(Err(()))
            .ask("question", AnswerSession::new(sink.clone()))
            .await;

        assert!(matches!(result, Err(StreamError::Backend(_))));
        assert_eq!(
            *sink.errors.lock().unwrap(),
            vec![FAILURE_MESSAGE.to_string()]
        );
        assert!(sink.text.lock().unwrap().is_empty());
    }
}
