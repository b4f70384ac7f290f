//! # answerstream - Streaming Answer Renderer
//!
//! A small, pragmatic Rust library for chat widgets that stream answers
//! from an OpenAI-compatible completion endpoint. It consumes the response
//! body as arbitrary byte chunks framed as `data: <json>` event blocks,
//! extracts content deltas, applies a Markdown-subset transform, and pushes
//! display-ready fragments to a UI sink as they arrive.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Split-invariant line framing: chunk boundaries anywhere, even inside a
//!   UTF-8 sequence, never change the rendered output
//! - Per-line fault absorption: one malformed event never corrupts a stream
//! - Loading-indicator lifecycle handled per session, cancellation-safe
//! - UI-agnostic via the [`session::AnswerSink`] trait
//!
//! ## Architecture
//!
//! One [`session::AnswerSession`] exists per submitted question. It owns
//! all mutable per-question state (line buffer, output accumulator,
//! indicator handle) and is driven by an explicit read loop over the
//! response byte stream. [`client::ChatClient`] builds the request payload
//! and opens the stream; the transport behind it is a trait so tests run
//! against in-memory streams.
//!
//! ## Example
//! ```no_run
//! use answerstream::client::ChatClient;
//! use answerstream::indicator::LoadingIndicator;
//! use answerstream::options::{ChatOptions, TransportOptions};
//! use answerstream::session::{AnswerSession, AnswerSink};
//! use std::time::Duration;
//!
//! struct Stdout;
//! impl AnswerSink for Stdout {
//!     fn append(&mut self, fragment: &str) {
//!         print!("{fragment}");
//!     }
//!     fn error(&mut self, message: &str) {
//!         eprintln!("{message}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ChatClient::new(
//!         ChatOptions::new("process-helper")
//!             .with_instructions("You are a helpful assistant."),
//!         TransportOptions::new().with_base_url("http://127.0.0.1:5000"),
//!     );
//!
//!     let indicator = LoadingIndicator::spawn(Duration::from_millis(500), || eprint!("."));
//!     let session = AnswerSession::new(Stdout).with_indicator(indicator);
//!
//!     let answer = client.ask("How do I file a request?", session).await?;
//!     println!("\n--\n{answer}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod framing;
pub mod http;
pub mod indicator;
pub mod markdown;
pub mod model;
pub mod options;
pub mod session;

// Re-exports for convenience
pub use client::{ChatClient, CompletionTransport, HttpCompletions, StreamError};
pub use indicator::LoadingIndicator;
pub use model::{ChatMessage, ChatRequest, Role};
pub use options::{ChatOptions, TransportOptions};
pub use session::{AnswerSession, AnswerSink, FAILURE_MESSAGE};
