//! Wire types for the chat completions request and its event stream.

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

use crate::options::ChatOptions;

/// Role of the message sender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message in the request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body for a streaming chat completion.
///
/// The message list is non-empty by construction: it always carries at least
/// the user question, preceded by system instructions when configured.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: NonEmpty<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// Build the payload for one submitted question.
    pub fn new(options: &ChatOptions, question: &str) -> Self {
        let messages = match &options.instructions {
            Some(instructions) => {
                let mut messages = NonEmpty::new(ChatMessage::system(instructions.clone()));
                messages.push(ChatMessage::user(question));
                messages
            }
            None => NonEmpty::new(ChatMessage::user(question)),
        };

        Self {
            model: options.model.clone(),
            messages,
            stream: true,
        }
    }
}

// --- Event stream payload types ---

/// One decoded event from the completion stream.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// Incremental content carried by one event. `content` is absent on role
/// announcements and finish chunks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Extract the content delta from one `data:` payload.
///
/// Returns `Ok(None)` for well-formed events that carry no text and `Err`
/// for payloads that do not decode.
pub fn delta_content(data: &str) -> Result<Option<String>, serde_json::Error> {
    let chunk: ChatCompletionChunk = serde_json::from_str(data)?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_content_extracts_text() {
        let data = r#"{"choices":[{"delta":{"content":"hello"}}]}"#;
        assert_eq!(delta_content(data).unwrap(), Some("hello".to_string()));
    }

    #[test]
    fn delta_content_absent_fields_are_not_errors() {
        // Role announcements and finish chunks carry no content.
        assert_eq!(
            delta_content(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap(),
            None
        );
        assert_eq!(
            delta_content(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#).unwrap(),
            None
        );
        assert_eq!(delta_content(r#"{"choices":[]}"#).unwrap(), None);
        assert_eq!(delta_content(r#"{"id":"x"}"#).unwrap(), None);
    }

    #[test]
    fn delta_content_rejects_malformed_payloads() {
        assert!(delta_content("not json").is_err());
        assert!(delta_content(r#"{"choices":[{"delta":{"content":5}}]}"#).is_err());
    }

    #[test]
    fn request_carries_instructions_before_question() {
        let options = ChatOptions::new("helper").with_instructions("be brief");
        let request = ChatRequest::new(&options, "why?");

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "helper");
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be brief");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "why?");
    }

    #[test]
    fn request_without_instructions_is_question_only() {
        let options = ChatOptions::new("helper");
        let request = ChatRequest::new(&options, "why?");

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages.head.role, Role::User);
    }
}
