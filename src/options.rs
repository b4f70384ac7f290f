//! Chat and transport configuration.

use std::collections::HashMap;
use std::time::Duration;

/// A secret string type for sensitive data like API keys.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Chat behavior options: which model answers and under which instructions.
///
/// # Example
/// ```
/// use answerstream::options::ChatOptions;
///
/// let options = ChatOptions::new("process-helper")
///     .with_instructions("You are a helpful assistant.");
/// ```
#[derive(Debug, Clone)]
pub struct ChatOptions {
    /// Model identifier sent with every request.
    pub model: String,

    /// System instructions placed ahead of the user question.
    pub instructions: Option<String>,

    /// Maximum consecutive malformed events tolerated before the session
    /// is failed. `None` skips malformed events indefinitely.
    pub decode_fault_limit: Option<u32>,
}

impl ChatOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            instructions: None,
            decode_fault_limit: None,
        }
    }

    /// Set the system instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Cap the number of consecutive malformed events before giving up.
    pub fn with_decode_fault_limit(mut self, limit: u32) -> Self {
        self.decode_fault_limit = Some(limit);
        self
    }
}

/// Transport configuration for the completion endpoint.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Request timeout.
    pub timeout: Option<Duration>,

    /// Base URL for the completion endpoint.
    pub base_url: Option<String>,

    /// API key for bearer authentication. Local backends need none.
    pub api_key: Option<SecretString>,

    /// HTTP proxy URL.
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests.
    pub extra_headers: Option<HashMap<String, String>>,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<SecretString>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_string_debug_is_redacted() {
        let secret = SecretString::from("sk-very-secret");
        assert_eq!(format!("{secret:?}"), "SecretString([REDACTED])");
        assert_eq!(secret.expose_secret(), "sk-very-secret");
    }

    #[test]
    fn builders_compose() {
        let options = TransportOptions::new()
            .with_base_url("http://127.0.0.1:5000")
            .with_timeout(Duration::from_secs(30))
            .with_header("X-Trace".to_string(), "1".to_string());

        assert_eq!(options.base_url.as_deref(), Some("http://127.0.0.1:5000"));
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            options.extra_headers.unwrap().get("X-Trace"),
            Some(&"1".to_string())
        );
    }
}
