use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use super::NarrationError;

/// Text-generation client abstraction (allows mocking)
pub trait LlmClient: Send + Sync {
    /// Send one user message and return the response content string.
    fn chat(&self, model: &str, prompt: &str) -> Result<String, NarrationError>;
}

/// Ollama HTTP client for local chat inference.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient pointing at a local Ollama instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Client configured from the environment (OLLAMA_HOST), 5-minute timeout.
    pub fn from_env() -> Self {
        Self::new(&crate::config::ollama_base_url(), 300)
    }

    /// Default Ollama instance at localhost:11434 with 5-minute timeout.
    pub fn default_local() -> Self {
        Self::new("http://localhost:11434", 300)
    }
}

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl LlmClient for OllamaClient {
    fn chat(&self, model: &str, prompt: &str) -> Result<String, NarrationError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = OllamaChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                NarrationError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                NarrationError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                NarrationError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NarrationError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaChatResponse = response
            .json()
            .map_err(|e| NarrationError::ResponseParsing(e.to_string()))?;

        parsed
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| NarrationError::MalformedResponse("missing message content".into()))
    }
}

/// Mock LLM client for testing — returns a configurable outcome and counts
/// how many calls reached it.
pub struct MockLlmClient {
    outcome: MockOutcome,
    calls: AtomicUsize,
}

enum MockOutcome {
    Respond(String),
    Malformed,
    Fail,
}

impl MockLlmClient {
    pub fn responding(response: &str) -> Self {
        Self {
            outcome: MockOutcome::Respond(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A service whose responses carry no content field.
    pub fn malformed() -> Self {
        Self {
            outcome: MockOutcome::Malformed,
            calls: AtomicUsize::new(0),
        }
    }

    /// A service whose calls always fail at the transport level.
    pub fn failing() -> Self {
        Self {
            outcome: MockOutcome::Fail,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of chat calls that reached this client.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmClient for MockLlmClient {
    fn chat(&self, _model: &str, _prompt: &str) -> Result<String, NarrationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            MockOutcome::Respond(text) => Ok(text.clone()),
            MockOutcome::Malformed => Err(NarrationError::MalformedResponse(
                "missing message content".into(),
            )),
            MockOutcome::Fail => Err(NarrationError::Connection(
                "http://localhost:11434".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockLlmClient::responding("test response");
        let result = client.chat("model", "prompt").unwrap();
        assert_eq!(result, "test response");
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn mock_client_counts_calls() {
        let client = MockLlmClient::failing();
        let _ = client.chat("model", "a");
        let _ = client.chat("model", "b");
        assert_eq!(client.calls(), 2);
    }

    #[test]
    fn mock_malformed_yields_malformed_error() {
        let client = MockLlmClient::malformed();
        let err = client.chat("model", "prompt").unwrap_err();
        assert!(matches!(err, NarrationError::MalformedResponse(_)));
    }

    #[test]
    fn ollama_client_constructor() {
        let client = OllamaClient::new("http://localhost:11434", 120);
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.timeout_secs, 120);
    }

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", 60);
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn default_local_uses_standard_port() {
        let client = OllamaClient::default_local();
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn chat_request_serializes_non_streaming() {
        let body = OllamaChatRequest {
            model: "llama3.2",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            stream: false,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"stream\":false"));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn chat_response_parses_content() {
        let parsed: OllamaChatResponse =
            serde_json::from_str(r#"{"message":{"role":"assistant","content":"hello"}}"#).unwrap();
        assert_eq!(parsed.message.unwrap().content.unwrap(), "hello");
    }

    #[test]
    fn chat_response_tolerates_missing_message() {
        let parsed: OllamaChatResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(parsed.message.is_none());
    }
}
