pub mod narrator;
pub mod ollama;
pub mod prompt;

pub use narrator::*;
pub use ollama::*;
pub use prompt::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NarrationError {
    #[error("Ollama is not running at {0}")]
    Connection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed chat response: {0}")]
    MalformedResponse(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
