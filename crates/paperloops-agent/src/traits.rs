use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while talking to the text-generation endpoint
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Rate limited by endpoint (status {status})")]
    RateLimited { status: u16 },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Client configuration error: {0}")]
    Config(String),

    #[error("Generation failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<GenerationError>,
    },
}

impl GenerationError {
    /// Whether the retry policy applies. Every endpoint or transport failure
    /// is retried; local configuration errors and exhausted retries are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::RateLimited { .. } => true,
            GenerationError::Api { .. } => true,
            GenerationError::Network(_) => true,
            GenerationError::InvalidResponse(_) => true,
            GenerationError::Config(_) => false,
            GenerationError::RetriesExhausted { .. } => false,
        }
    }
}

/// A chat-completion endpoint reduced to the one call the loop needs.
///
/// Implementations own their retry behaviour: an `Err` means the call is
/// final and callers must not retry it themselves.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable name of the backend (e.g. the model identifier)
    fn name(&self) -> &str;

    /// Generate text for a single system instruction and user message
    async fn complete(
        &self,
        system_instruction: &str,
        user_message: &str,
        max_output_tokens: Option<u32>,
    ) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(GenerationError::RateLimited { status: 429 }.is_retryable());
        assert!(GenerationError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(GenerationError::Api {
            status: 408,
            message: "timeout".into()
        }
        .is_retryable());
        assert!(GenerationError::Api {
            status: 401,
            message: "bad key".into()
        }
        .is_retryable());
        assert!(GenerationError::InvalidResponse("no choices".into()).is_retryable());
        assert!(!GenerationError::Config("API key is empty".into()).is_retryable());
    }

    #[test]
    fn test_exhausted_is_final() {
        let err = GenerationError::RetriesExhausted {
            attempts: 3,
            last: Box::new(GenerationError::RateLimited { status: 429 }),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("3 attempt(s)"));
    }
}
