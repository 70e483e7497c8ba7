//! Error types for the advisory engine

use thiserror::Error;

/// Result type alias using the advisor's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Advisor error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Inference errors (E100-E199)
    #[error("Network error: {0}. Check your internet connection.")]
    NetworkError(#[from] reqwest::Error),

    #[error("LLM API error: {0}. Check your API key with `advisor config get llm.api_key`.")]
    LLMError(String),

    #[error("Rate limited. Waiting {0} seconds before retry.")]
    RateLimited(u64),

    #[error("No suitable model answered: {0}")]
    NoSuitableModel(String),

    #[error("Inference gateway failed: {0}")]
    Gateway(String),

    // Parse errors (E200-E299)
    #[error("Inference response could not be parsed: {0}")]
    Parse(String),

    // Orchestration errors (E300-E399)
    #[error("Advisory orchestration failed: {0}")]
    Orchestration(String),

    // Persistence errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Node '{0}' not found. Run `advisor graph stats` to inspect the graph.")]
    NodeNotFound(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::NetworkError(_) => "E100",
            Self::LLMError(_) => "E101",
            Self::RateLimited(_) => "E102",
            Self::NoSuitableModel(_) => "E103",
            Self::Gateway(_) => "E104",
            Self::Parse(_) => "E200",
            Self::Orchestration(_) => "E300",
            Self::DatabaseError(_) => "E400",
            Self::Persistence(_) => "E401",
            Self::NodeNotFound(_) => "E402",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NetworkError(_) => Some("Check internet connection".to_string()),
            Self::LLMError(_) | Self::Gateway(_) => Some("advisor config get llm.api_key".to_string()),
            Self::RateLimited(_) => Some("Wait and retry, or add fallback models".to_string()),
            Self::NoSuitableModel(_) => {
                Some("advisor config set llm.fallback_models <models>".to_string())
            }
            Self::Parse(_) => Some("Rephrase the question with more detail".to_string()),
            Self::DatabaseError(_) | Self::Persistence(_) => Some("advisor doctor".to_string()),
            Self::NodeNotFound(_) => Some("advisor graph stats".to_string()),
            Self::ConfigError(_) => Some("advisor config list".to_string()),
            _ => None,
        }
    }

    /// Whether this error came from the inference path (transport or response shape).
    ///
    /// Strategies absorb these into the deterministic fallback; anything else
    /// is treated as an orchestration failure.
    pub fn is_inference_failure(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_)
                | Self::LLMError(_)
                | Self::RateLimited(_)
                | Self::NoSuitableModel(_)
                | Self::Gateway(_)
                | Self::Parse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct_per_class() {
        assert_eq!(Error::Gateway("down".into()).code(), "E104");
        assert_eq!(Error::Parse("bad".into()).code(), "E200");
        assert_eq!(Error::Orchestration("boom".into()).code(), "E300");
        assert_eq!(Error::Persistence("disk".into()).code(), "E401");
    }

    #[test]
    fn test_inference_failure_classification() {
        assert!(Error::Gateway("timeout".into()).is_inference_failure());
        assert!(Error::Parse("not json".into()).is_inference_failure());
        assert!(Error::RateLimited(30).is_inference_failure());
        assert!(!Error::Orchestration("missing route".into()).is_inference_failure());
        assert!(!Error::Persistence("write failed".into()).is_inference_failure());
    }

    #[test]
    fn test_suggestions() {
        assert!(Error::Parse("x".into()).suggestion().is_some());
        assert!(Error::Other("x".into()).suggestion().is_none());
    }
}
