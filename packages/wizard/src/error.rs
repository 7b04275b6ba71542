// ABOUTME: Error types for the wizard package
// ABOUTME: Defines all error variants for estimation wizard operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Completion backend is not configured")]
    NotConfigured,

    #[error("Empty response from AI")]
    EmptyResponse,

    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    #[error("AI service error: {0}")]
    AIService(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Too many AI requests, wait a minute")]
    RateLimited,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl From<sitequote_ai::AIServiceError> for WizardError {
    fn from(err: sitequote_ai::AIServiceError) -> Self {
        use sitequote_ai::AIServiceError;
        match err {
            AIServiceError::NoApiKey => WizardError::NotConfigured,
            AIServiceError::EmptyResponse => WizardError::EmptyResponse,
            other => WizardError::AIService(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, WizardError>;
