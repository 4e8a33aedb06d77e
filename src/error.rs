use crate::models::ProviderKind;
use thiserror::Error;

/// Message shown to callers when an upstream provider fails. The detailed
/// cause is only written to the server log.
pub const GENERIC_PROVIDER_MESSAGE: &str = "Image generation failed. Please try again.";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Config(String),

    #[error("{provider} provider error: {message}")]
    Provider {
        provider: ProviderKind,
        message: String,
    },

    #[error("Client error: {0}")]
    Client(String),
}

/// Status classification shared by every failure path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadInput,
    MissingConfiguration,
    Upstream,
}

impl GenerationError {
    pub fn provider(provider: ProviderKind, message: impl Into<String>) -> Self {
        GenerationError::Provider {
            provider,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::InvalidInput(_) => ErrorKind::BadInput,
            GenerationError::Config(_) => ErrorKind::MissingConfiguration,
            GenerationError::Provider { .. } | GenerationError::Client(_) => ErrorKind::Upstream,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::BadInput => 400,
            ErrorKind::MissingConfiguration | ErrorKind::Upstream => 500,
        }
    }

    /// The message a caller is allowed to see.
    pub fn public_message(&self) -> String {
        match self {
            GenerationError::InvalidInput(msg) | GenerationError::Config(msg) => msg.clone(),
            GenerationError::Provider { .. } => GENERIC_PROVIDER_MESSAGE.to_string(),
            GenerationError::Client(msg) => msg.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
