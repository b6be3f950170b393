// Error taxonomy for blog lifecycle actions

use std::fmt;

use thiserror::Error;

/// Client-side validation failures. These never reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a blog topic")]
    EmptyTopic,
    #[error("Please enter a topic with at least 3 characters")]
    TooShort,
    #[error("Topic is too long. Please keep it under 200 characters")]
    TooLong,
    #[error("No blog to save")]
    NoBlogToSave,
}

/// A failed round trip: transport error, malformed body or a server-side refusal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    pub message: String,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Prefer the server's explanation, fall back to the action's default.
    pub fn from_server(error: Option<String>, fallback: &str) -> Self {
        let message = error
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Self { message }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Generate,
    Save,
    Library,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generate => "Generation",
            Self::Save => "Saving",
            Self::Library => "A library request",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Error: {0}")]
    Request(#[from] RequestError),
    #[error("{0} is already in progress")]
    InFlight(Action),
}

impl LifecycleError {
    /// Validation problems are shown as warnings rather than errors.
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InFlight(_))
    }
}
