use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Transport,
    Query,
    Validation,
    NotFound,
    UserInput,
}

/// Failure surfaced to a view.
///
/// Gateway failures carry the remote store's message unchanged so the
/// dashboard can show it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Query(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    UserInput(String),
}

impl DashboardError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Transport(_) => ErrorCode::Transport,
            Self::Query(_) => ErrorCode::Query,
            Self::Validation(_) => ErrorCode::Validation,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::UserInput(_) => ErrorCode::UserInput,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transport(message)
            | Self::Query(message)
            | Self::Validation(message)
            | Self::NotFound(message)
            | Self::UserInput(message) => message,
        }
    }

    pub fn user_input(message: impl Into<String>) -> Self {
        Self::UserInput(message.into())
    }
}
