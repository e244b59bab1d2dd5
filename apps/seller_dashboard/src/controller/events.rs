//! UI/backend events and error modeling for the dashboard controller.

use dashboard_core::Completion;
use shared::error::{DashboardError, ErrorCode};

pub enum UiEvent {
    Error(UiError),
    /// A gateway call finished; feed it back into the reducer.
    Completed(Completion),
    ImageLoaded {
        url: String,
        image: Thumbnail,
    },
    ImageFailed {
        url: String,
        error: UiError,
    },
}

/// Decoded RGBA pixels ready to upload as a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Remote,
    Validation,
    NotFound,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    ImageLoad,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_dashboard(context: UiErrorContext, err: &DashboardError) -> Self {
        let category = match err.code() {
            ErrorCode::Transport => UiErrorCategory::Transport,
            ErrorCode::Query => UiErrorCategory::Remote,
            ErrorCode::Validation | ErrorCode::UserInput => UiErrorCategory::Validation,
            ErrorCode::NotFound => UiErrorCategory::NotFound,
        };
        Self {
            category,
            context,
            message: err.message().to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("dns")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("not found") || message_lower.contains("404") {
            UiErrorCategory::NotFound
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Whether the worker is gone and nothing else will succeed.
    pub fn is_fatal(&self) -> bool {
        self.context == UiErrorContext::BackendStartup
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_errors_map_by_code() {
        let err = UiError::from_dashboard(
            UiErrorContext::BackendStartup,
            &DashboardError::Transport("invalid header value for apikey".into()),
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert_eq!(err.message(), "invalid header value for apikey");
        assert!(err.is_fatal());
    }

    #[test]
    fn classifies_startup_runtime_failure_as_fatal() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "backend worker startup failure: failed to build runtime",
        );
        assert!(err.is_fatal());
        assert_eq!(err.category(), UiErrorCategory::Unknown);
    }

    #[test]
    fn image_failures_are_classified_but_never_fatal() {
        let err = UiError::from_message(UiErrorContext::ImageLoad, "connection refused");
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert_eq!(err.context(), UiErrorContext::ImageLoad);
        assert!(!err.is_fatal());

        let err = UiError::from_message(
            UiErrorContext::ImageLoad,
            "HTTP status client error (404 Not Found) for url (https://x/y.jpg)",
        );
        assert_eq!(err.category(), UiErrorCategory::NotFound);

        let err = UiError::from_message(UiErrorContext::ImageLoad, "image is 11 bytes, limit is 10");
        assert_eq!(err.category(), UiErrorCategory::Unknown);
    }
}
