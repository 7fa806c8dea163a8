use std::io;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("{}", transport_message(*status, message))]
    Transport {
        status: Option<u16>,
        message: String,
    },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("ticket {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Io(Arc<io::Error>),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(Arc::new(err))
    }
}

impl AppError {
    pub fn transport(message: impl Into<String>) -> Self {
        AppError::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        AppError::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

fn transport_message(status: Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("transport error: backend responded with {code}: {message}"),
        None => format!("transport error: {message}"),
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_transport_with_status() {
        let err = AppError::http_status(503, "unavailable");
        assert_eq!(
            err.to_string(),
            "transport error: backend responded with 503: unavailable"
        );
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn formats_transport_without_status() {
        let err = AppError::transport("connection refused");
        assert_eq!(err.to_string(), "transport error: connection refused");
        assert_eq!(err.status(), None);
        assert!(!err.is_validation());
    }
}
