use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::TimerId;

/// Errors surfaced by the gateway client and the synchronization store.
#[derive(Debug, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("server error ({status}): {message}")]
    Server { status: StatusCode, message: String },
    #[error("failed to parse {call} response: {source}")]
    Decode {
        call: String,
        #[source]
        source: serde_json::Error,
    },
    /// An elapsed-time edit cannot be reconciled without a cached snapshot.
    #[error("timer {0} is not loaded; refresh the project before editing its duration")]
    MissingSnapshot(TimerId),
    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Map a non-success status and the backend's message to an error kind.
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Error::Validation(message)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized(message),
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::CONFLICT => Error::Conflict(message),
            _ => Error::Server { status, message },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_taxonomy() {
        let cases = [
            (StatusCode::BAD_REQUEST, "Validation"),
            (StatusCode::UNPROCESSABLE_ENTITY, "Validation"),
            (StatusCode::UNAUTHORIZED, "Unauthorized"),
            (StatusCode::FORBIDDEN, "Unauthorized"),
            (StatusCode::NOT_FOUND, "NotFound"),
            (StatusCode::CONFLICT, "Conflict"),
            (StatusCode::BAD_GATEWAY, "Server"),
        ];
        for (status, expected) in cases {
            let kind = match Error::from_status(status, "msg".to_string()) {
                Error::Validation(_) => "Validation",
                Error::Unauthorized(_) => "Unauthorized",
                Error::NotFound(_) => "NotFound",
                Error::Conflict(_) => "Conflict",
                Error::Server { .. } => "Server",
                _ => "other",
            };
            assert_eq!(kind, expected, "status {status}");
        }
    }

    #[test]
    fn messages_pass_through_unchanged() {
        let err = Error::from_status(StatusCode::UNAUTHORIZED, "Неверный пароль".to_string());
        assert_eq!(err.to_string(), "Неверный пароль");
        assert!(err.is_unauthorized());
    }
}
