//! Client-side error types

use shared::ErrorResponse;
use thiserror::Error;

/// Failure talking to the warehouse API
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Build an `Api` error from a response body, extracting the server's
    /// message when the body is the standard error envelope
    pub fn from_error_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_default();
        ClientError::Api { status, message }
    }

    /// Message to show the user: the server's own text, or `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Why a form did not submit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// Caught before anything was sent
    #[error("{0}")]
    Invalid(String),

    /// The server refused the submission
    #[error("{0}")]
    Rejected(String),
}

impl FormError {
    pub fn message(&self) -> &str {
        match self {
            FormError::Invalid(message) | FormError::Rejected(message) => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_extracted() {
        let err = ClientError::from_error_body(
            409,
            r#"{"error":{"code":"DUPLICATE_ENTRY","message":"Phone number already exists."}}"#,
        );
        assert_eq!(err.user_message("Submission failed"), "Phone number already exists.");
    }

    #[test]
    fn test_fallback_for_unreadable_body() {
        let err = ClientError::from_error_body(502, "<html>Bad Gateway</html>");
        assert_eq!(err.user_message("Submission failed"), "Submission failed");

        let decode = ClientError::Decode("missing field `client`".to_string());
        assert_eq!(decode.user_message("Error accepting stock"), "Error accepting stock");
    }
}
