//! Generation endpoint client
//!
//! The backend is consumed purely through its JSON contract:
//! `POST /generate` with `{"prompt": ...}`, answered by a token-annotated
//! body on success or `{"detail": ...}` on failure.

mod http;


pub use http::HttpGenerationClient;

use crate::annotation::{DecodeError, GenerationResponse};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Message shown when a failure carries no server-provided detail
pub const GENERIC_FAILURE: &str = "An error occurred.";

/// Errors that can occur when talking to the generation endpoint
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response decoding failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Server returned HTTP {0}")]
    Status(u16),

    #[error("Server returned HTTP {status}: {detail}")]
    Server { status: u16, detail: String },
}

impl ClientError {
    /// Message to put in front of the user
    ///
    /// The server's `detail` is used verbatim; everything else, including an
    /// empty detail, gets the generic message.
    pub fn user_message(&self) -> &str {
        match self {
            ClientError::Server { detail, .. } if !detail.is_empty() => detail,
            _ => GENERIC_FAILURE,
        }
    }

    /// The request never produced a usable answer from the server
    pub fn is_transport(&self) -> bool {
        !matches!(self, ClientError::Server { .. })
    }
}

/// Request body for `/generate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Anything that can turn a prompt into a generation response
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Submit a prompt and decode the response
    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationResponse, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_uses_detail_verbatim() {
        let err = ClientError::Server {
            status: 400,
            detail: "prompt too long".to_string(),
        };
        assert_eq!(err.user_message(), "prompt too long");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_user_message_generic_otherwise() {
        let err = ClientError::Status(502);
        assert_eq!(err.user_message(), GENERIC_FAILURE);
        assert!(err.is_transport());

        let decode = GenerationResponse::from_json("<html>").unwrap_err();
        let err = ClientError::from(decode);
        assert_eq!(err.user_message(), GENERIC_FAILURE);

        let blank = ClientError::Server {
            status: 400,
            detail: String::new(),
        };
        assert_eq!(blank.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_request_serializes_prompt() {
        let body = serde_json::to_string(&GenerationRequest::new("The sky is")).unwrap();
        assert_eq!(body, r#"{"prompt":"The sky is"}"#);
    }
}
