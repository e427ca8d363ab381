use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::credentials::CredentialKind;

/// Status code used for requests abandoned through a cancellation token.
pub const CANCELLED_STATUS: u16 = 499;

/// The single error shape observed above [`RequestGateway`](crate::RequestGateway).
///
/// Built either from a structured backend payload or synthesized from the
/// HTTP status, a transport failure or a body that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("HTTP {status_code}: {message}")]
pub struct ApiError {
    pub status_code: u16,
    pub message: String,
    pub field_errors: Option<Vec<FieldError>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(default)]
    pub error_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 400 with field errors; show the messages next to the fields.
    Validation,
    /// 401; credentials were cleared and the user sent to log in.
    Auth,
    Forbidden,
    Cancelled,
    /// 5xx, including transport and parse failures.
    Server,
    Unknown,
}

impl ApiError {
    #[must_use]
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            field_errors: None,
        }
    }

    #[must_use]
    pub fn with_field_errors(mut self, field_errors: Vec<FieldError>) -> Self {
        self.field_errors = if field_errors.is_empty() {
            None
        } else {
            Some(field_errors)
        };
        self
    }

    /// Network failure or any other exception raised while executing a call.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(CANCELLED_STATUS, "Request cancelled")
    }

    #[must_use]
    pub fn kind(&self) -> ApiErrorKind {
        match self.status_code {
            400 if self.field_errors.as_ref().is_some_and(|f| !f.is_empty()) => {
                ApiErrorKind::Validation
            }
            401 => ApiErrorKind::Auth,
            403 => ApiErrorKind::Forbidden,
            CANCELLED_STATUS => ApiErrorKind::Cancelled,
            500..=599 => ApiErrorKind::Server,
            _ => ApiErrorKind::Unknown,
        }
    }

    /// Validation message for `field`, if the backend reported one.
    #[must_use]
    pub fn field_message(&self, field: &str) -> Option<&str> {
        self.field_errors
            .as_deref()?
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

/// Failures of a [`CredentialStore`](crate::CredentialStore) backend.
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("credential store I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("credential store at {path} is not valid JSON: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0:?} credentials are not kept in the credential store")]
    NotStorable(CredentialKind),
}

/// Failure looking up the federated session.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}
