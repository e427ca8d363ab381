//! Folds a raw HTTP response into success-with-optional-data or an [`ApiError`].

use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{ApiError, FieldError};

pub(crate) const PARSE_FAILURE_MESSAGE: &str = "Failed to parse response";

#[derive(Debug, PartialEq)]
pub(crate) enum Normalized {
    Success(Option<serde_json::Value>),
    Failure(ApiError),
}

/// Error body as sent by the backend. Every field is optional; `message`
/// may be a single string or a list of strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorPayload {
    #[serde(default)]
    message: Option<serde_json::Value>,
    #[serde(default)]
    field_errors: Option<Vec<FieldError>>,
    #[serde(default)]
    errors: Option<Vec<FieldError>>,
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        let mime = ct.split(';').next().unwrap_or_default().trim();
        mime.eq_ignore_ascii_case("application/json")
            || mime.to_ascii_lowercase().ends_with("+json")
    })
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| format!("Request failed with status {}", status.as_u16()), str::to_owned)
}

pub(crate) fn normalize(status: StatusCode, content_type: Option<&str>, body: &[u8]) -> Normalized {
    if status == StatusCode::NO_CONTENT {
        return Normalized::Success(None);
    }

    if !is_json(content_type) {
        return if status.is_success() {
            Normalized::Success(None)
        } else {
            Normalized::Failure(ApiError::new(status.as_u16(), status_text(status)))
        };
    }

    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) if status.is_success() => Normalized::Success(Some(value)),
        Ok(value) => Normalized::Failure(error_from_payload(status, value)),
        Err(e) if status.is_success() => {
            tracing::warn!(
                status = status.as_u16(),
                error = %e,
                "JSON response body could not be parsed; treating as empty"
            );
            Normalized::Success(None)
        }
        Err(_) => Normalized::Failure(ApiError::new(status.as_u16(), PARSE_FAILURE_MESSAGE)),
    }
}

/// Builds an [`ApiError`] from a non-2xx JSON body.
///
/// The HTTP status is authoritative for `status_code`; the body only
/// contributes the message and field errors.
fn error_from_payload(status: StatusCode, value: serde_json::Value) -> ApiError {
    let payload = match value {
        serde_json::Value::String(message) => ErrorPayload {
            message: Some(serde_json::Value::String(message)),
            ..ErrorPayload::default()
        },
        other => serde_json::from_value::<ErrorPayload>(other).unwrap_or_default(),
    };

    let message = match payload.message {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s,
        Some(serde_json::Value::Array(items)) => {
            let parts: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                })
                .collect();
            if parts.is_empty() {
                status_text(status)
            } else {
                parts.join("; ")
            }
        }
        _ => status_text(status),
    };

    let field_errors = payload
        .field_errors
        .or(payload.errors)
        .unwrap_or_default();

    ApiError::new(status.as_u16(), message).with_field_errors(field_errors)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
