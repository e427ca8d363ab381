//! The `{ data, hasError, errorData }` envelope handed to front ends.

use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    pub message: String,
    pub status_code: u16,
    /// First field the backend rejected, if any.
    pub error_field: Option<String>,
}

impl From<&ApiError> for ErrorData {
    fn from(err: &ApiError) -> Self {
        Self {
            message: err.message.clone(),
            status_code: err.status_code,
            error_field: err
                .field_errors
                .as_ref()
                .and_then(|fields| fields.first())
                .map(|f| f.field.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub has_error: bool,
    pub error_data: Option<ErrorData>,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn success(data: Option<T>) -> Self {
        Self {
            data,
            has_error: false,
            error_data: None,
        }
    }

    #[must_use]
    pub fn failure(err: &ApiError) -> Self {
        Self {
            data: None,
            has_error: true,
            error_data: Some(ErrorData::from(err)),
        }
    }
}

impl<T> From<Result<Option<T>, ApiError>> for ApiResponse<T> {
    fn from(result: Result<Option<T>, ApiError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(&err),
        }
    }
}
