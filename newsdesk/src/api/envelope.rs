//! The uniform response envelope.
//!
//! Every endpoint answers with `{success, message, data, errors?}`. `data` is always present
//! (possibly `null`); `errors` only appears when there are field errors to report.

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::FieldErrors;

pub const SUCCESS: &str = "Success";
pub const NOT_FOUND: &str = "Resource not found";
pub const VALIDATION_FAILED: &str = "Validation failed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

/// Status code plus envelope, ready to return from a handler.
pub type Reply<T> = (StatusCode, Json<Envelope<T>>);

pub fn success<T: Serialize>(data: T, message: impl Into<String>, status: StatusCode) -> Reply<T> {
    (
        status,
        Json(Envelope {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        }),
    )
}

/// Success with `data: null`.
pub fn done(message: impl Into<String>) -> Reply<()> {
    (
        StatusCode::OK,
        Json(Envelope {
            success: true,
            message: message.into(),
            data: None,
            errors: None,
        }),
    )
}

pub fn error(message: impl Into<String>, status: StatusCode, errors: Option<FieldErrors>) -> Reply<()> {
    (
        status,
        Json(Envelope {
            success: false,
            message: message.into(),
            data: None,
            errors,
        }),
    )
}

pub fn not_found(message: impl Into<String>) -> Reply<()> {
    error(message, StatusCode::NOT_FOUND, None)
}

pub fn validation_error(errors: FieldErrors) -> Reply<()> {
    error(VALIDATION_FAILED, StatusCode::UNPROCESSABLE_ENTITY, Some(errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let (status, Json(body)) = success(json!({"id": 1}), SUCCESS, StatusCode::OK);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"success": true, "message": "Success", "data": {"id": 1}})
        );
    }

    #[test]
    fn test_error_without_errors_omits_key() {
        let (status, Json(body)) = error("Bad", StatusCode::BAD_REQUEST, None);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"success": false, "message": "Bad", "data": null})
        );
    }

    #[test]
    fn test_not_found_and_validation() {
        let (status, Json(body)) = not_found(NOT_FOUND);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "Resource not found");

        let errors = FieldErrors::from([("title".to_string(), vec!["The title field is required.".to_string()])]);
        let (status, Json(body)) = validation_error(errors);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({
                "success": false,
                "message": "Validation failed",
                "data": null,
                "errors": {"title": ["The title field is required."]}
            })
        );
    }

    #[test]
    fn test_done_has_null_data() {
        let (_, Json(body)) = done("Resource deleted successfully");
        assert_eq!(serde_json::to_value(body).unwrap()["data"], json!(null));
    }
}
