//! Documentation-only models for the admin CRUD surface.
//!
//! The generic resource controller works on raw JSON bodies and query strings, so these types
//! describe its wire format for the OpenAPI spec.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::errors::FieldErrors;

/// Query parameters accepted by every admin list endpoint.
///
/// Resource-specific filter keys (e.g. `status`, `category`) may be added; repeat a key or use
/// `key[]` to match any of several values.
#[derive(Debug, Deserialize, IntoParams)]
#[allow(unused)]
pub struct AdminListQuery {
    /// Page number, starting at 1
    #[param(default = 1, minimum = 1)]
    pub page: Option<u64>,

    /// Items per page (default: 15, max: 100)
    #[param(default = 15, minimum = 1, maximum = 100)]
    pub per_page: Option<u64>,

    /// Field to sort by; letters, digits and underscores only
    #[param(default = "created_at")]
    pub sort_field: Option<String>,

    /// `asc` or `desc`
    #[param(default = "desc")]
    pub sort_direction: Option<String>,
}

/// Body of a bulk delete request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"ids": ["0b6d8c52-8f0e-4f55-9f7c-2d1f4a3c9e10"]}))]
pub struct BulkDeleteRequest {
    /// IDs to delete. Unknown or malformed IDs are skipped.
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkDeleteResult {
    pub deleted_count: u64,
}

/// Envelope returned by failed operations and by deletes.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "success": false,
    "message": "Validation failed",
    "data": null,
    "errors": {"title": ["News title is required."]}
}))]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    /// Always null
    pub data: Option<Value>,
    /// Field name to messages, present on validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}
