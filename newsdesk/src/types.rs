//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases for better readability at call sites:
//!
//! - [`EntityId`]: identifier of any stored record
//! - [`ArticleId`]: news article identifier
//! - [`CategoryId`]: news category identifier
//! - [`CommentId`]: article comment identifier
//!
//! # Utility Functions
//!
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging
//! - [`parse_id`]: Parse a path segment into an [`EntityId`]

use uuid::Uuid;

// Type aliases for IDs
pub type EntityId = Uuid;
pub type ArticleId = Uuid;
pub type CategoryId = Uuid;
pub type CommentId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Parse an identifier taken from a URL path or request body.
///
/// Identifiers that are not valid UUIDs cannot name a stored record, so callers treat `None` the
/// same as a missing record.
pub fn parse_id(raw: &str) -> Option<EntityId> {
    Uuid::parse_str(raw.trim()).ok()
}
