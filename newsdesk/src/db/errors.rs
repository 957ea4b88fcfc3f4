use thiserror::Error;

/// Unified error type for storage operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        /// The document field whose value collided, when known
        field: Option<String>,
        message: String,
    },

    /// The merged data does not form a valid entity document
    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    pub fn unique_violation(field: &str) -> Self {
        DbError::UniqueViolation {
            field: Some(field.to_string()),
            message: format!("duplicate value for unique field '{field}'"),
        }
    }
}

/// Convert from sqlx::Error using proper sqlx error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::UniqueViolation {
                    field: db_err.constraint().and_then(field_from_constraint),
                    message: db_err.message().to_string(),
                }
            }
            // All other sqlx errors are non-recoverable - convert to anyhow with context
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Unique indexes on document fields are named `records_<field>_unique`.
fn field_from_constraint(constraint: &str) -> Option<String> {
    constraint
        .strip_prefix("records_")
        .and_then(|rest| rest.strip_suffix("_unique"))
        .filter(|field| !field.is_empty())
        .map(str::to_string)
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::InvalidDocument { message: err.to_string() }
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_constraint() {
        assert_eq!(field_from_constraint("records_slug_unique").as_deref(), Some("slug"));
        assert_eq!(field_from_constraint("records_pkey"), None);
        assert_eq!(field_from_constraint("records__unique"), None);
    }

    #[test]
    fn test_unique_violation_names_field() {
        match DbError::unique_violation("slug") {
            DbError::UniqueViolation { field, .. } => assert_eq!(field.as_deref(), Some("slug")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
