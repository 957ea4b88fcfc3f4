use crate::api::envelope;
use crate::db::{errors::DbError, models::Entity};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

/// Field name to validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Malformed request parameters
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Request payload failed field validation
    #[error("Validation failed")]
    ValidationFailed { errors: FieldErrors },

    /// Payload is well-formed but breaks a domain rule
    #[error("{message}")]
    DomainRuleViolation { message: String },

    /// Storage operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn not_found<E: Entity>(id: impl ToString) -> Self {
        Error::NotFound {
            resource: E::NAME.to_string(),
            id: id.to_string(),
        }
    }

    pub fn rule(message: impl Into<String>) -> Self {
        Error::DomainRuleViolation { message: message.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::Database(DbError::NotFound))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } | Error::DomainRuleViolation { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::UniqueViolation { .. } => StatusCode::CONFLICT,
                DbError::InvalidDocument { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } | Error::DomainRuleViolation { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::ValidationFailed { .. } => "Validation failed".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "Resource not found".to_string(),
                DbError::UniqueViolation { field, .. } => match field {
                    Some(field) => format!("The {field} is already taken"),
                    None => "Resource already exists".to_string(),
                },
                DbError::InvalidDocument { message } => format!("Invalid data: {message}"),
                DbError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }

    /// Log full error details, at a level matching severity
    pub fn log(&self) {
        match self {
            Error::Database(DbError::Other(_)) | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::DomainRuleViolation { .. } => {
                tracing::info!("Domain rule violation: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::ValidationFailed { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.log();

        match self {
            Error::ValidationFailed { errors } => envelope::validation_error(errors).into_response(),
            err if err.is_not_found() => envelope::not_found(envelope::NOT_FOUND).into_response(),
            err => envelope::error(err.user_message(), err.status_code(), None).into_response(),
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
