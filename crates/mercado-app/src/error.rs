//! # Application Errors
//!
//! What a command handler returns, and the serializable shape an outer API
//! layer sends to its callers.
//!
//! ```text
//! CoreError ──────┐
//!                 ├──► AppError ──► ErrorResponse { code, message, field, errors[] }
//! DbError ────────┘
//!   (UNIQUE on sales.sale_number becomes Core(DuplicateSaleNumber))
//! ```
//!
//! Core errors pass through untouched, so callers can still match on
//! [`CoreError`] and [`ErrorKind`].

use mercado_core::{CoreError, ErrorKind};
use mercado_db::DbError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Column carrying the unique sale number constraint.
const SALE_NUMBER_COLUMN: &str = "sales.sale_number";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store failed for a reason the domain does not model.
    #[error("Storage error: {0}")]
    Storage(DbError),

    /// The caller gave up before the command finished.
    #[error("Operation was cancelled")]
    Cancelled,
}

impl AppError {
    /// The domain classification, when there is one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::Core(err) => Some(err.kind()),
            AppError::Storage(_) | AppError::Cancelled => None,
        }
    }

    /// Maps a storage error on a sale write, naming the sale number on a
    /// unique index violation.
    pub fn from_sale_write(err: DbError, sale_number: &str) -> Self {
        if err.is_unique_violation_on(SALE_NUMBER_COLUMN) {
            return AppError::Core(CoreError::DuplicateSaleNumber(sale_number.to_string()));
        }
        AppError::from(err)
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation { ref field, ref value } if field == SALE_NUMBER_COLUMN => {
                AppError::Core(CoreError::DuplicateSaleNumber(value.clone()))
            }
            other => AppError::Storage(other),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

// =============================================================================
// Error Response
// =============================================================================

/// Error codes for the outer API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Validation,
    NotFound,
    Conflict,
    DomainInvariant,
    Cancelled,
    InternalError,
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation => ErrorCode::Validation,
            ErrorKind::NotFound => ErrorCode::NotFound,
            ErrorKind::Conflict => ErrorCode::Conflict,
            ErrorKind::DomainInvariant => ErrorCode::DomainInvariant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Serializable error, one per failed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        match err {
            AppError::Core(core) => {
                let errors = match core {
                    CoreError::Validation(list) => list
                        .iter()
                        .map(|e| FieldError {
                            field: e.field().to_string(),
                            message: e.to_string(),
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                ErrorResponse {
                    code: core.kind().into(),
                    message: core.to_string(),
                    field: core.field().map(str::to_string),
                    errors,
                }
            }
            AppError::Storage(db) => {
                // Storage details stay in the log.
                error!(error = %db, "Storage failure");
                ErrorResponse {
                    code: ErrorCode::InternalError,
                    message: "Internal storage error".to_string(),
                    field: None,
                    errors: Vec::new(),
                }
            }
            AppError::Cancelled => ErrorResponse {
                code: ErrorCode::Cancelled,
                message: err.to_string(),
                field: None,
                errors: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mercado_core::{EntityKind, ValidationError, ValidationErrors};
    use uuid::Uuid;

    #[test]
    fn test_duplicate_sale_number_becomes_conflict() {
        let err = AppError::from(DbError::duplicate("sales.sale_number", "1001"));
        assert_eq!(err.kind(), Some(ErrorKind::Conflict));

        let err = AppError::from_sale_write(DbError::duplicate("sales.sale_number", "unknown"), "1002");
        match err {
            AppError::Core(CoreError::DuplicateSaleNumber(number)) => assert_eq!(number, "1002"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_other_db_errors_stay_storage() {
        let err = AppError::from(DbError::duplicate("products.product_code", "X"));
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(err.kind(), None);
    }

    #[test]
    fn test_validation_response_lists_every_field() {
        let errors = ValidationErrors::from(vec![
            ValidationError::Required {
                field: "sale_number".into(),
            },
            ValidationError::MustBePositive {
                field: "items[0].quantity".into(),
            },
        ]);
        let response = ErrorResponse::from(&AppError::Core(errors.into()));

        assert_eq!(response.code, ErrorCode::Validation);
        assert_eq!(response.field, None);
        let fields: Vec<_> = response.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["sale_number", "items[0].quantity"]);
    }

    #[test]
    fn test_response_json_shape() {
        let id = Uuid::new_v4();
        let response = ErrorResponse::from(&AppError::Core(CoreError::not_found(EntityKind::Sale, id)));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], format!("Sale not found: {id}"));
        assert!(json.get("field").is_none());
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_storage_details_hidden() {
        let response = ErrorResponse::from(&AppError::Storage(DbError::QueryFailed("disk I/O".into())));
        assert_eq!(response.code, ErrorCode::InternalError);
        assert!(!response.message.contains("disk"));
    }
}
