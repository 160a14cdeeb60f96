//! # Error Types
//!
//! Domain-specific error types for mercado-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mercado-core errors (this file)                                       │
//! │  ├── CoreError          - Domain failures, classified by ErrorKind     │
//! │  ├── ValidationErrors   - Every rule failure of one command            │
//! │  └── ValidationError    - A single field/message pair                  │
//! │                                                                         │
//! │  mercado-db errors (separate crate)                                    │
//! │  └── DbError            - Database operation failures                  │
//! │                                                                         │
//! │  mercado-app errors                                                    │
//! │  └── AppError           - What a handler returns                       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → ErrorResponse          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Error Kind
// =============================================================================

/// The four failure classes every caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Command failed declarative rule checks. Nothing was mutated.
    Validation,
    /// Target id did not resolve.
    NotFound,
    /// Uniqueness violation or operation against a terminal-state entity.
    Conflict,
    /// Structural business rule violated (e.g. more than 20 units).
    DomainInvariant,
}

/// Entity kinds carried by NotFound/Conflict errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Sale,
    SaleItem,
    Product,
    Branch,
    Customer,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Sale => "Sale",
            EntityKind::SaleItem => "SaleItem",
            EntityKind::Product => "Product",
            EntityKind::Branch => "Branch",
            EntityKind::Customer => "Customer",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// One or more validation rules failed (all failures are collected).
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Entity id did not resolve.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: Uuid },

    /// Operation attempted against an entity in a state that forbids it.
    ///
    /// ## When This Occurs
    /// - Updating or cancelling an already cancelled sale
    /// - Cancelling an already cancelled sale item
    /// - Editing a completed sale
    #[error("{entity} {id} {reason}")]
    Conflict {
        entity: EntityKind,
        id: Uuid,
        reason: String,
    },

    /// Sale number already taken by another sale.
    #[error("Sale number '{0}' already exists")]
    DuplicateSaleNumber(String),

    /// More than the maximum number of identical units on one line.
    #[error("Cannot sell more than {max} identical items (requested {requested})")]
    QuantityLimitExceeded { requested: u32, max: u32 },
}

impl CoreError {
    /// Classifies the error for callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) => ErrorKind::Validation,
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Conflict { .. } | CoreError::DuplicateSaleNumber(_) => ErrorKind::Conflict,
            CoreError::QuantityLimitExceeded { .. } => ErrorKind::DomainInvariant,
        }
    }

    /// Field the error is attached to, when there is exactly one.
    pub fn field(&self) -> Option<&str> {
        match self {
            CoreError::QuantityLimitExceeded { .. } => Some("quantity"),
            CoreError::DuplicateSaleNumber(_) => Some("sale_number"),
            CoreError::Validation(errors) if errors.len() == 1 => {
                errors.iter().next().map(ValidationError::field)
            }
            _ => None,
        }
    }

    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        CoreError::NotFound { entity, id }
    }

    pub fn conflict(entity: EntityKind, id: Uuid, reason: impl Into<String>) -> Self {
        CoreError::Conflict {
            entity,
            id,
            reason: reason.into(),
        }
    }
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(ValidationErrors::from(vec![err]))
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::Validation(errors)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single failed rule, always attached to a field path
/// such as `sale_items[2].unit_price`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: String, max: String },

    /// Value must be greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. non-numeric sale number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Timestamp lies in the future.
    #[error("{field} cannot be in the future")]
    InFuture { field: String },

    /// Catch-all for rules whose message is specific to the rule.
    #[error("{field}: {message}")]
    Rule { field: String, message: String },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::InFuture { field }
            | ValidationError::Rule { field, .. } => field,
        }
    }
}

// =============================================================================
// Validation Errors (collection)
// =============================================================================

/// Every failure of one command, in rule evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: ValidationError) {
        self.0.push(err);
    }

    /// Records the error of a rule, if any.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            self.0.push(err);
        }
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// True if any failure is attached to `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }

    /// `Ok(())` when nothing failed, otherwise the whole collection.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        ValidationErrors(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        f.write_str(&joined.join("; "))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================
