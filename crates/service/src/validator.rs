//! Validator collaborator contract.

use async_trait::async_trait;
use thiserror::Error;

use depot_core::{Fields, RecordId};

use crate::{Operation, RawInput};

/// Checks and normalizes the raw input of one operation.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, operation: Operation, raw: RawInput<'_>) -> Result<Normalized, ValidationError>;
}

/// Input rejected by a validator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub violations: Vec<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            violations: vec![message.clone()],
            message,
        }
    }

    /// One error summarizing every violation, in order.
    pub fn from_violations(violations: Vec<String>) -> Self {
        Self {
            message: violations.join("; "),
            violations,
        }
    }
}

/// Cleaned and coerced input of one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub query: QueryOptions,
    pub params: PathParams,
    /// Field values (create/update) or join attributes (association add/update).
    pub body: Fields,
    /// Child ids of an association add.
    pub ids: Vec<RecordId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    pub id: Option<RecordId>,
    pub child_id: Option<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

/// Options forwarded verbatim to repository calls.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub limit: Option<usize>,
    pub offset: usize,
    pub sort: Option<Sort>,
    /// Equality filters on record fields.
    pub filters: Fields,
    /// Hide soft-deleted rows from lookups.
    pub paranoid: bool,
    /// Destroy irreversibly instead of soft-deleting.
    pub force: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: None,
            offset: 0,
            sort: None,
            filters: Fields::new(),
            paranoid: true,
            force: false,
        }
    }
}
