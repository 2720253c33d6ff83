//! Repository collaborator contracts.
//!
//! Implementations wrap a persistence engine; the service layer only sees
//! these traits. Every call may fail with a [`RepositoryError`] whose kind,
//! not its message, decides how the failure is reported.

use async_trait::async_trait;
use thiserror::Error;

use depot_core::{Fields, Link, Linked, Record, RecordId};

use crate::QueryOptions;

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Data access for one resource.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn find_all(&self, options: &QueryOptions) -> RepoResult<Vec<Record>>;

    async fn create(&self, values: Fields) -> RepoResult<Record>;

    /// `Ok(None)` when no (visible) row has this id.
    async fn find_by_pk(&self, id: RecordId, options: &QueryOptions) -> RepoResult<Option<Record>>;

    async fn update(&self, record: &Record, values: Fields) -> RepoResult<Record>;

    /// Soft-deletes unless `options.force` is set.
    async fn destroy(&self, record: &Record, options: &QueryOptions) -> RepoResult<Record>;
}

/// Data access for one relationship, always relative to a resolved parent.
#[async_trait]
pub trait AssociationRepository: Send + Sync {
    async fn list(&self, parent: &Record, options: &QueryOptions) -> RepoResult<Vec<Linked>>;

    /// Attach `ids` to `parent`; `through` holds join attributes (many-to-many).
    async fn add(&self, parent: &Record, ids: &[RecordId], through: Fields) -> RepoResult<Vec<Linked>>;

    async fn get(&self, parent: &Record, child_id: RecordId, options: &QueryOptions) -> RepoResult<Option<Linked>>;

    /// Update the child record itself (one-to-many).
    async fn update_child(&self, child: &Record, values: Fields) -> RepoResult<Record>;

    /// Update the join row (many-to-many).
    async fn update_link(&self, link: &Link, values: Fields) -> RepoResult<Link>;

    async fn remove(&self, parent: &Record, child: &Linked) -> RepoResult<Linked>;
}

/// Failure classes a repository reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    ConnectionRefused,
    ConnectionReset,
    ConnectionLost,
    Timeout,
    PoolExhausted,
    /// The store is unusable for another reason (e.g. poisoned state).
    Unavailable,
    UniqueViolation,
    ForeignKey,
    Constraint,
    Query,
    Other,
}

impl RepositoryErrorKind {
    /// Infrastructure faults that mean "the store could not be reached".
    pub const fn is_unavailable(self) -> bool {
        matches!(
            self,
            RepositoryErrorKind::ConnectionRefused
                | RepositoryErrorKind::ConnectionReset
                | RepositoryErrorKind::ConnectionLost
                | RepositoryErrorKind::Timeout
                | RepositoryErrorKind::PoolExhausted
                | RepositoryErrorKind::Unavailable
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RepositoryErrorKind::ConnectionRefused => "connection_refused",
            RepositoryErrorKind::ConnectionReset => "connection_reset",
            RepositoryErrorKind::ConnectionLost => "connection_lost",
            RepositoryErrorKind::Timeout => "timeout",
            RepositoryErrorKind::PoolExhausted => "pool_exhausted",
            RepositoryErrorKind::Unavailable => "unavailable",
            RepositoryErrorKind::UniqueViolation => "unique_violation",
            RepositoryErrorKind::ForeignKey => "foreign_key",
            RepositoryErrorKind::Constraint => "constraint",
            RepositoryErrorKind::Query => "query",
            RepositoryErrorKind::Other => "other",
        }
    }
}

impl core::fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct RepositoryError {
    pub kind: RepositoryErrorKind,
    pub message: String,
}

impl RepositoryError {
    pub fn new(kind: RepositoryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unique(message: impl Into<String>) -> Self {
        Self::new(RepositoryErrorKind::UniqueViolation, message)
    }

    pub fn foreign_key(message: impl Into<String>) -> Self {
        Self::new(RepositoryErrorKind::ForeignKey, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(RepositoryErrorKind::Unavailable, message)
    }

    pub fn is_unavailable(&self) -> bool {
        self.kind.is_unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_class_is_unavailable() {
        assert!(RepositoryError::new(RepositoryErrorKind::ConnectionReset, "reset by peer").is_unavailable());
        assert!(RepositoryError::new(RepositoryErrorKind::Timeout, "slow").is_unavailable());
        assert!(!RepositoryError::unique("name taken").is_unavailable());
        assert!(!RepositoryError::new(RepositoryErrorKind::Other, "connection reset").is_unavailable());
    }

    #[test]
    fn display_includes_kind() {
        let err = RepositoryError::foreign_key("stock 123 does not exist");
        assert_eq!(err.to_string(), "foreign_key: stock 123 does not exist");
    }
}
