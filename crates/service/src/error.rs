//! Error taxonomy of the service layer.
//!
//! Two channels exist: [`ConfigError`] is returned once, when a service is
//! built; everything that goes wrong while an operation runs becomes an
//! [`crate::ErrorInfo`] inside the envelope.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use depot_core::{Association, Resource};

use crate::Operation;

/// Failure classes an operation can end in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AccessDenied,
    ValidationFailed,
    NotFound,
    /// The backing store could not be reached (connection/timeout class).
    UpstreamUnavailable,
    /// The backing store rejected the call.
    Repository,
    /// A collaborator the operation needs was never wired into the service.
    NotWired,
}

impl ErrorKind {
    pub const fn status(self) -> u16 {
        match self {
            ErrorKind::AccessDenied => 403,
            ErrorKind::ValidationFailed => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::UpstreamUnavailable => 502,
            ErrorKind::Repository | ErrorKind::NotWired => 500,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ErrorKind::AccessDenied => "AccessDeniedError",
            ErrorKind::ValidationFailed => "ValidationError",
            ErrorKind::NotFound => "NotFoundError",
            ErrorKind::UpstreamUnavailable => "UpstreamUnavailableError",
            ErrorKind::Repository => "RepositoryError",
            ErrorKind::NotWired => "ServiceNotWiredError",
        }
    }
}

/// Pipeline step at which an operation failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    Authorize,
    Validate,
    FindParent,
    ParentMissing,
    FindChild,
    ChildMissing,
    Action,
    Wiring,
}

impl Step {
    pub const fn ordinal(self) -> u8 {
        match self {
            Step::Authorize => 1,
            Step::Validate => 2,
            Step::FindParent => 3,
            Step::ParentMissing => 4,
            Step::FindChild => 5,
            Step::ChildMissing => 6,
            Step::Action => 7,
            Step::Wiring => 8,
        }
    }
}

/// Stable code identifying `(resource, operation, step)`, e.g. `C05H03-04`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(String);

impl ErrorCode {
    pub fn new(resource: Resource, operation: Operation, step: Step) -> Self {
        Self(format!(
            "C{:02}H{:02}-{:02}",
            resource.ordinal(),
            operation.ordinal(),
            step.ordinal()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Invalid service wiring, detected when the service is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("service for '{0}' was built without any collaborator")]
    NoCollaborators(Resource),

    #[error("association '{association}' does not belong to '{resource}'")]
    ForeignAssociation {
        resource: Resource,
        association: Association,
    },
}
