//! Service layer.
//!
//! One [`Service`] per resource turns a [`Request`] into an [`Envelope`] by
//! running a fixed pipeline (authorize, validate, resolve parent, resolve
//! child, act) over injected collaborators. Storage and validation are
//! traits; this crate has no I/O of its own.

pub mod catalogue;
pub mod envelope;
pub mod error;
pub mod operation;
pub mod repository;
pub mod request;
pub mod service;
pub mod validator;

pub use envelope::{Envelope, ErrorInfo, Payload, RedactedError};
pub use error::{ConfigError, ErrorCode, ErrorKind, Step};
pub use operation::Operation;
pub use repository::{AssociationRepository, RepoResult, Repository, RepositoryError, RepositoryErrorKind};
pub use request::{RawInput, Request};
pub use service::{Service, ServiceBuilder};
pub use validator::{Normalized, PathParams, QueryOptions, Sort, ValidationError, Validator};
