//! `depot-core`: shared building blocks.
//!
//! This crate contains identifiers, the resource catalogue and the record
//! shapes exchanged between the service layer and its repositories (no
//! infrastructure concerns).

pub mod error;
pub mod id;
pub mod record;
pub mod resource;

pub use error::InvalidId;
pub use id::{PrincipalId, RecordId};
pub use record::{Fields, Link, Linked, Record};
pub use resource::{Association, AssociationKind, Resource};
