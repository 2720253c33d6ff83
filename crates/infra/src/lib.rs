//! Infrastructure layer: schema, request validation and storage adapters.

pub mod schema;
pub mod store;
pub mod validation;

pub use store::{InMemoryBelongsToMany, InMemoryDatabase, InMemoryHasMany, InMemoryRepository};
pub use validation::SchemaValidator;
