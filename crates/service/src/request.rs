use serde::{Deserialize, Serialize};
use serde_json::Value;

use depot_auth::Token;
use depot_core::Fields;

/// Inbound call as handed over by the transport layer.
///
/// Built once per call and never mutated by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub token: Token,
    #[serde(default)]
    pub query: Fields,
    #[serde(default)]
    pub params: Fields,
    #[serde(default)]
    pub body: Value,
}

impl Request {
    pub fn new(token: Token) -> Self {
        Self {
            token,
            ..Self::default()
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// The slices a validator is allowed to see (never the token).
    pub fn raw(&self) -> RawInput<'_> {
        RawInput {
            query: &self.query,
            params: &self.params,
            body: &self.body,
        }
    }
}

/// Borrowed `{ query, params, body }` view passed to validators.
#[derive(Debug, Copy, Clone)]
pub struct RawInput<'a> {
    pub query: &'a Fields,
    pub params: &'a Fields,
    pub body: &'a Value,
}
