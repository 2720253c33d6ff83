//! Identifier parse errors.

use thiserror::Error;

/// An identifier failed to parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {kind} '{value}': {reason}")]
pub struct InvalidId {
    pub kind: &'static str,
    pub value: String,
    pub reason: String,
}

impl InvalidId {
    pub fn new(kind: &'static str, value: impl Into<String>, reason: impl core::fmt::Display) -> Self {
        Self {
            kind,
            value: value.into(),
            reason: reason.to_string(),
        }
    }
}
