//! Uniform result shape of every service operation.

use serde::{Deserialize, Serialize};

use depot_core::{Linked, Record};

use crate::{ErrorCode, ErrorKind};

/// Error details carried by a failed envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>, code: Option<ErrorCode>) -> Self {
        Self {
            name: kind.name().to_string(),
            message: message.into(),
            status: kind.status(),
            code,
        }
    }

    /// The subset of fields that may leave a production deployment.
    pub fn redacted(&self) -> RedactedError {
        RedactedError {
            message: self.message.clone(),
            code: self.code.clone(),
            status: self.status,
        }
    }
}

/// Production view of an [`ErrorInfo`]: exactly `message`, `code`, `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedError {
    pub message: String,
    pub code: Option<ErrorCode>,
    pub status: u16,
}

/// Data produced by a successful operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Record(Record),
    Records(Vec<Record>),
    Linked(Linked),
    LinkedMany(Vec<Linked>),
}

/// `{ success, data, error }`. Exactly one of `data` / `error` is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    outcome: Result<T, ErrorInfo>,
}

#[derive(Serialize)]
struct EnvelopeRepr<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ErrorInfo>,
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EnvelopeRepr {
            success: self.success(),
            data: self.data(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self { outcome: Ok(data) }
    }

    pub fn err(error: ErrorInfo) -> Self {
        Self { outcome: Err(error) }
    }

    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn data(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.outcome.as_ref().err()
    }

    /// HTTP-style status: the error's status, or 200 on success.
    pub fn status(&self) -> u16 {
        self.error().map_or(200, |e| e.status)
    }

    pub fn into_result(self) -> Result<T, ErrorInfo> {
        self.outcome
    }
}
