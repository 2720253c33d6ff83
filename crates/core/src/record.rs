//! Stored rows as seen by the service layer.
//!
//! The service layer does not own entity shapes: a record is an id, a bag of
//! validated fields and bookkeeping timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Association, RecordId};

/// Column values of a row, keyed by field name.
pub type Fields = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: Fields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Record {
    pub fn new(fields: Fields, now: DateTime<Utc>) -> Self {
        Self {
            id: RecordId::new(),
            fields,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Overwrite the given fields and bump `updated_at`.
    pub fn merge(&mut self, values: Fields, now: DateTime<Utc>) {
        self.fields.extend(values);
        self.updated_at = now;
    }
}

/// Join row of a many-to-many relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub association: Association,
    pub parent_id: RecordId,
    pub child_id: RecordId,
    #[serde(flatten)]
    pub attributes: Fields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    pub fn new(
        association: Association,
        parent_id: RecordId,
        child_id: RecordId,
        attributes: Fields,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            association,
            parent_id,
            child_id,
            attributes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A child record reached through an association, with its join row when the
/// relationship is many-to-many.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linked {
    #[serde(flatten)]
    pub record: Record,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
}

impl Linked {
    pub fn direct(record: Record) -> Self {
        Self { record, link: None }
    }

    pub fn through(record: Record, link: Link) -> Self {
        Self {
            record,
            link: Some(link),
        }
    }
}
