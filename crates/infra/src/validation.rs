//! Schema-driven request validation.
//!
//! [`SchemaValidator`] checks the raw `{ query, params, body }` of an
//! operation against the resource schema and produces the [`Normalized`]
//! options the repositories consume. All violations are collected before the
//! input is rejected, so a client sees every problem at once.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde_json::{Number, Value};

use depot_core::{Fields, RecordId, Resource};
use depot_service::{Normalized, Operation, PathParams, QueryOptions, RawInput, Sort, ValidationError, Validator};

use crate::schema::{self, FieldSpec, FieldType};

pub const MAX_LIMIT: u64 = 1000;
const MAX_STRING_CHARS: usize = 255;

/// Validator for every operation of one resource.
#[derive(Debug, Copy, Clone)]
pub struct SchemaValidator {
    resource: Resource,
}

#[async_trait]
impl Validator for SchemaValidator {
    async fn validate(&self, operation: Operation, raw: RawInput<'_>) -> Result<Normalized, ValidationError> {
        self.check(operation, raw)
    }
}

/// What the body of an operation must look like.
enum BodyRule {
    Empty,
    Create(&'static [FieldSpec]),
    Update(&'static [FieldSpec]),
    Link { extras: &'static [FieldSpec] },
}

impl SchemaValidator {
    pub fn new(resource: Resource) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Synchronous core of [`Validator::validate`].
    pub fn check(&self, operation: Operation, raw: RawInput<'_>) -> Result<Normalized, ValidationError> {
        let mut violations = Vec::new();

        let params = self.params(operation, raw.params, &mut violations);
        let query = self.query(operation, raw.query, &mut violations);
        let (body, ids) = self.body(operation, raw.body, &mut violations);

        if violations.is_empty() {
            Ok(Normalized {
                query,
                params,
                body,
                ids,
            })
        } else {
            Err(ValidationError::from_violations(violations))
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // params
    // ─────────────────────────────────────────────────────────────────────

    fn params(&self, operation: Operation, raw: &Fields, violations: &mut Vec<String>) -> PathParams {
        let mut params = PathParams::default();

        for (key, value) in raw {
            let slot = match key.as_str() {
                "id" if operation.needs_parent() => &mut params.id,
                "child_id" if operation.needs_child() => &mut params.child_id,
                _ => {
                    violations.push(format!("params.{key} is not allowed"));
                    continue;
                }
            };
            match value.as_str().and_then(|s| s.parse::<RecordId>().ok()) {
                Some(id) => *slot = Some(id),
                None => violations.push(format!("params.{key} must be a uuid")),
            }
        }

        if operation.needs_parent() && !raw.contains_key("id") {
            violations.push("params.id is required".to_string());
        }
        if operation.needs_child() && !raw.contains_key("child_id") {
            violations.push("params.child_id is required".to_string());
        }
        params
    }

    // ─────────────────────────────────────────────────────────────────────
    // query
    // ─────────────────────────────────────────────────────────────────────

    /// Resource whose columns a listing of this operation returns.
    fn listed_resource(&self, operation: Operation) -> Option<Resource> {
        match operation {
            Operation::List => Some(self.resource),
            Operation::ListChildren(a) => Some(a.target()),
            _ => None,
        }
    }

    fn query(&self, operation: Operation, raw: &Fields, violations: &mut Vec<String>) -> QueryOptions {
        let mut query = QueryOptions::default();
        let listed = self.listed_resource(operation);

        for (key, value) in raw {
            match (key.as_str(), listed) {
                ("paranoid", _) => match as_bool(value) {
                    Some(b) => query.paranoid = b,
                    None => violations.push("query.paranoid must be a boolean".to_string()),
                },
                ("force", _) if operation == Operation::Delete => match as_bool(value) {
                    Some(b) => query.force = b,
                    None => violations.push("query.force must be a boolean".to_string()),
                },
                ("limit", Some(_)) => match as_u64(value) {
                    Some(n) if (1..=MAX_LIMIT).contains(&n) => query.limit = Some(n as usize),
                    _ => violations.push(format!("query.limit must be between 1 and {MAX_LIMIT}")),
                },
                ("offset", Some(_)) => match as_u64(value) {
                    Some(n) => query.offset = n as usize,
                    None => violations.push("query.offset must be a non-negative integer".to_string()),
                },
                ("sort", Some(resource)) => match parse_sort(resource, value) {
                    Some(sort) => query.sort = Some(sort),
                    None => violations.push(format!("query.sort must name a sortable {resource} field")),
                },
                (name, Some(resource)) => match schema::field(resource, name) {
                    Some(spec) => match coerce_query(spec.ty, value) {
                        Some(v) => {
                            query.filters.insert(name.to_string(), v);
                        }
                        None => violations.push(format!("query.{name} must be {}", spec.ty.describe())),
                    },
                    None => violations.push(format!("query.{name} is not allowed")),
                },
                (name, None) => violations.push(format!("query.{name} is not allowed")),
            }
        }
        query
    }

    // ─────────────────────────────────────────────────────────────────────
    // body
    // ─────────────────────────────────────────────────────────────────────

    fn body_rule(&self, operation: Operation) -> BodyRule {
        match operation {
            Operation::Create => BodyRule::Create(schema::fields(self.resource)),
            Operation::Update => BodyRule::Update(schema::fields(self.resource)),
            Operation::AddChildren(a) => BodyRule::Link {
                extras: schema::join_attributes(a),
            },
            Operation::UpdateChild(a) => BodyRule::Update(schema::child_update_fields(a)),
            _ => BodyRule::Empty,
        }
    }

    fn body(&self, operation: Operation, raw: &Value, violations: &mut Vec<String>) -> (Fields, Vec<RecordId>) {
        let rule = self.body_rule(operation);
        let empty = Fields::new();
        let object = match raw {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                violations.push("body must be an object".to_string());
                return (Fields::new(), Vec::new());
            }
        };

        match rule {
            BodyRule::Empty => {
                if !object.is_empty() {
                    violations.push("body is not allowed".to_string());
                }
                (Fields::new(), Vec::new())
            }
            BodyRule::Create(specs) => {
                for spec in specs.iter().filter(|s| s.required) {
                    if !object.contains_key(spec.name) {
                        violations.push(format!("body.{} is required", spec.name));
                    }
                }
                (check_fields(specs, object, violations), Vec::new())
            }
            BodyRule::Update(specs) => {
                if object.is_empty() {
                    violations.push("body must contain at least one field".to_string());
                }
                (check_fields(specs, object, violations), Vec::new())
            }
            BodyRule::Link { extras } => {
                let ids = check_ids(object.get("ids"), violations);
                let rest: Fields = object
                    .iter()
                    .filter(|(k, _)| k.as_str() != "ids")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                (check_fields(extras, &rest, violations), ids)
            }
        }
    }
}

fn check_ids(raw: Option<&Value>, violations: &mut Vec<String>) -> Vec<RecordId> {
    let Some(Value::Array(items)) = raw else {
        violations.push("body.ids must be an array of uuids".to_string());
        return Vec::new();
    };
    if items.is_empty() {
        violations.push("body.ids must not be empty".to_string());
    }

    let mut ids: Vec<RecordId> = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match item.as_str().and_then(|s| s.parse::<RecordId>().ok()) {
            Some(id) if ids.contains(&id) => violations.push(format!("body.ids[{idx}] is a duplicate")),
            Some(id) => ids.push(id),
            None => violations.push(format!("body.ids[{idx}] must be a uuid")),
        }
    }
    ids
}

/// Type-check `object` against `specs`, returning the normalized values.
fn check_fields(specs: &[FieldSpec], object: &Fields, violations: &mut Vec<String>) -> Fields {
    let mut out = Fields::new();
    for (key, value) in object {
        let Some(spec) = specs.iter().find(|s| s.name == key) else {
            violations.push(format!("body.{key} is not allowed"));
            continue;
        };
        if value.is_null() {
            if spec.required {
                violations.push(format!("body.{key} must not be null"));
            } else {
                out.insert(key.clone(), Value::Null);
            }
            continue;
        }
        match coerce_body(spec.ty, value) {
            Some(v) => {
                out.insert(key.clone(), v);
            }
            None => violations.push(format!("body.{key} must be {}", spec.ty.describe())),
        }
    }
    out
}

/// Body values must already carry their JSON type.
fn coerce_body(ty: FieldType, value: &Value) -> Option<Value> {
    match ty {
        FieldType::String => value
            .as_str()
            .filter(|s| (1..=MAX_STRING_CHARS).contains(&s.chars().count()))
            .map(|_| value.clone()),
        FieldType::Integer => (value.is_i64() || value.is_u64()).then(|| value.clone()),
        FieldType::Number => value.is_number().then(|| value.clone()),
        FieldType::Boolean => value.is_boolean().then(|| value.clone()),
        FieldType::Uuid => value
            .as_str()
            .and_then(|s| s.parse::<RecordId>().ok())
            .map(|id| Value::String(id.to_string())),
        FieldType::Date => value.as_str().filter(|s| is_date(s)).map(|_| value.clone()),
    }
}

/// Query values usually arrive as strings; parse them into the column type.
fn coerce_query(ty: FieldType, value: &Value) -> Option<Value> {
    let Value::String(text) = value else {
        return coerce_body(ty, value);
    };
    match ty {
        FieldType::Integer => text.parse::<i64>().ok().map(Value::from),
        FieldType::Number => match text.parse::<i64>() {
            Ok(whole) => Some(Value::from(whole)),
            Err(_) => text.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number),
        },
        FieldType::Boolean => as_bool(value).map(Value::Bool),
        FieldType::String | FieldType::Uuid | FieldType::Date => coerce_body(ty, value),
    }
}

fn is_date(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok() || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s == "true" => Some(true),
        Value::String(s) if s == "false" => Some(false),
        _ => None,
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn parse_sort(resource: Resource, value: &Value) -> Option<Sort> {
    let text = value.as_str()?;
    let (field, descending) = match text.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (text, false),
    };
    schema::is_sortable(resource, field).then(|| Sort {
        field: field.to_string(),
        descending,
    })
}
