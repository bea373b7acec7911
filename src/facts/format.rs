//! Fact formatting
//!
//! Projects a reply onto the fixed field list registered for its query, or
//! falls back to the generic normalizer when no projection is registered.

use super::normalize::{normalize, RawValue, DEFAULT_DEPTH_BUDGET};
use super::registry::QueryDef;
use serde_json::{Map, Value};
use thiserror::Error;

/// A reply does not match its registered projection.
///
/// This is a defect in the projection table, not a runtime condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("{query}: record has no field {field:?} required by its projection")]
    MissingField { query: String, field: String },

    #[error("{query}: expected a record, got {found}")]
    NotARecord { query: String, found: String },
}

/// Format a reply for the query that produced it
pub fn project(reply: &RawValue, query: &QueryDef) -> Result<Value, ProjectionError> {
    let Some(fields) = query.fields else {
        return Ok(normalize(reply, DEFAULT_DEPTH_BUDGET, None));
    };

    match reply {
        RawValue::Seq(records) => records
            .iter()
            .map(|record| project_record(record, query.name, fields))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        record => project_record(record, query.name, fields),
    }
}

fn project_record(record: &RawValue, query: &str, fields: &[String]) -> Result<Value, ProjectionError> {
    let mut projected = Map::new();
    for field in fields {
        let value = field_of(record, field).ok_or_else(|| match record {
            RawValue::Object(_) | RawValue::Map(_) => ProjectionError::MissingField {
                query: query.to_string(),
                field: field.clone(),
            },
            other => ProjectionError::NotARecord {
                query: query.to_string(),
                found: other.type_name().to_string(),
            },
        })?;
        projected.insert(field.clone(), Value::String(stringify(&value)));
    }
    Ok(Value::Object(projected))
}

fn field_of(record: &RawValue, field: &str) -> Option<RawValue> {
    match record {
        RawValue::Object(object) => object.attr(field),
        RawValue::Map(entries) => entries
            .iter()
            .find(|(key, _)| key == field)
            .map(|(_, value)| value.clone()),
        _ => None,
    }
}

/// String form of a single field value.
///
/// Enum-like records render as their `name` (or `value`); other containers
/// render as compact JSON of their normalized form.
pub fn stringify(value: &RawValue) -> String {
    match value {
        RawValue::Text(s) => s.clone(),
        RawValue::Number(n) => n.to_string(),
        RawValue::Bool(true) => "True".to_string(),
        RawValue::Bool(false) => "False".to_string(),
        RawValue::Null => "None".to_string(),
        RawValue::Callable(name) => name.clone(),
        RawValue::Object(object) => match object.attr("name").or_else(|| object.attr("value")) {
            Some(inner @ (RawValue::Text(_) | RawValue::Number(_))) => stringify(&inner),
            _ => normalize(value, DEFAULT_DEPTH_BUDGET, None).to_string(),
        },
        RawValue::Map(_) | RawValue::Seq(_) => normalize(value, DEFAULT_DEPTH_BUDGET, None).to_string(),
    }
}
