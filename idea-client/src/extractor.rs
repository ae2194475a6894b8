//! Turns a fetched record into idea units.
//!
//! The record's `ideas` field is a string-encoded mapping whose values, read
//! in order, alternate between titles and descriptions. The keys carry no
//! meaning; pairing is purely positional, so an upstream layout change breaks
//! it silently.

use crate::literal::decode_mapping;
use scout_core::{ExtractionError, IdeaRecord, IdeaUnit, IDEAS_FIELD};
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub fn extract(record: &IdeaRecord) -> Result<Vec<IdeaUnit>, ExtractionError> {
    let mapping = match record.get(IDEAS_FIELD) {
        None | Some(Value::Null) => {
            return Err(ExtractionError::MissingField {
                field: IDEAS_FIELD.to_string(),
            })
        }
        Some(Value::String(raw)) => decode_mapping(raw).unwrap_or_else(|| {
            warn!(
                "Could not decode '{}' of record {:?}, treating it as empty",
                IDEAS_FIELD,
                record.id()
            );
            Map::new()
        }),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(ExtractionError::MalformedPayload {
                field: IDEAS_FIELD.to_string(),
                details: format!("expected a string-encoded mapping, found {}", kind(other)),
            })
        }
    };

    let values: Vec<String> = mapping.into_iter().map(|(_, value)| flatten(value)).collect();
    let units = pair_values(values);
    debug!("Extracted {} ideas from record {:?}", units.len(), record.id());
    Ok(units)
}

/// Pairs `values[i - 1]` with `values[i]` for i = 1, 3, 5, ...; a trailing
/// unpaired value is dropped.
pub fn pair_values<I>(values: I) -> Vec<IdeaUnit>
where
    I: IntoIterator<Item = String>,
{
    let mut units = Vec::new();
    let mut values = values.into_iter();
    while let (Some(title), Some(description)) = (values.next(), values.next()) {
        units.push(IdeaUnit::new(title, description));
    }
    units
}

fn flatten(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
