//! JSON schema builders used by engine objects to describe their parameters.

use serde_json::{json, Map, Value};

/// Schema of an object type, `title` being its registered type name
pub fn object(title: &str, description: &str, properties: Vec<(&str, Value)>) -> Value {
    let properties: Map<String, Value> = properties.into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();
    json!({
        "title": title,
        "description": description,
        "type": "object",
        "properties": properties,
        "additionalProperties": false,
    })
}

pub fn number(description: &str) -> Value {
    json!({ "type": "number", "description": description })
}

/// Number with an inclusive lower bound
pub fn number_min(description: &str, minimum: f64) -> Value {
    json!({ "type": "number", "description": description, "minimum": minimum })
}

/// Number with an exclusive lower bound
pub fn number_above(description: &str, minimum: f64) -> Value {
    json!({ "type": "number", "description": description, "exclusiveMinimum": minimum })
}

pub fn integer_min(description: &str, minimum: u64) -> Value {
    json!({ "type": "integer", "description": description, "minimum": minimum })
}

pub fn boolean(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

/// Fixed-size array of numbers (glam vectors serialize as arrays)
pub fn vector(description: &str, size: usize) -> Value {
    json!({
        "type": "array",
        "description": description,
        "items": { "type": "number" },
        "minItems": size,
        "maxItems": size,
    })
}

/// Nested object schema without title
pub fn nested(description: &str, properties: Vec<(&str, Value)>) -> Value {
    let properties: Map<String, Value> = properties.into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();
    json!({
        "type": "object",
        "description": description,
        "properties": properties,
    })
}
