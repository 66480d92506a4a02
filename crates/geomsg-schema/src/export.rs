//! JSON Schema (2020-12) documents describing the external representation.
//!
//! Exported schemas use external keys only. They describe what producers
//! emit, not the lenient dual-key input accepted by [`crate::Record`].

use serde_json::{json, Map, Value};

use crate::config::UnknownFields;
use crate::field::FieldKind;
use crate::record::RecordSchema;

pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// Top-level JSON Schema document for `schema`.
pub fn json_schema(schema: &RecordSchema) -> Value {
    let mut document = Map::new();
    document.insert("$schema".to_string(), Value::from(DRAFT_2020_12));
    document.insert("title".to_string(), Value::from(schema.name()));
    document.extend(object_schema(schema));
    Value::Object(document)
}

fn object_schema(schema: &RecordSchema) -> Map<String, Value> {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in schema.fields() {
        properties.insert(field.external().to_string(), field_schema(field.kind()));
        if field.is_required() {
            required.push(Value::from(field.external()));
        }
    }

    let mut object = Map::new();
    object.insert("type".to_string(), Value::from("object"));
    object.insert("properties".to_string(), Value::Object(properties));
    object.insert("required".to_string(), Value::Array(required));
    if schema.config().unknown_fields == UnknownFields::Reject {
        object.insert("additionalProperties".to_string(), Value::Bool(false));
    }
    object
}

fn field_schema(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Uuid => json!({ "type": "string", "format": "uuid" }),
        FieldKind::Url => json!({ "type": "string", "format": "uri" }),
        FieldKind::Timestamp => json!({ "type": "string", "format": "date-time" }),
        FieldKind::Number => json!({ "type": "number" }),
        FieldKind::String => json!({ "type": "string" }),
        FieldKind::Literal(values) => json!({ "type": "string", "enum": values }),
        FieldKind::Record(nested) => Value::Object(object_schema(nested)),
    }
}
