use jsonschema::Validator;
use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::message::MessageKind;

/// Most violations folded into one error message.
const MAX_REPORTED: usize = 4;

pub(crate) fn compile(schema: &Value) -> Result<Validator> {
    jsonschema::options()
        .should_validate_formats(true)
        .build(schema)
        .map_err(|err| SchemaError::CompileFailed(err.to_string()))
}

pub(crate) fn validate_document(kind: MessageKind, document: &Value, validator: &Validator) -> Result<()> {
    let violations: Vec<String> = validator
        .iter_errors(document)
        .take(MAX_REPORTED)
        .map(|err| err.to_string())
        .collect();

    if violations.is_empty() {
        return Ok(());
    }

    tracing::debug!(%kind, violations = violations.len(), "document failed JSON Schema validation");
    Err(SchemaError::SchemaViolation {
        kind,
        message: violations.join("; "),
    })
}
