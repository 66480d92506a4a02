use std::collections::HashMap;

use jsonschema::Validator;
use serde_json::{Map, Value};

use crate::config::RegistryConfig;
use crate::error::Result;
use crate::export::json_schema;
use crate::message::MessageKind;
use crate::validator::{compile, validate_document};

/// Keywords whose value is a map of subschemas.
const SCHEMA_MAPS: [&str; 5] = [
    "properties",
    "patternProperties",
    "dependentSchemas",
    "$defs",
    "definitions",
];

/// Keywords whose value is a single subschema.
const SCHEMA_SINGLES: [&str; 11] = [
    "propertyNames",
    "additionalProperties",
    "unevaluatedProperties",
    "items",
    "contains",
    "additionalItems",
    "unevaluatedItems",
    "not",
    "if",
    "then",
    "else",
];

/// Keywords whose value is a list of subschemas.
const SCHEMA_LISTS: [&str; 4] = ["prefixItems", "allOf", "anyOf", "oneOf"];

/// Keywords that only make sense on object schemas.
const OBJECT_KEYWORDS: [&str; 8] = [
    "properties",
    "patternProperties",
    "additionalProperties",
    "unevaluatedProperties",
    "required",
    "dependentRequired",
    "dependentSchemas",
    "propertyNames",
];

/// Compiled JSON Schema validators for the external form of each message kind.
pub struct SchemaRegistry {
    validators: HashMap<MessageKind, Validator>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            validators: HashMap::new(),
            config,
        }
    }

    /// Registry holding the exported schema of every built-in kind.
    pub fn builtin() -> Result<Self> {
        Self::builtin_with_config(RegistryConfig::default())
    }

    /// As [`builtin`](Self::builtin), with explicit config.
    pub fn builtin_with_config(config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);
        for kind in MessageKind::ALL {
            registry.register_value(kind, &json_schema(kind.schema()?))?;
        }
        Ok(registry)
    }

    /// Register a schema for a kind from a JSON string.
    pub fn register(&mut self, kind: MessageKind, schema_json: &str) -> Result<()> {
        let schema: Value = serde_json::from_str(schema_json)?;
        self.register_value(kind, &schema)
    }

    /// Register a schema for a kind from a JSON value.
    pub fn register_value(&mut self, kind: MessageKind, schema: &Value) -> Result<()> {
        let mut schema = schema.clone();
        if self.config.strict_mode {
            apply_strict_mode(&mut schema);
        }

        let compiled = compile(&schema)?;
        tracing::debug!(%kind, strict = self.config.strict_mode, "registered JSON Schema");
        self.validators.insert(kind, compiled);
        Ok(())
    }

    /// Validate a JSON payload against the schema of `kind`.
    pub fn validate(&self, kind: MessageKind, payload: &[u8]) -> Result<()> {
        let document: Value = serde_json::from_slice(payload)?;
        self.validate_value(kind, &document)
    }

    /// Validate a parsed document against the schema of `kind`.
    pub fn validate_value(&self, kind: MessageKind, document: &Value) -> Result<()> {
        match self.validators.get(&kind) {
            Some(validator) => validate_document(kind, document, validator),
            None if self.config.fail_on_missing_schema => Err(crate::SchemaError::NoSchema(kind)),
            None => Ok(()),
        }
    }

    /// Check if a kind has a registered schema.
    pub fn has_schema(&self, kind: MessageKind) -> bool {
        self.validators.contains_key(&kind)
    }

    /// Kinds that have registered schemas.
    pub fn kinds(&self) -> Vec<MessageKind> {
        let mut kinds: Vec<MessageKind> = self.validators.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Close every object schema lacking an explicit `additionalProperties`.
fn apply_strict_mode(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if is_object_schema(map) && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }

            for key in SCHEMA_MAPS {
                if let Some(Value::Object(children)) = map.get_mut(key) {
                    children.values_mut().for_each(apply_strict_mode);
                }
            }
            for key in SCHEMA_SINGLES {
                if let Some(child) = map.get_mut(key) {
                    apply_strict_mode(child);
                }
            }
            for key in SCHEMA_LISTS {
                if let Some(Value::Array(children)) = map.get_mut(key) {
                    children.iter_mut().for_each(apply_strict_mode);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(apply_strict_mode),
        _ => {}
    }
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
    match map.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind == "object"),
        _ => OBJECT_KEYWORDS.iter().any(|keyword| map.contains_key(*keyword)),
    }
}
