//! Record declaration and the validating constructors built on it.
//!
//! A record type pairs a plain `serde` struct with a [`RecordSchema`] built
//! once through [`RecordSchemaBuilder`]. The [`Record`] trait then provides
//! the only sanctioned way in from the wire: normalize keys, validate every
//! field, and only then decode into the typed struct.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::SchemaConfig;
use crate::error::{DeclarationError, Result, ValidationError};
use crate::field::{FieldKind, FieldSpec};
use crate::normalize::{check_serialized, normalize_record};

/// Field layout and shared config of one declared record type.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    name: &'static str,
    fields: Vec<FieldSpec>,
    config: SchemaConfig,
}

impl RecordSchema {
    /// Start declaring a record named `name`.
    pub fn builder(name: &'static str) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            name,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Config the record was declared with.
    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Look a field up by internal name.
    pub fn field(&self, internal: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.internal() == internal)
    }

    /// Validate `value` and rewrite it with external keys only.
    pub fn normalize(&self, value: Value) -> std::result::Result<Value, ValidationError> {
        normalize_record(self, value, &self.config)
    }

    /// As [`normalize`](Self::normalize), under an explicit config.
    pub fn normalize_with(
        &self,
        value: Value,
        config: &SchemaConfig,
    ) -> std::result::Result<Value, ValidationError> {
        normalize_record(self, value, config)
    }
}

/// Collects field declarations for a [`RecordSchema`].
#[derive(Debug)]
pub struct RecordSchemaBuilder {
    name: &'static str,
    fields: Vec<(&'static str, FieldKind, bool)>,
}

impl RecordSchemaBuilder {
    /// Declare a field that must be present.
    pub fn required(mut self, internal: &'static str, kind: FieldKind) -> Self {
        self.fields.push((internal, kind, true));
        self
    }

    /// Declare a field that defaults to absent.
    pub fn optional(mut self, internal: &'static str, kind: FieldKind) -> Self {
        self.fields.push((internal, kind, false));
        self
    }

    /// Compute external names under `config` and freeze the layout.
    ///
    /// Fails when two fields would be indistinguishable on the wire.
    pub fn build(self, config: &SchemaConfig) -> std::result::Result<RecordSchema, DeclarationError> {
        let mut by_internal: HashMap<&'static str, usize> = HashMap::new();
        let mut by_external: HashMap<String, &'static str> = HashMap::new();
        let mut fields = Vec::with_capacity(self.fields.len());

        for (index, (internal, kind, required)) in self.fields.into_iter().enumerate() {
            if by_internal.insert(internal, index).is_some() {
                return Err(DeclarationError::DuplicateField {
                    record: self.name,
                    field: internal,
                });
            }

            let external = config.external_name(internal);
            if let Some(first) = by_external.insert(external.clone(), internal) {
                return Err(DeclarationError::NameCollision {
                    record: self.name,
                    external,
                    first,
                    second: internal,
                });
            }

            fields.push(FieldSpec::new(internal, external, kind, required));
        }

        for field in &fields {
            if let Some(owner) = by_external.get(field.internal()) {
                if *owner != field.internal() {
                    return Err(DeclarationError::AmbiguousKey {
                        record: self.name,
                        key: field.internal().to_string(),
                        internal_of: field.internal(),
                        external_of: owner,
                    });
                }
            }
        }

        tracing::debug!(record = self.name, fields = fields.len(), "declared record schema");

        Ok(RecordSchema {
            name: self.name,
            fields,
            config: *config,
        })
    }
}

/// A typed record with a declared schema.
///
/// Implementors are plain `serde` structs using camelCase external names.
/// The provided constructors accept internal or external keys, validate
/// every field and never yield a partially built value.
pub trait Record: Serialize + DeserializeOwned {
    /// The declared layout of this record.
    fn schema() -> std::result::Result<&'static RecordSchema, DeclarationError>;

    /// Validate and build from a parsed JSON value.
    fn from_value(value: Value) -> Result<Self> {
        let schema = Self::schema()?;
        Self::from_value_with_config(value, schema.config())
    }

    /// Validate and build under an explicit config, for nested records too.
    fn from_value_with_config(value: Value, config: &SchemaConfig) -> Result<Self> {
        let schema = Self::schema()?;
        let canonical = schema.normalize_with(value, config).inspect_err(|err| {
            tracing::debug!(record = schema.name(), issues = err.issues().len(), "rejected payload");
        })?;
        Ok(serde_json::from_value(canonical)?)
    }

    /// Validate and build from JSON text.
    fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Validate and build from JSON bytes.
    fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// External representation, camelCase keys only.
    ///
    /// Fails when a number field set in code is NaN or infinite, since the
    /// output could not be parsed back.
    fn to_value(&self) -> Result<Value> {
        let schema = Self::schema()?;
        let value = serde_json::to_value(self)?;
        check_serialized(schema, &value).inspect_err(|err| {
            tracing::debug!(record = schema.name(), issues = err.issues().len(), "refused to serialize");
        })?;
        Ok(value)
    }

    /// External representation as compact JSON text.
    fn to_json_string(&self) -> Result<String> {
        self.to_value()?;
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_computes_external_names_in_order() {
        let schema = RecordSchema::builder("Probe")
            .required("site_id", FieldKind::Uuid)
            .optional("config_version", FieldKind::String)
            .build(SchemaConfig::shared())
            .unwrap();

        let externals: Vec<&str> = schema.fields().iter().map(FieldSpec::external).collect();
        assert_eq!(externals, vec!["siteId", "configVersion"]);
        assert!(schema.field("site_id").unwrap().is_required());
        assert!(!schema.field("config_version").unwrap().is_required());
        assert!(schema.field("siteId").is_none());
        assert_eq!(schema.name(), "Probe");
    }

    #[test]
    fn duplicate_internal_name_is_rejected() {
        let err = RecordSchema::builder("Probe")
            .required("site_id", FieldKind::Uuid)
            .optional("site_id", FieldKind::String)
            .build(SchemaConfig::shared())
            .unwrap_err();

        assert_eq!(
            err,
            DeclarationError::DuplicateField {
                record: "Probe",
                field: "site_id"
            }
        );
    }

    #[test]
    fn colliding_external_names_are_rejected() {
        let err = RecordSchema::builder("Probe")
            .required("site_id", FieldKind::Uuid)
            .required("site__id", FieldKind::Uuid)
            .build(SchemaConfig::shared())
            .unwrap_err();

        assert!(matches!(
            err,
            DeclarationError::NameCollision { ref external, first: "site_id", second: "site__id", .. }
                if external == "siteId"
        ));
    }

    #[test]
    fn internal_name_shadowing_another_external_is_rejected() {
        let err = RecordSchema::builder("Probe")
            .required("site_id", FieldKind::Uuid)
            .required("siteId", FieldKind::String)
            .build(SchemaConfig::shared())
            .unwrap_err();

        assert_eq!(
            err,
            DeclarationError::AmbiguousKey {
                record: "Probe",
                key: "siteId".to_string(),
                internal_of: "siteId",
                external_of: "site_id",
            }
        );

        let err = RecordSchema::builder("Probe")
            .required("siteid", FieldKind::String)
            .required("Siteid", FieldKind::String)
            .build(SchemaConfig::shared())
            .unwrap_err();
        assert!(matches!(err, DeclarationError::NameCollision { .. }));
    }

    #[test]
    fn config_is_copied_into_schema() {
        let config = SchemaConfig::shared().with_unknown_fields(crate::UnknownFields::Ignore);
        let schema = RecordSchema::builder("Probe")
            .required("week", FieldKind::Number)
            .build(&config)
            .unwrap();
        assert_eq!(schema.config(), &config);
    }
}
