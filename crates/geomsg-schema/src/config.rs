use crate::naming::to_camel;

/// What parsing does with keys that match no declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFields {
    /// Report every unrecognized key as a validation issue.
    #[default]
    Reject,
    /// Drop unrecognized keys and continue.
    Ignore,
}

/// Shared validation and aliasing behavior for declared records.
///
/// Every record declared with a config maps internal names to camelCase
/// external keys, accepts either spelling on parse and emits only the
/// external one. Nested records inherit the config of the record being
/// parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemaConfig {
    /// Policy for keys that match no declared field.
    pub unknown_fields: UnknownFields,
}

static SHARED: SchemaConfig = SchemaConfig {
    unknown_fields: UnknownFields::Reject,
};

impl SchemaConfig {
    /// The config every built-in message is declared with.
    pub fn shared() -> &'static SchemaConfig {
        &SHARED
    }

    /// Same config with a different unknown-field policy.
    pub fn with_unknown_fields(self, unknown_fields: UnknownFields) -> Self {
        Self { unknown_fields }
    }

    /// External key for an internal field name.
    pub fn external_name(&self, internal: &str) -> String {
        to_camel(internal)
    }
}

/// Controls JSON Schema registry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// When true, schemas reject additional properties not in the schema.
    pub strict_mode: bool,
    /// When true, kinds without a schema return `SchemaError::NoSchema`.
    pub fail_on_missing_schema: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            fail_on_missing_schema: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_config_rejects_unknown_fields() {
        assert_eq!(SchemaConfig::shared().unknown_fields, UnknownFields::Reject);
        assert_eq!(*SchemaConfig::shared(), SchemaConfig::default());
    }

    #[test]
    fn with_unknown_fields_leaves_shared_untouched() {
        let lenient = SchemaConfig::shared().with_unknown_fields(UnknownFields::Ignore);
        assert_eq!(lenient.unknown_fields, UnknownFields::Ignore);
        assert_eq!(SchemaConfig::shared().unknown_fields, UnknownFields::Reject);
    }

    #[test]
    fn external_name_is_camel_case() {
        assert_eq!(
            SchemaConfig::default().external_name("web_search_provider"),
            "webSearchProvider"
        );
    }
}
