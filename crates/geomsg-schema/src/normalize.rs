//! Key normalization and field validation at the deserialization boundary.
//!
//! Each declared field is looked up under its external key first and its
//! internal key second. Values are checked against the field kind and
//! rewritten into canonical form, so the typed `serde` decode that follows
//! only ever sees external keys and well-formed values.

use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::config::{SchemaConfig, UnknownFields};
use crate::error::{FieldIssue, IssueKind, ValidationError};
use crate::field::{FieldKind, FieldSpec};
use crate::record::RecordSchema;
use crate::types::{AbsoluteUrl, Timestamp};

pub(crate) fn normalize_record(
    schema: &RecordSchema,
    value: Value,
    config: &SchemaConfig,
) -> Result<Value, ValidationError> {
    let mut issues = Vec::new();
    let normalized = normalize_object(schema, value, config, "", &mut issues);

    if issues.is_empty() {
        Ok(normalized)
    } else {
        Err(ValidationError::new(schema.name(), issues))
    }
}

/// Check the serialized form of a typed record before it leaves the crate.
///
/// `serde_json` writes non-finite floats as `null`; a number field holding
/// `null` here therefore came from NaN or an infinity set in code.
pub(crate) fn check_serialized(schema: &RecordSchema, value: &Value) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    check_object(schema, value, "", &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(schema.name(), issues))
    }
}

fn check_object(schema: &RecordSchema, value: &Value, path: &str, issues: &mut Vec<FieldIssue>) {
    let Some(map) = value.as_object() else {
        return;
    };

    for field in schema.fields() {
        let Some(child) = map.get(field.external()) else {
            continue;
        };
        let field_path = join_path(path, field.external());
        match field.kind() {
            FieldKind::Record(nested) => check_object(nested, child, &field_path, issues),
            FieldKind::Number if child.is_null() => {
                issues.push(FieldIssue::new(field_path, IssueKind::NotFinite));
            }
            _ => {}
        }
    }
}

fn normalize_object(
    schema: &RecordSchema,
    value: Value,
    config: &SchemaConfig,
    path: &str,
    issues: &mut Vec<FieldIssue>,
) -> Value {
    let mut input = match value {
        Value::Object(map) => map,
        other => {
            issues.push(FieldIssue::new(
                path,
                IssueKind::WrongType {
                    expected: "object",
                    found: json_type(&other),
                },
            ));
            return Value::Null;
        }
    };

    let mut output = Map::new();
    for field in schema.fields() {
        let field_path = join_path(path, field.external());
        let Some(raw) = take_field(&mut input, field, schema.name()) else {
            if field.is_required() {
                issues.push(FieldIssue::new(field_path, IssueKind::Missing));
            }
            continue;
        };

        if raw.is_null() {
            if field.is_required() {
                issues.push(FieldIssue::new(
                    field_path,
                    IssueKind::WrongType {
                        expected: field.kind().expected(),
                        found: "null",
                    },
                ));
            }
            continue;
        }

        if let Some(canonical) = coerce(field.kind(), raw, config, &field_path, issues) {
            output.insert(field.external().to_string(), canonical);
        }
    }

    for key in input.keys() {
        match config.unknown_fields {
            UnknownFields::Reject => {
                issues.push(FieldIssue::new(join_path(path, key), IssueKind::UnknownField));
            }
            UnknownFields::Ignore => {
                tracing::debug!(record = schema.name(), key = %key, "ignoring unknown field");
            }
        }
    }

    Value::Object(output)
}

/// Remove a field's value from `input`: external key first, internal second.
///
/// When both spellings are present the external one wins and the internal
/// one is dropped.
fn take_field(input: &mut Map<String, Value>, field: &FieldSpec, record: &str) -> Option<Value> {
    let external = input.remove(field.external());
    let internal = if field.internal() == field.external() {
        None
    } else {
        input.remove(field.internal())
    };

    match (external, internal) {
        (Some(value), Some(_)) => {
            tracing::trace!(
                record,
                field = field.internal(),
                "external key shadows internal key"
            );
            Some(value)
        }
        (Some(value), None) => Some(value),
        (None, Some(value)) => {
            tracing::trace!(record, field = field.internal(), "accepted internal key");
            Some(value)
        }
        (None, None) => None,
    }
}

fn coerce(
    kind: FieldKind,
    value: Value,
    config: &SchemaConfig,
    path: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<Value> {
    let outcome = match kind {
        FieldKind::Record(nested) => {
            let before = issues.len();
            let normalized = normalize_object(nested, value, config, path, issues);
            return (issues.len() == before).then_some(normalized);
        }
        FieldKind::Number => coerce_number(&value),
        FieldKind::Uuid => text_of(kind, &value).and_then(|text| {
            Uuid::parse_str(text)
                .map(|id| Value::String(id.hyphenated().to_string()))
                .map_err(|err| IssueKind::MalformedUuid(err.to_string()))
        }),
        FieldKind::Url => text_of(kind, &value).and_then(|text| {
            AbsoluteUrl::parse(text)
                .map(|_| Value::String(text.to_string()))
                .map_err(|err| IssueKind::MalformedUrl(err.to_string()))
        }),
        FieldKind::Timestamp => text_of(kind, &value).and_then(|text| {
            Timestamp::parse(text)
                .map(|ts| Value::String(ts.to_rfc3339()))
                .map_err(|err| IssueKind::MalformedTimestamp(err.to_string()))
        }),
        FieldKind::Literal(allowed) => text_of(kind, &value).and_then(|text| {
            if allowed.iter().any(|candidate| *candidate == text) {
                Ok(Value::String(text.to_string()))
            } else {
                Err(IssueKind::NotInEnum {
                    value: text.to_string(),
                    allowed,
                })
            }
        }),
        FieldKind::String => text_of(kind, &value).map(|text| Value::String(text.to_string())),
    };

    match outcome {
        Ok(canonical) => Some(canonical),
        Err(kind) => {
            issues.push(FieldIssue::new(path, kind));
            None
        }
    }
}

fn text_of(kind: FieldKind, value: &Value) -> Result<&str, IssueKind> {
    value.as_str().ok_or_else(|| IssueKind::WrongType {
        expected: kind.expected(),
        found: json_type(value),
    })
}

/// Numbers pass through; numeric strings are parsed. Non-finite results are
/// rejected since JSON cannot carry them.
fn coerce_number(value: &Value) -> Result<Value, IssueKind> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| IssueKind::WrongType {
            expected: "number",
            found: json_type(value),
        })
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use serde_json::json;

    use super::*;
    use crate::error::DeclarationError;

    static INNER: LazyLock<Result<RecordSchema, DeclarationError>> = LazyLock::new(|| {
        RecordSchema::builder("Inner")
            .required("presigned_url", FieldKind::Url)
            .optional("week", FieldKind::Number)
            .build(SchemaConfig::shared())
    });

    static OUTER: LazyLock<Result<RecordSchema, DeclarationError>> = LazyLock::new(|| {
        let inner = INNER.as_ref().map_err(Clone::clone)?;
        RecordSchema::builder("Outer")
            .required("site_id", FieldKind::Uuid)
            .required("delivery_type", FieldKind::String)
            .optional("date", FieldKind::Timestamp)
            .required("mode", FieldKind::Literal(&["fast", "slow"]))
            .required("data", FieldKind::Record(inner))
            .build(SchemaConfig::shared())
    });

    const SITE: &str = "5b1f3c2a-9d4e-4f6a-8b7c-1d2e3f4a5b6c";

    fn outer() -> &'static RecordSchema {
        OUTER.as_ref().unwrap()
    }

    #[test]
    fn external_and_internal_keys_normalize_identically() {
        let external = json!({
            "siteId": SITE,
            "deliveryType": "aem_edge",
            "mode": "fast",
            "data": { "presignedUrl": "https://example.com/x", "week": 41 }
        });
        let internal = json!({
            "site_id": SITE,
            "delivery_type": "aem_edge",
            "mode": "fast",
            "data": { "presigned_url": "https://example.com/x", "week": 41 }
        });

        let a = outer().normalize(external).unwrap();
        let b = outer().normalize(internal).unwrap();
        assert_eq!(a, b);
        assert_eq!(a["data"]["presignedUrl"], "https://example.com/x");
        assert!(a.get("site_id").is_none());
    }

    #[test]
    fn external_key_wins_over_internal_duplicate() {
        let other = "7c2e4d1b-0a9f-4e8d-b7c6-5a4b3c2d1e0f";
        let value = json!({
            "siteId": SITE,
            "site_id": other,
            "deliveryType": "x",
            "mode": "slow",
            "data": { "presignedUrl": "https://example.com/x" }
        });

        let normalized = outer().normalize(value).unwrap();
        assert_eq!(normalized["siteId"], SITE);
    }

    #[test]
    fn collects_every_issue_with_paths() {
        let value = json!({
            "siteId": "not-a-uuid",
            "mode": "medium",
            "date": "someday",
            "data": { "presignedUrl": "/relative", "week": "forty" },
            "extra": true
        });

        let err = outer().normalize(value).unwrap_err();
        assert_eq!(err.record(), "Outer");
        assert_eq!(
            err.paths(),
            vec![
                "siteId",
                "deliveryType",
                "date",
                "mode",
                "data.presignedUrl",
                "data.week",
                "extra"
            ]
        );
        assert!(matches!(err.issue("siteId").unwrap().kind, IssueKind::MalformedUuid(_)));
        assert_eq!(err.issue("deliveryType").unwrap().kind, IssueKind::Missing);
        assert!(matches!(
            err.issue("date").unwrap().kind,
            IssueKind::MalformedTimestamp(_)
        ));
        assert!(matches!(
            err.issue("mode").unwrap().kind,
            IssueKind::NotInEnum { ref value, .. } if value == "medium"
        ));
        assert!(matches!(
            err.issue("data.presignedUrl").unwrap().kind,
            IssueKind::MalformedUrl(_)
        ));
        assert_eq!(err.issue("extra").unwrap().kind, IssueKind::UnknownField);
    }

    #[test]
    fn unknown_fields_can_be_ignored() {
        let value = json!({
            "siteId": SITE,
            "deliveryType": "x",
            "mode": "fast",
            "data": { "presignedUrl": "https://example.com/x", "nested_extra": 1 },
            "extra": true
        });
        let lenient = SchemaConfig::shared().with_unknown_fields(UnknownFields::Ignore);

        let normalized = outer().normalize_with(value.clone(), &lenient).unwrap();
        assert!(normalized.get("extra").is_none());
        assert!(normalized["data"].get("nested_extra").is_none());

        let err = outer().normalize(value).unwrap_err();
        assert_eq!(err.paths(), vec!["data.nested_extra", "extra"]);
    }

    #[test]
    fn null_means_absent_for_optional_and_wrong_type_for_required() {
        let value = json!({
            "siteId": SITE,
            "deliveryType": null,
            "date": null,
            "mode": "fast",
            "data": { "presignedUrl": "https://example.com/x", "week": null }
        });

        let err = outer().normalize(value).unwrap_err();
        assert_eq!(err.paths(), vec!["deliveryType"]);
        assert_eq!(
            err.issue("deliveryType").unwrap().kind,
            IssueKind::WrongType {
                expected: "string",
                found: "null"
            }
        );
    }

    #[test]
    fn canonicalizes_values() {
        let value = json!({
            "siteId": "5B1F3C2A9D4E4F6A8B7C1D2E3F4A5B6C",
            "deliveryType": "x",
            "date": "2026-10-05",
            "mode": "fast",
            "data": { "presignedUrl": "https://example.com/x", "week": " 41 " }
        });

        let normalized = outer().normalize(value).unwrap();
        assert_eq!(normalized["siteId"], SITE);
        assert_eq!(normalized["date"], "2026-10-05T00:00:00Z");
        assert_eq!(normalized["data"]["week"], json!(41.0));
    }

    #[test]
    fn wrong_json_types_are_reported() {
        let value = json!({
            "siteId": 12,
            "deliveryType": ["x"],
            "mode": true,
            "data": "https://example.com/x"
        });

        let err = outer().normalize(value).unwrap_err();
        assert_eq!(
            err.issue("siteId").unwrap().kind,
            IssueKind::WrongType {
                expected: "UUID string",
                found: "number"
            }
        );
        assert_eq!(
            err.issue("deliveryType").unwrap().kind,
            IssueKind::WrongType {
                expected: "string",
                found: "array"
            }
        );
        assert_eq!(
            err.issue("mode").unwrap().kind,
            IssueKind::WrongType {
                expected: "literal string",
                found: "boolean"
            }
        );
        assert_eq!(
            err.issue("data").unwrap().kind,
            IssueKind::WrongType {
                expected: "object",
                found: "string"
            }
        );
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = outer().normalize(json!([1, 2])).unwrap_err();
        assert_eq!(err.paths(), vec![""]);
    }
}
