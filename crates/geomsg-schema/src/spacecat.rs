//! Detect message, spacecat namespace.

use std::sync::LazyLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{self, DateRange};
use crate::config::SchemaConfig;
use crate::error::DeclarationError;
use crate::field::FieldKind;
use crate::message::DetectType;
use crate::record::{Record, RecordSchema};
use crate::types::{AbsoluteUrl, Timestamp};

/// Where to fetch detection input, plus the optional week it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Data {
    pub presigned_url: AbsoluteUrl,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<f64>,
}

impl Data {
    /// UTC ranges for the carried week, when both week and year are set.
    pub fn date_ranges(&self, today: NaiveDate) -> Option<Vec<DateRange>> {
        let (week, year) = (self.week?, self.year?);
        Some(calendar::date_ranges_f64(week, year, today))
    }
}

/// Lean detection request: site, audit and a presigned input location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DetectMessage {
    pub site_id: Uuid,
    pub r#type: DetectType,
    pub audit_id: Uuid,
    pub data: Data,
}

static DATA: LazyLock<Result<RecordSchema, DeclarationError>> = LazyLock::new(|| {
    RecordSchema::builder("Data")
        .required("presigned_url", FieldKind::Url)
        .optional("date", FieldKind::Timestamp)
        .optional("week", FieldKind::Number)
        .optional("year", FieldKind::Number)
        .build(SchemaConfig::shared())
});

static DETECT_MESSAGE: LazyLock<Result<RecordSchema, DeclarationError>> = LazyLock::new(|| {
    let data = Data::schema()?;
    RecordSchema::builder("DetectMessage")
        .required("site_id", FieldKind::Uuid)
        .required("type", FieldKind::literal::<DetectType>())
        .required("audit_id", FieldKind::Uuid)
        .required("data", FieldKind::Record(data))
        .build(SchemaConfig::shared())
});

impl Record for Data {
    fn schema() -> Result<&'static RecordSchema, DeclarationError> {
        DATA.as_ref().map_err(Clone::clone)
    }
}

impl Record for DetectMessage {
    fn schema() -> Result<&'static RecordSchema, DeclarationError> {
        DETECT_MESSAGE.as_ref().map_err(Clone::clone)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::{IssueKind, SchemaError};

    #[test]
    fn schema_lists_wire_keys_in_order() {
        let schema = DetectMessage::schema().unwrap();
        let keys: Vec<&str> = schema.fields().iter().map(|f| f.external()).collect();
        assert_eq!(keys, vec!["siteId", "type", "auditId", "data"]);

        let data = Data::schema().unwrap();
        let keys: Vec<&str> = data.fields().iter().map(|f| f.external()).collect();
        assert_eq!(keys, vec!["presignedUrl", "date", "week", "year"]);
    }

    #[test]
    fn data_ranges_need_week_and_year() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let week_only = Data::from_value(json!({
            "presignedUrl": "https://bucket.example.com/input.json",
            "week": 40
        }))
        .unwrap();
        assert!(week_only.date_ranges(today).is_none());

        let data = Data {
            year: Some(2026.0),
            ..week_only
        };
        let ranges = data.date_ranges(today).unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].month, 9);
        assert_eq!(ranges[1].month, 10);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let data = Data::from_value(json!({
            "presigned_url": "https://bucket.example.com/input.json",
            "week": "41",
            "year": 2026.0
        }))
        .unwrap();
        assert_eq!(data.week, Some(41.0));
        assert_eq!(data.year, Some(2026.0));
    }

    fn sorted_keys(value: &serde_json::Value) -> Vec<String> {
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    fn sorted_externals(schema: &RecordSchema) -> Vec<String> {
        let mut keys: Vec<String> = schema.fields().iter().map(|f| f.external().to_string()).collect();
        keys.sort_unstable();
        keys
    }

    fn full_message() -> DetectMessage {
        DetectMessage::from_value(json!({
            "siteId": "5b1f3c2a-9d4e-4f6a-8b7c-1d2e3f4a5b6c",
            "type": "detect:geo-brand-presence-daily",
            "auditId": "7c2e4d1b-0a9f-4e8d-b7c6-5a4b3c2d1e0f",
            "data": {
                "presignedUrl": "https://bucket.example.com/input.json",
                "date": "2026-10-05",
                "week": 41,
                "year": 2026
            }
        }))
        .unwrap()
    }

    #[test]
    fn serde_struct_matches_declared_fields() {
        let out = full_message().to_value().unwrap();
        assert_eq!(sorted_keys(&out), sorted_externals(DetectMessage::schema().unwrap()));
        assert_eq!(sorted_keys(&out["data"]), sorted_externals(Data::schema().unwrap()));
    }

    #[test]
    fn non_finite_optional_number_is_refused_on_output() {
        let message = full_message();
        let message = DetectMessage {
            data: Data {
                week: Some(f64::NEG_INFINITY),
                ..message.data.clone()
            },
            ..message
        };

        let SchemaError::Validation(err) = message.to_value().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(err.paths(), vec!["data.week"]);
        assert_eq!(err.issue("data.week").unwrap().kind, IssueKind::NotFinite);
        assert!(message.to_json_string().is_err());

        let restored = DetectMessage {
            data: Data {
                week: Some(40.0),
                ..message.data.clone()
            },
            ..message
        };
        let text = restored.to_json_string().unwrap();
        assert_eq!(DetectMessage::from_json_str(&text).unwrap(), restored);
    }
}
