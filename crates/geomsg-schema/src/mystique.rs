//! Detect message, mystique namespace.
//!
//! The full request: site, audit, target URLs, the calendar week being
//! analysed and the answer engine to query.

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

closed_literal! {
    /// Answer engine whose results are analysed.
    pub enum WebSearchProvider {
        AiMode => "ai_mode",
        All => "all",
        Chatgpt => "chatgpt",
        Copilot => "copilot",
        Gemini => "gemini",
        GoogleAiOverviews => "google_ai_overviews",
        Perplexity => "perplexity",
    }
}

/// ISO calendar week the detection covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CalendarWeek {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Timestamp>,
    pub week: f64,
    pub year: f64,
}

impl CalendarWeek {
    /// UTC ranges covered by this week, split at a month boundary.
    ///
    /// A week/year pair that is not a whole, valid ISO week falls back to the
    /// last full week before `today`.
    pub fn date_ranges(&self, today: NaiveDate) -> Vec<DateRange> {
        calendar::date_ranges_f64(self.week, self.year, today)
    }
}

/// Request to detect geo brand presence for one site and week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DetectMessage {
    pub audit_id: Uuid,
    pub base_url: AbsoluteUrl,
    pub calendar_week: CalendarWeek,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Timestamp>,
    pub delivery_type: String,
    pub site_id: Uuid,
    pub r#type: DetectType,
    pub url: AbsoluteUrl,
    pub web_search_provider: WebSearchProvider,
}

static CALENDAR_WEEK: LazyLock<Result<RecordSchema, DeclarationError>> = LazyLock::new(|| {
    RecordSchema::builder("CalendarWeek")
        .optional("date", FieldKind::Timestamp)
        .required("week", FieldKind::Number)
        .required("year", FieldKind::Number)
        .build(SchemaConfig::shared())
});

static DETECT_MESSAGE: LazyLock<Result<RecordSchema, DeclarationError>> = LazyLock::new(|| {
    let calendar_week = CalendarWeek::schema()?;
    RecordSchema::builder("DetectMessage")
        .required("audit_id", FieldKind::Uuid)
        .required("base_url", FieldKind::Url)
        .required("calendar_week", FieldKind::Record(calendar_week))
        .optional("config_version", FieldKind::String)
        .optional("date", FieldKind::Timestamp)
        .required("delivery_type", FieldKind::String)
        .required("site_id", FieldKind::Uuid)
        .required("type", FieldKind::literal::<DetectType>())
        .required("url", FieldKind::Url)
        .required("web_search_provider", FieldKind::literal::<WebSearchProvider>())
        .build(SchemaConfig::shared())
});

impl Record for CalendarWeek {
    fn schema() -> Result<&'static RecordSchema, DeclarationError> {
        CALENDAR_WEEK.as_ref().map_err(Clone::clone)
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
    use crate::literal::Literal;

    fn payload() -> serde_json::Value {
        json!({
            "auditId": "7c2e4d1b-0a9f-4e8d-b7c6-5a4b3c2d1e0f",
            "baseUrl": "https://www.example.com",
            "calendarWeek": { "week": 41, "year": 2026 },
            "deliveryType": "aem_edge",
            "siteId": "5b1f3c2a-9d4e-4f6a-8b7c-1d2e3f4a5b6c",
            "type": "detect:geo-brand-presence",
            "url": "https://www.example.com/products",
            "webSearchProvider": "chatgpt"
        })
    }

    #[test]
    fn schema_lists_wire_keys_in_order() {
        let schema = DetectMessage::schema().unwrap();
        let keys: Vec<&str> = schema.fields().iter().map(|f| f.external()).collect();
        assert_eq!(
            keys,
            vec![
                "auditId",
                "baseUrl",
                "calendarWeek",
                "configVersion",
                "date",
                "deliveryType",
                "siteId",
                "type",
                "url",
                "webSearchProvider"
            ]
        );
    }

    #[test]
    fn web_search_provider_has_seven_literals() {
        assert_eq!(
            WebSearchProvider::VALUES,
            &[
                "ai_mode",
                "all",
                "chatgpt",
                "copilot",
                "gemini",
                "google_ai_overviews",
                "perplexity"
            ]
        );
    }

    #[test]
    fn parses_minimal_payload_with_defaults() {
        let message = DetectMessage::from_value(payload()).unwrap();
        assert_eq!(message.web_search_provider, WebSearchProvider::Chatgpt);
        assert_eq!(message.r#type, DetectType::GeoBrandPresence);
        assert_eq!(message.calendar_week.week, 41.0);
        assert_eq!(message.calendar_week.year, 2026.0);
        assert!(message.calendar_week.date.is_none());
        assert!(message.config_version.is_none());
        assert!(message.date.is_none());
    }

    #[test]
    fn missing_calendar_week_fields_are_reported_with_paths() {
        let mut value = payload();
        value["calendarWeek"] = json!({ "date": "2026-10-05" });

        let err = DetectMessage::from_value(value).unwrap_err();
        let SchemaError::Validation(err) = err else {
            panic!("expected validation error, got {err}");
        };
        assert_eq!(err.paths(), vec!["calendarWeek.week", "calendarWeek.year"]);
        assert_eq!(err.issue("calendarWeek.week").unwrap().kind, IssueKind::Missing);
    }

    #[test]
    fn serializes_only_present_fields() {
        let message = DetectMessage::from_value(payload()).unwrap();
        let out = message.to_value().unwrap();
        let map = out.as_object().unwrap();
        assert!(!map.contains_key("configVersion"));
        assert!(!map.contains_key("date"));
        assert_eq!(out["calendarWeek"], json!({ "week": 41.0, "year": 2026.0 }));
    }

    #[test]
    fn calendar_week_ranges_use_iso_week() {
        let week = CalendarWeek {
            date: None,
            week: 41.0,
            year: 2026.0,
        };
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let ranges = week.date_ranges(today);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start.date_naive(), NaiveDate::from_ymd_opt(2026, 10, 5).unwrap());
    }

    fn full_payload() -> serde_json::Value {
        let mut value = payload();
        value["calendarWeek"]["date"] = json!("2026-10-05T00:00:00Z");
        value["configVersion"] = json!("v3");
        value["date"] = json!("2026-10-12T08:30:00Z");
        value
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

    #[test]
    fn serde_struct_matches_declared_fields() {
        let message = DetectMessage::from_value(full_payload()).unwrap();
        let out = message.to_value().unwrap();
        assert_eq!(sorted_keys(&out), sorted_externals(DetectMessage::schema().unwrap()));
        assert_eq!(
            sorted_keys(&out["calendarWeek"]),
            sorted_externals(CalendarWeek::schema().unwrap())
        );
    }

    #[test]
    fn non_finite_week_is_refused_on_output() {
        let parsed = DetectMessage::from_value(payload()).unwrap();
        let message = DetectMessage {
            calendar_week: CalendarWeek {
                week: f64::NAN,
                ..parsed.calendar_week.clone()
            },
            ..parsed
        };

        let SchemaError::Validation(err) = message.to_value().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(err.paths(), vec!["calendarWeek.week"]);
        assert_eq!(err.issue("calendarWeek.week").unwrap().kind, IssueKind::NotFinite);
        assert!(message.to_json_string().is_err());

        let week = CalendarWeek {
            date: None,
            week: 41.0,
            year: f64::INFINITY,
        };
        let SchemaError::Validation(err) = week.to_value().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(err.paths(), vec!["year"]);
    }
}
