//! Message kinds and the event type spanning both namespaces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::config::SchemaConfig;
use crate::error::{DeclarationError, Result, SchemaError};
use crate::record::{Record, RecordSchema};
use crate::{mystique, spacecat};

closed_literal! {
    /// Event discriminator carried in the `type` field of every detect message.
    pub enum DetectType {
        /// Weekly brand presence detection.
        GeoBrandPresence => "detect:geo-brand-presence",
        /// Daily brand presence detection.
        GeoBrandPresenceDaily => "detect:geo-brand-presence-daily",
    }
}

/// Namespace a detect message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Full detection request ([`mystique::DetectMessage`]).
    Mystique,
    /// Lean detection request pointing at a presigned URL ([`spacecat::DetectMessage`]).
    Spacecat,
}

impl MessageKind {
    pub const ALL: [MessageKind; 2] = [MessageKind::Mystique, MessageKind::Spacecat];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Mystique => "mystique",
            MessageKind::Spacecat => "spacecat",
        }
    }

    /// Declared top-level schema for this kind.
    pub fn schema(self) -> std::result::Result<&'static RecordSchema, DeclarationError> {
        match self {
            MessageKind::Mystique => mystique::DetectMessage::schema(),
            MessageKind::Spacecat => spacecat::DetectMessage::schema(),
        }
    }

    /// Guess the kind from payload shape.
    ///
    /// A `data` object means spacecat; a base URL or calendar week (under
    /// either key spelling) means mystique.
    pub fn detect(value: &Value) -> Option<Self> {
        let map = value.as_object()?;

        if map.contains_key("data") {
            return Some(MessageKind::Spacecat);
        }

        const MYSTIQUE_KEYS: [&str; 4] = ["baseUrl", "base_url", "calendarWeek", "calendar_week"];
        MYSTIQUE_KEYS
            .iter()
            .any(|key| map.contains_key(*key))
            .then_some(MessageKind::Mystique)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mystique" => Ok(MessageKind::Mystique),
            "spacecat" => Ok(MessageKind::Spacecat),
            _ => Err(SchemaError::UnknownKind(s.to_string())),
        }
    }
}

/// A validated detect message from either namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectEvent {
    Mystique(mystique::DetectMessage),
    Spacecat(spacecat::DetectMessage),
}

impl DetectEvent {
    /// Validate `value` as a message of `kind`.
    pub fn parse(kind: MessageKind, value: Value) -> Result<Self> {
        let config = kind.schema()?.config();
        Self::parse_with_config(kind, value, config)
    }

    /// Validate `value` as a message of `kind` under an explicit config.
    pub fn parse_with_config(kind: MessageKind, value: Value, config: &SchemaConfig) -> Result<Self> {
        match kind {
            MessageKind::Mystique => {
                mystique::DetectMessage::from_value_with_config(value, config).map(Self::Mystique)
            }
            MessageKind::Spacecat => {
                spacecat::DetectMessage::from_value_with_config(value, config).map(Self::Spacecat)
            }
        }
    }

    /// Detect the kind from payload shape, then validate.
    pub fn parse_detected(value: Value, config: &SchemaConfig) -> Result<Self> {
        let kind = MessageKind::detect(&value).ok_or_else(|| {
            SchemaError::UnknownKind("payload matches neither mystique nor spacecat shape".to_string())
        })?;
        Self::parse_with_config(kind, value, config)
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            DetectEvent::Mystique(_) => MessageKind::Mystique,
            DetectEvent::Spacecat(_) => MessageKind::Spacecat,
        }
    }

    pub fn site_id(&self) -> Uuid {
        match self {
            DetectEvent::Mystique(message) => message.site_id,
            DetectEvent::Spacecat(message) => message.site_id,
        }
    }

    pub fn audit_id(&self) -> Uuid {
        match self {
            DetectEvent::Mystique(message) => message.audit_id,
            DetectEvent::Spacecat(message) => message.audit_id,
        }
    }

    pub fn detect_type(&self) -> DetectType {
        match self {
            DetectEvent::Mystique(message) => message.r#type,
            DetectEvent::Spacecat(message) => message.r#type,
        }
    }

    /// External representation of the wrapped message.
    pub fn to_value(&self) -> Result<Value> {
        match self {
            DetectEvent::Mystique(message) => message.to_value(),
            DetectEvent::Spacecat(message) => message.to_value(),
        }
    }
}
