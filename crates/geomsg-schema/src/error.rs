use std::fmt;

use crate::message::MessageKind;

/// Errors that can occur while declaring, parsing or checking messages.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A record type was declared with clashing field names.
    #[error("invalid record declaration: {0}")]
    Declaration(#[from] DeclarationError),

    /// A payload did not satisfy its record schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The payload is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A JSON Schema document could not be compiled.
    #[error("failed to compile schema: {0}")]
    CompileFailed(String),

    /// A document failed JSON Schema validation.
    #[error("{kind} document violates its JSON Schema: {message}")]
    SchemaViolation { kind: MessageKind, message: String },

    /// No JSON Schema registered for the given kind.
    #[error("no schema registered for {0} messages")]
    NoSchema(MessageKind),

    /// A message kind name or payload shape was not recognized.
    #[error("unknown message kind: {0}")]
    UnknownKind(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;

/// A record declaration whose fields cannot be told apart on the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    /// The same internal name appears twice.
    #[error("{record} declares field {field:?} more than once")]
    DuplicateField { record: &'static str, field: &'static str },

    /// Two fields map to the same external key.
    #[error("{record} fields {first:?} and {second:?} both map to external key {external:?}")]
    NameCollision {
        record: &'static str,
        external: String,
        first: &'static str,
        second: &'static str,
    },

    /// A field's internal name equals another field's external key.
    #[error("{record} key {key:?} names field {internal_of:?} and is the external key of {external_of:?}")]
    AmbiguousKey {
        record: &'static str,
        key: String,
        internal_of: &'static str,
        external_of: &'static str,
    },
}

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// A required field is absent.
    Missing,
    /// The value has the wrong JSON type and cannot be coerced.
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    /// A literal field holds a value outside its closed set.
    NotInEnum {
        value: String,
        allowed: &'static [&'static str],
    },
    /// A UUID field is not a syntactically valid UUID.
    MalformedUuid(String),
    /// A URL field is not an absolute URL with a host.
    MalformedUrl(String),
    /// A timestamp field could not be parsed.
    MalformedTimestamp(String),
    /// A number field holds NaN or an infinity, which JSON cannot carry.
    NotFinite,
    /// The key matches no declared field.
    UnknownField,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Missing => f.write_str("field required"),
            IssueKind::WrongType { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            IssueKind::NotInEnum { value, allowed } => {
                write!(f, "{value:?} is not one of [{}]", allowed.join(", "))
            }
            IssueKind::MalformedUuid(reason) => write!(f, "invalid UUID: {reason}"),
            IssueKind::MalformedUrl(reason) => write!(f, "invalid URL: {reason}"),
            IssueKind::MalformedTimestamp(reason) => write!(f, "invalid timestamp: {reason}"),
            IssueKind::NotFinite => f.write_str("number is not finite"),
            IssueKind::UnknownField => f.write_str("unknown field"),
        }
    }
}

/// One rejected field, addressed by its dotted external path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub path: String,
    pub kind: IssueKind,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, kind: IssueKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

/// Every field issue found while constructing one record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{record} failed validation: {}", join_issues(.issues))]
pub struct ValidationError {
    record: &'static str,
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new(record: &'static str, issues: Vec<FieldIssue>) -> Self {
        Self { record, issues }
    }

    /// Name of the record that failed.
    pub fn record(&self) -> &'static str {
        self.record
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// First issue reported for `path`, if any.
    pub fn issue(&self, path: &str) -> Option<&FieldIssue> {
        self.issues.iter().find(|issue| issue.path == path)
    }

    /// Paths of every failing field, in report order.
    pub fn paths(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.path.as_str()).collect()
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A string that is not a member of a closed literal set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{value:?} is not a valid {name}; expected one of [{}]", .allowed.join(", "))]
pub struct LiteralError {
    pub name: &'static str,
    pub value: String,
    pub allowed: &'static [&'static str],
}
