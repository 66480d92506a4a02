use crate::literal::Literal;
use crate::record::RecordSchema;

/// Declared type constraint of a record field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Syntactically valid UUID string.
    Uuid,
    /// Absolute URL with scheme and host.
    Url,
    /// Timestamp string, normalized to RFC 3339 UTC.
    Timestamp,
    /// Floating-point number; numeric strings are coerced.
    Number,
    /// Any string.
    String,
    /// One of a closed set of exact strings.
    Literal(&'static [&'static str]),
    /// Nested record declared with the same config.
    Record(&'static RecordSchema),
}

impl FieldKind {
    /// Literal kind for a closed enum type.
    pub fn literal<T: Literal>() -> Self {
        FieldKind::Literal(T::VALUES)
    }

    /// Short type description used in issues and schema listings.
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Uuid => "UUID string",
            FieldKind::Url => "URL string",
            FieldKind::Timestamp => "timestamp string",
            FieldKind::Number => "number",
            FieldKind::String => "string",
            FieldKind::Literal(_) => "literal string",
            FieldKind::Record(_) => "object",
        }
    }
}

/// One declared field: its two names, its type and whether it is required.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    internal: &'static str,
    external: String,
    kind: FieldKind,
    required: bool,
}

impl FieldSpec {
    pub(crate) fn new(
        internal: &'static str,
        external: String,
        kind: FieldKind,
        required: bool,
    ) -> Self {
        Self {
            internal,
            external,
            kind,
            required,
        }
    }

    /// Name used by code (`web_search_provider`).
    pub fn internal(&self) -> &'static str {
        self.internal
    }

    /// Name used on the wire (`webSearchProvider`).
    pub fn external(&self) -> &str {
        &self.external
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}
