//! Validated message contracts for geo brand presence detection.
//!
//! Two detect message namespaces share one declarative record system:
//! internal snake_case field names, camelCase wire keys, either spelling
//! accepted on input and only the camelCase one emitted. Construction
//! either yields a fully valid message or a [`ValidationError`] listing
//! every problem found.
//!
//! JSON Schema documents for the wire form can be exported and compiled
//! into a [`SchemaRegistry`] for checking payloads produced elsewhere.

#[macro_use]
pub mod literal;

pub mod calendar;
pub mod config;
pub mod error;
pub mod export;
pub mod field;
pub mod message;
pub mod mystique;
pub mod naming;
mod normalize;
pub mod record;
pub mod registry;
pub mod spacecat;
pub mod types;
mod validator;

pub use config::{RegistryConfig, SchemaConfig, UnknownFields};
pub use error::{
    DeclarationError, FieldIssue, IssueKind, LiteralError, Result, SchemaError, ValidationError,
};
pub use field::{FieldKind, FieldSpec};
pub use literal::Literal;
pub use message::{DetectEvent, DetectType, MessageKind};
pub use record::{Record, RecordSchema};
pub use registry::SchemaRegistry;
pub use types::{AbsoluteUrl, Timestamp};
