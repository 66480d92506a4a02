//! Geo brand presence detect message contracts.
//!
//! Both message namespaces are validated at construction, accept snake_case
//! or camelCase keys and emit camelCase only. The `geomsg` binary (behind
//! the `cli` feature) checks, normalizes and describes payloads from files
//! or stdin.
//!
//! # Crate Structure
//!
//! - [`mystique`]: full detect message with calendar week and search provider
//! - [`spacecat`]: lean detect message pointing at a presigned input URL
//! - [`schema`]: the whole contract crate, including JSON Schema export
//! - [`calendar`]: ISO week helpers used to resolve detection date ranges

/// Re-export the contract crate.
pub mod schema {
    pub use geomsg_schema::*;
}

/// Re-export mystique message types.
pub mod mystique {
    pub use geomsg_schema::mystique::*;
}

/// Re-export spacecat message types.
pub mod spacecat {
    pub use geomsg_schema::spacecat::*;
}

/// Re-export calendar week helpers.
pub mod calendar {
    pub use geomsg_schema::calendar::*;
}

pub use geomsg_schema::{
    DetectEvent, DetectType, MessageKind, Record, SchemaConfig, SchemaError, UnknownFields,
    ValidationError,
};
