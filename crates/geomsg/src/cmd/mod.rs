use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use geomsg_schema::{MessageKind, SchemaConfig, SchemaError, UnknownFields};
use serde_json::Value;

use crate::exit::{io_error, schema_error, CliError, CliResult, DATA_INVALID};
use crate::output::OutputFormat;

pub mod normalize;
pub mod schema;
pub mod validate;
pub mod version;
pub mod weeks;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a detect message and report every invalid field.
    Validate(PayloadArgs),
    /// Print the canonical camelCase form of a detect message.
    Normalize(PayloadArgs),
    /// Print the JSON Schema of a message kind.
    Schema(SchemaArgs),
    /// Print recent full calendar weeks and their UTC date ranges.
    Weeks(WeeksArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Validate(args) => validate::run(args, format),
        Command::Normalize(args) => normalize::run(args, format),
        Command::Schema(args) => schema::run(args, format),
        Command::Weeks(args) => weeks::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Pick the kind from payload shape.
    Auto,
    Mystique,
    Spacecat,
}

impl KindArg {
    pub fn resolve(self, payload: &Value) -> CliResult<MessageKind> {
        match self {
            KindArg::Mystique => Ok(MessageKind::Mystique),
            KindArg::Spacecat => Ok(MessageKind::Spacecat),
            KindArg::Auto => MessageKind::detect(payload).ok_or_else(|| {
                schema_error(
                    "detect message kind",
                    SchemaError::UnknownKind(
                        "payload has neither `data` nor a base URL or calendar week; pass --kind"
                            .to_string(),
                    ),
                )
            }),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum UnknownFieldsArg {
    Reject,
    Ignore,
}

impl From<UnknownFieldsArg> for UnknownFields {
    fn from(arg: UnknownFieldsArg) -> Self {
        match arg {
            UnknownFieldsArg::Reject => UnknownFields::Reject,
            UnknownFieldsArg::Ignore => UnknownFields::Ignore,
        }
    }
}

#[derive(Args, Debug)]
pub struct PayloadArgs {
    /// JSON file to read, or `-` for stdin.
    #[arg(value_name = "FILE|-")]
    pub input: PathBuf,
    /// Message kind of the payload.
    #[arg(long, value_enum, default_value = "auto")]
    pub kind: KindArg,
    /// What to do with keys that match no declared field.
    #[arg(long, value_enum, default_value = "reject", env = "GEOMSG_UNKNOWN_FIELDS")]
    pub unknown_fields: UnknownFieldsArg,
}

impl PayloadArgs {
    pub fn config(&self) -> SchemaConfig {
        SchemaConfig::shared().with_unknown_fields(self.unknown_fields.into())
    }

    pub fn source(&self) -> String {
        if is_stdin(&self.input) {
            "<stdin>".to_string()
        } else {
            self.input.display().to_string()
        }
    }
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Message kind to describe.
    #[arg(value_enum)]
    pub kind: SchemaKindArg,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SchemaKindArg {
    Mystique,
    Spacecat,
}

impl From<SchemaKindArg> for MessageKind {
    fn from(arg: SchemaKindArg) -> Self {
        match arg {
            SchemaKindArg::Mystique => MessageKind::Mystique,
            SchemaKindArg::Spacecat => MessageKind::Spacecat,
        }
    }
}

#[derive(Args, Debug)]
pub struct WeeksArgs {
    /// Number of most recent full weeks to list (1 to 520).
    #[arg(
        long,
        default_value = "1",
        conflicts_with = "week",
        value_parser = clap::value_parser!(u16).range(1..=520)
    )]
    pub count: u16,
    /// Show a specific ISO week instead (requires --year).
    #[arg(long, requires = "year")]
    pub week: Option<u32>,
    /// ISO week-numbering year for --week.
    #[arg(long, requires = "week")]
    pub year: Option<i32>,
    /// Reference date (YYYY-MM-DD) instead of the current UTC date.
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read and parse the JSON payload named by `path`.
pub fn read_payload(path: &Path) -> CliResult<Value> {
    let bytes = if is_stdin(path) {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|err| io_error("read stdin", err))?;
        buf
    } else {
        std::fs::read(path).map_err(|err| io_error(&format!("read {}", path.display()), err))?
    };

    serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("parse {}: payload is not valid JSON: {err}", path.display()),
        )
    })
}
