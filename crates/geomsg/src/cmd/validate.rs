use geomsg_schema::{DetectEvent, MessageKind, SchemaError};
use serde::Serialize;

use crate::cmd::{read_payload, PayloadArgs};
use crate::exit::{schema_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_json, table, OutputFormat};

#[derive(Debug, Serialize)]
struct IssueOutput {
    path: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct ValidateOutput {
    schema_id: &'static str,
    source: String,
    kind: MessageKind,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    site_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    audit_id: Option<String>,
    issues: Vec<IssueOutput>,
}

pub fn run(args: PayloadArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = read_payload(&args.input)?;
    let kind = args.kind.resolve(&payload)?;
    let config = args.config();
    tracing::debug!(%kind, source = %args.source(), unknown_fields = ?config.unknown_fields, "validating payload");

    let mut output = ValidateOutput {
        schema_id: "https://schemas.3leaps.dev/geomsg/cli/v1/validate-report.schema.json",
        source: args.source(),
        kind,
        valid: false,
        site_id: None,
        audit_id: None,
        issues: Vec::new(),
    };

    match DetectEvent::parse_with_config(kind, payload, &config) {
        Ok(event) => {
            output.valid = true;
            output.site_id = Some(event.site_id().to_string());
            output.audit_id = Some(event.audit_id().to_string());
        }
        Err(SchemaError::Validation(err)) => {
            tracing::info!(%kind, issues = err.issues().len(), "payload rejected");
            output.issues = err
                .issues()
                .iter()
                .map(|issue| IssueOutput {
                    path: issue.path.clone(),
                    message: issue.kind.to_string(),
                })
                .collect();
        }
        Err(err) => return Err(schema_error("validate", err)),
    }

    print_report(&output, format);
    Ok(if output.valid { SUCCESS } else { DATA_INVALID })
}

fn print_report(output: &ValidateOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table => {
            if output.valid {
                let mut report = table(vec!["SOURCE", "KIND", "SITE", "AUDIT"]);
                report.add_row(vec![
                    output.source.clone(),
                    output.kind.to_string(),
                    output.site_id.clone().unwrap_or_default(),
                    output.audit_id.clone().unwrap_or_default(),
                ]);
                println!("{report}");
            } else {
                let mut report = table(vec!["FIELD", "ISSUE"]);
                for issue in &output.issues {
                    report.add_row(vec![display_path(&issue.path), issue.message.clone()]);
                }
                println!("{report}");
            }
        }
        OutputFormat::Pretty => {
            if output.valid {
                println!("{}: valid {} message", output.source, output.kind);
                return;
            }
            println!(
                "{}: invalid {} message ({} issue{})",
                output.source,
                output.kind,
                output.issues.len(),
                if output.issues.len() == 1 { "" } else { "s" }
            );
            for issue in &output.issues {
                println!("  {:<24} {}", display_path(&issue.path), issue.message);
            }
        }
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}
