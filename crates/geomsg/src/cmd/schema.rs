use geomsg_schema::export::json_schema;
use geomsg_schema::MessageKind;
use serde_json::Value;

use crate::cmd::SchemaArgs;
use crate::exit::{schema_error, CliResult, SUCCESS};
use crate::output::{print_json, print_json_pretty, table, OutputFormat};

pub fn run(args: SchemaArgs, format: OutputFormat) -> CliResult<i32> {
    let kind = MessageKind::from(args.kind);
    let record = kind
        .schema()
        .map_err(|err| schema_error(&format!("load {kind} schema"), err.into()))?;
    let document = json_schema(record);

    match format {
        OutputFormat::Json => print_json(&document),
        OutputFormat::Pretty => print_json_pretty(&document),
        OutputFormat::Table => {
            let mut properties = table(vec!["PROPERTY", "TYPE", "FORMAT", "REQUIRED"]);
            for row in property_rows("", &document) {
                properties.add_row(row);
            }
            println!("{properties}");
        }
    }

    Ok(SUCCESS)
}

/// One row per property, nested objects flattened with dotted names.
fn property_rows(prefix: &str, schema: &Value) -> Vec<Vec<String>> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut rows = Vec::new();
    for (name, property) in properties {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        let format = match property.get("enum").and_then(Value::as_array) {
            Some(values) => values
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" | "),
            None => text(property, "format"),
        };
        rows.push(vec![
            path.clone(),
            text(property, "type"),
            format,
            required.contains(&name.as_str()).to_string(),
        ]);
        rows.extend(property_rows(&path, property));
    }
    rows
}

fn text(schema: &Value, key: &str) -> String {
    schema
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacecat_rows_include_nested_data_fields() {
        let record = MessageKind::Spacecat.schema().unwrap();
        let rows = property_rows("", &json_schema(record));

        let presigned = rows
            .iter()
            .find(|row| row[0] == "data.presignedUrl")
            .unwrap();
        assert_eq!(presigned[1..].join(" "), "string uri true");

        let week = rows.iter().find(|row| row[0] == "data.week").unwrap();
        assert_eq!(week[3], "false");

        let kind = rows.iter().find(|row| row[0] == "type").unwrap();
        assert_eq!(
            kind[2],
            "detect:geo-brand-presence | detect:geo-brand-presence-daily"
        );
    }
}
