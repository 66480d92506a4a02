use geomsg_schema::DetectEvent;

use crate::cmd::{read_payload, PayloadArgs};
use crate::exit::{schema_error, CliResult, SUCCESS};
use crate::output::{flatten, print_json, print_json_pretty, table, OutputFormat};

pub fn run(args: PayloadArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = read_payload(&args.input)?;
    let kind = args.kind.resolve(&payload)?;
    let config = args.config();
    tracing::debug!(%kind, source = %args.source(), "normalizing payload");

    let context = format!("normalize {}", args.source());
    let canonical = DetectEvent::parse_with_config(kind, payload, &config)
        .and_then(|event| event.to_value())
        .map_err(|err| schema_error(&context, err))?;

    match format {
        OutputFormat::Json => print_json(&canonical),
        OutputFormat::Pretty => print_json_pretty(&canonical),
        OutputFormat::Table => {
            let mut fields = table(vec!["FIELD", "VALUE"]);
            for (path, value) in flatten(&canonical) {
                fields.add_row(vec![path, value]);
            }
            println!("{fields}");
        }
    }

    Ok(SUCCESS)
}
