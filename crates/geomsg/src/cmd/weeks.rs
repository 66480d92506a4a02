use chrono::{NaiveDate, Utc};
use geomsg_schema::calendar::{self, DateRange, WeekOfYear};
use serde::Serialize;

use crate::cmd::WeeksArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, table, OutputFormat};

#[derive(Debug, Serialize)]
struct WeekOutput {
    week: u32,
    year: i32,
    ranges: Vec<DateRange>,
}

#[derive(Debug, Serialize)]
struct WeeksOutput {
    schema_id: &'static str,
    today: NaiveDate,
    weeks: Vec<WeekOutput>,
}

pub fn run(args: WeeksArgs, format: OutputFormat) -> CliResult<i32> {
    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    let output = WeeksOutput {
        schema_id: "https://schemas.3leaps.dev/geomsg/cli/v1/weeks.schema.json",
        today,
        weeks: select_weeks(&args, today)
            .into_iter()
            .map(|week| WeekOutput {
                week: week.week,
                year: week.year,
                ranges: calendar::date_ranges(week.week, week.year, today),
            })
            .collect(),
    };

    match format {
        OutputFormat::Json => print_json(&output),
        OutputFormat::Table => {
            let mut weeks = table(vec!["WEEK", "YEAR", "MONTH", "START", "END"]);
            for week in &output.weeks {
                for range in &week.ranges {
                    weeks.add_row(vec![
                        week.week.to_string(),
                        week.year.to_string(),
                        format!("{}-{:02}", range.year, range.month),
                        range.start.to_rfc3339(),
                        range.end.to_rfc3339(),
                    ]);
                }
            }
            println!("{weeks}");
        }
        OutputFormat::Pretty => {
            for week in &output.weeks {
                println!("{}-W{:02}", week.year, week.week);
                for range in &week.ranges {
                    println!("  {} .. {}", range.start, range.end);
                }
            }
        }
    }

    Ok(SUCCESS)
}

fn select_weeks(args: &WeeksArgs, today: NaiveDate) -> Vec<WeekOfYear> {
    let (Some(week), Some(year)) = (args.week, args.year) else {
        return calendar::last_weeks(usize::from(args.count), today);
    };

    if calendar::is_valid_week(week, year) {
        return vec![WeekOfYear::new(week, year)];
    }

    let fallback = calendar::last_full_calendar_week(today);
    tracing::warn!(
        week,
        year,
        fallback_week = fallback.week,
        fallback_year = fallback.year,
        "not a valid ISO week, using last full week"
    );
    vec![fallback]
}
