//! `wg headers`: print the seven day-column labels of a week.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use weekgrid_core::agenda::week_labels;
use weekgrid_core::config::EffectiveConfig;

use crate::input;
use crate::output::{OutputMode, pretty_section, render_mode};

/// Arguments for `wg headers`.
#[derive(Args, Debug)]
pub struct HeadersArgs {
    /// First day of the week (YYYY-MM-DD, or a full date-time).
    #[arg(long)]
    pub start: String,
}

#[derive(Debug, Serialize)]
struct WeekHeaders {
    start_day: NaiveDate,
    labels: Vec<String>,
}

/// Print the seven column header labels.
///
/// # Errors
///
/// Returns [`weekgrid_core::WeekError`] for a malformed start date.
pub fn run_headers(args: &HeadersArgs, output: OutputMode, config: &EffectiveConfig) -> Result<()> {
    let start = input::parse_start(&args.start)?;
    let start_day = config.project.display.week_starts_on.anchor(start.date())?;
    let headers = WeekHeaders {
        start_day,
        labels: week_labels(start_day)?,
    };

    render_mode(
        output,
        &headers,
        |h, w| {
            for label in &h.labels {
                writeln!(w, "{label}")?;
            }
            Ok(())
        },
        |h, w| {
            pretty_section(w, &format!("Week of {}", h.start_day))?;
            for (i, label) in h.labels.iter().enumerate() {
                writeln!(w, "  {}. {label}", i + 1)?;
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: HeadersArgs,
    }

    #[test]
    fn headers_args_require_start() {
        assert!(Wrapper::try_parse_from(["test"]).is_err());
        let w = Wrapper::parse_from(["test", "--start", "2024-01-01"]);
        assert_eq!(w.args.start, "2024-01-01");
    }

    #[test]
    fn headers_serialize_labels() {
        let start_day = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let headers = WeekHeaders {
            start_day,
            labels: week_labels(start_day).expect("in range"),
        };
        let json = serde_json::to_value(&headers).expect("serialize");
        assert_eq!(json["start_day"], "2024-01-01");
        assert_eq!(json["labels"][0], "Mon Jan 01 2024");
        assert_eq!(json["labels"].as_array().map(Vec::len), Some(7));
    }
}
