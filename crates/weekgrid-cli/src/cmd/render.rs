//! `wg render`: lay a week of appointments out and print the placements.

use anyhow::Result;
use chrono::NaiveTime;
use clap::Args;
use std::io::{self, Write};
use std::path::PathBuf;
use weekgrid_core::agenda::{DayView, WeekView};
use weekgrid_core::config::EffectiveConfig;
use weekgrid_core::{RowHeight, WeekAgenda};

use crate::input;
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};

/// Arguments for `wg render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// First day of the week (YYYY-MM-DD, or a full date-time).
    #[arg(long)]
    pub start: String,

    /// JSON file with the appointment array (`-` or omitted reads stdin).
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Handle of the surface the week is drawn on.
    #[arg(short, long, default_value = "#calendar")]
    pub target: String,

    /// Height of a full 24-hour column. Overrides config and environment.
    #[arg(long)]
    pub row_height: Option<f64>,
}

/// Build the week from an appointment document and print its placements.
///
/// # Errors
///
/// Returns [`weekgrid_core::WeekError`] for bad parameters or a non-array
/// document, or an I/O error when the source cannot be read.
pub fn run_render(args: &RenderArgs, output: OutputMode, config: &EffectiveConfig) -> Result<()> {
    let start = input::parse_start(&args.start)?;
    let row_height = match args.row_height {
        Some(h) => RowHeight::new(h)?,
        None => config.row_height()?,
    };

    let text = input::read_source(args.file.as_deref())?;
    let records = input::parse_agenda(&text)?;

    let anchor = config
        .project
        .display
        .week_starts_on
        .anchor(start.date())?
        .and_time(NaiveTime::MIN);
    let mut week = WeekAgenda::new(args.target.as_str(), anchor, &records)?;
    let view = week.view(row_height);

    render_mode(output, &view, render_text, render_pretty)
}

fn render_text(view: &WeekView, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "date\tposition\tstart\ttitle\ttop\theight\tleft_percent\twidth_percent\tslot\tslots"
    )?;
    for day in &view.days {
        for p in &day.placements {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                day.date,
                p.position,
                p.start_time,
                tsv_field(&p.title),
                p.geometry.top,
                p.geometry.height,
                p.geometry.left_percent,
                p.geometry.width_percent,
                p.slot_index,
                p.slot_count,
            )?;
        }
    }
    Ok(())
}

/// Tabs and line breaks would split the row; replace them with spaces.
fn tsv_field(raw: &str) -> String {
    raw.replace(['\t', '\n', '\r'], " ")
}

fn render_pretty(view: &WeekView, w: &mut dyn Write) -> io::Result<()> {
    pretty_kv(w, "Target", &view.target)?;
    pretty_kv(w, "Row height", format!("{}", view.row_height.get()))?;
    writeln!(w)?;

    for day in &view.days {
        render_pretty_day(day, w)?;
        writeln!(w)?;
    }

    if !view.skipped.is_empty() {
        pretty_section(w, &format!("Skipped ({})", view.skipped.len()))?;
        for s in &view.skipped {
            writeln!(w, "  #{:<4} {}  {}", s.index, s.code, s.reason)?;
        }
        pretty_rule(w)?;
    }
    Ok(())
}

fn render_pretty_day(day: &DayView, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &day.label)?;
    if day.placements.is_empty() {
        return writeln!(w, "  (no appointments)");
    }
    for p in &day.placements {
        let title = if p.title.is_empty() { "(untitled)" } else { &p.title };
        writeln!(w, "  {} - {title}", p.start_time)?;
        writeln!(
            w,
            "      top {:.1}  height {:.1}  left {:.2}%  width {:.2}%  slot {}/{}",
            p.geometry.top,
            p.geometry.height,
            p.geometry.left_percent,
            p.geometry.width_percent,
            p.slot_index + 1,
            p.slot_count,
        )?;
    }
    Ok(())
}
