use anyhow::{Context, Result, bail};
use clap::Args;
use std::io::{self, Write};
use std::path::Path;
use toml::Value;
use weekgrid_core::agenda::WeekStart;
use weekgrid_core::config::EffectiveConfig;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `wg config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show the raw project config file instead of the resolved values.
    #[arg(long)]
    pub project: bool,
}

/// Print the effective configuration, or the raw project file with `--project`.
///
/// # Errors
///
/// Fails when the project config cannot be read or output cannot be written.
pub fn run_config(
    args: &ConfigArgs,
    project_root: &Path,
    output: OutputMode,
    effective: &EffectiveConfig,
) -> Result<()> {
    if args.project {
        let value = load_toml_table(&project_root.join(".weekgrid/config.toml"))?;
        return print_toml_or_json(&value, output);
    }

    render_mode(output, effective, print_text, print_pretty)
}

fn load_toml_table(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Table(toml::map::Map::new()));
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let value: Value =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;

    if !value.is_table() {
        bail!("{} must contain a top-level TOML table", path.display());
    }

    Ok(value)
}

fn print_toml_or_json(value: &Value, output: OutputMode) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if output.is_json() {
        serde_json::to_writer_pretty(&mut out, value)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", toml::to_string_pretty(value)?)?;
    }
    Ok(())
}

fn print_text(value: &EffectiveConfig, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "resolved_output={}", value.resolved_output)?;
    writeln!(w, "resolved_row_height={}", value.resolved_row_height)?;
    writeln!(w, "layout.row_height={}", value.project.layout.row_height)?;
    writeln!(
        w,
        "display.week_starts_on={}",
        week_start_name(value.project.display.week_starts_on)
    )?;
    if let Some(out) = &value.user.output {
        writeln!(w, "user.output={out}")?;
    }
    if let Some(h) = value.user.row_height {
        writeln!(w, "user.row_height={h}")?;
    }
    Ok(())
}

fn print_pretty(value: &EffectiveConfig, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Resolved")?;
    pretty_kv(w, "output", &value.resolved_output)?;
    pretty_kv(w, "row height", value.resolved_row_height.to_string())?;
    writeln!(w)?;
    pretty_section(w, "Project (.weekgrid/config.toml)")?;
    pretty_kv(w, "row height", value.project.layout.row_height.to_string())?;
    pretty_kv(
        w,
        "week start",
        week_start_name(value.project.display.week_starts_on),
    )?;
    writeln!(w)?;
    pretty_section(w, "User")?;
    pretty_kv(w, "output", value.user.output.as_deref().unwrap_or("(unset)"))?;
    pretty_kv(
        w,
        "row height",
        value
            .user
            .row_height
            .map_or_else(|| "(unset)".to_string(), |h| h.to_string()),
    )
}

const fn week_start_name(start: WeekStart) -> &'static str {
    match start {
        WeekStart::Given => "given",
        WeekStart::Monday => "monday",
        WeekStart::Sunday => "sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weekgrid_core::config::{ProjectConfig, UserConfig};

    fn effective() -> EffectiveConfig {
        let mut project = ProjectConfig::default();
        project.display.week_starts_on = WeekStart::Sunday;
        EffectiveConfig {
            project,
            user: UserConfig {
                output: Some("json".to_string()),
                row_height: None,
            },
            resolved_output: "json".to_string(),
            resolved_row_height: 960.0,
        }
    }

    #[test]
    fn text_lists_resolved_and_source_values() {
        let mut buf = Vec::new();
        print_text(&effective(), &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("resolved_output=json\n"));
        assert!(text.contains("resolved_row_height=960\n"));
        assert!(text.contains("display.week_starts_on=sunday\n"));
        assert!(text.contains("user.output=json\n"));
        assert!(!text.contains("user.row_height"));
    }

    #[test]
    fn pretty_marks_unset_user_values() {
        let mut buf = Vec::new();
        print_pretty(&effective(), &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("week start:  sunday"));
        assert!(text.contains("(unset)"));
    }

    #[test]
    fn missing_project_file_is_an_empty_table() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let value = load_toml_table(&dir.path().join("config.toml")).expect("load");
        assert_eq!(value, Value::Table(toml::map::Map::new()));
    }
}
