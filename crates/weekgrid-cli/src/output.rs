//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for scripts, or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` flag
//! 2. `--json` flag
//! 3. `FORMAT` env var, then the user config `output` key
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.
//!
//! Steps 2 to 4 are resolved by `weekgrid_core::config`.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};
use weekgrid_core::{ErrorCode, WeekError};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, visual framing).
    Pretty,
    /// Tab-separated rows for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Parse a mode already normalized by config resolution.
    fn from_resolved(raw: &str) -> Self {
        match raw {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Text,
        }
    }
}

/// Resolve the output mode from the explicit flag or the config-resolved value.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, resolved: &str) -> OutputMode {
    format_flag.unwrap_or_else(|| OutputMode::from_resolved(resolved))
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_mode_to(&mut out, mode, value, text_fn, pretty_fn)
}

fn render_mode_to<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E1001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create an error from a stable code, with its hint as the suggestion.
    pub fn from_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Convert a [`WeekError`] into a [`CliError`].
impl From<&WeekError> for CliError {
    fn from(err: &WeekError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: Some(err.suggestion()),
            error_code: Some(err.error_code().to_string()),
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    render_error_to(&mut out, mode, error)
}

fn render_error_to(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_flag_wins_over_resolved_value() {
        assert_eq!(resolve_output_mode(Some(OutputMode::Text), "json"), OutputMode::Text);
        assert_eq!(resolve_output_mode(None, "json"), OutputMode::Json);
        assert_eq!(resolve_output_mode(None, "pretty"), OutputMode::Pretty);
        assert_eq!(resolve_output_mode(None, "text"), OutputMode::Text);
    }

    #[test]
    fn output_mode_is_json() {
        assert!(OutputMode::Json.is_json());
        assert!(!OutputMode::Pretty.is_json());
        assert!(!OutputMode::Text.is_json());
    }

    #[test]
    fn json_mode_serializes_value() {
        let mut buf = Vec::new();
        render_mode_to(
            &mut buf,
            OutputMode::Json,
            &serde_json::json!({"days": 7}),
            |_, _| Ok(()),
            |_, _| Ok(()),
        )
        .expect("render");
        let parsed: serde_json::Value = serde_json::from_slice(&buf).expect("valid JSON");
        assert_eq!(parsed["days"], 7);
    }

    #[test]
    fn text_and_pretty_use_their_renderers() {
        let mut buf = Vec::new();
        render_mode_to(
            &mut buf,
            OutputMode::Text,
            &1_u8,
            |v, w| writeln!(w, "text {v}"),
            |v, w| writeln!(w, "pretty {v}"),
        )
        .expect("render");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "text 1\n");

        let mut buf = Vec::new();
        render_mode_to(
            &mut buf,
            OutputMode::Pretty,
            &1_u8,
            |v, w| writeln!(w, "text {v}"),
            |v, w| writeln!(w, "pretty {v}"),
        )
        .expect("render");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "pretty 1\n");
    }

    #[test]
    fn week_error_converts_with_code_and_suggestion() {
        let err = WeekError::InvalidParameters {
            reason: "target must not be empty".to_string(),
        };
        let cli: CliError = (&err).into();
        assert_eq!(cli.error_code.as_deref(), Some("E1001"));
        assert!(cli.message.contains("target must not be empty"));
        assert!(cli.suggestion.is_some());
    }

    #[test]
    fn error_renders_as_json_wrapper() {
        let mut buf = Vec::new();
        let error = CliError::from_code(ErrorCode::InvalidParameters, "bad start");
        render_error_to(&mut buf, OutputMode::Json, &error).expect("render");
        let parsed: serde_json::Value = serde_json::from_slice(&buf).expect("valid JSON");
        assert_eq!(parsed["error"]["message"], "bad start");
        assert_eq!(parsed["error"]["error_code"], "E1001");
    }

    #[test]
    fn error_renders_as_text_with_suggestion() {
        let mut buf = Vec::new();
        let error = CliError::from_code(ErrorCode::InvalidParameters, "bad start");
        render_error_to(&mut buf, OutputMode::Text, &error).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("error: bad start\n"));
        assert!(text.contains("suggestion:"));
    }
}
