use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::Path;

use crate::agenda::WeekStart;
use crate::error::WeekError;
use crate::layout::RowHeight;

/// Row height used when nothing else is configured: 40 units per hour.
pub const DEFAULT_ROW_HEIGHT: f64 = 960.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_row_height")]
    pub row_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: default_row_height(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub week_starts_on: WeekStart,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub row_height: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub project: ProjectConfig,
    pub user: UserConfig,
    pub resolved_output: String,
    pub resolved_row_height: f64,
}

impl EffectiveConfig {
    /// The resolved row height, validated.
    ///
    /// # Errors
    ///
    /// Fails when the configured value is not a positive number.
    pub fn row_height(&self) -> Result<RowHeight> {
        RowHeight::new(self.resolved_row_height).context("Invalid configured row_height")
    }
}

/// Load `<root>/.weekgrid/config.toml`, or defaults when it is absent.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".weekgrid/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `<config_dir>/weekgrid/config.toml`, or defaults when it is absent.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("weekgrid/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Merge project and user config with environment overrides.
///
/// # Errors
///
/// Fails on unreadable config files, or with [`WeekError::InvalidParameters`]
/// for a malformed `WEEKGRID_ROW_HEIGHT`.
pub fn resolve_config(project_root: &Path, cli_json: bool) -> Result<EffectiveConfig> {
    let project = load_project_config(project_root)?;
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.clone(), env_format);

    let env_row_height = env::var("WEEKGRID_ROW_HEIGHT").ok();
    let resolved_row_height =
        resolve_row_height(env_row_height.as_deref(), user.row_height, &project.layout)?;

    Ok(EffectiveConfig {
        project,
        user,
        resolved_output,
        resolved_row_height,
    })
}

fn resolve_output(
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "tsv" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if std::io::stdout().is_terminal() {
        "pretty".to_string()
    } else {
        "text".to_string()
    }
}

/// Precedence: env > user config > project config (which carries the default).
fn resolve_row_height(
    env_value: Option<&str>,
    user_value: Option<f64>,
    project: &LayoutConfig,
) -> Result<f64> {
    if let Some(raw) = env_value {
        return raw.trim().parse::<f64>().map_err(|e| {
            WeekError::invalid(format!("WEEKGRID_ROW_HEIGHT is not a number: {raw:?} ({e})"))
                .into()
        });
    }
    Ok(user_value.unwrap_or(project.row_height))
}

const fn default_row_height() -> f64 {
    DEFAULT_ROW_HEIGHT
}
