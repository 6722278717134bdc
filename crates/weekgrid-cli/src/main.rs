#![forbid(unsafe_code)]

mod cmd;
mod input;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use weekgrid_core::config::resolve_config;
use weekgrid_core::{ErrorCode, WeekError};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "wg: lay out a week of appointments",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format. Overrides --json, FORMAT and the user config.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Output mode before any config file has been read.
    fn fallback_output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, if self.json { "json" } else { "text" })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Layout",
        about = "Lay out a week of appointments",
        long_about = "Read a JSON array of {start_date, end_date, title} records and print where each appointment sits in the seven-day grid.",
        after_help = "EXAMPLES:\n    # Lay out a file starting on a Monday\n    wg render --start 2024-01-01 --file week.json\n\n    # Read from stdin with a custom column height\n    cat week.json | wg render --start 2024-01-01 --row-height 480\n\n    # Emit machine-readable output\n    wg render --start 2024-01-01 --file week.json --json"
    )]
    Render(cmd::render::RenderArgs),

    #[command(
        next_help_heading = "Layout",
        about = "Print the seven day headers",
        long_about = "Print the column header label of each day in the week.",
        after_help = "EXAMPLES:\n    # Headers for the week of Jan 1st\n    wg headers --start 2024-01-01\n\n    # Emit machine-readable output\n    wg headers --start 2024-01-01 --json"
    )]
    Headers(cmd::headers::HeadersArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Show configuration",
        long_about = "Show the effective configuration after merging project config, user config and environment.",
        after_help = "EXAMPLES:\n    # Show resolved values\n    wg config\n\n    # Show the raw project file\n    wg config --project"
    )]
    Config(cmd::config::ConfigArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        long_about = "Print a shell completion script for wg.",
        after_help = "EXAMPLES:\n    # Install bash completions\n    wg completions bash > ~/.local/share/bash-completion/completions/wg"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("WEEKGRID_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "weekgrid=debug,info"
        } else if quiet {
            "error"
        } else {
            "weekgrid=info,warn"
        })
    });

    let format = env::var("WEEKGRID_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Map a command failure onto the structured error shape.
fn to_cli_error(err: &anyhow::Error) -> CliError {
    err.downcast_ref::<WeekError>().map_or_else(
        || CliError {
            message: format!("{err:#}"),
            suggestion: None,
            error_code: None,
        },
        CliError::from,
    )
}

/// Bad environment overrides are parameter errors; anything else is the config file.
fn config_error(err: &anyhow::Error) -> CliError {
    err.downcast_ref::<WeekError>().map_or_else(
        || CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
        CliError::from,
    )
}

fn report(mode: OutputMode, error: &CliError) -> ExitCode {
    if let Err(e) = render_error(mode, error) {
        eprintln!("error: {} ({e})", error.message);
    }
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return match cmd::completions::run_completions(args.shell, &mut command) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => report(cli.fallback_output_mode(), &to_cli_error(&e)),
        };
    }

    let project_root = match env::current_dir() {
        Ok(root) => root,
        Err(e) => {
            let error = CliError::from_code(
                ErrorCode::InternalUnexpected,
                format!("cannot resolve current directory: {e}"),
            );
            return report(cli.fallback_output_mode(), &error);
        }
    };

    let effective = match resolve_config(&project_root, cli.json) {
        Ok(config) => config,
        Err(e) => {
            let error = config_error(&e);
            return report(cli.fallback_output_mode(), &error);
        }
    };
    let output = resolve_output_mode(cli.format, &effective.resolved_output);

    let command_result = match &cli.command {
        Commands::Render(args) => cmd::render::run_render(args, output, &effective),
        Commands::Headers(args) => cmd::headers::run_headers(args, output, &effective),
        Commands::Config(args) => {
            cmd::config::run_config(args, &project_root, output, &effective)
        }
        Commands::Completions(_) => Ok(()),
    };

    match command_result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(output, &to_cli_error(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_parses_before_and_after_subcommand() {
        let cli = Cli::parse_from(["wg", "--json", "headers", "--start", "2024-01-01"]);
        assert!(cli.json);
        assert!(cli.fallback_output_mode().is_json());

        let cli = Cli::parse_from(["wg", "headers", "--start", "2024-01-01", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn format_flag_overrides_json() {
        let cli = Cli::parse_from([
            "wg", "--json", "--format", "pretty", "headers", "--start", "2024-01-01",
        ]);
        assert_eq!(cli.fallback_output_mode(), OutputMode::Pretty);
    }

    #[test]
    fn default_fallback_is_text() {
        let cli = Cli::parse_from(["wg", "config"]);
        assert!(!cli.json);
        assert_eq!(cli.fallback_output_mode(), OutputMode::Text);
    }

    #[test]
    fn render_subcommand_parses() {
        let cli = Cli::parse_from([
            "wg", "render", "--start", "2024-01-01", "--file", "-", "--verbose",
        ]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Render(_)));
    }

    #[test]
    fn completions_require_known_shell() {
        assert!(Cli::try_parse_from(["wg", "completions", "bash"]).is_ok());
        assert!(Cli::try_parse_from(["wg", "completions", "cmd.exe"]).is_err());
    }

    #[test]
    fn week_errors_keep_their_code() {
        let err = anyhow::Error::new(WeekError::InvalidParameters {
            reason: "agenda must be a list of appointments".to_string(),
        });
        let cli = to_cli_error(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E1001"));

        let other = to_cli_error(&anyhow::anyhow!("disk on fire"));
        assert_eq!(other.error_code, None);
        assert_eq!(other.message, "disk on fire");
    }

    #[test]
    fn config_failures_split_env_from_file_errors() {
        let env = anyhow::Error::new(WeekError::InvalidParameters {
            reason: "WEEKGRID_ROW_HEIGHT is not a number: \"tall\"".to_string(),
        });
        let cli = config_error(&env);
        assert_eq!(cli.error_code.as_deref(), Some("E1001"));
        assert!(cli.message.contains("WEEKGRID_ROW_HEIGHT"));

        let file = config_error(&anyhow::anyhow!("Failed to parse .weekgrid/config.toml"));
        assert_eq!(file.error_code.as_deref(), Some("E1002"));
    }
}
