mod commands;
mod config;
mod documents;
mod logging;
mod render;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use remedy_core::{DeadlineUnit, StepResult};

use crate::config::Settings;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Remedy and mission orchestration engine.
#[derive(Parser)]
#[command(name = "remedy", version, about = "Remedy and mission orchestration engine")]
struct Cli {
    /// Configuration file (TOML). Defaults to ./remedy.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// State document holding every remedy and mission
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Archive file (JSON Lines) receiving closed instances
    #[arg(long, global = true)]
    archive: Option<PathBuf>,

    /// Catalog file to use instead of the built-in catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List remedy definitions and mission playbooks
    Catalog,

    /// Check a catalog file against the catalog schema and its structural rules
    Validate {
        /// Path to the catalog JSON file
        file: PathBuf,
    },

    /// Compute a response deadline
    Deadline {
        /// Start instant (RFC 3339)
        #[arg(long)]
        start: String,
        /// Number of days
        #[arg(long)]
        count: u32,
        /// calendar or business
        #[arg(long, default_value = "business")]
        unit: DeadlineUnit,
    },

    /// Start a standalone remedy
    Initiate {
        /// Remedy definition id
        definition: String,
        /// Context variable, KEY=VALUE (repeatable)
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },

    /// Report the outcome of a remedy's current step
    Report {
        /// Remedy instance id
        instance: String,
        /// success or failure
        result: StepResult,
        /// Free-form note stored in the history entry
        #[arg(long)]
        notes: Option<String>,
    },

    /// Launch a mission
    Launch {
        /// Mission playbook id
        playbook: String,
        /// Context variable, KEY=VALUE (repeatable)
        #[arg(long = "var", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },

    /// Show a remedy or mission
    Show {
        /// Remedy or mission instance id
        instance: String,
    },

    /// List all remedies and missions
    List,

    /// Abandon a remedy or mission
    Cancel {
        /// Remedy or mission instance id
        instance: String,
    },

    /// Run one deadline sweep and orchestration round
    Tick {
        /// Evaluate as of this instant (RFC 3339) instead of the system clock
        #[arg(long)]
        now: Option<String>,
    },

    /// Run the scheduler until interrupted
    Run,
}

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load(
        cli.config.as_deref(),
        config::Overrides {
            state: cli.state,
            archive: cli.archive,
            catalog: cli.catalog,
        },
    ) {
        Ok(s) => s,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };
    logging::init(&settings.log_filter, cli.quiet);

    let output = cli.output;
    let quiet = cli.quiet;
    match cli.command {
        Commands::Catalog => commands::catalog::cmd_catalog(&settings, output, quiet),
        Commands::Validate { file } => commands::validate::cmd_validate(&file, output, quiet),
        Commands::Deadline { start, count, unit } => {
            commands::deadline::cmd_deadline(&start, count, unit, output, quiet)
        }
        Commands::Initiate { definition, vars } => {
            commands::remedy::cmd_initiate(&settings, &definition, into_map(vars), output, quiet)
        }
        Commands::Report {
            instance,
            result,
            notes,
        } => commands::remedy::cmd_report(&settings, &instance, result, notes, output, quiet),
        Commands::Launch { playbook, vars } => {
            commands::mission::cmd_launch(&settings, &playbook, into_map(vars), output, quiet)
        }
        Commands::Show { instance } => commands::show::cmd_show(&settings, &instance, output, quiet),
        Commands::List => commands::show::cmd_list(&settings, output, quiet),
        Commands::Cancel { instance } => {
            commands::mission::cmd_cancel(&settings, &instance, output, quiet)
        }
        Commands::Tick { now } => commands::tick::cmd_tick(&settings, now.as_deref(), output, quiet),
        Commands::Run => commands::tick::cmd_run(&settings, quiet),
    }
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' in '{}'", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn into_map(vars: Vec<(String, String)>) -> BTreeMap<String, String> {
    vars.into_iter().collect()
}

/// Print a result on stdout: pretty JSON, or the text rendering.
pub(crate) fn emit<T: Serialize>(value: &T, output: OutputFormat, quiet: bool, text: impl FnOnce() -> String) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => println!("{}", text()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(value)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization error: {}\"}}", e))
        ),
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

/// Report `msg` and exit with status 1.
pub(crate) fn fail(msg: &str, output: OutputFormat, quiet: bool) -> ! {
    report_error(msg, output, quiet);
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_parses_key_and_value() {
        assert_eq!(
            parse_var("reference=REF=1"),
            Ok(("reference".to_string(), "REF=1".to_string()))
        );
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
