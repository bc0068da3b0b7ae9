//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ltt_core::{SettingsPatch, Theme};

/// Local time tracker.
///
/// Times work against per-customer hour budgets and keeps the history in a
/// local SQLite database.
#[derive(Debug, Parser)]
#[command(name = "ltt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage customers.
    #[command(subcommand)]
    Customers(CustomersAction),

    /// Show a customer's sessions and remaining hours.
    Log {
        /// Customer ID or name.
        customer: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export a customer's time log as CSV.
    Export {
        /// Customer ID or name.
        customer: String,

        /// Destination file (defaults to time-log-<name>.csv).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or change settings.
    #[command(subcommand)]
    Settings(SettingsAction),

    /// Run the timer interactively, reading commands from stdin.
    Track {
        /// Customer ID or name to select first.
        customer: Option<String>,
    },
}

/// Customer subcommands.
#[derive(Debug, Subcommand)]
pub enum CustomersAction {
    /// List customers with their remaining hours.
    List {
        /// Include archived customers.
        #[arg(long)]
        all: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Add a customer.
    Add {
        #[arg(long)]
        name: String,

        /// Free-text label, e.g. "Retainer".
        #[arg(long, default_value = "")]
        engagement_type: String,

        /// Hour budget.
        #[arg(long)]
        hours: f64,
    },

    /// Change a customer's name, engagement type or budget.
    Edit {
        /// Customer ID or name.
        customer: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        engagement_type: Option<String>,

        #[arg(long)]
        hours: Option<f64>,
    },

    /// Hide a customer from the active list.
    Archive { customer: String },

    /// Return an archived customer to the active list.
    Unarchive { customer: String },

    /// Permanently delete a customer.
    Delete { customer: String },
}

/// Settings subcommands.
#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Print current settings.
    Show {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Update one or more settings.
    Set(SettingsArgs),
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Stop a running timer automatically after the idle timeout.
    #[arg(long)]
    pub idle_detection: Option<bool>,

    /// Minutes of running time before an idle stop (at least 1).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub idle_timeout_minutes: Option<u32>,

    /// dark, light or system.
    #[arg(long)]
    pub theme: Option<Theme>,

    #[arg(long)]
    pub always_on_top: Option<bool>,

    #[arg(long)]
    pub compact_mode: Option<bool>,

    #[arg(long)]
    pub auto_stop_hours: Option<u32>,
}

impl From<SettingsArgs> for SettingsPatch {
    fn from(args: SettingsArgs) -> Self {
        Self {
            theme: args.theme,
            always_on_top: args.always_on_top,
            compact_mode: args.compact_mode,
            auto_stop_hours: args.auto_stop_hours,
            idle_detection: args.idle_detection,
            idle_timeout_minutes: args.idle_timeout_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn settings_set_parses_values() {
        let cli = Cli::try_parse_from([
            "ltt",
            "settings",
            "set",
            "--idle-detection",
            "true",
            "--idle-timeout-minutes",
            "30",
            "--theme",
            "light",
        ])
        .unwrap();
        let Some(Commands::Settings(SettingsAction::Set(args))) = cli.command else {
            panic!("expected settings set");
        };
        let patch = SettingsPatch::from(args);
        assert_eq!(patch.idle_detection, Some(true));
        assert_eq!(patch.idle_timeout_minutes, Some(30));
        assert_eq!(patch.theme, Some(Theme::Light));
        assert_eq!(patch.compact_mode, None);
    }

    #[test]
    fn zero_idle_timeout_is_rejected() {
        let result = Cli::try_parse_from(["ltt", "settings", "set", "--idle-timeout-minutes", "0"]);
        assert!(result.is_err());
        let result = Cli::try_parse_from(["ltt", "settings", "set", "--idle-timeout-minutes", "1"]);
        assert!(result.is_ok());
    }

    #[test]
    fn unknown_theme_is_rejected() {
        let result = Cli::try_parse_from(["ltt", "settings", "set", "--theme", "neon"]);
        assert!(result.is_err());
    }
}
