use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use ltt_core::{NewCustomer, SettingsPatch, SystemClock};
use tracing_subscriber::EnvFilter;

use ltt_cli::commands::customers::{self, CustomerEdit};
use ltt_cli::commands::util::open_tracker;
use ltt_cli::commands::{export, log, settings, track};
use ltt_cli::{Cli, Commands, Config, CustomersAction, SettingsAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(ltt_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = ltt_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn run_customers<W: Write>(
    writer: &mut W,
    config_path: Option<&Path>,
    action: CustomersAction,
) -> Result<()> {
    let (db, _config) = open_database(config_path)?;
    let mut tracker = open_tracker(db, SystemClock)?;
    match action {
        CustomersAction::List { all, json } => customers::list(writer, tracker.store(), all, json),
        CustomersAction::Add {
            name,
            engagement_type,
            hours,
        } => customers::add(
            writer,
            &mut tracker,
            NewCustomer {
                name,
                engagement_type,
                initial_hours: hours,
            },
        ),
        CustomersAction::Edit {
            customer,
            name,
            engagement_type,
            hours,
        } => customers::edit(
            writer,
            &mut tracker,
            &customer,
            CustomerEdit {
                name,
                engagement_type,
                initial_hours: hours,
            },
        ),
        CustomersAction::Archive { customer } => {
            customers::set_archived(writer, &mut tracker, &customer, true)
        }
        CustomersAction::Unarchive { customer } => {
            customers::set_archived(writer, &mut tracker, &customer, false)
        }
        CustomersAction::Delete { customer } => customers::delete(writer, &mut tracker, &customer),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config_path = cli.config.as_deref();
    let mut stdout = std::io::stdout();

    match cli.command {
        Some(Commands::Customers(action)) => {
            run_customers(&mut stdout, config_path, action)?;
        }
        Some(Commands::Log { customer, json }) => {
            let (db, _config) = open_database(config_path)?;
            log::run(&mut stdout, &db, &customer, json)?;
        }
        Some(Commands::Export { customer, output }) => {
            let (db, _config) = open_database(config_path)?;
            export::run(&mut stdout, &db, &customer, output.as_deref())?;
        }
        Some(Commands::Settings(SettingsAction::Show { json })) => {
            let (db, _config) = open_database(config_path)?;
            settings::show(&mut stdout, &db, json)?;
        }
        Some(Commands::Settings(SettingsAction::Set(args))) => {
            let (db, _config) = open_database(config_path)?;
            let mut tracker = open_tracker(db, SystemClock)?;
            settings::set(&mut stdout, &mut tracker, &SettingsPatch::from(args))?;
        }
        Some(Commands::Track { customer }) => {
            let (db, _config) = open_database(config_path)?;
            let mut tracker = open_tracker(db, SystemClock)?;
            track::run_stdio(&mut tracker, customer.as_deref())?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
