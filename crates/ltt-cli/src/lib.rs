//! Local time tracker CLI library.
//!
//! This crate provides the CLI interface for the time tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, CustomersAction, SettingsAction, SettingsArgs};
pub use config::Config;
