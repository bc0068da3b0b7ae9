//! CLI subcommand implementations.

pub mod customers;
pub mod export;
pub mod log;
pub mod settings;
pub mod track;
pub mod util;
