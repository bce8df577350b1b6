//! CLI subcommand implementations

pub mod catalog;
pub mod reports;
pub mod resources;
pub mod search;
