//! Service state metrics CLI library.
//!
//! This crate provides the CLI interface: argument parsing, configuration,
//! report rendering and run orchestration.

mod cli;
mod config;
pub mod render;
pub mod report;

pub use cli::Cli;
pub use config::{Config, Overrides};
