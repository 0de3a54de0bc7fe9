//! Onboard CLI Library
//!
//! Command-line interface for the Onboard registration and partner flows.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
mod output;
mod runner;

pub use commands::{
    AndroidArgs, Cli, ColorArg, Commands, CommonArgs, ConfigArgs, DialOrderArg, PartnerArgs,
    RegisterArgs, RoleArg, WebArgs,
};
pub use config::{resolve_suite_config, suite_config, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::render_report;
pub use runner::{conclude, poll_from, run_partner, run_register};
