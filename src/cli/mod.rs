//! Command line front end for the registry client
//!
//! - [`commands`] - subcommand definitions and execution
//! - [`output`] - table/JSON/YAML rendering

pub mod commands;
pub mod output;
