//! Command line remote for Roku devices
//!
//! The `roku` binary is a thin shell over this library: [`cli`] parses
//! arguments, [`commands`] runs them against a device, [`config`] remembers
//! the selected device and [`session`] drives the interactive screens.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod session;

pub use commands::{CliError, Context};
pub use config::ConfigStore;
