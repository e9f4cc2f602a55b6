//! CLI module for postboard
//!
//! Provides command-line interface for:
//! - serve: Build the stores, wire the HTTP server, and block until Ctrl-C

mod args;
mod commands;
mod errors;

pub use args::{Backend, Cli, Command, ServeArgs};
pub use commands::{build_backends, run_command, serve, server_config};
pub use errors::{CliError, CliErrorCode, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
