//! postboard CLI entry point
//!
//! Loads `.env`, dispatches to the CLI module, prints errors to stderr and
//! exits non-zero on failure.

use postboard::cli;

fn main() {
    dotenvy::dotenv().ok();

    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
