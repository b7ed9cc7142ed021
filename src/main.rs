//! debforge CLI entry point
//!
//! Parses the command line, runs the command and prints a user-friendly report
//! with a non-zero exit status when it fails.

use anyhow::Result;
use clap::Parser;
use debforge::cli;
use debforge::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
