//! # Netcafe CLI Entry Point
//!
//! ## Startup Sequence
//! 1. Initialize tracing (stderr, `RUST_LOG` aware)
//! 2. Parse arguments
//! 3. Run the command; on failure print the error and exit with its code

use std::process;

use clap::Parser;
use tracing::info;

use netcafe_cli::Cli;

#[tokio::main]
async fn main() {
    netcafe_cli::init_tracing();

    let cli = Cli::parse();
    let json = cli.json;
    info!(command = ?cli.command, "Starting netcafe");

    if let Err(err) = netcafe_cli::run(cli).await {
        if json {
            match serde_json::to_string(&err) {
                Ok(body) => eprintln!("{}", body),
                Err(_) => eprintln!("{}", err),
            }
        } else {
            eprintln!("{}", err);
        }
        process::exit(err.code.exit_code());
    }
}
