//! Datasource CLI - inspect how a configuration resolves into a pool.

use clap::Parser;

use datasource_cli::cli::{Cli, Command};
use datasource_cli::commands;
use datasource_cli::error::CliResult;
use datasource_cli::output;

#[tokio::main]
async fn main() {
    datasource_core::logging::init();

    if let Err(e) = run().await {
        output::newline();
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Resolve(args) => commands::resolve::run(args).await,
        Command::Drivers(args) => commands::drivers::run(args).await,
        Command::Version => commands::version::run().await,
    }
}
