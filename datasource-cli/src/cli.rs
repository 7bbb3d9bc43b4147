//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Datasource CLI - resolve database descriptors into pool configurations
#[derive(Parser, Debug)]
#[command(name = "datasource")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(
    about = "Datasource CLI - resolve database descriptors into pool configurations",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a database and print its pool properties
    Resolve(ResolveArgs),

    /// List the known JDBC drivers in lookup order
    Drivers(DriversArgs),

    /// Display version information
    Version,
}

// =============================================================================
// Resolve Command
// =============================================================================

/// Arguments for the `resolve` command
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Configuration file (defaults to ./datasource.toml when present)
    #[arg(short, long, env = "DATASOURCE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Config path or jdbc: URL of the database
    #[arg(short, long, default_value = "db")]
    pub name: String,

    /// Override a configuration value (key=value, repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

// =============================================================================
// Drivers Command
// =============================================================================

/// Arguments for the `drivers` command
#[derive(Args, Debug)]
pub struct DriversArgs {
    /// Print the table as JSON
    #[arg(long)]
    pub json: bool,
}
