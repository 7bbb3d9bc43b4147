//! `datasource version` command - Display version and resolution defaults.

use datasource_core::Config;
use datasource_core::connection::DRIVERS;

use crate::config::CONFIG_FILE_NAME;
use crate::error::CliResult;
use crate::output::{self, kv};

/// Run the version command
pub async fn run() -> CliResult<()> {
    output::header("datasource");

    #[cfg(debug_assertions)]
    let build_mode = "debug";
    #[cfg(not(debug_assertions))]
    let build_mode = "release";

    kv("Version", env!("CARGO_PKG_VERSION"));
    kv("Build", build_mode);
    output::newline();

    let reference = Config::reference()?;
    let aliases: Vec<&str> = reference
        .get_table("databases")
        .map(|databases| {
            databases
                .iter()
                .filter(|(_, entry)| entry.get("url").is_some())
                .map(|(alias, _)| alias.as_str())
                .collect()
        })
        .unwrap_or_default();
    let mut vendors: Vec<&str> = DRIVERS.iter().map(|entry| entry.vendor).collect();
    vendors.sort_unstable();
    vendors.dedup();

    output::section("Resolution");
    kv("Config file", CONFIG_FILE_NAME);
    kv("Aliases", &aliases.join(", "));
    kv(
        "Drivers",
        &format!("{} prefixes, {} vendors", DRIVERS.len(), vendors.len()),
    );

    output::newline();
    Ok(())
}
