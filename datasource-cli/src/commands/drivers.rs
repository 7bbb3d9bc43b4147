//! `datasource drivers` command - List the JDBC driver table.

use datasource_core::connection::DRIVERS;
use serde::Serialize;

use crate::cli::DriversArgs;
use crate::error::CliResult;
use crate::output;

#[derive(Serialize)]
struct DriverRow {
    prefix: &'static str,
    vendor: &'static str,
    driver_class: &'static str,
}

/// Run the drivers command
pub async fn run(args: DriversArgs) -> CliResult<()> {
    if args.json {
        let rows: Vec<DriverRow> = DRIVERS
            .iter()
            .map(|entry| DriverRow {
                prefix: entry.prefix,
                vendor: entry.vendor,
                driver_class: entry.driver_class,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    output::header("Known drivers");

    let width = DRIVERS.iter().map(|e| e.prefix.len()).max().unwrap_or_default();
    for entry in DRIVERS {
        output::kv_aligned(entry.prefix, entry.driver_class, width);
    }

    output::newline();
    output::dim("Other URLs need databases.<vendor>.dataSourceClassName");
    Ok(())
}
