//! `datasource resolve` command - Show how a database resolves.

use datasource_core::{
    ConnectionDescriptor, Database, Host, NamedPool, PoolConfig, PoolProperties,
};
use serde::Serialize;

use crate::cli::ResolveArgs;
use crate::config;
use crate::error::CliResult;
use crate::output::{self, kv};

#[derive(Serialize)]
struct Resolution<'a> {
    name: &'a str,
    descriptor: &'a ConnectionDescriptor,
    properties: PoolProperties,
    config: PoolConfig,
}

/// Run the resolve command
pub async fn run(args: ResolveArgs) -> CliResult<()> {
    let config = config::load(args.config.as_deref(), &args.set)?;
    let host = Host::new();

    let pool = Database::new(args.name.as_str())?.prepare(&config, &host)?;
    let pool_config = pool.pool_config()?;
    pool_config.validate()?;

    if args.json {
        let mut config = pool_config;
        if let Some(password) = config.data_source_properties.get_mut("password") {
            *password = output::mask(password);
        }
        let resolution = Resolution {
            name: pool.name(),
            descriptor: pool.descriptor(),
            properties: pool
                .properties()
                .iter()
                .map(|(key, value)| (key, display_value(key, value)))
                .collect(),
            config,
        };
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    print_pool(&pool);
    Ok(())
}

fn print_pool(pool: &NamedPool) {
    let descriptor = pool.descriptor();
    output::header(&format!("Database '{}'", descriptor.raw_input()));

    output::section("Descriptor");
    kv("URL", descriptor.url());
    kv("Vendor", descriptor.vendor());
    kv("Database", descriptor.database());
    kv("Pool", descriptor.pool_name());
    kv("Registered as", pool.name());
    if descriptor.is_connection_string() {
        kv("Mode", "connection string");
    }
    output::newline();

    output::section("Properties");
    let props = pool.properties();
    let width = props.iter().map(|(k, _)| k.len()).max().unwrap_or_default();
    for (key, value) in props.iter() {
        output::kv_aligned(key, &display_value(key, value), width);
    }
    output::newline();
}

fn display_value(key: &str, value: &str) -> String {
    if key.ends_with("password") {
        output::mask(value)
    } else {
        value.to_string()
    }
}
