//! Loading the configuration a command resolves against.

use datasource_core::Config;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

use crate::error::{CliError, CliResult};

/// Default config file name (lives in the working directory)
pub const CONFIG_FILE_NAME: &str = "datasource.toml";

/// Load the configuration file and apply `key=value` overrides.
///
/// Without an explicit path `./datasource.toml` is used when it exists and
/// an empty configuration otherwise.
pub fn load(path: Option<&Path>, overrides: &[String]) -> CliResult<Config> {
    let mut config = match path {
        Some(path) => read(path)?,
        None => {
            let default = PathBuf::from(CONFIG_FILE_NAME);
            if default.exists() {
                read(&default)?
            } else {
                Config::new()
            }
        }
    };

    for raw in overrides {
        let (key, value) = parse_override(raw)?;
        config = config.with_value(key, value);
    }
    Ok(config)
}

fn read(path: &Path) -> CliResult<Config> {
    if !path.exists() {
        return Err(CliError::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Config::parse(&content)?)
}

/// Split `key=value`; the value is read as a TOML scalar when it parses as
/// one and as a plain string otherwise.
pub fn parse_override(raw: &str) -> CliResult<(&str, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| CliError::Argument(format!("Expected KEY=VALUE, got '{}'", raw)))?;
    let key = key.trim();
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(CliError::Argument(format!("Invalid key in '{}'", raw)));
    }
    Ok((key, parse_scalar(value.trim())))
}

fn parse_scalar(value: &str) -> Value {
    toml::from_str::<Table>(&format!("v = {}", value))
        .ok()
        .and_then(|mut table| table.remove("v"))
        .filter(|v| !v.is_table() && !v.is_array())
        .unwrap_or_else(|| Value::String(value.to_string()))
}
