//! Hierarchical configuration tree.
//!
//! Configuration is a TOML document addressed by dotted paths (`db.url`,
//! `hikari.maximumPoolSize`, `application.tmpdir`). A user document is layered
//! over the embedded [`REFERENCE`] defaults with [`Config::with_fallback`] and
//! then resolved once with [`Config::resolve`], which expands `${...}`
//! references against the tree and the environment.
//!
//! ```rust
//! use datasource_core::config::{Config, MapEnvSource};
//!
//! let config = Config::parse(r#"
//!     db = "fs"
//!
//!     [application]
//!     name = "shop"
//!     tmpdir = "/var/tmp"
//! "#)
//! .unwrap()
//! .with_fallback(&Config::reference().unwrap())
//! .resolve(&MapEnvSource::new())
//! .unwrap();
//!
//! assert_eq!(config.get_str("db"), Some("fs"));
//! assert_eq!(config.get_str("databases.fs.url"), Some("jdbc:h2:/var/tmp/shop"));
//! ```

mod env;

pub use env::{EnvSource, MapEnvSource, StdEnvSource};

use crate::error::{DataSourceError, DataSourceResult};
use std::path::Path;
use toml::{Table, Value};
use tracing::debug;

/// Built-in defaults: the `mem`/`fs` aliases, vendor tuning and application
/// metadata fallbacks.
pub const REFERENCE: &str = include_str!("reference.toml");

/// A configuration tree addressed by dotted paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    root: Table,
}

impl Config {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document.
    pub fn parse(input: &str) -> DataSourceResult<Self> {
        let root: Table = toml::from_str(input)?;
        Ok(Self { root })
    }

    /// Load a TOML document from disk.
    pub fn load(path: &Path) -> DataSourceResult<Self> {
        debug!(path = %path.display(), "Loading configuration");
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// The embedded reference configuration.
    pub fn reference() -> DataSourceResult<Self> {
        Self::parse(REFERENCE)
    }

    /// Wrap an existing table.
    pub fn from_table(root: Table) -> Self {
        Self { root }
    }

    /// The root table.
    pub fn root(&self) -> &Table {
        &self.root
    }

    /// Layer this configuration over `fallback`.
    ///
    /// Tables are merged recursively; for any other value this configuration
    /// wins.
    pub fn with_fallback(mut self, fallback: &Config) -> Self {
        merge_missing(&mut self.root, &fallback.root);
        self
    }

    /// Set the value at `path`, creating intermediate tables as needed.
    ///
    /// A non-table value sitting on an intermediate segment is replaced.
    pub fn with_value(mut self, path: &str, value: impl Into<Value>) -> Self {
        let segments: Vec<&str> = path.split('.').collect();
        insert_path(&mut self.root, &segments, value.into());
        self
    }

    /// Get the value at a dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut value = self.root.get(segments.next()?)?;
        for segment in segments {
            value = value.as_table()?.get(segment)?;
        }
        Some(value)
    }

    /// Get a string value at a dotted path.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Get a table at a dotted path.
    pub fn get_table(&self, path: &str) -> Option<&Table> {
        self.get(path).and_then(Value::as_table)
    }

    /// Check whether a path is set.
    pub fn has_path(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Expand every `${...}` reference in string values.
    ///
    /// References resolve against this tree first and the environment second.
    pub fn resolve(&self, env: &dyn EnvSource) -> DataSourceResult<Config> {
        let substitutor = env::Substitutor::new(self, env);
        let mut root = self.root.clone();
        for (_, value) in root.iter_mut() {
            resolve_value(value, &substitutor)?;
        }
        crate::datasource_debug!(sections = root.len(), "Configuration resolved");
        Ok(Self { root })
    }
}

fn insert_path(table: &mut Table, path: &[&str], value: Value) {
    match path {
        [] => {}
        [last] => {
            table.insert(last.to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = table
                .entry(head.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            if !entry.is_table() {
                *entry = Value::Table(Table::new());
            }
            if let Value::Table(next) = entry {
                insert_path(next, rest, value);
            }
        }
    }
}

fn merge_missing(target: &mut Table, fallback: &Table) {
    for (key, fallback_value) in fallback {
        match target.get_mut(key) {
            Some(Value::Table(target_table)) => {
                if let Value::Table(fallback_table) = fallback_value {
                    merge_missing(target_table, fallback_table);
                }
            }
            Some(_) => {}
            None => {
                target.insert(key.clone(), fallback_value.clone());
            }
        }
    }
}

fn resolve_value(value: &mut Value, substitutor: &env::Substitutor<'_>) -> DataSourceResult<()> {
    match value {
        Value::String(s) if s.contains("${") => {
            *s = substitutor.expand(s)?;
        }
        Value::Array(items) => {
            for item in items {
                resolve_value(item, substitutor)?;
            }
        }
        Value::Table(table) => {
            for (_, item) in table.iter_mut() {
                resolve_value(item, substitutor)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Render a scalar config value the way pool properties expect it.
pub(crate) fn scalar_to_string(path: &str, value: &Value) -> DataSourceResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Datetime(d) => Ok(d.to_string()),
        Value::Array(_) | Value::Table(_) => Err(DataSourceError::config(format!(
            "Expected a scalar value at '{}', found {}",
            path,
            value.type_str()
        ))),
    }
}

/// Flatten a table into `(dotted.key, value)` pairs, skipping `exclude`d
/// top-level keys.
pub(crate) fn flatten(
    path: &str,
    table: &Table,
    exclude: &[&str],
) -> DataSourceResult<Vec<(String, String)>> {
    let mut out = Vec::new();
    flatten_into(path, "", table, exclude, &mut out)?;
    Ok(out)
}

fn flatten_into(
    path: &str,
    prefix: &str,
    table: &Table,
    exclude: &[&str],
    out: &mut Vec<(String, String)>,
) -> DataSourceResult<()> {
    for (key, value) in table {
        if prefix.is_empty() && exclude.contains(&key.as_str()) {
            continue;
        }
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Table(nested) => flatten_into(path, &name, nested, &[], out)?,
            other => {
                let value = scalar_to_string(&format!("{}.{}", path, name), other)?;
                out.push((name, value));
            }
        }
    }
    Ok(())
}
