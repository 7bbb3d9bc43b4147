//! Alias and URL resolution.

use crate::config::{self, Config};
use crate::error::{DataSourceError, DataSourceResult};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use toml::{Table, Value};
use tracing::debug;

/// Config path of the default data source.
pub const DEFAULT_DB: &str = "db";

/// Placeholder replaced by the clock token in alias URLs.
pub const MEM_SEED: &str = "{mem.seed}";

/// Keys of a descriptor table that are not data source overrides.
const RESERVED_KEYS: &[&str] = &["url", "user", "password"];

/// Source of the unique token embedded in `mem` URLs.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn millis(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// A clock frozen at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn millis(&self) -> u64 {
        self.0
    }
}

/// A resolved database descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionDescriptor {
    raw_input: String,
    url: String,
    vendor: String,
    database: String,
    pool_name: String,
    connection_string: bool,
}

impl ConnectionDescriptor {
    /// Build a descriptor from a normalized URL.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use datasource_core::ConnectionDescriptor;
    ///
    /// let d = ConnectionDescriptor::from_url("db", "jdbc:db2://127.0.0.1:50000/SAMPLE").unwrap();
    /// assert_eq!(d.vendor(), "db2");
    /// assert_eq!(d.database(), "SAMPLE");
    /// assert_eq!(d.pool_name(), "db2.SAMPLE");
    /// ```
    pub fn from_url(raw_input: impl Into<String>, url: impl Into<String>) -> DataSourceResult<Self> {
        let raw_input = raw_input.into();
        let url = url.into();

        let vendor = vendor_of(&url).ok_or_else(|| {
            DataSourceError::config(format!("Cannot determine the database type of '{}'", url))
        })?;
        let database = database_name(&url)
            .ok_or_else(|| {
                DataSourceError::config(format!("Cannot determine the database name of '{}'", url))
            })?
            .to_string();
        let pool_name = format!("{}.{}", vendor, database);

        Ok(Self {
            raw_input,
            url,
            vendor,
            database,
            pool_name,
            connection_string: false,
        })
    }

    /// Build a descriptor for a data source given directly as a URL.
    ///
    /// The URL is applied to the constructed pool config rather than emitted
    /// as a pool property.
    pub fn connection_string(url: impl Into<String>) -> DataSourceResult<Self> {
        let url = url.into();
        let mut descriptor = Self::from_url(url.clone(), url)?;
        descriptor.connection_string = true;
        Ok(descriptor)
    }

    /// The descriptor as given: a config path or a URL.
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// The normalized connection URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Lower-cased database family, e.g. `mysql`.
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Database name, in its original case.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// `<vendor>.<database>`.
    pub fn pool_name(&self) -> &str {
        &self.pool_name
    }

    /// Whether the descriptor was given directly as a URL.
    pub fn is_connection_string(&self) -> bool {
        self.connection_string
    }
}

/// A descriptor plus the settings that came with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
    /// The resolved descriptor.
    pub descriptor: ConnectionDescriptor,
    /// Username, if configured.
    pub user: Option<String>,
    /// Password, if configured.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Extra keys from a descriptor table, un-prefixed.
    pub overrides: Vec<(String, String)>,
}

impl ResolvedSource {
    fn new(descriptor: ConnectionDescriptor) -> Self {
        Self {
            descriptor,
            user: None,
            password: None,
            overrides: Vec::new(),
        }
    }
}

/// Resolves descriptor names against a configuration tree.
pub struct Resolver<'a> {
    config: &'a Config,
    clock: &'a dyn Clock,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over an already resolved configuration.
    pub fn new(config: &'a Config, clock: &'a dyn Clock) -> Self {
        Self { config, clock }
    }

    /// Resolve `name`: a `jdbc:` URL, or a config path holding an alias, a
    /// URL or a `{ url, user, password, ... }` table.
    pub fn resolve(&self, name: &str) -> DataSourceResult<ResolvedSource> {
        if name.is_empty() {
            return Err(DataSourceError::config("A database is required"));
        }

        if name.starts_with("jdbc:") {
            debug!(url = name, "Resolving connection string");
            return ConnectionDescriptor::connection_string(name).map(ResolvedSource::new);
        }

        let resolved = match self.config.get(name) {
            Some(Value::String(value)) => self.resolve_alias(name, value)?,
            Some(Value::Table(table)) => self.resolve_table(name, table)?,
            Some(other) => {
                return Err(DataSourceError::config(format!(
                    "Expected a database alias, URL or table at '{}', found {}",
                    name,
                    other.type_str()
                )));
            }
            None => {
                return Err(DataSourceError::config(format!(
                    "No database configured at '{}'",
                    name
                )));
            }
        };

        debug!(
            name,
            url = resolved.descriptor.url(),
            pool = resolved.descriptor.pool_name(),
            "Descriptor resolved"
        );
        Ok(resolved)
    }

    fn resolve_alias(&self, name: &str, alias: &str) -> DataSourceResult<ResolvedSource> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Err(DataSourceError::config(format!(
                "Database at '{}' is empty",
                name
            )));
        }

        // URLs always carry a ':'; alias names never do.
        let entry = if alias.contains(':') {
            None
        } else {
            self.config
                .get_table(&format!("databases.{}", alias))
                .filter(|entry| entry.contains_key("url"))
        };

        let Some(entry) = entry else {
            if !alias.contains(':') {
                return Err(self.unknown_alias(name, alias));
            }
            let descriptor = ConnectionDescriptor::from_url(name, alias)?;
            return Ok(ResolvedSource::new(descriptor));
        };

        debug!(name, alias, "Expanding database alias");
        let path = format!("databases.{}", alias);
        let url = required_str(&path, entry, "url")?;
        let url = if url.contains(MEM_SEED) {
            url.replace(MEM_SEED, &self.clock.millis().to_string())
        } else {
            url
        };

        let mut resolved = ResolvedSource::new(ConnectionDescriptor::from_url(name, url)?);
        resolved.user = optional_str(&path, entry, "user")?;
        resolved.password = optional_str(&path, entry, "password")?;
        Ok(resolved)
    }

    fn unknown_alias(&self, name: &str, alias: &str) -> DataSourceError {
        let known: Vec<&str> = self
            .config
            .get_table("databases")
            .map(|databases| {
                databases
                    .iter()
                    .filter(|(_, entry)| entry.as_table().is_some_and(|t| t.contains_key("url")))
                    .map(|(alias, _)| alias.as_str())
                    .collect()
            })
            .unwrap_or_default();
        DataSourceError::config(format!(
            "Unknown database alias '{}' at '{}', expected a URL or one of: {}",
            alias,
            name,
            known.join(", ")
        ))
    }

    fn resolve_table(&self, name: &str, table: &Table) -> DataSourceResult<ResolvedSource> {
        let url = required_str(name, table, "url")?;

        let mut resolved = ResolvedSource::new(ConnectionDescriptor::from_url(name, url)?);
        resolved.user = optional_str(name, table, "user")?;
        resolved.password = optional_str(name, table, "password")?;
        resolved.overrides = config::flatten(name, table, RESERVED_KEYS)?;
        Ok(resolved)
    }
}

fn required_str(path: &str, table: &Table, key: &str) -> DataSourceResult<String> {
    optional_str(path, table, key)?
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DataSourceError::config(format!("Missing '{}.{}'", path, key)))
}

fn optional_str(path: &str, table: &Table, key: &str) -> DataSourceResult<Option<String>> {
    table
        .get(key)
        .map(|value| config::scalar_to_string(&format!("{}.{}", path, key), value))
        .transpose()
}

/// Database family: the first sub-protocol after `jdbc:`, or the second one
/// behind the `jtds` multiplexer.
fn vendor_of(url: &str) -> Option<String> {
    let rest = url.strip_prefix("jdbc:").unwrap_or(url);
    let mut parts = rest.split(':');
    let first = parts.next()?;
    let vendor = if first.eq_ignore_ascii_case("jtds") {
        parts.next()?
    } else {
        first
    };
    (!vendor.is_empty() && !vendor.contains('/')).then(|| vendor.to_ascii_lowercase())
}

/// Database name: a `databaseName=`/`database=` property, or else the last
/// `/` or `:` segment of the URL with query and `;` properties removed. A
/// `//` authority without a path has no database name.
fn database_name(url: &str) -> Option<&str> {
    let property = url.split(';').skip(1).find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        let key = key.trim();
        (key.eq_ignore_ascii_case("databaseName") || key.eq_ignore_ascii_case("database"))
            .then(|| value.trim())
    });
    if let Some(name) = property.filter(|name| !name.is_empty()) {
        return Some(name);
    }

    let head = url.split(['?', ';']).next()?;
    // `//host:port` without a path names a server, not a database.
    if let Some((_, authority)) = head.split_once("//") {
        if !authority.contains('/') {
            return None;
        }
    }
    head.rsplit(['/', ':']).next().filter(|name| !name.is_empty())
}
