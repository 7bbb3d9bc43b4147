//! Installing a configured database as a registered pool.
//!
//! ```rust
//! use datasource_core::{Config, Database, FixedClock, Host, MapEnvSource};
//!
//! let config = Config::parse(r#"
//!     db = "mem"
//!
//!     [hikari]
//!     maximumPoolSize = 4
//! "#).unwrap();
//! let host = Host::new().with_clock(FixedClock(123)).with_env(MapEnvSource::new());
//!
//! let pool = Database::default().prepare(&config, &host).unwrap();
//! assert_eq!(pool.name(), "123");
//! assert_eq!(pool.properties().get("poolName"), Some("h2.123"));
//! assert_eq!(pool.properties().get("maximumPoolSize"), Some("4"));
//! ```

use crate::config::{self, Config};
use crate::connection::{
    ConnectionDescriptor, DATA_SOURCE_CLASS_NAME, DATA_SOURCE_PREFIX, DEFAULT_DB, DataSource,
    PoolConfig, PoolFactory, PoolProperties, PropertyLayers, Resolver, driver,
};
use crate::error::{DataSourceError, DataSourceResult};
use crate::host::Host;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use toml::Value;
use tracing::{debug, info};

/// Keys of a `databases.<vendor>` section that are not vendor defaults.
const VENDOR_RESERVED_KEYS: &[&str] = &[DATA_SOURCE_CLASS_NAME, "url", "user", "password"];

type Customizer = Box<dyn FnOnce(&mut PoolConfig) + Send>;

/// A database to install, named by config path or URL.
pub struct Database {
    name: String,
    callback: Option<Customizer>,
}

impl Database {
    /// Create a database from a config path (`db`, `db.audit`) or a `jdbc:` URL.
    pub fn new(name: impl Into<String>) -> DataSourceResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DataSourceError::config("A database is required"));
        }
        Ok(Self {
            name,
            callback: None,
        })
    }

    /// Adjust the pool configuration just before the pool is constructed.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&mut PoolConfig) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// The config path or URL this database was created from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the database and layer its pool properties.
    ///
    /// `config` is layered over the built-in reference configuration and
    /// resolved against the host's environment first.
    pub fn prepare(&self, config: &Config, host: &Host) -> DataSourceResult<NamedPool> {
        let config = config
            .clone()
            .with_fallback(&Config::reference()?)
            .resolve(host.env())?;

        let source = Resolver::new(&config, host.clock()).resolve(&self.name)?;
        let descriptor = source.descriptor;
        let vendor = descriptor.vendor().to_string();

        let explicit = config.get_str(&format!("databases.{}.{}", vendor, DATA_SOURCE_CLASS_NAME));
        let driver_class = driver::resolve_driver_class(descriptor.url(), &vendor, explicit)?;

        let mut layers = PropertyLayers::new(driver_class, descriptor.pool_name())
            .credentials(source.user.as_deref(), source.password.as_deref())
            .vendor_defaults(vendor_defaults(&config, &vendor)?)
            .data_source_overrides(source.overrides)
            .pool_overrides(pool_overrides(&config, "hikari")?);
        if let Some(key) = self.pool_key(&descriptor) {
            layers = layers.pool_overrides(pool_overrides(&config, &format!("hikari.{}", key))?);
        }
        if !descriptor.is_connection_string() {
            layers = layers.url(descriptor.url());
        }

        let properties = layers.build();
        debug!(
            name = %self.name,
            pool = descriptor.pool_name(),
            properties = properties.len(),
            "Pool properties layered"
        );

        Ok(NamedPool {
            name: descriptor.database().to_string(),
            descriptor,
            properties,
        })
    }

    /// Construct, register and schedule shutdown of the pool.
    ///
    /// The first pool installed on a host becomes its default data source.
    pub fn install(
        self,
        config: &Config,
        host: &Host,
        factory: &dyn PoolFactory,
    ) -> DataSourceResult<Arc<dyn DataSource>> {
        let pool = self.prepare(config, host)?;

        let mut pool_config = pool.pool_config()?;
        if let Some(callback) = self.callback {
            callback(&mut pool_config);
        }
        pool_config.validate()?;

        let pool_name = pool.descriptor.pool_name().to_string();
        let data_source = factory
            .create(&pool_config)
            .map_err(|source| DataSourceError::Construction {
                pool: pool_name.clone(),
                source,
            })?;

        let keys = match host.registry().register(&pool.name, Arc::clone(&data_source)) {
            Ok(keys) => keys,
            Err(e) => {
                if let Err(close) = data_source.close() {
                    debug!(pool = %pool_name, error = %close, "Close after failed registration");
                }
                return Err(e);
            }
        };

        let closing = Arc::clone(&data_source);
        host.lifecycle()
            .on_stop(pool_name.clone(), move || closing.close());

        info!(
            pool = %pool_name,
            url = pool.descriptor.url(),
            keys = ?keys,
            "Data source installed"
        );
        Ok(data_source)
    }

    /// Key of the per-pool `hikari.<key>` section, if any.
    fn pool_key<'a>(&'a self, descriptor: &ConnectionDescriptor) -> Option<&'a str> {
        if descriptor.is_connection_string() || self.name == DEFAULT_DB {
            return None;
        }
        Some(
            self.name
                .strip_prefix(DEFAULT_DB)
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(&self.name),
        )
    }
}

impl Default for Database {
    fn default() -> Self {
        Self {
            name: DEFAULT_DB.to_string(),
            callback: None,
        }
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// A fully layered construction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedPool {
    name: String,
    descriptor: ConnectionDescriptor,
    properties: PoolProperties,
}

impl NamedPool {
    /// Name the pool is registered under: the database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved descriptor.
    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    /// The layered pool properties.
    pub fn properties(&self) -> &PoolProperties {
        &self.properties
    }

    /// Convert the properties to a typed pool configuration.
    ///
    /// A database given directly as a URL gets it as the `url` data source
    /// property here rather than through the properties.
    pub fn pool_config(&self) -> DataSourceResult<PoolConfig> {
        let mut config = PoolConfig::from_properties(&self.properties)?;
        if self.descriptor.is_connection_string() {
            config
                .data_source_properties
                .insert("url".to_string(), self.descriptor.url().to_string());
        }
        Ok(config)
    }
}

/// `databases.<vendor>` minus the keys that are not pool properties.
fn vendor_defaults(config: &Config, vendor: &str) -> DataSourceResult<Vec<(String, String)>> {
    let path = format!("databases.{}", vendor);
    match config.get_table(&path) {
        Some(table) => config::flatten(&path, table, VENDOR_RESERVED_KEYS),
        None => Ok(Vec::new()),
    }
}

/// Scalars of the section at `path`, plus its `dataSource` table.
///
/// Other nested tables belong to individual pools and are skipped.
fn pool_overrides(config: &Config, path: &str) -> DataSourceResult<Vec<(String, String)>> {
    let Some(table) = config.get_table(path) else {
        return Ok(Vec::new());
    };

    let mut overrides = Vec::new();
    for (key, value) in table {
        let key_path = format!("{}.{}", path, key);
        match value {
            Value::Table(nested) if key == "dataSource" => {
                let nested = config::flatten(&key_path, nested, &[])?;
                overrides.extend(
                    nested
                        .into_iter()
                        .map(|(k, v)| (format!("{}{}", DATA_SOURCE_PREFIX, k), v)),
                );
            }
            Value::Table(_) => {}
            other => overrides.push((key.clone(), config::scalar_to_string(&key_path, other)?)),
        }
    }
    Ok(overrides)
}
