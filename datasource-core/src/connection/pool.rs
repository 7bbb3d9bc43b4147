//! Typed pool configuration and the pool factory seam.

use super::properties::{DATA_SOURCE_CLASS_NAME, DATA_SOURCE_PREFIX, POOL_NAME, PoolProperties};
use crate::error::{BoxError, DataSourceError, DataSourceResult};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Pool configuration handed to a [`PoolFactory`].
///
/// Field names follow the pool library's property names (`maximumPoolSize`,
/// `connectionTimeout`, ...). Durations are read and written as milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    /// Pool name, used for logging and registration.
    pub pool_name: Option<String>,
    /// Data source class the pool instantiates.
    pub data_source_class_name: Option<String>,
    /// Driver URL, for pools built from a URL rather than a data source class.
    pub jdbc_url: Option<String>,
    /// Username passed to the driver.
    pub username: Option<String>,
    /// Password passed to the driver.
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Maximum number of connections, idle and in use.
    pub maximum_pool_size: u32,
    /// Minimum number of idle connections; defaults to the maximum.
    pub minimum_idle: Option<u32>,
    /// How long a caller waits for a connection. Zero waits forever.
    #[serde(serialize_with = "as_millis")]
    pub connection_timeout: Duration,
    /// How long a connection may sit idle. Zero disables idle eviction.
    #[serde(serialize_with = "as_millis")]
    pub idle_timeout: Duration,
    /// Maximum lifetime of a connection. Zero means unlimited.
    #[serde(serialize_with = "as_millis")]
    pub max_lifetime: Duration,
    /// How long a liveness check may take.
    #[serde(serialize_with = "as_millis")]
    pub validation_timeout: Duration,
    /// Time a connection may be out of the pool before a leak is logged.
    /// Zero disables leak detection.
    #[serde(serialize_with = "as_millis")]
    pub leak_detection_threshold: Duration,
    /// Default auto-commit behavior of connections.
    pub auto_commit: bool,
    /// Whether connections are read-only by default.
    pub read_only: bool,
    /// Whether the pool can be suspended.
    pub allow_pool_suspension: bool,
    /// Query used to check liveness when the driver has no native check.
    pub connection_test_query: Option<String>,
    /// Statement executed on every new connection.
    pub connection_init_sql: Option<String>,
    /// Default catalog.
    pub catalog: Option<String>,
    /// Default schema.
    pub schema: Option<String>,
    /// Default transaction isolation, e.g. `TRANSACTION_READ_COMMITTED`.
    pub transaction_isolation: Option<String>,
    /// Properties forwarded to the data source, without the `dataSource.` prefix.
    pub data_source_properties: IndexMap<String, String>,
    /// Pool properties without a typed field, in layering order.
    pub extra: IndexMap<String, String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pool_name: None,
            data_source_class_name: None,
            jdbc_url: None,
            username: None,
            password: None,
            maximum_pool_size: 10,
            minimum_idle: None,
            connection_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
            validation_timeout: Duration::from_secs(5),
            leak_detection_threshold: Duration::ZERO,
            auto_commit: true,
            read_only: false,
            allow_pool_suspension: false,
            connection_test_query: None,
            connection_init_sql: None,
            catalog: None,
            schema: None,
            transaction_isolation: None,
            data_source_properties: IndexMap::new(),
            extra: IndexMap::new(),
        }
    }
}

impl PoolConfig {
    /// Create a pool configuration with library defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a typed configuration from layered properties.
    ///
    /// `dataSource.*` keys go to [`PoolConfig::data_source_properties`].
    /// Keys with a typed field must carry a well-formed value; the rest are
    /// kept in [`PoolConfig::extra`] for the factory.
    pub fn from_properties(props: &PoolProperties) -> DataSourceResult<Self> {
        let mut config = Self::default();
        for (key, value) in props.iter() {
            config.apply(key, value)?;
        }
        debug!(
            pool = config.pool_name.as_deref().unwrap_or_default(),
            maximum_pool_size = config.maximum_pool_size,
            "Pool config built"
        );
        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &str) -> DataSourceResult<()> {
        if let Some(name) = key.strip_prefix(DATA_SOURCE_PREFIX) {
            if name.is_empty() {
                return Err(DataSourceError::invalid_property(
                    key,
                    value,
                    "missing data source property name",
                ));
            }
            self.data_source_properties
                .insert(name.to_string(), value.to_string());
            return Ok(());
        }

        match key {
            POOL_NAME => self.pool_name = Some(value.to_string()),
            DATA_SOURCE_CLASS_NAME => self.data_source_class_name = Some(value.to_string()),
            "jdbcUrl" => self.jdbc_url = Some(value.to_string()),
            "username" => self.username = Some(value.to_string()),
            "password" => self.password = Some(value.to_string()),
            "maximumPoolSize" => self.maximum_pool_size = parse_u32(key, value)?,
            "minimumIdle" => self.minimum_idle = Some(parse_u32(key, value)?),
            "connectionTimeout" => self.connection_timeout = parse_millis(key, value)?,
            "idleTimeout" => self.idle_timeout = parse_millis(key, value)?,
            "maxLifetime" => self.max_lifetime = parse_millis(key, value)?,
            "validationTimeout" => self.validation_timeout = parse_millis(key, value)?,
            "leakDetectionThreshold" => self.leak_detection_threshold = parse_millis(key, value)?,
            "autoCommit" => self.auto_commit = parse_bool(key, value)?,
            "readOnly" => self.read_only = parse_bool(key, value)?,
            "allowPoolSuspension" => self.allow_pool_suspension = parse_bool(key, value)?,
            "connectionTestQuery" => self.connection_test_query = Some(value.to_string()),
            "connectionInitSql" => self.connection_init_sql = Some(value.to_string()),
            "catalog" => self.catalog = Some(value.to_string()),
            "schema" => self.schema = Some(value.to_string()),
            "transactionIsolation" => self.transaction_isolation = Some(value.to_string()),
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    /// Set the maximum pool size.
    pub fn maximum_pool_size(mut self, n: u32) -> Self {
        self.maximum_pool_size = n;
        self
    }

    /// Set the minimum idle connections.
    pub fn minimum_idle(mut self, n: u32) -> Self {
        self.minimum_idle = Some(n);
        self
    }

    /// Set the connection timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set auto-commit.
    pub fn auto_commit(mut self, enabled: bool) -> Self {
        self.auto_commit = enabled;
        self
    }

    /// Set a pool property without a typed field.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Set a data source property.
    pub fn data_source_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data_source_properties.insert(key.into(), value.into());
        self
    }

    /// Effective minimum idle connections, clamped to the maximum pool size.
    pub fn effective_minimum_idle(&self) -> u32 {
        self.minimum_idle
            .map_or(self.maximum_pool_size, |n| n.min(self.maximum_pool_size))
    }

    /// Effective connection timeout; `None` when callers wait forever.
    pub fn effective_connection_timeout(&self) -> Option<Duration> {
        (!self.connection_timeout.is_zero()).then_some(self.connection_timeout)
    }

    /// Check that the pool has something to connect with.
    ///
    /// Tuning values are left to the pool library, which rejects what it
    /// cannot use when the factory builds the pool.
    pub fn validate(&self) -> DataSourceResult<()> {
        if self.data_source_class_name.is_none() && self.jdbc_url.is_none() {
            return Err(DataSourceError::config(format!(
                "Pool '{}' needs a {} or a jdbcUrl",
                self.pool_name.as_deref().unwrap_or_default(),
                DATA_SOURCE_CLASS_NAME
            )));
        }
        Ok(())
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

fn parse_u32(key: &str, value: &str) -> DataSourceResult<u32> {
    value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| DataSourceError::invalid_property(key, value, e.to_string()))
}

fn parse_millis(key: &str, value: &str) -> DataSourceResult<Duration> {
    value
        .trim()
        .parse()
        .map(Duration::from_millis)
        .map_err(|e: std::num::ParseIntError| DataSourceError::invalid_property(key, value, e.to_string()))
}

fn parse_bool(key: &str, value: &str) -> DataSourceResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(DataSourceError::invalid_property(
            key,
            value,
            "expected true or false",
        )),
    }
}

/// A constructed connection pool.
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Name the pool was built with.
    fn pool_name(&self) -> &str;

    /// Close the pool and release its connections.
    fn close(&self) -> Result<(), BoxError>;

    /// Whether [`DataSource::close`] has completed.
    fn is_closed(&self) -> bool;
}

/// Builds pools from a finished [`PoolConfig`].
pub trait PoolFactory {
    /// Construct a pool.
    fn create(&self, config: &PoolConfig) -> Result<Arc<dyn DataSource>, BoxError>;
}

impl<F> PoolFactory for F
where
    F: Fn(&PoolConfig) -> Result<Arc<dyn DataSource>, BoxError>,
{
    fn create(&self, config: &PoolConfig) -> Result<Arc<dyn DataSource>, BoxError> {
        self(config)
    }
}
