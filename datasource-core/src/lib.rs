//! # datasource-core
//!
//! Resolves a database descriptor into a fully specified connection-pool
//! construction request, then installs the pool into a host.
//!
//! This crate provides:
//! - A TOML configuration tree with dotted-path lookup and `${...}` substitution
//! - Alias (`mem`, `fs`) and URL resolution into a [`ConnectionDescriptor`]
//! - An ordered JDBC driver table
//! - Layered pool properties with a fixed precedence
//! - A typed [`PoolConfig`] handed to an external [`PoolFactory`]
//! - Registration by name and shutdown hooks
//!
//! ## Resolving a database
//!
//! ```rust
//! use datasource_core::{Config, Database, Host, MapEnvSource};
//!
//! let config = Config::parse(r#"
//!     [db]
//!     url = "jdbc:mysql://localhost/shop"
//!     user = "shop"
//!     password = "secret"
//!     cachePrepStmts = false
//! "#).unwrap();
//! let host = Host::new().with_env(MapEnvSource::new());
//!
//! let pool = Database::default().prepare(&config, &host).unwrap();
//! let props = pool.properties();
//! assert_eq!(props.get("poolName"), Some("mysql.shop"));
//! assert_eq!(props.get("dataSource.cachePrepStmts"), Some("false"));
//! assert_eq!(props.get("dataSource.prepStmtCacheSize"), Some("250"));
//! ```
//!
//! ## Installing a pool
//!
//! ```rust
//! use std::sync::Arc;
//! use datasource_core::{
//!     BoxError, Config, DataSource, Database, FixedClock, Host, MapEnvSource, PoolConfig,
//!     ServiceKey,
//! };
//!
//! #[derive(Debug)]
//! struct Pool(String);
//!
//! impl DataSource for Pool {
//!     fn pool_name(&self) -> &str { &self.0 }
//!     fn close(&self) -> Result<(), BoxError> { Ok(()) }
//!     fn is_closed(&self) -> bool { false }
//! }
//!
//! let factory = |config: &PoolConfig| -> Result<Arc<dyn DataSource>, BoxError> {
//!     Ok(Arc::new(Pool(config.pool_name.clone().unwrap_or_default())))
//! };
//!
//! let host = Host::new().with_clock(FixedClock(123)).with_env(MapEnvSource::new());
//! let config = Config::parse(r#"db = "mem""#).unwrap();
//!
//! let pool = Database::default().install(&config, &host, &factory).unwrap();
//! assert_eq!(pool.pool_name(), "h2.123");
//! assert!(host.registry().get(&ServiceKey::Default).is_some());
//! assert!(host.registry().named("123").is_some());
//! assert_eq!(host.stop(), 0);
//! ```

pub mod config;
pub mod connection;
pub mod database;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod logging;
pub mod registry;

pub use config::{Config, EnvSource, MapEnvSource, StdEnvSource};
pub use database::{Database, NamedPool};
pub use error::{BoxError, DataSourceError, DataSourceResult};
pub use host::Host;
pub use lifecycle::Lifecycle;
pub use registry::{DataSourceRegistry, ServiceKey};

// Re-export connection types
pub use connection::{
    Clock, ConnectionDescriptor, DataSource, DriverEntry, FixedClock, PoolConfig, PoolFactory,
    PoolProperties, PropertyLayers, SystemClock,
};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::config::{Config, EnvSource, MapEnvSource};
    pub use crate::connection::{
        ConnectionDescriptor, DataSource, FixedClock, PoolConfig, PoolFactory, PoolProperties,
    };
    pub use crate::database::{Database, NamedPool};
    pub use crate::error::{BoxError, DataSourceError, DataSourceResult};
    pub use crate::host::Host;
    pub use crate::registry::ServiceKey;
}
