//! Descriptor resolution, driver lookup and pool property layering.
//!
//! A database is named by a config path (`db`, `db.audit`) or given directly
//! as a URL. Resolution turns it into a [`ConnectionDescriptor`], the driver
//! table maps the URL to a data source class, and [`PropertyLayers`] builds the
//! properties the pool is constructed from.
//!
//! # Descriptor forms
//!
//! ```toml
//! # Built-in aliases
//! db = "mem"
//! db = "fs"
//!
//! # A literal URL
//! db = "jdbc:mysql://localhost/shop"
//!
//! # A table; extra keys become data source properties
//! [db]
//! url = "jdbc:mysql://localhost/shop"
//! user = "shop"
//! password = "secret"
//! cachePrepStmts = false
//! ```
//!
//! # Pool names
//!
//! ```rust
//! use datasource_core::ConnectionDescriptor;
//!
//! let d = ConnectionDescriptor::from_url(
//!     "db",
//!     "jdbc:sqlserver://localhost:1433;databaseName=AdventureWorks;integratedSecurity=true;",
//! )
//! .unwrap();
//! assert_eq!(d.pool_name(), "sqlserver.AdventureWorks");
//!
//! let d = ConnectionDescriptor::from_url("db", "jdbc:jtds:sybase://server/database").unwrap();
//! assert_eq!(d.vendor(), "sybase");
//! ```
//!
//! # Driver lookup
//!
//! ```rust
//! use datasource_core::connection::driver;
//!
//! let entry = driver::lookup("jdbc:postgresql://server/database").unwrap();
//! assert_eq!(entry.driver_class, "org.postgresql.ds.PGSimpleDataSource");
//! assert!(driver::lookup("jdbc:custom:testdb").is_none());
//! ```

mod descriptor;
pub mod driver;
mod pool;
mod properties;

pub use descriptor::{
    Clock, ConnectionDescriptor, DEFAULT_DB, FixedClock, MEM_SEED, ResolvedSource, Resolver,
    SystemClock,
};
pub use driver::{DRIVERS, DriverEntry};
pub use pool::{DataSource, PoolConfig, PoolFactory};
pub use properties::{
    DATA_SOURCE_CLASS_NAME, DATA_SOURCE_PREFIX, POOL_NAME, PoolProperties, PropertyLayers,
    data_source_key, promote_driver_class,
};
