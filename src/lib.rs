//! # Datasource
//!
//! Resolve database descriptors into fully specified connection-pool
//! configurations.
//!
//! Datasource provides:
//! - `mem` and `fs` aliases for embedded H2 databases
//! - Driver lookup from JDBC URLs
//! - Layered pool properties: vendor defaults, per-database overrides, pool settings
//! - Registration of constructed pools by name, with shutdown hooks
//!
//! ## Quick Start
//!
//! ```rust
//! use datasource::prelude::*;
//!
//! let config = Config::parse(r#"
//!     db = "fs"
//!
//!     [application]
//!     name = "shop"
//!     tmpdir = "target"
//!
//!     [hikari]
//!     maximumPoolSize = 10
//!     autoCommit = false
//! "#)?;
//!
//! let pool = Database::default().prepare(&config, &Host::new())?;
//! assert_eq!(pool.descriptor().url(), "jdbc:h2:target/shop");
//! assert_eq!(pool.properties().get("poolName"), Some("h2.shop"));
//! assert_eq!(pool.properties().get("autoCommit"), Some("false"));
//! # Ok::<(), DataSourceError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Configuration tree and environment sources.
pub mod config {
    pub use datasource_core::config::*;
}

/// Descriptors, drivers and pool properties.
pub mod connection {
    pub use datasource_core::connection::*;
}

pub use datasource_core::logging;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use datasource_core::prelude::*;
}

// Re-export key types at the crate root
pub use datasource_core::{
    BoxError, Config, DataSource, DataSourceError, DataSourceRegistry, DataSourceResult,
    Database, Host, Lifecycle, NamedPool, PoolConfig, PoolFactory, PoolProperties, ServiceKey,
};
