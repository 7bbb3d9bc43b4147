//! URL prefix to data source class lookup.

use crate::error::{DataSourceError, DataSourceResult};
use tracing::debug;

/// A known JDBC URL prefix and the data source class that serves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverEntry {
    /// URL prefix, including the trailing `:`.
    pub prefix: &'static str,
    /// Database family the prefix belongs to.
    pub vendor: &'static str,
    /// Fully qualified data source class name. Never empty.
    pub driver_class: &'static str,
}

impl DriverEntry {
    const fn new(prefix: &'static str, vendor: &'static str, driver_class: &'static str) -> Self {
        Self {
            prefix,
            vendor,
            driver_class,
        }
    }

    /// Whether `url` is served by this entry.
    pub fn matches(&self, url: &str) -> bool {
        url.starts_with(self.prefix)
    }
}

/// Known drivers, checked in order; the first matching prefix wins.
///
/// An entry must never be shadowed by an earlier one: when two prefixes
/// overlap the more specific one is declared first.
pub static DRIVERS: &[DriverEntry] = &[
    DriverEntry::new("jdbc:h2:", "h2", "org.h2.jdbcx.JdbcDataSource"),
    DriverEntry::new("jdbc:derby:", "derby", "org.apache.derby.jdbc.ClientDataSource"),
    DriverEntry::new("jdbc:db2:", "db2", "com.ibm.db2.jcc.DB2SimpleDataSource"),
    DriverEntry::new("jdbc:hsqldb:", "hsqldb", "org.hsqldb.jdbc.JDBCDataSource"),
    DriverEntry::new("jdbc:mariadb:", "mariadb", "org.mariadb.jdbc.MySQLDataSource"),
    DriverEntry::new(
        "jdbc:mysql:",
        "mysql",
        "com.mysql.jdbc.jdbc2.optional.MysqlDataSource",
    ),
    DriverEntry::new(
        "jdbc:sqlserver:",
        "sqlserver",
        "com.microsoft.sqlserver.jdbc.SQLServerDataSource",
    ),
    DriverEntry::new("jdbc:oracle:", "oracle", "oracle.jdbc.pool.OracleDataSource"),
    DriverEntry::new("jdbc:pgsql:", "pgsql", "com.impossibl.postgres.jdbc.PGDataSource"),
    DriverEntry::new(
        "jdbc:postgresql:",
        "postgresql",
        "org.postgresql.ds.PGSimpleDataSource",
    ),
    DriverEntry::new("jdbc:jtds:sybase:", "sybase", "com.sybase.jdbcx.SybDataSource"),
    DriverEntry::new(
        "jdbc:jtds:sqlserver:",
        "sqlserver",
        "net.sourceforge.jtds.jdbcx.JtdsDataSource",
    ),
    DriverEntry::new(
        "jdbc:firebirdsql:",
        "firebirdsql",
        "org.firebirdsql.pool.FBSimpleDataSource",
    ),
    DriverEntry::new("jdbc:sqlite:", "sqlite", "org.sqlite.SQLiteDataSource"),
];

/// Find the driver entry serving `url`.
pub fn lookup(url: &str) -> Option<&'static DriverEntry> {
    DRIVERS.iter().find(|entry| entry.matches(url))
}

/// Resolve the data source class for `url`.
///
/// The built-in table wins; `explicit` (the `databases.<vendor>.dataSourceClassName`
/// setting) is only consulted for URLs the table does not know.
pub fn resolve_driver_class(
    url: &str,
    vendor: &str,
    explicit: Option<&str>,
) -> DataSourceResult<String> {
    if let Some(entry) = lookup(url) {
        debug!(vendor = entry.vendor, driver = entry.driver_class, "Driver resolved from table");
        return Ok(entry.driver_class.to_string());
    }

    match explicit.map(str::trim).filter(|class| !class.is_empty()) {
        Some(class) => {
            debug!(vendor, driver = class, "Driver resolved from configuration");
            Ok(class.to_string())
        }
        None => Err(DataSourceError::config(format!(
            "Unknown database '{}', set databases.{}.dataSourceClassName",
            vendor, vendor
        ))),
    }
}
