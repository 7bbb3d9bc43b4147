//! Pool property layering.
//!
//! Properties use the pool library's naming: top-level keys configure the
//! pool (`maximumPoolSize`, `poolName`) and `dataSource.`-prefixed keys are
//! handed through to the driver's data source (`dataSource.url`,
//! `dataSource.cachePrepStmts`).
//!
//! ```rust
//! use datasource_core::connection::{PropertyLayers, DATA_SOURCE_CLASS_NAME, POOL_NAME};
//!
//! let props = PropertyLayers::new("org.h2.jdbcx.JdbcDataSource", "h2.db")
//!     .url("jdbc:h2:mem:db")
//!     .credentials(Some("sa"), Some(""))
//!     .pool_overrides([("maximumPoolSize", "4")])
//!     .build();
//!
//! assert_eq!(props.get(DATA_SOURCE_CLASS_NAME), Some("org.h2.jdbcx.JdbcDataSource"));
//! assert_eq!(props.get("dataSource.url"), Some("jdbc:h2:mem:db"));
//! assert_eq!(props.get(POOL_NAME), Some("h2.db"));
//! ```

use indexmap::IndexMap;
use serde::Serialize;

/// Prefix of properties forwarded to the driver's data source.
pub const DATA_SOURCE_PREFIX: &str = "dataSource.";

/// Pool key naming the data source class.
pub const DATA_SOURCE_CLASS_NAME: &str = "dataSourceClassName";

/// Pool key naming the pool.
pub const POOL_NAME: &str = "poolName";

/// Ordered pool properties.
///
/// Setting an existing key overwrites its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PoolProperties {
    entries: IndexMap<String, String>,
}

impl PoolProperties {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Get a property.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Remove a property, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.shift_remove(key)
    }

    /// Check if a property is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no property is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Properties under `dataSource.`, with the prefix stripped.
    pub fn data_source_properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter_map(|(k, v)| k.strip_prefix(DATA_SOURCE_PREFIX).map(|k| (k, v)))
    }

    /// Overlay `other`: its values win for shared keys.
    pub fn merge<K, V>(&mut self, other: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in other {
            self.set(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PoolProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        props.merge(iter);
        props
    }
}

impl<'a> IntoIterator for &'a PoolProperties {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Prefix `key` with `dataSource.` unless it already is.
pub fn data_source_key(key: &str) -> String {
    if key.starts_with(DATA_SOURCE_PREFIX) {
        key.to_string()
    } else {
        format!("{}{}", DATA_SOURCE_PREFIX, key)
    }
}

/// Move the resolved class into the key the pool library reads.
///
/// An explicit `dataSourceClassName` override wins; otherwise the resolved
/// `dataSource.dataSourceClassName` is promoted. The internal key is always
/// removed so the data source never sees it.
pub fn promote_driver_class(props: &mut PoolProperties) {
    let internal = data_source_key(DATA_SOURCE_CLASS_NAME);
    let resolved = props.remove(&internal);
    if !props.contains_key(DATA_SOURCE_CLASS_NAME) {
        if let Some(class) = resolved {
            props.set(DATA_SOURCE_CLASS_NAME, class);
        }
    }
}

/// The layers that make up a pool's properties.
///
/// Layers are applied in a fixed order regardless of the order they were
/// supplied in: base (class, credentials, url), vendor defaults, data source
/// overrides, pool overrides. The class key is then promoted and `poolName`
/// set last.
#[derive(Debug, Clone, Default)]
pub struct PropertyLayers {
    driver_class: String,
    pool_name: String,
    user: Option<String>,
    password: Option<String>,
    url: Option<String>,
    vendor_defaults: PoolProperties,
    data_source_overrides: PoolProperties,
    pool_overrides: PoolProperties,
}

impl PropertyLayers {
    /// Start from the resolved data source class and pool name.
    pub fn new(driver_class: impl Into<String>, pool_name: impl Into<String>) -> Self {
        Self {
            driver_class: driver_class.into(),
            pool_name: pool_name.into(),
            ..Default::default()
        }
    }

    /// Set the credentials. Absent values are not emitted.
    pub fn credentials(mut self, user: Option<&str>, password: Option<&str>) -> Self {
        self.user = user.map(String::from);
        self.password = password.map(String::from);
        self
    }

    /// Emit `dataSource.url`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Vendor tuning defaults, keyed as pool properties.
    pub fn vendor_defaults<K, V>(mut self, defaults: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vendor_defaults.merge(defaults);
        self
    }

    /// Data source overrides; keys are prefixed with `dataSource.`.
    pub fn data_source_overrides<K, V>(mut self, overrides: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        self.data_source_overrides.merge(
            overrides
                .into_iter()
                .map(|(k, v)| (data_source_key(k.as_ref()), v)),
        );
        self
    }

    /// Pool overrides, keyed as pool properties.
    pub fn pool_overrides<K, V>(mut self, overrides: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.pool_overrides.merge(overrides);
        self
    }

    /// Build the final property set.
    pub fn build(&self) -> PoolProperties {
        let mut props = PoolProperties::new();

        props.set(data_source_key(DATA_SOURCE_CLASS_NAME), self.driver_class.as_str());
        if let Some(user) = &self.user {
            props.set(data_source_key("user"), user.as_str());
        }
        if let Some(password) = &self.password {
            props.set(data_source_key("password"), password.as_str());
        }
        if let Some(url) = &self.url {
            props.set(data_source_key("url"), url.as_str());
        }

        props.merge(&self.vendor_defaults);
        props.merge(&self.data_source_overrides);
        props.merge(&self.pool_overrides);

        promote_driver_class(&mut props);
        props.set(POOL_NAME, self.pool_name.as_str());
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MYSQL: &str = "com.mysql.jdbc.jdbc2.optional.MysqlDataSource";

    fn mysql_defaults() -> Vec<(&'static str, &'static str)> {
        vec![
            ("dataSource.cachePrepStmts", "true"),
            ("dataSource.prepStmtCacheSize", "250"),
            ("dataSource.prepStmtCacheSqlLimit", "2048"),
            ("dataSource.useServerPrepStmts", "true"),
            ("dataSource.encoding", "UTF-8"),
        ]
    }

    #[test]
    fn test_base_properties() {
        let props = PropertyLayers::new(MYSQL, "mysql.db")
            .url("jdbc:mysql://localhost/db")
            .credentials(Some("foo"), Some("bar"))
            .build();

        let expected: PoolProperties = [
            ("dataSource.user", "foo"),
            ("dataSource.password", "bar"),
            ("dataSource.url", "jdbc:mysql://localhost/db"),
            ("dataSourceClassName", MYSQL),
            ("poolName", "mysql.db"),
        ]
        .into_iter()
        .collect();
        assert_eq!(props, expected);
        assert!(!props.contains_key("dataSource.dataSourceClassName"));
    }

    #[test]
    fn test_absent_credentials_and_url_are_not_emitted() {
        let props = PropertyLayers::new("org.apache.derby.jdbc.ClientDataSource", "derby.testdb")
            .credentials(None, None)
            .build();

        assert_eq!(props.len(), 2);
        assert!(!props.contains_key("dataSource.user"));
        assert!(!props.contains_key("dataSource.password"));
        assert!(!props.contains_key("dataSource.url"));
    }

    #[test]
    fn test_user_override_beats_vendor_default() {
        let props = PropertyLayers::new(MYSQL, "mysql.db")
            .vendor_defaults(mysql_defaults())
            .data_source_overrides([("cachePrepStmts", "false")])
            .build();

        assert_eq!(props.get("dataSource.cachePrepStmts"), Some("false"));
        assert_eq!(props.get("dataSource.prepStmtCacheSize"), Some("250"));
    }

    #[test]
    fn test_layer_order_is_fixed() {
        let forward = PropertyLayers::new(MYSQL, "mysql.db")
            .vendor_defaults(mysql_defaults())
            .pool_overrides([("dataSource.encoding", "latin1")])
            .build();
        let backward = PropertyLayers::new(MYSQL, "mysql.db")
            .pool_overrides([("dataSource.encoding", "latin1")])
            .vendor_defaults(mysql_defaults())
            .build();

        assert_eq!(forward.get("dataSource.encoding"), Some("latin1"));
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_overrides_are_idempotent() {
        let overrides = [("maximumPoolSize", "10"), ("autoCommit", "false")];

        let once = PropertyLayers::new(MYSQL, "mysql.db")
            .pool_overrides(overrides)
            .build();
        let twice = PropertyLayers::new(MYSQL, "mysql.db")
            .pool_overrides(overrides)
            .pool_overrides(overrides)
            .build();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_explicit_class_wins() {
        let props = PropertyLayers::new("org.h2.jdbcx.JdbcDataSource", "h2.jdbctest")
            .pool_overrides([("dataSourceClassName", "test.MyDataSource")])
            .build();

        assert_eq!(props.get(DATA_SOURCE_CLASS_NAME), Some("test.MyDataSource"));
        assert!(!props.contains_key("dataSource.dataSourceClassName"));
    }

    #[test]
    fn test_pool_name_is_set_last() {
        let props = PropertyLayers::new(MYSQL, "mysql.db")
            .pool_overrides([("poolName", "custom")])
            .build();

        assert_eq!(props.get(POOL_NAME), Some("mysql.db"));
    }

    #[test]
    fn test_data_source_properties_strip_prefix() {
        let props = PropertyLayers::new(MYSQL, "mysql.db")
            .url("jdbc:mysql://localhost/db")
            .pool_overrides([("maximumPoolSize", "10")])
            .build();

        let ds: Vec<_> = props.data_source_properties().collect();
        assert_eq!(ds, vec![("url", "jdbc:mysql://localhost/db")]);
    }

    #[test]
    fn test_data_source_key() {
        assert_eq!(data_source_key("user"), "dataSource.user");
        assert_eq!(data_source_key("dataSource.user"), "dataSource.user");
    }
}
