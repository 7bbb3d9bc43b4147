//! Registration of constructed pools by service key.

use crate::connection::DataSource;
use crate::error::{DataSourceError, DataSourceResult};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Key a data source is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceKey {
    /// The unnamed default data source.
    Default,
    /// A data source registered under a database name.
    Named(String),
}

impl ServiceKey {
    /// Create a named key.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "<default>"),
            Self::Named(name) => write!(f, "'{}'", name),
        }
    }
}

/// Thread-safe lookup of constructed data sources.
///
/// The first data source registered is also bound as [`ServiceKey::Default`];
/// later ones are only reachable by name.
#[derive(Debug, Default)]
pub struct DataSourceRegistry {
    entries: RwLock<IndexMap<ServiceKey, Arc<dyn DataSource>>>,
}

impl DataSourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `data_source` under `name`, returning the keys it was bound to.
    pub fn register(
        &self,
        name: &str,
        data_source: Arc<dyn DataSource>,
    ) -> DataSourceResult<Vec<ServiceKey>> {
        let named = ServiceKey::named(name);
        let mut entries = self.entries.write();
        if entries.contains_key(&named) {
            return Err(DataSourceError::DuplicateService(named.to_string()));
        }

        let mut keys = Vec::with_capacity(2);
        if !entries.contains_key(&ServiceKey::Default) {
            entries.insert(ServiceKey::Default, Arc::clone(&data_source));
            keys.push(ServiceKey::Default);
        }
        entries.insert(named.clone(), data_source);
        keys.push(named);

        debug!(name, keys = keys.len(), "Data source registered");
        Ok(keys)
    }

    /// Look up a data source by key.
    pub fn get(&self, key: &ServiceKey) -> Option<Arc<dyn DataSource>> {
        self.entries.read().get(key).cloned()
    }

    /// The default data source.
    pub fn default_source(&self) -> Option<Arc<dyn DataSource>> {
        self.get(&ServiceKey::Default)
    }

    /// A data source by database name.
    pub fn named(&self, name: &str) -> Option<Arc<dyn DataSource>> {
        self.get(&ServiceKey::named(name))
    }

    /// Registered keys, in registration order.
    pub fn keys(&self) -> Vec<ServiceKey> {
        self.entries.read().keys().cloned().collect()
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
