//! The services a data source is installed into.

use crate::config::{EnvSource, StdEnvSource};
use crate::connection::{Clock, SystemClock};
use crate::lifecycle::Lifecycle;
use crate::registry::DataSourceRegistry;
use std::fmt;
use std::sync::Arc;

/// Registry, shutdown hooks and the ambient inputs of resolution.
pub struct Host {
    registry: DataSourceRegistry,
    lifecycle: Lifecycle,
    clock: Arc<dyn Clock>,
    env: Arc<dyn EnvSource>,
}

impl Host {
    /// Create a host using the system clock and process environment.
    pub fn new() -> Self {
        Self {
            registry: DataSourceRegistry::new(),
            lifecycle: Lifecycle::new(),
            clock: Arc::new(SystemClock),
            env: Arc::new(StdEnvSource),
        }
    }

    /// Replace the clock used for `mem` database names.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the environment used for `${...}` substitution.
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Installed data sources.
    pub fn registry(&self) -> &DataSourceRegistry {
        &self.registry
    }

    /// Shutdown hooks.
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Clock for `mem` database names.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Environment for substitution.
    pub fn env(&self) -> &dyn EnvSource {
        self.env.as_ref()
    }

    /// Run the shutdown hooks, returning the number that failed.
    pub fn stop(&self) -> usize {
        self.lifecycle.stop()
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("registry", &self.registry)
            .field("lifecycle", &self.lifecycle)
            .field("now", &self.clock.millis())
            .finish_non_exhaustive()
    }
}
