//! Shared fixtures for integration tests.

#![allow(dead_code)]

use datasource::{BoxError, DataSource, PoolConfig, PoolFactory};
use datasource::config::MapEnvSource;
use datasource::connection::FixedClock;
use datasource::Host;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A pool that only records whether it was closed.
#[derive(Debug)]
pub struct RecordedPool {
    pub config: PoolConfig,
    closed: AtomicBool,
}

impl DataSource for RecordedPool {
    fn pool_name(&self) -> &str {
        self.config.pool_name.as_deref().unwrap_or_default()
    }

    fn close(&self) -> Result<(), BoxError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Factory that records every configuration it is asked to build.
#[derive(Debug, Default)]
pub struct RecordingFactory {
    pub created: Mutex<Vec<PoolConfig>>,
    pub fail: bool,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.created.lock().len()
    }

    pub fn last(&self) -> PoolConfig {
        self.created.lock().last().cloned().expect("no pool created")
    }
}

impl PoolFactory for RecordingFactory {
    fn create(&self, config: &PoolConfig) -> Result<Arc<dyn DataSource>, BoxError> {
        self.created.lock().push(config.clone());
        if self.fail {
            return Err("connection refused".into());
        }
        Ok(Arc::new(RecordedPool {
            config: config.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

/// Host with a frozen clock and an empty environment.
pub fn test_host() -> Host {
    Host::new()
        .with_clock(FixedClock(123))
        .with_env(MapEnvSource::new())
}
