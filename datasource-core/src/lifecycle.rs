//! Shutdown hooks.

use crate::error::BoxError;
use parking_lot::Mutex;
use std::fmt;
use tracing::{debug, warn};

type StopAction = Box<dyn FnOnce() -> Result<(), BoxError> + Send>;

/// Ordered set of actions run once when the host stops.
#[derive(Default)]
pub struct Lifecycle {
    hooks: Mutex<Vec<(String, StopAction)>>,
}

impl Lifecycle {
    /// Create an empty lifecycle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action to run on [`Lifecycle::stop`].
    pub fn on_stop<F>(&self, label: impl Into<String>, action: F)
    where
        F: FnOnce() -> Result<(), BoxError> + Send + 'static,
    {
        self.hooks.lock().push((label.into(), Box::new(action)));
    }

    /// Number of actions not yet run.
    pub fn pending(&self) -> usize {
        self.hooks.lock().len()
    }

    /// Run every registered action once, in registration order.
    ///
    /// Failures are logged and counted; the remaining actions still run.
    pub fn stop(&self) -> usize {
        let hooks = std::mem::take(&mut *self.hooks.lock());
        let mut failures = 0;
        for (label, action) in hooks {
            match action() {
                Ok(()) => debug!(hook = %label, "Stop hook completed"),
                Err(e) => {
                    failures += 1;
                    warn!(hook = %label, error = %e, "Stop hook failed");
                }
            }
        }
        failures
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hooks = self.hooks.lock();
        let labels: Vec<&str> = hooks.iter().map(|(label, _)| label.as_str()).collect();
        f.debug_struct("Lifecycle").field("hooks", &labels).finish()
    }
}
