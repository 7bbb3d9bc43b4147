//! Error types for descriptor resolution and pool construction.
//!
//! Every error raised here is fatal at startup: a host that fails to install
//! a data source is expected to abort rather than run without it. Nothing is
//! retried.
//!
//! ```rust
//! use datasource_core::DataSourceError;
//!
//! let err = DataSourceError::config("A database is required");
//! assert!(err.is_configuration());
//! assert_eq!(err.to_string(), "Configuration error: A database is required");
//! ```

use thiserror::Error;

/// Boxed error returned by collaborators (pool factories, shutdown actions).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for data source operations.
pub type DataSourceResult<T> = Result<T, DataSourceError>;

/// Errors that can occur while resolving or installing a data source.
#[derive(Error, Debug)]
pub enum DataSourceError {
    /// The configuration is incomplete or inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A pool property could not be converted to its typed form.
    #[error("Invalid pool property '{key}' = '{value}': {message}")]
    InvalidProperty {
        /// Property name.
        key: String,
        /// Raw property value.
        value: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The pool factory rejected the construction request.
    #[error("Failed to construct pool '{pool}': {source}")]
    Construction {
        /// Pool name of the rejected request.
        pool: String,
        /// Underlying factory error.
        #[source]
        source: BoxError,
    },

    /// A data source is already registered under the requested key.
    #[error("A data source is already registered under {0}")]
    DuplicateService(String),

    /// The configuration file is not valid TOML.
    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataSourceError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an invalid property error.
    pub fn invalid_property(
        key: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidProperty {
            key: key.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Whether this error comes from the configuration rather than the pool.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::InvalidProperty { .. } | Self::Toml(_)
        )
    }

    /// Whether the pool factory rejected the request.
    pub fn is_construction(&self) -> bool {
        matches!(self, Self::Construction { .. })
    }
}
