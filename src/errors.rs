//! Observer Protocol Error Hierarchy
//!
//! Registration and removal failures are reported synchronously to the
//! caller. A synchronous observer's own failure is handed back unchanged to
//! whoever triggered the access. Background observer failures never come
//! through here; they go to the failure channel instead.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed registration or removal arguments
    #[error("Invalid observer registration: {0}")]
    Validation(String),

    /// Target cannot be tracked (legacy object model)
    #[error("Unsupported observation target: {0}")]
    UnsupportedTarget(String),

    /// Class or instance never opted in to this observatory
    #[error("{0} does not support observation")]
    NotObservable(String),

    /// Set/delete on a property without a setter/deleter
    #[error("can't {operation} attribute '{property}'")]
    AttributeAccess {
        property: String,
        operation: &'static str,
    },

    /// Failure raised by an observer callback
    #[error(transparent)]
    Callback(Box<dyn std::error::Error + Send + Sync>),

    /// Configuration source failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Wraps an arbitrary failure raised from inside an observer.
    pub fn callback(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Callback(err.into())
    }

    pub(crate) fn cannot_set(property: &str) -> Self {
        Error::AttributeAccess {
            property: property.to_string(),
            operation: "set",
        }
    }

    pub(crate) fn cannot_delete(property: &str) -> Self {
        Error::AttributeAccess {
            property: property.to_string(),
            operation: "delete",
        }
    }
}
