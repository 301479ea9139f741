//! Error types for the host-runtime interface

/// Result type for host interface calls
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised while talking to the host runtime
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The calling OS thread could not be attached to the runtime
    #[error("Failed to attach current thread: {0}")]
    AttachFailed(String),

    /// Class lookup returned nothing
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    /// Method lookup returned nothing
    #[error("Method not found: {class}.{name}{descriptor}")]
    MethodNotFound {
        /// Class searched
        class: String,
        /// Method name
        name: String,
        /// Descriptor searched for
        descriptor: String,
    },

    /// Malformed method descriptor
    #[error("Invalid descriptor '{descriptor}': {reason}")]
    InvalidDescriptor {
        /// Descriptor text as given
        descriptor: String,
        /// What was wrong with it
        reason: String,
    },

    /// Malformed class name
    #[error("Invalid class name '{0}'")]
    InvalidClassName(String),

    /// Constructor call failed
    #[error("Failed to instantiate {class}: {reason}")]
    InstantiationFailed {
        /// Class being constructed
        class: String,
        /// Host-provided reason
        reason: String,
    },

    /// Managed code raised a throwable that is now pending on the thread
    #[error("Managed throwable: {0}")]
    Throwable(String),

    /// OS thread creation failed
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// No runtime handle has been published yet
    #[error("Host runtime handle not loaded")]
    NotLoaded,

    /// A runtime handle was already published
    #[error("Host runtime handle already loaded")]
    AlreadyLoaded,

    /// Any other host interface failure
    #[error("{0}")]
    Host(String),
}

impl From<String> for BridgeError {
    fn from(s: String) -> Self {
        BridgeError::Host(s)
    }
}

impl From<&str> for BridgeError {
    fn from(s: &str) -> Self {
        BridgeError::Host(s.to_string())
    }
}
