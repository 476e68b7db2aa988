use std::fmt;
use std::io;

/// Unified error type for the permission-set lifecycle engine.
///
/// Each variant maps to one category of the ingestion error taxonomy.
/// `Validation` is a client error and is never retried; the store, parse and
/// lookup variants are transient and are surfaced so the external caller or
/// event-redrive substrate can retry the whole invocation. No internal retry
/// loops exist anywhere in the crate.
#[derive(Debug)]
pub enum PermSetError {
    /// Malformed or missing input (bad name, document failed schema validation)
    Validation(String),

    /// Object body in event mode was not valid JSON
    Parse(String),

    /// Transient failure reading from a backing table
    StoreRead(String),

    /// Transient failure writing to a backing table
    StoreWrite(String),

    /// Transient failure during the delete path's link-dependency check
    Lookup(String),

    /// Failure fetching or storing an object in the object store
    ObjectStore(String),

    /// Invalid deployment configuration (bad mode flag, missing principal)
    Config(String),

    /// Errors related to IO operations
    Io(io::Error),

    /// Errors related to serialization/deserialization
    Serialization(String),
}

impl fmt::Display for PermSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
            Self::StoreRead(msg) => write!(f, "Store read error: {}", msg),
            Self::StoreWrite(msg) => write!(f, "Store write error: {}", msg),
            Self::Lookup(msg) => write!(f, "Link lookup error: {}", msg),
            Self::ObjectStore(msg) => write!(f, "Object store error: {}", msg),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for PermSetError {}

impl From<io::Error> for PermSetError {
    fn from(error: io::Error) -> Self {
        PermSetError::Io(error)
    }
}

impl From<serde_json::Error> for PermSetError {
    fn from(error: serde_json::Error) -> Self {
        PermSetError::Serialization(error.to_string())
    }
}

impl PermSetError {
    /// Whether the external delivery substrate should re-attempt the
    /// invocation that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreRead(_)
                | Self::StoreWrite(_)
                | Self::Lookup(_)
                | Self::ObjectStore(_)
                | Self::Io(_)
        )
    }
}

/// Result type alias for permission-set operations
pub type PermSetResult<T> = Result<T, PermSetError>;
