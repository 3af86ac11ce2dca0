//! Error types for knowledge store operations
//!
//! A miss on a read is not an error: reads return `None` (or the
//! [`UNKNOWN`](crate::knowledge::UNKNOWN) sentinel). Everything here is
//! either a fault of the backing store or input the compiler refuses.

use crate::schema::InfoKind;
use thiserror::Error;

/// Main error type for compile and store operations
#[derive(Error, Debug)]
pub enum KnowledgeError {
    /// The graph store could not be contacted (network, pool, handshake)
    #[error("Store unreachable: {0}")]
    StoreUnreachable(String),

    /// A store call exceeded the configured deadline
    #[error("Operation timed out after {timeout_ms}ms: {context}")]
    Timeout { timeout_ms: u64, context: String },

    /// Invalid credentials or missing permissions
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The store rejected or failed to evaluate a query
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A specifier carried a relation tag outside the known set (strict mode only)
    #[error("Unrecognized relation tag '{tag}' on specifier '{phrase}'")]
    UnrecognizedRelationTag { tag: String, phrase: String },

    /// The fact payload does not fit the requested info-kind
    #[error("Info-kind {kind} expects {expected}")]
    KindMismatch {
        kind: InfoKind,
        expected: &'static str,
    },

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Neo4rs driver error (wrapper)
    #[error("Neo4rs driver error: {0}")]
    Driver(#[from] neo4rs::Error),
}

impl KnowledgeError {
    /// Whether retrying the same call may succeed.
    ///
    /// Transport faults and timeouts are retryable; query, auth, config and
    /// input errors will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            KnowledgeError::StoreUnreachable(_) | KnowledgeError::Timeout { .. } => true,
            KnowledgeError::Driver(e) => is_transport_fault(e),
            _ => false,
        }
    }

    /// Classify a driver error raised while talking to the server.
    pub(crate) fn from_driver(context: &str, err: neo4rs::Error) -> Self {
        match err {
            neo4rs::Error::AuthenticationError(msg) => KnowledgeError::Authentication(msg),
            e if is_transport_fault(&e) => {
                KnowledgeError::StoreUnreachable(format!("{}: {}", context, e))
            }
            e => KnowledgeError::Query(format!("{}: {}", context, e)),
        }
    }
}

fn is_transport_fault(err: &neo4rs::Error) -> bool {
    matches!(
        err,
        neo4rs::Error::IOError { .. } | neo4rs::Error::ConnectionError
    )
}

impl From<serde_json::Error> for KnowledgeError {
    fn from(e: serde_json::Error) -> Self {
        KnowledgeError::Serialization(e.to_string())
    }
}

/// Result type alias for knowledge store operations
pub type Result<T> = std::result::Result<T, KnowledgeError>;
