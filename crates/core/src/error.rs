//! Error types for Quill
//!
//! Two channels are kept apart:
//! - Validation outcomes (missing attributes, unknown references, ambiguous
//!   names) are ordinary data carried by `AttributeResult` and
//!   `ParsedCommand`, never errors.
//! - Faults (catalog failures, unreadable configuration, broken command
//!   tables) are represented here and propagated with `?`.

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Quill operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fault channel for every layer above the catalog client.
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog client failed while a command was being handled
    #[error("catalog {operation} failed for '{command}': {source}")]
    Catalog {
        /// Command name the failure belongs to (may be empty at low layers)
        command: String,
        /// Attempted operation (lookup, create, update, link, ...)
        operation: String,
        /// Underlying client failure
        #[source]
        source: CatalogError,
    },

    /// A header names a command that no registration covers
    #[error("unknown command: {command}")]
    UnknownCommand {
        /// Header text as written
        command: String,
    },

    /// A header starts with a word that is not a known verb
    #[error("unknown verb: {verb}")]
    UnknownVerb {
        /// The offending word
        verb: String,
    },

    /// A command block could not be interpreted at all
    #[error("malformed command block: {reason}")]
    MalformedBlock {
        /// What was wrong
        reason: String,
    },

    /// The command specification table is inconsistent or unreadable
    #[error("command table error: {reason}")]
    CommandTable {
        /// What was wrong
        reason: String,
    },

    /// Configuration could not be read or parsed
    #[error("configuration error: {reason}")]
    Config {
        /// What was wrong
        reason: String,
    },

    /// Invalid input supplied by the caller
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong
        reason: String,
    },

    /// I/O error (reading documents, writing results)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Wrap a catalog failure with the command and operation it interrupted.
    pub fn catalog(
        command: impl Into<String>,
        operation: impl Into<String>,
        source: CatalogError,
    ) -> Self {
        Error::Catalog {
            command: command.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Attach a command name to a catalog failure raised below the handler.
    ///
    /// Other variants are returned unchanged.
    pub fn in_command(self, name: &str) -> Self {
        match self {
            Error::Catalog {
                command,
                operation,
                source,
            } if command.is_empty() => Error::Catalog {
                command: name.to_string(),
                operation,
                source,
            },
            other => other,
        }
    }

    /// Whether retrying the same block later might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Catalog { source, .. } => source.is_retryable(),
            Error::Io(_) => true,
            _ => false,
        }
    }
}

/// Classification of catalog client failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogErrorKind {
    /// The addressed entity does not exist
    NotFound,
    /// Transport failure (connection refused, DNS, reset)
    Network,
    /// The request did not complete in time
    Timeout,
    /// Credentials were rejected
    Auth,
    /// The catalog reported an internal failure
    Server,
    /// The response could not be understood
    Protocol,
}

impl fmt::Display for CatalogErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CatalogErrorKind::NotFound => "not found",
            CatalogErrorKind::Network => "network error",
            CatalogErrorKind::Timeout => "timed out",
            CatalogErrorKind::Auth => "authentication failed",
            CatalogErrorKind::Server => "server error",
            CatalogErrorKind::Protocol => "protocol error",
        };
        f.write_str(s)
    }
}

/// A failure reported by a `CatalogClient` implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind}: {message}")]
pub struct CatalogError {
    /// Failure class
    pub kind: CatalogErrorKind,
    /// Human-readable detail
    pub message: String,
}

impl CatalogError {
    /// Create a new catalog error.
    pub fn new(kind: CatalogErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a `NotFound` failure.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(CatalogErrorKind::NotFound, message)
    }

    /// Transient failures are retryable; the rest are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            CatalogErrorKind::Network | CatalogErrorKind::Timeout | CatalogErrorKind::Server
        )
    }
}

impl From<CatalogError> for Error {
    fn from(source: CatalogError) -> Self {
        Error::Catalog {
            command: String::new(),
            operation: String::from("request"),
            source,
        }
    }
}
