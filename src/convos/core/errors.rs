//! Error types for the convo subsystem.

use thiserror::Error;

/// Convo subsystem error type.
///
/// Every variant names the kind of failure; the payload is the message
/// surfaced to clients in the error envelope.
#[derive(Debug, Error)]
pub enum ConvoError {
    /// Storage is unreachable or was never initialized.
    #[error("DB Connection: {0}")]
    Connection(String),
    /// A read query or row scan failed.
    #[error("Row Scan: {0}")]
    Query(String),
    /// An insert failed while creating a convo or a support row.
    #[error("Row Create: {0}")]
    Create(String),
    /// Applying an update command failed.
    #[error("Row Update: {0}")]
    Update(String),
    /// A delete statement failed.
    #[error("Row Delete: {0}")]
    Delete(String),
    /// No row matched the id together with the caller's visibility.
    #[error("No Rows Found: {0}")]
    NotFound(String),
    /// Beginning or committing a transaction failed.
    #[error("Transaction Problem: {0}")]
    Transaction(String),
    /// The inbound request could not be turned into a repository call.
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),
}

impl ConvoError {
    /// Build the not-found error for a convo id.
    #[must_use]
    pub fn convo_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("Unable to find convo with id '{id}'."))
    }

    /// Check if this error means the row does not exist for the caller.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Convenience result alias for convo operations.
pub type ConvoResult<T> = Result<T, ConvoError>;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of range or missing.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// An environment variable could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Raw value found in the environment.
        value: String,
    },
}
