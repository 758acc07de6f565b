//! Storage gateway owning the single `SQLite` connection.
//!
//! The gateway is built once by the application root and shared by
//! reference. Every repository call asks it for the connection and fails
//! with `ConvoError::Connection` until it has been initialized.

use tokio::sync::OnceCell;
use tokio_rusqlite::Connection;

use crate::convos::core::config::StorageConfig;
use crate::convos::core::errors::{ConvoError, ConvoResult};
use crate::convos::storage::schema::SCHEMA;

/// Owner of the process-wide storage connection.
pub struct StorageGateway {
    config: StorageConfig,
    conn: OnceCell<Connection>,
}

impl StorageGateway {
    /// Create an uninitialized gateway.
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            conn: OnceCell::new(),
        }
    }

    /// Create a gateway and initialize it.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or the schema cannot be created.
    pub async fn open(config: StorageConfig) -> ConvoResult<Self> {
        let gateway = Self::new(config);
        gateway.initialize().await?;
        Ok(gateway)
    }

    /// Open the connection and create the schema.
    ///
    /// Calling this again after success returns the existing connection.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or the schema cannot be created.
    pub async fn initialize(&self) -> ConvoResult<&Connection> {
        self.conn
            .get_or_try_init(|| async {
                let conn = if self.config.is_in_memory() {
                    Connection::open_in_memory().await
                } else {
                    Connection::open(&self.config.sqlite_path).await
                }
                .map_err(|err| {
                    ConvoError::Connection(format!(
                        "Error opening database '{}': {err}",
                        self.config.sqlite_path.display()
                    ))
                })?;

                conn.call(|conn| {
                    conn.execute_batch(SCHEMA)?;
                    Ok(())
                })
                .await
                .map_err(|err| ConvoError::Connection(format!("Error creating schema: {err}")))?;

                tracing::info!(
                    path = %self.config.sqlite_path.display(),
                    "storage initialized"
                );
                Ok::<_, ConvoError>(conn)
            })
            .await
    }

    /// Borrow the connection.
    ///
    /// # Errors
    /// Returns `ConvoError::Connection` if the gateway was not initialized.
    pub fn connection(&self) -> ConvoResult<&Connection> {
        self.conn
            .get()
            .ok_or_else(|| ConvoError::Connection("Database was not initialized".to_string()))
    }

    /// Check whether the connection has been opened.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.conn.initialized()
    }
}
