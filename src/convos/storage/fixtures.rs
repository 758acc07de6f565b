//! Support helpers for seeding and resetting storage.
//!
//! Not part of the request path; exposed so tests and local tooling can
//! prepare a known database state.

use crate::convos::core::errors::{ConvoError, ConvoResult};
use crate::convos::core::ids::UserId;
use crate::convos::storage::gateway::StorageGateway;
use crate::convos::storage::schema::{CONVOS_TABLE, READ_STATUS_TABLE, USERS_TABLE};

/// Tables that can be truncated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    /// `read_status`.
    ReadStatus,
    /// `convos`.
    Convos,
    /// `users`.
    Users,
}

impl Table {
    /// All tables, dependents first.
    pub const ALL: [Self; 3] = [Self::ReadStatus, Self::Convos, Self::Users];

    /// Table name in the schema.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadStatus => READ_STATUS_TABLE,
            Self::Convos => CONVOS_TABLE,
            Self::Users => USERS_TABLE,
        }
    }
}

impl StorageGateway {
    /// Insert a user row.
    ///
    /// # Errors
    /// Returns `Connection` if uninitialized, `Create` if the insert fails.
    pub async fn add_user(&self, id: UserId, fullname: &str) -> ConvoResult<()> {
        let fullname = fullname.to_string();
        self.connection()?
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO users (id, fullname) VALUES (?1, ?2)",
                    rusqlite::params![id, fullname],
                )?;
                Ok(())
            })
            .await
            .map_err(|err| ConvoError::Create(format!("Error adding user: {err}")))
    }

    /// Delete every row of `table` and reset its id sequence.
    ///
    /// # Errors
    /// Returns `Connection` if uninitialized, `Delete` if the statements fail.
    pub async fn truncate_table(&self, table: Table) -> ConvoResult<()> {
        let name = table.as_str();
        self.connection()?
            .call(move |conn| {
                conn.execute(&format!("DELETE FROM {name}"), [])?;
                conn.execute("DELETE FROM sqlite_sequence WHERE name = ?1", [name])?;
                Ok(())
            })
            .await
            .map_err(|err| ConvoError::Delete(format!("Error truncating table {name}: {err}")))?;

        tracing::debug!(table = name, "table truncated");
        Ok(())
    }
}
