//! Convo repository: threaded CRUD with per-user read status.
//!
//! Every query is scoped to the acting user: a convo is visible only to its
//! sender and recipient. Rows outside that scope behave exactly like absent
//! rows, so callers cannot discover other users' convos.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rusqlite::{OptionalExtension, params};

use crate::convos::core::convo::{Convo, NewConvo};
use crate::convos::core::errors::{ConvoError, ConvoResult};
use crate::convos::core::ids::{ConvoId, UserId};
use crate::convos::core::update::ConvoUpdate;
use crate::convos::storage::gateway::StorageGateway;

/// Boxed future type for convo store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Convo store trait.
pub trait ConvoStore: Send + Sync {
    /// List thread roots visible to `user`, ordered by id.
    ///
    /// # Errors
    /// Returns `Connection` or `Query` if storage access fails.
    fn list(&self, user: UserId) -> StoreFuture<'_, ConvoResult<Vec<Convo>>>;

    /// Get a single convo visible to `user`.
    ///
    /// # Errors
    /// Returns `NotFound` if no visible row has this id, `Query` on other failures.
    fn get(&self, user: UserId, id: ConvoId) -> StoreFuture<'_, ConvoResult<Convo>>;

    /// Get the root of `id`'s thread with its visible replies attached.
    ///
    /// # Errors
    /// Returns `NotFound` if the root is not visible, `Query` on other failures.
    fn thread(&self, user: UserId, id: ConvoId) -> StoreFuture<'_, ConvoResult<Convo>>;

    /// Create a convo sent by `user`, marking it read for them.
    ///
    /// # Errors
    /// Returns `NotFound` if replying to a convo `user` cannot see, `Create` if
    /// an insert fails, `Transaction` if the transaction cannot be committed.
    fn create(&self, user: UserId, draft: NewConvo) -> StoreFuture<'_, ConvoResult<Convo>>;

    /// Apply update commands and return the refreshed convo.
    ///
    /// # Errors
    /// Returns `NotFound` if the convo is not visible (or, for a body edit, not
    /// sent by `user`), `Update` if a command fails.
    fn update(
        &self,
        user: UserId,
        id: ConvoId,
        updates: Vec<ConvoUpdate>,
    ) -> StoreFuture<'_, ConvoResult<Convo>>;

    /// Delete a convo visible to `user`.
    ///
    /// Read status rows, and the replies of a deleted root, are removed by the
    /// schema's cascading foreign keys.
    ///
    /// # Errors
    /// Returns `NotFound` if nothing was deleted, `Delete` if the statement fails.
    fn delete(&self, user: UserId, id: ConvoId) -> StoreFuture<'_, ConvoResult<()>>;
}

/// Columns shared by every convo read. `?1` is the acting user.
const SELECT_CONVO: &str = "SELECT c.id, c.parent_id, c.sender_id, c.recipient_id,
        c.subject, c.body, r.user_id IS NOT NULL
     FROM convos AS c
     LEFT JOIN read_status AS r ON r.thread_id = c.id AND r.user_id = ?1";

/// `SQLite` implementation of the convo store.
pub struct SqliteConvoStore {
    gateway: Arc<StorageGateway>,
}

impl SqliteConvoStore {
    /// Build a store on top of a shared gateway.
    #[must_use]
    pub const fn new(gateway: Arc<StorageGateway>) -> Self {
        Self { gateway }
    }

    /// Run `op` on the gateway's connection thread.
    async fn run<T, F>(&self, op: F) -> ConvoResult<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> ConvoResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.gateway
            .connection()?
            .call(move |conn| Ok(op(conn)))
            .await
            .map_err(|err| ConvoError::Connection(format!("Error reaching database: {err}")))?
    }
}

impl ConvoStore for SqliteConvoStore {
    fn list(&self, user: UserId) -> StoreFuture<'_, ConvoResult<Vec<Convo>>> {
        Box::pin(async move {
            let convos = self.run(move |conn| list_roots(conn, user)).await?;
            tracing::debug!(%user, count = convos.len(), "listed convos");
            Ok(convos)
        })
    }

    fn get(&self, user: UserId, id: ConvoId) -> StoreFuture<'_, ConvoResult<Convo>> {
        Box::pin(async move {
            let result = self.run(move |conn| fetch_convo(conn, user, id)).await;
            tracing::debug!(%user, %id, found = result.is_ok(), "fetched convo");
            result
        })
    }

    fn thread(&self, user: UserId, id: ConvoId) -> StoreFuture<'_, ConvoResult<Convo>> {
        Box::pin(async move {
            let root = self.run(move |conn| fetch_thread(conn, user, id)).await?;
            tracing::debug!(
                %user,
                root = %root.id,
                replies = root.children.as_ref().map_or(0, Vec::len),
                "assembled thread"
            );
            Ok(root)
        })
    }

    fn create(&self, user: UserId, draft: NewConvo) -> StoreFuture<'_, ConvoResult<Convo>> {
        Box::pin(async move {
            let convo = self.run(move |conn| insert_convo(conn, user, draft)).await?;
            tracing::info!(%user, id = %convo.id, parent = %convo.parent, "convo created");
            Ok(convo)
        })
    }

    fn update(
        &self,
        user: UserId,
        id: ConvoId,
        updates: Vec<ConvoUpdate>,
    ) -> StoreFuture<'_, ConvoResult<Convo>> {
        Box::pin(async move {
            let applied = updates.len();
            let convo = self
                .run(move |conn| apply_updates(conn, user, id, updates))
                .await?;
            tracing::debug!(%user, %id, applied, read = convo.read, "convo updated");
            Ok(convo)
        })
    }

    fn delete(&self, user: UserId, id: ConvoId) -> StoreFuture<'_, ConvoResult<()>> {
        Box::pin(async move {
            let count = self
                .run(move |conn| {
                    conn.execute(
                        "DELETE FROM convos
                         WHERE id = ?1
                         AND (sender_id = ?2 OR recipient_id = ?2)",
                        params![id, user],
                    )
                    .map_err(|err| ConvoError::Delete(format!("Error deleting convo: {err}")))
                })
                .await?;

            if count == 0 {
                return Err(ConvoError::convo_not_found(id));
            }

            tracing::info!(%user, %id, "convo deleted");
            Ok(())
        })
    }
}

fn convo_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Convo> {
    Ok(Convo {
        id: row.get(0)?,
        parent: row.get(1)?,
        sender: row.get(2)?,
        recipient: row.get(3)?,
        subject: row.get(4)?,
        body: row.get(5)?,
        read: row.get(6)?,
        children: None,
    })
}

fn scan_error(err: &rusqlite::Error) -> ConvoError {
    ConvoError::Query(format!("Error Scanning Row: {err}"))
}

fn list_roots(conn: &rusqlite::Connection, user: UserId) -> ConvoResult<Vec<Convo>> {
    let mut stmt = conn
        .prepare(&format!(
            "{SELECT_CONVO}
             WHERE c.parent_id = c.id
             AND (c.sender_id = ?1 OR c.recipient_id = ?1)
             ORDER BY c.id ASC"
        ))
        .map_err(|err| scan_error(&err))?;

    let convos: Vec<Convo> = stmt
        .query_map(params![user], convo_from_row)
        .and_then(Iterator::collect)
        .map_err(|err| scan_error(&err))?;
    Ok(convos)
}

fn fetch_convo(conn: &rusqlite::Connection, user: UserId, id: ConvoId) -> ConvoResult<Convo> {
    conn.query_row(
        &format!(
            "{SELECT_CONVO}
             WHERE c.id = ?2
             AND (c.sender_id = ?1 OR c.recipient_id = ?1)"
        ),
        params![user, id],
        convo_from_row,
    )
    .optional()
    .map_err(|err| scan_error(&err))?
    .ok_or_else(|| ConvoError::convo_not_found(id))
}

fn fetch_thread(conn: &rusqlite::Connection, user: UserId, id: ConvoId) -> ConvoResult<Convo> {
    let start = fetch_convo(conn, user, id)?;
    let mut root = if start.is_root() {
        start
    } else {
        fetch_convo(conn, user, start.parent)?
    };

    let mut stmt = conn
        .prepare(&format!(
            "{SELECT_CONVO}
             WHERE c.parent_id = ?2
             AND c.id != ?2
             AND (c.sender_id = ?1 OR c.recipient_id = ?1)
             ORDER BY c.id ASC"
        ))
        .map_err(|err| scan_error(&err))?;
    let replies: Vec<Convo> = stmt
        .query_map(params![user, root.id], convo_from_row)
        .and_then(Iterator::collect)
        .map_err(|err| scan_error(&err))?;

    root.children = Some(replies);
    Ok(root)
}

fn insert_convo(
    conn: &mut rusqlite::Connection,
    user: UserId,
    draft: NewConvo,
) -> ConvoResult<Convo> {
    let tx = conn
        .transaction()
        .map_err(|err| ConvoError::Transaction(format!("Error starting transaction: {err}")))?;

    // A reply joins the thread of whatever it answers and keeps its subject.
    let (thread, subject) = if draft.is_root() {
        (None, draft.subject)
    } else {
        let (root, subject) = tx
            .query_row(
                "SELECT parent_id, subject FROM convos
                 WHERE id = ?1
                 AND (sender_id = ?2 OR recipient_id = ?2)",
                params![draft.parent, user],
                |row| Ok((row.get::<_, ConvoId>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(|err| scan_error(&err))?
            .ok_or_else(|| ConvoError::convo_not_found(draft.parent))?;
        (Some(root), subject)
    };

    // Roots get a placeholder parent until their own id is known.
    let placeholder = thread.unwrap_or_default();
    let id: ConvoId = tx
        .query_row(
            "INSERT INTO convos (parent_id, sender_id, recipient_id, subject, body)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
            params![placeholder, user, draft.recipient, subject, draft.body],
            |row| row.get(0),
        )
        .map_err(|err| ConvoError::Create(format!("Error creating conversation: {err}")))?;

    let parent = if let Some(root) = thread {
        root
    } else {
        tx.execute(
            "UPDATE convos SET parent_id = id WHERE id = ?1",
            params![id],
        )
        .map_err(|err| ConvoError::Create(format!("Error rooting conversation: {err}")))?;
        id
    };

    let inserted = tx
        .execute(
            "INSERT INTO read_status (user_id, thread_id) VALUES (?1, ?2)",
            params![user, id],
        )
        .map_err(|err| ConvoError::Create(format!("Error updating read status: {err}")))?;
    if inserted == 0 {
        return Err(ConvoError::Create("Unable to update read status".to_string()));
    }

    tx.commit()
        .map_err(|err| ConvoError::Transaction(format!("Error committing transaction: {err}")))?;

    Ok(Convo {
        id,
        parent,
        sender: user,
        recipient: draft.recipient,
        subject,
        body: draft.body,
        read: true,
        children: None,
    })
}

fn apply_updates(
    conn: &mut rusqlite::Connection,
    user: UserId,
    id: ConvoId,
    updates: Vec<ConvoUpdate>,
) -> ConvoResult<Convo> {
    let tx = conn
        .transaction()
        .map_err(|err| ConvoError::Transaction(format!("Error starting transaction: {err}")))?;

    let current = fetch_convo(&tx, user, id)?;

    for update in updates {
        let result = match update {
            ConvoUpdate::SetRead(true) => tx.execute(
                "INSERT OR IGNORE INTO read_status (user_id, thread_id) VALUES (?1, ?2)",
                params![user, id],
            ),
            ConvoUpdate::SetRead(false) => tx.execute(
                "DELETE FROM read_status WHERE user_id = ?1 AND thread_id = ?2",
                params![user, id],
            ),
            ConvoUpdate::SetBody(body) => {
                if current.sender != user {
                    return Err(ConvoError::convo_not_found(id));
                }
                tx.execute(
                    "UPDATE convos SET body = ?1 WHERE id = ?2 AND sender_id = ?3",
                    params![body, id, user],
                )
            }
        };
        result.map_err(|err| ConvoError::Update(format!("Error updating convo: {err}")))?;
    }

    let refreshed = fetch_convo(&tx, user, id)?;
    tx.commit()
        .map_err(|err| ConvoError::Transaction(format!("Error committing transaction: {err}")))?;
    Ok(refreshed)
}
