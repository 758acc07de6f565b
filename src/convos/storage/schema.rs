//! Relational schema for convos, read status and users.

/// Convo rows. `parent_id` points at the thread root; a root points at itself.
pub const CONVOS_TABLE: &str = "convos";

/// Presence relation: a row means the user has read the convo.
pub const READ_STATUS_TABLE: &str = "read_status";

/// Identity reference rows. Support fixture only.
pub const USERS_TABLE: &str = "users";

/// Statements run once when the gateway opens its connection.
///
/// The `convos.parent_id` key is deferred so a root can be inserted with a
/// placeholder parent and repointed at its own id before the transaction
/// commits. Deleting a convo cascades to its replies and read status rows.
pub const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY,
        fullname TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS convos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        parent_id INTEGER NOT NULL
            REFERENCES convos (id) ON DELETE CASCADE DEFERRABLE INITIALLY DEFERRED,
        sender_id INTEGER NOT NULL,
        recipient_id INTEGER NOT NULL,
        subject TEXT NOT NULL,
        body TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_convos_parent ON convos (parent_id);
    CREATE INDEX IF NOT EXISTS idx_convos_sender ON convos (sender_id);
    CREATE INDEX IF NOT EXISTS idx_convos_recipient ON convos (recipient_id);

    CREATE TABLE IF NOT EXISTS read_status (
        user_id INTEGER NOT NULL,
        thread_id INTEGER NOT NULL REFERENCES convos (id) ON DELETE CASCADE,
        PRIMARY KEY (user_id, thread_id)
    );
";
