//! Convo subsystem.
//!
//! Organized into:
//! - `core`: Configuration, errors, IDs, the convo record and update commands
//! - `storage`: The storage gateway owning the `SQLite` connection, plus schema and fixtures
//! - `repository`: Threaded, access-controlled CRUD with read status bookkeeping

pub mod core;
pub mod repository;
pub mod storage;

pub use core::{
    ConfigError, Convo, ConvoError, ConvoId, ConvoResult, ConvoUpdate, ConvosConfig, NewConvo,
    ServerConfig, StorageConfig, UserId,
};
pub use repository::{ConvoStore, SqliteConvoStore, StoreFuture};
pub use storage::{StorageGateway, Table};
