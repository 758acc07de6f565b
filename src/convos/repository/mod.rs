//! Convo repository: business rules on top of the storage gateway.

pub mod convo_store;

pub use convo_store::{ConvoStore, SqliteConvoStore, StoreFuture};
