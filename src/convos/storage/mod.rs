//! Persistent storage for convos.

pub mod fixtures;
pub mod gateway;
pub mod schema;

pub use fixtures::Table;
pub use gateway::StorageGateway;
