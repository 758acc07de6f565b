//! Core convo types and identifiers.

pub mod config;
pub mod convo;
pub mod errors;
pub mod ids;
pub mod update;

pub use config::{ConvosConfig, ServerConfig, StorageConfig};
pub use convo::{Convo, NewConvo};
pub use errors::{ConfigError, ConvoError, ConvoResult};
pub use ids::{ConvoId, UserId};
pub use update::ConvoUpdate;
