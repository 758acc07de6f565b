//! Update commands accepted by the repository.

use serde_json::{Map, Value};

use crate::convos::core::errors::{ConvoError, ConvoResult};

/// A single change to apply to a convo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConvoUpdate {
    /// Mark the convo read (`true`) or unread (`false`) for the acting user.
    SetRead(bool),
    /// Replace the message text. Only the sender may do this.
    SetBody(String),
}

impl ConvoUpdate {
    /// Patch key for [`ConvoUpdate::SetRead`].
    pub const READ_KEY: &'static str = "read";
    /// Patch key for [`ConvoUpdate::SetBody`].
    pub const BODY_KEY: &'static str = "body";

    /// Translate a JSON patch object into update commands.
    ///
    /// # Errors
    /// Returns `InvalidRequest` for unknown keys or values of the wrong shape.
    pub fn parse_patch(patch: &Map<String, Value>) -> ConvoResult<Vec<Self>> {
        patch
            .iter()
            .map(|(key, value)| match key.as_str() {
                Self::READ_KEY => parse_read(value).map(Self::SetRead),
                Self::BODY_KEY => match value {
                    Value::String(body) => Ok(Self::SetBody(body.clone())),
                    other => Err(ConvoError::InvalidRequest(format!(
                        "'body' must be a string, got {other}"
                    ))),
                },
                unknown => Err(ConvoError::InvalidRequest(format!(
                    "unsupported patch field '{unknown}'"
                ))),
            })
            .collect()
    }
}

fn parse_read(value: &Value) -> ConvoResult<bool> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::String(raw) => parse_bool(raw).ok_or_else(|| not_a_bool(value)),
        _ => Err(not_a_bool(value)),
    }
}

fn not_a_bool(value: &Value) -> ConvoError {
    ConvoError::InvalidRequest(format!("'read' must be a boolean, got {value}"))
}

/// Lenient boolean spellings accepted for `read`.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
