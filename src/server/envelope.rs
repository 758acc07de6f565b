//! Uniform `{response, meta, error}` payload wrapping every API result.

use std::collections::BTreeMap;
use std::fmt::Display;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::convos::core::errors::{ConvoError, ConvoResult};

/// Key of the item count in `meta`.
pub const COUNT_KEY: &str = "count";

/// Error details carried by a failed envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description of the failure.
    pub message: String,
}

/// Wire envelope emitted by every handler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonEnvelope {
    /// The result payload, or `""` on error.
    pub response: Value,
    /// Metadata; always holds `count` as a string.
    pub meta: BTreeMap<String, String>,
    /// Failure details, `null` on success.
    pub error: Option<ErrorBody>,
}

impl JsonEnvelope {
    /// Wrap a successful result.
    #[must_use]
    pub fn from_value(response: Value) -> Self {
        let count = item_count(&response);
        Self {
            response,
            meta: meta_with_count(count),
            error: None,
        }
    }

    /// Wrap a failure.
    #[must_use]
    pub fn from_error(err: &impl Display) -> Self {
        Self {
            response: Value::String(String::new()),
            meta: meta_with_count(1),
            error: Some(ErrorBody {
                message: err.to_string(),
            }),
        }
    }
}

/// Sequences count their elements; anything else counts as one item.
fn item_count(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        _ => 1,
    }
}

fn meta_with_count(count: usize) -> BTreeMap<String, String> {
    BTreeMap::from([(COUNT_KEY.to_string(), count.to_string())])
}

/// HTTP status for an error kind.
#[must_use]
pub const fn status_for(err: &ConvoError) -> StatusCode {
    match err {
        ConvoError::NotFound(_) => StatusCode::NOT_FOUND,
        ConvoError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ConvoError::Connection(_)
        | ConvoError::Query(_)
        | ConvoError::Create(_)
        | ConvoError::Update(_)
        | ConvoError::Delete(_)
        | ConvoError::Transaction(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Envelope paired with its status code.
#[derive(Debug)]
pub struct ApiResponse {
    /// Status code to send.
    pub status: StatusCode,
    /// Body to send.
    pub envelope: JsonEnvelope,
}

impl ApiResponse {
    /// Build a 200 response around `value`.
    #[must_use]
    pub fn ok(value: &impl Serialize) -> Self {
        serde_json::to_value(value).map_or_else(
            |err| {
                tracing::error!("failed to serialize response: {err}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    envelope: JsonEnvelope::from_error(&err),
                }
            },
            |response| Self {
                status: StatusCode::OK,
                envelope: JsonEnvelope::from_value(response),
            },
        )
    }

    /// Build an error response with the status mapped from the error kind.
    #[must_use]
    pub fn error(err: &ConvoError) -> Self {
        let status = status_for(err);
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{err}");
        } else {
            tracing::warn!(status = status.as_u16(), "{err}");
        }
        Self {
            status,
            envelope: JsonEnvelope::from_error(err),
        }
    }
}

impl<T: Serialize> From<ConvoResult<T>> for ApiResponse {
    fn from(result: ConvoResult<T>) -> Self {
        result.map_or_else(|e| Self::error(&e), |v| Self::ok(&v))
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
