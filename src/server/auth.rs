//! Placeholder identity binding for inbound requests.
//!
//! The credential header is taken at face value as the acting user's id.
//! Nothing is verified here; this only scopes repository calls to a user.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::convos::core::ids::UserId;

/// Header carrying the acting user's id.
pub const USER_API_KEY_HEADER: &str = "X-USER-API-KEY";

/// Identity the current request acts as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActingUser(pub UserId);

impl ActingUser {
    /// Anonymous identity for requests without a credential.
    pub const ANONYMOUS: Self = Self(UserId::ANONYMOUS);

    /// Derive the identity from request headers.
    ///
    /// A missing or empty header yields the anonymous id. A value that is
    /// not an integer cannot own any convo, so it is also bound as anonymous.
    #[must_use]
    pub fn resolve(headers: &HeaderMap) -> Self {
        let Some(raw) = headers.get(USER_API_KEY_HEADER) else {
            return Self::ANONYMOUS;
        };

        let key = raw.to_str().unwrap_or_default().trim();
        if key.is_empty() {
            return Self::ANONYMOUS;
        }

        key.parse::<UserId>().map_or_else(
            |err| {
                tracing::warn!("ignoring malformed {USER_API_KEY_HEADER}: {err}");
                Self::ANONYMOUS
            },
            Self,
        )
    }
}

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::resolve(&parts.headers))
    }
}
