//! Identifier types for convos and users.
//!
//! Both identifiers are storage-assigned integers. The newtypes keep a user
//! id from being bound where a convo id is expected, and implement the
//! `rusqlite` conversion traits so they can be passed straight to `params!`.

use core::fmt;
use core::num::ParseIntError;
use core::str::FromStr;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Declare an integer newtype with a consistent API.
macro_rules! define_int_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(Serialize, Deserialize)]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw integer.
            #[inline]
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Extract the raw integer.
            #[inline]
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }

            /// True for the zero value.
            #[inline]
            #[must_use]
            pub const fn is_zero(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            #[inline]
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            #[inline]
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }

        impl ToSql for $name {
            #[inline]
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            #[inline]
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

define_int_id!(
    /// User account identifier.
    ///
    /// `UserId::ANONYMOUS` (zero) is bound when a request carries no credential.
    UserId
);

impl UserId {
    /// Identity used when no credential is supplied.
    pub const ANONYMOUS: Self = Self(0);
}

define_int_id!(
    /// Convo (message) identifier, assigned by storage on insert.
    ///
    /// Zero never names a stored row; as a draft parent it means "new thread".
    ConvoId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let id: ConvoId = " 42 ".parse().unwrap();
        assert_eq!(id, ConvoId::new(42));
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<UserId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: ConvoId = serde_json::from_str("9").unwrap();
        assert_eq!(back.get(), 9);
    }

    #[test]
    fn test_anonymous_is_zero() {
        assert!(UserId::ANONYMOUS.is_zero());
        assert_eq!(UserId::default(), UserId::ANONYMOUS);
    }
}
