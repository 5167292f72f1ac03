//! Newtype wrappers around the numeric identifiers of Cube entities.
//!
//! Parsing from text is the one place where a malformed identifier can
//! enter the system; it is rejected with a `Validation` error rather than
//! being treated as "not found".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Macro to define a newtype ID wrapper around an integer primary key.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty), $label:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Return the inner value.
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<$inner>().map(Self).map_err(|e| {
                    AppError::with_source(
                        crate::error::ErrorKind::Validation,
                        format!("Invalid {} '{s}'", $label),
                        e,
                    )
                })
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> $inner {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a user.
    UserId(i64), "user id"
);

define_id!(
    /// Identifier of a role.
    RoleId(i32), "role id"
);

define_id!(
    /// Identifier of a menu entry.
    MenuId(i32), "menu id"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_numeric() {
        assert_eq!("42".parse::<UserId>().unwrap(), UserId(42));
        assert_eq!(" 7 ".parse::<RoleId>().unwrap().get(), 7);
    }

    #[test]
    fn test_parse_malformed_is_validation_error() {
        let err = "abc".parse::<UserId>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("abc"));
    }
}
