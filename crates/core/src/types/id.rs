//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Marketplace
//! identifiers are always positive integers; zero and negative values are
//! rejected when parsing or deserializing.

use thiserror::Error;

/// Error returned when an identifier is not a positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("identifier must be a positive integer (got {0})")]
pub struct InvalidId(pub i64);

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around a positive `i64` with:
/// - `Serialize`/`Deserialize` as a bare JSON number, rejecting values `<= 0`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `TryFrom<i64>` and `Into<i64>` implementations
///
/// # Example
///
/// ```rust
/// # use artisan_bazaar_core::define_id;
/// define_id!(UserId);
/// define_id!(OrderId);
///
/// let user_id = UserId::new(1).unwrap();
/// assert!(OrderId::new(0).is_err());
///
/// // These are different types, so this won't compile:
/// // let _: UserId = OrderId::new(1).unwrap();
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Create a new ID, rejecting non-positive values.
            ///
            /// # Errors
            ///
            /// Returns [`InvalidId`]($crate::InvalidId) if `id <= 0`.
            pub const fn new(id: i64) -> ::core::result::Result<Self, $crate::InvalidId> {
                if id > 0 {
                    Ok(Self(id))
                } else {
                    Err($crate::InvalidId(id))
                }
            }

            /// Get the underlying i64 value.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::convert::TryFrom<i64> for $name {
            type Error = $crate::InvalidId;

            fn try_from(id: i64) -> ::core::result::Result<Self, Self::Error> {
                Self::new(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::InvalidId;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                let id = s.trim().parse::<i64>().map_err(|_| $crate::InvalidId(0))?;
                Self::new(id)
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(CartItemId);
define_id!(OrderId);
define_id!(ModificationRequestId);
define_id!(NotificationId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_ids_accepted() {
        assert_eq!(ProductId::new(7).unwrap().as_i64(), 7);
        assert_eq!(i64::from(UserId::new(1).unwrap()), 1);
    }

    #[test]
    fn test_non_positive_ids_rejected() {
        assert_eq!(ProductId::new(0), Err(InvalidId(0)));
        assert_eq!(ProductId::new(-3), Err(InvalidId(-3)));
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<OrderId>("0").is_err());
        assert!(serde_json::from_str::<OrderId>("-1").is_err());
        assert_eq!(
            serde_json::from_str::<OrderId>("12").unwrap(),
            OrderId::new(12).unwrap()
        );
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let id = CartItemId::new(42).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
    }

    #[test]
    fn test_from_str() {
        let id: ProductId = " 15 ".parse().unwrap();
        assert_eq!(id.as_i64(), 15);
        assert!("abc".parse::<ProductId>().is_err());
        assert!("0".parse::<ProductId>().is_err());
    }

    #[test]
    fn test_display() {
        let id = NotificationId::new(9).unwrap();
        assert_eq!(id.to_string(), "9");
    }
}
