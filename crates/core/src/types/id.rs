//! Newtype IDs for type-safe entity references.
//!
//! The hosted backend keys rows by opaque strings (UUIDs in practice), so ids
//! wrap a `String`. Use the `define_id!` macro to create a wrapper that
//! prevents accidentally mixing ids from different entity types.

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `is_empty()`
/// - `From<String>`, `From<&str>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use uti_games_core::define_id;
/// define_id!(OrderId);
/// define_id!(CouponId);
///
/// let order_id = OrderId::new("abc");
/// let coupon_id = CouponId::new("abc");
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = coupon_id;
/// assert_eq!(order_id.as_str(), coupon_id.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the id is the empty string.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl ::core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(TagId);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_id_display_and_conversion() {
        let id = ProductId::new("p-123");
        assert_eq!(id.to_string(), "p-123");
        assert_eq!(String::from(id.clone()), "p-123");
        assert_eq!(ProductId::from("p-123"), id);
    }

    #[test]
    fn test_id_borrow_allows_str_lookup() {
        let mut map = HashMap::new();
        map.insert(ProductId::new("p1"), 1);
        assert_eq!(map.get("p1"), Some(&1));
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = TagId::new("t1");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"t1\""));
    }

    #[test]
    fn test_empty_id() {
        assert!(ProductId::new("").is_empty());
        assert!(!ProductId::new("x").is_empty());
    }
}
