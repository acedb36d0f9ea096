//! Database-assigned identifiers.
//!
//! Every table uses a `SERIAL` key. Each entity gets its own wrapper so a
//! notification ID can never be passed where a customer ID is expected.

/// Define an `i32`-backed ID newtype.
///
/// The generated type serializes as a bare integer, orders by its value,
/// displays as the number, and (with the `postgres` feature) binds as `INT4`.
///
/// ```rust
/// # use crm_portal_core::define_id;
/// define_id!(InvoiceId);
/// define_id!(ServiceId);
///
/// let invoice = InvoiceId::new(1);
/// assert_eq!(invoice.as_i32(), 1);
/// // let _: ServiceId = invoice; // mismatched types
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
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type), sqlx(transparent))]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

define_id!(CustomerId);
define_id!(NotificationId);
define_id!(ProductId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_is_a_bare_integer() {
        let id = NotificationId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(serde_json::from_str::<NotificationId>("42").unwrap(), id);
    }

    #[test]
    fn test_newest_sorts_last() {
        let mut ids = vec![NotificationId::new(3), NotificationId::new(1), NotificationId::new(2)];
        ids.sort();
        assert_eq!(ids.last(), Some(&NotificationId::new(3)));
    }

    #[test]
    fn test_parse_from_path_segment() {
        assert_eq!("17".parse::<ProductId>().unwrap(), ProductId::new(17));
        assert_eq!(CustomerId::new(7).to_string(), "7");
        assert!("abc".parse::<ProductId>().is_err());
    }
}
