//! Newtype IDs for type-safe entity references.
//!
//! Every table in the delivery schema uses a `SERIAL` primary key. Wrapping
//! those keys in distinct types keeps a `DriverId` from being passed where an
//! `OrderId` is expected, which matters most in the assignment workflow where
//! both travel together.

/// Define a type-safe ID wrapper around an `i32` primary key.
///
/// The generated type is `Copy`, serializes transparently as a JSON number,
/// parses from a path segment via `FromStr`, and (with the `postgres`
/// feature) binds and decodes as `INT4`.
///
/// # Example
///
/// ```rust
/// # use swiftbite_core::define_id;
/// define_id!(KitchenId);
/// define_id!(StationId);
///
/// let kitchen = KitchenId::new(7);
/// assert_eq!(kitchen.as_i32(), 7);
/// assert_eq!("7".parse::<KitchenId>().ok(), Some(kitchen));
///
/// // These are different types, so this won't compile:
/// // let _: StationId = kitchen;
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
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw primary key.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw primary key.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <i32 as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> ::core::result::Result<Self, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Decode<::sqlx::Postgres>>::decode(value).map(Self)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> ::std::result::Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <i32 as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_id!(CustomerId);
define_id!(AddressId);
define_id!(CategoryId);
define_id!(RestaurantId);
define_id!(MenuItemId);
define_id!(OfferId);
define_id!(DriverId);
define_id!(OrderId);
define_id!(TrackingEventId);
define_id!(ReviewId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_numbers() {
        let id = OrderId::new(42);
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("42"));

        let parsed: DriverId = serde_json::from_str("9").unwrap_or(DriverId::new(0));
        assert_eq!(parsed, DriverId::new(9));
    }

    #[test]
    fn ids_parse_from_path_segments() {
        assert_eq!(" 15 ".parse::<RestaurantId>().ok(), Some(RestaurantId::new(15)));
        assert!("abc".parse::<RestaurantId>().is_err());
    }
}
