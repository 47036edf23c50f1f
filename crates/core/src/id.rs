//! Strongly-typed identifiers.
//!
//! Domain crates declare their identifiers with [`uuid_id!`](crate::uuid_id) so
//! every id shares the same parsing, formatting and serde behaviour.

#[doc(hidden)]
pub use uuid::Uuid;

/// Declare a UUID-backed identifier newtype.
///
/// The generated type is `Copy`, hashable, serializes as a bare UUID string and
/// parses with [`FromStr`](core::str::FromStr), reporting
/// [`DomainError::InvalidId`](crate::DomainError::InvalidId) on failure.
#[macro_export]
macro_rules! uuid_id {
    ($(#[$meta:meta])* $vis:vis struct $t:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $t($crate::id::Uuid);

        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self($crate::id::Uuid::now_v7())
            }

            pub fn from_uuid(uuid: $crate::id::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &$crate::id::Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$crate::id::Uuid> for $t {
            fn from(value: $crate::id::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for $crate::id::Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl core::str::FromStr for $t {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = <$crate::id::Uuid as core::str::FromStr>::from_str(s).map_err(|e| {
                    $crate::DomainError::invalid_id(format!("{}: {}", stringify!($t), e))
                })?;
                Ok(Self(uuid))
            }
        }
    };
}
