//! # Typed Identifiers
//!
//! Zero-cost wrappers that keep pool, mint and account identities apart at
//! compile time.
//!
//! ## Two Families
//!
//! ### 1. Sequential IDs (`define_typed_id!`)
//! - `u64` wrappers handed out by a registry (pool directory, token ledger)
//! - `PoolId` for liquidity pools, `MintId` for token types
//!
//! ### 2. Byte Identities (`define_typed_bytes!`)
//! - Fixed-size byte arrays, shown and serialized as hex
//! - `Identity` is the caller identity checked against pool authority
//!
//! ```rust
//! use types::{Identity, MintId, PoolId};
//!
//! fn vault_key(pool: PoolId, mint: MintId) -> (u64, u64) {
//!     (pool.inner(), mint.inner())
//! }
//!
//! // vault_key(MintId::new(1), PoolId::new(2)); // ❌ Compile error!
//! assert_eq!(vault_key(PoolId::new(2), MintId::new(1)), (2, 1));
//!
//! let authority = Identity::from_hex(&"ab".repeat(32)).unwrap();
//! assert_eq!(authority.as_bytes()[0], 0xab);
//! ```

use crate::common::errors::ValidationError;

/// Macro for generating zero-cost typed ID wrappers
///
/// Creates a new type that wraps `u64` with complete type safety while maintaining
/// identical runtime performance and memory layout.
#[macro_export]
macro_rules! define_typed_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash
        )]
        #[repr(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create a new typed ID
            #[inline(always)]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Create a new typed ID, rejecting the null value
            #[inline]
            pub fn new_validated(id: u64) -> Result<Self, $crate::ValidationError> {
                if id == 0 {
                    return Err($crate::ValidationError::NullId);
                }
                Ok(Self(id))
            }

            /// Extract the inner u64 value
            #[inline(always)]
            pub const fn inner(&self) -> u64 {
                self.0
            }

            /// Check if this is a null/zero ID
            #[inline(always)]
            pub fn is_null(&self) -> bool {
                self.0 == 0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u64> for $name {
            #[inline(always)]
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            #[inline(always)]
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        // Serializes as raw u64
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                self.0.serialize(serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                u64::deserialize(deserializer).map(Self)
            }
        }
    };
}

/// Macro for generating fixed-size byte identities
///
/// The wrapper displays and serializes as lowercase hex so identities stay
/// readable in logs and JSON state files.
#[macro_export]
macro_rules! define_typed_bytes {
    (
        $(#[$meta:meta])*
        $name:ident, $len:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Number of bytes in this identity
            pub const LEN: usize = $len;

            #[inline(always)]
            pub const fn new(inner: [u8; $len]) -> Self {
                Self(inner)
            }

            #[inline(always)]
            pub const fn inner(&self) -> &[u8; $len] {
                &self.0
            }

            #[inline(always)]
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Parse from hex, with or without a `0x` prefix
            pub fn from_hex(s: &str) -> Result<Self, $crate::ValidationError> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(s)
                    .map_err(|e| $crate::ValidationError::InvalidFormat(e.to_string()))?;
                let actual = bytes.len();
                let inner: [u8; $len] = bytes.try_into().map_err(|_| {
                    $crate::ValidationError::InvalidLength {
                        expected: $len,
                        actual,
                    }
                })?;
                Ok(Self(inner))
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self([0u8; $len])
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), self.to_hex())
            }
        }

        impl From<[u8; $len]> for $name {
            #[inline(always)]
            fn from(inner: [u8; $len]) -> Self {
                Self(inner)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

define_typed_id!(
    /// Unique identifier for a liquidity pool
    PoolId
);

define_typed_id!(
    /// Unique identifier for a token type (mint)
    MintId
);

define_typed_bytes!(
    /// Caller identity (32 bytes)
    ///
    /// Compared against a pool's authority for lock/unlock and used as the
    /// owner of user token accounts.
    Identity, 32
);

impl Identity {
    /// Build an identity from a short human-readable name.
    ///
    /// The name is stored left-aligned and zero padded, so it must be at most
    /// 32 bytes and must not be empty.
    pub fn from_name(name: &str) -> Result<Self, ValidationError> {
        let bytes = name.as_bytes();
        if bytes.is_empty() {
            return Err(ValidationError::InvalidFormat(
                "identity name cannot be empty".to_string(),
            ));
        }
        if bytes.len() > Self::LEN {
            return Err(ValidationError::InvalidLength {
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }
        let mut inner = [0u8; 32];
        inner[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(inner))
    }

    /// Recover the name of an identity built with [`Identity::from_name`]
    pub fn to_name(&self) -> Option<String> {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(Self::LEN);
        if end == 0 || self.0[end..].iter().any(|b| *b != 0) {
            return None;
        }
        std::str::from_utf8(&self.0[..end]).ok().map(str::to_string)
    }
}
