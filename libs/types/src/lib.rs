//! # Pool Types Library
//!
//! Typed identifiers used by the AMM math, configuration and pool engine crates.
//!
//! ## Design Philosophy
//!
//! - **Type Safety**: a `PoolId` cannot be passed where a `MintId` is expected
//! - **Zero Cost**: every identifier is a `#[repr(transparent)]` wrapper
//! - **Transparent Serialization**: identifiers serialize as their inner value
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{Identity, MintId, PoolId};
//!
//! let pool = PoolId::new(1);
//! let usdc = MintId::new(7);
//! let alice = Identity::from_name("alice").unwrap();
//!
//! assert_eq!(pool.inner(), 1);
//! assert_ne!(usdc.inner(), pool.inner());
//! assert_eq!(alice.to_name().as_deref(), Some("alice"));
//! ```

pub mod common;

pub use common::errors::ValidationError;
pub use common::identifiers::{Identity, MintId, PoolId};
