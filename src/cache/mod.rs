//! Cache module for short-lived API responses
//!
//! This module provides an in-memory request cache with per-entry TTLs, lazy
//! expiry on read, and bulk invalidation by resource prefix or key pattern.
//! Which reads a write makes stale is decided in one place, the
//! [`Action`] table in [`policy`].

mod clock;
mod key;
pub mod policy;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{generate_key, Params};
pub use policy::{Action, CacheConfig, Invalidation, Resource, TtlTier};
pub use store::RequestCache;
