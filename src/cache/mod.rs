//! Generic timed caching for store data.
//!
//! This module provides a backend-agnostic caching mechanism that:
//! - Caches query results under opaque string keys
//! - Treats entries past a staleness window as absent on lookup
//! - Physically evicts entries past a longer collection window via `gc`

mod timed;

pub use timed::{CacheEntry, CacheWindows, TimedCache, DEFAULT_GC_MS, DEFAULT_STALE_MS};

/// Cache-key derivation for a query.
///
/// Implementations must be pure and deterministic: structurally equal
/// queries produce identical keys, and distinct queries must not collide.
pub trait QueryKey {
  /// Stable, fixed-length hash used as the cache map key.
  fn cache_hash(&self) -> String;

  /// Human-readable description for logs.
  fn description(&self) -> String;
}
