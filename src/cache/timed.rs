//! Key→value cache with separate staleness and collection windows.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default staleness window in milliseconds (5 minutes).
pub const DEFAULT_STALE_MS: u64 = 5 * 60 * 1000;

/// Default collection window in milliseconds (10 minutes).
pub const DEFAULT_GC_MS: u64 = 10 * 60 * 1000;

/// Staleness and collection windows for a [`TimedCache`].
///
/// `gc_after` is expected to be at least `stale_after` (not enforced): an
/// entry stops counting as a hit after `stale_after` but survives in the
/// map until `gc_after`, so a revisit shortly after aging out can still be
/// re-validated cheaply by the caller that owns the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheWindows {
  /// Max age for a lookup to count as a hit.
  pub stale_after: Duration,
  /// Max age before an entry is removed by [`TimedCache::gc`].
  pub gc_after: Duration,
}

impl Default for CacheWindows {
  fn default() -> Self {
    Self {
      stale_after: Duration::from_millis(DEFAULT_STALE_MS),
      gc_after: Duration::from_millis(DEFAULT_GC_MS),
    }
  }
}

/// A cached value and the instant it was written.
///
/// The timestamp is stamped on insert and never mutated; a newer write for
/// the same key replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
  pub data: T,
  timestamp: Instant,
}

impl<T> CacheEntry<T> {
  fn age(&self) -> Duration {
    self.timestamp.elapsed()
  }
}

/// In-memory cache keyed by opaque strings.
///
/// Lookups return entries no older than the staleness window; older entries
/// behave as absent but stay in the map until an explicit [`gc`] call
/// removes everything past the collection window. There is no capacity
/// bound; only `gc` reclaims memory.
///
/// [`gc`]: TimedCache::gc
#[derive(Debug)]
pub struct TimedCache<T> {
  entries: HashMap<String, CacheEntry<T>>,
  windows: CacheWindows,
}

impl<T> TimedCache<T> {
  pub fn new(windows: CacheWindows) -> Self {
    Self {
      entries: HashMap::new(),
      windows,
    }
  }

  /// Look up a fresh entry. Stale entries behave as absent; they are not
  /// removed here (removal is `gc`'s job).
  pub fn get(&self, key: &str) -> Option<&CacheEntry<T>> {
    let entry = self.entries.get(key)?;
    if entry.age() > self.windows.stale_after {
      return None;
    }
    Some(entry)
  }

  /// Insert or replace the entry for `key`, stamping the current time.
  pub fn set(&mut self, key: String, data: T) {
    self.entries.insert(
      key,
      CacheEntry {
        data,
        timestamp: Instant::now(),
      },
    );
  }

  /// Remove exactly one entry; a no-op if the key is absent.
  pub fn invalidate(&mut self, key: &str) {
    self.entries.remove(key);
  }

  /// Remove every entry older than the collection window.
  pub fn gc(&mut self) {
    let gc_after = self.windows.gc_after;
    self.entries.retain(|_, entry| entry.age() <= gc_after);
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
