//! Detail store: tracks the one currently-viewed product by id.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheWindows, QueryKey, TimedCache};
use crate::catalog::client::{ApiResult, CatalogApi};
use crate::catalog::error::ApiError;
use crate::catalog::keys::CatalogQueryKey;
use crate::catalog::types::ProductDetail;

pub struct ProductDetailStore {
  api: Arc<dyn CatalogApi>,
  state: Mutex<DetailState>,
}

struct DetailState {
  current_id: Option<u64>,
  detail: Option<ProductDetail>,
  is_loading: bool,
  error: Option<ApiError>,
  cache: TimedCache<ProductDetail>,
  /// Bumped per issued fetch; only the latest fetch may commit state
  fetch_seq: u64,
}

fn key_for(id: u64) -> String {
  CatalogQueryKey::ProductDetail { id }.cache_hash()
}

impl ProductDetailStore {
  pub fn new(api: Arc<dyn CatalogApi>, windows: CacheWindows) -> Self {
    Self {
      api,
      state: Mutex::new(DetailState {
        current_id: None,
        detail: None,
        is_loading: false,
        error: None,
        cache: TimedCache::new(windows),
        fetch_seq: 0,
      }),
    }
  }

  /// Fetch the detail record for `id`, making it the tracked current id
  /// before the network call is issued.
  ///
  /// When two fetches overlap, only the one matching the latest tracked
  /// id and sequence commits its result; a superseded fetch that resolves
  /// late still returns its record to the direct caller but leaves store
  /// state alone.
  pub async fn fetch_detail(&self, id: u64) -> ApiResult<ProductDetail> {
    let seq = {
      let mut s = self.state.lock();
      s.current_id = Some(id);

      let hit = s.cache.get(&key_for(id)).map(|entry| entry.data.clone());
      if let Some(detail) = hit {
        debug!(id, "detail cache hit");
        s.detail = Some(detail.clone());
        s.error = None;
        s.cache.gc();
        return Ok(detail);
      }

      s.is_loading = true;
      s.error = None;
      s.fetch_seq += 1;
      s.fetch_seq
    };

    debug!(id, "detail cache miss, fetching");
    let result = self.api.get_product_detail(id).await;

    let mut s = self.state.lock();
    let current = s.fetch_seq == seq && s.current_id == Some(id);

    let out = match result {
      Ok(detail) => {
        if current {
          s.detail = Some(detail.clone());
          s.error = None;
          s.cache.set(key_for(id), detail.clone());
        }
        Ok(detail)
      }
      Err(e) => {
        if current {
          s.error = Some(e.clone());
        }
        Err(e)
      }
    };

    if current {
      s.is_loading = false;
    }
    s.cache.gc();
    out
  }

  /// Force-reload the last-fetched id: the cache entry is dropped first,
  /// so the fetch is a guaranteed miss. Returns `None` when nothing has
  /// been fetched yet.
  pub async fn refetch(&self) -> ApiResult<Option<ProductDetail>> {
    let id = self.state.lock().current_id;
    let Some(id) = id else {
      return Ok(None);
    };
    self.invalidate_cache_for(id);
    self.fetch_detail(id).await.map(Some)
  }

  /// Drop the cache entry for `id`; the tracked id and visible data are
  /// untouched.
  pub fn invalidate_cache_for(&self, id: u64) {
    self.state.lock().cache.invalidate(&key_for(id));
  }

  /// Drop the cache entry for the tracked id, if any.
  pub fn invalidate_current_cache(&self) {
    let mut s = self.state.lock();
    if let Some(id) = s.current_id {
      s.cache.invalidate(&key_for(id));
    }
  }

  /// Clear id, data, error and loading, for navigating away. The cache
  /// itself is kept.
  pub fn reset(&self) {
    let mut s = self.state.lock();
    s.current_id = None;
    s.detail = None;
    s.error = None;
    s.is_loading = false;
  }

  pub fn current_id(&self) -> Option<u64> {
    self.state.lock().current_id
  }

  pub fn detail(&self) -> Option<ProductDetail> {
    self.state.lock().detail.clone()
  }

  pub fn has_data(&self) -> bool {
    self.state.lock().detail.is_some()
  }

  pub fn is_loading(&self) -> bool {
    self.state.lock().is_loading
  }

  pub fn error(&self) -> Option<ApiError> {
    self.state.lock().error.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::mock::{sample_detail, MockCatalogApi};
  use std::sync::atomic::Ordering;

  fn store_with(mock: &Arc<MockCatalogApi>) -> ProductDetailStore {
    ProductDetailStore::new(mock.clone(), CacheWindows::default())
  }

  #[tokio::test]
  async fn fetch_tracks_the_current_id_and_caches() {
    let mock = MockCatalogApi::new();
    mock.put_detail(7, Ok(sample_detail(7)));
    let store = store_with(&mock);

    let detail = store.fetch_detail(7).await.unwrap();
    assert_eq!(detail.id, 7);
    assert_eq!(store.current_id(), Some(7));
    assert!(store.has_data());

    store.fetch_detail(7).await.unwrap();
    assert_eq!(mock.detail_calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn late_resolution_of_a_superseded_fetch_is_discarded() {
    let mock = MockCatalogApi::new();
    mock.put_detail(1, Ok(sample_detail(1)));
    mock.put_detail(2, Ok(sample_detail(2)));
    // The fetch for id 1 stalls until released; id 2 resolves first.
    let gate = mock.gate_detail(1);
    let store = store_with(&mock);

    let first = store.fetch_detail(1);
    let second = async {
      let result = store.fetch_detail(2).await;
      gate.notify_one();
      result
    };
    let (first, second) = tokio::join!(first, second);

    // The superseded call still hands its record to its own caller.
    assert_eq!(first.unwrap().id, 1);
    assert_eq!(second.unwrap().id, 2);

    // But the store reflects the newer id.
    assert_eq!(store.current_id(), Some(2));
    assert_eq!(store.detail().unwrap().id, 2);
    assert!(!store.is_loading());
  }

  #[tokio::test]
  async fn failed_fetch_records_error_and_keeps_prior_detail() {
    let mock = MockCatalogApi::new();
    mock.put_detail(7, Ok(sample_detail(7)));
    let store = store_with(&mock);

    store.fetch_detail(7).await.unwrap();

    store.invalidate_cache_for(7);
    mock.put_detail(7, Err(ApiError::Server {
      status: 500,
      message: "boom".to_string(),
    }));

    assert!(store.fetch_detail(7).await.is_err());
    assert!(store.error().is_some());
    assert_eq!(store.detail().unwrap().id, 7);
    assert!(!store.is_loading());
  }

  #[tokio::test]
  async fn refetch_reloads_the_last_fetched_id() {
    let mock = MockCatalogApi::new();
    mock.put_detail(7, Ok(sample_detail(7)));
    let store = store_with(&mock);

    store.fetch_detail(7).await.unwrap();
    assert_eq!(mock.detail_calls.load(Ordering::SeqCst), 1);

    // Refetch drops the entry first, so it always goes to the network.
    let reloaded = store.refetch().await.unwrap();
    assert_eq!(reloaded.unwrap().id, 7);
    assert_eq!(mock.detail_calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn refetch_without_a_tracked_id_is_a_noop() {
    let mock = MockCatalogApi::new();
    let store = store_with(&mock);

    assert!(store.refetch().await.unwrap().is_none());
    assert_eq!(mock.detail_calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn reset_clears_state_but_not_the_cache() {
    let mock = MockCatalogApi::new();
    mock.put_detail(7, Ok(sample_detail(7)));
    let store = store_with(&mock);

    store.fetch_detail(7).await.unwrap();
    store.reset();

    assert_eq!(store.current_id(), None);
    assert!(!store.has_data());
    assert!(store.error().is_none());

    // The cached entry survives a reset, so fetching again is still a hit.
    store.fetch_detail(7).await.unwrap();
    assert_eq!(mock.detail_calls.load(Ordering::SeqCst), 1);
  }
}
