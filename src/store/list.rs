//! Product list store: paged, filtered product queries over a timed cache.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheWindows, QueryKey, TimedCache};
use crate::catalog::client::{ApiResult, CatalogApi};
use crate::catalog::error::ApiError;
use crate::catalog::keys::CatalogQueryKey;
use crate::catalog::types::{
  FilterUpdate, ListCounts, Pagination, Product, ProductListData, ProductQuery,
};

pub struct ProductListStore {
  api: Arc<dyn CatalogApi>,
  state: Mutex<ListState>,
}

struct ListState {
  /// 1-indexed page cursor, mirrored into `query.page`
  current_page: u32,
  query: ProductQuery,
  data: Option<ProductListData>,
  is_loading: bool,
  error: Option<ApiError>,
  cache: TimedCache<ProductListData>,
  /// Bumped per issued fetch; only the latest fetch may commit state
  fetch_seq: u64,
}

impl ListState {
  fn key(&self) -> CatalogQueryKey {
    CatalogQueryKey::product_list(
      self.query.page,
      Some(&self.query.search),
      self.query.page_size,
      self.query.active,
    )
  }
}

impl ProductListStore {
  pub fn new(api: Arc<dyn CatalogApi>, windows: CacheWindows) -> Self {
    Self {
      api,
      state: Mutex::new(ListState {
        current_page: 1,
        query: ProductQuery::default(),
        data: None,
        is_loading: false,
        error: None,
        cache: TimedCache::new(windows),
        fetch_seq: 0,
      }),
    }
  }

  /// Fetch the page for the current filters.
  ///
  /// A fresh cache entry short-circuits the network entirely; a miss goes
  /// through the API and populates both state and cache. A failure records
  /// the error and leaves the previous data untouched. Loading is cleared
  /// and the cache collected on every exit path.
  pub async fn fetch(&self) -> ApiResult<ProductListData> {
    let (key, hash, query, seq) = {
      let mut s = self.state.lock();
      let key = s.key();
      let hash = key.cache_hash();

      let hit = s.cache.get(&hash).map(|entry| entry.data.clone());
      if let Some(snapshot) = hit {
        debug!(query = %key.description(), "list cache hit");
        s.data = Some(snapshot.clone());
        s.error = None;
        s.cache.gc();
        return Ok(snapshot);
      }

      s.is_loading = true;
      s.error = None;
      s.fetch_seq += 1;
      (key, hash, s.query.clone(), s.fetch_seq)
    };

    debug!(query = %key.description(), "list cache miss, fetching");
    let result = self.api.list_products(&query).await;

    let mut s = self.state.lock();
    // A fetch issued after this one owns the state now; a late resolution
    // of this one is discarded rather than committed.
    let current = s.fetch_seq == seq;

    let out = match result {
      Ok(snapshot) => {
        if current {
          s.data = Some(snapshot.clone());
          s.error = None;
          s.cache.set(hash, snapshot.clone());
        }
        Ok(snapshot)
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

  /// Re-run the fetch for the current key. Does NOT invalidate: a fresh
  /// entry for an unchanged key still short-circuits. Invalidate first to
  /// force a reload.
  pub async fn refetch(&self) -> ApiResult<ProductListData> {
    self.fetch().await
  }

  /// Merge a partial filter change and reset the page cursor to 1, keeping
  /// the embedded page field in sync.
  pub fn update_filters(&self, update: FilterUpdate) {
    let mut s = self.state.lock();
    if let Some(search) = update.search {
      s.query.search = search;
    }
    if let Some(page_size) = update.page_size {
      s.query.page_size = page_size;
    }
    if let Some(active) = update.active {
      s.query.active = active;
    }
    s.current_page = 1;
    s.query.page = 1;
  }

  /// Set the 1-indexed page cursor, mirrored into the filters.
  pub fn set_page(&self, page: u32) {
    let mut s = self.state.lock();
    s.current_page = page;
    s.query.page = page;
  }

  /// Drop the cache entry for the current filter key without touching the
  /// visible data, so the next fetch is a guaranteed miss.
  pub fn invalidate_cache_for_current_filters(&self) {
    let mut s = self.state.lock();
    let hash = s.key().cache_hash();
    s.cache.invalidate(&hash);
  }

  pub fn products(&self) -> Vec<Product> {
    self
      .state
      .lock()
      .data
      .as_ref()
      .map(|d| d.items.clone())
      .unwrap_or_default()
  }

  pub fn pagination(&self) -> Option<Pagination> {
    self.state.lock().data.as_ref().map(|d| d.pagination)
  }

  pub fn counts(&self) -> ListCounts {
    self
      .state
      .lock()
      .data
      .as_ref()
      .map(|d| d.counts)
      .unwrap_or_default()
  }

  pub fn is_loading(&self) -> bool {
    self.state.lock().is_loading
  }

  pub fn error(&self) -> Option<ApiError> {
    self.state.lock().error.clone()
  }

  pub fn current_page(&self) -> u32 {
    self.state.lock().current_page
  }

  pub fn filters(&self) -> ProductQuery {
    self.state.lock().query.clone()
  }

  #[cfg(test)]
  fn has_cached_current(&self) -> bool {
    let s = self.state.lock();
    let hash = s.key().cache_hash();
    s.cache.get(&hash).is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::mock::{sample_list_data, MockCatalogApi};
  use std::sync::atomic::Ordering;

  fn store_with(mock: &Arc<MockCatalogApi>) -> ProductListStore {
    ProductListStore::new(mock.clone(), CacheWindows::default())
  }

  #[tokio::test]
  async fn fresh_cache_entry_short_circuits_the_network() {
    let mock = MockCatalogApi::new();
    mock.push_list(Ok(sample_list_data(&[1, 2, 3])));
    let store = store_with(&mock);

    let first = store.fetch().await.unwrap();
    assert_eq!(mock.list_calls.load(Ordering::SeqCst), 1);

    let second = store.fetch().await.unwrap();
    assert_eq!(mock.list_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second, first);
  }

  #[tokio::test]
  async fn failed_fetch_records_error_and_keeps_prior_data() {
    let mock = MockCatalogApi::new();
    mock.push_list(Ok(sample_list_data(&[1, 2])));
    let store = store_with(&mock);

    store.fetch().await.unwrap();
    assert_eq!(store.products().len(), 2);

    store.invalidate_cache_for_current_filters();
    mock.push_list(Err(ApiError::Transport("connection refused".to_string())));

    let err = store.fetch().await.unwrap_err();
    assert_eq!(err, ApiError::Transport("connection refused".to_string()));
    assert_eq!(store.products().len(), 2);
    assert!(store.error().is_some());
    assert!(!store.is_loading());
  }

  #[tokio::test]
  async fn successful_fetch_clears_a_recorded_error() {
    let mock = MockCatalogApi::new();
    mock.push_list(Err(ApiError::Transport("boom".to_string())));
    let store = store_with(&mock);

    assert!(store.fetch().await.is_err());
    assert!(store.error().is_some());

    mock.push_list(Ok(sample_list_data(&[4])));
    store.fetch().await.unwrap();
    assert!(store.error().is_none());
    assert_eq!(store.products().len(), 1);
  }

  #[test]
  fn filter_change_resets_the_page_to_one() {
    let mock = MockCatalogApi::new();
    let store = store_with(&mock);
    store.set_page(3);
    assert_eq!(store.current_page(), 3);
    assert_eq!(store.filters().page, 3);

    store.update_filters(FilterUpdate {
      search: Some("x".to_string()),
      ..Default::default()
    });

    assert_eq!(store.current_page(), 1);
    assert_eq!(store.filters().page, 1);
    assert_eq!(store.filters().search, "x");
  }

  #[tokio::test]
  async fn changed_filters_derive_a_different_key_and_miss() {
    let mock = MockCatalogApi::new();
    mock.push_list(Ok(sample_list_data(&[1])));
    mock.push_list(Ok(sample_list_data(&[2])));
    let store = store_with(&mock);

    store.fetch().await.unwrap();
    store.update_filters(FilterUpdate {
      search: Some("kopi".to_string()),
      ..Default::default()
    });
    store.fetch().await.unwrap();

    assert_eq!(mock.list_calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.products()[0].id, 2);
  }

  #[tokio::test]
  async fn invalidation_forces_the_next_fetch_to_miss() {
    let mock = MockCatalogApi::new();
    mock.push_list(Ok(sample_list_data(&[1])));
    mock.push_list(Ok(sample_list_data(&[1])));
    let store = store_with(&mock);

    store.fetch().await.unwrap();
    assert!(store.has_cached_current());

    store.invalidate_cache_for_current_filters();
    assert!(!store.has_cached_current());
    // The visible data survives the invalidation.
    assert_eq!(store.products().len(), 1);

    store.fetch().await.unwrap();
    assert_eq!(mock.list_calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn refetch_without_invalidation_hits_the_cache() {
    let mock = MockCatalogApi::new();
    mock.push_list(Ok(sample_list_data(&[1])));
    let store = store_with(&mock);

    store.fetch().await.unwrap();
    store.refetch().await.unwrap();

    assert_eq!(mock.list_calls.load(Ordering::SeqCst), 1);
  }
}
