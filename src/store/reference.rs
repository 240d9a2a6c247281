//! Reference-data stores: categories and add-on groups.
//!
//! Both hold a single list under a fixed key. `fetch` is cache-first;
//! `refetch` drops the entry first and is therefore always a reload.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheWindows, QueryKey, TimedCache};
use crate::catalog::client::{ApiResult, CatalogApi};
use crate::catalog::error::ApiError;
use crate::catalog::keys::CatalogQueryKey;
use crate::catalog::types::{AddOnListItem, Category};

struct RefState<T> {
  data: Option<Vec<T>>,
  is_loading: bool,
  error: Option<ApiError>,
  cache: TimedCache<Vec<T>>,
  fetch_seq: u64,
}

impl<T> RefState<T> {
  fn new(windows: CacheWindows) -> Self {
    Self {
      data: None,
      is_loading: false,
      error: None,
      cache: TimedCache::new(windows),
      fetch_seq: 0,
    }
  }
}

pub struct CategoryStore {
  api: Arc<dyn CatalogApi>,
  state: Mutex<RefState<Category>>,
}

impl CategoryStore {
  pub fn new(api: Arc<dyn CatalogApi>, windows: CacheWindows) -> Self {
    Self {
      api,
      state: Mutex::new(RefState::new(windows)),
    }
  }

  pub async fn fetch(&self) -> ApiResult<Vec<Category>> {
    let hash = CatalogQueryKey::Categories.cache_hash();
    let seq = {
      let mut s = self.state.lock();
      let hit = s.cache.get(&hash).map(|entry| entry.data.clone());
      if let Some(categories) = hit {
        debug!("category cache hit");
        s.data = Some(categories.clone());
        s.error = None;
        s.cache.gc();
        return Ok(categories);
      }
      s.is_loading = true;
      s.error = None;
      s.fetch_seq += 1;
      s.fetch_seq
    };

    let result = self.api.list_categories().await;

    let mut s = self.state.lock();
    let current = s.fetch_seq == seq;
    let out = match result {
      Ok(categories) => {
        if current {
          s.data = Some(categories.clone());
          s.error = None;
          s.cache.set(hash, categories.clone());
        }
        Ok(categories)
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

  pub async fn refetch(&self) -> ApiResult<Vec<Category>> {
    let hash = CatalogQueryKey::Categories.cache_hash();
    self.state.lock().cache.invalidate(&hash);
    self.fetch().await
  }

  pub fn categories(&self) -> Vec<Category> {
    self.state.lock().data.clone().unwrap_or_default()
  }

  pub fn is_loading(&self) -> bool {
    self.state.lock().is_loading
  }

  pub fn error(&self) -> Option<ApiError> {
    self.state.lock().error.clone()
  }
}

pub struct AddOnStore {
  api: Arc<dyn CatalogApi>,
  state: Mutex<RefState<AddOnListItem>>,
}

impl AddOnStore {
  pub fn new(api: Arc<dyn CatalogApi>, windows: CacheWindows) -> Self {
    Self {
      api,
      state: Mutex::new(RefState::new(windows)),
    }
  }

  pub async fn fetch(&self) -> ApiResult<Vec<AddOnListItem>> {
    let hash = CatalogQueryKey::AddOns.cache_hash();
    let seq = {
      let mut s = self.state.lock();
      let hit = s.cache.get(&hash).map(|entry| entry.data.clone());
      if let Some(add_ons) = hit {
        debug!("add-on cache hit");
        s.data = Some(add_ons.clone());
        s.error = None;
        s.cache.gc();
        return Ok(add_ons);
      }
      s.is_loading = true;
      s.error = None;
      s.fetch_seq += 1;
      s.fetch_seq
    };

    let result = self.api.list_add_ons().await;

    let mut s = self.state.lock();
    let current = s.fetch_seq == seq;
    let out = match result {
      Ok(add_ons) => {
        if current {
          s.data = Some(add_ons.clone());
          s.error = None;
          s.cache.set(hash, add_ons.clone());
        }
        Ok(add_ons)
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

  pub async fn refetch(&self) -> ApiResult<Vec<AddOnListItem>> {
    let hash = CatalogQueryKey::AddOns.cache_hash();
    self.state.lock().cache.invalidate(&hash);
    self.fetch().await
  }

  pub fn add_ons(&self) -> Vec<AddOnListItem> {
    self.state.lock().data.clone().unwrap_or_default()
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
  use crate::catalog::mock::MockCatalogApi;
  use std::sync::atomic::Ordering;

  fn category(id: u64) -> Category {
    Category {
      id,
      name: format!("Category {}", id),
      created_by: None,
      updated_by: None,
    }
  }

  #[tokio::test]
  async fn categories_are_served_from_cache_after_the_first_fetch() {
    let mock = MockCatalogApi::new();
    mock.set_categories(vec![category(1), category(2)]);
    let store = CategoryStore::new(mock.clone(), CacheWindows::default());

    let first = store.fetch().await.unwrap();
    let second = store.fetch().await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second, first);
    assert_eq!(mock.category_calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn refetch_always_goes_to_the_network() {
    let mock = MockCatalogApi::new();
    mock.set_categories(vec![category(1)]);
    let store = CategoryStore::new(mock.clone(), CacheWindows::default());

    store.fetch().await.unwrap();
    store.refetch().await.unwrap();

    assert_eq!(mock.category_calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn add_ons_are_cached_under_their_own_key() {
    let mock = MockCatalogApi::new();
    let store = AddOnStore::new(mock.clone(), CacheWindows::default());

    store.fetch().await.unwrap();
    store.fetch().await.unwrap();

    assert_eq!(mock.add_on_calls.load(Ordering::SeqCst), 1);
    assert!(store.add_ons().is_empty());
    assert!(store.error().is_none());
  }
}
