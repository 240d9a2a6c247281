//! Mutating product actions and the cross-store invalidation they trigger.
//!
//! Every successful mutation drops the list store's entry for its current
//! filter key before control returns to the caller; edits and status
//! changes additionally drop the detail entry for the affected id. A
//! failed mutation skips invalidation entirely, and a validation failure
//! short-circuits before any request is sent.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::catalog::client::{ApiResult, CatalogApi};
use crate::catalog::error::ApiError;
use crate::catalog::forms::{build_create_request, build_edit_request, ProductCreateForm, ProductEditForm};
use crate::catalog::types::{ItemStatus, MutationOutcome};
use crate::store::{ProductDetailStore, ProductListStore};

pub struct ProductMutations {
  api: Arc<dyn CatalogApi>,
  list: Arc<ProductListStore>,
  detail: Arc<ProductDetailStore>,
  state: Mutex<MutationState>,
}

#[derive(Default)]
struct MutationState {
  is_submitting: bool,
  error: Option<ApiError>,
  last_outcome: Option<MutationOutcome>,
}

impl ProductMutations {
  pub fn new(
    api: Arc<dyn CatalogApi>,
    list: Arc<ProductListStore>,
    detail: Arc<ProductDetailStore>,
  ) -> Self {
    Self {
      api,
      list,
      detail,
      state: Mutex::new(MutationState::default()),
    }
  }

  pub async fn create_product(&self, form: &ProductCreateForm) -> ApiResult<MutationOutcome> {
    self.begin();
    let (request, image) = match build_create_request(form) {
      Ok(parts) => parts,
      Err(e) => return self.fail(e),
    };

    let result = self.api.create_product(&request, image).await;
    self.settle(result, None)
  }

  pub async fn edit_product(&self, form: &ProductEditForm) -> ApiResult<MutationOutcome> {
    self.begin();
    let (request, image) = match build_edit_request(form) {
      Ok(parts) => parts,
      Err(e) => return self.fail(e),
    };

    let result = self.api.edit_product(&request, image).await;
    self.settle(result, Some(form.id))
  }

  pub async fn delete_product(&self, id: u64) -> ApiResult<MutationOutcome> {
    self.begin();
    let result = self.api.delete_product(id).await;
    self.settle(result, None)
  }

  pub async fn change_item_status(&self, id: u64, status: ItemStatus) -> ApiResult<MutationOutcome> {
    self.begin();
    let result = self.api.change_item_status(id, status).await;
    self.settle(result, Some(id))
  }

  fn begin(&self) {
    let mut s = self.state.lock();
    s.is_submitting = true;
    s.error = None;
    s.last_outcome = None;
  }

  /// Record a pre-flight failure. Nothing was sent, so no cache is touched.
  fn fail(&self, e: ApiError) -> ApiResult<MutationOutcome> {
    let mut s = self.state.lock();
    s.error = Some(e.clone());
    s.is_submitting = false;
    Err(e)
  }

  fn settle(
    &self,
    result: ApiResult<MutationOutcome>,
    affected_detail_id: Option<u64>,
  ) -> ApiResult<MutationOutcome> {
    match result {
      Ok(outcome) => {
        // The cached reads are stale now; force the next fetches to miss.
        self.list.invalidate_cache_for_current_filters();
        if let Some(id) = affected_detail_id {
          debug!(id, "invalidating detail cache after mutation");
          self.detail.invalidate_cache_for(id);
        }

        let mut s = self.state.lock();
        s.last_outcome = Some(outcome.clone());
        s.is_submitting = false;
        Ok(outcome)
      }
      Err(e) => {
        let mut s = self.state.lock();
        s.error = Some(e.clone());
        s.is_submitting = false;
        Err(e)
      }
    }
  }

  pub fn is_submitting(&self) -> bool {
    self.state.lock().is_submitting
  }

  pub fn error(&self) -> Option<ApiError> {
    self.state.lock().error.clone()
  }

  pub fn last_outcome(&self) -> Option<MutationOutcome> {
    self.state.lock().last_outcome.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheWindows;
  use crate::catalog::forms::ImageUpload;
  use crate::catalog::mock::{sample_detail, sample_list_data, MockCatalogApi};
  use std::sync::atomic::Ordering;

  struct Fixture {
    mock: Arc<MockCatalogApi>,
    list: Arc<ProductListStore>,
    detail: Arc<ProductDetailStore>,
    mutations: ProductMutations,
  }

  fn fixture() -> Fixture {
    let mock = MockCatalogApi::new();
    let windows = CacheWindows::default();
    let list = Arc::new(ProductListStore::new(mock.clone(), windows));
    let detail = Arc::new(ProductDetailStore::new(mock.clone(), windows));
    let mutations = ProductMutations::new(mock.clone(), list.clone(), detail.clone());
    Fixture {
      mock,
      list,
      detail,
      mutations,
    }
  }

  fn create_form_with_image() -> ProductCreateForm {
    ProductCreateForm {
      name: "Kopi Susu".to_string(),
      sku: "KS-01".to_string(),
      price: 18000,
      unit: "cup".to_string(),
      image: Some(ImageUpload {
        file_name: "kopi.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, 0x50],
      }),
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn successful_delete_invalidates_the_list_cache() {
    let f = fixture();
    f.mock.push_list(Ok(sample_list_data(&[1, 2, 3, 4, 5])));
    f.mock.push_list(Ok(sample_list_data(&[1, 2, 3, 4])));

    f.list.fetch().await.unwrap();
    assert_eq!(f.mock.list_calls.load(Ordering::SeqCst), 1);

    f.mutations.delete_product(7).await.unwrap();

    // The entry for the current filters is gone, so this is a network call.
    f.list.fetch().await.unwrap();
    assert_eq!(f.mock.list_calls.load(Ordering::SeqCst), 2);
    assert_eq!(f.list.products().len(), 4);
  }

  #[tokio::test]
  async fn failed_delete_skips_invalidation() {
    let f = fixture();
    f.mock.push_list(Ok(sample_list_data(&[1])));
    f.list.fetch().await.unwrap();

    f.mock.push_mutation(Err(ApiError::Server {
      status: 500,
      message: "boom".to_string(),
    }));
    assert!(f.mutations.delete_product(7).await.is_err());
    assert!(f.mutations.error().is_some());

    // The cached page is intact; fetching again does not hit the network.
    f.list.fetch().await.unwrap();
    assert_eq!(f.mock.list_calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn status_change_invalidates_list_and_detail_for_the_affected_id() {
    let f = fixture();
    f.mock.push_list(Ok(sample_list_data(&[7])));
    f.mock.push_list(Ok(sample_list_data(&[7])));
    f.mock.put_detail(7, Ok(sample_detail(7)));

    f.list.fetch().await.unwrap();
    f.detail.fetch_detail(7).await.unwrap();
    assert_eq!(f.mock.detail_calls.load(Ordering::SeqCst), 1);

    f.mutations.change_item_status(7, ItemStatus::Off).await.unwrap();

    f.list.fetch().await.unwrap();
    f.detail.fetch_detail(7).await.unwrap();
    assert_eq!(f.mock.list_calls.load(Ordering::SeqCst), 2);
    assert_eq!(f.mock.detail_calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn edit_invalidates_the_detail_entry_for_the_edited_id() {
    let f = fixture();
    f.mock.put_detail(7, Ok(sample_detail(7)));
    f.detail.fetch_detail(7).await.unwrap();

    let form = ProductEditForm {
      id: 7,
      base: create_form_with_image(),
      ..Default::default()
    };
    f.mutations.edit_product(&form).await.unwrap();

    f.detail.fetch_detail(7).await.unwrap();
    assert_eq!(f.mock.detail_calls.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn create_validation_failure_short_circuits_before_the_network() {
    let f = fixture();
    f.mock.push_list(Ok(sample_list_data(&[1])));
    f.list.fetch().await.unwrap();

    let form = ProductCreateForm {
      name: "Tanpa Foto".to_string(),
      ..Default::default()
    };
    let err = f.mutations.create_product(&form).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(f.mock.create_calls.load(Ordering::SeqCst), 0);

    // No invalidation happened either: the list entry still hits.
    f.list.fetch().await.unwrap();
    assert_eq!(f.mock.list_calls.load(Ordering::SeqCst), 1);
    assert!(!f.mutations.is_submitting());
  }

  #[tokio::test]
  async fn successful_create_invalidates_the_list_cache() {
    let f = fixture();
    f.mock.push_list(Ok(sample_list_data(&[1])));
    f.mock.push_list(Ok(sample_list_data(&[1, 2])));
    f.list.fetch().await.unwrap();

    let outcome = f.mutations.create_product(&create_form_with_image()).await.unwrap();
    assert_eq!(outcome.code, 200);
    assert_eq!(f.mutations.last_outcome(), Some(outcome));

    f.list.fetch().await.unwrap();
    assert_eq!(f.mock.list_calls.load(Ordering::SeqCst), 2);
    assert_eq!(f.list.products().len(), 2);
  }
}
