//! Scripted [`CatalogApi`] substitute for store tests.
//!
//! Responses are queued per endpoint; every call bumps a counter so tests
//! can assert exactly how often the network was hit. Detail calls can be
//! gated on a [`Notify`] to script out-of-order resolution.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::api_types::{ProductCreateRequest, ProductEditRequest};
use super::client::{ApiResult, CatalogApi};
use super::error::ApiError;
use super::forms::ImageUpload;
use super::types::{
  AddOnListItem, Category, ItemStatus, ListCounts, MutationOutcome, Pagination, Product,
  ProductDetail, ProductListData, ProductQuery,
};

#[derive(Default)]
pub struct MockCatalogApi {
  pub list_calls: AtomicUsize,
  pub detail_calls: AtomicUsize,
  pub create_calls: AtomicUsize,
  pub edit_calls: AtomicUsize,
  pub delete_calls: AtomicUsize,
  pub status_calls: AtomicUsize,
  pub category_calls: AtomicUsize,
  pub add_on_calls: AtomicUsize,

  list_results: Mutex<VecDeque<ApiResult<ProductListData>>>,
  detail_results: Mutex<HashMap<u64, ApiResult<ProductDetail>>>,
  detail_gates: Mutex<HashMap<u64, Arc<Notify>>>,
  mutation_results: Mutex<VecDeque<ApiResult<MutationOutcome>>>,
  categories: Mutex<Vec<Category>>,
  add_ons: Mutex<Vec<AddOnListItem>>,
}

impl MockCatalogApi {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn push_list(&self, result: ApiResult<ProductListData>) {
    self.list_results.lock().push_back(result);
  }

  pub fn put_detail(&self, id: u64, result: ApiResult<ProductDetail>) {
    self.detail_results.lock().insert(id, result);
  }

  /// Make detail calls for `id` wait until the returned handle is
  /// notified.
  pub fn gate_detail(&self, id: u64) -> Arc<Notify> {
    let gate = Arc::new(Notify::new());
    self.detail_gates.lock().insert(id, gate.clone());
    gate
  }

  /// Queue the result of the next mutating call (any kind).
  pub fn push_mutation(&self, result: ApiResult<MutationOutcome>) {
    self.mutation_results.lock().push_back(result);
  }

  pub fn set_categories(&self, categories: Vec<Category>) {
    *self.categories.lock() = categories;
  }

  pub fn set_add_ons(&self, add_ons: Vec<AddOnListItem>) {
    *self.add_ons.lock() = add_ons;
  }

  fn next_mutation(&self) -> ApiResult<MutationOutcome> {
    self
      .mutation_results
      .lock()
      .pop_front()
      .unwrap_or_else(|| Ok(sample_outcome()))
  }
}

#[async_trait]
impl CatalogApi for MockCatalogApi {
  async fn list_products(&self, _query: &ProductQuery) -> ApiResult<ProductListData> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    self
      .list_results
      .lock()
      .pop_front()
      .unwrap_or_else(|| Err(ApiError::Transport("no scripted list response".to_string())))
  }

  async fn get_product_detail(&self, id: u64) -> ApiResult<ProductDetail> {
    self.detail_calls.fetch_add(1, Ordering::SeqCst);

    let gate = self.detail_gates.lock().get(&id).cloned();
    if let Some(gate) = gate {
      gate.notified().await;
    }

    self
      .detail_results
      .lock()
      .get(&id)
      .cloned()
      .unwrap_or_else(|| {
        Err(ApiError::Server {
          status: 404,
          message: format!("no product {}", id),
        })
      })
  }

  async fn create_product(
    &self,
    _request: &ProductCreateRequest,
    _image: &ImageUpload,
  ) -> ApiResult<MutationOutcome> {
    self.create_calls.fetch_add(1, Ordering::SeqCst);
    self.next_mutation()
  }

  async fn edit_product(
    &self,
    _request: &ProductEditRequest,
    _image: Option<&ImageUpload>,
  ) -> ApiResult<MutationOutcome> {
    self.edit_calls.fetch_add(1, Ordering::SeqCst);
    self.next_mutation()
  }

  async fn delete_product(&self, _id: u64) -> ApiResult<MutationOutcome> {
    self.delete_calls.fetch_add(1, Ordering::SeqCst);
    self.next_mutation()
  }

  async fn change_item_status(&self, _id: u64, _status: ItemStatus) -> ApiResult<MutationOutcome> {
    self.status_calls.fetch_add(1, Ordering::SeqCst);
    self.next_mutation()
  }

  async fn list_categories(&self) -> ApiResult<Vec<Category>> {
    self.category_calls.fetch_add(1, Ordering::SeqCst);
    Ok(self.categories.lock().clone())
  }

  async fn list_add_ons(&self) -> ApiResult<Vec<AddOnListItem>> {
    self.add_on_calls.fetch_add(1, Ordering::SeqCst);
    Ok(self.add_ons.lock().clone())
  }
}

// ============================================================================
// Sample data builders
// ============================================================================

pub fn sample_product(id: u64) -> Product {
  Product {
    id,
    sku: format!("SKU-{}", id),
    barcode: None,
    unit: "pcs".to_string(),
    name: format!("Product {}", id),
    description: None,
    price: 10000,
    is_active: true,
    has_variant: false,
    as_addon: false,
    image: None,
    status: "Active".to_string(),
    created_by: None,
    updated_at: "2024-03-01 10:00:00".to_string(),
    category: None,
    is_variant: false,
    children: Vec::new(),
  }
}

pub fn sample_list_data(ids: &[u64]) -> ProductListData {
  ProductListData {
    items: ids.iter().copied().map(sample_product).collect(),
    pagination: Pagination {
      current_page: 1,
      total_pages: 1,
      total_items: ids.len() as u64,
      per_page: 10,
    },
    counts: ListCounts {
      active: ids.len() as u64,
      inactive: 0,
      total: ids.len() as u64,
    },
  }
}

pub fn sample_detail(id: u64) -> ProductDetail {
  ProductDetail {
    id,
    sku: format!("SKU-{}", id),
    barcode: None,
    unit: "pcs".to_string(),
    name: format!("Product {}", id),
    description: None,
    price: 10000,
    is_active: true,
    has_variant: false,
    as_addon: false,
    image: None,
    status: "Active".to_string(),
    created_by: None,
    updated_at: "2024-03-01 10:00:00".to_string(),
    category: None,
    add_on_links: Vec::new(),
    variants: Vec::new(),
  }
}

pub fn sample_outcome() -> MutationOutcome {
  MutationOutcome {
    code: 200,
    status: "success".to_string(),
    message: "OK".to_string(),
  }
}
