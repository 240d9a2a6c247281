//! Serde types matching the catalog backend's wire contract.
//!
//! These are separate from the domain types so responses deserialize
//! loosely (defaulted fields, numeric flags) while domain types stay
//! strict. Conversions at the bottom normalize into the domain shapes,
//! including the variant display tree.

use serde::{Deserialize, Serialize};

use super::types::{
  AddOnGroup, AddOnListItem, Category, ListCounts, MutationOutcome, Pagination, Product,
  ProductAddOnLink, ProductDetail, ProductListData, ProductQuery,
};

// ============================================================================
// Response envelope
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiMeta {
  pub code: u16,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
  pub meta: ApiMeta,
  pub data: Option<T>,
}

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiCategory {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub created_by: Option<String>,
  #[serde(default)]
  pub updated_by: Option<String>,
}

/// Variant row nested under a product. Category and updated_at are often
/// omitted by the backend; the conversion back-fills them from the parent.
#[derive(Debug, Deserialize)]
pub struct ApiVariant {
  pub id: u64,
  #[serde(default)]
  pub sku: String,
  pub name: String,
  #[serde(default)]
  pub price: i64,
  #[serde(default)]
  pub is_active: u8,
  #[serde(default)]
  pub unit: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub category: Option<ApiCategory>,
  #[serde(default)]
  pub updated_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiProduct {
  pub id: u64,
  #[serde(default)]
  pub sku: String,
  #[serde(default)]
  pub barcode: Option<String>,
  #[serde(default)]
  pub unit: String,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub price: i64,
  #[serde(default)]
  pub is_active: u8,
  #[serde(default)]
  pub has_variant: u8,
  #[serde(default)]
  pub as_addon: u8,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub created_by: Option<String>,
  #[serde(default)]
  pub updated_at: String,
  #[serde(default)]
  pub category: Option<ApiCategory>,
  #[serde(default)]
  pub variant: Vec<ApiVariant>,
}

#[derive(Debug, Deserialize)]
pub struct ApiAddOnGroup {
  pub id: u64,
  #[serde(default)]
  pub identifier: String,
  pub name: String,
  #[serde(default)]
  pub is_active: u8,
}

#[derive(Debug, Deserialize)]
pub struct ApiAddOnLink {
  pub id: u64,
  #[serde(default)]
  pub position: u32,
  #[serde(default)]
  pub is_active: u8,
  pub add_on_group: ApiAddOnGroup,
}

#[derive(Debug, Deserialize)]
pub struct ApiProductDetail {
  pub id: u64,
  #[serde(default)]
  pub sku: String,
  #[serde(default)]
  pub barcode: Option<String>,
  #[serde(default)]
  pub unit: String,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub price: i64,
  #[serde(default)]
  pub is_active: u8,
  #[serde(default)]
  pub has_variant: u8,
  #[serde(default)]
  pub as_addon: u8,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub created_by: Option<String>,
  #[serde(default)]
  pub updated_at: String,
  #[serde(default)]
  pub category: Option<ApiCategory>,
  #[serde(default)]
  pub add_on_link: Vec<ApiAddOnLink>,
  #[serde(default)]
  pub variant: Vec<ApiVariant>,
}

#[derive(Debug, Deserialize)]
pub struct ApiAddOnListItem {
  pub id: u64,
  #[serde(default)]
  pub identifier: String,
  pub name: String,
  #[serde(default)]
  pub is_active: u8,
  #[serde(default)]
  pub updated_at: String,
  #[serde(default)]
  pub add_on_item_count: u32,
}

// ============================================================================
// List endpoint response
// ============================================================================

/// Paginator wrapper around one page of rows.
#[derive(Debug, Deserialize)]
pub struct ApiPage<T> {
  #[serde(default = "default_page")]
  pub current_page: u32,
  #[serde(default)]
  pub data: Vec<T>,
  #[serde(default = "default_page")]
  pub last_page: u32,
  #[serde(default = "default_per_page")]
  pub per_page: u32,
  #[serde(default)]
  pub total: u64,
}

fn default_page() -> u32 {
  1
}

fn default_per_page() -> u32 {
  10
}

impl<T> Default for ApiPage<T> {
  fn default() -> Self {
    Self {
      current_page: default_page(),
      data: Vec::new(),
      last_page: default_page(),
      per_page: default_per_page(),
      total: 0,
    }
  }
}

/// The list response carries counts next to the page envelope.
#[derive(Debug, Deserialize)]
pub struct ApiProductListResponse {
  pub meta: ApiMeta,
  pub data: Option<ApiPage<ApiProduct>>,
  #[serde(default)]
  pub count_active: u64,
  #[serde(default)]
  pub count_non_active: u64,
  #[serde(default)]
  pub count_all: u64,
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiListRequest<'a> {
  pub search: &'a str,
  pub page_count: u32,
  pub active: Option<u8>,
  pub page: u32,
}

impl<'a> ApiListRequest<'a> {
  pub fn from_query(query: &'a ProductQuery) -> Self {
    Self {
      search: &query.search,
      page_count: query.page_size,
      active: query.active.map(u8::from),
      page: query.page,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ApiDetailRequest {
  pub id_barang: u64,
}

#[derive(Debug, Serialize)]
pub struct ApiDeleteRequest {
  pub item: u64,
}

#[derive(Debug, Serialize)]
pub struct ApiStatusRequest<'a> {
  pub id_barang: u64,
  pub status: &'a str,
}

/// Add-on entry in the create/edit payload, already normalized (status
/// letter, unique position, group id xor link id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiAddOnItem {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id_add_on_group: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id_add_on_link: Option<u64>,
  pub is_active: bool,
  pub status: String,
  pub position: u32,
}

/// `data_barang` payload for product creation.
#[derive(Debug, Clone, Serialize)]
pub struct ProductCreateRequest {
  pub nama_barang: String,
  pub kategori: Option<u64>,
  pub sku: String,
  /// Always serialized as null; the backend derives barcodes itself.
  pub barcode: Option<String>,
  pub harga: i64,
  pub unit: String,
  pub deskripsi: Option<String>,
  pub as_addon: bool,
  pub add_on: Vec<ApiAddOnItem>,
  pub has_addon: bool,
  pub has_variant: bool,
}

/// `data_barang` payload for product edits.
#[derive(Debug, Clone, Serialize)]
pub struct ProductEditRequest {
  pub id: u64,
  #[serde(flatten)]
  pub base: ProductCreateRequest,
  pub variant_remake: bool,
  pub variant_clear: bool,
  pub variant_change: bool,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiCategory> for Category {
  fn from(c: ApiCategory) -> Self {
    Category {
      id: c.id,
      name: c.name,
      created_by: c.created_by,
      updated_by: c.updated_by,
    }
  }
}

impl ApiVariant {
  /// Convert into a display-tree child. A variant without its own category
  /// or update timestamp inherits the parent's.
  fn into_child(self, parent_category: Option<&Category>, parent_updated_at: &str) -> Product {
    Product {
      id: self.id,
      sku: self.sku,
      barcode: None,
      unit: self.unit.unwrap_or_default(),
      name: self.name,
      description: None,
      price: self.price,
      is_active: self.is_active != 0,
      has_variant: false,
      as_addon: false,
      image: self.image,
      status: self.status.unwrap_or_default(),
      created_by: None,
      updated_at: self
        .updated_at
        .unwrap_or_else(|| parent_updated_at.to_string()),
      category: self
        .category
        .map(Category::from)
        .or_else(|| parent_category.cloned()),
      is_variant: true,
      children: Vec::new(),
    }
  }
}

impl ApiProduct {
  /// Convert into a domain product with its variants attached as children.
  pub fn into_tree(self) -> Product {
    let category = self.category.map(Category::from);
    let updated_at = self.updated_at;
    let children = if self.has_variant != 0 {
      self
        .variant
        .into_iter()
        .map(|v| v.into_child(category.as_ref(), &updated_at))
        .collect()
    } else {
      Vec::new()
    };

    Product {
      id: self.id,
      sku: self.sku,
      barcode: self.barcode,
      unit: self.unit,
      name: self.name,
      description: self.description,
      price: self.price,
      is_active: self.is_active != 0,
      has_variant: self.has_variant != 0,
      as_addon: self.as_addon != 0,
      image: self.image,
      status: self.status,
      created_by: self.created_by,
      updated_at,
      category,
      is_variant: false,
      children,
    }
  }
}

impl ApiProductListResponse {
  pub fn into_domain(self) -> ProductListData {
    let page = self.data.unwrap_or_default();
    ProductListData {
      items: page.data.into_iter().map(ApiProduct::into_tree).collect(),
      pagination: Pagination {
        current_page: page.current_page,
        total_pages: page.last_page,
        total_items: page.total,
        per_page: page.per_page,
      },
      counts: ListCounts {
        active: self.count_active,
        inactive: self.count_non_active,
        total: self.count_all,
      },
    }
  }
}

impl ApiProductDetail {
  pub fn into_domain(self) -> ProductDetail {
    let category = self.category.map(Category::from);
    let updated_at = self.updated_at;
    let variants = self
      .variant
      .into_iter()
      .map(|v| v.into_child(category.as_ref(), &updated_at))
      .collect();

    ProductDetail {
      id: self.id,
      sku: self.sku,
      barcode: self.barcode,
      unit: self.unit,
      name: self.name,
      description: self.description,
      price: self.price,
      is_active: self.is_active != 0,
      has_variant: self.has_variant != 0,
      as_addon: self.as_addon != 0,
      image: self.image,
      status: self.status,
      created_by: self.created_by,
      updated_at,
      category,
      add_on_links: self.add_on_link.into_iter().map(Into::into).collect(),
      variants,
    }
  }
}

impl From<ApiAddOnLink> for ProductAddOnLink {
  fn from(link: ApiAddOnLink) -> Self {
    ProductAddOnLink {
      id: link.id,
      position: link.position,
      is_active: link.is_active != 0,
      add_on_group: AddOnGroup {
        id: link.add_on_group.id,
        identifier: link.add_on_group.identifier,
        name: link.add_on_group.name,
        is_active: link.add_on_group.is_active != 0,
      },
    }
  }
}

impl From<ApiAddOnListItem> for AddOnListItem {
  fn from(item: ApiAddOnListItem) -> Self {
    AddOnListItem {
      id: item.id,
      identifier: item.identifier,
      name: item.name,
      is_active: item.is_active != 0,
      updated_at: item.updated_at,
      add_on_item_count: item.add_on_item_count,
    }
  }
}

impl From<&ApiMeta> for MutationOutcome {
  fn from(meta: &ApiMeta) -> Self {
    MutationOutcome {
      code: meta.code,
      status: meta.status.clone(),
      message: meta.message.clone(),
    }
  }
}
