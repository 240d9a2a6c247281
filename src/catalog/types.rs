/// Product category reference data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
  pub id: u64,
  pub name: String,
  pub created_by: Option<String>,
  pub updated_by: Option<String>,
}

/// A product row, including the derived display tree.
///
/// Variants are attached as `children` with `is_variant` set; a variant
/// without its own category or update timestamp inherits its parent's.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
  pub id: u64,
  pub sku: String,
  pub barcode: Option<String>,
  pub unit: String,
  pub name: String,
  pub description: Option<String>,
  pub price: i64,
  pub is_active: bool,
  pub has_variant: bool,
  pub as_addon: bool,
  pub image: Option<String>,
  pub status: String,
  pub created_by: Option<String>,
  pub updated_at: String,
  pub category: Option<Category>,
  pub is_variant: bool,
  pub children: Vec<Product>,
}

/// Add-on group as returned by the add-on list endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOnListItem {
  pub id: u64,
  pub identifier: String,
  pub name: String,
  pub is_active: bool,
  pub updated_at: String,
  pub add_on_item_count: u32,
}

/// Add-on group attached to a product detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOnGroup {
  pub id: u64,
  pub identifier: String,
  pub name: String,
  pub is_active: bool,
}

/// Link between a product and an add-on group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductAddOnLink {
  pub id: u64,
  pub position: u32,
  pub is_active: bool,
  pub add_on_group: AddOnGroup,
}

/// Full product details for the detail view
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetail {
  pub id: u64,
  pub sku: String,
  pub barcode: Option<String>,
  pub unit: String,
  pub name: String,
  pub description: Option<String>,
  pub price: i64,
  pub is_active: bool,
  pub has_variant: bool,
  pub as_addon: bool,
  pub image: Option<String>,
  pub status: String,
  pub created_by: Option<String>,
  pub updated_at: String,
  pub category: Option<Category>,
  pub add_on_links: Vec<ProductAddOnLink>,
  pub variants: Vec<Product>,
}

/// Filter tuple driving the product list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
  pub search: String,
  pub page_size: u32,
  /// `Some(true)` for active only, `Some(false)` for inactive only
  pub active: Option<bool>,
  /// 1-indexed, mirrored from the store's page cursor
  pub page: u32,
}

impl Default for ProductQuery {
  fn default() -> Self {
    Self {
      search: String::new(),
      page_size: 10,
      active: None,
      page: 1,
    }
  }
}

/// Partial filter change; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
  pub search: Option<String>,
  pub page_size: Option<u32>,
  pub active: Option<Option<bool>>,
}

/// Pagination metadata from the list response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
  pub current_page: u32,
  pub total_pages: u32,
  pub total_items: u64,
  pub per_page: u32,
}

/// Active/inactive/total counts alongside a list page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCounts {
  pub active: u64,
  pub inactive: u64,
  pub total: u64,
}

/// One normalized page of the product list
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListData {
  pub items: Vec<Product>,
  pub pagination: Pagination,
  pub counts: ListCounts,
}

/// Item status toggle values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
  On,
  Off,
}

impl ItemStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ItemStatus::On => "ON",
      ItemStatus::Off => "OFF",
    }
  }
}

impl std::fmt::Display for ItemStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Acknowledgement from a mutating endpoint, taken from the envelope meta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
  pub code: u16,
  pub status: String,
  pub message: String,
}
