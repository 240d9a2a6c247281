//! Cache-key derivation for catalog queries.

use sha2::{Digest, Sha256};

use crate::cache::QueryKey;

/// Query key types for catalog API calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogQueryKey {
  /// One page of the product list under the given filters
  ProductList {
    page: u32,
    search: String,
    page_size: u32,
    active: Option<bool>,
  },
  /// A single product by id
  ProductDetail { id: u64 },
  /// The category reference list
  Categories,
  /// The add-on group reference list
  AddOns,
}

impl CatalogQueryKey {
  /// Build a product-list key. An absent search term normalizes to the
  /// empty string so both derive the same key.
  pub fn product_list(page: u32, search: Option<&str>, page_size: u32, active: Option<bool>) -> Self {
    CatalogQueryKey::ProductList {
      page,
      search: search.unwrap_or("").trim().to_string(),
      page_size,
      active,
    }
  }
}

impl QueryKey for CatalogQueryKey {
  fn cache_hash(&self) -> String {
    // JSON-encode the parameter tuple so field boundaries survive encoding
    // (no separator collisions), then hash for stable fixed-length keys.
    let input = match self {
      Self::ProductList {
        page,
        search,
        page_size,
        active,
      } => serde_json::json!(["products", page, search, page_size, active]).to_string(),
      Self::ProductDetail { id } => serde_json::json!(["product_detail", id]).to_string(),
      Self::Categories => serde_json::json!(["categories"]).to_string(),
      Self::AddOns => serde_json::json!(["addons"]).to_string(),
    };

    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    match self {
      Self::ProductList {
        page,
        search,
        page_size,
        active,
      } => {
        if search.is_empty() {
          format!("products page {} ({} per page, active: {:?})", page, page_size, active)
        } else {
          format!(
            "products page {} matching '{}' ({} per page, active: {:?})",
            page, search, page_size, active
          )
        }
      }
      Self::ProductDetail { id } => format!("product {}", id),
      Self::Categories => "categories".to_string(),
      Self::AddOns => "add-on groups".to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn equal_parameters_yield_identical_keys() {
    let a = CatalogQueryKey::product_list(2, Some("abc"), 10, None);
    let b = CatalogQueryKey::product_list(2, Some("abc"), 10, None);
    assert_eq!(a.cache_hash(), b.cache_hash());
  }

  #[test]
  fn absent_search_normalizes_to_empty_search() {
    let absent = CatalogQueryKey::product_list(1, None, 10, None);
    let empty = CatalogQueryKey::product_list(1, Some(""), 10, None);
    assert_eq!(absent.cache_hash(), empty.cache_hash());
  }

  #[test]
  fn differing_parameters_yield_differing_keys() {
    let base = CatalogQueryKey::product_list(1, Some("abc"), 10, None);
    let variants = [
      CatalogQueryKey::product_list(2, Some("abc"), 10, None),
      CatalogQueryKey::product_list(1, Some("abd"), 10, None),
      CatalogQueryKey::product_list(1, Some("abc"), 20, None),
      CatalogQueryKey::product_list(1, Some("abc"), 10, Some(true)),
      CatalogQueryKey::product_list(1, Some("abc"), 10, Some(false)),
    ];
    for other in &variants {
      assert_ne!(base.cache_hash(), other.cache_hash());
    }
  }

  #[test]
  fn search_text_cannot_collide_with_other_fields() {
    // A search term that mimics the following fields must not produce the
    // key of a different parameter tuple.
    let tricky = CatalogQueryKey::product_list(1, Some("x\",10"), 20, None);
    let plain = CatalogQueryKey::product_list(1, Some("x"), 1020, None);
    assert_ne!(tricky.cache_hash(), plain.cache_hash());
  }

  #[test]
  fn detail_keys_differ_by_id_and_from_list_keys() {
    let seven = CatalogQueryKey::ProductDetail { id: 7 };
    let eight = CatalogQueryKey::ProductDetail { id: 8 };
    let list = CatalogQueryKey::product_list(7, None, 10, None);
    assert_ne!(seven.cache_hash(), eight.cache_hash());
    assert_ne!(seven.cache_hash(), list.cache_hash());
  }

  #[test]
  fn reference_keys_are_distinct() {
    assert_ne!(
      CatalogQueryKey::Categories.cache_hash(),
      CatalogQueryKey::AddOns.cache_hash()
    );
  }
}
