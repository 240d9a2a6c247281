//! Form models and request assembly for product create/edit.
//!
//! Validation here is the local pre-flight kind: a failed check returns
//! [`ApiError::Validation`] before anything touches the network or a cache.

use super::api_types::{ApiAddOnItem, ProductCreateRequest, ProductEditRequest};
use super::error::ApiError;

/// Content types the backend accepts for product images (jpeg covers jpg).
pub const ALLOWED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// An image picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
  pub file_name: String,
  pub content_type: String,
  pub bytes: Vec<u8>,
}

/// Per-add-on operation flag in the edit payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOnOp {
  /// `A` — attach a new add-on group
  Attach,
  /// `E` — edit an existing link
  Edit,
  /// `N` — keep an existing link unchanged
  Keep,
  /// `D` — detach an existing link
  Detach,
}

impl AddOnOp {
  pub fn as_str(&self) -> &'static str {
    match self {
      AddOnOp::Attach => "A",
      AddOnOp::Edit => "E",
      AddOnOp::Keep => "N",
      AddOnOp::Detach => "D",
    }
  }
}

/// An add-on row as selected in a form, before normalization.
#[derive(Debug, Clone, Default)]
pub struct AddOnSelection {
  /// Selected add-on group id
  pub id: Option<u64>,
  pub is_active: Option<bool>,
  pub id_add_on_group: Option<u64>,
  /// Existing link id; presence means the row edits rather than attaches
  pub id_add_on_link: Option<u64>,
  pub status: Option<AddOnOp>,
  pub position: Option<u32>,
}

/// Form model for product creation.
#[derive(Debug, Clone, Default)]
pub struct ProductCreateForm {
  pub name: String,
  pub category: Option<u64>,
  pub sku: String,
  pub price: i64,
  pub unit: String,
  pub description: Option<String>,
  pub as_addon: bool,
  pub has_variant: bool,
  pub add_ons: Vec<AddOnSelection>,
  /// Required for creation; validated before submission
  pub image: Option<ImageUpload>,
}

/// Form model for product edits.
#[derive(Debug, Clone, Default)]
pub struct ProductEditForm {
  pub id: u64,
  pub base: ProductCreateForm,
  pub variant_remake: bool,
  pub variant_clear: bool,
  pub variant_change: bool,
}

fn validate_image(image: &ImageUpload) -> Result<(), ApiError> {
  if !ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
    return Err(ApiError::Validation(
      "Format gambar tidak didukung (jpeg/jpg/png)".to_string(),
    ));
  }
  Ok(())
}

fn request_from(form: &ProductCreateForm) -> ProductCreateRequest {
  ProductCreateRequest {
    nama_barang: form.name.clone(),
    kategori: form.category,
    sku: form.sku.clone(),
    barcode: None,
    harga: form.price,
    unit: form.unit.clone(),
    deskripsi: form.description.clone(),
    as_addon: form.as_addon,
    add_on: normalize_add_ons(&form.add_ons),
    has_addon: !form.add_ons.is_empty(),
    has_variant: form.has_variant,
  }
}

/// Assemble the create payload. The image is required and must be an
/// accepted type.
pub fn build_create_request(
  form: &ProductCreateForm,
) -> Result<(ProductCreateRequest, &ImageUpload), ApiError> {
  let image = form
    .image
    .as_ref()
    .ok_or_else(|| ApiError::Validation("Foto Barang wajib diupload".to_string()))?;
  validate_image(image)?;
  Ok((request_from(form), image))
}

/// Assemble the edit payload. The image is optional but validated when
/// present.
pub fn build_edit_request(
  form: &ProductEditForm,
) -> Result<(ProductEditRequest, Option<&ImageUpload>), ApiError> {
  let image = form.base.image.as_ref();
  if let Some(image) = image {
    validate_image(image)?;
  }

  let request = ProductEditRequest {
    id: form.id,
    base: request_from(&form.base),
    variant_remake: form.variant_remake,
    variant_clear: form.variant_clear,
    variant_change: form.variant_change,
  };
  Ok((request, image))
}

/// Normalize form add-on rows to the wire shape.
///
/// Status defaults to `E` when the row carries an existing link id, `A`
/// otherwise. Position defaults to index+1 so positions stay unique.
/// Attach rows carry the add-on group id; all other statuses carry the
/// link id.
pub fn normalize_add_ons(items: &[AddOnSelection]) -> Vec<ApiAddOnItem> {
  items
    .iter()
    .enumerate()
    .map(|(idx, item)| {
      let has_link = item.id_add_on_link.is_some();
      let status = item.status.unwrap_or(if has_link {
        AddOnOp::Edit
      } else {
        AddOnOp::Attach
      });
      let position = item.position.unwrap_or(idx as u32 + 1);

      let (id_add_on_group, id_add_on_link) = if status == AddOnOp::Attach {
        (item.id.or(item.id_add_on_group), None)
      } else {
        (None, item.id_add_on_link)
      };

      ApiAddOnItem {
        id_add_on_group,
        id_add_on_link,
        is_active: item.is_active.unwrap_or(false),
        status: status.as_str().to_string(),
        position,
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn jpeg_image() -> ImageUpload {
    ImageUpload {
      file_name: "foto.jpg".to_string(),
      content_type: "image/jpeg".to_string(),
      bytes: vec![0xff, 0xd8],
    }
  }

  #[test]
  fn create_requires_an_image() {
    let form = ProductCreateForm {
      name: "Kopi".to_string(),
      sku: "KP-01".to_string(),
      price: 15000,
      unit: "cup".to_string(),
      ..Default::default()
    };

    let err = build_create_request(&form).unwrap_err();
    assert_eq!(err, ApiError::Validation("Foto Barang wajib diupload".to_string()));
  }

  #[test]
  fn create_rejects_unsupported_image_types() {
    let form = ProductCreateForm {
      name: "Kopi".to_string(),
      image: Some(ImageUpload {
        file_name: "foto.gif".to_string(),
        content_type: "image/gif".to_string(),
        bytes: vec![0x47],
      }),
      ..Default::default()
    };

    let err = build_create_request(&form).unwrap_err();
    assert!(err.is_validation());
  }

  #[test]
  fn create_derives_has_addon_and_nulls_barcode() {
    let form = ProductCreateForm {
      name: "Kopi".to_string(),
      add_ons: vec![AddOnSelection {
        id: Some(4),
        is_active: Some(true),
        ..Default::default()
      }],
      image: Some(jpeg_image()),
      ..Default::default()
    };

    let (request, image) = build_create_request(&form).unwrap();
    assert!(request.has_addon);
    assert_eq!(request.barcode, None);
    assert_eq!(image.file_name, "foto.jpg");
  }

  #[test]
  fn edit_accepts_a_missing_image() {
    let form = ProductEditForm {
      id: 7,
      base: ProductCreateForm {
        name: "Kopi".to_string(),
        ..Default::default()
      },
      ..Default::default()
    };

    let (request, image) = build_edit_request(&form).unwrap();
    assert_eq!(request.id, 7);
    assert!(image.is_none());
    assert!(!request.variant_remake);
  }

  #[test]
  fn new_selection_normalizes_to_attach_with_group_id() {
    let normalized = normalize_add_ons(&[AddOnSelection {
      id: Some(4),
      is_active: Some(true),
      ..Default::default()
    }]);

    assert_eq!(normalized.len(), 1);
    assert_eq!(normalized[0].status, "A");
    assert_eq!(normalized[0].id_add_on_group, Some(4));
    assert_eq!(normalized[0].id_add_on_link, None);
    assert_eq!(normalized[0].position, 1);
  }

  #[test]
  fn linked_selection_normalizes_to_edit_with_link_id() {
    let normalized = normalize_add_ons(&[
      AddOnSelection {
        id: Some(4),
        ..Default::default()
      },
      AddOnSelection {
        id_add_on_link: Some(31),
        is_active: Some(true),
        ..Default::default()
      },
    ]);

    assert_eq!(normalized[1].status, "E");
    assert_eq!(normalized[1].id_add_on_link, Some(31));
    assert_eq!(normalized[1].id_add_on_group, None);
    // Positions stay unique across the whole list.
    assert_eq!(normalized[0].position, 1);
    assert_eq!(normalized[1].position, 2);
  }

  #[test]
  fn explicit_status_and_position_are_preserved() {
    let normalized = normalize_add_ons(&[AddOnSelection {
      id_add_on_link: Some(31),
      status: Some(AddOnOp::Detach),
      position: Some(9),
      ..Default::default()
    }]);

    assert_eq!(normalized[0].status, "D");
    assert_eq!(normalized[0].position, 9);
  }
}
