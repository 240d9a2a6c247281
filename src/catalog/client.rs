use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::catalog::api_types::{
  ApiAddOnListItem, ApiCategory, ApiDeleteRequest, ApiDetailRequest, ApiEnvelope, ApiListRequest,
  ApiMeta, ApiProductDetail, ApiProductListResponse, ApiStatusRequest, ProductCreateRequest,
  ProductEditRequest,
};
use crate::catalog::error::ApiError;
use crate::catalog::forms::ImageUpload;
use crate::catalog::types::{
  AddOnListItem, Category, ItemStatus, MutationOutcome, ProductDetail, ProductListData,
  ProductQuery,
};
use crate::config::Config;

pub type ApiResult<T> = Result<T, ApiError>;

/// Backend operations the stores depend on.
///
/// Stores only ever see this trait; the HTTP client below is one
/// implementation, the test mock is another.
#[async_trait]
pub trait CatalogApi: Send + Sync {
  async fn list_products(&self, query: &ProductQuery) -> ApiResult<ProductListData>;
  async fn get_product_detail(&self, id: u64) -> ApiResult<ProductDetail>;
  async fn create_product(
    &self,
    request: &ProductCreateRequest,
    image: &ImageUpload,
  ) -> ApiResult<MutationOutcome>;
  async fn edit_product(
    &self,
    request: &ProductEditRequest,
    image: Option<&ImageUpload>,
  ) -> ApiResult<MutationOutcome>;
  async fn delete_product(&self, id: u64) -> ApiResult<MutationOutcome>;
  async fn change_item_status(&self, id: u64, status: ItemStatus) -> ApiResult<MutationOutcome>;
  async fn list_categories(&self) -> ApiResult<Vec<Category>>;
  async fn list_add_ons(&self) -> ApiResult<Vec<AddOnListItem>>;
}

/// Catalog API client over the backend's POST+envelope HTTP contract.
pub struct HttpCatalogClient {
  http: reqwest::Client,
  base_url: Url,
  token: String,
}

impl HttpCatalogClient {
  pub fn new(config: &Config) -> Result<Self> {
    let base_url = Url::parse(&config.api.base_url)
      .map_err(|e| eyre!("Invalid API base URL {}: {}", config.api.base_url, e))?;

    let token = Config::get_api_token()?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      token,
    })
  }

  fn endpoint(&self, path: &str) -> ApiResult<Url> {
    self
      .base_url
      .join(path)
      .map_err(|e| ApiError::Transport(format!("invalid endpoint {}: {}", path, e)))
  }

  async fn post<B, R>(&self, path: &str, body: &B) -> ApiResult<R>
  where
    B: Serialize + ?Sized + Sync,
    R: DeserializeOwned,
  {
    let url = self.endpoint(path)?;
    debug!(%url, "POST");

    let response = self
      .http
      .post(url.clone())
      .bearer_auth(&self.token)
      .json(body)
      .send()
      .await
      .map_err(|e| ApiError::Transport(format!("{}: {}", path, e)))?;

    Self::decode(&url, response).await
  }

  async fn post_multipart<R>(&self, path: &str, form: Form) -> ApiResult<R>
  where
    R: DeserializeOwned,
  {
    let url = self.endpoint(path)?;
    debug!(%url, "POST multipart");

    let response = self
      .http
      .post(url.clone())
      .bearer_auth(&self.token)
      .multipart(form)
      .send()
      .await
      .map_err(|e| ApiError::Transport(format!("{}: {}", path, e)))?;

    Self::decode(&url, response).await
  }

  async fn decode<R>(url: &Url, response: reqwest::Response) -> ApiResult<R>
  where
    R: DeserializeOwned,
  {
    let status = response.status();
    if !status.is_success() {
      let message = response.text().await.unwrap_or_default();
      return Err(ApiError::Server {
        status: status.as_u16(),
        message,
      });
    }

    debug!(%url, status = status.as_u16(), "response");

    response
      .json()
      .await
      .map_err(|e| ApiError::Transport(format!("invalid response from {}: {}", url, e)))
  }

  /// Build the multipart body shared by create and edit: a `data_barang`
  /// JSON field plus an optional `gambar` file part.
  fn product_form<B: Serialize>(payload: &B, image: Option<&ImageUpload>) -> ApiResult<Form> {
    let json = serde_json::to_string(payload)
      .map_err(|e| ApiError::Validation(format!("failed to encode payload: {}", e)))?;

    let mut form = Form::new().text("data_barang", json);
    if let Some(image) = image {
      let part = Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(&image.content_type)
        .map_err(|e| {
          ApiError::Validation(format!("unsupported content type {}: {}", image.content_type, e))
        })?;
      form = form.part("gambar", part);
    }
    Ok(form)
  }
}

fn check_meta(meta: &ApiMeta) -> ApiResult<()> {
  if meta.code != 200 {
    return Err(ApiError::Server {
      status: meta.code,
      message: meta.message.clone(),
    });
  }
  Ok(())
}

fn missing_data(meta: &ApiMeta) -> ApiError {
  ApiError::Server {
    status: meta.code,
    message: "response envelope has no data".to_string(),
  }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
  async fn list_products(&self, query: &ProductQuery) -> ApiResult<ProductListData> {
    let request = ApiListRequest::from_query(query);
    let response: ApiProductListResponse = self.post("product/list", &request).await?;
    check_meta(&response.meta)?;
    Ok(response.into_domain())
  }

  async fn get_product_detail(&self, id: u64) -> ApiResult<ProductDetail> {
    let response: ApiEnvelope<ApiProductDetail> = self
      .post("product/detail", &ApiDetailRequest { id_barang: id })
      .await?;
    check_meta(&response.meta)?;
    let detail = response.data.ok_or_else(|| missing_data(&response.meta))?;
    Ok(detail.into_domain())
  }

  async fn create_product(
    &self,
    request: &ProductCreateRequest,
    image: &ImageUpload,
  ) -> ApiResult<MutationOutcome> {
    let form = Self::product_form(request, Some(image))?;
    let response: ApiEnvelope<serde_json::Value> =
      self.post_multipart("product/create", form).await?;
    check_meta(&response.meta)?;
    Ok(MutationOutcome::from(&response.meta))
  }

  async fn edit_product(
    &self,
    request: &ProductEditRequest,
    image: Option<&ImageUpload>,
  ) -> ApiResult<MutationOutcome> {
    let form = Self::product_form(request, image)?;
    let response: ApiEnvelope<serde_json::Value> = self.post_multipart("product/edit", form).await?;
    check_meta(&response.meta)?;
    Ok(MutationOutcome::from(&response.meta))
  }

  async fn delete_product(&self, id: u64) -> ApiResult<MutationOutcome> {
    let response: ApiEnvelope<serde_json::Value> = self
      .post("product/delete", &ApiDeleteRequest { item: id })
      .await?;
    check_meta(&response.meta)?;
    Ok(MutationOutcome::from(&response.meta))
  }

  async fn change_item_status(&self, id: u64, status: ItemStatus) -> ApiResult<MutationOutcome> {
    let request = ApiStatusRequest {
      id_barang: id,
      status: status.as_str(),
    };
    let response: ApiEnvelope<serde_json::Value> =
      self.post("product/change-status", &request).await?;
    check_meta(&response.meta)?;
    Ok(MutationOutcome::from(&response.meta))
  }

  async fn list_categories(&self) -> ApiResult<Vec<Category>> {
    let response: ApiEnvelope<Vec<ApiCategory>> = self
      .post("category/list", &serde_json::json!({}))
      .await?;
    check_meta(&response.meta)?;
    let categories = response.data.ok_or_else(|| missing_data(&response.meta))?;
    Ok(categories.into_iter().map(Category::from).collect())
  }

  async fn list_add_ons(&self) -> ApiResult<Vec<AddOnListItem>> {
    let response: ApiEnvelope<Vec<ApiAddOnListItem>> =
      self.post("addon/list", &serde_json::json!({})).await?;
    check_meta(&response.meta)?;
    let add_ons = response.data.ok_or_else(|| missing_data(&response.meta))?;
    Ok(add_ons.into_iter().map(AddOnListItem::from).collect())
  }
}
