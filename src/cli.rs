//! CLI argument definitions and command dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::client::{CatalogApi, HttpCatalogClient};
use crate::catalog::forms::{ImageUpload, ProductCreateForm, ProductEditForm};
use crate::catalog::types::{FilterUpdate, ItemStatus, Product, ProductDetail};
use crate::config::Config;
use crate::format::{format_date, format_price};
use crate::store::{AddOnStore, CategoryStore, ProductDetailStore, ProductListStore, ProductMutations};

#[derive(Parser, Debug)]
#[command(name = "katalog")]
#[command(about = "A terminal admin client for a product catalog backend")]
#[command(version)]
pub struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/katalog/config.yaml)
  #[arg(short, long)]
  pub config: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// List products
  List {
    /// Search term
    #[arg(short, long)]
    search: Option<String>,

    /// 1-indexed page
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Items per page
    #[arg(long, default_value_t = 10)]
    page_size: u32,

    /// Only active (true) or inactive (false) items
    #[arg(long)]
    active: Option<bool>,
  },

  /// Show full product detail
  Show { id: u64 },

  /// Create a product
  Create {
    #[arg(long)]
    name: String,
    #[arg(long)]
    sku: String,
    #[arg(long)]
    price: i64,
    #[arg(long)]
    unit: String,
    #[arg(long)]
    category: Option<u64>,
    #[arg(long)]
    description: Option<String>,
    /// Product image (jpeg/png), required by the backend
    #[arg(long)]
    image: PathBuf,
    #[arg(long)]
    as_addon: bool,
    #[arg(long)]
    has_variant: bool,
  },

  /// Edit a product
  Edit {
    id: u64,
    #[arg(long)]
    name: String,
    #[arg(long)]
    sku: String,
    #[arg(long)]
    price: i64,
    #[arg(long)]
    unit: String,
    #[arg(long)]
    category: Option<u64>,
    #[arg(long)]
    description: Option<String>,
    /// Replacement image (jpeg/png), optional
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    as_addon: bool,
    #[arg(long)]
    has_variant: bool,
  },

  /// Delete a product
  Delete { id: u64 },

  /// Toggle item status
  Status {
    id: u64,
    #[arg(value_enum)]
    status: StatusArg,
  },

  /// List categories
  Categories,

  /// List add-on groups
  Addons,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusArg {
  On,
  Off,
}

impl From<StatusArg> for ItemStatus {
  fn from(arg: StatusArg) -> Self {
    match arg {
      StatusArg::On => ItemStatus::On,
      StatusArg::Off => ItemStatus::Off,
    }
  }
}

pub async fn run(args: Args) -> Result<()> {
  let config = Config::load(args.config.as_deref())?;
  let api: Arc<dyn CatalogApi> = Arc::new(HttpCatalogClient::new(&config)?);
  let windows = Config::cache_windows();

  match args.command {
    Command::List {
      search,
      page,
      page_size,
      active,
    } => {
      let store = ProductListStore::new(api, windows);
      store.update_filters(FilterUpdate {
        search: Some(search.unwrap_or_default()),
        page_size: Some(page_size),
        active: Some(active),
      });
      store.set_page(page);

      let data = store.fetch().await?;
      print_product_table(&data.items);
      println!(
        "{} active / {} inactive / {} total — page {}/{}",
        data.counts.active,
        data.counts.inactive,
        data.counts.total,
        data.pagination.current_page,
        data.pagination.total_pages
      );
    }

    Command::Show { id } => {
      let store = ProductDetailStore::new(api, windows);
      let detail = store.fetch_detail(id).await?;
      print_detail(&detail);
    }

    Command::Create {
      name,
      sku,
      price,
      unit,
      category,
      description,
      image,
      as_addon,
      has_variant,
    } => {
      let mutations = mutations(api, windows);
      let form = ProductCreateForm {
        name,
        category,
        sku,
        price,
        unit,
        description,
        as_addon,
        has_variant,
        add_ons: Vec::new(),
        image: Some(read_image(&image)?),
      };
      let outcome = mutations.create_product(&form).await?;
      println!("{}: {}", outcome.status, outcome.message);
    }

    Command::Edit {
      id,
      name,
      sku,
      price,
      unit,
      category,
      description,
      image,
      as_addon,
      has_variant,
    } => {
      let mutations = mutations(api, windows);
      let form = ProductEditForm {
        id,
        base: ProductCreateForm {
          name,
          category,
          sku,
          price,
          unit,
          description,
          as_addon,
          has_variant,
          add_ons: Vec::new(),
          image: image.as_deref().map(read_image).transpose()?,
        },
        variant_remake: false,
        variant_clear: false,
        variant_change: false,
      };
      let outcome = mutations.edit_product(&form).await?;
      println!("{}: {}", outcome.status, outcome.message);
    }

    Command::Delete { id } => {
      let mutations = mutations(api, windows);
      let outcome = mutations.delete_product(id).await?;
      println!("{}: {}", outcome.status, outcome.message);
    }

    Command::Status { id, status } => {
      let mutations = mutations(api, windows);
      let status = ItemStatus::from(status);
      let outcome = mutations.change_item_status(id, status).await?;
      println!("{} -> {}: {}", id, status, outcome.message);
    }

    Command::Categories => {
      let store = CategoryStore::new(api, windows);
      let categories = store.fetch().await?;

      let mut table = Table::new();
      table.load_preset(UTF8_FULL);
      table.set_header(vec!["ID", "Name"]);
      for category in &categories {
        table.add_row(vec![category.id.to_string(), category.name.clone()]);
      }
      println!("{}", table);
    }

    Command::Addons => {
      let store = AddOnStore::new(api, windows);
      let add_ons = store.fetch().await?;

      let mut table = Table::new();
      table.load_preset(UTF8_FULL);
      table.set_header(vec!["ID", "Identifier", "Name", "Items", "Status", "Updated"]);
      for add_on in &add_ons {
        table.add_row(vec![
          add_on.id.to_string(),
          add_on.identifier.clone(),
          add_on.name.clone(),
          add_on.add_on_item_count.to_string(),
          active_cell(add_on.is_active),
          format_date(&add_on.updated_at),
        ]);
      }
      println!("{}", table);
    }
  }

  Ok(())
}

/// Build the mutation coordinator with its own list/detail stores.
fn mutations(api: Arc<dyn CatalogApi>, windows: crate::cache::CacheWindows) -> ProductMutations {
  let list = Arc::new(ProductListStore::new(api.clone(), windows));
  let detail = Arc::new(ProductDetailStore::new(api.clone(), windows));
  ProductMutations::new(api, list, detail)
}

fn read_image(path: &Path) -> Result<ImageUpload> {
  let bytes = std::fs::read(path)
    .map_err(|e| eyre!("Failed to read image {}: {}", path.display(), e))?;

  let file_name = path
    .file_name()
    .and_then(|n| n.to_str())
    .unwrap_or("upload")
    .to_string();

  let content_type = match path
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| e.to_ascii_lowercase())
    .as_deref()
  {
    Some("jpg") | Some("jpeg") => "image/jpeg",
    Some("png") => "image/png",
    // Let form validation reject it with the canonical message.
    _ => "application/octet-stream",
  }
  .to_string();

  Ok(ImageUpload {
    file_name,
    content_type,
    bytes,
  })
}

fn print_product_table(items: &[Product]) {
  let mut table = Table::new();
  table.load_preset(UTF8_FULL);
  table.set_header(vec!["ID", "SKU", "Name", "Category", "Price", "Status", "Updated"]);
  for product in items {
    add_product_row(&mut table, product);
    for child in &product.children {
      add_product_row(&mut table, child);
    }
  }
  println!("{}", table);
}

fn add_product_row(table: &mut Table, product: &Product) {
  let name = if product.is_variant {
    format!("  └ {}", product.name)
  } else {
    product.name.clone()
  };

  table.add_row(vec![
    product.id.to_string(),
    product.sku.clone(),
    name,
    product
      .category
      .as_ref()
      .map(|c| c.name.clone())
      .unwrap_or_default(),
    format_price(product.price),
    status_cell(&product.status, product.is_active),
    format_date(&product.updated_at),
  ]);
}

fn print_detail(detail: &ProductDetail) {
  println!("{} ({})", detail.name.bold(), detail.sku);
  if let Some(category) = &detail.category {
    println!("Category:  {}", category.name);
  }
  println!("Price:     {}", format_price(detail.price));
  println!("Unit:      {}", detail.unit);
  println!("Status:    {}", status_cell(&detail.status, detail.is_active));
  println!("Updated:   {}", format_date(&detail.updated_at));
  if let Some(description) = &detail.description {
    println!("\n{}", description);
  }

  if !detail.variants.is_empty() {
    println!("\nVariants:");
    print_product_table(&detail.variants);
  }

  if !detail.add_on_links.is_empty() {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Pos", "Add-on group", "Status"]);
    for link in &detail.add_on_links {
      table.add_row(vec![
        link.position.to_string(),
        link.add_on_group.name.clone(),
        active_cell(link.is_active),
      ]);
    }
    println!("\nAdd-ons:");
    println!("{}", table);
  }
}

/// Color a status label: active reads green, inactive red, anything else
/// passes through unstyled.
fn status_cell(status: &str, is_active: bool) -> String {
  let label = if status.is_empty() {
    if is_active { "Active" } else { "Inactive" }
  } else {
    status
  };

  match label.to_lowercase().as_str() {
    "active" => label.green().to_string(),
    "inactive" => label.red().to_string(),
    _ => label.to_string(),
  }
}

fn active_cell(is_active: bool) -> String {
  if is_active {
    "Active".green().to_string()
  } else {
    "Inactive".red().to_string()
  }
}
