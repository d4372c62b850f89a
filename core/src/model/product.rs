// shopfront/src/model/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supplier-editable product fields. Everything except `brand` and
/// `characteristics` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFields {
  pub name: String,
  pub category: String,
  pub price_cents: i64,
  pub net_weight_grams: i32,
  pub description: String,
  pub characteristics: Option<String>,
  pub stock: i32,
  pub brand: Option<String>,
}

/// Input to `ProductWriter::create_product`.
#[derive(Debug, Clone)]
pub struct NewProduct {
  pub supplier_id: Uuid,
  pub fields: ProductFields,
}

/// Denormalized product view: the product row plus its image references in
/// insertion order. `images` is empty, never absent, for a product without
/// images.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
  pub id: Uuid,
  pub supplier_id: Uuid,
  #[serde(flatten)]
  pub fields: ProductFields,
  pub images: Vec<String>,
  pub created_at: DateTime<Utc>,
}

/// `find_product_by_id` result: the product plus its review aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetail {
  #[serde(flatten)]
  pub product: Product,
  pub avg_rating: Option<f64>,
  pub review_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestSeller {
  #[serde(flatten)]
  pub product: Product,
  pub sales_count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
  /// Rows matched by the ownership-filtered update; 0 means "not found or not yours".
  pub matched: u64,
  pub images_added: usize,
}
