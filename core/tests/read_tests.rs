// tests/read_tests.rs
mod common;
use common::*;
use shopfront::{CatalogReader, MemoryCatalog, NewProduct, Product, ProductWriter};
use std::sync::Arc;
use uuid::Uuid;

struct Fixture {
  writer: ProductWriter<MemoryCatalog>,
  catalog: MemoryCatalog,
  files: Arc<RecordingFileStore>,
}

impl Fixture {
  fn new() -> Self {
    setup_tracing();
    let catalog = MemoryCatalog::new();
    let files = Arc::new(RecordingFileStore::new());
    Self {
      writer: ProductWriter::new(catalog.clone(), files.clone()),
      catalog,
      files,
    }
  }

  async fn add(&self, supplier_id: Uuid, name: &str, stock: i32, images: usize) -> Product {
    let uploads = self.files.upload(images).await;
    let new_product = NewProduct {
      supplier_id,
      fields: sample_fields(name, stock),
    };
    self.writer.create_product(new_product, &uploads).await.unwrap()
  }
}

fn names(products: &[Product]) -> Vec<&str> {
  products.iter().map(|p| p.fields.name.as_str()).collect()
}

#[tokio::test]
async fn supplier_listing_is_newest_first_and_scoped_to_supplier() {
  let fx = Fixture::new();
  let supplier = Uuid::new_v4();
  fx.add(supplier, "First", 1, 0).await;
  fx.add(Uuid::new_v4(), "Someone else", 1, 0).await;
  fx.add(supplier, "Second", 0, 1).await;

  let products = fx.catalog.find_products_by_supplier(supplier, None).await.unwrap();

  assert_eq!(names(&products), vec!["Second", "First"]);
  assert_eq!(products[0].images.len(), 1);
  assert!(products[1].images.is_empty());
}

#[tokio::test]
async fn supplier_search_is_case_insensitive_substring() {
  let fx = Fixture::new();
  let supplier = Uuid::new_v4();
  fx.add(supplier, "Ethiopia Guji", 1, 0).await;
  fx.add(supplier, "Colombia Huila", 1, 0).await;
  fx.add(supplier, "GUJI Natural", 1, 0).await;

  let found = fx.catalog.find_products_by_supplier(supplier, Some("guji")).await.unwrap();
  assert_eq!(names(&found), vec!["GUJI Natural", "Ethiopia Guji"]);

  let blank = fx.catalog.find_products_by_supplier(supplier, Some("  ")).await.unwrap();
  assert_eq!(blank.len(), 3);
}

#[tokio::test]
async fn public_listing_hides_products_without_stock() {
  let fx = Fixture::new();
  fx.add(Uuid::new_v4(), "In stock", 3, 0).await;
  fx.add(Uuid::new_v4(), "Sold out", 0, 0).await;

  let products = fx.catalog.find_all_public_products().await.unwrap();
  assert_eq!(names(&products), vec!["In stock"]);
}

#[tokio::test]
async fn product_detail_aggregates_reviews_and_keeps_image_order() {
  let fx = Fixture::new();
  let product = fx.add(Uuid::new_v4(), "Reviewed", 2, 2).await;
  fx.catalog.record_review(product.id, 4);
  fx.catalog.record_review(product.id, 5);

  let detail = fx.catalog.find_product_by_id(product.id).await.unwrap().unwrap();

  assert_eq!(detail.review_count, 2);
  assert_eq!(detail.avg_rating, Some(4.5));
  assert_eq!(detail.product.images, product.images);
}

#[tokio::test]
async fn product_detail_without_reviews_or_images() {
  let fx = Fixture::new();
  let product = fx.add(Uuid::new_v4(), "Plain", 2, 0).await;

  let detail = fx.catalog.find_product_by_id(product.id).await.unwrap().unwrap();

  assert_eq!(detail.review_count, 0);
  assert_eq!(detail.avg_rating, None);
  assert!(detail.product.images.is_empty());
}

#[tokio::test]
async fn missing_product_is_none_not_error() {
  let fx = Fixture::new();
  assert!(fx.catalog.find_product_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn best_sellers_rank_by_sales_and_exclude_unsold() {
  let fx = Fixture::new();
  let supplier = Uuid::new_v4();
  for (name, sales) in [("a", 10), ("b", 0), ("c", 7), ("d", 7), ("e", 2)] {
    let product = fx.add(supplier, name, 5, 0).await;
    for _ in 0..sales {
      fx.catalog.record_sale(product.id);
    }
  }

  let top = fx.catalog.find_best_sellers(3).await.unwrap();

  let counts: Vec<i64> = top.iter().map(|b| b.sales_count).collect();
  assert_eq!(counts, vec![10, 7, 7]);
  assert_eq!(top[0].product.fields.name, "a");

  let all = fx.catalog.find_best_sellers(10).await.unwrap();
  assert_eq!(all.len(), 4);
  assert!(all.iter().all(|b| b.product.fields.name != "b"));
}

#[tokio::test]
async fn product_serializes_flat_with_images_array() {
  let fx = Fixture::new();
  let product = fx.add(Uuid::new_v4(), "Json", 1, 0).await;

  let value = serde_json::to_value(&product).unwrap();

  assert_eq!(value["name"], "Json");
  assert_eq!(value["price_cents"], 1_250);
  assert_eq!(value["images"], serde_json::json!([]));
  assert!(value.get("fields").is_none());
}
