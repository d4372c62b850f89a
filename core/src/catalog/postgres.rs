// shopfront/src/catalog/postgres.rs

use super::shaping::{escape_like, split_image_urls};
use super::{CatalogReader, CatalogStore, CatalogTx};
use crate::error::{CatalogError, CatalogResult};
use crate::model::{BestSeller, Product, ProductDetail, ProductFields};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Product columns plus the image aggregate, for queries over `products p`.
/// Images are aggregated in a subquery so joins elsewhere in the query cannot
/// duplicate them.
const PRODUCT_COLUMNS: &str = "p.id, p.supplier_id, p.name, p.category, p.price_cents, p.net_weight_grams, \
   p.description, p.characteristics, p.stock, p.brand, p.created_at, \
   (SELECT string_agg(pi.image_url, ',' ORDER BY pi.id) FROM product_images pi WHERE pi.product_id = p.id) AS images";

#[derive(Debug, FromRow)]
struct ProductRow {
  id: Uuid,
  supplier_id: Uuid,
  name: String,
  category: String,
  price_cents: i64,
  net_weight_grams: i32,
  description: String,
  characteristics: Option<String>,
  stock: i32,
  brand: Option<String>,
  created_at: DateTime<Utc>,
  images: Option<String>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      supplier_id: row.supplier_id,
      fields: ProductFields {
        name: row.name,
        category: row.category,
        price_cents: row.price_cents,
        net_weight_grams: row.net_weight_grams,
        description: row.description,
        characteristics: row.characteristics,
        stock: row.stock,
        brand: row.brand,
      },
      images: split_image_urls(row.images.as_deref()),
      created_at: row.created_at,
    }
  }
}

#[derive(Debug, FromRow)]
struct ProductDetailRow {
  #[sqlx(flatten)]
  product: ProductRow,
  avg_rating: Option<f64>,
  review_count: i64,
}

#[derive(Debug, FromRow)]
struct BestSellerRow {
  #[sqlx(flatten)]
  product: ProductRow,
  sales_count: i64,
}

/// PostgreSQL-backed catalog. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct PgCatalog {
  pool: PgPool,
}

impl PgCatalog {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  /// Applies the schema migrations bundled with this crate.
  pub async fn migrate(&self) -> CatalogResult<()> {
    sqlx::migrate!("./migrations")
      .run(&self.pool)
      .await
      .map_err(sqlx::Error::from)?;
    info!("Catalog migrations applied.");
    Ok(())
  }
}

pub struct PgCatalogTx {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CatalogStore for PgCatalog {
  type Tx = PgCatalogTx;

  async fn begin(&self) -> CatalogResult<PgCatalogTx> {
    Ok(PgCatalogTx {
      tx: self.pool.begin().await?,
    })
  }
}

#[async_trait]
impl CatalogTx for PgCatalogTx {
  async fn insert_product(&mut self, product: &Product) -> CatalogResult<()> {
    let f = &product.fields;
    sqlx::query(
      "INSERT INTO products \
         (id, supplier_id, name, category, price_cents, net_weight_grams, description, characteristics, stock, brand, created_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(product.id)
    .bind(product.supplier_id)
    .bind(&f.name)
    .bind(&f.category)
    .bind(f.price_cents)
    .bind(f.net_weight_grams)
    .bind(&f.description)
    .bind(&f.characteristics)
    .bind(f.stock)
    .bind(&f.brand)
    .bind(product.created_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn insert_images(&mut self, product_id: Uuid, references: &[String]) -> CatalogResult<u64> {
    if references.is_empty() {
      return Ok(0);
    }
    let result = sqlx::query(
      "INSERT INTO product_images (product_id, image_url) \
       SELECT $1, t.url FROM UNNEST($2::text[]) WITH ORDINALITY AS t(url, ord) ORDER BY t.ord",
    )
    .bind(product_id)
    .bind(references.to_vec())
    .execute(&mut *self.tx)
    .await?;
    debug!(%product_id, rows = result.rows_affected(), "Inserted product images.");
    Ok(result.rows_affected())
  }

  async fn update_product(
    &mut self,
    product_id: Uuid,
    supplier_id: Uuid,
    fields: &ProductFields,
  ) -> CatalogResult<u64> {
    let result = sqlx::query(
      "UPDATE products SET name = $1, category = $2, price_cents = $3, net_weight_grams = $4, \
         description = $5, characteristics = $6, stock = $7, brand = $8 \
       WHERE id = $9 AND supplier_id = $10",
    )
    .bind(&fields.name)
    .bind(&fields.category)
    .bind(fields.price_cents)
    .bind(fields.net_weight_grams)
    .bind(&fields.description)
    .bind(&fields.characteristics)
    .bind(fields.stock)
    .bind(&fields.brand)
    .bind(product_id)
    .bind(supplier_id)
    .execute(&mut *self.tx)
    .await?;
    Ok(result.rows_affected())
  }

  async fn owned_image_references(&mut self, product_id: Uuid, supplier_id: Uuid) -> CatalogResult<Vec<String>> {
    let references: Vec<String> = sqlx::query_scalar(
      "SELECT pi.image_url FROM product_images pi \
       JOIN products p ON p.id = pi.product_id \
       WHERE p.id = $1 AND p.supplier_id = $2 \
       ORDER BY pi.id",
    )
    .bind(product_id)
    .bind(supplier_id)
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(references)
  }

  async fn delete_product(&mut self, product_id: Uuid, supplier_id: Uuid) -> CatalogResult<u64> {
    sqlx::query(
      "DELETE FROM product_images \
       WHERE product_id IN (SELECT id FROM products WHERE id = $1 AND supplier_id = $2)",
    )
    .bind(product_id)
    .bind(supplier_id)
    .execute(&mut *self.tx)
    .await?;
    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND supplier_id = $2")
      .bind(product_id)
      .bind(supplier_id)
      .execute(&mut *self.tx)
      .await
      .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
          CatalogError::StillReferenced(format!("product {} has order items", product_id))
        }
        other => CatalogError::Database(other),
      })?;
    Ok(result.rows_affected())
  }

  async fn commit(self) -> CatalogResult<()> {
    self.tx.commit().await?;
    Ok(())
  }

  async fn rollback(self) -> CatalogResult<()> {
    self.tx.rollback().await?;
    Ok(())
  }
}

#[async_trait]
impl CatalogReader for PgCatalog {
  #[instrument(name = "PgCatalog::find_products_by_supplier", skip(self), err(Display))]
  async fn find_products_by_supplier(&self, supplier_id: Uuid, search: Option<&str>) -> CatalogResult<Vec<Product>> {
    let pattern = search.map(str::trim).filter(|s| !s.is_empty()).map(escape_like);
    let sql = format!(
      "SELECT {PRODUCT_COLUMNS} FROM products p \
       WHERE p.supplier_id = $1 AND ($2::text IS NULL OR p.name ILIKE '%' || $2 || '%') \
       ORDER BY p.created_at DESC"
    );
    let rows: Vec<ProductRow> = sqlx::query_as(&sql)
      .bind(supplier_id)
      .bind(pattern)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  #[instrument(name = "PgCatalog::find_all_public_products", skip(self), err(Display))]
  async fn find_all_public_products(&self) -> CatalogResult<Vec<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.stock > 0 ORDER BY p.created_at DESC");
    let rows: Vec<ProductRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  #[instrument(name = "PgCatalog::find_product_by_id", skip(self), err(Display))]
  async fn find_product_by_id(&self, product_id: Uuid) -> CatalogResult<Option<ProductDetail>> {
    let sql = format!(
      "SELECT {PRODUCT_COLUMNS}, \
         (SELECT AVG(r.rating)::float8 FROM reviews r WHERE r.product_id = p.id) AS avg_rating, \
         (SELECT COUNT(*) FROM reviews r WHERE r.product_id = p.id) AS review_count \
       FROM products p WHERE p.id = $1"
    );
    let row: Option<ProductDetailRow> = sqlx::query_as(&sql).bind(product_id).fetch_optional(&self.pool).await?;
    Ok(row.map(|r| ProductDetail {
      product: r.product.into(),
      avg_rating: r.avg_rating,
      review_count: r.review_count,
    }))
  }

  #[instrument(name = "PgCatalog::find_best_sellers", skip(self), err(Display))]
  async fn find_best_sellers(&self, limit: u32) -> CatalogResult<Vec<BestSeller>> {
    let sql = format!(
      "SELECT {PRODUCT_COLUMNS}, s.sales_count \
       FROM products p \
       JOIN (SELECT oi.product_id, COUNT(*) AS sales_count FROM order_items oi GROUP BY oi.product_id) s \
         ON s.product_id = p.id \
       WHERE p.stock > 0 \
       ORDER BY s.sales_count DESC, p.created_at DESC \
       LIMIT $1"
    );
    let rows: Vec<BestSellerRow> = sqlx::query_as(&sql).bind(i64::from(limit)).fetch_all(&self.pool).await?;
    Ok(
      rows
        .into_iter()
        .map(|r| BestSeller {
          product: r.product.into(),
          sales_count: r.sales_count,
        })
        .collect(),
    )
  }
}
