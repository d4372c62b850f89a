// shopfront/src/model/mod.rs

//! Catalog data structures shared by the writer, the read layer and the stores.

pub mod product;

pub use product::{BestSeller, NewProduct, Product, ProductDetail, ProductFields, UpdateOutcome};
