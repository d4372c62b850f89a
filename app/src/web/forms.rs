// shopfront_app/src/web/forms.rs

//! Text fields of a product submission, parsed into `ProductFields`.

use crate::errors::{AppError, Result};
use shopfront::ProductFields;
use std::collections::HashMap;
use std::str::FromStr;

fn required<'a>(form: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
  form
    .get(name)
    .map(|v| v.trim())
    .filter(|v| !v.is_empty())
    .ok_or_else(|| AppError::Validation(format!("Field '{}' is required", name)))
}

fn optional(form: &HashMap<String, String>, name: &str) -> Option<String> {
  form
    .get(name)
    .map(|v| v.trim())
    .filter(|v| !v.is_empty())
    .map(str::to_string)
}

fn non_negative<T>(form: &HashMap<String, String>, name: &str) -> Result<T>
where
  T: FromStr + PartialOrd + Default,
{
  let value = required(form, name)?
    .parse::<T>()
    .map_err(|_| AppError::Validation(format!("Field '{}' must be a whole number", name)))?;
  if value < T::default() {
    return Err(AppError::Validation(format!("Field '{}' must not be negative", name)));
  }
  Ok(value)
}

pub fn parse_product_fields(form: &HashMap<String, String>) -> Result<ProductFields> {
  Ok(ProductFields {
    name: required(form, "name")?.to_string(),
    category: required(form, "category")?.to_string(),
    price_cents: non_negative(form, "price_cents")?,
    net_weight_grams: non_negative(form, "net_weight_grams")?,
    description: required(form, "description")?.to_string(),
    characteristics: optional(form, "characteristics"),
    stock: non_negative(form, "stock")?,
    brand: optional(form, "brand"),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
  }

  fn complete() -> HashMap<String, String> {
    form(&[
      ("name", " Huila "),
      ("category", "coffee"),
      ("price_cents", "1299"),
      ("net_weight_grams", "340"),
      ("description", "Washed"),
      ("stock", "12"),
      ("brand", ""),
    ])
  }

  #[test]
  fn parses_complete_form_and_blanks_optional_fields() {
    let fields = parse_product_fields(&complete()).unwrap();
    assert_eq!(fields.name, "Huila");
    assert_eq!(fields.price_cents, 1299);
    assert_eq!(fields.net_weight_grams, 340);
    assert_eq!(fields.stock, 12);
    assert_eq!(fields.brand, None);
    assert_eq!(fields.characteristics, None);
  }

  #[test]
  fn missing_required_field_is_rejected() {
    let mut f = complete();
    f.remove("category");
    let err = parse_product_fields(&f).unwrap_err();
    assert!(matches!(err, AppError::Validation(m) if m.contains("category")));
  }

  #[test]
  fn negative_or_non_numeric_stock_is_rejected() {
    let mut f = complete();
    f.insert("stock".into(), "-1".into());
    assert!(parse_product_fields(&f).is_err());
    f.insert("stock".into(), "lots".into());
    assert!(parse_product_fields(&f).is_err());
  }
}
