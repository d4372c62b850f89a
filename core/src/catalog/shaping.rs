// shopfront/src/catalog/shaping.rs

//! Turns aggregated database rows into `Product` views.

/// Separator used when image references are aggregated into one column.
/// Stored file names never contain it.
pub const IMAGE_SEPARATOR: char = ',';

/// Splits an aggregated image column into ordered references. `None` or an
/// empty aggregate yields an empty list.
pub fn split_image_urls(aggregated: Option<&str>) -> Vec<String> {
  match aggregated {
    Some(joined) if !joined.is_empty() => joined
      .split(IMAGE_SEPARATOR)
      .filter(|s| !s.is_empty())
      .map(str::to_string)
      .collect(),
    _ => Vec::new(),
  }
}

/// Escapes `LIKE` metacharacters so `term` matches literally.
pub fn escape_like(term: &str) -> String {
  let mut escaped = String::with_capacity(term.len());
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn splits_aggregate_in_order() {
    assert_eq!(split_image_urls(Some("a.jpg,b.jpg")), vec!["a.jpg", "b.jpg"]);
    assert_eq!(split_image_urls(Some("only.png")), vec!["only.png"]);
  }

  #[test]
  fn no_images_is_empty_not_null() {
    assert!(split_image_urls(None).is_empty());
    assert!(split_image_urls(Some("")).is_empty());
  }

  #[test]
  fn escape_like_escapes_wildcards() {
    assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    assert_eq!(escape_like("latte"), "latte");
  }
}
