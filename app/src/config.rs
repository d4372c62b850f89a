// shopfront_app/src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

/// Local frontend dev server, always allowed.
pub const DEV_FRONTEND_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone)] // Clone is useful if parts of config are passed around
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,

  // Public base URL that image references are built from
  pub backend_url: String,
  pub uploads_dir: PathBuf,

  // Apply bundled schema migrations on startup
  pub run_migrations: bool,

  // Browser origins allowed by CORS
  pub allowed_origins: Vec<String>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from any variable source.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get_env = |var_name: &str| {
      lookup(var_name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "5000".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = get_env("DATABASE_MAX_CONNECTIONS")
      .unwrap_or_else(|_| "10".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;
    let backend_url = get_env("BACKEND_URL").unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));
    let uploads_dir = PathBuf::from(get_env("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()));

    let run_migrations = get_env("RUN_MIGRATIONS")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;

    let mut allowed_origins = vec![DEV_FRONTEND_ORIGIN.to_string()];
    let listed = get_env("FRONTEND_URL")
      .into_iter()
      .chain(get_env("ALLOWED_ORIGINS"))
      .collect::<Vec<_>>()
      .join(",");
    for origin in listed.split(',').map(str::trim).filter(|o| !o.is_empty()) {
      let origin = parse_origin(origin)?;
      if !allowed_origins.contains(&origin) {
        allowed_origins.push(origin);
      }
    }

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      backend_url,
      uploads_dir,
      run_migrations,
      allowed_origins,
    })
  }
}

/// An origin is `scheme://host[:port]`, compared without a trailing slash.
fn parse_origin(raw: &str) -> Result<String> {
  let origin = raw.trim_end_matches('/');
  let host = origin
    .strip_prefix("https://")
    .or_else(|| origin.strip_prefix("http://"))
    .ok_or_else(|| AppError::Config(format!("Invalid allowed origin '{}': expected http(s)://host", raw)))?;
  if host.is_empty() || host.contains('/') || host.contains('*') {
    return Err(AppError::Config(format!("Invalid allowed origin '{}'", raw)));
  }
  Ok(origin.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| map.get(name).cloned()
  }

  #[test]
  fn defaults_apply_when_only_database_url_is_set() {
    let config = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/shop")])).unwrap();
    assert_eq!(config.server_host, "127.0.0.1");
    assert_eq!(config.server_port, 5000);
    assert_eq!(config.database_max_connections, 10);
    assert_eq!(config.backend_url, "http://127.0.0.1:5000");
    assert_eq!(config.uploads_dir, PathBuf::from("uploads"));
    assert!(!config.run_migrations);
    assert_eq!(config.allowed_origins, vec![DEV_FRONTEND_ORIGIN.to_string()]);
  }

  #[test]
  fn frontend_url_and_allowed_origins_extend_the_allowlist() {
    let config = AppConfig::from_lookup(lookup(&[
      ("DATABASE_URL", "postgres://x"),
      ("FRONTEND_URL", "https://shop.example/"),
      ("ALLOWED_ORIGINS", "https://admin.shop.example, http://localhost:5173,,https://shop.example"),
    ]))
    .unwrap();
    assert_eq!(
      config.allowed_origins,
      vec![
        "http://localhost:5173".to_string(),
        "https://shop.example".to_string(),
        "https://admin.shop.example".to_string(),
      ]
    );
  }

  #[test]
  fn malformed_origins_are_rejected() {
    for bad in ["*", "shop.example", "https://shop.example/app", "https://"] {
      let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("ALLOWED_ORIGINS", bad)])).unwrap_err();
      assert!(matches!(err, AppError::Config(m) if m.contains("origin")), "{}", bad);
    }
  }

  #[test]
  fn missing_database_url_is_a_config_error() {
    let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("DATABASE_URL")));
  }

  #[test]
  fn invalid_values_are_rejected() {
    let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("SERVER_PORT", "http")])).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("SERVER_PORT")));
    let err =
      AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("RUN_MIGRATIONS", "sometimes")])).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("RUN_MIGRATIONS")));
  }

  #[test]
  fn explicit_backend_url_wins() {
    let config = AppConfig::from_lookup(lookup(&[
      ("DATABASE_URL", "postgres://x"),
      ("BACKEND_URL", "https://shop.example"),
      ("UPLOADS_DIR", "/var/shop/uploads"),
      ("RUN_MIGRATIONS", "true"),
    ]))
    .unwrap();
    assert_eq!(config.backend_url, "https://shop.example");
    assert_eq!(config.uploads_dir, PathBuf::from("/var/shop/uploads"));
    assert!(config.run_migrations);
  }
}
