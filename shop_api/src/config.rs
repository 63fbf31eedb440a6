// shop_api/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Orders go to Postgres when set, to memory otherwise.
  pub database_url: Option<String>,
  /// JSON store definition; the built-in demo store is used when unset.
  pub store_fixtures_path: Option<String>,
  pub mail_sender: String,
  pub send_confirmation_emails: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      store_fixtures_path: None,
      mail_sender: "noreply@example.com".to_string(),
      send_confirmation_emails: true,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let defaults = Self::default();
    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = match get_env("SERVER_PORT") {
      Some(raw) => raw
        .parse::<u16>()
        .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT '{}': {}", raw, e)))?,
      None => defaults.server_port,
    };
    let send_confirmation_emails = match get_env("SEND_CONFIRMATION_EMAILS") {
      Some(raw) => raw
        .parse::<bool>()
        .map_err(|e| AppError::Config(format!("Invalid SEND_CONFIRMATION_EMAILS value '{}': {}", raw, e)))?,
      None => defaults.send_confirmation_emails,
    };

    let config = Self {
      server_host,
      server_port,
      database_url: get_env("DATABASE_URL"),
      store_fixtures_path: get_env("STORE_FIXTURES_PATH"),
      mail_sender: get_env("MAIL_SENDER").unwrap_or(defaults.mail_sender),
      send_confirmation_emails,
    };

    tracing::info!(
      host = %config.server_host,
      port = config.server_port,
      postgres = config.database_url.is_some(),
      fixtures = ?config.store_fixtures_path,
      "Application configuration loaded."
    );
    Ok(config)
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
