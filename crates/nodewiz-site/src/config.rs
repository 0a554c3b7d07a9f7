//! Site configuration.
//!
//! Sources are layered, later ones winning:
//!
//! 1. `config.toml` (optional; path from `--config`)
//! 2. `.env` (optional; `KEY=VALUE` lines, as written by `nodewiz-setup`)
//! 3. the process environment, without a prefix (`DEBUG`, `SECRET_KEY`, …)
//!
//! Keys are matched case-insensitively, so `SECRET_KEY` in the environment
//! and `secret_key` in `config.toml` name the same setting.

use std::{
  fs,
  path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

/// Secret keys with this prefix are development placeholders.
pub const INSECURE_KEY_PREFIX: &str = "insecure-";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error(transparent)]
  Load(#[from] config::ConfigError),

  #[error("SECRET_KEY must be set to a real key when DEBUG is off")]
  InsecureSecretKey,

  #[error("unsupported DATABASE_URL {0:?}; expected sqlite://<path> or a file path")]
  DatabaseUrl(String),

  #[error("EMAIL_HOST must be set when EMAIL_BACKEND=smtp")]
  MissingEmailHost,
}

/// Where outbound notification mail goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailBackendKind {
  /// Write messages to the log instead of sending them.
  Console,
  Smtp,
  Disabled,
}

/// Resolved `DATABASE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
  Memory,
  File(PathBuf),
}

/// Runtime configuration for the site server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
  pub host:                           String,
  pub port:                           u16,
  /// Absolute base URL used in the sitemap and robots.txt.
  pub site_url:                       String,
  pub debug:                          bool,
  pub secret_key:                     String,
  /// Comma-separated host patterns; see [`crate::security`].
  pub allowed_hosts:                  String,
  pub database_url:                   String,
  pub static_dir:                     PathBuf,

  pub email_backend:                  EmailBackendKind,
  pub email_host:                     String,
  pub email_port:                     u16,
  pub email_use_tls:                  bool,
  pub email_host_user:                String,
  pub email_host_password:            String,
  pub default_from_email:             String,
  pub contact_notify_email:           String,

  pub secure_ssl_redirect:            bool,
  pub secure_hsts_seconds:            u64,
  pub secure_hsts_include_subdomains: bool,
  pub secure_hsts_preload:            bool,

  pub admin_username:                 String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub admin_password_hash:            String,
}

impl Default for SiteConfig {
  fn default() -> Self {
    Self {
      host:                           "127.0.0.1".to_string(),
      port:                           8000,
      site_url:                       "http://localhost:8000".to_string(),
      debug:                          false,
      secret_key:                     String::new(),
      allowed_hosts:                  String::new(),
      database_url:                   "sqlite://nodewiz.sqlite3".to_string(),
      static_dir:                     PathBuf::from("static"),
      email_backend:                  EmailBackendKind::Console,
      email_host:                     "localhost".to_string(),
      email_port:                     25,
      email_use_tls:                  false,
      email_host_user:                String::new(),
      email_host_password:            String::new(),
      default_from_email:             "noreply@nodewiz.ai".to_string(),
      contact_notify_email:           "contact@nodewiz.ai".to_string(),
      secure_ssl_redirect:            false,
      secure_hsts_seconds:            0,
      secure_hsts_include_subdomains: false,
      secure_hsts_preload:            false,
      admin_username:                 String::new(),
      admin_password_hash:            String::new(),
    }
  }
}

impl SiteConfig {
  /// Load configuration from `config_path`, `env_file` and the environment.
  /// Missing files are skipped.
  pub fn load(config_path: &Path, env_file: &Path) -> Result<Self, ConfigError> {
    let settings = config::Config::builder()
      .add_source(config::File::from(config_path).required(false))
      .add_source(DotEnv::new(env_file))
      .add_source(config::Environment::default())
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  /// Reject configurations that must never serve traffic.
  pub fn check(&self) -> Result<(), ConfigError> {
    if !self.debug && self.has_insecure_secret_key() {
      return Err(ConfigError::InsecureSecretKey);
    }
    if self.email_backend == EmailBackendKind::Smtp && self.email_host.trim().is_empty() {
      return Err(ConfigError::MissingEmailHost);
    }
    self.database()?;
    Ok(())
  }

  /// Log warnings about settings that are tolerated only in development.
  pub fn warn_if_insecure(&self) {
    if self.debug {
      tracing::warn!("DEBUG is on. Do not run this configuration in production.");
      if self.has_insecure_secret_key() {
        tracing::warn!("SECRET_KEY is empty or a placeholder; generate one with `generate-secret-key`.");
      }
    }
    if self.allowed_hosts.split(',').any(|h| h.trim() == "*") {
      tracing::warn!("ALLOWED_HOSTS contains '*': any Host header will be accepted.");
    }
    if self.admin_username.is_empty() || self.admin_password_hash.is_empty() {
      tracing::info!("admin credentials not configured; /admin/ will reject every login");
    }
  }

  pub fn has_insecure_secret_key(&self) -> bool {
    let key = self.secret_key.trim();
    key.is_empty() || key.starts_with(INSECURE_KEY_PREFIX)
  }

  /// Parsed `ALLOWED_HOSTS`, lowercased, blanks dropped.
  pub fn allowed_hosts(&self) -> Vec<String> {
    self
      .allowed_hosts
      .split(',')
      .map(|h| h.trim().to_ascii_lowercase())
      .filter(|h| !h.is_empty())
      .collect()
  }

  /// Resolve `DATABASE_URL` to a store location.
  pub fn database(&self) -> Result<DatabaseLocation, ConfigError> {
    let url = self.database_url.trim();
    if matches!(url, ":memory:" | "sqlite::memory:" | "sqlite://:memory:") {
      return Ok(DatabaseLocation::Memory);
    }
    let path = match url.split_once("://") {
      Some(("sqlite", path)) => path,
      Some(_) => return Err(ConfigError::DatabaseUrl(url.to_owned())),
      None => url,
    };
    if path.is_empty() {
      return Err(ConfigError::DatabaseUrl(url.to_owned()));
    }
    Ok(DatabaseLocation::File(expand_tilde(Path::new(path))))
  }

  /// `Strict-Transport-Security` value, if HSTS is enabled.
  pub fn hsts_header(&self) -> Option<String> {
    if self.secure_hsts_seconds == 0 {
      return None;
    }
    let mut value = format!("max-age={}", self.secure_hsts_seconds);
    if self.secure_hsts_include_subdomains {
      value.push_str("; includeSubDomains");
    }
    if self.secure_hsts_preload {
      value.push_str("; preload");
    }
    Some(value)
  }

  /// Base URL without a trailing slash.
  pub fn site_url(&self) -> &str { self.site_url.trim_end_matches('/') }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── .env source ─────────────────────────────────────────────────────────────

/// A `config` source reading `KEY=VALUE` lines from a dotenv-style file.
///
/// Blank lines and `#` comments are ignored, an optional `export ` prefix is
/// stripped, and matching single or double quotes around a value are removed.
#[derive(Debug, Clone)]
pub struct DotEnv {
  path: PathBuf,
}

impl DotEnv {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  /// Parse dotenv text into `(lowercased key, value)` pairs.
  pub fn parse(text: &str) -> Vec<(String, String)> {
    text
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty() && !line.starts_with('#'))
      .filter_map(|line| {
        let line = line.strip_prefix("export ").unwrap_or(line);
        let (key, value) = line.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
          return None;
        }
        Some((key.to_ascii_lowercase(), unquote(value.trim()).to_owned()))
      })
      .collect()
  }
}

fn unquote(value: &str) -> &str {
  for q in ['"', '\''] {
    if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
      return &value[1..value.len() - 1];
    }
  }
  value
}

impl config::Source for DotEnv {
  fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> { Box::new(self.clone()) }

  fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
    let text = match fs::read_to_string(&self.path) {
      Ok(text) => text,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(config::Map::new()),
      Err(e) => return Err(config::ConfigError::Foreign(Box::new(e))),
    };
    let origin = self.path.display().to_string();
    Ok(
      Self::parse(&text)
        .into_iter()
        .map(|(k, v)| (k, config::Value::new(Some(&origin), v)))
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn from_dotenv(text: &str) -> SiteConfig {
    let mut builder = config::Config::builder();
    for (k, v) in DotEnv::parse(text) {
      builder = builder.set_override(k, v).unwrap();
    }
    builder.build().unwrap().try_deserialize().unwrap()
  }

  #[test]
  fn dotenv_parsing() {
    let pairs = DotEnv::parse(
      "# comment\n\nDEBUG=True\nexport SECRET_KEY='abc=def'\nEMPTY=\n=nokey\nnot a pair\n",
    );
    assert_eq!(
      pairs,
      vec![
        ("debug".to_string(), "True".to_string()),
        ("secret_key".to_string(), "abc=def".to_string()),
        ("empty".to_string(), String::new()),
      ]
    );
  }

  #[test]
  fn dotenv_values_deserialize_into_typed_fields() {
    let cfg = from_dotenv(
      "DEBUG=True\nPORT=9000\nEMAIL_BACKEND=smtp\nEMAIL_USE_TLS=True\nSECURE_HSTS_SECONDS=3600\n",
    );
    assert!(cfg.debug);
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.email_backend, EmailBackendKind::Smtp);
    assert!(cfg.email_use_tls);
    assert_eq!(cfg.secure_hsts_seconds, 3600);
    assert_eq!(cfg.default_from_email, "noreply@nodewiz.ai");
  }

  #[test]
  fn missing_files_yield_defaults() {
    let dir = std::env::temp_dir().join("nodewiz-config-missing");
    let cfg = SiteConfig::load(&dir.join("nope.toml"), &dir.join(".env-nope")).unwrap();
    assert_eq!(cfg.contact_notify_email, "contact@nodewiz.ai");
  }

  #[test]
  fn secret_key_is_required_outside_debug() {
    let mut cfg = SiteConfig::default();
    assert!(matches!(cfg.check(), Err(ConfigError::InsecureSecretKey)));

    cfg.secret_key = "insecure-change-me".into();
    assert!(matches!(cfg.check(), Err(ConfigError::InsecureSecretKey)));

    cfg.debug = true;
    assert!(cfg.check().is_ok());

    cfg.debug = false;
    cfg.secret_key = "k3y-with-real-entropy".into();
    assert!(cfg.check().is_ok());
  }

  #[test]
  fn database_url_forms() {
    let mut cfg = SiteConfig::default();
    assert_eq!(cfg.database().unwrap(), DatabaseLocation::File("nodewiz.sqlite3".into()));

    cfg.database_url = "sqlite::memory:".into();
    assert_eq!(cfg.database().unwrap(), DatabaseLocation::Memory);

    cfg.database_url = "/var/lib/nodewiz/site.db".into();
    assert_eq!(
      cfg.database().unwrap(),
      DatabaseLocation::File("/var/lib/nodewiz/site.db".into())
    );

    cfg.database_url = "postgres://user@localhost/db".into();
    assert!(matches!(cfg.database(), Err(ConfigError::DatabaseUrl(_))));
  }

  #[test]
  fn hsts_header_flags() {
    let mut cfg = SiteConfig::default();
    assert_eq!(cfg.hsts_header(), None);

    cfg.secure_hsts_seconds = 31_536_000;
    cfg.secure_hsts_include_subdomains = true;
    cfg.secure_hsts_preload = true;
    assert_eq!(
      cfg.hsts_header().as_deref(),
      Some("max-age=31536000; includeSubDomains; preload")
    );
  }

  #[test]
  fn allowed_hosts_are_normalised() {
    let cfg = SiteConfig {
      allowed_hosts: " NodeWiz.ai, .nodewiz.ai ,,".into(),
      ..SiteConfig::default()
    };
    assert_eq!(cfg.allowed_hosts(), vec!["nodewiz.ai", ".nodewiz.ai"]);
  }
}
