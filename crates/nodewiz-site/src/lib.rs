//! HTTP layer for the NodeWiz marketing site.
//!
//! Exposes an axum [`Router`] serving the public pages, the contact form, the
//! testimonials listing and the admin pages, backed by any [`SiteStore`] and
//! any [`Mailer`].

pub mod auth;
pub mod config;
pub mod cookies;
pub mod csrf;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod security;
pub mod templates;

pub use error::Error;

use std::sync::Arc;

use axum::{
  Router,
  http::{HeaderValue, header},
  middleware,
  routing::get,
};
use nodewiz_core::store::SiteStore;
use nodewiz_store_sqlite::SqliteStore;
use tower_http::{
  services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use auth::AdminCredentials;
use config::{DatabaseLocation, SiteConfig};
use handlers::{admin, contact, pages, seo, testimonials};
use mail::{MailBackend, Mailer};
use security::SecurityPolicy;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, M = MailBackend> {
  pub store:  Arc<S>,
  pub mailer: Arc<M>,
  pub config: Arc<SiteConfig>,
  pub admin:  Arc<AdminCredentials>,
}

impl<S, M> AppState<S, M> {
  pub fn new(store: S, mailer: M, config: SiteConfig) -> Self {
    let admin = AdminCredentials {
      username:      config.admin_username.clone(),
      password_hash: config.admin_password_hash.clone(),
    };
    Self {
      store:  Arc::new(store),
      mailer: Arc::new(mailer),
      config: Arc::new(config),
      admin:  Arc::new(admin),
    }
  }
}

impl<S, M> Clone for AppState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      mailer: Arc::clone(&self.mailer),
      config: Arc::clone(&self.config),
      admin:  Arc::clone(&self.admin),
    }
  }
}

/// Open (and migrate) the SQLite store named by `DATABASE_URL`.
pub async fn open_store(location: &DatabaseLocation) -> nodewiz_store_sqlite::Result<SqliteStore> {
  match location {
    DatabaseLocation::Memory => SqliteStore::open_in_memory().await,
    DatabaseLocation::File(path) => SqliteStore::open(path).await,
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the site's axum [`Router`].
pub fn router<S, M>(state: AppState<S, M>) -> Router
where
  S: SiteStore + 'static,
  M: Mailer + 'static,
{
  let policy = Arc::new(SecurityPolicy::from_config(&state.config));
  let static_files = ServeDir::new(&state.config.static_dir);

  Router::new()
    .route("/",              get(pages::home))
    .route("/services/",     get(pages::services))
    .route("/use-cases/",    get(pages::use_cases))
    .route("/about/",        get(pages::about))
    .route("/contact/",      get(contact::show::<S, M>).post(contact::submit::<S, M>))
    .route("/testimonials/", get(testimonials::list::<S, M>))
    .route("/sitemap.xml",   get(seo::sitemap::<S, M>))
    .route("/robots.txt",    get(seo::robots::<S, M>))
    .merge(admin::routes::<S, M>())
    .nest_service("/static", static_files)
    .fallback(pages::not_found)
    .with_state(state)
    .layer(middleware::from_fn_with_state(policy, security::enforce))
    .layer(SetResponseHeaderLayer::if_not_present(
      header::X_FRAME_OPTIONS,
      HeaderValue::from_static("DENY"),
    ))
    .layer(SetResponseHeaderLayer::if_not_present(
      header::X_CONTENT_TYPE_OPTIONS,
      HeaderValue::from_static("nosniff"),
    ))
    .layer(SetResponseHeaderLayer::if_not_present(
      header::REFERRER_POLICY,
      HeaderValue::from_static("same-origin"),
    ))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
