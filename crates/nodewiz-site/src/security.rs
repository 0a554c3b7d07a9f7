//! Request-level security policy: Host header validation, HTTPS redirect and
//! HSTS.
//!
//! Requests are treated as HTTPS when the URI scheme says so or when the
//! fronting proxy sets `X-Forwarded-Proto: https`.

use std::sync::Arc;

use axum::{
  extract::{Request, State},
  http::{HeaderMap, HeaderValue, StatusCode, header},
  middleware::Next,
  response::{IntoResponse, Response},
};

use crate::config::SiteConfig;

/// Hosts accepted in debug mode when `ALLOWED_HOSTS` is empty.
const DEBUG_HOSTS: [&str; 4] = ["localhost", ".localhost", "127.0.0.1", "[::1]"];

#[derive(Debug, Clone)]
pub struct SecurityPolicy {
  allowed_hosts: Vec<String>,
  ssl_redirect:  bool,
  hsts:          Option<HeaderValue>,
}

impl SecurityPolicy {
  pub fn from_config(config: &SiteConfig) -> Self {
    let mut allowed_hosts = config.allowed_hosts();
    if allowed_hosts.is_empty() && config.debug {
      allowed_hosts = DEBUG_HOSTS.iter().map(|h| h.to_string()).collect();
    }
    Self {
      allowed_hosts,
      ssl_redirect: config.secure_ssl_redirect,
      hsts: config
        .hsts_header()
        .and_then(|v| HeaderValue::from_str(&v).ok()),
    }
  }

  /// Whether `host` (port already stripped, lowercased) matches a pattern.
  ///
  /// `*` matches anything; `.example.com` matches `example.com` and every
  /// subdomain of it; anything else must match exactly.
  pub fn host_allowed(&self, host: &str) -> bool {
    !host.is_empty()
      && self.allowed_hosts.iter().any(|pattern| {
        pattern == "*"
          || pattern == host
          || pattern
            .strip_prefix('.')
            .is_some_and(|domain| host == domain || host.ends_with(pattern.as_str()))
      })
  }
}

/// The request host, lowercased, without its port.
fn request_host(req: &Request) -> String {
  let raw = req
    .headers()
    .get(header::HOST)
    .and_then(|v| v.to_str().ok())
    .or_else(|| req.uri().host())
    .unwrap_or_default();
  strip_port(raw).to_ascii_lowercase()
}

fn strip_port(host: &str) -> &str {
  if host.starts_with('[') {
    return match host.find(']') {
      Some(end) => &host[..=end],
      None => host,
    };
  }
  match host.rsplit_once(':') {
    Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
    _ => host,
  }
}

fn is_secure(req: &Request) -> bool {
  req.uri().scheme_str() == Some("https") || forwarded_https(req.headers())
}

fn forwarded_https(headers: &HeaderMap) -> bool {
  headers
    .get("x-forwarded-proto")
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split(',').next())
    .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}

/// axum middleware applying [`SecurityPolicy`] to every request.
pub async fn enforce(
  State(policy): State<Arc<SecurityPolicy>>,
  req: Request,
  next: Next,
) -> Response {
  let host = request_host(&req);
  if !policy.host_allowed(&host) {
    tracing::warn!(%host, "rejected request with disallowed Host header");
    return (StatusCode::BAD_REQUEST, "Bad Request (400)").into_response();
  }

  let secure = is_secure(&req);
  if policy.ssl_redirect && !secure {
    let authority = req
      .headers()
      .get(header::HOST)
      .and_then(|v| v.to_str().ok())
      .unwrap_or(host.as_str())
      .to_owned();
    let path = req
      .uri()
      .path_and_query()
      .map(|pq| pq.as_str())
      .unwrap_or("/");
    let target = format!("https://{authority}{path}");
    return (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response();
  }

  let mut response = next.run(req).await;
  if secure && let Some(hsts) = &policy.hsts {
    response
      .headers_mut()
      .insert(header::STRICT_TRANSPORT_SECURITY, hsts.clone());
  }
  response
}
