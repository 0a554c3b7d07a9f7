//! Minimal cookie helpers: reading request cookies, building `Set-Cookie`
//! values, and the one-shot flash message shown after a contact submission.

use axum::http::{HeaderMap, header};

/// Cookie carrying a pending flash message.
pub const FLASH_COOKIE: &str = "messages";

/// Value of the first cookie called `name`, if any.
pub fn get<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(k, _)| *k == name)
    .map(|(_, v)| v)
}

/// Build a `Set-Cookie` value scoped to the whole site.
pub fn set(name: &str, value: &str, max_age: Option<u64>, secure: bool) -> String {
  let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax");
  if let Some(age) = max_age {
    cookie.push_str(&format!("; Max-Age={age}"));
  }
  if secure {
    cookie.push_str("; Secure");
  }
  cookie
}

/// Build a `Set-Cookie` value that removes `name`.
pub fn clear(name: &str) -> String { format!("{name}=; Path=/; Max-Age=0") }

// ─── Flash messages ──────────────────────────────────────────────────────────

/// Messages that survive exactly one redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
  ContactSent,
}

impl Flash {
  fn code(self) -> &'static str {
    match self {
      Flash::ContactSent => "contact-sent",
    }
  }

  pub fn message(self) -> &'static str {
    match self {
      Flash::ContactSent => {
        "Thank you for your message! We'll get back to you within 24 hours."
      }
    }
  }

  /// `Set-Cookie` value queueing this message for the next page view.
  pub fn cookie(self, secure: bool) -> String {
    set(FLASH_COOKIE, self.code(), Some(60), secure)
  }

  /// The pending flash message, if the request carries one.
  pub fn pending(headers: &HeaderMap) -> Option<Flash> {
    match get(headers, FLASH_COOKIE)? {
      "contact-sent" => Some(Flash::ContactSent),
      _ => None,
    }
  }
}
