//! Field-level validation shared by the public contact form and the admin
//! testimonial form.
//!
//! Validation is deterministic and dependency-free: every check works on the
//! already-trimmed string value and records human-readable messages in a
//! [`FieldErrors`] collection keyed by form field name.

use std::net::{Ipv4Addr, Ipv6Addr};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";

/// Characters permitted in an unquoted (dot-atom) local part.
const ATEXT_SPECIALS: &str = "!#$%&'*+-/=?^_`{|}~";

// ─── FieldErrors ─────────────────────────────────────────────────────────────

/// Validation messages, grouped by field and kept in insertion order so forms
/// can list them in the order the fields appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
  entries: Vec<(&'static str, Vec<String>)>,
}

impl FieldErrors {
  pub fn new() -> Self { Self::default() }

  pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
    let message = message.into();
    match self.entries.iter_mut().find(|(f, _)| *f == field) {
      Some((_, messages)) => messages.push(message),
      None => self.entries.push((field, vec![message])),
    }
  }

  /// Messages recorded for `field`; empty when the field is valid.
  pub fn get(&self, field: &str) -> &[String] {
    self
      .entries
      .iter()
      .find(|(f, _)| *f == field)
      .map(|(_, m)| m.as_slice())
      .unwrap_or(&[])
  }

  pub fn has(&self, field: &str) -> bool { !self.get(field).is_empty() }

  /// All messages for `field` joined into one line, for inline display.
  pub fn message(&self, field: &str) -> Option<String> {
    self.has(field).then(|| self.get(field).join(" "))
  }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
    self.entries.iter().map(|(f, m)| (*f, m.as_slice()))
  }

  /// `Ok(value)` when no errors were recorded, otherwise `Err(self)`.
  pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
    if self.is_empty() { Ok(value) } else { Err(self) }
  }
}

// ─── Field checks ────────────────────────────────────────────────────────────

/// Record a "required" error when `value` is empty. Returns `true` when the
/// value is present.
pub fn required(errors: &mut FieldErrors, field: &'static str, value: &str) -> bool {
  if value.is_empty() {
    errors.add(field, REQUIRED);
    false
  } else {
    true
  }
}

/// Record an error when `value` is longer than `max` characters.
pub fn max_chars(
  errors: &mut FieldErrors,
  field: &'static str,
  value: &str,
  max: usize,
) {
  let len = value.chars().count();
  if len > max {
    errors.add(
      field,
      format!("Ensure this value has at most {max} characters (it has {len})."),
    );
  }
}

// ─── Email ───────────────────────────────────────────────────────────────────

/// Returns `true` when `value` is a syntactically valid email address.
///
/// Accepts a dot-atom or quoted-string local part and either a hostname
/// (`localhost` or at least two labels) or a bracketed IP literal
/// (`[192.0.2.1]`, `[IPv6:2001:db8::1]`). Internationalised domains are
/// checked in their punycode form.
pub fn validate_email(value: &str) -> bool {
  if value.is_empty() || value.len() > 320 {
    return false;
  }
  let Some((local, domain)) = value.rsplit_once('@') else {
    return false;
  };
  (is_dot_atom(local) || is_quoted_string(local)) && is_email_domain(domain)
}

fn is_dot_atom(local: &str) -> bool {
  if local.is_empty() || local.len() > 64 {
    return false;
  }
  local.split('.').all(|atom| {
    !atom.is_empty()
      && atom
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(c))
  })
}

/// `"..."` around ASCII text. `"` and `\` appear only backslash-escaped,
/// tab only escaped, and NUL, CR and LF never.
fn is_quoted_string(local: &str) -> bool {
  let Some(inner) = local
    .strip_prefix('"')
    .and_then(|l| l.strip_suffix('"'))
  else {
    return false;
  };
  if local.len() > 64 {
    return false;
  }
  let mut bytes = inner.bytes();
  while let Some(b) = bytes.next() {
    let ok = match b {
      b'\\' => matches!(bytes.next(), Some(1..=9 | 11 | 12 | 14..=127)),
      b'\t' | b'\n' | b'\r' | b'"' => false,
      1..=127 => true,
      _ => false,
    };
    if !ok {
      return false;
    }
  }
  true
}

fn is_email_domain(domain: &str) -> bool {
  if domain == "localhost" {
    return true;
  }
  if let Some(literal) = domain
    .strip_prefix('[')
    .and_then(|d| d.strip_suffix(']'))
  {
    return match literal.strip_prefix("IPv6:") {
      Some(v6) => v6.parse::<Ipv6Addr>().is_ok(),
      None => literal.parse::<Ipv4Addr>().is_ok(),
    };
  }

  if domain.is_ascii() {
    is_hostname(domain)
  } else {
    idna::domain_to_ascii(domain).is_ok_and(|ascii| is_hostname(&ascii))
  }
}

fn is_hostname(domain: &str) -> bool {
  let labels: Vec<&str> = domain.split('.').collect();
  let Some((tld, rest)) = labels.split_last() else {
    return false;
  };
  if rest.is_empty() || !rest.iter().all(|l| is_host_label(l)) {
    return false;
  }
  (2..=63).contains(&tld.len())
    && !tld.ends_with('-')
    && tld.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_host_label(label: &str) -> bool {
  (1..=63).contains(&label.len())
    && !label.starts_with('-')
    && !label.ends_with('-')
    && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_common_addresses() {
    for ok in [
      "alice@example.com",
      "first.last+tag@sub.example.co.uk",
      "o'brien@example.ie",
      "ops@localhost",
      "root@[192.0.2.1]",
      "root@[IPv6:2001:db8::1]",
      "x@xn--80ak6aa92e.com",
      "user@bücher.de",
      "info@пример.рф",
      "\"john doe\"@example.com",
      "\"test@test\"@example.com",
      "\"a\\\"b\"@example.com",
    ] {
      assert!(validate_email(ok), "{ok} should be valid");
    }
  }

  #[test]
  fn rejects_malformed_addresses() {
    for bad in [
      "not-an-email",
      "",
      "@example.com",
      "alice@",
      "alice@example",
      "alice@.example.com",
      "alice@example..com",
      "alice@-example.com",
      "alice@example.c",
      "alice..bob@example.com",
      ".alice@example.com",
      "alice bob@example.com",
      "alice@exa mple.com",
      "alice@[999.0.0.1]",
      "\"unterminated@example.com",
      "\"a\"b\"@example.com",
      "\"trailing\\\"@example.com",
      "\"line\nbreak\"@example.com",
      "user@bü cher.de",
    ] {
      assert!(!validate_email(bad), "{bad:?} should be invalid");
    }
  }

  #[test]
  fn local_part_length_is_bounded() {
    let long = format!("{}@example.com", "a".repeat(65));
    assert!(!validate_email(&long));
    let edge = format!("{}@example.com", "a".repeat(64));
    assert!(validate_email(&edge));
  }

  #[test]
  fn field_errors_group_by_field() {
    let mut errors = FieldErrors::new();
    errors.add("email", "first");
    errors.add("name", REQUIRED);
    errors.add("email", "second");

    assert_eq!(errors.get("email"), ["first", "second"]);
    assert_eq!(errors.get("name"), [REQUIRED]);
    assert!(errors.get("message").is_empty());
    assert_eq!(errors.message("email").as_deref(), Some("first second"));
    assert_eq!(errors.message("message"), None);
    let order: Vec<_> = errors.iter().map(|(f, _)| f).collect();
    assert_eq!(order, ["email", "name"]);
  }

  #[test]
  fn max_chars_counts_characters_not_bytes() {
    let mut errors = FieldErrors::new();
    max_chars(&mut errors, "name", &"é".repeat(100), 100);
    assert!(errors.is_empty());

    max_chars(&mut errors, "name", &"é".repeat(101), 100);
    assert_eq!(
      errors.get("name"),
      ["Ensure this value has at most 100 characters (it has 101)."]
    );
  }
}
