//! The development `.env` template.

use std::{
  fs::OpenOptions,
  io::{self, Write},
  path::Path,
};

/// Render the `.env` template with `secret_key` filled in.
pub fn template(secret_key: &str) -> String {
  format!(
    "\
# NodeWiz environment configuration
# Values here override config.toml; process environment variables override both.

# Core
DEBUG=true
SECRET_KEY='{secret_key}'
ALLOWED_HOSTS=localhost,127.0.0.1
SITE_URL=http://localhost:8000
HOST=127.0.0.1
PORT=8000

# Storage
DATABASE_URL=sqlite://nodewiz.sqlite3
STATIC_DIR=static

# Email (console | smtp | disabled)
EMAIL_BACKEND=console
EMAIL_HOST=smtp.gmail.com
EMAIL_PORT=587
EMAIL_USE_TLS=true
EMAIL_HOST_USER=your-email@gmail.com
EMAIL_HOST_PASSWORD=your-app-password
DEFAULT_FROM_EMAIL=noreply@nodewiz.ai
CONTACT_NOTIFY_EMAIL=contact@nodewiz.ai

# Security (for production)
SECURE_SSL_REDIRECT=false
SECURE_HSTS_SECONDS=0
SECURE_HSTS_INCLUDE_SUBDOMAINS=false
SECURE_HSTS_PRELOAD=false
"
  )
}

/// Write the template to `path` unless a file is already there.
///
/// Returns `false` when an existing file was left untouched.
pub fn write_if_absent(path: &Path, secret_key: &str) -> io::Result<bool> {
  let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
    Ok(file) => file,
    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
    Err(e) => return Err(e),
  };
  file.write_all(template(secret_key).as_bytes())?;
  Ok(true)
}
