//! Individual provisioning steps.
//!
//! A failing step is reported and recorded; it never aborts the sequence.

use std::{
  fs, io,
  path::Path,
  process::Stdio,
};

use anyhow::Context as _;
use nodewiz_site::config::{DatabaseLocation, SiteConfig};
use tokio::process::Command;
use walkdir::WalkDir;

/// The cargo executable: the one that launched us if known, else `cargo`.
pub fn cargo() -> String { std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_owned()) }

// ─── External commands ───────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CommandOutcome {
  pub command: String,
  pub success: bool,
  pub stdout:  String,
  pub stderr:  String,
}

/// Run `program` with `args`, capturing its output, and print a one-line
/// verdict followed by stderr on failure.
pub async fn run_command(program: &str, args: &[&str]) -> CommandOutcome {
  let command = std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>().join(" ");
  let output = Command::new(program)
    .args(args)
    .stdin(Stdio::null())
    .output()
    .await;

  let outcome = match output {
    Ok(out) => CommandOutcome {
      command,
      success: out.status.success(),
      stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    },
    Err(e) => CommandOutcome {
      command,
      success: false,
      stdout: String::new(),
      stderr: e.to_string(),
    },
  };

  if outcome.success {
    println!("✅ {}", outcome.command);
  } else {
    println!("❌ Error running: {}", outcome.command);
    println!("Error: {}", outcome.stderr.trim_end());
    tracing::debug!(command = %outcome.command, "step command failed");
  }
  outcome
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Steps that failed, in the order they ran.
#[derive(Debug, Default)]
pub struct Report {
  failures: Vec<String>,
}

impl Report {
  pub fn record(&mut self, step: &str, ok: bool) {
    if !ok {
      self.failures.push(step.to_owned());
    }
  }

  /// Record a fallible step, printing its error.
  pub fn check<T>(&mut self, step: &str, result: anyhow::Result<T>) -> Option<T> {
    match result {
      Ok(value) => Some(value),
      Err(e) => {
        println!("❌ {step}: {e:#}");
        self.failures.push(step.to_owned());
        None
      }
    }
  }

  pub fn failures(&self) -> &[String] { &self.failures }
}

// ─── Database ────────────────────────────────────────────────────────────────

/// Open the configured store, creating and migrating its schema.
pub async fn migrate_database(config_path: &Path, env_file: &Path) -> anyhow::Result<DatabaseLocation> {
  let config = SiteConfig::load(config_path, env_file).context("failed to load configuration")?;
  let location = config.database()?;
  nodewiz_site::open_store(&location)
    .await
    .with_context(|| format!("failed to open store at {location:?}"))?;
  Ok(location)
}

// ─── Static assets ───────────────────────────────────────────────────────────

/// Number of regular files under `dir`, recursively.
pub fn count_files(dir: &Path) -> io::Result<usize> {
  let mut count = 0;
  for entry in WalkDir::new(dir) {
    if entry?.file_type().is_file() {
      count += 1;
    }
  }
  Ok(count)
}

// ─── Admin account ───────────────────────────────────────────────────────────

/// Return `existing` TOML with the admin credentials set, keeping every
/// other key.
pub fn set_admin_credentials(
  existing: &str,
  username: &str,
  password_hash: &str,
) -> Result<String, toml::de::Error> {
  let mut table: toml::Table = existing.parse()?;
  table.insert("admin_username".to_owned(), toml::Value::String(username.to_owned()));
  table.insert(
    "admin_password_hash".to_owned(),
    toml::Value::String(password_hash.to_owned()),
  );
  Ok(table.to_string())
}

/// Store the admin credentials in the TOML file at `path`, creating it if
/// needed.
pub fn write_admin_credentials(path: &Path, username: &str, password_hash: &str) -> anyhow::Result<()> {
  let existing = match fs::read_to_string(path) {
    Ok(text) => text,
    Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
    Err(e) => return Err(e).with_context(|| format!("failed to read {}", path.display())),
  };
  let updated = set_admin_credentials(&existing, username, password_hash)
    .with_context(|| format!("{} is not valid TOML", path.display()))?;
  fs::write(path, updated).with_context(|| format!("failed to write {}", path.display()))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;

  fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("nodewiz-setup-{name}-{}", std::process::id()))
  }

  #[tokio::test]
  async fn successful_command_captures_stdout() {
    let outcome = run_command(&cargo(), &["--version"]).await;
    assert!(outcome.success, "{outcome:?}");
    assert!(outcome.stdout.starts_with("cargo"));
  }

  #[tokio::test]
  async fn missing_program_is_a_failure_not_a_panic() {
    let outcome = run_command("nodewiz-no-such-program", &["--flag"]).await;
    assert!(!outcome.success);
    assert!(!outcome.stderr.is_empty());
    assert_eq!(outcome.command, "nodewiz-no-such-program --flag");
  }

  #[test]
  fn report_collects_failures_in_order() {
    let mut report = Report::default();
    report.record("fetch", true);
    report.record("build", false);
    assert_eq!(report.check("migrate", Ok::<_, anyhow::Error>(3)), Some(3));
    assert_eq!(report.check::<()>("tests", Err(anyhow::anyhow!("boom"))), None);
    assert_eq!(report.failures(), ["build", "tests"]);
  }

  #[test]
  fn admin_credentials_preserve_other_keys() {
    let updated = set_admin_credentials("port = 9000\nadmin_username = \"old\"\n", "root", "$argon2id$x").unwrap();
    let table: toml::Table = updated.parse().unwrap();
    assert_eq!(table["port"].as_integer(), Some(9000));
    assert_eq!(table["admin_username"].as_str(), Some("root"));
    assert_eq!(table["admin_password_hash"].as_str(), Some("$argon2id$x"));
  }

  #[test]
  fn admin_credentials_reject_broken_toml() {
    assert!(set_admin_credentials("port = = 1", "root", "h").is_err());
  }

  #[test]
  fn admin_credentials_written_to_new_file() {
    let path = scratch("config.toml");
    let _ = fs::remove_file(&path);
    write_admin_credentials(&path, "admin", "hash").unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("admin_username = \"admin\""));
    fs::remove_file(&path).unwrap();
  }

  #[test]
  fn counts_nested_files() {
    let root = scratch("static");
    let _ = fs::remove_dir_all(&root);
    fs::create_dir_all(root.join("css")).unwrap();
    fs::write(root.join("css/site.css"), "body{}").unwrap();
    fs::write(root.join("robots.txt"), "").unwrap();
    assert_eq!(count_files(&root).unwrap(), 2);
    fs::remove_dir_all(&root).unwrap();
  }

  #[test]
  fn missing_static_dir_is_an_error() {
    let root = scratch("no-such-static");
    let _ = fs::remove_dir_all(&root);
    let err = count_files(&root).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
  }

  #[tokio::test]
  async fn migration_opens_configured_database() {
    let db = scratch("db.sqlite3");
    let env = scratch("env");
    let _ = fs::remove_file(&db);
    fs::write(&env, format!("DATABASE_URL=sqlite://{}\n", db.display())).unwrap();

    let location = migrate_database(&scratch("missing.toml"), &env).await.unwrap();
    assert_eq!(location, DatabaseLocation::File(db.clone()));
    assert!(db.exists());

    fs::remove_file(&db).unwrap();
    fs::remove_file(&env).unwrap();
  }
}
