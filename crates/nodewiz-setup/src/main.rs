//! `nodewiz-setup`: bootstrap a development checkout.
//!
//! Runs a fixed sequence of steps from the workspace root. Failures are
//! reported and the sequence carries on; a summary lists what went wrong.

use std::path::Path;

use nodewiz_setup::{
  env_file, prompt, secret,
  steps::{self, Report, cargo},
};
use nodewiz_site::auth::hash_password;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "config.toml";
const ENV_FILE: &str = ".env";
const STATIC_DIR: &str = "static";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  println!("🚀 NodeWiz Website Setup");
  println!("{}", "=".repeat(50));

  let cargo = cargo();
  let mut report = Report::default();

  // 1. Toolchain
  let version = steps::run_command(&cargo, &["--version"]).await;
  if version.success {
    println!("✅ {} detected", version.stdout.trim());
  }
  report.record("toolchain check", version.success);

  // 2. Dependencies
  println!("📦 Fetching dependencies...");
  let fetch = steps::run_command(&cargo, &["fetch"]).await;
  report.record("dependency fetch", fetch.success);

  // 3. Environment file
  let created = report.check(
    "environment file",
    env_file::write_if_absent(Path::new(ENV_FILE), &secret::generate()).map_err(Into::into),
  );
  match created {
    Some(true) => println!("✅ Created {ENV_FILE} template file"),
    Some(false) => println!("✅ {ENV_FILE} file already exists"),
    None => {}
  }

  // 4. Database
  println!("🗄️ Setting up database...");
  let migrated = steps::migrate_database(Path::new(CONFIG_FILE), Path::new(ENV_FILE)).await;
  if let Some(location) = report.check("database migration", migrated) {
    println!("✅ Database ready ({location:?})");
  }

  // 5. Static assets and release build
  println!("📁 Checking static files...");
  let assets = steps::count_files(Path::new(STATIC_DIR)).map_err(anyhow::Error::from);
  if let Some(count) = report.check("static assets", assets) {
    println!("✅ {count} static file(s) in {STATIC_DIR}/");
  }
  let build = steps::run_command(&cargo, &["build", "--release"]).await;
  report.record("release build", build.success);

  // 6. Admin account
  if prompt::confirm("🔐 Create admin account?")? {
    let result = create_admin();
    if report.check("admin account", result).is_some() {
      println!("✅ Admin credentials written to {CONFIG_FILE}");
    }
  }

  // 7. Tests
  if prompt::confirm("🧪 Run tests?")? {
    println!("Running tests...");
    let tests = steps::run_command(&cargo, &["test", "--workspace"]).await;
    report.record("tests", tests.success);
  }

  // 8. Summary
  if report.failures().is_empty() {
    println!("\n✅ Setup complete!");
  } else {
    println!("\n⚠️  Setup finished with errors in: {}", report.failures().join(", "));
  }
  println!("\nNext steps:");
  println!("1. Update {ENV_FILE} with your settings");
  println!("2. Run: cargo run --bin nodewiz-server");
  println!("3. Generate a production key with: cargo run --bin generate-secret-key");

  // 9. Dev server
  if prompt::confirm("🚀 Start development server?")? {
    println!("Starting development server...");
    println!("Access the website at: http://127.0.0.1:8000");
    println!("Admin interface at: http://127.0.0.1:8000/admin/");
    println!("Press Ctrl+C to stop the server");
    let status = tokio::process::Command::new(&cargo)
      .args(["run", "--bin", "nodewiz-server"])
      .status()
      .await;
    match status {
      Ok(s) if s.success() => {}
      Ok(s) => println!("\n👋 Server stopped ({s})"),
      Err(e) => println!("❌ Could not start the server: {e}"),
    }
  }

  Ok(())
}

fn create_admin() -> anyhow::Result<()> {
  let username = prompt::ask("Username")?;
  if username.is_empty() {
    anyhow::bail!("username must not be empty");
  }
  let password = prompt::ask("Password")?;
  if password.is_empty() {
    anyhow::bail!("password must not be empty");
  }
  let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
  steps::write_admin_credentials(Path::new(CONFIG_FILE), &username, &hash)
}
