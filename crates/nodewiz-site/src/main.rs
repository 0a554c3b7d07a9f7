//! nodewiz-server binary.
//!
//! Loads configuration from `config.toml`, `.env` and the environment, opens
//! the SQLite store, and serves the site over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `ADMIN_PASSWORD_HASH`:
//!
//! ```
//! cargo run -p nodewiz-site --bin nodewiz-server -- --hash-password
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use nodewiz_site::{AppState, auth::hash_password, config::SiteConfig, mail::MailBackend};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "NodeWiz marketing site server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Path to the dotenv file layered over the TOML configuration.
  #[arg(long, default_value = ".env")]
  env_file: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  let config = SiteConfig::load(&cli.config, &cli.env_file).context("failed to load configuration")?;
  config.check().context("refusing to start with this configuration")?;
  config.warn_if_insecure();

  let location = config.database()?;
  let store = nodewiz_site::open_store(&location)
    .await
    .with_context(|| format!("failed to open store at {location:?}"))?;

  let mailer = MailBackend::from_config(&config).context("failed to configure mail backend")?;
  tracing::info!(backend = mailer.name(), "mail backend ready");

  let address = format!("{}:{}", config.host, config.port);
  let app = nodewiz_site::router(AppState::new(store, mailer, config));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  tracing::info!("Shutting down gracefully...");
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
