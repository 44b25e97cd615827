//! `roster` — administer student entries in the directory.
//!
//! # Usage
//!
//! ```text
//! roster init
//! roster add student001 张三 张 student001@szuldpa-edu.com --class 计算机2021-1班
//! roster list --page 2
//! roster import students.csv
//! ```
//!
//! Settings come from `roster.toml` (or `--config`), overridden by
//! `ROSTER_DIRECTORY__*` environment variables. The bind password is read
//! from `LDAP_ADMIN_PASSWORD` or `.ldap_password` unless set explicitly.

mod commands;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use roster_store_ldap::{DirectoryConfig, LdapSession};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Student directory administration")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "roster.toml")]
  config: PathBuf,

  /// Prompt for the bind password if no other source provides one.
  #[arg(long)]
  interactive: bool,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
pub enum Command {
  /// Create the students, teachers, and classes units if missing.
  Init,

  /// Add one student.
  Add {
    uid:      String,
    cn:       String,
    sn:       String,
    mail:     String,
    #[arg(long, default_value = roster_core::record::DEFAULT_PASSWORD)]
    password: String,
    /// Class name stored in the description attribute.
    #[arg(long, conflicts_with = "admin")]
    class:    Option<String>,
    /// Mark the entry as an administrator.
    #[arg(long)]
    admin:    bool,
  },

  /// Show one student.
  Show { uid: String },

  /// List students a page at a time.
  List {
    #[arg(long, default_value_t = 1)]
    page:     usize,
    #[arg(long, default_value_t = roster_core::PageRequest::DEFAULT_PER_PAGE)]
    per_page: usize,
  },

  /// Replace the given fields of one student.
  Modify {
    uid:      String,
    #[arg(long)]
    cn:       Option<String>,
    #[arg(long)]
    sn:       Option<String>,
    #[arg(long)]
    mail:     Option<String>,
    #[arg(long)]
    password: Option<String>,
    /// New class; an empty value clears it.
    #[arg(long, conflicts_with = "admin")]
    class:    Option<String>,
    #[arg(long)]
    admin:    bool,
  },

  /// Delete one student.
  Delete { uid: String },

  /// Import students from a CSV or spreadsheet (.xlsx, .xls, .ods) file.
  Import { file: PathBuf },

  /// Check a student's password, read from stdin.
  Auth { uid: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct Settings {
  #[serde(default)]
  directory: DirectoryConfig,
}

fn load_settings(path: PathBuf) -> anyhow::Result<Settings> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("ROSTER")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise settings")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let mut settings = load_settings(cli.config)?;
  settings.directory.interactive |= cli.interactive;
  let directory = settings.directory;

  let mut session = LdapSession::connect(&directory)
    .await
    .with_context(|| format!("failed to connect to {}", directory.url))?;

  let layout = directory.layout();
  let result = commands::run(&mut session, &layout, cli.command, cli.json).await;

  // Release the session on every exit path.
  session.disconnect().await;
  result
}
