//! `opisto` — administration CLI for an Opisto store file.
//!
//! Opens (or creates) the SQLite store and runs one command against it.
//! The store path comes from `--db`, then the `OPISTO_DB` environment
//! variable, then `./opisto.db`.

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use opisto_core::{
  credential,
  schedule::NewGroup,
  store::SchoolStore,
  user::{NewUser, Role},
};
use opisto_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Opisto school store administration")]
struct Cli {
  /// Path to the SQLite store file.
  #[arg(short, long)]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create the store file (and its schema) if it does not exist.
  Init,

  /// Hash a password read from stdin and print the credential string.
  HashPassword,

  /// Create a user; the password is read from stdin.
  AddUser {
    username:   String,
    first_name: String,
    last_name:  String,
    /// student | guardian | teacher | moderator | admin
    #[arg(long, default_value = "student")]
    role: String,
  },

  /// Create a subject.
  AddSubject { name: String, short_name: String },

  /// List all subjects as JSON.
  Subjects,

  /// List the courses of a subject as JSON.
  Courses { subject_id: Uuid },

  /// Create a teaching group for a course (schedule slots can be attached
  /// later through the library API).
  AddGroup {
    course_id: Uuid,
    name:      String,
    /// First day of teaching, YYYY-MM-DD.
    #[arg(long)]
    start_date: NaiveDate,
    /// Last day of teaching, YYYY-MM-DD.
    #[arg(long)]
    end_date: NaiveDate,
  },
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
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit, no store needed.
  if matches!(cli.command, Command::HashPassword) {
    let password = read_password()?;
    let encoded = credential::hash_password(&password)
      .map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?;
    println!("{encoded}");
    return Ok(());
  }

  let db_path = resolve_db_path(cli.db)?;
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;

  match cli.command {
    Command::HashPassword => unreachable!("handled above"),

    Command::Init => {
      tracing::info!("store ready at {db_path:?}");
    }

    Command::AddUser { username, first_name, last_name, role } => {
      let role = parse_role(&role)?;
      let password = read_password()?;
      let user = store
        .create_user(NewUser { username, first_name, last_name, password, role })
        .await
        .context("creating user")?;
      println!("{}", serde_json::to_string_pretty(&user.to_data())?);
    }

    Command::AddSubject { name, short_name } => {
      let subject = store
        .create_subject(name, short_name)
        .await
        .context("creating subject")?;
      println!("{}", serde_json::to_string_pretty(&subject)?);
    }

    Command::Subjects => {
      let subjects = store.list_subjects().await.context("listing subjects")?;
      println!("{}", serde_json::to_string_pretty(&subjects)?);
    }

    Command::Courses { subject_id } => {
      let courses = store
        .courses_for_subject(subject_id)
        .await
        .context("listing courses")?;
      println!("{}", serde_json::to_string_pretty(&courses)?);
    }

    Command::AddGroup { course_id, name, start_date, end_date } => {
      let group = store
        .create_group(NewGroup {
          name,
          course_id,
          start_date: epoch_seconds(start_date),
          end_date: epoch_seconds(end_date),
          times: Vec::new(),
        })
        .await
        .context("creating group")?;
      println!("{}", serde_json::to_string_pretty(&group)?);
    }
  }

  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Resolve the store path: `--db` flag, then `OPISTO_DB`, then the default.
fn resolve_db_path(flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
  if let Some(path) = flag {
    return Ok(path);
  }

  let settings = config::Config::builder()
    .add_source(config::Environment::with_prefix("OPISTO"))
    .build()
    .context("reading environment configuration")?;

  Ok(
    settings
      .get_string("db")
      .map(PathBuf::from)
      .unwrap_or_else(|_| PathBuf::from("opisto.db")),
  )
}

fn parse_role(s: &str) -> anyhow::Result<Role> {
  match s {
    "student" => Ok(Role::Student),
    "guardian" => Ok(Role::Guardian),
    "teacher" => Ok(Role::Teacher),
    "moderator" => Ok(Role::Moderator),
    "admin" => Ok(Role::Admin),
    other => anyhow::bail!("unknown role {other:?}"),
  }
}

/// Midnight UTC at the start of `date`, as epoch seconds.
fn epoch_seconds(date: NaiveDate) -> i64 {
  date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
