//! Mock database CLI for integration testing
//!
//! Implements the `create` subcommand with the same JSON contract as the
//! real database tool, so the harness can be exercised without building it.
//! `MOCK_DB_FAULT` makes it misbehave:
//!
//! - `status`: every command reports failure
//! - `path`: success is reported with the wrong database path
//! - `duplicate`: creating over an existing database succeeds
//! - `garbage`: prints text that is not JSON
//! - `empty`: prints nothing
//! - `hang`: never finishes

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const STATUS_OK: i32 = 0;
const STATUS_FAILURE: i32 = -1;

#[derive(Parser)]
#[command(name = "mock-db-cli")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty database
    Create {
        /// Database name
        #[arg(short, long)]
        name: String,
        /// Database directory
        #[arg(short, long)]
        directory: Option<PathBuf>,
        /// JSON output format
        #[arg(short, long, alias = "json-output")]
        json: bool,
    },
}

fn main() {
    let fault = std::env::var("MOCK_DB_FAULT").unwrap_or_default();
    let Command::Create {
        name,
        directory,
        json,
    } = Cli::parse().command;

    match fault.as_str() {
        "garbage" => {
            println!("Created an empty database, probably");
            return;
        }
        "empty" => return,
        "hang" => loop {
            std::thread::sleep(std::time::Duration::from_secs(60));
        },
        _ => {}
    }

    let directory = directory
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let result = if fault == "status" {
        Err("Injected failure".to_string())
    } else {
        create(&name, &directory, fault == "duplicate").map(|path| {
            if fault == "path" {
                directory.join("elsewhere").join(&name)
            } else {
                path
            }
        })
    };

    let failed = result.is_err();
    let output = match result {
        Ok(path) => json!({ "status": STATUS_OK, "data": { "path": path } }),
        Err(cause) => json!({ "status": STATUS_FAILURE, "error": { "cause": cause } }),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
    } else if let Some(path) = output.pointer("/data/path").and_then(Value::as_str) {
        println!("Created an empty database inside: {path}");
    } else if let Some(cause) = output.pointer("/error/cause").and_then(Value::as_str) {
        println!("{cause}");
    }

    if failed {
        std::process::exit(1);
    }
}

fn create(name: &str, directory: &Path, allow_existing: bool) -> Result<PathBuf, String> {
    if name.is_empty() || !name.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
        return Err("Library error: Database name contains forbidden characters".to_string());
    }

    if !directory.is_dir() {
        return Err(format!(
            "I/O error: directory '{}' does not exist",
            directory.display()
        ));
    }

    let database = directory.join(name);
    if database.exists() && !allow_existing {
        return Err("Library error: Directory already exists".to_string());
    }

    let metadata_dir = database.join(".metadata");
    std::fs::create_dir_all(&metadata_dir).map_err(|e| format!("I/O error: {e}"))?;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let metadata = json!({ "name": name, "created": now, "modified": now });
    std::fs::write(metadata_dir.join("db.json"), metadata.to_string())
        .map_err(|e| format!("I/O error: {e}"))?;

    Ok(database)
}
