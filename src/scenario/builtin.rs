//! Built-in scenarios for the database CLI's `create` subcommand

use std::path::Path;

use super::predicate::{FieldCheck, Predicate};
use super::setup::SetupStep;
use super::Scenario;

/// Flag asking the target binary for JSON output
pub const JSON_FLAG: &str = "--json";

/// Spellings of the JSON output flag accepted in suite files
pub(crate) const JSON_FLAGS: &[&str] = &[JSON_FLAG, "--json-output", "-j"];

fn create_args(name: &str, directory: &Path) -> Vec<String> {
    vec![
        "create".to_string(),
        "--name".to_string(),
        name.to_string(),
        "--directory".to_string(),
        directory.to_string_lossy().into_owned(),
        JSON_FLAG.to_string(),
    ]
}

/// The default regression run, in order
///
/// 1. `create` succeeds on a clean directory and echoes `<directory>/<name>`
/// 2. `create` on the same database is refused
/// 3. `create` with a name outside `[A-Za-z0-9_]` is refused
pub fn create_scenarios(name: &str, directory: &Path) -> Vec<Scenario> {
    let database = directory.join(name);
    let invalid_name = format!("{name}-invalid!");

    let refused = || {
        Predicate::all([
            FieldCheck::not_equals("/status", 0),
            FieldCheck::exists("/error/cause"),
        ])
    };

    vec![
        Scenario::new(
            "create",
            create_args(name, directory),
            Predicate::all([
                FieldCheck::equals("/status", 0),
                FieldCheck::path_equals("/data/path", [directory, Path::new(name)]),
            ]),
        )
        .with_description("create an empty database in a clean directory")
        .with_setup(SetupStep::RemovePath(database.clone()))
        .with_labels(
            &format!("Database created at {}", database.display()),
            &format!("Database creation at {} failed", database.display()),
        ),
        Scenario::new("create duplicate", create_args(name, directory), refused())
            .with_description("creating over an existing database is refused")
            .with_labels(
                "Duplicate database rejected",
                "Duplicate database was not rejected",
            ),
        Scenario::new(
            "create invalid name",
            create_args(&invalid_name, directory),
            refused(),
        )
        .with_description("database names outside [A-Za-z0-9_] are refused")
        .with_setup(SetupStep::RemovePath(directory.join(&invalid_name)))
        .with_labels(
            "Invalid database name rejected",
            "Invalid database name was not rejected",
        ),
    ]
}
