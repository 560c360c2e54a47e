//! Regression harness for the database command-line tool
//!
//! Runs the target binary through an ordered list of scenarios and exits
//! non-zero at the first scenario whose JSON response does not match.

use clap::Parser;
use db_regress::cli;
use db_regress::commands::Commands;
use db_regress::common::logging;

#[derive(Parser)]
#[command(name = "db-regress", about = "Regression harness for the database CLI")]
#[command(version, long_about = None)]
struct Cli {
    /// Debug logging on stderr (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_cli(cli.verbose);

    match cli::dispatch(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
