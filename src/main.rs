//! testweaver CLI entry point

use clap::Parser;
use testweaver::{cli, commands::Commands, common::logging};

#[derive(Parser)]
#[command(name = "testweaver", about = "Materialize declarative test-suite structures")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
