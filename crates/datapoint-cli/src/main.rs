//! DataPoint CLI
//!
//! Command-line interface over a SQLite-backed data point store

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "datapoint")]
#[command(about = "DataPoint - partitioned, time-ordered records", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: commands::GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List one page of a partition
    List(commands::list::ListArgs),
    /// Create (or overwrite) a record, subject to authorization
    Create(commands::create::CreateArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List(args) => commands::list::execute(args, &cli.global),
        Commands::Create(args) => commands::create::execute(args, &cli.global),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
