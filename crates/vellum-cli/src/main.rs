//! Vellum CLI - inspect shaped documents, key generators and shard routing

// this_file: crates/vellum-cli/src/main.rs

mod cli;
mod commands;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = cli::Cli::parse();
    match cli.command {
        cli::Commands::Shape(args) => commands::shape::run(&args),
        cli::Commands::Keygen(args) => commands::keygen::run(&args),
        cli::Commands::Validate(args) => commands::validate::run(&args),
        cli::Commands::Route(args) => commands::route::run(&args),
    }
}
