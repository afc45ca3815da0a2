//! CLI argument definitions using Clap v4

// this_file: crates/vellum-cli/src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vellum - inspect shaped documents, key generators and shard routing
#[derive(Parser, Debug)]
#[command(name = "vellum")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Shape a JSON document and show its binary form
    #[command(alias = "s")]
    Shape(ShapeArgs),

    /// Drive a key generator from an options blob
    #[command(alias = "k")]
    Keygen(KeygenArgs),

    /// Validate document keys or document ids
    #[command(alias = "v")]
    Validate(ValidateArgs),

    /// Resolve the shard responsible for a document
    #[command(alias = "r")]
    Route(RouteArgs),
}

/// Arguments for the shape command
#[derive(Parser, Debug)]
pub struct ShapeArgs {
    /// JSON document file (reads from stdin if omitted)
    pub input: Option<PathBuf>,

    /// Check that decoding reproduces the input
    #[arg(long)]
    pub verify: bool,

    /// Extract a dotted attribute path from the shaped document
    #[arg(short = 'e', long = "extract")]
    pub extract: Option<String>,

    /// Print the attribute and shape dictionaries after shaping
    #[arg(short = 'd', long = "dictionaries")]
    pub dictionaries: bool,
}

/// Arguments for the keygen command
#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Key-generator options as JSON, e.g. '{"type":"autoincrement","increment":7}'
    #[arg(short = 'o', long = "options")]
    pub options: Option<String>,

    /// Number of keys to generate
    #[arg(short = 'n', long = "count", default_value = "1")]
    pub count: u32,

    /// Validate this user-supplied key instead of generating
    #[arg(short = 'k', long = "key")]
    pub key: Option<String>,

    /// Track these keys first, as replayed when a collection opens
    #[arg(short = 't', long = "track")]
    pub track: Vec<String>,

    /// Tick value for the first generated key (traditional generator)
    #[arg(long = "tick", default_value = "1")]
    pub tick: u64,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Keys or document ids to validate
    #[arg(required = true)]
    pub values: Vec<String>,

    /// Treat the values as `collection/key` document ids
    #[arg(short = 'i', long = "document-id")]
    pub document_id: bool,
}

/// Arguments for the route command
#[derive(Parser, Debug)]
pub struct RouteArgs {
    /// Cluster layout: a JSON array of collection descriptions
    #[arg(short = 'l', long = "layout")]
    pub layout: PathBuf,

    /// Database name
    #[arg(short = 'D', long = "database", default_value = "_system")]
    pub database: String,

    /// Collection name
    #[arg(short = 'c', long = "collection")]
    pub collection: String,

    /// Document key to route (builds a `{"_key": ...}` stub)
    #[arg(short = 'k', long = "key", conflicts_with = "document")]
    pub key: Option<String>,

    /// JSON document file to route (reads stdin when neither is given)
    #[arg(short = 'f', long = "document")]
    pub document: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_shape_args_parse() {
        let cli = Cli::parse_from(["vellum", "shape", "doc.json", "--verify", "-e", "a.b"]);
        match cli.command {
            Commands::Shape(args) => {
                assert_eq!(args.input.unwrap().to_str(), Some("doc.json"));
                assert!(args.verify);
                assert_eq!(args.extract.as_deref(), Some("a.b"));
            }
            other => panic!("parsed the wrong command: {other:?}"),
        }
    }

    #[test]
    fn test_keygen_defaults() {
        let cli = Cli::parse_from(["vellum", "keygen"]);
        match cli.command {
            Commands::Keygen(args) => {
                assert_eq!(args.count, 1);
                assert_eq!(args.tick, 1);
                assert!(args.options.is_none());
            }
            other => panic!("parsed the wrong command: {other:?}"),
        }
    }
}
