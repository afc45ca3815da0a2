//! Subcommand implementations

// this_file: crates/vellum-cli/src/commands/mod.rs

pub mod keygen;
pub mod route;
pub mod shape;
pub mod validate;

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use vellum_core::Value;

/// Read a JSON document from a file or, when no path is given, from stdin
pub fn read_document(path: Option<&Path>) -> anyhow::Result<Value> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("cannot read stdin")?;
            buffer
        }
    };
    let json: serde_json::Value = serde_json::from_str(&text).context("input is not JSON")?;
    Ok(Value::from(json))
}
