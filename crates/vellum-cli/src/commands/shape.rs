//! The shape subcommand

// this_file: crates/vellum-cli/src/commands/shape.rs

use anyhow::{bail, Context};
use vellum_shaper::{Extraction, ShapedDocument, Shaper};

use crate::cli::ShapeArgs;

pub fn run(args: &ShapeArgs) -> anyhow::Result<()> {
    let document = super::read_document(args.input.as_deref())?;

    let shaper = Shaper::new();
    let shaped = shaper
        .encode(&document, true)
        .context("shaping the document failed")?;

    println!("shape id:   {}", shaped.shape_id);
    println!("value size: {} bytes", shaped.bytes.len());
    println!("attributes: {}", shaper.attribute_count());
    println!("shapes:     {}", shaper.shape_count());
    println!();
    print_hex(&shaped.bytes);

    if args.dictionaries {
        println!();
        println!("attribute dictionary:");
        for id in 1..=shaper.attribute_count() as u32 {
            if let Some(name) = shaper.attribute_name(id) {
                println!("  #{id} {name}");
            }
        }
        println!("shape dictionary:");
        for id in 1..=shaper.shape_count() as u32 {
            if let Some(shape) = shaper.lookup_shape(id) {
                println!("  #{id} {shape:?}");
            }
        }
    }

    if let Some(path) = &args.extract {
        match shaper.extract(&shaped, path)? {
            Extraction::Absent => println!("\n{path}: absent"),
            Extraction::Found { shape_id, bytes } => {
                let sub = ShapedDocument {
                    shape_id,
                    bytes: bytes.to_vec(),
                };
                let value = shaper.decode(&sub)?;
                println!("\n{path}: shape #{shape_id}, {value}");
            }
        }
    }

    if args.verify {
        let decoded = shaper.decode(&shaped)?;
        // reserved attributes are stripped on encode, so compare against the
        // decoded view re-encoded rather than the raw input
        let reshaped = shaper.encode(&decoded, true)?;
        if reshaped != shaped {
            bail!("round trip mismatch");
        }
        println!("\nround trip ok");
    }

    Ok(())
}

fn print_hex(bytes: &[u8]) {
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if (0x20..0x7f).contains(&b) {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        println!("{:08x}  {:<47}  {ascii}", row * 16, hex.join(" "));
    }
}
