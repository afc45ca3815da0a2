//! The keygen subcommand

// this_file: crates/vellum-cli/src/commands/keygen.rs

use anyhow::Context;
use vellum_keys::create_key_generator;

use crate::cli::KeygenArgs;

pub fn run(args: &KeygenArgs) -> anyhow::Result<()> {
    let options = args
        .options
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("--options is not JSON")?;

    let mut generator =
        create_key_generator(options.as_ref()).context("cannot build key generator")?;
    println!("generator: {}", generator.name());

    for key in &args.track {
        generator.track(key);
        println!("tracked:   {key}");
    }

    if let Some(key) = &args.key {
        let accepted = generator.generate(args.tick, Some(key), false)?;
        println!("accepted:  {accepted}");
    } else {
        for i in 0..args.count {
            let key = generator.generate(args.tick + u64::from(i), None, false)?;
            println!("generated: {key}");
        }
    }

    let exported = serde_json::to_string(&generator.options())?;
    println!("options:   {exported}");
    Ok(())
}
