//! The validate subcommand

// this_file: crates/vellum-cli/src/commands/validate.rs

use anyhow::bail;
use vellum_core::keys::{validate_document_id, validate_key};

use crate::cli::ValidateArgs;

pub fn run(args: &ValidateArgs) -> anyhow::Result<()> {
    let mut failures = 0usize;

    for value in &args.values {
        let ok = if args.document_id {
            validate_document_id(value).is_some()
        } else {
            validate_key(value)
        };
        if ok {
            println!("ok       {value}");
        } else {
            println!("invalid  {value}");
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{failures} of {} values invalid", args.values.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ValidateArgs;

    #[test]
    fn test_any_invalid_value_fails_the_command() {
        let args = ValidateArgs {
            values: vec!["good-key".to_owned(), "bad key".to_owned()],
            document_id: false,
        };
        assert!(run(&args).is_err());
    }

    #[test]
    fn test_document_ids_validate() {
        let args = ValidateArgs {
            values: vec!["users/1234".to_owned()],
            document_id: true,
        };
        assert!(run(&args).is_ok());
    }
}
