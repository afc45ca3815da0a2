//! Tick-based key generator

// this_file: crates/vellum-keys/src/traditional.rs

use vellum_core::keys::validate_key;
use vellum_core::{Result, VellumError};

use crate::{KeyGenerator, KeyGeneratorOptions};

pub(crate) const NAME: &str = "traditional";

/// The default generator: user keys pass validation, generated keys are the
/// decimal form of the caller-supplied tick
#[derive(Debug)]
pub struct TraditionalKeyGenerator {
    allow_user_keys: bool,
}

impl TraditionalKeyGenerator {
    pub fn new(allow_user_keys: bool) -> Self {
        Self { allow_user_keys }
    }
}

impl KeyGenerator for TraditionalKeyGenerator {
    fn name(&self) -> &'static str {
        NAME
    }

    fn generate(&mut self, tick: u64, user_key: Option<&str>, is_restore: bool) -> Result<String> {
        match user_key {
            Some(key) => {
                if !self.allow_user_keys && !is_restore {
                    return Err(VellumError::KeyUnexpected);
                }
                // empty, overlong and ill-formed keys all collapse to KeyBad
                if !validate_key(key) {
                    return Err(VellumError::KeyBad);
                }
                Ok(key.to_owned())
            }
            None => Ok(tick.to_string()),
        }
    }

    fn options(&self) -> KeyGeneratorOptions {
        KeyGeneratorOptions::Traditional {
            allow_user_keys: self.allow_user_keys,
        }
    }
}
