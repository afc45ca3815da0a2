//! Vellum keys - document-key generators
//!
//! Every collection owns one key generator. It either validates the keys
//! users supply or produces new ones, and it survives collection restarts by
//! serialising its parameters (and, for the auto-increment flavour, its
//! high-water mark) to JSON.
//!
//! Generators perform no I/O and no locking of their own; the owning
//! collection serialises all mutation under its write lock, which is why the
//! mutating methods take `&mut self`.
//!
//! ```
//! use vellum_keys::create_key_generator;
//!
//! // no options: a traditional generator that allows user keys
//! let mut generator = create_key_generator(None)?;
//! assert_eq!(generator.generate(1234, None, false)?, "1234");
//! assert_eq!(generator.generate(0, Some("my-key"), false)?, "my-key");
//! # Ok::<(), vellum_core::VellumError>(())
//! ```

pub mod autoincrement;
pub mod traditional;

pub use autoincrement::AutoIncrementKeyGenerator;
pub use traditional::TraditionalKeyGenerator;

use log::trace;
use serde::{Deserialize, Serialize};
use vellum_core::{Result, VellumError};

/// A key generator bound to one collection
///
/// Lifecycle: built from a JSON options blob when the collection opens
/// ([`create_key_generator`]), serialised back via [`KeyGenerator::options`]
/// when it closes, dropped with the collection.
pub trait KeyGenerator: Send + std::fmt::Debug {
    /// Type name of this generator, as it appears in the options JSON
    fn name(&self) -> &'static str;

    /// Produce or validate a document key
    ///
    /// With a user-supplied key the generator validates it (subject to its
    /// `allowUserKeys` setting, bypassed during restore); without one it
    /// derives a fresh key, for the traditional flavour from the caller's
    /// `tick`.
    fn generate(&mut self, tick: u64, user_key: Option<&str>, is_restore: bool) -> Result<String>;

    /// Observe a replayed key while the collection is re-opened
    ///
    /// Advances internal state without generating; the default does nothing.
    fn track(&mut self, _key: &str) {}

    /// Current parameters, sufficient to rebuild this generator exactly
    fn options(&self) -> KeyGeneratorOptions;
}

/// Serialisable key-generator parameters
///
/// The JSON form is part of the external contract:
/// `{"type":"traditional","allowUserKeys":bool}` or
/// `{"type":"autoincrement","allowUserKeys":bool,"offset":u64,
/// "increment":u64,"lastValue":u64}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeyGeneratorOptions {
    #[serde(rename_all = "camelCase")]
    Traditional {
        #[serde(default = "default_allow_user_keys")]
        allow_user_keys: bool,
    },
    #[serde(rename_all = "camelCase")]
    Autoincrement {
        #[serde(default = "default_allow_user_keys")]
        allow_user_keys: bool,
        #[serde(default)]
        offset: u64,
        #[serde(default = "default_increment")]
        increment: u64,
        #[serde(default)]
        last_value: u64,
    },
}

fn default_allow_user_keys() -> bool {
    true
}

fn default_increment() -> u64 {
    1
}

/// Build a generator from its serialised options
pub fn from_options(options: &KeyGeneratorOptions) -> Result<Box<dyn KeyGenerator>> {
    match *options {
        KeyGeneratorOptions::Traditional { allow_user_keys } => {
            trace!("created traditional key-generator (allowUserKeys: {allow_user_keys})");
            Ok(Box::new(TraditionalKeyGenerator::new(allow_user_keys)))
        }
        KeyGeneratorOptions::Autoincrement {
            allow_user_keys,
            offset,
            increment,
            last_value,
        } => {
            let generator =
                AutoIncrementKeyGenerator::with_last_value(allow_user_keys, offset, increment, last_value)?;
            trace!(
                "created autoincrement key-generator (allowUserKeys: {allow_user_keys}, \
                 increment: {increment}, offset: {offset})"
            );
            Ok(Box::new(generator))
        }
    }
}

/// Build a generator from a raw JSON options blob
///
/// A missing blob, a non-object blob or a missing/non-string `type` field all
/// fall back to a traditional generator; type names match case-insensitively.
/// Unknown type names and out-of-range parameters are
/// [`VellumError::InvalidKeyGenerator`].
pub fn create_key_generator(
    parameters: Option<&serde_json::Value>,
) -> Result<Box<dyn KeyGenerator>> {
    let options = parse_parameters(parameters)?;
    from_options(&options)
}

fn parse_parameters(parameters: Option<&serde_json::Value>) -> Result<KeyGeneratorOptions> {
    let Some(serde_json::Value::Object(map)) = parameters else {
        return Ok(KeyGeneratorOptions::Traditional {
            allow_user_keys: true,
        });
    };

    let type_name = match map.get("type") {
        Some(serde_json::Value::String(name)) => name.as_str(),
        _ => traditional::NAME,
    };

    let allow_user_keys = match map.get("allowUserKeys") {
        Some(serde_json::Value::Bool(b)) => *b,
        _ => true,
    };

    if type_name.eq_ignore_ascii_case(traditional::NAME) {
        Ok(KeyGeneratorOptions::Traditional { allow_user_keys })
    } else if type_name.eq_ignore_ascii_case(autoincrement::NAME) {
        Ok(KeyGeneratorOptions::Autoincrement {
            allow_user_keys,
            offset: json_u64(map.get("offset")).unwrap_or(0),
            increment: json_u64(map.get("increment")).unwrap_or(1),
            last_value: json_u64(map.get("lastValue")).unwrap_or(0),
        })
    } else {
        Err(VellumError::invalid_generator(format!(
            "unknown key generator type {type_name:?}"
        )))
    }
}

fn json_u64(value: Option<&serde_json::Value>) -> Option<u64> {
    let number = value?.as_number()?;
    number
        .as_u64()
        .or_else(|| number.as_f64().map(|f| f as u64))
}
