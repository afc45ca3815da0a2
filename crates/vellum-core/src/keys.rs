//! Document-key and collection-name validation
//!
//! These helpers are shared between the key generators and the HTTP layer;
//! the alphabet and length limits are part of the external contract and must
//! not drift.

// this_file: crates/vellum-core/src/keys.rs

/// Maximum length of a document key in bytes
pub const MAX_KEY_LENGTH: usize = 254;

/// Maximum length of a collection name in bytes
pub const MAX_COLLECTION_NAME_LENGTH: usize = 64;

fn is_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b':' || b == b'-'
}

fn is_collection_name_start(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_collection_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Check whether a string is a valid document key
///
/// Valid keys are 1 to [`MAX_KEY_LENGTH`] bytes drawn from
/// `[A-Za-z0-9_:-]`.
pub fn validate_key(key: &str) -> bool {
    let bytes = key.as_bytes();
    !bytes.is_empty() && bytes.len() <= MAX_KEY_LENGTH && bytes.iter().all(|&b| is_key_byte(b))
}

/// Check whether a string is a valid collection name
///
/// The first character must match `[_A-Za-z0-9]`, the rest `[-_A-Za-z0-9]`,
/// and the whole name is at most [`MAX_COLLECTION_NAME_LENGTH`] bytes.
pub fn validate_collection_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.split_first() {
        Some((first, rest)) => {
            bytes.len() <= MAX_COLLECTION_NAME_LENGTH
                && is_collection_name_start(*first)
                && rest.iter().all(|&b| is_collection_name_byte(b))
        }
        None => false,
    }
}

/// Validate a document id of the form `collection/key`
///
/// Splits at the first `/`, validates the collection-name prefix and the key
/// suffix, and returns the two parts. Returns `None` if either part is
/// invalid or the separator is missing.
pub fn validate_document_id(id: &str) -> Option<(&str, &str)> {
    let (collection, key) = id.split_once('/')?;
    if validate_collection_name(collection) && validate_key(key) {
        Some((collection, key))
    } else {
        None
    }
}
