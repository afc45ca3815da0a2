//! Vellum shaper - self-describing binary documents
//!
//! The shaper turns document [`Value`](vellum_core::Value)s into compact
//! binary form and back. The structural template of a document (its "shape")
//! and every attribute name are interned into append-only dictionaries, so
//! repeated structure is stored once and each document only carries its
//! payload bytes plus a shape id.
//!
//! # Overview
//!
//! - [`Shaper`] - the facade: dictionaries + encoder + decoder + accessors
//! - [`Shape`] - an immutable structural template, identified by its
//!   canonical byte image
//! - [`ShapedDocument`] - a `(ShapeId, bytes)` pair, decodable with nothing
//!   but the shaper that produced it
//! - [`Accessor`] - a compiled path lookup for hot read paths
//!
//! # Quick start
//!
//! ```
//! use vellum_core::Value;
//! use vellum_shaper::Shaper;
//!
//! let shaper = Shaper::new();
//! let doc = Value::object([
//!     ("name".to_owned(), Value::from("vellum")),
//!     ("stars".to_owned(), Value::Number(7.0)),
//! ]);
//!
//! let shaped = shaper.encode(&doc, true)?;
//! let decoded = shaper.decode(&shaped)?;
//! assert_eq!(doc, decoded);
//! # Ok::<(), vellum_core::VellumError>(())
//! ```

pub mod accessor;
pub mod dictionary;
pub mod shape;
pub mod shaper;

mod decode;
mod encode;
mod wire;

pub use accessor::{Accessor, Extraction};
pub use dictionary::DictionaryListener;
pub use shape::{basic, ObjectField, ObjectShape, Shape, SHORT_STRING_CUT};
pub use shaper::Shaper;

use vellum_core::types::ShapeId;

/// A shaped document: a shape id plus the dense value bytes
///
/// The bytes are little-endian and fully self-describing given the shape
/// dictionary of the shaper that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedDocument {
    pub shape_id: ShapeId,
    pub bytes: Vec<u8>,
}
