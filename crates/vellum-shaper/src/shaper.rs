//! The shaper facade
//!
//! Ties the dictionaries, the codec and the accessor cache together behind
//! the interface the rest of the system programs against.

// this_file: crates/vellum-shaper/src/shaper.rs

use std::sync::Arc;

use moka::sync::Cache;
use vellum_core::types::{AttributeId, ShapeId};
use vellum_core::{Result, Value};

use crate::accessor::{self, Accessor, Extraction};
use crate::decode;
use crate::dictionary::{AttributeDictionary, DictionaryListener, ShapeDictionary};
use crate::encode;
use crate::shape::Shape;
use crate::ShapedDocument;

/// Bound on distinct `(shape, path)` pairs kept hot
const ACCESSOR_CACHE_CAPACITY: u64 = 16 * 1024;

/// Dictionary of shapes and attributes plus the document codec
///
/// One shaper belongs to one collection. Ids it hands out stay valid for its
/// whole lifetime; the dictionaries only ever grow. All methods take `&self`
/// and are safe to call from any number of threads: lookups read concurrent
/// maps directly, creation serialises on an internal writer mutex.
pub struct Shaper {
    attributes: AttributeDictionary,
    shapes: ShapeDictionary,
    accessors: Cache<(ShapeId, String), Arc<Accessor>>,
}

impl Shaper {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a shaper whose dictionary inserts are reported to `listener`
    ///
    /// The listener runs under the write lock, before the new id becomes
    /// visible; a listener error aborts the insert.
    pub fn with_listener(listener: Arc<dyn DictionaryListener>) -> Self {
        Self::build(Some(listener))
    }

    fn build(listener: Option<Arc<dyn DictionaryListener>>) -> Self {
        Self {
            attributes: AttributeDictionary::new(listener.clone()),
            shapes: ShapeDictionary::new(listener),
            accessors: Cache::new(ACCESSOR_CACHE_CAPACITY),
        }
    }

    // ---- attribute dictionary -------------------------------------------

    /// Intern an attribute name, returning its stable id
    pub fn find_or_create_attribute(&self, name: &str) -> Result<AttributeId> {
        self.attributes.find_or_create(name)
    }

    /// Read-only lookup of an attribute id by name
    pub fn lookup_attribute(&self, name: &str) -> Option<AttributeId> {
        self.attributes.lookup_by_name(name)
    }

    /// Name bound to an attribute id
    pub fn attribute_name(&self, id: AttributeId) -> Option<Arc<str>> {
        self.attributes.lookup_by_id(id)
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    // ---- shape dictionary -----------------------------------------------

    /// Intern a shape, returning its stable id
    pub fn find_or_create_shape(&self, shape: Shape) -> Result<ShapeId> {
        self.shapes.find_or_create(shape)
    }

    /// Shape bound to a shape id
    pub fn lookup_shape(&self, id: ShapeId) -> Option<Arc<Shape>> {
        self.shapes.lookup_by_id(id)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Find a shape id, minting it only when `create` is set
    ///
    /// The read side uses `create = false` so that predicate evaluation over
    /// unseen structures reports [`vellum_core::VellumError::NotFound`]
    /// instead of growing the dictionary.
    pub(crate) fn find_shape(&self, shape: Shape, create: bool) -> Result<ShapeId> {
        if create {
            self.shapes.find_or_create(shape)
        } else {
            self.shapes
                .lookup_by_content(&shape)
                .ok_or(vellum_core::VellumError::NotFound)
        }
    }

    // ---- codec ----------------------------------------------------------

    /// Encode a value into its shaped binary form
    ///
    /// With `create = false` any unseen attribute name or shape fails with
    /// `NotFound` and the dictionaries are left untouched.
    pub fn encode(&self, value: &Value, create: bool) -> Result<ShapedDocument> {
        encode::encode(self, value, create)
    }

    /// Decode a shaped document back into a value
    pub fn decode(&self, document: &ShapedDocument) -> Result<Value> {
        decode::decode(self, document)
    }

    // ---- accessors ------------------------------------------------------

    /// Resolve (or fetch the cached) accessor for a dotted attribute path
    ///
    /// Misses resolve exactly once per `(shape, path)` pair; concurrent
    /// callers racing on the same pair share one resolution.
    pub fn find_accessor(&self, shape_id: ShapeId, path: &str) -> Arc<Accessor> {
        self.accessors
            .get_with((shape_id, path.to_owned()), || {
                Arc::new(accessor::resolve(self, shape_id, path))
            })
    }

    /// Extract a sub-value's shape and bytes from a document by path
    pub fn extract<'a>(
        &self,
        document: &'a ShapedDocument,
        path: &str,
    ) -> Result<Extraction<'a>> {
        self.find_accessor(document.shape_id, path)
            .extract(&document.bytes)
    }

    // ---- dictionary replay ----------------------------------------------

    /// Re-insert a persisted attribute while the collection is opened
    pub fn restore_attribute(&self, id: AttributeId, name: &str) -> Result<()> {
        self.attributes.restore(id, name)
    }

    /// Re-insert a persisted shape while the collection is opened
    pub fn restore_shape(&self, id: ShapeId, shape: Shape) -> Result<()> {
        self.shapes.restore(id, shape)
    }
}

impl Default for Shaper {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Shaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shaper")
            .field("attributes", &self.attributes.len())
            .field("shapes", &self.shapes.len())
            .finish()
    }
}
