//! Append-only attribute and shape dictionaries
//!
//! Both dictionaries hand out small monotonically increasing ids that are
//! never reused, reassigned or deleted; an id any thread has seen stays valid
//! for the shaper's lifetime. Reads go straight to the concurrent maps; the
//! create path takes a single writer mutex so that minting an id, publishing
//! both directions and the persistence callout happen atomically.

// this_file: crates/vellum-shaper/src/dictionary.rs

use std::sync::Arc;

use dashmap::DashMap;
use log::trace;
use parking_lot::Mutex;
use vellum_core::types::{AttributeId, ShapeId};
use vellum_core::{Result, VellumError};

use crate::shape::Shape;

/// Persistence hook fired while a dictionary id is coined
///
/// Called under the dictionary's write lock, before the new entry becomes
/// visible to readers. An error aborts the insert; the id is not consumed.
/// The collection's datafile writer implements this to persist dictionary
/// markers; tests use it to observe create order.
pub trait DictionaryListener: Send + Sync {
    fn attribute_created(&self, id: AttributeId, name: &str) -> Result<()>;
    fn shape_created(&self, id: ShapeId, canonical: &[u8]) -> Result<()>;
}

/// Bijection between attribute names and attribute ids
pub(crate) struct AttributeDictionary {
    by_name: DashMap<String, AttributeId>,
    by_id: DashMap<AttributeId, Arc<str>>,
    next: Mutex<AttributeId>,
    listener: Option<Arc<dyn DictionaryListener>>,
}

impl AttributeDictionary {
    pub(crate) fn new(listener: Option<Arc<dyn DictionaryListener>>) -> Self {
        Self {
            by_name: DashMap::new(),
            by_id: DashMap::new(),
            next: Mutex::new(1),
            listener,
        }
    }

    /// Find the id for a name, creating it if unseen
    ///
    /// Idempotent under concurrency: all callers racing on the same name get
    /// the same id.
    pub(crate) fn find_or_create(&self, name: &str) -> Result<AttributeId> {
        if let Some(id) = self.by_name.get(name) {
            return Ok(*id);
        }

        let mut next = self.next.lock();
        // a concurrent creator may have won while we waited for the lock
        if let Some(id) = self.by_name.get(name) {
            return Ok(*id);
        }

        let id = *next;
        if id == AttributeId::MAX {
            return Err(VellumError::OutOfResources);
        }
        if let Some(listener) = &self.listener {
            listener.attribute_created(id, name)?;
        }

        self.by_id.insert(id, Arc::from(name));
        self.by_name.insert(name.to_owned(), id);
        *next = id + 1;

        trace!("issued attribute id {id} for {name:?}");
        Ok(id)
    }

    pub(crate) fn lookup_by_name(&self, name: &str) -> Option<AttributeId> {
        self.by_name.get(name).map(|id| *id)
    }

    pub(crate) fn lookup_by_id(&self, id: AttributeId) -> Option<Arc<str>> {
        self.by_id.get(&id).map(|name| Arc::clone(&name))
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Re-insert a persisted attribute while a collection is opened
    ///
    /// Replay must arrive in issue order: the id has to be at or above the
    /// next unissued id, and the name must be unseen.
    pub(crate) fn restore(&self, id: AttributeId, name: &str) -> Result<()> {
        let mut next = self.next.lock();
        if id < *next || id == AttributeId::MAX {
            return Err(VellumError::internal(format!(
                "attribute id {id} replayed out of order"
            )));
        }
        if self.by_name.contains_key(name) {
            return Err(VellumError::internal(format!(
                "attribute {name:?} replayed twice"
            )));
        }

        self.by_id.insert(id, Arc::from(name));
        self.by_name.insert(name.to_owned(), id);
        *next = id + 1;
        Ok(())
    }
}

/// Bijection between canonical shape bytes and shape ids
pub(crate) struct ShapeDictionary {
    by_bytes: DashMap<Vec<u8>, ShapeId>,
    by_id: DashMap<ShapeId, Arc<Shape>>,
    next: Mutex<ShapeId>,
    listener: Option<Arc<dyn DictionaryListener>>,
}

impl ShapeDictionary {
    /// Create the dictionary with the basic shapes pre-registered
    ///
    /// Basic shapes are implicit in the format and never reported to the
    /// listener.
    pub(crate) fn new(listener: Option<Arc<dyn DictionaryListener>>) -> Self {
        let dict = Self {
            by_bytes: DashMap::new(),
            by_id: DashMap::new(),
            next: Mutex::new(1),
            listener,
        };
        for shape in Shape::basics() {
            let mut next = dict.next.lock();
            let id = *next;
            dict.by_bytes.insert(shape.canonical_bytes(), id);
            dict.by_id.insert(id, Arc::new(shape));
            *next = id + 1;
        }
        dict
    }

    /// Find or intern a shape; identity is the canonical byte form
    pub(crate) fn find_or_create(&self, shape: Shape) -> Result<ShapeId> {
        let canonical = shape.canonical_bytes();
        if let Some(id) = self.by_bytes.get(&canonical) {
            return Ok(*id);
        }

        let mut next = self.next.lock();
        if let Some(id) = self.by_bytes.get(&canonical) {
            return Ok(*id);
        }

        let id = *next;
        if id == ShapeId::MAX {
            return Err(VellumError::OutOfResources);
        }
        if let Some(listener) = &self.listener {
            listener.shape_created(id, &canonical)?;
        }

        self.by_id.insert(id, Arc::new(shape));
        self.by_bytes.insert(canonical, id);
        *next = id + 1;

        trace!("issued shape id {id}");
        Ok(id)
    }

    /// Lookup-only variant used on the read side; never creates
    pub(crate) fn lookup_by_content(&self, shape: &Shape) -> Option<ShapeId> {
        self.by_bytes.get(&shape.canonical_bytes()).map(|id| *id)
    }

    pub(crate) fn lookup_by_id(&self, id: ShapeId) -> Option<Arc<Shape>> {
        self.by_id.get(&id).map(|shape| Arc::clone(&shape))
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Re-insert a persisted shape while a collection is opened
    pub(crate) fn restore(&self, id: ShapeId, shape: Shape) -> Result<()> {
        let mut next = self.next.lock();
        if id < *next || id == ShapeId::MAX {
            return Err(VellumError::internal(format!(
                "shape id {id} replayed out of order"
            )));
        }
        let canonical = shape.canonical_bytes();
        if self.by_bytes.contains_key(&canonical) {
            return Err(VellumError::internal(format!("shape {id} replayed twice")));
        }

        self.by_id.insert(id, Arc::new(shape));
        self.by_bytes.insert(canonical, id);
        *next = id + 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::basic;

    #[test]
    fn test_attribute_ids_start_at_one_and_increase() {
        let dict = AttributeDictionary::new(None);
        assert_eq!(dict.find_or_create("a").unwrap(), 1);
        assert_eq!(dict.find_or_create("b").unwrap(), 2);
        assert_eq!(dict.find_or_create("a").unwrap(), 1);
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.lookup_by_id(2).as_deref(), Some("b"));
        assert_eq!(dict.lookup_by_name("b"), Some(2));
        assert_eq!(dict.lookup_by_name("c"), None);
    }

    #[test]
    fn test_basic_shapes_are_preregistered() {
        let dict = ShapeDictionary::new(None);
        assert_eq!(dict.len(), 7);
        assert_eq!(dict.lookup_by_content(&Shape::Null), Some(basic::NULL));
        assert_eq!(dict.lookup_by_content(&Shape::List), Some(basic::LIST));
        assert!(matches!(
            dict.lookup_by_id(basic::NUMBER).as_deref(),
            Some(Shape::Number)
        ));
    }

    #[test]
    fn test_first_interned_shape_gets_first_dynamic_id() {
        let dict = ShapeDictionary::new(None);
        let shape = Shape::HomogeneousList {
            element: basic::NUMBER,
        };
        let id = dict.find_or_create(shape.clone()).unwrap();
        assert_eq!(id, basic::FIRST_DYNAMIC);
        assert_eq!(dict.find_or_create(shape).unwrap(), id);
    }

    #[test]
    fn test_restore_enforces_issue_order() {
        let dict = AttributeDictionary::new(None);
        dict.restore(5, "late").unwrap();
        assert_eq!(dict.lookup_by_name("late"), Some(5));
        // next issued id continues after the replayed one
        assert_eq!(dict.find_or_create("fresh").unwrap(), 6);
        assert!(dict.restore(3, "early").is_err());
        assert!(dict.restore(9, "late").is_err());
    }
}
