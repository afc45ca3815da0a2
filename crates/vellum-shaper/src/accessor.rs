//! Compiled attribute-path accessors
//!
//! Extracting a sub-value by path is the hot operation on the read side:
//! index lookups and predicate evaluation hit the same `(shape, path)` pairs
//! over and over. An [`Accessor`] resolves a dotted path against a shape once
//! and records, per step, either a fixed byte range (known from the shape) or
//! the variable-offset slot to read in-band. Applying it to a document is
//! then a handful of slice operations.

// this_file: crates/vellum-shaper/src/accessor.rs

use vellum_core::types::ShapeId;
use vellum_core::Result;

use crate::shape::Shape;
use crate::shaper::Shaper;
use crate::wire::{read_u64, slice};

#[derive(Debug, Clone, Copy)]
enum Step {
    /// Byte range known from the shape's fixed-offset table
    Fixed { start: u64, end: u64 },
    /// Offsets read from the in-band table at the start of the value bytes
    Variable { slot: usize },
}

#[derive(Debug)]
struct Resolved {
    steps: Vec<Step>,
    result_shape: ShapeId,
}

/// A path lookup compiled against one shape
///
/// Accessors are immutable and shareable; the shaper caches them under
/// `(ShapeId, path)`. An accessor whose path does not exist in the shape is
/// the `Absent` sentinel and extracts to [`Extraction::Absent`] forever -
/// shapes never change after interning.
#[derive(Debug)]
pub struct Accessor {
    shape_id: ShapeId,
    path: String,
    resolved: Option<Resolved>,
}

/// Result of applying an accessor to a document's bytes
#[derive(Debug, PartialEq, Eq)]
pub enum Extraction<'a> {
    /// The path does not exist in the document's shape
    Absent,
    /// Shape id and value bytes of the sub-value
    Found { shape_id: ShapeId, bytes: &'a [u8] },
}

impl Accessor {
    /// Shape this accessor was resolved against
    pub fn shape_id(&self) -> ShapeId {
        self.shape_id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when the path exists in the shape
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    /// Extract the sub-value from a document of the accessor's shape
    pub fn extract<'a>(&self, data: &'a [u8]) -> Result<Extraction<'a>> {
        let Some(resolved) = &self.resolved else {
            return Ok(Extraction::Absent);
        };

        let mut bytes = data;
        for step in &resolved.steps {
            match *step {
                Step::Fixed { start, end } => {
                    bytes = slice(bytes, start, end)?;
                }
                Step::Variable { slot } => {
                    let start = read_u64(bytes, slot * 8)?;
                    let end = read_u64(bytes, (slot + 1) * 8)?;
                    bytes = slice(bytes, start, end)?;
                }
            }
        }

        Ok(Extraction::Found {
            shape_id: resolved.result_shape,
            bytes,
        })
    }
}

/// Resolve a dotted attribute path against a shape
pub(crate) fn resolve(shaper: &Shaper, shape_id: ShapeId, path: &str) -> Accessor {
    let absent = |path: &str| Accessor {
        shape_id,
        path: path.to_owned(),
        resolved: None,
    };

    let mut steps = Vec::new();
    let mut sid = shape_id;

    for segment in path.split('.') {
        let Some(aid) = shaper.lookup_attribute(segment) else {
            return absent(path);
        };
        let Some(shape) = shaper.lookup_shape(sid) else {
            return absent(path);
        };
        let Shape::Object(object) = &*shape else {
            return absent(path);
        };

        if let Some(i) = object.fixed.iter().position(|f| f.attribute == aid) {
            steps.push(Step::Fixed {
                start: object.fixed_offsets[i],
                end: object.fixed_offsets[i + 1],
            });
            sid = object.fixed[i].shape;
        } else if let Some(i) = object.variable.iter().position(|f| f.attribute == aid) {
            steps.push(Step::Variable { slot: i });
            sid = object.variable[i].shape;
        } else {
            return absent(path);
        }
    }

    Accessor {
        shape_id,
        path: path.to_owned(),
        resolved: Some(Resolved {
            steps,
            result_shape: sid,
        }),
    }
}
