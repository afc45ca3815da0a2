//! Shape records and their canonical byte form
//!
//! A shape describes the layout of a value without its payload. Shapes are
//! immutable once interned; their identity is the hash of the canonical byte
//! image produced by [`Shape::canonical_bytes`], so structurally equal shapes
//! coming from different documents collapse onto one id.

// this_file: crates/vellum-shaper/src/shape.rs

use vellum_core::types::{AttributeId, ShapeId};

/// Strings whose UTF-8 byte length is below this cut are stored inline in a
/// fixed-width short-string slot (one length byte plus this many data bytes,
/// NUL terminated)
pub const SHORT_STRING_CUT: usize = 8;

/// Sentinel in the canonical byte form for variable-size shapes
const VARIABLE_SIZE: u64 = u64::MAX;

/// Reserved ids for the basic shapes, issued at shaper construction
pub mod basic {
    use vellum_core::types::ShapeId;

    pub const NULL: ShapeId = 1;
    pub const BOOLEAN: ShapeId = 2;
    pub const NUMBER: ShapeId = 3;
    pub const SHORT_STRING: ShapeId = 4;
    pub const LONG_STRING: ShapeId = 5;
    /// Generic list; also the shape of the empty list
    pub const LIST: ShapeId = 6;
    /// The object with no attributes
    pub const EMPTY_OBJECT: ShapeId = 7;

    /// First id handed out for interned non-basic shapes
    pub const FIRST_DYNAMIC: ShapeId = 8;
}

/// One attribute slot of an object shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectField {
    pub attribute: AttributeId,
    pub shape: ShapeId,
}

/// Layout of an object value
///
/// Fields whose shape is fixed-size live in the fixed block and their offsets
/// are part of the shape itself; variable-size fields follow in a second
/// block whose offsets are stored in-band at the start of each value. Both
/// field lists are sorted by attribute id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectShape {
    pub fixed: Vec<ObjectField>,
    pub variable: Vec<ObjectField>,
    /// `fixed.len() + 1` offsets into the value bytes; the first one equals
    /// the size of the in-band variable offset table
    pub fixed_offsets: Vec<u64>,
}

impl ObjectShape {
    /// The shape of `{}`
    pub fn empty() -> Self {
        Self {
            fixed: Vec::new(),
            variable: Vec::new(),
            fixed_offsets: vec![8],
        }
    }

    pub fn field_count(&self) -> usize {
        self.fixed.len() + self.variable.len()
    }
}

/// A structural template for document values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Null,
    Boolean,
    Number,
    ShortString,
    LongString,
    /// Generic heterogeneous list; element shape ids live in the value bytes
    List,
    /// All elements share one shape, sizes differ
    HomogeneousList { element: ShapeId },
    /// All elements share one shape and one size; offsets are implicit
    HomogeneousSizedList { element: ShapeId, element_size: u64 },
    Object(ObjectShape),
}

impl Shape {
    fn tag(&self) -> u32 {
        match self {
            Shape::Null => 1,
            Shape::Boolean => 2,
            Shape::Number => 3,
            Shape::ShortString => 4,
            Shape::LongString => 5,
            Shape::List => 6,
            Shape::HomogeneousList { .. } => 7,
            Shape::HomogeneousSizedList { .. } => 8,
            Shape::Object(_) => 9,
        }
    }

    /// Size in bytes of a value of this shape, `None` when variable
    pub fn data_size(&self) -> Option<u64> {
        match self {
            Shape::Null => Some(0),
            Shape::Boolean => Some(1),
            Shape::Number => Some(8),
            Shape::ShortString => Some(1 + SHORT_STRING_CUT as u64),
            Shape::LongString
            | Shape::List
            | Shape::HomogeneousList { .. }
            | Shape::HomogeneousSizedList { .. } => None,
            Shape::Object(obj) => {
                if obj.variable.is_empty() {
                    obj.fixed_offsets.last().copied()
                } else {
                    None
                }
            }
        }
    }

    /// Canonical little-endian byte image; shape identity is defined over
    /// exactly these bytes
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16);
        out.extend_from_slice(&self.tag().to_le_bytes());
        out.extend_from_slice(&self.data_size().unwrap_or(VARIABLE_SIZE).to_le_bytes());

        match self {
            Shape::Null
            | Shape::Boolean
            | Shape::Number
            | Shape::ShortString
            | Shape::LongString
            | Shape::List => {}
            Shape::HomogeneousList { element } => {
                out.extend_from_slice(&element.to_le_bytes());
            }
            Shape::HomogeneousSizedList {
                element,
                element_size,
            } => {
                out.extend_from_slice(&element.to_le_bytes());
                out.extend_from_slice(&element_size.to_le_bytes());
            }
            Shape::Object(obj) => {
                out.extend_from_slice(&(obj.fixed.len() as u32).to_le_bytes());
                out.extend_from_slice(&(obj.variable.len() as u32).to_le_bytes());
                for field in obj.fixed.iter().chain(&obj.variable) {
                    out.extend_from_slice(&field.shape.to_le_bytes());
                }
                for field in obj.fixed.iter().chain(&obj.variable) {
                    out.extend_from_slice(&field.attribute.to_le_bytes());
                }
                for offset in &obj.fixed_offsets {
                    out.extend_from_slice(&offset.to_le_bytes());
                }
            }
        }

        out
    }

    /// The basic shapes, in id order starting at [`basic::NULL`]
    pub(crate) fn basics() -> [Shape; 7] {
        [
            Shape::Null,
            Shape::Boolean,
            Shape::Number,
            Shape::ShortString,
            Shape::LongString,
            Shape::List,
            Shape::Object(ObjectShape::empty()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_shapes_share_canonical_bytes() {
        let a = Shape::HomogeneousSizedList {
            element: basic::NUMBER,
            element_size: 8,
        };
        let b = Shape::HomogeneousSizedList {
            element: basic::NUMBER,
            element_size: 8,
        };
        assert_eq!(a.canonical_bytes(), b.canonical_bytes());
    }

    #[test]
    fn test_distinct_shapes_have_distinct_bytes() {
        let shapes = [
            Shape::Null,
            Shape::Boolean,
            Shape::List,
            Shape::HomogeneousList {
                element: basic::NUMBER,
            },
            Shape::HomogeneousSizedList {
                element: basic::NUMBER,
                element_size: 8,
            },
            Shape::Object(ObjectShape::empty()),
        ];
        for (i, a) in shapes.iter().enumerate() {
            for (j, b) in shapes.iter().enumerate() {
                if i != j {
                    assert_ne!(a.canonical_bytes(), b.canonical_bytes());
                }
            }
        }
    }

    #[test]
    fn test_data_sizes() {
        assert_eq!(Shape::Null.data_size(), Some(0));
        assert_eq!(Shape::Boolean.data_size(), Some(1));
        assert_eq!(Shape::Number.data_size(), Some(8));
        assert_eq!(Shape::ShortString.data_size(), Some(9));
        assert_eq!(Shape::LongString.data_size(), None);
        assert_eq!(Shape::Object(ObjectShape::empty()).data_size(), Some(8));
    }
}
