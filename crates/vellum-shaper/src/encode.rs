//! Value-to-binary encoder
//!
//! Shaping is a post-order walk: children are shaped first, then the parent
//! classifies them (list homogeneity, object fixed/variable split), interns
//! the resulting shape and lays the child bytes out accordingly.

// this_file: crates/vellum-shaper/src/encode.rs

use vellum_core::types::AttributeId;
use vellum_core::{Result, Value, VellumError};

use crate::shape::{basic, ObjectField, ObjectShape, Shape, SHORT_STRING_CUT};
use crate::shaper::Shaper;
use crate::ShapedDocument;

/// Nesting cap standing in for cycle detection: the owned value tree cannot
/// alias, so re-entering a node is impossible, but unboundedly deep inputs
/// would still blow the stack
const MAX_NESTING: usize = 200;

/// An intermediate shaped value during the post-order walk
struct ShapedValue {
    /// Attribute id when this value is an object member, 0 otherwise
    aid: AttributeId,
    sid: vellum_core::types::ShapeId,
    /// True when every value of this shape has the same byte length
    fixed: bool,
    bytes: Vec<u8>,
}

pub(crate) fn encode(shaper: &Shaper, value: &Value, create: bool) -> Result<ShapedDocument> {
    let shaped = shape_value(shaper, value, create, 0)?;
    Ok(ShapedDocument {
        shape_id: shaped.sid,
        bytes: shaped.bytes,
    })
}

fn shape_value(shaper: &Shaper, value: &Value, create: bool, depth: usize) -> Result<ShapedValue> {
    if depth > MAX_NESTING {
        return Err(VellumError::ShaperCycle);
    }

    match value {
        Value::Null => Ok(ShapedValue {
            aid: 0,
            sid: basic::NULL,
            fixed: true,
            bytes: Vec::new(),
        }),
        Value::Bool(b) => Ok(ShapedValue {
            aid: 0,
            sid: basic::BOOLEAN,
            fixed: true,
            bytes: vec![u8::from(*b)],
        }),
        Value::Number(n) => Ok(ShapedValue {
            aid: 0,
            sid: basic::NUMBER,
            fixed: true,
            bytes: n.to_le_bytes().to_vec(),
        }),
        Value::String(s) => Ok(shape_string(s)),
        Value::List(items) => shape_list(shaper, items, create, depth),
        Value::Object(fields) => shape_object(shaper, fields, create, depth),
    }
}

fn shape_string(s: &str) -> ShapedValue {
    let len = s.len();
    if len < SHORT_STRING_CUT {
        // one length byte (counting the NUL), data padded to the cut
        let mut bytes = vec![0u8; 1 + SHORT_STRING_CUT];
        bytes[0] = (len + 1) as u8;
        bytes[1..1 + len].copy_from_slice(s.as_bytes());
        ShapedValue {
            aid: 0,
            sid: basic::SHORT_STRING,
            fixed: true,
            bytes,
        }
    } else {
        let mut bytes = Vec::with_capacity(8 + len + 1);
        bytes.extend_from_slice(&(len as u64 + 1).to_le_bytes());
        bytes.extend_from_slice(s.as_bytes());
        bytes.push(0);
        ShapedValue {
            aid: 0,
            sid: basic::LONG_STRING,
            fixed: false,
            bytes,
        }
    }
}

fn shape_list(
    shaper: &Shaper,
    items: &[Value],
    create: bool,
    depth: usize,
) -> Result<ShapedValue> {
    // the empty list is its own special case: just a zero count
    if items.is_empty() {
        return Ok(ShapedValue {
            aid: 0,
            sid: basic::LIST,
            fixed: false,
            bytes: 0u32.to_le_bytes().to_vec(),
        });
    }

    let shaped = items
        .iter()
        .map(|item| shape_value(shaper, item, create, depth + 1))
        .collect::<Result<Vec<_>>>()?;

    let count = shaped.len();
    let total: usize = shaped.iter().map(|s| s.bytes.len()).sum();
    let first_sid = shaped[0].sid;
    let first_size = shaped[0].bytes.len();
    let same_shape = shaped.iter().all(|s| s.sid == first_sid);
    let same_size = shaped.iter().all(|s| s.bytes.len() == first_size);

    if same_shape && same_size {
        let sid = shaper.find_shape(
            Shape::HomogeneousSizedList {
                element: first_sid,
                element_size: first_size as u64,
            },
            create,
        )?;

        let mut bytes = Vec::with_capacity(4 + total);
        bytes.extend_from_slice(&(count as u32).to_le_bytes());
        for s in &shaped {
            bytes.extend_from_slice(&s.bytes);
        }
        Ok(ShapedValue {
            aid: 0,
            sid,
            fixed: false,
            bytes,
        })
    } else if same_shape {
        let sid = shaper.find_shape(Shape::HomogeneousList { element: first_sid }, create)?;

        let table = (count + 1) * 8;
        let mut bytes = Vec::with_capacity(4 + table + total);
        bytes.extend_from_slice(&(count as u32).to_le_bytes());
        let mut offset = (4 + table) as u64;
        for s in &shaped {
            bytes.extend_from_slice(&offset.to_le_bytes());
            offset += s.bytes.len() as u64;
        }
        bytes.extend_from_slice(&offset.to_le_bytes());
        for s in &shaped {
            bytes.extend_from_slice(&s.bytes);
        }
        Ok(ShapedValue {
            aid: 0,
            sid,
            fixed: false,
            bytes,
        })
    } else {
        let table = count * 4 + (count + 1) * 8;
        let mut bytes = Vec::with_capacity(4 + table + total);
        bytes.extend_from_slice(&(count as u32).to_le_bytes());
        for s in &shaped {
            bytes.extend_from_slice(&s.sid.to_le_bytes());
        }
        let mut offset = (4 + table) as u64;
        for s in &shaped {
            bytes.extend_from_slice(&offset.to_le_bytes());
            offset += s.bytes.len() as u64;
        }
        bytes.extend_from_slice(&offset.to_le_bytes());
        for s in &shaped {
            bytes.extend_from_slice(&s.bytes);
        }
        Ok(ShapedValue {
            aid: 0,
            sid: basic::LIST,
            fixed: false,
            bytes,
        })
    }
}

fn shape_object(
    shaper: &Shaper,
    fields: &[(String, Value)],
    create: bool,
    depth: usize,
) -> Result<ShapedValue> {
    let mut entries: Vec<ShapedValue> = Vec::with_capacity(fields.len());

    for (name, value) in fields {
        // reserved and nameless attributes never reach the shaper
        if name.is_empty() || name.starts_with('_') {
            continue;
        }

        let aid = if create {
            shaper.find_or_create_attribute(name)?
        } else {
            shaper.lookup_attribute(name).ok_or(VellumError::NotFound)?
        };

        let mut shaped = shape_value(shaper, value, create, depth + 1)?;
        shaped.aid = aid;
        entries.push(shaped);
    }

    {
        let mut aids: Vec<AttributeId> = entries.iter().map(|e| e.aid).collect();
        aids.sort_unstable();
        if aids.windows(2).any(|w| w[0] == w[1]) {
            return Err(VellumError::bad_parameter("duplicate attribute name"));
        }
    }

    // fixed block first, sorted by attribute id within each block
    entries.sort_by_key(|e| (!e.fixed, e.aid));
    let fixed_count = entries.iter().take_while(|e| e.fixed).count();
    let (fixed_entries, variable_entries) = entries.split_at(fixed_count);

    let table = (variable_entries.len() as u64 + 1) * 8;
    let fixed_len: u64 = fixed_entries.iter().map(|e| e.bytes.len() as u64).sum();
    let variable_len: u64 = variable_entries.iter().map(|e| e.bytes.len() as u64).sum();

    let mut fixed_offsets = Vec::with_capacity(fixed_entries.len() + 1);
    let mut offset = table;
    fixed_offsets.push(offset);
    for e in fixed_entries {
        offset += e.bytes.len() as u64;
        fixed_offsets.push(offset);
    }

    let mut bytes = Vec::with_capacity((table + fixed_len + variable_len) as usize);
    let mut variable_offset = table + fixed_len;
    bytes.extend_from_slice(&variable_offset.to_le_bytes());
    for e in variable_entries {
        variable_offset += e.bytes.len() as u64;
        bytes.extend_from_slice(&variable_offset.to_le_bytes());
    }
    for e in &entries {
        bytes.extend_from_slice(&e.bytes);
    }

    let shape = Shape::Object(ObjectShape {
        fixed: fixed_entries
            .iter()
            .map(|e| ObjectField {
                attribute: e.aid,
                shape: e.sid,
            })
            .collect(),
        variable: variable_entries
            .iter()
            .map(|e| ObjectField {
                attribute: e.aid,
                shape: e.sid,
            })
            .collect(),
        fixed_offsets,
    });
    let fixed = variable_entries.is_empty();
    let sid = shaper.find_shape(shape, create)?;

    Ok(ShapedValue {
        aid: 0,
        sid,
        fixed,
        bytes,
    })
}
