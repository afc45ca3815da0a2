//! Binary-to-value decoder
//!
//! The inverse of the encoder: dispatch on the shape, slice the value bytes
//! with the offsets the layout prescribes and rebuild a [`Value`]. Dangling
//! shape or attribute ids are logged and skipped rather than failing the
//! whole document.

// this_file: crates/vellum-shaper/src/decode.rs

use std::sync::Arc;

use log::warn;
use vellum_core::types::ShapeId;
use vellum_core::{Result, Value, VellumError};

use crate::shape::{ObjectShape, Shape};
use crate::shaper::Shaper;
use crate::wire::{read_f64, read_u32, read_u64, read_u8, slice};
use crate::ShapedDocument;

/// One-entry cache for the common case of many siblings sharing a shape id
struct ShapeCache {
    sid: ShapeId,
    shape: Option<Arc<Shape>>,
}

impl ShapeCache {
    fn new() -> Self {
        Self {
            sid: 0,
            shape: None,
        }
    }

    fn get(&mut self, shaper: &Shaper, sid: ShapeId) -> Option<Arc<Shape>> {
        if self.sid == sid && self.shape.is_some() {
            return self.shape.clone();
        }
        self.sid = sid;
        self.shape = shaper.lookup_shape(sid);
        self.shape.clone()
    }
}

pub(crate) fn decode(shaper: &Shaper, document: &ShapedDocument) -> Result<Value> {
    let shape = shaper
        .lookup_shape(document.shape_id)
        .ok_or_else(|| VellumError::shaper(format!("unknown shape id {}", document.shape_id)))?;
    decode_value(shaper, &shape, &document.bytes)
}

fn decode_value(shaper: &Shaper, shape: &Shape, data: &[u8]) -> Result<Value> {
    match shape {
        Shape::Null => Ok(Value::Null),
        Shape::Boolean => Ok(Value::Bool(read_u8(data, 0)? != 0)),
        Shape::Number => Ok(Value::Number(read_f64(data, 0)?)),
        Shape::ShortString => decode_string(data, 1, read_u8(data, 0)? as usize),
        Shape::LongString => decode_string(data, 8, read_u64(data, 0)? as usize),
        Shape::List => decode_list(shaper, data),
        Shape::HomogeneousList { element } => decode_homogeneous_list(shaper, *element, data),
        Shape::HomogeneousSizedList {
            element,
            element_size,
        } => decode_homogeneous_sized_list(shaper, *element, *element_size, data),
        Shape::Object(object) => decode_object(shaper, object, data),
    }
}

/// Rebuild a string from a length-prefixed, NUL-terminated slot
///
/// `stored` counts the terminating NUL, so the payload is `stored - 1` bytes.
fn decode_string(data: &[u8], start: usize, stored: usize) -> Result<Value> {
    if stored == 0 {
        return Err(VellumError::shaper("string slot with zero stored length"));
    }
    let bytes = slice(data, start as u64, (start + stored - 1) as u64)?;
    let s = std::str::from_utf8(bytes)
        .map_err(|_| VellumError::shaper("string slot is not valid UTF-8"))?;
    Ok(Value::String(s.to_owned()))
}

fn decode_list(shaper: &Shaper, data: &[u8]) -> Result<Value> {
    let count = read_u32(data, 0)? as usize;
    if count == 0 {
        return Ok(Value::List(Vec::new()));
    }

    let sids_at = 4;
    let offsets_at = sids_at + count * 4;

    let mut cache = ShapeCache::new();
    let mut items = Vec::with_capacity(count);
    for i in 0..count {
        let sid = read_u32(data, sids_at + i * 4)?;
        let Some(subshape) = cache.get(shaper, sid) else {
            warn!("cannot find shape #{sid}");
            continue;
        };
        let start = read_u64(data, offsets_at + i * 8)?;
        let end = read_u64(data, offsets_at + (i + 1) * 8)?;
        items.push(decode_value(shaper, &subshape, slice(data, start, end)?)?);
    }
    Ok(Value::List(items))
}

fn decode_homogeneous_list(shaper: &Shaper, element: ShapeId, data: &[u8]) -> Result<Value> {
    let count = read_u32(data, 0)? as usize;
    let Some(subshape) = shaper.lookup_shape(element) else {
        warn!("cannot find shape #{element}");
        return Ok(Value::List(Vec::new()));
    };

    let offsets_at = 4;
    let mut items = Vec::with_capacity(count);
    for i in 0..count {
        let start = read_u64(data, offsets_at + i * 8)?;
        let end = read_u64(data, offsets_at + (i + 1) * 8)?;
        items.push(decode_value(shaper, &subshape, slice(data, start, end)?)?);
    }
    Ok(Value::List(items))
}

fn decode_homogeneous_sized_list(
    shaper: &Shaper,
    element: ShapeId,
    element_size: u64,
    data: &[u8],
) -> Result<Value> {
    let count = read_u32(data, 0)? as usize;
    if count == 0 {
        return Ok(Value::List(Vec::new()));
    }
    let Some(subshape) = shaper.lookup_shape(element) else {
        warn!("cannot find shape #{element}");
        return Ok(Value::List(Vec::new()));
    };

    let mut offset = 4u64;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(decode_value(
            shaper,
            &subshape,
            slice(data, offset, offset + element_size)?,
        )?);
        offset += element_size;
    }
    Ok(Value::List(items))
}

fn decode_object(shaper: &Shaper, object: &ObjectShape, data: &[u8]) -> Result<Value> {
    let mut cache = ShapeCache::new();
    let mut fields = Vec::with_capacity(object.field_count());

    for (i, field) in object.fixed.iter().enumerate() {
        let Some(subshape) = cache.get(shaper, field.shape) else {
            warn!("cannot find shape #{}", field.shape);
            continue;
        };
        let Some(name) = shaper.attribute_name(field.attribute) else {
            warn!("cannot find attribute #{}", field.attribute);
            continue;
        };
        let start = object.fixed_offsets[i];
        let end = object.fixed_offsets[i + 1];
        fields.push((
            name.to_string(),
            decode_value(shaper, &subshape, slice(data, start, end)?)?,
        ));
    }

    // variable-field offsets sit in-band at the start of the value bytes
    for (i, field) in object.variable.iter().enumerate() {
        let Some(subshape) = cache.get(shaper, field.shape) else {
            warn!("cannot find shape #{}", field.shape);
            continue;
        };
        let Some(name) = shaper.attribute_name(field.attribute) else {
            warn!("cannot find attribute #{}", field.attribute);
            continue;
        };
        let start = read_u64(data, i * 8)?;
        let end = read_u64(data, (i + 1) * 8)?;
        fields.push((
            name.to_string(),
            decode_value(shaper, &subshape, slice(data, start, end)?)?,
        ));
    }

    Ok(Value::Object(fields))
}
