//! Little-endian read helpers for document bytes

// this_file: crates/vellum-shaper/src/wire.rs

use vellum_core::{Result, VellumError};

fn truncated(what: &str) -> VellumError {
    VellumError::shaper(format!("document bytes truncated reading {what}"))
}

pub(crate) fn read_u8(data: &[u8], at: usize) -> Result<u8> {
    data.get(at).copied().ok_or_else(|| truncated("u8"))
}

pub(crate) fn read_u32(data: &[u8], at: usize) -> Result<u32> {
    let bytes: [u8; 4] = data
        .get(at..at + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| truncated("u32"))?;
    Ok(u32::from_le_bytes(bytes))
}

pub(crate) fn read_u64(data: &[u8], at: usize) -> Result<u64> {
    let bytes: [u8; 8] = data
        .get(at..at + 8)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| truncated("u64"))?;
    Ok(u64::from_le_bytes(bytes))
}

pub(crate) fn read_f64(data: &[u8], at: usize) -> Result<f64> {
    Ok(f64::from_bits(read_u64(data, at)?))
}

/// Slice `data[start..end]`, reporting truncation as a shaper failure
pub(crate) fn slice(data: &[u8], start: u64, end: u64) -> Result<&[u8]> {
    data.get(start as usize..end as usize)
        .ok_or_else(|| truncated("value slice"))
}
