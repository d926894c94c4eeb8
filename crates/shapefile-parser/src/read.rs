//! Bounds-checked primitive reads.

use crate::error::{ShapefileError, ShapefileResult};

fn slice<'a>(
    data: &'a [u8],
    offset: usize,
    len: usize,
    file: &'static str,
) -> ShapefileResult<&'a [u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or(ShapefileError::Truncated { file, offset })
}

pub(crate) fn i32_be(data: &[u8], offset: usize, file: &'static str) -> ShapefileResult<i32> {
    let b = slice(data, offset, 4, file)?;
    Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn i32_le(data: &[u8], offset: usize, file: &'static str) -> ShapefileResult<i32> {
    let b = slice(data, offset, 4, file)?;
    Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn u16_le(data: &[u8], offset: usize, file: &'static str) -> ShapefileResult<u16> {
    let b = slice(data, offset, 2, file)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn u32_le(data: &[u8], offset: usize, file: &'static str) -> ShapefileResult<u32> {
    let b = slice(data, offset, 4, file)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn f64_le(data: &[u8], offset: usize, file: &'static str) -> ShapefileResult<f64> {
    let b = slice(data, offset, 8, file)?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(b);
    Ok(f64::from_le_bytes(buf))
}

pub(crate) fn bytes<'a>(
    data: &'a [u8],
    offset: usize,
    len: usize,
    file: &'static str,
) -> ShapefileResult<&'a [u8]> {
    slice(data, offset, len, file)
}

/// Non-negative count read as little-endian i32.
pub(crate) fn count_le(data: &[u8], offset: usize, file: &'static str) -> ShapefileResult<usize> {
    let n = i32_le(data, offset, file)?;
    usize::try_from(n).map_err(|_| ShapefileError::InvalidHeader {
        file,
        reason: format!("negative count {} at byte {}", n, offset),
    })
}
