//! `.shx` index file parsing.

use crate::error::{ShapefileError, ShapefileResult};
use crate::read;
use crate::shp::{self, HEADER_LEN};

/// Location of one record in the `.shp`, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub offset: usize,
    pub content_length: usize,
}

/// Parse all index entries. The entry count is the dataset's record count.
pub fn parse_index(data: &[u8]) -> ShapefileResult<Vec<IndexEntry>> {
    let header = shp::parse_header(data, "shx")?;

    // Trust the declared length only as far as the buffer goes.
    let end = header.file_length.min(data.len());
    if end < HEADER_LEN || (end - HEADER_LEN) % 8 != 0 {
        return Err(ShapefileError::InvalidHeader {
            file: "shx",
            reason: format!("index length {} is not 100 + 8n bytes", end),
        });
    }

    let mut entries = Vec::with_capacity((end - HEADER_LEN) / 8);
    let mut at = HEADER_LEN;
    while at < end {
        let offset = read::i32_be(data, at, "shx")?;
        let length = read::i32_be(data, at + 4, "shx")?;
        if offset < 0 || length < 0 {
            return Err(ShapefileError::InvalidHeader {
                file: "shx",
                reason: format!("negative entry at byte {}", at),
            });
        }
        entries.push(IndexEntry {
            offset: offset as usize * 2,
            content_length: length as usize * 2,
        });
        at += 8;
    }

    Ok(entries)
}
