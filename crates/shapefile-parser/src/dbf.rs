//! `.dbf` attribute table parsing (dBase III layout).
//!
//! ```text
//! Header (32 bytes)
//!   4..8    record count     u32 LE
//!   8..10   header length    u16 LE
//!   10..12  record length    u16 LE
//! Field descriptors (32 bytes each, terminated by 0x0D)
//!   0..11   name, NUL padded
//!   11      type (C N F L D M)
//!   16      length
//!   17      decimal count
//! Records: 1 deletion flag byte, then fixed-width field values
//! ```

use chrono::NaiveDate;
use storm_common::FieldValue;
use tracing::debug;

use crate::error::{ShapefileError, ShapefileResult};
use crate::read;

const DESCRIPTOR_LEN: usize = 32;
const HEADER_TERMINATOR: u8 = 0x0D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Character,
    Numeric,
    Float,
    Logical,
    Date,
    Memo,
    Other(char),
}

impl From<u8> for FieldType {
    fn from(code: u8) -> Self {
        match code {
            b'C' => FieldType::Character,
            b'N' => FieldType::Numeric,
            b'F' => FieldType::Float,
            b'L' => FieldType::Logical,
            b'D' => FieldType::Date,
            b'M' => FieldType::Memo,
            other => FieldType::Other(other as char),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub length: usize,
    pub decimal_count: u8,
}

#[derive(Debug, Clone)]
pub struct DbfHeader {
    pub record_count: usize,
    pub header_length: usize,
    pub record_length: usize,
    /// Data fields only; the deletion flag is not a field.
    pub fields: Vec<FieldDescriptor>,
}

pub fn parse_header(data: &[u8]) -> ShapefileResult<DbfHeader> {
    let record_count = read::u32_le(data, 4, "dbf")? as usize;
    let header_length = read::u16_le(data, 8, "dbf")? as usize;
    let record_length = read::u16_le(data, 10, "dbf")? as usize;

    let mut fields = Vec::new();
    let mut at = DESCRIPTOR_LEN;
    loop {
        let first = read::bytes(data, at, 1, "dbf")?[0];
        if first == HEADER_TERMINATOR || at >= header_length {
            break;
        }

        let raw = read::bytes(data, at, DESCRIPTOR_LEN, "dbf")?;
        let name_end = raw[..11].iter().position(|&b| b == 0).unwrap_or(11);
        let name = String::from_utf8_lossy(&raw[..name_end]).trim().to_string();
        if name.is_empty() {
            return Err(ShapefileError::InvalidField(format!(
                "unnamed field at byte {}",
                at
            )));
        }

        fields.push(FieldDescriptor {
            name,
            field_type: FieldType::from(raw[11]),
            length: raw[16] as usize,
            decimal_count: raw[17],
        });
        at += DESCRIPTOR_LEN;
    }

    let declared: usize = 1 + fields.iter().map(|f| f.length).sum::<usize>();
    if declared != record_length {
        return Err(ShapefileError::InvalidField(format!(
            "field widths sum to {} bytes but records are {}",
            declared, record_length
        )));
    }

    Ok(DbfHeader {
        record_count,
        header_length,
        record_length,
        fields,
    })
}

/// Decode every record as `(field name, value)` pairs in schema order.
///
/// Records flagged as deleted are still returned so that rows stay aligned
/// with the `.shp` records.
pub fn parse_records(
    data: &[u8],
    header: &DbfHeader,
) -> ShapefileResult<Vec<Vec<(String, FieldValue)>>> {
    if header.record_length == 0 {
        return Err(ShapefileError::InvalidField("zero-length records".to_string()));
    }
    // Reject counts the buffer cannot hold before allocating.
    let table_len = header.record_count.saturating_mul(header.record_length);
    read::bytes(data, header.header_length, table_len, "dbf")?;

    let mut records = Vec::with_capacity(header.record_count);

    for i in 0..header.record_count {
        let start = header.header_length + i * header.record_length;
        let raw = read::bytes(data, start, header.record_length, "dbf")?;
        if raw[0] == b'*' {
            debug!(record = i, "dbf record is flagged deleted");
        }

        let mut values = Vec::with_capacity(header.fields.len());
        let mut at = 1;
        for field in &header.fields {
            let value = decode_value(field, &raw[at..at + field.length]);
            values.push((field.name.clone(), value));
            at += field.length;
        }
        records.push(values);
    }

    Ok(records)
}

fn decode_value(field: &FieldDescriptor, raw: &[u8]) -> FieldValue {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim_matches(|c: char| c == ' ' || c == '\0');

    match field.field_type {
        FieldType::Numeric | FieldType::Float => {
            if text.is_empty() || text.chars().all(|c| c == '*') {
                return FieldValue::Null;
            }
            if field.decimal_count == 0 && !text.contains('.') {
                if let Ok(i) = text.parse::<i64>() {
                    return FieldValue::Integer(i);
                }
            }
            text.parse::<f64>()
                .map(FieldValue::Float)
                .unwrap_or(FieldValue::Null)
        }
        FieldType::Logical => match text {
            "Y" | "y" | "T" | "t" => FieldValue::Bool(true),
            "N" | "n" | "F" | "f" => FieldValue::Bool(false),
            _ => FieldValue::Null,
        },
        FieldType::Date => NaiveDate::parse_from_str(text, "%Y%m%d")
            .map(FieldValue::Date)
            .unwrap_or(FieldValue::Null),
        FieldType::Character | FieldType::Memo | FieldType::Other(_) => {
            FieldValue::Text(text.to_string())
        }
    }
}
