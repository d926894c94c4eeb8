//! Geometry-bearing result tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;
use crate::selection::CategoryCode;

/// Column name of the injected category code.
pub const CATCODE_COLUMN: &str = "CATCODE";

/// Column name of the injected surge issuance time.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// A decoded dBase attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// One row: a geometry joined with its attribute record.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    pub geometry: Geometry,
    /// Attributes in dbf schema order.
    pub attributes: Vec<(String, FieldValue)>,
    /// Set during assembly.
    pub catcode: Option<CategoryCode>,
    /// `YYYYMMDDHH` issuance time, surge archives only.
    pub timestamp: Option<String>,
}

impl TrackRecord {
    pub fn new(geometry: Geometry, attributes: Vec<(String, FieldValue)>) -> Self {
        Self {
            geometry,
            attributes,
            catcode: None,
            timestamp: None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.attributes
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Attribute names followed by the injected columns that are set.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = self.attributes.iter().map(|(name, _)| name.as_str()).collect();
        if self.catcode.is_some() {
            columns.push(CATCODE_COLUMN);
        }
        if self.timestamp.is_some() {
            columns.push(TIMESTAMP_COLUMN);
        }
        columns
    }
}

/// Ordered rows plus the projection they were published in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackTable {
    pub records: Vec<TrackRecord>,
    /// WKT from the archive's `.prj`.
    pub projection: Option<String>,
}

impl TrackTable {
    pub fn new(records: Vec<TrackRecord>) -> Self {
        Self {
            records,
            projection: None,
        }
    }

    pub fn with_projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = Some(projection.into());
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackRecord> {
        self.records.iter()
    }

    /// Keep only the first `n` rows.
    pub fn head(mut self, n: usize) -> Self {
        self.records.truncate(n);
        self
    }

    pub fn set_catcode(&mut self, code: &CategoryCode) {
        for record in &mut self.records {
            record.catcode = Some(code.clone());
        }
    }

    pub fn set_timestamp(&mut self, timestamp: &str) {
        for record in &mut self.records {
            record.timestamp = Some(timestamp.to_string());
        }
    }

    /// Append another table's rows in order.
    pub fn concat(&mut self, other: TrackTable) {
        if self.projection.is_none() {
            self.projection = other.projection;
        }
        self.records.extend(other.records);
    }
}

impl IntoIterator for TrackTable {
    type Item = TrackRecord;
    type IntoIter = std::vec::IntoIter<TrackRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a TrackTable {
    type Item = &'a TrackRecord;
    type IntoIter = std::slice::Iter<'a, TrackRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
