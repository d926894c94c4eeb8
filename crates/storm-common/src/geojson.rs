//! GeoJSON export of track tables.
//!
//! Properties carry the dbf attributes in schema order, followed by
//! `CATCODE` and `timestamp` when they were injected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StormResult;
use crate::geometry::Geometry;
use crate::table::{TrackRecord, TrackTable, CATCODE_COLUMN, TIMESTAMP_COLUMN};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Always "FeatureCollection".
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features.extend(features);
        self
    }

    pub fn to_json_string(&self) -> StormResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Always "Feature".
    #[serde(rename = "type")]
    pub type_: String,

    /// `None` for shapefile null shapes.
    pub geometry: Option<Geometry>,

    pub properties: Map<String, Value>,
}

impl From<&TrackRecord> for Feature {
    fn from(record: &TrackRecord) -> Self {
        let mut properties = Map::new();
        for (name, value) in &record.attributes {
            properties.insert(
                name.clone(),
                serde_json::to_value(value).unwrap_or(Value::Null),
            );
        }
        if let Some(code) = &record.catcode {
            properties.insert(CATCODE_COLUMN.to_string(), Value::String(code.to_string()));
        }
        if let Some(timestamp) = &record.timestamp {
            properties.insert(TIMESTAMP_COLUMN.to_string(), Value::String(timestamp.clone()));
        }

        let geometry = match &record.geometry {
            Geometry::Null => None,
            other => Some(other.clone()),
        };

        Self {
            type_: "Feature".to_string(),
            geometry,
            properties,
        }
    }
}

impl TrackTable {
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection::new().with_features(self.iter().map(Feature::from).collect())
    }
}
