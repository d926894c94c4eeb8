//! Caller-supplied query inputs: which storms to fetch and how to label them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{StormError, StormResult};

/// Requested storms keyed by season year.
///
/// Names are matched against the agency index pages as whole tokens, ignoring
/// ASCII case, and the spelling given here is the one that ends up as the
/// storm key in discovery results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StormSelection {
    years: BTreeMap<i32, Vec<String>>,
}

impl StormSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a storm to a season, ignoring duplicates.
    pub fn with_storm(mut self, year: i32, name: impl Into<String>) -> Self {
        self.insert(year, name);
        self
    }

    pub fn insert(&mut self, year: i32, name: impl Into<String>) {
        let name = name.into();
        let storms = self.years.entry(year).or_default();
        if !storms.iter().any(|s| s == &name) {
            storms.push(name);
        }
    }

    /// Requested years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn storms(&self, year: i32) -> &[String] {
        self.years.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.years.values().all(Vec::is_empty)
    }

    /// Find the requested storm whose name equals `token`.
    ///
    /// Any requested year qualifies. Returns the caller's spelling.
    pub fn find_storm(&self, token: &str) -> Option<&str> {
        self.years
            .values()
            .flatten()
            .find(|name| name.eq_ignore_ascii_case(token))
            .map(String::as_str)
    }

    /// Reject selections with blank or whitespace-bearing storm names, which
    /// can never equal a single anchor token.
    pub fn validate(&self) -> StormResult<()> {
        for (year, storms) in &self.years {
            for name in storms {
                if name.trim().is_empty() || name.split_whitespace().count() != 1 {
                    return Err(StormError::InvalidSelection(format!(
                        "storm name '{}' for {} must be a single word",
                        name, year
                    )));
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<(i32, String)> for StormSelection {
    fn from_iter<T: IntoIterator<Item = (i32, String)>>(iter: T) -> Self {
        let mut selection = Self::new();
        for (year, name) in iter {
            selection.insert(year, name);
        }
        selection
    }
}

/// Opaque hurricane category label, e.g. a Saffir-Simpson class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CategoryCode(String);

impl CategoryCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for CategoryCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<i32> for CategoryCode {
    fn from(code: i32) -> Self {
        Self(code.to_string())
    }
}

impl From<i64> for CategoryCode {
    fn from(code: i64) -> Self {
        Self(code.to_string())
    }
}

// Job files write codes either as `5` or `"H5"`.
impl<'de> Deserialize<'de> for CategoryCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => CategoryCode(s),
            Raw::Integer(i) => CategoryCode(i.to_string()),
            Raw::Float(f) => CategoryCode(f.to_string()),
        })
    }
}

/// Storm name to category code lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCodeMap {
    codes: BTreeMap<String, CategoryCode>,
}

impl CategoryCodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, storm: impl Into<String>, code: impl Into<CategoryCode>) -> Self {
        self.insert(storm, code);
        self
    }

    pub fn insert(&mut self, storm: impl Into<String>, code: impl Into<CategoryCode>) {
        self.codes.insert(storm.into(), code.into());
    }

    /// Look up a storm's code. Exact spelling wins over a case-insensitive match.
    pub fn get(&self, storm: &str) -> StormResult<&CategoryCode> {
        self.codes
            .get(storm)
            .or_else(|| {
                self.codes
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(storm))
                    .map(|(_, code)| code)
            })
            .ok_or_else(|| StormError::UnknownStorm(storm.to_string()))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<S: Into<String>, C: Into<CategoryCode>> FromIterator<(S, C)> for CategoryCodeMap {
    fn from_iter<T: IntoIterator<Item = (S, C)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (storm, code) in iter {
            map.insert(storm, code);
        }
        map
    }
}
