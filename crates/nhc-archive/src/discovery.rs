//! Link discovery over the yearly archive index pages.
//!
//! Each index page lists one anchor per storm (`...&name=Hurricane MICHAEL`).
//! Anchors for requested storms lead to a results page whose `.zip` links
//! are the archives collected into a [`LinkIndex`].

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use storm_common::StormSelection;
use tracing::{debug, info, instrument};
use url::{form_urlencoded, Url};

use crate::client::NhcArchive;
use crate::error::{ArchiveError, Result};
use crate::fetch::Fetch;

/// Default surge height threshold, in feet.
pub const DEFAULT_SURGE_FEET: u32 = 5;

/// Storm anchors on the index pages carry this in their href.
const STORM_ANCHOR_PATTERN: &str = "name=Hurricane";

/// Token that precedes the storm name in the anchor's `name` parameter.
const HURRICANE_TOKEN: &str = "Hurricane";

const ARCHIVE_PATTERN: &str = r"(?i)\.zip";

/// Kind of archive listed by an index page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Advisory,
    BestTrack,
    Surge,
}

impl DocumentKind {
    /// Index page for a season, relative to the site root.
    pub fn index_path(&self, year: i32) -> String {
        match self {
            DocumentKind::Advisory => format!("gis/archive_forecast.php?year={}", year),
            DocumentKind::BestTrack => format!("gis/archive_besttrack.php?year={}", year),
            DocumentKind::Surge => format!("gis/archive_psurge.php?&year={}", year),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Advisory => "advisory",
            DocumentKind::BestTrack => "best_track",
            DocumentKind::Surge => "surge",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Archive paths per storm.
///
/// Keys are storm names as spelled in the [`StormSelection`]. Paths are
/// relative to the GIS root (`{base}/gis/`) when they live under it and
/// absolute URLs otherwise. Both levels are ordered, so iteration is
/// deterministic and lexicographic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkIndex(BTreeMap<String, BTreeSet<String>>);

impl LinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an archive path under a storm.
    pub fn insert(&mut self, storm: impl Into<String>, path: impl Into<String>) {
        self.0.entry(storm.into()).or_default().insert(path.into());
    }

    /// Make sure a storm is present, possibly with no archives.
    pub fn ensure(&mut self, storm: impl Into<String>) {
        self.0.entry(storm.into()).or_default();
    }

    pub fn get(&self, storm: &str) -> Option<&BTreeSet<String>> {
        self.0.get(storm)
    }

    pub fn storms(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of storms.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of archive paths across all storms.
    pub fn archive_count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }
}

impl<S: Into<String>, P: Into<String>> FromIterator<(S, P)> for LinkIndex {
    fn from_iter<I: IntoIterator<Item = (S, P)>>(iter: I) -> Self {
        let mut index = LinkIndex::new();
        for (storm, path) in iter {
            index.insert(storm, path);
        }
        index
    }
}

impl<F: Fetch> NhcArchive<F> {
    /// Advisory (forecast) track archives for the selected storms.
    pub async fn advisory_urls(&self, selection: &StormSelection) -> Result<LinkIndex> {
        let pattern = Regex::new(ARCHIVE_PATTERN)?;
        self.discover(DocumentKind::Advisory, selection, &pattern).await
    }

    /// Best track archives for the selected storms.
    pub async fn best_track_urls(&self, selection: &StormSelection) -> Result<LinkIndex> {
        let pattern = Regex::new(ARCHIVE_PATTERN)?;
        self.discover(DocumentKind::BestTrack, selection, &pattern).await
    }

    /// Probabilistic surge archives at the given height threshold.
    pub async fn surge_urls(&self, feet: u32, selection: &StormSelection) -> Result<LinkIndex> {
        let pattern = Regex::new(&format!(r"_psurge{}_.*\.zip", feet))?;
        self.discover(DocumentKind::Surge, selection, &pattern).await
    }

    #[instrument(skip(self, kind, selection, archive_pattern), fields(kind = %kind))]
    async fn discover(
        &self,
        kind: DocumentKind,
        selection: &StormSelection,
        archive_pattern: &Regex,
    ) -> Result<LinkIndex> {
        selection.validate()?;

        let site_root = self.config.site_root()?;
        let gis_root = self.config.gis_root()?;
        let anchor_pattern = Regex::new(STORM_ANCHOR_PATTERN)?;

        // Storm pages across all requested seasons
        let mut storm_pages = BTreeSet::new();
        for year in selection.years() {
            let index_url = site_root.join(&kind.index_path(year))?;
            debug!(year = year, url = %index_url, "Fetching archive index");

            let body = self.fetcher.get_text(index_url.as_str()).await?;
            for href in extract_hrefs(&body, &anchor_pattern)? {
                storm_pages.insert(index_url.join(&href)?);
            }
        }

        let mut index = LinkIndex::new();
        for page_url in &storm_pages {
            let Some(token) = storm_token(page_url.as_str()) else {
                debug!(url = %page_url, "Anchor without a storm name, skipping");
                continue;
            };
            let Some(storm) = selection.find_storm(&token) else {
                continue;
            };

            debug!(storm = %storm, url = %page_url, "Fetching storm page");
            let body = self.fetcher.get_text(page_url.as_str()).await?;

            index.ensure(storm);
            for href in extract_hrefs(&body, archive_pattern)? {
                let archive = page_url.join(&href)?;
                index.insert(storm, relative_to(&archive, &gis_root));
            }
        }

        info!(
            storm_pages = storm_pages.len(),
            storms = index.len(),
            archives = index.archive_count(),
            "Discovered archives"
        );
        Ok(index)
    }
}

/// Hrefs of every anchor whose href matches `pattern`, in document order.
pub fn extract_hrefs(body: &str, pattern: &Regex) -> Result<Vec<String>> {
    let selector = Selector::parse("a[href]")
        .map_err(|e| ArchiveError::Config(format!("Invalid anchor selector: {}", e)))?;
    let document = Html::parse_document(body);

    Ok(document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| pattern.is_match(href))
        .map(str::to_string)
        .collect())
}

/// Storm name carried by a storm anchor.
///
/// The `name` query parameter reads `Hurricane {NAME}`; `%20`, `+` and
/// whitespace all separate the two.
pub fn storm_token(href: &str) -> Option<String> {
    let (_, query) = href.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);

    let name = form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value.into_owned())?;

    let mut tokens = name.split_whitespace();
    tokens.find(|t| t.eq_ignore_ascii_case(HURRICANE_TOKEN))?;
    tokens.next().map(str::to_string)
}

fn relative_to(url: &Url, root: &Url) -> String {
    match url.as_str().strip_prefix(root.as_str()) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => url.to_string(),
    }
}
