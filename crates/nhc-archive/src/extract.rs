//! Archive download and shapefile extraction.
//!
//! An archive is a zip holding one or more shapefile datasets. Extraction
//! picks exactly one `.dbf`/`.prj`/`.shp`/`.shx` quartet, decodes it and
//! returns the rows as a [`TrackTable`].

use std::io::{Cursor, Read};

use bytes::Bytes;
use chrono::NaiveDateTime;
use shapefile_parser::{read_projection, ShapefileReader};
use storm_common::TrackTable;
use tracing::{debug, instrument};
use zip::ZipArchive;

use crate::client::NhcArchive;
use crate::error::{ArchiveError, Result};
use crate::fetch::Fetch;

/// Component suffixes of a shapefile dataset, in extraction order.
pub const COMPONENT_SUFFIXES: [&str; 4] = [".dbf", ".prj", ".shp", ".shx"];

/// Track archives carry several datasets; the position dataset is the one
/// whose entry names contain one of these.
pub const TRACK_KEYWORDS: [&str; 2] = ["position", "pts"];

const SURGE_TOKEN_PREFIX: &str = "psurge";

/// Entry names of one shapefile dataset inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Components {
    pub dbf: String,
    pub prj: String,
    pub shp: String,
    pub shx: String,
}

impl<F: Fetch> NhcArchive<F> {
    /// Download and decode the position dataset of a track archive.
    ///
    /// `path` is relative to the GIS root or an absolute URL, as stored in a
    /// [`LinkIndex`](crate::LinkIndex).
    #[instrument(skip(self))]
    pub async fn read_track_zip(&self, path: &str) -> Result<TrackTable> {
        let data = self.fetch_archive(path).await?;
        decode_track_archive(path, &data)
    }

    /// Download and decode a probabilistic surge archive.
    ///
    /// Returns `None` when the archive holds no shapefile components at all.
    /// Every row carries the issuance time from the archive name.
    #[instrument(skip(self))]
    pub async fn read_surge_zip(&self, path: &str) -> Result<Option<TrackTable>> {
        let data = self.fetch_archive(path).await?;
        decode_surge_archive(path, &data)
    }

    /// Fetch archive bytes, then apply the throttle whatever the outcome.
    async fn fetch_archive(&self, path: &str) -> Result<Bytes> {
        let url = self.config.archive_url(path)?;
        let result = self.fetcher.get_bytes(url.as_str()).await;
        self.config.throttle.pause().await;
        result
    }
}

/// Decode the position dataset of an in-memory track archive.
pub fn decode_track_archive(archive: &str, data: &[u8]) -> Result<TrackTable> {
    let mut zip = ZipArchive::new(Cursor::new(data))?;
    let names = entry_names(&zip);

    let components = find_components(archive, &names, Some(&TRACK_KEYWORDS[..]))?.ok_or_else(|| {
        ArchiveError::MissingComponent {
            archive: archive.to_string(),
            suffix: ".shp",
        }
    })?;
    read_components(&mut zip, &components)
}

/// Decode an in-memory surge archive, tagging rows with its issuance time.
pub fn decode_surge_archive(archive: &str, data: &[u8]) -> Result<Option<TrackTable>> {
    let mut zip = ZipArchive::new(Cursor::new(data))?;
    let names = entry_names(&zip);

    let Some(components) = find_components(archive, &names, None)? else {
        debug!(archive = %archive, entries = names.len(), "No shapefile components in archive");
        return Ok(None);
    };

    let timestamp = surge_timestamp(archive)?;
    let mut table = read_components(&mut zip, &components)?;
    table.set_timestamp(&timestamp);
    Ok(Some(table))
}

/// Pick one entry per component suffix.
///
/// With `keywords`, only entries whose names contain one of them are
/// considered. Returns `None` when no entry matches any suffix; a suffix
/// with no match or with several matches is an error.
pub fn find_components(
    archive: &str,
    names: &[String],
    keywords: Option<&[&str]>,
) -> Result<Option<Components>> {
    let candidates: Vec<&String> = names
        .iter()
        .filter(|name| match keywords {
            Some(keywords) => {
                let lower = name.to_ascii_lowercase();
                keywords.iter().any(|k| lower.contains(k))
            }
            None => true,
        })
        .collect();

    let matched: Vec<Vec<&String>> = COMPONENT_SUFFIXES
        .iter()
        .map(|suffix| {
            let mut found: Vec<&String> = candidates
                .iter()
                .copied()
                .filter(|name| name.to_ascii_lowercase().ends_with(suffix))
                .collect();
            found.sort();
            found
        })
        .collect();

    if matched.iter().all(Vec::is_empty) {
        return Ok(None);
    }

    let mut picked = Vec::with_capacity(COMPONENT_SUFFIXES.len());
    for (suffix, found) in COMPONENT_SUFFIXES.into_iter().zip(matched) {
        match found.as_slice() {
            [] => {
                return Err(ArchiveError::MissingComponent {
                    archive: archive.to_string(),
                    suffix,
                })
            }
            [only] => picked.push(only.to_string()),
            many => {
                return Err(ArchiveError::AmbiguousComponents {
                    archive: archive.to_string(),
                    suffix,
                    candidates: many.iter().map(|s| s.to_string()).collect(),
                })
            }
        }
    }

    let [dbf, prj, shp, shx]: [String; 4] =
        picked
            .try_into()
            .map_err(|_| ArchiveError::MissingComponent {
                archive: archive.to_string(),
                suffix: ".shp",
            })?;
    Ok(Some(Components { dbf, prj, shp, shx }))
}

/// Issuance time of a surge archive as `YYYYMMDDHH`.
///
/// Taken from the first ten characters of the `_`-separated token that
/// follows `psurgeN` in the file name, e.g.
/// `al142018_psurge5_2018100918.zip` gives `2018100918`.
pub fn surge_timestamp(archive: &str) -> Result<String> {
    let invalid = || ArchiveError::InvalidArchiveName(archive.to_string());

    let file_name = archive
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .unwrap_or(archive);

    let mut tokens = file_name.split('_');
    tokens.find(|token| is_surge_token(token)).ok_or_else(invalid)?;
    let stamp = tokens.next().and_then(|token| token.get(..10)).ok_or_else(invalid)?;

    if !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    NaiveDateTime::parse_from_str(&format!("{}00", stamp), "%Y%m%d%H%M").map_err(|_| invalid())?;

    Ok(stamp.to_string())
}

fn is_surge_token(token: &str) -> bool {
    let (Some(prefix), Some(feet)) = (
        token.get(..SURGE_TOKEN_PREFIX.len()),
        token.get(SURGE_TOKEN_PREFIX.len()..),
    ) else {
        return false;
    };
    prefix.eq_ignore_ascii_case(SURGE_TOKEN_PREFIX)
        && !feet.is_empty()
        && feet.bytes().all(|b| b.is_ascii_digit())
}

fn entry_names<R: Read + std::io::Seek>(zip: &ZipArchive<R>) -> Vec<String> {
    zip.file_names().map(str::to_string).collect()
}

fn read_components<R: Read + std::io::Seek>(
    zip: &mut ZipArchive<R>,
    components: &Components,
) -> Result<TrackTable> {
    let dbf = read_entry(zip, &components.dbf)?;
    let prj = read_entry(zip, &components.prj)?;
    let shp = read_entry(zip, &components.shp)?;
    let shx = read_entry(zip, &components.shx)?;

    let reader = ShapefileReader::from_bytes(&shp, &shx, &dbf)?;
    debug!(
        shp = %components.shp,
        shape_type = ?reader.shape_type(),
        records = reader.len(),
        "Decoded shapefile"
    );

    let table = TrackTable::new(reader.into_records()?);
    Ok(match read_projection(&prj) {
        Some(wkt) => table.with_projection(wkt),
        None => table,
    })
}

fn read_entry<R: Read + std::io::Seek>(zip: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut file = zip.by_name(name)?;
    // Declared sizes are untrusted; grow with the actual data
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}
