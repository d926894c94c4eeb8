//! Retrieval of hurricane track and storm surge archives from the NHC GIS
//! archive.
//!
//! A download runs in two steps:
//!
//! 1. Discovery ([`NhcArchive::advisory_urls`], [`NhcArchive::best_track_urls`],
//!    [`NhcArchive::surge_urls`]) walks the yearly index pages and returns a
//!    [`LinkIndex`] of archive paths per requested storm.
//! 2. Assembly ([`NhcArchive::download_advisory_track`],
//!    [`NhcArchive::download_best_track`], [`NhcArchive::download_surge`])
//!    downloads each archive, decodes its shapefile and returns one
//!    [`TrackTable`](storm_common::TrackTable) tagged with category codes.
//!
//! # Example
//!
//! ```no_run
//! use nhc_archive::{ArchiveConfig, NhcArchive};
//! use storm_common::{CategoryCodeMap, StormSelection};
//!
//! # async fn run() -> nhc_archive::Result<()> {
//! let archive = NhcArchive::new(ArchiveConfig::default())?;
//! let selection = StormSelection::new().with_storm(2018, "MICHAEL");
//! let codes = CategoryCodeMap::new().with_code("MICHAEL", 5);
//!
//! let index = archive.best_track_urls(&selection).await?;
//! let table = archive.download_best_track(&codes, &index).await?;
//! println!("{} rows", table.len());
//! # Ok(())
//! # }
//! ```

pub mod assembly;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod fetch;

pub use client::NhcArchive;
pub use config::{ArchiveConfig, ProxyConfig, RetryPolicy, ThrottlePolicy, DEFAULT_BASE_URL};
pub use discovery::{DocumentKind, LinkIndex, DEFAULT_SURGE_FEET};
pub use error::{ArchiveError, Result};
pub use extract::{surge_timestamp, Components};
pub use fetch::{Fetch, HttpFetcher};
