//! Archive client tying transport and configuration together.

use crate::config::ArchiveConfig;
use crate::error::Result;
use crate::fetch::{Fetch, HttpFetcher};

/// Client for the NHC GIS archive.
///
/// Discovery lives in [`discovery`](crate::discovery), archive decoding in
/// [`extract`](crate::extract) and table assembly in
/// [`assembly`](crate::assembly); all are methods on this type. Every remote
/// call is awaited in turn, so a single client never has more than one
/// request in flight.
pub struct NhcArchive<F = HttpFetcher> {
    pub(crate) fetcher: F,
    pub(crate) config: ArchiveConfig,
}

impl NhcArchive<HttpFetcher> {
    /// Create a client that talks HTTP.
    pub fn new(config: ArchiveConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self { fetcher, config })
    }
}

impl<F: Fetch> NhcArchive<F> {
    /// Create a client over any [`Fetch`] implementation.
    pub fn with_fetcher(fetcher: F, config: ArchiveConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}
