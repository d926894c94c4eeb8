//! Common helpers for nhc-archive integration tests.
//!
//! Provides an in-memory [`Fetch`] serving canned pages and archives, plus
//! a client configuration with throttling and retries switched off.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use nhc_archive::{ArchiveConfig, ArchiveError, Fetch, NhcArchive, RetryPolicy, ThrottlePolicy};
use url::Url;

pub const BASE_URL: &str = "https://nhc.test";

/// Serves registered URLs; everything else is a 404.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    archives: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page. `url` may contain raw spaces; it is normalised the
    /// same way the client normalises anchors.
    pub fn page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(normalise(url), body.into());
        self
    }

    pub fn archive(mut self, url: &str, data: Vec<u8>) -> Self {
        self.archives.insert(normalise(url), data);
        self
    }

    /// Every URL requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of archive downloads so far.
    pub fn archive_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|url| url.ends_with(".zip"))
            .count()
    }

    fn record(&self, url: &str) {
        self.calls.lock().unwrap().push(url.to_string());
    }
}

#[async_trait]
impl Fetch for MockFetcher {
    async fn get_text(&self, url: &str) -> nhc_archive::Result<String> {
        self.record(url);
        self.pages.get(url).cloned().ok_or(ArchiveError::HttpStatus {
            url: url.to_string(),
            status: 404,
        })
    }

    async fn get_bytes(&self, url: &str) -> nhc_archive::Result<Bytes> {
        self.record(url);
        self.archives
            .get(url)
            .map(|data| Bytes::from(data.clone()))
            .ok_or(ArchiveError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

fn normalise(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Configuration pointing at [`BASE_URL`] with no pauses.
pub fn test_config() -> ArchiveConfig {
    ArchiveConfig {
        base_url: BASE_URL.to_string(),
        retry: RetryPolicy::none(),
        throttle: ThrottlePolicy::Disabled,
        ..Default::default()
    }
}

pub fn client(fetcher: MockFetcher) -> NhcArchive<MockFetcher> {
    NhcArchive::with_fetcher(fetcher, test_config())
}

/// `{BASE_URL}/gis/{path}`
pub fn gis_url(path: &str) -> String {
    format!("{}/gis/{}", BASE_URL, path)
}

/// Storm page URL as linked from an index page.
pub fn storm_page_url(results_page: &str, id: &str, year: i32, name: &str) -> String {
    format!(
        "{}/gis/{}?id={}&year={}&name=Hurricane {}",
        BASE_URL, results_page, id, year, name
    )
}
