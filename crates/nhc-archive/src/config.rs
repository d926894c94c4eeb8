//! Transport and politeness configuration.

use std::time::Duration;

use url::Url;

use crate::error::{ArchiveError, Result};

/// Public NHC site serving the GIS archive.
pub const DEFAULT_BASE_URL: &str = "https://www.nhc.noaa.gov";

/// Archive paths and download hrefs are relative to this directory.
pub const GIS_DIR: &str = "gis/";

/// Configuration for an [`NhcArchive`](crate::NhcArchive).
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Site root; index pages and the GIS directory hang off it.
    pub base_url: String,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Retry policy for archive downloads. Index pages are never retried.
    pub retry: RetryPolicy,
    /// Pause applied after every archive download.
    pub throttle: ThrottlePolicy,
    pub proxy: Option<ProxyConfig>,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(30),
            user_agent: concat!("nhc-archive/", env!("CARGO_PKG_VERSION")).to_string(),
            retry: RetryPolicy::default(),
            throttle: ThrottlePolicy::default(),
            proxy: None,
        }
    }
}

impl ArchiveConfig {
    /// Site root as a URL with a trailing slash.
    pub fn site_root(&self) -> Result<Url> {
        let mut base = self.base_url.trim_end_matches('/').to_string();
        base.push('/');
        Ok(Url::parse(&base)?)
    }

    /// `{base}/gis/`
    pub fn gis_root(&self) -> Result<Url> {
        Ok(self.site_root()?.join(GIS_DIR)?)
    }

    /// Absolute URL of an archive path as stored in a
    /// [`LinkIndex`](crate::LinkIndex).
    pub fn archive_url(&self, path: &str) -> Result<Url> {
        match Url::parse(path) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(self.gis_root()?.join(path)?),
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let root = self.site_root()?;
        if root.scheme() != "http" && root.scheme() != "https" {
            return Err(ArchiveError::Config(format!(
                "base URL must be http or https, got {}",
                root.scheme()
            )));
        }
        if let Some(proxy) = &self.proxy {
            proxy.validate()?;
        }
        Ok(())
    }
}

/// Connection retry with exponential backoff.
///
/// Only failures to establish a connection are retried; HTTP error statuses
/// and body read errors are returned straight away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub connect_retries: u32,
    /// Delay before retry `n` is `backoff_factor * 2^(n-1)` seconds.
    pub backoff_factor: f64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            connect_retries: 3,
            backoff_factor: 0.5,
            max_backoff: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            connect_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before the given retry (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let secs = self.backoff_factor * 2f64.powi(retry as i32 - 1);
        Duration::from_secs_f64(secs.min(self.max_backoff.as_secs_f64()))
    }
}

/// Pause between archive downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottlePolicy {
    /// No pause; meant for tests and local mirrors.
    Disabled,
    /// Fixed pause after every download attempt.
    Fixed(Duration),
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        ThrottlePolicy::Fixed(Duration::from_secs(5))
    }
}

impl ThrottlePolicy {
    pub fn delay(&self) -> Duration {
        match self {
            ThrottlePolicy::Disabled => Duration::ZERO,
            ThrottlePolicy::Fixed(delay) => *delay,
        }
    }

    pub async fn pause(&self) {
        let delay = self.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl From<Duration> for ThrottlePolicy {
    fn from(delay: Duration) -> Self {
        if delay.is_zero() {
            ThrottlePolicy::Disabled
        } else {
            ThrottlePolicy::Fixed(delay)
        }
    }
}

/// Outbound HTTP proxy, applied to both http and https requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxyConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Proxy URL without credentials; those go through basic auth.
    pub fn url(&self) -> String {
        if self.host.contains("://") {
            format!("{}:{}", self.host.trim_end_matches('/'), self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ArchiveError::Config("proxy host is empty".to_string()));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(ArchiveError::Config(
                "proxy username and password must be given together".to_string(),
            ));
        }
        Url::parse(&self.url())?;
        Ok(())
    }
}
