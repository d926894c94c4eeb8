//! HTTP transport.
//!
//! Index and storm pages go through [`Fetch::get_text`] with no retry.
//! Archives go through [`Fetch::get_bytes`], which retries connection
//! failures with exponential backoff.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Proxy};
use tracing::{debug, instrument, warn};

use crate::config::{ArchiveConfig, RetryPolicy};
use crate::error::{ArchiveError, Result};

/// Source of remote documents.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// GET a page and return its body as text.
    async fn get_text(&self, url: &str) -> Result<String>;

    /// GET an archive and return its raw bytes.
    async fn get_bytes(&self, url: &str) -> Result<Bytes>;
}

/// [`Fetch`] implementation backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    /// Build a client from the configuration's timeouts, user agent and proxy.
    pub fn new(config: &ArchiveConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true);

        if let Some(proxy_config) = &config.proxy {
            proxy_config.validate()?;
            let mut proxy = Proxy::all(proxy_config.url()).map_err(|source| ArchiveError::Http {
                url: proxy_config.url(),
                source,
            })?;
            if let (Some(user), Some(password)) = (&proxy_config.username, &proxy_config.password) {
                proxy = proxy.basic_auth(user, password);
            }
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ArchiveError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            retry: config.retry,
        })
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ArchiveError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[instrument(skip(self))]
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.send(url).await?;
        let body = response.text().await.map_err(|source| ArchiveError::Http {
            url: url.to_string(),
            source,
        })?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }

    #[instrument(skip(self))]
    async fn get_bytes(&self, url: &str) -> Result<Bytes> {
        let mut retry_count = 0;

        loop {
            match self.send(url).await {
                Ok(response) => {
                    let body = response.bytes().await.map_err(|source| ArchiveError::Http {
                        url: url.to_string(),
                        source,
                    })?;
                    debug!(bytes = body.len(), retries = retry_count, "Fetched archive");
                    return Ok(body);
                }
                Err(ArchiveError::Http { source, .. })
                    if source.is_connect() && retry_count < self.retry.connect_retries =>
                {
                    retry_count += 1;
                    let delay = self.retry.backoff(retry_count);
                    warn!(
                        error = %source,
                        retry = retry_count,
                        max_retries = self.retry.connect_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Connection failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
