//! NHC hurricane archive downloader.
//!
//! Reads a job file naming storms per season and their category codes,
//! discovers the matching advisory, best track and probabilistic surge
//! archives on the NHC GIS site, and writes one GeoJSON file per product.

mod config;
mod job;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use nhc_archive::{ArchiveConfig, NhcArchive, ProxyConfig, ThrottlePolicy, DEFAULT_SURGE_FEET};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{JobConfig, ProductChoice};
use job::JobRunner;

#[derive(Parser, Debug)]
#[command(name = "nhc-downloader")]
#[command(about = "Download NHC hurricane tracks and storm surge as GeoJSON")]
struct Args {
    /// Job file (YAML) listing storms and category codes
    #[arg(long)]
    job: PathBuf,

    /// Product to build (default: products listed in the job, else all)
    #[arg(long, value_enum)]
    product: Option<ProductChoice>,

    /// Directory for GeoJSON output
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Surge height threshold in feet (overrides the job file)
    #[arg(long)]
    surge_feet: Option<u32>,

    /// Pause after each archive download, in seconds; 0 disables
    #[arg(long)]
    throttle_secs: Option<f64>,

    /// NHC site root
    #[arg(long, env = "NHC_BASE_URL", default_value = nhc_archive::DEFAULT_BASE_URL)]
    base_url: String,

    /// HTTP proxy host
    #[arg(long, env = "NHC_PROXY_HOST")]
    proxy_host: Option<String>,

    /// HTTP proxy port
    #[arg(long, env = "NHC_PROXY_PORT", default_value = "8080")]
    proxy_port: u16,

    /// HTTP proxy user
    #[arg(long, env = "NHC_PROXY_USER")]
    proxy_user: Option<String>,

    /// HTTP proxy password
    #[arg(long, env = "NHC_PROXY_PASSWORD", hide_env_values = true)]
    proxy_password: Option<String>,

    /// Maximum connection retries per archive
    #[arg(long, default_value = "3")]
    connect_retries: u32,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn proxy(&self) -> Option<ProxyConfig> {
        let host = self.proxy_host.as_ref()?;
        let mut proxy = ProxyConfig::new(host.clone(), self.proxy_port);
        proxy.username = self.proxy_user.clone();
        proxy.password = self.proxy_password.clone();
        Some(proxy)
    }

    fn archive_config(&self, job: &JobConfig) -> Result<ArchiveConfig> {
        let mut config = ArchiveConfig {
            base_url: self.base_url.clone(),
            proxy: self.proxy(),
            ..Default::default()
        };
        config.retry.connect_retries = self.connect_retries;

        if let Some(delay) = self.throttle()?.or_else(|| job.throttle()) {
            config.throttle = ThrottlePolicy::from(delay);
        }
        Ok(config)
    }

    fn throttle(&self) -> Result<Option<Duration>> {
        match self.throttle_secs {
            Some(secs) if !secs.is_finite() || secs < 0.0 => {
                anyhow::bail!("--throttle-secs must be a non-negative number, got {}", secs)
            }
            Some(secs) => Ok(Some(Duration::from_secs_f64(secs))),
            None => Ok(None),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!(job = %args.job.display(), "Starting NHC archive downloader");

    let job = JobConfig::load(&args.job)?;
    let products = job.products(args.product);
    let surge_feet = args.surge_feet.or(job.surge_feet).unwrap_or(DEFAULT_SURGE_FEET);

    let archive_config = args.archive_config(&job)?;
    info!(
        base_url = %archive_config.base_url,
        proxy = archive_config.proxy.is_some(),
        throttle_ms = archive_config.throttle.delay().as_millis() as u64,
        surge_feet = surge_feet,
        products = ?products,
        "Configured archive client"
    );

    let archive = NhcArchive::new(archive_config).context("Failed to create archive client")?;
    let runner = JobRunner::new(&archive, &job, surge_feet, &args.output_dir);

    let summaries = runner.run(&products).await?;
    for summary in &summaries {
        info!(
            product = %summary.product,
            storms = summary.storms,
            archives = summary.archives,
            rows = summary.rows,
            path = %summary.path.display(),
            "Product complete"
        );
    }

    info!(products = summaries.len(), "Download session complete");
    Ok(())
}
