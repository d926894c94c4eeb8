//! Job file loading.
//!
//! A job names the storms to fetch per season, their category codes and,
//! optionally, which products to build:
//!
//! ```yaml
//! storms:
//!   2018: [MICHAEL, FLORENCE]
//! catcodes:
//!   MICHAEL: 5
//!   FLORENCE: 4
//! surge_feet: 5
//! throttle_secs: 5
//! products: [advisory, best-track, surge]
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use storm_common::{CategoryCodeMap, StormSelection};
use tracing::{debug, warn};

/// Downloadable product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Product {
    Advisory,
    BestTrack,
    Surge,
}

impl Product {
    pub const ALL: [Product; 3] = [Product::Advisory, Product::BestTrack, Product::Surge];

    pub fn as_str(&self) -> &'static str {
        match self {
            Product::Advisory => "advisory",
            Product::BestTrack => "best-track",
            Product::Surge => "surge",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contents of a job YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// Season year to storm names.
    pub storms: StormSelection,
    /// Storm name to category code.
    pub catcodes: CategoryCodeMap,
    #[serde(default)]
    pub surge_feet: Option<u32>,
    #[serde(default)]
    pub throttle_secs: Option<f64>,
    /// Empty means every product.
    #[serde(default)]
    pub products: Vec<Product>,
}

impl JobConfig {
    /// Load a job from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job file: {}", path.display()))?;

        let job = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse job file: {}", path.display()))?;

        debug!(
            path = %path.display(),
            seasons = job.storms.years().count(),
            codes = job.catcodes.len(),
            "Loaded job"
        );
        Ok(job)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let job: JobConfig = serde_yaml::from_str(content)?;
        job.validate()?;
        Ok(job)
    }

    /// Reject jobs that could never produce output.
    pub fn validate(&self) -> Result<()> {
        if self.storms.is_empty() {
            bail!("job lists no storms");
        }
        self.storms.validate()?;

        if let Some(secs) = self.throttle_secs {
            if !secs.is_finite() || secs < 0.0 {
                bail!("throttle_secs must be a non-negative number, got {}", secs);
            }
        }

        // Assembly fails on a missing code; say so up front
        for year in self.storms.years() {
            for storm in self.storms.storms(year) {
                if self.catcodes.get(storm).is_err() {
                    warn!(storm = %storm, year = year, "No category code for requested storm");
                }
            }
        }
        Ok(())
    }

    /// Products to build, with a command-line choice taking precedence.
    pub fn products(&self, cli: Option<ProductChoice>) -> Vec<Product> {
        let mut products = match cli {
            Some(ProductChoice::All) => Product::ALL.to_vec(),
            Some(ProductChoice::Advisory) => vec![Product::Advisory],
            Some(ProductChoice::BestTrack) => vec![Product::BestTrack],
            Some(ProductChoice::Surge) => vec![Product::Surge],
            None if self.products.is_empty() => Product::ALL.to_vec(),
            None => self.products.clone(),
        };
        products.sort();
        products.dedup();
        products
    }

    pub fn throttle(&self) -> Option<Duration> {
        self.throttle_secs.map(Duration::from_secs_f64)
    }
}

/// `--product` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProductChoice {
    Advisory,
    BestTrack,
    Surge,
    All,
}
