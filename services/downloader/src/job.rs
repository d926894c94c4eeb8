//! Runs one job: discovery then assembly for each requested product.

use std::path::PathBuf;

use anyhow::{Context, Result};
use nhc_archive::{Fetch, LinkIndex, NhcArchive};
use storm_common::TrackTable;
use tracing::{info, instrument};

use crate::config::{JobConfig, Product};
use crate::output;

/// Outcome of one product.
#[derive(Debug, Clone)]
pub struct ProductSummary {
    pub product: Product,
    pub storms: usize,
    pub archives: usize,
    pub rows: usize,
    pub path: PathBuf,
}

/// Drives an [`NhcArchive`] through a job.
pub struct JobRunner<'a, F> {
    archive: &'a NhcArchive<F>,
    job: &'a JobConfig,
    surge_feet: u32,
    output_dir: PathBuf,
}

impl<'a, F: Fetch> JobRunner<'a, F> {
    pub fn new(
        archive: &'a NhcArchive<F>,
        job: &'a JobConfig,
        surge_feet: u32,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            archive,
            job,
            surge_feet,
            output_dir: output_dir.into(),
        }
    }

    /// Build every product in order, stopping at the first failure.
    pub async fn run(&self, products: &[Product]) -> Result<Vec<ProductSummary>> {
        let mut summaries = Vec::with_capacity(products.len());
        for &product in products {
            summaries.push(self.run_product(product).await?);
        }
        Ok(summaries)
    }

    #[instrument(skip(self, product), fields(product = %product))]
    pub async fn run_product(&self, product: Product) -> Result<ProductSummary> {
        let index = self
            .discover(product)
            .await
            .with_context(|| format!("Failed to discover {} archives", product))?;

        info!(
            storms = index.len(),
            archives = index.archive_count(),
            "Discovery complete"
        );

        let table = self
            .assemble(product, &index)
            .await
            .with_context(|| format!("Failed to assemble {} table", product))?;

        let path = output::output_path(&self.output_dir, product);
        output::write_geojson(&path, &table).await?;

        Ok(ProductSummary {
            product,
            storms: index.len(),
            archives: index.archive_count(),
            rows: table.len(),
            path,
        })
    }

    async fn discover(&self, product: Product) -> nhc_archive::Result<LinkIndex> {
        let selection = &self.job.storms;
        match product {
            Product::Advisory => self.archive.advisory_urls(selection).await,
            Product::BestTrack => self.archive.best_track_urls(selection).await,
            Product::Surge => self.archive.surge_urls(self.surge_feet, selection).await,
        }
    }

    async fn assemble(&self, product: Product, index: &LinkIndex) -> nhc_archive::Result<TrackTable> {
        let codes = &self.job.catcodes;
        match product {
            Product::Advisory => self.archive.download_advisory_track(codes, index).await,
            Product::BestTrack => self.archive.download_best_track(codes, index).await,
            Product::Surge => self.archive.download_surge(codes, index).await,
        }
    }
}
