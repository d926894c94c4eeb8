//! GeoJSON output files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use storm_common::TrackTable;
use tracing::info;

use crate::config::Product;

/// `{output_dir}/{product}.geojson`
pub fn output_path(output_dir: &Path, product: Product) -> PathBuf {
    output_dir.join(format!("{}.geojson", product))
}

/// Write a table as a GeoJSON FeatureCollection, replacing any previous file.
pub async fn write_geojson(path: &Path, table: &TrackTable) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let json = table
        .to_feature_collection()
        .to_json_string()
        .context("Failed to serialize table")?;

    // Write beside the target, then rename into place
    let partial = path.with_extension("geojson.partial");
    tokio::fs::write(&partial, json.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    tokio::fs::rename(&partial, path)
        .await
        .with_context(|| format!("Failed to move output into place: {}", path.display()))?;

    info!(path = %path.display(), features = table.len(), bytes = json.len(), "Wrote GeoJSON");
    Ok(())
}
