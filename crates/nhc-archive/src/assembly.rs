//! Combine per-archive tables into one table per product.

use storm_common::{CategoryCode, CategoryCodeMap, TrackTable};
use tracing::{debug, info, instrument};

use crate::client::NhcArchive;
use crate::discovery::LinkIndex;
use crate::error::Result;
use crate::fetch::Fetch;

impl<F: Fetch> NhcArchive<F> {
    /// Advisory track of every storm in `index`.
    ///
    /// For each storm, every archive but the last contributes its first row
    /// (the position at issuance) and the last archive contributes all of its
    /// rows (the final forecast). This relies on lexicographic path order
    /// matching issuance order, which holds for NHC's zero-padded advisory
    /// numbers.
    ///
    /// Every storm's category code is looked up before anything is fetched;
    /// a missing code fails the call with no download.
    #[instrument(skip_all, fields(storms = index.len()))]
    pub async fn download_advisory_track(
        &self,
        codes: &CategoryCodeMap,
        index: &LinkIndex,
    ) -> Result<TrackTable> {
        self.assemble_tracks(codes, index).await
    }

    /// Best track of every storm in `index`.
    ///
    /// Same selection rule and ordering precondition as
    /// [`download_advisory_track`](Self::download_advisory_track).
    #[instrument(skip_all, fields(storms = index.len()))]
    pub async fn download_best_track(
        &self,
        codes: &CategoryCodeMap,
        index: &LinkIndex,
    ) -> Result<TrackTable> {
        self.assemble_tracks(codes, index).await
    }

    /// Probabilistic surge of every storm in `index`.
    ///
    /// Every archive is decoded in full; archives with no shapefile are
    /// skipped.
    #[instrument(skip_all, fields(storms = index.len()))]
    pub async fn download_surge(
        &self,
        codes: &CategoryCodeMap,
        index: &LinkIndex,
    ) -> Result<TrackTable> {
        let resolved = resolve_codes(codes, index)?;
        let mut combined = TrackTable::default();

        for ((storm, paths), code) in index.iter().zip(resolved) {
            let mut rows = 0;
            let mut skipped = 0;
            for path in paths {
                match self.read_surge_zip(path).await? {
                    Some(mut table) => {
                        table.set_catcode(code);
                        rows += table.len();
                        combined.concat(table);
                    }
                    None => {
                        debug!(storm = %storm, archive = %path, "Skipping archive without shapefile");
                        skipped += 1;
                    }
                }
            }
            info!(
                storm = %storm,
                catcode = %code,
                archives = paths.len(),
                skipped = skipped,
                rows = rows,
                "Assembled surge"
            );
        }

        info!(rows = combined.len(), "Surge assembly complete");
        Ok(combined)
    }

    async fn assemble_tracks(&self, codes: &CategoryCodeMap, index: &LinkIndex) -> Result<TrackTable> {
        let resolved = resolve_codes(codes, index)?;
        let mut combined = TrackTable::default();

        for ((storm, paths), code) in index.iter().zip(resolved) {
            if paths.is_empty() {
                debug!(storm = %storm, "No archives for storm");
                continue;
            }

            let last = paths.len() - 1;
            let mut rows = 0;
            for (position, path) in paths.iter().enumerate() {
                let mut table = self.read_track_zip(path).await?;
                if position < last {
                    table = table.head(1);
                }
                table.set_catcode(code);
                rows += table.len();
                combined.concat(table);
            }
            info!(
                storm = %storm,
                catcode = %code,
                archives = paths.len(),
                rows = rows,
                "Assembled track"
            );
        }

        info!(rows = combined.len(), "Track assembly complete");
        Ok(combined)
    }
}

/// Category code of every storm, in index order.
fn resolve_codes<'a>(codes: &'a CategoryCodeMap, index: &LinkIndex) -> Result<Vec<&'a CategoryCode>> {
    index
        .storms()
        .map(|storm| codes.get(storm).map_err(Into::into))
        .collect()
}
