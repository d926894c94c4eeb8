//! Link discovery against canned archive pages.

mod common;

use common::{client, storm_page_url, MockFetcher, BASE_URL};
use nhc_archive::{ArchiveError, LinkIndex, DEFAULT_SURGE_FEET};
use storm_common::StormSelection;
use test_utils::fixtures::{pages, storms};

const FORECAST_RESULTS: &str = "archive_forecast_results.php";
const BEST_TRACK_RESULTS: &str = "archive_besttrack_results.php";
const PSURGE_RESULTS: &str = "archive_psurge_results.php";

fn forecast_index_url(year: i32) -> String {
    format!("{}/gis/archive_forecast.php?year={}", BASE_URL, year)
}

/// Forecast archive with MICHAEL and FLORENCE for 2018.
fn forecast_2018() -> MockFetcher {
    let (michael_id, year, michael) = storms::MICHAEL;
    let (florence_id, _, florence) = storms::FLORENCE;

    MockFetcher::new()
        .page(
            &forecast_index_url(year),
            pages::archive_index(
                FORECAST_RESULTS,
                year,
                &[(michael_id, michael), (florence_id, florence)],
            ),
        )
        .page(
            &storm_page_url(FORECAST_RESULTS, michael_id, year, michael),
            pages::storm_page(&[
                "forecast/archive/al142018_5day_002.zip",
                "forecast/archive/al142018_5day_001.zip",
                "forecast/archive/al142018_5day_001.zip",
            ]),
        )
        .page(
            &storm_page_url(FORECAST_RESULTS, florence_id, year, florence),
            pages::storm_page(&["forecast/archive/al062018_5day_001.zip"]),
        )
}

fn paths(index: &LinkIndex, storm: &str) -> Vec<String> {
    index
        .get(storm)
        .map(|set| set.iter().cloned().collect())
        .unwrap_or_default()
}

// ============================================================================
// Matching
// ============================================================================

#[tokio::test]
async fn test_advisory_urls_for_one_storm() {
    let archive = client(forecast_2018());
    let selection = StormSelection::new().with_storm(2018, "MICHAEL");

    let index = archive.advisory_urls(&selection).await.unwrap();

    assert_eq!(index.storms().collect::<Vec<_>>(), vec!["MICHAEL"]);
    assert_eq!(
        paths(&index, "MICHAEL"),
        vec![
            "forecast/archive/al142018_5day_001.zip",
            "forecast/archive/al142018_5day_002.zip",
        ]
    );

    // One index page plus one storm page; FLORENCE is never visited
    let calls = archive.fetcher().calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|url| !url.contains("FLORENCE")));
}

#[tokio::test]
async fn test_key_keeps_caller_spelling() {
    let archive = client(forecast_2018());
    let selection = StormSelection::new().with_storm(2018, "Michael");

    let index = archive.advisory_urls(&selection).await.unwrap();
    assert_eq!(index.storms().collect::<Vec<_>>(), vec!["Michael"]);
    assert_eq!(paths(&index, "Michael").len(), 2);
}

#[tokio::test]
async fn test_no_matching_storm_gives_empty_index() {
    let archive = client(forecast_2018());
    let selection = StormSelection::new().with_storm(2018, "KATRINA");

    let index = archive.advisory_urls(&selection).await.unwrap();
    assert!(index.is_empty());
    assert_eq!(archive.fetcher().calls().len(), 1);
}

#[tokio::test]
async fn test_substring_names_do_not_over_match() {
    let (ana_id, year, ana) = storms::ANA;
    let (diana_id, _, diana) = storms::DIANA;
    let fetcher = MockFetcher::new()
        .page(
            &forecast_index_url(year),
            pages::archive_index(FORECAST_RESULTS, year, &[(ana_id, ana), (diana_id, diana)]),
        )
        .page(
            &storm_page_url(FORECAST_RESULTS, ana_id, year, ana),
            pages::storm_page(&["forecast/archive/al012021_5day_001.zip"]),
        )
        .page(
            &storm_page_url(FORECAST_RESULTS, diana_id, year, diana),
            pages::storm_page(&["forecast/archive/al042021_5day_001.zip"]),
        );
    let archive = client(fetcher);

    let index = archive
        .advisory_urls(&StormSelection::new().with_storm(year, "ANA"))
        .await
        .unwrap();

    assert_eq!(index.len(), 1);
    assert_eq!(paths(&index, "ANA"), vec!["forecast/archive/al012021_5day_001.zip"]);
}

#[tokio::test]
async fn test_storm_page_without_archives_is_kept_empty() {
    let (id, year, name) = storms::MICHAEL;
    let fetcher = MockFetcher::new()
        .page(
            &forecast_index_url(year),
            pages::archive_index(FORECAST_RESULTS, year, &[(id, name)]),
        )
        .page(&storm_page_url(FORECAST_RESULTS, id, year, name), pages::storm_page(&[]));
    let archive = client(fetcher);

    let index = archive
        .advisory_urls(&StormSelection::new().with_storm(year, name))
        .await
        .unwrap();

    assert_eq!(index.len(), 1);
    assert!(index.get(name).unwrap().is_empty());
    assert_eq!(index.archive_count(), 0);
}

#[tokio::test]
async fn test_absolute_archive_links_stay_absolute() {
    let (id, year, name) = storms::MICHAEL;
    let fetcher = MockFetcher::new()
        .page(
            &forecast_index_url(year),
            pages::archive_index(FORECAST_RESULTS, year, &[(id, name)]),
        )
        .page(
            &storm_page_url(FORECAST_RESULTS, id, year, name),
            pages::storm_page(&[
                "/gis/forecast/archive/al142018_5day_001.zip",
                "https://mirror.example.org/al142018_5day_002.zip",
            ]),
        );
    let archive = client(fetcher);

    let index = archive
        .advisory_urls(&StormSelection::new().with_storm(year, name))
        .await
        .unwrap();

    assert_eq!(
        paths(&index, name),
        vec![
            "forecast/archive/al142018_5day_001.zip",
            "https://mirror.example.org/al142018_5day_002.zip",
        ]
    );
}

// ============================================================================
// Years and kinds
// ============================================================================

#[tokio::test]
async fn test_best_track_across_years() {
    let (michael_id, michael_year, michael) = storms::MICHAEL;
    let (irma_id, irma_year, irma) = storms::IRMA;
    let fetcher = MockFetcher::new()
        .page(
            &format!("{}/gis/archive_besttrack.php?year={}", BASE_URL, irma_year),
            pages::archive_index(BEST_TRACK_RESULTS, irma_year, &[(irma_id, irma)]),
        )
        .page(
            &format!("{}/gis/archive_besttrack.php?year={}", BASE_URL, michael_year),
            pages::archive_index(BEST_TRACK_RESULTS, michael_year, &[(michael_id, michael)]),
        )
        .page(
            &storm_page_url(BEST_TRACK_RESULTS, irma_id, irma_year, irma),
            pages::storm_page(&["best_track/al112017_best_track.zip"]),
        )
        .page(
            &storm_page_url(BEST_TRACK_RESULTS, michael_id, michael_year, michael),
            pages::storm_page(&["best_track/al142018_best_track.zip"]),
        );
    let archive = client(fetcher);

    let selection = StormSelection::new()
        .with_storm(irma_year, irma)
        .with_storm(michael_year, michael);
    let index = archive.best_track_urls(&selection).await.unwrap();

    assert_eq!(index.storms().collect::<Vec<_>>(), vec!["IRMA", "MICHAEL"]);
    assert_eq!(paths(&index, "IRMA"), vec!["best_track/al112017_best_track.zip"]);
    assert_eq!(paths(&index, "MICHAEL"), vec!["best_track/al142018_best_track.zip"]);
}

#[tokio::test]
async fn test_surge_urls_filter_by_height() {
    let (id, year, name) = storms::MICHAEL;
    let fetcher = MockFetcher::new()
        .page(
            &format!("{}/gis/archive_psurge.php?&year={}", BASE_URL, year),
            pages::archive_index(PSURGE_RESULTS, year, &[(id, name)]),
        )
        .page(
            &storm_page_url(PSURGE_RESULTS, id, year, name),
            pages::storm_page(&[
                "storm_surge/al142018_psurge5_2018100918.zip",
                "storm_surge/al142018_psurge5_2018100921.zip",
                "storm_surge/al142018_psurge10_2018100918.zip",
                "storm_surge/al142018_psurge5_2018100918.kmz",
            ]),
        );
    let archive = client(fetcher);
    let selection = StormSelection::new().with_storm(year, name);

    let five = archive.surge_urls(DEFAULT_SURGE_FEET, &selection).await.unwrap();
    assert_eq!(
        paths(&five, name),
        vec![
            "storm_surge/al142018_psurge5_2018100918.zip",
            "storm_surge/al142018_psurge5_2018100921.zip",
        ]
    );

    let ten = archive.surge_urls(10, &selection).await.unwrap();
    assert_eq!(
        paths(&ten, name),
        vec!["storm_surge/al142018_psurge10_2018100918.zip"]
    );
}

#[tokio::test]
async fn test_discovery_is_idempotent() {
    let archive = client(forecast_2018());
    let selection = StormSelection::new()
        .with_storm(2018, "MICHAEL")
        .with_storm(2018, "FLORENCE");

    let first = archive.advisory_urls(&selection).await.unwrap();
    let second = archive.advisory_urls(&selection).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first.archive_count(), 3);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_missing_index_page_propagates() {
    let archive = client(MockFetcher::new());
    let result = archive
        .advisory_urls(&StormSelection::new().with_storm(2018, "MICHAEL"))
        .await;

    match result {
        Err(ArchiveError::HttpStatus { url, status }) => {
            assert_eq!(status, 404);
            assert_eq!(url, forecast_index_url(2018));
        }
        other => panic!("expected HTTP status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_storm_page_propagates() {
    let (id, year, name) = storms::MICHAEL;
    let fetcher = MockFetcher::new().page(
        &forecast_index_url(year),
        pages::archive_index(FORECAST_RESULTS, year, &[(id, name)]),
    );
    let archive = client(fetcher);

    let result = archive
        .advisory_urls(&StormSelection::new().with_storm(year, name))
        .await;
    assert!(matches!(result, Err(ArchiveError::HttpStatus { status: 404, .. })));
}

#[tokio::test]
async fn test_invalid_selection_is_rejected() {
    let archive = client(forecast_2018());
    let result = archive
        .advisory_urls(&StormSelection::new().with_storm(2018, "NOT A NAME"))
        .await;

    assert!(matches!(result, Err(ArchiveError::Storm(_))));
    assert!(archive.fetcher().calls().is_empty());
}
