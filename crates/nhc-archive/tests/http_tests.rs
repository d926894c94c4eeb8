//! HTTP transport against a local mock server.

use std::time::Duration;

use mockito::Matcher;
use nhc_archive::{ArchiveConfig, ArchiveError, NhcArchive, RetryPolicy, ThrottlePolicy};
use storm_common::StormSelection;
use test_utils::fixtures::pages;
use test_utils::track_archive;

fn config_for(base_url: &str) -> ArchiveConfig {
    ArchiveConfig {
        base_url: base_url.to_string(),
        throttle: ThrottlePolicy::Disabled,
        request_timeout: Duration::from_secs(10),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_archive_download_over_http() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/gis/forecast/archive/al142018_5day_001.zip")
        .match_header("user-agent", Matcher::Regex("^nhc-archive/".to_string()))
        .with_status(200)
        .with_header("content-type", "application/zip")
        .with_body(track_archive("al142018-001_5day_pts", "MICHAEL", 1, 3))
        .create_async()
        .await;

    let archive = NhcArchive::new(config_for(&server.url())).unwrap();
    let table = archive
        .read_track_zip("forecast/archive/al142018_5day_001.zip")
        .await
        .unwrap();

    assert_eq!(table.len(), 3);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_http_error_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/gis/forecast/archive/missing.zip")
        .with_status(404)
        .create_async()
        .await;

    let archive = NhcArchive::new(config_for(&server.url())).unwrap();
    let result = archive.read_track_zip("forecast/archive/missing.zip").await;

    match result {
        Err(ArchiveError::HttpStatus { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/gis/forecast/archive/missing.zip"));
        }
        other => panic!("expected 404, got {:?}", other),
    }
    // Exactly one hit: status errors are not retried
    mock.assert_async().await;
}

#[tokio::test]
async fn test_discovery_over_http() {
    let mut server = mockito::Server::new_async().await;
    let index = server
        .mock("GET", "/gis/archive_besttrack.php")
        .match_query(Matcher::UrlEncoded("year".to_string(), "2018".to_string()))
        .with_status(200)
        .with_body(pages::archive_index(
            "archive_besttrack_results.php",
            2018,
            &[("al14", "MICHAEL"), ("al06", "FLORENCE")],
        ))
        .create_async()
        .await;
    let storm = server
        .mock("GET", "/gis/archive_besttrack_results.php")
        .match_query(Matcher::UrlEncoded(
            "name".to_string(),
            "Hurricane MICHAEL".to_string(),
        ))
        .with_status(200)
        .with_body(pages::storm_page(&["best_track/al142018_best_track.zip"]))
        .create_async()
        .await;

    let archive = NhcArchive::new(config_for(&server.url())).unwrap();
    let links = archive
        .best_track_urls(&StormSelection::new().with_storm(2018, "MICHAEL"))
        .await
        .unwrap();

    assert_eq!(links.archive_count(), 1);
    assert!(links
        .get("MICHAEL")
        .unwrap()
        .contains("best_track/al142018_best_track.zip"));
    index.assert_async().await;
    storm.assert_async().await;
}

#[tokio::test]
async fn test_connection_failures_are_retried_then_reported() {
    // Nothing listens on port 1
    let config = ArchiveConfig {
        retry: RetryPolicy {
            connect_retries: 2,
            backoff_factor: 0.01,
            ..Default::default()
        },
        ..config_for("http://127.0.0.1:1")
    };
    let archive = NhcArchive::new(config).unwrap();

    let result = archive.read_track_zip("forecast/archive/al142018_5day_001.zip").await;
    match result {
        Err(ArchiveError::Http { source, .. }) => assert!(source.is_connect()),
        other => panic!("expected connection error, got {:?}", other),
    }
}

#[test]
fn test_invalid_proxy_is_rejected() {
    let mut config = config_for("https://www.nhc.noaa.gov");
    config.proxy = Some(nhc_archive::ProxyConfig::new(" ", 3128));
    assert!(matches!(NhcArchive::new(config), Err(ArchiveError::Config(_))));
}
