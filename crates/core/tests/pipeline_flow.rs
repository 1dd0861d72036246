//! Playlist pipeline integration tests.
//!
//! These tests run whole playlists against a real beets database on disk,
//! the mock catalog and a local torrent directory:
//! - Strict matching and M3U export
//! - Release selection and the budget check
//! - Isolation of search and acquisition failures

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};
use tempfile::TempDir;

use redlist_core::{
    acquire::{AcquisitionFailure, AcquisitionOutcome},
    catalog::{CatalogError, TorrentPayload},
    playlist::Playlist,
    searcher::SearchOutcome,
    testing::{fixtures, MockCatalogClient, MockRemoteConnector},
    AcquisitionTarget, BeetsLibrary, Confirm, Pipeline, PipelineOptions, PipelineStop,
    QualityPreference, TrackDescriptor,
};

const MB: u64 = 1024 * 1024;

/// Says yes to everything and remembers what it was asked.
#[derive(Default)]
struct RecordingConfirm {
    prompts: Mutex<Vec<String>>,
}

impl Confirm for RecordingConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        true
    }
}

fn create_beets_db(path: &Path, items: &[(i64, &str, &str, &str, &str)]) {
    let conn = Connection::open(path).expect("Failed to create database");
    conn.execute_batch(
        "CREATE TABLE items (
            id INTEGER PRIMARY KEY,
            title TEXT,
            artist TEXT,
            album TEXT,
            track INTEGER,
            path BLOB
        );",
    )
    .expect("Failed to create items table");

    for (id, artist, title, album, path) in items {
        conn.execute(
            "INSERT INTO items (id, title, artist, album, track, path) \
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![id, title, artist, album, path.as_bytes()],
        )
        .expect("Failed to insert item");
    }
}

/// Test helper wiring a pipeline to a temp beets db and directories.
struct TestHarness {
    pipeline: Pipeline,
    catalog: Arc<MockCatalogClient>,
    confirm: Arc<RecordingConfirm>,
    work_dir: TempDir,
    torrent_dir: TempDir,
}

impl TestHarness {
    fn new(options: PipelineOptions, catalog: Arc<MockCatalogClient>) -> Self {
        let work_dir = TempDir::new().expect("Failed to create temp dir");
        let torrent_dir = TempDir::new().expect("Failed to create torrent dir");
        let db_path = work_dir.path().join("library.db");

        create_beets_db(
            &db_path,
            &[
                (1, "Joy Division", "Disorder", "Unknown Pleasures", "/music/jd/disorder.flac"),
                (2, "Joy Division", "Atmosphere", "Substance", "/music/jd/atmosphere.flac"),
            ],
        );
        let library = BeetsLibrary::open(&db_path).expect("Failed to open library");
        let confirm = Arc::new(RecordingConfirm::default());

        let pipeline = Pipeline::new(
            options,
            Arc::new(library),
            Arc::clone(&catalog) as Arc<dyn redlist_core::CatalogClient>,
            Arc::new(QualityPreference::default()),
            AcquisitionTarget::Directory(torrent_dir.path().to_path_buf()),
            Arc::clone(&confirm) as Arc<dyn Confirm>,
            work_dir.path(),
        );

        Self {
            pipeline,
            catalog,
            confirm,
            work_dir,
            torrent_dir,
        }
    }
}

fn playlist() -> Playlist {
    Playlist {
        title: "Closer Look".to_string(),
        tracks: vec![
            TrackDescriptor::new("Joy Division", "Disorder").with_album("Unknown Pleasures"),
            TrackDescriptor::new("Joy Division", "Atmosphere").with_album("Closer"),
            TrackDescriptor::new("Joy Division", "Isolation").with_album("Closer"),
        ],
    }
}

#[tokio::test]
async fn test_strict_match_select_flac_and_dispatch_despite_shortfall() {
    let catalog = Arc::new(MockCatalogClient::new());
    let atmosphere = playlist().tracks[1].clone();
    catalog
        .set_results(
            &atmosphere,
            vec![fixtures::release_group(
                7,
                "Joy Division",
                "Closer",
                vec![
                    fixtures::variant(71, "MP3", "320", 10 * MB),
                    fixtures::variant(70, "FLAC", "Lossless", 40 * MB),
                ],
            )],
        )
        .await;
    catalog
        .set_torrent(
            70,
            TorrentPayload {
                filename: "Joy Division - Closer [FLAC].torrent".to_string(),
                data: b"d8:announce3:urle".to_vec(),
            },
        )
        .await;

    let options = PipelineOptions {
        strict: true,
        available_bytes: Some(30 * MB),
        ..Default::default()
    };
    let harness = TestHarness::new(options, catalog);

    let report = harness.pipeline.run(&playlist()).await.unwrap();

    // Strict matching keeps Disorder, rejects the Substance copy of Atmosphere
    assert_eq!(report.matches.matched_count(), 1);
    assert_eq!(
        report.matches.unmatched(),
        vec![playlist().tracks[1].clone(), playlist().tracks[2].clone()]
    );

    let m3u = std::fs::read_to_string(harness.work_dir.path().join("Closer Look.m3u")).unwrap();
    assert_eq!(
        m3u,
        "#EXTM3U\n#EXTINF:-1,Joy Division - Disorder\n/music/jd/disorder.flac\n"
    );

    let search = report.search.as_ref().unwrap();
    assert_eq!(search.total(), 2);
    assert_eq!(search.found_count(), 1);
    assert_eq!(search.missing_count(), 1);
    let chosen = search.get(&atmosphere).and_then(|o| o.candidate()).unwrap();
    assert_eq!(chosen.variant.format, "FLAC");
    assert_eq!(chosen.variant.size_bytes, 40 * MB);

    let budget = report.budget.unwrap();
    assert_eq!(budget.total_bytes, 40 * MB);
    assert_eq!(budget.shortfall, Some(10 * MB));

    // The user was asked about the shortfall and said yes
    let prompts = harness.confirm.prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[2].contains("Continue?"));

    assert_eq!(report.stop, PipelineStop::Completed);
    let acquisition = report.acquisition.unwrap();
    assert_eq!(acquisition.len(), 1);
    assert!(acquisition.outcomes[0].1.is_success());
    assert_eq!(harness.catalog.recorded_fetches().await, vec![70]);

    let saved = harness
        .torrent_dir
        .path()
        .join("Joy Division - Closer [FLAC].torrent");
    assert_eq!(std::fs::read(saved).unwrap(), b"d8:announce3:urle");
}

#[tokio::test]
async fn test_transport_failures_do_not_escape() {
    let catalog = Arc::new(MockCatalogClient::new());
    catalog
        .fail_search(
            &playlist().tracks[1],
            CatalogError::ConnectionFailed("connection reset".into()),
        )
        .await;
    catalog
        .fail_search(&playlist().tracks[2], CatalogError::Timeout)
        .await;
    let options = PipelineOptions {
        strict: true,
        ..Default::default()
    };
    let harness = TestHarness::new(options, catalog);

    let report = harness.pipeline.run(&playlist()).await.unwrap();

    assert_eq!(report.stop, PipelineStop::NothingFound);
    let search = report.search.unwrap();
    assert_eq!(search.found_count(), 0);
    assert_eq!(search.missing_count(), 2);
    assert!(search
        .results
        .iter()
        .all(|(_, outcome)| matches!(outcome, SearchOutcome::Failed(_))));
    assert!(harness.catalog.recorded_fetches().await.is_empty());
}

#[tokio::test]
async fn test_non_strict_matches_other_album() {
    let harness = TestHarness::new(PipelineOptions::default(), Arc::new(MockCatalogClient::new()));

    let report = harness.pipeline.run(&playlist()).await.unwrap();

    assert_eq!(report.matches.matched_count(), 2);
    assert_eq!(report.matches.unmatched(), vec![playlist().tracks[2].clone()]);
    assert_eq!(report.stop, PipelineStop::NothingFound);
}

#[tokio::test]
async fn test_failed_fetch_is_isolated() {
    let catalog = Arc::new(MockCatalogClient::new());
    let tracks = playlist().tracks;
    catalog
        .set_results(
            &tracks[1],
            vec![fixtures::release_group(
                7,
                "Joy Division",
                "Closer",
                vec![fixtures::variant(70, "FLAC", "Lossless", 40 * MB)],
            )],
        )
        .await;
    catalog
        .set_results(
            &tracks[2],
            vec![fixtures::release_group(
                8,
                "Joy Division",
                "Still",
                vec![fixtures::variant(80, "FLAC", "Lossless", 40 * MB)],
            )],
        )
        .await;
    catalog.fail_fetch(70, CatalogError::RateLimited).await;
    let options = PipelineOptions {
        strict: true,
        ..Default::default()
    };
    let harness = TestHarness::new(options, catalog);

    let report = harness.pipeline.run(&playlist()).await.unwrap();

    let acquisition = report.acquisition.unwrap();
    assert_eq!(acquisition.len(), 2);
    assert_eq!(
        acquisition.outcomes[0].1,
        AcquisitionOutcome::Failure(AcquisitionFailure::Fetch(CatalogError::RateLimited))
    );
    assert!(acquisition.outcomes[1].1.is_success());
    assert!(harness.torrent_dir.path().join("80.torrent").exists());
}

#[tokio::test]
async fn test_tracks_from_same_release_acquired_once() {
    let catalog = Arc::new(MockCatalogClient::new());
    let closer = vec![fixtures::release_group(
        7,
        "Joy Division",
        "Closer",
        vec![fixtures::variant(70, "FLAC", "Lossless", 40 * MB)],
    )];
    for track in &playlist().tracks[1..] {
        catalog.set_results(track, closer.clone()).await;
    }
    let options = PipelineOptions {
        strict: true,
        ..Default::default()
    };
    let harness = TestHarness::new(options, catalog);

    let report = harness.pipeline.run(&playlist()).await.unwrap();

    assert_eq!(report.search.unwrap().found_count(), 2);
    assert_eq!(report.acquisition.unwrap().len(), 1);
    assert_eq!(harness.catalog.recorded_fetches().await, vec![70]);
}

#[tokio::test]
async fn test_remote_target_closes_session() {
    let catalog = Arc::new(MockCatalogClient::new());
    catalog
        .set_results(
            &playlist().tracks[2],
            vec![fixtures::release_group(
                8,
                "Joy Division",
                "Still",
                vec![fixtures::variant(80, "FLAC", "Lossless", MB)],
            )],
        )
        .await;
    catalog.fail_fetch(80, CatalogError::Timeout).await;

    let work_dir = TempDir::new().unwrap();
    let db_path = work_dir.path().join("library.db");
    create_beets_db(&db_path, &[]);
    let connector = Arc::new(MockRemoteConnector::new());
    let pipeline = Pipeline::new(
        PipelineOptions::default(),
        Arc::new(BeetsLibrary::open(&db_path).unwrap()),
        catalog,
        Arc::new(QualityPreference::default()),
        AcquisitionTarget::Remote(connector.clone()),
        Arc::new(redlist_core::AssumeYes),
        work_dir.path(),
    );

    let report = pipeline.run(&playlist()).await.unwrap();

    // Every fetch failed, the session is still released
    assert_eq!(report.acquisition.unwrap().failure_count(), 1);
    assert_eq!(connector.session().close_count(), 1);
    assert!(connector.session().submissions().await.is_empty());
}
