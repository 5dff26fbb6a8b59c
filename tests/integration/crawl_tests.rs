//! Integration tests for the crawl engine
//!
//! These tests run the full engine — intake, worker pool, rate limiter,
//! extractor, indexer sink and stat store — against wiremock HTTP servers
//! standing in for both the crawled sites and the search index.

use skitter::config::{EngineConfig, IndexConfig};
use skitter::index::HttpIndexer;
use skitter::intake::{Admission, IntakeHandler};
use skitter::stats::{CrawlStatus, SharedStatStore};
use skitter::storage::SqliteStatStore;
use skitter::CrawlEngine;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine_config(max_depth: u32) -> EngineConfig {
    EngineConfig {
        workers: 4,
        max_rps: 100,
        max_depth,
        done_threshold: 10,
        recrawl_interval_secs: 86_399,
        fetch_timeout_secs: 5,
        user_agent: "skitter-test/0.1".to_string(),
    }
}

/// Builds an engine backed by a file store and a real HTTP index sink
fn build_engine(
    config: EngineConfig,
    index_uri: &str,
    db_dir: &TempDir,
) -> (Arc<CrawlEngine>, SharedStatStore) {
    let db_path = db_dir.path().join("stats.db");
    let store: SharedStatStore = Arc::new(Mutex::new(
        SqliteStatStore::new(Path::new(&db_path)).expect("failed to open store"),
    ));

    let sink = HttpIndexer::new(&IndexConfig {
        endpoint: index_uri.to_string(),
        collection: "crawling".to_string(),
    })
    .expect("failed to build index sink");

    let engine = CrawlEngine::new(config, Arc::new(sink), Arc::clone(&store))
        .expect("failed to build engine");
    (engine, store)
}

/// Mounts an HTML page mock expected to be fetched exactly once
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Mounts the index sink endpoint
async fn mount_index(server: &MockServer, expected_docs: u64) {
    Mock::given(method("POST"))
        .and(path("/crawling/_doc"))
        .respond_with(ResponseTemplate::new(201))
        .expect(expected_docs)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_small_site_crawls_fully_but_stays_crawling() {
    let site = MockServer::start().await;
    let index = MockServer::start().await;
    let root = site.uri();

    // Three pages, each linking to the other two; every page fetched exactly
    // once despite the cross-links
    mount_page(
        &site,
        "/",
        r#"<html><head><title>Home</title></head>
           <body><a href="x">X</a> <a href="y">Y</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        &site,
        "/x",
        format!(r#"<html><body><a href="{}">Home</a> <a href="y">Y</a></body></html>"#, root),
    )
    .await;
    mount_page(
        &site,
        "/y",
        format!(r#"<html><body><a href="{}">Home</a> <a href="x">X</a></body></html>"#, root),
    )
    .await;

    mount_index(&index, 3).await;

    let db_dir = TempDir::new().unwrap();
    let (engine, _store) = build_engine(engine_config(2), &index.uri(), &db_dir);

    let handler = IntakeHandler::new(Arc::clone(&engine));
    let admission = handler.admit(&root, 1).await.unwrap();
    assert_eq!(admission, Admission::Started);

    let workers = engine.spawn_workers();

    // Wait for the crawl to drain
    let job = engine.job(&root).await.unwrap();
    for _ in 0..400 {
        tokio::time::sleep(Duration::from_millis(25)).await;
        let snapshot = job.snapshot().await;
        if snapshot.pages_fetched == 3 && snapshot.frontier_len == 0 {
            break;
        }
    }
    // Give the drain-side completion checks a moment to run
    tokio::time::sleep(Duration::from_millis(100)).await;

    let snapshot = job.snapshot().await;
    assert_eq!(snapshot.pages_fetched, 3);
    assert_eq!(snapshot.seen_count, 3);
    assert_eq!(snapshot.frontier_len, 0);

    assert_eq!(engine.tracker().pages_count(&root), Some(3));
    // Three pages never clears the done threshold, so the crawl stays open
    assert_eq!(engine.tracker().status(&root), Some(CrawlStatus::Crawling));

    for worker in workers {
        worker.abort();
    }
}

#[tokio::test]
async fn test_depth_limit_bounds_traversal() {
    let site = MockServer::start().await;
    let index = MockServer::start().await;
    let root = site.uri();

    // A chain: / -> a -> b -> c with depth limit 2. The root is depth 0 and
    // /a depth 1; /b is discovered at depth 2 and discarded unfetched.
    mount_page(
        &site,
        "/",
        r#"<html><body><a href="a">A</a></body></html>"#.to_string(),
    )
    .await;
    mount_page(
        &site,
        "/a",
        r#"<html><body><a href="b">B</a></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&site)
        .await;

    mount_index(&index, 2).await;

    let db_dir = TempDir::new().unwrap();
    let (engine, _store) = build_engine(engine_config(2), &index.uri(), &db_dir);

    let handler = IntakeHandler::new(Arc::clone(&engine));
    handler.admit(&root, 1).await.unwrap();

    let workers = engine.spawn_workers();

    let job = engine.job(&root).await.unwrap();
    for _ in 0..400 {
        tokio::time::sleep(Duration::from_millis(25)).await;
        let snapshot = job.snapshot().await;
        if snapshot.pages_fetched == 2 && snapshot.frontier_len == 0 {
            break;
        }
    }

    let snapshot = job.snapshot().await;
    assert_eq!(snapshot.pages_fetched, 2);
    // /b was seen (counted toward dedup) but never fetched
    assert_eq!(snapshot.seen_count, 3);

    for worker in workers {
        worker.abort();
    }
}

#[tokio::test]
async fn test_large_site_reaches_done() {
    let site = MockServer::start().await;
    let index = MockServer::start().await;
    let root = site.uri();

    // A hub page linking to twelve leaves: 13 fetches, past the threshold
    let hub: String = (0..12)
        .map(|i| format!(r#"<a href="p{}">P{}</a>"#, i, i))
        .collect();
    mount_page(&site, "/", format!("<html><body>{}</body></html>", hub)).await;
    for i in 0..12 {
        mount_page(
            &site,
            &format!("/p{}", i),
            format!("<html><body>Leaf {}</body></html>", i),
        )
        .await;
    }

    mount_index(&index, 13).await;

    let db_dir = TempDir::new().unwrap();
    let (engine, store) = build_engine(engine_config(2), &index.uri(), &db_dir);

    let handler = IntakeHandler::new(Arc::clone(&engine));
    handler.admit(&root, 1).await.unwrap();

    let workers = engine.spawn_workers();

    for _ in 0..400 {
        tokio::time::sleep(Duration::from_millis(25)).await;
        if engine.tracker().status(&root) == Some(CrawlStatus::Done) {
            break;
        }
    }

    assert_eq!(engine.tracker().status(&root), Some(CrawlStatus::Done));
    assert_eq!(engine.tracker().pages_count(&root), Some(13));

    // The persisted record shows Done with the last checkpointed count
    let store = store.lock().unwrap();
    let record = store.latest_for_domain(&root).unwrap().unwrap();
    assert_eq!(record.status, CrawlStatus::Done);
    assert_eq!(record.pages_count, 10);
    drop(store);

    for worker in workers {
        worker.abort();
    }
}

#[tokio::test]
async fn test_bad_page_does_not_stall_the_crawl() {
    let site = MockServer::start().await;
    let index = MockServer::start().await;
    let root = site.uri();

    // /broken answers 500; the rest of the site still gets crawled
    mount_page(
        &site,
        "/",
        r#"<html><body><a href="broken">B</a> <a href="ok">OK</a></body></html>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&site)
        .await;
    mount_page(&site, "/ok", "<html><body>Fine</body></html>".to_string()).await;

    // Only the two healthy pages produce documents
    mount_index(&index, 2).await;

    let db_dir = TempDir::new().unwrap();
    let (engine, _store) = build_engine(engine_config(2), &index.uri(), &db_dir);

    let handler = IntakeHandler::new(Arc::clone(&engine));
    handler.admit(&root, 1).await.unwrap();

    let workers = engine.spawn_workers();

    let job = engine.job(&root).await.unwrap();
    for _ in 0..400 {
        tokio::time::sleep(Duration::from_millis(25)).await;
        let snapshot = job.snapshot().await;
        if snapshot.pages_fetched == 2 && snapshot.frontier_len == 0 {
            break;
        }
    }

    // The failed page is skipped, not counted, and not fatal
    assert_eq!(engine.tracker().pages_count(&root), Some(2));
    assert_eq!(job.snapshot().await.seen_count, 3);

    for worker in workers {
        worker.abort();
    }
}

#[tokio::test]
async fn test_intake_policy_against_file_store() {
    let index = MockServer::start().await;

    let db_dir = TempDir::new().unwrap();
    let (engine, store) = build_engine(engine_config(2), &index.uri(), &db_dir);
    let handler = IntakeHandler::new(Arc::clone(&engine));

    // Missing protocol is rejected with a persisted Error record
    let admission = handler.admit("ftp://bad.test", 1).await.unwrap();
    assert!(matches!(admission, Admission::Rejected(_)));
    {
        let store = store.lock().unwrap();
        let record = store.latest_for_domain("ftp://bad.test").unwrap().unwrap();
        assert_eq!(
            record.status,
            CrawlStatus::Error("protocol should be specified".to_string())
        );
    }
    assert!(!engine.is_registered("ftp://bad.test").await);

    // Two authors, one domain: one job, two records, no duplicate work
    assert_eq!(
        handler.admit("http://shared.test", 1).await.unwrap(),
        Admission::Started
    );
    assert_eq!(
        handler.admit("http://shared.test", 2).await.unwrap(),
        Admission::InterestRecorded
    );
    assert_eq!(
        handler.admit("http://shared.test", 1).await.unwrap(),
        Admission::Duplicate
    );

    {
        let store = store.lock().unwrap();
        let records = store.stats_for_domain("http://shared.test").unwrap();
        assert_eq!(records.len(), 2);
    }
    assert_eq!(engine.active_jobs().await.len(), 1);
}
