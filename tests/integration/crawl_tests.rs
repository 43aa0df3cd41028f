//! Integration tests for full-crawl mode
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, including the report files.

use linksweep::config::Config;
use linksweep::crawler::{sweep, Coordinator, RunMode};
use linksweep::output::{EventLog, LogLevel, BROKEN_LINKS_FILE, RAW_LOG_FILE};
use linksweep::{CrawlTarget, ErrorKind, SweepError};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing reports under `root`
fn create_test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.output.root_dir = root.to_string_lossy().into_owned();
    config.crawler.request_timeout = 5;
    config.crawler.connect_timeout = 2;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

/// An HTML page whose body is the given markup
fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page: &str, body: &str, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html_page(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, page: &str, status: u16, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_hits)
        .mount(server)
        .await;
}

fn coordinator(config: Config, log: &Arc<EventLog>) -> Coordinator {
    Coordinator::new(config, log.clone()).expect("Failed to build coordinator")
}

fn target(server: &MockServer) -> CrawlTarget {
    CrawlTarget::parse(&server.uri()).expect("Failed to parse mock server URL")
}

#[tokio::test]
async fn test_two_page_site_reports_single_broken_link() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = url::Url::parse(&base_url).unwrap().port().unwrap();

    // A links to itself, to B (404) and to another host
    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<a href="/">Home</a>
               <a href="/b">B</a>
               <a href="http://localhost:{}/offsite">Elsewhere</a>"#,
            port
        ),
        1,
    )
    .await;
    // Verified once as a link, then fetched once as a page
    mount_status(&mock_server, "/b", 404, 2).await;
    // localhost is a different host, so this must never be requested
    mount_status(&mock_server, "/offsite", 200, 0).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let summary = coordinator(create_test_config(root.path()), &log)
        .crawl_site(&target(&mock_server))
        .await
        .expect("Crawl failed");

    let records = log.broken_links();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, format!("{}/", base_url));
    assert_eq!(records[0].target, format!("{}/b", base_url));
    assert_eq!(records[0].failure.kind(), ErrorKind::NotFound);
    assert_eq!(records[0].explanation, "Code 404 (unreachable)");

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.links_checked, 1);
    assert_eq!(summary.broken_links, 1);
    assert!(!summary.truncated);

    let headers = log.messages(LogLevel::Info);
    let visits = |page: &str| {
        headers
            .iter()
            .filter(|m| **m == format!("🔎 Current page: {}{}", base_url, page))
            .count()
    };
    assert_eq!(visits("/"), 1);
    assert_eq!(visits("/b"), 1);

    // The start page of B is reported as a page problem, not a second record
    assert!(log
        .messages(LogLevel::Error)
        .iter()
        .any(|m| m == &format!("Problem on page {}/b - Code: 404", base_url)));
}

#[tokio::test]
async fn test_report_files_are_written() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = url::Url::parse(&base_url).unwrap().port().unwrap();

    mount_page(&mock_server, "/", r#"<a href="/ok">OK</a><a href="/gone">Gone</a>"#, 1).await;
    mount_page(&mock_server, "/ok", "no links here", 2).await;
    mount_status(&mock_server, "/gone", 404, 2).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let summary = coordinator(create_test_config(root.path()), &log)
        .crawl_site(&target(&mock_server))
        .await
        .expect("Crawl failed");

    let site_dir = root.path().join(format!("127_0_0_1_{}", port));
    assert_eq!(summary.output_dir.parent(), Some(site_dir.as_path()));

    let raw_log = std::fs::read_to_string(summary.output_dir.join(RAW_LOG_FILE)).unwrap();
    assert!(raw_log.contains(&format!("[OK] Link OK: {}/ok", base_url)));
    assert!(raw_log.contains(&format!("[ERROR] Broken link found on page {}/", base_url)));
    assert!(raw_log.contains("🎉 All pages within '127.0.0.1:"));
    assert!(raw_log.contains("hours,"));

    let broken = std::fs::read_to_string(summary.output_dir.join(BROKEN_LINKS_FILE)).unwrap();
    assert_eq!(
        broken.trim_end(),
        format!(
            "❌ {{\n  page: {base}/,\n  broken_link: {base}/gone,\n  error: Code 404 (unreachable)\n}}",
            base = base_url
        )
    );
}

#[tokio::test]
async fn test_network_error_keeps_first_line_only() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/slow">Slow</a>"#, 1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page("late").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(root.path());
    config.crawler.request_timeout = 1;

    let log = Arc::new(EventLog::new());
    let summary = coordinator(config, &log)
        .crawl_site(&target(&mock_server))
        .await
        .expect("Crawl failed");

    let records = log.broken_links();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].failure.kind(), ErrorKind::Network);
    assert!(!records[0].explanation.is_empty());
    assert!(!records[0].explanation.contains('\n'));

    // The slow page is still visited as a page and fails there too
    assert_eq!(summary.pages_visited, 2);
    assert!(log
        .messages(LogLevel::Error)
        .iter()
        .any(|m| m.starts_with(&format!("Error accessing page {}/slow", mock_server.uri()))));
}

#[tokio::test]
async fn test_repeated_links_are_verified_once() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/a">A</a><a href="/b">B</a><a href="/a#again">A again</a>"#,
        1,
    )
    .await;
    // One verification plus one page fetch each, no matter how often linked
    mount_page(&mock_server, "/a", r#"<a href="/b">B</a><a href="/">Home</a>"#, 2).await;
    mount_page(&mock_server, "/b", r#"<a href="/a">A</a>"#, 2).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let summary = coordinator(create_test_config(root.path()), &log)
        .crawl_site(&target(&mock_server))
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages_visited, 3);
    assert_eq!(summary.links_checked, 2);
    assert_eq!(summary.broken_links, 0);
    assert_eq!(log.messages(LogLevel::Ok).iter().filter(|m| m.starts_with("Link OK")).count(), 2);
}

#[tokio::test]
async fn test_reruns_yield_same_broken_links() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/docs">Docs</a><a href="/old">Old</a>"#,
        2,
    )
    .await;
    mount_page(&mock_server, "/docs", r#"<a href="/older">Older</a>"#, 4).await;
    mount_status(&mock_server, "/old", 404, 4).await;
    mount_status(&mock_server, "/older", 404, 4).await;

    let root = TempDir::new().unwrap();
    let target = target(&mock_server);

    let mut runs = Vec::new();
    for _ in 0..2 {
        let log = Arc::new(EventLog::new());
        let summary = coordinator(create_test_config(root.path()), &log)
            .crawl_site(&target)
            .await
            .expect("Crawl failed");

        let broken: HashSet<(String, String)> = log
            .broken_links()
            .into_iter()
            .map(|r| (r.source, r.target))
            .collect();
        runs.push((summary.output_dir, broken));
    }

    assert_eq!(runs[0].1.len(), 2);
    assert_eq!(runs[0].1, runs[1].1);
    // Each run keeps its own report directory
    assert_ne!(runs[0].0, runs[1].0);
}

#[tokio::test]
async fn test_max_pages_stops_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a>"#,
        1,
    )
    .await;
    // Verified from the start page, never fetched as pages
    for page in ["/1", "/2", "/3"] {
        mount_page(&mock_server, page, "leaf", 1).await;
    }

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(root.path());
    config.crawler.max_pages = Some(1);

    let log = Arc::new(EventLog::new());
    let summary = coordinator(config, &log)
        .crawl_site(&target(&mock_server))
        .await
        .expect("Crawl failed");

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.links_checked, 3);
    assert!(summary.truncated);
    assert!(log
        .messages(LogLevel::Warning)
        .iter()
        .any(|m| m.starts_with("Page limit of 1 reached")));
}

#[tokio::test]
async fn test_server_error_is_warning_not_broken_link() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/flaky">Flaky</a>"#, 1).await;
    mount_status(&mock_server, "/flaky", 500, 2).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let summary = coordinator(create_test_config(root.path()), &log)
        .crawl_site(&target(&mock_server))
        .await
        .expect("Crawl failed");

    assert_eq!(summary.broken_links, 0);
    assert!(log.broken_links().is_empty());
    assert!(log
        .messages(LogLevel::Warning)
        .iter()
        .any(|m| m.contains("code 500 (server error)")));
}

#[tokio::test]
async fn test_link_results_follow_link_order() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/first">1</a><a href="/second">2</a><a href="/third">3</a>"#,
        1,
    )
    .await;
    // The first link answers last
    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(html_page("slow").set_delay(Duration::from_millis(300)))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/second", "fast", 2).await;
    mount_page(&mock_server, "/third", "fast", 2).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    coordinator(create_test_config(root.path()), &log)
        .crawl_site(&target(&mock_server))
        .await
        .expect("Crawl failed");

    let base = mock_server.uri();
    let link_results: Vec<String> = log
        .messages(LogLevel::Ok)
        .into_iter()
        .filter(|m| m.starts_with("Link OK"))
        .collect();
    assert_eq!(
        link_results,
        vec![
            format!("Link OK: {}/first", base),
            format!("Link OK: {}/second", base),
            format!("Link OK: {}/third", base),
        ]
    );
}

#[tokio::test]
async fn test_start_page_not_found_ends_quietly() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/", 404, 1).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let summary = coordinator(create_test_config(root.path()), &log)
        .crawl_site(&target(&mock_server))
        .await
        .expect("A missing start page is not a fatal error");

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.links_checked, 0);
    assert!(log.broken_links().is_empty());
    assert_eq!(log.messages(LogLevel::Error).len(), 1);
}

#[tokio::test]
async fn test_zero_concurrency_is_rejected_before_crawling() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", r#"<a href="/next">Next</a>"#, 0).await;
    mount_page(&mock_server, "/next", "", 0).await;

    let root = TempDir::new().unwrap();
    let mut config = create_test_config(root.path());
    config.crawler.max_concurrent_checks = 0;

    let log = Arc::new(EventLog::new());
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        sweep(config, &mock_server.uri(), RunMode::FullCrawl, log.clone()),
    )
    .await
    .expect("An invalid configuration must fail fast");

    assert!(matches!(result, Err(SweepError::Config(_))));
    assert!(log.is_empty());
}
