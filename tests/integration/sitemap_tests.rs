//! Integration tests for sitemap mode
//!
//! A wiremock server plays the site: it serves the sitemap index, the child
//! sitemaps, and the pages they list.

use linksweep::config::Config;
use linksweep::crawler::Coordinator;
use linksweep::output::{EventLog, LogLevel, BROKEN_LINKS_FILE, RAW_LOG_FILE};
use linksweep::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

fn create_test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.output.root_dir = root.to_string_lossy().into_owned();
    config.crawler.request_timeout = 5;
    config.crawler.connect_timeout = 2;
    config
}

fn sitemap_index(children: &[String]) -> String {
    let entries: String = children
        .iter()
        .map(|c| format!("<sitemap><loc>{}</loc></sitemap>", c))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="{}">{}</sitemapindex>"#,
        SITEMAP_NS, entries
    )
}

fn urlset(pages: &[String]) -> String {
    let entries: String = pages
        .iter()
        .map(|p| format!("<url><loc>{}</loc></url>", p))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="{}">{}</urlset>"#,
        SITEMAP_NS, entries
    )
}

async fn mount_xml(server: &MockServer, route: &str, xml: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(xml, "application/xml"))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, route: &str, body: &str, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(format!("<html><body>{}</body></html>", body), "text/html"),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_hits)
        .mount(server)
        .await;
}

fn coordinator(root: &Path, log: &Arc<EventLog>) -> Coordinator {
    Coordinator::new(create_test_config(root), log.clone()).expect("Failed to build coordinator")
}

fn url(base: &str, route: &str) -> Url {
    Url::parse(&format!("{}{}", base, route)).unwrap()
}

#[tokio::test]
async fn test_unreachable_first_child_does_not_stop_second() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_xml(
        &mock_server,
        "/sitemap_index.xml",
        sitemap_index(&[
            format!("{}/missing-sitemap.xml", base),
            format!("{}/pages-sitemap.xml", base),
        ]),
    )
    .await;
    mount_status(&mock_server, "/missing-sitemap.xml", 404, 1).await;
    mount_xml(
        &mock_server,
        "/pages-sitemap.xml",
        urlset(&[format!("{}/p1", base), format!("{}/p2", base)]),
    )
    .await;
    mount_page(&mock_server, "/p1", r#"<a href="/gone">Gone</a>"#, 1).await;
    mount_page(&mock_server, "/p2", r#"<a href="/p1">P1</a>"#, 1).await;
    mount_status(&mock_server, "/gone", 404, 1).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let summary = coordinator(root.path(), &log)
        .crawl_sitemap(&url(&base, "/sitemap_index.xml"))
        .await
        .expect("A failing child sitemap must not fail the run");

    assert_eq!(summary.failed_sitemaps, 1);
    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.broken_links, 1);

    let failed_dir = summary.output_dir.join("missing_sitemap");
    let failed_log = std::fs::read_to_string(failed_dir.join(RAW_LOG_FILE)).unwrap();
    assert!(failed_log.contains("Skipping sitemap"));

    let child_dir = summary.output_dir.join("pages_sitemap");
    assert!(child_dir.join(RAW_LOG_FILE).is_file());
    let broken = std::fs::read_to_string(child_dir.join(BROKEN_LINKS_FILE)).unwrap();
    assert!(broken.contains(&format!("page: {}/p1,", base)));
    assert!(broken.contains(&format!("broken_link: {}/gone,", base)));

    let records = log.broken_links();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].failure.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_top_level_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let port = Url::parse(&base).unwrap().port().unwrap();

    mount_status(&mock_server, "/sitemap_index.xml", 500, 1).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let err = coordinator(root.path(), &log)
        .crawl_sitemap(&url(&base, "/sitemap_index.xml"))
        .await
        .expect_err("An unreachable sitemap index must fail the run");

    assert_eq!(err.kind(), Some(ErrorKind::SitemapFetch));
    assert!(err.is_fatal());
    assert_eq!(log.messages(LogLevel::Error).len(), 1);

    // The failure is still recorded in the run's raw log
    let site_dir = root.path().join(format!("127_0_0_1_{}", port));
    let run_dir = std::fs::read_dir(&site_dir)
        .unwrap()
        .next()
        .expect("run directory")
        .unwrap()
        .path();
    let raw_log = std::fs::read_to_string(run_dir.join(RAW_LOG_FILE)).unwrap();
    assert!(raw_log.contains("[ERROR]"));
    assert!(raw_log.contains("HTTP status 500"));
}

#[tokio::test]
async fn test_unparsable_index_is_fatal() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html>not a sitemap</html>", "text/html"))
        .mount(&mock_server)
        .await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let err = coordinator(root.path(), &log)
        .crawl_sitemap(&url(&base, "/sitemap_index.xml"))
        .await
        .expect_err("A non-sitemap document must fail the run");

    assert_eq!(err.kind(), Some(ErrorKind::SitemapFetch));
}

#[tokio::test]
async fn test_top_level_urlset_is_its_own_child() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    // Fetched once as the index and once as the child
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(urlset(&[format!("{}/only", base)]), "application/xml"),
        )
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/only", "no links", 1).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let summary = coordinator(root.path(), &log)
        .crawl_sitemap(&url(&base, "/sitemap.xml"))
        .await
        .expect("Sitemap run failed");

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.failed_sitemaps, 0);
    assert!(summary.output_dir.join("sitemap").join(RAW_LOG_FILE).is_file());
}

#[tokio::test]
async fn test_root_url_defaults_to_sitemap_index() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_xml(&mock_server, "/sitemap_index.xml", sitemap_index(&[])).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let summary = coordinator(root.path(), &log)
        .crawl_sitemap(&url(&base, "/"))
        .await
        .expect("Sitemap run failed");

    assert_eq!(summary.pages_visited, 0);
}

#[tokio::test]
async fn test_sitemap_pages_do_not_expand() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_xml(
        &mock_server,
        "/sitemap_index.xml",
        sitemap_index(&[format!("{}/pages.xml", base)]),
    )
    .await;
    mount_xml(&mock_server, "/pages.xml", urlset(&[format!("{}/start", base)])).await;
    mount_page(&mock_server, "/start", r#"<a href="/linked">Linked</a>"#, 1).await;
    // Verified as a link but never processed as a page
    mount_page(&mock_server, "/linked", r#"<a href="/deeper">Deeper</a>"#, 1).await;
    mount_page(&mock_server, "/deeper", "", 0).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let summary = coordinator(root.path(), &log)
        .crawl_sitemap(&url(&base, "/sitemap_index.xml"))
        .await
        .expect("Sitemap run failed");

    assert_eq!(summary.pages_visited, 1);
    assert_eq!(summary.links_checked, 1);
}

#[tokio::test]
async fn test_each_child_has_its_own_visited_set() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_xml(
        &mock_server,
        "/sitemap_index.xml",
        sitemap_index(&[format!("{}/first.xml", base), format!("{}/second.xml", base)]),
    )
    .await;
    mount_xml(&mock_server, "/first.xml", urlset(&[format!("{}/a", base)])).await;
    mount_xml(&mock_server, "/second.xml", urlset(&[format!("{}/b", base)])).await;
    mount_page(&mock_server, "/a", r#"<a href="/shared">Shared</a>"#, 1).await;
    mount_page(&mock_server, "/b", r#"<a href="/shared">Shared</a>"#, 1).await;
    // Verified once per child sitemap
    mount_page(&mock_server, "/shared", "", 2).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let summary = coordinator(root.path(), &log)
        .crawl_sitemap(&url(&base, "/sitemap_index.xml"))
        .await
        .expect("Sitemap run failed");

    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.links_checked, 2);
    assert!(summary.output_dir.join("first").is_dir());
    assert!(summary.output_dir.join("second").is_dir());
}

#[tokio::test]
async fn test_off_domain_sitemap_pages_are_skipped() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let port = Url::parse(&base).unwrap().port().unwrap();

    mount_xml(
        &mock_server,
        "/sitemap_index.xml",
        sitemap_index(&[format!("{}/pages.xml", base)]),
    )
    .await;
    mount_xml(
        &mock_server,
        "/pages.xml",
        urlset(&[format!("http://localhost:{}/elsewhere", port)]),
    )
    .await;
    mount_page(&mock_server, "/elsewhere", "", 0).await;

    let root = TempDir::new().unwrap();
    let log = Arc::new(EventLog::new());
    let summary = coordinator(root.path(), &log)
        .crawl_sitemap(&url(&base, "/sitemap_index.xml"))
        .await
        .expect("Sitemap run failed");

    assert_eq!(summary.pages_visited, 0);
    assert!(log
        .messages(LogLevel::Warning)
        .iter()
        .any(|m| m.contains("/elsewhere")));
}
