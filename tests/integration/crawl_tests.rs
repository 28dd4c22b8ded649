//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end through the reqwest fetcher.

use sitewalk::config::Config;
use sitewalk::crawler::{crawl_site, CrawlReport, FetchError, PageError};
use sitewalk::{CrawlError, StopReason, UrlError};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config(concurrency: usize, max_pages: usize) -> Config {
    let mut config = Config::default();
    config.crawler.concurrency = concurrency;
    config.crawler.max_pages = max_pages;
    config.http.timeout_secs = 1;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn crawl(server: &MockServer, config: &Config) -> CrawlReport {
    crawl_site(&format!("{}/", server.uri()), config, CancellationToken::new())
        .await
        .expect("crawl should start")
}

/// Same server, reached through a different host name
fn other_host(server: &MockServer) -> String {
    format!("http://localhost:{}", server.address().port())
}

#[tokio::test]
async fn test_full_crawl_single_host() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        &format!(
            r#"<a href="{}/page1">Page 1</a><a href="/page2">Page 2</a><a href="https://other.test/">Other</a>"#,
            base
        ),
    )
    .await;
    mount_page(&server, "/page1", r#"<a href="/">Home</a>"#).await;
    mount_page(&server, "/page2", r#"<a href="page1#top">Page 1</a>"#).await;

    let report = crawl(&server, &create_test_config(3, 100)).await;

    assert_eq!(report.stop_reason, StopReason::Drained);
    assert_eq!(report.pages_crawled(), 3);
    assert_eq!(report.failed().count(), 0);

    let home = report.page(&format!("{}/", base)).expect("home page recorded");
    let links: Vec<String> = home.links.iter().map(|l| l.to_string()).collect();
    assert_eq!(
        links,
        vec![
            format!("{}/page1", base),
            format!("{}/page2", base),
            "https://other.test/".to_string()
        ]
    );

    let page2 = report.page(&format!("{}/page2", base)).expect("page2 recorded");
    assert_eq!(page2.links.len(), 1);
    assert_eq!(page2.links[0].as_str(), format!("{}/page1", base));
}

#[tokio::test]
async fn test_other_host_is_never_fetched() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        &format!(r#"<a href="{}/external">External</a>"#, other_host(&server)),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/external"))
        .respond_with(html("should not be fetched"))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(&server, &create_test_config(2, 100)).await;

    assert_eq!(report.pages_crawled(), 1);
    assert_eq!(report.pages[0].links.len(), 1);
}

#[tokio::test]
async fn test_each_page_fetched_once() {
    let server = MockServer::start().await;

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();

    mount_page(&server, "/", &links).await;
    for i in 0..10 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html(&links))
            .expect(1)
            .mount(&server)
            .await;
    }

    let report = crawl(&server, &create_test_config(5, 100)).await;

    assert_eq!(report.pages_crawled(), 11);
}

#[tokio::test]
async fn test_directory_page_requested_with_trailing_slash() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/docs/">Docs</a>"#).await;
    mount_page(&server, "/docs/", r#"<a href="intro">Intro</a>"#).await;
    mount_page(&server, "/docs/intro", "Welcome").await;

    let report = crawl(&server, &create_test_config(2, 100)).await;

    assert_eq!(report.stop_reason, StopReason::Drained);
    assert_eq!(report.pages_crawled(), 3);
    assert_eq!(report.failed().count(), 0);

    let docs = report.page(&format!("{}/docs", base)).expect("docs page recorded");
    assert_eq!(docs.status, Some(200));
    assert_eq!(docs.links.len(), 1);
    assert_eq!(docs.links[0].as_str(), format!("{}/docs/intro", base));
    assert!(report.page(&format!("{}/docs/intro", base)).is_some());
}

#[tokio::test]
async fn test_missing_page_recorded_as_failure() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/missing">Missing</a>"#).await;

    let report = crawl(&server, &create_test_config(2, 100)).await;

    assert_eq!(report.pages_crawled(), 2);
    let missing = report
        .page(&format!("{}/missing", server.uri()))
        .expect("missing page recorded");
    assert_eq!(
        missing.error,
        Some(PageError::Fetch(FetchError::HttpStatus(404)))
    );
    assert!(missing.links.is_empty());
}

#[tokio::test]
async fn test_non_html_content_not_parsed() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/doc.pdf">Doc</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/hidden">hidden</a>"#, "application/pdf"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(&server, &create_test_config(2, 100)).await;

    let doc = report
        .page(&format!("{}/doc.pdf", server.uri()))
        .expect("document recorded");
    assert!(matches!(doc.error, Some(PageError::ContentMismatch { .. })));
    assert!(doc.links.is_empty());
}

#[tokio::test]
async fn test_redirect_within_host() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/old">Old</a>"#).await;
    mount_page(&server, "/new", "New content").await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", base).as_str()),
        )
        .mount(&server)
        .await;

    let report = crawl(&server, &create_test_config(1, 100)).await;

    let old = report.page(&format!("{}/old", base)).expect("old page recorded");
    assert!(old.error.is_none());
    assert_eq!(
        old.final_url.as_ref().map(|u| u.to_string()),
        Some(format!("{}/new", base))
    );
    assert!(report.page(&format!("{}/new", base)).is_some());
    assert_eq!(report.pages_crawled(), 3);
}

#[tokio::test]
async fn test_redirect_to_other_host() {
    let server = MockServer::start().await;
    let away = format!("{}/landing", other_host(&server));

    mount_page(&server, "/", r#"<a href="/away">Away</a>"#).await;
    mount_page(&server, "/landing", r#"<a href="/deeper">Deeper</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/away"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", away.as_str()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/deeper"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(&server, &create_test_config(2, 100)).await;

    let page = report
        .page(&format!("{}/away", server.uri()))
        .expect("redirecting page recorded");
    assert!(matches!(
        page.error,
        Some(PageError::OffDomainRedirect { .. })
    ));
    assert_eq!(page.links.len(), 1);
    assert_eq!(page.links[0].as_str(), away);
}

#[tokio::test]
async fn test_max_pages_stops_crawl() {
    let server = MockServer::start().await;

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", &links).await;
    for i in 0..20 {
        mount_page(&server, &format!("/p{}", i), &links).await;
    }

    let report = crawl(&server, &create_test_config(4, 5)).await;

    assert_eq!(report.stop_reason, StopReason::MaxPages);
    assert_eq!(report.pages_crawled(), 5);
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(5));
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/slow">Slow</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("late").set_delay(std::time::Duration::from_secs(3)))
        .mount(&server)
        .await;

    let report = crawl(&server, &create_test_config(2, 100)).await;

    let slow = report
        .page(&format!("{}/slow", server.uri()))
        .expect("slow page recorded");
    assert_eq!(slow.error, Some(PageError::Fetch(FetchError::Timeout)));
    assert_eq!(report.pages_crawled(), 2);
}

#[tokio::test]
async fn test_interrupted_before_start() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let interrupt = CancellationToken::new();
    interrupt.cancel();

    let report = crawl_site(
        &format!("{}/", server.uri()),
        &create_test_config(2, 100),
        interrupt,
    )
    .await
    .expect("crawl should start");

    assert_eq!(report.stop_reason, StopReason::Interrupted);
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_invalid_seed_rejected() {
    let result = crawl_site(
        "ftp://example.com/",
        &create_test_config(2, 100),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(
        result,
        Err(CrawlError::Url(UrlError::InvalidScheme(_)))
    ));
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let result = crawl_site(
        "https://example.com/",
        &create_test_config(0, 100),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(CrawlError::Config(_))));
}
