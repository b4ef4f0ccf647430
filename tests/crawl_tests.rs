//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from seed URL to the four CSV files.

use link_sweeper::config::{
    ClassifierConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig,
};
use link_sweeper::crawler::{crawl, Engine, EngineSettings, HttpTransport};
use link_sweeper::output::{MemorySink, Outcome, Status};
use link_sweeper::url::{Classifier, Normalizer};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given target host and seeds
fn create_test_config(target_host: &str, seeds: Vec<String>, output_dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            target_host: target_host.to_string(),
            seeds,
            get_timeout_ms: 2000,
            head_timeout_ms: 1000,
            max_concurrent_requests: 1,
            keep_query: false,
        },
        classifier: ClassifierConfig::default(),
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            directory: output_dir.to_path_buf(),
            ..OutputConfig::default()
        },
    }
}

/// Extracts the host from a mock server URI (e.g. "127.0.0.1")
fn host_of(base_url: &str) -> String {
    url::Url::parse(base_url)
        .expect("Failed to parse base URL")
        .host_str()
        .expect("Failed to extract host")
        .to_string()
}

/// The same server addressed through a different host name, so it counts as external
fn foreign_base(server: &MockServer) -> String {
    format!("http://localhost:{}", server.address().port())
}

fn read_rows(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("Failed to read output file")
        .lines()
        .map(|line| line.to_string())
        .collect()
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_full_crawl_writes_four_streams() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let external = foreign_base(&mock_server);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&format!(
            r#"<a href="/about">About</a>
               <a href="gallery/">Gallery</a>
               <a href="mailto:staff@fnal.gov">Mail us</a>
               <a href="/old">Old page</a>
               <a href="{}/partner">Partner</a>
               <a href="/missing">Missing</a>"#,
            external
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html_page(r#"<a href="/">Home</a><a href="/about#team">Team</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gallery/"))
        .respond_with(html_page(r#"<a href="photo.jpg">Photo</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/gallery/photo.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    // Images are probed, never fetched
    Mock::given(method("GET"))
        .and(path("/gallery/photo.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", "/new")
                .set_body_string(r#"<a href="/hidden">Hidden</a>"#),
        )
        .mount(&mock_server)
        .await;

    // Redirect targets are not followed and redirect bodies are not parsed
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html_page(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html_page(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/partner"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/partner"))
        .respond_with(html_page(r#"<a href="/partner/deeper">Deeper</a>"#))
        .expect(0)
        .mount(&mock_server)
        .await;

    // "/missing" is unmatched, so wiremock answers 404

    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(
        &host_of(&base_url),
        vec![base_url.clone()],
        output_dir.path(),
    );
    let output = config.output.clone();

    let stats = crawl(config).await.expect("Crawl failed");

    let home = format!("{}/", base_url);

    let visited = read_rows(&output.visited_path());
    assert_eq!(visited[0], "url");
    assert_eq!(visited[1], home);
    for expected in [
        home.clone(),
        format!("{}/about", base_url),
        format!("{}/gallery/", base_url),
        "mailto:staff@fnal.gov".to_string(),
        format!("{}/old", base_url),
        format!("{}/partner", external),
        format!("{}/missing", base_url),
        format!("{}/gallery/photo.jpg", base_url),
    ] {
        assert_eq!(
            visited.iter().filter(|row| **row == expected).count(),
            1,
            "expected {} exactly once in visited",
            expected
        );
    }
    assert_eq!(visited.len(), 9);

    assert_eq!(
        read_rows(&output.unhandled_path()),
        vec![
            "page,url".to_string(),
            format!("{},mailto:staff@fnal.gov", home),
        ]
    );

    assert_eq!(
        read_rows(&output.redirects_path()),
        vec![
            "host_page,redirected_url,status".to_string(),
            format!("{},{}/old,301", home, base_url),
        ]
    );

    assert_eq!(
        read_rows(&output.results_path()),
        vec![
            "host_page,broken_url,status".to_string(),
            format!("{},{}/missing,404", home, base_url),
        ]
    );

    assert_eq!(stats.visited, 8);
    assert_eq!(stats.pages_expanded, 3);
    assert_eq!(stats.probes, 2);
    assert_eq!(stats.broken, 1);
    assert_eq!(stats.redirects, 1);
    assert_eq!(stats.unhandled, 1);
}

#[tokio::test]
async fn test_external_head_timeout_recorded_as_999() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let external = foreign_base(&mock_server);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&format!(
            r#"<a href="{}/slow">Slow partner</a>"#,
            external
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(
        &host_of(&base_url),
        vec![format!("{}/", base_url)],
        output_dir.path(),
    );
    config.crawler.head_timeout_ms = 200;
    let output = config.output.clone();

    let stats = crawl(config).await.expect("Crawl failed");

    assert_eq!(
        read_rows(&output.results_path()),
        vec![
            "host_page,broken_url,status".to_string(),
            format!("{}/,{}/slow,999", base_url, external),
        ]
    );
    assert_eq!(stats.transport_failures, 1);
}

#[tokio::test]
async fn test_traversable_get_timeout_recorded_as_999() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/sluggish">Sluggish</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sluggish"))
        .respond_with(html_page("").set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(
        &host_of(&base_url),
        vec![format!("{}/", base_url)],
        output_dir.path(),
    );
    config.crawler.get_timeout_ms = 300;
    let output = config.output.clone();

    crawl(config).await.expect("Crawl failed");

    let results = read_rows(&output.results_path());
    assert_eq!(results.len(), 2);
    assert_eq!(results[1], format!("{}/,{}/sluggish,999", base_url, base_url));
}

#[tokio::test]
async fn test_unreachable_seed_does_not_abort() {
    // Bind and drop a server so its port is closed
    let closed = MockServer::start().await;
    let base_url = closed.uri();
    drop(closed);

    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(
        &host_of(&base_url),
        vec![format!("{}/", base_url)],
        output_dir.path(),
    );
    let output = config.output.clone();

    let stats = crawl(config).await.expect("Crawl should complete");

    assert_eq!(stats.visited, 1);
    assert_eq!(
        read_rows(&output.results_path())[1],
        format!("{}/,{}/,999", base_url, base_url)
    );
}

#[tokio::test]
async fn test_engine_with_memory_sink_is_idempotent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/gone">Gone</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&mock_server)
        .await;

    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    };
    let transport = HttpTransport::from_config(&user_agent).expect("Failed to build client");
    let mut engine = Engine::new(
        transport,
        MemorySink::new(),
        Classifier::new(&host_of(&base_url)),
        Normalizer::default(),
        EngineSettings::default(),
    );

    let home = format!("{}/", base_url);
    engine.process(&home, &home).await.expect("Crawl failed");
    engine.process(&home, &home).await.expect("Crawl failed");
    engine
        .process(&home, &format!("{}/gone", base_url))
        .await
        .expect("Crawl failed");

    let (sink, _) = engine.finish().expect("Failed to flush");
    assert_eq!(sink.visited, vec![home.clone(), format!("{}/gone", base_url)]);
    assert_eq!(
        sink.broken,
        vec![Outcome::new(
            &home,
            &format!("{}/gone", base_url),
            Status::Code(410)
        )]
    );
}

#[tokio::test]
async fn test_concurrent_crawl_visits_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let links: String = (0..20)
        .map(|i| format!(r#"<a href="/p{}">P{}</a>"#, i, i))
        .collect();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&links))
        .expect(1)
        .mount(&mock_server)
        .await;

    for i in 0..20 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html_page(&links))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let output_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config(
        &host_of(&base_url),
        vec![format!("{}/", base_url)],
        output_dir.path(),
    );
    config.crawler.max_concurrent_requests = 8;
    let output = config.output.clone();

    let stats = crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.visited, 21);
    assert_eq!(stats.pages_expanded, 21);
    assert_eq!(read_rows(&output.visited_path()).len(), 22);
    assert_eq!(read_rows(&output.results_path()).len(), 1);
}
