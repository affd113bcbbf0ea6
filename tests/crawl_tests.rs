//! Integration tests for the gatherer
//!
//! These tests use wiremock to create mock news sites and run the full
//! load → robots → crawl → output cycle end-to-end.

use newsmap_gatherer::config::{load_sites, OutputFormat, RunConfig, UserAgentConfig};
use newsmap_gatherer::crawler::{Coordinator, HttpFetcher, PageFetcher, SiteOutcome, StopReason};
use newsmap_gatherer::Article;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing to `article_dir`
fn create_test_config(article_dir: &Path, concurrent: bool) -> RunConfig {
    let mut config = RunConfig::default();
    config.crawler.max_articles = 10;
    config.crawler.concurrent = concurrent;
    config.crawler.fetch_timeout_secs = 5;
    config.crawler.run_timeout_secs = 30;
    config.user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    };
    config.output.article_dir = article_dir.to_string_lossy().to_string();
    config
}

fn create_fetcher(config: &RunConfig) -> Arc<HttpFetcher> {
    Arc::new(HttpFetcher::new(&config.user_agent, Duration::from_secs(5)).unwrap())
}

/// Writes a site definition for a mock server into the site directory
fn write_site(dir: &Path, name: &str, base_url: &str, max_depth: u32) {
    let json = serde_json::json!({
        "baseUrl": base_url,
        "topicSelectors": ["nav a.topic"],
        "articleSelectors": ["a.story"],
        "articleTitle": "h1",
        "articleTime": "time",
        "articleBody": "div.body p",
        "maxDepth": max_depth
    });
    std::fs::write(dir.join(name), json.to_string()).unwrap();
}

async fn mount_page(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html"))
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, content: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(content))
        .mount(server)
        .await;
}

fn article_html(title: &str, time: &str) -> String {
    format!(
        r#"<html><body><h1>{}</h1><time datetime="{}">published</time>
           <div class="body"><p>First paragraph.</p><p>Second paragraph.</p></div>
           </body></html>"#,
        title, time
    )
}

/// Mounts a small news site: home page, one topic page, three articles, one premium article
async fn mount_news_site(server: &MockServer) {
    mount_robots(server, "User-agent: *\nDisallow: /premium/").await;

    mount_page(
        server,
        "/",
        r#"<html><body>
            <nav><a class="topic" href="/world">World</a></nav>
            <a class="story" href="/news/one">One</a>
            <a class="story" href="/premium/paid">Paid</a>
            <a class="story" href="/news/two#comments">Two</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    mount_page(
        server,
        "/world",
        r#"<html><body>
            <a class="story" href="/news/two">Two again</a>
            <a class="story" href="/news/three">Three</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    mount_page(server, "/news/one", article_html("One", "1763078400")).await;
    mount_page(server, "/news/two", article_html("Two", "14 Nov 2025")).await;
    mount_page(
        server,
        "/news/three",
        article_html("Three", "2025-11-14T09:30:00Z"),
    )
    .await;
    mount_page(server, "/premium/paid", article_html("Paid", "")).await;
}

fn output_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    files
}

fn read_jsonl(path: &Path) -> Vec<Article> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_single_site_jsonl() {
    let server = MockServer::start().await;
    mount_news_site(&server).await;

    let sites_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_site(sites_dir.path(), "site.json", &format!("{}/", server.uri()), 1);

    let config = create_test_config(out_dir.path(), true);
    let fetcher = create_fetcher(&config);

    let sites = load_sites(sites_dir.path(), fetcher.as_ref(), "TestBot")
        .await
        .unwrap();
    assert_eq!(sites.len(), 1);

    let fetcher: Arc<dyn PageFetcher> = fetcher;
    let summary = Coordinator::new(&config, sites, fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();

    let SiteOutcome::Completed(report) = &summary.sites[0].outcome else {
        panic!("site did not complete: {:?}", summary.sites[0]);
    };
    assert_eq!(report.articles_saved, 3);
    assert_eq!(report.urls_disallowed, 1);
    assert_eq!(report.stop_reason, StopReason::FrontierExhausted);

    // A single site never gets a domain suffix
    let files = output_files(out_dir.path());
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("articles_"));
    assert!(name.ends_with("s.jsonl"));

    let articles = read_jsonl(&files[0]);
    let urls: Vec<_> = articles.iter().map(|a| a.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/news/one", server.uri()),
            format!("{}/news/two", server.uri()),
            format!("{}/news/three", server.uri()),
        ]
    );

    assert_eq!(articles[0].title, "One");
    assert_eq!(articles[0].body, "First paragraph. Second paragraph.");
    assert_eq!(articles[0].source, "127.0.0.1");
    assert_eq!(
        articles[0].published_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        "2025-11-14 00:00:00"
    );
    assert_eq!(
        articles[1].published_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        "2025-11-14 00:00:00"
    );
    assert_eq!(
        articles[2].published_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        "2025-11-14 09:30:00"
    );
}

#[tokio::test]
async fn test_budget_limits_saved_articles() {
    let server = MockServer::start().await;
    mount_news_site(&server).await;

    let sites_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_site(sites_dir.path(), "site.json", &format!("{}/", server.uri()), 1);

    let mut config = create_test_config(out_dir.path(), false);
    config.crawler.max_articles = 2;
    let fetcher = create_fetcher(&config);

    let sites = load_sites(sites_dir.path(), fetcher.as_ref(), "TestBot")
        .await
        .unwrap();
    let fetcher: Arc<dyn PageFetcher> = fetcher;
    let summary = Coordinator::new(&config, sites, fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.total_articles(), 2);
    let files = output_files(out_dir.path());
    assert_eq!(read_jsonl(&files[0]).len(), 2);

    // The budget ran out on the home page, so the topic page was never requested
    let requests = server.received_requests().await.unwrap();
    assert!(!requests.iter().any(|r| r.url.path() == "/world"));
    assert!(!requests.iter().any(|r| r.url.path() == "/premium/paid"));
}

#[tokio::test]
async fn test_json_format_writes_one_file_per_article() {
    let server = MockServer::start().await;
    mount_news_site(&server).await;

    let sites_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_site(sites_dir.path(), "site.json", &format!("{}/", server.uri()), 0);

    let mut config = create_test_config(out_dir.path(), false);
    config.output.format = OutputFormat::Json;
    let fetcher = create_fetcher(&config);

    let sites = load_sites(sites_dir.path(), fetcher.as_ref(), "TestBot")
        .await
        .unwrap();
    let fetcher: Arc<dyn PageFetcher> = fetcher;
    Coordinator::new(&config, sites, fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();

    // Depth 0: only the home page's two allowed articles
    let files = output_files(out_dir.path());
    assert_eq!(files.len(), 2);
    for file in files {
        let content = std::fs::read_to_string(&file).unwrap();
        let article: Article = serde_json::from_str(&content).unwrap();
        assert_eq!(
            file.file_name().unwrap().to_string_lossy(),
            format!("{}.json", article.id)
        );
    }
}

#[tokio::test]
async fn test_concurrent_sites_get_separate_batch_files() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_news_site(&first).await;
    mount_news_site(&second).await;

    let sites_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_site(sites_dir.path(), "a.json", &format!("{}/", first.uri()), 1);
    write_site(sites_dir.path(), "b.json", &format!("{}/", second.uri()), 1);

    let config = create_test_config(out_dir.path(), true);
    let fetcher = create_fetcher(&config);

    let sites = load_sites(sites_dir.path(), fetcher.as_ref(), "TestBot")
        .await
        .unwrap();
    assert_eq!(sites.len(), 2);

    let fetcher: Arc<dyn PageFetcher> = fetcher;
    let summary = Coordinator::new(&config, sites, fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(summary.completed(), 2);
    assert_eq!(summary.total_articles(), 6);

    let files = output_files(out_dir.path());
    assert_eq!(files.len(), 2);
    for (server, file) in [(&first, &files), (&second, &files)] {
        let port = url::Url::parse(&server.uri()).unwrap().port().unwrap();
        let suffix = format!("_127.0.0.1_{}.jsonl", port);
        let matching: Vec<_> = file
            .iter()
            .filter(|p| p.to_string_lossy().ends_with(&suffix))
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(read_jsonl(matching[0]).len(), 3);
    }
}

#[tokio::test]
async fn test_site_without_robots_is_dropped() {
    let healthy = MockServer::start().await;
    mount_news_site(&healthy).await;

    // No robots.txt mounted: wiremock answers 404
    let broken = MockServer::start().await;
    mount_page(&broken, "/", "<html></html>".to_string()).await;

    let sites_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_site(sites_dir.path(), "a.json", &format!("{}/", healthy.uri()), 0);
    write_site(sites_dir.path(), "b.json", &format!("{}/", broken.uri()), 0);

    let config = create_test_config(out_dir.path(), true);
    let fetcher = create_fetcher(&config);

    let sites = load_sites(sites_dir.path(), fetcher.as_ref(), "TestBot")
        .await
        .unwrap();

    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].base_url.as_str(), format!("{}/", healthy.uri()));
}

#[tokio::test]
async fn test_redirected_home_page_resolves_links_from_final_url() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nAllow: /").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/edition/uk/"),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/edition/uk/",
        r#"<a class="story" href="story">Story</a>"#.to_string(),
    )
    .await;
    mount_page(
        &server,
        "/edition/uk/story",
        article_html("Moved", "1763078400000"),
    )
    .await;

    let sites_dir = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    write_site(sites_dir.path(), "site.json", &format!("{}/", server.uri()), 0);

    let config = create_test_config(out_dir.path(), false);
    let fetcher = create_fetcher(&config);
    let sites = load_sites(sites_dir.path(), fetcher.as_ref(), "TestBot")
        .await
        .unwrap();
    let fetcher: Arc<dyn PageFetcher> = fetcher;
    Coordinator::new(&config, sites, fetcher)
        .unwrap()
        .run()
        .await
        .unwrap();

    let files = output_files(out_dir.path());
    let articles = read_jsonl(&files[0]);
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].url, format!("{}/edition/uk/story", server.uri()));
    assert_eq!(articles[0].title, "Moved");
}
