//! Gather phase and scanner setup against a mock site

use crate::{index_page, mount_page, mount_status};
use article_linkcheck::crawler::{GatherSettings, Gatherer, Level, Scanner};
use article_linkcheck::ScanError;
use std::time::Duration;
use wiremock::MockServer;

fn settings(server: &MockServer, parent_level: Level) -> GatherSettings {
    let root_page = format!("{}/articles.html", server.uri());
    let domain = server.uri().trim_start_matches("http://").to_string();
    GatherSettings::new(domain, true, root_page, parent_level)
}

fn article_list() -> Level {
    Level::new("ul", "id", "articleList")
}

#[tokio::test]
async fn test_gathers_articles_in_order() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/articles.html",
        index_page(&[("First post", "/posts/one.html"), ("Second post", "/posts/two.html")]),
    )
    .await;

    let gatherer = Gatherer::new(settings(&server, article_list())).await.unwrap();

    assert_eq!(gatherer.number_of_articles(), 2);
    let articles = gatherer.articles();
    assert_eq!(articles[0].text, "First post");
    assert_eq!(articles[0].link, format!("{}/posts/one.html", server.uri()));
    assert_eq!(articles[1].text, "Second post");
}

#[tokio::test]
async fn test_root_page_not_found_is_invalid_target() {
    let server = MockServer::start().await;
    mount_status(&server, "/articles.html", 404).await;

    let result = Gatherer::new(settings(&server, article_list())).await;
    assert!(matches!(result, Err(ScanError::InvalidTarget { .. })));
}

#[tokio::test]
async fn test_unreachable_root_page_is_invalid_target() {
    let mut settings = GatherSettings::new(
        "127.0.0.1:1",
        true,
        "http://127.0.0.1:1/articles.html",
        article_list(),
    );
    settings.verbose = true;

    let result = Gatherer::new(settings).await;
    assert!(matches!(result, Err(ScanError::InvalidTarget { .. })));
}

#[tokio::test]
async fn test_missing_parent_level() {
    let server = MockServer::start().await;
    mount_page(&server, "/articles.html", index_page(&[("One", "/one")])).await;

    let result = Gatherer::new(settings(&server, Level::new("x", "id", "nope"))).await;
    assert!(matches!(result, Err(ScanError::InvalidParentLevel { .. })));
}

#[tokio::test]
async fn test_duplicate_level_rejected() {
    let server = MockServer::start().await;
    mount_page(&server, "/articles.html", index_page(&[])).await;

    let gatherer = Gatherer::new(settings(&server, article_list())).await.unwrap();
    assert_eq!(gatherer.number_of_articles(), 0);

    let mut scanner = Scanner::new(&gatherer, Duration::from_secs(3)).unwrap();
    scanner.add_level(Level::new("article", "class", "single")).unwrap();
    scanner.add_level(Level::new("article", "class", "double")).unwrap();

    let result = scanner.add_level(Level::new("article", "class", "single"));
    assert!(matches!(result, Err(ScanError::DuplicateLevel { .. })));
    assert_eq!(scanner.levels().len(), 2);
}

#[tokio::test]
async fn test_collect_without_levels() {
    let server = MockServer::start().await;
    mount_page(&server, "/articles.html", index_page(&[("One", "/one")])).await;

    let gatherer = Gatherer::new(settings(&server, article_list())).await.unwrap();
    let mut scanner = Scanner::new(&gatherer, Duration::from_secs(3)).unwrap();

    let result = scanner.collect_links().await;
    assert!(matches!(result, Err(ScanError::NoLinksInScanLevel)));
}
