//! Extraction and verification against a mock site

use crate::{article_page, index_page, mount_page, mount_status};
use article_linkcheck::config::parse_config;
use article_linkcheck::crawler::{run_scan, GatherSettings, Gatherer, Level, Scanner};
use article_linkcheck::output::format_basic_report;
use article_linkcheck::state::{Outcome, ScanStatus};
use article_linkcheck::storage::{SqliteStorage, Storage};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves an index page with the given articles and returns a ready scanner
async fn scanner_for(
    server: &MockServer,
    articles: &[(&str, &str, Vec<&str>)],
    timeout: Duration,
) -> Scanner {
    let listing: Vec<(&str, &str)> = articles.iter().map(|(text, route, _)| (*text, *route)).collect();
    mount_page(server, "/articles.html", index_page(&listing)).await;
    for (_, route, hrefs) in articles {
        mount_page(server, route, article_page(hrefs)).await;
    }

    let settings = GatherSettings::new(
        server.uri().trim_start_matches("http://"),
        true,
        format!("{}/articles.html", server.uri()),
        Level::new("ul", "id", "articleList"),
    );
    let gatherer = Gatherer::new(settings).await.unwrap();

    let mut scanner = Scanner::new(&gatherer, timeout).unwrap();
    scanner.add_level(Level::new("article", "class", "single")).unwrap();
    scanner
}

#[tokio::test]
async fn test_trimmed_hrefs_collapse_to_one_link() {
    let server = MockServer::start().await;
    mount_status(&server, "/a", 200).await;

    let mut scanner = scanner_for(
        &server,
        &[("Post", "/posts/post.html", vec!["/a?", "/a#", "/a\u{2026}"])],
        Duration::from_secs(3),
    )
    .await;

    let tally = scanner.collect_links().await.unwrap();
    assert_eq!(tally.links_kept, 3);
    assert_eq!(scanner.normalized_links(), &[format!("{}/a", server.uri())]);

    scanner.scan_links().await.unwrap();
    let results = scanner.results();
    assert_eq!(results.len(), 3);
    for result in &results {
        assert_eq!(result.status, ScanStatus::Done);
        assert_eq!(result.outcome, Some(Outcome::Success));
        assert_eq!(result.message, "OK: All Good!");
    }
}

#[tokio::test]
async fn test_redirect_classified_by_first_hop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/final/"))
        .mount(&server)
        .await;
    mount_status(&server, "/final/", 200).await;

    let mut scanner = scanner_for(
        &server,
        &[("Post", "/posts/post.html", vec!["/old"])],
        Duration::from_secs(3),
    )
    .await;
    scanner.collect_links().await.unwrap();
    scanner.scan_links().await.unwrap();

    let old = format!("{}/old", server.uri());
    let final_url = format!("{}/final/", server.uri());
    let results = scanner.results_for(&old);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].outcome, Some(Outcome::Redirect));
    assert_eq!(results[0].status_code, Some(301));
    assert_eq!(results[0].final_url.as_deref(), Some(final_url.as_str()));

    let expected = format!("WRN: Moved permanently to {}", final_url);
    assert_eq!(results[0].message, expected);
    assert_eq!(
        scanner.status_of(&format!("{}/final", server.uri())),
        Some(expected)
    );
}

#[tokio::test]
async fn test_status_codes_classified() {
    let server = MockServer::start().await;
    mount_status(&server, "/gone", 404).await;
    mount_status(&server, "/broken", 500).await;
    mount_status(&server, "/busy", 429).await;

    let mut scanner = scanner_for(
        &server,
        &[("Post", "/posts/post.html", vec!["/gone", "/broken", "/busy"])],
        Duration::from_secs(3),
    )
    .await;
    scanner.collect_links().await.unwrap();
    scanner.scan_links().await.unwrap();

    let gone = &scanner.results_for(&format!("{}/gone", server.uri()))[0];
    assert_eq!(gone.outcome, Some(Outcome::ClientError));
    assert_eq!(gone.message, "ERR: Not Found");

    let broken = &scanner.results_for(&format!("{}/broken", server.uri()))[0];
    assert_eq!(broken.outcome, Some(Outcome::ServerError));

    let busy = &scanner.results_for(&format!("{}/busy", server.uri()))[0];
    assert!(busy.critical);
    assert_eq!(busy.message, "CRIT: Too many requests");

    assert!(scanner.report().has_critical());
}

#[tokio::test]
async fn test_unmapped_status_is_fault_after_all_complete() {
    let server = MockServer::start().await;
    mount_status(&server, "/teapot", 418).await;
    mount_status(&server, "/fine", 200).await;

    let mut scanner = scanner_for(
        &server,
        &[("Post", "/posts/post.html", vec!["/teapot", "/fine"])],
        Duration::from_secs(3),
    )
    .await;
    scanner.collect_links().await.unwrap();

    let result = scanner.scan_links().await;
    assert!(matches!(
        result,
        Err(article_linkcheck::ScanError::UnknownDictEntry(_))
    ));

    let fine = &scanner.results_for(&format!("{}/fine", server.uri()))[0];
    assert_eq!(fine.status, ScanStatus::Done);
    let teapot = &scanner.results_for(&format!("{}/teapot", server.uri()))[0];
    assert_eq!(teapot.status, ScanStatus::Pending);
}

#[tokio::test]
async fn test_slow_link_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let mut scanner = scanner_for(
        &server,
        &[("Post", "/posts/post.html", vec!["/slow"])],
        Duration::from_secs(1),
    )
    .await;
    scanner.collect_links().await.unwrap();
    scanner.scan_links().await.unwrap();

    let results = scanner.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].outcome, Some(Outcome::TransportFailure));
    assert!(
        results[0].message == "ERR: Read timed out" || results[0].message == "ERR: Timed out",
        "unexpected message: {}",
        results[0].message
    );
}

#[tokio::test]
async fn test_connection_refused() {
    let server = MockServer::start().await;

    let mut scanner = scanner_for(
        &server,
        &[("Post", "/posts/post.html", vec!["http://127.0.0.1:1/"])],
        Duration::from_secs(3),
    )
    .await;
    scanner.collect_links().await.unwrap();
    scanner.scan_links().await.unwrap();

    let results = scanner.results_for("http://127.0.0.1:1/");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].outcome, Some(Outcome::TransportFailure));
    assert_eq!(results[0].message, "ERR: Couldn't connect");
}

#[tokio::test]
async fn test_article_without_links() {
    let server = MockServer::start().await;

    let mut scanner = scanner_for(
        &server,
        &[("Empty", "/posts/empty.html", vec![])],
        Duration::from_secs(3),
    )
    .await;

    let tally = scanner.collect_links().await.unwrap();
    assert_eq!(tally.articles_scanned, 1);
    assert_eq!(tally.links_kept, 0);

    scanner.scan_links().await.unwrap();
    assert!(scanner.normalized_links().is_empty());
    assert!(scanner.results().is_empty());
    assert_eq!(scanner.report().articles.len(), 1);
}

#[tokio::test]
async fn test_missing_article_is_skipped() {
    let server = MockServer::start().await;
    mount_status(&server, "/posts/gone.html", 404).await;
    mount_status(&server, "/ok", 200).await;

    mount_page(
        &server,
        "/articles.html",
        index_page(&[("Gone", "/posts/gone.html"), ("Here", "/posts/here.html")]),
    )
    .await;
    mount_page(&server, "/posts/here.html", article_page(&["/ok"])).await;

    let settings = GatherSettings::new(
        server.uri().trim_start_matches("http://"),
        true,
        format!("{}/articles.html", server.uri()),
        Level::new("ul", "id", "articleList"),
    );
    let gatherer = Gatherer::new(settings).await.unwrap();
    let mut scanner = Scanner::new(&gatherer, Duration::from_secs(3)).unwrap();
    scanner.add_level(Level::new("article", "class", "single")).unwrap();

    let tally = scanner.collect_links().await.unwrap();
    assert_eq!(tally.articles_skipped, 1);
    assert_eq!(tally.articles_scanned, 1);
    assert_eq!(scanner.results().len(), 1);
}

#[tokio::test]
async fn test_shared_link_updates_every_article() {
    let server = MockServer::start().await;
    mount_status(&server, "/shared", 404).await;

    let mut scanner = scanner_for(
        &server,
        &[
            ("One", "/posts/one.html", vec!["/shared"]),
            ("Two", "/posts/two.html", vec!["/shared"]),
        ],
        Duration::from_secs(3),
    )
    .await;
    scanner.collect_links().await.unwrap();
    assert_eq!(scanner.normalized_links().len(), 1);

    scanner.scan_links().await.unwrap();

    let results = scanner.results_for(&format!("{}/shared", server.uri()));
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].article_text, "One");
    assert_eq!(results[1].article_text, "Two");
    for result in &results {
        assert_eq!(result.status, ScanStatus::Done);
        assert_eq!(result.message, "ERR: Not Found");
    }

    let report = scanner.report();
    assert_eq!(report.broken_links(), 2);
}

#[tokio::test]
async fn test_run_scan_from_config_and_persist() {
    let server = MockServer::start().await;
    mount_page(&server, "/articles.html", index_page(&[("Post", "/posts/post.html")])).await;
    mount_page(&server, "/posts/post.html", article_page(&["/ok", "/gone"])).await;
    mount_status(&server, "/ok", 200).await;
    mount_status(&server, "/gone", 404).await;

    let config = parse_config(&format!(
        r#"
[target]
domain = "{domain}"
root-page = "{uri}/articles.html"
parent-level = {{ tag = "ul", attribute = "id", value = "articleList" }}

[scan]
timeout-secs = 3

[[scan.levels]]
tag = "article"
attribute = "class"
value = "single"
"#,
        domain = server.uri().trim_start_matches("http://"),
        uri = server.uri()
    ))
    .unwrap();

    let scanner = run_scan(&config).await.unwrap();
    let results = scanner.results();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.status == ScanStatus::Done));

    let dir = tempfile::tempdir().unwrap();
    let mut storage = SqliteStorage::new(&dir.path().join("runs.db")).unwrap();
    let run_id = storage.create_run("hash").unwrap();
    storage.save_results(run_id, &results).unwrap();
    storage.complete_run(run_id).unwrap();

    assert_eq!(storage.load_results(run_id).unwrap(), results);
}

#[tokio::test]
async fn test_entries_sharing_a_page_are_reported_separately() {
    let server = MockServer::start().await;
    mount_status(&server, "/ok", 200).await;

    let mut scanner = scanner_for(
        &server,
        &[
            ("Featured", "/p.html", vec!["/ok", "mailto:a@b.c"]),
            ("Post", "/p.html", vec!["/ok", "mailto:a@b.c"]),
        ],
        Duration::from_secs(3),
    )
    .await;
    scanner.collect_links().await.unwrap();
    scanner.scan_links().await.unwrap();

    let report = scanner.report();
    assert_eq!(report.articles.len(), 2);
    for article in &report.articles {
        assert_eq!(article.links.len(), 2, "links of {}", article.text);
    }
    assert_eq!(report.pending_links(), 0);
    assert_eq!(report.unchecked_links(), 2);

    let text = format_basic_report(&report);
    assert!(!text.contains("(no links)"));
    assert!(text.contains("mailto:a@b.c -> not checked"));
    assert!(!text.contains("PENDING"));
}
