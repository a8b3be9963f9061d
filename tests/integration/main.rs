//! Integration tests for the article link checker
//!
//! These tests use wiremock to serve an index page and its articles, then
//! run the gather and scan phases against them end-to-end.

mod fetch_tests;
mod gather_tests;
mod scan_tests;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mounts an HTML page at `route`
pub async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts a bodyless response with the given status at `route`
pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// An index page listing `(text, href)` articles inside `<ul id="articleList">`
pub fn index_page(articles: &[(&str, &str)]) -> String {
    let items: String = articles
        .iter()
        .map(|(text, href)| format!(r#"<li><a href="{}">{}</a></li>"#, href, text))
        .collect();
    format!(
        r#"<html><body><nav><a href="/">Home</a></nav><ul id="articleList">{}</ul></body></html>"#,
        items
    )
}

/// An article page whose `<article class="single">` holds the given hrefs
pub fn article_page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .enumerate()
        .map(|(i, href)| format!(r#"<p><a href="{}">link {}</a></p>"#, href, i))
        .collect();
    format!(
        r#"<html><body><header><a href="/about">About</a></header><article class="single">{}</article></body></html>"#,
        anchors
    )
}
