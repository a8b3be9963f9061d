//! Requests as they appear on the wire

use article_linkcheck::crawler::{build_http_client, follow_redirects, RequestSettings};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn host_of(server: &MockServer) -> String {
    server.uri().trim_start_matches("http://").to_string()
}

fn client() -> reqwest::Client {
    build_http_client(&RequestSettings::new(true), Duration::from_secs(3)).unwrap()
}

#[tokio::test]
async fn test_host_header_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header("host", host_of(&server).as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let followed = follow_redirects(&client(), &format!("{}/page", server.uri()))
        .await
        .unwrap();
    assert_eq!(followed.status_code, 200);
}

#[tokio::test]
async fn test_host_header_recomputed_per_hop() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/start"))
        .and(header("host", host_of(&first).as_str()))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/landing", second.uri()).as_str()),
        )
        .expect(1)
        .mount(&first)
        .await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .and(header("host", host_of(&second).as_str()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&second)
        .await;

    let followed = follow_redirects(&client(), &format!("{}/start", first.uri()))
        .await
        .unwrap();

    assert_eq!(followed.status_code, 200);
    assert_eq!(followed.final_url, format!("{}/landing", second.uri()));
    assert_eq!(followed.redirects.len(), 1);
    assert_eq!(followed.redirects[0].status_code, 302);
}
