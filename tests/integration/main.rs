//! Integration tests for Metacrawl
//!
//! These tests use wiremock to stand in for crawled sites and drive the
//! service end-to-end, both directly and through the HTTP gateway.

mod gateway_tests;
mod task_tests;

use metacrawl::config::CrawlerConfig;
use metacrawl::{MetaCrawl, QueryOutcome};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a crawler configuration with a short domain interval
pub fn create_test_config(domain_interval_ms: u64) -> CrawlerConfig {
    CrawlerConfig {
        domain_interval: domain_interval_ms,
        fetch_timeout: 2000,
        ..CrawlerConfig::default()
    }
}

/// Serves `body` as HTML at `route`
pub async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_bytes(body.as_bytes().to_vec()),
        )
        .mount(server)
        .await;
}

/// A URL on localhost that refuses connections
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

/// A URL answered once with a 200 whose body stops short of its
/// `Content-Length`
pub async fn truncated_body_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("Failed to accept");
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        let _ = socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 1000\r\n\r\n<head><title>cut",
            )
            .await;
    });

    format!("http://{}/", addr)
}

/// Polls the service until the task completes and returns its CSV
pub async fn wait_for_csv(service: &MetaCrawl, task_id: &str) -> String {
    for _ in 0..400 {
        if let QueryOutcome::Completed(body) = service.query(task_id, false) {
            return String::from_utf8(body).expect("CSV is not UTF-8");
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("Task {} did not complete in time", task_id);
}

/// Parses rendered CSV into records, header included
pub fn parse_csv(body: &str) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(body.as_bytes())
        .records()
        .map(|record| {
            record
                .expect("Malformed CSV record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}

/// Finds the data row for `url`
pub fn row_for<'a>(records: &'a [Vec<String>], url: &str) -> &'a [String] {
    records
        .iter()
        .skip(1)
        .find(|record| record[1] == url)
        .unwrap_or_else(|| panic!("No row for {}", url))
}
