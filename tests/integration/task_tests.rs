use crate::{
    create_test_config, mount_html, parse_csv, refused_url, row_for, truncated_body_url,
    wait_for_csv,
};
use metacrawl::{MetaCrawl, QueryOutcome, TaskStatus};
use std::time::{Duration, Instant};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_mixed_batch_one_row_per_url() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><head><title>Home</title>
        <meta name="description" content="The home page">
        <meta name="keywords" content="home, test">
        <meta property="og:image" content="https://example.com/og.png">
        </head><body></body></html>"#,
    )
    .await;

    let page = format!("{}/", server.uri());
    let refused = refused_url();
    let service = MetaCrawl::new(create_test_config(10)).unwrap();
    let task_id = service
        .submit(&format!("{}\nnot a url\n{}\n", page, refused))
        .unwrap();

    let records = parse_csv(&wait_for_csv(&service, &task_id).await);
    assert_eq!(
        records[0],
        vec![
            "HTTP Status Code",
            "URL",
            "Page Title",
            "Meta Description",
            "Meta Keywords",
            "Og:image"
        ]
    );
    assert_eq!(records.len(), 4);

    assert_eq!(
        row_for(&records, &page),
        [
            "200",
            page.as_str(),
            "Home",
            "The home page",
            "home, test",
            "https://example.com/og.png"
        ]
    );
    assert_eq!(row_for(&records, "not a url"), ["-1", "not a url", "", "", "", ""]);
    assert_eq!(row_for(&records, &refused), ["0", refused.as_str(), "", "", "", ""]);
}

#[tokio::test]
async fn test_page_without_head() {
    let server = MockServer::start().await;
    mount_html(&server, "/bare", "<p>no head here</p>").await;

    let url = format!("{}/bare", server.uri());
    let service = MetaCrawl::new(create_test_config(10)).unwrap();
    let task_id = service.submit(&url).unwrap();

    let records = parse_csv(&wait_for_csv(&service, &task_id).await);
    assert_eq!(row_for(&records, &url), ["200", url.as_str(), "", "", "", ""]);
}

#[tokio::test]
async fn test_same_domain_requests_are_paced() {
    let server = MockServer::start().await;
    mount_html(&server, "/a", "<head><title>A</title></head>").await;
    mount_html(&server, "/b", "<head><title>B</title></head>").await;
    mount_html(&server, "/c", "<head><title>C</title></head>").await;

    let interval = Duration::from_millis(200);
    let service = MetaCrawl::new(create_test_config(200)).unwrap();
    let base = server.uri();

    let start = Instant::now();
    let task_id = service
        .submit(&format!("{base}/a\n{base}/b\n{base}/c"))
        .unwrap();
    let records = parse_csv(&wait_for_csv(&service, &task_id).await);

    assert!(start.elapsed() >= interval * 2);
    assert_eq!(records.len(), 4);
}

#[tokio::test]
async fn test_tasks_share_domain_pacing() {
    let server = MockServer::start().await;
    mount_html(&server, "/x", "<head><title>X</title></head>").await;

    let interval = Duration::from_millis(300);
    let service = MetaCrawl::new(create_test_config(300)).unwrap();
    let url = format!("{}/x", server.uri());

    let start = Instant::now();
    let first = service.submit(&url).unwrap();
    let second = service.submit(&url).unwrap();
    wait_for_csv(&service, &first).await;
    wait_for_csv(&service, &second).await;

    assert!(start.elapsed() >= interval);
    assert_eq!(service.limiters().len().await, 1);
}

#[tokio::test]
async fn test_status_progression() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(b"<head><title>Slow</title></head>".to_vec())
                .set_delay(Duration::from_millis(600)),
        )
        .mount(&server)
        .await;

    let service = MetaCrawl::new(create_test_config(10)).unwrap();
    let task_id = service.submit(&format!("{}/slow", server.uri())).unwrap();

    tokio::time::sleep(Duration::from_millis(150)).await;
    let task = service.task(&task_id).unwrap();
    assert_eq!(task.status(), TaskStatus::InProgress);
    assert_eq!(service.query(&task_id, true), QueryOutcome::InProgress);
    // a running task is not deleted
    assert!(service.task(&task_id).is_some());

    wait_for_csv(&service, &task_id).await;
    assert_eq!(task.status(), TaskStatus::Completed);

    assert!(matches!(
        service.query(&task_id, true),
        QueryOutcome::Completed(_)
    ));
    assert_eq!(service.query(&task_id, false), QueryOutcome::NotFound);
}

#[tokio::test]
async fn test_unknown_charset_label_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(wiremock::matchers::path("/odd"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=x-made-up")
                .set_body_bytes(b"<head><title>Odd</title></head>".to_vec()),
        )
        .mount(&server)
        .await;

    let odd = format!("{}/odd", server.uri());
    let mut config = create_test_config(10);
    config.drop_undecodable_rows = true;
    let service = MetaCrawl::new(config).unwrap();
    let task_id = service.submit(&odd).unwrap();

    let records = parse_csv(&wait_for_csv(&service, &task_id).await);
    assert_eq!(records.len(), 2);
    assert_eq!(row_for(&records, &odd), ["200", odd.as_str(), "Odd", "", "", ""]);
}

#[tokio::test]
async fn test_undecodable_rows() {
    let server = MockServer::start().await;
    mount_html(&server, "/ok", "<head><title>Ok</title></head>").await;
    let ok = format!("{}/ok", server.uri());

    // recorded with the status and no metadata by default
    let cut = truncated_body_url().await;
    let service = MetaCrawl::new(create_test_config(10)).unwrap();
    let task_id = service.submit(&format!("{}\n{}", cut, ok)).unwrap();
    let records = parse_csv(&wait_for_csv(&service, &task_id).await);
    assert_eq!(records.len(), 3);
    assert_eq!(row_for(&records, &cut), ["200", cut.as_str(), "", "", "", ""]);

    // dropped when configured: 2 URLs, 1 dropped, 1 data row
    let cut = truncated_body_url().await;
    let mut config = create_test_config(10);
    config.drop_undecodable_rows = true;
    let service = MetaCrawl::new(config).unwrap();
    let task_id = service.submit(&format!("{}\n{}", cut, ok)).unwrap();
    let records = parse_csv(&wait_for_csv(&service, &task_id).await);
    assert_eq!(records.len(), 2);
    assert_eq!(row_for(&records, &ok)[2], "Ok");
    assert_eq!(service.task(&task_id).unwrap().row_count(), 1);
}

#[tokio::test]
async fn test_legacy_charset_page() {
    let server = MockServer::start().await;
    let mut body = b"<html><head><meta charset=\"windows-1251\"><title>".to_vec();
    // "Привет" in windows-1251
    body.extend_from_slice(&[0xcf, 0xf0, 0xe8, 0xe2, 0xe5, 0xf2]);
    body.extend_from_slice(b"</title></head></html>");
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(body),
        )
        .mount(&server)
        .await;

    let url = format!("{}/ru", server.uri());
    let service = MetaCrawl::new(create_test_config(10)).unwrap();
    let task_id = service.submit(&url).unwrap();

    let records = parse_csv(&wait_for_csv(&service, &task_id).await);
    assert_eq!(row_for(&records, &url)[2], "Привет");
}
