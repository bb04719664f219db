use crate::{create_test_config, mount_html, parse_csv, row_for};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use metacrawl::gateway::router;
use metacrawl::MetaCrawl;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_router() -> Router {
    let service = MetaCrawl::new(create_test_config(10)).unwrap();
    router(Arc::new(service))
}

async fn post_task(app: &Router, body: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::post("/tasks/")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    json["taskID"].as_str().unwrap().to_string()
}

async fn get_task(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_submit_poll_download_delete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(b"<head><title>Gateway</title></head>".to_vec())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let app = create_test_router();
    let url = format!("{}/page", server.uri());
    let task_id = post_task(&app, &format!("{}\r\n\r\n", url)).await;

    // still running: 204 with no body
    let response = get_task(&app, &format!("/tasks/{}/", task_id)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());

    let mut completed = None;
    for _ in 0..100 {
        let response = get_task(&app, &format!("/tasks/{}", task_id)).await;
        if response.status() == StatusCode::OK {
            completed = Some(response);
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let response = completed.expect("Task did not complete");

    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/csv"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename={}.csv", task_id).as_str()
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let records = parse_csv(std::str::from_utf8(&bytes).unwrap());
    assert_eq!(records.len(), 2);
    assert_eq!(row_for(&records, &url)[..3], ["200", url.as_str(), "Gateway"]);

    // delete on read, then gone
    let response = get_task(&app, &format!("/tasks/{}/?delete=1", task_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_task(&app, &format!("/tasks/{}/", task_id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_without_delete_keeps_task() {
    let server = MockServer::start().await;
    mount_html(&server, "/", "<head><title>Keep</title></head>").await;

    let app = create_test_router();
    let task_id = post_task(&app, &format!("{}/", server.uri())).await;

    let mut status = StatusCode::NO_CONTENT;
    for _ in 0..100 {
        status = get_task(&app, &format!("/tasks/{}/?delete=0", task_id))
            .await
            .status();
        if status == StatusCode::OK {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(status, StatusCode::OK);

    let response = get_task(&app, &format!("/tasks/{}/", task_id)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_blank_body_rejected() {
    let app = create_test_router();
    let response = app
        .oneshot(Request::post("/tasks/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "bad request");
}
