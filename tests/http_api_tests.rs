use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use docqa::connector::http;
use docqa::{Container, ContainerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "docqa-test-boundary";

async fn app() -> axum::Router {
    let container = Container::new(ContainerConfig {
        memory_storage: true,
        mock_embeddings: true,
        mock_llm: true,
        ..ContainerConfig::default()
    })
    .await
    .expect("container");
    http::router(Arc::new(container))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn upload(file_name: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n{c}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = file_name,
        c = content
    );
    Request::builder()
        .method("POST")
        .uri("/documents")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn upload_query_and_delete_roundtrip() {
    let app = app().await;

    let (status, body) = send(
        &app,
        upload("minutes.txt", "The board approved the new budget on Monday."),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["document"]["filename"], "minutes.txt");
    assert_eq!(body["document"]["metadata"]["source"], "upload");
    assert_eq!(body["chunk_count"], 1);
    let id = body["document"]["id"].as_i64().expect("id");

    let (status, body) = send(&app, get("/documents")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = send(&app, get(&format!("/documents/{}/chunks", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body[0]["chunk_text"],
        "The board approved the new budget on Monday."
    );

    let (status, body) = send(
        &app,
        post_json(
            &format!("/documents/{}/query", id),
            json!({ "query": "When was the budget approved?" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["document_id"], id);
    assert!(body["text"]
        .as_str()
        .unwrap_or_default()
        .contains("When was the budget approved?"));

    let (status, body) = send(&app, post_json("/query", json!({ "query": "Anything?" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["document_id"], Value::Null);

    let (status, body) = send(&app, get("/queries?limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["query_text"], "Anything?");

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/documents/{}", id))
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get(&format!("/documents/{}", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn disallowed_extension_is_rejected() {
    let app = app().await;
    let (status, body) = send(&app, upload("script.sh", "echo hi")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("not allowed"));
}

#[tokio::test]
async fn blank_question_is_bad_request() {
    let app = app().await;
    send(&app, upload("notes.txt", "Some notes.")).await;

    let (status, body) = send(&app, post_json("/query", json!({ "query": "  " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
