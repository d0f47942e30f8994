//! Transform calls against a local axum stand-in for the topic service.

use std::time::Duration;

use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use topic_client::{TopicClient, TopicClientError, OUTLIER_TOPIC};

/// Topic per text: texts mentioning "transit" are topic 8, everything else
/// is an outlier.
async fn classify(Json(body): Json<Value>) -> Json<Value> {
    let topics: Vec<i64> = body["texts"]
        .as_array()
        .map(|texts| {
            texts
                .iter()
                .map(|t| match t.as_str() {
                    Some(text) if text.contains("transit") => 8,
                    _ => OUTLIER_TOPIC,
                })
                .collect()
        })
        .unwrap_or_default();
    Json(json!({ "topics": topics }))
}

async fn spawn_topic_server() -> String {
    let app = Router::new()
        .route("/ok/transform", post(classify))
        .route(
            "/down/transform",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded") }),
        )
        .route("/short/transform", post(|| async { Json(json!({ "topics": [1] })) }))
        .route("/garbled/transform", post(|| async { "not json" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str) -> TopicClient {
    TopicClient::new(base, Duration::from_secs(5)).unwrap()
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn transform_returns_one_topic_per_text_in_order() {
    let base = spawn_topic_server().await;

    let topics = client(&format!("{base}/ok/"))
        .transform(&texts(&["new transit lines", "celebrity gossip", "transit fares rise"]))
        .await
        .unwrap();

    assert_eq!(topics, vec![8, OUTLIER_TOPIC, 8]);
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let base = spawn_topic_server().await;

    let err = client(&format!("{base}/down"))
        .transform(&texts(&["anything at all"]))
        .await
        .unwrap_err();

    match err {
        TopicClientError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "model not loaded");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_topic_count_is_mismatch() {
    let base = spawn_topic_server().await;

    let err = client(&format!("{base}/short"))
        .transform(&texts(&["one", "two", "three"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        TopicClientError::Mismatch {
            expected: 3,
            got: 1
        }
    ));
}

#[tokio::test]
async fn non_json_body_is_parse_error() {
    let base = spawn_topic_server().await;

    let err = client(&format!("{base}/garbled"))
        .transform(&texts(&["one"]))
        .await
        .unwrap_err();

    assert!(matches!(err, TopicClientError::Parse(_)));
}
