//! Redirect resolution against a local axum server. No external network.

use std::time::Duration;

use axum::{response::Redirect, routing::get, Router};
use unshorten_client::UnshortenClient;

async fn spawn_redirect_server() -> String {
    let app = Router::new()
        .route("/short", get(|| async { Redirect::permanent("/hop") }))
        .route("/hop", get(|| async { Redirect::temporary("/article") }))
        .route("/article", get(|| async { "ok" }))
        .route("/loop", get(|| async { Redirect::temporary("/loop") }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client() -> UnshortenClient {
    UnshortenClient::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn resolve_follows_redirect_chain() {
    let base = spawn_redirect_server().await;

    let resolved = client().resolve(&format!("{base}/short")).await.unwrap();

    assert_eq!(resolved, format!("{base}/article"));
}

#[tokio::test]
async fn resolve_returns_url_unchanged_when_not_redirected() {
    let base = spawn_redirect_server().await;

    let resolved = client().resolve(&format!("{base}/article")).await.unwrap();

    assert_eq!(resolved, format!("{base}/article"));
}

#[tokio::test]
async fn resolve_all_keeps_order_and_falls_back_to_original() {
    let base = spawn_redirect_server().await;
    let urls = vec![
        format!("{base}/short"),
        "not a url".to_string(),
        "http://127.0.0.1:1/closed".to_string(),
        format!("{base}/loop"),
        format!("{base}/article"),
    ];

    let resolved = client().resolve_all(&urls).await;

    assert_eq!(
        resolved,
        vec![
            format!("{base}/article"),
            "not a url".to_string(),
            "http://127.0.0.1:1/closed".to_string(),
            format!("{base}/loop"),
            format!("{base}/article"),
        ]
    );
}

#[tokio::test]
async fn resolve_all_of_nothing_is_empty() {
    assert!(client().resolve_all(&[]).await.is_empty());
}
