//! Incremental delivery tests
//!
//! Both the upstream and the relay listen on real sockets so the test
//! observes what a caller sees on the wire. The upstream emits each chunk
//! only after the test has received the previous one through the relay; a
//! relay that buffered the body would stall and hit the timeout.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, Response, StatusCode},
    routing::post,
    Router,
};
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};

use crate::common::{constants, spawn_app, TestApp};

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Items fed to the upstream body by the test
type FeedItem = Result<Bytes, std::io::Error>;
type Feed = Arc<Mutex<Option<mpsc::Receiver<FeedItem>>>>;

/// Upstream handler streaming whatever the test pushes into the feed
async fn sse_upstream(State(feed): State<Feed>) -> Response<Body> {
    let mut rx = feed
        .lock()
        .await
        .take()
        .expect("upstream called more than once");

    let stream = async_stream::stream! {
        while let Some(item) = rx.recv().await {
            yield item;
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(Body::from_stream(stream))
        .unwrap()
}

/// Start a controllable upstream and a relay pointing at it.
///
/// Returns the relay base URL and the sender feeding the upstream body.
async fn start_pair() -> (String, mpsc::Sender<FeedItem>) {
    let (tx, rx) = mpsc::channel(1);
    let feed: Feed = Arc::new(Mutex::new(Some(rx)));
    let upstream = Router::new()
        .route("/chat/completions", post(sse_upstream))
        .with_state(feed);
    let upstream_url = spawn_app(upstream).await;

    let app = TestApp::new();
    app.seed_model(
        constants::TEST_MODEL_ID,
        &upstream_url,
        constants::TEST_API_KEY,
    )
    .await;
    let relay_url = spawn_app(app.router()).await;

    (relay_url, tx)
}

async fn open_stream(relay_url: &str) -> reqwest::Response {
    let response = reqwest::Client::new()
        .post(format!("{}/chat/completions", relay_url))
        .header("content-type", "application/json")
        .body(r#"{"model":"gpt-x","stream":true}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response
}

/// Read from the body until `expected` has arrived in full
async fn read_until<S>(body: &mut S, received: &mut Vec<u8>, expected: &[u8])
where
    S: futures::Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    while !received.ends_with(expected) {
        let chunk = tokio::time::timeout(STEP_TIMEOUT, body.next())
            .await
            .expect("chunk was not relayed while the upstream was still open")
            .expect("stream ended early")
            .expect("stream failed");
        received.extend_from_slice(&chunk);
    }
}

#[tokio::test]
async fn test_chunks_arrive_before_upstream_finishes() {
    let (relay_url, tx) = start_pair().await;

    let response = open_stream(&relay_url).await;
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    let mut body = response.bytes_stream();
    let mut received = Vec::new();

    let events = [
        "data: {\"delta\":\"Hel\"}\n\n",
        "data: {\"delta\":\"lo\"}\n\n",
        "data: [DONE]\n\n",
    ];
    for event in events {
        tx.send(Ok(Bytes::from(event))).await.unwrap();
        read_until(&mut body, &mut received, event.as_bytes()).await;
    }
    drop(tx);

    let rest = tokio::time::timeout(STEP_TIMEOUT, body.next())
        .await
        .expect("stream did not finish after upstream closed");
    assert!(rest.is_none());
    assert_eq!(received, events.concat().into_bytes());
}

#[tokio::test]
async fn test_upstream_failure_truncates_relayed_body() {
    let (relay_url, tx) = start_pair().await;

    let mut body = open_stream(&relay_url).await.bytes_stream();
    let mut received = Vec::new();

    tx.send(Ok(Bytes::from_static(b"data: partial\n\n")))
        .await
        .unwrap();
    read_until(&mut body, &mut received, b"data: partial\n\n").await;

    tx.send(Err(std::io::Error::other("upstream broke")))
        .await
        .unwrap();

    // The caller must see an error, never a clean end of body.
    let mut saw_error = false;
    while let Some(item) = tokio::time::timeout(STEP_TIMEOUT, body.next())
        .await
        .expect("relay did not end the body after the upstream failed")
    {
        if item.is_err() {
            saw_error = true;
            break;
        }
    }
    assert!(saw_error, "truncated body looked complete");
}

#[tokio::test]
async fn test_caller_disconnect_releases_upstream() {
    let (relay_url, tx) = start_pair().await;

    let mut body = open_stream(&relay_url).await.bytes_stream();
    let mut received = Vec::new();
    tx.send(Ok(Bytes::from_static(b"data: 1\n\n"))).await.unwrap();
    read_until(&mut body, &mut received, b"data: 1\n\n").await;

    drop(body);

    // Keep producing until the upstream body is dropped, which closes the feed.
    let released = tokio::time::timeout(Duration::from_secs(10), async {
        while !tx.is_closed() {
            let _ = tx.try_send(Ok(Bytes::from_static(b"data: more\n\n")));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(released.is_ok(), "upstream kept streaming after the caller left");
}
