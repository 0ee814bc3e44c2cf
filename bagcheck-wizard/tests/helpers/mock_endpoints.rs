//! In-process classification endpoints
//!
//! Each mock is an axum server on an ephemeral localhost port that answers
//! every `POST /predict` with a canned status and body.

use axum::{
    body::Bytes,
    http::{header, StatusCode},
    routing::post,
    Router,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Nothing listens on port 1; connections are refused immediately
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1/predict";

pub struct MockEndpoint {
    pub url: String,
    calls: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MockEndpoint {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Raw multipart body of the most recent request
    pub fn last_body(&self) -> Option<String> {
        self.last_body
            .lock()
            .unwrap()
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

/// Start a mock endpoint replying with `status` and `body` after `delay`
pub async fn spawn_mock_endpoint(
    status: StatusCode,
    body: impl Into<String>,
    delay: Duration,
) -> MockEndpoint {
    let calls = Arc::new(AtomicUsize::new(0));
    let last_body = Arc::new(Mutex::new(None));
    let reply = body.into();

    let app = {
        let calls = calls.clone();
        let last_body = last_body.clone();
        Router::new().route(
            "/predict",
            post(move |request_body: Bytes| {
                let calls = calls.clone();
                let last_body = last_body.clone();
                let reply = reply.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    *last_body.lock().unwrap() = Some(request_body.to_vec());
                    tokio::time::sleep(delay).await;
                    (status, [(header::CONTENT_TYPE, "application/json")], reply)
                }
            }),
        )
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockEndpoint {
        url: format!("http://{}/predict", addr),
        calls,
        last_body,
    }
}
