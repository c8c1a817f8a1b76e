//! In-process HTTP endpoint that records JSON bodies.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use serde_json::Value;
use tokio::net::TcpListener;

#[derive(Clone)]
struct EndpointState {
    status: StatusCode,
    body: &'static str,
    requests: Arc<Mutex<Vec<Value>>>,
}

pub struct MockEndpoint {
    pub url: String,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockEndpoint {
    /// Bodies received so far, in arrival order.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

/// Serve `POST /hook`, answering every request with `status` and `body`.
pub async fn spawn_endpoint(status: StatusCode, body: &'static str) -> MockEndpoint {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = EndpointState {
        status,
        body,
        requests: requests.clone(),
    };

    let app = Router::new().route("/hook", post(record)).with_state(state);
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind mock endpoint");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock endpoint failed");
    });

    MockEndpoint {
        url: format!("http://{}/hook", addr),
        requests,
    }
}

async fn record(
    State(state): State<EndpointState>,
    Json(body): Json<Value>,
) -> (StatusCode, &'static str) {
    state.requests.lock().unwrap().push(body);
    (state.status, state.body)
}

/// Serve `POST /hook`, answering `200 OK` only after `delay`.
#[allow(dead_code)]
pub async fn spawn_slow_endpoint(delay: Duration) -> String {
    let app = Router::new().route(
        "/hook",
        post(move || async move {
            tokio::time::sleep(delay).await;
            StatusCode::OK
        }),
    );
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind slow endpoint");
    let addr = listener.local_addr().expect("Failed to read local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Slow endpoint failed");
    });

    format!("http://{}/hook", addr)
}

/// One supervisord event frame.
#[allow(dead_code)]
pub fn frame(event: &str, payload: &str) -> String {
    format!(
        "ver:3.0 server:supervisor serial:21 pool:relay poolserial:10 eventname:{event} len:{}\n{payload}",
        payload.len()
    )
}
