#![allow(dead_code)]

use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value as JsonValue};

#[derive(Clone)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

impl MockResponse {
    pub fn json(status: StatusCode, body: JsonValue) -> Self {
        Self::raw(status, body.to_string())
    }

    pub fn raw(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::from_millis(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone)]
struct MockState {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<String>>>,
}

async fn scripted_handler(
    State(state): State<MockState>,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state
        .last_query
        .lock()
        .expect("query mutex must not be poisoned") = query;

    let response = {
        let mut queue = state
            .responses
            .lock()
            .expect("response queue mutex must not be poisoned");
        queue.pop_front().unwrap_or_else(|| {
            MockResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "no mock response available"}),
            )
        })
    };

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    (
        response.status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
}

async fn echo_handler(State(state): State<MockState>, Json(body): Json<JsonValue>) -> Json<JsonValue> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(body)
}

pub struct TestServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<String>>>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TestServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_query
            .lock()
            .expect("query mutex must not be poisoned")
            .clone()
    }
}

/// Serves `/scripted` (GET and POST) from the response queue and `/echo` (POST).
pub async fn spawn_server(responses: Vec<MockResponse>) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    serve_scripted(listener, responses)
}

pub async fn spawn_server_on(address: SocketAddr, responses: Vec<MockResponse>) -> TestServer {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .expect("must bind reserved test address");
    serve_scripted(listener, responses)
}

fn serve_scripted(listener: tokio::net::TcpListener, responses: Vec<MockResponse>) -> TestServer {
    let state = MockState {
        responses: Arc::new(Mutex::new(responses.into())),
        hits: Arc::new(AtomicUsize::new(0)),
        last_query: Arc::new(Mutex::new(None)),
    };

    let app = Router::new()
        .route("/scripted", get(scripted_handler).post(scripted_handler))
        .route("/echo", post(echo_handler))
        .with_state(state.clone());

    let address = listener.local_addr().expect("must have local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server must run");
    });

    TestServer {
        base_url: format!("http://{address}"),
        hits: state.hits,
        last_query: state.last_query,
        task,
    }
}

/// Serves an arbitrary router on an ephemeral port.
pub async fn spawn_router(app: Router) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server must run");
    });
    (format!("http://{address}"), task)
}
