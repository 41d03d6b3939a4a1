//! Mock Extensions API served by axum on an ephemeral port.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::fixtures::EXTENSION_ID;

#[derive(Debug, Default)]
pub struct Recorded {
    /// `Lambda-Extension-Name` sent on registration.
    pub registered_name: Option<String>,
    /// Body sent on registration.
    pub register_body: Option<Value>,
    /// Whether the watched env file existed when registration arrived.
    pub env_file_at_register: Option<bool>,
    pub next_calls: usize,
}

#[derive(Clone)]
struct MockState {
    events: Arc<Mutex<VecDeque<Value>>>,
    recorded: Arc<Mutex<Recorded>>,
    register_status: StatusCode,
    watch: Option<PathBuf>,
    hold: Option<Arc<Notify>>,
}

/// Handle to a running mock.
pub struct MockRuntimeApi {
    pub addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
    hold: Option<Arc<Notify>>,
}

impl MockRuntimeApi {
    /// Serve `events` in order; an exhausted queue answers 500.
    pub async fn start(events: Vec<Value>) -> Self {
        Self::start_with(events, StatusCode::OK, None).await
    }

    pub async fn start_with(
        events: Vec<Value>,
        register_status: StatusCode,
        watch: Option<PathBuf>,
    ) -> Self {
        Self::spawn(events, register_status, watch, None).await
    }

    /// Like `start`, but every "next event" request waits for `release`.
    pub async fn start_holding(events: Vec<Value>) -> Self {
        Self::spawn(events, StatusCode::OK, None, Some(Arc::new(Notify::new()))).await
    }

    async fn spawn(
        events: Vec<Value>,
        register_status: StatusCode,
        watch: Option<PathBuf>,
        hold: Option<Arc<Notify>>,
    ) -> Self {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = MockState {
            events: Arc::new(Mutex::new(events.into())),
            recorded: recorded.clone(),
            register_status,
            watch,
            hold: hold.clone(),
        };

        let app = Router::new()
            .route("/2020-01-01/extension/register", post(register))
            .route("/2020-01-01/extension/event/next", get(next_event))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock runtime API");
        let addr = listener.local_addr().expect("no local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server failed");
        });

        Self {
            addr,
            recorded,
            hold,
        }
    }

    /// Let one held "next event" request answer.
    pub fn release(&self) {
        if let Some(hold) = &self.hold {
            hold.notify_one();
        }
    }

    /// Wait until `n` "next event" requests have arrived.
    pub async fn wait_for_next_calls(&self, n: usize) {
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(30);
        while self.recorded(|r| r.next_calls) < n {
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for next event request"
            );
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
    }

    /// Address in the `host:port` form the host hands out.
    pub fn host_port(&self) -> String {
        self.addr.to_string()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn recorded<T>(&self, f: impl FnOnce(&Recorded) -> T) -> T {
        f(&self.recorded.lock().unwrap())
    }
}

async fn register(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    {
        let mut rec = state.recorded.lock().unwrap();
        rec.registered_name = headers
            .get("Lambda-Extension-Name")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        rec.register_body = Some(body);
        rec.env_file_at_register = state.watch.as_ref().map(|p| p.exists());
    }

    if !state.register_status.is_success() {
        return (state.register_status, "registration rejected").into_response();
    }

    (
        [("Lambda-Extension-Identifier", EXTENSION_ID)],
        Json(json!({
            "functionName": "orders-api",
            "functionVersion": "$LATEST",
            "handler": "bootstrap"
        })),
    )
        .into_response()
}

async fn next_event(State(state): State<MockState>, headers: HeaderMap) -> Response {
    let id = headers
        .get("Lambda-Extension-Identifier")
        .and_then(|v| v.to_str().ok());
    if id != Some(EXTENSION_ID) {
        return (StatusCode::FORBIDDEN, "unknown extension").into_response();
    }

    state.recorded.lock().unwrap().next_calls += 1;
    if let Some(hold) = &state.hold {
        hold.notified().await;
    }
    let event = state.events.lock().unwrap().pop_front();
    match event {
        Some(event) => Json(event).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "no more events").into_response(),
    }
}

pub fn invoke_json(request_id: &str) -> Value {
    json!({
        "eventType": "INVOKE",
        "deadlineMs": 1700000000000u64,
        "requestId": request_id,
        "invokedFunctionArn": "arn:aws:lambda:us-east-1:123456789012:function:orders-api",
        "tracing": { "type": "X-Amzn-Trace-Id", "value": "Root=1-5759e988-bd862e3fe1be46a994272793" }
    })
}

pub fn shutdown_json() -> Value {
    json!({
        "eventType": "SHUTDOWN",
        "shutdownReason": "spindown",
        "deadlineMs": 1700000002000u64
    })
}
