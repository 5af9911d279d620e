//! An axum-based bridge stand-in for integration tests.
//!
//! Runs on its own thread and runtime so blocking, async and concurrent
//! clients can all talk to it.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    thread,
};

use axum::{
    body::Bytes,
    extract::{OriginalUri, State},
    http::{HeaderMap, Method, StatusCode},
    Router,
};
use crossbar_http_rs::{Config, TransportOptions};
use reqwest::Url;
use tokio::net::TcpListener;

/// One request as the stub saw it.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: String,
    /// Path and query, e.g. "/call?timestamp=..."
    pub target: String,
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn path(&self) -> String {
        self.url().path().to_string()
    }

    pub fn query(&self) -> Vec<(String, String)> {
        self.url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub fn param(&self, name: &str) -> Option<String> {
        self.query().into_iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }

    fn url(&self) -> Url {
        Url::parse(&format!("http://stub{}", self.target)).expect("valid request target")
    }
}

type Responder = dyn Fn(&Recorded) -> (u16, String) + Send + Sync;

#[derive(Clone)]
struct StubState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responder: Arc<Responder>,
}

pub struct StubBridge {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubBridge {
    /// Answers every request with the same status and body.
    pub fn fixed(status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::start(move |_| (status, body.clone()))
    }

    /// Answers `/call` and `/publish`; every other path gets a 404.
    pub fn routed(call: &str, publish: &str) -> Self {
        let call = call.to_string();
        let publish = publish.to_string();
        Self::start(move |req| match req.path().as_str() {
            "/call" => (200, call.clone()),
            "/publish" => (200, publish.clone()),
            _ => (404, "<html>not found</html>".to_string()),
        })
    }

    pub fn start(responder: impl Fn(&Recorded) -> (u16, String) + Send + Sync + 'static) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind stub");
        listener.set_nonblocking(true).expect("nonblocking");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            requests: Arc::clone(&requests),
            responder: Arc::new(responder),
        };
        let router = Router::new().fallback(record).with_state(state);

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("stub runtime");
            runtime.block_on(async move {
                let listener = TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, router).await.expect("stub server");
            });
        });

        Self { addr, requests }
    }

    /// Base URL with a trailing slash, e.g. "http://127.0.0.1:4242/".
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<StubState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let request = Recorded {
        method: method.to_string(),
        target: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
        headers: headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect(),
        body: body.to_vec(),
    };
    let (status, text) = (state.responder)(&request);
    state.requests.lock().unwrap().push(request);
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        text,
    )
}

/// A URL nobody listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/", addr)
}

/// Client configuration for `url` that bypasses any system proxy.
pub fn config(url: impl Into<String>) -> Config {
    Config::new(url).transport(TransportOptions {
        no_proxy: true,
        ..Default::default()
    })
}

pub fn kwargs(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    value.as_object().cloned().unwrap_or_default()
}
