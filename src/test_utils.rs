use std::convert::Infallible;
use std::fs::File;
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use serde_json::{json, Map, Value};
use tokio::sync::oneshot;

use crate::common::LabelGraph;
use crate::solver::API_KEY_HEADER;

pub fn load_graph(name: &str) -> LabelGraph {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("resources")
        .join(format!("{name}.json"));
    let file = File::open(path).unwrap();
    serde_json::from_reader(file).unwrap()
}

pub fn label_graph(json: &str) -> LabelGraph {
    serde_json::from_str(json).unwrap()
}

/// An endpoint nothing listens on.
pub fn refused_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Answers a solver request by coloring every vertex with its own id.
pub fn identity_reply(request: &Value) -> (StatusCode, String) {
    let coloring: Map<String, Value> = request["graph"]
        .as_object()
        .unwrap()
        .keys()
        .map(|id| (id.clone(), json!(id.parse::<u64>().unwrap())))
        .collect();
    (StatusCode::OK, json!({ "coloring": coloring }).to_string())
}

#[derive(Debug, Clone)]
pub struct StubRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

type StubHandler = Arc<dyn Fn(&Value) -> (StatusCode, String) + Send + Sync>;

/// A solver listening on a local port that records what it receives.
pub struct StubSolver {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<StubRequest>>>,
    _shutdown: oneshot::Sender<()>,
}

impl StubSolver {
    pub async fn spawn<H>(handler: H) -> Self
    where
        H: Fn(&Value) -> (StatusCode, String) + Send + Sync + 'static,
    {
        Self::spawn_with_delay(Duration::ZERO, handler).await
    }

    pub async fn spawn_with_delay<H>(delay: Duration, handler: H) -> Self
    where
        H: Fn(&Value) -> (StatusCode, String) + Send + Sync + 'static,
    {
        let handler: StubHandler = Arc::new(handler);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        let make_service = make_service_fn(move |_conn| {
            let handler = handler.clone();
            let recorded = recorded.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |request: Request<Body>| {
                    let handler = handler.clone();
                    let recorded = recorded.clone();
                    async move {
                        let path = request.uri().path().to_owned();
                        let api_key = request
                            .headers()
                            .get(API_KEY_HEADER)
                            .and_then(|value| value.to_str().ok())
                            .map(str::to_owned);
                        let body = hyper::body::to_bytes(request.into_body()).await?;
                        let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                        let (status, reply) = handler(&body);
                        recorded.lock().unwrap().push(StubRequest {
                            path,
                            api_key,
                            body,
                        });
                        tokio::time::sleep(delay).await;
                        let mut response = Response::new(Body::from(reply));
                        *response.status_mut() = status;
                        Ok::<_, hyper::Error>(response)
                    }
                }))
            }
        });
        let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_service);
        let addr = server.local_addr();
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(server.with_graceful_shutdown(async move {
            rx.await.ok();
        }));
        Self {
            addr,
            requests,
            _shutdown: tx,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().unwrap().clone()
    }
}
