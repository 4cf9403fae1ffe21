//! HTTP surface of the gateway.

mod limit;
mod response;

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hyper::body::HttpBody;
use hyper::header::{ACCESS_CONTROL_REQUEST_HEADERS, CONTENT_LENGTH};
use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use log::{error, info, warn};
use serde_json::json;
use tokio::sync::oneshot;

use self::limit::ClientLimiter;
use self::response::{
    allow_any_origin, error_response, json_response, preflight_response, raw_json_response,
};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::pipeline::{assign_coloring, AssignColoringRequest, ColoringOutcome};
use crate::relabel::Relabeler;
use crate::solver::Solver;

pub const API_PREFIX: &str = "/api/v1";
pub const HEALTH_PATH: &str = "/health";
pub const COLORING_PATH: &str = "/coloring/linear-program";

/// Everything a request handler needs, built once at startup and shared by all requests.
pub struct AppState {
    app_name: String,
    relabeler: Relabeler,
    max_body_bytes: usize,
    limiter: Option<ClientLimiter>,
    solver: Box<dyn Solver>,
}

impl AppState {
    pub fn new(config: &GatewayConfig, solver: Box<dyn Solver>) -> Self {
        Self {
            app_name: config.app_name.clone(),
            relabeler: config.relabeler(),
            max_body_bytes: config.max_body_bytes,
            limiter: config.rate_limit.map(ClientLimiter::new),
            solver,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Health,
    Info,
    Coloring,
}

impl Route {
    fn resolve(path: &str) -> Option<(Route, Method)> {
        let unprefixed = path.strip_prefix(API_PREFIX);
        match path {
            HEALTH_PATH => Some((Route::Health, Method::GET)),
            API_PREFIX => Some((Route::Info, Method::GET)),
            COLORING_PATH => Some((Route::Coloring, Method::POST)),
            _ if unprefixed == Some(COLORING_PATH) => Some((Route::Coloring, Method::POST)),
            _ => None,
        }
    }
}

/// Binds the gateway to `addr` and returns the bound address with the future that serves it.
///
/// The server stops accepting connections once `shutdown` resolves. Requests still in
/// flight get `grace` to finish before they are dropped.
pub fn bind<F>(
    addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: F,
    grace: Duration,
) -> GatewayResult<(SocketAddr, impl Future<Output = GatewayResult<()>>)>
where
    F: Future<Output = ()> + Send + 'static,
{
    let make_service = make_service_fn(move |conn: &AddrStream| {
        let state = state.clone();
        let peer = conn.remote_addr();
        async move {
            Ok::<_, Infallible>(service_fn(move |request| {
                handle(state.clone(), peer, request)
            }))
        }
    });
    let server = Server::try_bind(&addr)?.serve(make_service);
    let local_addr = server.local_addr();
    let (draining_tx, draining_rx) = oneshot::channel::<()>();
    let running = server.with_graceful_shutdown(async move {
        shutdown.await;
        draining_tx.send(()).ok();
    });
    Ok((local_addr, async move {
        tokio::pin!(running);
        tokio::select! {
            result = &mut running => return Ok(result?),
            _ = draining_rx => {}
        }
        match tokio::time::timeout(grace, running).await {
            Ok(result) => result?,
            Err(_) => warn!("dropping requests still in flight after {grace:?}"),
        }
        Ok(())
    }))
}

/// Resolves on ctrl-c or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("cannot listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutting down server");
}

async fn handle(
    state: Arc<AppState>,
    peer: SocketAddr,
    request: Request<Body>,
) -> Result<Response<Body>, Infallible> {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let mut response = route(&state, peer, request)
        .await
        .unwrap_or_else(|e| error_response(&e));
    allow_any_origin(&mut response);
    info!(
        "{peer} {method} {path} {} {:.3} ms",
        response.status().as_u16(),
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(response)
}

async fn route(
    state: &AppState,
    peer: SocketAddr,
    request: Request<Body>,
) -> GatewayResult<Response<Body>> {
    let path = request.uri().path();
    let (route, allowed) = Route::resolve(path).ok_or_else(|| {
        let err = format!("no route for {path}");
        GatewayError::NotFound(err)
    })?;
    if *request.method() == Method::OPTIONS {
        let requested = request.headers().get(ACCESS_CONTROL_REQUEST_HEADERS);
        return Ok(preflight_response(requested));
    }
    if *request.method() != allowed {
        let err = format!("{} {path} (expected {allowed})", request.method());
        return Err(GatewayError::MethodNotAllowed(err));
    }
    match route {
        Route::Health => json_response(StatusCode::OK, &json!({ "status": "OK" })),
        Route::Info => json_response(
            StatusCode::OK,
            &json!({
                "name": state.app_name,
                "version": env!("CARGO_PKG_VERSION"),
            }),
        ),
        Route::Coloring => {
            if let Some(limiter) = &state.limiter {
                limiter.check(limiter.client(peer, request.headers()))?;
            }
            assign(state, request).await
        }
    }
}

async fn assign(state: &AppState, request: Request<Body>) -> GatewayResult<Response<Body>> {
    let body = read_body(request, state.max_body_bytes).await?;
    let request = AssignColoringRequest::from_json(&body)?;
    match assign_coloring(state.solver.as_ref(), &state.relabeler, &request).await? {
        ColoringOutcome::Colored(response) => json_response(StatusCode::OK, &response),
        ColoringOutcome::Rejected(rejection) => {
            Ok(raw_json_response(rejection.status, rejection.body))
        }
    }
}

async fn read_body(request: Request<Body>, limit: usize) -> GatewayResult<Vec<u8>> {
    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(GatewayError::PayloadTooLarge(limit));
    }
    let mut body = request.into_body();
    let mut buf = Vec::with_capacity(declared.unwrap_or_default());
    while let Some(chunk) = body.data().await {
        let chunk = chunk.map_err(|e| {
            let err = format!("cannot read request body: {e}");
            GatewayError::Validation(err)
        })?;
        if buf.len() + chunk.len() > limit {
            return Err(GatewayError::PayloadTooLarge(limit));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}
