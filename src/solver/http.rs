use std::time::Duration;

use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{Body, Client, Request, StatusCode, Uri};
use log::{debug, trace, warn};

use super::{
    interpret_response, Solver, SolverReply, SolverRequest, API_KEY_HEADER, COLOR_GRAPH_PATH,
};
use crate::common::{ColoringParameters, IdGraph};
use crate::error::{GatewayError, GatewayResult};

/// Calls a remote solver over HTTP, one request per coloring and no retries.
#[derive(Debug, Clone)]
pub struct HttpSolver {
    client: Client<HttpConnector>,
    url: Uri,
    api_key: HeaderValue,
    timeout: Duration,
}

impl HttpSolver {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> GatewayResult<Self> {
        let url = format!("{}{COLOR_GRAPH_PATH}", endpoint.trim_end_matches('/'));
        let url: Uri = url.parse().map_err(|e| {
            let err = format!("invalid solver endpoint {endpoint:?}: {e}");
            GatewayError::Config(err)
        })?;
        if url.scheme_str() != Some("http") || url.authority().is_none() {
            let err = format!("solver endpoint must be an absolute http:// url, got {endpoint:?}");
            return Err(GatewayError::Config(err));
        }
        let mut api_key = HeaderValue::from_str(api_key).map_err(|e| {
            let err = format!("invalid solver api key: {e}");
            GatewayError::Config(err)
        })?;
        api_key.set_sensitive(true);
        Ok(Self {
            client: Client::new(),
            url,
            api_key,
            timeout,
        })
    }

    pub fn url(&self) -> &Uri {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(&self, payload: Vec<u8>) -> GatewayResult<(StatusCode, Bytes)> {
        let mut request = Request::new(Body::from(payload));
        *request.method_mut() = hyper::Method::POST;
        *request.uri_mut() = self.url.clone();
        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(HeaderName::from_static(API_KEY_HEADER), self.api_key.clone());

        let response = self.client.request(request).await.map_err(|e| {
            let err = format!("cannot reach solver at {}: {e}", self.url);
            GatewayError::Transport(err)
        })?;
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| {
                let err = format!("cannot read solver response: {e}");
                GatewayError::Transport(err)
            })?;
        Ok((status, body))
    }
}

#[async_trait]
impl Solver for HttpSolver {
    async fn color(
        &self,
        graph: &IdGraph,
        params: &ColoringParameters,
    ) -> GatewayResult<SolverReply> {
        let payload = serde_json::to_vec(&SolverRequest::new(graph, params))?;
        trace!("built solver request of {} bytes", payload.len());
        debug!(
            "send {} vertices to {} ({}, k={}, r={})",
            graph.len(),
            self.url,
            params.method,
            params.k,
            params.r
        );
        let (status, body) = tokio::time::timeout(self.timeout, self.send(payload))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??;
        if status == StatusCode::OK {
            debug!("solver answered {status} with {} bytes", body.len());
        } else {
            warn!("solver rejected the request with {status}");
        }
        interpret_response(status, body, graph)
    }
}

#[cfg(test)]
mod tests {
    use maplit::btreemap;

    use super::*;
    use crate::common::Method;
    use crate::solver::SolverRejection;
    use crate::test_utils::{identity_reply, refused_endpoint, StubSolver};

    fn triangle() -> IdGraph {
        btreemap! { 0 => vec![1, 2], 1 => vec![0, 2], 2 => vec![0, 1] }
    }

    fn params() -> ColoringParameters {
        ColoringParameters::new(Method::AcrH, 3, 2)
    }

    #[tokio::test]
    async fn test_color_through_stub() {
        let stub = StubSolver::spawn(identity_reply).await;
        let solver = HttpSolver::new(&stub.endpoint(), "secret", Duration::from_secs(5)).unwrap();
        let reply = solver.color(&triangle(), &params()).await.unwrap();
        assert_eq!(
            reply,
            SolverReply::Coloring(btreemap! { 0 => 0, 1 => 1, 2 => 2 })
        );

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.path, COLOR_GRAPH_PATH);
        assert_eq!(request.api_key.as_deref(), Some("secret"));
        assert_eq!(
            request.body,
            serde_json::json!({
                "graph_type": "adjacency_list",
                "graph": { "0": [1, 2], "1": [0, 2], "2": [0, 1] },
                "method": "ACR_H",
                "k": 3,
                "r": 2
            })
        );
    }

    #[tokio::test]
    async fn test_rejection_is_forwarded() {
        let stub = StubSolver::spawn(|_| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                r#"{"detail":"not colorable"}"#.to_owned(),
            )
        })
        .await;
        let solver = HttpSolver::new(&stub.endpoint(), "", Duration::from_secs(5)).unwrap();
        let reply = solver.color(&triangle(), &params()).await.unwrap();
        assert_eq!(
            reply,
            SolverReply::Rejected(SolverRejection {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                body: Bytes::from_static(br#"{"detail":"not colorable"}"#),
            })
        );
    }

    #[tokio::test]
    async fn test_unreachable_solver() {
        let solver = HttpSolver::new(&refused_endpoint(), "", Duration::from_secs(5)).unwrap();
        let err = solver.color(&triangle(), &params()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)), "{err}");
    }

    #[tokio::test]
    async fn test_slow_solver_times_out() {
        let stub = StubSolver::spawn_with_delay(Duration::from_secs(3), identity_reply).await;
        let solver =
            HttpSolver::new(&stub.endpoint(), "", Duration::from_millis(100)).unwrap();
        let err = solver.color(&triangle(), &params()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(_)), "{err}");
    }

    #[test]
    fn test_invalid_endpoints() {
        for endpoint in ["not a url", "localhost:9000", "https://solver.example"] {
            let err = HttpSolver::new(endpoint, "", Duration::from_secs(1)).unwrap_err();
            assert!(matches!(err, GatewayError::Config(_)), "{endpoint}: {err}");
        }
        let solver = HttpSolver::new("http://solver:9000/", "", Duration::from_secs(1)).unwrap();
        assert_eq!(solver.url().to_string(), "http://solver:9000/color/graph");
        let err = HttpSolver::new("http://solver:9000", "bad\nkey", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }
}
