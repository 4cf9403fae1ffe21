use hyper::body::Bytes;
use hyper::StatusCode;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::common::{
    ColoringParameters, IdColoring, IdGraph, Method, VertexId, GRAPH_TYPE_ADJACENCY_LIST,
};
use crate::error::{GatewayError, GatewayResult};

const MAX_REPORTED_IDS: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct SolverRequest<'a> {
    pub graph_type: &'static str,
    pub graph: &'a IdGraph,
    pub method: Method,
    pub k: u32,
    pub r: u32,
}

impl<'a> SolverRequest<'a> {
    pub fn new(graph: &'a IdGraph, params: &ColoringParameters) -> Self {
        Self {
            graph_type: GRAPH_TYPE_ADJACENCY_LIST,
            graph,
            method: params.method,
            k: params.k,
            r: params.r,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverResponse {
    #[serde(default)]
    pub coloring: Option<IdColoring>,
}

impl SolverResponse {
    /// Checks the response shape and that every vertex of `graph` received a color.
    pub fn into_coloring(self, graph: &IdGraph) -> GatewayResult<IdColoring> {
        let coloring = self.coloring.ok_or_else(|| {
            GatewayError::ContractViolation("response has no coloring".to_owned())
        })?;
        if coloring.is_empty() {
            let err = "response has an empty coloring".to_owned();
            return Err(GatewayError::ContractViolation(err));
        }
        let missing: Vec<VertexId> = graph
            .keys()
            .filter(|id| !coloring.contains_key(id))
            .copied()
            .collect();
        if !missing.is_empty() {
            let err = format!(
                "coloring misses {} vertices: {}",
                missing.len(),
                missing.iter().take(MAX_REPORTED_IDS).join(", ")
            );
            return Err(GatewayError::ContractViolation(err));
        }
        Ok(coloring)
    }
}

/// A non-200 answer from the solver, forwarded to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverRejection {
    pub status: StatusCode,
    pub body: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverReply {
    Coloring(IdColoring),
    Rejected(SolverRejection),
}

/// Interprets a raw solver answer for the request that was sent for `graph`.
pub fn interpret_response(
    status: StatusCode,
    body: Bytes,
    graph: &IdGraph,
) -> GatewayResult<SolverReply> {
    if status != StatusCode::OK {
        return Ok(SolverReply::Rejected(SolverRejection { status, body }));
    }
    let response: SolverResponse = serde_json::from_slice(&body).map_err(|e| {
        let err = format!("cannot parse solver response: {e}");
        GatewayError::ContractViolation(err)
    })?;
    response.into_coloring(graph).map(SolverReply::Coloring)
}

#[cfg(test)]
mod tests {
    use maplit::btreemap;

    use super::*;

    fn path_graph() -> IdGraph {
        btreemap! { 0 => vec![1], 1 => vec![0, 2], 2 => vec![1] }
    }

    fn interpret(status: StatusCode, body: &'static str) -> GatewayResult<SolverReply> {
        interpret_response(status, Bytes::from_static(body.as_bytes()), &path_graph())
    }

    #[test]
    fn test_request_payload() {
        let graph = btreemap! { 0 => vec![1], 1 => vec![0] };
        let params = ColoringParameters::new(Method::Acr, 2, 1);
        let payload = serde_json::to_value(SolverRequest::new(&graph, &params)).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({
                "graph_type": "adjacency_list",
                "graph": { "0": [1], "1": [0] },
                "method": "ACR",
                "k": 2,
                "r": 1
            })
        );
    }

    #[test]
    fn test_accepts_complete_coloring() {
        let reply = interpret(StatusCode::OK, r#"{"coloring": {"0": 0, "1": 1, "2": 0}}"#);
        assert_eq!(
            reply.unwrap(),
            SolverReply::Coloring(btreemap! { 0 => 0, 1 => 1, 2 => 0 })
        );
    }

    #[test]
    fn test_passes_rejection_through() {
        let body = r#"{"detail": "k too small"}"#;
        let reply = interpret(StatusCode::UNPROCESSABLE_ENTITY, body).unwrap();
        let SolverReply::Rejected(rejection) = reply else {
            panic!("expected a rejection");
        };
        assert_eq!(rejection.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(rejection.body, Bytes::from_static(body.as_bytes()));
    }

    #[test]
    fn test_contract_violations() {
        let bodies = [
            r#"{"result": {"0": 0}}"#,
            r#"{"coloring": null}"#,
            r#"{"coloring": {}}"#,
            r#"{"coloring": {"a": 0, "1": 1, "2": 0}}"#,
            r#"{"coloring": {"0": -1, "1": 1, "2": 0}}"#,
            r#"{"coloring": {"0": 0, "2": 0}}"#,
            "not json",
        ];
        for body in bodies {
            let err = interpret(StatusCode::OK, body).unwrap_err();
            assert!(
                matches!(err, GatewayError::ContractViolation(_)),
                "{body}: {err}"
            );
        }
    }

    #[test]
    fn test_reports_missing_ids() {
        let err = interpret(StatusCode::OK, r#"{"coloring": {"0": 0}}"#).unwrap_err();
        assert!(err.to_string().contains("misses 2 vertices: 1, 2"));
    }
}
