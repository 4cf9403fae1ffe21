use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::StatusCode;

use super::{interpret_response, Solver, SolverReply};
use crate::common::{Color, ColoringParameters, IdColoring, IdGraph};
use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Clone)]
enum MockReply {
    Identity,
    Fixed(StatusCode, String),
    Unreachable,
}

/// In-process solver with canned answers.
///
/// Answers go through the same response checks as [`super::HttpSolver`].
#[derive(Debug)]
pub struct MockSolver {
    reply: MockReply,
    calls: AtomicUsize,
}

impl MockSolver {
    fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    /// Colors every vertex with its own id.
    pub fn identity() -> Self {
        Self::with_reply(MockReply::Identity)
    }

    pub fn fixed<B: Into<String>>(status: StatusCode, body: B) -> Self {
        Self::with_reply(MockReply::Fixed(status, body.into()))
    }

    pub fn unreachable() -> Self {
        Self::with_reply(MockReply::Unreachable)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSolver {
    fn default() -> Self {
        Self::identity()
    }
}

#[async_trait]
impl Solver for MockSolver {
    async fn color(
        &self,
        graph: &IdGraph,
        _params: &ColoringParameters,
    ) -> GatewayResult<SolverReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (status, body) = match &self.reply {
            MockReply::Identity => {
                let coloring: IdColoring = graph.keys().map(|id| (*id, *id as Color)).collect();
                let body = serde_json::json!({ "coloring": coloring });
                (StatusCode::OK, serde_json::to_vec(&body)?)
            }
            MockReply::Fixed(status, body) => (*status, body.clone().into_bytes()),
            MockReply::Unreachable => {
                let err = "mock solver is unreachable".to_owned();
                return Err(GatewayError::Transport(err));
            }
        };
        interpret_response(status, Bytes::from(body), graph)
    }
}
