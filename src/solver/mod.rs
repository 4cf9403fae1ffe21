mod http;
mod mock;
mod wire;

use async_trait::async_trait;
pub use http::HttpSolver;
pub use mock::MockSolver;
pub use wire::*;

use crate::common::{ColoringParameters, IdGraph};
use crate::error::GatewayResult;

pub const COLOR_GRAPH_PATH: &str = "/color/graph";
pub const API_KEY_HEADER: &str = "x-api-key";

/// A service that colors id-keyed graphs.
///
/// A call either yields a checked coloring, a rejection to forward verbatim, or an error.
/// Implementations never retry.
#[async_trait]
pub trait Solver: Send + Sync {
    async fn color(&self, graph: &IdGraph, params: &ColoringParameters)
        -> GatewayResult<SolverReply>;
}
