mod color;
mod relabel;
mod serve;

use std::time::Duration;

use clap::Args;
use coloring_gateway::relabel::DanglingPolicy;
use coloring_gateway::GatewayResult;
use tokio::runtime::{Builder, Runtime};

pub use self::color::*;
pub use self::relabel::*;
pub use self::serve::*;

#[derive(Debug, Args)]
pub struct SolverArgs {
    /// Specify the base url of the coloring solver.
    #[arg(long, env = "COLORING_MICROSERVICE_URL", value_name = "URL")]
    solver_url: String,
    /// Specify the api key sent to the solver.
    #[arg(long, env = "C_MODEL_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,
    /// Specify how long to wait for the solver, in seconds.
    #[arg(long, env = "SOLVER_TIMEOUT_SECS", value_name = "SECS", default_value = "30")]
    solver_timeout: u64,
}

impl SolverArgs {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.solver_timeout)
    }
}

#[derive(Debug, Args)]
pub struct RelabelOptions {
    /// Specify how neighbors that are not vertices of the graph are handled (reject, extend).
    #[arg(long, env = "DANGLING_NEIGHBORS", value_name = "POLICY", default_value = "reject")]
    dangling: DanglingPolicy,
}

fn runtime() -> GatewayResult<Runtime> {
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    Ok(runtime)
}
