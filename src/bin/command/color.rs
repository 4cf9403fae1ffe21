use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Args;
use coloring_gateway::pipeline::{assign_coloring, AssignColoringRequest, ColoringOutcome};
use coloring_gateway::relabel::Relabeler;
use coloring_gateway::solver::HttpSolver;
use coloring_gateway::GatewayResult;

use super::{runtime, RelabelOptions, SolverArgs};

#[derive(Debug, Args)]
pub struct ColorArgs {
    /// Specify the request file, shaped like the body of the coloring endpoint.
    #[arg(value_name = "REQUEST_JSON")]
    request: PathBuf,
    #[command(flatten)]
    solver: SolverArgs,
    #[command(flatten)]
    options: RelabelOptions,
}

pub fn color(args: ColorArgs) -> GatewayResult<ExitCode> {
    let body = fs::read(&args.request)?;
    let request = AssignColoringRequest::from_json(&body)?;
    let solver = HttpSolver::new(
        &args.solver.solver_url,
        &args.solver.api_key,
        args.solver.timeout(),
    )?;
    let relabeler = Relabeler::new(args.options.dangling);
    let start = Instant::now();
    let outcome = runtime()?.block_on(assign_coloring(&solver, &relabeler, &request))?;
    let time = start.elapsed().as_secs_f64();
    eprintln!("coloring time: {time} s");
    match outcome {
        ColoringOutcome::Colored(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(ExitCode::SUCCESS)
        }
        ColoringOutcome::Rejected(rejection) => {
            eprintln!("solver rejected the request with {}", rejection.status);
            println!("{}", String::from_utf8_lossy(&rejection.body));
            Ok(ExitCode::FAILURE)
        }
    }
}
