use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use coloring_gateway::common::LabelGraph;
use coloring_gateway::relabel::{Relabeled, Relabeler};
use coloring_gateway::GatewayResult;
use serde_json::json;

use super::RelabelOptions;

#[derive(Debug, Args)]
pub struct RelabelArgs {
    /// Specify the graph file, a JSON object from vertex label to neighbor labels.
    #[arg(value_name = "GRAPH_JSON")]
    graph: PathBuf,
    #[command(flatten)]
    options: RelabelOptions,
}

pub fn relabel(args: RelabelArgs) -> GatewayResult<ExitCode> {
    let reader = BufReader::new(File::open(&args.graph)?);
    let graph: LabelGraph = serde_json::from_reader(reader)?;
    let Relabeled { graph, map } = Relabeler::new(args.options.dangling).forward(&graph)?;
    let labels: Vec<&str> = map.iter().map(|(_, label)| label).collect();
    let output = json!({ "graph": graph, "labels": labels });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(ExitCode::SUCCESS)
}
