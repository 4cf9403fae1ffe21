//! One coloring request end to end: validate, relabel, call the solver, relabel back.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::common::{ColoringParameters, LabelColoring, LabelGraph};
use crate::error::{GatewayError, GatewayResult};
use crate::relabel::{Relabeled, Relabeler};
use crate::solver::{Solver, SolverRejection, SolverReply};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignColoringRequest {
    pub graph: LabelGraph,
    #[serde(flatten)]
    pub params: ColoringParameters,
}

impl AssignColoringRequest {
    pub fn from_json(body: &[u8]) -> GatewayResult<Self> {
        serde_json::from_slice(body).map_err(|e| {
            let err = format!("malformed request: {e}");
            GatewayError::Validation(err)
        })
    }

    pub fn validate(&self) -> GatewayResult<()> {
        if self.graph.is_empty() {
            let err = "graph must contain at least one vertex".to_owned();
            return Err(GatewayError::Validation(err));
        }
        self.params.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignColoringResponse {
    pub coloring: LabelColoring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColoringOutcome {
    Colored(AssignColoringResponse),
    Rejected(SolverRejection),
}

pub async fn assign_coloring<S>(
    solver: &S,
    relabeler: &Relabeler,
    request: &AssignColoringRequest,
) -> GatewayResult<ColoringOutcome>
where
    S: Solver + ?Sized,
{
    request.validate()?;
    let Relabeled { graph, map } = relabeler.forward(&request.graph)?;
    match solver.color(&graph, &request.params).await? {
        SolverReply::Coloring(coloring) => {
            let coloring = map.backward(&coloring)?;
            debug!("colored {} vertices", coloring.len());
            Ok(ColoringOutcome::Colored(AssignColoringResponse { coloring }))
        }
        SolverReply::Rejected(rejection) => Ok(ColoringOutcome::Rejected(rejection)),
    }
}
