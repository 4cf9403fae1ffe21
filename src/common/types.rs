use std::collections::BTreeMap;

pub type VertexLabel = String;
pub type VertexId = u32;
pub type Color = u32;

/// Caller-facing adjacency list keyed by vertex label.
///
/// Held in an ordered map so that labels are numbered in lexicographic order.
pub type LabelGraph = BTreeMap<VertexLabel, Vec<VertexLabel>>;
/// Solver-facing adjacency list keyed by dense vertex id.
pub type IdGraph = BTreeMap<VertexId, Vec<VertexId>>;
pub type IdColoring = BTreeMap<VertexId, Color>;
pub type LabelColoring = BTreeMap<VertexLabel, Color>;

pub const GRAPH_TYPE_ADJACENCY_LIST: &str = "adjacency_list";
