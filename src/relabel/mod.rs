//! Translation between caller vertex labels and the dense ids the solver works with.

use std::fmt;
use std::str::FromStr;

use bimap::BiHashMap;
use itertools::Itertools;
use log::{debug, trace};

use crate::common::{IdColoring, IdGraph, LabelColoring, LabelGraph, VertexId, VertexLabel};
use crate::error::{GatewayError, GatewayResult};

pub type LabelTable = BiHashMap<VertexLabel, VertexId>;

/// How [`Relabeler::forward`] treats a neighbor label that is not itself a vertex of the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DanglingPolicy {
    /// Reject the graph as invalid.
    #[default]
    Reject,
    /// Give the neighbor a fresh id and add it as a vertex without neighbors.
    Extend,
}

impl DanglingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DanglingPolicy::Reject => "reject",
            DanglingPolicy::Extend => "extend",
        }
    }
}

impl fmt::Display for DanglingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DanglingPolicy {
    type Err = GatewayError;

    fn from_str(s: &str) -> GatewayResult<Self> {
        match s {
            "reject" => Ok(DanglingPolicy::Reject),
            "extend" => Ok(DanglingPolicy::Extend),
            _ => Err(GatewayError::Config(format!(
                "invalid dangling neighbor policy: {s} (expected reject or extend)"
            ))),
        }
    }
}

/// Bijection between the labels of one request and `[0, len)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    table: LabelTable,
}

impl LabelMap {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn id_of(&self, label: &str) -> Option<VertexId> {
        self.table.get_by_left(label).copied()
    }

    pub fn label_of(&self, id: VertexId) -> Option<&str> {
        self.table.get_by_right(&id).map(String::as_str)
    }

    /// Iterates `(id, label)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &str)> + '_ {
        self.table
            .iter()
            .map(|(label, id)| (*id, label.as_str()))
            .sorted_unstable_by_key(|(id, _)| *id)
    }

    fn assign(&mut self, label: &str) -> GatewayResult<VertexId> {
        let id = VertexId::try_from(self.table.len()).map_err(|_| {
            let err = format!("graph has more than {} vertices", VertexId::MAX);
            GatewayError::Validation(err)
        })?;
        if self.table.insert(label.to_owned(), id).did_overwrite() {
            let err = format!("label {label:?} was assigned twice");
            return Err(GatewayError::Relabel(err));
        }
        trace!("assign {label:?} -> {id}");
        Ok(id)
    }

    /// Re-keys a solver coloring by the labels it was computed for.
    ///
    /// Every id in `coloring` must have been assigned by this map.
    pub fn backward(&self, coloring: &IdColoring) -> GatewayResult<LabelColoring> {
        coloring
            .iter()
            .map(|(id, color)| {
                let label = self.label_of(*id).ok_or_else(|| {
                    let err = format!("solver returned vertex id {id} which was never assigned");
                    GatewayError::Relabel(err)
                })?;
                Ok((label.to_owned(), *color))
            })
            .try_collect()
    }
}

/// The id-keyed graph handed to the solver together with the table that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relabeled {
    pub graph: IdGraph,
    pub map: LabelMap,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Relabeler {
    policy: DanglingPolicy,
}

impl Relabeler {
    pub fn new(policy: DanglingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DanglingPolicy {
        self.policy
    }

    /// Numbers the vertices of `graph` and rewrites its adjacency lists with those numbers.
    ///
    /// Vertices are numbered in label order. Under [`DanglingPolicy::Extend`] neighbors that
    /// are not vertices are numbered afterwards, in the order they are first referenced.
    pub fn forward(&self, graph: &LabelGraph) -> GatewayResult<Relabeled> {
        if graph.is_empty() {
            let err = "graph must contain at least one vertex".to_owned();
            return Err(GatewayError::Validation(err));
        }
        let mut map = LabelMap::default();
        for label in graph.keys() {
            if label.is_empty() {
                let err = "vertex labels must not be empty".to_owned();
                return Err(GatewayError::Validation(err));
            }
            map.assign(label)?;
        }

        let mut id_graph = IdGraph::new();
        let mut dangling = Vec::new();
        for (label, neighbors) in graph {
            let id = map.id_of(label).ok_or_else(|| {
                let err = format!("vertex {label:?} lost its id");
                GatewayError::Relabel(err)
            })?;
            let mut neighbor_ids = Vec::with_capacity(neighbors.len());
            for neighbor in neighbors {
                if neighbor.is_empty() {
                    let err = format!("vertex {label:?} has a neighbor with an empty label");
                    return Err(GatewayError::Validation(err));
                }
                let neighbor_id = match (map.id_of(neighbor), self.policy) {
                    (Some(neighbor_id), _) => neighbor_id,
                    (None, DanglingPolicy::Reject) => {
                        let err = format!(
                            "vertex {label:?} references neighbor {neighbor:?} which is not a vertex of the graph"
                        );
                        return Err(GatewayError::Validation(err));
                    }
                    (None, DanglingPolicy::Extend) => {
                        let neighbor_id = map.assign(neighbor)?;
                        dangling.push(neighbor_id);
                        neighbor_id
                    }
                };
                neighbor_ids.push(neighbor_id);
            }
            id_graph.insert(id, neighbor_ids);
        }
        if !dangling.is_empty() {
            debug!("extended graph with {} dangling neighbors", dangling.len());
        }
        for id in dangling {
            id_graph.entry(id).or_default();
        }
        debug!("relabeled {} vertices", map.len());
        Ok(Relabeled {
            graph: id_graph,
            map,
        })
    }
}
