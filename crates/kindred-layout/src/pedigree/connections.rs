use super::ResolvedTree;
use crate::geometry::Point;
use crate::record::PersonId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One end of a connector: who, where, and the passthrough attributes
/// the renderer uses to pick a connector style (photo endpoint or not)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeEndpoint {
    pub id: PersonId,
    pub position: Point,
    pub attributes: Map<String, Value>,
}

/// Connector data for one parent: its own endpoint plus one endpoint
/// per child, in display order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionEdge {
    pub parent: EdgeEndpoint,
    pub children: Vec<EdgeEndpoint>,
}

/// Regroup the laid-out nodes by parent into renderable connectors.
///
/// Only parents with at least one laid-out child produce an edge, so
/// the root never gets an inbound one.
pub(crate) fn derive(tree: &ResolvedTree, positions: &[Point]) -> Vec<ConnectionEdge> {
    tree.nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| !node.children.is_empty())
        .map(|(idx, node)| ConnectionEdge {
            parent: endpoint(tree, idx, positions),
            children: node
                .children
                .iter()
                .map(|&child| endpoint(tree, child, positions))
                .collect(),
        })
        .collect()
}

fn endpoint(tree: &ResolvedTree, idx: usize, positions: &[Point]) -> EdgeEndpoint {
    let record = &tree.nodes[idx].record;
    EdgeEndpoint {
        id: record.id.clone(),
        position: positions[idx],
        attributes: record.attributes.clone(),
    }
}
