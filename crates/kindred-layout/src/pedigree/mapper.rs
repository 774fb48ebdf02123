use super::{FlowDirection, PedigreeLayout, ResolvedTree};
use crate::geometry::{Extent, Point};
use crate::record::PersonRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One laid-out person: the original record plus its generation index
/// and final screen position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    #[serde(flatten)]
    pub record: PersonRecord,

    /// Generation index, 0 at the root
    pub depth: u32,

    pub x: f32,
    pub y: f32,
}

impl LayoutNode {
    /// Final screen position
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Transpose solved (depth, breadth) pairs onto screen axes.
///
/// Generations run along x and are fit to the viewport: the width
/// divided by the generation count, times the configured widening
/// factor. Breadth maps straight onto y. Returns the nodes in display
/// preorder, per-arena-index positions for the connection stage, and
/// the overall breadth extent.
pub(crate) fn project_nodes(
    tree: &ResolvedTree,
    config: &PedigreeLayout,
    viewport_width: f32,
) -> (Vec<LayoutNode>, Vec<Point>, Extent) {
    if tree.nodes.is_empty() {
        return (Vec::new(), Vec::new(), Extent::zero());
    }

    let generations = tree.nodes.iter().map(|n| n.depth).max().unwrap_or(0) + 1;
    let spacing = viewport_width / generations as f32 * config.generation_widening;
    debug!(
        "Projecting {} nodes over {generations} generations, spacing {spacing}",
        tree.nodes.len()
    );

    let mut positions = vec![Point::new(0.0, 0.0); tree.nodes.len()];
    let mut extent = Extent::zero();
    for (idx, node) in tree.nodes.iter().enumerate() {
        let along = node.depth as f32 * spacing;
        let x = match config.direction {
            FlowDirection::LeftToRight => along,
            FlowDirection::RightToLeft => viewport_width - along,
        };
        positions[idx] = Point::new(x, node.breadth);
        extent.include(node.breadth);
    }

    let mut nodes = Vec::with_capacity(tree.nodes.len());
    let mut stack = vec![0usize];
    while let Some(idx) = stack.pop() {
        let node = &tree.nodes[idx];
        nodes.push(LayoutNode {
            record: node.record.clone(),
            depth: node.depth,
            x: positions[idx].x,
            y: positions[idx].y,
        });
        for &child in node.children.iter().rev() {
            stack.push(child);
        }
    }

    (nodes, positions, extent)
}
