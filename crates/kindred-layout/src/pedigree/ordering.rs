use super::{FlowDirection, ResolvedTree};
use std::cmp::Ordering;

/// Sort every node's children into display order, root to leaves.
///
/// Explicit `sibling_order` values sort ascending (descending for a
/// right-to-left convention); records without one come after all
/// records with one. The sort is stable and arena child lists start in
/// input order, so ties keep their input relative order.
pub(crate) fn order_siblings(tree: &mut ResolvedTree, direction: FlowDirection) {
    for idx in 0..tree.nodes.len() {
        let mut children = std::mem::take(&mut tree.nodes[idx].children);
        children.sort_by(|&a, &b| {
            sibling_cmp(
                tree.nodes[a].record.sibling_order,
                tree.nodes[b].record.sibling_order,
                direction,
            )
        });
        tree.nodes[idx].children = children;
    }
}

fn sibling_cmp(a: Option<i32>, b: Option<i32>, direction: FlowDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            FlowDirection::LeftToRight => a.cmp(&b),
            FlowDirection::RightToLeft => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
