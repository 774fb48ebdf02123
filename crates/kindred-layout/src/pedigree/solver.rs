//! Tidy-tree breadth assignment.
//!
//! Buchheim, Jünger and Leipert's linear-time refinement of Walker's
//! algorithm ("Improving Walker's Algorithm to Run in Linear Time",
//! 2002). A bottom-up walk assigns preliminary positions, merging the
//! contours of already-placed sibling subtrees through thread
//! pointers; a top-down walk then applies the accumulated modifiers.
//! Parents end up centered over their children and subtrees never
//! overlap, however asymmetric their shapes.

use super::ResolvedTree;

/// Per-node scratch state for the two walks
#[derive(Debug, Clone)]
struct Slot {
    /// Preliminary breadth from the first walk
    prelim: f32,
    /// Subtree shift, accumulated in the first walk and applied in the
    /// second
    modifier: f32,
    /// Deferred shift for spreading intermediate siblings
    shift: f32,
    /// Deferred per-subtree change for spreading intermediate siblings
    change: f32,
    /// Contour thread: next node down the outline of this subtree
    thread: Option<usize>,
    /// Ancestor pointer consulted by the apportion step
    ancestor: usize,
    /// Index among siblings, in display order
    rank: usize,
}

/// Assign every node its breadth coordinate.
///
/// Expects an ordered, acyclic tree with arena index 0 as the root;
/// given that, this stage cannot fail. Output is normalized so the
/// smallest breadth is zero.
pub(crate) fn assign_breadth(tree: &mut ResolvedTree, sibling_spacing: f32, subtree_spacing: f32) {
    if tree.nodes.is_empty() {
        return;
    }

    let mut slots: Vec<Slot> = (0..tree.nodes.len())
        .map(|idx| Slot {
            prelim: 0.0,
            modifier: 0.0,
            shift: 0.0,
            change: 0.0,
            thread: None,
            ancestor: idx,
            rank: 0,
        })
        .collect();
    for node in &tree.nodes {
        for (rank, &child) in node.children.iter().enumerate() {
            slots[child].rank = rank;
        }
    }

    {
        let mut walker = Walker {
            tree: &mut *tree,
            slots,
            sibling_spacing,
            subtree_spacing,
        };
        walker.first_walk(0);
        walker.second_walk(0, 0.0);
    }

    let min = tree
        .nodes
        .iter()
        .map(|n| n.breadth)
        .fold(f32::INFINITY, f32::min);
    for node in &mut tree.nodes {
        node.breadth -= min;
    }
}

struct Walker<'a> {
    tree: &'a mut ResolvedTree,
    slots: Vec<Slot>,
    sibling_spacing: f32,
    subtree_spacing: f32,
}

impl Walker<'_> {
    /// Bottom-up: preliminary positions and contour merging
    fn first_walk(&mut self, v: usize) {
        let children = self.tree.nodes[v].children.clone();

        if children.is_empty() {
            self.slots[v].prelim = match self.left_sibling(v) {
                Some(w) => self.slots[w].prelim + self.sibling_spacing,
                None => 0.0,
            };
            return;
        }

        let mut default_ancestor = children[0];
        for &w in &children {
            self.first_walk(w);
            default_ancestor = self.apportion(w, default_ancestor);
        }
        self.execute_shifts(v);

        let midpoint =
            (self.slots[children[0]].prelim + self.slots[children[children.len() - 1]].prelim)
                / 2.0;
        match self.left_sibling(v) {
            Some(w) => {
                self.slots[v].prelim = self.slots[w].prelim + self.sibling_spacing;
                self.slots[v].modifier = self.slots[v].prelim - midpoint;
            }
            None => self.slots[v].prelim = midpoint,
        }
    }

    /// Top-down: apply accumulated modifiers to get final breadths
    fn second_walk(&mut self, v: usize, modifier_sum: f32) {
        self.tree.nodes[v].breadth = self.slots[v].prelim + modifier_sum;

        let children = self.tree.nodes[v].children.clone();
        let below = modifier_sum + self.slots[v].modifier;
        for &w in &children {
            self.second_walk(w, below);
        }
    }

    /// Push `v`'s subtree right until it clears the contour of every
    /// subtree to its left, threading the contours for the next merge.
    fn apportion(&mut self, v: usize, mut default_ancestor: usize) -> usize {
        let Some(w) = self.left_sibling(v) else {
            return default_ancestor;
        };

        // Contour pointers: inner/outer on the right (v's subtree) and
        // on the left (everything placed before it), with accumulated
        // modifier sums for each
        let mut inner_right = v;
        let mut outer_right = v;
        let mut inner_left = w;
        let mut outer_left = self.leftmost_sibling(v).unwrap_or(v);

        let mut sum_ir = self.slots[inner_right].modifier;
        let mut sum_or = self.slots[outer_right].modifier;
        let mut sum_il = self.slots[inner_left].modifier;
        let mut sum_ol = self.slots[outer_left].modifier;

        while let (Some(next_il), Some(next_ir)) =
            (self.next_right(inner_left), self.next_left(inner_right))
        {
            inner_left = next_il;
            inner_right = next_ir;
            outer_left = self.next_left(outer_left).unwrap_or(outer_left);
            outer_right = self.next_right(outer_right).unwrap_or(outer_right);

            self.slots[outer_right].ancestor = v;

            let shift = (self.slots[inner_left].prelim + sum_il)
                - (self.slots[inner_right].prelim + sum_ir)
                + self.spacing(inner_left, inner_right);
            if shift > 0.0 {
                let ancestor = self.ancestor(inner_left, v, default_ancestor);
                self.move_subtree(ancestor, v, shift);
                sum_ir += shift;
                sum_or += shift;
            }

            sum_il += self.slots[inner_left].modifier;
            sum_ir += self.slots[inner_right].modifier;
            sum_ol += self.slots[outer_left].modifier;
            sum_or += self.slots[outer_right].modifier;
        }

        if self.next_right(inner_left).is_some() && self.next_right(outer_right).is_none() {
            self.slots[outer_right].thread = self.next_right(inner_left);
            self.slots[outer_right].modifier += sum_il - sum_or;
        }
        if self.next_left(inner_right).is_some() && self.next_left(outer_left).is_none() {
            self.slots[outer_left].thread = self.next_left(inner_right);
            self.slots[outer_left].modifier += sum_ir - sum_ol;
            default_ancestor = v;
        }

        default_ancestor
    }

    /// Shift the subtree rooted at `right` and spread the deferred
    /// correction over the sibling subtrees between `left` and `right`
    fn move_subtree(&mut self, left: usize, right: usize, shift: f32) {
        let subtrees = self.slots[right].rank.saturating_sub(self.slots[left].rank).max(1) as f32;
        self.slots[right].change -= shift / subtrees;
        self.slots[right].shift += shift;
        self.slots[left].change += shift / subtrees;
        self.slots[right].prelim += shift;
        self.slots[right].modifier += shift;
    }

    /// Apply the shifts deferred by `move_subtree`, right to left
    fn execute_shifts(&mut self, v: usize) {
        let children = self.tree.nodes[v].children.clone();
        let mut shift = 0.0;
        let mut change = 0.0;
        for &w in children.iter().rev() {
            self.slots[w].prelim += shift;
            self.slots[w].modifier += shift;
            change += self.slots[w].change;
            shift += self.slots[w].shift + change;
        }
    }

    /// Left contour of the subtree under `v`: first child or thread
    fn next_left(&self, v: usize) -> Option<usize> {
        self.tree.nodes[v].children.first().copied().or(self.slots[v].thread)
    }

    /// Right contour of the subtree under `v`: last child or thread
    fn next_right(&self, v: usize) -> Option<usize> {
        self.tree.nodes[v].children.last().copied().or(self.slots[v].thread)
    }

    fn left_sibling(&self, v: usize) -> Option<usize> {
        let parent = self.tree.nodes[v].parent?;
        let rank = self.slots[v].rank;
        (rank > 0).then(|| self.tree.nodes[parent].children[rank - 1])
    }

    fn leftmost_sibling(&self, v: usize) -> Option<usize> {
        let parent = self.tree.nodes[v].parent?;
        let first = self.tree.nodes[parent].children[0];
        (first != v).then_some(first)
    }

    /// Minimum separation between two contour nodes: tighter between
    /// direct siblings, wider between cousin subtrees
    fn spacing(&self, left: usize, right: usize) -> f32 {
        if self.tree.nodes[left].parent == self.tree.nodes[right].parent {
            self.sibling_spacing
        } else {
            self.subtree_spacing
        }
    }

    /// Buchheim's Ancestor: the left node's recorded ancestor when it
    /// is a sibling of `v`, the default ancestor otherwise
    fn ancestor(&self, left: usize, v: usize, default_ancestor: usize) -> usize {
        let candidate = self.slots[left].ancestor;
        if self.tree.nodes[candidate].parent == self.tree.nodes[v].parent {
            candidate
        } else {
            default_ancestor
        }
    }
}
