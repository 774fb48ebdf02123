//! The layout pipeline: hierarchy resolution, sibling ordering,
//! tidy-tree breadth solving, viewport projection and connector
//! derivation, in that order. Data flows strictly forward; every
//! intermediate is rebuilt from scratch on each invocation.

mod connections;
mod hierarchy;
mod mapper;
mod ordering;
mod solver;

use crate::geometry::Extent;
use crate::record::{PersonId, PersonRecord};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use connections::{ConnectionEdge, EdgeEndpoint};
pub use mapper::LayoutNode;

/// Hard failures: malformed input that indicates a bug upstream.
///
/// Recoverable data problems (missing root, orphans, cycles) are
/// reported as [`Diagnostic`]s on the result instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// A record carries an empty id
    #[error("person record has an empty id")]
    EmptyPersonId,

    /// Two records share one id
    #[error("duplicate person id {0}")]
    DuplicatePersonId(PersonId),

    /// The viewport width is not a usable number
    #[error("viewport width must be finite and positive, got {0}")]
    InvalidViewportWidth(f32),
}

/// A recoverable condition encountered while resolving the tree.
///
/// Diagnostics describe what was excluded from the layout and why. The
/// UI layer is expected to surface them (or an empty state) instead of
/// treating them as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// No record without parent references exists
    NoRootFound,

    /// More than one record without parent references exists
    MultipleRootsFound { candidates: Vec<PersonId> },

    /// The parent links contain a cycle; `member` is one record on it
    CyclicReferenceDetected { member: PersonId },

    /// `id` was excluded because its ancestry never reaches the root.
    /// `parent_id` is the declared link that failed to resolve, or the
    /// excluded ancestor it resolved to.
    OrphanedRecord { id: PersonId, parent_id: PersonId },
}

/// Reading direction of the rendered tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlowDirection {
    /// Generations flow left to right, siblings sort ascending
    #[default]
    LeftToRight,
    /// Generations flow right to left, siblings sort descending
    RightToLeft,
}

/// Configuration for the pedigree layout pipeline
#[derive(Debug, Clone)]
pub struct PedigreeLayout {
    /// Minimum breadth gap between adjacent siblings
    pub sibling_spacing: f32,

    /// Minimum breadth gap between adjacent subtrees (cousin branches)
    pub subtree_spacing: f32,

    /// Widening factor applied on top of the fit-to-viewport
    /// generation spacing
    pub generation_widening: f32,

    /// Display convention of the surrounding UI
    pub direction: FlowDirection,
}

impl Default for PedigreeLayout {
    fn default() -> Self {
        Self {
            sibling_spacing: 90.0,
            subtree_spacing: 130.0,
            generation_widening: 1.5,
            direction: FlowDirection::default(),
        }
    }
}

impl PedigreeLayout {
    /// Create a new layout engine for the given reading direction
    pub fn new(direction: FlowDirection) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }
}

/// One resolved person in the per-invocation arena.
///
/// `parent` is a lookup-only index, never an owning link; children own
/// the traversal order.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedNode {
    pub(crate) record: PersonRecord,
    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,
    pub(crate) depth: u32,
    pub(crate) breadth: f32,
}

/// Output of the resolve phase: the validated, ordered, breadth-solved
/// tree (expensive, cache this).
///
/// It depends only on the record collection, not on the viewport, so a
/// caller that memoizes can keep it across resizes and only re-run
/// [`PedigreeLayout::project`].
#[derive(Debug, Clone)]
pub struct ResolvedTree {
    /// Arena of reachable nodes; index 0 is the root when non-empty
    pub(crate) nodes: Vec<ResolvedNode>,

    /// Everything that was excluded, and why
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedTree {
    pub(crate) fn empty(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            nodes: Vec::new(),
            diagnostics,
        }
    }

    /// Number of people that survived resolution
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Final laid-out tree handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyLayout {
    /// One entry per person reachable from the root, in display
    /// preorder (root first)
    pub nodes: Vec<LayoutNode>,

    /// One entry per parent with at least one laid-out child
    pub connections: Vec<ConnectionEdge>,

    /// Bounding extent of the breadth (screen y) axis
    pub extent: Extent,

    /// Everything that was excluded, and why
    pub diagnostics: Vec<Diagnostic>,
}

impl PedigreeLayout {
    /// Run the whole pipeline: records in, renderable layout out.
    ///
    /// Equivalent to [`resolve`](Self::resolve) followed by
    /// [`project`](Self::project).
    pub fn compute(
        &self,
        records: &[PersonRecord],
        viewport_width: f32,
    ) -> Result<FamilyLayout, LayoutError> {
        let tree = self.resolve(records)?;
        self.project(&tree, viewport_width)
    }

    /// Resolve the flat collection into an ordered, breadth-solved
    /// tree (expensive, cache this).
    ///
    /// # Errors
    /// Returns an error for malformed records (empty or duplicate
    /// ids). Missing or ambiguous roots, cycles and orphans are
    /// recoverable: the tree comes back empty or partial with
    /// [`Diagnostic`]s attached.
    pub fn resolve(&self, records: &[PersonRecord]) -> Result<ResolvedTree, LayoutError> {
        let mut tree = hierarchy::build(records)?;
        ordering::order_siblings(&mut tree, self.direction);
        solver::assign_breadth(&mut tree, self.sibling_spacing, self.subtree_spacing);
        debug!(
            "Resolved {} of {} records, {} diagnostics",
            tree.len(),
            records.len(),
            tree.diagnostics.len()
        );
        Ok(tree)
    }

    /// Project a resolved tree onto screen axes for the given viewport
    /// (cheap, rerun when the viewport changes).
    ///
    /// # Errors
    /// Returns an error if `viewport_width` is not finite and positive.
    pub fn project(
        &self,
        tree: &ResolvedTree,
        viewport_width: f32,
    ) -> Result<FamilyLayout, LayoutError> {
        if !viewport_width.is_finite() || viewport_width <= 0.0 {
            return Err(LayoutError::InvalidViewportWidth(viewport_width));
        }

        let (nodes, positions, extent) = mapper::project_nodes(tree, self, viewport_width);
        let connections = connections::derive(tree, &positions);
        debug!(
            "Projected {} nodes and {} connections into a {viewport_width} wide viewport",
            nodes.len(),
            connections.len()
        );

        Ok(FamilyLayout {
            nodes,
            connections,
            extent,
            diagnostics: tree.diagnostics.clone(),
        })
    }
}


#[cfg(test)]
mod props {
    use super::*;
    use proptest::prelude::*;

    // Random single-root acyclic families: every record's father is one
    // of the records created before it.
    fn family_strategy() -> impl Strategy<Value = Vec<PersonRecord>> {
        prop::collection::vec(
            (any::<prop::sample::Index>(), prop::option::of(0..5i32)),
            0..40,
        )
        .prop_map(|seeds| {
            let mut records = vec![PersonRecord::new("p0")];
            for (i, (parent, sibling_order)) in seeds.into_iter().enumerate() {
                let father_id = records[parent.index(records.len())].id.clone();
                records.push(PersonRecord {
                    father_id: Some(father_id),
                    sibling_order,
                    ..PersonRecord::new(format!("p{}", i + 1))
                });
            }
            records
        })
    }

    proptest! {
        #[test]
        fn every_record_is_laid_out_exactly_once(records in family_strategy()) {
            let layout = PedigreeLayout::default().compute(&records, 1080.0).unwrap();
            prop_assert_eq!(layout.nodes.len(), records.len());

            let mut ids: Vec<&str> = layout.nodes.iter().map(|n| n.record.id.0.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), records.len());
        }

        #[test]
        fn layout_is_deterministic(records in family_strategy()) {
            let engine = PedigreeLayout::default();
            let first = engine.compute(&records, 1080.0).unwrap();
            let second = engine.compute(&records, 1080.0).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn siblings_keep_their_distance(records in family_strategy()) {
            let engine = PedigreeLayout::default();
            let layout = engine.compute(&records, 1080.0).unwrap();

            for connection in &layout.connections {
                let mut ys: Vec<f32> = connection.children.iter().map(|c| c.position.y).collect();
                ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
                for pair in ys.windows(2) {
                    prop_assert!(
                        pair[1] - pair[0] >= engine.sibling_spacing * 0.999,
                        "sibling gap {} below minimum {}",
                        pair[1] - pair[0],
                        engine.sibling_spacing
                    );
                }
            }
        }

        #[test]
        fn depth_grows_by_one_per_generation(records in family_strategy()) {
            let layout = PedigreeLayout::default().compute(&records, 1080.0).unwrap();

            let depth_of: std::collections::HashMap<&str, u32> = layout
                .nodes
                .iter()
                .map(|n| (n.record.id.0.as_str(), n.depth))
                .collect();

            for node in &layout.nodes {
                match &node.record.father_id {
                    Some(father) => {
                        prop_assert_eq!(node.depth, depth_of[father.0.as_str()] + 1)
                    }
                    None => prop_assert_eq!(node.depth, 0),
                }
            }
        }
    }
}
