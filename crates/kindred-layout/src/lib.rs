//! Family tree layout engine for the Kindred app.
//!
//! Takes the flat person collection fetched from the data store and
//! produces a deterministic, non-overlapping arrangement: one
//! positioned node per person reachable from the family root, plus the
//! parent→children connector records the renderer draws between them.
//!
//! The engine is pure and synchronous. Recoverable problems in the
//! data (no root, several roots, cyclic parent links, orphaned
//! records) come back as [`Diagnostic`]s on the result instead of
//! errors, so the UI can show an empty state rather than crash.
//!
//! # Example
//!
//! ```
//! use kindred_layout::{PedigreeLayout, PersonRecord};
//!
//! let records = vec![
//!     PersonRecord::new("gran"),
//!     PersonRecord {
//!         father_id: Some("gran".into()),
//!         ..PersonRecord::new("mum")
//!     },
//!     PersonRecord {
//!         father_id: Some("gran".into()),
//!         ..PersonRecord::new("aunt")
//!     },
//! ];
//!
//! let engine = PedigreeLayout::default();
//!
//! // One call for the whole pipeline:
//! let layout = engine.compute(&records, 1080.0).unwrap();
//! assert_eq!(layout.nodes.len(), 3);
//! assert_eq!(layout.connections.len(), 1);
//!
//! // Or split the phases, so the resolved tree can be cached and
//! // re-projected when the viewport changes:
//! let tree = engine.resolve(&records).unwrap();
//! let narrow = engine.project(&tree, 720.0).unwrap();
//! assert_eq!(narrow.nodes.len(), 3);
//! ```

mod geometry;
mod record;

pub mod pedigree;

pub use geometry::{Extent, Point};
pub use pedigree::{
    ConnectionEdge, Diagnostic, EdgeEndpoint, FamilyLayout, FlowDirection, LayoutError,
    LayoutNode, PedigreeLayout, ResolvedTree,
};
pub use record::{PersonId, PersonRecord};
