use super::{Diagnostic, LayoutError, ResolvedNode, ResolvedTree};
use crate::record::{PersonId, PersonRecord};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashMap;
use tracing::{debug, warn};

/// How one record attaches to the rest of the collection
enum ParentLink {
    /// Child of the record at this input position
    Resolved(usize),
    /// Declared a parent that is not in the collection
    Dangling(PersonId),
    /// No parent declared: root candidate
    None,
}

/// Build the resolved tree skeleton from the flat record collection.
///
/// Children keep their input order here; display order is applied by
/// the ordering stage. The id index and all intermediate state live on
/// this call's stack, so concurrent invocations cannot interfere.
///
/// # Errors
/// Returns an error for empty or duplicate ids. Everything else is
/// recoverable and lands in the tree's diagnostics.
pub(crate) fn build(records: &[PersonRecord]) -> Result<ResolvedTree, LayoutError> {
    debug!("Resolving hierarchy for {} records", records.len());

    let index = build_index(records)?;
    let links: Vec<ParentLink> = records
        .iter()
        .map(|record| resolve_parent(record, &index))
        .collect();

    let mut diagnostics = Vec::new();
    for (pos, link) in links.iter().enumerate() {
        if let ParentLink::Dangling(parent_id) = link {
            let id = &records[pos].id;
            warn!("Excluding {id}: parent {parent_id} is not in the collection");
            diagnostics.push(Diagnostic::OrphanedRecord {
                id: id.clone(),
                parent_id: parent_id.clone(),
            });
        }
    }

    // Acyclicity is validated up front, before anything walks parent
    // links, so the traversals below always terminate.
    let mut graph = DiGraphMap::new();
    for pos in 0..records.len() {
        graph.add_node(pos);
    }
    for (pos, link) in links.iter().enumerate() {
        if let ParentLink::Resolved(parent) = link {
            if *parent == pos {
                // A record that is its own parent is the smallest cycle
                let member = records[pos].id.clone();
                warn!("Parent links contain a cycle through {member}");
                diagnostics.push(Diagnostic::CyclicReferenceDetected { member });
                return Ok(ResolvedTree::empty(diagnostics));
            }
            graph.add_edge(*parent, pos, ());
        }
    }
    if let Err(cycle) = toposort(&graph, None) {
        let member = records[cycle.node_id()].id.clone();
        warn!("Parent links contain a cycle through {member}");
        diagnostics.push(Diagnostic::CyclicReferenceDetected { member });
        return Ok(ResolvedTree::empty(diagnostics));
    }

    // Collect-and-validate instead of letting the last candidate win
    let roots: Vec<usize> = links
        .iter()
        .enumerate()
        .filter(|(_, link)| matches!(link, ParentLink::None))
        .map(|(pos, _)| pos)
        .collect();
    let root = match roots.as_slice() {
        [] => {
            warn!("No root candidate among {} records", records.len());
            diagnostics.push(Diagnostic::NoRootFound);
            return Ok(ResolvedTree::empty(diagnostics));
        }
        [root] => *root,
        candidates => {
            let candidates: Vec<PersonId> = candidates
                .iter()
                .map(|&pos| records[pos].id.clone())
                .collect();
            warn!("Ambiguous root, candidates: {candidates:?}");
            diagnostics.push(Diagnostic::MultipleRootsFound { candidates });
            return Ok(ResolvedTree::empty(diagnostics));
        }
    };

    // Child lists per input position, still in input order
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    for (pos, link) in links.iter().enumerate() {
        if let ParentLink::Resolved(parent) = link {
            children[*parent].push(pos);
        }
    }

    // Arena of everything reachable from the root, built iteratively
    // in preorder; arena index 0 is the root.
    let mut nodes: Vec<ResolvedNode> = Vec::with_capacity(records.len());
    let mut arena_of = vec![usize::MAX; records.len()];
    let mut stack = vec![(root, None::<usize>, 0u32)];
    while let Some((pos, parent, depth)) = stack.pop() {
        let arena_idx = nodes.len();
        arena_of[pos] = arena_idx;
        if let Some(parent) = parent {
            nodes[parent].children.push(arena_idx);
        }
        nodes.push(ResolvedNode {
            record: records[pos].clone(),
            parent,
            children: Vec::new(),
            depth,
            breadth: 0.0,
        });
        for &child in children[pos].iter().rev() {
            stack.push((child, Some(arena_idx), depth + 1));
        }
    }

    // Records whose parent resolved but whose ancestry never reaches
    // the root are orphans too
    for (pos, record) in records.iter().enumerate() {
        if arena_of[pos] == usize::MAX {
            if let ParentLink::Resolved(parent) = links[pos] {
                let parent_id = records[parent].id.clone();
                warn!(
                    "Excluding {}: ancestor {parent_id} is not part of the tree",
                    record.id
                );
                diagnostics.push(Diagnostic::OrphanedRecord {
                    id: record.id.clone(),
                    parent_id,
                });
            }
        }
    }

    Ok(ResolvedTree { nodes, diagnostics })
}

fn build_index(records: &[PersonRecord]) -> Result<HashMap<&PersonId, usize>, LayoutError> {
    let mut index = HashMap::with_capacity(records.len());
    for (pos, record) in records.iter().enumerate() {
        if record.id.0.is_empty() {
            return Err(LayoutError::EmptyPersonId);
        }
        if index.insert(&record.id, pos).is_some() {
            return Err(LayoutError::DuplicatePersonId(record.id.clone()));
        }
    }
    Ok(index)
}

/// The father link wins; the mother link is only followed when the
/// father link is absent or does not resolve.
fn resolve_parent(record: &PersonRecord, index: &HashMap<&PersonId, usize>) -> ParentLink {
    if let Some(father) = &record.father_id {
        if let Some(&pos) = index.get(father) {
            return ParentLink::Resolved(pos);
        }
        if let Some(mother) = &record.mother_id {
            if let Some(&pos) = index.get(mother) {
                return ParentLink::Resolved(pos);
            }
        }
        return ParentLink::Dangling(father.clone());
    }
    if let Some(mother) = &record.mother_id {
        return match index.get(mother) {
            Some(&pos) => ParentLink::Resolved(pos),
            None => ParentLink::Dangling(mother.clone()),
        };
    }
    ParentLink::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn record(id: &str, father: Option<&str>, mother: Option<&str>) -> PersonRecord {
        PersonRecord {
            father_id: father.map(Into::into),
            mother_id: mother.map(Into::into),
            ..PersonRecord::new(id)
        }
    }

    #[test]
    fn assigns_depths_along_the_chain() {
        let records = vec![
            record("r", None, None),
            record("c", Some("r"), None),
            record("g", Some("c"), None),
        ];

        let tree = build(&records).unwrap();

        assert_eq!(tree.len(), 3);
        assert!(tree.diagnostics.is_empty());
        let depths: Vec<u32> = tree.nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
        assert_eq!(tree.nodes[0].parent, None);
        assert_eq!(tree.nodes[1].parent, Some(0));
        assert_eq!(tree.nodes[2].parent, Some(1));
    }

    #[test]
    fn falls_back_to_mother_when_father_does_not_resolve() {
        let records = vec![
            record("r", None, None),
            record("c", Some("unknown"), Some("r")),
        ];

        let tree = build(&records).unwrap();

        assert_eq!(tree.len(), 2);
        assert!(tree.diagnostics.is_empty());
        assert_eq!(tree.nodes[1].parent, Some(0));
    }

    #[test]
    fn father_wins_when_both_links_resolve() {
        let records = vec![
            record("r", None, None),
            record("dad", Some("r"), None),
            record("mum", Some("r"), None),
            record("kid", Some("dad"), Some("mum")),
        ];

        let tree = build(&records).unwrap();

        let kid = tree
            .nodes
            .iter()
            .position(|n| n.record.id == "kid".into())
            .unwrap();
        let parent = tree.nodes[kid].parent.unwrap();
        assert_eq!(tree.nodes[parent].record.id, "dad".into());
    }

    #[test]
    fn dangling_parent_is_reported_and_excluded() {
        let records = vec![record("r", None, None), record("lost", Some("nobody"), None)];

        let tree = build(&records).unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(
            tree.diagnostics,
            vec![Diagnostic::OrphanedRecord {
                id: "lost".into(),
                parent_id: "nobody".into(),
            }]
        );
    }

    #[test]
    fn descendants_of_an_orphan_are_excluded_too() {
        let records = vec![
            record("r", None, None),
            record("lost", Some("nobody"), None),
            record("lost-child", Some("lost"), None),
        ];

        let tree = build(&records).unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.diagnostics.len(), 2);
        assert!(tree.diagnostics.contains(&Diagnostic::OrphanedRecord {
            id: "lost-child".into(),
            parent_id: "lost".into(),
        }));
    }

    #[test]
    fn two_record_cycle_is_detected() {
        let records = vec![record("a", Some("b"), None), record("b", Some("a"), None)];

        let tree = build(&records).unwrap();

        assert!(tree.is_empty());
        assert!(tree
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::CyclicReferenceDetected { .. })));
    }

    #[test]
    fn empty_id_is_a_hard_error() {
        let records = vec![record("", None, None)];
        assert_eq!(build(&records).unwrap_err(), LayoutError::EmptyPersonId);
    }

    #[test]
    fn duplicate_id_is_a_hard_error() {
        let records = vec![record("dup", None, None), record("dup", None, None)];
        assert_eq!(
            build(&records).unwrap_err(),
            LayoutError::DuplicatePersonId("dup".into())
        );
    }
}
