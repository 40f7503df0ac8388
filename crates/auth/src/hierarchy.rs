//! Reports-to hierarchy lookup and the ancestor walk.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use workpass_core::{CompanyId, EmployeeId};

/// Read-only projection of an employee for ancestor-chain checks.
///
/// Owned and mutated by whichever service persists the employee; this core
/// only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: EmployeeId,
    pub boss_id: Option<EmployeeId>,
    pub company_id: CompanyId,
}

/// Per-company lookup of reports-to records, supplied by whichever service
/// owns employee data.
pub trait HierarchyGraph: Send + Sync {
    fn find_node(&self, id: EmployeeId) -> Option<HierarchyNode>;
}

impl<G> HierarchyGraph for Arc<G>
where
    G: HierarchyGraph + ?Sized,
{
    fn find_node(&self, id: EmployeeId) -> Option<HierarchyNode> {
        (**self).find_node(id)
    }
}

/// Whether `manager_id` is an ancestor of `target_id` in the reports-to
/// chain.
///
/// Walks `boss_id` links upward from the target. The visited set guarantees
/// termination on cyclic data; a cycle or a dangling link yields `false`,
/// never an error. Irreflexive: the walk starts one hop above the target, so
/// `is_above(x, x)` only holds if the data itself puts `x` on its own chain,
/// and the visited set cuts that off.
pub fn is_above<G: HierarchyGraph + ?Sized>(
    graph: &G,
    manager_id: EmployeeId,
    target_id: EmployeeId,
) -> bool {
    let mut visited: HashSet<EmployeeId> = HashSet::new();
    let mut current = target_id;

    loop {
        if !visited.insert(current) {
            // Cycle in the reports-to data.
            return false;
        }

        let Some(node) = graph.find_node(current) else {
            return false;
        };

        match node.boss_id {
            Some(boss_id) if boss_id == manager_id => return true,
            Some(boss_id) => current = boss_id,
            None => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapGraph(HashMap<i64, Option<i64>>);

    impl MapGraph {
        fn new(edges: &[(i64, Option<i64>)]) -> Self {
            Self(edges.iter().copied().collect())
        }
    }

    impl HierarchyGraph for MapGraph {
        fn find_node(&self, id: EmployeeId) -> Option<HierarchyNode> {
            self.0.get(&id.value()).map(|boss| HierarchyNode {
                id,
                boss_id: boss.map(EmployeeId::new),
                company_id: CompanyId::new(1),
            })
        }
    }

    #[test]
    fn ancestor_chain_resolves_transitively() {
        // CEO(1) <- Manager(2) <- Employee(3)
        let graph = MapGraph::new(&[(1, None), (2, Some(1)), (3, Some(2))]);

        assert!(is_above(&graph, EmployeeId::new(1), EmployeeId::new(3)));
        assert!(is_above(&graph, EmployeeId::new(2), EmployeeId::new(3)));
        assert!(!is_above(&graph, EmployeeId::new(3), EmployeeId::new(1)));
    }

    #[test]
    fn walk_is_irreflexive() {
        let graph = MapGraph::new(&[(1, None), (2, Some(1))]);
        assert!(!is_above(&graph, EmployeeId::new(2), EmployeeId::new(2)));
    }

    #[test]
    fn cycle_terminates_with_false() {
        // 1 -> 3 -> 2 -> 1 -> ...
        let graph = MapGraph::new(&[(1, Some(3)), (2, Some(1)), (3, Some(2))]);
        assert!(!is_above(&graph, EmployeeId::new(99), EmployeeId::new(1)));
    }

    #[test]
    fn dangling_boss_link_is_false() {
        let graph = MapGraph::new(&[(3, Some(77))]);
        assert!(!is_above(&graph, EmployeeId::new(1), EmployeeId::new(3)));
    }

    #[test]
    fn unknown_target_is_false() {
        let graph = MapGraph::new(&[(1, None)]);
        assert!(!is_above(&graph, EmployeeId::new(1), EmployeeId::new(42)));
    }
}
