//! Kahn's topological sort
//!
//! Orders the nodes of a dependency mapping so that every node comes after all of its
//! dependencies. Ready nodes are kept on a stack, the last node which became ready is
//! emitted first. For a fixed input order the output is always the same.

use std::hash::Hash;

use crate::dependency_graph::{DependencyGraph, DependencyGraphError, NodeIndex};

/// Sorts a `node -> dependencies` mapping, dependencies first
pub fn sort<N, M, D>(mapping: M) -> Result<Vec<N>, DependencyGraphError<N>>
where
    N: Clone + Eq + Hash,
    M: IntoIterator<Item = (N, D)>,
    D: IntoIterator<Item = N>,
{
    sort_graph(DependencyGraph::from_mapping(mapping)?)
}

/// Sorts an already built graph, consuming it
///
/// Nodes whose edge was removed beforehand count as already sorted: they are
/// released from the remaining edges and left out of the result.
pub fn sort_graph<N: Clone>(mut graph: DependencyGraph<N>) -> Result<Vec<N>, DependencyGraphError<N>> {
    let node_count = graph.node_count();
    let mut emitted = vec![true; node_count];
    for edge in graph.edges() {
        emitted[edge.source()] = false;
    }
    for (index, removed) in emitted.iter().enumerate() {
        if *removed {
            graph.release(index);
        }
    }

    let live = graph.len();
    let mut sorted: Vec<NodeIndex> = Vec::with_capacity(live);
    let mut ready: Vec<NodeIndex> = graph
        .edges()
        .filter(|edge| edge.is_ready())
        .map(|edge| edge.source())
        .collect();

    if ready.is_empty() && !graph.is_empty() {
        return Err(DependencyGraphError::NoStartingPoint {
            remaining: graph.remaining(),
        });
    }

    while let Some(node) = ready.pop() {
        graph.remove_edge(node);
        sorted.push(node);
        emitted[node] = true;

        for source in graph.release(node) {
            if !emitted[source] {
                ready.push(source);
            }
        }
    }

    if sorted.len() < live {
        let remaining = graph.remaining();
        tracing::debug!(
            "Sorted {} of {live} nodes, {} are stuck in a cycle",
            sorted.len(),
            remaining.len()
        );
        return Err(DependencyGraphError::CircularDependency { remaining });
    }

    Ok(sorted
        .into_iter()
        .map(|index| graph.node(index).clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_dependencies_come_first() {
        let mapping = vec![
            ("A", vec!["B", "C"]),
            ("B", vec!["D"]),
            ("C", vec!["B", "D"]),
            ("D", vec![]),
        ];

        assert_eq!(sort(mapping).unwrap(), vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn test_same_result_from_hash_map() {
        let mapping = HashMap::from([
            ("A", vec!["B", "C"]),
            ("B", vec!["D"]),
            ("C", vec!["B", "D"]),
            ("D", vec![]),
        ]);

        // The chain leaves only one valid order
        assert_eq!(sort(mapping).unwrap(), vec!["D", "B", "C", "A"]);
    }

    #[test]
    fn test_two_node_cycle() {
        let result = sort(vec![("A", vec!["B"]), ("B", vec!["A"])]);

        assert!(matches!(
            result,
            Err(DependencyGraphError::NoStartingPoint { .. })
        ));
    }

    #[test]
    fn test_cycle_behind_a_valid_start() {
        let result = sort(vec![
            ("A", vec![]),
            ("B", vec!["A", "C"]),
            ("C", vec!["B"]),
        ]);

        match result {
            Err(DependencyGraphError::CircularDependency { remaining }) => {
                assert_eq!(remaining, vec!["B", "C"]);
            }
            other => panic!("expected a circular dependency, got {other:?}"),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let result = sort(vec![("A", vec![]), ("B", vec!["B"])]);

        assert!(matches!(
            result,
            Err(DependencyGraphError::CircularDependency { remaining }) if remaining == vec!["B"]
        ));
    }

    #[test]
    fn test_empty_mapping() {
        let mapping: Vec<(&str, Vec<&str>)> = vec![];
        assert!(sort(mapping).unwrap().is_empty());
    }

    #[test]
    fn test_isolated_nodes_are_emitted_last_ready_first() {
        let sorted = sort(vec![("A", vec![]), ("B", vec![]), ("C", vec![])]).unwrap();

        assert_eq!(sorted, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_shared_dependency_is_emitted_once() {
        let sorted = sort(vec![
            ("A", vec!["C"]),
            ("B", vec!["C"]),
            ("C", vec![]),
        ])
        .unwrap();

        assert_eq!(sorted, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_missing_dependency_fails_the_sort() {
        let result = sort(vec![("A", vec!["Z"])]);

        assert!(matches!(
            result,
            Err(DependencyGraphError::MissingDependency { dependency: "Z", .. })
        ));
    }

    #[test]
    fn test_deterministic_output() {
        let mapping = vec![
            (1, vec![]),
            (2, vec![1]),
            (3, vec![1]),
            (4, vec![2, 3]),
            (5, vec![]),
        ];

        let first = sort(mapping.clone()).unwrap();
        for _ in 0..10 {
            assert_eq!(sort(mapping.clone()).unwrap(), first);
        }
    }

    #[test]
    fn test_removed_edges_count_as_sorted() {
        let mut graph =
            DependencyGraph::from_mapping(vec![("A", vec!["B"]), ("B", vec!["C"]), ("C", vec![])])
                .unwrap();
        graph.remove_edge(2);

        assert_eq!(sort_graph(graph).unwrap(), vec!["B", "A"]);
    }

    #[test]
    fn test_graph_without_edges_sorts_to_nothing() {
        let mut graph = DependencyGraph::from_mapping(vec![("A", vec!["B"]), ("B", vec![])]).unwrap();
        graph.remove_edge(0);
        graph.remove_edge(1);

        assert!(sort_graph(graph).unwrap().is_empty());
    }

    #[test]
    fn test_cycle_after_removed_edges_names_only_live_nodes() {
        let mut graph = DependencyGraph::from_mapping(vec![
            ("A", vec![]),
            ("B", vec!["A", "C"]),
            ("C", vec!["B"]),
            ("D", vec!["A"]),
        ])
        .unwrap();
        graph.remove_edge(0);

        assert!(matches!(
            sort_graph(graph),
            Err(DependencyGraphError::CircularDependency { remaining }) if remaining == vec!["B", "C"]
        ));
    }

    /// Random DAGs: node `i` may only depend on nodes `j < i`
    fn acyclic_mapping() -> impl Strategy<Value = Vec<(usize, Vec<usize>)>> {
        (1usize..24)
            .prop_flat_map(|size| {
                (
                    prop::collection::vec(prop::collection::vec(any::<bool>(), size), size),
                    any::<bool>(),
                )
            })
            .prop_map(|(matrix, reversed)| {
                let mut mapping: Vec<(usize, Vec<usize>)> = matrix
                    .iter()
                    .enumerate()
                    .map(|(node, row)| {
                        let dependencies = (0..node).filter(|dep| row[*dep]).collect();
                        (node, dependencies)
                    })
                    .collect();
                if reversed {
                    mapping.reverse();
                }
                mapping
            })
    }

    proptest! {
        #[test]
        fn prop_every_node_follows_its_dependencies(mapping in acyclic_mapping()) {
            let sorted = sort(mapping.clone()).unwrap();
            prop_assert_eq!(sorted.len(), mapping.len());

            let position: HashMap<usize, usize> =
                sorted.iter().enumerate().map(|(at, node)| (*node, at)).collect();
            prop_assert_eq!(position.len(), mapping.len());

            for (node, dependencies) in &mapping {
                for dependency in dependencies {
                    prop_assert!(position[dependency] < position[node]);
                }
            }
        }

        #[test]
        fn prop_back_edge_is_always_detected(mapping in acyclic_mapping()) {
            let size = mapping.len();
            prop_assume!(size > 1);

            // Chain every node to its predecessor, then close the loop
            let mut cyclic: Vec<(usize, Vec<usize>)> =
                (0..size).map(|node| (node, node.checked_sub(1).into_iter().collect())).collect();
            cyclic[0].1.push(size - 1);

            prop_assert!(sort(cyclic).is_err());
        }
    }
}
