use std::{
    collections::{BTreeSet, HashMap},
    fmt::{self, Debug, Display},
    hash::Hash,
};

/// Position of a node in the graph's node table
pub type NodeIndex = usize;

/// "source depends on every node in adjacency"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    source: NodeIndex,
    adjacency: BTreeSet<NodeIndex>,
}
impl Edge {
    pub fn source(&self) -> NodeIndex {
        self.source
    }

    /// Dependencies of the source which have not been released yet
    pub fn adjacency(&self) -> &BTreeSet<NodeIndex> {
        &self.adjacency
    }

    /// A source without open dependencies can be emitted
    pub fn is_ready(&self) -> bool {
        self.adjacency.is_empty()
    }
}

/// Dependency graph over a fixed set of nodes
///
/// Nodes live in an arena and are addressed by their [NodeIndex], in the order
/// they first appeared in the mapping the graph was built from. Every node owns
/// exactly one edge slot, which is emptied once the edge is removed.
#[derive(Debug, Clone)]
pub struct DependencyGraph<N> {
    nodes: Vec<N>,
    edges: Vec<Option<Edge>>,
    live_edges: usize,
}

impl<N: Clone + Eq + Hash> DependencyGraph<N> {
    /// Builds the graph from a `node -> dependencies` mapping
    ///
    /// The dependencies are copied, so the graph is independent of the mapping.
    /// A node listed more than once gets a single edge with the union of all its dependencies.
    /// Every dependency must itself be a node of the mapping.
    pub fn from_mapping<M, D>(mapping: M) -> Result<Self, DependencyGraphError<N>>
    where
        M: IntoIterator<Item = (N, D)>,
        D: IntoIterator<Item = N>,
    {
        let mut index: HashMap<N, NodeIndex> = HashMap::new();
        let mut nodes: Vec<N> = Vec::new();
        let mut declared: Vec<Vec<N>> = Vec::new();

        for (source, dependencies) in mapping {
            let position = match index.get(&source) {
                Some(position) => *position,
                None => {
                    index.insert(source.clone(), nodes.len());
                    nodes.push(source);
                    declared.push(Vec::new());
                    nodes.len() - 1
                }
            };
            declared[position].extend(dependencies);
        }

        let mut edges = Vec::with_capacity(nodes.len());
        for (source, dependencies) in declared.into_iter().enumerate() {
            let mut adjacency = BTreeSet::new();
            for dependency in dependencies {
                let Some(target) = index.get(&dependency) else {
                    return Err(DependencyGraphError::MissingDependency {
                        dependency,
                        required_by: nodes[source].clone(),
                    });
                };
                adjacency.insert(*target);
            }
            edges.push(Some(Edge { source, adjacency }));
        }

        Ok(Self {
            live_edges: edges.len(),
            nodes,
            edges,
        })
    }
}

impl<N> DependencyGraph<N> {
    /// Number of edges which have not been removed
    pub fn len(&self) -> usize {
        self.live_edges
    }

    pub fn is_empty(&self) -> bool {
        self.live_edges == 0
    }

    /// Total number of nodes, removed edges included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, index: NodeIndex) -> &N {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Current edges in node order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().flatten()
    }

    /// Removes the edge of `source`, returning it if it was still present
    pub fn remove_edge(&mut self, source: NodeIndex) -> Option<Edge> {
        let removed = self.edges.get_mut(source)?.take();
        if removed.is_some() {
            self.live_edges -= 1;
        }
        removed
    }

    /// Deletes `target` from the dependencies of every remaining edge
    ///
    /// Returns the sources whose dependencies became empty through this call, in node order.
    pub fn release(&mut self, target: NodeIndex) -> Vec<NodeIndex> {
        let mut ready = Vec::new();
        for edge in self.edges.iter_mut().flatten() {
            if edge.adjacency.remove(&target) && edge.is_ready() {
                ready.push(edge.source);
            }
        }
        ready
    }

    /// Nodes whose edge is still present
    pub(crate) fn remaining(&self) -> Vec<N>
    where
        N: Clone,
    {
        self.edges()
            .map(|edge| self.nodes[edge.source].clone())
            .collect()
    }
}

/// The graph can not be put into an order
#[derive(Debug, Clone)]
pub enum DependencyGraphError<N> {
    MissingDependency { dependency: N, required_by: N },
    /// Every node has at least one dependency
    NoStartingPoint { remaining: Vec<N> },
    /// The remaining nodes depend on each other
    CircularDependency { remaining: Vec<N> },
}

impl<N: Display> Display for DependencyGraphError<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyGraphError::MissingDependency {
                dependency,
                required_by,
            } => write!(f, "'{required_by}' needs '{dependency}' but it is missing"),
            DependencyGraphError::NoStartingPoint { remaining } => {
                write!(f, "No component is free of dependencies: ")?;
                write_nodes(f, remaining)
            }
            DependencyGraphError::CircularDependency { remaining } => {
                write!(f, "A circular dependency exists between: ")?;
                write_nodes(f, remaining)
            }
        }
    }
}

fn write_nodes<N: Display>(f: &mut fmt::Formatter<'_>, nodes: &[N]) -> fmt::Result {
    let display: Vec<String> = nodes.iter().map(|node| format!("'{node}'")).collect();
    f.write_str(&display.join(", "))
}

impl<N: Debug + Display> std::error::Error for DependencyGraphError<N> {}
