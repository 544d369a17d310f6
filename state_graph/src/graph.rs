use std::{
    cmp::Ordering,
    collections::VecDeque,
    fmt,
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use cuboid_core::{Cube, MoveSet};
use itertools::Itertools;
use log::debug;
use thiserror::Error;

/// The canonical id of a state, `0..node_count`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An undirected edge with `a <= b`, labeled by every move that takes one
/// endpoint to the other
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub moves: MoveSet,
}

impl Edge {
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.a == self.b
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("The graph is not bipartite: nodes {a} and {b} are adjacent but fall on the same side")]
    NotBipartite { a: NodeId, b: NodeId },
    #[error("Node {0} does not exist")]
    UnknownNode(NodeId),
}

/// The states reachable from the solved cuboid and the moves between them.
///
/// Nodes are numbered canonically: they are sorted by their `FxHash` content
/// hash and then by content, so the numbering depends only on the set of
/// states and never on the order in which they were found.
#[derive(Clone, Debug)]
pub struct StateGraph {
    nodes: Vec<Cube>,
    hashes: Vec<u64>,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<NodeId>>,
    root: NodeId,
    generated: usize,
}

fn content_order(a: (u64, &Cube), b: (u64, &Cube)) -> Ordering {
    a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1))
}

impl StateGraph {
    /// Builds the graph from states numbered in discovery order, where state
    /// zero is the start of the search.
    pub(crate) fn from_discovery(
        discovered: Vec<Cube>,
        edges: impl IntoIterator<Item = ((usize, usize), MoveSet)>,
        generated: usize,
    ) -> StateGraph {
        let keyed = discovered
            .into_iter()
            .enumerate()
            .map(|(found_at, cube)| (fxhash::hash64(&cube), found_at, cube))
            .sorted_unstable_by(|(ha, _, a), (hb, _, b)| content_order((*ha, a), (*hb, b)))
            .collect_vec();

        let mut renumber = vec![NodeId(0); keyed.len()];
        for (canonical, (_, found_at, _)) in keyed.iter().enumerate() {
            renumber[*found_at] = NodeId(canonical);
        }

        let (hashes, nodes): (Vec<_>, Vec<_>) =
            keyed.into_iter().map(|(hash, _, cube)| (hash, cube)).unzip();

        let edges = edges
            .into_iter()
            .map(|((u, v), moves)| {
                let (a, b) = (renumber[u], renumber[v]);
                Edge {
                    a: a.min(b),
                    b: a.max(b),
                    moves,
                }
            })
            .sorted_unstable_by_key(|edge| (edge.a, edge.b))
            .collect_vec();

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for edge in edges.iter().filter(|edge| !edge.is_self_loop()) {
            adjacency[edge.a.0].push(edge.b);
            adjacency[edge.b.0].push(edge.a);
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }

        StateGraph {
            nodes,
            hashes,
            edges,
            adjacency,
            root: renumber.first().copied().unwrap_or(NodeId(0)),
            generated,
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The number of edges joining two distinct states
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len() - self.self_loop_count()
    }

    /// The number of states fixed by at least one move
    #[must_use]
    pub fn self_loop_count(&self) -> usize {
        self.edges.iter().filter(|edge| edge.is_self_loop()).count()
    }

    /// How many cube values the search produced, counting the start and
    /// every successor before deduplication
    #[must_use]
    pub fn generated(&self) -> usize {
        self.generated
    }

    /// The solved state the search started from
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Every state, indexed by its `NodeId`
    #[must_use]
    pub fn nodes(&self) -> &[Cube] {
        &self.nodes
    }

    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if `id` is out of range
    pub fn node(&self, id: NodeId) -> Result<&Cube, GraphError> {
        self.nodes.get(id.0).ok_or(GraphError::UnknownNode(id))
    }

    /// Looks up the id of a state by its content, ignoring its permitted moves
    #[must_use]
    pub fn id_of(&self, cube: &Cube) -> Option<NodeId> {
        let hash = fxhash::hash64(cube);
        let start = self.hashes.partition_point(|&h| h < hash);
        let end = self.hashes.partition_point(|&h| h <= hash);
        self.nodes[start..end]
            .binary_search(cube)
            .ok()
            .map(|offset| NodeId(start + offset))
    }

    /// Every edge including self-loops, sorted by `(a, b)`
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The moves joining two states, in either direction
    #[must_use]
    pub fn labels(&self, a: NodeId, b: NodeId) -> Option<MoveSet> {
        let key = (a.min(b), a.max(b));
        self.edges
            .binary_search_by_key(&key, |edge| (edge.a, edge.b))
            .ok()
            .map(|i| self.edges[i].moves)
    }

    /// The distinct states one move away from `id`, in ascending order
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownNode` if `id` is out of range
    pub fn neighbors(&self, id: NodeId) -> Result<&[NodeId], GraphError> {
        self.adjacency
            .get(id.0)
            .map(Vec::as_slice)
            .ok_or(GraphError::UnknownNode(id))
    }

    /// Two-colors the graph by breadth-first search.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::NotBipartite` naming an edge whose endpoints
    /// received the same color. A self-loop always makes this impossible.
    pub fn bipartition(&self) -> Result<Bipartition, GraphError> {
        if let Some(edge) = self.edges.iter().find(|edge| edge.is_self_loop()) {
            return Err(GraphError::NotBipartite {
                a: edge.a,
                b: edge.b,
            });
        }

        let mut sides: Vec<Option<Part>> = vec![None; self.nodes.len()];
        let mut queue = VecDeque::new();

        for start in 0..self.nodes.len() {
            if sides[start].is_some() {
                continue;
            }

            sides[start] = Some(Part::Even);
            queue.push_back(NodeId(start));

            while let Some(node) = queue.pop_front() {
                let Some(side) = sides[node.0] else {
                    continue;
                };

                for &neighbor in &self.adjacency[node.0] {
                    match sides[neighbor.0] {
                        None => {
                            sides[neighbor.0] = Some(side.other());
                            queue.push_back(neighbor);
                        }
                        Some(theirs) if theirs == side => {
                            return Err(GraphError::NotBipartite {
                                a: node.min(neighbor),
                                b: node.max(neighbor),
                            });
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        let sides = sides.into_iter().flatten().collect_vec();
        let (even, odd): (Vec<_>, Vec<_>) = (0..sides.len())
            .map(NodeId)
            .partition(|id| sides[id.0] == Part::Even);

        debug!(
            "Bipartition found with {} even and {} odd states",
            even.len(),
            odd.len()
        );

        Ok(Bipartition { even, odd, sides })
    }

    /// Writes the graph as a plain edge list: a `"<nodes> <edges>"` header
    /// followed by one `"<u> <v>"` line per non-loop edge with `u < v`.
    ///
    /// # Errors
    ///
    /// Propagates any failure of the underlying writer
    pub fn write_edge_list<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{} {}", self.node_count(), self.edge_count())?;
        for edge in self.edges.iter().filter(|edge| !edge.is_self_loop()) {
            writeln!(out, "{} {}", edge.a, edge.b)?;
        }
        out.flush()
    }

    /// # Errors
    ///
    /// Fails if the file cannot be created or written
    pub fn save_edge_list(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        debug!("Writing edge list to {}", path.display());
        self.write_edge_list(BufWriter::new(File::create(path)?))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Part {
    Even,
    Odd,
}

impl Part {
    #[must_use]
    pub fn other(self) -> Part {
        match self {
            Part::Even => Part::Odd,
            Part::Odd => Part::Even,
        }
    }
}

/// A two-coloring of a `StateGraph`. Every edge joins the two parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bipartition {
    pub even: Vec<NodeId>,
    pub odd: Vec<NodeId>,
    sides: Vec<Part>,
}

impl Bipartition {
    #[must_use]
    pub fn side(&self, id: NodeId) -> Option<Part> {
        self.sides.get(id.0).copied()
    }

    #[must_use]
    pub fn part(&self, part: Part) -> &[NodeId] {
        match part {
            Part::Even => &self.even,
            Part::Odd => &self.odd,
        }
    }

    /// The part that does not contain `target`. A walk from any of these
    /// states to `target` has odd length.
    #[must_use]
    pub fn opposite(&self, target: NodeId) -> Option<&[NodeId]> {
        self.side(target).map(|side| self.part(side.other()))
    }
}
