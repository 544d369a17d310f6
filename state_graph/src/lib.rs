#![warn(clippy::pedantic)]
#![allow(
    clippy::too_many_lines,
    clippy::similar_names,
    clippy::missing_panics_doc
)]

//! Exhaustive exploration of the states of a cuboid reachable under a fixed
//! set of moves, and the undirected graph those states form.

mod explorer;
mod graph;

pub use explorer::{DEFAULT_MAX_NODES, ExploreConfig, ExploreError, explore, explore_with};
pub use graph::{Bipartition, Edge, GraphError, NodeId, Part, StateGraph};
