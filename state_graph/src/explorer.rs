use std::{
    collections::hash_map,
    mem,
    sync::atomic::{AtomicUsize, Ordering},
    time::Instant,
};

use cuboid_core::{Cube, CubeError, Dimensions, MoveSet};
use dashmap::{DashMap, mapref::entry::Entry};
use fxhash::{FxBuildHasher, FxHashMap};
use itertools::Itertools;
use log::{debug, info, trace};
use rayon::prelude::*;
use thiserror::Error;

use crate::StateGraph;

/// The node bound used by `explore`
pub const DEFAULT_MAX_NODES: usize = 10_000_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExploreConfig {
    /// Stop with `ExploreError::ResourceExceeded` once more than this many
    /// distinct states have been found. `None` never stops.
    pub max_nodes: Option<usize>,
    /// Expand each breadth-first level across the rayon thread pool
    pub parallel: bool,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        ExploreConfig {
            max_nodes: Some(DEFAULT_MAX_NODES),
            parallel: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ExploreError {
    #[error(transparent)]
    Cube(#[from] CubeError),
    #[error("The state space has more than {limit} states")]
    ResourceExceeded { limit: usize },
}

/// Explores every state reachable from the solved cuboid of `dims` using
/// only `moves`, with the default configuration.
///
/// # Errors
///
/// See `explore_with`
pub fn explore(dims: Dimensions, moves: MoveSet) -> Result<StateGraph, ExploreError> {
    explore_with(dims, moves, &ExploreConfig::default())
}

/// Explores every state reachable from the solved cuboid of `dims` using
/// only `moves`.
///
/// # Errors
///
/// Fails if the cuboid cannot be built, if one of `moves` cannot act on it
/// (a quarter turn of a rectangular face), or if the number of states exceeds
/// `config.max_nodes`.
pub fn explore_with(
    dims: Dimensions,
    moves: MoveSet,
    config: &ExploreConfig,
) -> Result<StateGraph, ExploreError> {
    let start = Instant::now();
    let root = Cube::from_dimensions(dims, moves).map_err(CubeError::from)?;
    let limit = config.max_nodes.unwrap_or(usize::MAX);

    let discovery = if config.parallel {
        explore_parallel(root, moves, limit)?
    } else {
        explore_sequential(root, moves, limit)?
    };

    let graph = StateGraph::from_discovery(discovery.nodes, discovery.edges, discovery.generated);

    info!(
        "Explored the {dims} cuboid under {moves}: {} states, {} edges, {} self-loops in {:.2?}",
        graph.node_count(),
        graph.edge_count(),
        graph.self_loop_count(),
        start.elapsed()
    );

    Ok(graph)
}

/// States in discovery order, with the root at index zero, and the edge labels
/// keyed by unordered pairs of discovery indices
struct Discovery {
    nodes: Vec<Cube>,
    edges: FxHashMap<(usize, usize), MoveSet>,
    generated: usize,
}

fn pair(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

fn explore_sequential(root: Cube, moves: MoveSet, limit: usize) -> Result<Discovery, ExploreError> {
    if limit == 0 {
        return Err(ExploreError::ResourceExceeded { limit });
    }

    // The only long-lived copy of each state is its key here; the frontier
    // holds clones of one level at a time
    let mut seen: FxHashMap<Cube, usize> = FxHashMap::default();
    let mut edges: FxHashMap<(usize, usize), MoveSet> = FxHashMap::default();
    let mut generated = 1;

    seen.insert(root.clone(), 0);
    let mut frontier = vec![(0, root)];
    let mut depth = 0;

    while !frontier.is_empty() {
        debug!(
            "Depth {depth}: expanding {} states, {} seen so far",
            frontier.len(),
            seen.len()
        );

        for (from, cube) in mem::take(&mut frontier) {
            for move_ in moves.iter() {
                let turned = cube.apply(move_)?;
                generated += 1;

                let next_id = seen.len();
                let to = match seen.entry(turned) {
                    hash_map::Entry::Occupied(entry) => *entry.get(),
                    hash_map::Entry::Vacant(entry) => {
                        if next_id >= limit {
                            return Err(ExploreError::ResourceExceeded { limit });
                        }

                        trace!("New state {next_id} by {move_} from state {from}");
                        frontier.push((next_id, entry.key().clone()));
                        entry.insert(next_id);
                        next_id
                    }
                };

                edges.entry(pair(from, to)).or_default().insert(move_);
            }
        }

        depth += 1;
    }

    Ok(Discovery {
        nodes: in_discovery_order(seen),
        edges,
        generated,
    })
}

fn in_discovery_order(seen: impl IntoIterator<Item = (Cube, usize)>) -> Vec<Cube> {
    seen.into_iter()
        .sorted_unstable_by_key(|(_, id)| *id)
        .map(|(cube, _)| cube)
        .collect()
}

fn explore_parallel(root: Cube, moves: MoveSet, limit: usize) -> Result<Discovery, ExploreError> {
    if limit == 0 {
        return Err(ExploreError::ResourceExceeded { limit });
    }

    let seen: DashMap<Cube, usize, FxBuildHasher> = DashMap::with_hasher(FxBuildHasher::default());
    let edges: DashMap<(usize, usize), MoveSet, FxBuildHasher> =
        DashMap::with_hasher(FxBuildHasher::default());
    let next_id = AtomicUsize::new(1);
    let generated = AtomicUsize::new(1);

    seen.insert(root.clone(), 0);
    let mut frontier = vec![(0, root)];
    let mut depth = 0;

    while !frontier.is_empty() {
        debug!(
            "Depth {depth}: expanding {} states in parallel, {} seen so far",
            frontier.len(),
            seen.len()
        );

        frontier = frontier
            .par_iter()
            .map(|(from, cube)| -> Result<Vec<(usize, Cube)>, ExploreError> {
                let mut fresh = Vec::new();

                for move_ in moves.iter() {
                    let turned = cube.apply(move_)?;
                    generated.fetch_add(1, Ordering::Relaxed);

                    let to = match seen.entry(turned) {
                        Entry::Occupied(entry) => *entry.get(),
                        Entry::Vacant(entry) => {
                            let id = next_id.fetch_add(1, Ordering::Relaxed);
                            if id >= limit {
                                return Err(ExploreError::ResourceExceeded { limit });
                            }

                            trace!("New state {id} by {move_} from state {from}");
                            fresh.push((id, entry.key().clone()));
                            entry.insert(id);
                            id
                        }
                    };

                    edges.entry(pair(*from, to)).or_default().insert(move_);
                }

                Ok(fresh)
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect();

        depth += 1;
    }

    Ok(Discovery {
        nodes: in_discovery_order(seen),
        edges: edges.into_iter().collect(),
        generated: generated.into_inner(),
    })
}
