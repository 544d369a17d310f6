use std::collections::HashSet;

use cuboid_core::{Cube, CubeError, Dimensions, Move, MoveSet, TopologyError};
use itertools::Itertools;
use pretty_assertions::assert_eq;
use state_graph::{
    ExploreConfig, ExploreError, GraphError, NodeId, Part, StateGraph, explore, explore_with,
};

fn moves(text: &str) -> MoveSet {
    text.parse().unwrap()
}

fn id_after(graph: &StateGraph, dims: Dimensions, sequence: &str) -> NodeId {
    let cube = Cube::solved(dims).unwrap().apply_str(sequence).unwrap();
    graph.id_of(&cube).unwrap()
}

#[test_log::test]
fn two_commuting_half_turns() {
    let dims = Dimensions::new(3, 2, 1);
    let graph = explore(dims, moves("R2 L2")).unwrap();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.self_loop_count(), 0);

    let solved = id_after(&graph, dims, "");
    let right = id_after(&graph, dims, "R2");
    let left = id_after(&graph, dims, "L2");
    let both = id_after(&graph, dims, "R2 L2");

    assert_eq!(graph.root(), solved);
    assert_eq!(both, id_after(&graph, dims, "L2 R2"));

    assert_eq!(graph.labels(solved, right), Some(moves("R2")));
    assert_eq!(graph.labels(left, solved), Some(moves("L2")));
    assert_eq!(graph.labels(right, both), Some(moves("L2")));
    assert_eq!(graph.labels(solved, both), None);

    let mut expected = vec![right, left];
    expected.sort();
    assert_eq!(graph.neighbors(solved).unwrap(), expected.as_slice());

    let parts = graph.bipartition().unwrap();
    assert_eq!(parts.even.len(), 2);
    assert_eq!(parts.odd.len(), 2);
    assert_eq!(parts.side(solved), parts.side(both));
    assert_ne!(parts.side(solved), parts.side(right));

    let mut opposite = parts.opposite(solved).unwrap().to_vec();
    opposite.sort();
    assert_eq!(opposite, expected);
}

#[test_log::test]
fn quarter_turns_of_one_face_form_a_cycle() {
    let dims = Dimensions::new(2, 2, 2);
    let graph = explore(dims, moves("U")).unwrap();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 4);

    for id in (0..4).map(NodeId) {
        assert_eq!(graph.neighbors(id).unwrap().len(), 2);
    }
    for edge in graph.edges() {
        assert_eq!(edge.moves, moves("U"));
    }

    let parts = graph.bipartition().unwrap();
    let root_side = parts.side(graph.root()).unwrap();
    assert_eq!(parts.side(id_after(&graph, dims, "U2")), Some(root_side));
    assert_eq!(parts.side(id_after(&graph, dims, "U'")), Some(root_side.other()));
    assert_eq!(parts.part(Part::Even).len(), 2);
}

#[test_log::test]
fn inverse_moves_share_an_edge() {
    let dims = Dimensions::new(2, 2, 2);
    let graph = explore(dims, moves("U U'")).unwrap();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 4);
    for edge in graph.edges() {
        assert_eq!(edge.moves, moves("U U'"));
    }
}

#[test_log::test]
fn all_turns_of_one_face_form_a_complete_graph() {
    let dims = Dimensions::new(2, 2, 2);
    let graph = explore(dims, moves("U U2 U'")).unwrap();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 6);

    let solved = graph.root();
    let quarter = id_after(&graph, dims, "U");
    let half = id_after(&graph, dims, "U2");
    let three_quarters = id_after(&graph, dims, "U'");

    assert_eq!(graph.labels(solved, quarter), Some(moves("U U'")));
    assert_eq!(graph.labels(quarter, half), Some(moves("U U'")));
    assert_eq!(graph.labels(solved, half), Some(moves("U2")));
    assert_eq!(graph.labels(quarter, three_quarters), Some(moves("U2")));

    assert!(matches!(
        graph.bipartition(),
        Err(GraphError::NotBipartite { a, b }) if a < b
    ));
}

#[test_log::test]
fn half_turn_group_of_a_cube() {
    // <R2, U2> is dihedral of order 12
    let dims = Dimensions::new(3, 3, 3);
    let graph = explore(dims, moves("R2 U2")).unwrap();

    assert_eq!(graph.node_count(), 12);
    assert_eq!(graph.edge_count(), 12);

    let parts = graph.bipartition().unwrap();
    assert_eq!(parts.even.len(), 6);
    assert_eq!(parts.odd.len(), 6);
    for edge in graph.edges() {
        assert_ne!(parts.side(edge.a), parts.side(edge.b));
    }

    let antipode = id_after(&graph, dims, "R2 U2 R2 U2 R2 U2");
    assert_eq!(antipode, id_after(&graph, dims, "U2 R2 U2 R2 U2 R2"));
}

#[test_log::test]
fn no_moves_leaves_only_the_solved_state() {
    let graph = explore(Dimensions::new(4, 3, 2), MoveSet::EMPTY).unwrap();

    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.node(graph.root()).unwrap().is_solved());

    let parts = graph.bipartition().unwrap();
    assert_eq!(parts.even, vec![NodeId(0)]);
    assert_eq!(parts.opposite(NodeId(0)), Some(&[][..]));
}

#[test_log::test]
fn states_are_distinct() {
    let dims = Dimensions::new(3, 2, 1);
    let graph = explore(dims, moves("R2 U2 D2")).unwrap();

    let unique = graph.nodes().iter().collect::<HashSet<_>>();
    assert_eq!(unique.len(), graph.node_count());
    assert!(graph.node_count() <= graph.generated());

    for (i, cube) in graph.nodes().iter().enumerate() {
        assert_eq!(graph.id_of(cube), Some(NodeId(i)));
    }

    for edge in graph.edges() {
        let from = graph.node(edge.a).unwrap();
        let to = graph.node(edge.b).unwrap();
        for move_ in edge.moves.iter() {
            let forward = from.apply(move_).unwrap() == *to;
            let backward = to.apply(move_).unwrap() == *from;
            assert!(forward || backward, "{move_} does not join {} and {}", edge.a, edge.b);
        }
    }
}

#[test_log::test]
fn parallel_matches_sequential() {
    for (dims, allowed) in [
        (Dimensions::new(3, 2, 1), moves("R2 U2 D2")),
        (Dimensions::new(3, 3, 3), moves("R2 U2")),
        (Dimensions::new(2, 2, 2), moves("U U2 U'")),
    ] {
        let sequential = explore(dims, allowed).unwrap();
        let parallel = explore_with(
            dims,
            allowed,
            &ExploreConfig {
                parallel: true,
                ..ExploreConfig::default()
            },
        )
        .unwrap();

        assert_eq!(sequential.nodes(), parallel.nodes(), "{dims} {allowed}");
        assert_eq!(sequential.edges(), parallel.edges(), "{dims} {allowed}");
        assert_eq!(sequential.root(), parallel.root());
        assert_eq!(sequential.generated(), parallel.generated());
    }
}

#[test_log::test]
fn node_bound_is_enforced() {
    let dims = Dimensions::new(3, 3, 3);

    for parallel in [false, true] {
        let bounded = |max_nodes| ExploreConfig {
            max_nodes: Some(max_nodes),
            parallel,
        };

        assert!(matches!(
            explore_with(dims, moves("R2 U2"), &bounded(5)),
            Err(ExploreError::ResourceExceeded { limit: 5 })
        ));
        assert!(matches!(
            explore_with(dims, moves("R2 U2"), &bounded(0)),
            Err(ExploreError::ResourceExceeded { limit: 0 })
        ));
        assert_eq!(
            explore_with(dims, moves("R2 U2"), &bounded(12))
                .unwrap()
                .node_count(),
            12
        );
    }

    let unbounded = ExploreConfig {
        max_nodes: None,
        parallel: false,
    };
    assert_eq!(
        explore_with(dims, moves("R2 U2"), &unbounded)
            .unwrap()
            .node_count(),
        12
    );
}

#[test_log::test]
fn quarter_turn_of_a_rectangle_is_rejected() {
    let result = explore(Dimensions::new(3, 2, 1), moves("R"));

    assert!(matches!(
        result,
        Err(ExploreError::Cube(CubeError::Topology(
            TopologyError::QuarterTurnOnRectangle { .. }
        )))
    ));
}

#[test_log::test]
fn edge_list_format() {
    let dims = Dimensions::new(3, 3, 3);
    let graph = explore(dims, moves("R2 U2")).unwrap();

    let mut out = Vec::new();
    graph.write_edge_list(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let mut lines = text.lines();

    assert_eq!(lines.next(), Some("12 12"));

    let pairs = lines
        .map(|line| {
            line.split(' ')
                .map(|n| n.parse::<usize>().unwrap())
                .collect_tuple::<(_, _)>()
                .unwrap()
        })
        .collect_vec();

    assert_eq!(pairs.len(), graph.edge_count());
    assert!(pairs.iter().all(|(u, v)| u < v && *v < graph.node_count()));
    assert!(pairs.is_sorted());

    let path = std::env::temp_dir().join(format!("cuboid-edges-{}.txt", std::process::id()));
    graph.save_edge_list(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
    std::fs::remove_file(path).unwrap();
}

#[test_log::test]
fn unknown_nodes_are_reported() {
    let graph = explore(Dimensions::new(2, 2, 2), moves("U")).unwrap();

    assert_eq!(graph.node(NodeId(4)), Err(GraphError::UnknownNode(NodeId(4))));
    assert_eq!(
        graph.neighbors(NodeId(9)),
        Err(GraphError::UnknownNode(NodeId(9)))
    );

    let scrambled = Cube::solved(Dimensions::new(2, 2, 2))
        .unwrap()
        .apply(Move::ALL[3])
        .unwrap();
    assert_eq!(graph.id_of(&scrambled), None);
}
