use std::collections::BTreeSet;

use forkmaze::maze::{AdjacencyMaze, Maze, Vertex};
use forkmaze::search::{ForkPolicy, Solver, SolverConfig};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Dfs;
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Case {
    vertices: usize,
    edges: Vec<(Vertex, Vertex)>,
    goals: Vec<Vertex>,
    fork_after: i64,
    policy: ForkPolicy,
    wait: bool,
}

fn case() -> impl Strategy<Value = Case> {
    (2usize..48).prop_flat_map(|n| {
        (
            Just(n),
            proptest::collection::vec((0..n, 0..n), 0..n * 2),
            proptest::collection::vec(1..n, 0..3),
            -1i64..4,
            prop_oneof![Just(ForkPolicy::Depth), Just(ForkPolicy::Branch)],
            any::<bool>(),
        )
            .prop_map(|(vertices, edges, goals, fork_after, policy, wait)| Case {
                vertices,
                edges,
                goals,
                fork_after,
                policy,
                wait,
            })
    })
}

fn oracle(case: &Case) -> UnGraph<(), ()> {
    let mut graph = UnGraph::<(), ()>::with_capacity(case.vertices, case.edges.len());
    for _ in 0..case.vertices {
        graph.add_node(());
    }
    for &(a, b) in &case.edges {
        graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
    }
    graph
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn solve_agrees_with_reachability(case in case()) {
        let maze = AdjacencyMaze::from_undirected_edges(case.vertices, &case.edges, 0, &case.goals);
        let graph = oracle(&case);
        let goal_reachable = case
            .goals
            .iter()
            .any(|&g| has_path_connecting(&graph, NodeIndex::new(0), NodeIndex::new(g), None));

        let config = SolverConfig::new(case.fork_after, case.policy).with_wait(case.wait);
        let report = Solver::new(config).unwrap().search(&maze).unwrap();

        // No vertex is ever claimed by two tasks.
        let mut claimed = BTreeSet::new();
        for task in &report.tasks {
            for &v in &task.claimed {
                prop_assert!(claimed.insert(v), "vertex {} claimed twice", v);
            }
        }

        match &report.path {
            Some(path) => {
                prop_assert!(goal_reachable);
                prop_assert_eq!(path.first(), Some(&0));
                prop_assert!(maze.is_goal(*path.last().unwrap()));
                for w in path.windows(2) {
                    prop_assert!(maze.has_edge(w[0], w[1]), "{:?} is not an edge", w);
                }
                prop_assert_eq!(report.tasks.iter().filter(|t| t.claimed.contains(path.last().unwrap())).count(), 1);
            }
            None => {
                prop_assert!(!goal_reachable);
                let mut dfs = Dfs::new(&graph, NodeIndex::new(0));
                let mut component = Vec::new();
                while let Some(nx) = dfs.next(&graph) {
                    component.push(nx.index());
                }
                component.sort_unstable();
                prop_assert_eq!(&report.visited, &component);
            }
        }
    }

    #[test]
    fn sequential_and_forked_both_find_a_path(case in case()) {
        let maze = AdjacencyMaze::from_undirected_edges(case.vertices, &case.edges, 0, &case.goals);
        let sequential = Solver::new(SolverConfig::sequential()).unwrap().solve(&maze).unwrap();
        let forked = Solver::new(SolverConfig::new(1, case.policy).with_wait(case.wait))
            .unwrap()
            .solve(&maze)
            .unwrap();
        prop_assert_eq!(sequential.is_some(), forked.is_some());
    }
}
