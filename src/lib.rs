//! # `forkmaze` - Parallel Fork/Join Maze Search
//!
//! Finds a path from a maze's start vertex to any goal vertex with a
//! depth-first search that forks concurrent sub-searches as the frontier
//! branches, and stops every branch as soon as one of them reaches a goal.
//!
//! ## Guarantees
//!
//! - **One claim per vertex**: a vertex is explored by at most one task per
//!   search. Ownership is taken through a single atomic claim on the shared
//!   [`Ledger`](search::Ledger); losing a claim race is an ordinary outcome.
//! - **Fixed predecessors**: a vertex's predecessor is written once, by the
//!   task that claimed it, so path reconstruction is deterministic and
//!   always terminates.
//! - **One winner**: the found flag flips exactly once; only the task that
//!   flipped it reports a path, and that path is joined up through every
//!   ancestor to the root.
//! - **No speculative "no path"**: the root reports "no path" only after the
//!   whole task tree has wound down.
//!
//! Shortest paths are *not* guaranteed; any valid path may be returned.
//!
//! ## Architecture
//!
//! 1. **Maze** ([`maze::Maze`]): the collaborator contract (neighbors,
//!    goals, observation-only agents) plus two reference mazes.
//! 2. **Ledger** ([`search::Ledger`]): lock-free visited bitset,
//!    first-writer-wins predecessor slots, and the found flag.
//! 3. **Frontier** ([`search::Frontier`]): a per-task LIFO stack.
//! 4. **Fork policy** ([`search::ForkPlanner`]): depth-based or
//!    branch-based routing of discovered neighbors.
//! 5. **Tasks** ([`search::task`]): tasks spawned onto one rayon scope per
//!    search, whose results are joined in spawn order after the scope ends.
//!
//! ## Example
//!
//! ```rust
//! use forkmaze::maze::GridMaze;
//! use forkmaze::search::{ForkPolicy, Solver, SolverConfig};
//!
//! let maze = GridMaze::parse("S..#\n.#..\n...G\n").unwrap();
//! let solver = Solver::new(SolverConfig::new(2, ForkPolicy::Branch)).unwrap();
//! let path = solver.solve(&maze).unwrap().expect("goal is reachable");
//!
//! assert_eq!(path.first(), Some(&maze.vertex_at(0, 0)));
//! assert_eq!(path.last(), Some(&maze.vertex_at(2, 3)));
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![forbid(unsafe_code)]

pub mod concurrency;
pub mod maze;
pub mod search;
mod sync;

pub use maze::{AdjacencyMaze, GridMaze, Maze, Vertex};
pub use search::{solve, ForkPolicy, SearchReport, SolveError, Solver, SolverConfig};
