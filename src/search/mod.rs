//! Parallel fork/join depth-first search.
//!
//! Every call to [`Solver::search`] builds a fresh search context with its
//! own [`Ledger`], runs a root task on the solver's rayon pool, and drops the context
//! before returning. Nothing leaks from one search into the next, and
//! concurrent searches over different (or the same) mazes do not interfere.
//!
//! ```
//! use forkmaze::maze::AdjacencyMaze;
//! use forkmaze::search::{solve, ForkPolicy};
//!
//! // 0 - 1 - 2, goal at 2
//! let maze = AdjacencyMaze::from_undirected_edges(3, &[(0, 1), (1, 2)], 0, &[2]);
//! let path = solve(&maze, 1, ForkPolicy::Branch).unwrap();
//! assert_eq!(path, Some(vec![0, 1, 2]));
//! ```

pub mod error;
pub mod frontier;
pub mod ledger;
pub mod policy;
pub mod task;

pub use error::SolveError;
pub use frontier::{Entry, Frontier};
pub use ledger::Ledger;
pub use policy::{ForkPlanner, ForkPolicy, Granularity, SolverConfig};
pub use task::{TaskId, TaskOutcome, TaskSummary};

use task::SearchContext;

use crate::maze::{Maze, Vertex};

/// Everything one search produced.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Path from the start to a goal, if any goal is reachable.
    pub path: Option<Vec<Vertex>>,
    /// One summary per task, ordered by task id (the root first).
    pub tasks: Vec<TaskSummary>,
    /// Every vertex claimed during the search, ascending.
    pub visited: Vec<Vertex>,
}

impl SearchReport {
    /// The task that reached the goal.
    pub fn winner(&self) -> Option<&TaskSummary> {
        self.tasks.iter().find(|t| t.outcome == TaskOutcome::Found)
    }

    /// Summary of task `id`.
    pub fn task(&self, id: TaskId) -> Option<&TaskSummary> {
        self.tasks
            .binary_search_by_key(&id, |t| t.id)
            .ok()
            .map(|index| &self.tasks[index])
    }

    /// The root task's summary.
    pub fn root(&self) -> Option<&TaskSummary> {
        self.task(TaskId(0))
    }

    /// Summaries of the tasks `id` forked, in spawn order.
    pub fn children_of(&self, id: TaskId) -> Vec<&TaskSummary> {
        self.task(id)
            .map(|t| t.children.iter().filter_map(|&c| self.task(c)).collect())
            .unwrap_or_default()
    }
}

/// Worker stack size used when the configuration does not set one.
///
/// Tasks never block on each other, so a worker's stack holds one task at a
/// time however deep the task tree grows.
pub const DEFAULT_STACK_SIZE: usize = 8 * 1024 * 1024;

/// A configured maze solver.
///
/// Owns a dedicated rayon pool; searches started from any thread run on it.
pub struct Solver {
    config: SolverConfig,
    pool: rayon::ThreadPool,
}

impl Solver {
    /// Validates `config` and builds the worker pool it describes.
    pub fn new(config: SolverConfig) -> Result<Self, SolveError> {
        config.validate()?;
        let mut builder = rayon::ThreadPoolBuilder::new()
            .thread_name(|i| format!("forkmaze-{i}"))
            .stack_size(config.stack_size.unwrap_or(DEFAULT_STACK_SIZE));
        if let Some(threads) = config.threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;
        Ok(Self { config, pool })
    }

    /// The configuration this solver was built with.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Searches `maze` and returns a path from its start to a goal, or
    /// `None` when no goal is reachable.
    pub fn solve<M: Maze>(&self, maze: &M) -> Result<Option<Vec<Vertex>>, SolveError> {
        self.search(maze).map(|report| report.path)
    }

    /// Searches `maze` and returns the path together with per-task detail.
    pub fn search<M: Maze>(&self, maze: &M) -> Result<SearchReport, SolveError> {
        let vertex_count = maze.vertex_count();
        let start = maze.start();
        if vertex_count == 0 {
            return Err(SolveError::EmptyMaze);
        }
        if start >= vertex_count {
            return Err(SolveError::StartOutOfRange {
                start,
                vertex_count,
            });
        }

        let span = tracing::info_span!(
            "search",
            vertices = vertex_count,
            start,
            policy = ?self.config.policy,
            fork_after = self.config.fork_after
        );
        let _enter = span.enter();

        let ctx = SearchContext::new(maze, &self.config);
        let report = self.pool.install(|| ctx.run_root());

        let mut tasks = report.summaries;
        tasks.sort_by_key(|t| t.id);
        let visited = ctx.ledger.visited_vertices();

        tracing::debug!(
            tasks = tasks.len(),
            claimed = visited.len(),
            found = report.path.is_some(),
            "search finished"
        );

        Ok(SearchReport {
            path: report.path,
            tasks,
            visited,
        })
    }
}

/// Searches `maze`, forking with `policy` every `fork_after` claims.
///
/// `fork_after <= 0` runs a purely sequential depth-first search.
pub fn solve<M: Maze>(
    maze: &M,
    fork_after: i64,
    policy: ForkPolicy,
) -> Result<Option<Vec<Vertex>>, SolveError> {
    Solver::new(SolverConfig::new(fork_after, policy))?.solve(maze)
}
