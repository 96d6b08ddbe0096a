//! Fork/join search tasks.
//!
//! A task walks `INIT -> RUNNING -> {FOUND | EXHAUSTED} -> JOINING -> DONE`:
//!
//! - **INIT** rejects seeds another task already claimed, then places an agent.
//! - **RUNNING** pops the local frontier, claims through the [`Ledger`], and
//!   routes unvisited neighbors through the [`ForkPlanner`].
//! - **JOINING** is the single `rayon::scope` of the search: every task is
//!   spawned onto it, so no task ever blocks a worker on its own children and
//!   stack depth stays flat however long the chain of forks grows. In wait
//!   mode a forking task suspends itself instead, and the last child of the
//!   batch to finish spawns its continuation.
//! - **DONE** records what the task did. Once the scope ends, results are
//!   folded bottom-up: each task reports its own path, or else the first
//!   child path in spawn order, or else no path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::frontier::{Entry, Frontier};
use super::ledger::Ledger;
use super::policy::{ForkPlanner, ForkPolicy, Granularity, SolverConfig};
use crate::maze::{AgentId, Maze, Vertex};

/// Identifier of a search task, unique within one search. The root is `TaskId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub usize);

/// How a task finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
    /// The task claimed a goal and was first to raise the found flag.
    Found,
    /// The task found nothing itself but a child's path passed through it.
    Propagated,
    /// Neither the task nor any of its children produced a path.
    NoPath,
    /// The seed vertex was already claimed when the task started.
    Rejected,
}

/// What one task did during a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    /// This task.
    pub id: TaskId,
    /// The task that forked it; `None` for the root.
    pub parent: Option<TaskId>,
    /// The vertex the task was seeded with.
    pub origin: Vertex,
    /// Vertices this task claimed, in claim order.
    pub claimed: Vec<Vertex>,
    /// Tasks this task forked, in spawn order.
    pub children: Vec<TaskId>,
    /// How the task finished.
    pub outcome: TaskOutcome,
}

impl TaskSummary {
    /// Whether this task returned a path to its parent.
    pub fn reported_path(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Found | TaskOutcome::Propagated)
    }
}

/// Result of a whole search.
#[derive(Debug, Clone)]
pub(crate) struct TaskReport {
    pub(crate) path: Option<Vec<Vertex>>,
    pub(crate) summaries: Vec<TaskSummary>,
}

/// A finished task, before child results are folded in.
struct TaskRecord {
    summary: TaskSummary,
    found: Option<Vec<Vertex>>,
}

/// State shared by every task of one top-level search.
pub(crate) struct SearchContext<'m, M: Maze> {
    pub(crate) maze: &'m M,
    pub(crate) ledger: Ledger,
    policy: ForkPolicy,
    granularity: Granularity,
    wait_for_children: bool,
    next_task: AtomicUsize,
    records: Mutex<Vec<TaskRecord>>,
}

impl<'m, M: Maze> SearchContext<'m, M> {
    /// Creates a fresh ledger for `maze`.
    ///
    /// The caller has checked that the maze's start is in bounds.
    pub(crate) fn new(maze: &'m M, config: &SolverConfig) -> Self {
        Self {
            maze,
            ledger: Ledger::new(maze.vertex_count(), maze.start()),
            policy: config.policy,
            granularity: config.granularity(),
            wait_for_children: config.wait_for_children,
            next_task: AtomicUsize::new(0),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Runs the root task and everything it forks to completion.
    pub(crate) fn run_root(&self) -> TaskReport {
        let root = SearchTask::new(
            self,
            self.allocate_id(),
            None,
            Entry::root(self.maze.start()),
            None,
        );
        rayon::scope(|scope| root.start(scope));
        self.assemble()
    }

    fn allocate_id(&self) -> TaskId {
        TaskId(self.next_task.fetch_add(1, Ordering::Relaxed))
    }

    fn record(&self, record: TaskRecord) {
        self.lock_records().push(record);
    }

    // A poisoned lock means a task panicked; the scope rethrows that panic
    // before anyone reads the records.
    fn lock_records(&self) -> MutexGuard<'_, Vec<TaskRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Folds child paths into their parents, in spawn order.
    ///
    /// Children always carry larger ids than their parent, so walking ids in
    /// descending order sees every child before its parent.
    fn assemble(&self) -> TaskReport {
        let task_count = self.next_task.load(Ordering::Acquire);
        let mut slots: Vec<Option<TaskRecord>> = (0..task_count).map(|_| None).collect();
        for record in std::mem::take(&mut *self.lock_records()) {
            let index = record.summary.id.0;
            slots[index] = Some(record);
        }

        let mut paths: Vec<Option<Vec<Vertex>>> = vec![None; task_count];
        let mut summaries = Vec::with_capacity(task_count);
        for TaskRecord { mut summary, found } in slots.into_iter().rev().flatten() {
            let mut path = found;
            if path.is_none() {
                path = summary
                    .children
                    .iter()
                    .find_map(|child| paths[child.0].take());
                if path.is_some() {
                    summary.outcome = TaskOutcome::Propagated;
                }
            }
            if !summary.children.is_empty() {
                tracing::debug!(
                    task = summary.id.0,
                    children = summary.children.len(),
                    found = path.is_some(),
                    "joined"
                );
            }
            paths[summary.id.0] = path;
            summaries.push(summary);
        }

        summaries.reverse();
        let path = paths.first_mut().and_then(Option::take);
        TaskReport { path, summaries }
    }
}

/// A task parked until the children of its last fork batch have finished.
struct Suspended<'c, M: Maze> {
    pending: AtomicUsize,
    task: Mutex<Option<SearchTask<'c, M>>>,
}

impl<'c, M: Maze> Suspended<'c, M> {
    /// Called once by each child of the batch; the last one resumes the parent.
    fn child_done<'s>(&self, scope: &rayon::Scope<'s>)
    where
        'c: 's,
    {
        if self.pending.fetch_sub(1, Ordering::AcqRel) != 1 {
            return;
        }
        let parked = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = parked {
            scope.spawn(move |scope| task.resume(scope));
        }
    }
}

struct SearchTask<'c, M: Maze> {
    ctx: &'c SearchContext<'c, M>,
    id: TaskId,
    parent: Option<TaskId>,
    origin: Vertex,
    agent: AgentId,
    frontier: Frontier,
    planner: ForkPlanner,
    claimed: Vec<Vertex>,
    children: Vec<TaskId>,
    waiter: Option<Arc<Suspended<'c, M>>>,
}

impl<'c, M: Maze> SearchTask<'c, M> {
    fn new(
        ctx: &'c SearchContext<'c, M>,
        id: TaskId,
        parent: Option<TaskId>,
        seed: Entry,
        waiter: Option<Arc<Suspended<'c, M>>>,
    ) -> Self {
        Self {
            ctx,
            id,
            parent,
            origin: seed.vertex,
            agent: AgentId::UNTRACKED,
            frontier: Frontier::seeded(seed),
            planner: ForkPlanner::new(ctx.policy, ctx.granularity),
            claimed: Vec::new(),
            children: Vec::new(),
            waiter,
        }
    }

    fn start<'s>(mut self, scope: &rayon::Scope<'s>)
    where
        'c: 's,
    {
        let ctx = self.ctx;
        let ledger = &ctx.ledger;
        if ledger.is_found() {
            return self.finish(scope, TaskOutcome::NoPath, None);
        }
        if ledger.is_visited(self.origin) {
            tracing::trace!(task = self.id.0, origin = self.origin, "seed already claimed");
            return self.finish(scope, TaskOutcome::Rejected, None);
        }
        self.agent = ctx.maze.place_agent(self.origin);
        self.resume(scope);
    }

    fn resume<'s>(mut self, scope: &rayon::Scope<'s>)
    where
        'c: 's,
    {
        let ctx = self.ctx;
        let ledger = &ctx.ledger;

        while !ledger.is_found() {
            let Some(entry) = self.frontier.pop() else {
                break;
            };
            let current = entry.vertex;
            ctx.maze.move_agent(self.agent, current);

            if !ledger.try_claim(current, entry.predecessor) {
                tracing::trace!(task = self.id.0, vertex = current, "lost claim");
                continue;
            }
            self.claimed.push(current);
            self.planner.record_claim();

            if ctx.maze.is_goal(current) {
                let mut found = None;
                if ledger.raise_found() {
                    found = ledger.path_to(current);
                    tracing::info!(task = self.id.0, goal = current, "goal reached");
                }
                let outcome = if found.is_some() {
                    TaskOutcome::Found
                } else {
                    TaskOutcome::NoPath
                };
                return self.finish(scope, outcome, found);
            }
            if ledger.is_found() {
                break;
            }

            let candidates: Vec<Vertex> = ctx
                .maze
                .neighbors(current)
                .filter(|&n| !ledger.is_visited(n))
                .collect();
            let forked = self.planner.plan(&mut self.frontier, current, candidates);
            if forked.is_empty() {
                continue;
            }

            tracing::debug!(
                task = self.id.0,
                vertex = current,
                forks = forked.len(),
                pending = self.frontier.len(),
                "forking"
            );
            if ctx.wait_for_children {
                return self.suspend(scope, forked);
            }
            for seed in forked {
                let child = self.fork(seed, None);
                scope.spawn(move |scope| child.start(scope));
            }
        }

        self.finish(scope, TaskOutcome::NoPath, None);
    }

    /// Parks this task until every child of `forked` has finished.
    fn suspend<'s>(mut self, scope: &rayon::Scope<'s>, forked: Vec<Entry>)
    where
        'c: 's,
    {
        let parked = Arc::new(Suspended {
            pending: AtomicUsize::new(forked.len()),
            task: Mutex::new(None),
        });
        let batch: Vec<Self> = forked
            .into_iter()
            .map(|seed| self.fork(seed, Some(Arc::clone(&parked))))
            .collect();
        *parked.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(self);
        for child in batch {
            scope.spawn(move |scope| child.start(scope));
        }
    }

    fn fork(&mut self, seed: Entry, waiter: Option<Arc<Suspended<'c, M>>>) -> Self {
        let id = self.ctx.allocate_id();
        self.children.push(id);
        Self::new(self.ctx, id, Some(self.id), seed, waiter)
    }

    fn finish<'s>(
        self,
        scope: &rayon::Scope<'s>,
        outcome: TaskOutcome,
        found: Option<Vec<Vertex>>,
    ) where
        'c: 's,
    {
        let Self {
            ctx,
            id,
            parent,
            origin,
            claimed,
            children,
            waiter,
            ..
        } = self;
        ctx.record(TaskRecord {
            summary: TaskSummary {
                id,
                parent,
                origin,
                claimed,
                children,
                outcome,
            },
            found,
        });
        if let Some(waiter) = waiter {
            waiter.child_done(scope);
        }
    }
}
