//! Fork policy and solver configuration.
//!
//! The fork granularity `K` arrives as a signed integer (`fork_after`) and is
//! normalised exactly once into a [`Granularity`]; nothing below the top
//! level ever sees a non-positive value.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use super::frontier::{Entry, Frontier};
use super::SolveError;
use crate::maze::Vertex;

/// When a task hands frontier entries off to new child tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkPolicy {
    /// Every `K + 1` claims, fork all but the newest frontier entry.
    #[default]
    Depth,
    /// At every vertex with more than one unvisited neighbor, keep one
    /// neighbor and fork the rest.
    Branch,
}

/// Normalised fork granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Never fork; the search is sequential.
    Never,
    /// Fork is allowed after this many claims (`K`).
    After(NonZeroUsize),
}

impl Granularity {
    /// Maps `K <= 0` to [`Granularity::Never`].
    pub fn from_fork_after(fork_after: i64) -> Self {
        usize::try_from(fork_after)
            .ok()
            .and_then(NonZeroUsize::new)
            .map_or(Self::Never, Self::After)
    }

    /// Whether forking is enabled at all.
    pub fn forks(self) -> bool {
        matches!(self, Self::After(_))
    }
}

/// Configuration of one solver.
///
/// Deserialised with defaults for every missing field, so `{}` is a valid
/// (sequential) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Fork granularity `K`. `K <= 0` disables forking.
    pub fork_after: i64,
    /// Which fork policy to apply.
    pub policy: ForkPolicy,
    /// Whether a task waits for the children it just forked before it
    /// continues with its own frontier.
    pub wait_for_children: bool,
    /// Worker threads of the solver's pool. `None` lets rayon pick.
    pub threads: Option<usize>,
    /// Stack size of the pool's workers, in bytes. `None` uses
    /// [`DEFAULT_STACK_SIZE`](super::DEFAULT_STACK_SIZE).
    pub stack_size: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            fork_after: 0,
            policy: ForkPolicy::Depth,
            wait_for_children: false,
            threads: None,
            stack_size: None,
        }
    }
}

impl SolverConfig {
    /// A configuration forking with `policy` every `fork_after` claims.
    pub fn new(fork_after: i64, policy: ForkPolicy) -> Self {
        Self {
            fork_after,
            policy,
            ..Self::default()
        }
    }

    /// A configuration that never forks.
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Sets [`SolverConfig::wait_for_children`].
    #[must_use]
    pub fn with_wait(mut self, wait: bool) -> Self {
        self.wait_for_children = wait;
        self
    }

    /// Sets [`SolverConfig::threads`].
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Parses a JSON configuration and validates it.
    pub fn from_json(json: &str) -> Result<Self, SolveError> {
        let config: Self = serde_json::from_str(json).map_err(SolveError::Config)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that cannot be normalised.
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.threads == Some(0) {
            return Err(SolveError::InvalidConfig("threads must be > 0".into()));
        }
        if self.stack_size == Some(0) {
            return Err(SolveError::InvalidConfig("stack_size must be > 0".into()));
        }
        Ok(())
    }

    /// The normalised fork granularity.
    pub fn granularity(&self) -> Granularity {
        Granularity::from_fork_after(self.fork_after)
    }
}

/// Per-task fork decision state.
///
/// Owned by exactly one task; each child starts with a fresh planner.
#[derive(Debug, Clone)]
pub struct ForkPlanner {
    policy: ForkPolicy,
    granularity: Granularity,
    claims_since_fork: usize,
}

impl ForkPlanner {
    /// Creates a planner with its claim counter at zero.
    pub fn new(policy: ForkPolicy, granularity: Granularity) -> Self {
        Self {
            policy,
            granularity,
            claims_since_fork: 0,
        }
    }

    /// Records one successful claim by the owning task.
    pub fn record_claim(&mut self) {
        self.claims_since_fork += 1;
    }

    /// Routes the unvisited neighbors of `current` found by the owning task.
    ///
    /// Every candidate ends up in exactly one place: pushed onto `frontier`
    /// or returned for forking. Depth may also return older entries taken
    /// from the frontier.
    pub fn plan(
        &mut self,
        frontier: &mut Frontier,
        current: Vertex,
        candidates: Vec<Vertex>,
    ) -> Vec<Entry> {
        let mut entries = candidates
            .into_iter()
            .map(|v| Entry::discovered(v, current));

        let Granularity::After(k) = self.granularity else {
            entries.for_each(|e| frontier.push(e));
            return Vec::new();
        };

        match self.policy {
            ForkPolicy::Depth => {
                entries.for_each(|e| frontier.push(e));
                if self.claims_since_fork > k.get() && frontier.len() > 1 {
                    self.claims_since_fork = 0;
                    frontier.split_off_older()
                } else {
                    Vec::new()
                }
            }
            ForkPolicy::Branch => {
                if let Some(kept) = entries.next() {
                    frontier.push(kept);
                }
                entries.collect()
            }
        }
    }
}
