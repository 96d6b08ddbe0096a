//! The maze collaborator consumed by the search core.
//!
//! The solver never looks at how a maze is laid out. It only needs to know
//! how many vertices exist, where the search starts, which vertices are
//! adjacent, and which vertices are goals. Agent placement is purely an
//! observation hook (e.g. for animation) and has no effect on the result.
//!
//! Two reference mazes are provided:
//! - [`AdjacencyMaze`]: an arbitrary graph in compressed sparse row form
//! - [`GridMaze`]: a 4-connected grid parsed from ASCII text

pub mod adjacency;
pub mod grid;

pub use adjacency::AdjacencyMaze;
pub use grid::{GridMaze, ParseMazeError};

/// Opaque vertex identifier. Vertices of a maze are the dense range
/// `0..Maze::vertex_count()`.
pub type Vertex = usize;

/// Handle to an exploring agent registered with a maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub usize);

impl AgentId {
    /// Handle returned by mazes that do not track agents.
    pub const UNTRACKED: AgentId = AgentId(usize::MAX);
}

/// Capabilities a maze must expose to be searched.
///
/// Implementations are shared by every search task at once, so they must be
/// `Sync`. Agent bookkeeping therefore needs interior mutability.
pub trait Maze: Sync {
    /// Number of vertices. Every vertex the maze hands out is below this bound.
    fn vertex_count(&self) -> usize;

    /// The vertex the search starts from.
    fn start(&self) -> Vertex;

    /// Vertices adjacent to `vertex`.
    ///
    /// Each call yields a fresh, finite iterator.
    fn neighbors(&self, vertex: Vertex) -> impl Iterator<Item = Vertex> + '_;

    /// Whether `vertex` is a goal.
    fn is_goal(&self, vertex: Vertex) -> bool;

    /// Registers a new agent at `vertex`.
    fn place_agent(&self, vertex: Vertex) -> AgentId {
        let _ = vertex;
        AgentId::UNTRACKED
    }

    /// Moves `agent` to `vertex`.
    fn move_agent(&self, agent: AgentId, vertex: Vertex) {
        let _ = (agent, vertex);
    }
}

/// Per-agent movement log shared by the reference mazes.
#[derive(Debug)]
pub(crate) struct AgentTrails {
    enabled: bool,
    trails: std::sync::Mutex<Vec<Vec<Vertex>>>,
}

impl Default for AgentTrails {
    fn default() -> Self {
        Self {
            enabled: true,
            trails: std::sync::Mutex::default(),
        }
    }
}

impl AgentTrails {
    pub(crate) fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub(crate) fn place(&self, vertex: Vertex) -> AgentId {
        if !self.enabled {
            return AgentId::UNTRACKED;
        }
        let mut trails = self.lock();
        trails.push(vec![vertex]);
        AgentId(trails.len() - 1)
    }

    pub(crate) fn record(&self, agent: AgentId, vertex: Vertex) {
        if let Some(trail) = self.lock().get_mut(agent.0) {
            trail.push(vertex);
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<Vec<Vertex>> {
        self.lock().clone()
    }

    // A poisoned log only means some other task panicked mid-push; the
    // trails are still usable for observation.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<Vertex>>> {
        self.trails
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
