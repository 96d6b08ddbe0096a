//! A graph maze in compressed sparse row form.
//!
//! Layout:
//! - `offsets`: `Vec<usize>` of length `n + 1`
//! - `edges`: contiguous `usize` edge list, neighbors of `u` are `edges[offsets[u]..offsets[u + 1]]`
//! - `goals`: one flag per vertex

use super::{AgentId, AgentTrails, Maze, Vertex};

/// A maze over an arbitrary directed graph.
///
/// ### Performance Characteristics
/// | Operation | Complexity | Notes |
/// |-----------|------------|-------|
/// | `from_adjacency` | \(O(n + m)\) | Builds CSR from adjacency list |
/// | `from_undirected_edges` | \(O(n + m)\) | Inserts both directions |
/// | `neighbors` | \(O(1)\) | Returns iterator over out-neighbors |
/// | `is_goal` | \(O(1)\) | Flag lookup |
/// | `has_edge` | \(O(\text{out-degree})\) | Linear scan of neighbors |
#[derive(Debug)]
pub struct AdjacencyMaze {
    offsets: Vec<usize>,
    edges: Vec<Vertex>,
    goals: Vec<bool>,
    start: Vertex,
    trails: AgentTrails,
}

impl AdjacencyMaze {
    /// Builds a maze from an adjacency list.
    ///
    /// # Panics
    ///
    /// Panics if any edge, goal, or the start references a vertex out of bounds.
    pub fn from_adjacency(adjacency: &[Vec<Vertex>], start: Vertex, goals: &[Vertex]) -> Self {
        let n = adjacency.len();
        assert!(start < n, "start {start} is out of bounds for n={n}");

        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0);

        let mut total_edges = 0usize;
        for nbrs in adjacency {
            total_edges = total_edges.saturating_add(nbrs.len());
            offsets.push(total_edges);
        }

        let mut edges = Vec::with_capacity(total_edges);
        for (u, nbrs) in adjacency.iter().enumerate() {
            for &v in nbrs {
                assert!(v < n, "edge {u}->{v} is out of bounds for n={n}");
                edges.push(v);
            }
        }

        let mut goal_flags = vec![false; n];
        for &g in goals {
            assert!(g < n, "goal {g} is out of bounds for n={n}");
            goal_flags[g] = true;
        }

        Self {
            offsets,
            edges,
            goals: goal_flags,
            start,
            trails: AgentTrails::default(),
        }
    }

    /// Builds a maze with `n` vertices where every `(a, b)` pair is walkable
    /// in both directions.
    ///
    /// # Panics
    ///
    /// Panics if any edge, goal, or the start references a vertex out of bounds.
    pub fn from_undirected_edges(
        n: usize,
        edges: &[(Vertex, Vertex)],
        start: Vertex,
        goals: &[Vertex],
    ) -> Self {
        let mut adjacency = vec![Vec::new(); n];
        for &(a, b) in edges {
            assert!(a < n && b < n, "edge {a}-{b} is out of bounds for n={n}");
            adjacency[a].push(b);
            if a != b {
                adjacency[b].push(a);
            }
        }
        Self::from_adjacency(&adjacency, start, goals)
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether `from -> to` is an edge.
    pub fn has_edge(&self, from: Vertex, to: Vertex) -> bool {
        self.neighbor_slice(from).contains(&to)
    }

    /// Stops recording agent movement, e.g. for mazes searched many times.
    #[must_use]
    pub fn without_agent_trails(mut self) -> Self {
        self.trails = AgentTrails::disabled();
        self
    }

    /// Vertices each registered agent has occupied, in order, indexed by
    /// [`AgentId`].
    pub fn agent_trails(&self) -> Vec<Vec<Vertex>> {
        self.trails.snapshot()
    }

    #[inline]
    fn neighbor_slice(&self, vertex: Vertex) -> &[Vertex] {
        &self.edges[self.offsets[vertex]..self.offsets[vertex + 1]]
    }
}

impl Maze for AdjacencyMaze {
    fn vertex_count(&self) -> usize {
        self.goals.len()
    }

    fn start(&self) -> Vertex {
        self.start
    }

    fn neighbors(&self, vertex: Vertex) -> impl Iterator<Item = Vertex> + '_ {
        self.neighbor_slice(vertex).iter().copied()
    }

    fn is_goal(&self, vertex: Vertex) -> bool {
        self.goals[vertex]
    }

    fn place_agent(&self, vertex: Vertex) -> AgentId {
        self.trails.place(vertex)
    }

    fn move_agent(&self, agent: AgentId, vertex: Vertex) {
        self.trails.record(agent, vertex);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csr_layout_matches_adjacency() {
        // 0 -> 1, 2
        // 1 -> 2
        // 2 ->
        let maze = AdjacencyMaze::from_adjacency(&[vec![1, 2], vec![2], vec![]], 0, &[2]);
        assert_eq!(maze.vertex_count(), 3);
        assert_eq!(maze.edge_count(), 3);
        assert_eq!(maze.neighbors(0).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(maze.neighbors(1).collect::<Vec<_>>(), vec![2]);
        assert!(maze.neighbors(2).next().is_none());
        assert!(maze.has_edge(0, 2));
        assert!(!maze.has_edge(2, 0));
        assert!(maze.is_goal(2));
        assert!(!maze.is_goal(0));
    }

    #[test]
    fn neighbors_are_restartable() {
        let maze = AdjacencyMaze::from_undirected_edges(3, &[(0, 1), (0, 2)], 0, &[]);
        let first: Vec<_> = maze.neighbors(0).collect();
        let second: Vec<_> = maze.neighbors(0).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn undirected_edges_go_both_ways() {
        let maze = AdjacencyMaze::from_undirected_edges(3, &[(0, 1), (1, 2), (2, 2)], 0, &[2]);
        assert!(maze.has_edge(1, 0));
        assert!(maze.has_edge(2, 1));
        assert_eq!(maze.neighbors(2).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn rejects_out_of_bounds_edge() {
        let _ = AdjacencyMaze::from_adjacency(&[vec![3]], 0, &[]);
    }

    #[test]
    #[should_panic(expected = "start 2 is out of bounds")]
    fn rejects_out_of_bounds_start() {
        let _ = AdjacencyMaze::from_adjacency(&[vec![], vec![]], 2, &[]);
    }

    #[test]
    fn agents_record_their_trails() {
        let maze = AdjacencyMaze::from_undirected_edges(3, &[(0, 1), (1, 2)], 0, &[2]);
        let a = maze.place_agent(0);
        maze.move_agent(a, 1);
        maze.move_agent(a, 2);
        assert_eq!(maze.agent_trails(), vec![vec![0, 1, 2]]);
    }
}
