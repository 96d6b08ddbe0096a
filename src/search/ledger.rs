//! The shared visitation ledger.
//!
//! One ledger exists per top-level search and is shared by reference with
//! every task of that search. It records:
//! - which vertices have been claimed (an [`AtomicBitset`])
//! - the predecessor each vertex was claimed from (one `AtomicUsize` slot per vertex)
//! - whether any task has reached a goal (a cache-padded flag)
//!
//! Both structures are append-only: bits are only ever set, and a predecessor
//! slot is written at most once.

use crossbeam_utils::CachePadded;

use crate::concurrency::AtomicBitset;
use crate::maze::Vertex;
use crate::sync::{AtomicBool, AtomicUsize, Ordering};

const NO_PREDECESSOR: usize = usize::MAX;

/// Visited set, predecessor map and found flag of one search.
pub struct Ledger {
    start: Vertex,
    visited: AtomicBitset,
    predecessors: Vec<AtomicUsize>,
    found: CachePadded<AtomicBool>,
}

impl Ledger {
    /// Creates an empty ledger for a maze of `vertex_count` vertices searched
    /// from `start`.
    ///
    /// # Panics
    /// Panics if `start >= vertex_count`.
    pub fn new(vertex_count: usize, start: Vertex) -> Self {
        assert!(
            start < vertex_count,
            "start {start} is out of bounds for {vertex_count} vertices"
        );
        Self {
            start,
            visited: AtomicBitset::new(vertex_count),
            predecessors: (0..vertex_count)
                .map(|_| AtomicUsize::new(NO_PREDECESSOR))
                .collect(),
            found: CachePadded::new(AtomicBool::new(false)),
        }
    }

    /// The global start vertex.
    #[inline]
    pub fn start(&self) -> Vertex {
        self.start
    }

    /// Number of vertices the ledger covers.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.visited.len_bits()
    }

    /// Takes ownership of `vertex` for the calling task.
    ///
    /// Returns `false` without touching anything if the vertex was already
    /// claimed. Otherwise marks it visited, records `predecessor` if the
    /// vertex has none yet, and returns `true`. Among any number of
    /// concurrent callers for one vertex exactly one gets `true`.
    ///
    /// The visited bit is the linearization point: only the task that flips
    /// it ever writes the predecessor slot, so the slot cannot be raced.
    ///
    /// # Panics
    /// Panics if `vertex` or `predecessor` is out of bounds.
    pub fn try_claim(&self, vertex: Vertex, predecessor: Option<Vertex>) -> bool {
        if let Some(p) = predecessor {
            assert!(p < self.vertex_count(), "predecessor {p} is out of bounds");
        }
        if !self.visited.test_and_set(vertex, Ordering::AcqRel) {
            return false;
        }
        if let Some(p) = predecessor {
            // First writer wins; a later write for the same key is a no-op.
            let _ = self.predecessors[vertex].compare_exchange(
                NO_PREDECESSOR,
                p,
                Ordering::Release,
                Ordering::Relaxed,
            );
        }
        true
    }

    /// Whether `vertex` has been claimed by any task.
    #[inline]
    pub fn is_visited(&self, vertex: Vertex) -> bool {
        self.visited.is_set(vertex)
    }

    /// The vertex `vertex` was claimed from, if any.
    pub fn predecessor(&self, vertex: Vertex) -> Option<Vertex> {
        match self.predecessors[vertex].load(Ordering::Acquire) {
            NO_PREDECESSOR => None,
            p => Some(p),
        }
    }

    /// Every claimed vertex, ascending.
    pub fn visited_vertices(&self) -> Vec<Vertex> {
        self.visited.ones()
    }

    /// Number of claimed vertices.
    pub fn claimed_count(&self) -> usize {
        self.visited.count_ones()
    }

    /// Raises the found flag. Returns `true` only for the call that flipped it.
    #[inline]
    pub fn raise_found(&self) -> bool {
        !self.found.swap(true, Ordering::AcqRel)
    }

    /// Whether some task has reached a goal.
    #[inline]
    pub fn is_found(&self) -> bool {
        self.found.load(Ordering::Acquire)
    }

    /// Reconstructs the path from the start to `goal` by walking predecessors.
    ///
    /// Returns `None` if the predecessor chain of `goal` does not lead back
    /// to the start, which only happens when `goal` was never claimed. The
    /// walk is bounded by the vertex count, so it terminates even on a
    /// corrupted chain.
    pub fn path_to(&self, goal: Vertex) -> Option<Vec<Vertex>> {
        let mut path = vec![goal];
        let mut current = goal;
        for _ in 0..self.vertex_count() {
            if current == self.start {
                path.reverse();
                return Some(path);
            }
            current = self.predecessor(current)?;
            path.push(current);
        }
        None
    }
}

impl core::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ledger")
            .field("start", &self.start)
            .field("visited", &self.visited)
            .field("found", &self.is_found())
            .finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn claim_is_exclusive() {
        let ledger = Ledger::new(4, 0);
        assert!(ledger.try_claim(0, None));
        assert!(!ledger.try_claim(0, None));
        assert!(ledger.try_claim(1, Some(0)));
        assert!(!ledger.try_claim(1, Some(2)));
        assert!(ledger.is_visited(1));
        assert!(!ledger.is_visited(2));
        assert_eq!(ledger.claimed_count(), 2);
    }

    #[test]
    fn failed_claim_leaves_predecessor_untouched() {
        let ledger = Ledger::new(4, 0);
        assert!(ledger.try_claim(0, None));
        assert!(ledger.try_claim(2, Some(0)));
        assert!(!ledger.try_claim(2, Some(3)));
        assert_eq!(ledger.predecessor(2), Some(0));
        assert_eq!(ledger.predecessor(0), None);
    }

    #[test]
    fn path_walks_back_to_start() {
        let ledger = Ledger::new(5, 0);
        ledger.try_claim(0, None);
        ledger.try_claim(3, Some(0));
        ledger.try_claim(1, Some(3));
        ledger.try_claim(4, Some(1));
        assert_eq!(ledger.path_to(4), Some(vec![0, 3, 1, 4]));
        assert_eq!(ledger.path_to(0), Some(vec![0]));
    }

    #[test]
    fn path_to_unclaimed_vertex_is_none() {
        let ledger = Ledger::new(3, 0);
        ledger.try_claim(0, None);
        assert_eq!(ledger.path_to(2), None);
    }

    #[test]
    fn found_flag_flips_once() {
        let ledger = Ledger::new(1, 0);
        assert!(!ledger.is_found());
        assert!(ledger.raise_found());
        assert!(!ledger.raise_found());
        assert!(ledger.is_found());
    }

    #[test]
    fn concurrent_claims_have_one_winner() {
        const N: usize = 256;
        let ledger = Ledger::new(N, 0);
        let winners: Vec<Vec<Vertex>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let ledger = &ledger;
                    scope.spawn(move || {
                        (0..N)
                            .filter(|&v| ledger.try_claim(v, Some((v + t) % N)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mut all: Vec<Vertex> = winners.into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, (0..N).collect::<Vec<_>>());
    }

    #[test]
    #[should_panic(expected = "start 3 is out of bounds")]
    fn rejects_out_of_bounds_start() {
        let _ = Ledger::new(3, 3);
    }
}
