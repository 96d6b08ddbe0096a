//! Per-task LIFO frontier.
//!
//! A frontier is owned by exactly one task and never shared, so it is a plain
//! `Vec` used as a stack.

use crate::maze::Vertex;

/// A vertex waiting to be explored, with the vertex that discovered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// The vertex to explore.
    pub vertex: Vertex,
    /// The vertex it was discovered from; `None` only for the global start.
    pub predecessor: Option<Vertex>,
}

impl Entry {
    /// The entry that seeds a whole search.
    pub fn root(start: Vertex) -> Self {
        Self {
            vertex: start,
            predecessor: None,
        }
    }

    /// An entry for `vertex` discovered from `predecessor`.
    pub fn discovered(vertex: Vertex, predecessor: Vertex) -> Self {
        Self {
            vertex,
            predecessor: Some(predecessor),
        }
    }
}

/// Depth-first frontier: the most recently pushed entry is popped first.
#[derive(Debug, Default)]
pub struct Frontier {
    stack: Vec<Entry>,
    high_water: usize,
}

impl Frontier {
    /// Creates an empty frontier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only `entry`.
    pub fn seeded(entry: Entry) -> Self {
        let mut frontier = Self::new();
        frontier.push(entry);
        frontier
    }

    /// Pushes an entry.
    pub fn push(&mut self, entry: Entry) {
        self.stack.push(entry);
        self.high_water = self.high_water.max(self.stack.len());
    }

    /// Pops the most recently pushed entry.
    pub fn pop(&mut self) -> Option<Entry> {
        self.stack.pop()
    }

    /// Removes every entry except the most recently pushed one and returns
    /// them oldest first.
    pub fn split_off_older(&mut self) -> Vec<Entry> {
        let keep_from = self.stack.len().saturating_sub(1);
        let newest = self.stack.split_off(keep_from);
        core::mem::replace(&mut self.stack, newest)
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether no entries are pending.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Largest number of entries held at once.
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_lifo_order() {
        let mut f = Frontier::seeded(Entry::root(0));
        f.push(Entry::discovered(1, 0));
        f.push(Entry::discovered(2, 0));
        assert_eq!(f.pop(), Some(Entry::discovered(2, 0)));
        assert_eq!(f.pop(), Some(Entry::discovered(1, 0)));
        assert_eq!(f.pop(), Some(Entry::root(0)));
        assert_eq!(f.pop(), None);
        assert_eq!(f.high_water(), 3);
    }

    #[test]
    fn split_off_older_keeps_newest() {
        let mut f = Frontier::new();
        for v in 1..=4 {
            f.push(Entry::discovered(v, 0));
        }
        let older = f.split_off_older();
        assert_eq!(
            older.iter().map(|e| e.vertex).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(f.len(), 1);
        assert_eq!(f.pop(), Some(Entry::discovered(4, 0)));
    }

    #[test]
    fn split_off_older_on_small_frontiers() {
        let mut empty = Frontier::new();
        assert!(empty.split_off_older().is_empty());
        assert!(empty.is_empty());

        let mut single = Frontier::seeded(Entry::root(7));
        assert!(single.split_off_older().is_empty());
        assert_eq!(single.len(), 1);
    }
}
