//! A 4-connected grid maze parsed from ASCII text.
//!
//! | Char        | Cell  |
//! |-------------|-------|
//! | `#`         | wall  |
//! | `.` / space | open  |
//! | `S`         | start |
//! | `G` / `*`   | goal  |
//!
//! Cell `(row, col)` is vertex `row * cols + col`. Walls are vertices too, they
//! simply have no neighbors and are never listed as anyone's neighbor.

use super::{AgentId, AgentTrails, Maze, Vertex};

/// The error type for [`GridMaze::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseMazeError {
    /// The text contains no cells.
    Empty,
    /// No `S` cell was found.
    MissingStart,
    /// More than one `S` cell was found.
    MultipleStarts {
        /// Vertex of the first start.
        first: Vertex,
        /// Vertex of the second start.
        second: Vertex,
    },
    /// A row's width differs from the first row's.
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        found: usize,
    },
    /// A character outside the maze alphabet.
    UnknownCell {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        col: usize,
        /// The offending character.
        found: char,
    },
}

impl core::fmt::Display for ParseMazeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => f.write_str("maze text contains no cells"),
            Self::MissingStart => f.write_str("maze has no start cell 'S'"),
            Self::MultipleStarts { first, second } => {
                write!(f, "maze has more than one start cell (vertices {first} and {second})")
            }
            Self::RaggedRow { row, expected, found } => {
                write!(f, "row {row} has width {found}, expected {expected}")
            }
            Self::UnknownCell { row, col, found } => {
                write!(f, "unknown cell {found:?} at row {row}, column {col}")
            }
        }
    }
}

impl std::error::Error for ParseMazeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Wall,
    Open,
    Goal,
}

/// A rectangular grid maze.
#[derive(Debug)]
pub struct GridMaze {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: Vertex,
    trails: AgentTrails,
}

impl GridMaze {
    /// Parses a maze from text, one row per line.
    ///
    /// Trailing blank lines are ignored. Every remaining row must have the
    /// same width.
    pub fn parse(text: &str) -> Result<Self, ParseMazeError> {
        let mut lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        let rows = lines.len();
        let cols = lines.first().map_or(0, |l| l.chars().count());
        if rows == 0 || cols == 0 {
            return Err(ParseMazeError::Empty);
        }

        let mut cells = Vec::with_capacity(rows * cols);
        let mut start: Option<Vertex> = None;

        for (row, line) in lines.iter().enumerate() {
            let width = line.chars().count();
            if width != cols {
                return Err(ParseMazeError::RaggedRow {
                    row,
                    expected: cols,
                    found: width,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '#' => Cell::Wall,
                    '.' | ' ' => Cell::Open,
                    'G' | '*' => Cell::Goal,
                    'S' => {
                        let here = row * cols + col;
                        if let Some(first) = start {
                            return Err(ParseMazeError::MultipleStarts { first, second: here });
                        }
                        start = Some(here);
                        Cell::Open
                    }
                    found => return Err(ParseMazeError::UnknownCell { row, col, found }),
                };
                cells.push(cell);
            }
        }

        let start = start.ok_or(ParseMazeError::MissingStart)?;
        Ok(Self {
            rows,
            cols,
            cells,
            start,
            trails: AgentTrails::default(),
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Vertex of cell `(row, col)`.
    pub fn vertex_at(&self, row: usize, col: usize) -> Vertex {
        row * self.cols + col
    }

    /// Cell `(row, col)` of `vertex`.
    pub fn position(&self, vertex: Vertex) -> (usize, usize) {
        (vertex / self.cols, vertex % self.cols)
    }

    /// Whether `vertex` is a wall.
    pub fn is_wall(&self, vertex: Vertex) -> bool {
        self.cells[vertex] == Cell::Wall
    }

    /// Whether `a` and `b` are orthogonally adjacent open cells.
    pub fn is_step(&self, a: Vertex, b: Vertex) -> bool {
        if self.is_wall(a) || self.is_wall(b) {
            return false;
        }
        let (ra, ca) = self.position(a);
        let (rb, cb) = self.position(b);
        ra.abs_diff(rb) + ca.abs_diff(cb) == 1
    }

    /// Stops recording agent movement, e.g. for mazes searched many times.
    #[must_use]
    pub fn without_agent_trails(mut self) -> Self {
        self.trails = AgentTrails::disabled();
        self
    }

    /// Vertices each registered agent has occupied, in order.
    pub fn agent_trails(&self) -> Vec<Vec<Vertex>> {
        self.trails.snapshot()
    }

    /// Renders the maze back to text, marking `path` cells with `o`.
    pub fn render(&self, path: &[Vertex]) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for row in 0..self.rows {
            for col in 0..self.cols {
                let v = self.vertex_at(row, col);
                let ch = match self.cells[v] {
                    _ if v == self.start => 'S',
                    Cell::Goal => 'G',
                    Cell::Wall => '#',
                    Cell::Open if path.contains(&v) => 'o',
                    Cell::Open => '.',
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

impl Maze for GridMaze {
    fn vertex_count(&self) -> usize {
        self.cells.len()
    }

    fn start(&self) -> Vertex {
        self.start
    }

    fn neighbors(&self, vertex: Vertex) -> impl Iterator<Item = Vertex> + '_ {
        let (row, col) = self.position(vertex);
        let walled = self.is_wall(vertex);
        let candidates = [
            row.checked_sub(1).map(|r| (r, col)),
            (row + 1 < self.rows).then_some((row + 1, col)),
            col.checked_sub(1).map(|c| (row, c)),
            (col + 1 < self.cols).then_some((row, col + 1)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(move |_| !walled)
            .map(move |(r, c)| self.vertex_at(r, c))
            .filter(move |&v| !self.is_wall(v))
    }

    fn is_goal(&self, vertex: Vertex) -> bool {
        self.cells[vertex] == Cell::Goal
    }

    fn place_agent(&self, vertex: Vertex) -> AgentId {
        self.trails.place(vertex)
    }

    fn move_agent(&self, agent: AgentId, vertex: Vertex) {
        self.trails.record(agent, vertex);
    }
}
