use forkmaze::maze::{GridMaze, Maze, Vertex};
use forkmaze::search::{ForkPolicy, Solver, SolverConfig};

const CORRIDORS: &str = "\
S.....#.........
.####.#.#######.
.#....#.#.....#.
.#.####.#.###.#.
.#......#...#.#.
.########.#.#.#.
..........#...#G
";

const SEALED: &str = "\
S..#...
.#.#.G.
...#...
";

fn assert_walkable(maze: &GridMaze, path: &[Vertex]) {
    assert_eq!(path.first(), Some(&maze.start()));
    assert!(maze.is_goal(*path.last().unwrap()));
    for w in path.windows(2) {
        assert!(maze.is_step(w[0], w[1]), "{:?} -> {:?}", maze.position(w[0]), maze.position(w[1]));
    }
}

#[test]
fn corridors_are_solved_by_every_policy() {
    let configs = [
        SolverConfig::sequential(),
        SolverConfig::new(1, ForkPolicy::Branch),
        SolverConfig::new(4, ForkPolicy::Depth),
        SolverConfig::new(1, ForkPolicy::Depth).with_wait(true),
    ];
    for config in configs {
        let maze = GridMaze::parse(CORRIDORS).unwrap();
        let path = Solver::new(config.clone())
            .unwrap()
            .solve(&maze)
            .unwrap()
            .unwrap_or_else(|| panic!("{config:?}"));
        assert_walkable(&maze, &path);
        assert_eq!(*path.last().unwrap(), maze.vertex_at(6, 15));
    }
}

#[test]
fn sealed_goal_is_unreachable() {
    let maze = GridMaze::parse(SEALED).unwrap();
    let report = Solver::new(SolverConfig::new(1, ForkPolicy::Branch))
        .unwrap()
        .search(&maze)
        .unwrap();
    assert_eq!(report.path, None);
    // The three open columns left of the wall, minus the wall at (1, 1).
    assert_eq!(report.visited.len(), 8);
    assert!(report.visited.iter().all(|&v| maze.position(v).1 < 3));
}

#[test]
fn rendered_path_marks_the_route() {
    let maze = GridMaze::parse("S..\n##.\nG..\n").unwrap();
    let path = Solver::new(SolverConfig::sequential())
        .unwrap()
        .solve(&maze)
        .unwrap()
        .unwrap();
    assert_eq!(path.len(), 7);
    assert_eq!(maze.render(&path), "Soo\n##o\nGoo\n");
}

#[test]
fn agents_only_visit_open_cells() {
    let maze = GridMaze::parse(CORRIDORS).unwrap();
    Solver::new(SolverConfig::new(1, ForkPolicy::Branch))
        .unwrap()
        .solve(&maze)
        .unwrap();
    let trails = maze.agent_trails();
    assert!(!trails.is_empty());
    assert_eq!(trails[0].first(), Some(&maze.start()));
    for trail in trails {
        assert!(trail.iter().all(|&v| !maze.is_wall(v)));
    }
}
