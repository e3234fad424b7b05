use std::collections::VecDeque;

use dstar_nav::{DStarPlanner, Grid, GridView, PlanError, Position};

fn p(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

/// Breadth-first distance in steps, used as the ground truth.
fn bfs_distance(grid: &Grid, start: Position, goal: Position) -> Option<usize> {
    if !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return None;
    }
    let mut seen = vec![start];
    let mut queue = VecDeque::from([(start, 0usize)]);
    while let Some((cell, dist)) = queue.pop_front() {
        if cell == goal {
            return Some(dist);
        }
        for n in cell.neighbors() {
            if grid.is_walkable(n) && !seen.contains(&n) {
                seen.push(n);
                queue.push_back((n, dist + 1));
            }
        }
    }
    None
}

fn assert_valid_path(grid: &Grid, path: &[Position], start: Position, goal: Position) {
    assert_eq!(path.first().copied(), Some(start));
    assert_eq!(path.last().copied(), Some(goal));
    for cell in path {
        assert!(grid.is_walkable(*cell), "{cell} is blocked");
    }
    for pair in path.windows(2) {
        assert!(pair[0].is_adjacent(pair[1]), "{} -> {}", pair[0], pair[1]);
    }
}

const MAZE: &str = "\
OOOOOOOOOO
OWWWWWWWWO
OWOOOOOOWO
OWOWWWWOWO
OOOWOOWOWO
WWWWOOWOWO
OOOOOOWOOO
OWWWWWWWWO
OOOOOOOOOO
";

#[test]
fn nav_grid_finds_shortest_path_around_blockers() {
    let mut grid = Grid::new(5, 5).expect("grid");

    // Vertical wall with a single gap.
    for y in 0..5 {
        if y == 2 {
            continue;
        }
        grid.set_blocked(p(2, y), true);
    }

    let mut planner = DStarPlanner::default();
    let path = planner.find_path(&grid, p(0, 0), p(4, 4));

    assert_valid_path(&grid, &path, p(0, 0), p(4, 4));
    assert!(path.contains(&p(2, 2)));
    assert_eq!(Some(path.len() - 1), bfs_distance(&grid, p(0, 0), p(4, 4)));
}

#[test]
fn nav_grid_matches_bfs_on_maze() {
    let grid: Grid = MAZE.parse().expect("maze");
    let mut planner = DStarPlanner::default();

    let goal = p(4, 4);
    for start in grid.walkable_cells() {
        let path = planner.find_path(&grid, start, goal);
        match bfs_distance(&grid, start, goal) {
            Some(dist) => {
                assert_valid_path(&grid, &path, start, goal);
                assert_eq!(path.len() - 1, dist, "from {start}");
            }
            None => assert!(path.is_empty(), "from {start}"),
        }
    }
}

#[test]
fn nav_grid_is_deterministic_for_same_input() {
    let mut grid = Grid::new(10, 10).expect("grid");
    for y in 0..10 {
        grid.set_blocked(p(5, y), true);
    }
    grid.set_blocked(p(5, 5), false);

    let a = DStarPlanner::default().find_path(&grid, p(1, 1), p(8, 8));
    let b = DStarPlanner::default().find_path(&grid, p(1, 1), p(8, 8));

    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn open_grid_scenario_is_monotone() {
    let grid = Grid::new(5, 5).expect("grid");
    let path = DStarPlanner::default().find_path(&grid, p(0, 0), p(4, 4));

    assert_eq!(path.len(), 9);
    for pair in path.windows(2) {
        assert!(pair[1].x + pair[1].y >= pair[0].x + pair[0].y);
    }
}

#[test]
fn blocking_center_after_plan_reroutes() {
    let mut grid = Grid::new(5, 5).expect("grid");
    let mut planner = DStarPlanner::default();
    planner.find_path(&grid, p(0, 0), p(4, 4));

    grid.toggle(p(2, 2));
    planner.update_edge(&grid, p(2, 2));
    let path = planner.reconstruct_path(&grid, p(0, 0), p(4, 4));

    assert!(!path.contains(&p(2, 2)));
    assert!(path.len() >= 9);
    assert_valid_path(&grid, &path, p(0, 0), p(4, 4));
}

#[test]
fn goal_change_matches_fresh_plan() {
    let grid = Grid::new(5, 5).expect("grid");
    let mut planner = DStarPlanner::default();
    planner.find_path(&grid, p(0, 0), p(4, 4));

    let replanned = planner.reconstruct_path(&grid, p(0, 0), p(0, 4));
    let fresh = DStarPlanner::default().find_path(&grid, p(0, 0), p(0, 4));

    assert_eq!(replanned, fresh);
    assert_eq!(planner.goal(), Some(p(0, 4)));
}

#[test]
fn wall_without_detour_yields_no_path() {
    let mut grid = Grid::new(5, 5).expect("grid");
    let mut planner = DStarPlanner::default();
    assert!(!planner.find_path(&grid, p(0, 0), p(4, 4)).is_empty());

    for y in 0..5 {
        grid.toggle(p(2, y));
        planner.update_edge(&grid, p(2, y));
    }

    assert!(planner.reconstruct_path(&grid, p(0, 0), p(4, 4)).is_empty());
    assert!(DStarPlanner::default()
        .find_path(&grid, p(0, 0), p(4, 4))
        .is_empty());
    assert_eq!(
        DStarPlanner::default().try_find_path(&grid, p(0, 0), p(4, 4)),
        Err(PlanError::Unreachable {
            start: p(0, 0),
            goal: p(4, 4)
        })
    );
}

#[test]
fn reconstruct_twice_is_idempotent() {
    let grid: Grid = MAZE.parse().expect("maze");
    let mut planner = DStarPlanner::default();
    planner.find_path(&grid, p(0, 0), p(9, 8));

    let a = planner.reconstruct_path(&grid, p(0, 0), p(9, 8));
    let b = planner.reconstruct_path(&grid, p(0, 0), p(9, 8));

    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn reconstruct_follows_moving_start_without_replan() {
    let grid = Grid::new(6, 6).expect("grid");
    let mut planner = DStarPlanner::default();
    let path = planner.find_path(&grid, p(0, 0), p(5, 5));

    // Agent advanced three cells along its path.
    let moved = path[3];
    let rest = planner.reconstruct_path(&grid, moved, p(5, 5));

    assert_eq!(rest, path[3..].to_vec());
    assert_eq!(planner.last_stats().expansions, 0);
    assert_eq!(planner.start(), Some(moved));
}

#[test]
fn uninitialized_reconstruct_runs_full_plan() {
    let grid = Grid::new(3, 3).expect("grid");
    let mut planner = DStarPlanner::default();

    let path = planner.reconstruct_path(&grid, p(0, 0), p(2, 0));

    assert_eq!(path, vec![p(0, 0), p(1, 0), p(2, 0)]);
    assert!(planner.is_initialized());
}

/// Single corridor sweeping every even row, joined by one-cell gaps at alternating ends.
fn serpentine(width: u32, height: u32) -> Grid {
    let mut grid = Grid::new(width, height).expect("grid");
    let right = width as i32 - 1;
    for y in (1..height as i32).step_by(2) {
        let gap = if (y / 2) % 2 == 0 { right } else { 0 };
        for x in (0..=right).filter(|x| *x != gap) {
            grid.set_blocked(p(x, y), true);
        }
    }
    grid
}

#[test]
fn long_serpentine_corridor_is_walked_end_to_end() {
    let grid = serpentine(201, 201);
    let (start, goal) = (p(0, 0), p(200, 200));
    let mut planner = DStarPlanner::default();

    let path = planner.find_path(&grid, start, goal);

    // 101 rows of 200 steps plus 100 two-step turns.
    assert_eq!(path.len(), 101 * 200 + 100 * 2 + 1);
    assert_valid_path(&grid, &path, start, goal);
    assert_eq!(planner.open_len(), 0);
}
