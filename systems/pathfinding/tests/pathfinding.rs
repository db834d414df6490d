use horde_core::{TileCoord, Traversal, TraversalGrid};
use horde_system_pathfinding::{find_path, Pathfinder};

fn grid_from_rows(rows: &[&str]) -> TraversalGrid {
    let columns = rows[0].len() as u32;
    let cells = rows
        .iter()
        .flat_map(|row| row.chars())
        .map(|symbol| match symbol {
            '#' => Traversal::Blocked,
            '+' => Traversal::NearWall,
            _ => Traversal::Free,
        })
        .collect();
    TraversalGrid::from_cells(columns, rows.len() as u32, 32.0, cells).expect("grid")
}

fn assert_connected(grid: &TraversalGrid, path: &[TileCoord]) {
    for pair in path.windows(2) {
        assert_eq!(pair[0].chebyshev_distance(pair[1]), 1, "{pair:?} are not adjacent");
        assert!(grid.is_walkable(pair[1]));
    }
}

#[test]
fn path_runs_from_start_to_goal() {
    let grid = grid_from_rows(&["....", "....", "...."]);
    let start = TileCoord::new(0, 0);
    let goal = TileCoord::new(3, 2);
    let path = find_path(&grid, start, goal).expect("route exists");

    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&goal));
    assert_eq!(path.len(), 4, "two diagonals and one straight step");
    assert_connected(&grid, &path);
}

#[test]
fn identical_endpoints_have_no_path() {
    let grid = grid_from_rows(&["...", "..."]);
    assert_eq!(find_path(&grid, TileCoord::new(1, 1), TileCoord::new(1, 1)), None);
}

#[test]
fn blocked_or_outside_endpoints_have_no_path() {
    let grid = grid_from_rows(&[".#.", "..."]);
    assert_eq!(find_path(&grid, TileCoord::new(0, 0), TileCoord::new(1, 0)), None);
    assert_eq!(find_path(&grid, TileCoord::new(1, 0), TileCoord::new(0, 0)), None);
    assert_eq!(find_path(&grid, TileCoord::new(0, 0), TileCoord::new(9, 9)), None);
}

#[test]
fn enclosed_goal_is_unreachable() {
    let grid = grid_from_rows(&[".....", ".###.", ".#.#.", ".###.", "....."]);
    assert_eq!(find_path(&grid, TileCoord::new(0, 0), TileCoord::new(2, 2)), None);
}

#[test]
fn diagonal_steps_never_cut_corners() {
    let grid = grid_from_rows(&["..#", ".#.", "..."]);
    let path = find_path(&grid, TileCoord::new(0, 0), TileCoord::new(2, 2)).expect("route");
    assert_connected(&grid, &path);
    for pair in path.windows(2) {
        let dc = i64::from(pair[1].column()) - i64::from(pair[0].column());
        let dr = i64::from(pair[1].row()) - i64::from(pair[0].row());
        if dc != 0 && dr != 0 {
            let horizontal = TileCoord::new(pair[1].column(), pair[0].row());
            let vertical = TileCoord::new(pair[0].column(), pair[1].row());
            assert!(grid.is_walkable(horizontal) && grid.is_walkable(vertical));
        }
    }
}

#[test]
fn near_wall_tiles_are_avoided_when_cheaper_routes_exist() {
    let grid = grid_from_rows(&[".....", "+++++", ".....", "....."]);
    let path = find_path(&grid, TileCoord::new(0, 0), TileCoord::new(4, 0)).expect("route");
    assert!(path.iter().all(|tile| tile.row() == 0));
}

#[test]
fn repeated_queries_return_identical_paths() {
    let grid = grid_from_rows(&[
        "........",
        "..##....",
        "..#..#..",
        "....##..",
        "........",
    ]);
    let start = TileCoord::new(0, 4);
    let goal = TileCoord::new(7, 0);
    let first = find_path(&grid, start, goal).expect("route");
    for _ in 0..5 {
        assert_eq!(find_path(&grid, start, goal).as_ref(), Some(&first));
    }
}

#[test]
fn pathfinder_resolves_requests_in_order_within_budget() {
    let grid = grid_from_rows(&["....", "....", "...."]);
    let mut pathfinder = Pathfinder::new(2);
    let tickets: Vec<_> = (0..3)
        .map(|column| pathfinder.request(TileCoord::new(0, 0), TileCoord::new(column + 1, 2)))
        .collect();

    let first = pathfinder.calculate(&grid);
    assert_eq!(
        first.iter().map(|result| result.ticket).collect::<Vec<_>>(),
        tickets[..2].to_vec()
    );
    assert!(first.iter().all(|result| result.path.is_some()));
    assert_eq!(pathfinder.pending(), 1);

    let second = pathfinder.calculate(&grid);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].ticket, tickets[2]);
    assert!(pathfinder.calculate(&grid).is_empty());
}

#[test]
fn unreachable_requests_resolve_to_none() {
    let grid = grid_from_rows(&[".#.", ".#.", ".#."]);
    let mut pathfinder = Pathfinder::default();
    let ticket = pathfinder.request(TileCoord::new(0, 0), TileCoord::new(2, 2));
    let results = pathfinder.calculate(&grid);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].ticket, ticket);
    assert_eq!(results[0].path, None);
}
