use horde_core::{TileCoord, Traversal};
use horde_system_grid_builder::{build, build_or_impassable, GridError, LayerSet, TileLayer};

fn map_with_wall_at(column: u32, row: u32) -> LayerSet {
    let mut walls = TileLayer::empty("walls", 5, 5);
    walls.set(TileCoord::new(column, row), true);
    [
        TileLayer::empty("ground", 5, 5),
        walls,
        TileLayer::empty("obstacles", 5, 5),
    ]
    .into_iter()
    .collect()
}

#[test]
fn classifies_blocked_near_wall_and_free_tiles() {
    let layers = map_with_wall_at(2, 2);
    let grid = build(&layers, &["walls", "obstacles"], 32.0).expect("grid builds");

    assert_eq!(grid.traversal(TileCoord::new(2, 2)), Traversal::Blocked);
    for (column, row) in [(1, 1), (2, 1), (3, 1), (1, 2), (3, 2), (1, 3), (2, 3), (3, 3)] {
        assert_eq!(
            grid.traversal(TileCoord::new(column, row)),
            Traversal::NearWall,
            "tile ({column}, {row}) touches the wall",
        );
    }
    assert_eq!(grid.traversal(TileCoord::new(0, 0)), Traversal::Free);
    assert_eq!(grid.traversal(TileCoord::new(4, 4)), Traversal::Free);
}

#[test]
fn tiles_in_any_obstacle_layer_block() {
    let mut layers = map_with_wall_at(0, 0);
    let mut rocks = TileLayer::empty("rocks", 5, 5);
    rocks.set(TileCoord::new(4, 4), true);
    layers.push(rocks);

    let grid = build(&layers, &["walls", "rocks"], 16.0).expect("grid builds");
    assert_eq!(grid.traversal(TileCoord::new(0, 0)), Traversal::Blocked);
    assert_eq!(grid.traversal(TileCoord::new(4, 4)), Traversal::Blocked);
    assert_eq!(grid.tile_length(), 16.0);
}

#[test]
fn non_obstacle_layers_are_ignored() {
    let mut ground = TileLayer::empty("ground", 3, 3);
    ground.set(TileCoord::new(1, 1), true);
    let layers: LayerSet = [ground, TileLayer::empty("walls", 3, 3)].into_iter().collect();

    let grid = build(&layers, &["walls"], 32.0).expect("grid builds");
    assert_eq!(grid.traversal(TileCoord::new(1, 1)), Traversal::Free);
}

#[test]
fn missing_layer_is_reported() {
    let layers: LayerSet = [TileLayer::empty("ground", 4, 4)].into_iter().collect();
    assert_eq!(
        build(&layers, &["walls"], 32.0),
        Err(GridError::MissingLayer(String::from("walls")))
    );
}

#[test]
fn missing_layer_falls_back_to_impassable_grid() {
    let layers: LayerSet = [TileLayer::empty("ground", 4, 3)].into_iter().collect();
    let grid = build_or_impassable(&layers, &["walls"], 32.0);

    assert_eq!((grid.columns(), grid.rows()), (4, 3));
    assert!((0..3).all(|row| (0..4).all(|column| !grid.is_walkable(TileCoord::new(column, row)))));
}

#[test]
fn mismatched_dimensions_are_reported() {
    let layers: LayerSet = [TileLayer::empty("ground", 4, 4), TileLayer::empty("walls", 4, 5)]
        .into_iter()
        .collect();
    assert_eq!(
        build(&layers, &["walls"], 32.0),
        Err(GridError::DimensionMismatch {
            name: String::from("walls"),
            expected: (4, 4),
            found: (4, 5),
        })
    );
}

#[test]
fn empty_obstacle_list_is_rejected() {
    let layers = map_with_wall_at(1, 1);
    let names: [&str; 0] = [];
    assert_eq!(build(&layers, &names, 32.0), Err(GridError::NoObstacleLayers));
}

#[test]
fn empty_map_is_rejected() {
    assert_eq!(
        build(&LayerSet::new(), &["walls"], 32.0),
        Err(GridError::EmptyMap)
    );
}
