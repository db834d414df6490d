use horde_core::{EnemyId, TileCoord, Traversal, TraversalGrid, Vec2};
use horde_system_avoidance::{blend, Avoidance, Neighbor, Repulsion, SensorRing, Surroundings};

fn open_grid() -> TraversalGrid {
    TraversalGrid::uniform(20, 20, 32.0)
}

fn neighbor(id: u32, x: f32, y: f32) -> Neighbor {
    Neighbor {
        id: EnemyId::new(id),
        position: Vec2::new(x, y),
    }
}

#[test]
fn repulsion_scales_with_proximity() {
    let grid = open_grid();
    let neighbors = [neighbor(1, 110.0, 100.0), neighbor(2, 100.0, 140.0)];
    let mut repulsion = Repulsion::new(50.0);

    let correction = repulsion.correction(&Surroundings {
        id: EnemyId::new(0),
        position: Vec2::new(100.0, 100.0),
        neighbors: &neighbors,
        grid: &grid,
    });

    let expected = Vec2::new(-0.8, 0.0) + Vec2::new(0.0, -0.2);
    assert!((correction - expected).length() < 1e-5, "{correction:?}");
}

#[test]
fn repulsion_ignores_self_coincident_and_distant_neighbours() {
    let grid = open_grid();
    let neighbors = [
        neighbor(0, 101.0, 100.0),
        neighbor(1, 100.0, 100.0),
        neighbor(2, 160.0, 100.0),
    ];
    let mut repulsion = Repulsion::new(50.0);

    let correction = repulsion.correction(&Surroundings {
        id: EnemyId::new(0),
        position: Vec2::new(100.0, 100.0),
        neighbors: &neighbors,
        grid: &grid,
    });
    assert_eq!(correction, Vec2::ZERO);
}

#[test]
fn blended_directions_have_unit_length() {
    let corrections = [
        Vec2::ZERO,
        Vec2::new(0.3, -0.1),
        Vec2::new(-4.0, 0.0),
        Vec2::new(0.0, 12.0),
        Vec2::new(-0.7, -0.7),
    ];
    let desired = [
        Vec2::X,
        Vec2::new(-2.0, 5.0),
        Vec2::new(0.01, 0.0),
        Vec2::new(-1.0, -1.0),
    ];
    for direction in desired {
        for correction in corrections {
            for influence in [0.0, 0.5, 0.75, 0.99] {
                let result = blend(direction, correction, influence);
                assert!(
                    (result.length() - 1.0).abs() < 1e-5,
                    "blend({direction:?}, {correction:?}, {influence}) = {result:?}",
                );
            }
        }
    }
}

#[test]
fn zero_desired_direction_blends_to_zero() {
    assert_eq!(blend(Vec2::ZERO, Vec2::new(1.0, 0.0), 0.75), Vec2::ZERO);
}

#[test]
fn sensor_contact_persists_until_it_ends() {
    let mut cells = vec![Traversal::Free; 9];
    cells[5] = Traversal::Blocked;
    let grid = TraversalGrid::from_cells(3, 3, 32.0, cells).expect("grid");
    let centre = grid.tile_center(TileCoord::new(1, 1));
    let mut ring = SensorRing::new(20.0, 10.0);

    let touching = Surroundings {
        id: EnemyId::new(0),
        position: centre,
        neighbors: &[],
        grid: &grid,
    };
    let first = ring.correction(&touching);
    assert_eq!(ring.active_contacts(), 1);
    assert!((first - Vec2::new(-1.0, 0.0)).length() < 1e-5, "{first:?}");
    assert_eq!(ring.correction(&touching), first);

    let open = TraversalGrid::uniform(3, 3, 32.0);
    let released = ring.correction(&Surroundings {
        grid: &open,
        ..touching
    });
    assert_eq!(ring.active_contacts(), 0);
    assert_eq!(released, Vec2::ZERO);
}

#[test]
fn sensors_react_to_neighbours() {
    let grid = open_grid();
    let neighbors = [neighbor(7, 100.0, 120.0)];
    let mut ring = SensorRing::new(18.0, 6.0);

    let correction = ring.correction(&Surroundings {
        id: EnemyId::new(0),
        position: Vec2::new(100.0, 100.0),
        neighbors: &neighbors,
        grid: &grid,
    });
    assert_eq!(ring.active_contacts(), 1);
    assert!((correction - Vec2::new(0.0, -1.0)).length() < 1e-5, "{correction:?}");
}
