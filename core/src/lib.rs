#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Horde survival engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots such as [`EnemyView`] and [`TraversalGrid`], and
//! respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod config;
mod grid;
mod millis;
mod schedule;
mod wave;

pub use config::{
    AvoidanceConfig, AvoidanceKind, CombatTuning, ConfigError, GameConfig, GridConfig,
    MovementStrategy, NavigationConfig, ProgressionConfig, WaveConfig, WaveSourceKind,
    WorldConfig,
};
pub use glam::Vec2;
pub use grid::{unit_from_angle, Traversal, TraversalGrid, NEIGHBOR_OFFSETS};
pub use schedule::{Fired, Scheduler, TimerId};
pub use wave::{ArchetypeCounts, WaveDefinition};

/// Behavioural class of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Close-combat enemy that damages the player on contact range.
    Melee,
    /// Enemy that fires projectiles from a distance.
    Ranged,
    /// Multi-phase enemy that fires staged projectile patterns.
    Boss,
}

impl Archetype {
    /// Every archetype in declaration order.
    pub const ALL: [Archetype; 3] = [Self::Melee, Self::Ranged, Self::Boss];

    /// Order in which wave quotas are drained when spawning.
    pub const SPAWN_PRIORITY: [Archetype; 3] = [Self::Boss, Self::Melee, Self::Ranged];
}

/// Unique identifier assigned to an enemy by the world.
///
/// Identifiers are allocated in increasing order, so sorting by id yields the
/// registration order of the roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a registered spawn point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpawnPointId(u32);

impl SpawnPointId {
    /// Creates a new spawn point identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an experience orb dropped by an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrbId(u32);

impl OrbId {
    /// Creates a new orb identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Hit points of a living entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw number of hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts damage, saturating at zero.
    #[must_use]
    pub const fn saturating_sub(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }

    /// Adds healing, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, amount: u32) -> Self {
        Self(self.0.saturating_add(amount))
    }
}

/// Location of a single map tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    column: u32,
    row: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the tile.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the tile.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Number of king moves separating two tiles.
    #[must_use]
    pub fn chebyshev_distance(self, other: TileCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs a freshly built traversal grid, replacing the previous one.
    ConfigureGrid {
        /// Classified grid produced by the grid builder.
        grid: TraversalGrid,
    },
    /// Registers an immutable spawn point at the provided world position.
    RegisterSpawnPoint {
        /// World position enemies appear at.
        position: Vec2,
    },
    /// Teleports the player to the provided world position.
    PlacePlayer {
        /// World position of the player.
        position: Vec2,
    },
    /// Sets the player's velocity in world units per second.
    SteerPlayer {
        /// Desired player velocity.
        velocity: Vec2,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a spawn point produce an enemy of the given archetype.
    SpawnEnemy {
        /// Spawn point acting as the enemy factory.
        spawn_point: SpawnPointId,
        /// Archetype of the enemy to create.
        archetype: Archetype,
    },
    /// Sets an enemy's velocity in world units per second.
    SteerEnemy {
        /// Enemy being steered.
        enemy: EnemyId,
        /// Desired velocity.
        velocity: Vec2,
    },
    /// Applies damage to an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Hit points removed.
        amount: u32,
    },
    /// Applies damage to the player.
    DamagePlayer {
        /// Hit points removed.
        amount: u32,
    },
    /// Raises the player's maximum and current health.
    BoostPlayerHealth {
        /// Hit points added to both maximum and current health.
        amount: u32,
    },
    /// Launches an enemy projectile travelling in a straight line.
    FireProjectile {
        /// World position the projectile starts from.
        origin: Vec2,
        /// Constant velocity in world units per second.
        velocity: Vec2,
    },
    /// Removes every enemy and projectile, as done on scene teardown.
    ClearEnemies,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a new traversal grid is active.
    GridConfigured {
        /// Number of tile columns in the grid.
        columns: u32,
        /// Number of tile rows in the grid.
        rows: u32,
    },
    /// Confirms that a spawn point was registered.
    SpawnPointRegistered {
        /// Identifier allocated to the spawn point.
        spawn_point: SpawnPointId,
        /// World position of the spawn point.
        position: Vec2,
    },
    /// Confirms that the player was placed.
    PlayerPlaced {
        /// World position of the player.
        position: Vec2,
    },
    /// Confirms that an enemy was created by a spawn point.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Archetype of the new enemy.
        archetype: Archetype,
        /// World position the enemy appeared at.
        position: Vec2,
    },
    /// Reports that a spawn request referenced an unknown spawn point.
    EnemySpawnRejected {
        /// Spawn point named in the request.
        spawn_point: SpawnPointId,
        /// Archetype that could not be spawned.
        archetype: Archetype,
    },
    /// Reports that an enemy lost hit points.
    EnemyDamaged {
        /// Enemy that took damage.
        enemy: EnemyId,
        /// Remaining hit points.
        health: Health,
        /// Hit points the enemy spawned with.
        max_health: Health,
    },
    /// Reports that an enemy was destroyed.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
        /// Archetype of the enemy that died.
        archetype: Archetype,
        /// Last world position of the enemy.
        position: Vec2,
    },
    /// Reports that every enemy was removed at once.
    EnemiesCleared {
        /// Number of enemies removed.
        count: u32,
    },
    /// Confirms that an enemy projectile was launched.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
    },
    /// Reports that a projectile hit something or ran out of lifetime.
    ProjectileExpired {
        /// Projectile that was removed.
        projectile: ProjectileId,
    },
    /// Reports that the player lost hit points.
    PlayerDamaged {
        /// Remaining hit points.
        health: Health,
    },
    /// Reports that the player's health was raised.
    PlayerHealthBoosted {
        /// Current hit points after the boost.
        health: Health,
        /// Maximum hit points after the boost.
        max_health: Health,
    },
    /// Reports that the player ran out of hit points.
    PlayerDefeated,
    /// Reports that a dying enemy dropped an experience orb.
    ExperienceDropped {
        /// Identifier assigned to the orb.
        orb: OrbId,
        /// Experience stored in the orb.
        amount: u32,
        /// World position of the orb.
        position: Vec2,
    },
    /// Reports that the player picked up an experience orb.
    ExperienceCollected {
        /// Orb that was collected.
        orb: OrbId,
        /// Experience stored in the orb.
        amount: u32,
    },
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub archetype: Archetype,
    /// Current world position.
    pub position: Vec2,
    /// Current velocity in world units per second.
    pub velocity: Vec2,
    /// Remaining hit points.
    pub health: Health,
    /// Hit points the enemy spawned with.
    pub max_health: Health,
}

/// Read-only snapshot describing all living enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific enemy.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Number of living enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the player used as the enemies' target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Current world position.
    pub position: Vec2,
    /// Remaining hit points.
    pub health: Health,
    /// Maximum hit points.
    pub max_health: Health,
    /// Indicates whether the player can still be targeted.
    pub alive: bool,
}
