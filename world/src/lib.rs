#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Horde.
//!
//! The world owns every entity that the AI systems read and steer: the
//! traversal grid, the player, spawn points, enemies, enemy projectiles and
//! experience orbs. It is mutated exclusively through [`apply`], which
//! broadcasts the resulting [`Event`] values.

use std::time::Duration;

use horde_core::{
    Archetype, Command, EnemyId, Event, GameConfig, Health, OrbId, ProjectileId, SpawnPointId,
    TraversalGrid, Vec2, WorldConfig,
};

const DEFAULT_GRID_COLUMNS: u32 = 32;
const DEFAULT_GRID_ROWS: u32 = 32;

/// Represents the authoritative Horde world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    spawn_stats: [SpawnStats; 3],
    grid: TraversalGrid,
    player: Option<Player>,
    spawn_points: Vec<SpawnPoint>,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
    orbs: Vec<ExperienceOrb>,
    next_enemy_id: u32,
    next_projectile_id: u32,
    next_orb_id: u32,
    clock: Duration,
}

impl World {
    /// Creates a new world using the provided configuration snapshot.
    ///
    /// The world starts with an open grid until a grid is configured.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let spawn_stats = Archetype::ALL.map(|archetype| {
            let tuning = config.tuning(archetype);
            SpawnStats {
                health: Health::new(tuning.health.max(1)),
                experience: tuning.experience,
            }
        });

        Self {
            config: config.world.clone(),
            spawn_stats,
            grid: TraversalGrid::uniform(
                DEFAULT_GRID_COLUMNS,
                DEFAULT_GRID_ROWS,
                config.grid.tile_length,
            ),
            player: None,
            spawn_points: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            orbs: Vec::new(),
            next_enemy_id: 0,
            next_projectile_id: 0,
            next_orb_id: 0,
            clock: Duration::ZERO,
        }
    }

    fn spawn_stats(&self, archetype: Archetype) -> SpawnStats {
        match archetype {
            Archetype::Melee => self.spawn_stats[0],
            Archetype::Ranged => self.spawn_stats[1],
            Archetype::Boss => self.spawn_stats[2],
        }
    }

    fn enemy_index(&self, enemy: EnemyId) -> Option<usize> {
        self.enemies.iter().position(|candidate| candidate.id == enemy)
    }

    fn damage_player(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        let Some(player) = self.player.as_mut().filter(|player| player.alive) else {
            return;
        };

        player.health = player.health.saturating_sub(amount);
        out_events.push(Event::PlayerDamaged {
            health: player.health,
        });
        if player.health.is_depleted() {
            player.alive = false;
            player.velocity = Vec2::ZERO;
            log::info!("player defeated at {:?}", self.clock);
            out_events.push(Event::PlayerDefeated);
        }
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        let seconds = dt.as_secs_f32();
        if let Some(player) = self.player.as_mut().filter(|player| player.alive) {
            player.position = resolve_motion(&self.grid, player.position, player.velocity * seconds);
        }
        for enemy in &mut self.enemies {
            enemy.position = resolve_motion(&self.grid, enemy.position, enemy.velocity * seconds);
        }

        self.advance_projectiles(dt, out_events);
        self.collect_orbs(out_events);
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let seconds = dt.as_secs_f32();
        let target = self
            .player
            .filter(|player| player.alive)
            .map(|player| player.position);
        let mut hits = 0;

        let grid = &self.grid;
        let reach = self.config.player_radius;
        self.projectiles.retain_mut(|projectile| {
            let start = projectile.position;
            let travel = projectile.velocity * seconds;
            let blocked = grid.first_blocked(start, start + travel);
            projectile.position = start + travel * blocked.unwrap_or(1.0);
            projectile.remaining = projectile.remaining.saturating_sub(dt);

            let hit = target.map_or(false, |target| {
                distance_to_segment(target, start, projectile.position) <= reach
            });
            if hit {
                hits += 1;
            }
            let expired = hit || blocked.is_some() || projectile.remaining.is_zero();
            if expired {
                out_events.push(Event::ProjectileExpired {
                    projectile: projectile.id,
                });
            }
            !expired
        });

        for _ in 0..hits {
            self.damage_player(self.config.projectile_damage, out_events);
        }
    }

    fn collect_orbs(&mut self, out_events: &mut Vec<Event>) {
        let Some(player) = self.player.filter(|player| player.alive) else {
            return;
        };

        let reach = self.config.pickup_radius;
        self.orbs.retain(|orb| {
            if orb.position.distance(player.position) <= reach {
                out_events.push(Event::ExperienceCollected {
                    orb: orb.id,
                    amount: orb.amount,
                });
                false
            } else {
                true
            }
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { grid } => {
            let columns = grid.columns();
            let rows = grid.rows();
            world.grid = grid;
            out_events.push(Event::GridConfigured { columns, rows });
        }
        Command::RegisterSpawnPoint { position } => {
            let spawn_point = SpawnPointId::new(world.spawn_points.len() as u32);
            world.spawn_points.push(SpawnPoint {
                id: spawn_point,
                position,
            });
            out_events.push(Event::SpawnPointRegistered {
                spawn_point,
                position,
            });
        }
        Command::PlacePlayer { position } => {
            let health = Health::new(world.config.player_health.max(1));
            match world.player.as_mut() {
                Some(player) => player.position = position,
                None => {
                    world.player = Some(Player {
                        position,
                        velocity: Vec2::ZERO,
                        health,
                        max_health: health,
                        alive: true,
                    });
                }
            }
            out_events.push(Event::PlayerPlaced { position });
        }
        Command::SteerPlayer { velocity } => {
            if let Some(player) = world.player.as_mut().filter(|player| player.alive) {
                player.velocity = velocity;
            }
        }
        Command::Tick { dt } => world.advance(dt, out_events),
        Command::SpawnEnemy {
            spawn_point,
            archetype,
        } => {
            let Some(position) = world
                .spawn_points
                .iter()
                .find(|candidate| candidate.id == spawn_point)
                .map(|candidate| candidate.position)
            else {
                log::warn!("spawn point {} is unknown", spawn_point.get());
                out_events.push(Event::EnemySpawnRejected {
                    spawn_point,
                    archetype,
                });
                return;
            };

            let enemy = EnemyId::new(world.next_enemy_id);
            world.next_enemy_id += 1;
            let stats = world.spawn_stats(archetype);
            world.enemies.push(Enemy {
                id: enemy,
                archetype,
                position,
                velocity: Vec2::ZERO,
                health: stats.health,
                max_health: stats.health,
            });
            out_events.push(Event::EnemySpawned {
                enemy,
                archetype,
                position,
            });
        }
        Command::SteerEnemy { enemy, velocity } => {
            if let Some(index) = world.enemy_index(enemy) {
                world.enemies[index].velocity = velocity;
            }
        }
        Command::DamageEnemy { enemy, amount } => {
            let Some(index) = world.enemy_index(enemy) else {
                return;
            };

            let target = &mut world.enemies[index];
            target.health = target.health.saturating_sub(amount);
            out_events.push(Event::EnemyDamaged {
                enemy,
                health: target.health,
                max_health: target.max_health,
            });
            if !target.health.is_depleted() {
                return;
            }

            let dead = world.enemies.remove(index);
            out_events.push(Event::EnemyDied {
                enemy,
                archetype: dead.archetype,
                position: dead.position,
            });

            let amount = world.spawn_stats(dead.archetype).experience;
            if amount > 0 {
                let orb = OrbId::new(world.next_orb_id);
                world.next_orb_id += 1;
                world.orbs.push(ExperienceOrb {
                    id: orb,
                    position: dead.position,
                    amount,
                });
                out_events.push(Event::ExperienceDropped {
                    orb,
                    amount,
                    position: dead.position,
                });
            }
        }
        Command::DamagePlayer { amount } => world.damage_player(amount, out_events),
        Command::BoostPlayerHealth { amount } => {
            if let Some(player) = world.player.as_mut().filter(|player| player.alive) {
                player.max_health = player.max_health.saturating_add(amount);
                player.health = player.health.saturating_add(amount);
                out_events.push(Event::PlayerHealthBoosted {
                    health: player.health,
                    max_health: player.max_health,
                });
            }
        }
        Command::FireProjectile { origin, velocity } => {
            let projectile = ProjectileId::new(world.next_projectile_id);
            world.next_projectile_id += 1;
            world.projectiles.push(Projectile {
                id: projectile,
                position: origin,
                velocity,
                remaining: world.config.projectile_lifetime,
            });
            out_events.push(Event::ProjectileFired { projectile });
        }
        Command::ClearEnemies => {
            let count = world.enemies.len() as u32;
            world.enemies.clear();
            world.projectiles.clear();
            out_events.push(Event::EnemiesCleared { count });
        }
    }
}

/// Moves a body by `delta`, sliding along blocked tiles one axis at a time.
///
/// A move is only taken when its whole path stays on walkable tiles, so long
/// ticks cannot carry a body through a wall. Bodies that already stand on a
/// blocked tile move freely so they can leave it.
fn resolve_motion(grid: &TraversalGrid, from: Vec2, delta: Vec2) -> Vec2 {
    if delta == Vec2::ZERO || !grid.is_walkable_at(from) {
        return from + delta;
    }

    let candidates = [
        from + delta,
        Vec2::new(from.x + delta.x, from.y),
        Vec2::new(from.x, from.y + delta.y),
    ];
    candidates
        .into_iter()
        .find(|candidate| grid.first_blocked(from, *candidate).is_none())
        .unwrap_or(from)
}

fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let span = end - start;
    let length_squared = span.length_squared();
    if length_squared == 0.0 {
        return point.distance(start);
    }
    let t = ((point - start).dot(span) / length_squared).clamp(0.0, 1.0);
    point.distance(start + span * t)
}

#[derive(Clone, Copy, Debug)]
struct SpawnStats {
    health: Health,
    experience: u32,
}

#[derive(Clone, Copy, Debug)]
struct Player {
    position: Vec2,
    velocity: Vec2,
    health: Health,
    max_health: Health,
    alive: bool,
}

#[derive(Clone, Copy, Debug)]
struct SpawnPoint {
    id: SpawnPointId,
    position: Vec2,
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    archetype: Archetype,
    position: Vec2,
    velocity: Vec2,
    health: Health,
    max_health: Health,
}

#[derive(Clone, Debug)]
struct Projectile {
    id: ProjectileId,
    position: Vec2,
    velocity: Vec2,
    remaining: Duration,
}

#[derive(Clone, Debug)]
struct ExperienceOrb {
    id: OrbId,
    position: Vec2,
    amount: u32,
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use horde_core::{
        EnemySnapshot, EnemyView, OrbId, PlayerSnapshot, ProjectileId, SpawnPointId,
        TraversalGrid, Vec2,
    };

    /// Provides read-only access to the active traversal grid.
    #[must_use]
    pub fn grid(world: &World) -> &TraversalGrid {
        &world.grid
    }

    /// Captures a read-only view of the living enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|enemy| EnemySnapshot {
                    id: enemy.id,
                    archetype: enemy.archetype,
                    position: enemy.position,
                    velocity: enemy.velocity,
                    health: enemy.health,
                    max_health: enemy.max_health,
                })
                .collect(),
        )
    }

    /// Captures the player's state, if a player was placed.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        world.player.map(|player| PlayerSnapshot {
            position: player.position,
            health: player.health,
            max_health: player.max_health,
            alive: player.alive,
        })
    }

    /// Enumerates the registered spawn points in registration order.
    #[must_use]
    pub fn spawn_points(world: &World) -> Vec<SpawnPointId> {
        world.spawn_points.iter().map(|point| point.id).collect()
    }

    /// World position of a registered spawn point.
    #[must_use]
    pub fn spawn_point_position(world: &World, spawn_point: SpawnPointId) -> Option<Vec2> {
        world
            .spawn_points
            .iter()
            .find(|point| point.id == spawn_point)
            .map(|point| point.position)
    }

    /// Captures the enemy projectiles currently in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                position: projectile.position,
                velocity: projectile.velocity,
            })
            .collect()
    }

    /// Captures the experience orbs waiting to be collected.
    #[must_use]
    pub fn orbs(world: &World) -> Vec<OrbSnapshot> {
        world
            .orbs
            .iter()
            .map(|orb| OrbSnapshot {
                id: orb.id,
                position: orb.position,
                amount: orb.amount,
            })
            .collect()
    }

    /// Total simulated time.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Immutable representation of an enemy projectile.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Unique identifier assigned to the projectile.
        pub id: ProjectileId,
        /// Current world position.
        pub position: Vec2,
        /// Constant velocity in world units per second.
        pub velocity: Vec2,
    }

    /// Immutable representation of an experience orb.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct OrbSnapshot {
        /// Unique identifier assigned to the orb.
        pub id: OrbId,
        /// World position of the orb.
        pub position: Vec2,
        /// Experience stored in the orb.
        pub amount: u32,
    }
}
