//! Headless game session wiring the world to every system.

use std::fmt;
use std::time::Duration;

use horde_core::{Command, Event, GameConfig, Vec2};
use horde_system_behavior::Behavior;
use horde_system_progression::{Progression, Upgrade, Weapon};
use horde_system_wave_director::{WaveDirector, WaveStatus};
use horde_world::{self as world, query, World};

use crate::layout::Layout;

/// Distance at which the automated player starts backing away from enemies.
const FLEE_RADIUS: f32 = 160.0;

/// One simulated game driven by fixed ticks.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    behavior: Behavior,
    director: WaveDirector,
    progression: Progression,
    weapon: Weapon,
    player_velocity: Vec2,
    upgrades: Vec<Upgrade>,
    defeated: u32,
}

impl Session {
    /// Builds the map, places the player and starts wave one.
    pub(crate) fn new(config: &GameConfig, layout: &Layout) -> Self {
        let mut session = Self {
            world: World::new(config),
            behavior: Behavior::new(config),
            director: WaveDirector::from_config(config),
            progression: Progression::new(config),
            weapon: Weapon::new(&config.progression),
            player_velocity: Vec2::ZERO,
            upgrades: Vec::new(),
            defeated: 0,
        };

        let grid = horde_system_grid_builder::build_or_impassable(
            &layout.layers,
            &config.grid.obstacle_layers,
            config.grid.tile_length,
        );
        let spawn_positions: Vec<Vec2> = layout
            .spawn_points
            .iter()
            .map(|tile| grid.tile_center(*tile))
            .collect();
        let player_position = grid.tile_center(layout.player);

        session.apply(Command::ConfigureGrid { grid });
        for position in spawn_positions {
            session.apply(Command::RegisterSpawnPoint { position });
        }
        session.apply(Command::PlacePlayer {
            position: player_position,
        });
        session.director.start_next_wave();
        session
    }

    /// Advances the simulation by one tick.
    pub(crate) fn tick(&mut self, dt: Duration) {
        self.steer_player();
        self.apply(Command::Tick { dt });
        self.claim_upgrades();
    }

    /// Reports whether nothing further can happen.
    pub(crate) fn is_over(&self) -> bool {
        let player_down = query::player(&self.world).map_or(true, |player| !player.alive);
        let cleared = self.director.is_finished() && query::enemy_view(&self.world).is_empty();
        player_down || cleared
    }

    /// Snapshot of the session for reporting.
    pub(crate) fn summary(&self) -> Summary {
        let (health, max_health) = query::player(&self.world)
            .map_or((0, 0), |player| (player.health.get(), player.max_health.get()));
        Summary {
            status: self.director.status(),
            elapsed: query::clock(&self.world),
            alive: query::enemy_view(&self.world).len(),
            defeated: self.defeated,
            health,
            max_health,
            level: self.progression.level(),
            upgrades: self.upgrades.clone(),
        }
    }

    fn apply(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.pump(events);
    }

    /// Feeds events to every system until no more commands are produced.
    fn pump(&mut self, mut events: Vec<Event>) {
        while !events.is_empty() {
            self.defeated += events
                .iter()
                .filter(|event| matches!(event, Event::EnemyDied { .. }))
                .count() as u32;

            let enemies = query::enemy_view(&self.world);
            let player = query::player(&self.world);
            let mut commands = Vec::new();
            self.behavior.handle(
                &events,
                &enemies,
                player,
                query::grid(&self.world),
                &mut commands,
            );
            self.director
                .handle(&events, &query::spawn_points(&self.world), &mut commands);
            self.progression.handle(&events);
            self.weapon.handle(
                &events,
                &enemies,
                player,
                self.progression.stats(),
                &mut commands,
            );

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    fn steer_player(&mut self) {
        let Some(player) = query::player(&self.world).filter(|player| player.alive) else {
            return;
        };
        let threat = query::enemy_view(&self.world)
            .iter()
            .map(|enemy| (enemy.position.distance(player.position), enemy.position))
            .filter(|(distance, _)| *distance < FLEE_RADIUS)
            .min_by(|a, b| a.0.total_cmp(&b.0));
        let velocity = threat
            .and_then(|(_, position)| (player.position - position).try_normalize())
            .map_or(Vec2::ZERO, |away| {
                away * self.progression.stats().move_speed()
            });
        if velocity != self.player_velocity {
            self.player_velocity = velocity;
            self.apply(Command::SteerPlayer { velocity });
        }
    }

    fn claim_upgrades(&mut self) {
        while self.progression.pending_offer().is_some() {
            let mut commands = Vec::new();
            let Some(upgrade) = self.progression.choose(0, &mut commands) else {
                break;
            };
            log::info!("auto-selected {upgrade:?}");
            self.upgrades.push(upgrade);
            for command in commands {
                self.apply(command);
            }
        }
    }
}

/// End-of-run report.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Summary {
    status: WaveStatus,
    elapsed: Duration,
    alive: usize,
    defeated: u32,
    health: u32,
    max_health: u32,
    level: u32,
    upgrades: Vec<Upgrade>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.status.finished {
            "all waves cleared"
        } else if self.health == 0 {
            "player defeated"
        } else {
            "in progress"
        };
        writeln!(f, "wave {} ({state})", self.status.wave)?;
        writeln!(
            f,
            "enemies: {} defeated, {} alive, {} still to spawn",
            self.defeated,
            self.alive,
            self.status.remaining.total()
        )?;
        writeln!(
            f,
            "player: {}/{} hp, level {}, {} upgrade(s)",
            self.health,
            self.max_health,
            self.level,
            self.upgrades.len()
        )?;
        write!(f, "simulated {:.2} s", self.elapsed.as_secs_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{parse, BUILTIN_MAP};

    fn run(ticks: usize) -> Summary {
        let config = GameConfig::default();
        let layout = parse(BUILTIN_MAP).expect("builtin map");
        let mut session = Session::new(&config, &layout);
        for _ in 0..ticks {
            session.tick(Duration::from_millis(16));
            if session.is_over() {
                break;
            }
        }
        session.summary()
    }

    #[test]
    fn first_wave_spawns_and_fights() {
        let summary = run(1_500);
        assert!(summary.status.wave >= 1);
        assert!(summary.alive > 0 || summary.defeated > 0);
        assert!(summary.elapsed > Duration::ZERO);
    }

    #[test]
    fn sessions_replay_identically() {
        assert_eq!(run(800), run(800));
    }

    #[test]
    fn summary_mentions_the_wave() {
        let text = run(10).to_string();
        assert!(text.starts_with("wave 1"), "{text}");
    }
}
