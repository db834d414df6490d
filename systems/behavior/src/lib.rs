#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy behaviour state machine.
//!
//! Every tick each living enemy, in registration order, picks a stance from
//! its archetype's [`CombatProfile`]: seek the player, hold position, or
//! attack. Seeking follows either per-enemy A* paths or a shared flow field,
//! bent by local avoidance. Attack cooldowns and staged boss bursts run on a
//! timer registry owned by the system, and every timer of an enemy is
//! cancelled when it dies.

mod boss;
mod navigation;
mod profile;

use std::collections::BTreeMap;
use std::time::Duration;

use horde_core::{
    Archetype, Command, EnemyId, EnemySnapshot, EnemyView, Event, GameConfig, MovementStrategy,
    PlayerSnapshot, Scheduler, TimerId, TraversalGrid, Vec2,
};
use horde_system_avoidance::{blend, Avoidance, Neighbor, Surroundings};
use horde_system_flow_field::FlowField;
use horde_system_pathfinding::{PathTicket, Pathfinder};

pub use boss::{Boss, BossPhase, BURSTS_PER_VOLLEY, BURST_SPACING};
pub use profile::{
    for_archetype, CombatProfile, Melee, Ranged, Situation, Stance, Strike, Volley,
};

use navigation::Navigation;

/// Timer payloads owned by the behaviour system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BrainTimer {
    Cooldown(EnemyId),
    Burst { enemy: EnemyId, burst: u8 },
}

impl BrainTimer {
    const fn enemy(&self) -> EnemyId {
        match self {
            Self::Cooldown(enemy) | Self::Burst { enemy, .. } => *enemy,
        }
    }
}

#[derive(Debug)]
struct Brain {
    profile: Box<dyn CombatProfile>,
    avoidance: Box<dyn Avoidance>,
    navigation: Navigation,
    cooldown: Option<TimerId>,
    stance: Stance,
}

/// Pure system that reacts to world events and emits enemy commands.
#[derive(Debug)]
pub struct Behavior {
    config: GameConfig,
    brains: BTreeMap<EnemyId, Brain>,
    tickets: BTreeMap<PathTicket, EnemyId>,
    timers: Scheduler<BrainTimer>,
    pathfinder: Pathfinder,
    flow_field: FlowField,
}

impl Behavior {
    /// Creates the behaviour system from the session configuration.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            config: config.clone(),
            brains: BTreeMap::new(),
            tickets: BTreeMap::new(),
            timers: Scheduler::new(),
            pathfinder: Pathfinder::new(config.navigation.path_budget),
            flow_field: FlowField::new(config.navigation.flow_field_epsilon),
        }
    }

    /// Consumes world events and immutable views to emit enemy commands.
    ///
    /// Stances are only re-evaluated on batches that advance time.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        player: Option<PlayerSnapshot>,
        grid: &TraversalGrid,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = None;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    elapsed = Some(elapsed.unwrap_or(Duration::ZERO) + *dt);
                }
                Event::EnemySpawned {
                    enemy, archetype, ..
                } => self.track(*enemy, *archetype),
                Event::EnemyDamaged {
                    enemy,
                    health,
                    max_health,
                } => {
                    if let Some(brain) = self.brains.get_mut(enemy) {
                        brain.profile.observe_health(*health, *max_health);
                    }
                }
                Event::EnemyDied { enemy, .. } => self.forget(*enemy),
                Event::EnemiesCleared { .. } => self.teardown(),
                _ => {}
            }
        }

        let Some(elapsed) = elapsed else {
            return;
        };

        let target = player.filter(|player| player.alive);
        self.timers.advance(elapsed);
        while let Some(fired) = self.timers.pop_due() {
            self.on_timer(fired.id, fired.at, fired.payload, enemies, target, out);
        }

        for result in self.pathfinder.calculate(grid) {
            let Some(enemy) = self.tickets.remove(&result.ticket) else {
                continue;
            };
            if let Some(brain) = self.brains.get_mut(&enemy) {
                let _ = brain.navigation.deliver(result.ticket, result.path);
            }
        }

        if let Some(player) = target {
            if self.config.navigation.strategy == MovementStrategy::FlowField {
                let _ = self.flow_field.refresh(player.position, grid);
            }
        }

        let neighbors: Vec<Neighbor> = enemies
            .iter()
            .map(|enemy| Neighbor {
                id: enemy.id,
                position: enemy.position,
            })
            .collect();

        let ids: Vec<EnemyId> = self.brains.keys().copied().collect();
        for id in ids {
            let Some(snapshot) = enemies.get(id) else {
                continue;
            };
            match target {
                Some(player) => self.update(snapshot, player, &neighbors, grid, out),
                None => self.stand_down(snapshot, out),
            }
        }
    }

    fn track(&mut self, enemy: EnemyId, archetype: Archetype) {
        let brain = Brain {
            profile: for_archetype(archetype, &self.config),
            avoidance: horde_system_avoidance::from_config(&self.config.avoidance),
            navigation: Navigation::default(),
            cooldown: None,
            stance: Stance::Seek,
        };
        if let Some(previous) = self.brains.insert(enemy, brain) {
            log::warn!(
                "enemy {} was already tracked as {:?}",
                enemy.get(),
                previous.profile.archetype()
            );
        }
    }

    fn forget(&mut self, enemy: EnemyId) {
        let cancelled = self.timers.cancel_where(|timer| timer.enemy() == enemy);
        if let Some(mut brain) = self.brains.remove(&enemy) {
            if let Some(ticket) = brain.navigation.pending() {
                let _ = self.tickets.remove(&ticket);
            }
            brain.navigation.reset(&mut self.pathfinder);
            log::debug!(
                "enemy {} forgotten, {cancelled} timer(s) cancelled",
                enemy.get()
            );
        }
    }

    fn on_timer(
        &mut self,
        id: TimerId,
        at: Duration,
        timer: BrainTimer,
        enemies: &EnemyView,
        target: Option<PlayerSnapshot>,
        out: &mut Vec<Command>,
    ) {
        let Some(brain) = self.brains.get_mut(&timer.enemy()) else {
            return;
        };
        match timer {
            BrainTimer::Cooldown(_) => {
                if brain.cooldown == Some(id) {
                    brain.cooldown = None;
                }
            }
            BrainTimer::Burst { enemy, burst } => {
                let (Some(snapshot), Some(player)) = (enemies.get(enemy), target) else {
                    return;
                };
                brain.profile.burst(
                    &Strike {
                        origin: snapshot.position,
                        target: player.position,
                        clock: at,
                        burst,
                    },
                    out,
                );
            }
        }
    }

    fn stand_down(&mut self, snapshot: &EnemySnapshot, out: &mut Vec<Command>) {
        if let Some(brain) = self.brains.get_mut(&snapshot.id) {
            brain.stance = Stance::Hold;
        }
        steer(snapshot, Vec2::ZERO, out);
    }

    fn update(
        &mut self,
        snapshot: &EnemySnapshot,
        player: PlayerSnapshot,
        neighbors: &[Neighbor],
        grid: &TraversalGrid,
        out: &mut Vec<Command>,
    ) {
        let now = self.timers.now();
        let Some(brain) = self.brains.get_mut(&snapshot.id) else {
            return;
        };

        let line_of_sight = !brain.profile.requires_line_of_sight()
            || grid.line_of_sight(snapshot.position, player.position);
        let situation = Situation {
            distance: snapshot.position.distance(player.position),
            line_of_sight,
            ready: brain.cooldown.is_none(),
        };
        let stance = brain.profile.decide(&situation);
        brain.stance = stance;

        match stance {
            Stance::Attack => {
                let mut volley = Volley::default();
                brain.profile.attack(
                    &Strike {
                        origin: snapshot.position,
                        target: player.position,
                        clock: now,
                        burst: 0,
                    },
                    &mut volley,
                );
                let (commands, bursts) = volley.into_parts();
                out.extend(commands);
                for (delay, burst) in bursts {
                    let _ = self.timers.schedule_once(
                        delay,
                        BrainTimer::Burst {
                            enemy: snapshot.id,
                            burst,
                        },
                    );
                }
                let rate = brain.profile.tuning().attack_rate;
                brain.cooldown = Some(
                    self.timers
                        .schedule_once(rate, BrainTimer::Cooldown(snapshot.id)),
                );
                steer(snapshot, Vec2::ZERO, out);
            }
            Stance::Hold => steer(snapshot, Vec2::ZERO, out),
            Stance::Seek => {
                let desired = match self.config.navigation.strategy {
                    MovementStrategy::Pathfinding => {
                        let direction = brain.navigation.desired_direction(
                            snapshot.position,
                            player.position,
                            grid,
                            &mut self.pathfinder,
                            now,
                            self.config.navigation.path_refresh,
                        );
                        if let Some(ticket) = brain.navigation.pending() {
                            let _ = self.tickets.insert(ticket, snapshot.id);
                        }
                        direction
                    }
                    MovementStrategy::FlowField => {
                        if grid.tile_at(snapshot.position) == grid.tile_at(player.position) {
                            player.position - snapshot.position
                        } else {
                            self.flow_field.vector_at(snapshot.position)
                        }
                    }
                };

                let correction = brain.avoidance.correction(&Surroundings {
                    id: snapshot.id,
                    position: snapshot.position,
                    neighbors,
                    grid,
                });
                let direction = blend(desired, correction, self.config.avoidance.max_influence);
                let speed = brain.profile.tuning().move_speed;
                steer(snapshot, direction * speed, out);
            }
        }
    }

    /// Stance chosen for an enemy on the last tick.
    #[must_use]
    pub fn stance(&self, enemy: EnemyId) -> Option<Stance> {
        self.brains.get(&enemy).map(|brain| brain.stance)
    }

    /// Phase of a boss enemy.
    #[must_use]
    pub fn boss_phase(&self, enemy: EnemyId) -> Option<BossPhase> {
        self.brains
            .get(&enemy)
            .and_then(|brain| brain.profile.phase())
    }

    /// Whether a boss raised its phase three alert.
    #[must_use]
    pub fn boss_alert(&self, enemy: EnemyId) -> bool {
        self.brains
            .get(&enemy)
            .map_or(false, |brain| brain.profile.alert())
    }

    /// Number of armed timers belonging to an enemy.
    #[must_use]
    pub fn pending_timers(&self, enemy: EnemyId) -> usize {
        self.timers.count_where(|timer| timer.enemy() == enemy)
    }

    /// Number of enemies the system currently tracks.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.brains.len()
    }

    /// Forgets every enemy and cancels every timer and path request.
    pub fn teardown(&mut self) {
        self.brains.clear();
        self.tickets.clear();
        self.timers.clear();
        self.pathfinder.clear();
    }
}

fn steer(snapshot: &EnemySnapshot, velocity: Vec2, out: &mut Vec<Command>) {
    if snapshot.velocity != velocity {
        out.push(Command::SteerEnemy {
            enemy: snapshot.id,
            velocity,
        });
    }
}
