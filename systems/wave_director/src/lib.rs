#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director that paces enemy spawns and decides when a wave is over.
//!
//! A repeating spawn timer emits one spawn command per firing, draining the
//! wave's quotas in boss, melee, ranged order. Time-gated waves additionally
//! arm a one-shot duration timer. Both timers are replaced on every wave
//! transition.

mod source;

use std::collections::BTreeMap;
use std::time::Duration;

use horde_core::{
    Archetype, ArchetypeCounts, Command, EnemyId, Event, GameConfig, Scheduler, SpawnPointId,
    TimerId, WaveDefinition,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use source::{generate_wave, WaveSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DirectorTimer {
    Spawn,
    WaveDuration,
}

/// Read-only snapshot of the director for heads-up displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveStatus {
    /// Number of the current wave, counting from one.
    pub wave: u32,
    /// Enemies still to be spawned during the wave.
    pub remaining: ArchetypeCounts,
    /// Living enemies spawned by the director.
    pub active: ArchetypeCounts,
    /// Time left before a time-gated wave may advance.
    pub time_remaining: Option<Duration>,
    /// Whether a wave is currently running.
    pub in_progress: bool,
    /// Whether the wave source ran out of waves.
    pub finished: bool,
}

/// Pure system that spawns waves of enemies and tracks their population.
#[derive(Debug)]
pub struct WaveDirector {
    source: WaveSource,
    rng: ChaCha8Rng,
    timers: Scheduler<DirectorTimer>,
    wave_number: u32,
    wave: Option<WaveDefinition>,
    remaining: ArchetypeCounts,
    awaiting: ArchetypeCounts,
    active: BTreeMap<EnemyId, Archetype>,
    started_at: Duration,
    spawn_timer: Option<TimerId>,
    duration_timer: Option<TimerId>,
    finished: bool,
}

impl WaveDirector {
    /// Creates an idle director positioned before wave one.
    #[must_use]
    pub fn new(source: WaveSource, seed: u64) -> Self {
        Self {
            source,
            rng: ChaCha8Rng::seed_from_u64(seed),
            timers: Scheduler::new(),
            wave_number: 1,
            wave: None,
            remaining: ArchetypeCounts::default(),
            awaiting: ArchetypeCounts::default(),
            active: BTreeMap::new(),
            started_at: Duration::ZERO,
            spawn_timer: None,
            duration_timer: None,
            finished: false,
        }
    }

    /// Creates a director from the session configuration.
    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(WaveSource::from_config(&config.waves), config.waves.seed)
    }

    /// Loads the current wave and arms its timers.
    ///
    /// When the source has no definition for the current wave number the
    /// director finishes for good and every later call is a no-op.
    pub fn start_next_wave(&mut self) {
        if self.finished {
            return;
        }
        self.cancel_timers();

        let Some(wave) = self.source.wave(self.wave_number) else {
            log::info!(
                "no definition for wave {}, director finished",
                self.wave_number
            );
            self.finished = true;
            self.wave = None;
            self.remaining = ArchetypeCounts::default();
            return;
        };

        self.remaining = wave.counts();
        self.started_at = self.timers.now();
        self.spawn_timer = Some(
            self.timers
                .schedule_repeating(wave.spawn_delay, DirectorTimer::Spawn),
        );
        self.duration_timer = wave
            .armed_duration()
            .map(|duration| self.timers.schedule_once(duration, DirectorTimer::WaveDuration));
        log::info!(
            "wave {} started: {} melee, {} ranged, {} boss",
            self.wave_number,
            wave.melee,
            wave.ranged,
            wave.boss
        );
        self.wave = Some(wave);
    }

    /// Emits a single spawn command for the highest-priority remaining quota.
    ///
    /// The spawn point is drawn uniformly from `spawn_points`. Nothing is
    /// emitted without spawn points or remaining quota.
    pub fn spawn_enemies(&mut self, spawn_points: &[SpawnPointId], out: &mut Vec<Command>) {
        if self.finished || self.wave.is_none() {
            return;
        }
        let Some(archetype) = self.remaining.next_by_priority() else {
            return;
        };
        let Some(spawn_point) = spawn_points.choose(&mut self.rng).copied() else {
            log::debug!("no spawn points registered, {archetype:?} spawn deferred");
            return;
        };

        let _ = self.remaining.take(archetype);
        self.awaiting.add(archetype);
        log::debug!(
            "wave {} spawns {archetype:?} at spawn point {}",
            self.wave_number,
            spawn_point.get()
        );
        out.push(Command::SpawnEnemy {
            spawn_point,
            archetype,
        });
    }

    /// Advances to the next wave when the current one is complete.
    ///
    /// Defeat-gated waves complete once everything is spawned and no enemy
    /// is left alive. Time-gated waves complete once everything is spawned
    /// and either `force_next` is set or the wave duration has elapsed.
    /// Returns whether the director advanced.
    pub fn check_wave_completion(&mut self, force_next: bool) -> bool {
        if self.finished {
            return false;
        }
        let Some(wave) = &self.wave else {
            return false;
        };

        let all_spawned = self.remaining.is_empty() && self.awaiting.is_empty();
        if !all_spawned {
            return false;
        }

        let complete = if wave.require_all_defeated {
            self.active.is_empty()
        } else {
            let elapsed = self.timers.now().saturating_sub(self.started_at);
            force_next
                || wave
                    .wave_duration
                    .map_or(false, |duration| elapsed >= duration)
        };
        if !complete {
            return false;
        }

        log::info!("wave {} complete", self.wave_number);
        self.wave_number = self.wave_number.saturating_add(1);
        self.start_next_wave();
        true
    }

    /// Consumes world events and emits spawn commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        spawn_points: &[SpawnPointId],
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
                } => {
                    if self.awaiting.take(*archetype) {
                        let _ = self.active.insert(*enemy, *archetype);
                        let _ = self.check_wave_completion(false);
                    }
                }
                Event::EnemySpawnRejected {
                    spawn_point,
                    archetype,
                } => {
                    if self.awaiting.take(*archetype) {
                        log::warn!(
                            "spawn point {} rejected {archetype:?}, quota restored",
                            spawn_point.get()
                        );
                        self.remaining.add(*archetype);
                    }
                }
                Event::EnemyDied { enemy, .. } => {
                    if self.active.remove(enemy).is_some() {
                        let _ = self.check_wave_completion(false);
                    }
                }
                Event::EnemiesCleared { .. } => {
                    self.active.clear();
                    let _ = self.check_wave_completion(false);
                }
                _ => {}
            }
        }

        let Some(elapsed) = elapsed else {
            return;
        };

        self.timers.advance(elapsed);
        while let Some(fired) = self.timers.pop_due() {
            match fired.payload {
                DirectorTimer::Spawn => {
                    if self.spawn_timer == Some(fired.id) {
                        self.spawn_enemies(spawn_points, out);
                    }
                }
                DirectorTimer::WaveDuration => {
                    if self.duration_timer == Some(fired.id) {
                        self.duration_timer = None;
                        let _ = self.check_wave_completion(true);
                    }
                }
            }
        }
    }

    /// Snapshot of wave progress.
    #[must_use]
    pub fn status(&self) -> WaveStatus {
        let mut active = ArchetypeCounts::default();
        for archetype in self.active.values() {
            active.add(*archetype);
        }
        let time_remaining = self
            .duration_timer
            .and_then(|timer| self.timers.deadline(timer))
            .map(|deadline| deadline.saturating_sub(self.timers.now()));
        WaveStatus {
            wave: self.wave_number,
            remaining: self.remaining,
            active,
            time_remaining,
            in_progress: self.wave.is_some() && !self.finished,
            finished: self.finished,
        }
    }

    /// Number of the current wave, counting from one.
    #[must_use]
    pub const fn wave_number(&self) -> u32 {
        self.wave_number
    }

    /// Reports whether the wave source ran out of waves.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of armed director timers.
    #[must_use]
    pub fn armed_timers(&self) -> usize {
        self.timers.len()
    }

    /// Stops the current wave and cancels both timers.
    ///
    /// A later [`WaveDirector::start_next_wave`] restarts the same wave.
    pub fn teardown(&mut self) {
        self.cancel_timers();
        self.wave = None;
        self.remaining = ArchetypeCounts::default();
        self.awaiting = ArchetypeCounts::default();
    }

    fn cancel_timers(&mut self) {
        if let Some(timer) = self.spawn_timer.take() {
            let _ = self.timers.cancel(timer);
        }
        if let Some(timer) = self.duration_timer.take() {
            let _ = self.timers.cancel(timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_points() -> Vec<SpawnPointId> {
        vec![SpawnPointId::new(0), SpawnPointId::new(1)]
    }

    fn archetypes(commands: &[Command]) -> Vec<Archetype> {
        commands
            .iter()
            .filter_map(|command| match command {
                Command::SpawnEnemy { archetype, .. } => Some(*archetype),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn spawns_one_enemy_per_call_by_priority() {
        let wave = WaveDefinition {
            melee: 1,
            ranged: 1,
            boss: 1,
            spawn_delay: Duration::from_millis(100),
            wave_duration: None,
            require_all_defeated: true,
        };
        let mut director = WaveDirector::new(WaveSource::Table(vec![wave]), 7);
        director.start_next_wave();

        let mut commands = Vec::new();
        for _ in 0..4 {
            director.spawn_enemies(&spawn_points(), &mut commands);
        }
        assert_eq!(
            archetypes(&commands),
            vec![Archetype::Boss, Archetype::Melee, Archetype::Ranged]
        );
        assert!(director.status().remaining.is_empty());
    }

    #[test]
    fn missing_spawn_points_defer_the_spawn() {
        let mut director = WaveDirector::new(WaveSource::Procedural, 7);
        director.start_next_wave();
        let before = director.status().remaining;

        let mut commands = Vec::new();
        director.spawn_enemies(&[], &mut commands);
        assert!(commands.is_empty());
        assert_eq!(director.status().remaining, before);
    }

    #[test]
    fn spawn_point_selection_follows_the_seed() {
        let run = |seed| {
            let mut director = WaveDirector::new(WaveSource::Procedural, seed);
            director.start_next_wave();
            let mut commands = Vec::new();
            let points: Vec<SpawnPointId> = (0..8).map(SpawnPointId::new).collect();
            for _ in 0..6 {
                director.spawn_enemies(&points, &mut commands);
            }
            commands
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn empty_table_finishes_immediately() {
        let mut director = WaveDirector::new(WaveSource::Table(Vec::new()), 0);
        director.start_next_wave();
        assert!(director.is_finished());
        assert_eq!(director.armed_timers(), 0);
        assert!(!director.status().in_progress);
    }

    #[test]
    fn teardown_cancels_both_timers() {
        let mut director = WaveDirector::new(WaveSource::Procedural, 0);
        director.start_next_wave();
        assert_eq!(director.armed_timers(), 2);
        director.teardown();
        assert_eq!(director.armed_timers(), 0);
        assert!(!director.status().in_progress);
    }
}
