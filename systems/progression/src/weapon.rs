//! Player weapon that automatically hits the nearest enemy.

use std::time::Duration;

use horde_core::{
    Command, EnemyId, EnemyView, Event, PlayerSnapshot, ProgressionConfig, Scheduler, TimerId,
};

use crate::PlayerStats;

const MIN_FIRE_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WeaponTimer {
    Ready,
    Reloaded,
}

/// Magazine-fed hitscan weapon carried by the player.
#[derive(Debug)]
pub struct Weapon {
    magazine: u32,
    ammo: u32,
    range: f32,
    reload_time: Duration,
    timers: Scheduler<WeaponTimer>,
    cooldown: Option<TimerId>,
    reload: Option<TimerId>,
    disarmed: bool,
}

impl Weapon {
    /// Creates a weapon with a full magazine.
    #[must_use]
    pub fn new(config: &ProgressionConfig) -> Self {
        Self {
            magazine: config.ammo,
            ammo: config.ammo,
            range: config.range,
            reload_time: config.reload,
            timers: Scheduler::new(),
            cooldown: None,
            reload: None,
            disarmed: false,
        }
    }

    /// Consumes world events and fires at the nearest enemy when ready.
    ///
    /// Player defeat cancels every weapon timer and disarms the weapon.
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        player: Option<PlayerSnapshot>,
        stats: &PlayerStats,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = None;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    elapsed = Some(elapsed.unwrap_or(Duration::ZERO) + *dt);
                }
                Event::PlayerDefeated => self.disarm(),
                _ => {}
            }
        }

        let Some(elapsed) = elapsed else {
            return;
        };
        if self.disarmed {
            return;
        }

        self.timers.advance(elapsed);
        while let Some(fired) = self.timers.pop_due() {
            match fired.payload {
                WeaponTimer::Ready => {
                    if self.cooldown == Some(fired.id) {
                        self.cooldown = None;
                    }
                }
                WeaponTimer::Reloaded => {
                    if self.reload == Some(fired.id) {
                        self.reload = None;
                        self.ammo = self.magazine;
                    }
                }
            }
        }

        let Some(player) = player.filter(|player| player.alive) else {
            return;
        };
        if self.cooldown.is_some() || self.reload.is_some() || self.ammo == 0 {
            return;
        }
        let Some(target) = self.nearest_target(player, enemies) else {
            return;
        };

        out.push(Command::DamageEnemy {
            enemy: target,
            amount: stats.damage(),
        });
        self.ammo -= 1;
        self.cooldown = Some(
            self.timers
                .schedule_once(fire_interval(stats.fire_rate()), WeaponTimer::Ready),
        );
        if self.ammo == 0 {
            log::debug!("magazine empty, reloading");
            self.reload = Some(
                self.timers
                    .schedule_once(self.reload_time, WeaponTimer::Reloaded),
            );
        }
    }

    fn nearest_target(&self, player: PlayerSnapshot, enemies: &EnemyView) -> Option<EnemyId> {
        let mut best: Option<(f32, EnemyId)> = None;
        for enemy in enemies.iter() {
            let distance = enemy.position.distance(player.position);
            if distance > self.range {
                continue;
            }
            if best.map_or(true, |(closest, _)| distance < closest) {
                best = Some((distance, enemy.id));
            }
        }
        best.map(|(_, id)| id)
    }

    fn disarm(&mut self) {
        self.timers.clear();
        self.cooldown = None;
        self.reload = None;
        self.disarmed = true;
    }

    /// Shots left in the magazine.
    #[must_use]
    pub const fn ammo(&self) -> u32 {
        self.ammo
    }

    /// Reports whether the magazine is being refilled.
    #[must_use]
    pub const fn is_reloading(&self) -> bool {
        self.reload.is_some()
    }

    /// Number of armed weapon timers.
    #[must_use]
    pub fn armed_timers(&self) -> usize {
        self.timers.len()
    }
}

fn fire_interval(rate: f32) -> Duration {
    if !(rate.is_finite() && rate > 0.0) {
        return Duration::from_secs(1);
    }
    let millis = (1_000.0 / rate).round() as u64;
    Duration::from_millis(millis).max(MIN_FIRE_INTERVAL)
}
