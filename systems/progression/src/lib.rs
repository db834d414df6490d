#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player progression: experience, level-up upgrade offers and the weapon.

mod stats;
mod weapon;

use std::collections::VecDeque;
use std::time::Duration;

use horde_core::{Command, Event, GameConfig};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use stats::{PlayerStats, Upgrade, MAX_UPGRADE_LEVEL};
pub use weapon::Weapon;

/// Upgrades offered per level up.
pub const OFFER_SIZE: usize = 3;

const EXPERIENCE_PER_LEVEL: u32 = 10;

/// Experience needed to advance from `level` to the next one.
#[must_use]
pub const fn level_threshold(level: u32) -> u32 {
    EXPERIENCE_PER_LEVEL.saturating_mul(level)
}

/// Tracks experience, levels and the upgrade offers they unlock.
#[derive(Debug)]
pub struct Progression {
    stats: PlayerStats,
    rng: ChaCha8Rng,
    time_scale: f32,
    clock: Duration,
    level: u32,
    experience: u32,
    offers: VecDeque<Vec<Upgrade>>,
}

impl Progression {
    /// Creates progression at level one with no experience.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            stats: PlayerStats::new(&config.progression, config.world.player_health),
            rng: ChaCha8Rng::seed_from_u64(config.progression.seed),
            time_scale: config.progression.experience_time_scale,
            clock: Duration::ZERO,
            level: 1,
            experience: 0,
            offers: VecDeque::new(),
        }
    }

    /// Consumes world events, collecting experience and tracking time.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.clock = self.clock.saturating_add(*dt),
                Event::ExperienceCollected { amount, .. } => self.gain(*amount),
                Event::PlayerHealthBoosted { max_health, .. } => {
                    self.stats.sync_max_health(max_health.get());
                }
                _ => {}
            }
        }
    }

    /// Multiplier applied to collected experience.
    ///
    /// Grows linearly with play time once it exceeds the configured scale.
    #[must_use]
    pub fn experience_multiplier(&self) -> f32 {
        if self.time_scale <= 0.0 {
            return 1.0;
        }
        (self.clock.as_secs_f32() / self.time_scale).max(1.0)
    }

    /// Adds experience, levelling up as many times as it allows.
    pub fn gain(&mut self, amount: u32) {
        let scaled = (amount as f32 * self.experience_multiplier()).floor() as u32;
        self.experience = self.experience.saturating_add(scaled);
        while self.experience >= level_threshold(self.level) {
            self.experience -= level_threshold(self.level);
            self.level += 1;
            log::info!("player reached level {}", self.level);
            self.queue_offer();
        }
    }

    fn queue_offer(&mut self) {
        let mut offer: Vec<Upgrade> = Upgrade::ALL
            .into_iter()
            .filter(|upgrade| !self.stats.is_maxed(*upgrade))
            .collect();
        if offer.is_empty() {
            log::debug!("every upgrade is maxed, no offer for level {}", self.level);
            return;
        }
        offer.shuffle(&mut self.rng);
        offer.truncate(OFFER_SIZE);
        self.offers.push_back(offer);
    }

    /// Upgrades offered for the oldest unclaimed level up.
    #[must_use]
    pub fn pending_offer(&self) -> Option<&[Upgrade]> {
        self.offers.front().map(Vec::as_slice)
    }

    /// Number of unclaimed offers.
    #[must_use]
    pub fn pending_offers(&self) -> usize {
        self.offers.len()
    }

    /// Claims the upgrade at `index` of the oldest offer.
    ///
    /// Health upgrades emit the matching [`Command::BoostPlayerHealth`].
    /// An index outside the offer leaves it pending.
    pub fn choose(&mut self, index: usize, out: &mut Vec<Command>) -> Option<Upgrade> {
        let upgrade = *self.offers.front()?.get(index)?;
        let _ = self.offers.pop_front();
        match self.stats.apply(upgrade) {
            Some(gain) => {
                log::info!(
                    "{upgrade:?} upgraded to level {}",
                    self.stats.level(upgrade)
                );
                if gain > 0 {
                    out.push(Command::BoostPlayerHealth { amount: gain });
                }
            }
            None => log::debug!("{upgrade:?} already maxed"),
        }
        Some(upgrade)
    }

    /// Current player statistics.
    #[must_use]
    pub const fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    /// Current level, starting at one.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience collected toward the next level.
    #[must_use]
    pub const fn experience(&self) -> u32 {
        self.experience
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_grow_with_level() {
        assert_eq!(level_threshold(1), 10);
        assert_eq!(level_threshold(4), 40);
    }

    #[test]
    fn multiplier_starts_at_one() {
        let mut progression = Progression::new(&GameConfig::default());
        assert_eq!(progression.experience_multiplier(), 1.0);
        progression.handle(&[Event::TimeAdvanced {
            dt: Duration::from_secs(1_200),
        }]);
        assert_eq!(progression.experience_multiplier(), 2.0);
    }

    #[test]
    fn one_large_gain_can_cross_several_levels() {
        let mut progression = Progression::new(&GameConfig::default());
        progression.gain(35);
        assert_eq!(progression.level(), 3);
        assert_eq!(progression.experience(), 5);
        assert_eq!(progression.pending_offers(), 2);
    }

    #[test]
    fn offers_hold_distinct_upgrades() {
        let mut progression = Progression::new(&GameConfig::default());
        progression.gain(10);
        let offer = progression.pending_offer().expect("offer queued").to_vec();
        assert_eq!(offer.len(), OFFER_SIZE);
        let mut unique = offer.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), offer.len());
    }

    #[test]
    fn out_of_range_choice_keeps_the_offer() {
        let mut progression = Progression::new(&GameConfig::default());
        progression.gain(10);
        let mut out = Vec::new();
        assert_eq!(progression.choose(OFFER_SIZE, &mut out), None);
        assert_eq!(progression.pending_offers(), 1);
        assert!(out.is_empty());
    }
}
