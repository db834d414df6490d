//! Wave definitions and per-archetype enemy counts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Archetype;

/// Number of enemies per archetype.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArchetypeCounts {
    /// Melee enemies.
    pub melee: u32,
    /// Ranged enemies.
    pub ranged: u32,
    /// Boss enemies.
    pub boss: u32,
}

impl ArchetypeCounts {
    /// Creates a new set of counts.
    #[must_use]
    pub const fn new(melee: u32, ranged: u32, boss: u32) -> Self {
        Self {
            melee,
            ranged,
            boss,
        }
    }

    /// Count stored for an archetype.
    #[must_use]
    pub const fn get(&self, archetype: Archetype) -> u32 {
        match archetype {
            Archetype::Melee => self.melee,
            Archetype::Ranged => self.ranged,
            Archetype::Boss => self.boss,
        }
    }

    fn slot(&mut self, archetype: Archetype) -> &mut u32 {
        match archetype {
            Archetype::Melee => &mut self.melee,
            Archetype::Ranged => &mut self.ranged,
            Archetype::Boss => &mut self.boss,
        }
    }

    /// Increments the count of an archetype.
    pub fn add(&mut self, archetype: Archetype) {
        let slot = self.slot(archetype);
        *slot = slot.saturating_add(1);
    }

    /// Decrements the count of an archetype.
    ///
    /// Returns `false`, leaving the counts untouched, when the count was
    /// already zero.
    pub fn take(&mut self, archetype: Archetype) -> bool {
        let slot = self.slot(archetype);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Sum of every archetype's count.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.melee
            .saturating_add(self.ranged)
            .saturating_add(self.boss)
    }

    /// Reports whether every count is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// First archetype in spawn priority order with a non-zero count.
    #[must_use]
    pub fn next_by_priority(&self) -> Option<Archetype> {
        Archetype::SPAWN_PRIORITY
            .into_iter()
            .find(|archetype| self.get(*archetype) > 0)
    }
}

/// Composition and pacing of a single wave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Melee enemies spawned during the wave.
    pub melee: u32,
    /// Ranged enemies spawned during the wave.
    pub ranged: u32,
    /// Boss enemies spawned during the wave.
    pub boss: u32,
    /// Interval between consecutive spawns.
    #[serde(rename = "spawn_delay_ms", with = "crate::millis")]
    pub spawn_delay: Duration,
    /// Time after which a time-gated wave may advance.
    #[serde(rename = "wave_duration_ms", with = "crate::millis::option", default)]
    pub wave_duration: Option<Duration>,
    /// Whether the wave only completes once every spawned enemy is defeated.
    pub require_all_defeated: bool,
}

impl WaveDefinition {
    /// Enemy quotas of the wave.
    #[must_use]
    pub const fn counts(&self) -> ArchetypeCounts {
        ArchetypeCounts::new(self.melee, self.ranged, self.boss)
    }

    /// Duration timer armed for the wave, if any.
    ///
    /// Only time-gated waves arm a duration timer.
    #[must_use]
    pub fn armed_duration(&self) -> Option<Duration> {
        if self.require_all_defeated {
            None
        } else {
            self.wave_duration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ArchetypeCounts, WaveDefinition};
    use crate::Archetype;
    use std::time::Duration;

    #[test]
    fn take_refuses_to_underflow() {
        let mut counts = ArchetypeCounts::new(1, 0, 0);
        assert!(counts.take(Archetype::Melee));
        assert!(!counts.take(Archetype::Melee));
        assert!(counts.is_empty());
    }

    #[test]
    fn priority_prefers_boss_then_melee_then_ranged() {
        let mut counts = ArchetypeCounts::new(1, 1, 1);
        let mut order = Vec::new();
        while let Some(archetype) = counts.next_by_priority() {
            assert!(counts.take(archetype));
            order.push(archetype);
        }
        assert_eq!(
            order,
            vec![Archetype::Boss, Archetype::Melee, Archetype::Ranged]
        );
    }

    #[test]
    fn defeat_gated_waves_never_arm_a_duration() {
        let wave = WaveDefinition {
            melee: 1,
            ranged: 0,
            boss: 0,
            spawn_delay: Duration::from_millis(500),
            wave_duration: Some(Duration::from_secs(30)),
            require_all_defeated: true,
        };
        assert_eq!(wave.armed_duration(), None);
        let timed = WaveDefinition {
            require_all_defeated: false,
            ..wave
        };
        assert_eq!(timed.armed_duration(), Some(Duration::from_secs(30)));
    }
}
