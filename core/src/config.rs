//! Immutable configuration snapshot shared by every system.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Archetype, WaveDefinition};

/// Errors detected while validating a [`GameConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A numeric setting that must be strictly positive was not.
    #[error("`{field}` must be a positive number, got {value}")]
    NonPositive {
        /// Dotted path of the offending setting.
        field: String,
        /// Value that was supplied.
        value: f32,
    },
    /// A duration that must be non-zero was zero.
    #[error("`{field}` must be longer than zero")]
    ZeroDuration {
        /// Dotted path of the offending setting.
        field: String,
    },
    /// The avoidance influence must stay strictly below one.
    #[error("`avoidance.max_influence` must lie in [0, 1), got {0}")]
    InfluenceOutOfRange(f32),
    /// The grid builder was given no obstacle layers.
    #[error("`grid.obstacle_layers` must name at least one layer")]
    NoObstacleLayers,
    /// The wave table was selected but holds no waves.
    #[error("`waves.table` is selected but empty")]
    EmptyWaveTable,
    /// A time-gated table wave has no duration.
    #[error("wave {wave} is time-gated but has no `wave_duration_ms`")]
    MissingWaveDuration {
        /// One-based number of the offending wave.
        wave: usize,
    },
    /// A table wave spawns nothing.
    #[error("wave {wave} spawns no enemies")]
    EmptyWave {
        /// One-based number of the offending wave.
        wave: usize,
    },
}

/// Complete, validated configuration of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Player and world physics settings.
    pub world: WorldConfig,
    /// Grid builder settings.
    pub grid: GridConfig,
    /// Enemy movement settings.
    pub navigation: NavigationConfig,
    /// Local avoidance settings.
    pub avoidance: AvoidanceConfig,
    /// Melee enemy tuning.
    pub melee: CombatTuning,
    /// Ranged enemy tuning.
    pub ranged: CombatTuning,
    /// Boss enemy tuning.
    pub boss: CombatTuning,
    /// Wave source settings.
    pub waves: WaveConfig,
    /// Player progression and weapon settings.
    pub progression: ProgressionConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            grid: GridConfig::default(),
            navigation: NavigationConfig::default(),
            avoidance: AvoidanceConfig::default(),
            melee: CombatTuning::melee(),
            ranged: CombatTuning::ranged(),
            boss: CombatTuning::boss(),
            waves: WaveConfig::default(),
            progression: ProgressionConfig::default(),
        }
    }
}

impl GameConfig {
    /// Tuning of a specific archetype.
    #[must_use]
    pub const fn tuning(&self, archetype: Archetype) -> &CombatTuning {
        match archetype {
            Archetype::Melee => &self.melee,
            Archetype::Ranged => &self.ranged,
            Archetype::Boss => &self.boss,
        }
    }

    /// Checks every setting and returns the configuration unchanged when it
    /// is usable.
    pub fn validate(self) -> Result<Self, ConfigError> {
        positive("grid.tile_length", self.grid.tile_length)?;
        if self.grid.obstacle_layers.is_empty() {
            return Err(ConfigError::NoObstacleLayers);
        }
        positive("world.player_radius", self.world.player_radius)?;
        positive("world.pickup_radius", self.world.pickup_radius)?;
        non_zero("world.projectile_lifetime_ms", self.world.projectile_lifetime)?;
        non_zero("navigation.path_refresh_ms", self.navigation.path_refresh)?;
        positive("avoidance.radius", self.avoidance.radius)?;
        positive("avoidance.sensor_radius", self.avoidance.sensor_radius)?;
        if !(0.0..1.0).contains(&self.avoidance.max_influence) {
            return Err(ConfigError::InfluenceOutOfRange(
                self.avoidance.max_influence,
            ));
        }
        for (label, tuning) in [
            ("melee", &self.melee),
            ("ranged", &self.ranged),
            ("boss", &self.boss),
        ] {
            tuning.validate(label)?;
        }
        if self.waves.source == WaveSourceKind::Table {
            if self.waves.table.is_empty() {
                return Err(ConfigError::EmptyWaveTable);
            }
            for (index, wave) in self.waves.table.iter().enumerate() {
                let number = index + 1;
                if wave.counts().is_empty() {
                    return Err(ConfigError::EmptyWave { wave: number });
                }
                if !wave.require_all_defeated && wave.wave_duration.is_none() {
                    return Err(ConfigError::MissingWaveDuration { wave: number });
                }
            }
        }
        positive("progression.fire_rate", self.progression.fire_rate)?;
        positive("progression.range", self.progression.range)?;
        non_zero("progression.reload_ms", self.progression.reload)?;
        Ok(self)
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive {
            field: field.to_owned(),
            value,
        })
    }
}

fn non_zero(field: &str, value: Duration) -> Result<(), ConfigError> {
    if value.is_zero() {
        Err(ConfigError::ZeroDuration {
            field: field.to_owned(),
        })
    } else {
        Ok(())
    }
}

/// Player and world physics settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Hit points the player starts with.
    pub player_health: u32,
    /// Collision radius of the player used for projectile hits.
    pub player_radius: f32,
    /// Distance within which experience orbs are collected.
    pub pickup_radius: f32,
    /// Time after which an enemy projectile disappears.
    #[serde(rename = "projectile_lifetime_ms", with = "crate::millis")]
    pub projectile_lifetime: Duration,
    /// Damage dealt by an enemy projectile hit.
    pub projectile_damage: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            player_health: 5,
            player_radius: 16.0,
            pickup_radius: 24.0,
            projectile_lifetime: Duration::from_millis(5_000),
            projectile_damage: 1,
        }
    }
}

/// Grid builder settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Side length of a tile in world units.
    pub tile_length: f32,
    /// Names of the tile layers whose tiles block movement.
    pub obstacle_layers: Vec<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_length: 32.0,
            obstacle_layers: vec![String::from("walls"), String::from("obstacles")],
        }
    }
}

/// Source of enemy movement directions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementStrategy {
    /// Each enemy follows its own A* path.
    #[default]
    Pathfinding,
    /// Every enemy samples a shared flow field.
    FlowField,
}

/// Enemy movement settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Movement source used by every enemy.
    pub strategy: MovementStrategy,
    /// Interval between path re-requests of a single enemy.
    #[serde(rename = "path_refresh_ms", with = "crate::millis")]
    pub path_refresh: Duration,
    /// Maximum number of path requests resolved per tick.
    pub path_budget: usize,
    /// Distance the target must move before the flow field is regenerated.
    pub flow_field_epsilon: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            strategy: MovementStrategy::default(),
            path_refresh: Duration::from_millis(500),
            path_budget: 8,
            flow_field_epsilon: 4.0,
        }
    }
}

/// Local avoidance technique.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvoidanceKind {
    /// Inverse-distance repulsion from nearby enemies.
    #[default]
    Repulsion,
    /// Ring of collision probes around each enemy.
    Sensors,
}

/// Local avoidance settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    /// Technique applied to every enemy.
    pub kind: AvoidanceKind,
    /// Neighbour distance that triggers repulsion or probe contact.
    pub radius: f32,
    /// Distance of the sensor probes from the enemy centre.
    pub sensor_radius: f32,
    /// Upper bound of the avoidance correction's magnitude.
    pub max_influence: f32,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            kind: AvoidanceKind::default(),
            radius: 50.0,
            sensor_radius: 18.0,
            max_influence: 0.75,
        }
    }
}

/// Combat and movement tuning of one archetype.
///
/// An archetype section in a configuration file replaces the archetype's
/// defaults as a whole, so every field must be given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatTuning {
    /// Hit points at spawn.
    pub health: u32,
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Distance from which the archetype attacks.
    pub attack_range: f32,
    /// Cooldown between attacks.
    #[serde(rename = "attack_rate_ms", with = "crate::millis")]
    pub attack_rate: Duration,
    /// Speed of fired projectiles in world units per second.
    pub projectile_speed: f32,
    /// Damage of a melee hit.
    pub attack_damage: u32,
    /// Experience stored in the orb dropped on death.
    pub experience: u32,
}

impl CombatTuning {
    /// Default melee tuning.
    #[must_use]
    pub fn melee() -> Self {
        Self {
            health: 5,
            move_speed: 120.0,
            attack_range: 50.0,
            attack_rate: Duration::from_millis(1_500),
            projectile_speed: 0.0,
            attack_damage: 1,
            experience: 1,
        }
    }

    /// Default ranged tuning.
    #[must_use]
    pub fn ranged() -> Self {
        Self {
            health: 5,
            move_speed: 100.0,
            attack_range: 600.0,
            attack_rate: Duration::from_millis(1_000),
            projectile_speed: 600.0,
            attack_damage: 0,
            experience: 1,
        }
    }

    /// Default boss tuning.
    #[must_use]
    pub fn boss() -> Self {
        Self {
            health: 100,
            move_speed: 60.0,
            attack_range: 400.0,
            attack_rate: Duration::from_millis(3_000),
            projectile_speed: 300.0,
            attack_damage: 1,
            experience: 15,
        }
    }

    fn validate(&self, label: &str) -> Result<(), ConfigError> {
        if self.health == 0 {
            return Err(ConfigError::NonPositive {
                field: format!("{label}.health"),
                value: 0.0,
            });
        }
        positive(&format!("{label}.move_speed"), self.move_speed)?;
        positive(&format!("{label}.attack_range"), self.attack_range)?;
        non_zero(&format!("{label}.attack_rate_ms"), self.attack_rate)
    }
}

/// Origin of wave definitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveSourceKind {
    /// Waves are generated from the wave number.
    #[default]
    Procedural,
    /// Waves are read from a fixed table; the session ends after the last.
    Table,
}

/// Wave source settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Where wave definitions come from.
    pub source: WaveSourceKind,
    /// Fixed wave table, used when `source` is `table`.
    pub table: Vec<WaveDefinition>,
    /// Seed of the spawn point selection.
    pub seed: u64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            source: WaveSourceKind::default(),
            table: Vec::new(),
            seed: 0x5EED,
        }
    }
}

/// Player progression and weapon settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// Damage of a single weapon hit before upgrades.
    pub weapon_damage: u32,
    /// Shots per second before upgrades.
    pub fire_rate: f32,
    /// Shots per magazine.
    pub ammo: u32,
    /// Time needed to refill the magazine.
    #[serde(rename = "reload_ms", with = "crate::millis")]
    pub reload: Duration,
    /// Maximum distance to a weapon target.
    pub range: f32,
    /// Seconds of play after which collected experience is multiplied.
    pub experience_time_scale: f32,
    /// Player movement speed in world units per second before upgrades.
    pub move_speed: f32,
    /// Seed of the upgrade offer shuffling.
    pub seed: u64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            weapon_damage: 1,
            fire_rate: 1.0,
            ammo: 10,
            reload: Duration::from_millis(1_500),
            range: 300.0,
            experience_time_scale: 600.0,
            move_speed: 180.0,
            seed: 0xC0FFEE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CombatTuning, ConfigError, GameConfig, WaveSourceKind};
    use crate::WaveDefinition;
    use std::time::Duration;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default().validate().expect("defaults validate");
        assert_eq!(config.melee, CombatTuning::melee());
    }

    #[test]
    fn rejects_full_avoidance_influence() {
        let mut config = GameConfig::default();
        config.avoidance.max_influence = 1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InfluenceOutOfRange(1.0))
        );
    }

    #[test]
    fn rejects_time_gated_table_wave_without_duration() {
        let mut config = GameConfig::default();
        config.waves.source = WaveSourceKind::Table;
        config.waves.table = vec![WaveDefinition {
            melee: 2,
            ranged: 0,
            boss: 0,
            spawn_delay: Duration::from_millis(500),
            wave_duration: None,
            require_all_defeated: false,
        }];
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingWaveDuration { wave: 1 })
        );
    }

    #[test]
    fn rejects_empty_wave_table() {
        let mut config = GameConfig::default();
        config.waves.source = WaveSourceKind::Table;
        assert_eq!(config.validate(), Err(ConfigError::EmptyWaveTable));
    }
}
