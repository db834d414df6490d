use std::time::Duration;

use horde_core::{WaveConfig, WaveDefinition, WaveSourceKind};

const BOSS_WAVE_INTERVAL: u32 = 4;
const BOSS_WAVE_SPAWN_DELAY: Duration = Duration::from_millis(1_000);
const BASE_SPAWN_DELAY_MS: u64 = 1_000;
const SPAWN_DELAY_STEP_MS: u64 = 50;
const MIN_SPAWN_DELAY_MS: u64 = 200;
const REGULAR_WAVE_DURATION: Duration = Duration::from_millis(30_000);

/// Where wave definitions come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WaveSource {
    /// Fixed list of waves; wave `n` is entry `n - 1`.
    Table(Vec<WaveDefinition>),
    /// Waves derived from the wave number by [`generate_wave`].
    Procedural,
}

impl WaveSource {
    /// Selects the wave source described by the configuration.
    #[must_use]
    pub fn from_config(config: &WaveConfig) -> Self {
        match config.source {
            WaveSourceKind::Procedural => Self::Procedural,
            WaveSourceKind::Table => Self::Table(config.table.clone()),
        }
    }

    /// Definition of wave `number`, counting from one.
    ///
    /// Returns `None` once a table is exhausted.
    #[must_use]
    pub fn wave(&self, number: u32) -> Option<WaveDefinition> {
        match self {
            Self::Table(table) => {
                let index = usize::try_from(number.checked_sub(1)?).ok()?;
                table.get(index).cloned()
            }
            Self::Procedural => Some(generate_wave(number)),
        }
    }
}

/// Builds the definition of wave `number` from the number alone.
///
/// Every fourth wave is a boss wave that must be cleared. Regular waves grow
/// linearly, spawn faster down to a floor, and alternate between time-gated
/// (odd) and defeat-gated (even) completion.
#[must_use]
pub fn generate_wave(number: u32) -> WaveDefinition {
    if number >= BOSS_WAVE_INTERVAL && number % BOSS_WAVE_INTERVAL == 0 {
        return WaveDefinition {
            melee: 2 + number / 2,
            ranged: 1 + number * 3 / 10,
            boss: (number - BOSS_WAVE_INTERVAL) / BOSS_WAVE_INTERVAL + 1,
            spawn_delay: BOSS_WAVE_SPAWN_DELAY,
            wave_duration: None,
            require_all_defeated: true,
        };
    }

    let delay = BASE_SPAWN_DELAY_MS
        .saturating_sub(SPAWN_DELAY_STEP_MS * u64::from(number))
        .max(MIN_SPAWN_DELAY_MS);
    WaveDefinition {
        melee: 5 + number,
        ranged: 3 + 2 * number,
        boss: 0,
        spawn_delay: Duration::from_millis(delay),
        wave_duration: Some(REGULAR_WAVE_DURATION),
        require_all_defeated: number % 2 == 0,
    }
}
