use horde_core::ProgressionConfig;

/// Highest level any upgrade can reach.
pub const MAX_UPGRADE_LEVEL: u8 = 5;

/// Player improvement offered on level up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Upgrade {
    /// Raises maximum health by 20 %.
    MaxHealth,
    /// Raises movement speed by 5 %.
    MoveSpeed,
    /// Raises weapon damage by 50 %.
    Damage,
    /// Raises the weapon's fire rate by 50 %.
    FireRate,
}

impl Upgrade {
    /// Every upgrade, in offer order before shuffling.
    pub const ALL: [Self; 4] = [Self::MaxHealth, Self::MoveSpeed, Self::Damage, Self::FireRate];

    /// Fractional bonus granted by each level.
    #[must_use]
    pub const fn bonus(self) -> f32 {
        match self {
            Self::MaxHealth => 0.2,
            Self::MoveSpeed => 0.05,
            Self::Damage | Self::FireRate => 0.5,
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::MaxHealth => 0,
            Self::MoveSpeed => 1,
            Self::Damage => 2,
            Self::FireRate => 3,
        }
    }
}

/// Player statistics derived from the base configuration and upgrade levels.
///
/// Bonuses compound: each level multiplies the current value by
/// `1 + bonus`.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStats {
    max_health: u32,
    base_move_speed: f32,
    base_damage: u32,
    base_fire_rate: f32,
    levels: [u8; 4],
}

impl PlayerStats {
    /// Creates stats with no upgrades applied.
    #[must_use]
    pub fn new(config: &ProgressionConfig, max_health: u32) -> Self {
        Self {
            max_health,
            base_move_speed: config.move_speed,
            base_damage: config.weapon_damage,
            base_fire_rate: config.fire_rate,
            levels: [0; 4],
        }
    }

    /// Level reached by an upgrade.
    #[must_use]
    pub const fn level(&self, upgrade: Upgrade) -> u8 {
        self.levels[upgrade.slot()]
    }

    /// Reports whether an upgrade reached [`MAX_UPGRADE_LEVEL`].
    #[must_use]
    pub const fn is_maxed(&self, upgrade: Upgrade) -> bool {
        self.level(upgrade) >= MAX_UPGRADE_LEVEL
    }

    /// Raises an upgrade by one level.
    ///
    /// Returns the maximum health gained, zero for other upgrades, or `None`
    /// when the upgrade is already maxed.
    pub fn apply(&mut self, upgrade: Upgrade) -> Option<u32> {
        if self.is_maxed(upgrade) {
            return None;
        }
        self.levels[upgrade.slot()] += 1;
        if upgrade != Upgrade::MaxHealth {
            return Some(0);
        }
        let gain = ((self.max_health as f32 * upgrade.bonus()).round() as u32).max(1);
        self.max_health = self.max_health.saturating_add(gain);
        Some(gain)
    }

    /// Maximum player health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Follows maximum health changes reported by the world.
    pub fn sync_max_health(&mut self, max_health: u32) {
        self.max_health = max_health;
    }

    /// Movement speed in world units per second.
    #[must_use]
    pub fn move_speed(&self) -> f32 {
        self.base_move_speed * self.multiplier(Upgrade::MoveSpeed)
    }

    /// Damage of a single weapon hit.
    #[must_use]
    pub fn damage(&self) -> u32 {
        (self.base_damage as f32 * self.multiplier(Upgrade::Damage)).round() as u32
    }

    /// Weapon shots per second.
    #[must_use]
    pub fn fire_rate(&self) -> f32 {
        self.base_fire_rate * self.multiplier(Upgrade::FireRate)
    }

    fn multiplier(&self, upgrade: Upgrade) -> f32 {
        (1.0 + upgrade.bonus()).powi(i32::from(self.level(upgrade)))
    }
}
