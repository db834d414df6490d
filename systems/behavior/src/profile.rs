//! Archetype-specific combat decisions.

use std::time::Duration;

use horde_core::{Archetype, CombatTuning, Command, GameConfig, Health, Vec2};

use crate::boss::{Boss, BossPhase};

/// Fraction of the attack range inside which a ranged enemy with line of
/// sight stops approaching.
const RANGED_HOLD_FRACTION: f32 = 0.8;

/// What an enemy does during the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stance {
    /// Move toward the player.
    Seek,
    /// Stand still while in range.
    Hold,
    /// Perform the archetype's attack.
    Attack,
}

/// Facts about an enemy's relation to the player used to pick a stance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Situation {
    /// Distance between the enemy and the player in world units.
    pub distance: f32,
    /// Whether the straight line to the player crosses only walkable tiles.
    ///
    /// Always `true` for profiles that do not require line of sight.
    pub line_of_sight: bool,
    /// Whether the attack cooldown has elapsed.
    pub ready: bool,
}

/// Geometry of an attack at the moment it is carried out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    /// World position of the attacker.
    pub origin: Vec2,
    /// World position of the player.
    pub target: Vec2,
    /// Simulation time of the attack.
    pub clock: Duration,
    /// Zero-based index of the burst within a staged volley.
    pub burst: u8,
}

impl Strike {
    /// Unit direction from the attacker toward the player.
    ///
    /// Falls back to the positive x axis when both positions coincide.
    #[must_use]
    pub fn aim(&self) -> Vec2 {
        (self.target - self.origin).try_normalize().unwrap_or(Vec2::X)
    }
}

/// Output of an attack: immediate commands plus bursts to fire later.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Volley {
    commands: Vec<Command>,
    bursts: Vec<(Duration, u8)>,
}

impl Volley {
    /// Queues a command to apply immediately.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Requests a follow-up burst after `delay`.
    pub fn schedule_burst(&mut self, delay: Duration, burst: u8) {
        self.bursts.push((delay, burst));
    }

    /// Splits the volley into immediate commands and delayed bursts.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Command>, Vec<(Duration, u8)>) {
        (self.commands, self.bursts)
    }
}

/// Combat strategy of one archetype.
pub trait CombatProfile: std::fmt::Debug {
    /// Archetype the profile drives.
    fn archetype(&self) -> Archetype;

    /// Tuning applied to the archetype.
    fn tuning(&self) -> &CombatTuning;

    /// Whether stance decisions need a line-of-sight test.
    fn requires_line_of_sight(&self) -> bool {
        false
    }

    /// Picks the stance for the current tick.
    fn decide(&self, situation: &Situation) -> Stance;

    /// Carries out an attack.
    fn attack(&mut self, strike: &Strike, volley: &mut Volley);

    /// Fires a delayed burst requested by an earlier attack.
    fn burst(&mut self, _strike: &Strike, _out: &mut Vec<Command>) {}

    /// Reacts to the enemy's health changing.
    fn observe_health(&mut self, _health: Health, _max_health: Health) {}

    /// Current boss phase, for profiles that have phases.
    fn phase(&self) -> Option<BossPhase> {
        None
    }

    /// Whether the profile raised its visual alert.
    fn alert(&self) -> bool {
        false
    }
}

/// Creates the combat profile of an archetype.
#[must_use]
pub fn for_archetype(archetype: Archetype, config: &GameConfig) -> Box<dyn CombatProfile> {
    let tuning = config.tuning(archetype).clone();
    match archetype {
        Archetype::Melee => Box::new(Melee { tuning }),
        Archetype::Ranged => Box::new(Ranged { tuning }),
        Archetype::Boss => Box::new(Boss::new(tuning)),
    }
}

/// Close-combat profile that hits the player from contact range.
#[derive(Clone, Debug, PartialEq)]
pub struct Melee {
    tuning: CombatTuning,
}

impl Melee {
    /// Creates a melee profile.
    #[must_use]
    pub const fn new(tuning: CombatTuning) -> Self {
        Self { tuning }
    }
}

impl CombatProfile for Melee {
    fn archetype(&self) -> Archetype {
        Archetype::Melee
    }

    fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    fn decide(&self, situation: &Situation) -> Stance {
        close_combat_stance(situation, self.tuning.attack_range)
    }

    fn attack(&mut self, _strike: &Strike, volley: &mut Volley) {
        volley.push(Command::DamagePlayer {
            amount: self.tuning.attack_damage,
        });
    }
}

/// Shooter profile that keeps its distance and fires single projectiles.
#[derive(Clone, Debug, PartialEq)]
pub struct Ranged {
    tuning: CombatTuning,
}

impl Ranged {
    /// Creates a ranged profile.
    #[must_use]
    pub const fn new(tuning: CombatTuning) -> Self {
        Self { tuning }
    }
}

impl CombatProfile for Ranged {
    fn archetype(&self) -> Archetype {
        Archetype::Ranged
    }

    fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    fn requires_line_of_sight(&self) -> bool {
        true
    }

    fn decide(&self, situation: &Situation) -> Stance {
        let range = self.tuning.attack_range;
        if !situation.line_of_sight {
            return Stance::Seek;
        }
        if situation.distance <= range && situation.ready {
            Stance::Attack
        } else if situation.distance <= range * RANGED_HOLD_FRACTION {
            Stance::Hold
        } else {
            Stance::Seek
        }
    }

    fn attack(&mut self, strike: &Strike, volley: &mut Volley) {
        volley.push(Command::FireProjectile {
            origin: strike.origin,
            velocity: strike.aim() * self.tuning.projectile_speed,
        });
    }
}

/// Stance rule shared by profiles that fight from contact range.
pub(crate) fn close_combat_stance(situation: &Situation, range: f32) -> Stance {
    if situation.distance > range {
        Stance::Seek
    } else if situation.ready {
        Stance::Attack
    } else {
        Stance::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn situation(distance: f32, line_of_sight: bool, ready: bool) -> Situation {
        Situation {
            distance,
            line_of_sight,
            ready,
        }
    }

    #[test]
    fn melee_attacks_only_when_ready_in_range() {
        let melee = Melee::new(CombatTuning::melee());
        assert_eq!(melee.decide(&situation(40.0, true, true)), Stance::Attack);
        assert_eq!(melee.decide(&situation(40.0, true, false)), Stance::Hold);
        assert_eq!(melee.decide(&situation(60.0, true, true)), Stance::Seek);
    }

    #[test]
    fn ranged_holds_inside_comfort_distance() {
        let ranged = Ranged::new(CombatTuning::ranged());
        assert_eq!(ranged.decide(&situation(550.0, true, true)), Stance::Attack);
        assert_eq!(ranged.decide(&situation(400.0, true, false)), Stance::Hold);
        assert_eq!(ranged.decide(&situation(550.0, true, false)), Stance::Seek);
        assert_eq!(ranged.decide(&situation(100.0, false, true)), Stance::Seek);
        assert_eq!(ranged.decide(&situation(700.0, true, true)), Stance::Seek);
    }

    #[test]
    fn ranged_fires_toward_target_position() {
        let mut ranged = Ranged::new(CombatTuning::ranged());
        let mut volley = Volley::default();
        ranged.attack(
            &Strike {
                origin: Vec2::new(0.0, 0.0),
                target: Vec2::new(0.0, 10.0),
                clock: Duration::ZERO,
                burst: 0,
            },
            &mut volley,
        );
        let (commands, bursts) = volley.into_parts();
        assert!(bursts.is_empty());
        assert_eq!(
            commands,
            vec![Command::FireProjectile {
                origin: Vec2::ZERO,
                velocity: Vec2::new(0.0, 600.0),
            }]
        );
    }
}
