//! Multi-phase boss profile with staged projectile volleys.

use std::f32::consts::PI;
use std::time::Duration;

use horde_core::{unit_from_angle, Archetype, CombatTuning, Command, Health, Vec2};

use crate::profile::{close_combat_stance, CombatProfile, Situation, Stance, Strike, Volley};

/// Bursts fired per volley, including the immediate one.
pub const BURSTS_PER_VOLLEY: u8 = 3;

/// Delay between consecutive bursts of a volley.
pub const BURST_SPACING: Duration = Duration::from_millis(200);

/// Speed multipliers of the projectiles sharing a direction, so they
/// separate into concentric rings.
const RING_SPEEDS: [f32; 3] = [1.0, 1.25, 1.5];

const FAN_OFFSET: f32 = PI / 6.0;
const SPIRAL_DIRECTIONS: u32 = 12;
const SPIRAL_RADIANS_PER_MILLI: f32 = 0.01;
const SPIRAL_BURST_STEP: f32 = PI / 12.0;

/// Combat phase of a boss. Phases only ever advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BossPhase {
    /// Above 60 % health.
    One,
    /// At most 60 % health.
    Two,
    /// At most 30 % health.
    Three,
}

impl BossPhase {
    /// Phase matching a health fraction.
    ///
    /// The phase three threshold is tested first so a single hit that
    /// crosses both thresholds lands directly in phase three.
    #[must_use]
    pub fn for_health(health: Health, max_health: Health) -> Self {
        let health = u64::from(health.get());
        let max = u64::from(max_health.get());
        if health * 10 <= max * 3 {
            Self::Three
        } else if health * 10 <= max * 6 {
            Self::Two
        } else {
            Self::One
        }
    }
}

/// Pattern and aim locked in when a volley starts.
#[derive(Clone, Copy, Debug, PartialEq)]
struct VolleyPlan {
    phase: BossPhase,
    aim: Vec2,
}

/// Boss profile: fights from range with phase-dependent volleys.
#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    tuning: CombatTuning,
    phase: BossPhase,
    alert: bool,
    volley: Option<VolleyPlan>,
}

impl Boss {
    /// Creates a boss profile in phase one.
    #[must_use]
    pub const fn new(tuning: CombatTuning) -> Self {
        Self {
            tuning,
            phase: BossPhase::One,
            alert: false,
            volley: None,
        }
    }

    fn plan_for(&self, strike: &Strike) -> VolleyPlan {
        VolleyPlan {
            phase: self.phase,
            aim: strike.aim(),
        }
    }

    /// Fires one burst. Phases one and two keep the aim the volley started
    /// with; the phase three ring follows the clock of the burst itself.
    fn fire_pattern(&self, plan: VolleyPlan, strike: &Strike, out: &mut Vec<Command>) {
        let speed = self.tuning.projectile_speed;
        let mut fire = |direction: Vec2| {
            for multiplier in RING_SPEEDS {
                out.push(Command::FireProjectile {
                    origin: strike.origin,
                    velocity: direction * speed * multiplier,
                });
            }
        };

        match plan.phase {
            BossPhase::One => fire(plan.aim),
            BossPhase::Two => {
                let heading = plan.aim.y.atan2(plan.aim.x);
                for offset in [-FAN_OFFSET, 0.0, FAN_OFFSET] {
                    fire(unit_from_angle(heading + offset));
                }
            }
            BossPhase::Three => {
                let base = strike.clock.as_millis() as f32 * SPIRAL_RADIANS_PER_MILLI
                    + f32::from(strike.burst) * SPIRAL_BURST_STEP;
                let spacing = 2.0 * PI / SPIRAL_DIRECTIONS as f32;
                for index in 0..SPIRAL_DIRECTIONS {
                    fire(unit_from_angle(base + index as f32 * spacing));
                }
            }
        }
    }
}

impl CombatProfile for Boss {
    fn archetype(&self) -> Archetype {
        Archetype::Boss
    }

    fn tuning(&self) -> &CombatTuning {
        &self.tuning
    }

    fn decide(&self, situation: &Situation) -> Stance {
        close_combat_stance(situation, self.tuning.attack_range)
    }

    fn attack(&mut self, strike: &Strike, volley: &mut Volley) {
        let plan = self.plan_for(strike);
        self.volley = Some(plan);
        let mut commands = Vec::new();
        self.fire_pattern(plan, &Strike { burst: 0, ..*strike }, &mut commands);
        for command in commands {
            volley.push(command);
        }
        for burst in 1..BURSTS_PER_VOLLEY {
            volley.schedule_burst(BURST_SPACING * u32::from(burst), burst);
        }
    }

    fn burst(&mut self, strike: &Strike, out: &mut Vec<Command>) {
        let plan = self.volley.unwrap_or_else(|| self.plan_for(strike));
        self.fire_pattern(plan, strike, out);
        if strike.burst + 1 >= BURSTS_PER_VOLLEY {
            self.volley = None;
        }
    }

    fn observe_health(&mut self, health: Health, max_health: Health) {
        let phase = BossPhase::for_health(health, max_health);
        if phase <= self.phase {
            return;
        }
        log::info!("boss enters phase {phase:?}");
        self.phase = phase;
        if phase == BossPhase::Three {
            self.alert = true;
        }
    }

    fn phase(&self) -> Option<BossPhase> {
        Some(self.phase)
    }

    fn alert(&self) -> bool {
        self.alert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strike(clock: Duration, burst: u8) -> Strike {
        Strike {
            origin: Vec2::new(100.0, 100.0),
            target: Vec2::new(200.0, 100.0),
            clock,
            burst,
        }
    }

    fn velocities(commands: &[Command]) -> Vec<Vec2> {
        commands
            .iter()
            .filter_map(|command| match command {
                Command::FireProjectile { velocity, .. } => Some(*velocity),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn phase_thresholds_use_health_fraction() {
        let max = Health::new(100);
        assert_eq!(BossPhase::for_health(Health::new(61), max), BossPhase::One);
        assert_eq!(BossPhase::for_health(Health::new(60), max), BossPhase::Two);
        assert_eq!(BossPhase::for_health(Health::new(31), max), BossPhase::Two);
        assert_eq!(BossPhase::for_health(Health::new(30), max), BossPhase::Three);
        assert_eq!(BossPhase::for_health(Health::new(0), max), BossPhase::Three);
    }

    #[test]
    fn single_hit_across_both_thresholds_reaches_phase_three() {
        let mut boss = Boss::new(CombatTuning::boss());
        boss.observe_health(Health::new(10), Health::new(100));
        assert_eq!(boss.phase(), Some(BossPhase::Three));
        assert!(boss.alert());
    }

    #[test]
    fn phase_never_regresses() {
        let mut boss = Boss::new(CombatTuning::boss());
        boss.observe_health(Health::new(50), Health::new(100));
        boss.observe_health(Health::new(90), Health::new(100));
        assert_eq!(boss.phase(), Some(BossPhase::Two));
        assert!(!boss.alert());
    }

    #[test]
    fn phase_one_fires_three_rings_along_the_aim_line() {
        let mut boss = Boss::new(CombatTuning::boss());
        let mut volley = Volley::default();
        boss.attack(&strike(Duration::ZERO, 0), &mut volley);
        let (commands, bursts) = volley.into_parts();

        assert_eq!(
            velocities(&commands),
            vec![
                Vec2::new(300.0, 0.0),
                Vec2::new(375.0, 0.0),
                Vec2::new(450.0, 0.0)
            ]
        );
        assert_eq!(
            bursts,
            vec![
                (Duration::from_millis(200), 1),
                (Duration::from_millis(400), 2)
            ]
        );
    }

    #[test]
    fn volley_keeps_its_pattern_and_aim_across_a_phase_change() {
        let mut boss = Boss::new(CombatTuning::boss());
        let mut volley = Volley::default();
        boss.attack(&strike(Duration::ZERO, 0), &mut volley);
        let (opening, _) = volley.into_parts();
        assert_eq!(velocities(&opening).len(), 3);

        boss.observe_health(Health::new(20), Health::new(100));
        assert_eq!(boss.phase(), Some(BossPhase::Three));

        let moved = Strike {
            target: Vec2::new(100.0, 300.0),
            ..strike(Duration::from_millis(200), 1)
        };
        let mut out = Vec::new();
        boss.burst(&moved, &mut out);
        assert_eq!(velocities(&out), velocities(&opening));

        let mut out = Vec::new();
        boss.burst(&Strike { burst: 2, ..moved }, &mut out);
        assert_eq!(velocities(&out), velocities(&opening));

        let mut next = Volley::default();
        boss.attack(&strike(Duration::from_millis(1_000), 0), &mut next);
        let (commands, _) = next.into_parts();
        assert_eq!(velocities(&commands).len(), 36);
    }

    #[test]
    fn phase_two_fans_out_in_three_directions() {
        let mut boss = Boss::new(CombatTuning::boss());
        boss.observe_health(Health::new(55), Health::new(100));
        let mut out = Vec::new();
        boss.burst(&strike(Duration::ZERO, 1), &mut out);

        let velocities = velocities(&out);
        assert_eq!(velocities.len(), 9);
        let headings: Vec<f32> = velocities
            .iter()
            .step_by(3)
            .map(|velocity| velocity.y.atan2(velocity.x))
            .collect();
        for (heading, expected) in headings.iter().zip([-FAN_OFFSET, 0.0, FAN_OFFSET]) {
            assert!((heading - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn phase_three_spiral_rotates_with_clock_and_burst() {
        let mut boss = Boss::new(CombatTuning::boss());
        boss.observe_health(Health::new(20), Health::new(100));
        let mut out = Vec::new();
        boss.burst(&strike(Duration::from_millis(100), 2), &mut out);

        let velocities = velocities(&out);
        assert_eq!(velocities.len(), 36);
        let first = velocities[0].normalize();
        let expected = unit_from_angle(1.0 + 2.0 * SPIRAL_BURST_STEP);
        assert!((first - expected).length() < 1e-4);
    }
}
