#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Local avoidance corrections that keep enemies from stacking up or
//! grinding against walls.

use std::f32::consts::FRAC_PI_4;

use horde_core::{unit_from_angle, AvoidanceConfig, AvoidanceKind, EnemyId, TraversalGrid, Vec2};

/// Upper bound applied to the correction weight so the desired direction
/// always dominates the blend.
const INFLUENCE_CEILING: f32 = 0.95;

const PROBE_COUNT: usize = 8;

/// Position of another enemy near the one being steered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// Identifier of the neighbouring enemy.
    pub id: EnemyId,
    /// World position of the neighbouring enemy.
    pub position: Vec2,
}

/// Everything an avoidance technique may inspect for one enemy.
#[derive(Clone, Copy, Debug)]
pub struct Surroundings<'a> {
    /// Enemy being steered.
    pub id: EnemyId,
    /// World position of the enemy being steered.
    pub position: Vec2,
    /// Other enemies; entries carrying `id` are ignored.
    pub neighbors: &'a [Neighbor],
    /// Static traversal grid.
    pub grid: &'a TraversalGrid,
}

/// Technique producing a steering correction for a single enemy.
///
/// Implementations may keep state between ticks, so each enemy owns its own
/// instance.
pub trait Avoidance: std::fmt::Debug {
    /// Correction vector to blend into the enemy's desired direction.
    fn correction(&mut self, surroundings: &Surroundings<'_>) -> Vec2;
}

/// Creates the avoidance technique selected by the configuration.
#[must_use]
pub fn from_config(config: &AvoidanceConfig) -> Box<dyn Avoidance> {
    match config.kind {
        AvoidanceKind::Repulsion => Box::new(Repulsion::new(config.radius)),
        AvoidanceKind::Sensors => Box::new(SensorRing::new(config.sensor_radius, config.radius)),
    }
}

/// Inverse-distance push away from every neighbour within a radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Repulsion {
    radius: f32,
}

impl Repulsion {
    /// Creates a repulsion acting within `radius` world units.
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self { radius }
    }
}

impl Avoidance for Repulsion {
    fn correction(&mut self, surroundings: &Surroundings<'_>) -> Vec2 {
        let mut push = Vec2::ZERO;
        for neighbor in surroundings.neighbors {
            if neighbor.id == surroundings.id {
                continue;
            }
            let away = surroundings.position - neighbor.position;
            let distance = away.length();
            // Coincident bodies have no direction to separate along.
            if distance <= f32::EPSILON || distance >= self.radius {
                continue;
            }
            push += away / distance * ((self.radius - distance) / self.radius);
        }
        push
    }
}

/// Ring of eight probes that push away from walls and neighbours they touch.
///
/// A probe's push stays applied for as long as its contact persists and is
/// dropped as soon as the contact ends.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorRing {
    probe_radius: f32,
    contact_radius: f32,
    contacts: [Option<Vec2>; PROBE_COUNT],
}

impl SensorRing {
    /// Creates a ring whose probes sit `probe_radius` from the enemy centre
    /// and touch neighbours closer than `contact_radius`.
    #[must_use]
    pub fn new(probe_radius: f32, contact_radius: f32) -> Self {
        Self {
            probe_radius,
            contact_radius,
            contacts: [None; PROBE_COUNT],
        }
    }

    /// Number of probes currently in contact.
    #[must_use]
    pub fn active_contacts(&self) -> usize {
        self.contacts.iter().flatten().count()
    }

    fn touches(&self, probe: Vec2, surroundings: &Surroundings<'_>) -> bool {
        if !surroundings.grid.is_walkable_at(probe) {
            return true;
        }
        surroundings.neighbors.iter().any(|neighbor| {
            neighbor.id != surroundings.id
                && neighbor.position.distance(probe) < self.contact_radius
        })
    }
}

impl Avoidance for SensorRing {
    fn correction(&mut self, surroundings: &Surroundings<'_>) -> Vec2 {
        for slot in 0..PROBE_COUNT {
            let direction = unit_from_angle(slot as f32 * FRAC_PI_4);
            let probe = surroundings.position + direction * self.probe_radius;
            let touching = self.touches(probe, surroundings);
            self.contacts[slot] = match (touching, self.contacts[slot]) {
                (true, Some(push)) => Some(push),
                (true, None) => Some(-direction),
                (false, _) => None,
            };
        }
        self.contacts.iter().flatten().copied().sum()
    }
}

/// Blends an avoidance correction into a desired movement direction.
///
/// The correction is clamped to `max_influence` (itself capped below one) so
/// it can bend but never cancel the desired direction. The result has unit
/// length, unless `desired` is zero, in which case it is zero.
#[must_use]
pub fn blend(desired: Vec2, correction: Vec2, max_influence: f32) -> Vec2 {
    let Some(direction) = desired.try_normalize() else {
        return Vec2::ZERO;
    };
    let influence = if max_influence.is_finite() {
        max_influence.clamp(0.0, INFLUENCE_CEILING)
    } else {
        0.0
    };
    let correction = if correction.is_finite() {
        correction.clamp_length_max(influence)
    } else {
        Vec2::ZERO
    };
    (direction + correction).try_normalize().unwrap_or(direction)
}
