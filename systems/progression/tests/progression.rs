use std::time::Duration;

use horde_core::{Archetype, Command, EnemyId, Event, GameConfig, SpawnPointId, Vec2};
use horde_system_progression::{Progression, Upgrade, Weapon};
use horde_world::{self as world, query, World};

struct Harness {
    world: World,
    progression: Progression,
    weapon: Weapon,
    log: Vec<Event>,
}

impl Harness {
    fn new(config: &GameConfig) -> Self {
        let mut harness = Self {
            world: World::new(config),
            progression: Progression::new(config),
            weapon: Weapon::new(&config.progression),
            log: Vec::new(),
        };
        harness.apply(Command::PlacePlayer {
            position: Vec2::new(100.0, 100.0),
        });
        harness
    }

    fn apply(&mut self, command: Command) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.pump(events);
    }

    fn pump(&mut self, mut events: Vec<Event>) {
        while !events.is_empty() {
            self.log.extend(events.iter().cloned());
            self.progression.handle(&events);
            let mut commands = Vec::new();
            self.weapon.handle(
                &events,
                &query::enemy_view(&self.world),
                query::player(&self.world),
                self.progression.stats(),
                &mut commands,
            );
            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    fn tick(&mut self, dt: Duration, count: usize) {
        for _ in 0..count {
            self.apply(Command::Tick { dt });
        }
    }

    fn spawn(&mut self, position: Vec2, archetype: Archetype) -> EnemyId {
        let spawn_point = SpawnPointId::new(query::spawn_points(&self.world).len() as u32);
        self.apply(Command::RegisterSpawnPoint { position });
        self.apply(Command::SpawnEnemy {
            spawn_point,
            archetype,
        });
        query::enemy_view(&self.world)
            .iter()
            .last()
            .map(|enemy| enemy.id)
            .expect("enemy spawned")
    }

    fn hits_on(&self, target: EnemyId) -> usize {
        self.log
            .iter()
            .filter(|event| matches!(event, Event::EnemyDamaged { enemy, .. } if *enemy == target))
            .count()
    }

    fn choose(&mut self, index: usize) -> Option<Upgrade> {
        let mut commands = Vec::new();
        let upgrade = self.progression.choose(index, &mut commands);
        for command in commands {
            self.apply(command);
        }
        upgrade
    }
}

#[test]
fn weapon_hits_the_nearest_enemy_in_range() {
    let mut harness = Harness::new(&GameConfig::default());
    let far = harness.spawn(Vec2::new(300.0, 100.0), Archetype::Melee);
    let near = harness.spawn(Vec2::new(150.0, 100.0), Archetype::Melee);
    let out_of_range = harness.spawn(Vec2::new(500.0, 100.0), Archetype::Melee);

    harness.tick(Duration::from_millis(16), 1);
    assert_eq!(harness.hits_on(near), 1);
    assert_eq!(harness.hits_on(far), 0);
    assert_eq!(harness.weapon.ammo(), 9);

    harness.tick(Duration::from_millis(16), 62);
    assert_eq!(harness.weapon.ammo(), 9, "one shot per second");

    harness.tick(Duration::from_millis(16), 1);
    assert_eq!(harness.hits_on(near), 2);
    assert_eq!(harness.hits_on(out_of_range), 0);
}

#[test]
fn empty_magazine_reloads_before_firing_again() {
    let mut config = GameConfig::default();
    config.progression.ammo = 2;
    config.progression.fire_rate = 10.0;
    config.progression.reload = Duration::from_millis(1_500);
    let mut harness = Harness::new(&config);
    let boss = harness.spawn(Vec2::new(150.0, 100.0), Archetype::Boss);
    let step = Duration::from_millis(100);

    harness.tick(step, 2);
    assert_eq!(harness.hits_on(boss), 2);
    assert_eq!(harness.weapon.ammo(), 0);
    assert!(harness.weapon.is_reloading());

    harness.tick(step, 14);
    assert_eq!(harness.hits_on(boss), 2);

    harness.tick(step, 1);
    assert!(!harness.weapon.is_reloading());
    assert_eq!(harness.hits_on(boss), 3);
    assert_eq!(harness.weapon.ammo(), 1);
}

#[test]
fn player_defeat_cancels_weapon_timers() {
    let mut harness = Harness::new(&GameConfig::default());
    let target = harness.spawn(Vec2::new(150.0, 100.0), Archetype::Boss);
    harness.tick(Duration::from_millis(16), 1);
    assert_eq!(harness.weapon.armed_timers(), 1);

    harness.apply(Command::DamagePlayer { amount: 99 });
    assert_eq!(harness.weapon.armed_timers(), 0);

    harness.tick(Duration::from_millis(500), 10);
    assert_eq!(harness.hits_on(target), 1);
}

#[test]
fn collected_orbs_level_the_player_up() {
    let mut harness = Harness::new(&GameConfig::default());
    let boss = harness.spawn(Vec2::new(110.0, 100.0), Archetype::Boss);
    harness.apply(Command::DamageEnemy {
        enemy: boss,
        amount: 1_000,
    });
    assert_eq!(harness.progression.level(), 1);

    harness.tick(Duration::from_millis(16), 1);
    assert_eq!(harness.progression.level(), 2);
    assert_eq!(harness.progression.experience(), 5);
    assert_eq!(harness.progression.pending_offers(), 1);
}

#[test]
fn health_upgrade_boosts_the_player() {
    let mut harness = Harness::new(&GameConfig::default());

    let mut boosted = false;
    for _ in 0..8 {
        harness.progression.gain(100);
        while let Some(offer) = harness.progression.pending_offer() {
            let index = offer
                .iter()
                .position(|upgrade| *upgrade == Upgrade::MaxHealth)
                .unwrap_or(0);
            if harness.choose(index) == Some(Upgrade::MaxHealth) {
                boosted = true;
                break;
            }
        }
        if boosted {
            break;
        }
    }
    assert!(boosted, "a health upgrade was offered");

    let player = query::player(&harness.world).expect("player placed");
    assert_eq!(player.max_health.get(), 6);
    assert_eq!(player.health.get(), 6);
    assert_eq!(harness.progression.stats().max_health(), 6);
}
