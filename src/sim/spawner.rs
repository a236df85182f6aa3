//! Wave, boss and derived-enemy spawning
//!
//! Spawners build `EnemySpawn` templates. Templates become live enemies (and
//! receive an id) through `admit`, which parks them in the spawn queue while
//! the live set is at the quality cap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::BossState;
use super::entity::{Behavior, Enemy, EnemyKind, EntityId};
use super::rng::SimRng;
use super::state::{GameEvent, Multipliers, World};

/// An enemy that has not entered the world yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: f32,
    pub speed: f32,
    pub generation: u8,
    pub drift_phase: f32,
    pub behavior: Behavior,
}

impl EnemySpawn {
    pub fn new(kind: EnemyKind, pos: Vec2, hp: f32, speed: f32) -> Self {
        Self {
            kind,
            pos,
            size: Vec2::splat(kind.size()),
            hp,
            speed,
            generation: if kind == EnemyKind::Splitter { 1 } else { 0 },
            drift_phase: 0.0,
            behavior: Behavior::Drift,
        }
    }

    pub fn with_size(mut self, edge: f32) -> Self {
        self.size = Vec2::splat(edge);
        self
    }

    pub fn with_generation(mut self, generation: u8) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_drift_phase(mut self, phase: f32) -> Self {
        self.drift_phase = phase;
        self
    }

    pub fn into_enemy(self, id: EntityId) -> Enemy {
        let mut enemy = Enemy::new(id, self.kind, self.pos, self.hp, self.speed);
        enemy.size = self.size;
        enemy.generation = self.generation;
        enemy.drift_phase = self.drift_phase;
        enemy.behavior = self.behavior;
        enemy
    }
}

/// Starting behavior state for a regular kind
pub fn initial_behavior(kind: EnemyKind, rng: &mut SimRng) -> Behavior {
    match kind {
        EnemyKind::Shooter => Behavior::Shooter {
            fire_cooldown: rng.range(1.8, 3.0),
        },
        EnemyKind::Dasher => Behavior::Dasher {
            dash_countdown: rng.range(1.2, 2.2),
        },
        EnemyKind::Shield => Behavior::Shield {
            shield_timer: rng.range(0.0, 1.0),
            active: false,
        },
        EnemyKind::Mini => Behavior::Homing,
        EnemyKind::BossArc | EnemyKind::BossChrono => Behavior::Boss(BossState::new()),
        _ => Behavior::Drift,
    }
}

/// Enemies in the wave for `level`: `floor((base + floor(level*growth)) * spawn_mul)`
pub fn wave_count(base: f32, growth: f32, level: u32, spawn_mul: f32) -> u32 {
    let per_level = (level as f32 * growth).floor();
    let count = ((base + per_level) * spawn_mul).floor();
    if count.is_finite() { count.max(0.0) as u32 } else { 0 }
}

/// Put an enemy into play, or queue it when the live set is full
pub fn admit(world: &mut World, spawn: EnemySpawn) {
    if world.enemies.len() < world.quality.max_enemies() && world.spawn_queue.is_empty() {
        go_live(world, spawn);
    } else {
        world.spawn_queue.push_back(spawn);
    }
}

fn go_live(world: &mut World, spawn: EnemySpawn) {
    let id = world.next_entity_id();
    world.enemies.push(spawn.into_enemy(id));
}

/// Move queued enemies into play while there is room under the cap
pub fn release_queued(world: &mut World) {
    let cap = world.quality.max_enemies();
    while world.enemies.len() < cap {
        let Some(spawn) = world.spawn_queue.pop_front() else {
            break;
        };
        go_live(world, spawn);
    }
}

/// Spawn the regular wave for `level`
pub fn spawn_wave(world: &mut World, level: u32) {
    let wave = &world.tuning.wave;
    let count = wave_count(wave.base_count, wave.growth_per_level, level, world.mods.enemy_spawn);
    let hp_scale = world.mods.enemy_hp * (1.0 + level as f32 * wave.hp_growth_per_level);
    let pool = world.tuning.pool_for_level(level);
    world.last_wave_count = count;

    let (w, h) = (world.arena.x, world.arena.y);
    let right = (w - crate::consts::MARGIN_X).max(crate::consts::MARGIN_X);
    for i in 0..count {
        let kind = pool[world.rng.index(pool.len())];
        let x = world.rng.range(crate::consts::MARGIN_X, right);
        let y = world.rng.range(-h * 0.6, -40.0);
        let (lo, hi) = kind.speed_range();
        let mut speed = world.rng.range(lo, hi) * world.mods.enemy_speed;
        if kind == EnemyKind::Shooter {
            speed *= 0.75;
        }
        let hp = kind.base_hp() * hp_scale;
        let behavior = initial_behavior(kind, &mut world.rng);
        let spawn = EnemySpawn::new(kind, Vec2::new(x, y), hp, speed)
            .with_behavior(behavior)
            .with_drift_phase(i as f32 * 0.2);
        admit(world, spawn);
    }
    log::debug!("level {} wave: {} enemies", level, count);
}

/// Boss scheduled for `level`, if any
pub fn boss_for_level(world: &World, level: u32) -> Option<EnemyKind> {
    let wave = &world.tuning.wave;
    if wave.boss_modulus == 0 {
        return None;
    }
    let slot = level % wave.boss_modulus;
    if slot == wave.arc_boss_offset {
        Some(EnemyKind::BossArc)
    } else if slot == wave.chrono_boss_offset {
        Some(EnemyKind::BossChrono)
    } else {
        None
    }
}

/// Spawn a boss at the top of the arena; bosses bypass the live cap
pub fn spawn_boss(world: &mut World, kind: EnemyKind, level: u32) {
    let (start_y, hp_growth) = match kind {
        EnemyKind::BossChrono => (-110.0, 0.08),
        _ => (-100.0, 0.07),
    };
    let hp = kind.base_hp() * world.mods.enemy_hp * (1.0 + level as f32 * hp_growth);
    let speed = kind.speed_range().0 * world.mods.enemy_speed;
    let spawn = EnemySpawn::new(kind, Vec2::new(world.arena.x / 2.0, start_y), hp, speed)
        .with_behavior(Behavior::Boss(BossState::new()));
    go_live(world, spawn);
    world.last_wave_count += 1;
    log::info!("{} spawned at level {} ({:.0} hp)", kind.as_str(), level, hp);
    world.emit(GameEvent::BossSpawned { kind });
}

/// Spawn the boss due at `level`, if any
pub fn spawn_level_boss(world: &mut World, level: u32) {
    if let Some(kind) = boss_for_level(world, level) {
        spawn_boss(world, kind, level);
    }
}

/// Splitter offspring: two small basics either side of the parent
pub fn splitter_children(pos: Vec2, parent_speed: f32, level: u32, mods: &Multipliers) -> [EnemySpawn; 2] {
    let hp = EnemyKind::Basic.base_hp() * 0.7 * mods.enemy_hp * (1.0 + level as f32 * 0.05);
    let child = |dx: f32| {
        EnemySpawn::new(EnemyKind::Basic, pos + Vec2::new(dx, 0.0), hp, parent_speed * 1.2)
            .with_size(22.0)
            .with_generation(0)
    };
    [child(-10.0), child(10.0)]
}

/// Homing kamikaze released by a dying purple enemy
pub fn mini_from(pos: Vec2, level: u32, mods: &Multipliers, rng: &mut SimRng) -> EnemySpawn {
    let hp = EnemyKind::Mini.base_hp() * mods.enemy_hp * (1.0 + level as f32 * 0.05);
    let (lo, hi) = EnemyKind::Mini.speed_range();
    let speed = rng.range(lo, hi) * mods.enemy_speed;
    EnemySpawn::new(EnemyKind::Mini, pos, hp, speed).with_behavior(Behavior::Homing)
}
