//! Collision and damage resolution
//!
//! Every pass walks entities in id order so the outcome of a frame never
//! depends on storage layout. Enemies killed during a pass keep their slot
//! (with hp <= 0) until `World::sweep`, which keeps indices stable while
//! derived spawns are appended.

use glam::Vec2;

use super::entity::{EnemyKind, EntityId, Particle, ParticleTint};
use super::spawner;
use super::state::{FailReason, GameEvent, MAX_ENEMY_ARMOR, World};
use super::tick;
use crate::consts::{EPSILON, MARGIN_X};

/// Particles per explosion
pub const EXPLOSION_PARTICLES: usize = 26;
const PARTICLE_GRAVITY: f32 = 40.0;
/// Horizontal shove applied to an enemy that rams the player
const CONTACT_SHOVE_X: f32 = 12.0;

/// What struck the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSource {
    Bullet,
    Contact,
}

/// Damage left after armor; armor is clamped to `[0, MAX_ENEMY_ARMOR]`
#[inline]
pub fn mitigate(damage: f32, armor: f32) -> f32 {
    let armor = armor.clamp(0.0, MAX_ENEMY_ARMOR);
    (damage * (1.0 - armor)).max(0.0)
}

/// Spawn explosion markers, never exceeding the quality cap
pub fn burst(world: &mut World, pos: Vec2, tint: ParticleTint, count: usize) {
    let room = world
        .quality
        .max_particles()
        .saturating_sub(world.particles.len());
    for _ in 0..count.min(room) {
        let vel = Vec2::new(world.rng.range(-220.0, 220.0), world.rng.range(-260.0, 80.0));
        let life = world.rng.range(0.4, 0.9);
        world.particles.push(Particle {
            pos,
            vel,
            age: 0.0,
            life,
            tint,
        });
    }
}

/// Age and move particles; expired ones are dropped
pub fn update_particles(world: &mut World, dt: f32) {
    for p in &mut world.particles {
        p.age += dt;
        p.pos += p.vel * dt;
        p.vel.y += PARTICLE_GRAVITY * dt;
    }
    world.particles.retain(|p| p.age <= p.life);
}

/// Player bullets against enemies.
///
/// Each live enemy takes at most one bullet per pass: the lowest-id
/// overlapping bullet that is not spent. A piercing bullet loses one pierce
/// instead of being spent, including when an active shield eats the damage.
pub fn resolve_player_bullets(world: &mut World) {
    let armor = world.mods.enemy_armor;
    let mut sparks = Vec::new();
    let mut deaths = Vec::new();

    for ei in 0..world.enemies.len() {
        let enemy = &world.enemies[ei];
        if !enemy.is_alive() {
            continue;
        }
        let bounds = enemy.bounds();
        let Some(bi) = world
            .bullets
            .iter()
            .position(|b| !b.spent && b.bounds().overlaps(&bounds))
        else {
            continue;
        };

        let shielded = enemy.shield_active();
        let bullet = &mut world.bullets[bi];
        let damage = if shielded { 0.0 } else { mitigate(bullet.damage, armor) };
        if bullet.pierce > 0 {
            bullet.pierce -= 1;
        } else {
            bullet.spent = true;
        }

        let enemy = &mut world.enemies[ei];
        if shielded {
            sparks.push(enemy.pos);
            continue;
        }
        if damage > 0.0 {
            enemy.hp -= damage;
        }
        if !enemy.is_alive() {
            deaths.push(ei);
        }
    }

    for pos in sparks {
        burst(world, pos, ParticleTint::ShieldSpark, EXPLOSION_PARTICLES);
    }
    for ei in deaths {
        on_enemy_death(world, ei);
    }
}

/// Rockets explode on the first enemy they touch and damage every enemy
/// whose box intersects the splash circle
pub fn resolve_rockets(world: &mut World) {
    let armor = world.mods.enemy_armor;
    let mut exploded: Vec<EntityId> = Vec::new();
    let mut deaths = Vec::new();
    let mut blasts = Vec::new();

    for rocket in &world.rockets {
        let bounds = rocket.bounds();
        let struck = world
            .enemies
            .iter()
            .any(|e| e.is_alive() && e.bounds().overlaps(&bounds));
        if !struck {
            continue;
        }
        exploded.push(rocket.id);
        blasts.push(rocket.pos);

        let damage = mitigate(rocket.damage, armor);
        for (ei, enemy) in world.enemies.iter_mut().enumerate() {
            if !enemy.is_alive() || !enemy.bounds().intersects_circle(rocket.pos, rocket.splash_radius) {
                continue;
            }
            if enemy.shield_active() {
                continue;
            }
            enemy.hp -= damage;
            if !enemy.is_alive() {
                deaths.push(ei);
            }
        }
    }

    if exploded.is_empty() {
        return;
    }
    world.rockets.retain(|r| exploded.binary_search(&r.id).is_err());
    for pos in blasts {
        burst(world, pos, ParticleTint::Rocket, EXPLOSION_PARTICLES / 2);
    }
    for ei in deaths {
        on_enemy_death(world, ei);
    }
}

/// Score, counters, derived spawns and the death event for the enemy at `idx`.
/// Called exactly once per enemy, on the pass that took its hp to <= 0.
pub fn on_enemy_death(world: &mut World, idx: usize) {
    let score = world.enemies[idx].kind.score_value();
    finish_enemy(world, idx, score);
}

/// Death pipeline shared by shots and rams; `score` is what the kill pays
fn finish_enemy(world: &mut World, idx: usize, score: u64) {
    let enemy = &world.enemies[idx];
    let (id, kind, pos, speed, generation) = (enemy.id, enemy.kind, enemy.pos, enemy.speed, enemy.generation);

    burst(world, pos, ParticleTint::Enemy(kind), EXPLOSION_PARTICLES);
    world.stats.score += score;
    world.stats.kills += 1;
    if kind.is_boss() {
        world.stats.boss_kills += 1;
        log::info!("{} destroyed at level {}", kind.as_str(), world.level);
    }

    let (level, mods) = (world.level, world.mods);
    if kind == EnemyKind::Splitter && generation > 0 {
        for child in spawner::splitter_children(pos, speed, level, &mods) {
            spawner::admit(world, child);
        }
    }
    if kind == EnemyKind::Purple {
        let mini = spawner::mini_from(pos, level, &mods, &mut world.rng);
        spawner::admit(world, mini);
    }

    world.emit(GameEvent::EnemyDied { id, kind, pos, score });
}

/// Run one hit through the defensive layers: dodge, then a shield charge,
/// then health. Returns true when health was reduced.
pub fn player_take_hit(world: &mut World, damage: f32, from: Vec2, source: HitSource) -> bool {
    if world.defense.dodge > 0.0 && world.rng.chance(world.defense.dodge) {
        world.emit(GameEvent::Dodged);
        return false;
    }
    if world.defense.shield_charges > 0 {
        world.defense.shield_charges -= 1;
        let charges_left = world.defense.shield_charges;
        world.emit(GameEvent::ShieldAbsorbed { charges_left });
        return false;
    }

    let defense = &world.tuning.defense;
    let aegis = if world.defense.on_hit_invuln {
        let base = match source {
            HitSource::Bullet => defense.aegis_bullet_invuln,
            HitSource::Contact => defense.aegis_contact_invuln,
        };
        base + world.defense.on_hit_bonus
    } else {
        0.0
    };
    let window = aegis.max(defense.hit_invuln_secs);
    let knockback = defense.knockback;

    let player = &mut world.player;
    player.hp -= damage;
    player.invuln = window;
    if knockback > 0.0 {
        let away = player.pos - from;
        let dir = away / away.length().max(EPSILON);
        player.pos += dir * knockback;
        let right = (world.arena.x - MARGIN_X).max(MARGIN_X);
        player.pos.x = player.pos.x.clamp(MARGIN_X, right);
        player.pos.y = player.pos.y.clamp(0.0, world.arena.y);
    }
    world.regen.since_hit = 0.0;

    let (pos, hp) = (world.player.pos, world.player.hp);
    burst(world, pos, ParticleTint::Player, EXPLOSION_PARTICLES);
    world.emit(GameEvent::PlayerHit { damage, hp });
    if hp <= 0.0 {
        tick::fail(world, FailReason::ShipDestroyed);
    }
    true
}

/// Enemy bullets against the player. Touching bullets are always consumed;
/// they only deal damage outside an invulnerability window.
pub fn resolve_enemy_bullets(world: &mut World) {
    let player_bounds = world.player.bounds();
    let hits: Vec<(EntityId, f32, Vec2)> = world
        .enemy_bullets
        .iter()
        .filter(|b| b.bounds().overlaps(&player_bounds))
        .map(|b| (b.id, b.damage, b.pos))
        .collect();
    if hits.is_empty() {
        return;
    }

    for &(_, damage, pos) in &hits {
        if world.summary.is_some() {
            break;
        }
        if world.player.invuln <= 0.0 {
            player_take_hit(world, damage, pos, HitSource::Bullet);
        }
    }
    world
        .enemy_bullets
        .retain(|b| hits.binary_search_by_key(&b.id, |h| h.0).is_err());
}

/// Enemy bodies against the player. Rammers are shoved back even while the
/// player is invulnerable; minis are destroyed by the impact.
pub fn resolve_contacts(world: &mut World) {
    let contact = world.tuning.defense.contact_damage;
    let pushback = world.tuning.defense.contact_pushback;

    for ei in 0..world.enemies.len() {
        if world.summary.is_some() {
            return;
        }
        let enemy = &world.enemies[ei];
        if !enemy.is_alive() || !enemy.bounds().overlaps(&world.player.bounds()) {
            continue;
        }
        let (kind, pos) = (enemy.kind, enemy.pos);

        if world.player.invuln <= 0.0 {
            let damage = contact * world.mods.enemy_damage;
            player_take_hit(world, damage, pos, HitSource::Contact);
        }

        // Minis spend themselves on the ram: a kill, but worth nothing
        if kind == EnemyKind::Mini {
            world.enemies[ei].hp = 0.0;
            finish_enemy(world, ei, 0);
            continue;
        }
        let player_x = world.player.pos.x;
        let enemy = &mut world.enemies[ei];
        enemy.pos.y -= pushback;
        enemy.pos.x += if enemy.pos.x < player_x { -CONTACT_SHOVE_X } else { CONTACT_SHOVE_X };
    }
}

/// Count down the player's invulnerability window
pub fn tick_invuln(world: &mut World, dt: f32) {
    if world.player.invuln > 0.0 {
        world.player.invuln -= dt;
    }
}
