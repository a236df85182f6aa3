//! Player ship: movement, firing, drones and self-maintenance
//!
//! Everything the ship does on its own each frame. Collision outcomes live in
//! `combat`; this module only creates projectiles and moves them.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

use super::boss::vortex_slow;
use super::cards;
use super::collision::out_of_bounds;
use super::entity::{Bullet, BulletSource, Rocket};
use super::guidance::{self, SeekerState};
use super::state::World;
use super::targeting::{lock_capacity, select_distinct_targets};
use super::tick::TickInput;
use crate::consts::{CULL_SLACK, MARGIN_X, PLAYER_BOTTOM_OFFSET};
use crate::sim::cards::CardId;
use crate::tuning::MovementMode;

/// Drone orbit speed (rad/s)
const DRONE_ORBIT_SPEED: f32 = 0.8;
/// Drones hover this far above the ship
const DRONE_LIFT: f32 = 40.0;
/// Vertical squash of the drone orbit
const DRONE_BOB: f32 = 8.0;
/// Keyboard ships stay below this fraction of the arena height
const KEYBOARD_TOP_FRACTION: f32 = 0.35;
const KEYBOARD_BOTTOM_GAP: f32 = 8.0;

/// Install the run's weapon, scaled by the variant's base multipliers
pub fn apply_weapon(world: &mut World) {
    let mut weapon = world.loadout.weapon.clone();
    weapon.fire_rate *= world.tuning.player.fire_rate_mul;
    weapon.damage = (weapon.damage * world.tuning.player.damage_mul).round().max(1.0);
    world.player.weapon = weapon;
}

/// Apply the equipped pendants' passive effects
pub fn apply_passives(world: &mut World) {
    let effects = world.loadout.passives.effects.clone();
    cards::apply_all(world, &effects, 1);
}

/// Steer the ship from this frame's input
pub fn move_player(world: &mut World, input: &TickInput, dt: f32) {
    let speed = world.player.base_speed * vortex_slow(&world.enemies);
    let step = speed * dt;
    let arena = world.arena;
    let right = (arena.x - MARGIN_X).max(MARGIN_X);
    let player = &mut world.player;

    match world.tuning.movement {
        MovementMode::PointerDrag => {
            if let Some(target) = input.pointer_x {
                let target = target.clamp(MARGIN_X, right);
                player.pos.x += (target - player.pos.x).clamp(-step, step);
            }
            player.pos.y = arena.y - PLAYER_BOTTOM_OFFSET;
        }
        MovementMode::Keyboard => {
            let axis = |neg: bool, pos: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
            let dir = Vec2::new(axis(input.left, input.right), axis(input.up, input.down));
            player.pos += dir.normalize_or_zero() * step;
            let top = arena.y * KEYBOARD_TOP_FRACTION;
            let bottom = (arena.y - player.size.y / 2.0 - KEYBOARD_BOTTOM_GAP).max(top);
            player.pos.y = player.pos.y.clamp(top, bottom);
        }
    }
    player.pos.x = player.pos.x.clamp(MARGIN_X, right);
}

/// Fan angles for `spread` bullets centred on straight up
fn fan_angles(spread: u32, spread_angle: f32) -> Vec<f32> {
    if spread <= 1 {
        return vec![-FRAC_PI_2];
    }
    let total = (spread - 1) as f32 * spread_angle;
    let start = -FRAC_PI_2 - total / 2.0;
    (0..spread).map(|i| start + i as f32 * spread_angle).collect()
}

/// Fire a volley when the trigger is held and the weapon has cycled.
/// Returns the number of bullets launched.
pub fn fire(world: &mut World, trigger: bool) -> usize {
    let weapon = &world.player.weapon;
    if !trigger || weapon.fire_rate <= 0.0 {
        return 0;
    }
    let interval = 1.0 / weapon.fire_rate;
    if let Some(last) = world.player.last_fire
        && world.time - last < interval
    {
        return 0;
    }
    world.player.last_fire = Some(world.time);

    let weapon = world.player.weapon.clone();
    let player_pos = world.player.pos;
    let muzzle_y = player_pos.y - world.player.size.y / 2.0;
    let origins: Vec<f32> = if weapon.twin_offset > 0.0 {
        vec![player_pos.x - weapon.twin_offset, player_pos.x + weapon.twin_offset]
    } else {
        vec![player_pos.x]
    };

    let burst = weapon.burst_count.max(1);
    let mut angles = Vec::new();
    for base in fan_angles(weapon.spread, weapon.spread_angle) {
        for j in 0..burst {
            let offset = (j as f32 - (burst - 1) as f32 / 2.0) * weapon.burst_spread;
            angles.push(base + offset);
        }
    }

    // Seekers share out the lock list round-robin
    let locks = match weapon.seeker {
        Some(_) => {
            let live = world.enemies.iter().filter(|e| e.is_alive()).count();
            let k = lock_capacity(world.card_level(CardId::ArcSpread), live);
            select_distinct_targets(&world.enemies, k, player_pos)
        }
        None => Vec::new(),
    };

    let mut launched = 0;
    for &x in &origins {
        for &angle in &angles {
            let angle = if weapon.jitter > 0.0 {
                angle + world.rng.spread(weapon.jitter)
            } else {
                angle
            };
            let dir = crate::unit(angle);
            let id = world.next_entity_id();
            let (speed, seeker) = match weapon.seeker {
                Some(profile) => {
                    let lock = (!locks.is_empty()).then(|| locks[launched % locks.len()]);
                    let state = SeekerState::launch(
                        &world.tuning.seeker,
                        weapon.bullet_speed,
                        profile.accel,
                        profile.max_speed,
                        profile.turn_rate,
                        lock,
                    );
                    (weapon.bullet_speed * world.tuning.seeker.launch_speed_factor, Some(state))
                }
                None => (weapon.bullet_speed, None),
            };
            world.bullets.push(Bullet {
                id,
                pos: Vec2::new(x, muzzle_y),
                vel: dir * speed,
                damage: weapon.damage,
                pierce: weapon.pierce,
                source: BulletSource::Ship,
                seeker,
                spent: false,
            });
            launched += 1;
        }
    }
    launched
}

/// Orbit drones around the ship and let each fire on its own cooldown
pub fn update_drones(world: &mut World, dt: f32) {
    let anchor = world.player.pos;
    let time = world.time;
    let mut shots = Vec::new();
    for drone in &mut world.drones {
        drone.angle += DRONE_ORBIT_SPEED * dt;
        drone.pos = Vec2::new(
            anchor.x + drone.angle.cos() * drone.radius,
            anchor.y - DRONE_LIFT + drone.angle.sin() * DRONE_BOB,
        );
        if drone.fire_rate > 0.0 && time - drone.last_fire >= 1.0 / drone.fire_rate {
            drone.last_fire = time;
            shots.push((drone.pos - Vec2::new(0.0, 8.0), drone.bullet_speed, drone.bullet_damage));
        }
    }
    for (pos, speed, damage) in shots {
        let id = world.next_entity_id();
        world.bullets.push(Bullet {
            id,
            pos,
            vel: Vec2::new(0.0, -speed),
            damage,
            pierce: 0,
            source: BulletSource::Drone,
            seeker: None,
            spent: false,
        });
    }
}

/// Heal over time; the out-of-combat bonus needs `out_delay` seconds
/// without taking damage
pub fn update_regen(world: &mut World, dt: f32) {
    world.regen.since_hit += dt;
    let rate = world.regen.active_rate();
    if rate > 0.0 && world.player.hp < world.player.max_hp {
        world.player.heal(rate * dt);
    }
}

/// Periodic invulnerability from the shield pulse
pub fn update_shield_pulse(world: &mut World, dt: f32) {
    let Some(pulse) = world.shield_pulse.as_mut() else {
        return;
    };
    pulse.t += dt;
    if pulse.t >= pulse.interval {
        pulse.t = 0.0;
        world.player.invuln = world.player.invuln.max(pulse.duration);
    }
}

/// Launch rockets while firing and fly the ones in the air
pub fn update_rockets(world: &mut World, trigger: bool, dt: f32) {
    if world.rockets_enabled && trigger {
        world.player.rocket_timer += dt;
        if world.player.rocket_timer >= world.tuning.rockets.interval {
            world.player.rocket_timer = 0.0;
            let id = world.next_entity_id();
            let rockets = &world.tuning.rockets;
            world.rockets.push(Rocket {
                id,
                pos: world.player.pos - Vec2::new(0.0, world.player.size.y / 2.0),
                vel: Vec2::new(0.0, -rockets.speed),
                damage: rockets.damage,
                splash_radius: rockets.splash_radius,
            });
        }
    }

    let (w, h) = (world.arena.x, world.arena.y);
    for rocket in &mut world.rockets {
        rocket.pos += rocket.vel * dt;
    }
    world.rockets.retain(|r| !out_of_bounds(r.pos, w, h, CULL_SLACK));
}

/// Move player bullets, guide seekers, cull what left the arena
pub fn update_bullets(world: &mut World, dt: f32) {
    let (w, h) = (world.arena.x, world.arena.y);
    let enemies = &world.enemies;
    let tuning = &world.tuning.seeker;
    for bullet in &mut world.bullets {
        bullet.pos += bullet.vel * dt;
        if bullet.seeker.is_some() {
            guidance::guide(bullet, enemies, tuning, dt);
        }
    }
    world.bullets.retain(|b| !out_of_bounds(b.pos, w, h, CULL_SLACK));
}
