//! Per-kind enemy behavior
//!
//! Enemies update in id order. Anything an update wants to add to the world
//! (shots, summons, laser damage, a breach) is queued as an `EnemyAction` and
//! applied after the pass, so the enemy list is never mutated while it is
//! being walked.

use glam::Vec2;

use super::boss;
use super::entity::{Behavior, BulletStyle, Enemy, EnemyBullet, EnemyKind, EntityId, SHIELD_ACTIVE, SHIELD_PERIOD};
use super::rng::SimRng;
use super::spawner::{self, EnemySpawn};
use super::state::{FailReason, Multipliers, World};
use super::tick;
use crate::consts::{EPSILON, MARGIN_X};

/// Read-only frame context for enemy updates
#[derive(Debug, Clone, Copy)]
pub struct EnemyCtx {
    pub dt: f32,
    /// Run clock
    pub time: f32,
    pub level: u32,
    pub player_pos: Vec2,
    pub arena: Vec2,
    pub mods: Multipliers,
}

/// A hostile projectile waiting for an id
#[derive(Debug, Clone)]
pub struct EnemyShot {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub size: Vec2,
    pub style: BulletStyle,
}

impl EnemyShot {
    pub fn into_bullet(self, id: EntityId) -> EnemyBullet {
        EnemyBullet {
            id,
            pos: self.pos,
            vel: self.vel,
            damage: self.damage,
            size: self.size,
            style: self.style,
        }
    }
}

/// Deferred side effect of an enemy update
#[derive(Debug, Clone)]
pub enum EnemyAction {
    Fire(EnemyShot),
    /// Boss minions; they count toward the level's announced wave size
    Summon(Vec<EnemySpawn>),
    /// Continuous beam damage; ignores dodge, shields and invulnerability
    LaserBurn(f32),
    /// Lower edge reached the bottom of the arena
    Breach(EntityId),
}

const SHOOTER_BULLET_SPEED: f32 = 230.0;
const SHOOTER_BULLET_DAMAGE: f32 = 10.0;
const SHOOTER_BULLET_SIZE: Vec2 = Vec2::new(6.0, 16.0);
/// Max horizontal tracking speed of dashers (px/s)
const DASHER_TRACK: f32 = 120.0;
const DASHER_LUNGE: f32 = 1.8;

/// Advance one non-boss enemy; bosses delegate to `boss::update_boss`
pub fn update_enemy(enemy: &mut Enemy, ctx: &EnemyCtx, rng: &mut SimRng, out: &mut Vec<EnemyAction>) {
    let dt = ctx.dt;
    let prev = enemy.pos;
    enemy.age += dt;

    if enemy.kind.is_boss() {
        boss::update_boss(enemy, ctx, rng, out);
        enemy.vel_estimate = (enemy.pos - prev) / dt.max(EPSILON);
        return;
    }

    let sway = match enemy.kind.drift() {
        Some((freq, amp)) => ((enemy.age + enemy.drift_phase) * freq).sin() * amp * dt,
        None => 0.0,
    };

    match &mut enemy.behavior {
        Behavior::Drift => {
            enemy.pos.y += enemy.speed * dt;
            enemy.pos.x += sway;
        }
        Behavior::Shooter { fire_cooldown } => {
            let cooldown = *fire_cooldown;
            enemy.pos.y += enemy.speed * dt;
            enemy.pos.x += sway;
            if enemy.age > cooldown {
                enemy.age = 0.0;
                out.push(EnemyAction::Fire(EnemyShot {
                    pos: Vec2::new(enemy.pos.x, enemy.pos.y + enemy.size.y / 2.0),
                    vel: Vec2::new(0.0, SHOOTER_BULLET_SPEED * ctx.mods.enemy_bullet_speed),
                    damage: SHOOTER_BULLET_DAMAGE * ctx.mods.enemy_damage,
                    size: SHOOTER_BULLET_SIZE,
                    style: BulletStyle::Standard,
                }));
            }
        }
        Behavior::Dasher { dash_countdown } => {
            enemy.pos.y += enemy.speed * dt;
            let track = DASHER_TRACK * dt;
            enemy.pos.x += ((ctx.player_pos.x - enemy.pos.x) * 0.8).clamp(-track, track);
            *dash_countdown -= dt;
            if *dash_countdown <= 0.0 {
                enemy.pos.y += enemy.speed * DASHER_LUNGE;
                *dash_countdown = rng.range(1.0, 2.0);
            }
        }
        Behavior::Shield { shield_timer, active } => {
            *shield_timer += dt;
            *active = shield_timer.rem_euclid(SHIELD_PERIOD) < SHIELD_ACTIVE;
            enemy.pos.y += enemy.speed * dt;
            enemy.pos.x += sway;
        }
        Behavior::Homing => {
            let to_player = ctx.player_pos - enemy.pos;
            let dist = to_player.length().max(EPSILON);
            enemy.pos += to_player / dist * enemy.speed * dt;
        }
        // Only boss kinds carry boss state
        Behavior::Boss(_) => {}
    }

    let right = (ctx.arena.x - MARGIN_X).max(MARGIN_X);
    enemy.pos.x = enemy.pos.x.clamp(MARGIN_X, right);

    if !enemy.kind.breach_exempt() && enemy.bottom() >= ctx.arena.y {
        out.push(EnemyAction::Breach(enemy.id));
    }

    enemy.vel_estimate = (enemy.pos - prev) / dt.max(EPSILON);
}

/// Update every live enemy, then apply what they asked for
pub fn update_enemies(world: &mut World, dt: f32) {
    let ctx = EnemyCtx {
        dt,
        time: world.time,
        level: world.level,
        player_pos: world.player.pos,
        arena: world.arena,
        mods: world.mods,
    };

    let mut actions = Vec::new();
    for enemy in world.enemies.iter_mut().filter(|e| e.is_alive()) {
        update_enemy(enemy, &ctx, &mut world.rng, &mut actions);
    }

    for action in actions {
        if world.summary.is_some() {
            break;
        }
        match action {
            EnemyAction::Fire(shot) => {
                let id = world.next_entity_id();
                world.enemy_bullets.push(shot.into_bullet(id));
            }
            EnemyAction::Summon(minions) => {
                world.last_wave_count += minions.len() as u32;
                for minion in minions {
                    spawner::admit(world, minion);
                }
            }
            EnemyAction::LaserBurn(damage) => {
                world.player.hp -= damage;
                if world.player.hp <= 0.0 {
                    tick::fail(world, FailReason::ShipDestroyed);
                }
            }
            EnemyAction::Breach(id) => {
                log::debug!("enemy {:?} breached", id);
                tick::fail(world, FailReason::EnemyBreach);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EnemyCtx {
        EnemyCtx {
            dt: 1.0 / 60.0,
            time: 0.0,
            level: 1,
            player_pos: Vec2::new(240.0, 710.0),
            arena: Vec2::new(480.0, 800.0),
            mods: Multipliers::default(),
        }
    }

    fn enemy(kind: EnemyKind, pos: Vec2, behavior: Behavior) -> Enemy {
        let mut e = Enemy::new(EntityId(1), kind, pos, 20.0, 90.0);
        e.behavior = behavior;
        e
    }

    #[test]
    fn test_basic_falls_and_tracks_velocity() {
        let mut e = enemy(EnemyKind::Basic, Vec2::new(200.0, 100.0), Behavior::Drift);
        let mut rng = SimRng::new(1);
        let mut out = Vec::new();
        update_enemy(&mut e, &ctx(), &mut rng, &mut out);
        assert!((e.pos.y - 101.5).abs() < 1e-3);
        assert!((e.vel_estimate.y - 90.0).abs() < 0.1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_shooter_fires_after_cooldown() {
        let mut e = enemy(
            EnemyKind::Shooter,
            Vec2::new(200.0, 100.0),
            Behavior::Shooter { fire_cooldown: 0.05 },
        );
        let mut rng = SimRng::new(1);
        let mut out = Vec::new();
        for _ in 0..4 {
            update_enemy(&mut e, &ctx(), &mut rng, &mut out);
        }
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0], EnemyAction::Fire(shot) if (shot.vel.y - 230.0).abs() < 1e-3));
        assert!(e.age < 0.05);
    }

    #[test]
    fn test_dasher_lunges() {
        let mut e = enemy(
            EnemyKind::Dasher,
            Vec2::new(240.0, 100.0),
            Behavior::Dasher { dash_countdown: 0.01 },
        );
        let mut rng = SimRng::new(1);
        let mut out = Vec::new();
        update_enemy(&mut e, &ctx(), &mut rng, &mut out);
        // Normal fall plus a lunge of speed * 1.8
        assert!((e.pos.y - (100.0 + 1.5 + 162.0)).abs() < 1e-3);
        match e.behavior {
            Behavior::Dasher { dash_countdown } => assert!((1.0..2.0).contains(&dash_countdown)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_shield_cycle() {
        let mut e = enemy(
            EnemyKind::Shield,
            Vec2::new(240.0, 100.0),
            Behavior::Shield { shield_timer: 0.0, active: false },
        );
        let mut rng = SimRng::new(1);
        let mut out = Vec::new();
        update_enemy(&mut e, &ctx(), &mut rng, &mut out);
        assert!(e.shield_active());
        if let Behavior::Shield { shield_timer, .. } = &mut e.behavior {
            *shield_timer = 1.0;
        }
        update_enemy(&mut e, &ctx(), &mut rng, &mut out);
        assert!(!e.shield_active());
    }

    #[test]
    fn test_breach_and_exemption() {
        let mut rng = SimRng::new(1);
        let mut out = Vec::new();
        let mut basic = enemy(EnemyKind::Basic, Vec2::new(240.0, 786.0), Behavior::Drift);
        update_enemy(&mut basic, &ctx(), &mut rng, &mut out);
        assert!(matches!(out.as_slice(), [EnemyAction::Breach(_)]));

        out.clear();
        let mut mini = enemy(EnemyKind::Mini, Vec2::new(240.0, 795.0), Behavior::Homing);
        update_enemy(&mut mini, &ctx(), &mut rng, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_mini_homes_on_player() {
        let mut mini = enemy(EnemyKind::Mini, Vec2::new(100.0, 400.0), Behavior::Homing);
        let mut rng = SimRng::new(1);
        let mut out = Vec::new();
        let before = (ctx().player_pos - mini.pos).length();
        update_enemy(&mut mini, &ctx(), &mut rng, &mut out);
        let after = (ctx().player_pos - mini.pos).length();
        assert!((before - after - 1.5).abs() < 1e-2);
    }

    #[test]
    fn test_clamped_to_margin() {
        let mut e = enemy(EnemyKind::Basic, Vec2::new(2.0, 100.0), Behavior::Drift);
        let mut rng = SimRng::new(1);
        let mut out = Vec::new();
        update_enemy(&mut e, &ctx(), &mut rng, &mut out);
        assert_eq!(e.pos.x, MARGIN_X);
    }
}
