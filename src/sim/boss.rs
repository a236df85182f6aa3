//! Boss ability cycles and hazards
//!
//! Each boss kind walks a fixed ability list on a timer. One ability fires
//! per elapsed cycle and the index wraps. A live hazard (laser or vortex)
//! holds the next trigger back until it expires.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{EnemyAction, EnemyCtx, EnemyShot};
use super::entity::{Behavior, BulletStyle, Enemy, EnemyKind};
use super::rng::SimRng;
use super::spawner::EnemySpawn;

/// Everything a boss can do on its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    RadialBurst,
    Summon,
    Laser,
    Vortex,
    MeteorVolley,
    Spiral,
}

const ARC_ABILITIES: [Ability; 3] = [Ability::RadialBurst, Ability::Summon, Ability::Laser];
const CHRONO_ABILITIES: [Ability; 3] = [Ability::Vortex, Ability::MeteorVolley, Ability::Spiral];

/// Altitude ceiling bosses settle at: `min(H * 0.18, 140)`
const HOVER_FRACTION: f32 = 0.18;
const HOVER_MAX: f32 = 140.0;
/// Horizontal clamp margin for bosses
const BOSS_MARGIN_X: f32 = 40.0;

const RADIAL_SHOTS: usize = 24;
const RADIAL_SPEED: f32 = 180.0;
const RADIAL_DOWN_BIAS: f32 = 60.0;
const RADIAL_DAMAGE: f32 = 12.0;

const SUMMON_COUNT: usize = 6;
const SUMMON_HP: f32 = 22.0;

const LASER_WIDTH: f32 = 18.0;
const LASER_CHARGE: f32 = 0.9;
const LASER_ACTIVE: f32 = 0.6;
const LASER_DPS: f32 = 28.0;

const VORTEX_SECS: f32 = 3.0;
const VORTEX_FACTOR: f32 = 0.6;
pub const VORTEX_RADIUS: f32 = 120.0;

const METEOR_COUNT: usize = 6;
const METEOR_DAMAGE: f32 = 18.0;

const SPIRAL_SHOTS: usize = 18;
const SPIRAL_SPEED: f32 = 160.0;
const SPIRAL_DOWN_BIAS: f32 = 80.0;
const SPIRAL_DAMAGE: f32 = 10.0;
const SPIRAL_STEP: f32 = 0.28;

const ENEMY_SHOT_SIZE: Vec2 = Vec2::new(6.0, 16.0);

/// Vertical beam with a telegraph before it burns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub x: f32,
    pub width: f32,
    pub charge: f32,
    pub duration: f32,
    pub t: f32,
    pub active: bool,
}

/// Slow field around the chrono boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vortex {
    pub pos: Vec2,
    pub t: f32,
    pub duration: f32,
    /// Multiplier on player speed while it lasts
    pub factor: f32,
}

/// Ability-cycle state carried by boss enemies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossState {
    pub ability_timer: f32,
    pub ability_index: usize,
    /// Rotation offset accumulated by spiral volleys
    pub spiral_angle: f32,
    pub laser: Option<Laser>,
    pub vortex: Option<Vortex>,
}

impl BossState {
    pub fn new() -> Self {
        Self {
            ability_timer: 0.0,
            ability_index: 0,
            spiral_angle: 0.0,
            laser: None,
            vortex: None,
        }
    }

    /// Whether a hazard is still running
    pub fn hazard_active(&self) -> bool {
        self.laser.is_some() || self.vortex.is_some()
    }

    /// Step the cycle clock; returns the ability to fire this tick
    pub fn next_ability(&mut self, kind: EnemyKind, dt: f32) -> Option<Ability> {
        self.ability_timer += dt;
        let abilities = abilities(kind);
        if abilities.is_empty() || self.ability_timer < cycle_secs(kind) || self.hazard_active() {
            return None;
        }
        self.ability_timer = 0.0;
        let ability = abilities[self.ability_index % abilities.len()];
        self.ability_index = (self.ability_index + 1) % abilities.len();
        Some(ability)
    }
}

impl Default for BossState {
    fn default() -> Self {
        Self::new()
    }
}

/// Ability order for a boss kind
pub fn abilities(kind: EnemyKind) -> &'static [Ability] {
    match kind {
        EnemyKind::BossArc => &ARC_ABILITIES,
        EnemyKind::BossChrono => &CHRONO_ABILITIES,
        _ => &[],
    }
}

/// Seconds between ability triggers
pub fn cycle_secs(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::BossChrono => 5.0,
        _ => 4.5,
    }
}

/// Lateral drift (angular frequency, amplitude px/s)
fn drift(kind: EnemyKind) -> (f32, f32) {
    match kind {
        EnemyKind::BossChrono => (0.7, 70.0),
        _ => (0.8, 60.0),
    }
}

/// Move a boss, tick its hazards and fire due abilities
pub fn update_boss(enemy: &mut Enemy, ctx: &EnemyCtx, rng: &mut SimRng, out: &mut Vec<EnemyAction>) {
    let dt = ctx.dt;
    let hover = (ctx.arena.y * HOVER_FRACTION).min(HOVER_MAX);
    let step = enemy.speed * dt;
    enemy.pos.y += (hover - enemy.pos.y).clamp(-step, step);
    let (freq, amp) = drift(enemy.kind);
    enemy.pos.x += (ctx.time * freq).sin() * amp * dt;
    enemy.pos.x = enemy
        .pos
        .x
        .clamp(BOSS_MARGIN_X, (ctx.arena.x - BOSS_MARGIN_X).max(BOSS_MARGIN_X));

    let kind = enemy.kind;
    let pos = enemy.pos;
    let half_h = enemy.size.y / 2.0;
    let Behavior::Boss(state) = &mut enemy.behavior else {
        return;
    };

    tick_hazards(state, pos, ctx, out);

    if let Some(ability) = state.next_ability(kind, dt) {
        log::debug!("{} uses {:?}", kind.as_str(), ability);
        trigger(ability, state, pos, half_h, ctx, rng, out);
    }
}

fn tick_hazards(state: &mut BossState, boss_pos: Vec2, ctx: &EnemyCtx, out: &mut Vec<EnemyAction>) {
    if let Some(laser) = state.laser.as_mut() {
        laser.t += ctx.dt;
        if !laser.active && laser.t >= laser.charge {
            laser.active = true;
            laser.t = 0.0;
        } else if laser.active && laser.t >= laser.duration {
            state.laser = None;
        }
    }
    if let Some(laser) = state.laser.as_ref()
        && laser.active
        && in_laser_band(laser, boss_pos.y, ctx.player_pos)
    {
        out.push(EnemyAction::LaserBurn(
            LASER_DPS * ctx.dt * ctx.mods.enemy_damage,
        ));
    }

    if let Some(vortex) = state.vortex.as_mut() {
        vortex.t += ctx.dt;
        if vortex.t > vortex.duration {
            state.vortex = None;
        }
    }
}

/// The player is inside the beam: within half its width and below the boss
pub fn in_laser_band(laser: &Laser, boss_y: f32, player: Vec2) -> bool {
    (player.x - laser.x).abs() <= laser.width / 2.0 && player.y > boss_y
}

fn trigger(
    ability: Ability,
    state: &mut BossState,
    pos: Vec2,
    half_h: f32,
    ctx: &EnemyCtx,
    rng: &mut SimRng,
    out: &mut Vec<EnemyAction>,
) {
    let mods = &ctx.mods;
    match ability {
        Ability::RadialBurst => {
            let speed = RADIAL_SPEED * mods.enemy_bullet_speed;
            for i in 0..RADIAL_SHOTS {
                let a = i as f32 / RADIAL_SHOTS as f32 * TAU;
                out.push(EnemyAction::Fire(EnemyShot {
                    pos: Vec2::new(pos.x, pos.y + half_h),
                    vel: Vec2::new(a.cos() * speed, a.sin() * speed + RADIAL_DOWN_BIAS),
                    damage: RADIAL_DAMAGE * mods.enemy_damage,
                    size: ENEMY_SHOT_SIZE,
                    style: BulletStyle::Radial,
                }));
            }
        }
        Ability::Summon => {
            let hp = SUMMON_HP * mods.enemy_hp * (1.0 + ctx.level as f32 * 0.05);
            let right = (ctx.arena.x - 30.0).max(30.0);
            let minions = (0..SUMMON_COUNT)
                .map(|_| {
                    let x = rng.range(30.0, right);
                    let y = pos.y + half_h + rng.range(10.0, 40.0);
                    let speed = rng.range(70.0, 120.0) * mods.enemy_speed;
                    EnemySpawn::new(EnemyKind::Basic, Vec2::new(x, y), hp, speed)
                })
                .collect();
            out.push(EnemyAction::Summon(minions));
        }
        Ability::Laser => {
            state.laser = Some(Laser {
                x: pos.x,
                width: LASER_WIDTH,
                charge: LASER_CHARGE,
                duration: LASER_ACTIVE,
                t: 0.0,
                active: false,
            });
        }
        Ability::Vortex => {
            state.vortex = Some(Vortex {
                pos: Vec2::new(pos.x, pos.y + 30.0),
                t: 0.0,
                duration: VORTEX_SECS,
                factor: VORTEX_FACTOR,
            });
        }
        Ability::MeteorVolley => {
            let right = (ctx.arena.x - 40.0).max(40.0);
            for _ in 0..METEOR_COUNT {
                let x = rng.range(40.0, right);
                let w = rng.range(14.0, 28.0);
                let h = rng.range(28.0, 46.0);
                let vy = rng.range(180.0, 260.0) * mods.enemy_bullet_speed;
                let vx = rng.range(-20.0, 20.0);
                out.push(EnemyAction::Fire(EnemyShot {
                    pos: Vec2::new(x, pos.y + 10.0),
                    vel: Vec2::new(vx, vy),
                    damage: METEOR_DAMAGE * mods.enemy_damage,
                    size: Vec2::new(w, h),
                    style: BulletStyle::Meteor,
                }));
            }
        }
        Ability::Spiral => {
            state.spiral_angle += SPIRAL_STEP;
            let speed = SPIRAL_SPEED * mods.enemy_bullet_speed;
            for i in 0..SPIRAL_SHOTS {
                let a = state.spiral_angle + i as f32 / SPIRAL_SHOTS as f32 * TAU;
                out.push(EnemyAction::Fire(EnemyShot {
                    pos: Vec2::new(pos.x, pos.y + half_h),
                    vel: Vec2::new(a.cos() * speed, a.sin() * speed + SPIRAL_DOWN_BIAS),
                    damage: SPIRAL_DAMAGE * mods.enemy_damage,
                    size: ENEMY_SHOT_SIZE,
                    style: BulletStyle::Spiral,
                }));
            }
        }
    }
}

/// Strongest movement slow from any live vortex (1.0 = none)
pub fn vortex_slow(enemies: &[Enemy]) -> f32 {
    enemies
        .iter()
        .filter(|e| e.is_alive())
        .filter_map(|e| e.boss().and_then(|b| b.vortex.as_ref()))
        .map(|v| v.factor)
        .fold(1.0, f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityId;
    use crate::sim::state::Multipliers;

    fn ctx(dt: f32) -> EnemyCtx {
        EnemyCtx {
            dt,
            time: 0.0,
            level: 5,
            player_pos: Vec2::new(240.0, 710.0),
            arena: Vec2::new(480.0, 800.0),
            mods: Multipliers::default(),
        }
    }

    fn boss(kind: EnemyKind) -> Enemy {
        let mut e = Enemy::new(EntityId(1), kind, Vec2::new(240.0, 140.0), 300.0, 32.0);
        e.behavior = Behavior::Boss(BossState::new());
        e
    }

    #[test]
    fn test_index_cycles_once_per_cycle() {
        let mut state = BossState::new();
        let mut fired = Vec::new();
        // 3 full cycles at 60 Hz for the chrono boss, hazards cleared manually
        for _ in 0..(15 * 60 + 5) {
            if let Some(ability) = state.next_ability(EnemyKind::BossChrono, 1.0 / 60.0) {
                fired.push((ability, state.ability_index));
            }
            state.vortex = None;
        }
        assert_eq!(
            fired,
            vec![
                (Ability::Vortex, 1),
                (Ability::MeteorVolley, 2),
                (Ability::Spiral, 0),
            ]
        );
    }

    #[test]
    fn test_hazard_blocks_trigger() {
        let mut state = BossState::new();
        state.ability_timer = 10.0;
        state.laser = Some(Laser {
            x: 0.0,
            width: LASER_WIDTH,
            charge: LASER_CHARGE,
            duration: LASER_ACTIVE,
            t: 0.0,
            active: false,
        });
        assert_eq!(state.next_ability(EnemyKind::BossArc, 0.1), None);
        state.laser = None;
        assert_eq!(state.next_ability(EnemyKind::BossArc, 0.1), Some(Ability::RadialBurst));
    }

    #[test]
    fn test_radial_burst_emits_24() {
        let mut e = boss(EnemyKind::BossArc);
        if let Behavior::Boss(state) = &mut e.behavior {
            state.ability_timer = 4.49;
        }
        let mut rng = SimRng::new(1);
        let mut out = Vec::new();
        update_boss(&mut e, &ctx(0.02), &mut rng, &mut out);
        let shots = out.iter().filter(|a| matches!(a, EnemyAction::Fire(_))).count();
        assert_eq!(shots, 24);
    }

    #[test]
    fn test_laser_telegraph_then_burn() {
        let mut e = boss(EnemyKind::BossArc);
        if let Behavior::Boss(state) = &mut e.behavior {
            state.ability_index = 2;
            state.ability_timer = 4.5;
        }
        e.pos.x = 240.0;
        let mut rng = SimRng::new(1);
        let c = EnemyCtx {
            time: 0.0,
            ..ctx(0.1)
        };

        let mut burns = 0;
        for _ in 0..25 {
            let mut out = Vec::new();
            e.pos.x = 240.0;
            update_boss(&mut e, &c, &mut rng, &mut out);
            if let Behavior::Boss(state) = &mut e.behavior
                && let Some(laser) = state.laser.as_mut()
            {
                laser.x = 240.0;
            }
            burns += out.iter().filter(|a| matches!(a, EnemyAction::LaserBurn(_))).count();
        }
        // 0.9 s telegraph, then ~0.6 s of burning at 0.1 s steps
        assert!((5..=7).contains(&burns), "burn ticks {burns}");
    }

    #[test]
    fn test_boss_settles_at_hover_and_stays_in_bounds() {
        let mut e = boss(EnemyKind::BossChrono);
        e.pos.y = -110.0;
        let mut rng = SimRng::new(2);
        for i in 0..2000 {
            let mut out = Vec::new();
            let c = EnemyCtx {
                time: i as f32 / 60.0,
                ..ctx(1.0 / 60.0)
            };
            update_boss(&mut e, &c, &mut rng, &mut out);
            if let Behavior::Boss(state) = &mut e.behavior {
                state.vortex = None;
            }
            assert!(e.pos.x >= 40.0 && e.pos.x <= 440.0);
        }
        assert!((e.pos.y - 140.0).abs() < 1e-3);
    }

    /// Arm a boss so its next update fires ability `index`
    fn ready(e: &mut Enemy, index: usize) {
        if let Behavior::Boss(state) = &mut e.behavior {
            state.ability_index = index;
            state.ability_timer = cycle_secs(e.kind);
        }
    }

    fn shots(out: &[EnemyAction]) -> Vec<&EnemyShot> {
        out.iter()
            .filter_map(|a| match a {
                EnemyAction::Fire(shot) => Some(shot),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_spiral_offset_accumulates() {
        let mut e = boss(EnemyKind::BossChrono);
        let mut rng = SimRng::new(3);
        let speed = SPIRAL_SPEED;

        for volley in 1..=2 {
            ready(&mut e, 2);
            let mut out = Vec::new();
            update_boss(&mut e, &ctx(0.01), &mut rng, &mut out);
            let offset = e.boss().map(|b| b.spiral_angle).unwrap_or_default();
            assert!((offset - SPIRAL_STEP * volley as f32).abs() < 1e-5);

            let fired = shots(&out);
            assert_eq!(fired.len(), SPIRAL_SHOTS);
            assert!(fired.iter().all(|s| s.style == BulletStyle::Spiral));
            // First shot leaves along the accumulated offset
            assert!((fired[0].vel.x - offset.cos() * speed).abs() < 1e-3);
        }
    }

    #[test]
    fn test_summon_spawns_below_boss() {
        use crate::sim::enemy::update_enemies;
        use crate::sim::state::World;
        use crate::tuning::Tuning;

        let mut w = World::new(Tuning::card_draft(), 4);
        w.reset_run_state();
        let mut e = boss(EnemyKind::BossArc);
        e.id = w.next_entity_id();
        ready(&mut e, 1);
        w.enemies.push(e);
        let before = w.last_wave_count;

        update_enemies(&mut w, 0.01);
        let boss_bottom = w.enemies[0].bottom();
        let minions: Vec<_> = w.enemies.iter().filter(|m| !m.kind.is_boss()).collect();
        assert_eq!(minions.len(), SUMMON_COUNT);
        assert!(minions.iter().all(|m| m.kind == EnemyKind::Basic));
        assert!(minions.iter().all(|m| m.pos.y > boss_bottom));
        assert_eq!(w.last_wave_count, before + SUMMON_COUNT as u32);
    }

    #[test]
    fn test_meteor_volley_spawns() {
        let mut e = boss(EnemyKind::BossChrono);
        ready(&mut e, 1);
        let mut rng = SimRng::new(5);
        let mut out = Vec::new();
        update_boss(&mut e, &ctx(0.01), &mut rng, &mut out);

        let meteors = shots(&out);
        assert_eq!(meteors.len(), METEOR_COUNT);
        for m in meteors {
            assert_eq!(m.style, BulletStyle::Meteor);
            assert!((14.0..=28.0).contains(&m.size.x));
            assert!((28.0..=46.0).contains(&m.size.y));
            assert!((180.0..=260.0).contains(&m.vel.y));
            assert!((m.damage - METEOR_DAMAGE).abs() < 1e-6);
        }
        // Meteors are not a lingering hazard
        assert!(!e.boss().is_some_and(BossState::hazard_active));
    }

    #[test]
    fn test_vortex_slow() {
        let mut e = boss(EnemyKind::BossChrono);
        assert_eq!(vortex_slow(std::slice::from_ref(&e)), 1.0);
        if let Behavior::Boss(state) = &mut e.behavior {
            state.vortex = Some(Vortex {
                pos: Vec2::ZERO,
                t: 0.0,
                duration: VORTEX_SECS,
                factor: VORTEX_FACTOR,
            });
        }
        assert!((vortex_slow(&[e]) - 0.6).abs() < 1e-6);
    }
}
