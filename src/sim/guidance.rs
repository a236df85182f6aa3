//! Seeker missile guidance
//!
//! Per tick, after the missile has moved:
//! 1. Retarget when there is no valid lock, the retarget interval elapsed, or
//!    the target has sat outside the forward cone longer than the lock
//!    persistence window.
//! 2. Aim at a lead point (target velocity estimate times a clamped intercept
//!    time); inside the terminal radius aim straight at the target instead.
//! 3. Blend heading-error correction with a proportional-navigation term on
//!    the line-of-sight rate, clamp the turn, snap onto the line of sight
//!    inside the snap cone.
//! 4. Thrust along the new heading with a motor that ramps with age, then
//!    clamp to a speed ceiling that also ramps with age.
//!
//! Heading changes come from thrust direction, not from rotating the
//! velocity, so a missile carves a curve rather than pivoting in place.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Bullet, Enemy, EntityId};
use super::targeting::priority_target;
use crate::consts::EPSILON;
use crate::{heading, normalize_angle, unit};

/// Guidance constants shared by every seeker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeekerTuning {
    /// Launch speed as a fraction of the weapon's bullet speed
    pub launch_speed_factor: f32,
    /// Motor growth per second of age (fraction of base acceleration)
    pub accel_growth: f32,
    /// Motor ceiling as a multiple of base acceleration
    pub accel_cap_mul: f32,
    /// Initial speed ceiling as a fraction of bullet speed
    pub max_speed_base_factor: f32,
    /// Ceiling growth per second as a fraction of the absolute ceiling
    pub max_speed_growth_factor: f32,
    /// Proportional-navigation gain
    pub nav_const: f32,
    pub heading_gain: f32,
    pub terminal_heading_gain: f32,
    /// Cosine above which the heading snaps onto the line of sight
    pub snap_cone: f32,
    pub terminal_snap_cone: f32,
    pub retarget_every: f32,
    /// Seconds a target may stay outside the forward cone before relocking
    pub lock_persist: f32,
    /// Cosine-like threshold of the forward cone that keeps a lock fresh
    pub lock_cone: f32,
    /// Range under which lead prediction is dropped for pure pursuit
    pub terminal_distance: f32,
    pub lead_time_min: f32,
    pub lead_time_max: f32,
    /// Floor on closing speed when estimating intercept time
    pub min_closing_speed: f32,
    pub terminal_turn_boost: f32,
    pub terminal_accel_boost: f32,
    /// Without a target: keep accelerating up to this fraction of the ceiling
    pub coast_fraction: f32,
    pub coast_accel_factor: f32,
}

impl Default for SeekerTuning {
    fn default() -> Self {
        Self {
            launch_speed_factor: 0.35,
            accel_growth: 0.65,
            accel_cap_mul: 3.0,
            max_speed_base_factor: 0.55,
            max_speed_growth_factor: 0.35,
            nav_const: 5.2,
            heading_gain: 2.0,
            terminal_heading_gain: 2.8,
            snap_cone: 0.95,
            terminal_snap_cone: 0.96,
            retarget_every: 0.03,
            lock_persist: 0.5,
            lock_cone: 0.08,
            terminal_distance: 80.0,
            lead_time_min: 0.05,
            lead_time_max: 0.8,
            min_closing_speed: 60.0,
            terminal_turn_boost: 1.6,
            terminal_accel_boost: 1.25,
            coast_fraction: 0.85,
            coast_accel_factor: 0.6,
        }
    }
}

/// Per-missile guidance state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeekerState {
    pub age: f32,
    pub accel_base: f32,
    pub max_speed_base: f32,
    pub max_speed_growth: f32,
    pub max_speed_cap: f32,
    /// Maximum turn rate (rad/s) before boosts
    pub turn_rate: f32,
    pub retarget_timer: f32,
    pub prev_los: Option<f32>,
    pub lock: Option<EntityId>,
    pub lock_timer: f32,
}

impl SeekerState {
    /// Guidance state for a freshly fired missile
    pub fn launch(
        tuning: &SeekerTuning,
        bullet_speed: f32,
        accel: f32,
        speed_cap: f32,
        turn_rate: f32,
        initial_lock: Option<EntityId>,
    ) -> Self {
        Self {
            age: 0.0,
            accel_base: accel,
            max_speed_base: bullet_speed * tuning.max_speed_base_factor,
            max_speed_growth: speed_cap * tuning.max_speed_growth_factor,
            max_speed_cap: speed_cap,
            turn_rate,
            retarget_timer: 0.0,
            prev_los: None,
            lock: initial_lock,
            lock_timer: 0.0,
        }
    }

    /// Motor thrust at the current age
    pub fn acceleration(&self, tuning: &SeekerTuning) -> f32 {
        let ramped = self.accel_base * (1.0 + tuning.accel_growth * self.age);
        ramped.min(self.accel_base * tuning.accel_cap_mul)
    }

    /// Speed ceiling at the current age
    pub fn max_speed(&self) -> f32 {
        let floor = self.max_speed_base.min(self.max_speed_cap);
        (self.max_speed_base + self.max_speed_growth * self.age)
            .min(self.max_speed_cap)
            .max(floor)
    }

    fn needs_retarget(&self, lock_alive: bool, tuning: &SeekerTuning) -> bool {
        !lock_alive || self.retarget_timer >= tuning.retarget_every || self.lock_timer > tuning.lock_persist
    }
}

/// Where a tracked target is and how it has been moving
#[derive(Debug, Clone, Copy)]
pub struct TargetTrack {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl TargetTrack {
    fn of(enemy: &Enemy) -> Self {
        Self {
            pos: enemy.pos,
            vel: enemy.vel_estimate,
        }
    }
}

fn find_live(enemies: &[Enemy], id: EntityId) -> Option<&Enemy> {
    enemies
        .binary_search_by_key(&id, |e| e.id)
        .ok()
        .map(|i| &enemies[i])
        .filter(|e| e.is_alive())
}

/// Run retargeting and guidance for one missile. `enemies` must be in id
/// order; the missile must already have been moved this tick.
pub fn guide(bullet: &mut Bullet, enemies: &[Enemy], tuning: &SeekerTuning, dt: f32) {
    let Some(seeker) = bullet.seeker.as_mut() else {
        return;
    };
    seeker.age += dt;
    seeker.retarget_timer += dt;

    let lock_alive = seeker.lock.and_then(|id| find_live(enemies, id)).is_some();
    if seeker.needs_retarget(lock_alive, tuning) {
        seeker.retarget_timer = 0.0;
        let fresh = priority_target(enemies, bullet.pos);
        if fresh != seeker.lock {
            // LOS history belongs to the old target
            seeker.prev_los = None;
        }
        seeker.lock = fresh;
        seeker.lock_timer = 0.0;
    }

    let target = seeker
        .lock
        .and_then(|id| find_live(enemies, id))
        .map(TargetTrack::of);

    match target {
        Some(track) => steer(bullet.pos, &mut bullet.vel, seeker, track, tuning, dt),
        None => coast(&mut bullet.vel, seeker, tuning, dt),
    }
}

/// Guidance law against a tracked target
pub fn steer(
    pos: Vec2,
    vel: &mut Vec2,
    seeker: &mut SeekerState,
    target: TargetTrack,
    tuning: &SeekerTuning,
    dt: f32,
) {
    let dt_safe = dt.max(EPSILON);
    let closing = vel.length().max(tuning.min_closing_speed);
    let dist = (target.pos - pos).length();

    let lead_time = (dist / closing)
        .min(tuning.lead_time_max)
        .max(tuning.lead_time_min);
    let terminal = dist <= tuning.terminal_distance;
    let aim = if terminal {
        target.pos
    } else {
        target.pos + target.vel * lead_time
    };

    let los = heading(aim - pos);
    let los_rate = match seeker.prev_los {
        Some(prev) => normalize_angle(los - prev) / dt_safe,
        None => 0.0,
    };
    seeker.prev_los = Some(los);

    let current = current_heading(*vel);
    let delta = normalize_angle(los - current);

    let gain = if terminal {
        tuning.terminal_heading_gain
    } else {
        tuning.heading_gain
    };
    let turn_boost = if terminal {
        tuning.terminal_turn_boost
    } else {
        1.0 + (delta.abs() / PI).min(1.0)
    };
    let pn = tuning.nav_const * los_rate * dt * turn_boost;
    let max_turn = (seeker.turn_rate * dt * turn_boost).abs();
    let turn = (delta * gain + pn).clamp(-max_turn, max_turn);
    let mut new_heading = current + turn;

    let align = unit(los).dot(unit(new_heading));
    let snap_cone = if terminal {
        tuning.snap_cone.max(tuning.terminal_snap_cone)
    } else {
        tuning.snap_cone
    };
    if align > snap_cone {
        new_heading = los;
    }

    let boost = if terminal { tuning.terminal_accel_boost } else { 1.0 };
    *vel += unit(new_heading) * seeker.acceleration(tuning) * boost * dt;
    clamp_speed(vel, seeker.max_speed());

    let to_target = target.pos - pos;
    let forward = to_target.dot(unit(new_heading)) / to_target.length().max(1e-3);
    seeker.lock_timer = if forward > tuning.lock_cone {
        0.0
    } else {
        seeker.lock_timer + dt
    };
}

/// No target: hold heading and keep the motor warm for reacquisition
pub fn coast(vel: &mut Vec2, seeker: &mut SeekerState, tuning: &SeekerTuning, dt: f32) {
    let max_speed = seeker.max_speed();
    if vel.length() < max_speed * tuning.coast_fraction {
        let dir = unit(current_heading(*vel));
        *vel += dir * seeker.acceleration(tuning) * tuning.coast_accel_factor * dt;
    }
}

/// Heading of a velocity; straight up when it has no meaningful direction
fn current_heading(vel: Vec2) -> f32 {
    if vel.length_squared() > EPSILON {
        heading(vel)
    } else {
        -FRAC_PI_2
    }
}

fn clamp_speed(vel: &mut Vec2, max_speed: f32) {
    let speed = vel.length();
    if speed > max_speed && speed > EPSILON {
        *vel *= max_speed / speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{BulletSource, EnemyKind};

    const DT: f32 = 1.0 / 60.0;

    fn seeker_bullet(pos: Vec2, vel: Vec2, lock: Option<EntityId>) -> Bullet {
        let tuning = SeekerTuning::default();
        Bullet {
            id: EntityId(100),
            pos,
            vel,
            damage: 8.0,
            pierce: 0,
            source: BulletSource::Ship,
            seeker: Some(SeekerState::launch(&tuning, 520.0, 420.0, 820.0, PI * 12.0, lock)),
            spent: false,
        }
    }

    fn target(id: u32, pos: Vec2) -> Enemy {
        Enemy::new(EntityId(id), EnemyKind::Basic, pos, 20.0, 0.0)
    }

    #[test]
    fn test_motor_and_ceiling_ramp_then_cap() {
        let tuning = SeekerTuning::default();
        let mut s = SeekerState::launch(&tuning, 520.0, 420.0, 820.0, PI * 12.0, None);
        assert!((s.acceleration(&tuning) - 420.0).abs() < 1e-3);
        assert!((s.max_speed() - 286.0).abs() < 1e-3);
        s.age = 10.0;
        assert!((s.acceleration(&tuning) - 1260.0).abs() < 1e-3);
        assert!((s.max_speed() - 820.0).abs() < 1e-3);
    }

    #[test]
    fn test_dead_ahead_target_keeps_heading_on_los() {
        let enemies = vec![target(1, Vec2::new(240.0, 400.0))];
        let mut b = seeker_bullet(Vec2::new(240.0, 700.0), Vec2::new(0.0, -182.0), Some(EntityId(1)));
        let tuning = SeekerTuning::default();

        b.pos += b.vel * DT;
        guide(&mut b, &enemies, &tuning, DT);

        let los = heading(enemies[0].pos - b.pos);
        assert!(normalize_angle(heading(b.vel) - los).abs() < 1e-4);
        assert!(b.vel.length() > 182.0);
    }

    #[test]
    fn test_stationary_target_impacts() {
        let enemies = vec![target(1, Vec2::new(240.0, 400.0))];
        let mut b = seeker_bullet(Vec2::new(240.0, 700.0), Vec2::new(0.0, -182.0), Some(EntityId(1)));
        let tuning = SeekerTuning::default();

        let mut hit_tick = None;
        for tick in 1..=120 {
            b.pos += b.vel * DT;
            guide(&mut b, &enemies, &tuning, DT);
            if b.bounds().overlaps(&enemies[0].bounds()) {
                hit_tick = Some(tick);
                break;
            }
        }
        let tick = hit_tick.expect("missile never reached a stationary target");
        // ~281 px of closing distance at a ramping 182..450 px/s
        assert!((25..=75).contains(&tick), "impact at tick {tick}");
    }

    #[test]
    fn test_curves_toward_offset_target() {
        let enemies = vec![target(1, Vec2::new(400.0, 300.0))];
        let mut b = seeker_bullet(Vec2::new(240.0, 700.0), Vec2::new(0.0, -182.0), None);
        let tuning = SeekerTuning::default();

        let start_dist = (enemies[0].pos - b.pos).length();
        for _ in 0..30 {
            b.pos += b.vel * DT;
            guide(&mut b, &enemies, &tuning, DT);
        }
        assert_eq!(b.seeker.as_ref().unwrap().lock, Some(EntityId(1)));
        assert!(b.vel.x > 0.0, "missile should bend toward the target");
        assert!((enemies[0].pos - b.pos).length() < start_dist);
    }

    #[test]
    fn test_dead_lock_is_replaced() {
        let mut enemies = vec![target(1, Vec2::new(100.0, 300.0)), target(2, Vec2::new(300.0, 200.0))];
        enemies[0].hp = 0.0;
        let mut b = seeker_bullet(Vec2::new(240.0, 700.0), Vec2::new(0.0, -182.0), Some(EntityId(1)));
        guide(&mut b, &enemies, &SeekerTuning::default(), DT);
        assert_eq!(b.seeker.as_ref().unwrap().lock, Some(EntityId(2)));
    }

    #[test]
    fn test_coasts_without_targets() {
        let mut b = seeker_bullet(Vec2::new(240.0, 700.0), Vec2::new(0.0, -100.0), None);
        let tuning = SeekerTuning::default();
        for _ in 0..600 {
            b.pos += b.vel * DT;
            guide(&mut b, &[], &tuning, DT);
        }
        let s = b.seeker.as_ref().unwrap();
        assert!(s.lock.is_none());
        // Straight up, and never beyond the coast fraction (plus one tick of thrust)
        assert!(b.vel.x.abs() < 1e-3);
        let limit = s.max_speed() * tuning.coast_fraction + s.acceleration(&tuning) * DT;
        assert!(b.vel.length() <= limit + 1e-3);
        assert!(b.vel.length() > 100.0);
    }

    #[test]
    fn test_lock_timer_grows_when_target_behind() {
        let tuning = SeekerTuning::default();
        let mut s = SeekerState::launch(&tuning, 520.0, 420.0, 820.0, 0.0, Some(EntityId(1)));
        let mut vel = Vec2::new(0.0, -300.0);
        // Target directly behind, zero turn rate: never inside the cone
        let track = TargetTrack {
            pos: Vec2::new(240.0, 900.0),
            vel: Vec2::ZERO,
        };
        for _ in 0..10 {
            steer(Vec2::new(240.0, 600.0), &mut vel, &mut s, track, &tuning, DT);
        }
        assert!(s.lock_timer > 0.15);
    }
}
