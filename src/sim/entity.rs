//! Entity records: enemies, projectiles, drones and particle markers
//!
//! Entities are plain data. Every entity carries a stable `EntityId`; the
//! world stores them in id order and removes them in a deferred pass after
//! each update phase, so references held across a tick (missile locks) are
//! ids, never indices.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::BossState;
use super::collision::Aabb;
use super::guidance::SeekerState;

/// Stable entity identifier (monotonic per run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Closed set of enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Shooter,
    Dasher,
    Shield,
    Splitter,
    /// Releases a homing mini on death
    Purple,
    /// Homing kamikaze; never breaches, must ram the player
    Mini,
    BossArc,
    BossChrono,
}

impl EnemyKind {
    pub fn is_boss(self) -> bool {
        matches!(self, EnemyKind::BossArc | EnemyKind::BossChrono)
    }

    /// Score credited when this enemy dies
    pub fn score_value(self) -> u64 {
        match self {
            EnemyKind::Basic => 12,
            EnemyKind::Shooter => 35,
            EnemyKind::Dasher => 32,
            EnemyKind::Shield => 38,
            EnemyKind::Splitter => 34,
            EnemyKind::Purple => 30,
            EnemyKind::Mini => 8,
            EnemyKind::BossArc | EnemyKind::BossChrono => 900,
        }
    }

    /// HP before level and difficulty scaling
    pub fn base_hp(self) -> f32 {
        match self {
            EnemyKind::Basic => 20.0,
            EnemyKind::Shooter => 34.0,
            EnemyKind::Dasher => 26.0,
            EnemyKind::Shield => 40.0,
            EnemyKind::Splitter => 28.0,
            EnemyKind::Purple => 30.0,
            EnemyKind::Mini => 8.0,
            EnemyKind::BossArc => 260.0,
            EnemyKind::BossChrono => 280.0,
        }
    }

    /// Speed sampling range (px/s) before the speed multiplier
    pub fn speed_range(self) -> (f32, f32) {
        match self {
            EnemyKind::Basic => (60.0, 120.0),
            EnemyKind::Shooter => (70.0, 110.0),
            EnemyKind::Dasher => (80.0, 130.0),
            EnemyKind::Shield => (60.0, 100.0),
            EnemyKind::Splitter => (70.0, 120.0),
            EnemyKind::Purple => (70.0, 110.0),
            EnemyKind::Mini => (150.0, 190.0),
            EnemyKind::BossArc => (32.0, 32.0),
            EnemyKind::BossChrono => (36.0, 36.0),
        }
    }

    /// Square hitbox edge length
    pub fn size(self) -> f32 {
        match self {
            EnemyKind::Mini => 16.0,
            EnemyKind::Purple => 28.0,
            EnemyKind::BossArc => 96.0,
            EnemyKind::BossChrono => 100.0,
            _ => 26.0,
        }
    }

    /// Enemies that may pass the bottom edge without ending the run
    pub fn breach_exempt(self) -> bool {
        matches!(self, EnemyKind::Mini) || self.is_boss()
    }

    /// Lateral drift (angular frequency, amplitude px/s) for sine-drifting kinds
    pub fn drift(self) -> Option<(f32, f32)> {
        match self {
            EnemyKind::Basic => Some((1.8, 30.0)),
            EnemyKind::Shooter => Some((1.6, 28.0)),
            EnemyKind::Shield => Some((1.5, 26.0)),
            EnemyKind::Splitter => Some((1.7, 28.0)),
            EnemyKind::Purple => Some((1.4, 24.0)),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Shooter => "shooter",
            EnemyKind::Dasher => "dasher",
            EnemyKind::Shield => "shield",
            EnemyKind::Splitter => "splitter",
            EnemyKind::Purple => "purple",
            EnemyKind::Mini => "mini",
            EnemyKind::BossArc => "boss_arc",
            EnemyKind::BossChrono => "boss_chrono",
        }
    }
}

/// Shield enemy cycle: active for `SHIELD_ACTIVE` out of every `SHIELD_PERIOD` seconds
pub const SHIELD_PERIOD: f32 = 2.2;
pub const SHIELD_ACTIVE: f32 = 0.8;

/// Per-kind behavior state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Behavior {
    /// Falls with a lateral sine drift
    Drift,
    /// Drifts and fires straight down when its timer passes the cooldown
    Shooter { fire_cooldown: f32 },
    /// Tracks the player and periodically lunges
    Dasher { dash_countdown: f32 },
    /// Invulnerable during part of a repeating cycle
    Shield { shield_timer: f32, active: bool },
    /// Steers toward the player
    Homing,
    Boss(BossState),
}

/// A live enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    /// Local clock; shooters reset it after each shot
    pub age: f32,
    /// Drift phase offset so neighbours don't sway in lockstep
    pub drift_phase: f32,
    /// Finite-difference estimate of last tick's motion; an estimate, since
    /// most kinds are position-scripted rather than velocity-integrated
    pub vel_estimate: Vec2,
    /// Splitters with generation > 0 split on death
    pub generation: u8,
    pub behavior: Behavior,
}

impl Enemy {
    pub fn new(id: EntityId, kind: EnemyKind, pos: Vec2, hp: f32, speed: f32) -> Self {
        let size = kind.size();
        Self {
            id,
            kind,
            pos,
            size: Vec2::splat(size),
            hp,
            max_hp: hp,
            speed,
            age: 0.0,
            drift_phase: 0.0,
            vel_estimate: Vec2::ZERO,
            generation: if kind == EnemyKind::Splitter { 1 } else { 0 },
            behavior: Behavior::Drift,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Lower edge y
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y / 2.0
    }

    /// Whether incoming damage is currently nullified
    pub fn shield_active(&self) -> bool {
        matches!(self.behavior, Behavior::Shield { active: true, .. })
    }

    pub fn boss(&self) -> Option<&BossState> {
        match &self.behavior {
            Behavior::Boss(state) => Some(state),
            _ => None,
        }
    }
}

/// Player projectile hitbox
pub const PLAYER_BULLET_SIZE: Vec2 = Vec2::new(8.0, 12.0);

/// Who fired a player-side bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletSource {
    Ship,
    Drone,
}

/// A player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    /// Additional enemies this bullet may pass through
    pub pierce: u32,
    pub source: BulletSource,
    /// Guidance state for seeker missiles
    pub seeker: Option<SeekerState>,
    /// Set once the bullet is used up; swept after the phase
    #[serde(skip)]
    pub spent: bool,
}

impl Bullet {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, PLAYER_BULLET_SIZE)
    }
}

/// Visual style of hostile projectiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletStyle {
    Standard,
    Radial,
    Spiral,
    Meteor,
}

/// A hostile projectile (no guidance)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub size: Vec2,
    pub style: BulletStyle,
}

impl EnemyBullet {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }
}

/// Rocket hitbox
pub const ROCKET_SIZE: Vec2 = Vec2::new(8.0, 18.0);

/// Splash-damage rocket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rocket {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub splash_radius: f32,
}

impl Rocket {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, ROCKET_SIZE)
    }
}

/// Companion that orbits the ship and fires on its own cooldown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    pub pos: Vec2,
    pub angle: f32,
    pub radius: f32,
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
    pub last_fire: f32,
}

/// What a particle marker belongs to (for tinting)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleTint {
    Enemy(EnemyKind),
    ShieldSpark,
    Player,
    Rocket,
}

/// Inert visual marker; never affects gameplay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: f32,
    pub life: f32,
    pub tint: ParticleTint,
}
