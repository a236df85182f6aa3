//! Data-driven game balance
//!
//! The two game variants share every system and differ only in the numbers
//! and policies collected here. `Tuning::card_draft()` is the drag-to-move,
//! auto-firing shooter with stacking cards; `Tuning::buff_slots()` is the
//! keyboard-driven shooter with slot-bound single-use buffs, dodge and
//! shield charges.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_DT;
use crate::sim::EnemyKind;
use crate::sim::guidance::SeekerTuning;

/// Which game ruleset is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variant {
    /// Continuous-fire vertical shooter with per-level card drafting
    #[default]
    CardDraft,
    /// WASD shooter with slot-based consumable buffs
    BuffSlots,
}

/// How the player ship is steered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementMode {
    /// Ship eases horizontally toward a pointer x at a fixed altitude
    PointerDrag,
    /// Ship moves freely in the lower play area from directional keys
    Keyboard,
}

/// What keeps simulating while a draft offer is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftPause {
    /// Enemy projectiles, contact checks and particles keep running
    Partial,
    /// Nothing advances except the offer itself
    Full,
}

/// An enemy kind and the level at which waves start using it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub kind: EnemyKind,
    pub min_level: u32,
}

/// Wave composition and boss cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    /// Enemies at level 0 before growth
    pub base_count: f32,
    /// Extra enemies per level
    pub growth_per_level: f32,
    /// HP scaling per level for regular enemies
    pub hp_growth_per_level: f32,
    pub pool: Vec<PoolEntry>,
    pub boss_modulus: u32,
    /// `level % boss_modulus` that spawns the arc boss
    pub arc_boss_offset: u32,
    /// `level % boss_modulus` that spawns the chrono boss
    pub chrono_boss_offset: u32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            base_count: 6.0,
            growth_per_level: 0.8,
            hp_growth_per_level: 0.06,
            pool: vec![
                PoolEntry { kind: EnemyKind::Basic, min_level: 1 },
                PoolEntry { kind: EnemyKind::Shooter, min_level: 3 },
                PoolEntry { kind: EnemyKind::Dasher, min_level: 4 },
                PoolEntry { kind: EnemyKind::Shield, min_level: 6 },
                PoolEntry { kind: EnemyKind::Splitter, min_level: 7 },
            ],
            boss_modulus: 10,
            arc_boss_offset: 5,
            chrono_boss_offset: 0,
        }
    }
}

/// Draft/offer cadence and gating
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftTuning {
    /// Offer a draft when `level % every == 0`
    pub every: u32,
    pub pause: DraftPause,
    /// Freeze after a pick before play resumes (0 = resume immediately)
    pub pick_animation_secs: f32,
    pub offer_size: usize,
    /// Slot capacity for single-use buffs
    pub buff_slots: usize,
}

impl Default for DraftTuning {
    fn default() -> Self {
        Self {
            every: 2,
            pause: DraftPause::Partial,
            pick_animation_secs: 0.0,
            offer_size: 3,
            buff_slots: 4,
        }
    }
}

/// Player base stats layered under the selected weapon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_hp: f32,
    pub base_speed: f32,
    pub width: f32,
    pub height: f32,
    /// Applied on top of the weapon's fire rate
    pub fire_rate_mul: f32,
    /// Applied on top of the weapon's bullet damage
    pub damage_mul: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_hp: 100.0,
            base_speed: 560.0,
            width: 26.0,
            height: 26.0,
            fire_rate_mul: 1.0,
            damage_mul: 1.0,
        }
    }
}

/// Player-side damage handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseTuning {
    /// Dodge probability before any buff
    pub base_dodge: f32,
    /// Invulnerability granted by every damaging hit (0 = none)
    pub hit_invuln_secs: f32,
    /// Distance the ship is pushed away from the source of a damaging hit
    pub knockback: f32,
    /// Damage of an enemy body touching the player (before multipliers)
    pub contact_damage: f32,
    /// Distance an enemy is pushed back after touching the player
    pub contact_pushback: f32,
    /// On-hit invulnerability from bullets when the Aegis passive is active
    pub aegis_bullet_invuln: f32,
    /// On-hit invulnerability from contact when the Aegis passive is active
    pub aegis_contact_invuln: f32,
}

impl Default for DefenseTuning {
    fn default() -> Self {
        Self {
            base_dodge: 0.0,
            hit_invuln_secs: 0.0,
            knockback: 0.0,
            contact_damage: 16.0,
            contact_pushback: 20.0,
            aegis_bullet_invuln: 0.4,
            aegis_contact_invuln: 0.5,
        }
    }
}

/// Rocket pod launcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RocketTuning {
    pub interval: f32,
    pub speed: f32,
    pub damage: f32,
    pub splash_radius: f32,
}

impl Default for RocketTuning {
    fn default() -> Self {
        Self {
            interval: 1.2,
            speed: 420.0,
            damage: 30.0,
            splash_radius: 70.0,
        }
    }
}

/// Complete balance table for one variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub variant: Variant,
    pub movement: MovementMode,
    /// Fire continuously instead of waiting for the fire trigger
    pub auto_fire: bool,
    /// Upper clamp on frame delta
    pub max_dt: f32,
    /// Downgrade quality automatically when frames get slow
    pub auto_quality: bool,
    pub wave: WaveTuning,
    pub draft: DraftTuning,
    pub player: PlayerTuning,
    pub defense: DefenseTuning,
    pub rockets: RocketTuning,
    pub seeker: SeekerTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::card_draft()
    }
}

impl Tuning {
    /// Drag-to-move shooter with stacking cards
    pub fn card_draft() -> Self {
        Self {
            variant: Variant::CardDraft,
            movement: MovementMode::PointerDrag,
            auto_fire: true,
            max_dt: MAX_DT,
            auto_quality: false,
            wave: WaveTuning::default(),
            draft: DraftTuning::default(),
            player: PlayerTuning::default(),
            defense: DefenseTuning::default(),
            rockets: RocketTuning::default(),
            seeker: SeekerTuning::default(),
        }
    }

    /// Keyboard shooter with slot-bound buffs, dodge and shields
    pub fn buff_slots() -> Self {
        let mut wave = WaveTuning::default();
        wave.pool = vec![
            PoolEntry { kind: EnemyKind::Basic, min_level: 1 },
            PoolEntry { kind: EnemyKind::Shooter, min_level: 3 },
            PoolEntry { kind: EnemyKind::Dasher, min_level: 4 },
            PoolEntry { kind: EnemyKind::Purple, min_level: 5 },
            PoolEntry { kind: EnemyKind::Shield, min_level: 6 },
            PoolEntry { kind: EnemyKind::Splitter, min_level: 7 },
        ];

        Self {
            variant: Variant::BuffSlots,
            movement: MovementMode::Keyboard,
            auto_fire: false,
            max_dt: MAX_DT,
            auto_quality: true,
            wave,
            draft: DraftTuning {
                every: 3,
                pause: DraftPause::Full,
                pick_animation_secs: 0.6,
                offer_size: 3,
                buff_slots: 4,
            },
            player: PlayerTuning {
                max_hp: 120.0,
                base_speed: 320.0,
                width: 26.0,
                height: 26.0,
                fire_rate_mul: 0.85,
                damage_mul: 1.2,
            },
            defense: DefenseTuning {
                hit_invuln_secs: 0.8,
                knockback: 36.0,
                ..DefenseTuning::default()
            },
            rockets: RocketTuning::default(),
            seeker: SeekerTuning::default(),
        }
    }

    /// Preset for a variant
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::CardDraft => Self::card_draft(),
            Variant::BuffSlots => Self::buff_slots(),
        }
    }

    /// Parse a tuning table; missing keys fall back to the card-draft preset
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Enemy kinds available at `level`
    pub fn pool_for_level(&self, level: u32) -> Vec<EnemyKind> {
        let mut pool: Vec<EnemyKind> = self
            .wave
            .pool
            .iter()
            .filter(|entry| level >= entry.min_level)
            .map(|entry| entry.kind)
            .collect();
        // Basic is always available, even with a misconfigured pool
        if !pool.contains(&EnemyKind::Basic) {
            pool.insert(0, EnemyKind::Basic);
        }
        pool
    }
}
