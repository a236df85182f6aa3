//! Star Draft - wave-based arcade space shooter core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, guidance, collisions, bosses, progression)
//! - `tuning`: Data-driven game balance, one preset per game variant
//! - `loadout`: Pendant/weapon catalogs resolved into run-start modifiers
//! - `persistence`: Key-value storage seam for the meta economy
//! - `platform`: Frame pacing and quality auto-downgrade
//! - `settings`: Quality presets and the caps they imply

pub mod loadout;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use loadout::{Loadout, PassiveModifiers, PendantId, WeaponId, WeaponProfile};
pub use settings::{QualityPreset, Settings};
pub use tuning::{Tuning, Variant};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Upper bound on a single frame step (avoids tunneling after tab-suspend)
    pub const MAX_DT: f32 = 0.033;

    /// Default playfield dimensions
    pub const ARENA_WIDTH: f32 = 480.0;
    pub const ARENA_HEIGHT: f32 = 800.0;
    /// Horizontal margin enemies and the player are clamped to
    pub const MARGIN_X: f32 = 18.0;
    /// Distance of the player ship from the bottom edge in drag mode
    pub const PLAYER_BOTTOM_OFFSET: f32 = 90.0;
    /// Off-screen slack before projectiles are culled
    pub const CULL_SLACK: f32 = 30.0;

    /// Minimum denominator for normalizations and finite differences
    pub const EPSILON: f32 = 1e-4;

    /// Highest stack level a draft card can reach
    pub const CARD_LEVEL_CAP: u8 = 3;
    /// Maximum pendants equipped at once
    pub const EQUIP_LIMIT: usize = 2;
}

/// Normalize angle to (-π, π]
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Division that never produces a non-finite result for tiny denominators
#[inline]
pub fn safe_div(num: f32, den: f32) -> f32 {
    let den = if den.abs() < consts::EPSILON {
        consts::EPSILON.copysign(if den == 0.0 { 1.0 } else { den })
    } else {
        den
    };
    num / den
}

/// Heading angle of a vector (radians, screen coordinates with +y down)
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector for an angle
#[inline]
pub fn unit(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
