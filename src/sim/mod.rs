//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clamped frame delta only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod boss;
pub mod cards;
pub mod collision;
pub mod combat;
pub mod draft;
pub mod enemy;
pub mod entity;
pub mod guidance;
pub mod player;
pub mod rng;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod targeting;
pub mod tick;

pub use cards::{BuffId, CardId, Effect};
pub use collision::Aabb;
pub use draft::DraftChoice;
pub use entity::{Enemy, EnemyKind, EntityId};
pub use snapshot::Snapshot;
pub use state::{FailReason, GameEvent, GamePhase, Multipliers, RunSummary, World};
pub use targeting::{priority_target, select_distinct_targets};
pub use tick::{TickInput, advance};
