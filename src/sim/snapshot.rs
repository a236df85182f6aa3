//! Read-only view of the world for drawing and UI
//!
//! A snapshot copies just what a renderer or HUD needs, so presentation code
//! never holds a borrow of the live world between frames.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cards::{BuffId, CardId};
use super::draft::DraftChoice;
use super::entity::{BulletSource, BulletStyle, EnemyKind, EntityId, ParticleTint};
use super::state::{GamePhase, RunSummary, World};
use super::targeting::lock_markers;

/// Lock markers float this far above the target's top edge
const LOCK_MARKER_GAP: f32 = 14.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipView {
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub invuln: bool,
    pub shield_charges: u32,
    pub dodge: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub shielded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletView {
    pub pos: Vec2,
    pub vel: Vec2,
    pub source: BulletSource,
    pub seeker: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyBulletView {
    pub pos: Vec2,
    pub size: Vec2,
    pub style: BulletStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub pos: Vec2,
    /// 1.0 when fresh, fading to 0.0
    pub alpha: f32,
    pub tint: ParticleTint,
}

/// Boss hazards worth drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HazardView {
    /// Beam from the boss down to the arena floor
    Laser { x: f32, width: f32, top: f32, active: bool },
    Vortex { pos: Vec2, radius: f32, remaining: f32 },
}

/// Everything presentation needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub level: u32,
    pub time: f32,
    pub score: u64,
    pub kills: u32,
    pub ship: ShipView,
    pub enemies: Vec<EnemyView>,
    /// Enemies waiting for room under the quality cap
    pub queued: usize,
    pub bullets: Vec<BulletView>,
    pub enemy_bullets: Vec<EnemyBulletView>,
    pub rockets: Vec<Vec2>,
    pub drones: Vec<Vec2>,
    pub particles: Vec<ParticleView>,
    pub hazards: Vec<HazardView>,
    /// Marker positions over enemies currently locked by seekers
    pub lock_markers: Vec<Vec2>,
    pub offer: Vec<DraftChoice>,
    /// Pick animation running; input should be ignored
    pub picking: bool,
    pub card_levels: Vec<(CardId, u8)>,
    pub buffs: Vec<BuffId>,
    pub summary: Option<RunSummary>,
}

impl Snapshot {
    pub fn capture(world: &World) -> Self {
        let player = &world.player;

        let mut hazards = Vec::new();
        for enemy in world.enemies.iter().filter(|e| e.is_alive()) {
            let Some(boss) = enemy.boss() else {
                continue;
            };
            if let Some(laser) = &boss.laser {
                hazards.push(HazardView::Laser {
                    x: laser.x,
                    width: laser.width,
                    top: enemy.bottom(),
                    active: laser.active,
                });
            }
            if let Some(vortex) = &boss.vortex {
                hazards.push(HazardView::Vortex {
                    pos: vortex.pos,
                    radius: super::boss::VORTEX_RADIUS,
                    remaining: (vortex.duration - vortex.t).max(0.0),
                });
            }
        }

        let max_locks = 1 + usize::from(world.card_level(CardId::ArcSpread));
        let lock_markers = lock_markers(&world.bullets, max_locks)
            .into_iter()
            .filter_map(|id| world.enemy_index(id))
            .map(|i| &world.enemies[i])
            .filter(|e| e.is_alive())
            .map(|e| e.pos - Vec2::new(0.0, e.size.y / 2.0 + LOCK_MARKER_GAP))
            .collect();

        Self {
            phase: world.phase,
            level: world.level,
            time: world.time,
            score: world.stats.score,
            kills: world.stats.kills,
            ship: ShipView {
                pos: player.pos,
                size: player.size,
                hp: player.hp.max(0.0),
                max_hp: player.max_hp,
                invuln: player.invuln > 0.0,
                shield_charges: world.defense.shield_charges,
                dodge: world.defense.dodge,
            },
            enemies: world
                .enemies
                .iter()
                .filter(|e| e.is_alive())
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    size: e.size,
                    hp: e.hp,
                    max_hp: e.max_hp,
                    shielded: e.shield_active(),
                })
                .collect(),
            queued: world.spawn_queue.len(),
            bullets: world
                .bullets
                .iter()
                .filter(|b| !b.spent)
                .map(|b| BulletView {
                    pos: b.pos,
                    vel: b.vel,
                    source: b.source,
                    seeker: b.seeker.is_some(),
                })
                .collect(),
            enemy_bullets: world
                .enemy_bullets
                .iter()
                .map(|b| EnemyBulletView {
                    pos: b.pos,
                    size: b.size,
                    style: b.style,
                })
                .collect(),
            rockets: world.rockets.iter().map(|r| r.pos).collect(),
            drones: world.drones.iter().map(|d| d.pos).collect(),
            particles: world
                .particles
                .iter()
                .map(|p| ParticleView {
                    pos: p.pos,
                    alpha: (1.0 - p.age / p.life.max(f32::EPSILON)).clamp(0.0, 1.0),
                    tint: p.tint,
                })
                .collect(),
            hazards,
            lock_markers,
            offer: world.draft.offer.clone(),
            picking: world.draft.animating(),
            card_levels: world.card_levels.iter().map(|(&c, &l)| (c, l)).collect(),
            buffs: world.buffs.clone(),
            summary: world.summary.clone(),
        }
    }
}
