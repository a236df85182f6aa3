//! Lock-on target selection
//!
//! Priority rule shared by multi-lock firing and seeker retargeting:
//! enemies lower on screen (larger y) come first because they are closest to
//! breaching; ties go to the smaller squared distance from the shooter, then
//! to the lower entity id so the order is total.

use std::cmp::Ordering;

use glam::Vec2;

use super::entity::{Bullet, Enemy, EntityId};

/// Compare two enemies by lock priority as seen from `origin`
fn priority_order(a: &Enemy, b: &Enemy, origin: Vec2) -> Ordering {
    b.pos
        .y
        .total_cmp(&a.pos.y)
        .then_with(|| {
            let da = (a.pos - origin).length_squared();
            let db = (b.pos - origin).length_squared();
            da.total_cmp(&db)
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Up to `max_count` distinct live enemies in priority order
pub fn select_distinct_targets(enemies: &[Enemy], max_count: usize, origin: Vec2) -> Vec<EntityId> {
    if max_count == 0 {
        return Vec::new();
    }
    let mut live: Vec<&Enemy> = enemies.iter().filter(|e| e.is_alive()).collect();
    live.sort_by(|a, b| priority_order(a, b, origin));
    live.into_iter().take(max_count).map(|e| e.id).collect()
}

/// Highest-priority live enemy from `origin`
pub fn priority_target(enemies: &[Enemy], origin: Vec2) -> Option<EntityId> {
    enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| priority_order(a, b, origin))
        .map(|e| e.id)
}

/// Number of distinct locks a volley may spread over: one plus the Arc
/// Spread level, never more than the live enemy count
pub fn lock_capacity(arc_spread_level: u8, live_enemies: usize) -> usize {
    (1 + arc_spread_level as usize).min(live_enemies)
}

/// Distinct lock targets currently held by seekers, in bullet order,
/// limited to `max` markers
pub fn lock_markers(bullets: &[Bullet], max: usize) -> Vec<EntityId> {
    let mut markers: Vec<EntityId> = Vec::with_capacity(max);
    for lock in bullets
        .iter()
        .filter_map(|b| b.seeker.as_ref().and_then(|s| s.lock))
    {
        if markers.len() >= max {
            break;
        }
        if !markers.contains(&lock) {
            markers.push(lock);
        }
    }
    markers
}
