//! Per-frame simulation step
//!
//! Core game loop that advances the world deterministically. The order of
//! phases inside `advance` is fixed; tests and replays depend on it.

use super::combat;
use super::draft;
use super::enemy;
use super::player;
use super::collision::out_of_bounds;
use super::spawner;
use super::state::{FailReason, GameEvent, GamePhase, RunSummary, World};
use super::targeting::priority_target;
use crate::consts::CULL_SLACK;
use crate::tuning::{DraftPause, MovementMode};

/// Input commands for a single frame (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Target ship x (pointer/touch position) for drag movement
    pub pointer_x: Option<f32>,
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Fire trigger held (ignored when the variant auto-fires)
    pub fire: bool,
    /// Idle/demo mode - the ship flies itself
    pub autopilot: bool,
}

/// Fill in steering and trigger for demo mode: chase the enemy closest to
/// breaching and keep firing
fn autopilot(world: &World, input: &TickInput) -> TickInput {
    let mut input = input.clone();
    input.fire = true;
    let Some(target) = priority_target(&world.enemies, world.player.pos)
        .and_then(|id| world.enemy_index(id))
        .map(|i| world.enemies[i].pos.x)
    else {
        return input;
    };
    match world.tuning.movement {
        MovementMode::PointerDrag => input.pointer_x = Some(target),
        MovementMode::Keyboard => {
            let dx = target - world.player.pos.x;
            input.left = dx < -4.0;
            input.right = dx > 4.0;
        }
    }
    input
}

/// Advance the world by one frame.
///
/// `dt` is clamped to `[0, tuning.max_dt]`; a non-finite `dt` is treated as
/// zero. Nothing runs on the menu or after game over. While a draft is open
/// the variant decides what keeps moving: a full pause only ticks the pick
/// animation, a partial pause keeps hostile fire, contacts and particles
/// running while the ship, its weapons and the enemies hold still.
pub fn advance(world: &mut World, input: &TickInput, dt: f32) {
    let dt = if dt.is_finite() { dt.clamp(0.0, world.tuning.max_dt) } else { 0.0 };

    match world.phase {
        GamePhase::Menu | GamePhase::GameOver => return,
        GamePhase::Drafting if world.tuning.draft.pause == DraftPause::Full => {
            draft::tick_pick_animation(world, dt);
            return;
        }
        _ => {}
    }
    draft::tick_pick_animation(world, dt);

    let input = if input.autopilot { autopilot(world, input) } else { input.clone() };
    let trigger = world.tuning.auto_fire || input.fire;

    world.time += dt;
    player::update_shield_pulse(world, dt);

    let active = world.phase == GamePhase::Running;
    if active {
        player::update_regen(world, dt);
        player::move_player(world, &input, dt);
        player::fire(world, trigger);
        player::update_drones(world, dt);
        player::update_rockets(world, trigger, dt);
        player::update_bullets(world, dt);
        spawner::release_queued(world);
        enemy::update_enemies(world, dt);
        if world.summary.is_some() {
            world.sweep();
            return;
        }
    }

    move_enemy_bullets(world, dt);

    if active {
        combat::resolve_player_bullets(world);
        combat::resolve_rockets(world);
    }
    combat::tick_invuln(world, dt);
    combat::resolve_enemy_bullets(world);
    combat::resolve_contacts(world);
    combat::update_particles(world, dt);
    world.sweep();

    if world.phase == GamePhase::Running {
        spawner::release_queued(world);
        if world.enemies.is_empty() && world.spawn_queue.is_empty() {
            next_level(world);
        }
    }
}

/// Fly hostile projectiles and drop the ones that left the arena
fn move_enemy_bullets(world: &mut World, dt: f32) {
    let (w, h) = (world.arena.x, world.arena.y);
    for bullet in &mut world.enemy_bullets {
        bullet.pos += bullet.vel * dt;
    }
    world.enemy_bullets.retain(|b| !out_of_bounds(b.pos, w, h, CULL_SLACK));
}

/// Set up a freshly reset world for level 1: weapon first, then pendant
/// passives, then the opening wave
pub(crate) fn begin_run(world: &mut World) {
    player::apply_weapon(world);
    player::apply_passives(world);
    let level = world.level;
    spawner::spawn_wave(world, level);
    spawner::spawn_level_boss(world, level);
    log::info!(
        "run started (seed {}, weapon {}, {} passives)",
        world.seed(),
        world.loadout.weapon.id.as_str(),
        world.loadout.passives.effects.len()
    );
    world.emit(GameEvent::RunStarted { level });
}

/// Level cleared: spawn the next wave (and boss) and open a draft when due
pub fn next_level(world: &mut World) {
    world.level += 1;
    let level = world.level;
    spawner::spawn_wave(world, level);
    spawner::spawn_level_boss(world, level);
    log::info!("level {} ({} enemies)", level, world.last_wave_count);
    world.emit(GameEvent::LevelAdvanced {
        level,
        enemies: world.last_wave_count,
    });
    if draft::should_offer(world, level) {
        draft::open_draft(world);
    }
}

/// End the run. Only the first failure counts.
pub fn fail(world: &mut World, reason: FailReason) {
    if world.summary.is_some() {
        return;
    }
    let stats = &world.stats;
    let summary = RunSummary {
        reason,
        score: stats.score,
        level: world.level,
        kills: stats.kills,
        boss_kills: stats.boss_kills,
        coins_earned: RunSummary::coins_for(stats.score, world.level, stats.boss_kills),
    };
    log::info!(
        "game over ({:?}) at level {}: score {}, {} coins",
        reason,
        summary.level,
        summary.score,
        summary.coins_earned
    );
    world.phase = GamePhase::GameOver;
    world.draft = Default::default();
    world.summary = Some(summary.clone());
    world.emit(GameEvent::GameOver(summary));
}
