//! World state and core simulation types
//!
//! A single `World` owns every per-run collection. Subsystems are free
//! functions that borrow it mutably for one phase at a time.

use std::collections::{BTreeMap, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cards::{BuffId, CardId};
use super::draft::{DraftChoice, DraftState};
use super::entity::{Bullet, Drone, Enemy, EnemyBullet, EnemyKind, EntityId, Particle, Rocket};
use super::rng::SimRng;
use super::snapshot::Snapshot;
use super::spawner::EnemySpawn;
use super::tick::{self, TickInput};
use crate::consts::*;
use crate::loadout::{RunLoadout, WeaponProfile};
use crate::settings::QualityPreset;
use crate::tuning::Tuning;

/// Run state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run in progress
    Menu,
    /// Active gameplay
    Running,
    /// A draft offer (or its pick animation) is on screen
    Drafting,
    /// Run ended; summary available
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailReason {
    ShipDestroyed,
    EnemyBreach,
}

/// End-of-run report handed to the economy layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub reason: FailReason,
    pub score: u64,
    pub level: u32,
    pub kills: u32,
    pub boss_kills: u32,
    pub coins_earned: u64,
}

impl RunSummary {
    /// Coins for a finished run: `floor(score*0.1 + level*3 + boss_kills*50)`
    pub fn coins_for(score: u64, level: u32, boss_kills: u32) -> u64 {
        let raw = score as f64 * 0.1 + level as f64 * 3.0 + boss_kills as f64 * 50.0;
        raw.floor().max(0.0) as u64
    }
}

/// Discrete notifications for UI, audio and dialogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted { level: u32 },
    EnemyDied { id: EntityId, kind: EnemyKind, pos: Vec2, score: u64 },
    PlayerHit { damage: f32, hp: f32 },
    Dodged,
    ShieldAbsorbed { charges_left: u32 },
    LevelAdvanced { level: u32, enemies: u32 },
    BossSpawned { kind: EnemyKind },
    DraftOffered { choices: Vec<DraftChoice> },
    DraftClosed { picked: Option<DraftChoice> },
    GameOver(RunSummary),
}

/// Global difficulty scalars, nudged by card and buff drawbacks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub enemy_hp: f32,
    pub enemy_speed: f32,
    pub enemy_spawn: f32,
    pub enemy_bullet_speed: f32,
    pub enemy_damage: f32,
    /// Fraction of player damage enemies ignore, in [0, 0.8]
    pub enemy_armor: f32,
}

/// Upper bound on enemy armor
pub const MAX_ENEMY_ARMOR: f32 = 0.8;

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            enemy_hp: 1.0,
            enemy_speed: 1.0,
            enemy_spawn: 1.0,
            enemy_bullet_speed: 1.0,
            enemy_damage: 1.0,
            enemy_armor: 0.0,
        }
    }
}

/// The player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    /// Movement speed before temporary slows
    pub base_speed: f32,
    /// Active weapon stats; cards and pendants modify this copy
    pub weapon: WeaponProfile,
    /// Seconds of damage immunity left
    pub invuln: f32,
    /// Run-clock time of the last volley
    pub last_fire: Option<f32>,
    pub rocket_timer: f32,
}

impl Player {
    pub fn new(tuning: &Tuning, arena: Vec2) -> Self {
        Self {
            pos: Vec2::new(arena.x / 2.0, arena.y - PLAYER_BOTTOM_OFFSET),
            size: Vec2::new(tuning.player.width, tuning.player.height),
            hp: tuning.player.max_hp,
            max_hp: tuning.player.max_hp,
            base_speed: tuning.player.base_speed,
            weapon: WeaponProfile::default(),
            invuln: 0.0,
            last_fire: None,
            rocket_timer: 0.0,
        }
    }

    pub fn bounds(&self) -> super::collision::Aabb {
        super::collision::Aabb::new(self.pos, self.size)
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }
}

/// Player-side damage negation layers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defense {
    /// Chance in [0, 1] to negate a hit outright
    pub dodge: f32,
    pub shield_charges: u32,
    /// On-hit invulnerability windows enabled
    pub on_hit_invuln: bool,
    /// Extra seconds added to every on-hit window
    pub on_hit_bonus: f32,
}

/// Health regeneration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Regen {
    /// Flat rate from passives
    pub base_rate: f32,
    /// Rate from the Hull Plating tier
    pub tier_rate: f32,
    /// Added once out of combat long enough
    pub bonus_rate: f32,
    pub out_delay: f32,
    pub since_hit: f32,
    pub tier: u8,
}

impl Default for Regen {
    fn default() -> Self {
        Self {
            base_rate: 0.0,
            tier_rate: 0.0,
            bonus_rate: 0.0,
            out_delay: 2.5,
            since_hit: f32::INFINITY,
            tier: 0,
        }
    }
}

impl Regen {
    /// HP per second right now
    pub fn active_rate(&self) -> f32 {
        let bonus = if self.since_hit >= self.out_delay {
            self.bonus_rate
        } else {
            0.0
        };
        self.base_rate + self.tier_rate + bonus
    }
}

/// Periodic invulnerability pulse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldPulse {
    pub interval: f32,
    pub duration: f32,
    pub t: f32,
}

/// Per-run counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub score: u64,
    pub kills: u32,
    pub boss_kills: u32,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    /// Playfield width and height
    pub arena: Vec2,
    pub quality: QualityPreset,
    pub phase: GamePhase,
    pub level: u32,
    /// Enemies announced for the current level (wave, boss and summons)
    pub last_wave_count: u32,
    /// Run clock in seconds
    pub time: f32,
    pub player: Player,
    pub mods: Multipliers,
    pub defense: Defense,
    pub regen: Regen,
    pub shield_pulse: Option<ShieldPulse>,
    pub card_levels: BTreeMap<CardId, u8>,
    /// Held slot-bound buffs in pick order
    pub buffs: Vec<BuffId>,
    pub rockets_enabled: bool,
    pub draft: DraftState,
    /// Live enemies, sorted by id
    pub enemies: Vec<Enemy>,
    /// Enemies waiting for room under the quality cap
    pub spawn_queue: VecDeque<EnemySpawn>,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub rockets: Vec<Rocket>,
    pub drones: Vec<Drone>,
    pub particles: Vec<Particle>,
    pub stats: RunStats,
    pub summary: Option<RunSummary>,
    /// Loadout the current run started with (reused by retry)
    pub loadout: RunLoadout,
    pub(crate) rng: SimRng,
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl World {
    /// Fresh world on the menu
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let arena = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT);
        let player = Player::new(&tuning, arena);
        Self {
            tuning,
            arena,
            quality: QualityPreset::High,
            phase: GamePhase::Menu,
            level: 1,
            last_wave_count: 0,
            time: 0.0,
            player,
            mods: Multipliers::default(),
            defense: Defense::default(),
            regen: Regen::default(),
            shield_pulse: None,
            card_levels: BTreeMap::new(),
            buffs: Vec::new(),
            rockets_enabled: false,
            draft: DraftState::default(),
            enemies: Vec::new(),
            spawn_queue: VecDeque::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            rockets: Vec::new(),
            drones: Vec::new(),
            particles: Vec::new(),
            stats: RunStats::default(),
            summary: None,
            loadout: RunLoadout::default(),
            rng: SimRng::new(seed),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Change the playfield size (takes effect for spawns and bounds immediately)
    pub fn with_arena(mut self, width: f32, height: f32) -> Self {
        self.arena = Vec2::new(width.max(1.0), height.max(1.0));
        self.player = Player::new(&self.tuning, self.arena);
        self
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Level of a stacking card (0 when never picked)
    pub fn card_level(&self, card: CardId) -> u8 {
        self.card_levels.get(&card).copied().unwrap_or(0)
    }

    pub fn is_drafting(&self) -> bool {
        self.phase == GamePhase::Drafting
    }

    /// Clear every per-run collection and restore neutral stats
    pub fn reset_run_state(&mut self) {
        self.phase = GamePhase::Running;
        self.level = 1;
        self.last_wave_count = 0;
        self.time = 0.0;
        self.player = Player::new(&self.tuning, self.arena);
        self.mods = Multipliers::default();
        self.defense = Defense {
            dodge: self.tuning.defense.base_dodge,
            ..Defense::default()
        };
        self.regen = Regen::default();
        self.shield_pulse = None;
        self.card_levels.clear();
        self.buffs.clear();
        self.rockets_enabled = false;
        self.draft = DraftState::default();
        self.enemies.clear();
        self.spawn_queue.clear();
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.rockets.clear();
        self.drones.clear();
        self.particles.clear();
        self.stats = RunStats::default();
        self.summary = None;
    }

    /// Begin a run at level 1 with a resolved loadout
    pub fn start_run(&mut self, loadout: RunLoadout) {
        self.reset_run_state();
        self.loadout = loadout;
        tick::begin_run(self);
    }

    /// Start over with the loadout of the previous run
    pub fn retry(&mut self) {
        let loadout = self.loadout.clone();
        self.start_run(loadout);
    }

    /// Abandon any run and return to the menu
    pub fn go_menu(&mut self) {
        self.reset_run_state();
        self.phase = GamePhase::Menu;
    }

    /// Switch quality tier; lowers caps for future spawns and particles
    pub fn set_quality(&mut self, quality: QualityPreset) {
        if quality != self.quality {
            log::debug!("quality {} -> {}", self.quality.as_str(), quality.as_str());
            self.quality = quality;
        }
    }

    /// Advance the simulation by one frame
    pub fn advance(&mut self, input: &TickInput, dt: f32) {
        tick::advance(self, input, dt);
    }

    /// Pick the draft choice at `index`; false when rejected
    pub fn choose_offer(&mut self, index: usize) -> bool {
        super::draft::choose(self, index)
    }

    /// Close the draft without picking; false when no offer is open
    pub fn skip_offer(&mut self) -> bool {
        super::draft::skip(self)
    }

    /// Read-only view for presentation
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    /// Index of a live enemy by id
    pub fn enemy_index(&self, id: EntityId) -> Option<usize> {
        self.enemies.binary_search_by_key(&id, |e| e.id).ok()
    }

    /// Drop dead enemies and spent projectiles
    pub(crate) fn sweep(&mut self) {
        self.enemies.retain(|e| e.is_alive());
        self.bullets.retain(|b| !b.spent);
    }
}
