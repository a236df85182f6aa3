//! Card and buff catalogs plus the effect interpreter
//!
//! Every upgrade (stacking card, slot-bound buff, shop pendant) is a list of
//! tagged `Effect`s. `apply_effect` is the only code that turns them into
//! world mutations.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Drone;
use super::state::{MAX_ENEMY_ARMOR, ShieldPulse, World};
use crate::consts::CARD_LEVEL_CAP;

/// Stats of a companion drone granted by an effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroneSpec {
    /// No drone is added once this many are orbiting
    pub cap: usize,
    pub radius_base: f32,
    pub radius_step: f32,
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub bullet_damage: f32,
}

/// One world mutation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    FireRateMul(f32),
    /// Multiplies bullet damage, rounded, never below 1
    DamageMul(f32),
    MoveSpeedMul(f32),
    BulletSpeedMul(f32),
    SpreadAngleMul(f32),
    AddSpread { amount: u32, max: u32 },
    AddPierce { amount: u32, max: u32 },
    Heal(f32),
    MaxHp { add: f32, heal: f32 },
    /// Hull Plating regeneration at the card's current level
    HullRegenTier,
    /// Quantum Shield pulse at the card's current level
    ShieldPulseTier,
    AddDrone(DroneSpec),
    /// Raises the dodge chance to at least this value
    Dodge(f32),
    ShieldCharges(u32),
    EnableRockets,
    RegenRate(f32),
    /// Enables on-hit invulnerability and extends every window
    OnHitInvuln(f32),
    EnemyHpMul(f32),
    EnemySpeedMul(f32),
    EnemySpawnMul(f32),
    EnemyBulletSpeedMul(f32),
    EnemyDamageMul(f32),
    /// Additive; the result stays within `[0, MAX_ENEMY_ARMOR]`
    EnemyArmor(f32),
}

const HULL_BASE_RATES: [f32; 4] = [0.0, 2.6, 3.8, 5.0];
const HULL_BONUS_RATES: [f32; 4] = [0.0, 1.2, 1.8, 2.6];
const HULL_DELAYS: [f32; 4] = [0.0, 2.5, 2.0, 1.5];

/// Apply one effect. `level` is the level the owning card just reached
/// (1 for buffs and pendants).
pub fn apply_effect(world: &mut World, effect: &Effect, level: u8) {
    let player = &mut world.player;
    let mods = &mut world.mods;
    match *effect {
        Effect::FireRateMul(m) => player.weapon.fire_rate *= m,
        Effect::DamageMul(m) => player.weapon.damage = (player.weapon.damage * m).round().max(1.0),
        Effect::MoveSpeedMul(m) => player.base_speed *= m,
        Effect::BulletSpeedMul(m) => player.weapon.bullet_speed *= m,
        Effect::SpreadAngleMul(m) => player.weapon.spread_angle *= m,
        Effect::AddSpread { amount, max } => {
            player.weapon.spread = (player.weapon.spread + amount).min(max)
        }
        Effect::AddPierce { amount, max } => {
            player.weapon.pierce = (player.weapon.pierce + amount).min(max)
        }
        Effect::Heal(amount) => player.heal(amount),
        Effect::MaxHp { add, heal } => {
            player.max_hp += add;
            player.heal(heal);
        }
        Effect::HullRegenTier => {
            let tier = usize::from(level.min(CARD_LEVEL_CAP));
            world.regen.tier_rate = HULL_BASE_RATES[tier];
            world.regen.bonus_rate = HULL_BONUS_RATES[tier];
            world.regen.out_delay = HULL_DELAYS[tier];
            world.regen.tier = tier as u8;
            if tier >= 2 {
                let add = if tier == 2 { 6.0 } else { 12.0 };
                player.max_hp += add;
                player.heal(add * 0.5);
            }
        }
        Effect::ShieldPulseTier => {
            let lv = f32::from(level);
            let interval = (8.0 - lv).max(4.0);
            let duration = 0.6 + 0.2 * lv;
            match world.shield_pulse.as_mut() {
                Some(pulse) => {
                    pulse.interval = interval;
                    pulse.duration = duration;
                }
                None => {
                    world.shield_pulse = Some(ShieldPulse {
                        interval,
                        duration,
                        t: 0.0,
                    })
                }
            }
        }
        Effect::AddDrone(spec) => {
            let count = world.drones.len();
            if count < spec.cap {
                world.drones.push(Drone {
                    pos: player.pos - Vec2::new(0.0, 40.0),
                    angle: TAU * count as f32 / spec.cap as f32,
                    radius: spec.radius_base + spec.radius_step * count as f32,
                    fire_rate: spec.fire_rate,
                    bullet_speed: spec.bullet_speed,
                    bullet_damage: spec.bullet_damage,
                    last_fire: 0.0,
                });
            }
        }
        Effect::Dodge(p) => world.defense.dodge = world.defense.dodge.max(p.clamp(0.0, 1.0)),
        Effect::ShieldCharges(n) => world.defense.shield_charges += n,
        Effect::EnableRockets => world.rockets_enabled = true,
        Effect::RegenRate(rate) => world.regen.base_rate += rate,
        Effect::OnHitInvuln(bonus) => {
            world.defense.on_hit_invuln = true;
            world.defense.on_hit_bonus += bonus;
        }
        Effect::EnemyHpMul(m) => mods.enemy_hp *= m,
        Effect::EnemySpeedMul(m) => mods.enemy_speed *= m,
        Effect::EnemySpawnMul(m) => mods.enemy_spawn *= m,
        Effect::EnemyBulletSpeedMul(m) => mods.enemy_bullet_speed *= m,
        Effect::EnemyDamageMul(m) => mods.enemy_damage *= m,
        Effect::EnemyArmor(delta) => {
            mods.enemy_armor = (mods.enemy_armor + delta).clamp(0.0, MAX_ENEMY_ARMOR);
        }
    }
}

pub fn apply_all(world: &mut World, effects: &[Effect], level: u8) {
    for effect in effects {
        apply_effect(world, effect, level);
    }
}

/// Catalog entry shared by cards and buffs
#[derive(Debug)]
pub struct UpgradeDef {
    pub name: &'static str,
    pub buff_desc: &'static str,
    pub debuff_desc: &'static str,
    pub buffs: &'static [Effect],
    pub debuffs: &'static [Effect],
}

/// Stacking draft cards
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardId {
    RapidFire,
    Overcharge,
    HullPlating,
    Afterburner,
    ArcSpread,
    PulseBeam,
    Nanobot,
    QuantumShield,
    DroneCompanion,
    PiercingRounds,
    CryoField,
    CorrosiveCloud,
    EmpDisruptor,
}

const CARD_DRONE: DroneSpec = DroneSpec {
    cap: 3,
    radius_base: 32.0,
    radius_step: 8.0,
    fire_rate: 3.5,
    bullet_speed: 520.0,
    bullet_damage: 6.0,
};

impl CardId {
    pub const ALL: [CardId; 13] = [
        CardId::RapidFire,
        CardId::Overcharge,
        CardId::HullPlating,
        CardId::Afterburner,
        CardId::ArcSpread,
        CardId::PulseBeam,
        CardId::Nanobot,
        CardId::QuantumShield,
        CardId::DroneCompanion,
        CardId::PiercingRounds,
        CardId::CryoField,
        CardId::CorrosiveCloud,
        CardId::EmpDisruptor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CardId::RapidFire => "rapid_fire",
            CardId::Overcharge => "overcharge",
            CardId::HullPlating => "hull_plating",
            CardId::Afterburner => "afterburner",
            CardId::ArcSpread => "arc_spread",
            CardId::PulseBeam => "pulse_beam",
            CardId::Nanobot => "nanobot",
            CardId::QuantumShield => "quantum_shield",
            CardId::DroneCompanion => "drone_companion",
            CardId::PiercingRounds => "piercing_rounds",
            CardId::CryoField => "cryo_field",
            CardId::CorrosiveCloud => "corrosive_cloud",
            CardId::EmpDisruptor => "emp_disruptor",
        }
    }

    pub fn def(self) -> &'static UpgradeDef {
        match self {
            CardId::RapidFire => &UpgradeDef {
                name: "Rapid Fire",
                buff_desc: "+fire rate",
                debuff_desc: "Enemies move faster",
                buffs: &[Effect::FireRateMul(1.15)],
                debuffs: &[Effect::EnemySpeedMul(1.12)],
            },
            CardId::Overcharge => &UpgradeDef {
                name: "Overcharged Bullets",
                buff_desc: "+bullet damage",
                debuff_desc: "Enemies gain HP",
                buffs: &[Effect::DamageMul(1.22)],
                debuffs: &[Effect::EnemyHpMul(1.15)],
            },
            CardId::HullPlating => &UpgradeDef {
                name: "Hull Plating",
                buff_desc: "HP regen per second (+out-of-combat bonus)",
                debuff_desc: "Enemy damage up",
                buffs: &[Effect::HullRegenTier],
                debuffs: &[Effect::EnemyDamageMul(1.08)],
            },
            CardId::Afterburner => &UpgradeDef {
                name: "Afterburner",
                buff_desc: "+ship speed",
                debuff_desc: "More enemies spawn",
                buffs: &[Effect::MoveSpeedMul(1.15)],
                debuffs: &[Effect::EnemySpawnMul(1.12)],
            },
            CardId::ArcSpread => &UpgradeDef {
                name: "Arc Spread",
                buff_desc: "+spread shots",
                debuff_desc: "Enemies are tougher",
                buffs: &[Effect::AddSpread { amount: 1, max: 7 }],
                debuffs: &[Effect::EnemyHpMul(1.1)],
            },
            CardId::PulseBeam => &UpgradeDef {
                name: "Pulse Beam",
                buff_desc: "+bullet speed",
                debuff_desc: "Enemy damage up",
                buffs: &[Effect::BulletSpeedMul(1.2)],
                debuffs: &[Effect::EnemyDamageMul(1.12)],
            },
            CardId::Nanobot => &UpgradeDef {
                name: "Nanobot Repair",
                buff_desc: "Instant heal",
                debuff_desc: "More enemies spawn",
                buffs: &[Effect::Heal(15.0)],
                debuffs: &[Effect::EnemySpawnMul(1.1)],
            },
            CardId::QuantumShield => &UpgradeDef {
                name: "Quantum Shield",
                buff_desc: "Periodic invulnerability pulse",
                debuff_desc: "Enemies gain armor",
                buffs: &[Effect::ShieldPulseTier],
                debuffs: &[Effect::EnemyArmor(0.1)],
            },
            CardId::DroneCompanion => &UpgradeDef {
                name: "Drone Companion",
                buff_desc: "+shooting drone",
                debuff_desc: "More enemies spawn",
                buffs: &[Effect::AddDrone(CARD_DRONE)],
                debuffs: &[Effect::EnemySpawnMul(1.1)],
            },
            CardId::PiercingRounds => &UpgradeDef {
                name: "Piercing Rounds",
                buff_desc: "Bullets pierce enemies",
                debuff_desc: "Enemy bullets are faster",
                buffs: &[Effect::AddPierce { amount: 1, max: 3 }],
                debuffs: &[Effect::EnemyBulletSpeedMul(1.12)],
            },
            CardId::CryoField => &UpgradeDef {
                name: "Cryo Field",
                buff_desc: "Enemies move slower",
                debuff_desc: "Ship is slightly slower",
                buffs: &[Effect::EnemySpeedMul(0.88)],
                debuffs: &[Effect::MoveSpeedMul(0.95)],
            },
            CardId::CorrosiveCloud => &UpgradeDef {
                name: "Corrosive Cloud",
                buff_desc: "Enemy armor reduced",
                debuff_desc: "Bullet damage slightly lower",
                buffs: &[Effect::EnemyArmor(-0.12)],
                debuffs: &[Effect::DamageMul(0.94)],
            },
            CardId::EmpDisruptor => &UpgradeDef {
                name: "EMP Disruptor",
                buff_desc: "Enemy bullets slower",
                debuff_desc: "Fire rate slightly lower",
                buffs: &[Effect::EnemyBulletSpeedMul(0.82)],
                debuffs: &[Effect::FireRateMul(0.95)],
            },
        }
    }
}

/// Slot-bound single-use buffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuffId {
    ReflexDodge,
    AegisCells,
    RocketPod,
    Overdrive,
    HeavySlugs,
    IonThrusters,
    FieldMedic,
}

impl BuffId {
    pub const ALL: [BuffId; 7] = [
        BuffId::ReflexDodge,
        BuffId::AegisCells,
        BuffId::RocketPod,
        BuffId::Overdrive,
        BuffId::HeavySlugs,
        BuffId::IonThrusters,
        BuffId::FieldMedic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuffId::ReflexDodge => "reflex_dodge",
            BuffId::AegisCells => "aegis_cells",
            BuffId::RocketPod => "rocket_pod",
            BuffId::Overdrive => "overdrive",
            BuffId::HeavySlugs => "heavy_slugs",
            BuffId::IonThrusters => "ion_thrusters",
            BuffId::FieldMedic => "field_medic",
        }
    }

    pub fn def(self) -> &'static UpgradeDef {
        match self {
            BuffId::ReflexDodge => &UpgradeDef {
                name: "Reflex Dodge",
                buff_desc: "50% chance to dodge a hit",
                debuff_desc: "Enemy bullets are faster",
                buffs: &[Effect::Dodge(0.5)],
                debuffs: &[Effect::EnemyBulletSpeedMul(1.1)],
            },
            BuffId::AegisCells => &UpgradeDef {
                name: "Aegis Cells",
                buff_desc: "+3 shield charges",
                debuff_desc: "Enemies gain HP",
                buffs: &[Effect::ShieldCharges(3)],
                debuffs: &[Effect::EnemyHpMul(1.1)],
            },
            BuffId::RocketPod => &UpgradeDef {
                name: "Rocket Pod",
                buff_desc: "Fires splash rockets",
                debuff_desc: "More enemies spawn",
                buffs: &[Effect::EnableRockets],
                debuffs: &[Effect::EnemySpawnMul(1.15)],
            },
            BuffId::Overdrive => &UpgradeDef {
                name: "Overdrive",
                buff_desc: "+30% fire rate",
                debuff_desc: "Enemies move faster",
                buffs: &[Effect::FireRateMul(1.3)],
                debuffs: &[Effect::EnemySpeedMul(1.1)],
            },
            BuffId::HeavySlugs => &UpgradeDef {
                name: "Heavy Slugs",
                buff_desc: "+40% bullet damage",
                debuff_desc: "Bullets fly slower",
                buffs: &[Effect::DamageMul(1.4)],
                debuffs: &[Effect::BulletSpeedMul(0.85)],
            },
            BuffId::IonThrusters => &UpgradeDef {
                name: "Ion Thrusters",
                buff_desc: "+20% ship speed",
                debuff_desc: "Enemy damage up",
                buffs: &[Effect::MoveSpeedMul(1.2)],
                debuffs: &[Effect::EnemyDamageMul(1.1)],
            },
            BuffId::FieldMedic => &UpgradeDef {
                name: "Field Medic",
                buff_desc: "+20 max HP and slow regen",
                debuff_desc: "Enemies gain armor",
                buffs: &[Effect::MaxHp { add: 20.0, heal: 20.0 }, Effect::RegenRate(1.0)],
                debuffs: &[Effect::EnemyArmor(0.1)],
            },
        }
    }
}

/// Raise a card one level and apply its buff and debuff. A maxed card is
/// rejected and nothing changes.
pub fn pick_card(world: &mut World, card: CardId) -> bool {
    let current = world.card_level(card);
    if current >= CARD_LEVEL_CAP {
        log::debug!("{} already at level {}", card.as_str(), current);
        return false;
    }
    let next = current + 1;
    world.card_levels.insert(card, next);
    let def = card.def();
    apply_all(world, def.buffs, next);
    apply_all(world, def.debuffs, next);
    log::debug!("picked {} (lv {})", card.as_str(), next);
    true
}

/// Take a buff into a free slot. Held buffs and full slots are rejected.
pub fn apply_buff(world: &mut World, buff: BuffId) -> bool {
    if world.buffs.contains(&buff) || world.buffs.len() >= world.tuning.draft.buff_slots {
        log::debug!("buff {} rejected", buff.as_str());
        return false;
    }
    world.buffs.push(buff);
    let def = buff.def();
    apply_all(world, def.buffs, 1);
    apply_all(world, def.debuffs, 1);
    log::debug!("took buff {}", buff.as_str());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn world() -> World {
        let mut w = World::new(Tuning::card_draft(), 4);
        w.reset_run_state();
        w
    }

    #[test]
    fn test_rapid_fire_stacks() {
        let mut w = world();
        let base = w.player.weapon.fire_rate;
        assert!(pick_card(&mut w, CardId::RapidFire));
        assert!(pick_card(&mut w, CardId::RapidFire));
        assert!((w.player.weapon.fire_rate - base * 1.15 * 1.15).abs() < 1e-4);
        assert!((w.mods.enemy_speed - 1.12 * 1.12).abs() < 1e-5);
        assert_eq!(w.card_level(CardId::RapidFire), 2);
    }

    #[test]
    fn test_fourth_pick_is_noop() {
        let mut w = world();
        for _ in 0..3 {
            assert!(pick_card(&mut w, CardId::Overcharge));
        }
        let damage = w.player.weapon.damage;
        let hp = w.mods.enemy_hp;
        assert!(!pick_card(&mut w, CardId::Overcharge));
        assert_eq!(w.player.weapon.damage, damage);
        assert_eq!(w.mods.enemy_hp, hp);
        assert_eq!(w.card_level(CardId::Overcharge), 3);
    }

    proptest! {
        #[test]
        fn prop_card_level_never_exceeds_cap(picks in proptest::collection::vec(0usize..13, 0..60)) {
            let mut w = world();
            for i in picks {
                pick_card(&mut w, CardId::ALL[i]);
            }
            for card in CardId::ALL {
                prop_assert!(w.card_level(card) <= CARD_LEVEL_CAP);
            }
            prop_assert!(w.mods.enemy_armor >= 0.0 && w.mods.enemy_armor <= MAX_ENEMY_ARMOR);
            prop_assert!(w.player.weapon.spread <= 7);
            prop_assert!(w.player.weapon.pierce <= 3);
            prop_assert!(w.drones.len() <= 3);
        }
    }

    #[test]
    fn test_hull_plating_tiers() {
        let mut w = world();
        w.player.hp = 50.0;
        pick_card(&mut w, CardId::HullPlating);
        assert_eq!(w.regen.tier, 1);
        assert!((w.regen.tier_rate - 2.6).abs() < 1e-6);
        assert_eq!(w.player.max_hp, 100.0);
        pick_card(&mut w, CardId::HullPlating);
        assert_eq!(w.player.max_hp, 106.0);
        assert_eq!(w.player.hp, 53.0);
        pick_card(&mut w, CardId::HullPlating);
        assert_eq!(w.player.max_hp, 118.0);
        assert!((w.regen.out_delay - 1.5).abs() < 1e-6);
        assert!((w.mods.enemy_damage - 1.08f32.powi(3)).abs() < 1e-5);
    }

    #[test]
    fn test_quantum_shield_updates_pulse() {
        let mut w = world();
        pick_card(&mut w, CardId::QuantumShield);
        let pulse = w.shield_pulse.as_ref().unwrap();
        assert_eq!(pulse.interval, 7.0);
        assert!((pulse.duration - 0.8).abs() < 1e-6);
        pick_card(&mut w, CardId::QuantumShield);
        pick_card(&mut w, CardId::QuantumShield);
        let pulse = w.shield_pulse.as_ref().unwrap();
        assert_eq!(pulse.interval, 5.0);
        assert!((pulse.duration - 1.2).abs() < 1e-6);
        assert!((w.mods.enemy_armor - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_corrosive_cloud_floors_armor_and_damage() {
        let mut w = world();
        w.player.weapon.damage = 1.0;
        pick_card(&mut w, CardId::CorrosiveCloud);
        assert_eq!(w.mods.enemy_armor, 0.0);
        assert_eq!(w.player.weapon.damage, 1.0);
    }

    #[test]
    fn test_drone_companions_spread_around_orbit() {
        let mut w = world();
        for _ in 0..3 {
            pick_card(&mut w, CardId::DroneCompanion);
        }
        assert_eq!(w.drones.len(), 3);
        assert_eq!(w.drones[2].radius, 48.0);
        assert!((w.drones[1].angle - TAU / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_buff_slots_reject_duplicates_and_overflow() {
        let mut w = World::new(Tuning::buff_slots(), 4);
        w.reset_run_state();
        assert!(apply_buff(&mut w, BuffId::ReflexDodge));
        assert!(!apply_buff(&mut w, BuffId::ReflexDodge));
        assert_eq!(w.defense.dodge, 0.5);
        assert!(apply_buff(&mut w, BuffId::AegisCells));
        assert!(apply_buff(&mut w, BuffId::RocketPod));
        assert!(apply_buff(&mut w, BuffId::Overdrive));
        assert!(!apply_buff(&mut w, BuffId::HeavySlugs));
        assert_eq!(w.buffs.len(), 4);
        assert_eq!(w.defense.shield_charges, 3);
        assert!(w.rockets_enabled);
    }
}
