//! Shop catalogs and the persistent loadout
//!
//! Coins, owned pendants and owned weapons outlive runs. At run start the
//! loadout resolves into a `RunLoadout`: the selected weapon's profile plus
//! the passive effects of every equipped pendant.

use std::collections::BTreeSet;
use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::consts::EQUIP_LIMIT;
use crate::persistence::{self, KeyValueStore, StoreError};
use crate::sim::RunSummary;
use crate::sim::cards::{DroneSpec, Effect};

/// Shop pendants (passive run modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PendantId {
    Fleet,
    Vitalis,
    Precision,
    Zephyr,
    Aegis,
    Pierce,
    Photon,
    Focus,
    Regen,
    Drone,
    Voidflare,
    Gravwell,
}

const PENDANT_DRONE: DroneSpec = DroneSpec {
    cap: 4,
    radius_base: 28.0,
    radius_step: 6.0,
    fire_rate: 3.2,
    bullet_speed: 520.0,
    bullet_damage: 5.0,
};

impl PendantId {
    pub const ALL: [PendantId; 12] = [
        PendantId::Fleet,
        PendantId::Vitalis,
        PendantId::Precision,
        PendantId::Zephyr,
        PendantId::Aegis,
        PendantId::Pierce,
        PendantId::Photon,
        PendantId::Focus,
        PendantId::Regen,
        PendantId::Drone,
        PendantId::Voidflare,
        PendantId::Gravwell,
    ];

    /// Storage identifier
    pub fn as_str(self) -> &'static str {
        match self {
            PendantId::Fleet => "pendant_fleet",
            PendantId::Vitalis => "pendant_vitalis",
            PendantId::Precision => "pendant_precision",
            PendantId::Zephyr => "pendant_zephyr",
            PendantId::Aegis => "pendant_aegis",
            PendantId::Pierce => "pendant_pierce",
            PendantId::Photon => "pendant_photon",
            PendantId::Focus => "pendant_focus",
            PendantId::Regen => "pendant_regen",
            PendantId::Drone => "pendant_drone",
            PendantId::Voidflare => "pendant_voidflare",
            PendantId::Gravwell => "pendant_gravwell",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    pub fn name(self) -> &'static str {
        match self {
            PendantId::Fleet => "Fleet Pendant",
            PendantId::Vitalis => "Vitalis Pendant",
            PendantId::Precision => "Precision Pendant",
            PendantId::Zephyr => "Zephyr Pendant",
            PendantId::Aegis => "Aegis Pendant",
            PendantId::Pierce => "Pierce Pendant",
            PendantId::Photon => "Photon Pendant",
            PendantId::Focus => "Focus Pendant",
            PendantId::Regen => "Regen Pendant",
            PendantId::Drone => "Drone Pendant",
            PendantId::Voidflare => "Voidflare Pendant",
            PendantId::Gravwell => "Gravwell Pendant",
        }
    }

    pub fn cost(self) -> u64 {
        match self {
            PendantId::Fleet => 80,
            PendantId::Vitalis => 100,
            PendantId::Precision | PendantId::Zephyr => 120,
            PendantId::Aegis | PendantId::Pierce => 140,
            PendantId::Photon => 130,
            PendantId::Focus => 110,
            PendantId::Regen => 150,
            PendantId::Drone => 160,
            PendantId::Voidflare => 200,
            PendantId::Gravwell => 220,
        }
    }

    pub fn effects(self) -> &'static [Effect] {
        match self {
            PendantId::Fleet => &[Effect::MoveSpeedMul(1.1)],
            PendantId::Vitalis => &[Effect::MaxHp { add: 12.0, heal: 6.0 }],
            PendantId::Precision => &[Effect::DamageMul(1.12)],
            PendantId::Zephyr => &[Effect::FireRateMul(1.1)],
            PendantId::Aegis => &[Effect::OnHitInvuln(0.15)],
            PendantId::Pierce => &[Effect::AddPierce { amount: 1, max: 3 }],
            PendantId::Photon => &[Effect::BulletSpeedMul(1.08)],
            PendantId::Focus => &[Effect::SpreadAngleMul(0.9)],
            PendantId::Regen => &[Effect::RegenRate(1.2)],
            PendantId::Drone => &[Effect::AddDrone(PENDANT_DRONE)],
            PendantId::Voidflare => &[
                Effect::DamageMul(1.15),
                Effect::FireRateMul(1.08),
                Effect::EnemyBulletSpeedMul(0.9),
            ],
            PendantId::Gravwell => &[Effect::MaxHp { add: 10.0, heal: 5.0 }, Effect::EnemySpeedMul(0.92)],
        }
    }
}

/// Shop weapons
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum WeaponId {
    #[default]
    Basic,
    Railgun,
    Scatter,
    Smg,
    Twin,
    Burst,
    Seeker,
}

/// Guidance parameters of a homing weapon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeekerProfile {
    /// rad/s
    pub turn_rate: f32,
    pub accel: f32,
    pub max_speed: f32,
}

/// Firing characteristics of the active weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub id: WeaponId,
    /// Volleys per second
    pub fire_rate: f32,
    pub damage: f32,
    pub bullet_speed: f32,
    /// Bullets per fan
    pub spread: u32,
    /// Radians between fan bullets
    pub spread_angle: f32,
    pub pierce: u32,
    /// Bullets per barrel and fan angle; 0 or 1 means single shots
    pub burst_count: u32,
    /// Radians between burst bullets
    pub burst_spread: f32,
    /// Max random deviation per bullet (radians)
    pub jitter: f32,
    /// Half the distance between twin barrels; 0 for a single barrel
    pub twin_offset: f32,
    pub seeker: Option<SeekerProfile>,
}

impl Default for WeaponProfile {
    fn default() -> Self {
        WeaponId::Basic.profile()
    }
}

impl WeaponId {
    pub const ALL: [WeaponId; 7] = [
        WeaponId::Basic,
        WeaponId::Railgun,
        WeaponId::Scatter,
        WeaponId::Smg,
        WeaponId::Twin,
        WeaponId::Burst,
        WeaponId::Seeker,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WeaponId::Basic => "weapon_basic",
            WeaponId::Railgun => "weapon_railgun",
            WeaponId::Scatter => "weapon_scatter",
            WeaponId::Smg => "weapon_smg",
            WeaponId::Twin => "weapon_twin",
            WeaponId::Burst => "weapon_burst",
            WeaponId::Seeker => "weapon_seeker",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.as_str() == s)
    }

    pub fn name(self) -> &'static str {
        match self {
            WeaponId::Basic => "Standard Blaster",
            WeaponId::Railgun => "Railgun",
            WeaponId::Scatter => "Scattershot",
            WeaponId::Smg => "Pulse SMG",
            WeaponId::Twin => "Twinshot",
            WeaponId::Burst => "Charged Burst",
            WeaponId::Seeker => "Seeker Micro-Missiles",
        }
    }

    /// Shop price; the starting weapon is free and can't be bought
    pub fn cost(self) -> u64 {
        match self {
            WeaponId::Basic => 0,
            WeaponId::Railgun => 200,
            WeaponId::Scatter => 180,
            WeaponId::Smg => 190,
            WeaponId::Twin => 170,
            WeaponId::Burst => 210,
            WeaponId::Seeker => 230,
        }
    }

    pub fn profile(self) -> WeaponProfile {
        let base = WeaponProfile {
            id: self,
            fire_rate: 6.0,
            damage: 10.0,
            bullet_speed: 660.0,
            spread: 1,
            spread_angle: 16f32.to_radians(),
            pierce: 0,
            burst_count: 0,
            burst_spread: 0.0,
            jitter: 0.0,
            twin_offset: 0.0,
            seeker: None,
        };
        match self {
            WeaponId::Basic => base,
            WeaponId::Railgun => WeaponProfile {
                fire_rate: 3.0,
                damage: 25.0,
                bullet_speed: 900.0,
                pierce: 2,
                ..base
            },
            WeaponId::Scatter => WeaponProfile {
                fire_rate: 7.2,
                damage: 6.0,
                bullet_speed: 561.0,
                spread: 5,
                ..base
            },
            WeaponId::Smg => WeaponProfile {
                fire_rate: 9.6,
                damage: 7.0,
                bullet_speed: 640.0,
                jitter: 6f32.to_radians(),
                ..base
            },
            WeaponId::Twin => WeaponProfile {
                fire_rate: 5.4,
                damage: 9.0,
                twin_offset: 9.0,
                ..base
            },
            WeaponId::Burst => WeaponProfile {
                fire_rate: 4.5,
                damage: 7.0,
                bullet_speed: 495.0,
                burst_count: 3,
                burst_spread: 10f32.to_radians(),
                ..base
            },
            WeaponId::Seeker => WeaponProfile {
                fire_rate: 5.1,
                damage: 8.0,
                bullet_speed: 520.0,
                seeker: Some(SeekerProfile {
                    turn_rate: PI * 12.0,
                    accel: 420.0,
                    max_speed: 820.0,
                }),
                ..base
            },
        }
    }
}

/// Passive effects from equipped pendants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassiveModifiers {
    pub effects: Vec<Effect>,
}

/// What a run starts with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunLoadout {
    pub passives: PassiveModifiers,
    pub weapon: WeaponProfile,
}

/// Persistent economy state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub coins: u64,
    pub owned_pendants: BTreeSet<PendantId>,
    /// Equipped pendants in equip order (at most `EQUIP_LIMIT`)
    pub equipped_pendants: Vec<PendantId>,
    pub owned_weapons: BTreeSet<WeaponId>,
    pub selected_weapon: WeaponId,
}

impl Default for Loadout {
    fn default() -> Self {
        Self::new()
    }
}

impl Loadout {
    const KEY_COINS: &'static str = "coins";
    const KEY_PENDANTS_OWNED: &'static str = "pendantsOwned";
    const KEY_PENDANTS_EQUIPPED: &'static str = "pendantsEquipped";
    const KEY_WEAPONS_OWNED: &'static str = "weaponsOwned";
    const KEY_EQUIPPED_WEAPON: &'static str = "equippedWeapon";

    /// Fresh profile: no coins, only the starting weapon
    pub fn new() -> Self {
        Self {
            coins: 0,
            owned_pendants: BTreeSet::new(),
            equipped_pendants: Vec::new(),
            owned_weapons: BTreeSet::from([WeaponId::Basic]),
            selected_weapon: WeaponId::Basic,
        }
    }

    pub fn credit(&mut self, coins: u64) {
        self.coins = self.coins.saturating_add(coins);
    }

    /// Credit the coins a finished run earned
    pub fn credit_run(&mut self, summary: &RunSummary) {
        self.credit(summary.coins_earned);
        log::info!("+{} coins (balance {})", summary.coins_earned, self.coins);
    }

    /// Buy a pendant; it is equipped straight away when a slot is free
    pub fn buy_pendant(&mut self, id: PendantId) -> bool {
        if self.owned_pendants.contains(&id) || self.coins < id.cost() {
            log::debug!("can't buy {}", id.as_str());
            return false;
        }
        self.coins -= id.cost();
        self.owned_pendants.insert(id);
        self.equip_pendant(id);
        true
    }

    /// Equip an owned pendant; refused when slots are full
    pub fn equip_pendant(&mut self, id: PendantId) -> bool {
        if !self.owned_pendants.contains(&id)
            || self.equipped_pendants.contains(&id)
            || self.equipped_pendants.len() >= EQUIP_LIMIT
        {
            return false;
        }
        self.equipped_pendants.push(id);
        true
    }

    pub fn unequip_pendant(&mut self, id: PendantId) -> bool {
        let before = self.equipped_pendants.len();
        self.equipped_pendants.retain(|&p| p != id);
        self.equipped_pendants.len() != before
    }

    /// Buy and select a weapon
    pub fn buy_weapon(&mut self, id: WeaponId) -> bool {
        let cost = id.cost();
        if cost == 0 || self.owned_weapons.contains(&id) || self.coins < cost {
            log::debug!("can't buy {}", id.as_str());
            return false;
        }
        self.coins -= cost;
        self.owned_weapons.insert(id);
        self.selected_weapon = id;
        true
    }

    pub fn select_weapon(&mut self, id: WeaponId) -> bool {
        if !self.owned_weapons.contains(&id) {
            return false;
        }
        self.selected_weapon = id;
        true
    }

    /// Weapon profile and pendant passives for the next run. Pendants apply
    /// in catalog order regardless of equip order.
    pub fn resolve(&self) -> RunLoadout {
        let effects = PendantId::ALL
            .iter()
            .filter(|p| self.equipped_pendants.contains(p))
            .flat_map(|p| p.effects().iter().copied())
            .collect();
        RunLoadout {
            passives: PassiveModifiers { effects },
            weapon: self.selected_weapon.profile(),
        }
    }

    /// Read the profile from storage; anything missing or unknown falls back
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut loadout = Self::new();
        loadout.coins = persistence::load_json_or_default(store, Self::KEY_COINS);

        let owned: Vec<String> = persistence::load_json_or_default(store, Self::KEY_PENDANTS_OWNED);
        loadout.owned_pendants = owned.iter().filter_map(|s| PendantId::from_str(s)).collect();
        let equipped: Vec<String> = persistence::load_json_or_default(store, Self::KEY_PENDANTS_EQUIPPED);
        for id in equipped.iter().filter_map(|s| PendantId::from_str(s)) {
            loadout.equip_pendant(id);
        }

        let weapons: Vec<String> = persistence::load_json_or_default(store, Self::KEY_WEAPONS_OWNED);
        loadout
            .owned_weapons
            .extend(weapons.iter().filter_map(|s| WeaponId::from_str(s)));
        if let Some(selected) = store.get(Self::KEY_EQUIPPED_WEAPON).and_then(|s| WeaponId::from_str(&s)) {
            loadout.select_weapon(selected);
        }

        log::info!(
            "loaded profile: {} coins, {} pendants, {} weapons",
            loadout.coins,
            loadout.owned_pendants.len(),
            loadout.owned_weapons.len()
        );
        loadout
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        let names = |ids: Vec<&'static str>| ids.into_iter().map(String::from).collect::<Vec<_>>();
        persistence::save_json(store, Self::KEY_COINS, &self.coins)?;
        persistence::save_json(
            store,
            Self::KEY_PENDANTS_OWNED,
            &names(self.owned_pendants.iter().map(|p| p.as_str()).collect()),
        )?;
        persistence::save_json(
            store,
            Self::KEY_PENDANTS_EQUIPPED,
            &names(self.equipped_pendants.iter().map(|p| p.as_str()).collect()),
        )?;
        persistence::save_json(
            store,
            Self::KEY_WEAPONS_OWNED,
            &names(self.owned_weapons.iter().map(|w| w.as_str()).collect()),
        )?;
        store.set(Self::KEY_EQUIPPED_WEAPON, self.selected_weapon.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_buy_pendant_auto_equips_until_full() {
        let mut l = Loadout::new();
        l.credit(1000);
        assert!(l.buy_pendant(PendantId::Fleet));
        assert!(l.buy_pendant(PendantId::Aegis));
        assert!(l.buy_pendant(PendantId::Regen));
        assert_eq!(l.coins, 1000 - 80 - 140 - 150);
        assert_eq!(l.equipped_pendants, vec![PendantId::Fleet, PendantId::Aegis]);
        assert!(l.owned_pendants.contains(&PendantId::Regen));
        // Overflow is a silent no-op
        assert!(!l.equip_pendant(PendantId::Regen));
        assert!(l.unequip_pendant(PendantId::Fleet));
        assert!(l.equip_pendant(PendantId::Regen));
    }

    #[test]
    fn test_cannot_afford_or_rebuy() {
        let mut l = Loadout::new();
        l.credit(100);
        assert!(!l.buy_pendant(PendantId::Gravwell));
        assert!(l.buy_pendant(PendantId::Vitalis));
        assert!(!l.buy_pendant(PendantId::Vitalis));
        assert_eq!(l.coins, 0);
    }

    #[test]
    fn test_weapons() {
        let mut l = Loadout::new();
        l.credit(500);
        assert!(!l.buy_weapon(WeaponId::Basic));
        assert!(!l.select_weapon(WeaponId::Railgun));
        assert!(l.buy_weapon(WeaponId::Railgun));
        assert_eq!(l.selected_weapon, WeaponId::Railgun);
        assert!(l.select_weapon(WeaponId::Basic));
        assert_eq!(l.coins, 300);
    }

    #[test]
    fn test_resolve_in_catalog_order() {
        let mut l = Loadout::new();
        l.credit(1000);
        l.buy_pendant(PendantId::Gravwell);
        l.buy_pendant(PendantId::Fleet);
        l.buy_weapon(WeaponId::Seeker);
        let run = l.resolve();
        assert_eq!(run.passives.effects[0], Effect::MoveSpeedMul(1.1));
        assert_eq!(run.passives.effects.len(), 3);
        assert_eq!(run.weapon.id, WeaponId::Seeker);
        assert!(run.weapon.seeker.is_some());
    }

    #[test]
    fn test_profiles() {
        let basic = WeaponProfile::default();
        assert_eq!(basic.fire_rate, 6.0);
        assert!((basic.spread_angle - 16f32.to_radians()).abs() < 1e-6);
        let rail = WeaponId::Railgun.profile();
        assert_eq!(rail.pierce, 2);
        assert_eq!(rail.spread_angle, basic.spread_angle);
        assert_eq!(WeaponId::Burst.profile().burst_count, 3);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut l = Loadout::new();
        l.credit(700);
        l.buy_pendant(PendantId::Drone);
        l.buy_weapon(WeaponId::Twin);
        let mut store = MemoryStore::new();
        l.save(&mut store).unwrap();
        assert_eq!(store.get("equippedWeapon").as_deref(), Some("weapon_twin"));
        assert_eq!(Loadout::load(&store), l);
    }

    #[test]
    fn test_load_tolerates_garbage() {
        let mut store = MemoryStore::new();
        store.set("coins", "lots").unwrap();
        store.set("pendantsOwned", r#"["pendant_fleet","pendant_bogus"]"#).unwrap();
        store.set("pendantsEquipped", r#"["pendant_fleet","pendant_vitalis"]"#).unwrap();
        store.set("equippedWeapon", "weapon_railgun").unwrap();
        let l = Loadout::load(&store);
        assert_eq!(l.coins, 0);
        assert_eq!(l.owned_pendants.len(), 1);
        // Not owned, so not equipped
        assert_eq!(l.equipped_pendants, vec![PendantId::Fleet]);
        assert_eq!(l.selected_weapon, WeaponId::Basic);
        assert!(l.owned_weapons.contains(&WeaponId::Basic));
    }
}
