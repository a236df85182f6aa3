//! Draft offers between levels
//!
//! An offer puts the world in `GamePhase::Drafting`. Card drafts close as
//! soon as a card is taken. Buff drafts then run a short pick animation
//! during which the world stays frozen and further picks are refused.

use serde::{Deserialize, Serialize};

use super::cards::{self, BuffId, CardId};
use super::state::{GameEvent, GamePhase, World};
use crate::tuning::Variant;

/// One entry of an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftChoice {
    Card(CardId),
    Buff(BuffId),
}

impl DraftChoice {
    pub fn name(self) -> &'static str {
        match self {
            DraftChoice::Card(card) => card.def().name,
            DraftChoice::Buff(buff) => buff.def().name,
        }
    }
}

/// The open offer and pick-animation latch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftState {
    pub offer: Vec<DraftChoice>,
    /// Seconds left in the pick animation; picks are refused while > 0
    pub pick_timer: f32,
}

impl DraftState {
    pub fn animating(&self) -> bool {
        self.pick_timer > 0.0
    }
}

/// Whether reaching `level` should open a draft
pub fn should_offer(world: &World, level: u32) -> bool {
    let every = world.tuning.draft.every;
    if every == 0 || level % every != 0 {
        return false;
    }
    match world.tuning.variant {
        Variant::CardDraft => true,
        Variant::BuffSlots => world.buffs.len() < world.tuning.draft.buff_slots,
    }
}

fn candidates(world: &World) -> Vec<DraftChoice> {
    match world.tuning.variant {
        // Maxed cards stay in the pool; picking one is refused
        Variant::CardDraft => CardId::ALL.iter().map(|&c| DraftChoice::Card(c)).collect(),
        Variant::BuffSlots => BuffId::ALL
            .iter()
            .filter(|b| !world.buffs.contains(b))
            .map(|&b| DraftChoice::Buff(b))
            .collect(),
    }
}

/// Present a fresh offer of distinct choices. Returns false (and stays in
/// play) when there is nothing to offer.
pub fn open_draft(world: &mut World) -> bool {
    let mut pool = candidates(world);
    let size = world.tuning.draft.offer_size;
    let mut offer = Vec::with_capacity(size);
    while offer.len() < size && !pool.is_empty() {
        let i = world.rng.index(pool.len());
        offer.push(pool.swap_remove(i));
    }
    if offer.is_empty() {
        return false;
    }

    log::debug!(
        "draft at level {}: {:?}",
        world.level,
        offer.iter().map(|c| c.name()).collect::<Vec<_>>()
    );
    world.draft.offer = offer.clone();
    world.draft.pick_timer = 0.0;
    world.phase = GamePhase::Drafting;
    world.emit(GameEvent::DraftOffered { choices: offer });
    true
}

/// Take the choice at `index`. Refused (returning false, offer unchanged)
/// outside a draft, during the pick animation, for a bad index, or when the
/// card is already maxed.
pub fn choose(world: &mut World, index: usize) -> bool {
    if world.phase != GamePhase::Drafting || world.draft.animating() {
        log::debug!("pick ignored: no open offer");
        return false;
    }
    let Some(&choice) = world.draft.offer.get(index) else {
        log::debug!("pick ignored: index {} out of range", index);
        return false;
    };
    let taken = match choice {
        DraftChoice::Card(card) => cards::pick_card(world, card),
        DraftChoice::Buff(buff) => cards::apply_buff(world, buff),
    };
    if !taken {
        return false;
    }

    world.draft.offer.clear();
    world.emit(GameEvent::DraftClosed { picked: Some(choice) });
    let animation = world.tuning.draft.pick_animation_secs;
    if animation > 0.0 {
        world.draft.pick_timer = animation;
    } else {
        world.phase = GamePhase::Running;
    }
    true
}

/// Close the offer without taking anything
pub fn skip(world: &mut World) -> bool {
    if world.phase != GamePhase::Drafting || world.draft.animating() || world.draft.offer.is_empty() {
        return false;
    }
    world.draft.offer.clear();
    world.phase = GamePhase::Running;
    world.emit(GameEvent::DraftClosed { picked: None });
    true
}

/// Count down the pick animation and resume play when it ends
pub fn tick_pick_animation(world: &mut World, dt: f32) {
    if !world.draft.animating() {
        return;
    }
    world.draft.pick_timer -= dt;
    if world.draft.pick_timer <= 0.0 {
        world.draft.pick_timer = 0.0;
        if world.phase == GamePhase::Drafting {
            world.phase = GamePhase::Running;
        }
    }
}
