//! Star Draft headless demo
//!
//! Flies an autopilot run through the simulation and logs what happens.
//! Usage: `star-draft [card|buff] [seed] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let variant = match args.first().map(String::as_str) {
        Some("buff") | Some("b") => star_draft::Variant::BuffSlots,
        _ => star_draft::Variant::CardDraft,
    };
    let seed = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(12345);
    let seconds: f64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(120.0);

    log::info!("Star Draft (headless) starting: {:?}, seed {}", variant, seed);
    demo::run(variant, seed, seconds);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use star_draft::persistence::{KeyValueStore, MemoryStore};
    use star_draft::platform::FrameClock;
    use star_draft::sim::{GameEvent, GamePhase, TickInput, World};
    use star_draft::{Loadout, PendantId, Settings, Tuning, Variant, WeaponId};

    /// Simulated display refresh
    const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn run(variant: Variant, seed: u64, seconds: f64) {
        let mut store = MemoryStore::new();
        let settings = Settings::load(&store);

        // A returning player with a little saved up
        let mut loadout = Loadout::load(&store);
        loadout.credit(400);
        loadout.buy_weapon(WeaponId::Twin);
        loadout.buy_pendant(PendantId::Fleet);

        let tuning = Tuning::for_variant(variant);
        let mut clock = FrameClock::new(settings.quality, settings.auto_quality && tuning.auto_quality)
            .with_max_dt(tuning.max_dt);
        let mut world = World::new(tuning, seed);
        world.set_quality(clock.quality());
        world.start_run(loadout.resolve());

        let input = TickInput {
            autopilot: true,
            ..TickInput::default()
        };
        let mut now = 0.0;
        while now < seconds * 1000.0 && world.phase != GamePhase::GameOver {
            let step = clock.frame(now);
            if let Some(quality) = step.downgraded {
                world.set_quality(quality);
            }
            world.advance(&input, step.dt);
            now += FRAME_MS;

            // Demo pilot takes the first thing offered
            if world.phase == GamePhase::Drafting && !world.snapshot().picking && !world.choose_offer(0) {
                world.skip_offer();
            }

            for event in world.drain_events() {
                match event {
                    GameEvent::LevelAdvanced { level, enemies } => {
                        log::info!("-> level {} ({} enemies)", level, enemies)
                    }
                    GameEvent::DraftClosed { picked: Some(choice) } => log::info!("picked {}", choice.name()),
                    GameEvent::BossSpawned { kind } => log::info!("boss incoming: {}", kind.as_str()),
                    GameEvent::GameOver(summary) => loadout.credit_run(&summary),
                    _ => {}
                }
            }
        }

        let snap = world.snapshot();
        match &snap.summary {
            Some(summary) => println!(
                "Run over at level {}: score {}, kills {}, +{} coins",
                summary.level, summary.score, summary.kills, summary.coins_earned
            ),
            None => println!(
                "Still alive after {:.0}s at level {}: score {}, hp {:.0}/{:.0}",
                seconds, snap.level, snap.score, snap.ship.hp, snap.ship.max_hp
            ),
        }

        if let Err(err) = loadout.save(&mut store) {
            log::warn!("could not save profile: {}", err);
        }
        log::info!("profile saved ({} keys, {} coins)", store.len(), loadout.coins);
        if let Some(coins) = store.get("coins") {
            println!("Coins on file: {}", coins);
        }
    }
}
