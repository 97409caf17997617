//! Headless runner
//!
//! Plays a demo run and then a scripted run at a fixed frame rate and logs
//! what happened. Usage: `neon-survivor [seed] [seconds]`.
//! Set `RUST_LOG=debug` (or `trace`) for more detail.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60.0);

    log::info!("Neon Survivor (headless) seed {seed}, {seconds}s per run");
    headless::demo_run(seed, seconds);
    headless::scripted_run(seed, seconds);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point lives in `neon_survivor::web`
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use neon_survivor::sim::{GameEvent, GamePhase};
    use neon_survivor::{Engine, EngineHooks, NoopHooks, UpgradeId};

    const FRAME_SECS: f32 = 1.0 / 60.0;

    /// Counts what the engine reports through its hooks
    #[derive(Default)]
    struct HookLog {
        level_ups: u32,
        final_coins: Option<u32>,
    }

    impl EngineHooks for HookLog {
        fn on_level_up(&mut self, level: u32) {
            log::debug!("Hook: level {level}");
            self.level_ups += 1;
        }

        fn on_game_over(&mut self, coins: u32) {
            self.final_coins = Some(coins);
        }
    }

    #[derive(Default)]
    struct Tally {
        shots: u32,
        kills: u32,
        hits: u32,
        damage_taken: f32,
        pickups: u32,
        bosses: u32,
    }

    impl Tally {
        fn record(&mut self, events: &[GameEvent]) {
            for event in events {
                match *event {
                    GameEvent::Shot => self.shots += 1,
                    GameEvent::EnemyKilled { .. } => self.kills += 1,
                    GameEvent::PlayerHit { damage } => {
                        self.hits += 1;
                        self.damage_taken += damage;
                    }
                    GameEvent::Pickup => self.pickups += 1,
                    GameEvent::BossDefeated => self.bosses += 1,
                    _ => {}
                }
            }
        }
    }

    fn frames(seconds: f32) -> u32 {
        (seconds.max(0.0) / FRAME_SECS).round() as u32
    }

    pub fn demo_run(seed: u64, seconds: f32) {
        let mut engine = Engine::new(NoopHooks, seed);
        engine.start(true);

        let mut tally = Tally::default();
        let mut peak_enemies = 0;
        for _ in 0..frames(seconds) {
            engine.update(FRAME_SECS);
            peak_enemies = peak_enemies.max(engine.state().enemies.len());
            tally.record(&engine.drain_events());
        }

        log::info!(
            "Demo: round {}, peak enemies {peak_enemies}, kills {}, shots {}, sprites {}",
            engine.round(),
            tally.kills,
            tally.shots,
            engine.draw().sprite_count()
        );
    }

    /// Walks in a slow square, dashes on cooldown and takes every first offer
    pub fn scripted_run(seed: u64, seconds: f32) {
        const PATH: [&str; 4] = ["d", "s", "a", "w"];

        let mut engine = Engine::new(HookLog::default(), seed);
        if let Err(e) = engine.resize(1280.0, 720.0, 1.0) {
            log::error!("{e}");
            return;
        }
        engine.start(false);

        let mut tally = Tally::default();
        let mut taken: Vec<UpgradeId> = Vec::new();
        for frame in 0..frames(seconds) {
            let leg = PATH[(frame / 120) as usize % PATH.len()];
            engine.keys_mut().clear();
            engine.press_key(leg);
            if engine.dash_cooldown_fraction() == 0.0 {
                engine.trigger_dash();
            }

            engine.update(FRAME_SECS);
            tally.record(&engine.drain_events());

            if engine.phase() == GamePhase::LevelUp {
                match engine.offer_upgrades() {
                    Ok(offer) => {
                        if let Some(&pick) = offer.first() {
                            match engine.accept_upgrade(pick) {
                                Ok(()) => taken.push(pick),
                                Err(e) => log::warn!("Upgrade rejected: {e}"),
                            }
                        }
                    }
                    Err(e) => log::warn!("{e}"),
                }
            }
            if engine.phase() == GamePhase::GameOver {
                break;
            }
        }

        let stats = engine.stats();
        log::info!(
            "Run: phase {:?}, round {}, level {}, hp {:.1}/{:.0}, coins {}",
            engine.phase(),
            engine.round(),
            stats.level,
            stats.hp,
            stats.max_hp,
            engine.hooks().final_coins.unwrap_or(stats.coins)
        );
        log::info!(
            "Run: kills {}, shots {}, hits taken {} ({:.1} dmg), pickups {}, bosses {}",
            tally.kills,
            tally.shots,
            tally.hits,
            tally.damage_taken,
            tally.pickups,
            tally.bosses
        );
        if !taken.is_empty() {
            let names: Vec<&str> = taken.iter().map(|id| id.name()).collect();
            log::info!("Upgrades ({} level-ups): {}", engine.hooks().level_ups, names.join(", "));
        }
    }
}
