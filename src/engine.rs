//! Caller-facing engine
//!
//! `Engine` owns one run's `GameState` plus the host's input, and is the only
//! surface a UI layer needs: lifecycle (`start`, `resize`, `update`, `draw`),
//! input, read accessors and commands. Level-ups and game over are pushed back
//! through [`EngineHooks`]; everything else is queued as [`GameEvent`]s.

use std::collections::HashSet;

use glam::Vec2;

use crate::error::{Result, SimError};
use crate::settings::{QualityPreset, Settings};
use crate::sim::{
    Color, GameEvent, GamePhase, GameState, InputState, Joystick, RenderFrame, palette, tick,
};
use crate::stats::{PermanentBonuses, PlayerStats};
use crate::tuning::Tuning;
use crate::upgrades::UpgradeId;

/// Particles emitted when a dash starts
const DASH_PARTICLES: u32 = 15;
/// Undrained events beyond this are dropped oldest first
const EVENT_BACKLOG: usize = 1024;

/// Callbacks into the host UI
pub trait EngineHooks {
    fn on_level_up(&mut self, level: u32);
    fn on_game_over(&mut self, coins: u32);
}

/// Hooks that ignore everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl EngineHooks for NoopHooks {
    fn on_level_up(&mut self, _level: u32) {}
    fn on_game_over(&mut self, _coins: u32) {}
}

pub struct Engine<H: EngineHooks> {
    state: GameState,
    input: InputState,
    hooks: H,
    bonuses: PermanentBonuses,
    skin: Color,
    /// Phase to return to on `resume`
    paused_from: Option<GamePhase>,
    /// Events already passed to the hooks
    dispatched: usize,
}

impl<H: EngineHooks> Engine<H> {
    pub fn new(hooks: H, seed: u64) -> Self {
        Self::with_config(hooks, seed, Tuning::default(), Settings::default())
    }

    pub fn with_config(hooks: H, seed: u64, tuning: Tuning, settings: Settings) -> Self {
        Self {
            state: GameState::with_config(seed, tuning, settings),
            input: InputState::default(),
            hooks,
            bonuses: PermanentBonuses::default(),
            skin: palette::PLAYER,
            paused_from: None,
            dispatched: 0,
        }
    }

    /// Begin a fresh run. Demo runs play themselves under the menu.
    pub fn start(&mut self, demo: bool) {
        self.input.clear();
        self.paused_from = None;
        self.dispatched = 0;
        self.state.start(demo);
        self.state.apply_permanent_bonuses(&self.bonuses, self.skin);
    }

    /// Track a new canvas size; zoom steps with the smaller dimension
    pub fn resize(&mut self, width: f32, height: f32, pixel_density: f32) -> Result<()> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(SimError::InvalidViewport { width, height });
        }
        let camera = &mut self.state.camera;
        camera.viewport = Vec2::new(width, height);
        camera.pixel_density = if valid(pixel_density) { pixel_density } else { 1.0 };
        camera.zoom = crate::sim::Camera::zoom_for(camera.viewport);
        log::debug!("Resized to {width}x{height} (zoom {:.2})", camera.zoom);
        Ok(())
    }

    /// Advance one frame of `dt` seconds
    pub fn update(&mut self, dt: f32) {
        tick(&mut self.state, &self.input, dt);
        self.dispatch_hooks();
    }

    fn dispatch_hooks(&mut self) {
        let from = self.dispatched.min(self.state.events.len());
        for event in &self.state.events[from..] {
            match *event {
                GameEvent::LevelUp { level } => self.hooks.on_level_up(level),
                GameEvent::GameOver { coins } => self.hooks.on_game_over(coins),
                _ => {}
            }
        }
        let events = &mut self.state.events;
        if events.len() > EVENT_BACKLOG {
            events.drain(..events.len() - EVENT_BACKLOG);
        }
        self.dispatched = events.len();
    }

    pub fn draw(&self) -> RenderFrame {
        RenderFrame::capture(&self.state, &self.input)
    }

    // Input

    pub fn keys_mut(&mut self) -> &mut HashSet<String> {
        &mut self.input.keys
    }

    pub fn press_key(&mut self, key: &str) {
        self.input.keys.insert(key.to_owned());
    }

    pub fn release_key(&mut self, key: &str) {
        self.input.keys.remove(key);
    }

    pub fn joystick_mut(&mut self) -> &mut Joystick {
        &mut self.input.joystick
    }

    // Reads

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn set_hooks(&mut self, hooks: H) {
        self.hooks = hooks;
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.state.stats
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn dash_cooldown_fraction(&self) -> f32 {
        self.state.player.dash_cooldown_fraction(&self.state.stats)
    }

    /// Take every event queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.dispatched = 0;
        std::mem::take(&mut self.state.events)
    }

    // Commands

    /// Dash if unlocked and off cooldown. Returns whether a dash started.
    pub fn trigger_dash(&mut self) -> bool {
        let state = &mut self.state;
        if state.phase != GamePhase::Playing || !state.player.try_dash(&state.stats) {
            return false;
        }
        let (pos, color) = (state.player.pos(), state.player.body.color);
        state.effects.emit(pos, color, DASH_PARTICLES);
        true
    }

    /// Remember meta bonuses and apply them to the current run
    pub fn apply_permanent_bonuses(&mut self, bonuses: &PermanentBonuses, skin: Color) {
        self.bonuses = *bonuses;
        self.skin = skin;
        self.state.apply_permanent_bonuses(bonuses, skin);
    }

    /// Freeze the run. Held input is dropped so nothing sticks on resume.
    pub fn pause(&mut self) {
        let phase = self.state.phase;
        if !matches!(phase, GamePhase::Playing | GamePhase::LevelUp) {
            return;
        }
        self.paused_from = Some(phase);
        self.state.phase = GamePhase::Paused;
        self.input.clear();
        log::info!("Paused at round {}", self.state.round);
    }

    pub fn resume(&mut self) {
        if self.state.phase != GamePhase::Paused {
            return;
        }
        self.state.phase = self.paused_from.take().unwrap_or(GamePhase::Playing);
        log::info!("Resumed");
    }

    /// Replace the stats wholesale; hp is kept within max
    pub fn set_stats(&mut self, mut stats: PlayerStats) {
        stats.hp = stats.hp.min(stats.max_hp);
        self.state.stats = stats;
    }

    /// The pending level-up choices, drawn on first request
    pub fn offer_upgrades(&mut self) -> Result<Vec<UpgradeId>> {
        if self.state.phase != GamePhase::LevelUp {
            return Err(SimError::NotLevelingUp);
        }
        if self.state.offer.is_empty() {
            self.state.offer = crate::upgrades::draw_offer(&self.state.stats, &mut self.state.rng);
        }
        if self.state.offer.is_empty() {
            log::debug!("Nothing left to offer; resuming");
            self.state.phase = GamePhase::Playing;
        }
        Ok(self.state.offer.clone())
    }

    /// Apply one of the offered upgrades and resume play
    pub fn accept_upgrade(&mut self, id: UpgradeId) -> Result<()> {
        if self.state.phase != GamePhase::LevelUp {
            return Err(SimError::NotLevelingUp);
        }
        if !self.state.offer.contains(&id) {
            return Err(SimError::UpgradeNotOffered(id));
        }
        if !id.is_eligible(&self.state.stats) {
            return Err(SimError::UpgradeUnavailable(id));
        }
        self.state.stats = id.apply(&self.state.stats);
        self.state.offer.clear();
        self.state.phase = GamePhase::Playing;
        log::debug!("Took {} at level {}", id.name(), self.state.stats.level);
        Ok(())
    }

    pub fn set_graphics_quality(&mut self, preset: QualityPreset) {
        let mut settings = self.state.effects.settings.clone();
        settings.apply_preset(preset);
        self.state.effects.set_settings(settings);
        log::info!("Graphics quality set to {}", preset.as_str());
    }

    /// Developer command: bring the boss in now
    pub fn spawn_boss(&mut self) {
        self.state.spawn_boss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::REFERENCE_FRAME_SECS;
    use crate::sim::input::DASH_KEY;

    #[derive(Default)]
    struct Recorder {
        levels: Vec<u32>,
        game_overs: Vec<u32>,
    }

    impl EngineHooks for Recorder {
        fn on_level_up(&mut self, level: u32) {
            self.levels.push(level);
        }
        fn on_game_over(&mut self, coins: u32) {
            self.game_overs.push(coins);
        }
    }

    fn running() -> Engine<Recorder> {
        let mut engine = Engine::new(Recorder::default(), 42);
        engine.start(false);
        engine
    }

    #[test]
    fn test_resize_sets_zoom() {
        let mut engine = running();
        engine.resize(360.0, 800.0, 2.0).unwrap();
        assert_eq!(engine.state().camera.zoom, 0.65);
        engine.resize(1920.0, 1080.0, 1.0).unwrap();
        assert_eq!(engine.state().camera.zoom, 0.85);
        assert!(matches!(
            engine.resize(0.0, 600.0, 1.0),
            Err(SimError::InvalidViewport { .. })
        ));
        assert!(engine.resize(f32::NAN, 600.0, 1.0).is_err());
    }

    #[test]
    fn test_dash_applies_once() {
        let mut engine = running();
        assert!(!engine.trigger_dash());

        let mut stats = engine.stats().clone();
        stats.has_dash = true;
        engine.set_stats(stats);
        assert!(engine.trigger_dash());
        assert!(!engine.trigger_dash());
        assert!((engine.state().player.dash_cooldown - 3.0).abs() < 1e-6);
        assert_eq!(engine.dash_cooldown_fraction(), 1.0);
    }

    #[test]
    fn test_dash_cooldown_floor() {
        let mut engine = running();
        let mut stats = engine.stats().clone();
        stats.has_dash = true;
        stats.dash_cd_level = 10;
        engine.set_stats(stats);
        assert!(engine.trigger_dash());
        assert!((engine.state().player.dash_cooldown - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_pause_clears_input_and_stops_clock() {
        let mut engine = running();
        engine.press_key("w");
        engine.joystick_mut().active = true;
        engine.update(REFERENCE_FRAME_SECS);
        engine.pause();
        assert_eq!(engine.phase(), GamePhase::Paused);
        assert!(engine.keys_mut().is_empty());
        assert!(!engine.joystick_mut().active);

        let clock = engine.state().clock_ms;
        engine.update(REFERENCE_FRAME_SECS);
        assert_eq!(engine.state().clock_ms, clock);

        engine.resume();
        assert_eq!(engine.phase(), GamePhase::Playing);
        engine.update(REFERENCE_FRAME_SECS);
        assert!(engine.state().clock_ms > clock);
    }

    #[test]
    fn test_level_up_hook_and_upgrade_flow() {
        let mut engine = running();
        assert!(matches!(engine.accept_upgrade(UpgradeId::Dmg), Err(SimError::NotLevelingUp)));

        engine.state.add_xp(45.0);
        engine.update(REFERENCE_FRAME_SECS);
        assert_eq!(engine.hooks().levels, vec![2]);
        assert_eq!(engine.phase(), GamePhase::LevelUp);

        let offer = engine.offer_upgrades().unwrap();
        assert!(!offer.is_empty() && offer.len() <= 3);
        let missing = UpgradeId::all().find(|id| !offer.contains(id)).unwrap();
        assert!(matches!(
            engine.accept_upgrade(missing),
            Err(SimError::UpgradeNotOffered(_))
        ));

        let before = engine.stats().clone();
        engine.accept_upgrade(offer[0]).unwrap();
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.stats(), &offer[0].apply(&before));
        assert!(engine.state().offer.is_empty());

        // Hooks fire once per event even across later frames
        engine.update(REFERENCE_FRAME_SECS);
        assert_eq!(engine.hooks().levels, vec![2]);
    }

    #[test]
    fn test_game_over_hook() {
        let mut engine = running();
        let mut stats = engine.stats().clone();
        stats.hp = 0.0;
        stats.coins = 17;
        engine.set_stats(stats);
        engine.update(REFERENCE_FRAME_SECS);
        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert_eq!(engine.hooks().game_overs, vec![17]);

        let events = engine.drain_events();
        assert!(events.contains(&GameEvent::GameOver { coins: 17 }));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_permanent_bonuses_survive_restart() {
        let mut engine = running();
        let base_speed = engine.stats().speed;
        let bonuses = PermanentBonuses {
            speed: 2,
            ..Default::default()
        };
        engine.apply_permanent_bonuses(&bonuses, palette::DRONE);
        assert!((engine.stats().speed - base_speed * 1.1).abs() < 1e-5);
        assert_eq!(engine.stats().max_hp, 100.0);

        engine.start(false);
        assert!((engine.stats().speed - base_speed * 1.1).abs() < 1e-5);
        assert_eq!(engine.state().player.body.color, palette::DRONE);
    }

    #[test]
    fn test_dash_key_and_quality_and_boss() {
        let mut engine = running();
        engine.press_key(DASH_KEY);
        engine.release_key(DASH_KEY);
        assert!(engine.keys_mut().is_empty());

        engine.set_graphics_quality(QualityPreset::Low);
        assert_eq!(engine.state().effects.settings.quality, QualityPreset::Low);

        engine.spawn_boss();
        assert!(engine.state().boss.is_some());
        let frame = engine.draw();
        assert!(frame.boss.is_some());
    }

    #[test]
    fn test_menu_is_idle_without_demo() {
        let mut engine = Engine::new(NoopHooks, 1);
        engine.update(REFERENCE_FRAME_SECS);
        assert_eq!(engine.state().clock_ms, 0.0);
        engine.start(true);
        engine.update(REFERENCE_FRAME_SECS);
        assert!(engine.state().clock_ms > 0.0);
        assert_eq!(engine.round(), 1);
    }
}
