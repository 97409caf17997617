//! Browser binding
//!
//! A thin `wasm-bindgen` wrapper around [`Engine`]. Frames, stats and events
//! cross the boundary as JSON strings; hooks are plain JS callbacks.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::engine::{Engine, EngineHooks};
use crate::settings::{QualityPreset, Settings};
use crate::sim::Color;
use crate::stats::{PermanentBonuses, PlayerStats};
use crate::tuning::Tuning;
use crate::upgrades::UpgradeId;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Neon Survivor core loaded");
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Optional JS callbacks behind [`EngineHooks`]
#[derive(Default)]
struct JsHooks {
    level_up: Option<js_sys::Function>,
    game_over: Option<js_sys::Function>,
}

impl JsHooks {
    fn call(f: &Option<js_sys::Function>, arg: u32) {
        if let Some(f) = f {
            if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from(arg)) {
                log::warn!("Hook threw: {e:?}");
            }
        }
    }
}

impl EngineHooks for JsHooks {
    fn on_level_up(&mut self, level: u32) {
        Self::call(&self.level_up, level);
    }

    fn on_game_over(&mut self, coins: u32) {
        Self::call(&self.game_over, coins);
    }
}

#[wasm_bindgen]
pub struct WebEngine {
    engine: Engine<JsHooks>,
    settings: Settings,
    /// Timestamp of the previous `frame`, reset on resume
    last_time: Option<f64>,
}

#[wasm_bindgen]
impl WebEngine {
    /// `tuning_json` may be empty for the built-in balance
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: &str) -> Result<WebEngine, JsValue> {
        let tuning = if tuning_json.trim().is_empty() {
            Tuning::default()
        } else {
            Tuning::from_json(tuning_json).map_err(js_err)?
        };
        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        log::info!("Engine created with seed {seed}");
        Ok(Self {
            engine: Engine::with_config(JsHooks::default(), seed, tuning, settings.clone()),
            settings,
            last_time: None,
        })
    }

    pub fn set_hooks(&mut self, on_level_up: js_sys::Function, on_game_over: js_sys::Function) {
        let hooks = JsHooks {
            level_up: Some(on_level_up),
            game_over: Some(on_game_over),
        };
        self.engine.set_hooks(hooks);
    }

    pub fn start(&mut self, demo: bool) {
        self.last_time = None;
        self.engine.start(demo);
    }

    pub fn resize(&mut self, width: f32, height: f32, pixel_density: f32) -> Result<(), JsValue> {
        self.engine.resize(width, height, pixel_density).map_err(js_err)
    }

    /// Advance to `now_ms` (a `requestAnimationFrame` timestamp)
    pub fn frame(&mut self, now_ms: f64) {
        let dt = self.last_time.map_or(0.0, |last| ((now_ms - last) / 1000.0) as f32);
        self.last_time = Some(now_ms);
        self.engine.update(dt);
    }

    pub fn update(&mut self, dt: f32) {
        self.engine.update(dt);
    }

    /// The render frame as JSON
    pub fn draw(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.engine.draw()).map_err(js_err)
    }

    pub fn key_down(&mut self, key: &str) {
        self.engine.press_key(key);
    }

    pub fn key_up(&mut self, key: &str) {
        self.engine.release_key(key);
    }

    pub fn joystick(&mut self, active: bool, base_x: f32, base_y: f32, x: f32, y: f32) {
        let stick = self.engine.joystick_mut();
        stick.active = active;
        stick.base = Vec2::new(base_x, base_y);
        stick.current = Vec2::new(x, y);
    }

    pub fn round(&self) -> u32 {
        self.engine.round()
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.engine.phase())
    }

    pub fn dash_cooldown_fraction(&self) -> f32 {
        self.engine.dash_cooldown_fraction()
    }

    pub fn stats(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.engine.stats()).map_err(js_err)
    }

    pub fn set_stats(&mut self, json: &str) -> Result<(), JsValue> {
        let stats: PlayerStats = serde_json::from_str(json).map_err(js_err)?;
        self.engine.set_stats(stats);
        Ok(())
    }

    pub fn drain_events(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.engine.drain_events()).map_err(js_err)
    }

    pub fn trigger_dash(&mut self) -> bool {
        self.engine.trigger_dash()
    }

    /// `bonuses_json` is a `PermanentBonuses` record; `skin` is 0xRRGGBB
    pub fn apply_permanent_bonuses(&mut self, bonuses_json: &str, skin: u32) -> Result<(), JsValue> {
        let bonuses: PermanentBonuses = serde_json::from_str(bonuses_json).map_err(js_err)?;
        self.engine.apply_permanent_bonuses(&bonuses, Color::hex(skin));
        Ok(())
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn resume(&mut self) {
        self.last_time = None;
        self.engine.resume();
    }

    /// Offered upgrade ids as a JSON array of snake_case names
    pub fn offer_upgrades(&mut self) -> Result<String, JsValue> {
        let offer = self.engine.offer_upgrades().map_err(js_err)?;
        serde_json::to_string(&offer).map_err(js_err)
    }

    pub fn accept_upgrade(&mut self, id: &str) -> Result<(), JsValue> {
        let id: UpgradeId = serde_json::from_value(serde_json::Value::String(id.to_owned())).map_err(js_err)?;
        self.engine.accept_upgrade(id).map_err(js_err)
    }

    /// Switch quality by name ("low", "medium", "high") and persist it
    pub fn set_graphics_quality(&mut self, name: &str) -> Result<(), JsValue> {
        let preset = QualityPreset::from_name(name).ok_or_else(|| js_err(format!("unknown quality {name}")))?;
        self.engine.set_graphics_quality(preset);
        self.settings.apply_preset(preset);
        self.settings.save();
        Ok(())
    }

    pub fn spawn_boss(&mut self) {
        self.engine.spawn_boss();
    }
}
