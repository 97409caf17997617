//! Cosmetic effects: particles, floating damage numbers, screen shake and
//! the damage flash. Nothing here feeds back into gameplay; effects roll
//! their own `Pcg32` so toggling them never shifts the gameplay stream.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::Color;
use crate::consts::DAMAGE_NUMBER_CAP;
use crate::settings::Settings;

/// Shake and flash durations, in seconds
pub const SHAKE_SECS: f32 = 0.16;
pub const MAX_SHAKE: f32 = 18.0;
pub const DAMAGE_FLASH_SECS: f32 = 0.12;

/// Mixed into the run seed for the cosmetic stream
const FX_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    /// 1 at birth, removed at 0
    pub life: f32,
    pub size: f32,
    decay: f32,
    drag: f32,
}

impl Particle {
    fn new(pos: Vec2, color: Color, speed_scale: f32, rng: &mut Pcg32) -> Self {
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let speed = (rng.random::<f32>() * 2.6 + 0.8) * speed_scale;
        Self {
            pos,
            vel: Vec2::from_angle(angle) * speed,
            color,
            life: 1.0,
            size: rng.random::<f32>() * 2.6 + 1.2,
            decay: rng.random::<f32>() * 0.04 + 0.02,
            drag: rng.random::<f32>() * 0.04 + 0.02,
        }
    }

    fn update(&mut self, time_mult: f32) {
        let tm = time_mult.clamp(0.25, 3.0);
        self.pos += self.vel * tm;
        self.vel *= (1.0 - self.drag).powf(tm);
        self.life -= self.decay * tm;
    }
}

#[derive(Debug, Clone)]
pub struct DamageNumber {
    pub pos: Vec2,
    pub value: u32,
    pub color: Color,
    pub is_crit: bool,
    pub age_ms: f32,
    pub life_ms: f32,
    vel: Vec2,
}

impl DamageNumber {
    fn new(pos: Vec2, value: f32, color: Color, is_crit: bool, rng: &mut Pcg32) -> Self {
        Self {
            pos,
            value: value.max(0.0).round() as u32,
            color,
            is_crit,
            age_ms: 0.0,
            life_ms: if is_crit { 620.0 } else { 480.0 },
            vel: Vec2::new((rng.random::<f32>() - 0.5) * 12.0, if is_crit { -32.0 } else { -26.0 }),
        }
    }

    /// 0..1 through its lifetime
    pub fn progress(&self) -> f32 {
        (self.age_ms / self.life_ms).min(1.0)
    }

    fn update(&mut self, dt_ms: f32) {
        self.age_ms += dt_ms;
        let t = self.progress();
        let secs = dt_ms / 1000.0;
        self.pos.x += self.vel.x * secs * (1.0 - t * 0.7);
        self.pos.y += self.vel.y * secs * (1.0 - t * 0.5);
    }

    pub fn done(&self) -> bool {
        self.age_ms >= self.life_ms
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenShake {
    pub time: f32,
    pub strength: f32,
    pub offset: Vec2,
}

impl ScreenShake {
    pub fn add(&mut self, amount: f32) {
        self.strength = self.strength.max(amount.min(MAX_SHAKE));
        self.time = self.time.max(SHAKE_SECS);
    }

    fn update(&mut self, dt: f32, rng: &mut Pcg32) {
        if self.time <= 0.0 {
            return;
        }
        self.time = (self.time - dt).max(0.0);
        let strength = self.strength * (self.time / SHAKE_SECS).min(1.0);
        self.offset = Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0)) * strength;
        if self.time <= 0.0 {
            *self = Self::default();
        }
    }
}

/// All cosmetic state, bounded by the active `Settings`
#[derive(Debug, Clone)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub damage_numbers: Vec<DamageNumber>,
    pub shake: ScreenShake,
    /// Seconds of red flash left
    pub damage_flash: f32,
    /// Expanding ring after a pulse
    pub pulse_visual_ms: f32,
    pub settings: Settings,
    rng: Pcg32,
}

impl Effects {
    pub fn new(settings: Settings, seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            damage_numbers: Vec::new(),
            shake: ScreenShake::default(),
            damage_flash: 0.0,
            pulse_visual_ms: 0.0,
            settings,
            rng: Pcg32::seed_from_u64(seed ^ FX_SEED_SALT),
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.damage_numbers.clear();
        self.shake = ScreenShake::default();
        self.damage_flash = 0.0;
        self.pulse_visual_ms = 0.0;
    }

    /// Apply new settings, trimming anything over the new budget
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.trim_particles();
        if !self.settings.damage_numbers {
            self.damage_numbers.clear();
        }
    }

    fn trim_particles(&mut self) {
        let max = self.settings.max_particles();
        if self.particles.len() > max {
            let excess = self.particles.len() - max;
            self.particles.drain(..excess);
        }
    }

    pub fn emit(&mut self, pos: Vec2, color: Color, count: u32) {
        self.emit_scaled(pos, color, count, 1.0);
    }

    /// Dash trail: one particle on roughly every other frame
    pub fn trail(&mut self, pos: Vec2, color: Color) {
        if self.rng.random_bool(0.5) {
            self.emit(pos, color, 1);
        }
    }

    /// Burst of `count` particles; the oldest are dropped past the cap
    pub fn emit_scaled(&mut self, pos: Vec2, color: Color, count: u32, speed_scale: f32) {
        if !self.settings.particles || count == 0 {
            return;
        }
        let rng = &mut self.rng;
        self.particles
            .extend((0..count).map(|_| Particle::new(pos, color, speed_scale, rng)));
        self.trim_particles();
    }

    /// Float a number above a hit. Crits are hits at or above `crit_threshold`.
    pub fn damage_number(&mut self, pos: Vec2, value: f32, color: Color, crit_threshold: f32) {
        if !self.settings.damage_numbers || self.damage_numbers.len() > DAMAGE_NUMBER_CAP {
            return;
        }
        let is_crit = value >= crit_threshold;
        self.damage_numbers
            .push(DamageNumber::new(pos, value, color, is_crit, &mut self.rng));
    }

    pub fn add_shake(&mut self, amount: f32) {
        if self.settings.effective_screen_shake() {
            self.shake.add(amount);
        }
    }

    pub fn flash_damage(&mut self) {
        if self.settings.effective_damage_flash() {
            self.damage_flash = self.damage_flash.max(DAMAGE_FLASH_SECS);
        }
    }

    /// Shake and flash decay, by unscaled seconds
    pub fn update_feedback(&mut self, dt: f32) {
        if self.damage_flash > 0.0 {
            self.damage_flash = (self.damage_flash - dt).max(0.0);
        }
        self.shake.update(dt, &mut self.rng);
    }

    /// Particles by time multiplier, numbers by scaled milliseconds
    pub fn update(&mut self, time_mult: f32, scaled_dt_ms: f32) {
        for p in &mut self.particles {
            p.update(time_mult);
        }
        self.particles.retain(|p| p.life > 0.0);

        for n in &mut self.damage_numbers {
            n.update(scaled_dt_ms);
        }
        self.damage_numbers.retain(|n| !n.done());

        if self.pulse_visual_ms > 0.0 {
            self.pulse_visual_ms = (self.pulse_visual_ms - scaled_dt_ms).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effects() -> Effects {
        Effects::new(Settings::default(), 5)
    }

    #[test]
    fn test_particle_cap_drops_oldest() {
        let mut fx = effects();
        let cap = fx.settings.max_particles();
        fx.emit(Vec2::new(-1.0, 0.0), Color::hex(0xff0000), cap as u32);
        fx.emit(Vec2::new(1.0, 0.0), Color::hex(0x00ff00), 10);
        assert_eq!(fx.particles.len(), cap);
        assert_eq!(fx.particles.last().map(|p| p.pos), Some(Vec2::new(1.0, 0.0)));
        assert_eq!(fx.particles[cap - 10].color, Color::hex(0x00ff00));
    }

    #[test]
    fn test_particles_fade_out() {
        let mut fx = effects();
        fx.emit(Vec2::ZERO, Color::hex(0xffffff), 20);
        // Slowest decay is 0.02 per reference frame
        for _ in 0..60 {
            fx.update(1.0, 16.66);
        }
        assert!(fx.particles.is_empty());
    }

    #[test]
    fn test_damage_number_crit_and_expiry() {
        let mut fx = effects();
        fx.damage_number(Vec2::ZERO, 17.6, Color::hex(0xffffff), 18.0);
        fx.damage_number(Vec2::ZERO, 18.0, Color::hex(0xffffff), 18.0);
        assert_eq!(fx.damage_numbers[0].value, 18);
        assert!(!fx.damage_numbers[0].is_crit);
        assert!(fx.damage_numbers[1].is_crit);
        assert!(fx.damage_numbers[1].pos.y == 0.0);

        fx.update(1.0, 500.0);
        assert_eq!(fx.damage_numbers.len(), 1);
        assert!(fx.damage_numbers[0].pos.y < 0.0);
        fx.update(1.0, 200.0);
        assert!(fx.damage_numbers.is_empty());
    }

    #[test]
    fn test_shake_caps_and_settles() {
        let mut fx = effects();
        fx.add_shake(40.0);
        assert_eq!(fx.shake.strength, MAX_SHAKE);
        fx.update_feedback(0.1);
        assert!(fx.shake.offset.length() <= MAX_SHAKE * 2f32.sqrt());
        fx.update_feedback(0.1);
        assert_eq!(fx.shake.offset, Vec2::ZERO);
        assert_eq!(fx.shake.strength, 0.0);
    }

    #[test]
    fn test_disabled_settings_suppress_effects() {
        let mut settings = Settings::default();
        settings.particles = false;
        settings.damage_numbers = false;
        settings.screen_shake = false;
        let mut fx = Effects::new(settings, 5);
        fx.emit(Vec2::ZERO, Color::hex(0xffffff), 5);
        fx.damage_number(Vec2::ZERO, 5.0, Color::hex(0xffffff), 18.0);
        fx.add_shake(5.0);
        assert!(fx.particles.is_empty());
        assert!(fx.damage_numbers.is_empty());
        assert_eq!(fx.shake.time, 0.0);
    }
}
