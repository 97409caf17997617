//! Status effects shared by every enemy and the boss
//!
//! Every actor owns one `StatusEffects` and calls [`StatusEffects::tick`]
//! before doing anything else in its update. The tick enforces the
//! precedence freeze, then burn and timer decay, then fear; the caller only
//! branches on the returned [`StatusTick`].

use serde::{Deserialize, Serialize};

/// Burn deals one tick of damage per this many milliseconds
pub const BURN_TICK_MS: f32 = 200.0;
/// Fade-in time for freshly spawned enemies
pub const SPAWN_FADE_MS: f32 = 260.0;
/// Hit flash applied by each burn tick
const BURN_FLASH_MS: f32 = 50.0;

/// Timed modifiers on an actor. All timers are milliseconds and never negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    pub freeze_ms: f32,
    pub fear_ms: f32,
    pub slow_ms: f32,
    pub slow_intensity: f32,
    pub burn_ms: f32,
    pub burn_dmg_per_tick: f32,
    /// Time since the last burn tick
    pub burn_acc_ms: f32,
    pub shield_ms: f32,
    pub hit_flash_ms: f32,
    pub act_flash_ms: f32,
    pub spawn_ms: f32,
}

/// What a status tick means for the rest of the actor's frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusTick {
    /// Skip all motion and AI this frame
    pub frozen: bool,
    /// Flee from the player and skip the normal behavior
    pub feared: bool,
    /// Multiplier on movement speed from slow
    pub speed_mult: f32,
    /// Burn damage to subtract from hp this frame (never negative)
    pub burn_damage: f32,
}

#[inline]
fn decay(timer: &mut f32, dt_ms: f32) {
    if *timer > 0.0 {
        *timer = (*timer - dt_ms).max(0.0);
    }
}

impl StatusEffects {
    /// Effects for a freshly spawned actor (fading in)
    pub fn spawning() -> Self {
        Self {
            spawn_ms: SPAWN_FADE_MS,
            ..Self::default()
        }
    }

    /// Advance every timer by `dt_ms` in precedence order.
    pub fn tick(&mut self, dt_ms: f32) -> StatusTick {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

        if self.freeze_ms > 0.0 {
            decay(&mut self.freeze_ms, dt_ms);
            return StatusTick {
                frozen: true,
                feared: false,
                speed_mult: 0.0,
                burn_damage: 0.0,
            };
        }

        let mut burn_damage = 0.0;
        if self.burn_ms > 0.0 {
            decay(&mut self.burn_ms, dt_ms);
            self.burn_acc_ms += dt_ms;
            if self.burn_acc_ms >= BURN_TICK_MS {
                burn_damage = self.burn_dmg_per_tick.max(0.0);
                self.hit_flash_ms = self.hit_flash_ms.max(BURN_FLASH_MS);
                self.burn_acc_ms = 0.0;
            }
        }

        decay(&mut self.fear_ms, dt_ms);
        decay(&mut self.slow_ms, dt_ms);
        decay(&mut self.shield_ms, dt_ms);
        decay(&mut self.spawn_ms, dt_ms);
        decay(&mut self.hit_flash_ms, dt_ms);
        decay(&mut self.act_flash_ms, dt_ms);

        StatusTick {
            frozen: false,
            feared: self.fear_ms > 0.0,
            speed_mult: self.speed_mult(),
            burn_damage,
        }
    }

    /// Current movement multiplier from slow
    pub fn speed_mult(&self) -> f32 {
        if self.slow_ms > 0.0 {
            (1.0 - self.slow_intensity).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_ms > 0.0
    }

    pub fn is_shielded(&self) -> bool {
        self.shield_ms > 0.0
    }

    pub fn freeze(&mut self, ms: f32) {
        self.freeze_ms = ms.max(0.0);
    }

    pub fn fear(&mut self, ms: f32) {
        self.fear_ms = ms.max(0.0);
    }

    pub fn slow(&mut self, ms: f32, intensity: f32) {
        self.slow_ms = ms.max(0.0);
        self.slow_intensity = intensity.clamp(0.0, 1.0);
    }

    pub fn burn(&mut self, ms: f32, dmg_per_tick: f32) {
        self.burn_ms = ms.max(0.0);
        self.burn_dmg_per_tick = dmg_per_tick.max(0.0);
    }

    /// Extend the shield to at least `ms`
    pub fn grant_shield(&mut self, ms: f32) {
        self.shield_ms = self.shield_ms.max(ms);
    }

    /// Raise the hit flash to at least `ms`
    pub fn flash_hit(&mut self, ms: f32) {
        self.hit_flash_ms = self.hit_flash_ms.max(ms);
    }

    /// Raise the action flash to at least `ms`
    pub fn flash_act(&mut self, ms: f32) {
        self.act_flash_ms = self.act_flash_ms.max(ms);
    }

    /// 0 while spawning in, 1 once fully visible
    pub fn spawn_progress(&self) -> f32 {
        if self.spawn_ms > 0.0 {
            1.0 - self.spawn_ms / SPAWN_FADE_MS
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_freeze_short_circuits_other_timers() {
        let mut s = StatusEffects {
            freeze_ms: 100.0,
            fear_ms: 500.0,
            burn_ms: 500.0,
            burn_dmg_per_tick: 3.0,
            burn_acc_ms: 190.0,
            ..Default::default()
        };
        let t = s.tick(16.0);
        assert!(t.frozen);
        assert_eq!(t.burn_damage, 0.0);
        assert_eq!(s.freeze_ms, 84.0);
        assert_eq!(s.fear_ms, 500.0);
        assert_eq!(s.burn_acc_ms, 190.0);
    }

    #[test]
    fn test_burn_ticks_every_200ms() {
        let mut s = StatusEffects::default();
        s.burn(1000.0, 2.5);
        let mut total = 0.0;
        for _ in 0..10 {
            total += s.tick(40.0).burn_damage;
        }
        // 400ms of burning at one tick per 200ms; the last step just ticked
        assert_eq!(total, 5.0);
        assert!((s.hit_flash_ms - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_fear_expires_on_last_frame() {
        let mut s = StatusEffects::default();
        s.fear(30.0);
        assert!(s.tick(16.0).feared);
        assert!(!s.tick(16.0).feared);
    }

    #[test]
    fn test_slow_multiplier() {
        let mut s = StatusEffects::default();
        s.slow(1200.0, 0.4);
        assert!((s.tick(16.0).speed_mult - 0.6).abs() < 1e-6);
        s.slow(0.0, 0.4);
        assert_eq!(s.tick(16.0).speed_mult, 1.0);
    }

    proptest! {
        #[test]
        fn test_timers_decay_to_max_zero(
            fear in 0.0f32..5000.0,
            slow in 0.0f32..5000.0,
            burn in 0.0f32..5000.0,
            shield in 0.0f32..5000.0,
            flash in 0.0f32..500.0,
            dt in 0.0f32..100.0,
        ) {
            let mut s = StatusEffects {
                fear_ms: fear,
                slow_ms: slow,
                burn_ms: burn,
                shield_ms: shield,
                hit_flash_ms: flash,
                ..Default::default()
            };
            s.tick(dt);
            prop_assert_eq!(s.fear_ms, (fear - dt).max(0.0));
            prop_assert_eq!(s.slow_ms, (slow - dt).max(0.0));
            prop_assert_eq!(s.burn_ms, (burn - dt).max(0.0));
            prop_assert_eq!(s.shield_ms, (shield - dt).max(0.0));
            // burn_dmg_per_tick is 0 so no burn flash is added
            prop_assert_eq!(s.hit_flash_ms, (flash - dt).max(0.0));
        }

        #[test]
        fn test_frozen_timer_never_negative(freeze in 0.0f32..1000.0, dt in 0.0f32..2000.0) {
            let mut s = StatusEffects { freeze_ms: freeze, ..Default::default() };
            s.tick(dt);
            prop_assert!(s.freeze_ms >= 0.0);
            prop_assert!(s.freeze_ms <= freeze);
        }
    }
}
