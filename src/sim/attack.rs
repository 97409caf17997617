//! Telegraphed attack sequencing
//!
//! Idle -> Telegraphing -> Firing -> Cooldown -> Idle. Enemies only tick the
//! cycle while their normal behavior runs, so a telegraph interrupted by
//! freeze or fear picks up where it left off. Fear still runs cooldowns down
//! through [`AttackCycle::tick_cooldown`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CyclePhase {
    #[default]
    Idle,
    Telegraphing,
    Firing,
    Cooldown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AttackCycle {
    pub phase: CyclePhase,
    /// Time left in the current phase (ms)
    pub timer_ms: f32,
    /// Full length of the current phase, for progress readouts
    pub span_ms: f32,
}

impl AttackCycle {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Start in cooldown, e.g. to stagger freshly spawned shooters
    pub fn cooling(ms: f32) -> Self {
        Self {
            phase: CyclePhase::Cooldown,
            timer_ms: ms.max(0.0),
            span_ms: ms.max(0.0),
        }
    }

    pub fn tick(&mut self, dt_ms: f32) {
        if self.phase == CyclePhase::Idle {
            return;
        }
        self.timer_ms = (self.timer_ms - dt_ms).max(0.0);
        if self.timer_ms > 0.0 {
            return;
        }
        match self.phase {
            CyclePhase::Telegraphing => {
                self.phase = CyclePhase::Firing;
                self.span_ms = 0.0;
            }
            CyclePhase::Cooldown => {
                self.phase = CyclePhase::Idle;
                self.span_ms = 0.0;
            }
            // Firing is left to the owner to finish
            CyclePhase::Firing | CyclePhase::Idle => {}
        }
    }

    /// Advance only a running cooldown; other phases hold
    pub fn tick_cooldown(&mut self, dt_ms: f32) {
        if self.phase == CyclePhase::Cooldown {
            self.tick(dt_ms);
        }
    }

    /// Begin a telegraph. Only allowed from Idle.
    pub fn begin_telegraph(&mut self, ms: f32) -> bool {
        if self.phase != CyclePhase::Idle {
            return false;
        }
        self.phase = CyclePhase::Telegraphing;
        self.timer_ms = ms.max(0.0);
        self.span_ms = self.timer_ms;
        true
    }

    /// Consume the Firing state and enter cooldown. Returns false if the
    /// cycle was not firing, so the attack can only land once.
    pub fn finish(&mut self, cooldown_ms: f32) -> bool {
        if self.phase != CyclePhase::Firing {
            return false;
        }
        self.phase = CyclePhase::Cooldown;
        self.timer_ms = cooldown_ms.max(0.0);
        self.span_ms = self.timer_ms;
        true
    }

    pub fn is_idle(&self) -> bool {
        self.phase == CyclePhase::Idle
    }

    pub fn is_telegraphing(&self) -> bool {
        self.phase == CyclePhase::Telegraphing
    }

    pub fn is_firing(&self) -> bool {
        self.phase == CyclePhase::Firing
    }

    /// 0 at telegraph start, 1 when it fires
    pub fn telegraph_progress(&self) -> Option<f32> {
        if self.phase != CyclePhase::Telegraphing {
            return None;
        }
        if self.span_ms <= 0.0 {
            return Some(1.0);
        }
        Some((1.0 - self.timer_ms / self.span_ms).clamp(0.0, 1.0))
    }

    pub fn cooldown_left(&self) -> f32 {
        if self.phase == CyclePhase::Cooldown {
            self.timer_ms
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let mut c = AttackCycle::idle();
        assert!(c.begin_telegraph(300.0));
        assert!(!c.begin_telegraph(300.0));
        c.tick(200.0);
        assert!(c.is_telegraphing());
        assert!((c.telegraph_progress().unwrap_or(0.0) - 2.0 / 3.0).abs() < 1e-5);
        c.tick(200.0);
        assert!(c.is_firing());
        assert!(c.finish(1000.0));
        assert!(!c.finish(1000.0));
        assert_eq!(c.cooldown_left(), 1000.0);
        c.tick(999.0);
        assert_eq!(c.phase, CyclePhase::Cooldown);
        c.tick(1.0);
        assert!(c.is_idle());
    }

    #[test]
    fn test_tick_cooldown_leaves_telegraph_alone() {
        let mut c = AttackCycle::cooling(100.0);
        c.tick_cooldown(60.0);
        assert_eq!(c.cooldown_left(), 40.0);
        c.tick_cooldown(60.0);
        assert!(c.is_idle());

        assert!(c.begin_telegraph(300.0));
        c.tick_cooldown(500.0);
        assert!(c.is_telegraphing());
        assert_eq!(c.timer_ms, 300.0);
    }

    #[test]
    fn test_firing_persists_until_finished() {
        let mut c = AttackCycle::idle();
        c.begin_telegraph(0.0);
        c.tick(16.0);
        assert!(c.is_firing());
        c.tick(500.0);
        assert!(c.is_firing());
    }

    #[test]
    fn test_untouched_cycle_keeps_telegraph() {
        // An owner that skips tick() while frozen leaves the telegraph intact
        let mut c = AttackCycle::idle();
        c.begin_telegraph(400.0);
        c.tick(100.0);
        let snapshot = c.clone();
        c.tick(100.0);
        assert_eq!(snapshot.timer_ms, 300.0);
        assert_eq!(c.timer_ms, 200.0);
    }
}
