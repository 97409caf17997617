//! Player input as pushed by the host

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Thumb travel that maps to full speed
pub const JOYSTICK_MAX: f32 = 70.0;
pub const JOYSTICK_DEADZONE: f32 = 8.0;

const UP: [&str; 3] = ["w", "W", "ArrowUp"];
const DOWN: [&str; 3] = ["s", "S", "ArrowDown"];
const LEFT: [&str; 3] = ["a", "A", "ArrowLeft"];
const RIGHT: [&str; 3] = ["d", "D", "ArrowRight"];
pub const DASH_KEY: &str = "Shift";

/// Virtual stick in screen space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Joystick {
    pub active: bool,
    pub base: Vec2,
    pub current: Vec2,
}

impl Joystick {
    /// Analog direction scaled by thumb travel, or zero inside the deadzone
    pub fn vector(&self) -> Vec2 {
        let delta = self.current - self.base;
        let dist = delta.length();
        if !dist.is_finite() || dist <= JOYSTICK_DEADZONE {
            return Vec2::ZERO;
        }
        delta / dist * (dist.min(JOYSTICK_MAX) / JOYSTICK_MAX)
    }

    /// Knob offset from the base, clamped to the travel radius
    pub fn knob_offset(&self) -> Vec2 {
        (self.current - self.base).clamp_length_max(JOYSTICK_MAX)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub keys: HashSet<String>,
    pub joystick: Joystick,
}

impl InputState {
    fn any(&self, names: &[&str]) -> bool {
        names.iter().any(|k| self.keys.contains(*k))
    }

    /// Requested movement. The joystick wins while active; keys give unit axes.
    pub fn movement(&self) -> Vec2 {
        if self.joystick.active {
            return self.joystick.vector();
        }
        let mut v = Vec2::ZERO;
        if self.any(&UP) {
            v.y -= 1.0;
        }
        if self.any(&DOWN) {
            v.y += 1.0;
        }
        if self.any(&LEFT) {
            v.x -= 1.0;
        }
        if self.any(&RIGHT) {
            v.x += 1.0;
        }
        v
    }

    pub fn wants_dash(&self) -> bool {
        self.keys.contains(DASH_KEY)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.joystick = Joystick::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joystick_deadzone_and_clamp() {
        let mut j = Joystick {
            active: true,
            base: Vec2::new(100.0, 100.0),
            current: Vec2::new(105.0, 100.0),
        };
        assert_eq!(j.vector(), Vec2::ZERO);
        j.current = Vec2::new(135.0, 100.0);
        assert!((j.vector().x - 0.5).abs() < 1e-6);
        j.current = Vec2::new(100.0, 400.0);
        assert!((j.vector().length() - 1.0).abs() < 1e-6);
        assert_eq!(j.knob_offset(), Vec2::new(0.0, 70.0));
    }

    #[test]
    fn test_keys_and_joystick_priority() {
        let mut input = InputState::default();
        input.keys.insert("ArrowUp".into());
        input.keys.insert("d".into());
        assert_eq!(input.movement(), Vec2::new(1.0, -1.0));

        input.joystick.active = true;
        assert_eq!(input.movement(), Vec2::ZERO);

        input.keys.insert("Shift".into());
        assert!(input.wants_dash());
        input.clear();
        assert!(!input.wants_dash());
        assert!(!input.joystick.active);
    }
}
