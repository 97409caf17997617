//! Spatial and visual contract shared by everything in the world

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An RGBA colour with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque colour from a `0xRRGGBB` literal
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 255,
        }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::hex)
    }

    /// Normalized `[r, g, b, a]` for GPU-side consumers
    pub fn to_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

/// Named colours used by the simulation
pub mod palette {
    use super::Color;

    pub const PLAYER: Color = Color::hex(0x8b5cf6);
    pub const ENEMY: Color = Color::hex(0xff3355);
    pub const BOSS: Color = Color::hex(0x6d28d9);
    pub const XP: Color = Color::hex(0xa855f7);
    pub const BULLET: Color = Color::hex(0xffffff);
    pub const DRONE: Color = Color::hex(0x00ffcc);
    pub const ENEMY_BULLET: Color = Color::rgba(255, 160, 0, 242);
    pub const BOSS_BULLET: Color = Color::rgba(255, 60, 120, 242);
    pub const HEAL: Color = Color::hex(0x9cffb3);
    pub const DEBRIS: Color = Color::hex(0xeafbff);
    pub const EXPLOSION: Color = Color::rgba(255, 120, 0, 230);
    pub const FEAR: Color = Color::hex(0xff00ff);
    pub const FREEZE: Color = Color::hex(0x6ef7ff);
    pub const REGEN: Color = Color::hex(0x00ff00);
    pub const HIT_TEXT: Color = Color::hex(0xeafbff);
    pub const SHIELDED_HIT_TEXT: Color = Color::hex(0xb9d6ff);
    pub const BOSS_HIT_TEXT: Color = Color::hex(0xffd6ff);
    pub const AURA_HIT_TEXT: Color = Color::hex(0xffcfa6);
}

/// Position, collision radius and colour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Color,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32, color: Color) -> Self {
        Self { pos, radius, color }
    }

    /// Strict circle overlap against another circle
    #[inline]
    pub fn overlaps(&self, pos: Vec2, radius: f32) -> bool {
        let rr = self.radius + radius;
        self.pos.distance_squared(pos) < rr * rr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("#7CFF00"), Some(Color::hex(0x7cff00)));
        assert_eq!(Color::parse("ff3355"), Some(palette::ENEMY));
        assert_eq!(Color::parse("#fff"), None);
        assert_eq!(Color::parse("#gg0000"), None);
    }

    #[test]
    fn test_body_overlap_is_strict() {
        let a = Body::new(Vec2::ZERO, 10.0, palette::ENEMY);
        assert!(a.overlaps(Vec2::new(19.9, 0.0), 10.0));
        assert!(!a.overlaps(Vec2::new(20.0, 0.0), 10.0));
    }
}
