//! Neon Survivor - simulation core for a top-down survivor arcade game
//!
//! Core modules:
//! - `sim`: Per-frame simulation (entities, collisions, spawning, game state)
//! - `engine`: Caller-facing facade (lifecycle, input, commands, hooks)
//! - `stats` / `upgrades`: Progression model and the upgrade catalog
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation preferences that bound cosmetic work

pub mod engine;
pub mod error;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;
pub mod upgrades;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use engine::{Engine, EngineHooks, NoopHooks};
pub use error::{Result, SimError};
pub use settings::{QualityPreset, Settings};
pub use stats::{PermanentBonuses, PlayerStats};
pub use tuning::Tuning;
pub use upgrades::{UpgradeId, UpgradeKind};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Frame length the per-frame motion constants were tuned against (~60 fps)
    pub const REFERENCE_FRAME_SECS: f32 = 0.01666;
    /// Largest frame delta the engine will simulate in one step
    pub const MAX_FRAME_DT: f32 = 0.033;

    /// Length of one difficulty round
    pub const ROUND_DURATION_MS: f64 = 22_500.0;
    /// Hard ceiling on live enemies regardless of round
    pub const MAX_ENEMIES: usize = 80;
    /// Live enemy ceiling in demo runs
    pub const DEMO_ENEMY_LIMIT: usize = 25;
    /// Passive regen period
    pub const REGEN_INTERVAL_MS: f32 = 10_000.0;

    /// Player collision radius before hitbox upgrades
    pub const PLAYER_RADIUS: f32 = 14.0;
    /// Player autofire and drone engagement range
    pub const ENGAGE_RANGE: f32 = 160.0;

    /// Collection caps
    pub const ENEMY_BULLET_CAP: usize = 220;
    pub const XP_CRYSTAL_CAP: usize = 500;
    pub const DAMAGE_NUMBER_CAP: usize = 140;

    /// Projectiles farther than this outside the view are culled
    pub const CULL_PAD: f32 = 420.0;

    /// Camera zoom clamp
    pub const MIN_CAMERA_ZOOM: f32 = 0.6;
    pub const MAX_CAMERA_ZOOM: f32 = 0.9;
}

/// Normalize `v`, falling back to `fallback` when `v` is too short to have a direction.
#[inline]
pub fn safe_normalize(v: Vec2, fallback: Vec2) -> Vec2 {
    let len = v.length();
    if len > 1e-6 && len.is_finite() {
        v / len
    } else {
        fallback
    }
}

/// Unit direction and distance from `from` to `to`.
///
/// Coincident points report `Vec2::X` and a distance of zero.
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> (Vec2, f32) {
    let delta = to - from;
    let dist = delta.length();
    if dist > 1e-6 && dist.is_finite() {
        (delta / dist, dist)
    } else {
        (Vec2::X, 0.0)
    }
}

/// Perpendicular (counter-clockwise) of a direction
#[inline]
pub fn perpendicular(dir: Vec2) -> Vec2 {
    Vec2::new(-dir.y, dir.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_safe_normalize_zero_vector() {
        let n = safe_normalize(Vec2::ZERO, Vec2::Y);
        assert_eq!(n, Vec2::Y);
    }

    #[test]
    fn test_direction_to_coincident_points() {
        let p = Vec2::new(12.0, -3.0);
        let (dir, dist) = direction_to(p, p);
        assert_eq!(dist, 0.0);
        assert!((dir.length() - 1.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn test_direction_to_never_nan(ax in -1e4f32..1e4, ay in -1e4f32..1e4, dx in -1e-3f32..1e-3, dy in -1e-3f32..1e-3) {
            let a = Vec2::new(ax, ay);
            let (dir, dist) = direction_to(a, a + Vec2::new(dx, dy));
            prop_assert!(dir.is_finite());
            prop_assert!(dist.is_finite());
            prop_assert!((dir.length() - 1.0).abs() < 1e-3);
        }
    }
}
