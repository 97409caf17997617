//! Player body, inertia movement, dash and the orbiting drone

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Color, palette};
use crate::consts::PLAYER_RADIUS;
use crate::safe_normalize;
use crate::stats::PlayerStats;

pub const DASH_SECS: f32 = 0.15;
const DASH_SPEED_MULT: f32 = 3.0;
const MOVE_SCALE: f32 = 0.72;
const AUTOPILOT_SCALE: f32 = 0.85;
const AUTOPILOT_AVOID: f32 = 180.0;
/// Velocity components below this snap to zero when coasting
const DRIFT_SNAP: f32 = 0.02;

pub const DRONE_RADIUS: f32 = 6.0;
pub const DRONE_ORBIT: f32 = 45.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    /// Per-reference-frame velocity used by the inertia model
    pub vel: Vec2,
    pub prev_pos: Vec2,
    /// Observed motion in world units per second, for enemy aim lead
    pub frame_velocity: Vec2,
    pub dash_timer: f32,
    pub dash_cooldown: f32,
    pub invincibility: f32,
    /// Wander heading of the demo autopilot
    pub demo_angle: f32,
}

impl Player {
    pub fn new(color: Color) -> Self {
        Self {
            body: Body::new(Vec2::ZERO, PLAYER_RADIUS, color),
            vel: Vec2::ZERO,
            prev_pos: Vec2::ZERO,
            frame_velocity: Vec2::ZERO,
            dash_timer: 0.0,
            dash_cooldown: 0.0,
            invincibility: 0.0,
            demo_angle: 0.0,
        }
    }

    /// Back to `pos` at rest, keeping the skin colour
    pub fn reset(&mut self, pos: Vec2, demo_angle: f32) {
        *self = Self {
            demo_angle,
            ..Self::new(self.body.color)
        };
        self.body.pos = pos;
        self.prev_pos = pos;
    }

    pub fn pos(&self) -> Vec2 {
        self.body.pos
    }

    /// Radius used for incoming hits, shrunk by the hitbox upgrade
    pub fn hit_radius(&self, stats: &PlayerStats) -> f32 {
        self.body.radius * (1.0 - stats.hitbox_reduction())
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility > 0.0
    }

    /// Start a dash if owned and off cooldown
    pub fn try_dash(&mut self, stats: &PlayerStats) -> bool {
        if !stats.has_dash || self.dash_cooldown > 0.0 {
            return false;
        }
        self.dash_timer = DASH_SECS;
        self.dash_cooldown = stats.dash_cooldown_secs();
        true
    }

    /// Remaining dash cooldown as a fraction of the full cooldown
    pub fn dash_cooldown_fraction(&self, stats: &PlayerStats) -> f32 {
        if self.dash_cooldown <= 0.0 {
            return 0.0;
        }
        (self.dash_cooldown / stats.dash_cooldown_secs()).clamp(0.0, 1.0)
    }

    /// Inertia movement toward `input` (magnitude up to 1), or coasting when idle
    pub fn steer(&mut self, input: Vec2, stats: &PlayerStats, time_mult: f32) {
        let dash = if self.is_dashing() { DASH_SPEED_MULT } else { 1.0 };
        let move_speed = stats.speed * stats.move_speed_mult() * dash * MOVE_SCALE;
        let mag = input.length();

        if mag > 0.0 && mag.is_finite() {
            let target = input / mag * move_speed * mag.min(1.0);
            self.vel += (target - self.vel) * stats.handling_lerp() * time_mult;
        } else {
            self.vel *= stats.handling_friction().powf(time_mult);
            if self.vel.x.abs() < DRIFT_SNAP {
                self.vel.x = 0.0;
            }
            if self.vel.y.abs() < DRIFT_SNAP {
                self.vel.y = 0.0;
            }
        }
        self.body.pos += self.vel * time_mult;
    }

    /// Count down dash state. Returns whether a dash was active this frame.
    pub fn tick_dash(&mut self, dt: f32) -> bool {
        let dashing = self.is_dashing();
        if dashing {
            self.dash_timer -= dt;
        }
        if self.dash_cooldown > 0.0 {
            self.dash_cooldown -= dt;
        }
        dashing
    }

    pub fn tick_invincibility(&mut self, dt: f32) {
        if self.invincibility > 0.0 {
            self.invincibility -= dt;
        }
    }

    /// Demo wander that steers away from nearby threats
    pub fn autopilot<I>(&mut self, threats: I, stats: &PlayerStats, time_mult: f32)
    where
        I: IntoIterator<Item = Vec2>,
    {
        self.demo_angle += 0.015 * time_mult;
        let mut heading = Vec2::new(self.demo_angle.cos(), (self.demo_angle * 0.5).sin());
        for threat in threats {
            let away = self.body.pos - threat;
            let d_sq = away.length_squared();
            if d_sq < AUTOPILOT_AVOID * AUTOPILOT_AVOID {
                let d = d_sq.sqrt();
                let dir = if d > 0.0 { away / d } else { Vec2::ZERO };
                heading += dir * (1.0 - d / AUTOPILOT_AVOID) * 4.0;
            }
        }
        let n = safe_normalize(heading, Vec2::ZERO);
        self.body.pos += n * stats.speed * stats.move_speed_mult() * AUTOPILOT_SCALE * time_mult;
    }

    /// Record this frame's displacement as velocity per second
    pub fn end_frame(&mut self, dt: f32) {
        self.frame_velocity = if dt > 0.0 {
            (self.body.pos - self.prev_pos) / dt
        } else {
            Vec2::ZERO
        };
        self.prev_pos = self.body.pos;
    }
}

/// Companion that orbits the player and fires on its own timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    pub body: Body,
    pub angle: f32,
}

impl Drone {
    pub fn new(player_pos: Vec2) -> Self {
        Self {
            body: Body::new(player_pos, DRONE_RADIUS, palette::DRONE),
            angle: 0.0,
        }
    }

    pub fn update(&mut self, player_pos: Vec2, time_mult: f32) {
        self.angle += 0.05 * time_mult;
        self.body.pos = player_pos + Vec2::from_angle(self.angle) * DRONE_ORBIT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stats() -> PlayerStats {
        PlayerStats::default()
    }

    #[test]
    fn test_dash_gating() {
        let mut p = Player::new(palette::PLAYER);
        let mut s = stats();
        assert!(!p.try_dash(&s));

        s.has_dash = true;
        s.dash_cd_level = 2;
        assert!(p.try_dash(&s));
        assert!(!p.try_dash(&s));
        assert!((p.dash_cooldown - 3.0 * (1.0 - 0.14)).abs() < 1e-6);
        assert_eq!(p.dash_timer, DASH_SECS);
        assert!((p.dash_cooldown_fraction(&s) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_coasting_snaps_to_rest() {
        let mut p = Player::new(palette::PLAYER);
        let s = stats();
        p.vel = Vec2::new(0.021, -3.0);
        p.steer(Vec2::ZERO, &s, 1.0);
        assert_eq!(p.vel.x, 0.0);
        assert!((p.vel.y + 2.85).abs() < 1e-5);
    }

    #[test]
    fn test_steer_accelerates_toward_input() {
        let mut p = Player::new(palette::PLAYER);
        let s = stats();
        p.steer(Vec2::new(1.0, 0.0), &s, 1.0);
        // speed 4 * 0.72 target, lerp 0.22
        assert!((p.vel.x - 4.0 * 0.72 * 0.22).abs() < 1e-5);
        assert_eq!(p.body.pos.x, p.vel.x);
    }

    #[test]
    fn test_end_frame_reports_units_per_second() {
        let mut p = Player::new(palette::PLAYER);
        p.body.pos = Vec2::new(1.0, 0.0);
        p.end_frame(0.5);
        assert_eq!(p.frame_velocity, Vec2::new(2.0, 0.0));
        assert_eq!(p.prev_pos, p.body.pos);
    }

    #[test]
    fn test_drone_orbit_radius() {
        let mut d = Drone::new(Vec2::ZERO);
        d.update(Vec2::new(10.0, 10.0), 3.0);
        assert!((d.body.pos.distance(Vec2::new(10.0, 10.0)) - DRONE_ORBIT).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn test_autopilot_never_nan(x in -50.0f32..50.0, y in -50.0f32..50.0, angle in -10.0f32..10.0) {
            let mut p = Player::new(palette::PLAYER);
            p.demo_angle = angle;
            p.autopilot([Vec2::new(x, y), Vec2::ZERO], &stats(), 1.0);
            prop_assert!(p.body.pos.is_finite());
        }
    }
}
