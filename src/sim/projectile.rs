//! Player and enemy projectiles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Color, palette};
use crate::safe_normalize;

pub const BULLET_RADIUS: f32 = 4.0;
pub const ENEMY_BULLET_RADIUS: f32 = 3.5;
pub const DEFAULT_ENEMY_BULLET_SPEED: f32 = 9.5;

/// Player-side projectile (autofire and drone)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub body: Body,
    pub vel: Vec2,
    pub damage: f32,
    /// Extra enemies this bullet may pass through
    pub pierce: u32,
    pub kb_mult: f32,
    pub just_spawned: bool,
    /// Enemies already struck
    pub hit_ids: Vec<u32>,
}

impl Bullet {
    /// Aimed at `target`; a degenerate aim fires along +X
    pub fn aimed(origin: Vec2, target: Vec2, damage: f32, speed: f32, color: Color) -> Self {
        let dir = safe_normalize(target - origin, Vec2::X);
        Self::with_direction(origin, dir, damage, speed, color)
    }

    pub fn with_direction(origin: Vec2, dir: Vec2, damage: f32, speed: f32, color: Color) -> Self {
        Self {
            body: Body::new(origin, BULLET_RADIUS, color),
            vel: safe_normalize(dir, Vec2::X) * speed,
            damage,
            pierce: 0,
            kb_mult: 1.0,
            just_spawned: true,
            hit_ids: Vec::new(),
        }
    }

    pub fn with_pierce(mut self, pierce: u32) -> Self {
        self.pierce = pierce;
        self
    }

    /// Straight-line motion. The first call after spawning does nothing.
    pub fn update(&mut self, time_mult: f32) {
        if self.just_spawned {
            self.just_spawned = false;
            return;
        }
        self.body.pos += self.vel * time_mult;
    }

    pub fn direction(&self) -> Vec2 {
        self.vel.normalize_or_zero()
    }

    pub fn has_hit(&self, enemy_id: u32) -> bool {
        self.hit_ids.contains(&enemy_id)
    }
}

/// Hostile projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub body: Body,
    pub vel: Vec2,
    pub damage: f32,
    pub just_spawned: bool,
}

impl EnemyBullet {
    pub fn aimed(origin: Vec2, target: Vec2, damage: f32, speed: f32) -> Self {
        Self::aimed_colored(origin, target, damage, speed, palette::ENEMY_BULLET)
    }

    pub fn aimed_colored(origin: Vec2, target: Vec2, damage: f32, speed: f32, color: Color) -> Self {
        let dir = safe_normalize(target - origin, Vec2::X);
        Self {
            body: Body::new(origin, ENEMY_BULLET_RADIUS, color),
            vel: dir * speed,
            damage,
            just_spawned: true,
        }
    }

    pub fn update(&mut self, time_mult: f32) {
        if self.just_spawned {
            self.just_spawned = false;
            return;
        }
        self.body.pos += self.vel * time_mult;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_skips_first_update() {
        let mut b = Bullet::aimed(Vec2::ZERO, Vec2::new(10.0, 0.0), 3.0, 16.0, palette::BULLET);
        b.update(1.0);
        assert_eq!(b.body.pos, Vec2::ZERO);
        b.update(1.0);
        assert_eq!(b.body.pos, Vec2::new(16.0, 0.0));
    }

    #[test]
    fn test_enemy_bullet_degenerate_aim() {
        let mut b = EnemyBullet::aimed(Vec2::ONE, Vec2::ONE, 6.0, 9.5);
        b.update(1.0);
        b.update(2.0);
        assert!(b.body.pos.is_finite());
        assert_eq!(b.body.pos, Vec2::new(20.0, 1.0));
    }
}
