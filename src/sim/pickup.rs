//! Experience crystals, health pickups and destructible cover

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::entity::{Body, palette};

pub const CRYSTAL_RADIUS: f32 = 4.0;
/// Crystals ignore the magnet until this old
pub const MAGNET_DELAY_MS: f32 = 300.0;
pub const CRYSTAL_DRAG: f32 = 0.94;

pub const HEALTH_PICKUP_RADIUS: f32 = 14.0;
pub const HEALTH_PICKUP_LIFE_MS: f32 = 30_000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceCrystal {
    pub body: Body,
    pub vel: Vec2,
    pub value: f32,
    /// Decoy orbs are collected but grant no XP
    pub is_fake: bool,
    pub age_ms: f32,
}

impl ExperienceCrystal {
    pub fn new(pos: Vec2, value: f32, vel: Vec2, is_fake: bool) -> Self {
        Self {
            body: Body::new(pos, CRYSTAL_RADIUS, palette::XP),
            vel,
            value,
            is_fake,
            age_ms: 0.0,
        }
    }

    /// Drift with drag applied as `drag^time_mult`
    pub fn update(&mut self, dt_ms: f32, time_mult: f32) {
        self.age_ms += dt_ms;
        self.body.pos += self.vel * time_mult;
        self.vel *= CRYSTAL_DRAG.powf(time_mult);
    }

    pub fn magnet_ready(&self) -> bool {
        self.age_ms >= MAGNET_DELAY_MS
    }

    /// XP granted on collection
    pub fn xp_value(&self) -> f32 {
        if self.is_fake { 0.0 } else { self.value }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthPickup {
    pub pos: Vec2,
    pub radius: f32,
    /// Fraction of max hp restored
    pub heal_fraction: f32,
    pub age_ms: f32,
}

impl HealthPickup {
    pub fn new(pos: Vec2, heal_fraction: f32) -> Self {
        Self {
            pos,
            radius: HEALTH_PICKUP_RADIUS,
            heal_fraction,
            age_ms: 0.0,
        }
    }

    pub fn update(&mut self, dt_ms: f32) {
        self.age_ms += dt_ms;
    }

    pub fn expired(&self) -> bool {
        self.age_ms >= HEALTH_PICKUP_LIFE_MS
    }

    /// Healed amount for a player with `max_hp`, never past full
    pub fn heal_amount(&self, hp: f32, max_hp: f32) -> f32 {
        (max_hp * self.heal_fraction).min((max_hp - hp).max(0.0))
    }
}

/// Heal table for broken structures: 5% -> 50%, 25% -> 25%, 70% -> 10%
pub fn roll_heal_fraction(roll: f32) -> f32 {
    if roll < 0.05 {
        0.50
    } else if roll < 0.30 {
        0.25
    } else {
        0.10
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    Bush,
    Rock,
    Crate,
}

impl StructureKind {
    /// Map a uniform roll to a kind (42% bush, 36% rock, 22% crate)
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.42 {
            StructureKind::Bush
        } else if roll < 0.78 {
            StructureKind::Rock
        } else {
            StructureKind::Crate
        }
    }

    pub fn size(&self) -> Vec2 {
        match self {
            StructureKind::Bush => Vec2::new(44.0, 34.0),
            StructureKind::Rock => Vec2::new(54.0, 44.0),
            StructureKind::Crate => Vec2::new(40.0, 40.0),
        }
    }

    pub fn max_hp(&self) -> f32 {
        match self {
            StructureKind::Bush => 60.0,
            StructureKind::Rock => 90.0,
            StructureKind::Crate => 70.0,
        }
    }
}

/// Cover that blocks enemies and breaks under contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub id: u32,
    pub kind: StructureKind,
    pub rect: Aabb,
    pub hp: f32,
    pub max_hp: f32,
}

impl Structure {
    pub fn new(id: u32, kind: StructureKind, center: Vec2) -> Self {
        Self {
            id,
            kind,
            rect: Aabb::from_center(center, kind.size()),
            hp: kind.max_hp(),
            max_hp: kind.max_hp(),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// Wear from `contacts` touching enemies over `dt_sec` of scaled time
    pub fn apply_contact_damage(&mut self, contacts: u32, dt_sec: f32, dps_per_contact: f32) {
        if contacts == 0 {
            return;
        }
        self.hp = (self.hp - dps_per_contact * contacts as f32 * dt_sec).max(0.0);
    }

    pub fn is_broken(&self) -> bool {
        self.hp <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crystal_magnet_delay_and_fake_value() {
        let mut c = ExperienceCrystal::new(Vec2::ZERO, 4.0, Vec2::new(4.0, 0.0), true);
        assert!(!c.magnet_ready());
        c.update(300.0, 1.0);
        assert!(c.magnet_ready());
        assert_eq!(c.xp_value(), 0.0);
        assert!((c.vel.x - 4.0 * 0.94).abs() < 1e-5);
    }

    #[test]
    fn test_health_pickup_expiry_and_heal_clamp() {
        let mut p = HealthPickup::new(Vec2::ZERO, 0.25);
        p.update(29_999.0);
        assert!(!p.expired());
        p.update(1.0);
        assert!(p.expired());
        assert_eq!(p.heal_amount(90.0, 100.0), 10.0);
        assert_eq!(p.heal_amount(50.0, 100.0), 25.0);
    }

    #[test]
    fn test_heal_table() {
        assert_eq!(roll_heal_fraction(0.0), 0.50);
        assert_eq!(roll_heal_fraction(0.049), 0.50);
        assert_eq!(roll_heal_fraction(0.05), 0.25);
        assert_eq!(roll_heal_fraction(0.29), 0.25);
        assert_eq!(roll_heal_fraction(0.30), 0.10);
        assert_eq!(roll_heal_fraction(0.99), 0.10);
    }

    #[test]
    fn test_structure_breaks_after_five_seconds_of_contact() {
        let mut s = Structure::new(1, StructureKind::Bush, Vec2::ZERO);
        assert_eq!(s.hp, 60.0);
        s.apply_contact_damage(1, 5.0, 12.0);
        assert_eq!(s.hp, 0.0);
        assert!(s.is_broken());
    }

    #[test]
    fn test_structure_kind_roll() {
        assert_eq!(StructureKind::from_roll(0.1), StructureKind::Bush);
        assert_eq!(StructureKind::from_roll(0.5), StructureKind::Rock);
        assert_eq!(StructureKind::from_roll(0.9), StructureKind::Crate);
    }
}
