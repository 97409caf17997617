//! Player progression record
//!
//! `PlayerStats` is a flat serde record. Levelled fields are clamped when an
//! upgrade applies and clamped again by the helper methods below, so a
//! hand-edited or stale record can never push a derived value out of range.

use serde::{Deserialize, Serialize};

/// Levelled fields and their caps
pub mod caps {
    pub const MULTI_SHOT: u32 = 6;
    pub const ATTACK_SPEED: f32 = 3.0;
    pub const RANGE: f32 = 520.0;
    pub const REGEN: u32 = 10;
    pub const ARMOR: u32 = 10;
    pub const SHIELD: u32 = 10;
    pub const IFRAME: u32 = 6;
    pub const BULLET_RESIST: u32 = 10;
    pub const HEAL_ON_KILL: u32 = 10;
    pub const KNOCKBACK: u32 = 10;
    pub const SLOW: u32 = 10;
    pub const BURN: u32 = 10;
    pub const DRONE: u32 = 10;
    pub const FEAR: u32 = 10;
    pub const FREEZE: u32 = 10;
    pub const AURA: u32 = 10;
    pub const PULSE: u32 = 10;
    pub const XP_GAIN: u32 = 12;
    pub const ORB_AFFINITY: u32 = 2;
    pub const EXTRA_ORB: u32 = 10;
    pub const MAGNET: u32 = 12;
    pub const PULL_SPEED: u32 = 10;
    pub const CREDITS: u32 = 10;
    pub const SPEED: u32 = 12;
    pub const DASH_CD: u32 = 10;
    pub const HANDLING: u32 = 10;
    pub const HITBOX: u32 = 8;
    pub const HP_PLUS: u32 = 18;
    pub const GAUSS: u32 = 8;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub max_hp: f32,
    pub hp: f32,
    pub speed: f32,
    pub damage: f32,
    /// Shots-per-interval multiplier
    pub attack_speed: f32,
    /// Pickup range
    pub range: f32,
    pub multi_shot: u32,
    pub knockback: f32,
    /// Spread in radians (lower is tighter)
    pub accuracy: f32,

    pub xp: f32,
    pub next_level_xp: f32,
    pub level: u32,
    pub coins: u32,

    pub shield: f32,
    pub max_shield: f32,

    pub gauss_level: u32,
    pub regen_level: u32,
    pub armor_level: u32,
    pub shield_level: u32,
    pub iframe_level: u32,
    pub bullet_resist_level: u32,
    pub heal_on_kill_level: u32,
    pub knockback_level: u32,
    pub slow_level: u32,
    pub burn_level: u32,
    pub drone_level: u32,
    pub fear_level: u32,
    pub freeze_level: u32,
    pub aura_level: u32,
    pub pulse_level: u32,
    pub xp_gain_level: u32,
    pub real_orb_affinity: u32,
    pub extra_orb_chance_level: u32,
    pub magnet_level: u32,
    pub pull_speed_level: u32,
    pub credits_level: u32,
    pub speed_level: u32,
    pub dash_cd_level: u32,
    pub handling_level: u32,
    pub hitbox_level: u32,
    pub hp_plus_level: u32,

    pub has_spray: bool,
    pub has_sniper: bool,
    pub has_glass_cannon: bool,
    pub has_tank: bool,
    pub has_dash: bool,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            max_hp: 100.0,
            hp: 100.0,
            speed: 4.0,
            damage: 3.0,
            attack_speed: 2.0,
            range: 200.0,
            multi_shot: 1,
            knockback: 1.0,
            accuracy: 0.02,
            xp: 0.0,
            next_level_xp: 40.0,
            level: 1,
            coins: 0,
            shield: 0.0,
            max_shield: 0.0,
            gauss_level: 1,
            regen_level: 0,
            armor_level: 0,
            shield_level: 0,
            iframe_level: 0,
            bullet_resist_level: 0,
            heal_on_kill_level: 0,
            knockback_level: 0,
            slow_level: 0,
            burn_level: 0,
            drone_level: 0,
            fear_level: 0,
            freeze_level: 0,
            aura_level: 0,
            pulse_level: 0,
            xp_gain_level: 0,
            real_orb_affinity: 0,
            extra_orb_chance_level: 0,
            magnet_level: 0,
            pull_speed_level: 0,
            credits_level: 0,
            speed_level: 0,
            dash_cd_level: 0,
            handling_level: 0,
            hitbox_level: 0,
            hp_plus_level: 0,
            has_spray: false,
            has_sniper: false,
            has_glass_cannon: false,
            has_tank: false,
            has_dash: false,
        }
    }
}

#[inline]
fn lvl(value: u32, cap: u32) -> f32 {
    value.min(cap) as f32
}

impl PlayerStats {
    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp > 0.0 {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Restore hp, never past max
    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount.max(0.0)).min(self.max_hp);
    }

    /// Armor damage reduction, capped at 30%
    pub fn armor_reduction(&self) -> f32 {
        (lvl(self.armor_level, caps::ARMOR) * 0.03).min(0.3)
    }

    pub fn bullet_resist(&self) -> f32 {
        lvl(self.bullet_resist_level, caps::BULLET_RESIST) * 0.03
    }

    /// Combined reduction for a hit, before the 80% ceiling
    pub fn damage_reduction(&self, is_bullet: bool) -> f32 {
        let dr = self.armor_reduction();
        if is_bullet {
            1.0 - (1.0 - dr) * (1.0 - self.bullet_resist())
        } else {
            dr
        }
    }

    /// Invulnerability after a hit, in seconds
    pub fn iframe_secs(&self) -> f32 {
        (0.22 + lvl(self.iframe_level, caps::IFRAME) * 0.04).min(0.52)
    }

    pub fn hitbox_reduction(&self) -> f32 {
        (lvl(self.hitbox_level, caps::HITBOX) * 0.025).min(0.20)
    }

    pub fn regen_fraction(&self) -> f32 {
        (0.006 + lvl(self.regen_level, caps::REGEN) * 0.009).min(0.12)
    }

    /// Fraction of max hp healed per kill; zero without the upgrade
    pub fn heal_on_kill_fraction(&self) -> f32 {
        if self.heal_on_kill_level == 0 {
            return 0.0;
        }
        0.01 + (lvl(self.heal_on_kill_level, caps::HEAL_ON_KILL) - 1.0) * 0.005
    }

    pub fn dash_cooldown_secs(&self) -> f32 {
        (3.0 * (1.0 - lvl(self.dash_cd_level, caps::DASH_CD) * 0.07)).max(1.2)
    }

    pub fn move_speed_mult(&self) -> f32 {
        1.0 + lvl(self.speed_level, caps::SPEED) * 0.04
    }

    /// Steering response while input is held
    pub fn handling_lerp(&self) -> f32 {
        (0.22 + lvl(self.handling_level, caps::HANDLING) * 0.07).min(1.0)
    }

    /// Velocity retained per reference frame without input
    pub fn handling_friction(&self) -> f32 {
        (0.95 - lvl(self.handling_level, caps::HANDLING) * 0.006).max(0.86)
    }

    pub fn magnet_range(&self) -> f32 {
        self.range.min(caps::RANGE) * (1.0 + lvl(self.magnet_level, caps::MAGNET) * 0.07)
    }

    pub fn pull_mult(&self) -> f32 {
        1.0 + lvl(self.pull_speed_level, caps::PULL_SPEED) * 0.10
    }

    pub fn credits_mult(&self) -> f32 {
        1.0 + lvl(self.credits_level, caps::CREDITS) * 0.08
    }

    pub fn xp_gain_mult(&self) -> f32 {
        1.0 + lvl(self.xp_gain_level, caps::XP_GAIN) * 0.06
    }

    pub fn extra_orb_chance(&self) -> f32 {
        lvl(self.extra_orb_chance_level, caps::EXTRA_ORB) * 0.06
    }

    /// Levels needed per additional real orb in a drop
    pub fn levels_per_real_orb(&self) -> u32 {
        let affinity = self.real_orb_affinity.min(caps::ORB_AFFINITY);
        5u32.saturating_sub(affinity * 2).max(1)
    }

    /// Extra enemies a player bullet passes through
    pub fn pierce(&self) -> u32 {
        let gauss = self.gauss_level.min(caps::GAUSS);
        u32::from(gauss >= 4) + u32::from(gauss >= 7)
    }

    pub fn shot_interval_ms(&self) -> f32 {
        500.0 / self.attack_speed.clamp(0.05, caps::ATTACK_SPEED)
    }

    pub fn pellets(&self) -> u32 {
        self.multi_shot.clamp(1, caps::MULTI_SHOT)
    }

    pub fn bullet_knockback(&self) -> f32 {
        (self.knockback + lvl(self.knockback_level, caps::KNOCKBACK) * 0.1) * 8.0
    }

    pub fn slow_on_hit(&self, boss: bool) -> f32 {
        lvl(self.slow_level, caps::SLOW) * if boss { 0.05 } else { 0.04 }
    }

    pub fn burn_on_hit_ms(&self) -> f32 {
        600.0 + lvl(self.burn_level, caps::BURN) * 160.0
    }

    pub fn drone_interval_ms(&self) -> f32 {
        let level = lvl(self.drone_level, caps::DRONE).max(1.0);
        900.0 / (1.0 + (level - 1.0) * 0.08)
    }

    pub fn drone_damage(&self) -> f32 {
        self.damage * (0.35 + lvl(self.drone_level, caps::DRONE) * 0.07)
    }

    pub fn fear_duration_ms(&self) -> f32 {
        700.0 + lvl(self.fear_level, caps::FEAR) * 100.0
    }

    pub fn freeze_duration_ms(&self) -> f32 {
        600.0 + lvl(self.freeze_level, caps::FREEZE) * 100.0
    }

    pub fn aura_radius(&self) -> f32 {
        36.0 + lvl(self.aura_level, caps::AURA) * 2.2
    }

    pub fn pulse_cooldown_ms(&self) -> f32 {
        8000.0 * (1.0 - lvl(self.pulse_level, caps::PULSE) * 0.04)
    }
}

/// Meta upgrades bought outside a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermanentBonuses {
    pub health: u32,
    pub damage: u32,
    pub speed: u32,
}
