//! Upgrade catalog
//!
//! An immutable table of upgrades keyed by [`UpgradeId`]. Applying an
//! upgrade is a pure `PlayerStats -> PlayerStats` transform; every levelled
//! field is clamped to its cap inside `apply`.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::stats::{PlayerStats, caps};

/// Number of choices offered on level-up
pub const OFFER_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeId {
    Gauss,
    Hp,
    HpPlus,
    Dmg,
    Ms,
    Atk,
    Rng,
    Regen,
    Armor,
    Shield,
    Iframes,
    BulletResist,
    HealKill,
    KnockbackPlus,
    SlowShot,
    BurnShot,
    Spray,
    Sniper,
    GlassCannon,
    Tank,
    Drone,
    Fear,
    Freeze,
    Aura,
    Pulse,
    XpGain,
    OrbAffinity,
    ExtraOrb,
    MagnetPlus,
    PullSpeed,
    CreditsPlus,
    SpeedPlus,
    DashUnlock,
    DashCd,
    Handling,
    HitboxReduction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKind {
    Stat,
    Weapon,
}

/// Static catalog entry
#[derive(Debug, Clone, Copy)]
pub struct Upgrade {
    pub id: UpgradeId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub kind: UpgradeKind,
    pub rare: bool,
    /// None for upgrades that can be taken indefinitely
    pub max_level: Option<u32>,
}

const fn entry(
    id: UpgradeId,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    kind: UpgradeKind,
    rare: bool,
    max_level: Option<u32>,
) -> Upgrade {
    Upgrade {
        id,
        name,
        description,
        icon,
        kind,
        rare,
        max_level,
    }
}

use UpgradeId as U;
use UpgradeKind::{Stat, Weapon};

pub static CATALOG: &[Upgrade] = &[
    entry(U::Gauss, "Gauss Cannon", "Evolves the main gun up to Lv 8: damage, fire rate, pierce, overcharge.", "🧲", Stat, false, Some(caps::GAUSS)),
    entry(U::Hp, "Nano-Reinforcement", "Max HP +20", "🔋", Stat, false, None),
    entry(U::HpPlus, "HP +", "Max HP +10 per level (Max +180).", "❤️", Stat, false, Some(caps::HP_PLUS)),
    entry(U::Dmg, "Laser Overclock", "Damage +5", "⚡", Stat, false, None),
    entry(U::Ms, "Splitter Core", "Multi-Shot +1 (Max 6)", "🔱", Stat, false, Some(caps::MULTI_SHOT)),
    entry(U::Atk, "Fast Reloader", "Attack Speed +9% (Cap 3.0x)", "🔫", Stat, false, None),
    entry(U::Rng, "Magnet Core", "Pickup Range +15% (Cap 520)", "🧲", Stat, false, None),
    entry(U::Regen, "Regen", "Heal (0.6% + 0.9%/lvl) Max HP every 10s (Max 12%).", "🏥", Stat, false, Some(caps::REGEN)),
    entry(U::Armor, "Armor", "Damage Reduction +3% per level (Max 30%).", "🛡️", Stat, false, Some(caps::ARMOR)),
    entry(U::Shield, "Shield", "Extra energy layer. Recharges after 3s without damage.", "💎", Stat, false, Some(caps::SHIELD)),
    entry(U::Iframes, "I-Frames", "Invulnerability after taking damage +0.04s per level.", "👻", Stat, false, Some(caps::IFRAME)),
    entry(U::BulletResist, "Bullet Resist", "Reduces damage from projectiles by 3% per level (Max 30%).", "🛑", Stat, false, Some(caps::BULLET_RESIST)),
    entry(U::HealKill, "Heal On Kill", "Heal 1% +0.5%/lvl of Max HP on every kill (Max 5.5%).", "🩸", Stat, false, Some(caps::HEAL_ON_KILL)),
    entry(U::KnockbackPlus, "Knockback", "Increases bullet impact force by +10% per level.", "👊", Stat, false, Some(caps::KNOCKBACK)),
    entry(U::SlowShot, "Slow Shot", "Bullets slow enemy speed by +4% per level for 1.2s.", "🧊", Stat, false, Some(caps::SLOW)),
    entry(U::BurnShot, "Burn", "Bullets ignite enemies. Duration increases with level.", "🔥", Stat, false, Some(caps::BURN)),
    entry(U::Spray, "Neural Spray", "Fire Rate +55%, Damage -25%, Spread +25%", "🤑", Stat, true, Some(1)),
    entry(U::Sniper, "Neural Sniper", "Damage +100%, Fire Rate -25%, Precision +50%", "🎯", Stat, true, Some(1)),
    entry(U::GlassCannon, "Glass Cannon", "Damage +55%, Max HP -25%", "💎", Stat, true, Some(1)),
    entry(U::Tank, "The Tank", "Max HP +45%, Fire Rate -15%", "🛡️", Stat, true, Some(1)),
    entry(U::Drone, "Combat Drone", "Auto-firing orbiting turret. Level up for speed and damage.", "🤖", Weapon, false, Some(caps::DRONE)),
    entry(U::Fear, "Neuro Fear", "Every 10s, nearby enemies retreat. Level up for duration.", "😱", Stat, false, Some(caps::FEAR)),
    entry(U::Freeze, "Cryo Pulse", "Every 12s, freeze nearby enemies. Level up for duration.", "❄️", Stat, false, Some(caps::FREEZE)),
    entry(U::Aura, "Damage Aura", "Damages nearby enemies every 0.2s. Radius grows with level.", "⭕", Stat, false, Some(caps::AURA)),
    entry(U::Pulse, "Shockwave Pulse", "Every 8s, a wave pushes and damages enemies.", "💥", Stat, false, Some(caps::PULSE)),
    entry(U::XpGain, "XP Amplifier", "XP from real orbs +6% per level (Max 12).", "📈", Stat, false, Some(caps::XP_GAIN)),
    entry(U::OrbAffinity, "Real Orb Affinity", "Fewer levels needed for more real XP orbs.", "💠", Stat, false, Some(caps::ORB_AFFINITY)),
    entry(U::ExtraOrb, "Visual Overload", "Chance to spawn a bonus orb +6% per level.", "✨", Stat, false, Some(caps::EXTRA_ORB)),
    entry(U::MagnetPlus, "Magnet +", "Magnet radius +7% per level.", "🧭", Stat, false, Some(caps::MAGNET)),
    entry(U::PullSpeed, "Pickup Speed", "Magnet force +10% per level.", "🧲", Stat, false, Some(caps::PULL_SPEED)),
    entry(U::CreditsPlus, "Credits +", "Credits earned +8% per level.", "💎", Stat, false, Some(caps::CREDITS)),
    entry(U::SpeedPlus, "Speed +", "Movement speed +4% per level (Max 48%).", "🏃", Stat, false, Some(caps::SPEED)),
    entry(U::DashUnlock, "Dash", "Unlocks a quick dash. Use Shift or the button.", "💨", Weapon, true, Some(1)),
    entry(U::DashCd, "Dash CD -", "Dash cooldown -7% per level.", "⏲️", Stat, false, Some(caps::DASH_CD)),
    entry(U::Handling, "Handling", "Acceleration and turn response up per level.", "🕹️", Stat, false, Some(caps::HANDLING)),
    entry(U::HitboxReduction, "Hitbox -", "Collision radius -2.5% per level (Max 20%).", "🎯", Stat, false, Some(caps::HITBOX)),
];

#[inline]
fn bump(level: u32, cap: u32) -> u32 {
    (level + 1).min(cap)
}

impl UpgradeId {
    pub fn all() -> impl Iterator<Item = UpgradeId> {
        CATALOG.iter().map(|u| u.id)
    }

    pub fn info(self) -> &'static Upgrade {
        // CATALOG lists every variant exactly once
        CATALOG
            .iter()
            .find(|u| u.id == self)
            .unwrap_or(&CATALOG[0])
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    /// Apply this upgrade, returning the new stats
    pub fn apply(self, s: &PlayerStats) -> PlayerStats {
        let mut n = s.clone();
        match self {
            U::Gauss => {
                if s.gauss_level >= caps::GAUSS {
                    return n;
                }
                n.gauss_level = s.gauss_level + 1;
                match n.gauss_level {
                    2 | 5 => n.damage *= 1.15,
                    3 | 6 => n.attack_speed *= 1.10,
                    // 4 and 7 add pierce, 8 overcharges; both read gauss_level at fire time
                    _ => {}
                }
            }
            U::Hp => {
                n.max_hp += 20.0;
                n.hp += 20.0;
            }
            U::HpPlus => {
                if s.hp_plus_level >= caps::HP_PLUS {
                    return n;
                }
                n.hp_plus_level += 1;
                n.max_hp += 10.0;
                n.hp += 10.0;
            }
            U::Dmg => n.damage += 5.0,
            U::Ms => n.multi_shot = bump(s.multi_shot, caps::MULTI_SHOT),
            U::Atk => n.attack_speed = (s.attack_speed * 1.09).min(caps::ATTACK_SPEED),
            U::Rng => n.range = (s.range * 1.15).min(caps::RANGE),
            U::Regen => n.regen_level = bump(s.regen_level, caps::REGEN),
            U::Armor => n.armor_level = bump(s.armor_level, caps::ARMOR),
            U::Shield => {
                if s.shield_level >= caps::SHIELD {
                    return n;
                }
                n.shield_level += 1;
                n.max_shield = 20.0 + n.shield_level as f32 * 10.0;
                n.shield = (s.shield + 10.0).min(n.max_shield);
            }
            U::Iframes => n.iframe_level = bump(s.iframe_level, caps::IFRAME),
            U::BulletResist => n.bullet_resist_level = bump(s.bullet_resist_level, caps::BULLET_RESIST),
            U::HealKill => n.heal_on_kill_level = bump(s.heal_on_kill_level, caps::HEAL_ON_KILL),
            U::KnockbackPlus => n.knockback_level = bump(s.knockback_level, caps::KNOCKBACK),
            U::SlowShot => n.slow_level = bump(s.slow_level, caps::SLOW),
            U::BurnShot => n.burn_level = bump(s.burn_level, caps::BURN),
            U::Spray => {
                n.attack_speed = (s.attack_speed * 1.55).min(caps::ATTACK_SPEED);
                n.damage = (s.damage * 0.75).max(1.0);
                n.accuracy = (s.accuracy * 1.25).min(0.35);
                n.knockback = s.knockback * 1.15;
                n.has_spray = true;
            }
            U::Sniper => {
                n.damage = s.damage * 2.0;
                n.attack_speed = s.attack_speed * 0.75;
                n.accuracy = s.accuracy * 0.5;
                n.has_sniper = true;
            }
            U::GlassCannon => {
                let max_hp = (s.max_hp * 0.75).floor().max(10.0);
                n.damage = s.damage * 1.55;
                n.max_hp = max_hp;
                n.hp = s.hp.min(max_hp);
                n.has_glass_cannon = true;
            }
            U::Tank => {
                n.max_hp = (s.max_hp * 1.45).floor();
                n.hp = s.hp + (s.max_hp * 0.45).floor();
                n.attack_speed = s.attack_speed * 0.85;
                n.has_tank = true;
            }
            U::Drone => n.drone_level = bump(s.drone_level, caps::DRONE),
            U::Fear => n.fear_level = bump(s.fear_level, caps::FEAR),
            U::Freeze => n.freeze_level = bump(s.freeze_level, caps::FREEZE),
            U::Aura => n.aura_level = bump(s.aura_level, caps::AURA),
            U::Pulse => n.pulse_level = bump(s.pulse_level, caps::PULSE),
            U::XpGain => n.xp_gain_level = bump(s.xp_gain_level, caps::XP_GAIN),
            U::OrbAffinity => n.real_orb_affinity = bump(s.real_orb_affinity, caps::ORB_AFFINITY),
            U::ExtraOrb => n.extra_orb_chance_level = bump(s.extra_orb_chance_level, caps::EXTRA_ORB),
            U::MagnetPlus => n.magnet_level = bump(s.magnet_level, caps::MAGNET),
            U::PullSpeed => n.pull_speed_level = bump(s.pull_speed_level, caps::PULL_SPEED),
            U::CreditsPlus => n.credits_level = bump(s.credits_level, caps::CREDITS),
            U::SpeedPlus => n.speed_level = bump(s.speed_level, caps::SPEED),
            U::DashUnlock => n.has_dash = true,
            U::DashCd => n.dash_cd_level = bump(s.dash_cd_level, caps::DASH_CD),
            U::Handling => n.handling_level = bump(s.handling_level, caps::HANDLING),
            U::HitboxReduction => n.hitbox_level = bump(s.hitbox_level, caps::HITBOX),
        }
        n
    }

    /// Whether this upgrade can still be offered
    pub fn is_eligible(self, s: &PlayerStats) -> bool {
        match self {
            U::Gauss => s.gauss_level < caps::GAUSS,
            U::Hp | U::Dmg | U::Atk | U::Rng => true,
            U::HpPlus => s.hp_plus_level < caps::HP_PLUS,
            U::Ms => s.multi_shot < caps::MULTI_SHOT,
            U::Regen => s.regen_level < caps::REGEN,
            U::Armor => s.armor_level < caps::ARMOR,
            U::Shield => s.shield_level < caps::SHIELD,
            U::Iframes => s.iframe_level < caps::IFRAME,
            U::BulletResist => s.bullet_resist_level < caps::BULLET_RESIST,
            U::HealKill => s.heal_on_kill_level < caps::HEAL_ON_KILL,
            U::KnockbackPlus => s.knockback_level < caps::KNOCKBACK,
            U::SlowShot => s.slow_level < caps::SLOW,
            U::BurnShot => s.burn_level < caps::BURN,
            U::Spray => !s.has_spray,
            U::Sniper => !s.has_sniper,
            U::GlassCannon => !s.has_glass_cannon,
            U::Tank => !s.has_tank,
            U::Drone => s.drone_level < caps::DRONE,
            U::Fear => s.fear_level < caps::FEAR,
            U::Freeze => s.freeze_level < caps::FREEZE,
            U::Aura => s.aura_level < caps::AURA,
            U::Pulse => s.pulse_level < caps::PULSE,
            U::XpGain => s.xp_gain_level < caps::XP_GAIN,
            U::OrbAffinity => s.real_orb_affinity < caps::ORB_AFFINITY,
            U::ExtraOrb => s.extra_orb_chance_level < caps::EXTRA_ORB,
            U::MagnetPlus => s.magnet_level < caps::MAGNET,
            U::PullSpeed => s.pull_speed_level < caps::PULL_SPEED,
            U::CreditsPlus => s.credits_level < caps::CREDITS,
            U::SpeedPlus => s.speed_level < caps::SPEED,
            U::DashUnlock => !s.has_dash,
            U::DashCd => s.has_dash && s.dash_cd_level < caps::DASH_CD,
            U::Handling => s.handling_level < caps::HANDLING,
            U::HitboxReduction => s.hitbox_level < caps::HITBOX,
        }
    }
}

/// Every upgrade that may currently be offered
pub fn eligible(stats: &PlayerStats) -> Vec<UpgradeId> {
    UpgradeId::all().filter(|id| id.is_eligible(stats)).collect()
}

/// Shuffled draw of up to [`OFFER_SIZE`] eligible upgrades
pub fn draw_offer<R: Rng + ?Sized>(stats: &PlayerStats, rng: &mut R) -> Vec<UpgradeId> {
    let mut pool = eligible(stats);
    pool.shuffle(rng);
    pool.truncate(OFFER_SIZE);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_lists_each_id_once() {
        let ids: HashSet<UpgradeId> = UpgradeId::all().collect();
        assert_eq!(ids.len(), CATALOG.len());
        assert_eq!(UpgradeId::HitboxReduction.info().id, UpgradeId::HitboxReduction);
    }

    #[test]
    fn test_apply_is_pure() {
        let stats = PlayerStats::default();
        let next = UpgradeId::Dmg.apply(&stats);
        assert_eq!(stats.damage, 3.0);
        assert_eq!(next.damage, 8.0);
    }

    #[test]
    fn test_levelled_fields_clamp() {
        let mut stats = PlayerStats::default();
        for _ in 0..20 {
            stats = UpgradeId::Ms.apply(&stats);
            stats = UpgradeId::OrbAffinity.apply(&stats);
            stats = UpgradeId::Iframes.apply(&stats);
            stats = UpgradeId::Gauss.apply(&stats);
            stats = UpgradeId::Atk.apply(&stats);
        }
        assert_eq!(stats.multi_shot, 6);
        assert_eq!(stats.real_orb_affinity, 2);
        assert_eq!(stats.iframe_level, 6);
        assert_eq!(stats.gauss_level, 8);
        assert!(stats.attack_speed <= 3.0);
    }

    #[test]
    fn test_gauss_milestones() {
        let mut stats = PlayerStats::default();
        stats = UpgradeId::Gauss.apply(&stats);
        assert!((stats.damage - 3.45).abs() < 1e-5);
        stats = UpgradeId::Gauss.apply(&stats);
        assert!((stats.attack_speed - 2.2).abs() < 1e-5);
        stats = UpgradeId::Gauss.apply(&stats);
        assert_eq!(stats.pierce(), 1);
    }

    #[test]
    fn test_shield_upgrade_grants_charge() {
        let stats = UpgradeId::Shield.apply(&PlayerStats::default());
        assert_eq!(stats.shield_level, 1);
        assert_eq!(stats.max_shield, 30.0);
        assert_eq!(stats.shield, 10.0);
    }

    #[test]
    fn test_glass_cannon_clamps_hp() {
        let stats = UpgradeId::GlassCannon.apply(&PlayerStats::default());
        assert_eq!(stats.max_hp, 75.0);
        assert_eq!(stats.hp, 75.0);
        assert!(!UpgradeId::GlassCannon.is_eligible(&stats));
    }

    #[test]
    fn test_dash_cd_requires_dash() {
        let stats = PlayerStats::default();
        assert!(!eligible(&stats).contains(&UpgradeId::DashCd));
        let stats = UpgradeId::DashUnlock.apply(&stats);
        let pool = eligible(&stats);
        assert!(pool.contains(&UpgradeId::DashCd));
        assert!(!pool.contains(&UpgradeId::DashUnlock));
    }

    #[test]
    fn test_draw_offer_is_three_distinct_eligible() {
        let mut rng = Pcg32::seed_from_u64(7);
        let stats = PlayerStats {
            has_spray: true,
            ..PlayerStats::default()
        };
        for _ in 0..50 {
            let offer = draw_offer(&stats, &mut rng);
            assert_eq!(offer.len(), OFFER_SIZE);
            let unique: HashSet<_> = offer.iter().collect();
            assert_eq!(unique.len(), OFFER_SIZE);
            assert!(!offer.contains(&UpgradeId::Spray));
            assert!(!offer.contains(&UpgradeId::DashCd));
        }
    }
}
