//! Data-driven game balance
//!
//! Everything here has a default matching the shipped game. A JSON file
//! only needs the fields it overrides.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::enemy::EnemyKind;

/// Spawn weighting for one enemy archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeEntry {
    pub kind: EnemyKind,
    /// First round this archetype may appear
    pub min_round: u32,
    pub base_chance: f32,
    /// Added to the chance per round
    pub per_round: f32,
    pub max_chance: f32,
    /// Maximum alive at once
    pub cap: usize,
}

impl ArchetypeEntry {
    const fn new(
        kind: EnemyKind,
        min_round: u32,
        base_chance: f32,
        per_round: f32,
        max_chance: f32,
        cap: usize,
    ) -> Self {
        Self {
            kind,
            min_round,
            base_chance,
            per_round,
            max_chance,
            cap,
        }
    }

    /// Roll chance at `round`, or zero before `min_round`
    pub fn chance(&self, round: u32) -> f32 {
        if round < self.min_round {
            return 0.0;
        }
        (self.base_chance + round as f32 * self.per_round).min(self.max_chance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player_base_max_hp: f32,
    pub player_base_damage: f32,
    /// Damage of a player autofire bullet
    pub player_bullet_damage: f32,
    /// Scale autofire bullets with `PlayerStats::damage` instead
    pub bullet_damage_from_stats: bool,
    pub bullet_speed: f32,

    /// Spawn a boss every N rounds (0 disables)
    pub boss_every_rounds: u32,
    pub boss_base_hp: f32,
    pub boss_hp_per_round: f32,

    pub structure_target: usize,
    pub structure_check_ms: f64,
    pub structure_despawn_dist: f32,
    pub structure_dps_per_enemy: f32,

    /// Per-frame contact damage at round 0
    pub contact_base: f32,
    pub contact_per_round: f32,
    pub dash_contact_base: f32,
    pub dash_contact_per_round: f32,

    /// Special enemies rolled in order; anything that misses becomes swarm
    pub archetypes: Vec<ArchetypeEntry>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_base_max_hp: 100.0,
            player_base_damage: 3.0,
            player_bullet_damage: 3.0,
            bullet_damage_from_stats: false,
            bullet_speed: 16.0,
            boss_every_rounds: 0,
            boss_base_hp: 5000.0,
            boss_hp_per_round: 500.0,
            structure_target: 14,
            structure_check_ms: 3000.0,
            structure_despawn_dist: 2200.0,
            structure_dps_per_enemy: 12.0,
            contact_base: 0.95,
            contact_per_round: 0.028,
            dash_contact_base: 2.6,
            dash_contact_per_round: 0.055,
            archetypes: default_archetypes(),
        }
    }
}

/// Spawn table, rolled in order. The burst hunter entry reproduces the
/// classic two-kind mix; every entry after it is a balance choice for the
/// extra archetypes and can be dropped with [`Tuning::classic`] or a JSON
/// override.
fn default_archetypes() -> Vec<ArchetypeEntry> {
    use EnemyKind::*;
    vec![
        ArchetypeEntry::new(BurstHunter, 2, 0.10, 0.008, 0.22, 4),
        ArchetypeEntry::new(Dasher, 4, 0.04, 0.004, 0.12, 3),
        ArchetypeEntry::new(Flanker, 5, 0.04, 0.004, 0.12, 3),
        ArchetypeEntry::new(Gunner, 6, 0.03, 0.004, 0.10, 3),
        ArchetypeEntry::new(Bomber, 7, 0.03, 0.003, 0.10, 2),
        ArchetypeEntry::new(ShieldSupport, 8, 0.06, 0.0, 0.06, 1),
        ArchetypeEntry::new(Suppressor, 10, 0.04, 0.003, 0.08, 2),
        ArchetypeEntry::new(Sniper, 12, 0.03, 0.002, 0.07, 2),
        ArchetypeEntry::new(Summoner, 14, 0.05, 0.0, 0.05, 1),
    ]
}

impl Tuning {
    /// Default balance with only swarms and burst hunters spawning
    pub fn classic() -> Self {
        let mut tuning = Self::default();
        tuning.archetypes.retain(|entry| entry.kind == EnemyKind::BurstHunter);
        tuning
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Self = serde_json::from_str(json)?;
        log::debug!(
            "Loaded tuning: {} archetypes, boss every {} rounds",
            tuning.archetypes.len(),
            tuning.boss_every_rounds
        );
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Per-frame contact damage at `round`
    pub fn contact_damage(&self, round: u32, dashing: bool) -> f32 {
        let r = round as f32;
        if dashing {
            self.dash_contact_base + r * self.dash_contact_per_round
        } else {
            self.contact_base + r * self.contact_per_round
        }
    }

    pub fn boss_hp(&self, round: u32) -> f32 {
        self.boss_base_hp + round as f32 * self.boss_hp_per_round
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let t = Tuning::from_json(r#"{"boss_every_rounds": 5, "player_bullet_damage": 7}"#).unwrap();
        assert_eq!(t.boss_every_rounds, 5);
        assert_eq!(t.player_bullet_damage, 7.0);
        assert_eq!(t.player_base_max_hp, 100.0);
        assert_eq!(t.archetypes.len(), 9);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = Tuning::from_json("{ nope").unwrap_err();
        assert!(matches!(err, crate::SimError::Config(_)));
    }

    #[test]
    fn test_contact_damage_round_one() {
        let t = Tuning::default();
        assert!((t.contact_damage(1, false) - 0.978).abs() < 1e-6);
        assert!((t.contact_damage(1, true) - 2.655).abs() < 1e-6);
    }

    #[test]
    fn test_archetype_chance_ramps_and_caps() {
        let t = Tuning::default();
        let hunter = &t.archetypes[0];
        assert_eq!(hunter.chance(1), 0.0);
        assert!((hunter.chance(2) - 0.116).abs() < 1e-6);
        assert!((hunter.chance(40) - 0.22).abs() < 1e-6);
    }

    #[test]
    fn test_tuning_json_roundtrip_preserves_table() {
        let t = Tuning::default();
        let back = Tuning::from_json(&t.to_json().unwrap()).unwrap();
        assert_eq!(t, back);
    }
}
