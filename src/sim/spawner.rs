//! Spawn pacing, spawn placement and structure placement
//!
//! The difficulty controller is a handful of pure functions of the round so
//! the orchestrator only has to hold timestamps.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::rects_overlap;
use super::enemy::EnemyKind;
use super::pickup::{Structure, StructureKind};
use crate::consts::{DEMO_ENEMY_LIMIT, MAX_ENEMIES};
use crate::tuning::Tuning;

/// Distance beyond the view edge at which enemies appear
const SPAWN_MARGIN: f32 = 40.0;
const DOGPILE_RADIUS: f32 = 170.0;
const STRUCTURE_PLACE_TRIES: usize = 20;
const STRUCTURE_ENEMY_CLEARANCE: f32 = 120.0;
const MAX_STRUCTURE_REFILL: usize = 3;

/// Ring bands for structure placement: (min radius, max radius)
pub const NEAR_RING: (f32, f32) = (180.0, 320.0);
pub const MID_RING: (f32, f32) = (500.0, 750.0);
pub const FAR_RING: (f32, f32) = (900.0, 1300.0);

/// Enemy ceiling that grows with the round
pub fn dynamic_cap(round: u32) -> usize {
    22 + (round as f32 * 1.35).floor() as usize
}

pub fn enemy_limit(round: u32, demo: bool) -> usize {
    if demo {
        DEMO_ENEMY_LIMIT
    } else {
        MAX_ENEMIES.min(dynamic_cap(round))
    }
}

/// Base milliseconds between spawns
pub fn spawn_interval_ms(round: u32, demo: bool) -> f32 {
    if demo {
        1200.0
    } else {
        (1100.0 - round as f32 * 24.0).max(450.0)
    }
}

/// Slow spawning down while the player is already swarmed
pub fn dogpile_factor(crowd_near_player: usize) -> f32 {
    if crowd_near_player >= 10 {
        1.35
    } else if crowd_near_player >= 7 {
        1.18
    } else {
        1.0
    }
}

/// Effective interval including the crowd slowdown (not applied in demos or
/// with ten or fewer enemies alive)
pub fn effective_interval_ms<I>(round: u32, demo: bool, player: Vec2, enemies: I) -> f32
where
    I: ExactSizeIterator<Item = Vec2>,
{
    let base = spawn_interval_ms(round, demo);
    if demo || enemies.len() <= 10 {
        return base;
    }
    let r_sq = DOGPILE_RADIUS * DOGPILE_RADIUS;
    let near = enemies.filter(|p| p.distance_squared(player) < r_sq).count();
    base * dogpile_factor(near)
}

/// Random point just outside the player-centred view
pub fn edge_position(player: Vec2, view: Vec2, rng: &mut Pcg32) -> Vec2 {
    let half = view * 0.5 + Vec2::splat(SPAWN_MARGIN);
    let along = rng.random::<f32>() - 0.5;
    match rng.random_range(0..4) {
        0 => Vec2::new(player.x - half.x, player.y + along * (view.y + SPAWN_MARGIN * 2.0)),
        1 => Vec2::new(player.x + half.x, player.y + along * (view.y + SPAWN_MARGIN * 2.0)),
        2 => Vec2::new(player.x + along * (view.x + SPAWN_MARGIN * 2.0), player.y - half.y),
        _ => Vec2::new(player.x + along * (view.x + SPAWN_MARGIN * 2.0), player.y + half.y),
    }
}

/// What to spawn and with which round-scaled stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlan {
    pub kind: EnemyKind,
    pub hp: f32,
    pub speed: f32,
}

/// Round-scaled hp and speed for `kind`
pub fn scaled_stats(kind: EnemyKind, round: u32) -> (f32, f32) {
    let r = round as f32;
    let over20 = round.saturating_sub(20) as f32;
    let params = kind.params();
    match kind {
        EnemyKind::Swarm => {
            let hp = params.hp_base * (1.0 + (r - 1.0) * 0.035 + over20 * 0.010);
            let base = 1.15 + r * 0.032;
            let scale = 1.0 + (r - 1.0) * 0.006 + over20 * 0.002;
            (hp, (base * scale * 1.35).min(4.2))
        }
        _ => {
            let hp = params.hp_base * (1.0 + (r - 1.0) * 0.030 + over20 * 0.010);
            let speed = ((1.05 + r * 0.028) * 0.95 * params.speed_mult).min(3.2);
            (hp, speed)
        }
    }
}

/// Roll the archetype table in order; anything that misses is swarm.
///
/// `alive` reports how many of a kind are currently alive.
pub fn plan_spawn<F>(tuning: &Tuning, round: u32, alive: F, rng: &mut Pcg32) -> SpawnPlan
where
    F: Fn(EnemyKind) -> usize,
{
    let kind = tuning
        .archetypes
        .iter()
        .find(|entry| {
            let chance = entry.chance(round);
            chance > 0.0 && alive(entry.kind) < entry.cap && rng.random::<f32>() < chance
        })
        .map(|entry| entry.kind)
        .unwrap_or(EnemyKind::Swarm);
    let (hp, speed) = scaled_stats(kind, round);
    SpawnPlan { kind, hp, speed }
}

/// Try to place one structure in a ring around `center`.
///
/// Rejected if its box would overlap another structure or sit within 120 of
/// an enemy.
pub fn place_structure(
    id: u32,
    center: Vec2,
    (min_r, max_r): (f32, f32),
    existing: &[Structure],
    enemies: &[Vec2],
    rng: &mut Pcg32,
) -> Option<Structure> {
    for _ in 0..STRUCTURE_PLACE_TRIES {
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let dist = min_r + rng.random::<f32>() * (max_r - min_r);
        let pos = center + Vec2::from_angle(angle) * dist;
        let candidate = Structure::new(id, StructureKind::from_roll(rng.random()), pos);

        if existing.iter().any(|s| rects_overlap(&s.rect, &candidate.rect)) {
            continue;
        }
        let clear = STRUCTURE_ENEMY_CLEARANCE * STRUCTURE_ENEMY_CLEARANCE;
        if enemies.iter().any(|e| e.distance_squared(pos) < clear) {
            continue;
        }
        return Some(candidate);
    }
    None
}

/// How many structures a maintenance pass should try to add
pub fn refill_count(current: usize, target: usize) -> usize {
    target.saturating_sub(current).min(MAX_STRUCTURE_REFILL)
}

/// Initial count per ring: (ring, min count, max count)
pub const INITIAL_RINGS: [((f32, f32), u32, u32); 3] =
    [(NEAR_RING, 2, 3), (MID_RING, 3, 4), (FAR_RING, 4, 6)];

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn test_limits_and_intervals() {
        assert_eq!(dynamic_cap(1), 23);
        assert_eq!(dynamic_cap(27), 58);
        assert_eq!(enemy_limit(100, false), 80);
        assert_eq!(enemy_limit(100, true), 25);
        assert_eq!(spawn_interval_ms(1, false), 1076.0);
        assert_eq!(spawn_interval_ms(40, false), 450.0);
        assert_eq!(spawn_interval_ms(1, true), 1200.0);
    }

    #[test]
    fn test_dogpile_only_with_crowd() {
        let crowd: Vec<Vec2> = (0..12).map(|i| Vec2::new(i as f32, 0.0)).collect();
        let slowed = effective_interval_ms(1, false, Vec2::ZERO, crowd.iter().copied());
        assert!((slowed - 1076.0 * 1.35).abs() < 1e-3);
        let demo = effective_interval_ms(1, true, Vec2::ZERO, crowd.iter().copied());
        assert_eq!(demo, 1200.0);
        let few = effective_interval_ms(1, false, Vec2::ZERO, crowd[..10].iter().copied());
        assert_eq!(few, 1076.0);
    }

    #[test]
    fn test_round_one_is_all_swarm() {
        let mut rng = Pcg32::seed_from_u64(9);
        let tuning = Tuning::default();
        for _ in 0..50 {
            let plan = plan_spawn(&tuning, 1, |_| 0, &mut rng);
            assert_eq!(plan.kind, EnemyKind::Swarm);
        }
    }

    #[test]
    fn test_archetype_cap_respected() {
        let mut rng = Pcg32::seed_from_u64(9);
        let tuning = Tuning::default();
        for _ in 0..200 {
            let plan = plan_spawn(
                &tuning,
                30,
                |k| if k == EnemyKind::BurstHunter { 4 } else { 0 },
                &mut rng,
            );
            assert_ne!(plan.kind, EnemyKind::BurstHunter);
        }
    }

    #[test]
    fn test_classic_table_spawns_two_kinds() {
        let mut rng = Pcg32::seed_from_u64(11);
        let tuning = Tuning::classic();
        let mut hunters = 0;
        for _ in 0..300 {
            let plan = plan_spawn(&tuning, 30, |_| 0, &mut rng);
            assert!(matches!(plan.kind, EnemyKind::Swarm | EnemyKind::BurstHunter));
            hunters += usize::from(plan.kind == EnemyKind::BurstHunter);
        }
        assert!(hunters > 0);
    }

    #[test]
    fn test_swarm_and_hunter_scaling() {
        let (hp, speed) = scaled_stats(EnemyKind::Swarm, 1);
        assert!((hp - 16.0).abs() < 1e-4);
        assert!((speed - 1.182 * 1.35).abs() < 1e-4);
        let (hp, speed) = scaled_stats(EnemyKind::BurstHunter, 2);
        assert!((hp - 41.2).abs() < 1e-4);
        assert!((speed - 1.106 * 0.95).abs() < 1e-4);
        assert_eq!(scaled_stats(EnemyKind::Swarm, 200).1, 4.2);
    }

    #[test]
    fn test_structure_placement_respects_clearance() {
        let mut rng = Pcg32::seed_from_u64(2);
        let placed = place_structure(1, Vec2::ZERO, NEAR_RING, &[], &[], &mut rng);
        let s = placed.expect("open field");
        let d = s.center().length();
        assert!((NEAR_RING.0..=NEAR_RING.1).contains(&d));

        // Enemies everywhere on the ring
        let blockers: Vec<Vec2> = (0..64)
            .map(|i| Vec2::from_angle(i as f32 / 64.0 * std::f32::consts::TAU) * 250.0)
            .collect();
        assert!(place_structure(2, Vec2::ZERO, NEAR_RING, &[], &blockers, &mut rng).is_none());
        assert_eq!(refill_count(12, 14), 2);
        assert_eq!(refill_count(0, 14), 3);
        assert_eq!(refill_count(20, 14), 0);
    }

    proptest! {
        #[test]
        fn test_edge_position_outside_view(seed in any::<u64>(), w in 200.0f32..2000.0, h in 200.0f32..2000.0) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let p = edge_position(Vec2::ZERO, Vec2::new(w, h), &mut rng);
            prop_assert!(p.x.abs() >= w / 2.0 + 39.9 || p.y.abs() >= h / 2.0 + 39.9);
        }
    }
}
