//! Boss encounter
//!
//! A single large enemy cycling through timed attack phases. It shares the
//! status component with regular enemies but runs its own state machine.

use std::f32::consts::FRAC_PI_4;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::beam_hits;
use super::entity::{Body, palette};
use super::status::StatusEffects;
use crate::direction_to;

pub const BOSS_RADIUS: f32 = 60.0;
pub const BOSS_SPEED: f32 = 0.5;
pub const BOSS_BULLET_DAMAGE: f32 = 6.0;
pub const BOSS_BULLET_SPEED: f32 = 10.5;
/// Damage taken multiplier while vulnerable
pub const VULNERABLE_DAMAGE_MULT: f32 = 1.5;

pub const BEAM_LENGTH: f32 = 2000.0;
pub const BEAM_HALF_WIDTH: f32 = 20.0;
const RADIAL_BEAMS: usize = 8;
const KEEP_DISTANCE: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    Entering,
    Idle,
    Burst,
    SpinLaser,
    RadialLaser,
    Vulnerable,
}

/// One laser for the render snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamView {
    pub angle: f32,
    /// False while the beam is only telegraphed
    pub live: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub body: Body,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    pub phase: BossPhase,
    /// Time spent in the current phase
    pub state_ms: f32,
    pub attack_ms: f32,
    pub laser_angle: f32,
    pub status: StatusEffects,
}

impl Boss {
    pub fn new(pos: Vec2, hp: f32) -> Self {
        Self {
            body: Body::new(pos, BOSS_RADIUS, palette::BOSS),
            hp,
            max_hp: hp,
            speed: BOSS_SPEED,
            phase: BossPhase::Entering,
            state_ms: 0.0,
            attack_ms: 0.0,
            laser_angle: 0.0,
            status: StatusEffects::default(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn is_enraged(&self) -> bool {
        self.hp < self.max_hp * 0.5
    }

    pub fn is_vulnerable(&self) -> bool {
        self.phase == BossPhase::Vulnerable
    }

    /// Multiplier applied to incoming bullet damage
    pub fn damage_taken_mult(&self) -> f32 {
        if self.is_vulnerable() { VULNERABLE_DAMAGE_MULT } else { 1.0 }
    }

    fn enter(&mut self, phase: BossPhase) {
        self.phase = phase;
        self.state_ms = 0.0;
        self.attack_ms = 0.0;
    }

    /// Advance one frame. Returns the number of bullets to fire at the player.
    pub fn update(&mut self, player_pos: Vec2, dt_ms: f32, time_mult: f32, rng: &mut Pcg32) -> u32 {
        let tick = self.status.tick(dt_ms);
        if tick.frozen {
            return 0;
        }
        self.hp -= tick.burn_damage;
        self.state_ms += dt_ms;

        let sm = if self.is_enraged() { 1.5 } else { 1.0 };
        let s = self.speed * sm * tick.speed_mult;
        let (dir, dist) = direction_to(self.body.pos, player_pos);
        if dist > KEEP_DISTANCE {
            let sign = if tick.feared { -1.0 } else { 1.0 };
            self.body.pos += dir * s * time_mult * sign;
        }
        if tick.feared {
            return 0;
        }

        let mut shots = 0;
        match self.phase {
            BossPhase::Entering => {
                if self.state_ms > 2000.0 {
                    self.enter(BossPhase::Idle);
                }
            }
            BossPhase::Idle => {
                if self.state_ms > 2000.0 / sm {
                    let roll = rng.random::<f32>();
                    let next = if roll < 0.4 {
                        BossPhase::Burst
                    } else if roll < 0.7 {
                        BossPhase::SpinLaser
                    } else {
                        BossPhase::RadialLaser
                    };
                    log::trace!("Boss attack: {next:?}");
                    self.enter(next);
                }
            }
            BossPhase::Burst => {
                self.attack_ms += dt_ms;
                if self.attack_ms > 200.0 / sm {
                    shots += 1;
                    self.attack_ms = 0.0;
                }
                if self.state_ms > 2500.0 {
                    self.enter(BossPhase::Idle);
                }
            }
            BossPhase::SpinLaser => {
                self.laser_angle += 0.03 * sm * time_mult;
                if self.state_ms > 4000.0 {
                    self.enter(BossPhase::Vulnerable);
                }
            }
            BossPhase::RadialLaser => {
                if self.state_ms > 3000.0 {
                    self.enter(BossPhase::Vulnerable);
                }
            }
            BossPhase::Vulnerable => {
                if self.state_ms > 3000.0 {
                    self.enter(BossPhase::Idle);
                }
            }
        }
        shots
    }

    /// Current lasers, telegraphed or live
    pub fn beams(&self) -> Vec<BeamView> {
        match self.phase {
            BossPhase::SpinLaser => vec![BeamView {
                angle: self.laser_angle,
                live: self.state_ms > 500.0,
            }],
            BossPhase::RadialLaser => (0..RADIAL_BEAMS)
                .map(|i| BeamView {
                    angle: FRAC_PI_4 * i as f32,
                    live: self.state_ms > 1000.0,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Whether a live laser crosses `target`
    pub fn laser_hits(&self, target: Vec2) -> bool {
        self.beams().iter().filter(|b| b.live).any(|b| {
            beam_hits(self.body.pos, b.angle, BEAM_LENGTH, BEAM_HALF_WIDTH, target, 0.0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn run(boss: &mut Boss, player: Vec2, frames: usize, rng: &mut Pcg32) -> u32 {
        (0..frames).map(|_| boss.update(player, 16.66, 1.0, rng)).sum()
    }

    #[test]
    fn test_entering_then_idle() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut boss = Boss::new(Vec2::ZERO, 5500.0);
        run(&mut boss, Vec2::new(100.0, 0.0), 100, &mut rng);
        assert_eq!(boss.phase, BossPhase::Entering);
        run(&mut boss, Vec2::new(100.0, 0.0), 30, &mut rng);
        assert_ne!(boss.phase, BossPhase::Entering);
    }

    #[test]
    fn test_burst_fires_every_200ms() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut boss = Boss::new(Vec2::ZERO, 5500.0);
        boss.enter(BossPhase::Burst);
        // 1 second of burst
        let shots = run(&mut boss, Vec2::new(100.0, 0.0), 60, &mut rng);
        assert!((4..=5).contains(&shots), "shots = {shots}");
    }

    #[test]
    fn test_radial_laser_live_after_one_second() {
        let mut boss = Boss::new(Vec2::ZERO, 5500.0);
        boss.enter(BossPhase::RadialLaser);
        let target = Vec2::new(150.0, 5.0);
        assert!(!boss.laser_hits(target));
        boss.state_ms = 1001.0;
        assert!(boss.laser_hits(target));
        // Between the 0 and pi/4 beams
        assert!(!boss.laser_hits(Vec2::new(150.0, 70.0)));
        // Beams only project forward
        assert!(boss.laser_hits(Vec2::new(-150.0, 0.0)));
        assert_eq!(boss.beams().len(), 8);
    }

    #[test]
    fn test_spin_laser_ignores_targets_behind() {
        let mut boss = Boss::new(Vec2::ZERO, 5500.0);
        boss.enter(BossPhase::SpinLaser);
        boss.state_ms = 600.0;
        boss.laser_angle = 0.0;
        assert!(boss.laser_hits(Vec2::new(300.0, 10.0)));
        assert!(!boss.laser_hits(Vec2::new(-300.0, 10.0)));
    }

    #[test]
    fn test_vulnerable_and_enrage() {
        let mut boss = Boss::new(Vec2::ZERO, 1000.0);
        assert_eq!(boss.damage_taken_mult(), 1.0);
        boss.enter(BossPhase::Vulnerable);
        assert_eq!(boss.damage_taken_mult(), 1.5);
        assert!(!boss.is_enraged());
        boss.hp = 499.0;
        assert!(boss.is_enraged());
    }

    #[test]
    fn test_keeps_distance_and_frozen_holds() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut boss = Boss::new(Vec2::ZERO, 5500.0);
        boss.update(Vec2::new(150.0, 0.0), 16.66, 1.0, &mut rng);
        assert_eq!(boss.body.pos, Vec2::ZERO);
        boss.update(Vec2::new(500.0, 0.0), 16.66, 1.0, &mut rng);
        assert!((boss.body.pos.x - 0.5).abs() < 1e-5);

        boss.status.freeze(100.0);
        let before = boss.state_ms;
        boss.update(Vec2::new(500.0, 0.0), 16.66, 1.0, &mut rng);
        assert_eq!(boss.state_ms, before);
    }
}
