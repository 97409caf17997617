//! Game state and run-level operations
//!
//! `GameState` owns every collection in a run. The per-frame phases live in
//! `tick`; this module holds the operations several phases share (damage,
//! experience, spawning, boss lifecycle) and run setup.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::Boss;
use super::effects::Effects;
use super::enemy::{Enemy, EnemyKind};
use super::entity::{Color, palette};
use super::pickup::{ExperienceCrystal, HealthPickup, Structure};
use super::player::{Drone, Player};
use super::projectile::{Bullet, EnemyBullet};
use super::spawner;
use crate::consts::*;
use crate::settings::Settings;
use crate::stats::{PermanentBonuses, PlayerStats};
use crate::tuning::Tuning;
use crate::upgrades::UpgradeId;

/// XP catch-up kicks in after this long without a level-up
const XP_CATCH_UP_MS: f64 = 25_000.0;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen; a demo run may play underneath
    Menu,
    Playing,
    /// Waiting for an upgrade pick
    LevelUp,
    Paused,
    GameOver,
}

/// Things the host may want to react to (sounds, HUD toasts)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Shot,
    Pickup,
    PlayerHit { damage: f32 },
    EnemyKilled { kind: EnemyKind },
    LevelUp { level: u32 },
    RoundAdvanced { round: u32 },
    BossSpawned,
    BossDefeated,
    GameOver { coins: u32 },
}

/// Render-only view centred on the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center: Vec2,
    pub zoom: f32,
    /// Canvas size in CSS pixels
    pub viewport: Vec2,
    pub pixel_density: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let viewport = Vec2::new(1280.0, 720.0);
        Self {
            center: Vec2::ZERO,
            zoom: Self::zoom_for(viewport),
            viewport,
            pixel_density: 1.0,
        }
    }
}

impl Camera {
    /// Zoom stepped by the smaller viewport dimension
    pub fn zoom_for(viewport: Vec2) -> f32 {
        let min_dim = viewport.x.min(viewport.y);
        let zoom: f32 = if min_dim <= 380.0 {
            0.65
        } else if min_dim <= 480.0 {
            0.70
        } else if min_dim <= 720.0 {
            0.78
        } else {
            0.85
        };
        zoom.clamp(MIN_CAMERA_ZOOM, MAX_CAMERA_ZOOM)
    }

    /// Visible world area
    pub fn view_size(&self) -> Vec2 {
        self.viewport / self.zoom
    }

    /// World position of the top-left corner
    pub fn origin(&self) -> Vec2 {
        self.center - self.view_size() * 0.5
    }

    pub fn in_view(&self, pos: Vec2, margin: f32) -> bool {
        let local = pos - self.origin();
        let size = self.view_size();
        local.x >= -margin && local.x <= size.x + margin && local.y >= -margin && local.y <= size.y + margin
    }
}

/// Clock timestamps (ms) of the last occurrence of each periodic event
#[derive(Debug, Clone, Copy, Default)]
pub struct Timers {
    pub last_round: f64,
    pub last_spawn: f64,
    pub last_shot: f64,
    pub last_drone_shot: f64,
    pub last_fear: f64,
    pub last_freeze: f64,
    pub last_aura: f64,
    pub last_pulse: f64,
    pub last_shield_tick: f64,
    pub last_structure_check: f64,
    pub last_level_up: f64,
    /// None until the player is first hurt
    pub last_damage: Option<f64>,
}

impl Timers {
    fn starting_at(now: f64) -> Self {
        Self {
            last_round: now,
            last_spawn: now,
            last_shot: now,
            last_drone_shot: now,
            last_fear: now,
            last_freeze: now,
            last_aura: now,
            last_pulse: now,
            last_shield_tick: 0.0,
            last_structure_check: now,
            last_level_up: now,
            last_damage: None,
        }
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Monotonic run clock (ms), advanced by unscaled frame time
    pub clock_ms: f64,
    pub time_scale: f32,
    pub phase: GamePhase,
    pub is_demo: bool,
    /// Damage to the player is ignored
    pub god_mode: bool,
    pub round: u32,
    pub spawning_enabled: bool,
    pub stats: PlayerStats,
    pub player: Player,
    pub drone: Option<Drone>,
    pub boss: Option<Boss>,
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub crystals: Vec<ExperienceCrystal>,
    pub structures: Vec<Structure>,
    pub health_pickups: Vec<HealthPickup>,
    /// Visual effects (not gameplay-affecting)
    pub effects: Effects,
    pub camera: Camera,
    pub timers: Timers,
    pub regen_timer_ms: f32,
    /// Upgrades offered for the pending level-up
    pub offer: Vec<UpgradeId>,
    /// Events since the host last drained them
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Tuning::default(), Settings::default())
    }

    pub fn with_config(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        let mut stats = PlayerStats::default();
        stats.max_hp = tuning.player_base_max_hp;
        stats.hp = stats.max_hp;
        stats.damage = tuning.player_base_damage;
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            clock_ms: 0.0,
            time_scale: 1.0,
            phase: GamePhase::Menu,
            is_demo: false,
            god_mode: false,
            round: 1,
            spawning_enabled: true,
            stats,
            player: Player::new(palette::PLAYER),
            drone: None,
            boss: None,
            enemies: Vec::new(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            crystals: Vec::new(),
            structures: Vec::new(),
            health_pickups: Vec::new(),
            effects: Effects::new(settings, seed),
            camera: Camera::default(),
            timers: Timers::starting_at(0.0),
            regen_timer_ms: REGEN_INTERVAL_MS,
            offer: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(1);
        id
    }

    /// Reset everything for a fresh run
    pub fn start(&mut self, demo: bool) {
        let now = self.clock_ms;
        self.is_demo = demo;
        self.phase = if demo { GamePhase::Menu } else { GamePhase::Playing };
        self.god_mode = demo;
        self.time_scale = 1.0;
        self.round = 1;
        self.spawning_enabled = true;

        self.stats = PlayerStats::default();
        self.stats.max_hp = self.tuning.player_base_max_hp;
        self.stats.hp = self.stats.max_hp;
        self.stats.damage = self.tuning.player_base_damage;

        self.enemies.clear();
        self.boss = None;
        self.drone = None;
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.crystals.clear();
        self.structures.clear();
        self.health_pickups.clear();
        self.effects.clear();
        self.offer.clear();
        self.events.clear();

        let demo_angle = self.rng.random::<f32>() * std::f32::consts::TAU;
        self.player.reset(Vec2::ZERO, demo_angle);
        self.camera.center = Vec2::ZERO;
        self.regen_timer_ms = REGEN_INTERVAL_MS;
        self.timers = Timers::starting_at(now);

        self.spawn_initial_structures();
        log::info!(
            "Run started (demo: {demo}, seed: {}, structures: {})",
            self.seed,
            self.structures.len()
        );
    }

    /// Carry permanent meta bonuses into the current stats
    pub fn apply_permanent_bonuses(&mut self, bonuses: &PermanentBonuses, skin: Color) {
        self.stats.max_hp = self.tuning.player_base_max_hp;
        self.stats.hp = self.stats.hp.min(self.stats.max_hp);
        self.stats.damage = self.tuning.player_base_damage;
        self.stats.speed *= 1.0 + bonuses.speed as f32 * 0.05;
        self.player.body.color = skin;
    }

    pub fn player_hit_radius(&self) -> f32 {
        self.player.hit_radius(&self.stats)
    }

    /// Enemy bullet damage scaling with the round
    pub fn enemy_bullet_mult(&self) -> f32 {
        if self.is_demo {
            return 1.0;
        }
        let r = self.round as f32;
        1.0 + (r - 1.0) * 0.015 + self.round.saturating_sub(20) as f32 * 0.008
    }

    pub fn enemy_limit(&self) -> usize {
        spawner::enemy_limit(self.round, self.is_demo)
    }

    /// Crit threshold for floating numbers
    pub fn crit_threshold(&self) -> f32 {
        (self.stats.damage * 1.75).max(18.0)
    }

    /// Hurt the player after armor, resist and shield. Returns hp lost.
    pub fn take_damage(&mut self, base: f32, is_bullet: bool, mult: f32) -> f32 {
        if self.god_mode || self.player.is_invincible() {
            return 0.0;
        }
        self.timers.last_damage = Some(self.clock_ms);

        let dr = self.stats.damage_reduction(is_bullet).min(0.8);
        let mut dealt = (base * (1.0 - dr) * mult).max(0.0);
        if self.stats.shield > 0.0 {
            let absorbed = self.stats.shield.min(dealt);
            self.stats.shield -= absorbed;
            dealt -= absorbed;
        }
        self.stats.hp -= dealt;
        self.player.invincibility = self.stats.iframe_secs();

        if dealt > 0.0 {
            let pos = self.player.pos();
            self.effects.emit(pos, palette::BULLET, 5);
            let low = if self.stats.hp_fraction() < 0.25 { 1.35 } else { 1.0 };
            let per_point = if is_bullet { 0.9 } else { 1.2 };
            self.effects.add_shake((3.0 + dealt * per_point) * low);
            self.effects.flash_damage();
            self.events.push(GameEvent::PlayerHit { damage: dealt });
        }
        dealt
    }

    /// Gain experience; at most one level-up per call
    pub fn add_xp(&mut self, amount: f32) {
        self.stats.xp += amount;
        if self.stats.xp < self.stats.next_level_xp {
            return;
        }
        self.stats.xp -= self.stats.next_level_xp;
        self.stats.level += 1;
        self.stats.next_level_xp = (self.stats.next_level_xp * 1.25).floor();
        self.timers.last_level_up = self.clock_ms;
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::LevelUp;
        }
        self.offer = crate::upgrades::draw_offer(&self.stats, &mut self.rng);
        log::info!("Level up -> {} (next at {})", self.stats.level, self.stats.next_level_xp);
        self.events.push(GameEvent::LevelUp {
            level: self.stats.level,
        });
    }

    /// Scatter experience orbs, some of them decoys
    pub fn drop_xp(&mut self, pos: Vec2, value: f32) {
        if self.crystals.len() > XP_CRYSTAL_CAP {
            return;
        }
        let total = if self.is_demo {
            1
        } else {
            let mut n = self.rng.random_range(2..=4);
            if self.rng.random::<f32>() < self.stats.extra_orb_chance() {
                n += 1;
            }
            n
        };
        let real = if self.is_demo {
            0
        } else {
            let per = self.stats.levels_per_real_orb();
            total.min(1 + (self.stats.level.max(1) - 1) / per)
        };

        let mut mult = 1.15 * self.stats.xp_gain_mult();
        if !self.is_demo && self.clock_ms - self.timers.last_level_up > XP_CATCH_UP_MS {
            mult *= 1.5;
        }
        let value = value * mult;
        for i in 0..total {
            let fake = i >= real;
            let vel = Vec2::new(self.rng.random::<f32>() - 0.5, self.rng.random::<f32>() - 0.5) * 8.0;
            self.crystals
                .push(ExperienceCrystal::new(pos, if fake { 0.0 } else { value }, vel, fake));
        }
    }

    /// Spawn one enemy at the view edge. Returns false when at the limit.
    pub fn spawn_enemy(&mut self) -> bool {
        if self.enemies.len() >= self.enemy_limit() {
            return false;
        }
        let pos = spawner::edge_position(self.player.pos(), self.camera.view_size(), &mut self.rng);
        let enemies = &self.enemies;
        let plan = spawner::plan_spawn(
            &self.tuning,
            self.round,
            |kind| enemies.iter().filter(|e| e.kind == kind).count(),
            &mut self.rng,
        );
        let id = self.next_entity_id();
        log::debug!("Spawn {:?} #{id} (hp {:.1}, speed {:.2})", plan.kind, plan.hp, plan.speed);
        let enemy = Enemy::new(id, plan.kind, pos, plan.hp, plan.speed, &mut self.rng);
        self.enemies.push(enemy);
        true
    }

    /// Summoned minion; dropped silently at the enemy limit
    pub fn spawn_minion(&mut self, pos: Vec2, hp: f32, speed: f32) {
        if self.enemies.len() >= self.enemy_limit() {
            return;
        }
        let id = self.next_entity_id();
        let minion = Enemy::new(id, EnemyKind::Minion, pos, hp, speed, &mut self.rng);
        self.enemies.push(minion);
    }

    /// Clear the field and bring in the boss
    pub fn spawn_boss(&mut self) {
        if self.boss.is_some() {
            return;
        }
        self.spawning_enabled = false;
        self.kill_all_minions();
        let pos = self.player.pos() - Vec2::new(0.0, self.camera.view_size().y * 0.5 + 100.0);
        let hp = self.tuning.boss_hp(self.round);
        self.boss = Some(Boss::new(pos, hp));
        self.events.push(GameEvent::BossSpawned);
        log::info!("Boss spawned at round {} with {hp} hp", self.round);
    }

    fn kill_all_minions(&mut self) {
        let fallen: Vec<(Vec2, Color)> = self.enemies.drain(..).map(|e| (e.body.pos, e.body.color)).collect();
        for (pos, color) in fallen {
            self.effects.emit(pos, color, 5);
            self.drop_xp(pos, 10.0);
        }
    }

    pub fn kill_boss(&mut self) {
        let Some(boss) = self.boss.take() else {
            return;
        };
        let pos = boss.body.pos;
        self.effects.emit(pos, boss.body.color, 100);
        for _ in 0..20 {
            let jitter = Vec2::new(self.rng.random::<f32>() - 0.5, self.rng.random::<f32>() - 0.5) * 100.0;
            self.drop_xp(pos + jitter, 50.0);
        }
        let reward = (500.0 * self.stats.credits_mult()).floor() as u32;
        self.stats.coins += reward;
        self.spawning_enabled = true;
        self.events.push(GameEvent::BossDefeated);
        log::info!("Boss defeated (+{reward} coins)");
    }

    fn spawn_structures_in_ring(&mut self, ring: (f32, f32), count: u32) {
        let center = self.player.pos();
        let enemy_pos: Vec<Vec2> = self.enemies.iter().map(|e| e.body.pos).collect();
        for _ in 0..count {
            let id = self.next_entity_id();
            if let Some(s) =
                spawner::place_structure(id, center, ring, &self.structures, &enemy_pos, &mut self.rng)
            {
                self.structures.push(s);
            }
        }
    }

    fn spawn_initial_structures(&mut self) {
        for (ring, min, max) in spawner::INITIAL_RINGS {
            let count = self.rng.random_range(min..=max);
            self.spawn_structures_in_ring(ring, count);
        }
    }

    /// Despawn far cover and top the field back up
    pub fn maintain_structures(&mut self) {
        if self.clock_ms - self.timers.last_structure_check < self.tuning.structure_check_ms {
            return;
        }
        self.timers.last_structure_check = self.clock_ms;

        let player = self.player.pos();
        let max_sq = self.tuning.structure_despawn_dist * self.tuning.structure_despawn_dist;
        self.structures
            .retain(|s| s.center().distance_squared(player) <= max_sq);

        let missing = spawner::refill_count(self.structures.len(), self.tuning.structure_target);
        if missing > 0 {
            self.spawn_structures_in_ring(spawner::FAR_RING, missing as u32);
        }
    }
}
