//! Per-frame simulation step
//!
//! `tick` runs the frame phases in a fixed order. Each phase is a small
//! function over `GameState` so the order reads top to bottom in `tick`.

use glam::Vec2;
use rand::Rng;

use super::boss::{BOSS_BULLET_DAMAGE, BOSS_BULLET_SPEED, Boss};
use super::collision::{circle_intersects_rect, resolve_circle_rect, separate_circles};
use super::enemy::{ContactModel, Enemy, EnemyCommand, SmartCtx};
use super::entity::{Color, palette};
use super::input::InputState;
use super::pickup::{HealthPickup, MAGNET_DELAY_MS, roll_heal_fraction};
use super::player::Drone;
use super::projectile::{Bullet, DEFAULT_ENEMY_BULLET_SPEED, EnemyBullet};
use super::spawner;
use super::state::{GameEvent, GamePhase, GameState};
use super::status::StatusEffects;
use crate::consts::*;
use crate::direction_to;
use crate::stats::{PlayerStats, caps};

const SPREAD_STEP: f32 = 0.15;
const DRONE_BULLET_SPEED: f32 = 10.0;
const SHIELDED_DAMAGE_MULT: f32 = 0.6;
const HIT_FLASH_MS: f32 = 110.0;
const ENEMY_SEPARATION: f32 = 0.52;

const FEAR_PERIOD_MS: f64 = 10_000.0;
const FEAR_RADIUS: f32 = 180.0;
const FREEZE_PERIOD_MS: f64 = 12_000.0;
const FREEZE_RADIUS: f32 = 220.0;
const AURA_PERIOD_MS: f64 = 200.0;
pub const PULSE_RADIUS: f32 = 140.0;
const PULSE_PUSH: f32 = 35.0;
pub const PULSE_VISUAL_MS: f32 = 400.0;
const PULSE_TEXT: Color = Color::hex(0xffffff);

const SHIELD_REST_MS: f64 = 3000.0;
const SHIELD_TICK_MS: f64 = 200.0;
const LASER_DAMAGE: f32 = 2.0;
const BOMBER_BLAST_RADIUS: f32 = 70.0;
const BOMBER_DAMAGE: f32 = 18.0;
/// Demo runs top the player back up below this fraction
const DEMO_HEAL_FLOOR: f32 = 0.2;

/// Timing shared by every phase of one frame
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Unscaled seconds
    dt: f32,
    dt_ms: f32,
    time_mult: f32,
    /// Milliseconds of game time (scaled by the time scale)
    scaled_ms: f32,
    time_scale: f32,
    now: f64,
}

impl Frame {
    fn new(dt: f32, time_scale: f32, now: f64) -> Self {
        let ts = time_scale.max(0.01);
        Self {
            dt,
            dt_ms: dt * 1000.0,
            time_mult: dt / REFERENCE_FRAME_SECS * ts,
            scaled_ms: dt * 1000.0 * ts,
            time_scale: ts,
            now,
        }
    }

    /// Whether a period of game time has passed since `last`
    fn elapsed(&self, last: f64, period_ms: f64) -> bool {
        self.now - last > period_ms / f64::from(self.time_scale)
    }
}

/// Slow and burn applied alongside a hit
#[derive(Debug, Clone, Copy)]
struct Riders {
    slow_ms: f32,
    slow: f32,
    burn_ms: f32,
    burn: f32,
}

impl Riders {
    fn bullet(stats: &PlayerStats, boss: bool) -> Self {
        Self {
            slow_ms: 1200.0,
            slow: stats.slow_on_hit(boss),
            burn_ms: stats.burn_on_hit_ms(),
            burn: if stats.burn_level > 0 { stats.damage * 0.03 } else { 0.0 },
        }
    }

    fn apply(&self, status: &mut StatusEffects) {
        if self.slow > 0.0 {
            status.slow(self.slow_ms, self.slow);
        }
        if self.burn > 0.0 {
            status.burn(self.burn_ms, self.burn);
        }
    }
}

fn slow_level(stats: &PlayerStats) -> f32 {
    stats.slow_level.min(caps::SLOW) as f32
}

/// Advance the run by one frame of `dt` seconds.
///
/// Does nothing unless the run is playing or is a demo.
pub fn tick(state: &mut GameState, input: &InputState, dt: f32) {
    if state.phase != GamePhase::Playing && !state.is_demo {
        return;
    }
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
    state.clock_ms += f64::from(dt * 1000.0);
    let frame = Frame::new(dt, state.time_scale, state.clock_ms);

    advance_round(state, &frame);
    regenerate(state, &frame);
    recharge_shield(state, &frame);
    move_player(state, input, &frame);
    update_drone(state, &frame);
    periodic_abilities(state, &frame);
    update_boss(state, &frame);
    control_spawns(state, &frame);
    state.maintain_structures();
    autofire(state, &frame);
    integrate_projectiles(state, &frame);
    update_enemies(state, &frame);
    separate_enemies(state);
    collide_structures(state, &frame);
    update_health_pickups(state, &frame);
    state.effects.update(frame.time_mult, frame.scaled_ms);
    cull_projectiles(state);
    resolve_bullet_hits(state);
    resolve_enemy_bullets(state, &frame);
    sweep_dead(state);
    contact_damage(state, &frame);
    collect_crystals(state, &frame);
    detonate_bombers(state);
    check_game_over(state);

    log::trace!(
        "t={:.0}ms enemies={} bullets={}/{} crystals={}",
        frame.now,
        state.enemies.len(),
        state.bullets.len(),
        state.enemy_bullets.len(),
        state.crystals.len()
    );
}

fn advance_round(state: &mut GameState, frame: &Frame) {
    if !frame.elapsed(state.timers.last_round, ROUND_DURATION_MS) {
        return;
    }
    state.round += 1;
    state.timers.last_round = frame.now;
    state.events.push(GameEvent::RoundAdvanced { round: state.round });
    log::info!("Round {} (enemies alive: {})", state.round, state.enemies.len());

    let every = state.tuning.boss_every_rounds;
    if every > 0 && state.round % every == 0 && !state.is_demo {
        state.spawn_boss();
    }
}

fn regenerate(state: &mut GameState, frame: &Frame) {
    if state.stats.regen_level == 0 {
        return;
    }
    state.regen_timer_ms -= frame.scaled_ms;
    if state.regen_timer_ms > 0.0 {
        return;
    }
    state.regen_timer_ms = REGEN_INTERVAL_MS;
    if state.stats.hp < state.stats.max_hp {
        let amount = state.stats.max_hp * state.stats.regen_fraction();
        state.stats.heal(amount);
        if !state.is_demo {
            let pos = state.player.pos();
            state.effects.emit(pos, palette::REGEN, 5);
        }
    }
}

fn recharge_shield(state: &mut GameState, frame: &Frame) {
    let stats = &mut state.stats;
    if stats.shield_level == 0 || stats.shield >= stats.max_shield {
        return;
    }
    let rested = state
        .timers
        .last_damage
        .is_none_or(|t| frame.now - t > SHIELD_REST_MS);
    if rested && frame.now - state.timers.last_shield_tick > SHIELD_TICK_MS {
        stats.shield = (stats.shield + 1.0).min(stats.max_shield);
        state.timers.last_shield_tick = frame.now;
    }
}

fn move_player(state: &mut GameState, input: &InputState, frame: &Frame) {
    state.player.tick_invincibility(frame.dt);
    state.effects.update_feedback(frame.dt);

    if state.is_demo {
        let threats = state.enemies.iter().map(|e| e.body.pos);
        state.player.autopilot(threats, &state.stats, frame.time_mult);
    } else {
        if input.wants_dash() && state.phase == GamePhase::Playing && state.player.try_dash(&state.stats) {
            let (pos, color) = (state.player.pos(), state.player.body.color);
            state.effects.emit(pos, color, 15);
        }
        state
            .player
            .steer(input.movement(), &state.stats, frame.time_mult);
        if state.player.tick_dash(frame.dt) {
            let (pos, color) = (state.player.pos(), state.player.body.color);
            state.effects.trail(pos, color);
        }
    }
    state.player.end_frame(frame.dt);
    state.camera.center = state.player.pos();
}

/// Positions of everything the player can shoot at that is on screen
fn visible_targets(state: &GameState, margin: f32) -> impl Iterator<Item = Vec2> + '_ {
    let camera = state.camera;
    state
        .boss
        .iter()
        .map(|b| b.body.pos)
        .chain(state.enemies.iter().map(|e| e.body.pos))
        .filter(move |p| camera.in_view(*p, margin))
}

fn nearest<I>(points: I, to: Vec2) -> Option<Vec2>
where
    I: Iterator<Item = Vec2>,
{
    points.min_by(|a, b| a.distance_squared(to).total_cmp(&b.distance_squared(to)))
}

fn update_drone(state: &mut GameState, frame: &Frame) {
    if state.stats.drone_level == 0 {
        return;
    }
    let player = state.player.pos();
    let drone = state.drone.get_or_insert_with(|| Drone::new(player));
    drone.update(player, frame.time_mult);
    let origin = drone.body.pos;

    if !frame.elapsed(state.timers.last_drone_shot, f64::from(state.stats.drone_interval_ms())) {
        return;
    }
    let in_range = visible_targets(state, 120.0).filter(|p| p.distance(player) <= ENGAGE_RANGE);
    let Some(target) = nearest(in_range, origin) else {
        return;
    };
    state.timers.last_drone_shot = frame.now;
    let damage = state.stats.drone_damage();
    state
        .bullets
        .push(Bullet::aimed(origin, target, damage, DRONE_BULLET_SPEED, palette::DRONE));
}

fn periodic_abilities(state: &mut GameState, frame: &Frame) {
    let player = state.player.pos();

    if state.stats.fear_level > 0 && frame.elapsed(state.timers.last_fear, FEAR_PERIOD_MS) {
        state.timers.last_fear = frame.now;
        let ms = state.stats.fear_duration_ms();
        for e in state
            .enemies
            .iter_mut()
            .filter(|e| e.body.pos.distance(player) < FEAR_RADIUS)
        {
            e.status.fear(ms);
        }
        state.effects.emit(player, palette::FEAR, 20);
    }

    if state.stats.freeze_level > 0 && frame.elapsed(state.timers.last_freeze, FREEZE_PERIOD_MS) {
        state.timers.last_freeze = frame.now;
        let ms = state.stats.freeze_duration_ms();
        for e in state
            .enemies
            .iter_mut()
            .filter(|e| e.body.pos.distance(player) < FREEZE_RADIUS)
        {
            e.status.freeze(ms);
        }
        state.effects.emit(player, palette::FREEZE, 30);
    }

    if state.stats.aura_level > 0 && frame.elapsed(state.timers.last_aura, AURA_PERIOD_MS) {
        state.timers.last_aura = frame.now;
        aura(state);
    }

    let pulse_period = f64::from(state.stats.pulse_cooldown_ms());
    if state.stats.pulse_level > 0 && frame.elapsed(state.timers.last_pulse, pulse_period) {
        state.timers.last_pulse = frame.now;
        pulse(state);
    }

    settle_boss(state);
}

fn aura(state: &mut GameState) {
    let crit = state.crit_threshold();
    let GameState {
        enemies,
        boss,
        effects,
        stats,
        player,
        ..
    } = state;
    let center = player.pos();
    let radius = stats.aura_radius();
    let damage = (stats.damage * 0.06).max(1.0);
    let riders = Riders {
        slow_ms: 500.0,
        slow: slow_level(stats) * 0.02,
        burn_ms: 400.0,
        burn: if stats.burn_level > 0 { stats.damage * 0.015 } else { 0.0 },
    };

    for e in enemies
        .iter_mut()
        .filter(|e| e.body.pos.distance(center) < radius + e.body.radius)
    {
        e.hp -= damage;
        e.status.flash_hit(50.0);
        riders.apply(&mut e.status);
        effects.damage_number(e.body.pos, damage, palette::AURA_HIT_TEXT, crit);
    }
    if let Some(b) = boss
        .as_mut()
        .filter(|b| b.body.pos.distance(center) < radius + b.body.radius)
    {
        b.hp -= damage;
        b.status.flash_hit(50.0);
        riders.apply(&mut b.status);
        effects.damage_number(b.body.pos, damage, palette::AURA_HIT_TEXT, crit);
    }
}

fn pulse(state: &mut GameState) {
    let crit = state.crit_threshold();
    let GameState {
        enemies,
        boss,
        effects,
        stats,
        player,
        ..
    } = state;
    let center = player.pos();
    let damage = (stats.damage * 0.22).max(5.0);
    let riders = Riders {
        slow_ms: 2000.0,
        slow: slow_level(stats) * 0.06,
        burn_ms: 0.0,
        burn: 0.0,
    };

    for e in enemies.iter_mut() {
        let (dir, d) = direction_to(center, e.body.pos);
        if d >= PULSE_RADIUS {
            continue;
        }
        e.hp -= damage;
        e.body.pos += dir * PULSE_PUSH;
        e.status.flash_hit(HIT_FLASH_MS);
        riders.apply(&mut e.status);
        effects.damage_number(e.body.pos, damage, PULSE_TEXT, crit);
    }
    if let Some(b) = boss
        .as_mut()
        .filter(|b| b.body.pos.distance(center) < PULSE_RADIUS + b.body.radius)
    {
        b.hp -= damage;
        b.status.flash_hit(HIT_FLASH_MS);
        riders.apply(&mut b.status);
        effects.damage_number(b.body.pos, damage, PULSE_TEXT, crit);
    }
    effects.emit(center, PULSE_TEXT, 25);
    effects.pulse_visual_ms = PULSE_VISUAL_MS;
}

fn update_boss(state: &mut GameState, frame: &Frame) {
    if state.is_demo {
        return;
    }
    let player = state.player.pos();
    let mult = state.enemy_bullet_mult();
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    let shots = boss.update(player, frame.scaled_ms, frame.time_mult, &mut state.rng);
    let origin = boss.body.pos;
    let lasered = boss.laser_hits(player);

    for _ in 0..shots {
        if state.enemy_bullets.len() > ENEMY_BULLET_CAP {
            break;
        }
        state.enemy_bullets.push(EnemyBullet::aimed_colored(
            origin,
            player,
            BOSS_BULLET_DAMAGE * mult,
            BOSS_BULLET_SPEED,
            palette::BOSS_BULLET,
        ));
    }
    if lasered {
        state.take_damage(LASER_DAMAGE, false, frame.time_mult);
    }
    settle_boss(state);
}

/// Pay out a boss that ran out of hp this frame
fn settle_boss(state: &mut GameState) {
    if state.boss.as_ref().is_some_and(Boss::is_dead) {
        state.kill_boss();
    }
}

fn control_spawns(state: &mut GameState, frame: &Frame) {
    if !state.spawning_enabled {
        return;
    }
    let interval = spawner::effective_interval_ms(
        state.round,
        state.is_demo,
        state.player.pos(),
        state.enemies.iter().map(|e| e.body.pos),
    );
    if frame.elapsed(state.timers.last_spawn, f64::from(interval)) && state.enemies.len() < state.enemy_limit() {
        state.spawn_enemy();
        state.timers.last_spawn = frame.now;
    }
}

fn autofire(state: &mut GameState, frame: &Frame) {
    if !frame.elapsed(state.timers.last_shot, f64::from(state.stats.shot_interval_ms())) {
        return;
    }
    let origin = state.player.pos();
    let Some(target) = nearest(visible_targets(state, 80.0), origin) else {
        return;
    };
    if target.distance(origin) > ENGAGE_RANGE {
        return;
    }
    state.timers.last_shot = frame.now;

    let damage = if state.tuning.bullet_damage_from_stats {
        state.stats.damage
    } else {
        state.tuning.player_bullet_damage
    };
    let pellets = state.stats.pellets();
    let pierce = state.stats.pierce();
    let base = (target - origin).to_angle();
    let start = base - SPREAD_STEP * (pellets - 1) as f32 / 2.0;
    for i in 0..pellets {
        let jitter = (state.rng.random::<f32>() - 0.5) * state.stats.accuracy;
        let dir = Vec2::from_angle(start + i as f32 * SPREAD_STEP + jitter);
        let bullet = Bullet::with_direction(origin, dir, damage, state.tuning.bullet_speed, palette::BULLET)
            .with_pierce(pierce);
        state.bullets.push(bullet);
    }
    state.events.push(GameEvent::Shot);
}

fn integrate_projectiles(state: &mut GameState, frame: &Frame) {
    for b in &mut state.bullets {
        b.update(frame.time_mult);
    }
    for b in &mut state.enemy_bullets {
        b.update(frame.time_mult);
    }
}

fn update_enemies(state: &mut GameState, frame: &Frame) {
    let mut commands = Vec::new();
    let mut ctx = SmartCtx {
        dt_ms: frame.scaled_ms,
        time_mult: frame.time_mult,
        player_pos: state.player.pos(),
        player_vel: state.player.frame_velocity,
        view_size: state.camera.view_size(),
        rng: &mut state.rng,
        commands: &mut commands,
    };
    for enemy in &mut state.enemies {
        enemy.update(&mut ctx);
    }

    let mult = state.enemy_bullet_mult();
    for command in commands {
        match command {
            EnemyCommand::Fire {
                origin,
                target,
                damage,
                speed,
            } => {
                if state.enemy_bullets.len() > ENEMY_BULLET_CAP {
                    continue;
                }
                let speed = speed.unwrap_or(DEFAULT_ENEMY_BULLET_SPEED);
                state
                    .enemy_bullets
                    .push(EnemyBullet::aimed(origin, target, damage * mult, speed));
            }
            EnemyCommand::Summon { pos, hp, speed } => state.spawn_minion(pos, hp, speed),
            EnemyCommand::ShieldAllies {
                source_id,
                center,
                radius,
                ms,
            } => {
                for e in state
                    .enemies
                    .iter_mut()
                    .filter(|e| e.id != source_id && e.body.pos.distance(center) <= radius)
                {
                    e.status.grant_shield(ms);
                }
            }
        }
    }
}

fn separate_enemies(state: &mut GameState) {
    let mut bodies: Vec<(Vec2, f32)> = state
        .enemies
        .iter()
        .map(|e| (e.body.pos, e.body.radius))
        .collect();
    separate_circles(&mut bodies, ENEMY_SEPARATION);
    for (e, (pos, _)) in state.enemies.iter_mut().zip(bodies) {
        e.body.pos = pos;
    }
}

fn collide_structures(state: &mut GameState, frame: &Frame) {
    let dps = state.tuning.structure_dps_per_enemy;
    let dt_sec = frame.scaled_ms / 1000.0;
    for s in &mut state.structures {
        let mut contacts = 0;
        for e in &mut state.enemies {
            if circle_intersects_rect(e.body.pos, e.body.radius, &s.rect) {
                contacts += 1;
                resolve_circle_rect(&mut e.body.pos, e.body.radius, &s.rect);
            }
        }
        s.apply_contact_damage(contacts, dt_sec, dps);
    }

    let mut broken = Vec::new();
    state.structures.retain(|s| {
        if s.is_broken() {
            broken.push((s.id, s.center()));
            false
        } else {
            true
        }
    });
    for (id, center) in broken {
        state.effects.emit(center, palette::DEBRIS, 10);
        let fraction = roll_heal_fraction(state.rng.random());
        log::debug!("Structure #{id} broke, dropping a {:.0}% heal", fraction * 100.0);
        state.health_pickups.push(HealthPickup::new(center, fraction));
    }
}

fn update_health_pickups(state: &mut GameState, frame: &Frame) {
    let player = state.player.pos();
    let player_r = state.player.body.radius;
    let (hp, max_hp) = (state.stats.hp, state.stats.max_hp);
    let mut collected = Vec::new();
    state.health_pickups.retain_mut(|p| {
        p.update(frame.scaled_ms);
        if p.expired() {
            return false;
        }
        let reach = p.radius + player_r;
        if p.pos.distance_squared(player) < reach * reach {
            collected.push((p.pos, p.heal_amount(hp, max_hp)));
            return false;
        }
        true
    });
    for (pos, amount) in collected {
        state.stats.heal(amount);
        state.effects.emit(pos, palette::HEAL, 7);
        state.events.push(GameEvent::Pickup);
    }
}

fn cull_projectiles(state: &mut GameState) {
    let pad = Vec2::splat(CULL_PAD);
    let min = state.camera.origin() - pad;
    let max = state.camera.origin() + state.camera.view_size() + pad;
    let inside = |p: Vec2| p.cmpge(min).all() && p.cmple(max).all();
    state.bullets.retain(|b| inside(b.body.pos));
    state.enemy_bullets.retain(|b| inside(b.body.pos));
}

/// Player bullets against the boss first, then against enemies. A boss hit
/// always consumes the bullet; piercing bullets keep scanning enemies they
/// have not struck yet.
fn resolve_bullet_hits(state: &mut GameState) {
    let crit = state.crit_threshold();
    let GameState {
        bullets,
        enemies,
        boss,
        effects,
        stats,
        is_demo,
        ..
    } = state;
    let knockback = stats.bullet_knockback();
    let enemy_riders = Riders::bullet(stats, false);
    let boss_riders = Riders::bullet(stats, true);

    bullets.retain_mut(|b| {
        if let Some(boss) = boss.as_mut().filter(|_| !*is_demo) {
            let reach = boss.body.radius + b.body.radius;
            if boss.body.pos.distance_squared(b.body.pos) < reach * reach {
                let dmg = b.damage * boss.damage_taken_mult();
                boss.hp -= dmg;
                let above = boss.body.pos - Vec2::new(0.0, boss.body.radius);
                effects.damage_number(above, dmg, palette::BOSS_HIT_TEXT, crit);
                effects.emit(b.body.pos, b.body.color, 3);
                boss_riders.apply(&mut boss.status);
                return false;
            }
        }

        for e in enemies.iter_mut() {
            if e.is_dead() || b.has_hit(e.id) {
                continue;
            }
            let reach = e.body.radius + b.body.radius;
            if e.body.pos.distance_squared(b.body.pos) >= reach * reach {
                continue;
            }
            let shielded = e.status.is_shielded();
            let (dmg, text) = if shielded {
                (b.damage * SHIELDED_DAMAGE_MULT, palette::SHIELDED_HIT_TEXT)
            } else {
                (b.damage, palette::HIT_TEXT)
            };
            e.hp -= dmg;
            effects.damage_number(e.body.pos, dmg, text, crit);
            e.body.pos += b.direction() * knockback * e.params().kb_mult * b.kb_mult;
            effects.emit(b.body.pos, b.body.color, 3);
            e.status.flash_hit(HIT_FLASH_MS);
            enemy_riders.apply(&mut e.status);

            if b.pierce == 0 {
                return false;
            }
            b.pierce -= 1;
            b.hit_ids.push(e.id);
        }
        true
    });

    settle_boss(state);
}

fn resolve_enemy_bullets(state: &mut GameState, frame: &Frame) {
    let player = state.player.pos();
    let hit_r = state.player_hit_radius();
    let mut hits = Vec::new();
    state.enemy_bullets.retain(|b| {
        if b.body.pos.distance(player) < hit_r + b.body.radius {
            hits.push((b.body.pos, b.damage));
            false
        } else {
            true
        }
    });
    for (pos, damage) in hits {
        state.take_damage(damage, true, frame.time_mult);
        state.effects.emit(pos, palette::ENEMY_BULLET, 6);
    }
}

fn sweep_dead(state: &mut GameState) {
    if !state.enemies.iter().any(Enemy::is_dead) {
        return;
    }
    let (dead, alive): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut state.enemies)
        .into_iter()
        .partition(Enemy::is_dead);
    state.enemies = alive;

    for enemy in dead {
        let params = enemy.params();
        let pos = enemy.body.pos;
        let (count, color) = params.death_burst;
        state.effects.emit(pos, color, count);
        if state.rng.random::<f32>() < params.xp_chance {
            state.drop_xp(pos, params.xp_value);
        }
        if !state.is_demo {
            state.stats.coins += (2.0 * state.stats.credits_mult()).floor() as u32;
            let heal = state.stats.max_hp * state.stats.heal_on_kill_fraction();
            state.stats.heal(heal);
        }
        state.events.push(GameEvent::EnemyKilled { kind: enemy.kind });
    }
}

fn contact_damage(state: &mut GameState, frame: &Frame) {
    if state.is_demo {
        if state.stats.hp < state.stats.max_hp * DEMO_HEAL_FLOOR {
            state.stats.hp = state.stats.max_hp;
        }
        return;
    }
    let player = state.player.pos();
    let hit_r = state.player_hit_radius();
    let mut hits = Vec::new();
    for e in &mut state.enemies {
        let touching = e.body.pos.distance(player) < e.body.radius + hit_r;
        let dashing = e.is_dashing();
        match &mut e.contact {
            ContactModel::Ticked {
                tick_ms,
                damage,
                acc_ms,
            } => {
                if !touching {
                    *acc_ms = 0.0;
                    continue;
                }
                *acc_ms += frame.dt_ms;
                while *tick_ms > 0.0 && *acc_ms >= *tick_ms {
                    hits.push(*damage);
                    *acc_ms -= *tick_ms;
                }
            }
            ContactModel::PerFrame => {
                if touching {
                    hits.push(state.tuning.contact_damage(state.round, dashing));
                }
            }
        }
    }
    for damage in hits {
        state.take_damage(damage, false, frame.time_mult);
    }
}

fn collect_crystals(state: &mut GameState, frame: &Frame) {
    let player = state.player.pos();
    let hit_r = state.player_hit_radius();
    let range = state.stats.magnet_range();
    let pull = state.stats.pull_mult();
    let mut gained = Vec::new();
    state.crystals.retain_mut(|c| {
        c.update(frame.scaled_ms, frame.time_mult);
        let (dir, d) = direction_to(player, c.body.pos);
        if c.magnet_ready() && d < range {
            let force = 0.5 * (1.0 + (c.age_ms - MAGNET_DELAY_MS) * 0.002) * pull;
            c.vel -= dir * force * frame.time_mult;
        }
        if d < hit_r + c.body.radius {
            gained.push(c.xp_value());
            return false;
        }
        true
    });
    for xp in gained {
        if !state.is_demo && xp > 0.0 {
            state.add_xp(xp);
        }
        state.effects.emit(player, palette::XP, 3);
        state.events.push(GameEvent::Pickup);
    }
}

fn detonate_bombers(state: &mut GameState) {
    let blasts: Vec<Vec2> = state
        .enemies
        .iter_mut()
        .filter(|e| e.explosion_pending())
        .filter_map(|e| e.detonate().then_some(e.body.pos))
        .collect();
    if blasts.is_empty() {
        return;
    }
    let player = state.player.pos();
    let reach = BOMBER_BLAST_RADIUS + state.player_hit_radius();
    for pos in blasts {
        state.effects.emit(pos, palette::EXPLOSION, 35);
        if pos.distance(player) < reach {
            state.take_damage(BOMBER_DAMAGE, false, 1.0);
        }
    }
}

fn check_game_over(state: &mut GameState) {
    if state.is_demo || state.phase == GamePhase::GameOver || state.stats.hp > 0.0 {
        return;
    }
    state.phase = GamePhase::GameOver;
    let coins = state.stats.coins;
    log::info!(
        "Game over at round {} (level {}, coins {coins})",
        state.round,
        state.stats.level
    );
    state.events.push(GameEvent::GameOver { coins });
}
