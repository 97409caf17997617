//! Enemy variants and their per-frame behavior
//!
//! Every enemy shares the same shell (`Enemy`) and differs only in its
//! [`Behavior`] state. `Enemy::update` runs the shared status precedence and
//! then dispatches on the behavior. Enemies never touch engine collections;
//! anything that leaves the enemy (bullets, minions, ally shields) is queued
//! as an [`EnemyCommand`] on the [`SmartCtx`].

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::attack::AttackCycle;
use super::entity::{Body, Color, palette};
use super::status::StatusEffects;
use crate::{direction_to, perpendicular};

/// Hp and speed of minions summoned by a summoner
pub const MINION_HP: f32 = 16.0;
pub const MINION_SPEED: f32 = 1.25;

const BURST_HUNTER_BULLET_SPEED: f32 = 12.0;
const DASH_MS: f32 = 220.0;
const SHIELD_RADIUS: f32 = 220.0;
const ALLY_SHIELD_MS: f32 = 4500.0;
const SELF_SHIELD_MS: f32 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Minion,
    Swarm,
    BurstHunter,
    Dasher,
    Flanker,
    ShieldSupport,
    Suppressor,
    Gunner,
    Sniper,
    Bomber,
    Summoner,
}

/// How touching the player hurts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ContactModel {
    /// Round-scaled damage every frame of overlap
    PerFrame,
    /// Fixed damage per elapsed tick of overlap; the accumulator resets on separation
    Ticked { tick_ms: f32, damage: f32, acc_ms: f32 },
}

/// Static per-kind parameters
#[derive(Debug, Clone, Copy)]
pub struct KindParams {
    pub radius: f32,
    pub color: Color,
    pub kb_mult: f32,
    pub xp_chance: f32,
    pub xp_value: f32,
    /// Round-1 hp before scaling
    pub hp_base: f32,
    pub speed_mult: f32,
    /// Particle count and colour of the death burst
    pub death_burst: (u32, Color),
}

impl EnemyKind {
    pub fn params(self) -> KindParams {
        let (radius, color, kb_mult, xp_chance, xp_value, hp_base, speed_mult) = match self {
            EnemyKind::Minion => (10.0, palette::ENEMY, 1.0, 1.0, 10.0, MINION_HP, 1.0),
            EnemyKind::Swarm => (9.0, Color::hex(0x7cff00), 0.35, 0.9, 4.0, 16.0, 1.0),
            EnemyKind::BurstHunter => (11.0, Color::hex(0xff4d7d), 1.0, 0.65, 12.0, 40.0, 1.0),
            EnemyKind::Dasher => (12.0, Color::hex(0xff3355), 0.9, 0.75, 14.0, 34.0, 1.0),
            EnemyKind::Flanker => (11.0, Color::hex(0xb300ff), 1.0, 0.75, 12.0, 30.0, 1.05),
            EnemyKind::ShieldSupport => (10.0, Color::hex(0x00aaff), 1.0, 0.8, 14.0, 36.0, 0.9),
            EnemyKind::Suppressor => (10.0, Color::hex(0xffd000), 1.0, 0.75, 14.0, 34.0, 0.9),
            EnemyKind::Gunner => (10.0, Color::hex(0xff4df0), 1.0, 0.75, 12.0, 32.0, 0.95),
            EnemyKind::Sniper => (11.0, Color::hex(0x6ef7ff), 1.0, 0.8, 16.0, 28.0, 0.85),
            EnemyKind::Bomber => (11.0, Color::hex(0xff7a00), 1.2, 0.7, 12.0, 30.0, 1.1),
            EnemyKind::Summoner => (12.0, Color::hex(0x00ff66), 0.8, 1.0, 20.0, 60.0, 0.8),
        };
        let death_burst = match self {
            EnemyKind::Swarm => (14, Color::rgba(255, 255, 255, 217)),
            _ => (10, color),
        };
        KindParams {
            radius,
            color,
            kb_mult,
            xp_chance,
            xp_value,
            hp_base,
            speed_mult,
            death_burst,
        }
    }

    pub fn contact_model(self) -> ContactModel {
        match self {
            EnemyKind::Swarm => ContactModel::Ticked {
                tick_ms: 170.0,
                damage: 1.0,
                acc_ms: 0.0,
            },
            _ => ContactModel::PerFrame,
        }
    }
}

/// Variant-specific AI state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Minion,
    Swarm {
        phase: f32,
    },
    BurstHunter {
        cycle: AttackCycle,
        strafe_dir: f32,
        strafe_ms: f32,
        /// Locked aim direction
        aim: Vec2,
    },
    Dasher {
        cycle: AttackCycle,
        dash_dir: Vec2,
        dash_ms: f32,
    },
    Flanker {
        flank_ms: f32,
        target: Vec2,
    },
    ShieldSupport {
        cycle: AttackCycle,
    },
    Suppressor {
        cycle: AttackCycle,
        aim: Vec2,
        burst_left: u32,
        burst_gap_ms: f32,
    },
    Gunner {
        cycle: AttackCycle,
        aim: Vec2,
        strafe_dir: f32,
        strafe_ms: f32,
    },
    Sniper {
        cycle: AttackCycle,
        aim: Vec2,
    },
    Bomber {
        cycle: AttackCycle,
    },
    Summoner {
        cycle: AttackCycle,
        blink_cd_ms: f32,
    },
}

impl Behavior {
    fn cycle_mut(&mut self) -> Option<&mut AttackCycle> {
        match self {
            Behavior::BurstHunter { cycle, .. }
            | Behavior::Dasher { cycle, .. }
            | Behavior::ShieldSupport { cycle }
            | Behavior::Suppressor { cycle, .. }
            | Behavior::Gunner { cycle, .. }
            | Behavior::Sniper { cycle, .. }
            | Behavior::Bomber { cycle }
            | Behavior::Summoner { cycle, .. } => Some(cycle),
            Behavior::Minion | Behavior::Swarm { .. } | Behavior::Flanker { .. } => None,
        }
    }

    fn initial(kind: EnemyKind, rng: &mut Pcg32) -> Self {
        match kind {
            EnemyKind::Minion => Behavior::Minion,
            EnemyKind::Swarm => Behavior::Swarm {
                phase: rng.random::<f32>() * std::f32::consts::TAU,
            },
            EnemyKind::BurstHunter => Behavior::BurstHunter {
                cycle: AttackCycle::cooling(900.0 + rng.random::<f32>() * 900.0),
                strafe_dir: 1.0,
                strafe_ms: 0.0,
                aim: Vec2::X,
            },
            EnemyKind::Dasher => Behavior::Dasher {
                cycle: AttackCycle::idle(),
                dash_dir: Vec2::X,
                dash_ms: 0.0,
            },
            EnemyKind::Flanker => Behavior::Flanker {
                flank_ms: 0.0,
                target: Vec2::ZERO,
            },
            EnemyKind::ShieldSupport => Behavior::ShieldSupport {
                cycle: AttackCycle::idle(),
            },
            EnemyKind::Suppressor => Behavior::Suppressor {
                cycle: AttackCycle::idle(),
                aim: Vec2::ZERO,
                burst_left: 0,
                burst_gap_ms: 0.0,
            },
            EnemyKind::Gunner => Behavior::Gunner {
                cycle: AttackCycle::idle(),
                aim: Vec2::ZERO,
                strafe_dir: 1.0,
                strafe_ms: 0.0,
            },
            EnemyKind::Sniper => Behavior::Sniper {
                cycle: AttackCycle::idle(),
                aim: Vec2::ZERO,
            },
            EnemyKind::Bomber => Behavior::Bomber {
                cycle: AttackCycle::idle(),
            },
            EnemyKind::Summoner => Behavior::Summoner {
                cycle: AttackCycle::idle(),
                blink_cd_ms: 0.0,
            },
        }
    }
}

/// Side effects an enemy asks the engine to perform
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyCommand {
    Fire {
        origin: Vec2,
        target: Vec2,
        damage: f32,
        speed: Option<f32>,
    },
    Summon {
        pos: Vec2,
        hp: f32,
        speed: f32,
    },
    ShieldAllies {
        source_id: u32,
        center: Vec2,
        radius: f32,
        ms: f32,
    },
}

/// Frame context handed to each enemy
pub struct SmartCtx<'a> {
    /// Scaled frame time in ms
    pub dt_ms: f32,
    pub time_mult: f32,
    pub player_pos: Vec2,
    /// Player velocity in world units per second
    pub player_vel: Vec2,
    /// Visible world area
    pub view_size: Vec2,
    pub rng: &'a mut Pcg32,
    pub commands: &'a mut Vec<EnemyCommand>,
}

impl SmartCtx<'_> {
    /// Whether `pos` is within the player-centred view plus `margin`
    pub fn on_screen(&self, pos: Vec2, margin: f32) -> bool {
        let d = (pos - self.player_pos).abs();
        d.x < self.view_size.x * 0.5 + margin && d.y < self.view_size.y * 0.5 + margin
    }

    fn roll(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    fn side(&mut self) -> f32 {
        if self.rng.random_bool(0.5) { -1.0 } else { 1.0 }
    }

    /// Predicted player position `lead` seconds ahead
    fn lead_target(&self, lead: f32) -> Vec2 {
        self.player_pos + self.player_vel * lead
    }
}

/// Telegraph readout for the render snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelegraphView {
    /// Aim line toward a point
    Line { target: Vec2, progress: f32 },
    /// Expanding ring of `radius`
    Ring { radius: f32, progress: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub hp: f32,
    pub max_hp: f32,
    /// Per-frame movement at time_mult 1
    pub speed: f32,
    pub status: StatusEffects,
    pub behavior: Behavior,
    pub contact: ContactModel,
    pub anim_ms: f32,
    pub age_ms: f32,
}

#[inline]
fn step(pos: &mut Vec2, dir: Vec2, speed: f32, time_mult: f32) {
    *pos += dir * speed * time_mult;
}

/// Keep inside a distance band: back off when closer than `min_d`, close
/// in beyond `max_d`, and strafe in between.
#[allow(clippy::too_many_arguments)]
fn hold_band(
    pos: &mut Vec2,
    dir: Vec2,
    d: f32,
    s: f32,
    tm: f32,
    (min_d, max_d): (f32, f32),
    (retreat, approach, strafe): (f32, f32, f32),
    strafe_dir: f32,
) {
    if d < min_d {
        step(pos, -dir, s * retreat, tm);
    } else if d > max_d {
        step(pos, dir, s * approach, tm);
    } else if strafe != 0.0 {
        step(pos, perpendicular(dir) * strafe_dir, s * strafe, tm);
    }
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, hp: f32, speed: f32, rng: &mut Pcg32) -> Self {
        let params = kind.params();
        Self {
            id,
            kind,
            body: Body::new(pos, params.radius, params.color),
            hp,
            max_hp: hp,
            speed,
            status: StatusEffects::spawning(),
            behavior: Behavior::initial(kind, rng),
            contact: kind.contact_model(),
            anim_ms: 0.0,
            age_ms: 0.0,
        }
    }

    pub fn params(&self) -> KindParams {
        self.kind.params()
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp > 0.0 {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// True while a dasher is mid-dash
    pub fn is_dashing(&self) -> bool {
        matches!(self.behavior, Behavior::Dasher { dash_ms, .. } if dash_ms > 0.0)
    }

    /// A bomber finished arming and has not yet gone off
    pub fn explosion_pending(&self) -> bool {
        matches!(&self.behavior, Behavior::Bomber { cycle } if cycle.is_firing())
    }

    /// Consume a pending bomber explosion. Returns false when nothing was pending.
    pub fn detonate(&mut self) -> bool {
        if let Behavior::Bomber { cycle } = &mut self.behavior {
            if cycle.finish(2200.0) {
                self.hp = 0.0;
                return true;
            }
        }
        false
    }

    pub fn telegraph(&self) -> Option<TelegraphView> {
        let pos = self.body.pos;
        match &self.behavior {
            Behavior::BurstHunter { cycle, aim, .. } => cycle.telegraph_progress().map(|progress| TelegraphView::Line {
                target: pos + *aim * 60.0,
                progress,
            }),
            Behavior::Dasher { cycle, dash_dir, .. } => cycle.telegraph_progress().map(|progress| TelegraphView::Line {
                target: pos + *dash_dir * 120.0,
                progress,
            }),
            Behavior::Suppressor { cycle, aim, .. }
            | Behavior::Gunner { cycle, aim, .. }
            | Behavior::Sniper { cycle, aim } => cycle
                .telegraph_progress()
                .map(|progress| TelegraphView::Line { target: *aim, progress }),
            Behavior::ShieldSupport { cycle } => cycle.telegraph_progress().map(|progress| TelegraphView::Ring {
                radius: 40.0 + progress * 40.0,
                progress,
            }),
            Behavior::Bomber { cycle } => cycle.telegraph_progress().map(|progress| TelegraphView::Ring {
                radius: 18.0 + progress * 40.0,
                progress,
            }),
            Behavior::Summoner { cycle, .. } => cycle.telegraph_progress().map(|progress| TelegraphView::Ring {
                radius: 18.0 + progress * 28.0,
                progress,
            }),
            Behavior::Minion | Behavior::Swarm { .. } | Behavior::Flanker { .. } => None,
        }
    }

    /// Advance one frame: status first, then the variant's behavior.
    pub fn update(&mut self, ctx: &mut SmartCtx) {
        self.age_ms += ctx.dt_ms;

        let tick = self.status.tick(ctx.dt_ms);
        if tick.frozen {
            return;
        }
        self.hp -= tick.burn_damage;
        self.anim_ms += ctx.dt_ms;

        let Enemy {
            id,
            body,
            speed,
            status,
            behavior,
            anim_ms,
            age_ms,
            ..
        } = self;
        let pos = &mut body.pos;
        let tm = ctx.time_mult;
        let dt = ctx.dt_ms;
        let s = *speed * tick.speed_mult;
        let (dir, d) = direction_to(*pos, ctx.player_pos);

        if tick.feared {
            // Dashers flee from where they predict the player to be
            let flee_from = match behavior {
                Behavior::Dasher { .. } => {
                    let lead = (0.18 + ctx.roll() * 0.06).clamp(0.12, 0.28);
                    direction_to(*pos, ctx.lead_target(lead)).0
                }
                _ => dir,
            };
            step(pos, -flee_from, s, tm);
            if let Some(cycle) = behavior.cycle_mut() {
                cycle.tick_cooldown(dt);
            }
            return;
        }

        match behavior {
            Behavior::Minion => step(pos, dir, s, tm),

            Behavior::Swarm { phase } => {
                let close = 1.0 - (d / 260.0).clamp(0.0, 1.0);
                let swirl = (*anim_ms * 0.004 + *phase).sin();
                let curve = (0.35 + 0.35 * close) * swirl;
                let bias = (*phase * 3.0).sin() * 0.12;
                let v = dir + perpendicular(dir) * (curve + bias);
                step(pos, crate::safe_normalize(v, dir), s, tm);
            }

            Behavior::BurstHunter {
                cycle,
                strafe_dir,
                strafe_ms,
                aim,
            } => {
                cycle.tick(dt);
                if cycle.is_telegraphing() {
                    *aim = dir;
                    return;
                }
                if cycle.is_firing() {
                    let base = aim.y.atan2(aim.x);
                    for off in [-0.18f32, 0.0, 0.18] {
                        let target = *pos + Vec2::from_angle(base + off) * 1000.0;
                        ctx.commands.push(EnemyCommand::Fire {
                            origin: *pos,
                            target,
                            damage: 8.0,
                            speed: Some(BURST_HUNTER_BULLET_SPEED),
                        });
                    }
                    cycle.finish(2200.0);
                    status.flash_act(140.0);
                    return;
                }

                *strafe_ms = (*strafe_ms - dt).max(0.0);
                if *strafe_ms <= 0.0 {
                    *strafe_dir = ctx.side();
                    *strafe_ms = 700.0 + ctx.roll() * 900.0;
                }
                hold_band(pos, dir, d, s, tm, (110.0, 170.0), (1.05, 0.75, 0.40), *strafe_dir);

                if cycle.is_idle() && ctx.on_screen(*pos, 80.0) && d <= 150.0 && *age_ms >= 800.0 {
                    cycle.begin_telegraph(300.0);
                    status.flash_act(300.0);
                    *aim = dir;
                }
            }

            Behavior::Dasher {
                cycle,
                dash_dir,
                dash_ms,
            } => {
                *dash_ms = (*dash_ms - dt).max(0.0);
                cycle.tick(dt);
                if cycle.is_firing() {
                    cycle.finish(3200.0 + ctx.roll() * 900.0);
                    *dash_ms = DASH_MS;
                    status.flash_act(120.0);
                }

                if *dash_ms > 0.0 {
                    let t = 1.0 - *dash_ms / DASH_MS;
                    let ease = 0.5 - 0.5 * (std::f32::consts::PI * t).cos();
                    step(pos, *dash_dir, s * (3.2 + 2.0 * ease), tm);
                    return;
                }

                let lead = (0.18 + ctx.roll() * 0.06).clamp(0.12, 0.28);
                let (to, to_d) = direction_to(*pos, ctx.lead_target(lead));
                let slow = if cycle.cooldown_left() > 2800.0 { 0.75 } else { 1.0 };
                step(pos, to, s * slow, tm);

                if cycle.is_idle() && to_d < 220.0 {
                    cycle.begin_telegraph(380.0);
                    status.flash_act(120.0);
                    *dash_dir = to;
                }
            }

            Behavior::Flanker { flank_ms, target } => {
                *flank_ms = (*flank_ms - dt).max(0.0);
                if *flank_ms <= 0.0 && d < 320.0 {
                    *flank_ms = 1400.0 + ctx.roll() * 700.0;
                    status.flash_act(120.0);
                    let side = ctx.side();
                    let offset = 110.0 + ctx.roll() * 70.0;
                    *target = ctx.player_pos + perpendicular(dir) * side * offset;
                }
                if *flank_ms > 0.0 {
                    let (to, _) = direction_to(*pos, *target);
                    step(pos, to, s * 1.15, tm);
                } else {
                    step(pos, dir, s, tm);
                }
            }

            Behavior::ShieldSupport { cycle } => {
                cycle.tick(dt);
                let desired = if d < 260.0 { -1.0 } else { 1.0 };
                step(pos, dir * desired, s * 0.9, tm);

                if cycle.is_idle() {
                    cycle.begin_telegraph(420.0);
                    status.flash_act(120.0);
                } else if cycle.is_firing() {
                    ctx.commands.push(EnemyCommand::ShieldAllies {
                        source_id: *id,
                        center: *pos,
                        radius: SHIELD_RADIUS,
                        ms: ALLY_SHIELD_MS,
                    });
                    status.grant_shield(SELF_SHIELD_MS);
                    cycle.finish(7400.0 + ctx.roll() * 2500.0);
                }
            }

            Behavior::Suppressor {
                cycle,
                aim,
                burst_left,
                burst_gap_ms,
            } => {
                cycle.tick(dt);
                *burst_gap_ms = (*burst_gap_ms - dt).max(0.0);
                hold_band(pos, dir, d, s, tm, (220.0, 360.0), (1.1, 0.85, 0.35), 1.0);

                if cycle.is_idle() && *burst_left == 0 {
                    cycle.begin_telegraph(380.0);
                    status.flash_act(120.0);
                    *aim = ctx.lead_target((d / 850.0).clamp(0.10, 0.30));
                    *burst_left = if ctx.roll() < 0.35 { 3 } else { 2 };
                    *burst_gap_ms = 0.0;
                }
                if cycle.is_firing() && *burst_left > 0 && *burst_gap_ms <= 0.0 {
                    let jitter = 10.0 + ctx.roll() * 12.0;
                    let offset = Vec2::new(ctx.roll() - 0.5, ctx.roll() - 0.5) * jitter;
                    ctx.commands.push(EnemyCommand::Fire {
                        origin: *pos,
                        target: *aim + offset,
                        damage: 6.0,
                        speed: None,
                    });
                    *burst_left -= 1;
                    *burst_gap_ms = 140.0;
                    if *burst_left == 0 {
                        cycle.finish(1250.0 + ctx.roll() * 700.0);
                    }
                }
            }

            Behavior::Gunner {
                cycle,
                aim,
                strafe_dir,
                strafe_ms,
            } => {
                cycle.tick(dt);
                *strafe_ms = (*strafe_ms - dt).max(0.0);
                if *strafe_ms <= 0.0 {
                    *strafe_dir = ctx.side();
                    *strafe_ms = 900.0 + ctx.roll() * 900.0;
                }
                let move_mult = if cycle.is_telegraphing() { 0.55 } else { 1.0 };
                hold_band(pos, dir, d, s * move_mult, tm, (200.0, 340.0), (1.05, 0.80, 0.45), *strafe_dir);

                if cycle.is_idle() {
                    cycle.begin_telegraph(280.0);
                    status.flash_act(120.0);
                    *aim = ctx.lead_target((d / 900.0).clamp(0.08, 0.22));
                } else if cycle.is_firing() {
                    ctx.commands.push(EnemyCommand::Fire {
                        origin: *pos,
                        target: *aim,
                        damage: 5.0,
                        speed: None,
                    });
                    // Period is measured from telegraph start
                    cycle.finish(900.0 + ctx.roll() * 650.0 - 280.0);
                }
            }

            Behavior::Sniper { cycle, aim } => {
                cycle.tick(dt);
                hold_band(pos, dir, d, s, tm, (340.0, 520.0), (1.15, 0.55, 0.0), 1.0);

                if cycle.is_idle() {
                    cycle.begin_telegraph(620.0);
                    status.flash_act(120.0);
                    *aim = ctx.lead_target((d / 720.0).clamp(0.12, 0.45));
                } else if cycle.is_firing() {
                    ctx.commands.push(EnemyCommand::Fire {
                        origin: *pos,
                        target: *aim,
                        damage: 10.0,
                        speed: None,
                    });
                    cycle.finish(2200.0 + ctx.roll() * 1200.0 - 620.0);
                }
            }

            Behavior::Bomber { cycle } => {
                cycle.tick(dt);
                if cycle.is_telegraphing() {
                    step(pos, dir, s * 0.1, tm);
                    return;
                }
                if cycle.is_firing() {
                    // Armed; the engine detonates it this frame
                    return;
                }
                if cycle.is_idle() && d < 120.0 {
                    cycle.begin_telegraph(780.0);
                    status.flash_act(120.0);
                    return;
                }
                step(pos, dir, s * 1.05, tm);
            }

            Behavior::Summoner { cycle, blink_cd_ms } => {
                cycle.tick(dt);
                *blink_cd_ms = (*blink_cd_ms - dt).max(0.0);
                if d < 260.0 {
                    step(pos, -dir, s * 1.1, tm);
                    if d < 160.0 && *blink_cd_ms <= 0.0 {
                        status.flash_act(120.0);
                        *blink_cd_ms = 8500.0 + ctx.roll() * 3500.0;
                    }
                } else if d > 420.0 {
                    step(pos, dir, s * 0.55, tm);
                }

                if cycle.is_idle() {
                    cycle.begin_telegraph(650.0);
                    status.flash_act(120.0);
                } else if cycle.is_firing() {
                    let count = ctx.rng.random_range(2..=5);
                    for _ in 0..count {
                        let a = ctx.roll() * std::f32::consts::TAU;
                        let r = 40.0 + ctx.roll() * 40.0;
                        ctx.commands.push(EnemyCommand::Summon {
                            pos: *pos + Vec2::from_angle(a) * r,
                            hp: MINION_HP,
                            speed: MINION_SPEED,
                        });
                    }
                    cycle.finish(9500.0 + ctx.roll() * 4500.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::attack::CyclePhase;
    use proptest::prelude::*;
    use rand::SeedableRng;

    struct Harness {
        rng: Pcg32,
        commands: Vec<EnemyCommand>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                rng: Pcg32::seed_from_u64(42),
                commands: Vec::new(),
            }
        }

        fn ctx(&mut self, player_pos: Vec2) -> SmartCtx<'_> {
            SmartCtx {
                dt_ms: 16.66,
                time_mult: 1.0,
                player_pos,
                player_vel: Vec2::ZERO,
                view_size: Vec2::new(1200.0, 800.0),
                rng: &mut self.rng,
                commands: &mut self.commands,
            }
        }

        fn spawn(&mut self, kind: EnemyKind, pos: Vec2) -> Enemy {
            Enemy::new(1, kind, pos, 100.0, 1.0, &mut self.rng)
        }
    }

    #[test]
    fn test_minion_pursues_player() {
        let mut h = Harness::new();
        let mut e = h.spawn(EnemyKind::Minion, Vec2::new(100.0, 0.0));
        e.update(&mut h.ctx(Vec2::ZERO));
        assert!((e.body.pos.x - 99.0).abs() < 1e-4);
    }

    #[test]
    fn test_frozen_enemy_holds_still_and_keeps_telegraph() {
        let mut h = Harness::new();
        let mut e = h.spawn(EnemyKind::Sniper, Vec2::new(400.0, 0.0));
        e.update(&mut h.ctx(Vec2::ZERO));
        let Behavior::Sniper { cycle, .. } = &e.behavior else { panic!() };
        assert_eq!(cycle.phase, CyclePhase::Telegraphing);
        let before = cycle.timer_ms;
        let pos = e.body.pos;

        e.status.freeze(200.0);
        e.update(&mut h.ctx(Vec2::ZERO));
        let Behavior::Sniper { cycle, .. } = &e.behavior else { panic!() };
        assert_eq!(e.body.pos, pos);
        assert_eq!(cycle.timer_ms, before);
    }

    #[test]
    fn test_feared_enemy_flees() {
        let mut h = Harness::new();
        let mut e = h.spawn(EnemyKind::Swarm, Vec2::new(100.0, 0.0));
        e.status.fear(500.0);
        e.update(&mut h.ctx(Vec2::ZERO));
        assert!(e.body.pos.x > 100.0);
    }

    #[test]
    fn test_fear_keeps_cooldown_running() {
        let mut h = Harness::new();
        let mut e = h.spawn(EnemyKind::BurstHunter, Vec2::new(100.0, 0.0));
        let cooldown = |e: &Enemy| match &e.behavior {
            Behavior::BurstHunter { cycle, .. } => cycle.cooldown_left(),
            _ => unreachable!(),
        };
        let before = cooldown(&e);
        assert!(before > 0.0);
        e.status.fear(500.0);
        for _ in 0..10 {
            e.update(&mut h.ctx(Vec2::ZERO));
        }
        assert!(e.body.pos.x > 100.0);
        assert!((before - cooldown(&e) - 166.6).abs() < 1e-2);
    }

    #[test]
    fn test_gunner_fires_once_per_telegraph() {
        let mut h = Harness::new();
        let mut e = h.spawn(EnemyKind::Gunner, Vec2::new(260.0, 0.0));
        // 280ms telegraph at 16.66ms frames
        for _ in 0..20 {
            e.update(&mut h.ctx(Vec2::ZERO));
        }
        let shots = h
            .commands
            .iter()
            .filter(|c| matches!(c, EnemyCommand::Fire { .. }))
            .count();
        assert_eq!(shots, 1);
    }

    #[test]
    fn test_bomber_arms_then_explodes_once() {
        let mut h = Harness::new();
        let mut e = h.spawn(EnemyKind::Bomber, Vec2::new(60.0, 0.0));
        e.update(&mut h.ctx(Vec2::ZERO));
        assert!(e.telegraph().is_some());
        assert!(!e.explosion_pending());
        for _ in 0..60 {
            e.update(&mut h.ctx(Vec2::ZERO));
            if e.explosion_pending() {
                break;
            }
        }
        assert!(e.explosion_pending());
        assert!(e.detonate());
        assert!(e.is_dead());
        assert!(!e.detonate());
    }

    #[test]
    fn test_dasher_telegraphs_then_dashes() {
        let mut h = Harness::new();
        let mut e = h.spawn(EnemyKind::Dasher, Vec2::new(150.0, 0.0));
        e.update(&mut h.ctx(Vec2::ZERO));
        assert!(matches!(e.telegraph(), Some(TelegraphView::Line { .. })));
        let mut dashed = false;
        for _ in 0..30 {
            e.update(&mut h.ctx(Vec2::ZERO));
            dashed |= e.is_dashing();
        }
        assert!(dashed);
        let Behavior::Dasher { cycle, .. } = &e.behavior else { panic!() };
        assert_eq!(cycle.phase, CyclePhase::Cooldown);
    }

    #[test]
    fn test_summoner_summons_after_portal() {
        let mut h = Harness::new();
        let mut e = h.spawn(EnemyKind::Summoner, Vec2::new(300.0, 0.0));
        for _ in 0..45 {
            e.update(&mut h.ctx(Vec2::ZERO));
        }
        let summoned = h
            .commands
            .iter()
            .filter(|c| matches!(c, EnemyCommand::Summon { .. }))
            .count();
        assert!((2..=5).contains(&summoned));
    }

    #[test]
    fn test_shield_support_shields_self_and_allies() {
        let mut h = Harness::new();
        let mut e = h.spawn(EnemyKind::ShieldSupport, Vec2::new(300.0, 0.0));
        for _ in 0..30 {
            e.update(&mut h.ctx(Vec2::ZERO));
        }
        assert!(e.status.is_shielded());
        assert!(h.commands.iter().any(|c| matches!(
            c,
            EnemyCommand::ShieldAllies { source_id: 1, ms, .. } if *ms == ALLY_SHIELD_MS
        )));
    }

    proptest! {
        #[test]
        fn test_hp_never_increases(
            kind_idx in 0usize..11,
            x in -600.0f32..600.0,
            y in -600.0f32..600.0,
            burn in 0.0f32..2000.0,
            frames in 1usize..120,
        ) {
            let kinds = [
                EnemyKind::Minion, EnemyKind::Swarm, EnemyKind::BurstHunter, EnemyKind::Dasher,
                EnemyKind::Flanker, EnemyKind::ShieldSupport, EnemyKind::Suppressor,
                EnemyKind::Gunner, EnemyKind::Sniper, EnemyKind::Bomber, EnemyKind::Summoner,
            ];
            let mut h = Harness::new();
            let mut e = h.spawn(kinds[kind_idx], Vec2::new(x, y));
            e.status.burn(burn, 2.0);
            let mut prev = e.hp;
            for _ in 0..frames {
                e.update(&mut h.ctx(Vec2::ZERO));
                prop_assert!(e.hp <= prev);
                prop_assert!(e.body.pos.is_finite());
                prev = e.hp;
            }
        }
    }
}
