//! Render snapshot
//!
//! `RenderFrame` flattens a `GameState` into plain records that a canvas or
//! GPU host can draw without reaching into simulation types. Positions are
//! world space; `CameraView` carries the transform and the shake offset.
//! Building a frame never mutates the state.

use glam::Vec2;
use serde::Serialize;

use super::boss::{BEAM_HALF_WIDTH, BEAM_LENGTH, BossPhase};
use super::effects::{DamageNumber, Particle};
use super::enemy::{Enemy, EnemyKind, TelegraphView};
use super::entity::{Body, Color};
use super::input::InputState;
use super::pickup::{HEALTH_PICKUP_LIFE_MS, HealthPickup, StructureKind};
use super::state::{GamePhase, GameState};
use super::tick::{PULSE_RADIUS, PULSE_VISUAL_MS};

/// Pickups start blinking this long before they expire
const PICKUP_BLINK_MS: f32 = 5000.0;
const HIT_FLASH_FULL_MS: f32 = 110.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraView {
    pub center: [f32; 2],
    pub zoom: f32,
    pub viewport: [f32; 2],
    pub pixel_density: f32,
    /// Screen-space shake offset to add after the world transform
    pub shake: [f32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircleSprite {
    pub pos: [f32; 2],
    pub radius: f32,
    pub color: [f32; 4],
}

impl CircleSprite {
    fn from_body(body: &Body) -> Self {
        Self {
            pos: body.pos.to_array(),
            radius: body.radius,
            color: body.color.to_array(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerSprite {
    pub body: CircleSprite,
    /// Radius that actually takes hits
    pub hit_radius: f32,
    pub dashing: bool,
    pub invincible: bool,
    pub shield_fraction: f32,
    /// Damage aura ring, when owned
    pub aura_radius: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TelegraphSprite {
    Line { from: [f32; 2], to: [f32; 2], progress: f32 },
    Ring { center: [f32; 2], radius: f32, progress: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnemySprite {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: CircleSprite,
    pub hp_fraction: f32,
    /// 1 right after a hit, fading to 0
    pub hit_flash: f32,
    pub acting: bool,
    /// Fade-in for fresh spawns, 0..1
    pub alpha: f32,
    pub frozen: bool,
    pub feared: bool,
    pub slowed: bool,
    pub burning: bool,
    pub shielded: bool,
    pub telegraph: Option<TelegraphSprite>,
}

impl EnemySprite {
    fn capture(e: &Enemy) -> Self {
        let pos = e.body.pos.to_array();
        let telegraph = e.telegraph().map(|t| match t {
            TelegraphView::Line { target, progress } => TelegraphSprite::Line {
                from: pos,
                to: target.to_array(),
                progress,
            },
            TelegraphView::Ring { radius, progress } => TelegraphSprite::Ring {
                center: pos,
                radius,
                progress,
            },
        });
        let s = &e.status;
        Self {
            id: e.id,
            kind: e.kind,
            body: CircleSprite::from_body(&e.body),
            hp_fraction: e.hp_fraction(),
            hit_flash: (s.hit_flash_ms / HIT_FLASH_FULL_MS).clamp(0.0, 1.0),
            acting: s.act_flash_ms > 0.0,
            alpha: s.spawn_progress().clamp(0.0, 1.0),
            frozen: s.is_frozen(),
            feared: s.fear_ms > 0.0,
            slowed: s.slow_ms > 0.0,
            burning: s.burn_ms > 0.0,
            shielded: s.is_shielded(),
            telegraph,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BeamSprite {
    pub origin: [f32; 2],
    pub angle: f32,
    pub length: f32,
    pub half_width: f32,
    /// False while only telegraphed
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossSprite {
    pub body: CircleSprite,
    pub hp_fraction: f32,
    pub phase: BossPhase,
    pub enraged: bool,
    pub hit_flash: f32,
    pub beams: Vec<BeamSprite>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StructureSprite {
    pub kind: StructureKind,
    pub min: [f32; 2],
    pub max: [f32; 2],
    pub hp_fraction: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PickupSprite {
    pub pos: [f32; 2],
    pub radius: f32,
    pub heal_fraction: f32,
    /// Drops toward zero in a blink as expiry nears
    pub alpha: f32,
}

impl PickupSprite {
    fn capture(p: &HealthPickup) -> Self {
        let left = HEALTH_PICKUP_LIFE_MS - p.age_ms;
        let alpha = if left < PICKUP_BLINK_MS && (left / 150.0) as i32 % 2 == 0 {
            0.35
        } else {
            1.0
        };
        Self {
            pos: p.pos.to_array(),
            radius: p.radius,
            heal_fraction: p.heal_fraction,
            alpha,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleSprite {
    pub pos: [f32; 2],
    pub size: f32,
    pub color: [f32; 4],
}

impl From<&Particle> for ParticleSprite {
    fn from(p: &Particle) -> Self {
        Self {
            pos: p.pos.to_array(),
            size: p.size,
            color: faded(p.color, p.life),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextSprite {
    pub pos: [f32; 2],
    pub value: u32,
    pub color: [f32; 4],
    pub scale: f32,
    pub is_crit: bool,
}

impl From<&DamageNumber> for TextSprite {
    fn from(n: &DamageNumber) -> Self {
        let t = n.progress();
        let pop = if n.is_crit { 1.35 } else { 1.0 };
        Self {
            pos: n.pos.to_array(),
            value: n.value,
            color: faded(n.color, 1.0 - t * t),
            scale: pop * (1.0 + (1.0 - t).powi(3) * 0.25),
            is_crit: n.is_crit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PulseRing {
    pub center: [f32; 2],
    pub radius: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JoystickView {
    pub base: [f32; 2],
    pub knob: [f32; 2],
}

/// Numbers a HUD overlay needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub hp: f32,
    pub max_hp: f32,
    pub shield: f32,
    pub max_shield: f32,
    pub xp: f32,
    pub next_level_xp: f32,
    pub level: u32,
    pub coins: u32,
    pub round: u32,
    pub dash_cooldown: f32,
    pub has_dash: bool,
}

/// Everything drawn in one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub camera: CameraView,
    pub player: PlayerSprite,
    pub drone: Option<CircleSprite>,
    pub boss: Option<BossSprite>,
    pub enemies: Vec<EnemySprite>,
    pub bullets: Vec<CircleSprite>,
    pub enemy_bullets: Vec<CircleSprite>,
    pub crystals: Vec<CircleSprite>,
    pub structures: Vec<StructureSprite>,
    pub health_pickups: Vec<PickupSprite>,
    pub particles: Vec<ParticleSprite>,
    pub damage_numbers: Vec<TextSprite>,
    /// Full-screen red overlay alpha
    pub damage_flash: f32,
    pub pulse: Option<PulseRing>,
    pub joystick: Option<JoystickView>,
    pub hud: Hud,
}

fn pair(v: Vec2) -> [f32; 2] {
    v.to_array()
}

impl RenderFrame {
    pub fn capture(state: &GameState, input: &InputState) -> Self {
        let stats = &state.stats;
        let player_pos = state.player.pos();
        let camera = CameraView {
            center: pair(state.camera.center),
            zoom: state.camera.zoom,
            viewport: pair(state.camera.viewport),
            pixel_density: state.camera.pixel_density,
            shake: pair(state.effects.shake.offset),
        };

        let player = PlayerSprite {
            body: CircleSprite::from_body(&state.player.body),
            hit_radius: state.player_hit_radius(),
            dashing: state.player.is_dashing(),
            invincible: state.player.is_invincible(),
            shield_fraction: if stats.max_shield > 0.0 {
                (stats.shield / stats.max_shield).clamp(0.0, 1.0)
            } else {
                0.0
            },
            aura_radius: (stats.aura_level > 0).then(|| stats.aura_radius()),
        };

        let boss = state.boss.as_ref().map(|b| BossSprite {
            body: CircleSprite::from_body(&b.body),
            hp_fraction: (b.hp / b.max_hp).clamp(0.0, 1.0),
            phase: b.phase,
            enraged: b.is_enraged(),
            hit_flash: (b.status.hit_flash_ms / HIT_FLASH_FULL_MS).clamp(0.0, 1.0),
            beams: b
                .beams()
                .into_iter()
                .map(|beam| BeamSprite {
                    origin: pair(b.body.pos),
                    angle: beam.angle,
                    length: BEAM_LENGTH,
                    half_width: BEAM_HALF_WIDTH,
                    live: beam.live,
                })
                .collect(),
        });

        let pulse = (state.effects.pulse_visual_ms > 0.0).then(|| {
            let t = 1.0 - state.effects.pulse_visual_ms / PULSE_VISUAL_MS;
            PulseRing {
                center: pair(player_pos),
                radius: PULSE_RADIUS * t,
                alpha: 1.0 - t,
            }
        });

        let joystick = input.joystick.active.then(|| JoystickView {
            base: pair(input.joystick.base),
            knob: pair(input.joystick.base + input.joystick.knob_offset()),
        });

        let flash_alpha = if state.effects.damage_flash > 0.0 {
            (state.effects.damage_flash / super::effects::DAMAGE_FLASH_SECS).clamp(0.0, 1.0) * 0.35
        } else {
            0.0
        };

        Self {
            camera,
            player,
            drone: state.drone.as_ref().map(|d| CircleSprite::from_body(&d.body)),
            boss,
            enemies: state.enemies.iter().map(EnemySprite::capture).collect(),
            bullets: state.bullets.iter().map(|b| CircleSprite::from_body(&b.body)).collect(),
            enemy_bullets: state
                .enemy_bullets
                .iter()
                .map(|b| CircleSprite::from_body(&b.body))
                .collect(),
            crystals: state
                .crystals
                .iter()
                .map(|c| CircleSprite::from_body(&c.body))
                .collect(),
            structures: state
                .structures
                .iter()
                .map(|s| StructureSprite {
                    kind: s.kind,
                    min: pair(s.rect.min),
                    max: pair(s.rect.max),
                    hp_fraction: (s.hp / s.max_hp).clamp(0.0, 1.0),
                })
                .collect(),
            health_pickups: state.health_pickups.iter().map(PickupSprite::capture).collect(),
            particles: state.effects.particles.iter().map(ParticleSprite::from).collect(),
            damage_numbers: state.effects.damage_numbers.iter().map(TextSprite::from).collect(),
            damage_flash: flash_alpha,
            pulse,
            joystick,
            hud: Hud {
                phase: state.phase,
                hp: stats.hp.max(0.0),
                max_hp: stats.max_hp,
                shield: stats.shield,
                max_shield: stats.max_shield,
                xp: stats.xp,
                next_level_xp: stats.next_level_xp,
                level: stats.level,
                coins: stats.coins,
                round: state.round,
                dash_cooldown: state.player.dash_cooldown_fraction(stats),
                has_dash: stats.has_dash,
            },
        }
    }

    /// Number of sprites, for logging and budget checks
    pub fn sprite_count(&self) -> usize {
        1 + usize::from(self.drone.is_some())
            + usize::from(self.boss.is_some())
            + self.enemies.len()
            + self.bullets.len()
            + self.enemy_bullets.len()
            + self.crystals.len()
            + self.structures.len()
            + self.health_pickups.len()
            + self.particles.len()
            + self.damage_numbers.len()
    }
}

/// Colour as `[r, g, b, a]` in 0..1 with alpha scaled
fn faded(color: Color, alpha: f32) -> [f32; 4] {
    let mut c = color.to_array();
    c[3] *= alpha.clamp(0.0, 1.0);
    c
}
